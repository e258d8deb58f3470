//! Ports - the seams between the effects core and its collaborators.
//!
//! - **store**: the host dispatch store and its middleware contract
//! - **handler**: application-supplied effect handlers
//! - **sink**: where unhandled effects are reported

pub mod handler;
pub mod sink;
pub mod store;

pub use self::handler::{EffectHandler, EffectNext, handler_fn};
pub use self::sink::{NoopSink, TracingSink, UnhandledSink};
pub use self::store::{DispatchResult, Middleware, Next, StoreApi};
