//! App - the effects middleware and the pieces it is wired from.
//!
//! - **compose**: handler chain composition with the unhandled fallback
//! - **resolver**: continuation forest resolution
//! - **middleware**: classification and the installable middleware
//! - **builder**: fail-fast assembly of handlers, sink and config
//! - **config**: recognition knobs

pub mod builder;
pub mod compose;
pub mod config;
pub mod middleware;
pub mod resolver;

pub use self::builder::{BuildError, EffectsBuilder};
pub use self::compose::{compose, unhandled_effect};
pub use self::config::EffectsConfig;
pub use self::middleware::{Classified, EffectsMiddleware, classify, effects};
pub use self::resolver::{DispatchFn, resolve};
