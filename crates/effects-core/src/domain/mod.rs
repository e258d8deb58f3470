//! Domain model: actions, continuation steps, resolutions, errors.

pub mod action;
pub mod continuation;
pub mod declarative;
pub mod errors;
pub mod resolution;

pub use self::action::{Action, Dispatched, EFFECT, EFFECT_COMPOSE, EffectAction, EffectHandle, bind};
pub use self::continuation::{ContinuationStep, OnFailure, OnSuccess, failure, success};
pub use self::declarative::DeclarativePromise;
pub use self::errors::{ConfigError, EffectError};
pub use self::resolution::{EffectFuture, Resolution, Settled};
