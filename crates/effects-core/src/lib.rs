//! effects-core
//!
//! Effect dispatch middleware for a Redux-style store.
//!
//! An effect action carries a payload and a forest of continuation steps.
//! The middleware hands the payload to a chain of effect handlers, then
//! resolves the continuation forest against the handler's result,
//! dispatching whatever actions the steps derive.
//!
//! # Modules
//! - **domain**: actions, continuation steps, resolutions, errors
//! - **ports**: store, middleware, handler and sink contracts
//! - **app**: handler composition, continuation resolver, the middleware, builder, config
//! - **typed**: typed effects and handlers, the effect registry
//! - **impls**: in-memory store and capturing sink
//! - **observability**: dispatch counters

pub mod app;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod typed;

pub use crate::app::{BuildError, EffectsBuilder, EffectsConfig, EffectsMiddleware, compose, effects, unhandled_effect};
pub use crate::domain::{
    Action, ContinuationStep, DeclarativePromise, Dispatched, EFFECT, EFFECT_COMPOSE, EffectAction, EffectError,
    EffectHandle, Resolution, bind,
};
pub use crate::impls::{CapturingSink, InMemoryStore};
pub use crate::observability::EffectCounts;
pub use crate::ports::{EffectHandler, Middleware, StoreApi, UnhandledSink, handler_fn};
pub use crate::typed::{Effect, EffectRegistry, Handler};
