//! Typed - typed effect API on top of the JSON handler chain.
//!
//! - **Surface**: `Effect` trait, `Handler<E>` trait - typed
//! - **Inside**: `DynHandler` trait - object-safe, type erased
//!
//! `EffectRegistry` collects typed handlers and acts as one link of the
//! handler chain.

pub mod effect;
pub mod handler;
pub mod registry;

pub use self::effect::Effect;
pub use self::handler::{DynHandler, Handler, TypedHandler};
pub use self::registry::{EffectRegistry, RegistryError};
