//! Handler trait - 型付き effect の非同期 handler
//!
//! # 学習ポイント
//! - async_trait による非同期 trait
//! - `Handler<E>`（型付き）と `DynHandler`（object-safe）の二層構造
//! - `TypedHandler<E, H>` が serde で decode して型消去する

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::FutureExt;
use serde_json::Value;

use super::effect::Effect;
use crate::domain::{EffectError, EffectFuture};
use crate::ports::StoreApi;

/// Handler runs one typed effect.
///
/// # Example
/// ```ignore
/// struct FetchHandler;
///
/// #[async_trait]
/// impl Handler<Fetch> for FetchHandler {
///     async fn handle(&self, _store: Arc<dyn StoreApi>, effect: Fetch) -> Result<Value, EffectError> {
///         Ok(json!({ "url": effect.url, "status": 200 }))
///     }
/// }
/// ```
#[async_trait]
pub trait Handler<E: Effect>: Send + Sync {
    async fn handle(&self, store: Arc<dyn StoreApi>, effect: E) -> Result<Value, EffectError>;
}

/// DynHandler is the type-erased handler kept in `EffectRegistry`.
pub trait DynHandler: Send + Sync {
    /// Decode `payload` and start the handler.
    fn handle_dyn(&self, store: Arc<dyn StoreApi>, payload: Value) -> EffectFuture;
    fn effect_type(&self) -> &str;
}

pub struct TypedHandler<E: Effect, H: Handler<E>> {
    handler: Arc<H>,
    _marker: PhantomData<fn(E)>,
}

impl<E: Effect, H: Handler<E>> TypedHandler<E, H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
            _marker: PhantomData,
        }
    }
}

impl<E: Effect, H: Handler<E> + 'static> DynHandler for TypedHandler<E, H> {
    fn handle_dyn(&self, store: Arc<dyn StoreApi>, payload: Value) -> EffectFuture {
        let handler = Arc::clone(&self.handler);
        async move {
            let effect: E = serde_json::from_value(payload).map_err(|e| EffectError::Decode {
                effect_type: E::TYPE.to_string(),
                message: e.to_string(),
            })?;
            handler.handle(store, effect).await
        }
        .boxed()
    }

    fn effect_type(&self) -> &str {
        E::TYPE
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{DoubleHandler, GreetHandler};
    use super::*;
    use crate::impls::InMemoryStore;
    use crate::typed::effect::fixtures::{Double, Greet};
    use serde_json::json;

    #[tokio::test]
    async fn typed_handler_decodes_and_runs() {
        let handler = TypedHandler::<Double, _>::new(DoubleHandler);
        assert_eq!(handler.effect_type(), Double::TYPE);

        let settled = handler
            .handle_dyn(InMemoryStore::recording(), json!({ "type": Double::TYPE, "value": 21 }))
            .await;
        assert_eq!(settled, Ok(json!(42)));
    }

    #[tokio::test]
    async fn decode_failure_is_a_settlement_error() {
        let handler = TypedHandler::<Double, _>::new(DoubleHandler);

        let settled = handler
            .handle_dyn(InMemoryStore::recording(), json!({ "type": Double::TYPE, "value": "nope" }))
            .await;
        assert!(matches!(settled, Err(EffectError::Decode { effect_type, .. }) if effect_type == Double::TYPE));
    }

    #[tokio::test]
    async fn handler_rejection_passes_through() {
        let handler = TypedHandler::<Greet, _>::new(GreetHandler);

        let settled = handler
            .handle_dyn(InMemoryStore::recording(), json!({ "type": Greet::TYPE, "name": "" }))
            .await;
        assert_eq!(settled, Err(EffectError::rejected("empty name")));
    }
}
