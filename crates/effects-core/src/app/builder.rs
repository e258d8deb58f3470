//! EffectsBuilder - effects middleware の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）: 問題は最初の dispatch ではなく `build()` で出る
//! - 明示 handler と typed registry の順序付け

use std::sync::Arc;

use super::config::EffectsConfig;
use super::middleware::EffectsMiddleware;
use crate::ports::{EffectHandler, TracingSink, UnhandledSink};
use crate::typed::{Effect, EffectRegistry, Handler, RegistryError};

/// EffectsBuilder は handler, sink, config を集めて middleware を構築
///
/// # 使用例
/// ```ignore
/// let middleware = EffectsBuilder::new()
///     .handler(logging_handler)
///     .register::<Fetch, _>(FetchHandler)?
///     .expect_effects(&["http.fetch"])
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - expect_effects() で期待される effect type を登録
/// - build() 時に「期待集合 ⊆ 登録済み集合」をチェック
/// - handler が一つもなければ BuildError::NoHandlers
///
/// # チェーン順序
/// - `handler()` を呼んだ順、その後ろに typed registry（登録があれば）
pub struct EffectsBuilder {
    handlers: Vec<Arc<dyn EffectHandler>>,
    registry: EffectRegistry,
    expected_effects: Option<Vec<String>>,
    sink: Arc<dyn UnhandledSink>,
    config: EffectsConfig,
}

/// BuildError は middleware 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("No effect handlers were added. Every effect would be unhandled.")]
    NoHandlers,

    #[error("Missing effect types: {0:?}. These effects were expected but not registered.")]
    MissingEffectTypes(Vec<String>),
}

impl EffectsBuilder {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            registry: EffectRegistry::new(),
            expected_effects: None,
            sink: Arc::new(TracingSink),
            config: EffectsConfig::default(),
        }
    }

    /// Append a handler to the chain.
    pub fn handler(mut self, handler: impl EffectHandler + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    pub fn shared_handler(mut self, handler: Arc<dyn EffectHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Register a typed handler.
    pub fn register<E: Effect, H: Handler<E> + 'static>(
        mut self,
        handler: H,
    ) -> Result<Self, RegistryError> {
        self.registry.register::<E, H>(handler)?;
        Ok(self)
    }

    /// Effect types that must have a typed handler when `build()` runs.
    pub fn expect_effects(mut self, effect_types: &[&str]) -> Self {
        self.expected_effects = Some(effect_types.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn sink(mut self, sink: impl UnhandledSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn shared_sink(mut self, sink: Arc<dyn UnhandledSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(mut self, config: EffectsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<EffectsMiddleware, BuildError> {
        if let Some(expected_effects) = &self.expected_effects {
            let registered = self.registry.registered_types();
            let missing: Vec<String> = expected_effects
                .iter()
                .filter(|t| !registered.contains(*t))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(BuildError::MissingEffectTypes(missing));
            }
        }

        let mut handlers = self.handlers;
        if !self.registry.is_empty() {
            handlers.push(Arc::new(self.registry));
        }
        if handlers.is_empty() {
            return Err(BuildError::NoHandlers);
        }

        Ok(EffectsMiddleware::new(handlers)
            .with_sink(self.sink)
            .with_config(self.config))
    }
}

impl Default for EffectsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Action, ContinuationStep, EffectAction, Resolution};
    use crate::impls::{CapturingSink, InMemoryStore};
    use crate::ports::{StoreApi, handler_fn};
    use crate::typed::effect::fixtures::{Double, Greet};
    use crate::typed::handler::fixtures::{DoubleHandler, GreetHandler};
    use serde_json::json;

    #[test]
    fn test_build_success() {
        let middleware = EffectsBuilder::new()
            .register::<Double, _>(DoubleHandler)
            .unwrap()
            .expect_effects(&[Double::TYPE])
            .build();
        assert!(middleware.is_ok());
        assert_eq!(middleware.unwrap().handler_count(), 1);
    }

    #[test]
    fn test_build_missing_effect_types() {
        let middleware = EffectsBuilder::new()
            .register::<Double, _>(DoubleHandler)
            .unwrap()
            .expect_effects(&[Double::TYPE, Greet::TYPE])
            .build();
        assert!(matches!(
            middleware,
            Err(BuildError::MissingEffectTypes(missing)) if missing == vec![Greet::TYPE.to_string()]
        ));
    }

    #[test]
    fn test_build_without_handlers() {
        let middleware = EffectsBuilder::new().build();
        assert!(matches!(middleware, Err(BuildError::NoHandlers)));
    }

    #[test]
    fn test_duplicate_registration_fails_early() {
        let result = EffectsBuilder::new()
            .register::<Double, _>(DoubleHandler)
            .unwrap()
            .register::<Double, _>(DoubleHandler);
        assert!(matches!(result, Err(RegistryError::AlreadyRegistered(_))));
    }

    #[test]
    fn shared_handler_can_back_several_middlewares() {
        let handler: Arc<dyn EffectHandler> =
            Arc::new(handler_fn(|_store, payload, next| next(payload)));

        let first = EffectsBuilder::new().shared_handler(handler.clone()).build().unwrap();
        let second = EffectsBuilder::new()
            .shared_handler(handler.clone())
            .register::<Double, _>(DoubleHandler)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(first.handler_count(), 1);
        assert_eq!(second.handler_count(), 2);
        assert_eq!(Arc::strong_count(&handler), 3);
    }

    #[tokio::test]
    async fn explicit_handlers_run_before_the_registry() {
        let sink = Arc::new(CapturingSink::new());
        let middleware = EffectsBuilder::new()
            .register::<Greet, _>(GreetHandler)
            .unwrap()
            .handler(handler_fn(|_store, payload, next| {
                if payload["type"] == Greet::TYPE && payload["name"] == "intercepted" {
                    Resolution::value("short-circuit")
                } else {
                    next(payload)
                }
            }))
            .shared_sink(sink.clone())
            .build()
            .unwrap();
        assert_eq!(middleware.handler_count(), 2);

        let store = InMemoryStore::recording_with(vec![Arc::new(middleware)]);
        let echo = |v: serde_json::Value| Some(Action::plain(json!({ "type": "R", "v": v })));

        for name in ["intercepted", "ada"] {
            let effect = EffectAction::new(json!({ "type": Greet::TYPE, "name": name }))
                .step(ContinuationStep::new().on_success(echo));
            let handle = store.dispatch(effect.into()).unwrap().into_effect().unwrap();
            handle.settled().await.unwrap();
        }
        let missing = EffectAction::new(json!({ "type": "test.missing" }));
        let handle = store.dispatch(missing.into()).unwrap().into_effect().unwrap();
        handle.settled().await.unwrap();

        assert_eq!(
            store.get_state(),
            json!([
                { "type": "R", "v": "short-circuit" },
                { "type": "R", "v": "hello, ada" }
            ])
        );
        assert_eq!(sink.payloads(), vec![json!({ "type": "test.missing" })]);
    }
}
