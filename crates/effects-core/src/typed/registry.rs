//! EffectRegistry - typed handler の登録と管理
//!
//! # 学習ポイント
//! - HashMap での型消去された trait object の管理
//! - Generic methods での登録と型安全性
//! - registry 自身が handler chain の一つのリンクになる

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use super::effect::Effect;
use super::handler::{DynHandler, Handler, TypedHandler};
use crate::domain::Resolution;
use crate::ports::{EffectHandler, EffectNext, StoreApi};

/// EffectRegistry は型付き Handler を登録・管理
///
/// # 使用例
/// ```ignore
/// let mut registry = EffectRegistry::new();
/// registry.register::<Fetch, _>(FetchHandler)?;
///
/// let handler = registry.get("http.fetch");
/// ```
///
/// # 内部実装
/// - `register::<E: Effect>(handler: impl Handler<E>)` で登録
/// - 内部的に TypedHandler でラップして DynHandler に変換
/// - payload の `type` が既知なら claim、それ以外は `next` へ
#[derive(Default)]
pub struct EffectRegistry {
    handlers: HashMap<String, Arc<dyn DynHandler>>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Handler for effect type '{0}' is already registered")]
    AlreadyRegistered(String),
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register<E: Effect, H: Handler<E> + 'static>(
        &mut self,
        handler: H,
    ) -> Result<(), RegistryError> {
        let effect_type = E::TYPE.to_string();
        if self.handlers.contains_key(&effect_type) {
            return Err(RegistryError::AlreadyRegistered(effect_type));
        }
        self.handlers
            .insert(effect_type, Arc::new(TypedHandler::<E, H>::new(handler)));
        Ok(())
    }

    pub fn get(&self, effect_type: &str) -> Option<Arc<dyn DynHandler>> {
        self.handlers.get(effect_type).cloned()
    }

    /// Registered effect types, sorted.
    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.handlers.keys().cloned().collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl EffectHandler for EffectRegistry {
    fn handle(&self, store: &Arc<dyn StoreApi>, payload: Value, next: &EffectNext) -> Resolution {
        let handler = payload
            .get("type")
            .and_then(Value::as_str)
            .and_then(|effect_type| self.handlers.get(effect_type));

        match handler {
            Some(handler) => {
                trace!(effect_type = handler.effect_type(), "typed handler claimed effect");
                Resolution::Pending(handler.handle_dyn(Arc::clone(store), payload))
            }
            None => next(payload),
        }
    }
}
