//! Store port - the host dispatch store as seen by middlewares and handlers.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{Action, Dispatched, EffectError};

/// Result of one trip through a dispatch pipeline.
pub type DispatchResult = Result<Dispatched, EffectError>;

/// The rest of the dispatch pipeline after a middleware.
pub type Next = Arc<dyn Fn(Action) -> DispatchResult + Send + Sync>;

/// StoreApi is what middlewares and effect handlers may call back into.
///
/// `dispatch` re-enters the full middleware pipeline; implementations
/// serialize every write to state.
pub trait StoreApi: Send + Sync {
    fn dispatch(&self, action: Action) -> DispatchResult;
    fn get_state(&self) -> Value;
}

/// Middleware wraps the store's dispatch.
///
/// `apply` runs once when the store is built; the returned `Next` runs for
/// every dispatched action and either handles it or forwards it to `next`.
pub trait Middleware: Send + Sync {
    fn apply(&self, store: Arc<dyn StoreApi>, next: Next) -> Next;
}

impl<F> Middleware for F
where
    F: Fn(Arc<dyn StoreApi>, Next) -> Next + Send + Sync,
{
    fn apply(&self, store: Arc<dyn StoreApi>, next: Next) -> Next {
        self(store, next)
    }
}
