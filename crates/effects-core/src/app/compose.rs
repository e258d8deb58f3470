//! Handler chain composition.
//!
//! The ordered handler list is right-folded over a terminal fallback, so the
//! first handler is the outermost link: it sees every payload first and
//! decides whether to resolve it or call `next`.

use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use crate::domain::Resolution;
use crate::ports::{EffectHandler, EffectNext, StoreApi, UnhandledSink};

/// Terminal link: report the payload and resolve to `null`.
pub fn unhandled_effect(sink: Arc<dyn UnhandledSink>) -> EffectNext {
    Arc::new(move |payload: Value| {
        sink.unhandled(&payload);
        Resolution::undefined()
    })
}

/// Build one pipeline function from `handlers`, ending at `fallback`.
pub fn compose(
    handlers: &[Arc<dyn EffectHandler>],
    store: Arc<dyn StoreApi>,
    fallback: EffectNext,
) -> EffectNext {
    handlers
        .iter()
        .enumerate()
        .rev()
        .fold(fallback, |next, (position, handler)| {
            let handler = Arc::clone(handler);
            let store = Arc::clone(&store);
            Arc::new(move |payload: Value| {
                trace!(position, "effect handler");
                handler.handle(&store, payload, &next)
            })
        })
}
