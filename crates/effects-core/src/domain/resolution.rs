//! What a handler chain hands back for a payload.

use std::future::Future;

use futures::future::{self, BoxFuture, FutureExt, TryFutureExt};
use serde_json::Value;

use super::errors::EffectError;

/// Settlement of one effect: a value or an error.
pub type Settled = Result<Value, EffectError>;

/// Pending settlement produced by a handler.
pub type EffectFuture = BoxFuture<'static, Settled>;

/// A value, a pending future, or a group of futures joined in parallel.
pub enum Resolution {
    Ready(Settled),
    Pending(EffectFuture),
    Join(Vec<EffectFuture>),
}

impl Resolution {
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Ready(Ok(value.into()))
    }

    /// Resolved with `null`, as the unhandled fallback does.
    pub fn undefined() -> Self {
        Self::Ready(Ok(Value::Null))
    }

    pub fn reject(err: EffectError) -> Self {
        Self::Ready(Err(err))
    }

    pub fn future<F>(fut: F) -> Self
    where
        F: Future<Output = Settled> + Send + 'static,
    {
        Self::Pending(fut.boxed())
    }

    pub fn join<I, F>(futures: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = Settled> + Send + 'static,
    {
        Self::Join(futures.into_iter().map(FutureExt::boxed).collect())
    }

    /// Normalize into a single settlement.
    ///
    /// A join resolves to the array of results in declared order once every
    /// element resolves, and rejects with the first rejection observed. An
    /// empty join resolves immediately to `[]`.
    pub fn into_future(self) -> EffectFuture {
        match self {
            Self::Ready(settled) => future::ready(settled).boxed(),
            Self::Pending(fut) => fut,
            Self::Join(futures) => future::try_join_all(futures)
                .map_ok(Value::Array)
                .boxed(),
        }
    }
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready(settled) => f.debug_tuple("Ready").field(settled).finish(),
            Self::Pending(_) => f.write_str("Pending"),
            Self::Join(futures) => write!(f, "Join({})", futures.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn ready_value_settles_immediately() {
        let settled = Resolution::value("someVal").into_future().await;
        assert_eq!(settled, Ok(json!("someVal")));
    }

    #[tokio::test]
    async fn empty_join_is_empty_success() {
        let settled = Resolution::join(Vec::<EffectFuture>::new()).into_future().await;
        assert_eq!(settled, Ok(json!([])));
    }

    #[tokio::test]
    async fn join_keeps_declared_order() {
        let (tx_a, rx_a) = oneshot::channel::<Value>();
        let (tx_b, rx_b) = oneshot::channel::<Value>();

        let joined = Resolution::join(vec![
            async move { rx_a.await.map_err(|e| EffectError::Other(e.to_string())) }.boxed(),
            async move { rx_b.await.map_err(|e| EffectError::Other(e.to_string())) }.boxed(),
        ])
        .into_future();

        tx_b.send(json!("b")).unwrap();
        tx_a.send(json!("a")).unwrap();
        assert_eq!(joined.await, Ok(json!(["a", "b"])));
    }

    #[tokio::test]
    async fn join_rejects_with_first_failure() {
        let (_keep_open, never) = oneshot::channel::<Value>();

        let joined = Resolution::join(vec![
            async move { never.await.map_err(|e| EffectError::Other(e.to_string())) }.boxed(),
            async { Err(EffectError::rejected("boom")) }.boxed(),
        ])
        .into_future();

        assert_eq!(joined.await, Err(EffectError::rejected("boom")));
    }
}
