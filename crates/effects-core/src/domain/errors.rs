//! Errors raised while running effects and their continuations.

use serde_json::Value;
use thiserror::Error;

/// EffectError is the failure side of every settlement.
///
/// It is `Clone` because one upstream settlement is observed by every sibling
/// continuation step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EffectError {
    /// A handler rejected the effect with an arbitrary value.
    #[error("effect rejected: {0}")]
    Rejected(Value),

    #[error("failed to decode payload for effect_type={effect_type}: {message}")]
    Decode {
        effect_type: String,
        message: String,
    },

    #[error("continuation callback panicked: {0}")]
    CallbackPanicked(String),

    /// Synchronous configuration error, surfaced at dispatch time.
    #[error("malformed effect action: {0}")]
    MalformedAction(String),

    #[error("no tokio runtime available to drive effect continuations")]
    NoRuntime,

    #[error("store was dropped before dispatch")]
    StoreDropped,

    #[error("effect task aborted: {0}")]
    Aborted(String),

    #[error("{0}")]
    Other(String),
}

impl EffectError {
    pub fn rejected(value: impl Into<Value>) -> Self {
        Self::Rejected(value.into())
    }

    /// Value carried by the error, for embedding into failure actions.
    ///
    /// Rejections hand back their original value; every other variant is
    /// rendered as its message.
    pub fn into_value(self) -> Value {
        match self {
            Self::Rejected(value) => value,
            other => Value::String(other.to_string()),
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// ConfigError is raised while loading `EffectsConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejection_keeps_original_value() {
        let err = EffectError::rejected("otherVal");
        assert!(err.is_rejection());
        assert_eq!(err.into_value(), json!("otherVal"));
    }

    #[test]
    fn other_variants_render_their_message() {
        let err = EffectError::MalformedAction("bad steps".to_string());
        assert!(!err.is_rejection());
        assert_eq!(
            err.into_value(),
            json!("malformed effect action: bad steps")
        );
    }

    #[test]
    fn decode_error_names_the_effect_type() {
        let err = EffectError::Decode {
            effect_type: "fetch".to_string(),
            message: "missing field `url`".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("effect_type=fetch"));
        assert!(msg.contains("missing field"));
    }
}
