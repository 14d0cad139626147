//! Error types for the metrics bridge.

use thiserror::Error;

use crate::naming::CounterCategory;

/// Result type alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors raised while mapping, registering or sampling runtime counters.
///
/// None of these are fatal to the host: a `Mapping` error drops one series,
/// `Unsupported` drops one feature, and `TransientSample` only ever reaches
/// a log line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("cannot map {category} counter `{key}`: unexpected shape ({found} segments)")]
    Mapping {
        category: CounterCategory,
        key: String,
        found: usize,
    },

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("transient sample error: {0}")]
    TransientSample(String),
}

impl BridgeError {
    /// Whether this error only affects a single series.
    pub fn is_per_series(&self) -> bool {
        matches!(self, Self::Mapping { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_error_display_names_key_and_category() {
        let err = BridgeError::Mapping {
            category: CounterCategory::GarbageCollector,
            key: "a.b.c".to_string(),
            found: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("gc"), "{msg}");
        assert!(msg.contains("`a.b.c`"), "{msg}");
        assert!(msg.contains("3 segments"), "{msg}");
        assert!(err.is_per_series());
    }

    #[test]
    fn unsupported_is_not_per_series() {
        let err = BridgeError::Unsupported("cpu time".into());
        assert_eq!(err.to_string(), "unsupported: cpu time");
        assert!(!err.is_per_series());
    }
}
