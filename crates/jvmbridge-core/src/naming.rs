//! Raw counter name mapping.
//!
//! Each source category names its counters with its own dotted convention:
//!
//! | category | raw key | base name | tags / unit |
//! |---|---|---|---|
//! | gc | `collector.stat` | `jvm_gc_<stat>` | `collector=<collector>` |
//! | memory | `scope.pool.stat` | `jvm_memory_<scope>` | `memory_pool=<pool>`, unit `<stat>` |
//! | memory | `scope.stat` | `jvm_memory_<scope_>` | unit `<stat>` |
//! | buffer_pool | `pool.stat` | `nio_bufferPool_<pool_>` | unit `<stat>` |
//!
//! `<x_>` means hyphens in `x` are replaced with underscores.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult};
use crate::identifier::MetricIdentifier;

/// Source category of a raw counter. Selects the parse rule.
///
/// Serialized and displayed under the same short name (`gc`, `memory`,
/// `buffer_pool`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterCategory {
    #[serde(rename = "gc")]
    GarbageCollector,
    Memory,
    BufferPool,
}

impl CounterCategory {
    pub const ALL: [CounterCategory; 3] = [
        CounterCategory::GarbageCollector,
        CounterCategory::Memory,
        CounterCategory::BufferPool,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GarbageCollector => "gc",
            Self::Memory => "memory",
            Self::BufferPool => "buffer_pool",
        }
    }

    /// Map a raw dotted counter name to its identifier.
    pub fn map_name(self, raw_key: &str) -> BridgeResult<MetricIdentifier> {
        let segments: Vec<&str> = raw_key.split('.').collect();
        let malformed = || BridgeError::Mapping {
            category: self,
            key: raw_key.to_string(),
            found: segments.len(),
        };
        if segments.iter().any(|s| s.is_empty()) {
            return Err(malformed());
        }

        match (self, segments.as_slice()) {
            (Self::GarbageCollector, [collector, stat]) => {
                Ok(MetricIdentifier::new(format!("jvm_gc_{stat}")).with_tag("collector", *collector))
            }
            (Self::Memory, [scope, pool, stat]) => {
                Ok(MetricIdentifier::new(format!("jvm_memory_{scope}"))
                    .with_tag("memory_pool", *pool)
                    .with_unit(*stat))
            }
            (Self::Memory, [scope, stat]) => {
                Ok(MetricIdentifier::new(format!("jvm_memory_{}", underscored(scope))).with_unit(*stat))
            }
            (Self::BufferPool, [pool, stat]) => {
                Ok(MetricIdentifier::new(format!("nio_bufferPool_{}", underscored(pool))).with_unit(*stat))
            }
            _ => Err(malformed()),
        }
    }
}

impl fmt::Display for CounterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn underscored(segment: &str) -> String {
    segment.replace('-', "_")
}
