//! Introspection interfaces and the raw values they produce.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use jvmbridge_core::{BridgeError, BridgeResult, CounterCategory};

/// How a raw counter behaves over time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterKind {
    /// Point-in-time value (bytes used, pool size).
    #[default]
    Gauge,
    /// Monotonically increasing total (collection count, collection time).
    Counter,
}

/// One raw counter as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCounter {
    /// Dotted hierarchical name, e.g. `G1-young.count`.
    pub key: String,
    pub value: f64,
    #[serde(default)]
    pub kind: CounterKind,
}

impl RawCounter {
    pub fn gauge(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value,
            kind: CounterKind::Gauge,
        }
    }

    pub fn counter(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value,
            kind: CounterKind::Counter,
        }
    }
}

/// Thread statistics of the runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadCounts {
    pub count: u64,
    pub peak_count: u64,
    pub total_started_count: u64,
    pub daemon_count: u64,
}

/// Class-loading statistics of the runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassLoadingCounts {
    pub loaded_count: u64,
    pub total_loaded_count: u64,
    pub unloaded_count: u64,
}

/// Two cumulative counters read at the same instant.
///
/// Both are expected to be non-decreasing; consumers must tolerate
/// violations (counter rollover, clock adjustments).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuSample {
    pub process_busy_time_nanos: u64,
    pub wall_clock_time_nanos: u64,
}

impl CpuSample {
    pub fn new(process_busy_time_nanos: u64, wall_clock_time_nanos: u64) -> Self {
        Self {
            process_busy_time_nanos,
            wall_clock_time_nanos,
        }
    }
}

/// A source of process CPU time.
pub trait CpuTimeSource: Send + Sync {
    /// Take one sample. Failures are transient by contract.
    fn sample(&self) -> BridgeResult<CpuSample>;
}

/// The runtime's introspection subsystem.
///
/// Every method performs a fresh read. Implementations must be cheap
/// (local memory or a small local file), since they run inside gauges.
pub trait Introspection: Send + Sync {
    /// All raw counters currently reported for a category.
    fn raw_counters(&self, category: CounterCategory) -> BridgeResult<Vec<RawCounter>>;

    /// Current value of a single raw counter.
    fn read_counter(&self, category: CounterCategory, key: &str) -> BridgeResult<f64> {
        self.raw_counters(category)?
            .into_iter()
            .find(|c| c.key == key)
            .map(|c| c.value)
            .ok_or_else(|| BridgeError::TransientSample(format!("{category} counter `{key}` not reported")))
    }

    fn thread_counts(&self) -> BridgeResult<ThreadCounts>;

    fn class_loading(&self) -> BridgeResult<ClassLoadingCounts>;

    /// The CPU-time source, if this runtime exposes one.
    fn cpu_time_source(&self) -> Option<Arc<dyn CpuTimeSource>>;
}
