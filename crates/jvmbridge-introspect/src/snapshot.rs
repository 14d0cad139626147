//! JSON snapshot file source.
//!
//! A runtime-side agent periodically rewrites a small JSON document with
//! its counters:
//!
//! ```json
//! {
//!   "gc": { "G1-young.count": 3, "G1-young.time": 120 },
//!   "memory": { "heap.used": 1048576, "pools.Metaspace.used": 52000 },
//!   "buffer_pools": { "direct.count": 4 },
//!   "threads": { "count": 21, "peak_count": 23, "total_started_count": 40, "daemon_count": 17 },
//!   "classes": { "loaded_count": 5000, "total_loaded_count": 5100, "unloaded_count": 100 },
//!   "cpu": { "process_busy_time_nanos": 1200000000, "wall_clock_time_nanos": 9000000000 }
//! }
//! ```
//!
//! The file is re-read on every query but only re-parsed when its bytes
//! differ from the previous read, so one scrape over many series costs one
//! parse. Any read or parse failure surfaces as
//! [`BridgeError::TransientSample`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::debug;

use jvmbridge_core::{BridgeError, BridgeResult, CounterCategory};

use crate::types::*;

/// On-disk layout of a counter snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterSnapshot {
    pub gc: BTreeMap<String, f64>,
    pub memory: BTreeMap<String, f64>,
    pub buffer_pools: BTreeMap<String, f64>,
    pub threads: ThreadCounts,
    pub classes: ClassLoadingCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<CpuSample>,
}

impl CounterSnapshot {
    fn category(&self, category: CounterCategory) -> &BTreeMap<String, f64> {
        match category {
            CounterCategory::GarbageCollector => &self.gc,
            CounterCategory::Memory => &self.memory,
            CounterCategory::BufferPool => &self.buffer_pools,
        }
    }

    fn kind_of(category: CounterCategory) -> CounterKind {
        match category {
            CounterCategory::GarbageCollector => CounterKind::Counter,
            CounterCategory::Memory | CounterCategory::BufferPool => CounterKind::Gauge,
        }
    }
}

/// Last file contents and their parse.
type ParsedSnapshot = (String, Arc<CounterSnapshot>);

/// Reads counters from a JSON snapshot file.
///
/// Clones share the parse cache.
#[derive(Clone)]
pub struct SnapshotFileIntrospection {
    path: PathBuf,
    cpu_override: Option<Arc<dyn CpuTimeSource>>,
    parsed: Arc<Mutex<Option<ParsedSnapshot>>>,
}

impl SnapshotFileIntrospection {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cpu_override: None,
            parsed: Arc::default(),
        }
    }

    /// Take CPU time from another source (e.g. [`crate::ProcCpuTime`])
    /// instead of the snapshot's `cpu` section.
    pub fn with_cpu_source(mut self, source: Arc<dyn CpuTimeSource>) -> Self {
        self.cpu_override = Some(source);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot file, parsing it if it changed since the last read.
    pub fn load(&self) -> BridgeResult<Arc<CounterSnapshot>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            BridgeError::TransientSample(format!("reading {}: {e}", self.path.display()))
        })?;

        let mut parsed = self.parsed.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((previous, snapshot)) = parsed.as_ref() {
            if *previous == content {
                return Ok(Arc::clone(snapshot));
            }
        }

        let snapshot: CounterSnapshot = serde_json::from_str(&content).map_err(|e| {
            BridgeError::TransientSample(format!("parsing {}: {e}", self.path.display()))
        })?;
        debug!(path = ?self.path, "snapshot parsed");
        let snapshot = Arc::new(snapshot);
        *parsed = Some((content, Arc::clone(&snapshot)));
        Ok(snapshot)
    }
}

impl Introspection for SnapshotFileIntrospection {
    fn raw_counters(&self, category: CounterCategory) -> BridgeResult<Vec<RawCounter>> {
        let snapshot = self.load()?;
        let kind = CounterSnapshot::kind_of(category);
        Ok(snapshot
            .category(category)
            .iter()
            .map(|(key, value)| RawCounter {
                key: key.clone(),
                value: *value,
                kind,
            })
            .collect())
    }

    fn read_counter(&self, category: CounterCategory, key: &str) -> BridgeResult<f64> {
        self.load()?
            .category(category)
            .get(key)
            .copied()
            .ok_or_else(|| BridgeError::TransientSample(format!("{category} counter `{key}` not in snapshot")))
    }

    fn thread_counts(&self) -> BridgeResult<ThreadCounts> {
        Ok(self.load()?.threads)
    }

    fn class_loading(&self) -> BridgeResult<ClassLoadingCounts> {
        Ok(self.load()?.classes)
    }

    fn cpu_time_source(&self) -> Option<Arc<dyn CpuTimeSource>> {
        if let Some(source) = &self.cpu_override {
            return Some(Arc::clone(source));
        }
        match self.load() {
            Ok(snapshot) if snapshot.cpu.is_some() => Some(Arc::new(SnapshotCpuTime {
                snapshot: self.clone(),
            })),
            Ok(_) => {
                debug!(path = ?self.path, "snapshot has no cpu section");
                None
            }
            Err(e) => {
                debug!(error = %e, "snapshot unreadable while resolving cpu source");
                None
            }
        }
    }
}

/// CPU time taken from the snapshot's `cpu` section.
struct SnapshotCpuTime {
    snapshot: SnapshotFileIntrospection,
}

impl CpuTimeSource for SnapshotCpuTime {
    fn sample(&self) -> BridgeResult<CpuSample> {
        self.snapshot
            .load()?
            .cpu
            .ok_or_else(|| BridgeError::TransientSample("snapshot has no cpu section".into()))
    }
}
