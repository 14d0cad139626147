//! In-memory introspection source.
//!
//! Holds counter values that callers set explicitly. Used by tests and by
//! the daemon's demo mode. Clones share the same underlying values.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use jvmbridge_core::{BridgeError, BridgeResult, CounterCategory};

use crate::types::*;

#[derive(Default)]
struct Values {
    counters: BTreeMap<CounterCategory, BTreeMap<String, RawCounter>>,
    threads: ThreadCounts,
    classes: ClassLoadingCounts,
    cpu: Option<CpuSample>,
    cpu_supported: bool,
    failing: bool,
}

/// Settable, shareable introspection source.
#[derive(Clone, Default)]
pub struct StaticIntrospection {
    values: Arc<RwLock<Values>>,
}

impl StaticIntrospection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the CPU-time source, starting from `sample`.
    pub fn with_cpu(self, sample: CpuSample) -> Self {
        {
            let mut values = self.write();
            values.cpu_supported = true;
            values.cpu = Some(sample);
        }
        self
    }

    pub fn set_counter(&self, category: CounterCategory, counter: RawCounter) {
        self.write()
            .counters
            .entry(category)
            .or_default()
            .insert(counter.key.clone(), counter);
    }

    pub fn remove_counter(&self, category: CounterCategory, key: &str) {
        if let Some(counters) = self.write().counters.get_mut(&category) {
            counters.remove(key);
        }
    }

    pub fn set_threads(&self, threads: ThreadCounts) {
        self.write().threads = threads;
    }

    pub fn set_classes(&self, classes: ClassLoadingCounts) {
        self.write().classes = classes;
    }

    pub fn set_cpu(&self, sample: CpuSample) {
        self.write().cpu = Some(sample);
    }

    /// Make every read fail with a transient error until cleared.
    pub fn set_failing(&self, failing: bool) {
        self.write().failing = failing;
    }

    fn read(&self) -> RwLockReadGuard<'_, Values> {
        self.values.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Values> {
        self.values.write().unwrap_or_else(|e| e.into_inner())
    }

    fn check(&self, what: &str) -> BridgeResult<RwLockReadGuard<'_, Values>> {
        let values = self.read();
        if values.failing {
            return Err(BridgeError::TransientSample(format!("{what} unavailable")));
        }
        Ok(values)
    }
}

impl Introspection for StaticIntrospection {
    fn raw_counters(&self, category: CounterCategory) -> BridgeResult<Vec<RawCounter>> {
        let values = self.check("raw counters")?;
        Ok(values
            .counters
            .get(&category)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default())
    }

    fn thread_counts(&self) -> BridgeResult<ThreadCounts> {
        Ok(self.check("thread counts")?.threads)
    }

    fn class_loading(&self) -> BridgeResult<ClassLoadingCounts> {
        Ok(self.check("class loading")?.classes)
    }

    fn cpu_time_source(&self) -> Option<Arc<dyn CpuTimeSource>> {
        if self.read().cpu_supported {
            Some(Arc::new(self.clone()))
        } else {
            None
        }
    }
}

impl CpuTimeSource for StaticIntrospection {
    fn sample(&self) -> BridgeResult<CpuSample> {
        self.check("cpu time")?
            .cpu
            .ok_or_else(|| BridgeError::TransientSample("cpu time not set".into()))
    }
}
