//! Metric registry interface and the in-memory implementation.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::debug;

use jvmbridge_core::MetricIdentifier;
use jvmbridge_introspect::CounterKind;

use crate::gauge::Gauge;

/// Consumer of registered series.
///
/// Registration is append-only and assumed to succeed.
pub trait MetricRegistry: Send + Sync {
    fn register(&self, identifier: MetricIdentifier, gauge: Gauge);

    fn register_all(&self, gauges: Vec<(MetricIdentifier, Gauge)>) {
        for (identifier, gauge) in gauges {
            self.register(identifier, gauge);
        }
    }
}

/// One gauge reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub identifier: MetricIdentifier,
    pub value: f64,
    pub kind: CounterKind,
}

/// Thread-safe in-memory registry, ordered by identifier.
#[derive(Clone, Default)]
pub struct GaugeRegistry {
    gauges: Arc<RwLock<BTreeMap<MetricIdentifier, Gauge>>>,
}

impl GaugeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn contains(&self, identifier: &MetricIdentifier) -> bool {
        self.read().contains_key(identifier)
    }

    /// Invoke one gauge.
    pub fn value(&self, identifier: &MetricIdentifier) -> Option<f64> {
        let gauge = self.read().get(identifier).cloned();
        gauge.map(|g| g.value())
    }

    /// Invoke every gauge once.
    ///
    /// Gauges run outside the registry lock, so a slow gauge never blocks
    /// registration.
    pub fn sample(&self) -> Vec<Sample> {
        let gauges: Vec<(MetricIdentifier, Gauge)> = self
            .read()
            .iter()
            .map(|(id, g)| (id.clone(), g.clone()))
            .collect();

        gauges
            .into_iter()
            .map(|(identifier, gauge)| Sample {
                value: gauge.value(),
                kind: gauge.kind(),
                identifier,
            })
            .collect()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<MetricIdentifier, Gauge>> {
        self.gauges.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl MetricRegistry for GaugeRegistry {
    fn register(&self, identifier: MetricIdentifier, gauge: Gauge) {
        let mut gauges = self.gauges.write().unwrap_or_else(|e| e.into_inner());
        debug!(series = %identifier, "gauge registered");
        gauges.insert(identifier, gauge);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str, unit: &str) -> MetricIdentifier {
        MetricIdentifier::new(name).with_unit(unit)
    }

    #[test]
    fn register_and_sample() {
        let registry = GaugeRegistry::new();
        assert!(registry.is_empty());

        registry.register(id("jvm_threads", "count"), Gauge::new(|| 21.0));
        registry.register(id("jvm_classes", "loadedCount"), Gauge::new(|| 5000.0));

        assert_eq!(registry.len(), 2);
        let samples = registry.sample();
        // Ordered by identifier: jvm_classes before jvm_threads.
        assert_eq!(samples[0].identifier, id("jvm_classes", "loadedCount"));
        assert_eq!(samples[0].value, 5000.0);
        assert_eq!(samples[1].value, 21.0);
    }

    #[test]
    fn register_all_registers_each() {
        let registry = GaugeRegistry::new();
        registry.register_all(vec![
            (id("jvm_threads", "count"), Gauge::new(|| 1.0)),
            (id("jvm_threads", "peakCount"), Gauge::new(|| 2.0)),
        ]);
        assert_eq!(registry.value(&id("jvm_threads", "peakCount")), Some(2.0));
        assert_eq!(registry.value(&id("jvm_threads", "daemonCount")), None);
    }

    #[test]
    fn reregistering_replaces() {
        let registry = GaugeRegistry::new();
        registry.register(id("jvm_threads", "count"), Gauge::new(|| 1.0));
        registry.register(id("jvm_threads", "count"), Gauge::new(|| 2.0));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.value(&id("jvm_threads", "count")), Some(2.0));
    }

    #[test]
    fn clones_share_gauges() {
        let registry = GaugeRegistry::new();
        let handle = registry.clone();
        handle.register(id("jvm_threads", "count"), Gauge::new(|| 3.0));
        assert!(registry.contains(&id("jvm_threads", "count")));
    }

    #[test]
    fn sample_serializes() {
        let sample = Sample {
            identifier: id("jvm_threads", "count"),
            value: 4.0,
            kind: CounterKind::Gauge,
        };
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["identifier"]["base_name"], "jvm_threads");
        assert_eq!(json["value"], 4.0);
        assert_eq!(json["kind"], "gauge");
    }

    #[test]
    fn sample_carries_gauge_kind() {
        let registry = GaugeRegistry::new();
        let gc = MetricIdentifier::new("jvm_gc_count").with_tag("collector", "G1-young");
        registry.register(gc.clone(), Gauge::new(|| 3.0).with_kind(CounterKind::Counter));
        registry.register(id("jvm_threads", "count"), Gauge::new(|| 21.0));

        let samples = registry.sample();
        let kind_of = |identifier: &MetricIdentifier| {
            samples.iter().find(|s| s.identifier == *identifier).map(|s| s.kind)
        };
        assert_eq!(kind_of(&gc), Some(CounterKind::Counter));
        assert_eq!(kind_of(&id("jvm_threads", "count")), Some(CounterKind::Gauge));
    }
}
