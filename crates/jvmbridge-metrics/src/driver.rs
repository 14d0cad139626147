//! One-time wiring of runtime counters into a registry.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use jvmbridge_core::config::CollectToggles;
use jvmbridge_core::{BridgeError, CounterCategory, MetricIdentifier};
use jvmbridge_introspect::{ClassLoadingCounts, Introspection, ThreadCounts};

use crate::cpu::CpuSampler;
use crate::gauge::Gauge;
use crate::registry::MetricRegistry;

pub const THREADS_METRIC: &str = "jvm_threads";
pub const CLASSES_METRIC: &str = "jvm_classes";
pub const CPU_METRIC: &str = "jvm_process_cpu_usage";

/// What a registration pass did.
#[derive(Debug, Default)]
pub struct RegistrationReport {
    /// Every series handed to the registry, in registration order.
    pub registered: Vec<MetricIdentifier>,
    /// Series or features that were skipped, with the reason.
    pub skipped: Vec<BridgeError>,
    pub cpu_registered: bool,
}

impl RegistrationReport {
    fn push(&mut self, registry: &dyn MetricRegistry, identifier: MetricIdentifier, gauge: Gauge) {
        registry.register(identifier.clone(), gauge);
        self.registered.push(identifier);
    }
}

/// Register every runtime series with all collection groups enabled.
pub fn register_runtime_metrics(
    registry: &dyn MetricRegistry,
    introspection: Arc<dyn Introspection>,
) -> RegistrationReport {
    register_runtime_metrics_with(registry, introspection, CollectToggles::default())
}

/// Register the runtime series selected by `toggles`.
///
/// Never fails: malformed counters and missing features are logged, listed
/// in the report, and skipped. Intended to run once per process.
pub fn register_runtime_metrics_with(
    registry: &dyn MetricRegistry,
    introspection: Arc<dyn Introspection>,
    toggles: CollectToggles,
) -> RegistrationReport {
    let mut report = RegistrationReport::default();

    for category in CounterCategory::ALL {
        let enabled = match category {
            CounterCategory::GarbageCollector => toggles.gc,
            CounterCategory::Memory => toggles.memory,
            CounterCategory::BufferPool => toggles.buffer_pools,
        };
        if enabled {
            register_category(registry, &introspection, category, &mut report);
        } else {
            debug!(%category, "counter category disabled");
        }
    }

    if toggles.threads {
        register_threads(registry, &introspection, &mut report);
    }
    if toggles.classes {
        register_classes(registry, &introspection, &mut report);
    }
    if toggles.cpu {
        register_cpu(registry, introspection.as_ref(), &mut report);
    }

    info!(
        registered = report.registered.len(),
        skipped = report.skipped.len(),
        cpu = report.cpu_registered,
        "runtime metrics registered"
    );
    report
}

fn register_category(
    registry: &dyn MetricRegistry,
    introspection: &Arc<dyn Introspection>,
    category: CounterCategory,
    report: &mut RegistrationReport,
) {
    let counters = match introspection.raw_counters(category) {
        Ok(counters) => counters,
        Err(e) => {
            warn!(%category, error = %e, "cannot enumerate counters, skipping category");
            report.skipped.push(e);
            return;
        }
    };

    let mut seen = HashSet::new();
    for counter in counters {
        let identifier = match category.map_name(&counter.key) {
            Ok(identifier) => identifier,
            Err(e) => {
                warn!(%category, key = %counter.key, error = %e, "skipping unmappable counter");
                report.skipped.push(e);
                continue;
            }
        };
        if !seen.insert(identifier.clone()) {
            warn!(%category, key = %counter.key, series = %identifier, "counter maps onto an already registered series, skipping");
            continue;
        }

        let source = Arc::clone(introspection);
        let kind = counter.kind;
        let key = counter.key;
        let gauge = Gauge::fallible(identifier.to_string(), move || {
            source.read_counter(category, &key)
        })
        .with_kind(kind);
        report.push(registry, identifier, gauge);
    }
}

fn register_threads(
    registry: &dyn MetricRegistry,
    introspection: &Arc<dyn Introspection>,
    report: &mut RegistrationReport,
) {
    let fields: [(&str, fn(&ThreadCounts) -> u64); 4] = [
        ("count", |t| t.count),
        ("peakCount", |t| t.peak_count),
        ("totalStartedCount", |t| t.total_started_count),
        ("daemonCount", |t| t.daemon_count),
    ];
    for (unit, field) in fields {
        let identifier = MetricIdentifier::new(THREADS_METRIC).with_unit(unit);
        let source = Arc::clone(introspection);
        let gauge = Gauge::fallible(identifier.to_string(), move || {
            source.thread_counts().map(|t| field(&t) as f64)
        });
        report.push(registry, identifier, gauge);
    }
}

fn register_classes(
    registry: &dyn MetricRegistry,
    introspection: &Arc<dyn Introspection>,
    report: &mut RegistrationReport,
) {
    let fields: [(&str, fn(&ClassLoadingCounts) -> u64); 3] = [
        ("loadedCount", |c| c.loaded_count),
        ("totalLoadedCount", |c| c.total_loaded_count),
        ("unloadedCount", |c| c.unloaded_count),
    ];
    for (unit, field) in fields {
        let identifier = MetricIdentifier::new(CLASSES_METRIC).with_unit(unit);
        let source = Arc::clone(introspection);
        let gauge = Gauge::fallible(identifier.to_string(), move || {
            source.class_loading().map(|c| field(&c) as f64)
        });
        report.push(registry, identifier, gauge);
    }
}

fn register_cpu(
    registry: &dyn MetricRegistry,
    introspection: &dyn Introspection,
    report: &mut RegistrationReport,
) {
    match CpuSampler::from_introspection(introspection) {
        Ok(sampler) => {
            report.push(registry, MetricIdentifier::new(CPU_METRIC), sampler.into_gauge());
            report.cpu_registered = true;
        }
        Err(e) => {
            warn!(error = %e, "process cpu usage will not be reported");
            report.skipped.push(e);
        }
    }
}
