//! Gauges — zero-argument value producers invoked by the registry.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

use jvmbridge_core::BridgeResult;
use jvmbridge_introspect::CounterKind;

/// A value producer registered once and invoked at the registry's cadence.
///
/// Cloning a gauge shares the same compute function. The kind says whether
/// the produced value is a point-in-time reading or a running total.
#[derive(Clone)]
pub struct Gauge {
    compute: Arc<dyn Fn() -> f64 + Send + Sync>,
    kind: CounterKind,
}

impl Gauge {
    pub fn new(compute: impl Fn() -> f64 + Send + Sync + 'static) -> Self {
        Self {
            compute: Arc::new(compute),
            kind: CounterKind::Gauge,
        }
    }

    pub fn with_kind(mut self, kind: CounterKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn kind(&self) -> CounterKind {
        self.kind
    }

    /// Wrap a fallible read so that the gauge itself never fails.
    ///
    /// On error the last successfully read value is returned (0.0 before
    /// the first success) and a warning naming `series` is logged.
    pub fn fallible(
        series: impl Into<String>,
        read: impl Fn() -> BridgeResult<f64> + Send + Sync + 'static,
    ) -> Self {
        let series = series.into();
        let last = AtomicU64::new(0f64.to_bits());
        Self::new(move || match read() {
            Ok(value) => {
                last.store(value.to_bits(), Ordering::Relaxed);
                value
            }
            Err(e) => {
                let stale = f64::from_bits(last.load(Ordering::Relaxed));
                warn!(%series, error = %e, stale, "gauge read failed, reporting last value");
                stale
            }
        })
    }

    /// Invoke the compute function.
    pub fn value(&self) -> f64 {
        (self.compute)()
    }
}

impl fmt::Debug for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gauge")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
