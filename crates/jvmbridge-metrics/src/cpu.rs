//! Process CPU utilisation from two cumulative counters.
//!
//! Each read compares a fresh [`CpuSample`] against the sample taken by the
//! previous read, never against an older baseline, so a reading reflects
//! the interval since the last scrape only.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use jvmbridge_core::{BridgeError, BridgeResult};
use jvmbridge_introspect::{CpuSample, CpuTimeSource, Introspection};

use crate::gauge::Gauge;

/// Derives a utilisation fraction in `[0.0, 1.0]` from busy and wall time.
///
/// `read` mutates the baseline and is not internally synchronized; callers
/// sharing a sampler must serialize access (see [`CpuSampler::into_gauge`]).
pub struct CpuSampler {
    source: Arc<dyn CpuTimeSource>,
    previous: CpuSample,
    last_value: f64,
}

impl CpuSampler {
    /// Arm a sampler against `source`.
    ///
    /// Fails with [`BridgeError::Unsupported`] when no initial sample can be
    /// taken; the caller should then skip the CPU gauge altogether.
    pub fn new(source: Arc<dyn CpuTimeSource>) -> BridgeResult<Self> {
        let previous = source
            .sample()
            .map_err(|e| BridgeError::Unsupported(format!("process cpu time: {e}")))?;
        debug!(?previous, "cpu sampler armed");
        Ok(Self {
            source,
            previous,
            last_value: 0.0,
        })
    }

    /// Resolve the CPU-time source from an introspection subsystem.
    pub fn from_introspection(introspection: &dyn Introspection) -> BridgeResult<Self> {
        let source = introspection.cpu_time_source().ok_or_else(|| {
            BridgeError::Unsupported("process cpu time source not available".into())
        })?;
        Self::new(source)
    }

    /// Record `sample` as the baseline for the next read.
    pub fn arm(&mut self, sample: CpuSample) {
        self.previous = sample;
    }

    /// Take a fresh baseline from the source.
    pub fn start(&mut self) -> BridgeResult<()> {
        let sample = self.source.sample()?;
        self.arm(sample);
        Ok(())
    }

    /// Utilisation since the previous read, then re-arm.
    ///
    /// A transient source failure returns the last value and keeps the old
    /// baseline.
    pub fn read(&mut self) -> f64 {
        match self.source.sample() {
            Ok(current) => self.read_sample(current),
            Err(e) => {
                warn!(error = %e, last = self.last_value, "cpu sample failed, reporting last value");
                self.last_value
            }
        }
    }

    fn read_sample(&mut self, current: CpuSample) -> f64 {
        let delta_busy = i128::from(current.process_busy_time_nanos)
            - i128::from(self.previous.process_busy_time_nanos);
        let delta_wall = i128::from(current.wall_clock_time_nanos)
            - i128::from(self.previous.wall_clock_time_nanos);

        if delta_wall > 0 {
            self.last_value = (delta_busy as f64 / delta_wall as f64).clamp(0.0, 1.0);
        }
        self.arm(current);
        self.last_value
    }

    /// The current baseline.
    pub fn previous(&self) -> CpuSample {
        self.previous
    }

    /// Wrap the sampler in a gauge reporting a percentage (0–100).
    ///
    /// A single lock is held across each read-and-rearm.
    pub fn into_gauge(self) -> Gauge {
        let sampler = Mutex::new(self);
        Gauge::new(move || {
            let mut sampler = sampler.lock().unwrap_or_else(|e| e.into_inner());
            sampler.read() * 100.0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jvmbridge_introspect::StaticIntrospection;

    fn armed(busy: u64, wall: u64) -> (StaticIntrospection, CpuSampler) {
        let source = StaticIntrospection::new().with_cpu(CpuSample::new(busy, wall));
        let sampler = CpuSampler::from_introspection(&source).unwrap();
        (source, sampler)
    }

    #[test]
    fn half_busy() {
        let (source, mut sampler) = armed(0, 0);
        source.set_cpu(CpuSample::new(50, 100));
        assert_eq!(sampler.read(), 0.5);
    }

    #[test]
    fn first_read_without_wall_delta_is_zero() {
        let (_source, mut sampler) = armed(10, 100);
        assert_eq!(sampler.read(), 0.0);
    }

    #[test]
    fn zero_wall_delta_repeats_previous_value() {
        let (source, mut sampler) = armed(0, 0);
        source.set_cpu(CpuSample::new(25, 100));
        assert_eq!(sampler.read(), 0.25);

        source.set_cpu(CpuSample::new(90, 100));
        assert_eq!(sampler.read(), 0.25);
    }

    #[test]
    fn read_rearms_with_current_sample() {
        let (source, mut sampler) = armed(0, 0);
        source.set_cpu(CpuSample::new(50, 100));
        sampler.read();
        assert_eq!(sampler.previous(), CpuSample::new(50, 100));

        // Against the new baseline: 30 busy over 200 wall.
        source.set_cpu(CpuSample::new(80, 300));
        assert_eq!(sampler.read(), 0.15);
        assert_eq!(sampler.previous(), CpuSample::new(80, 300));
    }

    #[test]
    fn result_is_clamped() {
        let (source, mut sampler) = armed(1000, 0);
        // Busy counter went backwards (rollover).
        source.set_cpu(CpuSample::new(10, 100));
        assert_eq!(sampler.read(), 0.0);

        // More busy time than wall time.
        source.set_cpu(CpuSample::new(500, 200));
        assert_eq!(sampler.read(), 1.0);
    }

    #[test]
    fn decreasing_wall_clock_keeps_previous_value() {
        let (source, mut sampler) = armed(0, 0);
        source.set_cpu(CpuSample::new(40, 100));
        assert_eq!(sampler.read(), 0.4);

        source.set_cpu(CpuSample::new(60, 50));
        assert_eq!(sampler.read(), 0.4);
        assert_eq!(sampler.previous(), CpuSample::new(60, 50));
    }

    #[test]
    fn transient_failure_returns_last_value_and_keeps_baseline() {
        let (source, mut sampler) = armed(0, 0);
        source.set_cpu(CpuSample::new(20, 100));
        assert_eq!(sampler.read(), 0.2);

        source.set_failing(true);
        assert_eq!(sampler.read(), 0.2);
        assert_eq!(sampler.previous(), CpuSample::new(20, 100));

        source.set_failing(false);
        source.set_cpu(CpuSample::new(120, 300));
        assert_eq!(sampler.read(), 0.5);
    }

    #[test]
    fn start_takes_fresh_baseline() {
        let (source, mut sampler) = armed(0, 0);
        source.set_cpu(CpuSample::new(70, 100));
        sampler.start().unwrap();
        assert_eq!(sampler.previous(), CpuSample::new(70, 100));

        sampler.arm(CpuSample::new(0, 0));
        assert_eq!(sampler.read(), 0.7);
    }

    #[test]
    fn missing_source_is_unsupported() {
        let err = CpuSampler::from_introspection(&StaticIntrospection::new())
            .err()
            .unwrap();
        assert!(matches!(err, BridgeError::Unsupported(_)), "{err}");
    }

    #[test]
    fn failing_initial_sample_is_unsupported() {
        let source = StaticIntrospection::new().with_cpu(CpuSample::new(0, 0));
        source.set_failing(true);
        let err = CpuSampler::from_introspection(&source).err().unwrap();
        assert!(matches!(err, BridgeError::Unsupported(_)), "{err}");
    }

    #[test]
    fn gauge_reports_percentage() {
        let (source, sampler) = armed(0, 0);
        let gauge = sampler.into_gauge();
        source.set_cpu(CpuSample::new(25, 100));
        assert_eq!(gauge.value(), 25.0);
        // No time passed since the last read.
        assert_eq!(gauge.value(), 25.0);
    }
}
