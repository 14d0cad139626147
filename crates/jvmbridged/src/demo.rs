//! Synthetic counters for `--demo`.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use jvmbridge_core::CounterCategory;
use jvmbridge_introspect::{
    ClassLoadingCounts, CpuSample, RawCounter, StaticIntrospection, ThreadCounts,
};

const MIB: f64 = 1024.0 * 1024.0;

/// A source pre-filled with a plausible runtime, one tick in.
pub fn seeded() -> StaticIntrospection {
    let source = StaticIntrospection::new().with_cpu(CpuSample::new(0, 0));
    tick(&source, 1);
    source
}

/// Advance the synthetic runtime to step `n`.
pub fn tick(source: &StaticIntrospection, n: u64) {
    let n_f = n as f64;
    let gc = CounterCategory::GarbageCollector;
    source.set_counter(gc, RawCounter::counter("G1-Young-Generation.count", n_f * 3.0));
    source.set_counter(gc, RawCounter::counter("G1-Young-Generation.time", n_f * 41.0));
    source.set_counter(gc, RawCounter::counter("G1-Old-Generation.count", (n / 10) as f64));
    source.set_counter(gc, RawCounter::counter("G1-Old-Generation.time", (n / 10) as f64 * 250.0));

    let heap_used = 96.0 * MIB + (n % 32) as f64 * 4.0 * MIB;
    let mem = CounterCategory::Memory;
    source.set_counter(mem, RawCounter::gauge("heap.used", heap_used));
    source.set_counter(mem, RawCounter::gauge("heap.committed", 256.0 * MIB));
    source.set_counter(mem, RawCounter::gauge("heap.max", 1024.0 * MIB));
    source.set_counter(mem, RawCounter::gauge("non-heap.used", 48.0 * MIB));
    source.set_counter(mem, RawCounter::gauge("non-heap.committed", 64.0 * MIB));
    source.set_counter(mem, RawCounter::gauge("pools.G1-Eden-Space.used", heap_used * 0.6));
    source.set_counter(mem, RawCounter::gauge("pools.G1-Old-Gen.used", heap_used * 0.4));
    source.set_counter(mem, RawCounter::gauge("pools.Metaspace.used", 40.0 * MIB));

    let buffers = CounterCategory::BufferPool;
    source.set_counter(buffers, RawCounter::gauge("direct.count", 12.0));
    source.set_counter(buffers, RawCounter::gauge("direct.capacity", 8.0 * MIB));
    source.set_counter(buffers, RawCounter::gauge("mapped.count", 0.0));

    source.set_threads(ThreadCounts {
        count: 24 + n % 5,
        peak_count: 30,
        total_started_count: 40 + n,
        daemon_count: 18,
    });
    source.set_classes(ClassLoadingCounts {
        loaded_count: 6200,
        total_loaded_count: 6200 + n,
        unloaded_count: n,
    });

    // Busy for a third of each one-second step.
    source.set_cpu(CpuSample::new(n * 333_333_333, n * 1_000_000_000));
}

/// Tick the synthetic runtime every `period` until shutdown.
pub async fn run(
    source: StaticIntrospection,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(period_ms = period.as_millis() as u64, "demo counters running");
    let mut step = 1;
    loop {
        tokio::select! {
            _ = tokio::time::sleep(period) => {
                step += 1;
                tick(&source, step);
                debug!(step, "demo counters advanced");
            }
            _ = shutdown.changed() => {
                info!("demo counters stopping");
                break;
            }
        }
    }
}
