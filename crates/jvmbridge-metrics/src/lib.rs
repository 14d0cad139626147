//! jvmbridge-metrics — runtime counters as tagged gauges.
//!
//! Maps raw runtime counters onto normalized series, registers them as
//! gauges, derives process CPU utilisation, and renders everything in
//! Prometheus text exposition format.
//!
//! # Architecture
//!
//! ```text
//! register_runtime_metrics(registry, introspection)
//!   ├── CounterCategory::map_name() per raw counter → Gauge
//!   ├── jvm_threads / jvm_classes passthrough gauges
//!   └── CpuSampler → jvm_process_cpu_usage (optional)
//!
//! GaugeRegistry
//!   └── sample() → Vec<Sample> → render_prometheus()
//! ```

pub mod cpu;
pub mod driver;
pub mod gauge;
pub mod prometheus;
pub mod registry;

pub use cpu::CpuSampler;
pub use driver::{RegistrationReport, register_runtime_metrics, register_runtime_metrics_with};
pub use gauge::Gauge;
pub use prometheus::render_prometheus;
pub use registry::{GaugeRegistry, MetricRegistry, Sample};
