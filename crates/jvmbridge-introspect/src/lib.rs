//! jvmbridge-introspect — where raw runtime counters come from.
//!
//! The bridge never caches counter values: every gauge invocation goes back
//! to an [`Introspection`] source. Three sources ship here:
//!
//! ```text
//! Introspection
//!   ├── StaticIntrospection        in-memory, settable (tests, demo mode)
//!   ├── SnapshotFileIntrospection  JSON file rewritten by a runtime-side agent
//!   └── cpu_time_source()
//!         └── ProcCpuTime          /proc/<pid>/stat busy time (Linux)
//! ```

pub mod procfs;
pub mod snapshot;
pub mod static_source;
pub mod types;

pub use procfs::ProcCpuTime;
pub use snapshot::{CounterSnapshot, SnapshotFileIntrospection};
pub use static_source::StaticIntrospection;
pub use types::*;
