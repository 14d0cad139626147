//! Introspection source selection.

use std::sync::Arc;

use anyhow::bail;
use tracing::{info, warn};

use jvmbridge_core::BridgeConfig;
use jvmbridge_introspect::{Introspection, ProcCpuTime, SnapshotFileIntrospection};

/// Build the introspection source described by `config`.
///
/// A configured pid whose CPU time cannot be read is not fatal: the
/// snapshot's own `cpu` section (if any) is used instead.
pub fn from_config(config: &BridgeConfig) -> anyhow::Result<Arc<dyn Introspection>> {
    let Some(path) = &config.source.snapshot_path else {
        bail!("no counter source configured: set [source].snapshot_path, pass --snapshot, or use --demo");
    };

    let mut source = SnapshotFileIntrospection::new(path);
    if let Some(pid) = config.source.pid {
        match ProcCpuTime::new(pid) {
            Ok(cpu) => {
                info!(pid, "sampling process cpu time from procfs");
                source = source.with_cpu_source(Arc::new(cpu));
            }
            Err(e) => warn!(pid, error = %e, "procfs cpu time unavailable"),
        }
    }
    info!(path = ?source.path(), "reading counters from snapshot file");
    Ok(Arc::new(source))
}
