//! Command-line arguments and config resolution.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use jvmbridge_core::BridgeConfig;

#[derive(Parser)]
#[command(
    name = "jvmbridged",
    about = "Serve runtime counters as Prometheus metrics",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Register runtime metrics and serve them over HTTP.
    Serve {
        #[command(flatten)]
        source: SourceArgs,

        /// Address to listen on (overrides [exporter].listen).
        #[arg(long)]
        listen: Option<SocketAddr>,
    },
    /// Register runtime metrics, print one exposition to stdout, and exit.
    Render {
        #[command(flatten)]
        source: SourceArgs,

        /// Milliseconds to wait before sampling; process CPU usage is
        /// measured over this window.
        #[arg(long, default_value_t = 1000)]
        window_ms: u64,
    },
}

/// Where counters come from.
#[derive(Args, Debug, Default)]
pub struct SourceArgs {
    /// Path to jvmbridge.toml.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON counter snapshot (overrides [source].snapshot_path).
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Process to sample CPU time from (overrides [source].pid).
    #[arg(long)]
    pub pid: Option<u32>,

    /// Serve synthetic counters instead of a real source.
    #[arg(long)]
    pub demo: bool,
}

impl SourceArgs {
    /// Load the config file (or defaults) and apply flag overrides.
    pub fn resolve(&self) -> anyhow::Result<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::from_file(path)?,
            None => BridgeConfig::default(),
        };
        if let Some(snapshot) = &self.snapshot {
            config.source.snapshot_path = Some(snapshot.clone());
        }
        if let Some(pid) = self.pid {
            config.source.pid = Some(pid);
        }
        Ok(config)
    }
}
