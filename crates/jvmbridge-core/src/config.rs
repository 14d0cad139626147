//! jvmbridge.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

pub const DEFAULT_LISTEN: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 9404);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub exporter: ExporterConfig,
    pub source: SourceConfig,
    pub collect: CollectToggles,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    pub listen: SocketAddr,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// JSON counter snapshot written by the runtime-side agent.
    pub snapshot_path: Option<PathBuf>,
    /// Process to sample CPU time from via /proc.
    pub pid: Option<u32>,
}

/// Which counter groups get registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectToggles {
    pub gc: bool,
    pub memory: bool,
    pub buffer_pools: bool,
    pub threads: bool,
    pub classes: bool,
    pub cpu: bool,
}

impl Default for CollectToggles {
    fn default() -> Self {
        Self {
            gc: true,
            memory: true,
            buffer_pools: true,
            threads: true,
            classes: true,
            cpu: true,
        }
    }
}

impl BridgeConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: BridgeConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
