//! jvmbridge-core — shared types for the runtime metrics bridge.
//!
//! Turns dotted raw counter names (`G1-young.count`,
//! `pools.G1-Eden-Space.used`, `direct.capacity`) into tag-structured
//! [`MetricIdentifier`]s, and carries the error taxonomy and the TOML
//! configuration used by the rest of the workspace.

pub mod config;
pub mod error;
pub mod identifier;
pub mod naming;

pub use config::BridgeConfig;
pub use error::{BridgeError, BridgeResult};
pub use identifier::MetricIdentifier;
pub use naming::CounterCategory;
