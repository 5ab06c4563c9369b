/// Cluster metadata provider: where versions, clusters and their state come from.
pub mod conf;
pub mod fs;
pub mod layout;
#[cfg(test)]
pub mod memory;
pub mod users;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::cluster::{ClusterError, Version};

pub use fs::FsProvider;
pub use layout::Layout;

/// Everything known about one cluster, as reported by a provider.
///
/// Field names double as the JSON keys of `--json` output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClusterInfo {
    /// Whether a server process is serving the cluster.
    pub running: bool,
    /// Whether the running server is a standby / in recovery.
    pub recovery: bool,
    /// Startup mode from `start.conf` (`auto`, `manual`, `disabled`).
    pub start: Option<String>,
    /// Configured TCP port, or null if it could not be determined.
    pub port: Option<u16>,
    /// Numeric owner of the data directory.
    pub owneruid: Option<u32>,
    /// Numeric group of the data directory.
    pub ownergid: Option<u32>,
    /// Data directory.
    pub pgdata: Option<PathBuf>,
    /// Server log file used when the logging collector is off.
    pub logfile: Option<String>,
    /// Unix socket directory.
    pub socketdir: Option<PathBuf>,
    /// Directory holding `postgresql.conf` and friends.
    pub configdir: Option<PathBuf>,
    /// Parsed configuration settings, names lowercased.
    pub config: BTreeMap<String, String>,
}

/// Source of installed versions, clusters and per-cluster metadata.
pub trait ClusterProvider {
    /// All versions that have clusters or installed binaries.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError` if the installation cannot be inspected.
    fn versions(&self) -> Result<Vec<Version>, ClusterError>;

    /// Names of the clusters configured for `version`.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError` if the version's configuration cannot be inspected.
    fn clusters(&self, version: &Version) -> Result<Vec<String>, ClusterError>;

    /// Whether `name` is a configured cluster of `version`.
    fn cluster_exists(&self, version: &Version, name: &str) -> bool;

    /// Full metadata for one cluster.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError` on unreadable or malformed configuration.
    fn cluster_info(&self, version: &Version, name: &str) -> Result<ClusterInfo, ClusterError>;

    /// Resolve a numeric user id to a login name.
    fn user_name(&self, uid: u32) -> Option<String> {
        users::user_name(uid)
    }
}
