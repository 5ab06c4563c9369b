/// Shared output types.
///
/// These are what gets written to stdout, either rendered as a text table or
/// serialized as JSON. They are decoupled from the provider's `ClusterInfo`
/// lookups.
use serde::Serialize;

use crate::cluster::{ClusterError, Version};
use crate::provider::ClusterInfo;

/// Column titles of the text table, in display order.
pub const HEADER: [&str; 7] = [
    "Ver",
    "Cluster",
    "Port",
    "Status",
    "Owner",
    "Data directory",
    "Log file",
];

/// One line of the text table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterRow {
    pub version: String,
    pub cluster: String,
    /// Port number or `unknown`.
    pub port: String,
    /// e.g. `online,recovery`.
    pub status: String,
    /// Owner login name, numeric uid, or `unknown`.
    pub owner: String,
    pub data_directory: String,
    /// Log destination with files substituted in.
    pub log_file: String,
}

impl ClusterRow {
    /// Cells in column order.
    #[must_use]
    pub fn cells(&self) -> [&str; 7] {
        [
            self.version.as_str(),
            self.cluster.as_str(),
            self.port.as_str(),
            self.status.as_str(),
            self.owner.as_str(),
            self.data_directory.as_str(),
            self.log_file.as_str(),
        ]
    }
}

/// One element of the `--json` array: the provider's record plus identity keys.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterRecord {
    pub version: Version,
    pub cluster: String,
    #[serde(flatten)]
    pub info: ClusterInfo,
}

/// A structured error envelope for JSON error output.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
    /// Always `false`.
    pub ok: bool,
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail in the JSON error envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (`snake_case`).
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorOutput {
    /// Construct from a `ClusterError`.
    #[must_use]
    pub fn from_cluster_error(err: &ClusterError) -> Self {
        Self {
            ok: false,
            error: ErrorDetail {
                code: err.code().to_owned(),
                message: err.to_string(),
            },
        }
    }
}
