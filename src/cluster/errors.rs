/// Errors from cluster selection, metadata lookup and rendering.
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while listing clusters.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// The version argument is not a number like `13` or `9.6`.
    #[error("invalid version number '{0}'")]
    InvalidVersion(String),

    /// The cluster argument contains characters outside `[A-Za-z0-9._-]`.
    #[error("invalid cluster name '{0}'")]
    InvalidClusterName(String),

    /// The requested cluster has no configuration under the version.
    #[error("cluster {version} {cluster} does not exist")]
    ClusterNotFound {
        /// Requested version.
        version: String,
        /// Requested cluster name.
        cluster: String,
    },

    /// `start.conf` holds something other than `auto`, `manual` or `disabled`.
    #[error("{} does not contain a valid startup mode", path.display())]
    InvalidStartConf {
        /// Path of the offending `start.conf`.
        path: PathBuf,
    },

    /// A configuration file could not be parsed or an include could not be followed.
    #[error("{}: {message}", path.display())]
    Config {
        /// File in which the problem was found.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// Filesystem access failed.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the report to stdout failed.
    #[error("cannot write output: {0}")]
    Output(#[source] std::io::Error),

    /// The collected records could not be encoded as JSON.
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClusterError {
    /// Wrap an I/O error with the path that produced it.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Machine-readable error code (`snake_case`) for the JSON error envelope.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidVersion(_) => "invalid_version",
            Self::InvalidClusterName(_) => "invalid_cluster_name",
            Self::ClusterNotFound { .. } => "cluster_not_found",
            Self::InvalidStartConf { .. } => "invalid_start_conf",
            Self::Config { .. } => "config_error",
            Self::Io { .. } => "io_error",
            Self::Output(_) => "output_error",
            Self::Json(_) => "json_error",
        }
    }

    /// Return the CLI exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidVersion(_) | Self::InvalidClusterName(_) => 2,
            Self::ClusterNotFound { .. }
            | Self::InvalidStartConf { .. }
            | Self::Config { .. }
            | Self::Io { .. }
            | Self::Output(_)
            | Self::Json(_) => 1,
        }
    }
}
