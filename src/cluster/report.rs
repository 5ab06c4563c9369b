/// Row builder: turns provider metadata into table rows and JSON records.
use std::borrow::Cow;
use std::path::Path;

use super::errors::ClusterError;
use super::selection::Version;
use super::status::{log_destination, status_string};
use crate::provider::{ClusterProvider, Layout};
use crate::types::{ClusterRecord, ClusterRow};

/// Options that affect how rows are derived.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Append the `start.conf` mode to the status column.
    pub show_start: bool,
}

/// Rows for text output and records for JSON output, one of each per cluster.
#[derive(Debug, Default)]
pub struct Report {
    pub rows: Vec<ClusterRow>,
    pub records: Vec<ClusterRecord>,
}

/// Query every target and derive its display row.
///
/// # Errors
///
/// Returns the first provider error; no partial report is produced.
pub fn build_report(
    targets: &[(Version, String)],
    provider: &dyn ClusterProvider,
    layout: &Layout,
    opts: ReportOptions,
) -> Result<Report, ClusterError> {
    let mut report = Report::default();

    for (version, cluster) in targets {
        let info = provider.cluster_info(version, cluster)?;
        let binaries_missing = !layout.server_binary(version).exists();

        let owner = info.owneruid.map_or_else(
            || "unknown".to_owned(),
            |uid| provider.user_name(uid).unwrap_or_else(|| uid.to_string()),
        );

        let row = ClusterRow {
            version: version.to_string(),
            cluster: cluster.clone(),
            port: info
                .port
                .map_or_else(|| "unknown".to_owned(), |p| p.to_string()),
            status: status_string(&info, opts.show_start, binaries_missing),
            owner,
            data_directory: info
                .pgdata
                .as_deref()
                .map(Path::to_string_lossy)
                .filter(|d| !d.is_empty())
                .map_or_else(|| "unknown".to_owned(), Cow::into_owned),
            log_file: log_destination(&info, version),
        };
        tracing::debug!(%version, cluster = %cluster, status = %row.status, "built row");

        report.rows.push(row);
        report.records.push(ClusterRecord {
            version: version.clone(),
            cluster: cluster.clone(),
            info,
        });
    }

    Ok(report)
}
