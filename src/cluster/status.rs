/// Derived display fields: status string and log destination.
use super::selection::Version;
use crate::provider::ClusterInfo;
use crate::provider::conf::config_bool;

/// Log file name the server uses when `log_filename` is unset.
pub const DEFAULT_LOG_FILENAME: &str = "postgresql-%Y-%m-%d_%H%M%S.log";

/// First major version whose default `log_directory` is `log` rather than `pg_log`.
const LOG_DIR_RENAME_VERSION: u64 = 10;

/// Compose the status column, e.g. `online,recovery,auto`.
///
/// The start mode is only appended when `show_start` is set and the cluster
/// has one.
#[must_use]
pub fn status_string(info: &ClusterInfo, show_start: bool, binaries_missing: bool) -> String {
    let mut status = String::from(if info.running { "online" } else { "down" });
    if info.recovery {
        status.push_str(",recovery");
    }
    if show_start {
        if let Some(start) = info.start.as_deref().filter(|s| !s.is_empty()) {
            status.push(',');
            status.push_str(start);
        }
    }
    if binaries_missing {
        status.push_str(",binaries_missing");
    }
    status
}

/// Default `log_directory` for a server version.
#[must_use]
pub fn default_log_directory(version: &Version) -> &'static str {
    if version.major() >= LOG_DIR_RENAME_VERSION {
        "log"
    } else {
        "pg_log"
    }
}

/// The file the server logs to before destination substitution.
///
/// With the logging collector on this is `<log_directory>/<log_filename>`
/// (relative to the data directory when the directory is relative); otherwise
/// the provider's log file, or `unknown`.
#[must_use]
pub fn resolve_logfile(info: &ClusterInfo, version: &Version) -> String {
    let setting = |name: &str| {
        info.config
            .get(name)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    };

    if config_bool(setting("logging_collector")) {
        let dir = setting("log_directory").unwrap_or_else(|| default_log_directory(version));
        let file = setting("log_filename").unwrap_or(DEFAULT_LOG_FILENAME);
        format!("{dir}/{file}")
    } else {
        info.logfile
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("unknown")
            .to_owned()
    }
}

/// The CSV log file that accompanies `logfile`: a trailing `.log` becomes
/// `.csv`, any other name gets `.csv` appended.
#[must_use]
pub fn csv_logfile(logfile: &str) -> String {
    let stem = logfile.strip_suffix(".log").unwrap_or(logfile);
    format!("{stem}.csv")
}

/// Replace the `stderr` and `csvlog` tokens of a `log_destination` value with
/// the files they write to.
///
/// Plain text replacement of the first occurrence of each token, `stderr`
/// first. A `csvlog` that appears inside the substituted `stderr` path is the
/// one replaced.
#[must_use]
pub fn substitute_destination(destination: &str, logfile: &str) -> String {
    destination
        .replacen("stderr", logfile, 1)
        .replacen("csvlog", &csv_logfile(logfile), 1)
}

/// The log column: configured `log_destination` (default `stderr`) with the
/// resolved log file substituted in.
#[must_use]
pub fn log_destination(info: &ClusterInfo, version: &Version) -> String {
    let logfile = resolve_logfile(info, version);
    let destination = info
        .config
        .get("log_destination")
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or("stderr");
    substitute_destination(destination, &logfile)
}
