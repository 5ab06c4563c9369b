/// Filesystem conventions of a `postgresql-common` style installation.
use std::path::PathBuf;

use crate::cluster::Version;

/// Environment variable overriding the configuration root.
pub const CONF_ROOT_ENV: &str = "PG_CLUSTER_CONF_ROOT";

/// Where configuration, binaries, logs and sockets live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Per-version cluster configuration (`<conf_root>/<version>/<cluster>/`).
    pub conf_root: PathBuf,
    /// Per-version server binaries (`<bin_root>/<version>/bin/`).
    pub bin_root: PathBuf,
    /// Default location of cluster log files.
    pub log_root: PathBuf,
    /// Socket directory used when a cluster does not configure one.
    pub socket_dir: PathBuf,
    /// Port assumed when a cluster does not configure one.
    pub default_port: u16,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            conf_root: PathBuf::from("/etc/postgresql"),
            bin_root: PathBuf::from("/usr/lib/postgresql"),
            log_root: PathBuf::from("/var/log/postgresql"),
            socket_dir: PathBuf::from("/var/run/postgresql"),
            default_port: 5432,
        }
    }
}

impl Layout {
    /// The default layout, with `PG_CLUSTER_CONF_ROOT` applied when set.
    #[must_use]
    pub fn from_env() -> Self {
        let mut layout = Self::default();
        if let Some(root) = std::env::var_os(CONF_ROOT_ENV).filter(|r| !r.is_empty()) {
            layout.conf_root = PathBuf::from(root);
        }
        layout
    }

    /// A layout with every root placed under `base`.
    #[cfg(test)]
    #[must_use]
    pub fn rooted_at(base: &std::path::Path) -> Self {
        Self {
            conf_root: base.join("etc/postgresql"),
            bin_root: base.join("usr/lib/postgresql"),
            log_root: base.join("var/log/postgresql"),
            socket_dir: base.join("var/run/postgresql"),
            default_port: 5432,
        }
    }

    /// Configuration directory of one cluster.
    #[must_use]
    pub fn cluster_conf_dir(&self, version: &Version, cluster: &str) -> PathBuf {
        self.conf_root.join(version.as_str()).join(cluster)
    }

    /// Path of the server executable for `version`.
    #[must_use]
    pub fn server_binary(&self, version: &Version) -> PathBuf {
        self.bin_root.join(version.as_str()).join("bin").join("postgres")
    }

    /// Log file a cluster writes to when nothing else is configured.
    #[must_use]
    pub fn default_logfile(&self, version: &Version, cluster: &str) -> PathBuf {
        self.log_root.join(format!("postgresql-{version}-{cluster}.log"))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn test_default_paths() {
        let layout = Layout::default();
        let v = Version::parse("13").unwrap();
        assert_eq!(
            layout.cluster_conf_dir(&v, "main"),
            PathBuf::from("/etc/postgresql/13/main")
        );
        assert_eq!(
            layout.server_binary(&v),
            PathBuf::from("/usr/lib/postgresql/13/bin/postgres")
        );
        assert_eq!(
            layout.default_logfile(&v, "main"),
            PathBuf::from("/var/log/postgresql/postgresql-13-main.log")
        );
    }

    #[test]
    fn test_rooted_layout() {
        let layout = Layout::rooted_at(Path::new("/tmp/x"));
        assert_eq!(layout.conf_root, PathBuf::from("/tmp/x/etc/postgresql"));
        assert_eq!(layout.default_port, 5432);
    }
}
