/// Filesystem-backed provider following the `postgresql-common` layout:
/// `<conf_root>/<version>/<cluster>/postgresql.conf` per cluster, server binaries
/// under `<bin_root>/<version>/bin/`.
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::conf::{read_conf_file, read_into};
use super::{ClusterInfo, ClusterProvider, Layout};
use crate::cluster::{ClusterError, Version, is_valid_cluster_name};

/// Files whose presence in the data directory marks a server in recovery.
const RECOVERY_MARKERS: [&str; 3] = ["standby.signal", "recovery.signal", "recovery.conf"];

/// Startup modes accepted in `start.conf`.
const START_MODES: [&str; 3] = ["auto", "manual", "disabled"];

/// Reads cluster metadata from configuration files and the data directory.
#[derive(Debug, Clone)]
pub struct FsProvider {
    layout: Layout,
}

impl FsProvider {
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }
}

impl ClusterProvider for FsProvider {
    fn versions(&self) -> Result<Vec<Version>, ClusterError> {
        let mut versions = Vec::new();
        for v in version_dirs(&self.layout.conf_root)? {
            if !self.clusters(&v)?.is_empty() {
                versions.push(v);
            }
        }
        for v in version_dirs(&self.layout.bin_root)? {
            if self.layout.bin_root.join(v.as_str()).join("bin").is_dir() {
                versions.push(v);
            }
        }
        versions.sort();
        versions.dedup();
        Ok(versions)
    }

    fn clusters(&self, version: &Version) -> Result<Vec<String>, ClusterError> {
        let dir = self.layout.conf_root.join(version.as_str());
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ClusterError::io(dir, e)),
        };

        let mut clusters: Vec<String> = entries
            .filter_map(Result::ok)
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|name| is_valid_cluster_name(name) && self.cluster_exists(version, name))
            .collect();
        clusters.sort();
        Ok(clusters)
    }

    fn cluster_exists(&self, version: &Version, name: &str) -> bool {
        self.layout
            .cluster_conf_dir(version, name)
            .join("postgresql.conf")
            .is_file()
    }

    fn cluster_info(&self, version: &Version, name: &str) -> Result<ClusterInfo, ClusterError> {
        let configdir = self.layout.cluster_conf_dir(version, name);
        let conf_path = configdir.join("postgresql.conf");
        let mut config = read_conf_file(&conf_path)?;

        let pgdata = config
            .get("data_directory")
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
            .or_else(|| fs::read_link(configdir.join("pgdata")).ok());

        if let Some(data) = &pgdata {
            let auto_conf = data.join("postgresql.auto.conf");
            if auto_conf.is_file() {
                match read_into(&auto_conf, &mut config, 0) {
                    Ok(()) => {}
                    Err(ClusterError::Io { path, source }) => {
                        tracing::debug!(path = %path.display(), error = %source, "skipping unreadable auto.conf");
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        let port = match config.get("port") {
            Some(p) => p.trim().parse().ok(),
            None => Some(self.layout.default_port),
        };

        let socketdir = config
            .get("unix_socket_directories")
            .or_else(|| config.get("unix_socket_directory"))
            .and_then(|dirs| dirs.split(',').map(str::trim).find(|d| !d.is_empty()))
            .map_or_else(|| self.layout.socket_dir.clone(), PathBuf::from);

        let logfile = fs::read_link(configdir.join("log"))
            .unwrap_or_else(|_| self.layout.default_logfile(version, name))
            .to_string_lossy()
            .into_owned();

        let start = read_start_conf(&configdir.join("start.conf"))?;

        let (owneruid, ownergid) = owner(pgdata.as_deref().unwrap_or(&conf_path))
            .or_else(|| owner(&conf_path))
            .map_or((None, None), |(u, g)| (Some(u), Some(g)));

        let socket = port.map(|p| socketdir.join(format!(".s.PGSQL.{p}")));
        let running = server_running(pgdata.as_deref(), socket.as_deref());
        let recovery = running
            && pgdata
                .as_deref()
                .is_some_and(|d| RECOVERY_MARKERS.iter().any(|m| d.join(m).exists()));

        tracing::debug!(%version, cluster = name, running, recovery, "read cluster info");

        Ok(ClusterInfo {
            running,
            recovery,
            start: Some(start),
            port,
            owneruid,
            ownergid,
            pgdata,
            logfile: Some(logfile),
            socketdir: Some(socketdir),
            configdir: Some(configdir),
            config,
        })
    }
}

/// Subdirectories of `root` whose names are version numbers.
fn version_dirs(root: &Path) -> Result<Vec<Version>, ClusterError> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ClusterError::io(root, e)),
    };
    Ok(entries
        .filter_map(Result::ok)
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter_map(|name| Version::parse(&name).ok())
        .collect())
}

/// First word of the first non-comment line of `start.conf`; `auto` when the
/// file is absent or holds no such word.
fn read_start_conf(path: &Path) -> Result<String, ClusterError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok("auto".to_owned()),
        Err(e) => return Err(ClusterError::io(path, e)),
    };

    let word = text
        .lines()
        .find_map(|l| l.split('#').next().unwrap_or("").split_whitespace().next());

    match word {
        None => Ok("auto".to_owned()),
        Some(w) if START_MODES.contains(&w) => Ok(w.to_owned()),
        Some(_) => Err(ClusterError::InvalidStartConf {
            path: path.to_owned(),
        }),
    }
}

#[cfg(unix)]
fn owner(path: &Path) -> Option<(u32, u32)> {
    use std::os::unix::fs::MetadataExt;
    fs::metadata(path).ok().map(|m| (m.uid(), m.gid()))
}

#[cfg(not(unix))]
fn owner(_path: &Path) -> Option<(u32, u32)> {
    None
}

/// Whether a server is serving the cluster.
///
/// Trusts `postmaster.pid` when it can be read; falls back to the presence of
/// the server socket when the data directory is not accessible.
fn server_running(pgdata: Option<&Path>, socket: Option<&Path>) -> bool {
    if let Some(data) = pgdata {
        let pid_file = data.join("postmaster.pid");
        match fs::read_to_string(&pid_file) {
            Ok(text) => {
                return text
                    .lines()
                    .next()
                    .and_then(|l| l.trim().parse::<i32>().ok())
                    .is_some_and(process_alive);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => return false,
            Err(e) => {
                tracing::debug!(path = %pid_file.display(), error = %e, "pid file unreadable, probing socket");
            }
        }
    }
    socket.is_some_and(Path::exists)
}

/// Check if a process exists by PID without signalling it.
#[cfg(unix)]
fn process_alive(pid: i32) -> bool {
    if pid <= 0 {
        return false;
    }
    // SAFETY: signal 0 performs only the existence and permission check.
    let rc = unsafe { libc::kill(pid, 0) };
    rc == 0 || std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
fn process_alive(_pid: i32) -> bool {
    false
}
