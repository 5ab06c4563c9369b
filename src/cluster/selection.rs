/// Version and cluster identifiers, and resolution of the positional arguments
/// into the set of clusters to report on.
///
/// Resolution strategy (in priority order):
///
/// 1. **Combined**: a single argument `13-main` or `13/main` selects one cluster.
/// 2. **Version**: a bare version selects all of its clusters, or one cluster when
///    a second argument names it.
/// 3. **Everything**: no arguments select every installed version.
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use super::errors::ClusterError;
use crate::provider::ClusterProvider;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(?:\.(\d+))?$").expect("static regex"));

static CLUSTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-.A-Za-z0-9_]+$").expect("static regex"));

static COMBINED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)[-/]([-.A-Za-z0-9_]+)$").expect("static regex")
});

/// A server major version such as `13` or `9.6`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    raw: String,
    major: u64,
    minor: Option<u64>,
}

impl Version {
    /// Parse a version identifier.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError::InvalidVersion` if `s` is not digits with an
    /// optional fractional part, or if either part does not fit in a `u64`.
    pub fn parse(s: &str) -> Result<Self, ClusterError> {
        let invalid = || ClusterError::InvalidVersion(s.to_owned());
        let caps = VERSION_RE.captures(s).ok_or_else(invalid)?;
        let major = caps[1].parse().map_err(|_| invalid())?;
        let minor = match caps.get(2) {
            Some(m) => Some(m.as_str().parse().map_err(|_| invalid())?),
            None => None,
        };
        Ok(Self {
            raw: s.to_owned(),
            major,
            minor,
        })
    }

    /// The integer part of the version.
    #[must_use]
    pub fn major(&self) -> u64 {
        self.major
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.unwrap_or(0).cmp(&other.minor.unwrap_or(0)))
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// Whether `name` is usable as a cluster name.
#[must_use]
pub fn is_valid_cluster_name(name: &str) -> bool {
    CLUSTER_RE.is_match(name)
}

/// The user's requested scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every installed version, every cluster.
    All,
    /// All clusters of one version.
    Version(Version),
    /// A single cluster.
    Cluster(Version, String),
}

/// Resolve positional arguments into a `Selection`.
///
/// # Errors
///
/// - `ClusterError::InvalidVersion` — the version argument is malformed
/// - `ClusterError::InvalidClusterName` — the cluster argument is malformed
pub fn resolve_selection(
    version: Option<&str>,
    cluster: Option<&str>,
) -> Result<Selection, ClusterError> {
    let Some(version) = version else {
        return Ok(Selection::All);
    };

    if cluster.is_none() {
        if let Some(caps) = COMBINED_RE.captures(version) {
            let v = Version::parse(&caps[1])?;
            return Ok(Selection::Cluster(v, caps[2].to_owned()));
        }
    }

    let v = Version::parse(version)?;
    match cluster {
        None => Ok(Selection::Version(v)),
        Some(c) if is_valid_cluster_name(c) => Ok(Selection::Cluster(v, c.to_owned())),
        Some(c) => Err(ClusterError::InvalidClusterName(c.to_owned())),
    }
}

/// Expand a selection into the ordered `(version, cluster)` pairs to report.
///
/// Versions come out in numeric order, clusters in name order.
///
/// # Errors
///
/// - `ClusterError::ClusterNotFound` — a single selected cluster does not exist
/// - any error the provider reports while listing versions or clusters
pub fn expand_selection(
    selection: &Selection,
    provider: &dyn ClusterProvider,
) -> Result<Vec<(Version, String)>, ClusterError> {
    match selection {
        Selection::Cluster(v, c) => {
            if !provider.cluster_exists(v, c) {
                return Err(ClusterError::ClusterNotFound {
                    version: v.to_string(),
                    cluster: c.clone(),
                });
            }
            Ok(vec![(v.clone(), c.clone())])
        }
        Selection::Version(v) => version_targets(v, provider),
        Selection::All => {
            let mut versions = provider.versions()?;
            versions.sort();
            versions.dedup();
            let mut targets = Vec::new();
            for v in &versions {
                targets.extend(version_targets(v, provider)?);
            }
            Ok(targets)
        }
    }
}

fn version_targets(
    version: &Version,
    provider: &dyn ClusterProvider,
) -> Result<Vec<(Version, String)>, ClusterError> {
    let mut clusters = provider.clusters(version)?;
    clusters.sort();
    Ok(clusters
        .into_iter()
        .map(|c| (version.clone(), c))
        .collect())
}
