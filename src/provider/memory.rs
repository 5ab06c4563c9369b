/// In-memory provider for unit tests.
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{ClusterInfo, ClusterProvider};
use crate::cluster::{ClusterError, Version};

#[derive(Debug, Default)]
pub struct MemoryProvider {
    versions: BTreeSet<Version>,
    clusters: BTreeMap<(Version, String), ClusterInfo>,
    users: HashMap<u32, String>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a version with no clusters (binaries only).
    pub fn with_version(mut self, version: &str) -> Self {
        self.versions.insert(Version::parse(version).unwrap());
        self
    }

    pub fn with_cluster(self, version: &str, name: &str) -> Self {
        self.with_info(version, name, ClusterInfo::default())
    }

    pub fn with_info(mut self, version: &str, name: &str, info: ClusterInfo) -> Self {
        let v = Version::parse(version).unwrap();
        self.versions.insert(v.clone());
        self.clusters.insert((v, name.to_owned()), info);
        self
    }

    pub fn with_user(mut self, uid: u32, name: &str) -> Self {
        self.users.insert(uid, name.to_owned());
        self
    }
}

impl ClusterProvider for MemoryProvider {
    fn versions(&self) -> Result<Vec<Version>, ClusterError> {
        // Reverse order so callers cannot rely on provider ordering.
        Ok(self.versions.iter().rev().cloned().collect())
    }

    fn clusters(&self, version: &Version) -> Result<Vec<String>, ClusterError> {
        Ok(self
            .clusters
            .keys()
            .filter(|(v, _)| v == version)
            .map(|(_, c)| c.clone())
            .rev()
            .collect())
    }

    fn cluster_exists(&self, version: &Version, name: &str) -> bool {
        self.clusters
            .contains_key(&(version.clone(), name.to_owned()))
    }

    fn cluster_info(&self, version: &Version, name: &str) -> Result<ClusterInfo, ClusterError> {
        self.clusters
            .get(&(version.clone(), name.to_owned()))
            .cloned()
            .ok_or_else(|| ClusterError::ClusterNotFound {
                version: version.to_string(),
                cluster: name.to_owned(),
            })
    }

    fn user_name(&self, uid: u32) -> Option<String> {
        self.users.get(&uid).cloned()
    }
}
