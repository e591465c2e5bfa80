//! Point-in-time cluster metadata as seen by the usage collector.
//!
//! These types mirror what the metadata store hands over: per-project index
//! descriptors plus the optional auto-follow custom metadata. Everything here
//! is read-only input.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of the project used when a cluster hosts a single project.
pub const DEFAULT_PROJECT_ID: &str = "default";

/// Replication custom metadata attached to a follower index.
///
/// Every field is optional on input; a follower is identified by the
/// payload being present, not by its content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowerInfo {
    /// UUID of the leader index being followed.
    pub leader_index_uuid: String,
    /// Name of the leader index being followed.
    pub leader_index_name: String,
    /// Alias of the remote cluster hosting the leader.
    pub remote_cluster_name: String,
}

/// One index's metadata at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawIndexDescriptor")]
pub struct IndexDescriptor {
    /// Index name.
    pub name: String,
    /// Creation timestamp in milliseconds since the Unix epoch.
    pub creation_date: i64,
    /// Present iff this index is a follower index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follower: Option<FollowerInfo>,
}

/// Wire form of [`IndexDescriptor`]; the follower payload may arrive under
/// `"ccr"`, `"follower"` or both, with `"ccr"` taking precedence.
#[derive(Deserialize)]
struct RawIndexDescriptor {
    name: String,
    creation_date: i64,
    #[serde(default)]
    ccr: Option<FollowerInfo>,
    #[serde(default)]
    follower: Option<FollowerInfo>,
}

impl From<RawIndexDescriptor> for IndexDescriptor {
    fn from(raw: RawIndexDescriptor) -> Self {
        Self {
            name: raw.name,
            creation_date: raw.creation_date,
            follower: raw.ccr.or(raw.follower),
        }
    }
}

impl IndexDescriptor {
    /// Create a descriptor for a regular (non-follower) index.
    pub fn new(name: &str, creation_date: i64) -> Self {
        Self {
            name: name.to_string(),
            creation_date,
            follower: None,
        }
    }

    /// Create a descriptor for a follower index.
    pub fn follower(name: &str, creation_date: i64, info: FollowerInfo) -> Self {
        Self {
            name: name.to_string(),
            creation_date,
            follower: Some(info),
        }
    }

    /// Returns true if the index carries replication custom metadata.
    pub fn is_follower(&self) -> bool {
        self.follower.is_some()
    }
}

fn default_active() -> bool {
    true
}

/// A configured auto-follow pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoFollowPattern {
    /// Remote cluster alias the pattern watches.
    pub remote_cluster: String,
    /// Leader index name patterns (e.g. `logs-*`).
    pub leader_index_patterns: Vec<String>,
    /// Leader index names excluded from following.
    #[serde(default)]
    pub leader_index_exclusion_patterns: Vec<String>,
    /// Template for the follower index name, `{{leader_index}}` by default.
    #[serde(default)]
    pub follow_index_pattern: Option<String>,
    /// Whether the pattern is currently active.
    #[serde(default = "default_active")]
    pub active: bool,
}

impl AutoFollowPattern {
    /// Create an active pattern for a remote cluster.
    pub fn new(remote_cluster: &str, leader_index_patterns: Vec<String>) -> Self {
        Self {
            remote_cluster: remote_cluster.to_string(),
            leader_index_patterns,
            leader_index_exclusion_patterns: Vec::new(),
            follow_index_pattern: None,
            active: true,
        }
    }
}

/// Auto-follow custom metadata of a project, keyed by pattern name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoFollowPatterns {
    /// Patterns by unique name.
    #[serde(default)]
    pub patterns: BTreeMap<String, AutoFollowPattern>,
}

impl AutoFollowPatterns {
    /// Create an empty pattern set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a named pattern.
    pub fn insert(&mut self, name: &str, pattern: AutoFollowPattern) {
        self.patterns.insert(name.to_string(), pattern);
    }
}

/// Immutable metadata of one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    /// Project identifier.
    #[serde(default)]
    pub id: String,
    /// Index descriptors, in no particular order.
    #[serde(default)]
    pub indices: Vec<IndexDescriptor>,
    /// Auto-follow custom metadata, absent when never configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_follow: Option<AutoFollowPatterns>,
}

impl ProjectSnapshot {
    /// Create an empty snapshot for a project.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            indices: Vec::new(),
            auto_follow: None,
        }
    }

    /// Builder-style: add an index descriptor.
    pub fn with_index(mut self, index: IndexDescriptor) -> Self {
        self.indices.push(index);
        self
    }

    /// Builder-style: attach auto-follow metadata.
    pub fn with_auto_follow(mut self, auto_follow: AutoFollowPatterns) -> Self {
        self.auto_follow = Some(auto_follow);
        self
    }

    /// Iterate over index descriptors.
    pub fn iter(&self) -> impl Iterator<Item = &IndexDescriptor> {
        self.indices.iter()
    }

    /// Number of configured auto-follow patterns, zero when metadata is absent.
    pub fn auto_follow_pattern_count(&self) -> usize {
        self.auto_follow.as_ref().map_or(0, |p| p.patterns.len())
    }
}

impl<'a> IntoIterator for &'a ProjectSnapshot {
    type Item = &'a IndexDescriptor;
    type IntoIter = std::slice::Iter<'a, IndexDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.iter()
    }
}

/// Cluster-wide metadata: project snapshots keyed by project id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterState {
    /// Projects hosted by the cluster.
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectSnapshot>,
}

impl ClusterState {
    /// Create an empty cluster state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cluster state with a single project under [`DEFAULT_PROJECT_ID`].
    pub fn single_project(mut project: ProjectSnapshot) -> Self {
        project.id = DEFAULT_PROJECT_ID.to_string();
        let mut state = Self::new();
        state.insert_project(project);
        state
    }

    /// Add or replace a project, keyed by its id.
    pub fn insert_project(&mut self, project: ProjectSnapshot) {
        self.projects.insert(project.id.clone(), project);
    }

    /// Look up a project by id.
    pub fn project(&self, project_id: &str) -> Option<&ProjectSnapshot> {
        self.projects.get(project_id)
    }

    /// Parse a cluster state from JSON.
    ///
    /// Project ids come from the map keys; an `id` inside a project body is
    /// overwritten so the two cannot disagree.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        let mut state: ClusterState = serde_json::from_str(json)?;
        for (id, project) in state.projects.iter_mut() {
            project.id = id.clone();
        }
        Ok(state)
    }
}
