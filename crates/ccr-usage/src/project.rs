//! Selects which project of a cluster state a usage request reports on.

use crate::error::{Result, UsageError};
use crate::metadata::{ClusterState, ProjectSnapshot, DEFAULT_PROJECT_ID};

/// Resolves the project a request applies to.
pub trait ProjectResolver: Send + Sync {
    /// Return the project snapshot from `state`, or `ProjectNotFound`.
    fn resolve<'a>(&self, state: &'a ClusterState) -> Result<&'a ProjectSnapshot>;
}

/// Resolves the single default project.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProjectResolver;

impl ProjectResolver for DefaultProjectResolver {
    fn resolve<'a>(&self, state: &'a ClusterState) -> Result<&'a ProjectSnapshot> {
        lookup(state, DEFAULT_PROJECT_ID)
    }
}

/// Resolves a fixed project id.
#[derive(Debug, Clone)]
pub struct FixedProjectResolver {
    project_id: String,
}

impl FixedProjectResolver {
    /// Create a resolver for `project_id`.
    pub fn new(project_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
        }
    }
}

impl ProjectResolver for FixedProjectResolver {
    fn resolve<'a>(&self, state: &'a ClusterState) -> Result<&'a ProjectSnapshot> {
        lookup(state, &self.project_id)
    }
}

fn lookup<'a>(state: &'a ClusterState, project_id: &str) -> Result<&'a ProjectSnapshot> {
    state
        .project(project_id)
        .ok_or_else(|| UsageError::ProjectNotFound {
            project_id: project_id.to_string(),
        })
}
