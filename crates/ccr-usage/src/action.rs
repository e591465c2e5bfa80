//! CCR feature-usage action.
//!
//! Resolves the project, evaluates the license and settings gates, reads the
//! clock once, and hands everything to [`compute_usage`].

use crate::clock::{Clock, SystemClock};
use crate::config::UsageConfig;
use crate::error::Result;
use crate::license::{LicenseState, CCR_FEATURE};
use crate::metadata::ClusterState;
use crate::project::ProjectResolver;
use crate::usage::{compute_usage, Usage};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Name under which CCR usage is reported.
pub const CCR_FEATURE_NAME: &str = "ccr";

/// Usage of a single named feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureUsageResponse {
    /// Feature name.
    pub name: &'static str,
    /// Usage record.
    pub usage: Usage,
}

impl FeatureUsageResponse {
    /// Render as `{ "<name>": { ...usage... } }`.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert(self.name.to_string(), serde_json::to_value(self.usage)?);
        Ok(serde_json::Value::Object(map))
    }
}

/// Computes CCR usage against a cluster state.
pub struct CcrUsageAction {
    ccr_enabled: bool,
    license: LicenseState,
    resolver: Box<dyn ProjectResolver>,
    clock: Arc<dyn Clock>,
}

impl CcrUsageAction {
    /// Create an action from explicit collaborators.
    pub fn new(
        ccr_enabled: bool,
        license: LicenseState,
        resolver: Box<dyn ProjectResolver>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ccr_enabled,
            license,
            resolver,
            clock,
        }
    }

    /// Create an action from configuration, reading time from `clock`.
    pub fn from_config(config: &UsageConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            config.ccr_enabled,
            config.license,
            config.project_resolver(),
            clock,
        )
    }

    /// Create an action from configuration using the system clock.
    pub fn with_system_clock(config: &UsageConfig) -> Self {
        Self::from_config(config, Arc::new(SystemClock))
    }

    /// Compute the usage response for `state`.
    pub fn local_cluster_state_operation(
        &self,
        state: &ClusterState,
    ) -> Result<FeatureUsageResponse> {
        let project = self.resolver.resolve(state)?;
        let licensed = CCR_FEATURE.check_without_tracking(&self.license);
        let now = self.clock.now_millis();

        let usage = compute_usage(project, licensed, self.ccr_enabled, now);
        debug!(
            feature = CCR_FEATURE.name,
            project = %project.id,
            available = usage.available,
            enabled = usage.enabled,
            follower_indices = usage.number_of_follower_indices,
            auto_follow_patterns = usage.number_of_auto_follow_patterns,
            last_follow_time_ms = ?usage.last_follow_time_millis,
            "computed ccr usage"
        );

        Ok(FeatureUsageResponse {
            name: CCR_FEATURE_NAME,
            usage,
        })
    }
}
