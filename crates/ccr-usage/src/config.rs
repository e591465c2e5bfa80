//! Configuration for usage reporting: settings, license and project selection.

use crate::error::{Result, UsageError};
use crate::license::LicenseState;
use crate::project::{DefaultProjectResolver, FixedProjectResolver, ProjectResolver};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_ccr_enabled() -> bool {
    true
}

/// Node configuration relevant to CCR usage reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageConfig {
    /// `xpack.ccr.enabled` setting.
    #[serde(rename = "xpack.ccr.enabled", default = "default_ccr_enabled")]
    pub ccr_enabled: bool,
    /// Project to report on; the default project when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Installed license.
    #[serde(default)]
    pub license: LicenseState,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            ccr_enabled: default_ccr_enabled(),
            project_id: None,
            license: LicenseState::default(),
        }
    }
}

impl UsageConfig {
    /// Load from a `.toml` or `.json` file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        match ext.to_lowercase().as_str() {
            "toml" => Ok(toml::from_str(&contents)?),
            "json" => Ok(serde_json::from_str(&contents)?),
            _ => Err(UsageError::Config {
                msg: format!("unsupported config file extension: {:?}", ext),
            }),
        }
    }

    /// Project resolver matching `project_id`.
    pub fn project_resolver(&self) -> Box<dyn ProjectResolver> {
        match &self.project_id {
            Some(id) => Box::new(FixedProjectResolver::new(id)),
            None => Box::new(DefaultProjectResolver),
        }
    }
}
