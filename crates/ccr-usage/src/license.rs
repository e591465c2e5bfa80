//! License state and licensed-feature checks.

use crate::error::{Result, UsageError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// License operation mode.
///
/// Variants are declared in ascending order of capability; `Trial` sorts
/// last but is special-cased in [`LicensedFeature::check_without_tracking`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OperationMode {
    /// No license installed.
    Missing,
    /// Free tier.
    Basic,
    /// Standard subscription.
    Standard,
    /// Gold subscription.
    Gold,
    /// Platinum subscription.
    Platinum,
    /// Enterprise subscription.
    Enterprise,
    /// Time-limited trial, grants every feature.
    Trial,
}

impl OperationMode {
    /// Lowercase name as used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationMode::Missing => "missing",
            OperationMode::Basic => "basic",
            OperationMode::Standard => "standard",
            OperationMode::Gold => "gold",
            OperationMode::Platinum => "platinum",
            OperationMode::Enterprise => "enterprise",
            OperationMode::Trial => "trial",
        }
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationMode {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "missing" => Ok(OperationMode::Missing),
            "basic" => Ok(OperationMode::Basic),
            "standard" => Ok(OperationMode::Standard),
            "gold" => Ok(OperationMode::Gold),
            "platinum" => Ok(OperationMode::Platinum),
            "enterprise" => Ok(OperationMode::Enterprise),
            "trial" => Ok(OperationMode::Trial),
            _ => Err(UsageError::UnknownLicenseMode {
                mode: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for OperationMode {
    type Error = UsageError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<OperationMode> for String {
    fn from(mode: OperationMode) -> Self {
        mode.as_str().to_string()
    }
}

fn default_mode() -> OperationMode {
    OperationMode::Basic
}

fn default_active() -> bool {
    true
}

/// Currently installed license as seen by this node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseState {
    /// Operation mode of the license.
    #[serde(default = "default_mode")]
    pub mode: OperationMode,
    /// False once the license has expired.
    #[serde(default = "default_active")]
    pub active: bool,
}

impl LicenseState {
    /// Create a license state.
    pub fn new(mode: OperationMode, active: bool) -> Self {
        Self { mode, active }
    }
}

impl Default for LicenseState {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            active: default_active(),
        }
    }
}

/// A feature gated by license level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LicensedFeature {
    /// Feature name.
    pub name: &'static str,
    /// Lowest mode that grants the feature.
    pub minimum_mode: OperationMode,
    /// Feature is unavailable once the license expires.
    pub needs_active: bool,
}

/// Cross-cluster replication requires an active platinum license.
pub const CCR_FEATURE: LicensedFeature = LicensedFeature {
    name: "ccr",
    minimum_mode: OperationMode::Platinum,
    needs_active: true,
};

impl LicensedFeature {
    /// Check whether the license allows this feature without recording
    /// feature usage.
    pub fn check_without_tracking(&self, license: &LicenseState) -> bool {
        if self.needs_active && !license.active {
            return false;
        }
        match license.mode {
            OperationMode::Missing => false,
            OperationMode::Trial => true,
            mode => mode >= self.minimum_mode,
        }
    }
}
