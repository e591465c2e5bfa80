#![warn(missing_docs)]

//! Cross-cluster replication usage statistics: follower count, auto-follow patterns, recency

pub mod action;
pub mod clock;
pub mod config;
pub mod error;
pub mod license;
pub mod metadata;
pub mod project;
pub mod usage;

pub use action::{CcrUsageAction, FeatureUsageResponse};
pub use config::UsageConfig;
pub use error::{Result, UsageError};
pub use metadata::{ClusterState, IndexDescriptor, ProjectSnapshot};
pub use usage::{compute_usage, Usage, UsageAggregator};
