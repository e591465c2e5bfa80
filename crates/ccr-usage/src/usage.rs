//! CCR usage aggregation.
//!
//! Derives follower-index count, auto-follow pattern count and the time since
//! the most recent follower index was created from one project snapshot.

use crate::metadata::{IndexDescriptor, ProjectSnapshot};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Usage record for the replication feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// License allows the feature.
    pub available: bool,
    /// Feature is enabled in settings.
    pub enabled: bool,
    /// Number of follower indices in the project.
    #[serde(rename = "follower_indices_count")]
    pub number_of_follower_indices: u64,
    /// Number of configured auto-follow patterns.
    #[serde(rename = "auto_follow_patterns_count")]
    pub number_of_auto_follow_patterns: u64,
    /// Milliseconds since the newest follower index was created.
    /// Present iff there is at least one follower index.
    #[serde(
        rename = "last_follow_time_in_millis",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_follow_time_millis: Option<u64>,
}

/// Running count/max over index descriptors.
///
/// `observe` and `merge` are commutative and associative, so partial
/// aggregators over disjoint slices can be combined in any order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageAggregator {
    follower_count: u64,
    latest_creation: Option<i64>,
    invalid_timestamps: u64,
}

impl UsageAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one index descriptor in. Non-follower indices are ignored.
    pub fn observe(&mut self, index: &IndexDescriptor) {
        if !index.is_follower() {
            return;
        }
        self.follower_count += 1;
        if index.creation_date < 0 {
            self.invalid_timestamps += 1;
            return;
        }
        self.latest_creation = Some(match self.latest_creation {
            Some(latest) => latest.max(index.creation_date),
            None => index.creation_date,
        });
    }

    /// Combine with another partial aggregator.
    pub fn merge(self, other: Self) -> Self {
        let latest_creation = match (self.latest_creation, other.latest_creation) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        Self {
            follower_count: self.follower_count + other.follower_count,
            latest_creation,
            invalid_timestamps: self.invalid_timestamps + other.invalid_timestamps,
        }
    }

    /// Number of follower indices seen so far.
    pub fn follower_count(&self) -> u64 {
        self.follower_count
    }

    /// Newest valid follower creation timestamp seen so far.
    pub fn latest_creation(&self) -> Option<i64> {
        self.latest_creation
    }

    /// Elapsed millis since the newest follower creation, clamped at zero.
    ///
    /// `None` when no follower index was seen. Followers without a valid
    /// timestamp measure from the epoch.
    pub fn last_follow_time_millis(&self, now_millis: i64) -> Option<u64> {
        if self.follower_count == 0 {
            return None;
        }
        let latest = self.latest_creation.unwrap_or(0);
        Some(now_millis.saturating_sub(latest).max(0) as u64)
    }

    /// Build the usage record.
    pub fn finish(
        &self,
        auto_follow_patterns: usize,
        licensed: bool,
        enabled: bool,
        now_millis: i64,
    ) -> Usage {
        if self.invalid_timestamps > 0 {
            warn!(
                count = self.invalid_timestamps,
                "follower indices with negative creation date excluded from recency"
            );
        }
        Usage {
            available: licensed,
            enabled,
            number_of_follower_indices: self.follower_count,
            number_of_auto_follow_patterns: auto_follow_patterns as u64,
            last_follow_time_millis: self.last_follow_time_millis(now_millis),
        }
    }
}

impl<'a> Extend<&'a IndexDescriptor> for UsageAggregator {
    fn extend<I: IntoIterator<Item = &'a IndexDescriptor>>(&mut self, iter: I) {
        for index in iter {
            self.observe(index);
        }
    }
}

impl<'a> FromIterator<&'a IndexDescriptor> for UsageAggregator {
    fn from_iter<I: IntoIterator<Item = &'a IndexDescriptor>>(iter: I) -> Self {
        let mut aggregator = Self::new();
        aggregator.extend(iter);
        aggregator
    }
}

/// Compute the usage record for one project.
///
/// `licensed` and `enabled` pass through unchanged; `now_millis` is the
/// caller's notion of current time in epoch millis.
pub fn compute_usage(
    snapshot: &ProjectSnapshot,
    licensed: bool,
    enabled: bool,
    now_millis: i64,
) -> Usage {
    let aggregator: UsageAggregator = snapshot.iter().collect();
    aggregator.finish(
        snapshot.auto_follow_pattern_count(),
        licensed,
        enabled,
        now_millis,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{AutoFollowPattern, AutoFollowPatterns, FollowerInfo};

    fn info() -> FollowerInfo {
        FollowerInfo {
            leader_index_uuid: "uuid".to_string(),
            leader_index_name: "leader".to_string(),
            remote_cluster_name: "remote".to_string(),
        }
    }

    fn patterns(n: usize) -> AutoFollowPatterns {
        let mut p = AutoFollowPatterns::new();
        for i in 0..n {
            p.insert(
                &format!("pattern-{}", i),
                AutoFollowPattern::new("remote", vec![format!("idx-{}-*", i)]),
            );
        }
        p
    }

    #[test]
    fn test_empty_snapshot() {
        let usage = compute_usage(&ProjectSnapshot::new("p"), true, true, 1000);
        assert_eq!(
            usage,
            Usage {
                available: true,
                enabled: true,
                number_of_follower_indices: 0,
                number_of_auto_follow_patterns: 0,
                last_follow_time_millis: None,
            }
        );
    }

    #[test]
    fn test_two_followers_one_plain() {
        let snapshot = ProjectSnapshot::new("p")
            .with_index(IndexDescriptor::follower("f1", 100, info()))
            .with_index(IndexDescriptor::new("plain", 900))
            .with_index(IndexDescriptor::follower("f2", 500, info()));

        let usage = compute_usage(&snapshot, true, true, 1000);
        assert_eq!(usage.number_of_follower_indices, 2);
        assert_eq!(usage.last_follow_time_millis, Some(500));
    }

    #[test]
    fn test_plain_index_newer_than_followers_is_ignored() {
        let snapshot = ProjectSnapshot::new("p")
            .with_index(IndexDescriptor::follower("f1", 100, info()))
            .with_index(IndexDescriptor::new("plain", 999));

        let usage = compute_usage(&snapshot, true, true, 1000);
        assert_eq!(usage.last_follow_time_millis, Some(900));
    }

    #[test]
    fn test_clock_skew_clamps_to_zero() {
        let snapshot = ProjectSnapshot::new("p")
            .with_index(IndexDescriptor::follower("f1", 100, info()))
            .with_index(IndexDescriptor::new("plain", 10))
            .with_index(IndexDescriptor::follower("f2", 500, info()));

        let usage = compute_usage(&snapshot, true, true, 400);
        assert_eq!(usage.number_of_follower_indices, 2);
        assert_eq!(usage.last_follow_time_millis, Some(0));
    }

    #[test]
    fn test_patterns_without_followers() {
        let snapshot = ProjectSnapshot::new("p")
            .with_index(IndexDescriptor::new("plain", 10))
            .with_auto_follow(patterns(4));

        let usage = compute_usage(&snapshot, true, true, 1000);
        assert_eq!(usage.number_of_follower_indices, 0);
        assert_eq!(usage.number_of_auto_follow_patterns, 4);
        assert_eq!(usage.last_follow_time_millis, None);
    }

    #[test]
    fn test_unlicensed_passes_through() {
        let t = 1_700_000_000_000;
        let snapshot =
            ProjectSnapshot::new("p").with_index(IndexDescriptor::follower("f", t, info()));

        let usage = compute_usage(&snapshot, false, true, t + 50);
        assert!(!usage.available);
        assert!(usage.enabled);
        assert_eq!(usage.number_of_follower_indices, 1);
        assert_eq!(usage.last_follow_time_millis, Some(50));
    }

    #[test]
    fn test_disabled_passes_through() {
        let usage = compute_usage(&ProjectSnapshot::new("p"), true, false, 0);
        assert!(usage.available);
        assert!(!usage.enabled);
    }

    #[test]
    fn test_negative_timestamp_excluded_from_max() {
        let snapshot = ProjectSnapshot::new("p")
            .with_index(IndexDescriptor::follower("bad", -5, info()))
            .with_index(IndexDescriptor::follower("good", 300, info()));

        let usage = compute_usage(&snapshot, true, true, 1000);
        assert_eq!(usage.number_of_follower_indices, 2);
        assert_eq!(usage.last_follow_time_millis, Some(700));
    }

    #[test]
    fn test_only_invalid_timestamps_measures_from_epoch() {
        let snapshot =
            ProjectSnapshot::new("p").with_index(IndexDescriptor::follower("bad", -1, info()));

        let usage = compute_usage(&snapshot, true, true, 1234);
        assert_eq!(usage.number_of_follower_indices, 1);
        assert_eq!(usage.last_follow_time_millis, Some(1234));
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        let snapshot = ProjectSnapshot::new("p")
            .with_index(IndexDescriptor::follower("f", 0, info()));

        let usage = compute_usage(&snapshot, true, true, i64::MAX);
        assert_eq!(usage.last_follow_time_millis, Some(i64::MAX as u64));

        let usage = compute_usage(&snapshot, true, true, i64::MIN);
        assert_eq!(usage.last_follow_time_millis, Some(0));
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let indices = vec![
            IndexDescriptor::follower("a", 40, info()),
            IndexDescriptor::new("b", 90),
            IndexDescriptor::follower("c", 70, info()),
            IndexDescriptor::follower("d", 10, info()),
        ];
        let whole: UsageAggregator = indices.iter().collect();
        let left: UsageAggregator = indices[..2].iter().collect();
        let right: UsageAggregator = indices[2..].iter().collect();

        assert_eq!(left.merge(right), whole);
        assert_eq!(right.merge(left), whole);
        assert_eq!(whole.follower_count(), 3);
        assert_eq!(whole.latest_creation(), Some(70));
    }

    #[test]
    fn test_merge_with_empty_is_identity() {
        let mut agg = UsageAggregator::new();
        agg.observe(&IndexDescriptor::follower("a", 5, info()));
        assert_eq!(agg.merge(UsageAggregator::new()), agg);
        assert_eq!(UsageAggregator::new().merge(agg), agg);
    }

    #[test]
    fn test_json_omits_absent_last_follow() {
        let usage = compute_usage(&ProjectSnapshot::new("p"), true, false, 0);
        let json = serde_json::to_value(usage).unwrap();
        assert_eq!(json["follower_indices_count"], 0);
        assert_eq!(json["auto_follow_patterns_count"], 0);
        assert_eq!(json["available"], true);
        assert_eq!(json["enabled"], false);
        assert!(json.get("last_follow_time_in_millis").is_none());
    }

    #[test]
    fn test_json_includes_last_follow() {
        let snapshot =
            ProjectSnapshot::new("p").with_index(IndexDescriptor::follower("f", 10, info()));
        let usage = compute_usage(&snapshot, true, true, 60);
        let json = serde_json::to_value(usage).unwrap();
        assert_eq!(json["last_follow_time_in_millis"], 50);
    }
}
