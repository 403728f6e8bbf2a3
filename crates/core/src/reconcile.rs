//! Following/followers reconciliation

use crate::user::{normalize_username, UserRecord};
use serde::Serialize;
use std::collections::HashSet;

/// Threshold used by the Instagram variant when none is given
pub const DEFAULT_FOLLOWER_THRESHOLD: u64 = 1000;

/// Totals reported alongside the reconciled users
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Counts {
    pub following: usize,
    pub followers: usize,
    pub non_followers: usize,
    /// Non-followers left after the threshold filter, when one was applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered: Option<usize>,
}

/// Outcome of one reconciliation run
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationResult {
    /// Every account followed that doesn't follow back
    pub non_followers: Vec<UserRecord>,
    /// `non_followers` after the optional threshold filter
    pub users: Vec<UserRecord>,
    pub counts: Counts,
    pub threshold: Option<u64>,
}

/// Accounts in `following` that are absent from `followers`
///
/// Order of `following` is preserved. Usernames are compared after
/// normalization, so `Foo` and `foo` are the same account.
pub fn reconcile(following: &[UserRecord], followers: &[UserRecord]) -> Vec<UserRecord> {
    let follower_set: HashSet<String> = followers
        .iter()
        .map(|f| normalize_username(&f.username))
        .collect();

    following
        .iter()
        .filter(|u| !follower_set.contains(&normalize_username(&u.username)))
        .cloned()
        .collect()
}

/// Keep only accounts whose follower count is below `threshold`
///
/// Accounts with an unknown follower count are dropped.
pub fn filter_below_threshold(users: &[UserRecord], threshold: u64) -> Vec<UserRecord> {
    users
        .iter()
        .filter(|u| matches!(u.follower_count, Some(count) if count < threshold))
        .cloned()
        .collect()
}

/// Reconcile both listings and compute the reported counts
pub fn build_result(
    following: Vec<UserRecord>,
    followers: Vec<UserRecord>,
    threshold: Option<u64>,
) -> ReconciliationResult {
    let non_followers = reconcile(&following, &followers);

    let users = match threshold {
        Some(limit) => filter_below_threshold(&non_followers, limit),
        None => non_followers.clone(),
    };

    let counts = Counts {
        following: following.len(),
        followers: followers.len(),
        non_followers: non_followers.len(),
        filtered: threshold.map(|_| users.len()),
    };

    ReconciliationResult {
        non_followers,
        users,
        counts,
        threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users(names: &[&str]) -> Vec<UserRecord> {
        names.iter().map(UserRecord::new).collect()
    }

    fn names(records: &[UserRecord]) -> Vec<&str> {
        records.iter().map(|u| u.username.as_str()).collect()
    }

    #[test]
    fn test_reconcile_returns_difference_in_following_order() {
        let following = users(&["zed", "amy", "bob", "cat"]);
        let followers = users(&["bob", "someone-else"]);

        let result = reconcile(&following, &followers);

        assert_eq!(names(&result), vec!["zed", "amy", "cat"]);
    }

    #[test]
    fn test_reconcile_same_lists_is_empty() {
        let list = users(&["a", "b", "c"]);
        assert!(reconcile(&list, &list).is_empty());
    }

    #[test]
    fn test_reconcile_disjoint_lists_keeps_everything() {
        let following = users(&["a", "b"]);
        let followers = users(&["c", "d"]);
        assert_eq!(names(&reconcile(&following, &followers)), vec!["a", "b"]);
    }

    #[test]
    fn test_reconcile_is_case_insensitive() {
        let following = vec![UserRecord {
            username: "Foo".to_string(),
            follower_count: None,
        }];
        let followers = vec![UserRecord {
            username: "foo".to_string(),
            follower_count: None,
        }];

        assert!(reconcile(&following, &followers).is_empty());
    }

    #[test]
    fn test_reconcile_keeps_cross_page_duplicates() {
        let following = users(&["a", "a", "b"]);
        let followers = users(&["b"]);
        assert_eq!(names(&reconcile(&following, &followers)), vec!["a", "a"]);
    }

    #[test]
    fn test_filter_below_threshold() {
        let non_followers = vec![
            UserRecord::with_follower_count("x", Some(500)),
            UserRecord::with_follower_count("y", Some(2000)),
        ];

        let filtered = filter_below_threshold(&non_followers, 1000);

        assert_eq!(filtered, vec![UserRecord::with_follower_count("x", Some(500))]);
    }

    #[test]
    fn test_filter_below_threshold_is_strict_and_drops_unknown() {
        let non_followers = vec![
            UserRecord::with_follower_count("edge", Some(1000)),
            UserRecord::with_follower_count("unknown", None),
            UserRecord::with_follower_count("small", Some(0)),
        ];

        let filtered = filter_below_threshold(&non_followers, 1000);

        assert_eq!(names(&filtered), vec!["small"]);
    }

    #[test]
    fn test_build_result_counts_without_threshold() {
        let result = build_result(users(&["a", "b", "c"]), users(&["b"]), None);

        assert_eq!(names(&result.users), vec!["a", "c"]);
        assert_eq!(result.users, result.non_followers);
        assert_eq!(
            result.counts,
            Counts {
                following: 3,
                followers: 1,
                non_followers: 2,
                filtered: None,
            }
        );
    }

    #[test]
    fn test_build_result_counts_with_threshold() {
        let following = vec![
            UserRecord::with_follower_count("x", Some(500)),
            UserRecord::with_follower_count("y", Some(2000)),
            UserRecord::with_follower_count("z", Some(10)),
        ];
        let followers = vec![UserRecord::with_follower_count("z", Some(10))];

        let result = build_result(following, followers, Some(DEFAULT_FOLLOWER_THRESHOLD));

        assert_eq!(names(&result.non_followers), vec!["x", "y"]);
        assert_eq!(names(&result.users), vec!["x"]);
        assert_eq!(result.counts.non_followers, 2);
        assert_eq!(result.counts.filtered, Some(1));
        assert_eq!(result.threshold, Some(1000));
    }

    #[test]
    fn test_counts_serialize_camel_case() {
        let counts = Counts {
            following: 3,
            followers: 1,
            non_followers: 2,
            filtered: None,
        };

        assert_eq!(
            serde_json::to_value(counts).unwrap(),
            serde_json::json!({ "following": 3, "followers": 1, "nonFollowers": 2 })
        );
    }
}
