//! When to consult the remote searcher and how to reconcile its output.

use std::collections::HashSet;

use serde::Serialize;

use crate::catalog::CatalogEntry;
use crate::remote::RemoteResult;

/// Local hit count below which the remote search is consulted.
pub const DEFAULT_REMOTE_THRESHOLD: usize = 20;

/// Result cap passed to the remote search.
pub const DEFAULT_REMOTE_LIMIT: usize = 30;

/// Queries shorter than this (after trimming) never go remote.
pub const MIN_REMOTE_QUERY_CHARS: usize = 2;

/// Local results split by tier, each group in ranked order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocalResults {
    pub standard: Vec<CatalogEntry>,
    pub extended: Vec<CatalogEntry>,
}

impl LocalResults {
    pub fn partition<'a>(entries: impl IntoIterator<Item = &'a CatalogEntry>) -> Self {
        let (standard, extended): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .cloned()
            .partition(CatalogEntry::is_standard);
        Self { standard, extended }
    }

    pub fn len(&self) -> usize {
        self.standard.len() + self.extended.len()
    }

    pub fn is_empty(&self) -> bool {
        self.standard.is_empty() && self.extended.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.standard.iter().chain(self.extended.iter())
    }

    /// Lowercased labels of every local hit, for remote deduplication.
    pub fn label_keys(&self) -> HashSet<String> {
        self.iter().map(|e| e.label.to_lowercase()).collect()
    }
}

/// Rules for supplementing local results with a remote search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergePolicy {
    /// Remote is consulted only while local hits are fewer than this
    pub threshold: usize,
    /// Maximum number of remote results requested
    pub remote_limit: usize,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_REMOTE_THRESHOLD,
            remote_limit: DEFAULT_REMOTE_LIMIT,
        }
    }
}

impl MergePolicy {
    pub fn should_query_remote(&self, query: &str, local_count: usize) -> bool {
        query.trim().chars().count() >= MIN_REMOTE_QUERY_CHARS && local_count < self.threshold
    }
}

/// Drop remote results whose lowercased label is already present locally,
/// or appeared earlier in the remote list.
pub fn dedup_remote(local_labels: &HashSet<String>, remote: Vec<RemoteResult>) -> Vec<RemoteResult> {
    let mut seen = HashSet::new();
    remote
        .into_iter()
        .filter(|r| {
            let key = r.label.to_lowercase();
            !local_labels.contains(&key) && seen.insert(key)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Tier;
    use crate::remote::mock_symbol;

    #[test]
    fn test_remote_trigger_conditions() {
        let policy = MergePolicy::default();

        assert!(policy.should_query_remote("ap", 0));
        assert!(policy.should_query_remote("  ap  ", 19));
        assert!(!policy.should_query_remote("a", 0));
        assert!(!policy.should_query_remote("   ", 0));
        assert!(!policy.should_query_remote("ball", 20));
        assert!(!policy.should_query_remote("ball", 57));
    }

    #[test]
    fn test_min_length_counts_characters_not_bytes() {
        let policy = MergePolicy::default();
        // One multi-byte character
        assert!(!policy.should_query_remote("é", 0));
        assert!(policy.should_query_remote("éa", 0));
    }

    #[test]
    fn test_dedup_against_local_labels_is_case_insensitive() {
        let local = LocalResults::partition(&[CatalogEntry::new(
            "apple",
            "apple",
            "apple.png",
            "Food",
            Tier::Standard,
        )]);

        let remote = vec![mock_symbol(1, "Apple"), mock_symbol(2, "apple juice")];
        let kept = dedup_remote(&local.label_keys(), remote);

        let labels: Vec<&str> = kept.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["apple juice"]);
    }

    #[test]
    fn test_dedup_collapses_remote_duplicates() {
        let remote = vec![
            mock_symbol(1, "salmon"),
            mock_symbol(2, "Salmon"),
            mock_symbol(3, "trout"),
        ];
        let kept = dedup_remote(&HashSet::new(), remote);
        let ids: Vec<&str> = kept.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["symbotalk-1", "symbotalk-3"]);
    }

    #[test]
    fn test_partition_keeps_rank_order_within_tier() {
        let entries = vec![
            CatalogEntry::new("e1", "Cat", "cat.png", "Animals", Tier::Extended),
            CatalogEntry::new("s1", "Cat food", "food.png", "Food", Tier::Standard),
            CatalogEntry::new("e2", "Catfish", "fish.png", "Animals", Tier::Extended),
        ];
        let local = LocalResults::partition(&entries);

        assert_eq!(local.len(), 3);
        assert_eq!(local.standard[0].id, "s1");
        let extended: Vec<&str> = local.extended.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(extended, vec!["e1", "e2"]);

        let all: Vec<&str> = local.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(all, vec!["s1", "e1", "e2"]);
    }
}
