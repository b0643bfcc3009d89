//! Local relevance ranking over the bundled catalog.
//!
//! Scoring works on lowercased label and category text:
//!
//! | Rule (first match wins)          | Base score |
//! |----------------------------------|-----------:|
//! | label equals the query           | 100        |
//! | label starts with the query      | 50         |
//! | label contains the query         | 25         |
//! | category contains the query      | 10         |
//! | every word matched somewhere     | 5          |
//!
//! Standard-tier entries then get [`STANDARD_TIER_BOOST`], and entries with a
//! curation priority `p` get `(4 - p) * 2`. Only entries where every query
//! word appears in the label or the category are scored at all.

use crate::catalog::{Catalog, CatalogEntry, Tier};

pub const EXACT_LABEL_SCORE: i64 = 100;
pub const LABEL_PREFIX_SCORE: i64 = 50;
pub const LABEL_CONTAINS_SCORE: i64 = 25;
pub const CATEGORY_CONTAINS_SCORE: i64 = 10;
pub const WORD_MATCH_SCORE: i64 = 5;

/// Added to every eligible Standard-tier entry.
pub const STANDARD_TIER_BOOST: i64 = 3;

/// A normalized search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    words: Vec<String>,
}

impl Query {
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim().to_lowercase();
        let words = text.split_whitespace().map(String::from).collect();
        Self { text, words }
    }

    /// Trimmed, lowercased query text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// A catalog entry with its final relevance score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredEntry<'a> {
    pub entry: &'a CatalogEntry,
    pub score: i64,
}

/// Scores and orders catalog entries for free-text queries.
#[derive(Debug, Clone, Copy)]
pub struct Ranker<'a> {
    catalog: &'a Catalog,
}

impl<'a> Ranker<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Entries matching `query`, most relevant first.
    ///
    /// An empty or whitespace-only query returns the Standard entries in
    /// catalog order (browse fallback).
    pub fn search(&self, query: &str) -> Vec<&'a CatalogEntry> {
        self.search_scored(query)
            .into_iter()
            .map(|hit| hit.entry)
            .collect()
    }

    /// Like [`Ranker::search`] but keeps the scores.
    ///
    /// Browse fallback entries carry a score of 0.
    pub fn search_scored(&self, query: &str) -> Vec<ScoredEntry<'a>> {
        let query = Query::parse(query);
        let catalog: &'a Catalog = self.catalog;

        if query.is_empty() {
            return catalog
                .standard()
                .iter()
                .map(|entry| ScoredEntry { entry, score: 0 })
                .collect();
        }

        let mut hits: Vec<ScoredEntry<'a>> = catalog
            .all()
            .iter()
            .filter_map(|entry| score(entry, &query).map(|score| ScoredEntry { entry, score }))
            .collect();

        // Stable: ties keep catalog order
        hits.sort_by(|a, b| b.score.cmp(&a.score));
        hits
    }
}

/// Final score of `entry` for `query`, or `None` when the entry is not
/// eligible (some query word appears in neither label nor category).
pub fn score(entry: &CatalogEntry, query: &Query) -> Option<i64> {
    if query.is_empty() {
        return None;
    }

    let label = entry.label.to_lowercase();
    let category = entry.category.to_lowercase();

    let eligible = query
        .words
        .iter()
        .all(|word| label.contains(word.as_str()) || category.contains(word.as_str()));
    if !eligible {
        return None;
    }

    let mut score = base_score(&label, &category, &query.text);

    if entry.tier == Tier::Standard {
        score += STANDARD_TIER_BOOST;
    }
    if let Some(priority) = entry.priority {
        score = score.saturating_add(4i64.saturating_sub(priority).saturating_mul(2));
    }

    Some(score)
}

fn base_score(label: &str, category: &str, query: &str) -> i64 {
    if label == query {
        EXACT_LABEL_SCORE
    } else if label.starts_with(query) {
        LABEL_PREFIX_SCORE
    } else if label.contains(query) {
        LABEL_CONTAINS_SCORE
    } else if category.contains(query) {
        CATEGORY_CONTAINS_SCORE
    } else {
        WORD_MATCH_SCORE
    }
}
