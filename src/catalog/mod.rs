//! Bundled icon catalog.
//!
//! The catalog is built once from the static manifest and never mutated
//! afterwards. Entries are stored Standard tier first, then Extended, each
//! in manifest order; every accessor preserves that order.

mod entry;
mod manifest;

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::ManifestError;

pub use entry::{CatalogEntry, Tier};
pub use manifest::ManifestMeta;

/// Category name meaning "no category restriction".
pub const ALL_CATEGORY: &str = "All";

/// Entry counts for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub standard: usize,
    pub extended: usize,
    pub total: usize,
    /// Distinct categories across all tiers, not counting "All"
    pub categories: usize,
}

/// Immutable in-memory collection of bundled image entries.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    standard_len: usize,
    by_id: HashMap<String, usize>,
    standard_categories: Vec<String>,
    all_categories: Vec<String>,
    meta: ManifestMeta,
}

impl Catalog {
    /// Build a catalog from manifest JSON.
    ///
    /// Individually malformed records and duplicate ids are skipped with a
    /// warning. The load fails only when the document itself is unusable or
    /// yields no entries at all.
    pub fn load(manifest: &str) -> Result<Self, ManifestError> {
        let parsed = manifest::parse(manifest)?;
        let catalog = Self::build(parsed.standard, parsed.extended, parsed.meta);

        if catalog.is_empty() {
            return Err(ManifestError::Empty);
        }

        if let Some(expected) = catalog.meta.total_count {
            if expected != catalog.len() {
                warn!(
                    expected,
                    loaded = catalog.len(),
                    "Manifest totalCount does not match loaded entries"
                );
            }
        }

        let stats = catalog.stats();
        info!(
            standard = stats.standard,
            extended = stats.extended,
            categories = stats.categories,
            version = ?catalog.meta.version,
            "Catalog loaded"
        );

        Ok(catalog)
    }

    /// Read and load a manifest file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load(&source)
    }

    /// Build a catalog from typed entries.
    ///
    /// Tiers are assigned by position: everything in `standard` becomes
    /// [`Tier::Standard`], everything in `extended` becomes [`Tier::Extended`].
    pub fn from_entries(standard: Vec<CatalogEntry>, extended: Vec<CatalogEntry>) -> Self {
        let standard = standard
            .into_iter()
            .map(|e| CatalogEntry {
                tier: Tier::Standard,
                ..e
            })
            .collect();
        let extended = extended
            .into_iter()
            .map(|e| CatalogEntry {
                tier: Tier::Extended,
                ..e
            })
            .collect();
        Self::build(standard, extended, ManifestMeta::default())
    }

    fn build(
        standard: Vec<CatalogEntry>,
        extended: Vec<CatalogEntry>,
        meta: ManifestMeta,
    ) -> Self {
        let mut entries = Vec::with_capacity(standard.len() + extended.len());
        let mut by_id = HashMap::with_capacity(entries.capacity());
        let mut standard_len = 0;

        for entry in standard.into_iter().chain(extended) {
            if by_id.contains_key(&entry.id) {
                warn!(id = %entry.id, tier = entry.tier.as_str(), "Skipping duplicate manifest id");
                continue;
            }
            if entry.is_standard() {
                standard_len += 1;
            }
            by_id.insert(entry.id.clone(), entries.len());
            entries.push(entry);
        }

        let standard_categories = category_tabs(&entries[..standard_len]);
        let all_categories = category_tabs(&entries);

        Self {
            entries,
            standard_len,
            by_id,
            standard_categories,
            all_categories,
            meta,
        }
    }

    /// Full catalog: Standard entries before Extended.
    pub fn all(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn standard(&self) -> &[CatalogEntry] {
        &self.entries[..self.standard_len]
    }

    pub fn extended(&self) -> &[CatalogEntry] {
        &self.entries[self.standard_len..]
    }

    /// Curated browsing: Standard entries in `category`, or all of them for "All".
    pub fn by_category(&self, category: &str) -> Vec<&CatalogEntry> {
        if category == ALL_CATEGORY {
            return self.standard().iter().collect();
        }
        self.standard()
            .iter()
            .filter(|e| e.category == category)
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.by_id.get(id).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// "All" followed by the sorted categories of Standard entries.
    pub fn standard_categories(&self) -> &[String] {
        &self.standard_categories
    }

    /// "All" followed by the sorted categories of every entry.
    pub fn all_categories(&self) -> &[String] {
        &self.all_categories
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            standard: self.standard_len,
            extended: self.entries.len() - self.standard_len,
            total: self.entries.len(),
            categories: self.all_categories.len() - 1,
        }
    }

    /// Image references of every entry in catalog order, for prefetching.
    pub fn image_refs(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.image_ref.as_str())
    }

    pub fn meta(&self) -> &ManifestMeta {
        &self.meta
    }
}

fn category_tabs(entries: &[CatalogEntry]) -> Vec<String> {
    let distinct: BTreeSet<&str> = entries
        .iter()
        .map(|e| e.category.as_str())
        .filter(|c| *c != ALL_CATEGORY)
        .collect();

    std::iter::once(ALL_CATEGORY)
        .chain(distinct)
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, label: &str, category: &str) -> CatalogEntry {
        CatalogEntry::new(id, label, format!("{id}.png"), category, Tier::Standard)
    }

    fn sample() -> Catalog {
        Catalog::from_entries(
            vec![
                entry("water", "Water", "Drinks"),
                entry("apple", "Apple", "Food"),
                entry("juice", "Juice", "Drinks"),
            ],
            vec![
                entry("watermelon", "Watermelon", "Food"),
                entry("tiger", "Tiger", "Animals"),
            ],
        )
    }

    #[test]
    fn test_all_orders_standard_before_extended() {
        let catalog = sample();
        let ids: Vec<&str> = catalog.all().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["water", "apple", "juice", "watermelon", "tiger"]);
        assert!(catalog.standard().iter().all(|e| e.tier == Tier::Standard));
        assert!(catalog.extended().iter().all(|e| e.tier == Tier::Extended));
    }

    #[test]
    fn test_by_category_only_browses_standard() {
        let catalog = sample();

        let all: Vec<&str> = catalog
            .by_category(ALL_CATEGORY)
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(all, vec!["water", "apple", "juice"]);

        let drinks: Vec<&str> = catalog
            .by_category("Drinks")
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(drinks, vec!["water", "juice"]);

        // Extended-only category has nothing to browse
        assert!(catalog.by_category("Animals").is_empty());
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let catalog = Catalog::from_entries(
            vec![entry("a", "First", "X")],
            vec![entry("a", "Second", "Y"), entry("b", "Other", "Y")],
        );
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("a").map(|e| e.label.as_str()), Some("First"));
        assert_eq!(catalog.get("b").map(|e| e.tier), Some(Tier::Extended));
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_category_tabs_and_stats() {
        let catalog = sample();
        assert_eq!(catalog.standard_categories(), ["All", "Drinks", "Food"]);
        assert_eq!(
            catalog.all_categories(),
            ["All", "Animals", "Drinks", "Food"]
        );
        assert_eq!(
            catalog.stats(),
            CatalogStats {
                standard: 3,
                extended: 2,
                total: 5,
                categories: 3,
            }
        );
    }

    #[test]
    fn test_image_refs_follow_catalog_order() {
        let catalog = sample();
        let refs: Vec<&str> = catalog.image_refs().collect();
        assert_eq!(refs.first(), Some(&"water.png"));
        assert_eq!(refs.last(), Some(&"tiger.png"));
        assert_eq!(refs.len(), 5);
    }

    #[test]
    fn test_load_rejects_manifest_without_entries() {
        let err = Catalog::load(r#"{"standard": [{"id": "x"}], "extended": []}"#).unwrap_err();
        assert!(matches!(err, ManifestError::Empty));
    }

    #[test]
    fn test_load_skips_duplicates_across_tiers() {
        let catalog = Catalog::load(
            r#"{
                "totalCount": 3,
                "standard": [{"id": "cup", "label": "Cup", "category": "Things", "image": "cup.png"}],
                "extended": [
                    {"id": "cup", "label": "Cup again", "category": "Things", "image": "cup2.png"},
                    {"id": "mug", "label": "Mug", "category": "Things", "image": "mug.png", "priority": 2}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.standard().len(), 1);
        assert_eq!(catalog.extended()[0].id, "mug");
        assert_eq!(catalog.meta().total_count, Some(3));
    }

    #[test]
    fn test_from_path_reports_missing_file() {
        let err = Catalog::from_path("/definitely/not/here.json").unwrap_err();
        match err {
            ManifestError::Io { path, .. } => assert!(path.contains("not/here.json")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bundled_sample_manifest_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/extended-manifest.json");
        let catalog = Catalog::from_path(path).unwrap();
        assert!(!catalog.standard().is_empty());
        assert!(!catalog.extended().is_empty());
        assert_eq!(catalog.meta().total_count, Some(catalog.len()));
    }
}
