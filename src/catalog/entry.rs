//! Catalog entry types.

use serde::Serialize;

/// Which part of the bundled library an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Small curated set used for category browsing
    Standard,
    /// Larger supplementary set for offline search coverage
    Extended,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Standard => "standard",
            Tier::Extended => "extended",
        }
    }
}

/// A single labeled image bundled with the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Stable unique identifier
    pub id: String,
    /// Display and speech text
    pub label: String,
    /// URL or local path of the image; never interpreted here
    pub image_ref: String,
    /// Free-text grouping tag (browsing tab, secondary match field)
    pub category: String,
    pub tier: Tier,
    /// Curation rank hint; lower means more important
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

impl CatalogEntry {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        image_ref: impl Into<String>,
        category: impl Into<String>,
        tier: Tier,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            image_ref: image_ref.into(),
            category: category.into(),
            tier,
            priority: None,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn is_standard(&self) -> bool {
        self.tier == Tier::Standard
    }
}
