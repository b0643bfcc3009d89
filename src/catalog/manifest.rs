//! Manifest parsing.
//!
//! The manifest is a JSON object with two record lists, `standard` and
//! `extended`, plus optional metadata written by the generator script:
//!
//! ```json
//! {
//!   "version": "2.0",
//!   "generated": "2025-01-12T09:30:00Z",
//!   "totalCount": 2,
//!   "standard": [{ "id": "water", "label": "Water", "category": "Drinks", "image": "...", "priority": 1 }],
//!   "extended": [{ "id": "watermelon", "label": "Watermelon", "category": "Food", "image": "..." }]
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::entry::{CatalogEntry, Tier};
use crate::error::ManifestError;

/// Optional metadata carried by the manifest document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ManifestMeta {
    pub version: Option<String>,
    pub generated: Option<DateTime<Utc>>,
    pub total_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ManifestRecord {
    id: String,
    label: String,
    category: String,
    image: String,
    #[serde(default)]
    priority: Option<i64>,
}

/// Raw result of parsing: entries per tier, in document order.
#[derive(Debug)]
pub(crate) struct ParsedManifest {
    pub standard: Vec<CatalogEntry>,
    pub extended: Vec<CatalogEntry>,
    pub meta: ManifestMeta,
}

pub(crate) fn parse(source: &str) -> Result<ParsedManifest, ManifestError> {
    let doc: Value = serde_json::from_str(source)?;
    let root = doc.as_object().ok_or(ManifestError::NotAnObject)?;

    let standard = parse_section(root, "standard", Tier::Standard)?;
    let extended = parse_section(root, "extended", Tier::Extended)?;

    Ok(ParsedManifest {
        standard,
        extended,
        meta: parse_meta(root),
    })
}

fn parse_section(
    root: &Map<String, Value>,
    name: &'static str,
    tier: Tier,
) -> Result<Vec<CatalogEntry>, ManifestError> {
    let records = root
        .get(name)
        .and_then(Value::as_array)
        .ok_or(ManifestError::MissingSection(name))?;

    let mut entries = Vec::with_capacity(records.len());
    for (index, raw) in records.iter().enumerate() {
        match ManifestRecord::deserialize(raw) {
            Ok(record) if record.id.trim().is_empty() => {
                warn!(section = name, index, "Skipping manifest record with empty id");
            }
            Ok(record) => entries.push(CatalogEntry {
                id: record.id,
                label: record.label,
                image_ref: record.image,
                category: record.category,
                tier,
                priority: record.priority,
            }),
            Err(e) => {
                warn!(section = name, index, error = %e, "Skipping malformed manifest record");
            }
        }
    }
    Ok(entries)
}

fn parse_meta(root: &Map<String, Value>) -> ManifestMeta {
    let version = root.get("version").and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });

    let generated = root
        .get("generated")
        .and_then(Value::as_str)
        .and_then(|s| match DateTime::parse_from_rfc3339(s) {
            Ok(ts) => Some(ts.with_timezone(&Utc)),
            Err(e) => {
                debug!(generated = s, error = %e, "Ignoring unparseable manifest timestamp");
                None
            }
        });

    let total_count = root
        .get("totalCount")
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok());

    ManifestMeta {
        version,
        generated,
        total_count,
    }
}
