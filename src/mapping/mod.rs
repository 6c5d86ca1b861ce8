//! Mapping specification parsing.
//!
//! A mapping describes how input CSV columns are renamed to Darwin Core
//! terms. The format is a flat v0.1 schema:
//!
//! ```json
//! {
//!   "fields": [
//!     {"source_column": "DateTime", "dwc_term": "eventDate"},
//!     {"source_column": "Lat", "dwc_term": "decimalLatitude"}
//!   ]
//! }
//! ```
//!
//! Field order is significant: it defines the output column order. Entries
//! with a missing or empty side are silently skipped (lenient by default);
//! whether the resulting mapping is usable at all is checked by the
//! converter, not here.

use serde::{Deserialize, Serialize};

use crate::error::MappingResult;

/// A single column rename rule.
///
/// Both sides are optional in the wire format; a rule is only usable when
/// both are present and non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRule {
    /// Column name in the uploaded CSV.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_column: Option<String>,

    /// Darwin Core term the column maps to. Treated as an opaque label,
    /// not validated against the Darwin Core vocabulary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dwc_term: Option<String>,
}

impl FieldRule {
    /// Create a rule from a source column and target term.
    pub fn new(source_column: &str, dwc_term: &str) -> Self {
        Self {
            source_column: Some(source_column.to_string()),
            dwc_term: Some(dwc_term.to_string()),
        }
    }
}

/// A complete mapping specification.
///
/// Built once per request from JSON and immutable afterward. Unknown keys
/// in the payload are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingSpec {
    /// Ordered rename rules.
    #[serde(default)]
    pub fields: Vec<FieldRule>,
}

impl MappingSpec {
    /// Parse a mapping from a JSON string.
    pub fn from_json(json: &str) -> MappingResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> MappingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse the spec into ordered `(source_column, dwc_term)` pairs.
    ///
    /// Rules with an absent or empty side are skipped without error; order
    /// and duplicates are preserved. An empty result is not an error here --
    /// the converter rejects it before any row is read.
    pub fn parse(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter_map(|rule| match (&rule.source_column, &rule.dwc_term) {
                (Some(src), Some(dst)) if !src.is_empty() && !dst.is_empty() => {
                    Some((src.clone(), dst.clone()))
                }
                _ => None,
            })
            .collect()
    }
}

/// Generate a starter mapping for documentation and the CLI.
pub fn example_mapping() -> MappingSpec {
    MappingSpec {
        fields: vec![
            FieldRule::new("ID", "occurrenceID"),
            FieldRule::new("Species", "scientificName"),
            FieldRule::new("DateTime", "eventDate"),
            FieldRule::new("Lat", "decimalLatitude"),
            FieldRule::new("Lon", "decimalLongitude"),
        ],
    }
}
