//! REST API types for the conversion endpoint.

use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::convert::ConvertOptions;

/// Suggested filename for the converted download.
pub const OUTPUT_FILENAME: &str = "dwc_output.csv";

/// Query parameters accepted by `POST /convert`.
///
/// Both are optional; defaults match [`ConvertOptions::default`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConvertQuery {
    /// Delimiter for reading and writing (single ASCII character).
    #[serde(default)]
    pub delimiter: Option<String>,

    /// Generate a UUID when `occurrenceID` is mapped but empty.
    #[serde(default)]
    pub ensure_occurrence_id: Option<bool>,
}

impl ConvertQuery {
    /// Resolve the query into converter options.
    pub fn to_options(&self) -> Result<ConvertOptions, String> {
        let mut options = ConvertOptions::default();

        if let Some(ref delimiter) = self.delimiter {
            let mut bytes = delimiter.bytes();
            match (bytes.next(), bytes.next()) {
                (Some(b), None) if b.is_ascii() => options.delimiter = b,
                _ => return Err("Delimiter must be a single ASCII character.".to_string()),
            }
        }

        if let Some(ensure) = self.ensure_occurrence_id {
            options.ensure_occurrence_id = ensure;
        }

        Ok(options)
    }
}

/// Create an error response payload.
///
/// The message is the failing component's error text; no internal state or
/// stack detail is included.
pub fn error_response(error: &str) -> Value {
    json!({
        "requestId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
    })
}
