//! # dwc-converter - Darwin Core CSV conversion
//!
//! Converts arbitrary CSV files into the Darwin Core schema by applying a
//! user-supplied column-rename mapping.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV bytes  │────▶│   Mapping   │────▶│  Row        │────▶│  DwC CSV    │
//! │  (UTF-8/BOM)│     │   Parser    │     │  Transform  │     │  (UTF-8)    │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use dwc_converter::{convert_csv_to_dwc, ConvertOptions, MappingSpec};
//!
//! let mapping = MappingSpec::from_json(
//!     r#"{"fields": [{"source_column": "Lat", "dwc_term": "decimalLatitude"}]}"#,
//! ).unwrap();
//! let output = convert_csv_to_dwc(b"Lat\n12.5\n", &mapping, &ConvertOptions::default()).unwrap();
//! assert_eq!(output, b"decimalLatitude\n12.5\n");
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types with `Result` aliases
//! - [`mapping`] - Mapping specification parsing
//! - [`convert`] - Mapping-driven row transformation
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod mapping;

// Transformation
pub mod convert;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConvertError,
    ConvertResult,
    MappingError,
    MappingResult,
    ServerError,
    ServerResult,
};

// =============================================================================
// Re-exports - Mapping
// =============================================================================

pub use mapping::{example_mapping, FieldRule, MappingSpec};

// =============================================================================
// Re-exports - Conversion
// =============================================================================

pub use convert::{
    convert_csv_to_dwc,
    convert_with_generator,
    ConvertOptions,
    OccurrenceIdGenerator,
    UuidGenerator,
    OCCURRENCE_ID,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, ConvertQuery};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
