//! Error types for the Darwin Core conversion pipeline.
//!
//! This module defines a small hierarchy of error types:
//!
//! - [`MappingError`] - mapping specification errors
//! - [`ConvertError`] - CSV conversion errors
//! - [`ServerError`] - HTTP boundary errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries. Every variant carries a
//! human-readable message that is safe to surface to API clients verbatim.

use thiserror::Error;

// =============================================================================
// Mapping Errors
// =============================================================================

/// Errors from the mapping specification.
#[derive(Debug, Error)]
pub enum MappingError {
    /// The mapping payload is not parseable as JSON.
    #[error("Invalid mapping JSON format: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The mapping parsed but yields zero usable field pairs.
    #[error("Mapping has no usable fields. Add at least 1 mapping field.")]
    NoUsableFields,
}

// =============================================================================
// Conversion Errors
// =============================================================================

/// Errors during CSV to Darwin Core conversion.
///
/// This is the main error type returned by [`crate::convert::convert_csv_to_dwc`].
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Mapping error.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// The input has no header row (empty input).
    #[error("Input CSV appears to have no header row.")]
    NoHeader,

    /// CSV read/write error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error while flushing output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Conversion error.
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for mapping operations.
pub type MappingResult<T> = Result<T, MappingError>;

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
