//! Mapping-driven CSV to Darwin Core CSV conversion.
//!
//! This is the core of the crate: decode the uploaded bytes, parse them as
//! delimiter-separated data, rewrite each row through the mapping, and
//! serialize the result. The whole input is materialized in memory and the
//! whole output is produced before returning; each call is stateless, so
//! conversions can run concurrently without coordination.

use std::collections::HashMap;

use uuid::Uuid;

use crate::error::{ConvertError, ConvertResult, MappingError};
use crate::mapping::MappingSpec;

/// Output field name subject to the empty-value fallback.
pub const OCCURRENCE_ID: &str = "occurrenceID";

/// Options for a conversion call.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Delimiter used for both reading and writing (default: comma).
    pub delimiter: u8,

    /// Generate a fresh UUID when `occurrenceID` is mapped but the value
    /// is empty or whitespace-only (default: true).
    pub ensure_occurrence_id: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            ensure_occurrence_id: true,
        }
    }
}

/// Capability for generating occurrence identifiers.
///
/// Injected into the converter so tests can substitute a deterministic
/// generator. Implementations must be safe to share across concurrent
/// requests.
pub trait OccurrenceIdGenerator: Send + Sync {
    /// Produce a fresh identifier, distinct per call.
    fn next_id(&self) -> String;
}

/// Default generator backed by random v4 UUIDs.
///
/// Collision probability across rows and requests is cryptographically
/// negligible.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl OccurrenceIdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Convert input CSV bytes to Darwin Core CSV bytes using a mapping.
///
/// The output header is the mapping's `dwc_term` values in mapping order
/// (duplicates kept verbatim); each input row produces exactly one output
/// row. A missing source column yields an empty string, never an error.
///
/// # Errors
///
/// - [`MappingError::NoUsableFields`] if the mapping yields zero pairs.
/// - [`ConvertError::NoHeader`] if the input contains no rows at all.
///
/// Decoding never fails: invalid UTF-8 is replaced per occurrence and a
/// leading byte-order mark is stripped.
pub fn convert_csv_to_dwc(
    input: &[u8],
    mapping: &MappingSpec,
    options: &ConvertOptions,
) -> ConvertResult<Vec<u8>> {
    convert_with_generator(input, mapping, options, &UuidGenerator)
}

/// Same as [`convert_csv_to_dwc`] but with an explicit identifier source.
pub fn convert_with_generator(
    input: &[u8],
    mapping: &MappingSpec,
    options: &ConvertOptions,
    ids: &dyn OccurrenceIdGenerator,
) -> ConvertResult<Vec<u8>> {
    let pairs = mapping.parse();
    if pairs.is_empty() {
        return Err(MappingError::NoUsableFields.into());
    }

    // UTF-8 with BOM removal; undecodable sequences become U+FFFD.
    let (text, _had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(input);

    if text.lines().next().is_none() {
        return Err(ConvertError::NoHeader);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();

    // Column lookup by name. Inserting in header order means a repeated
    // input header resolves to its last occurrence.
    let mut columns: HashMap<&str, usize> = HashMap::new();
    for (i, name) in headers.iter().enumerate() {
        columns.insert(name, i);
    }

    let out_headers: Vec<&str> = pairs.iter().map(|(_, dst)| dst.as_str()).collect();

    let mut writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(Vec::new());
    writer.write_record(&out_headers)?;

    for record in reader.records() {
        let record = record?;

        // Build the row keyed by target term: later pairs with the same
        // target overwrite earlier ones.
        let mut out_row: HashMap<&str, String> = HashMap::with_capacity(pairs.len());
        for (src, dst) in &pairs {
            let value = columns
                .get(src.as_str())
                .and_then(|&i| record.get(i))
                .unwrap_or("");
            out_row.insert(dst.as_str(), value.to_string());
        }

        if options.ensure_occurrence_id {
            ensure_occurrence_id(&mut out_row, ids);
        }

        writer.write_record(
            out_headers
                .iter()
                .map(|h| out_row.get(h).map(String::as_str).unwrap_or("")),
        )?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ConvertError::Io(e.into_error()))?;
    Ok(bytes)
}

/// Replace an empty or whitespace-only `occurrenceID` with a generated id.
///
/// Runs independently per row, so every blank id gets its own value.
fn ensure_occurrence_id(row: &mut HashMap<&str, String>, ids: &dyn OccurrenceIdGenerator) {
    if let Some(value) = row.get_mut(OCCURRENCE_ID) {
        if value.trim().is_empty() {
            *value = ids.next_id();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{example_mapping, FieldRule};
    use std::fs;

    fn mapping(rules: &[(&str, &str)]) -> MappingSpec {
        MappingSpec {
            fields: rules.iter().map(|(s, d)| FieldRule::new(s, d)).collect(),
        }
    }

    fn convert_str(input: &str, spec: &MappingSpec) -> String {
        let out = convert_csv_to_dwc(input.as_bytes(), spec, &ConvertOptions::default()).unwrap();
        String::from_utf8(out).unwrap()
    }

    /// Generator that always returns the same id, for deterministic tests.
    struct FixedGenerator(&'static str);

    impl OccurrenceIdGenerator for FixedGenerator {
        fn next_id(&self) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn test_basic_rename() {
        let spec = mapping(&[("DateTime", "eventDate"), ("Lat", "decimalLatitude")]);
        let out = convert_str("DateTime,Lat\n2024-01-01,12.5\n", &spec);
        assert_eq!(out, "eventDate,decimalLatitude\n2024-01-01,12.5\n");
    }

    #[test]
    fn test_row_count_preserved() {
        let spec = mapping(&[("A", "term")]);
        let out = convert_str("A\n1\n2\n3\n", &spec);
        assert_eq!(out.lines().count(), 4);
    }

    #[test]
    fn test_column_selection_and_reorder() {
        let spec = mapping(&[("C", "third"), ("A", "first")]);
        let out = convert_str("A,B,C\n1,2,3\n", &spec);
        assert_eq!(out, "third,first\n3,1\n");
    }

    #[test]
    fn test_missing_source_yields_empty() {
        let spec = mapping(&[("A", "a"), ("Nope", "missing")]);
        let out = convert_str("A\n1\n2\n", &spec);
        assert_eq!(out, "a,missing\n1,\n2,\n");
    }

    #[test]
    fn test_short_row_yields_empty() {
        let spec = mapping(&[("A", "a"), ("B", "b")]);
        let out = convert_str("A,B\n1\n", &spec);
        assert_eq!(out, "a,b\n1,\n");
    }

    #[test]
    fn test_extra_row_fields_ignored() {
        let spec = mapping(&[("A", "a")]);
        let out = convert_str("A\n1,2,3\n", &spec);
        assert_eq!(out, "a\n1\n");
    }

    #[test]
    fn test_empty_mapping_is_configuration_error() {
        let spec = MappingSpec::default();
        let err = convert_csv_to_dwc(b"A\n1\n", &spec, &ConvertOptions::default()).unwrap_err();
        assert!(err.to_string().contains("no usable fields"));
    }

    #[test]
    fn test_empty_input_is_format_error() {
        let spec = mapping(&[("A", "a")]);
        let err = convert_csv_to_dwc(b"", &spec, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, ConvertError::NoHeader));
    }

    #[test]
    fn test_header_only_input_is_not_an_error() {
        let spec = mapping(&[("A", "a"), ("B", "b")]);
        let out = convert_str("A,B\n", &spec);
        assert_eq!(out, "a,b\n");
    }

    #[test]
    fn test_occurrence_id_generated_when_empty() {
        let spec = mapping(&[("ID", "occurrenceID"), ("Sp", "scientificName")]);
        let out = convert_str("ID,Sp\n,Puma concolor\n  ,Lynx lynx\n", &spec);

        let rows: Vec<&str> = out.lines().skip(1).collect();
        assert_eq!(rows.len(), 2);

        let id_a = rows[0].split(',').next().unwrap();
        let id_b = rows[1].split(',').next().unwrap();
        assert_eq!(id_a.len(), 36);
        assert_eq!(id_a.matches('-').count(), 4);
        assert_ne!(id_a, id_b);
    }

    #[test]
    fn test_occurrence_id_passes_through_when_present() {
        let spec = mapping(&[("ID", "occurrenceID")]);
        let out = convert_str("ID\nobs-42\n", &spec);
        assert_eq!(out, "occurrenceID\nobs-42\n");
    }

    #[test]
    fn test_occurrence_id_fill_can_be_disabled() {
        let spec = mapping(&[("ID", "occurrenceID")]);
        let options = ConvertOptions {
            ensure_occurrence_id: false,
            ..Default::default()
        };
        let out = convert_csv_to_dwc(b"ID,Note\n,seen at dusk\n", &spec, &options).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "occurrenceID\n\"\"\n");
    }

    #[test]
    fn test_injected_generator_is_used() {
        let spec = mapping(&[("ID", "occurrenceID")]);
        let out = convert_with_generator(
            b"ID,Note\n,seen at dusk\n",
            &spec,
            &ConvertOptions::default(),
            &FixedGenerator("fixed-id"),
        )
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "occurrenceID\nfixed-id\n");
    }

    #[test]
    fn test_duplicate_target_last_wins() {
        let spec = mapping(&[("A", "term"), ("B", "term")]);
        let out = convert_str("A,B\n1,2\n", &spec);
        // Header repeats the duplicate target; both positions carry the
        // value of the last pair mapping to it.
        assert_eq!(out, "term,term\n2,2\n");
    }

    #[test]
    fn test_duplicate_input_header_resolves_to_last() {
        let spec = mapping(&[("A", "a")]);
        let out = convert_str("A,A\n1,2\n", &spec);
        assert_eq!(out, "a\n2\n");
    }

    #[test]
    fn test_bom_is_stripped() {
        let spec = mapping(&[("A", "a")]);
        let mut input = b"\xef\xbb\xbf".to_vec();
        input.extend_from_slice(b"A\n1\n");
        let out = convert_csv_to_dwc(&input, &spec, &ConvertOptions::default()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a\n1\n");
    }

    #[test]
    fn test_invalid_utf8_is_replaced_not_rejected() {
        let spec = mapping(&[("A", "a")]);
        let out =
            convert_csv_to_dwc(b"A\nabc\xff\n", &spec, &ConvertOptions::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_output_is_quoted_when_needed() {
        let spec = mapping(&[("A", "a")]);
        let out = convert_str("A\n\"hello, world\"\n", &spec);
        assert_eq!(out, "a\n\"hello, world\"\n");

        let out = convert_str("A\n\"say \"\"hi\"\"\"\n", &spec);
        assert_eq!(out, "a\n\"say \"\"hi\"\"\"\n");
    }

    #[test]
    fn test_semicolon_delimiter() {
        let spec = mapping(&[("A", "a"), ("B", "b")]);
        let options = ConvertOptions {
            delimiter: b';',
            ..Default::default()
        };
        let out = convert_csv_to_dwc(b"A;B\n1;2\n", &spec, &options).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a;b\n1;2\n");
    }

    #[test]
    fn test_file_round_trip() {
        // Mirrors the CLI path: mapping and input read from disk.
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("input.csv");
        let mapping_path = dir.path().join("mapping.json");

        fs::write(&input_path, "ID,Species,DateTime,Lat,Lon\n,Puma concolor,2024-01-01,12.5,-70.1\n").unwrap();
        fs::write(&mapping_path, example_mapping().to_json().unwrap()).unwrap();

        let mapping_json = fs::read_to_string(&mapping_path).unwrap();
        let spec = MappingSpec::from_json(&mapping_json).unwrap();
        let bytes = fs::read(&input_path).unwrap();

        let out = convert_csv_to_dwc(&bytes, &spec, &ConvertOptions::default()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with(
            "occurrenceID,scientificName,eventDate,decimalLatitude,decimalLongitude\n"
        ));
        assert!(text.contains("Puma concolor,2024-01-01,12.5,-70.1"));
    }
}
