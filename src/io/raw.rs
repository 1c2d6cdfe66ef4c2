//! Raw extract loading.
//!
//! Turns one provider CSV into a `RawTable`:
//! - bytes are ISO-8859-1, decoded before parsing
//! - fields are `;`-separated
//! - required columns are checked up front (clear error + exit code 2)
//! - empty cells and the usual NA spellings become `None`
//!
//! No classification happens here; see `crate::reconcile`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use csv::StringRecord;
use tracing::debug;

use crate::domain::{
    COL_MUNICIPALITY, COL_NOTIFICATION_DATE, COL_TEST_COLLECTION_DATE, COL_TEST_RESULT, COL_TEST_STATUS,
    COL_TEST_TYPE, Category, RawRecord, RawTable,
};
use crate::error::AppError;

/// Cell values treated as missing, in addition to empty cells.
///
/// Matched exactly: no trimming and no case folding, so `"  "` and `"NAN"`
/// are ordinary values.
const NULL_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>", "N/A",
    "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Read and parse one extract from disk.
pub fn load_raw_table(path: &Path, category: Category) -> Result<RawTable, AppError> {
    let bytes = fs::read(path)
        .map_err(|e| AppError::input(format!("Failed to read '{}': {e}", path.display())))?;
    let text = decode_latin1(&bytes);
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let table = parse_raw_table(&text, category, &source)?;
    debug!(source = %table.source, rows = table.records.len(), "loaded raw extract");
    Ok(table)
}

/// Parse already-decoded extract text.
pub fn parse_raw_table(text: &str, category: Category, source: &str) -> Result<RawTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read headers of '{source}': {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for &column in category.required_columns() {
        if !header_map.contains_key(column) {
            return Err(AppError::input(format!(
                "Missing required column `{column}` in '{source}'."
            )));
        }
    }

    let reads_test_metadata = category == Category::Suspected;
    let mut records = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let record = result
            .map_err(|e| AppError::data(format!("CSV parse error in '{source}' line {line}: {e}")))?;

        let get = |name: &str| get_optional(&record, &header_map, name).map(str::to_string);

        let mut row = RawRecord {
            line,
            notification_date: get(COL_NOTIFICATION_DATE),
            municipality: get(COL_MUNICIPALITY),
            test_collection_date: get(COL_TEST_COLLECTION_DATE),
            ..RawRecord::default()
        };
        if reads_test_metadata {
            row.test_type = get(COL_TEST_TYPE);
            row.test_result = get(COL_TEST_RESULT);
            row.test_status = get(COL_TEST_STATUS);
        }
        records.push(row);
    }

    Ok(RawTable {
        category,
        source: source.to_string(),
        records,
    })
}

/// ISO-8859-1 maps every byte to the code point of the same value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Whether a cell counts as missing.
pub fn is_null(value: &str) -> bool {
    value.is_empty() || NULL_TOKENS.contains(&value)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // A BOM on the first header would otherwise hide that column.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).filter(|s| !is_null(s))
}
