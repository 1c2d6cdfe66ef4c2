//! Reconciled-table cache.
//!
//! One CSV per extraction date, written once and trusted afterwards. The
//! schema is `domain::ReconciledRecord`. There is no freshness check against
//! the raw extracts: delete the file to force a rebuild.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::domain::ReconciledRecord;
use crate::error::AppError;

/// File name prefix of cached tables; the extraction date follows.
pub const CACHE_PREFIX: &str = "base-de-testes_";

/// Cache location for an extraction date.
pub fn cache_path(dir: &Path, extraction_date: &str) -> PathBuf {
    dir.join(format!("{CACHE_PREFIX}{extraction_date}.csv"))
}

/// Write the reconciled table.
///
/// Rows go to a sibling temp file first and are renamed into place, so a
/// failed run never leaves a truncated cache behind.
pub fn write_cache(path: &Path, records: &[ReconciledRecord]) -> Result<(), AppError> {
    let tmp = path.with_extension("csv.tmp");
    let file = File::create(&tmp)
        .map_err(|e| AppError::input(format!("Failed to create cache '{}': {e}", tmp.display())))?;

    let mut writer = csv::Writer::from_writer(file);
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| AppError::input(format!("Failed to write cache row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush cache '{}': {e}", tmp.display())))?;
    drop(writer);

    fs::rename(&tmp, path).map_err(|e| {
        AppError::input(format!(
            "Failed to move cache into place at '{}': {e}",
            path.display()
        ))
    })
}

/// Read a cached table back.
pub fn read_cache(path: &Path) -> Result<Vec<ReconciledRecord>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open cache '{}': {e}", path.display())))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut records = Vec::new();
    for (idx, result) in reader.deserialize::<ReconciledRecord>().enumerate() {
        let record = result.map_err(|e| {
            AppError::data(format!(
                "Malformed cache '{}' at line {}: {e}. Delete it to rebuild from the raw extracts.",
                path.display(),
                idx + 2
            ))
        })?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn record(day: u32, source: Category, tested: bool, collected: Option<&str>) -> ReconciledRecord {
        ReconciledRecord {
            notification_date: NaiveDate::from_ymd_opt(2020, 6, day).unwrap(),
            municipality: "PORTO SEGURO".to_string(),
            tested,
            source,
            test_collection_date: collected.map(str::to_string),
        }
    }

    #[test]
    fn cache_keeps_every_field() {
        let dir = tempdir().unwrap();
        let path = cache_path(dir.path(), "01082020");
        let records = vec![
            record(1, Category::Confirmed, true, Some("02/06/2020")),
            record(2, Category::Suspected, false, None),
        ];

        write_cache(&path, &records).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("csv.tmp").exists());

        assert_eq!(read_cache(&path).unwrap(), records);
    }

    #[test]
    fn cache_header_uses_provider_column_names() {
        let dir = tempdir().unwrap();
        let path = cache_path(dir.path(), "d");
        write_cache(&path, &[record(1, Category::Discarded, true, None)]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("DATA DA NOTIFICACAO,MUNICIPIO DE RESIDENCIA,TESTE,FONTE,DATA DA COLETA DO TESTE")
        );
        assert_eq!(lines.next(), Some("2020-06-01,PORTO SEGURO,true,DESCARTADOS,"));
    }

    #[test]
    fn malformed_cache_is_a_data_error() {
        let dir = tempdir().unwrap();
        let path = cache_path(dir.path(), "d");
        fs::write(
            &path,
            "DATA DA NOTIFICACAO,MUNICIPIO DE RESIDENCIA,TESTE,FONTE,DATA DA COLETA DO TESTE\n\
             not-a-date,ITABUNA,true,CONFIRMADOS,\n",
        )
        .unwrap();

        let err = read_cache(&path).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
    }
}
