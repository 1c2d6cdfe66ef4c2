//! Locate one day's extracts in a working directory.
//!
//! The data provider names its downloads like
//! `Banco Estadual COVID-19 CONFIRMADOS_<date>.csv`: a fixed prefix, the
//! category keyword as the last space-separated token, and the extraction date
//! after the last underscore.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glob::{Pattern, glob};
use tracing::debug;

use crate::domain::Category;
use crate::error::AppError;
use crate::io::cache::CACHE_PREFIX;

/// Common prefix of every raw extract file name.
pub const RAW_PREFIX: &str = "Banco Estadual COVID-19";

/// Number of raw extracts that make up one snapshot.
pub const EXPECTED_RAW_FILES: usize = 3;

/// The extracts found for one extraction date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub extraction_date: String,
    /// Raw extract paths sorted by name. Empty when only a cache was found.
    pub files: Vec<PathBuf>,
}

/// Find the raw extracts in `dir` and derive the extraction date.
///
/// When no raw extract is present but exactly one cached table is, its date is
/// used so charts can still be produced from the cache alone.
pub fn discover_snapshot(dir: &Path) -> Result<Snapshot, AppError> {
    if !dir.is_dir() {
        return Err(AppError::input(format!(
            "Working directory '{}' does not exist or is not a directory.",
            dir.display()
        )));
    }

    let files = list_matching(dir, &format!("{RAW_PREFIX}*"))?;
    if let Some(first) = files.first() {
        let name = file_name(first);
        let extraction_date = extraction_date_from_name(&name).ok_or_else(|| {
            AppError::input(format!("Could not read an extraction date from '{name}'."))
        })?;
        debug!(files = files.len(), %extraction_date, "found raw extracts");
        return Ok(Snapshot { extraction_date, files });
    }

    let caches = list_matching(dir, &format!("{CACHE_PREFIX}*.csv"))?;
    match caches.as_slice() {
        [only] => {
            let name = file_name(only);
            let extraction_date = extraction_date_from_name(&name).ok_or_else(|| {
                AppError::input(format!("Could not read an extraction date from '{name}'."))
            })?;
            debug!(%extraction_date, "no raw extracts, using the cached table");
            Ok(Snapshot {
                extraction_date,
                files: Vec::new(),
            })
        }
        [] => Err(AppError::input(format!(
            "No files starting with '{RAW_PREFIX}' found in '{}'.",
            dir.display()
        ))),
        _ => Err(AppError::input(format!(
            "No raw extracts in '{}' and {} cached tables to choose from; keep only one.",
            dir.display(),
            caches.len()
        ))),
    }
}

/// Map each category to its extract, failing unless there are exactly three
/// files and each category appears once.
pub fn identify_sources(snapshot: &Snapshot) -> Result<BTreeMap<Category, PathBuf>, AppError> {
    if snapshot.files.len() != EXPECTED_RAW_FILES {
        return Err(AppError::input(format!(
            "Expected {EXPECTED_RAW_FILES} raw files but found {}; check the files and run again.",
            snapshot.files.len()
        )));
    }

    let mut sources = BTreeMap::new();
    for path in &snapshot.files {
        let name = file_name(path);
        let category = category_from_name(&name).ok_or_else(|| {
            AppError::input(format!(
                "Could not tell which extract '{name}' is (expected CONFIRMADOS, DESCARTADOS or SUSPEITOS)."
            ))
        })?;
        if sources.insert(category, path.clone()).is_some() {
            return Err(AppError::input(format!(
                "More than one {} extract found; check the files and run again.",
                category.keyword()
            )));
        }
    }

    Ok(sources)
}

/// Text after the last `_` and before the first `.` that follows it.
pub fn extraction_date_from_name(name: &str) -> Option<String> {
    let tail = name.rsplit('_').next()?;
    let date = tail.split('.').next()?.trim();
    (!date.is_empty()).then(|| date.to_string())
}

/// Last space-separated token, cut at the first `_`.
pub fn category_from_name(name: &str) -> Option<Category> {
    let token = name.rsplit(' ').next()?;
    let keyword = token.split('_').next()?;
    Category::from_keyword(keyword)
}

fn list_matching(dir: &Path, file_pattern: &str) -> Result<Vec<PathBuf>, AppError> {
    let pattern = format!(
        "{}/{}",
        Pattern::escape(&dir.to_string_lossy()),
        file_pattern
    );
    let entries = glob(&pattern)
        .map_err(|e| AppError::input(format!("Invalid search pattern '{pattern}': {e}")))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
