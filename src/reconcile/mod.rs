//! Reconciliation: three categorized extracts in, one tested/not-tested table out.
//!
//! The pipeline is a chain of pure functions, each testable on its own:
//!
//! ```text
//! RawTable ──select_columns──▶ SelectedRow ──concatenate──▶ drop_missing_dates
//!          (tags source, classifies tested)                  └─▶ parse_dates ──▶ drop_before_min_year
//! ```
//!
//! Nothing here touches the filesystem; see `crate::app::pipeline` for the
//! cache-aware driver.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::domain::{Category, MIN_NOTIFICATION_YEAR, RawRecord, RawTable, ReconciledRecord, TEST_NOT_REQUESTED};
use crate::error::AppError;

/// A raw row reduced to the reconciled columns, before date validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedRow {
    pub source: Category,
    pub line: usize,
    pub notification_date: Option<String>,
    pub municipality: String,
    pub tested: bool,
    pub test_collection_date: Option<String>,
}

/// Row counts gathered while reconciling, for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub rows_per_category: BTreeMap<Category, usize>,
    pub missing_date: usize,
    pub before_min_year: usize,
    pub tested: usize,
    pub untested: usize,
}

/// Reconciled table plus what happened on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub records: Vec<ReconciledRecord>,
    pub stats: ReconcileStats,
}

/// Whether a row of the given category represents a performed test.
///
/// Confirmed and discarded cases needed a test to reach that outcome. A
/// suspected case counts when any test-metadata column is filled, unless its
/// status says no test was requested.
pub fn classify_tested(category: Category, row: &RawRecord) -> bool {
    match category {
        Category::Confirmed | Category::Discarded => true,
        Category::Suspected => {
            if row.test_status.as_deref() == Some(TEST_NOT_REQUESTED) {
                return false;
            }
            row.test_type.is_some() || row.test_collection_date.is_some() || row.test_result.is_some()
        }
    }
}

/// Tag each row with its source, classify it, and keep the reconciled columns.
pub fn select_columns(table: &RawTable) -> Vec<SelectedRow> {
    table
        .records
        .iter()
        .map(|row| SelectedRow {
            source: table.category,
            line: row.line,
            notification_date: row.notification_date.clone(),
            municipality: row.municipality.clone().unwrap_or_default(),
            tested: classify_tested(table.category, row),
            test_collection_date: row.test_collection_date.clone(),
        })
        .collect()
}

/// Concatenate in `Category::ALL` order, preserving row order per source.
pub fn concatenate(tables: &[RawTable]) -> Vec<SelectedRow> {
    let mut out = Vec::with_capacity(tables.iter().map(|t| t.records.len()).sum());
    for category in Category::ALL {
        for table in tables.iter().filter(|t| t.category == category) {
            out.extend(select_columns(table));
        }
    }
    out
}

/// Drop rows without a notification date. Returns the kept rows and the count dropped.
pub fn drop_missing_dates(rows: Vec<SelectedRow>) -> (Vec<SelectedRow>, usize) {
    let before = rows.len();
    let kept: Vec<SelectedRow> = rows.into_iter().filter(|r| r.notification_date.is_some()).collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Parse `DD/MM/YYYY` notification dates into reconciled records.
///
/// A value that does not parse is fatal: it means the extract format changed.
pub fn parse_dates(rows: Vec<SelectedRow>) -> Result<Vec<ReconciledRecord>, AppError> {
    rows.into_iter()
        .map(|row| {
            let raw = row.notification_date.as_deref().unwrap_or_default();
            let notification_date = parse_notification_date(raw).ok_or_else(|| {
                AppError::data(format!(
                    "Invalid notification date '{raw}' in the {} extract, line {}. Expected DD/MM/YYYY.",
                    row.source.keyword(),
                    row.line
                ))
            })?;
            Ok(ReconciledRecord {
                notification_date,
                municipality: row.municipality,
                tested: row.tested,
                source: row.source,
                test_collection_date: row.test_collection_date,
            })
        })
        .collect()
}

/// Drop records dated before `MIN_NOTIFICATION_YEAR`. Returns the kept records and the count dropped.
pub fn drop_before_min_year(records: Vec<ReconciledRecord>) -> (Vec<ReconciledRecord>, usize) {
    let before = records.len();
    let kept: Vec<ReconciledRecord> = records
        .into_iter()
        .filter(|r| r.notification_date.year() >= MIN_NOTIFICATION_YEAR)
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// `DD/MM/YYYY`, optionally followed by a time of day which is ignored.
pub fn parse_notification_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.split_whitespace().next()?;
    NaiveDate::parse_from_str(date_part, "%d/%m/%Y").ok()
}

/// Run every stage over the three extracts.
pub fn reconcile(tables: &[RawTable]) -> Result<Reconciliation, AppError> {
    let mut stats = ReconcileStats::default();
    for table in tables {
        *stats.rows_per_category.entry(table.category).or_default() += table.records.len();
    }

    let rows = concatenate(tables);
    let (rows, missing_date) = drop_missing_dates(rows);
    let records = parse_dates(rows)?;
    let (records, before_min_year) = drop_before_min_year(records);

    stats.missing_date = missing_date;
    stats.before_min_year = before_min_year;
    stats.tested = records.iter().filter(|r| r.tested).count();
    stats.untested = records.len() - stats.tested;

    Ok(Reconciliation { records, stats })
}
