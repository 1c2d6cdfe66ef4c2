//! Reporting: per-target series preparation.
//!
//! Everything up to (but not including) drawing lives here, so the numbers a
//! chart shows can be tested without a rendering backend:
//!
//! - `TestedTable` keeps the tested rows once per batch
//! - `build_report` filters to a target and computes the rolled series
//! - `format` holds titles, labels, file names and the diagnostic text

use std::ops::RangeInclusive;

use chrono::NaiveDate;

use crate::domain::{Category, ReconciledRecord, Target};
use crate::series::{DailySeries, above, daily_counts, ratio, rolling_mean};

pub mod format;

pub use format::*;

/// Rolled days at or below this value are hidden from both series.
pub const LOW_COUNT_THRESHOLD: f64 = 1.0;

/// Reconciled rows that represent a performed test.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestedTable {
    records: Vec<ReconciledRecord>,
}

impl TestedTable {
    pub fn from_reconciled(records: Vec<ReconciledRecord>) -> Self {
        Self {
            records: records.into_iter().filter(|r| r.tested).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows belonging to `target`; the region takes every row.
    pub fn select<'a>(&'a self, target: &'a Target) -> impl Iterator<Item = &'a ReconciledRecord> + 'a {
        self.records.iter().filter(move |r| match target {
            Target::Region(_) => true,
            Target::Municipality(name) => r.municipality == *name,
        })
    }
}

/// Everything a chart needs for one target.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportData {
    pub target: Target,
    pub extraction_date: String,
    pub window: usize,
    /// Tested rows for the target (the `N` shown on the chart).
    pub total_tests: usize,
    pub tested: DailySeries,
    pub confirmed: DailySeries,
    pub ratio: Vec<(NaiveDate, Option<f64>)>,
    /// First and last notification day among the target's rows.
    pub days: RangeInclusive<NaiveDate>,
}

impl ReportData {
    /// Largest value across both count series, if any are left.
    pub fn max_count(&self) -> Option<f64> {
        self.tested
            .values()
            .chain(self.confirmed.values())
            .copied()
            .reduce(f64::max)
    }

    pub fn max_ratio(&self) -> Option<f64> {
        self.ratio.iter().filter_map(|(_, v)| *v).reduce(f64::max)
    }

    /// Contiguous runs of defined ratio values, for gap-aware line drawing.
    pub fn ratio_segments(&self) -> Vec<Vec<(NaiveDate, f64)>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for (day, value) in &self.ratio {
            match value {
                Some(v) => current.push((*day, *v)),
                None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}

/// Result of reporting one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// PNG written to this path.
    Saved(std::path::PathBuf),
    /// Chart shown and dismissed.
    Displayed,
    /// The target had no tested rows; nothing was drawn.
    NoRecords,
}

/// Filter the tested table to `target` and compute the rolled series.
///
/// Returns `None` when the target has no rows.
pub fn build_report(table: &TestedTable, target: &Target, extraction_date: &str, window: usize) -> Option<ReportData> {
    let rows: Vec<&ReconciledRecord> = table.select(target).collect();
    let first = rows.iter().map(|r| r.notification_date).min()?;
    let last = rows.iter().map(|r| r.notification_date).max()?;

    let tested_counts = daily_counts(rows.iter().map(|r| r.notification_date));
    let confirmed_counts = daily_counts(
        rows.iter()
            .filter(|r| r.source == Category::Confirmed)
            .map(|r| r.notification_date),
    );

    let tested = above(&rolling_mean(&tested_counts, window), LOW_COUNT_THRESHOLD);
    let confirmed = above(&rolling_mean(&confirmed_counts, window), LOW_COUNT_THRESHOLD);
    let ratio = ratio(&confirmed, &tested);

    Some(ReportData {
        target: target.clone(),
        extraction_date: extraction_date.to_string(),
        window,
        total_tests: rows.len(),
        tested,
        confirmed,
        ratio,
        days: first..=last,
    })
}
