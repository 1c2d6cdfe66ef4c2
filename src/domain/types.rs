//! Shared domain types.
//!
//! These types are intentionally small and plain so they can be:
//!
//! - produced by the raw-extract loaders
//! - transformed by the pure reconciliation stages
//! - written to / read back from the reconciled-table cache
//! - consumed by the reporter and both chart renderers

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Column headers of the upstream extracts (and of the cache file).
pub const COL_NOTIFICATION_DATE: &str = "DATA DA NOTIFICACAO";
pub const COL_MUNICIPALITY: &str = "MUNICIPIO DE RESIDENCIA";
pub const COL_TEST_TYPE: &str = "TIPO DE TESTE";
pub const COL_TEST_COLLECTION_DATE: &str = "DATA DA COLETA DO TESTE";
pub const COL_TEST_RESULT: &str = "RESULTADO DO TESTE";
pub const COL_TEST_STATUS: &str = "ESTADO DO TESTE";
/// Cache-only columns.
pub const COL_TESTED: &str = "TESTE";
pub const COL_SOURCE: &str = "FONTE";

/// Test status meaning "no test was requested"; it overrides every other
/// test-metadata column of a suspected case.
pub const TEST_NOT_REQUESTED: &str = "EXAME NAO SOLICITADO";

/// Notification dates before this year are data-entry errors.
pub const MIN_NOTIFICATION_YEAR: i32 = 2020;

/// Rolling window used when none is given on the command line.
pub const DEFAULT_WINDOW_DAYS: usize = 28;
/// One-week window: the conceptual smoothing baseline for daily notifications.
pub const BASELINE_WINDOW_DAYS: usize = 7;

/// Name that selects every municipality at once.
pub const DEFAULT_REGION: &str = "BAHIA";
/// State code appended to municipality chart titles.
pub const STATE_CODE: &str = "BA";
/// Publisher of the extracts, shown in chart titles.
pub const DATA_SOURCE: &str = "SESAB";

/// Which extract a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "CONFIRMADOS")]
    Confirmed,
    #[serde(rename = "DESCARTADOS")]
    Discarded,
    #[serde(rename = "SUSPEITOS")]
    Suspected,
}

impl Category {
    /// Concatenation order of the reconciled table.
    pub const ALL: [Category; 3] = [Category::Confirmed, Category::Discarded, Category::Suspected];

    /// Keyword used by the data provider in file names and in the cache.
    pub fn keyword(self) -> &'static str {
        match self {
            Category::Confirmed => "CONFIRMADOS",
            Category::Discarded => "DESCARTADOS",
            Category::Suspected => "SUSPEITOS",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.keyword() == keyword)
    }

    /// Columns that must be present in this category's extract.
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            Category::Confirmed | Category::Discarded => {
                &[COL_NOTIFICATION_DATE, COL_MUNICIPALITY, COL_TEST_COLLECTION_DATE]
            }
            Category::Suspected => &[
                COL_NOTIFICATION_DATE,
                COL_MUNICIPALITY,
                COL_TEST_COLLECTION_DATE,
                COL_TEST_TYPE,
                COL_TEST_RESULT,
                COL_TEST_STATUS,
            ],
        }
    }
}

/// One row of a raw extract, with nulls already resolved.
///
/// Test type, result and status are only read from the suspected extract; for
/// the other categories they stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line in the source file (header is line 1).
    pub line: usize,
    pub notification_date: Option<String>,
    pub municipality: Option<String>,
    pub test_type: Option<String>,
    pub test_collection_date: Option<String>,
    pub test_result: Option<String>,
    pub test_status: Option<String>,
}

/// All rows of one raw extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub category: Category,
    /// Display name of the source (file name), used in error messages.
    pub source: String,
    pub records: Vec<RawRecord>,
}

/// Reconciled row. Also the on-disk schema of the cache file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledRecord {
    #[serde(rename = "DATA DA NOTIFICACAO")]
    pub notification_date: NaiveDate,
    #[serde(rename = "MUNICIPIO DE RESIDENCIA")]
    pub municipality: String,
    #[serde(rename = "TESTE")]
    pub tested: bool,
    #[serde(rename = "FONTE")]
    pub source: Category,
    #[serde(rename = "DATA DA COLETA DO TESTE")]
    pub test_collection_date: Option<String>,
}

/// What a single chart covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Every municipality combined, labelled with the region name.
    Region(String),
    Municipality(String),
}

impl Target {
    /// Interpret a command-line name: the region sentinel selects everything.
    pub fn parse(name: &str, region: &str) -> Self {
        if name == region {
            Target::Region(name.to_string())
        } else {
            Target::Municipality(name.to_string())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Target::Region(name) | Target::Municipality(name) => name,
        }
    }

    /// Name as it appears in output file names.
    pub fn file_stem(&self) -> String {
        self.name().replace(' ', "_")
    }
}

/// Where a chart goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Write a PNG to the working directory.
    File,
    /// Show the chart in the terminal and wait for the user to close it.
    Interactive,
}

/// Visual theme handed to the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Theme {
    /// Grey plot area with a white grid and muted colors.
    #[default]
    Seaborn,
    /// White plot area with a light grey grid.
    Plain,
}

/// Per-batch reporting settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub window: usize,
    pub output: OutputMode,
    pub theme: Theme,
    /// Extraction-date label shown in titles and file names.
    pub extraction_date: String,
}
