//! User-facing text: chart titles, labels, file names, diagnostics.
//!
//! Kept in one place so both renderers (PNG and terminal) say the same thing.

use crate::domain::{DATA_SOURCE, STATE_CODE, Target};

pub const LABEL_TESTED: &str = "Tests performed";
pub const LABEL_CONFIRMED: &str = "Confirmed";
pub const LABEL_COUNT: &str = "Count";
pub const LABEL_RATIO: &str = "Ratio";
pub const LABEL_DATE: &str = "Notification date";

/// Logged when a target has no tested rows.
pub const NO_RECORDS_MESSAGE: &str = "No records found: the city is not listed, or its name is misspelled or \
     not in the accepted format (upper case, no accents). Chart not generated.";

/// Municipality titles carry the state code; the statewide title does not.
pub fn chart_title(target: &Target, extraction_date: &str) -> String {
    match target {
        Target::Municipality(name) => {
            format!("COVID-19 cases - {name} - {STATE_CODE} (source: {DATA_SOURCE}, {extraction_date})")
        }
        Target::Region(name) => format!("COVID-19 cases - {name} (source: {DATA_SOURCE}, {extraction_date})"),
    }
}

pub fn total_tests_label(total: usize) -> String {
    format!("Total tests: {total}")
}

/// `plot_<name>_<date>.png` with spaces in the name replaced by underscores.
pub fn chart_file_name(target: &Target, extraction_date: &str) -> String {
    format!("plot_{}_{extraction_date}.png", target.file_stem())
}
