//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the extract categories and upstream column names (`Category`, `COL_*`)
//! - raw and reconciled rows (`RawRecord`, `ReconciledRecord`)
//! - reporting inputs (`Target`, `OutputMode`, `Theme`, `ReportConfig`)

pub mod types;

pub use types::*;
