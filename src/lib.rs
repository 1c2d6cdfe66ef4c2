//! `sesab-tests` library crate.
//!
//! The binary (`sesab`) is a thin wrapper around this library so that:
//!
//! - reconciliation and series logic are testable without spawning processes
//! - each pipeline stage can be reused on its own (e.g. from a notebook-style harness)

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod reconcile;
pub mod report;
pub mod series;
pub mod tui;
