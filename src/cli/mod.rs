//! Command-line parsing.
//!
//! Argument parsing stays separate from the reconciliation and charting code;
//! `crate::app` turns a parsed `Cli` into a run.

use std::path::PathBuf;

use clap::Parser;
use clap::builder::TypedValueParser;

use crate::domain::{BASELINE_WINDOW_DAYS, DEFAULT_REGION, DEFAULT_WINDOW_DAYS, Theme};

/// Charts of COVID-19 tests performed vs. confirmed cases from SESAB extracts.
///
/// DIR must hold one day's three extracts (`Banco Estadual COVID-19
/// CONFIRMADOS_<date>.csv`, `... DESCARTADOS_...`, `... SUSPEITOS_...`). The
/// reconciled table is cached there as `base-de-testes_<date>.csv` and reused
/// on later runs; delete it to rebuild.
#[derive(Debug, Parser)]
#[command(name = "sesab", version)]
pub struct Cli {
    /// Directory holding the extracts; charts and the cache are written here.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Municipalities to chart, as spelled in the data (upper case, no
    /// accents). The region name charts every municipality combined.
    #[arg(value_name = "CITIES")]
    pub cities: Vec<String>,

    /// Rolling-average window in days.
    #[arg(
        short = 'j',
        long = "window",
        env = "SESAB_WINDOW",
        default_value_t = DEFAULT_WINDOW_DAYS,
        long_help = format!("Rolling-average window in days. Use {BASELINE_WINDOW_DAYS} for a one-week average."),
        value_parser = clap::value_parser!(u16).range(1..).map(usize::from)
    )]
    pub window: usize,

    /// Show charts in the terminal instead of saving PNG files.
    #[arg(short = 'i', long)]
    pub interactive: bool,

    /// Chart color theme.
    #[arg(long, value_enum, default_value_t = Theme::Seaborn)]
    pub theme: Theme,

    /// Name that selects the whole region instead of one municipality.
    #[arg(long, env = "SESAB_REGION", default_value = DEFAULT_REGION)]
    pub region: String,
}
