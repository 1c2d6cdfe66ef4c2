//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - finds the day's extracts and loads (or builds) the reconciled table
//! - charts each requested target in order

use clap::Parser;
use tracing::info;

use crate::cli::Cli;
use crate::domain::{OutputMode, ReportConfig, Target};
use crate::error::AppError;
use crate::io::discover_snapshot;
use crate::report::{ReportOutcome, TestedTable};

pub mod pipeline;

/// Entry point for the `sesab` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    crate::logging::init();

    run_with(&cli)
}

/// Run a parsed command line.
pub fn run_with(cli: &Cli) -> Result<(), AppError> {
    let snapshot = discover_snapshot(&cli.dir)?;
    let records = pipeline::load_or_reconcile(&cli.dir, &snapshot)?;

    if cli.cities.is_empty() {
        info!("no cities requested; reconciled table is ready");
        return Ok(());
    }

    // Shared by every target in the batch.
    let table = TestedTable::from_reconciled(records);
    let config = report_config_from_args(cli, &snapshot.extraction_date);

    let mut skipped = 0usize;
    for name in &cli.cities {
        let target = Target::parse(name, &cli.region);
        info!(city = target.name(), "plotting charts");
        if pipeline::report_target(&table, &target, &config, &cli.dir)? == ReportOutcome::NoRecords {
            skipped += 1;
        }
    }

    info!(requested = cli.cities.len(), skipped, "done");
    Ok(())
}

pub fn report_config_from_args(cli: &Cli, extraction_date: &str) -> ReportConfig {
    ReportConfig {
        window: cli.window,
        output: if cli.interactive {
            OutputMode::Interactive
        } else {
            OutputMode::File
        },
        theme: cli.theme,
        extraction_date: extraction_date.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Theme;

    #[test]
    fn interactive_flag_selects_output_mode() {
        let cli = Cli::try_parse_from(["sesab", ".", "ITABUNA", "-i", "--theme", "plain"]).unwrap();
        let config = report_config_from_args(&cli, "01082020");
        assert_eq!(config.output, OutputMode::Interactive);
        assert_eq!(config.theme, Theme::Plain);
        assert_eq!(config.extraction_date, "01082020");

        let cli = Cli::try_parse_from(["sesab", ".", "ITABUNA"]).unwrap();
        assert_eq!(report_config_from_args(&cli, "x").output, OutputMode::File);
    }

    #[test]
    fn unknown_cities_do_not_abort_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let cache = crate::io::cache_path(dir.path(), "01082020");
        std::fs::write(
            &cache,
            "DATA DA NOTIFICACAO,MUNICIPIO DE RESIDENCIA,TESTE,FONTE,DATA DA COLETA DO TESTE\n\
             2020-06-01,ITABUNA,false,SUSPEITOS,\n",
        )
        .unwrap();

        let dir_arg = dir.path().to_string_lossy().into_owned();
        let cli = Cli::try_parse_from(["sesab", dir_arg.as_str(), "SALVADOR", "ITABUNA"]).unwrap();
        assert!(run_with(&cli).is_ok());
    }
}
