//! Shared pipeline steps used by the command-line front-end.
//!
//! Keeping this in one place keeps the workflow explicit:
//! discover -> cache lookup (or load + reconcile + persist) -> tested filter -> per-target report
//!
//! `crate::app` only deals with argument handling and the batch loop.

use std::path::Path;

use tracing::{info, warn};

use crate::domain::{OutputMode, ReconciledRecord, ReportConfig, Target};
use crate::error::AppError;
use crate::io::{Snapshot, cache_path, identify_sources, load_raw_table, read_cache, write_cache};
use crate::reconcile::{Reconciliation, reconcile};
use crate::report::{NO_RECORDS_MESSAGE, ReportOutcome, TestedTable, build_report, chart_file_name};

/// Return the reconciled table for `snapshot`, building and caching it on first use.
///
/// The cache is keyed only by extraction date and never invalidated: if it
/// exists, the raw extracts are not read at all, even if they changed since.
pub fn load_or_reconcile(dir: &Path, snapshot: &Snapshot) -> Result<Vec<ReconciledRecord>, AppError> {
    let path = cache_path(dir, &snapshot.extraction_date);
    if path.exists() {
        info!(cache = %path.display(), "loading cached reconciled table");
        let records = read_cache(&path)?;
        info!(rows = records.len(), "cached table loaded");
        return Ok(records);
    }

    let reconciliation = reconcile_snapshot(snapshot)?;
    write_cache(&path, &reconciliation.records)?;
    info!(cache = %path.display(), rows = reconciliation.records.len(), "reconciled table cached");
    Ok(reconciliation.records)
}

/// Load the three extracts of `snapshot` and reconcile them (no caching).
pub fn reconcile_snapshot(snapshot: &Snapshot) -> Result<Reconciliation, AppError> {
    let sources = identify_sources(snapshot)?;
    info!(date = %snapshot.extraction_date, "loading extracts");

    let tables = sources
        .iter()
        .map(|(category, path)| load_raw_table(path, *category))
        .collect::<Result<Vec<_>, _>>()?;

    info!("reconciling extracts");
    let reconciliation = reconcile(&tables)?;

    let stats = &reconciliation.stats;
    for (category, rows) in &stats.rows_per_category {
        info!(category = category.keyword(), rows, "rows read");
    }
    info!(
        missing_date = stats.missing_date,
        before_min_year = stats.before_min_year,
        tested = stats.tested,
        untested = stats.untested,
        "reconciliation done"
    );

    Ok(reconciliation)
}

/// Produce the chart for one target.
///
/// A target without tested rows is not an error: the diagnostic is logged and
/// `ReportOutcome::NoRecords` returned so the batch can go on.
pub fn report_target(
    table: &TestedTable,
    target: &Target,
    config: &ReportConfig,
    dir: &Path,
) -> Result<ReportOutcome, AppError> {
    let Some(report) = build_report(table, target, &config.extraction_date, config.window) else {
        warn!(city = target.name(), "{NO_RECORDS_MESSAGE}");
        return Ok(ReportOutcome::NoRecords);
    };

    match config.output {
        OutputMode::File => {
            let path = dir.join(chart_file_name(target, &config.extraction_date));
            crate::plot::render_png(&report, config.theme, &path)?;
            info!(path = %path.display(), tests = report.total_tests, "chart saved");
            Ok(ReportOutcome::Saved(path))
        }
        OutputMode::Interactive => {
            crate::tui::show_report(&report, config.theme)?;
            Ok(ReportOutcome::Displayed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Theme};
    use crate::io::{RAW_PREFIX, discover_snapshot};
    use std::fs;
    use tempfile::tempdir;

    const DATE: &str = "06062020";
    const SHORT_HEADER: &str = "DATA DA NOTIFICACAO;MUNICIPIO DE RESIDENCIA;DATA DA COLETA DO TESTE";
    const SUSPECTED_HEADER: &str = "DATA DA NOTIFICACAO;MUNICIPIO DE RESIDENCIA;TIPO DE TESTE;DATA DA COLETA DO TESTE;RESULTADO DO TESTE;ESTADO DO TESTE";

    fn write_extract(dir: &Path, keyword: &str, body: &str) {
        // Latin-1 on disk: "ILHÉUS" uses the single byte 0xC9.
        let bytes: Vec<u8> = body
            .chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap())
            .collect();
        fs::write(dir.join(format!("{RAW_PREFIX} {keyword}_{DATE}.csv")), bytes).unwrap();
    }

    /// 3 confirmed + 2 discarded + 4 suspected in ITABUNA over 5 days, plus
    /// rows that reconciliation must drop.
    fn write_scenario(dir: &Path) {
        write_extract(
            dir,
            "CONFIRMADOS",
            &format!(
                "{SHORT_HEADER}\n01/06/2020;ITABUNA;\n02/06/2020;ITABUNA;02/06/2020\n03/06/2020;ITABUNA;\n;ITABUNA;\n"
            ),
        );
        write_extract(
            dir,
            "DESCARTADOS",
            &format!("{SHORT_HEADER}\n04/06/2020;ITABUNA;\n05/06/2020;ITABUNA;\n10/10/2019;ILHÉUS;\n"),
        );
        write_extract(
            dir,
            "SUSPEITOS",
            &format!(
                "{SUSPECTED_HEADER}\n\
                 01/06/2020;ITABUNA;;;NEGATIVO;\n\
                 02/06/2020;ITABUNA;;;POSITIVO;\n\
                 03/06/2020;ITABUNA;;;;AGUARDANDO\n\
                 04/06/2020;ITABUNA;;;;\n"
            ),
        );
    }

    fn config() -> ReportConfig {
        ReportConfig {
            window: 1,
            output: OutputMode::File,
            theme: Theme::Seaborn,
            extraction_date: DATE.to_string(),
        }
    }

    #[test]
    fn reconciles_and_caches_on_first_run() {
        let dir = tempdir().unwrap();
        write_scenario(dir.path());

        let snapshot = discover_snapshot(dir.path()).unwrap();
        assert_eq!(snapshot.extraction_date, DATE);

        let records = load_or_reconcile(dir.path(), &snapshot).unwrap();
        assert_eq!(records.len(), 9);
        assert_eq!(records.iter().filter(|r| r.tested).count(), 7);
        assert_eq!(records.iter().filter(|r| !r.tested).count(), 2);
        assert!(records.iter().all(|r| r.municipality == "ITABUNA"));
        assert_eq!(records[0].source, Category::Confirmed);
        assert_eq!(records[8].source, Category::Suspected);

        assert!(cache_path(dir.path(), DATE).exists());

        let table = TestedTable::from_reconciled(records);
        let report = build_report(&table, &Target::Municipality("ITABUNA".into()), DATE, 1).unwrap();
        assert_eq!(report.total_tests, 7);
    }

    #[test]
    fn existing_cache_is_trusted_over_changed_extracts() {
        let dir = tempdir().unwrap();
        write_scenario(dir.path());
        let snapshot = discover_snapshot(dir.path()).unwrap();

        let first = load_or_reconcile(dir.path(), &snapshot).unwrap();
        let cache = cache_path(dir.path(), DATE);
        let cached_bytes = fs::read(&cache).unwrap();

        // Mutate a raw extract; the cached table must win.
        write_extract(
            dir.path(),
            "CONFIRMADOS",
            &format!("{SHORT_HEADER}\n01/06/2020;SALVADOR;\n"),
        );

        let second = load_or_reconcile(dir.path(), &snapshot).unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::read(&cache).unwrap(), cached_bytes);
    }

    #[test]
    fn missing_cache_requires_three_extracts() {
        let dir = tempdir().unwrap();
        write_scenario(dir.path());
        fs::remove_file(dir.path().join(format!("{RAW_PREFIX} SUSPEITOS_{DATE}.csv"))).unwrap();

        let snapshot = discover_snapshot(dir.path()).unwrap();
        let err = load_or_reconcile(dir.path(), &snapshot).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
        assert!(!cache_path(dir.path(), DATE).exists());
    }

    #[test]
    fn missing_column_aborts_without_cache() {
        let dir = tempdir().unwrap();
        write_scenario(dir.path());
        write_extract(
            dir.path(),
            "SUSPEITOS",
            &format!("{SHORT_HEADER}\n01/06/2020;ITABUNA;\n"),
        );

        let snapshot = discover_snapshot(dir.path()).unwrap();
        let err = load_or_reconcile(dir.path(), &snapshot).unwrap_err();
        assert!(err.message().contains("TIPO DE TESTE"));
        assert!(!cache_path(dir.path(), DATE).exists());
    }

    #[test]
    fn unknown_city_is_a_soft_failure() {
        let dir = tempdir().unwrap();
        write_scenario(dir.path());
        let snapshot = discover_snapshot(dir.path()).unwrap();
        let table = TestedTable::from_reconciled(load_or_reconcile(dir.path(), &snapshot).unwrap());

        let outcome = report_target(&table, &Target::Municipality("ILHEUS".into()), &config(), dir.path()).unwrap();
        assert_eq!(outcome, ReportOutcome::NoRecords);
        assert!(!dir.path().join(format!("plot_ILHEUS_{DATE}.png")).exists());
    }

    #[test]
    fn tested_municipality_is_saved_as_png() {
        let dir = tempdir().unwrap();
        let mut cache = String::from("DATA DA NOTIFICACAO,MUNICIPIO DE RESIDENCIA,TESTE,FONTE,DATA DA COLETA DO TESTE\n");
        for day in 1..=20 {
            for i in 0..5 {
                let source = if i < 2 { "CONFIRMADOS" } else { "DESCARTADOS" };
                cache.push_str(&format!("2020-07-{day:02},PORTO SEGURO,true,{source},\n"));
            }
        }
        fs::write(cache_path(dir.path(), DATE), cache).unwrap();

        let snapshot = discover_snapshot(dir.path()).unwrap();
        let table = TestedTable::from_reconciled(load_or_reconcile(dir.path(), &snapshot).unwrap());
        let target = Target::Municipality("PORTO SEGURO".into());
        let config = ReportConfig { window: 3, ..config() };

        let outcome = report_target(&table, &target, &config, dir.path()).unwrap();
        let expected = dir.path().join(chart_file_name(&target, DATE));
        assert_eq!(outcome, ReportOutcome::Saved(expected.clone()));
        assert!(fs::metadata(&expected).unwrap().len() > 0);
    }

    #[test]
    fn region_report_covers_all_tested_rows() {
        let dir = tempdir().unwrap();
        write_scenario(dir.path());
        let snapshot = discover_snapshot(dir.path()).unwrap();
        let table = TestedTable::from_reconciled(load_or_reconcile(dir.path(), &snapshot).unwrap());

        let report = build_report(&table, &Target::Region("BAHIA".into()), DATE, 1).unwrap();
        assert_eq!(report.total_tests, table.len());
    }
}
