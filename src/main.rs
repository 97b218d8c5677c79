//! Command-line driver for the scenario comparison engine.
//!
//! ```text
//! calscen_service <location> <range> <base> [scenario ...]
//! calscen_service verify <location> <range>
//! ```
//!
//! The first form fetches the primary series for every scenario, runs the
//! annualization pass, and prints a per-scenario summary with annual
//! exceedance quartiles. The second form checks every configured scenario
//! store against the resolved primary dataset.

use std::path::PathBuf;
use std::process::ExitCode;

use calscen_service::analysis::exceedance::SLICE_ANNUAL;
use calscen_service::config::{self, ServiceConfig};
use calscen_service::locations::{LinkTable, LocationResolver};
use calscen_service::logging;
use calscen_service::model::{MonthlySeries, UNITS_CFS, UNITS_TAF};
use calscen_service::period::DateWindow;
use calscen_service::scenarios::{RequestBuilder, ScenarioSet};
use calscen_service::verify;

fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let config = match config::load_config(&config::config_path()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("calscen_service: {}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init_logger(config.logging.min_level(), config.logging.file.as_deref());

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.split_first() {
        Some((first, rest)) if first == "verify" => run_verify(&config, rest),
        Some(_) => run_compare(&config, &args),
        None => {
            eprintln!("usage: calscen_service <location> <range> <base> [scenario ...]");
            eprintln!("       calscen_service verify <location> <range>");
            ExitCode::FAILURE
        }
    }
}

fn resolver_from_config(config: &ServiceConfig) -> LocationResolver {
    LocationResolver::new(
        LinkTable::load_or_empty(&config.tables.gui_links),
        LinkTable::load_or_empty(&config.tables.schematic_links),
    )
}

/// A store argument is either a path as given or a name under the
/// configured scenario directory.
fn resolve_store_path(config: &ServiceConfig, name: &str) -> PathBuf {
    let direct = PathBuf::from(name);
    if direct.exists() {
        direct
    } else {
        config.scenarios.directory.join(name)
    }
}

fn run_verify(config: &ServiceConfig, args: &[String]) -> ExitCode {
    let [location, range] = args else {
        eprintln!("usage: calscen_service verify <location> <range>");
        return ExitCode::FAILURE;
    };
    let Some(window) = DateWindow::parse(range) else {
        eprintln!("calscen_service: unparseable date range '{}'", range);
        return ExitCode::FAILURE;
    };

    let labels = resolver_from_config(config).resolve(location);
    let report = match verify::run_full_verification(config, &labels.primary_name, &window) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("calscen_service: cannot scan scenario directory: {}", e);
            return ExitCode::FAILURE;
        }
    };
    verify::print_summary(&report);
    if report.summary.failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn run_compare(config: &ServiceConfig, args: &[String]) -> ExitCode {
    let [location, range, base, scenarios @ ..] = args else {
        eprintln!("usage: calscen_service <location> <range> <base> [scenario ...]");
        return ExitCode::FAILURE;
    };

    let labels = resolver_from_config(config).resolve(location);
    let request = RequestBuilder::new()
        .date_range(range)
        .base(resolve_store_path(config, base))
        .scenarios(scenarios.iter().map(|s| resolve_store_path(config, s)))
        .location(labels)
        .build();
    let request = match request {
        Ok(request) => request,
        Err(e) => {
            eprintln!("calscen_service: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut set = ScenarioSet::new(request);
    let fetched = set.primary_series();
    for message in set.messages() {
        eprintln!("note: {}", message);
    }

    let mut primary: Vec<MonthlySeries> = fetched.into_iter().flatten().collect();
    if primary.is_empty() {
        eprintln!("calscen_service: no data for any scenario");
        return ExitCode::FAILURE;
    }

    let original_units = set.original_units().to_string();
    match original_units.as_str() {
        UNITS_CFS => set.calc_volume_for_rate(&mut primary, None),
        UNITS_TAF => set.calc_rate_for_volume(&mut primary, None),
        _ => {}
    }

    println!(
        "{} ({}), {} scenarios",
        set.request().location.display_title(),
        primary[0].units,
        primary.len()
    );

    let exceedance = set.exceedance_series(&primary);
    for (i, series) in primary.iter().enumerate() {
        let annual = &exceedance[SLICE_ANNUAL][i];
        println!(
            "  {:24} {:5} months  annual min/median/max: {:.1} / {:.1} / {:.1}",
            series.scenario,
            series.len(),
            quantile(&annual.values, 0.0),
            quantile(&annual.values, 0.5),
            quantile(&annual.values, 1.0),
        );
    }

    if primary.len() > 1 {
        let differences = set.difference_series(&primary);
        for diff in &differences {
            let mean = diff.values.iter().sum::<f64>() / diff.len().max(1) as f64;
            println!("  {:24} mean monthly change vs base: {:+.2}", diff.scenario, mean);
        }
    }

    ExitCode::SUCCESS
}

/// Value at a fraction of an ascending-sorted slice; 0.0 for an empty one.
fn quantile(sorted: &[f64], fraction: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = ((sorted.len() - 1) as f64 * fraction).round() as usize;
    sorted[index.min(sorted.len() - 1)]
}
