//! value-charts - load a ValueChart and print each user's ranking.
//!
//! Usage: `value-charts <chart.json>`

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use value_charts::application::ChartHandle;
use value_charts::config::{AppConfig, LoggingConfig};
use value_charts::domain::value_model::ValueChart;

fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = config.validate() {
        eprintln!("Invalid configuration: {}", err);
        return ExitCode::FAILURE;
    }
    init_tracing(&config.logging);

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "value-charts failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.is_json() {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(config: AppConfig) -> Result<(), Box<dyn Error>> {
    let path: PathBuf = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .ok_or("usage: value-charts <chart.json>")?;

    let chart: ValueChart = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    for problem in chart.validate() {
        warn!(code = %problem.code, "{}", problem.message);
    }
    info!(
        chart = chart.name.as_str(),
        objectives = chart.objectives().len(),
        alternatives = chart.alternatives().len(),
        users = chart.users().len(),
        "Chart loaded"
    );

    let handle = ChartHandle::new(chart, config.viewer);
    let charts = handle.charts();
    let chart = charts.chart();
    for user in chart.users() {
        let mut ranking: Vec<(&str, f64)> = chart
            .alternatives()
            .iter()
            .map(|alternative| (alternative.name.as_str(), chart.total_score(user, alternative)))
            .collect();
        ranking.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        println!("{}", user.username());
        for (rank, (name, score)) in ranking.iter().enumerate() {
            println!("  {:>2}. {:<24} {:.3}", rank + 1, name, score);
        }
    }
    Ok(())
}
