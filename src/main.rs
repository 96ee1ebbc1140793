//! airsim-preflight CLI entry point
//!
//! Acceptance checks for a multirotor running in AirSim. Takes no arguments;
//! settings come from `airsim_preflight.toml` or `$AIRSIM_PREFLIGHT_CONFIG`.

use airsim_preflight::cli::console::StdoutConsole;
use airsim_preflight::version::get_build_info;
use airsim_preflight::{run_preflight, PreflightConfig};

use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_logging();
    info!("{}", get_build_info());

    let config = match PreflightConfig::discover() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            return ExitCode::from(3);
        }
    };

    match run_preflight(&config, &StdoutConsole) {
        Ok(report) => {
            let summary = report.summary();
            info!(
                "Run finished: {} passed, {} warnings, {} failed, {} skipped",
                summary.passed, summary.warned, summary.failed, summary.skipped
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Error running checks: {}", e);
            ExitCode::from(3)
        }
    }
}

fn init_logging() {
    let filter = match "airsim_preflight=info".parse() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
