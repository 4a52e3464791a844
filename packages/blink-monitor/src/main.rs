use std::fs::File;
use std::io::{self, BufReader};
use std::process::ExitCode;

use blink_monitor::config::MonitorConfig;
use blink_monitor::logging::init_tracing;
use blink_monitor::{replay, MonitorError, ReplayReport};

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let config = match MonitorConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    let _log_guard = init_tracing(&config);

    let path = std::env::args().nth(1);
    match run(path.as_deref(), &config) {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to encode report");
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            tracing::error!(error = %err, "replay failed");
            ExitCode::FAILURE
        }
    }
}

fn run(path: Option<&str>, config: &MonitorConfig) -> Result<ReplayReport, MonitorError> {
    match path {
        Some("-") | None => {
            tracing::info!("replaying frames from stdin");
            replay(io::stdin().lock(), config)
        }
        Some(path) => {
            tracing::info!(%path, "replaying frames from file");
            replay(BufReader::new(File::open(path)?), config)
        }
    }
}
