use std::process;

use corriere::config::{self, LoadError};
use corriere::telemetry;
use corriere::{ContentApi, Locale};
use thiserror::Error;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[derive(Debug, Error)]
enum AppError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] LoadError),
    #[error(transparent)]
    Telemetry(#[from] telemetry::TelemetryError),
    #[error("failed to initialize content client: {0}")]
    Client(#[from] corriere::client::ClientError),
    #[error("failed to serialize diagnostics: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

/// Exercise the full read path against the configured backend and print a
/// diagnostics report, for deploy-time smoke checks.
async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;
    telemetry::init(&settings.logging)?;

    let api = ContentApi::new(&settings)?;

    let report = api.validate_fallback_data();
    if !report.valid {
        for problem in &report.errors {
            error!(target: "corriere", problem = %problem, "fallback dataset validation failed");
        }
    }

    if cli_args.preload {
        api.preload_critical_content(Some(Locale::default())).await;
    }

    let diagnostics = api.performance_diagnostics();
    info!(
        target: "corriere",
        environment = %diagnostics.environment,
        backend_enabled = diagnostics.backend_enabled,
        "diagnostics collected"
    );
    println!("{}", serde_json::to_string_pretty(&diagnostics)?);

    Ok(())
}
