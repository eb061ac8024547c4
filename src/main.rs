use clap::Parser;
use entry_scanner::cli::Args;
use entry_scanner::kiosk::KioskRunner;
use entry_scanner::{app_context, logging};
use std::process::ExitCode;
use tokio::io::{stdin, stdout, BufReader};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let telemetry = logging::init(&args);

    let app_context = match app_context::init(&args) {
        Ok(app_context) => app_context,
        Err(err) => {
            tracing::error!("Failed to start the scanner: {err}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(event_id = %args.event_id, "Waiting for scans.");

    let outcome = KioskRunner::new(app_context)
        .run(BufReader::new(stdin()), stdout())
        .await;
    let exit_code = match outcome {
        Ok(summary) => {
            tracing::info!(
                accepted = summary.accepted,
                rejected = summary.rejected,
                failed = summary.failed,
                "Scanner input closed."
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("Scanner I/O failed: {err}");
            ExitCode::FAILURE
        }
    };

    if let Some(telemetry) = telemetry {
        telemetry.flush().await;
    }
    exit_code
}
