use crate::cli::Args;
use crate::logging::telemetry::{TelemetryHandle, TelemetryLayerBuilder};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub mod consts;
pub mod telemetry;

pub fn init(args: &Args) -> Option<TelemetryHandle> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(
            "entry_scanner=info"
                .parse()
                .unwrap_or_else(|_| LevelFilter::INFO.into()),
        )
        .from_env_lossy();
    let (telemetry_layer, telemetry_handle) = match &args.telemetry_url {
        Some(telemetry_url) => {
            let (layer, handle) = TelemetryLayerBuilder::new(telemetry_url.clone())
                .marker_field("task")
                .map_marker_to_index("scan_decision", "scan_decisions")
                .map_marker_to_index("scan_failure", "scan_failures")
                .map_marker_to_index("malformed_response", "malformed_responses")
                .build();
            (Some(layer), Some(handle))
        }
        None => (None, None),
    };
    tracing_subscriber::registry()
        .with(telemetry_layer)
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
    telemetry_handle
}
