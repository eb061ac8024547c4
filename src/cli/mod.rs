use clap::{Parser, ValueEnum};
use url::Url;

#[derive(Debug, Parser)]
pub struct Args {
    /// Base URL the callable functions are served under.
    #[arg(long)]
    pub functions_url: Url,
    #[arg(long)]
    #[arg(value_enum, default_value_t = ProtocolVersion::V2)]
    pub protocol: ProtocolVersion,
    /// Identifies this scanner to the V2 validation procedure. Generated when absent.
    #[arg(long)]
    pub device_id: Option<String>,
    #[arg(long)]
    pub event_id: String,
    #[arg(long)]
    #[arg(default_value = "https://securetoken.googleapis.com")]
    pub auth_url: Url,
    /// Sign tokens locally for this uid instead of using a refresh token.
    #[arg(long)]
    pub dev_signing_uid: Option<String>,
    #[arg(long)]
    pub telemetry_url: Option<Url>,
    #[arg(long)]
    pub scan_deadline_ms: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProtocolVersion {
    V1,
    V2,
}
