use std::time::Duration;

pub const TELEMETRY_CHANNEL_CAPACITY: usize = 1024;
pub const DEFAULT_TELEMETRY_BATCH_SIZE: usize = 50;
pub const TELEMETRY_FLUSH_INTERVAL: Duration = Duration::from_secs(10);
