use crate::logging::consts::{
    DEFAULT_TELEMETRY_BATCH_SIZE, TELEMETRY_CHANNEL_CAPACITY, TELEMETRY_FLUSH_INTERVAL,
};
use reqwest::Client;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io;
use tokio::sync::{mpsc, oneshot};
use tracing::field::{Field, Visit};
use tracing_core::Event;
use tracing_core::Subscriber;
use tracing_subscriber::layer::Context as TracingContext;
use tracing_subscriber::Layer;
use url::Url;

pub struct TelemetryLayerBuilder {
    telemetry_url: Url,
    marker_field: String,
    marker_to_index: HashMap<String, String>,
    batch_size: usize,
}

impl TelemetryLayerBuilder {
    pub fn new(telemetry_url: Url) -> Self {
        Self {
            telemetry_url: crate::endpoints::base_url(telemetry_url),
            marker_field: String::new(),
            marker_to_index: HashMap::new(),
            batch_size: DEFAULT_TELEMETRY_BATCH_SIZE,
        }
    }

    pub fn marker_field(mut self, field: &str) -> Self {
        self.marker_field = field.to_string();
        self
    }

    pub fn map_marker_to_index(mut self, marker: &str, index_id: &str) -> Self {
        self.marker_to_index
            .insert(marker.to_string(), index_id.to_string());
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Spawns the shipping task, so this must run inside a Tokio runtime.
    pub fn build(self) -> (TelemetryLayer, TelemetryHandle) {
        let (sender, receiver) = mpsc::channel(TELEMETRY_CHANNEL_CAPACITY);
        let shipper = TelemetryShipper {
            http_client: Client::new(),
            telemetry_url: self.telemetry_url,
            batch_size: self.batch_size,
            buffers: HashMap::new(),
        };
        tokio::spawn(shipper.run(receiver));
        let layer = TelemetryLayer {
            sender: sender.clone(),
            marker_field: self.marker_field,
            marker_to_index: self.marker_to_index,
        };
        (layer, TelemetryHandle { sender })
    }
}

enum TelemetryCommand {
    Record { index_id: String, record: Map<String, Value> },
    Flush(oneshot::Sender<()>),
}

/// Forwards events carrying a mapped marker value to the telemetry ingest endpoint.
pub struct TelemetryLayer {
    sender: mpsc::Sender<TelemetryCommand>,
    marker_field: String,
    marker_to_index: HashMap<String, String>,
}

impl TelemetryLayer {
    fn index_for(&self, event: &Event<'_>) -> Option<String> {
        let mut visitor = MarkerVisitor {
            marker_field: &self.marker_field,
            marker: None,
        };
        event.record(&mut visitor);
        visitor
            .marker
            .and_then(|marker| self.marker_to_index.get(&marker).cloned())
    }
}

impl<S: Subscriber> Layer<S> for TelemetryLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: TracingContext<'_, S>) {
        if let Some(index_id) = self.index_for(event) {
            let mut visitor = RecordVisitor::default();
            event.record(&mut visitor);
            visitor.record.insert(
                String::from("level"),
                event.metadata().level().as_str().into(),
            );
            // Scanning must never wait on telemetry: a full channel drops the record.
            let _ = self.sender.try_send(TelemetryCommand::Record {
                index_id,
                record: visitor.record,
            });
        }
    }
}

#[derive(Clone)]
pub struct TelemetryHandle {
    sender: mpsc::Sender<TelemetryCommand>,
}

impl TelemetryHandle {
    /// Ships everything buffered so far and waits for the upload attempts to finish.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self
            .sender
            .send(TelemetryCommand::Flush(done_tx))
            .await
            .is_ok()
        {
            let _ = done_rx.await;
        }
    }
}

struct TelemetryShipper {
    http_client: Client,
    telemetry_url: Url,
    batch_size: usize,
    buffers: HashMap<String, Vec<Map<String, Value>>>,
}

impl TelemetryShipper {
    async fn run(mut self, mut receiver: mpsc::Receiver<TelemetryCommand>) {
        let mut ticker = tokio::time::interval(TELEMETRY_FLUSH_INTERVAL);
        loop {
            tokio::select! {
                command = receiver.recv() => match command {
                    Some(TelemetryCommand::Record { index_id, record }) => {
                        let buffer = self.buffers.entry(index_id.clone()).or_default();
                        buffer.push(record);
                        if buffer.len() >= self.batch_size {
                            self.ship(&index_id).await;
                        }
                    }
                    Some(TelemetryCommand::Flush(done)) => {
                        self.ship_all().await;
                        let _ = done.send(());
                    }
                    None => break,
                },
                _ = ticker.tick() => self.ship_all().await,
            }
        }
        self.ship_all().await;
    }

    async fn ship_all(&mut self) {
        let index_ids = self.buffers.keys().cloned().collect::<Vec<_>>();
        for index_id in index_ids {
            self.ship(&index_id).await;
        }
    }

    async fn ship(&mut self, index_id: &str) {
        let records = match self.buffers.get_mut(index_id) {
            Some(buffer) if !buffer.is_empty() => std::mem::take(buffer),
            _ => return,
        };
        let mut ndjson_body = Vec::new();
        for record in &records {
            if let Err(err) = serialize_to_ndjson(&mut ndjson_body, record) {
                tracing::warn!("Failed to encode a telemetry record: {err}");
            }
        }
        let ingest_url = match self
            .telemetry_url
            .join(&format!("api/v1/{}/ingest", index_id))
        {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!("Invalid telemetry index `{index_id}`: {err}");
                return;
            }
        };
        let response = self
            .http_client
            .post(ingest_url)
            .body(ndjson_body)
            .send()
            .await
            .and_then(|response| response.error_for_status());
        if let Err(err) = response {
            tracing::warn!(
                "Dropped {} telemetry records for `{index_id}`: {err}",
                records.len()
            );
        }
    }
}

struct MarkerVisitor<'m> {
    marker_field: &'m str,
    marker: Option<String>,
}

impl Visit for MarkerVisitor<'_> {
    fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == self.marker_field {
            self.marker = Some(value.to_string());
        }
    }
}

#[derive(Default)]
struct RecordVisitor {
    record: Map<String, Value>,
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record.insert(field.name().to_string(), value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record.insert(field.name().to_string(), value.into());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record.insert(field.name().to_string(), value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record.insert(field.name().to_string(), value.into());
    }

    fn record_u128(&mut self, field: &Field, value: u128) {
        // Ingest only understands 64-bit integers.
        let value = u64::try_from(value).unwrap_or(u64::MAX);
        self.record.insert(field.name().to_string(), value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record.insert(field.name().to_string(), value.into());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record
            .insert(field.name().to_string(), format!("{:?}", value).into());
    }
}

fn serialize_to_ndjson<W, V>(mut writer: W, value: &V) -> io::Result<()>
where
    W: io::Write,
    V: ?Sized + serde::Serialize,
{
    serde_json::to_writer(&mut writer, value)?;
    writer.write_all(b"\n")
}
