use crate::app_context::AppContext;
use crate::kiosk::responses::{KioskSummary, ScanReport};
use futures_util::StreamExt;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_stream::wrappers::SplitStream;

pub mod responses;

/// Feeds scanner input (one QR payload per line) through the validator and writes one JSON
/// report per scan.
pub struct KioskRunner {
    app_context: AppContext,
}

impl KioskRunner {
    pub fn new(app_context: AppContext) -> Self {
        Self { app_context }
    }

    pub async fn run<R, W>(&self, input: R, mut output: W) -> io::Result<KioskSummary>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut summary = KioskSummary::default();
        // Scanners may type bytes that aren't UTF-8, so lines are read raw and decoded per scan.
        let mut lines = SplitStream::new(input.split(b'\n'));
        while let Some(line) = lines.next().await {
            let line = line?;
            let report = match String::from_utf8(line) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.scan(&line).await,
                Err(err) => {
                    tracing::warn!(
                        task = "scan_failure",
                        kind = "invalid_input",
                        length = err.as_bytes().len() as u64,
                        "Scanned line is not valid UTF-8."
                    );
                    ScanReport::failure(
                        "invalid_input",
                        String::from("QR code could not be read. Please scan again."),
                    )
                }
            };
            let mut encoded = serde_json::to_vec(&report)?;
            encoded.push(b'\n');
            output.write_all(&encoded).await?;
            output.flush().await?;
            summary.record(&report);
        }
        Ok(summary)
    }

    /// The validator has no deadline of its own, so the configured one wraps the whole call.
    pub async fn scan(&self, qr_text: &str) -> ScanReport {
        let attempt = self
            .app_context
            .validator
            .validate(qr_text, &self.app_context.event_id);
        let result = match self.app_context.scan_deadline {
            Some(deadline) => match tokio::time::timeout(deadline, attempt).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        task = "scan_failure",
                        kind = "deadline",
                        deadline_ms = deadline.as_millis() as u64,
                    );
                    return ScanReport::failure(
                        "deadline",
                        format!("No answer within {} ms. Please scan again.", deadline.as_millis()),
                    );
                }
            },
            None => attempt.await,
        };
        match result {
            Ok(decision) => ScanReport::Decision(decision),
            Err(err) => ScanReport::failure(err.kind(), err.to_string()),
        }
    }
}
