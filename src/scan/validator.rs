use crate::auth::AuthProvider;
use crate::callable::CallableClient;
use crate::clock::unix_timestamp;
use crate::scan::classify::classify_refresh_failure;
use crate::scan::decision::ScanDecision;
use crate::scan::errors::{InvalidInput, ScanError};
use crate::scan::protocol::ValidationProtocol;
use crate::scan::response::decision_from_response;
use std::sync::Arc;
use tokio::time::Instant;

/// Turns a scanned QR payload into an entry decision for one event.
///
/// Every call is single-shot: it checks its inputs locally, force-refreshes the staff member's
/// token, asks the remote validation procedure once and maps the answer. Nothing is retried
/// and nothing is shared between calls, so concurrent scans are independent. Dropping the
/// returned future cancels whichever round trip is in flight.
#[derive(Clone)]
pub struct ScanValidator {
    auth: Arc<dyn AuthProvider>,
    callable: Arc<dyn CallableClient>,
    protocol: ValidationProtocol,
}

impl ScanValidator {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        callable: Arc<dyn CallableClient>,
        protocol: ValidationProtocol,
    ) -> Self {
        Self {
            auth,
            callable,
            protocol,
        }
    }

    pub fn protocol(&self) -> &ValidationProtocol {
        &self.protocol
    }

    pub async fn validate(&self, qr_text: &str, event_id: &str) -> Result<ScanDecision, ScanError> {
        let start_time = Instant::now();
        let result = self.decide(qr_text, event_id).await;
        let processing_time_ns = start_time.elapsed().as_nanos();
        let timestamp = unix_timestamp();

        match &result {
            Ok(decision) => {
                let reason = match decision {
                    ScanDecision::Rejected { reason, .. } => reason.as_str(),
                    ScanDecision::Accepted { .. } => "",
                };
                tracing::info!(
                    task = "scan_decision",
                    event_id = event_id.trim(),
                    function = self.protocol.function_name(),
                    outcome = decision.outcome(),
                    reason,
                    processing_time_ms = processing_time_ns / 1_000_000,
                    timestamp,
                );
            }
            Err(ScanError::MalformedResponse(detail)) => {
                tracing::error!(
                    task = "malformed_response",
                    event_id = event_id.trim(),
                    function = self.protocol.function_name(),
                    detail = detail.as_str(),
                    timestamp,
                );
            }
            Err(err) => {
                tracing::warn!(
                    task = "scan_failure",
                    event_id = event_id.trim(),
                    function = self.protocol.function_name(),
                    kind = err.kind(),
                    error = %err,
                    processing_time_ms = processing_time_ns / 1_000_000,
                    timestamp,
                );
            }
        }

        result
    }

    async fn decide(&self, qr_text: &str, event_id: &str) -> Result<ScanDecision, ScanError> {
        let principal = self
            .auth
            .current_principal()
            .ok_or(ScanError::NotAuthenticated)?;

        let qr_text = qr_text.trim();
        if qr_text.is_empty() {
            return Err(ScanError::InvalidInput(InvalidInput::BlankQrText));
        }
        let event_id = event_id.trim();
        if event_id.is_empty() {
            return Err(ScanError::InvalidInput(InvalidInput::BlankEventId));
        }

        let id_token = principal
            .id_token(true)
            .await
            .map_err(classify_refresh_failure)?;
        tracing::debug!(
            uid = principal.uid().as_deref().unwrap_or("unknown"),
            event_id,
            function = self.protocol.function_name(),
            "Validating scan."
        );

        let response = self
            .callable
            .call(
                self.protocol.function_name(),
                self.protocol.payload(qr_text, event_id),
                &id_token,
            )
            .await?;

        decision_from_response(&response)
    }
}
