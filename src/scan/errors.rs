use crate::auth::AuthError;
use crate::callable::CallableError;
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Please login to scan tickets")]
    NotAuthenticated,
    #[error("{0}")]
    InvalidInput(InvalidInput),
    #[error("Network connection failed. Please check your internet connection.")]
    NetworkFailure(#[source] AuthError),
    #[error("Session expired. Please login again")]
    SessionExpired(#[source] AuthError),
    #[error("Malformed validation response: {0}")]
    MalformedResponse(String),
    /// Whatever the remote call failed with, untouched.
    #[error(transparent)]
    Remote(#[from] CallableError),
}

impl ScanError {
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::NotAuthenticated => "not_authenticated",
            ScanError::InvalidInput(_) => "invalid_input",
            ScanError::NetworkFailure(_) => "network_failure",
            ScanError::SessionExpired(_) => "session_expired",
            ScanError::MalformedResponse(_) => "malformed_response",
            ScanError::Remote(_) => "remote",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidInput {
    BlankQrText,
    BlankEventId,
}

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidInput::BlankQrText => f.write_str("QR code is empty"),
            InvalidInput::BlankEventId => f.write_str("Event id is empty"),
        }
    }
}
