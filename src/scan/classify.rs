use crate::auth::AuthError;
use crate::scan::errors::ScanError;
use std::error::Error;
use std::io;

const NETWORK_MARKERS: [&str; 4] = ["network", "connection", "internet", "timeout"];

/// Token refresh failures caused by connectivity are worth a retry once the network is back;
/// anything else means the staff member has to sign in again.
pub fn classify_refresh_failure(error: AuthError) -> ScanError {
    if is_network_failure(&error) {
        ScanError::NetworkFailure(error)
    } else {
        ScanError::SessionExpired(error)
    }
}

// TODO: check a structured error code instead of message text once the token endpoint exposes
// a connectivity code.
pub fn is_network_failure(error: &(dyn Error + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(error) = current {
        if cause_is_network(error) || message_is_network(&error.to_string()) {
            return true;
        }
        current = error.source();
    }
    false
}

fn cause_is_network(error: &(dyn Error + 'static)) -> bool {
    if let Some(error) = error.downcast_ref::<reqwest::Error>() {
        return error.is_connect() || error.is_timeout();
    }
    if let Some(error) = error.downcast_ref::<io::Error>() {
        return matches!(
            error.kind(),
            io::ErrorKind::ConnectionRefused
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::NotConnected
                | io::ErrorKind::TimedOut
                | io::ErrorKind::HostUnreachable
                | io::ErrorKind::NetworkUnreachable
                | io::ErrorKind::NetworkDown
        );
    }
    false
}

fn message_is_network(message: &str) -> bool {
    let message = message.to_lowercase();
    NETWORK_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}
