use crate::auth::AuthError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RefreshTokenResponse {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: ExpiresIn,
    pub user_id: String,
}

/// The token endpoint sends `expires_in` as a decimal string, emulators sometimes as a number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ExpiresIn {
    Seconds(u64),
    Text(String),
}

impl ExpiresIn {
    pub fn seconds(&self) -> Result<u64, AuthError> {
        match self {
            ExpiresIn::Seconds(seconds) => Ok(*seconds),
            ExpiresIn::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| AuthError::Provider(format!("invalid `expires_in` value {text:?}"))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshErrorEnvelope {
    pub error: RefreshErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct RefreshErrorBody {
    pub message: String,
}
