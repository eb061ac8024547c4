use http::StatusCode;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum CallableError {
    #[error("callable request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("callable returned `{status}`: {message}")]
    Remote {
        status: String,
        message: String,
        details: Option<Value>,
    },
    #[error("callable returned HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },
    #[error("callable returned an undecodable body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid callable URL: {0}")]
    Url(#[from] url::ParseError),
}
