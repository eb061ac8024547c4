#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token refresh request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("auth provider rejected the refresh: {code}")]
    Rejected { code: String },
    #[error("unexpected token endpoint response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("token error: {0}")]
    Token(#[from] jwt::Error),
    #[error("token expired at {expired_at}")]
    Expired { expired_at: u64 },
    #[error("auth provider is misconfigured: {0}")]
    Config(String),
    #[error("{0}")]
    Provider(String),
}
