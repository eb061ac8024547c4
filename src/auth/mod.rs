use crate::auth::env::{SCANNER_API_KEY, SCANNER_DEV_SIGNING_KEY, SCANNER_REFRESH_TOKEN};
use crate::auth::secure_token::SecureTokenAuth;
use crate::auth::signing_key::SigningKeyAuth;
use crate::cli::Args;
use crate::warn_if_env_var_is_missing;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

pub mod env;
pub mod errors;
pub mod requests;
pub mod responses;
pub mod secure_token;
pub mod signing_key;

pub use errors::AuthError;

/// Source of the signed-in staff member, if any.
pub trait AuthProvider: Send + Sync {
    fn current_principal(&self) -> Option<Arc<dyn Principal>>;
}

#[async_trait]
pub trait Principal: Send + Sync {
    /// `None` while the provider doesn't know who is signed in yet.
    fn uid(&self) -> Option<String>;

    /// Returns a bearer token for this principal. With `force_refresh` the provider must
    /// mint a new token instead of handing out a cached one.
    async fn id_token(&self, force_refresh: bool) -> Result<IdToken, AuthError>;
}

#[derive(Clone, PartialEq, Eq)]
pub struct IdToken {
    value: String,
    expires_at: SystemTime,
}

impl IdToken {
    pub fn new(value: impl Into<String>, expires_at: SystemTime) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> SystemTime {
        self.expires_at
    }

    pub fn is_usable_at(&self, now: SystemTime, margin: Duration) -> bool {
        now + margin < self.expires_at
    }
}

impl fmt::Debug for IdToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

pub fn init(args: &Args) -> Result<Arc<dyn AuthProvider>, AuthError> {
    if let Some(uid) = &args.dev_signing_uid {
        let signing_key = std::env::var(SCANNER_DEV_SIGNING_KEY).map_err(|_| {
            AuthError::Config(format!(
                "`--dev-signing-uid` requires the `{}` environment variable",
                SCANNER_DEV_SIGNING_KEY
            ))
        })?;
        tracing::warn!(uid = %uid, "Using locally signed development tokens.");
        return Ok(Arc::new(SigningKeyAuth::new(signing_key.as_bytes(), uid)?));
    }

    let api_key = std::env::var(SCANNER_API_KEY).map_err(|_| {
        AuthError::Config(format!(
            "the `{}` environment variable isn't set",
            SCANNER_API_KEY
        ))
    })?;
    warn_if_env_var_is_missing!(
        SCANNER_REFRESH_TOKEN,
        "Nobody is signed in, every scan will be refused."
    );
    let refresh_token = std::env::var(SCANNER_REFRESH_TOKEN).ok();
    Ok(Arc::new(SecureTokenAuth::new(
        args.auth_url.clone(),
        api_key,
        refresh_token,
    )?))
}
