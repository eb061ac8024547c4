use crate::auth::{AuthError, AuthProvider, IdToken, Principal};
use crate::clock::unix_timestamp;
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use jwt::{SignWithKey, VerifyWithKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, UNIX_EPOCH};

pub type SigningKey = Hmac<Sha256>;

const DEV_TOKEN_LIFETIME: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct DevTokenClaims {
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
}

pub fn signing_key(secret: &[u8]) -> Result<SigningKey, AuthError> {
    Hmac::new_from_slice(secret)
        .map_err(|_| AuthError::Config(String::from("invalid development signing key")))
}

/// Verifies a development token the way a local validation backend would.
pub fn decode_token(key: &SigningKey, token: &str) -> Result<DevTokenClaims, AuthError> {
    let claims: DevTokenClaims = token.verify_with_key(key)?;
    if claims.exp <= unix_timestamp() {
        return Err(AuthError::Expired {
            expired_at: claims.exp,
        });
    }
    Ok(claims)
}

/// Mints HS256 tokens locally for emulator and on-site test backends that share the secret.
pub struct SigningKeyAuth {
    key: SigningKey,
    principal: RwLock<Option<Arc<SigningKeyPrincipal>>>,
}

impl SigningKeyAuth {
    pub fn new(secret: &[u8], uid: impl Into<String>) -> Result<Self, AuthError> {
        let auth = Self {
            key: signing_key(secret)?,
            principal: RwLock::new(None),
        };
        auth.sign_in(uid);
        Ok(auth)
    }

    pub fn sign_in(&self, uid: impl Into<String>) {
        let principal = SigningKeyPrincipal {
            uid: uid.into(),
            key: self.key.clone(),
            lifetime: DEV_TOKEN_LIFETIME,
        };
        *self
            .principal
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(principal));
    }

    pub fn sign_out(&self) {
        *self
            .principal
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl AuthProvider for SigningKeyAuth {
    fn current_principal(&self) -> Option<Arc<dyn Principal>> {
        self.principal
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .map(|principal| principal as Arc<dyn Principal>)
    }
}

pub struct SigningKeyPrincipal {
    uid: String,
    key: SigningKey,
    lifetime: Duration,
}

#[async_trait]
impl Principal for SigningKeyPrincipal {
    fn uid(&self) -> Option<String> {
        Some(self.uid.clone())
    }

    // Minting is local and cheap, so every call yields a new token.
    async fn id_token(&self, _force_refresh: bool) -> Result<IdToken, AuthError> {
        let issued_at = unix_timestamp();
        let expires_at = issued_at + self.lifetime.as_secs();
        let claims = DevTokenClaims {
            sub: self.uid.clone(),
            iat: issued_at,
            exp: expires_at,
        };
        let token = claims.sign_with_key(&self.key)?;
        Ok(IdToken::new(
            token,
            UNIX_EPOCH + Duration::from_secs(expires_at),
        ))
    }
}
