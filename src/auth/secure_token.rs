use crate::auth::requests::RefreshTokenRequest;
use crate::auth::responses::{RefreshErrorEnvelope, RefreshTokenResponse};
use crate::auth::{AuthError, AuthProvider, IdToken, Principal};
use crate::endpoints::base_url;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, SystemTime};
use url::Url;

/// Cached tokens closer than this to their expiry are refreshed even without `force_refresh`.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(5 * 60);

/// Signed-in session restored from a long-lived refresh token, exchanged for short-lived id
/// tokens at the secure token endpoint.
pub struct SecureTokenAuth {
    http_client: Client,
    token_url: Url,
    principal: RwLock<Option<Arc<SecureTokenPrincipal>>>,
}

impl SecureTokenAuth {
    pub fn new(
        auth_url: Url,
        api_key: String,
        refresh_token: Option<String>,
    ) -> Result<Self, AuthError> {
        let mut token_url = base_url(auth_url)
            .join("v1/token")
            .map_err(|err| AuthError::Config(format!("invalid auth URL: {err}")))?;
        token_url.query_pairs_mut().append_pair("key", &api_key);
        let auth = Self {
            http_client: Client::new(),
            token_url,
            principal: RwLock::new(None),
        };
        if let Some(refresh_token) = refresh_token {
            auth.restore_session(refresh_token);
        }
        Ok(auth)
    }

    pub fn restore_session(&self, refresh_token: String) {
        let principal = SecureTokenPrincipal {
            http_client: self.http_client.clone(),
            token_url: self.token_url.clone(),
            session: Mutex::new(Session {
                uid: None,
                refresh_token,
                cached: None,
            }),
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

impl AuthProvider for SecureTokenAuth {
    fn current_principal(&self) -> Option<Arc<dyn Principal>> {
        self.principal
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .map(|principal| principal as Arc<dyn Principal>)
    }
}

pub struct SecureTokenPrincipal {
    http_client: Client,
    token_url: Url,
    session: Mutex<Session>,
}

struct Session {
    // Only learned from the first refresh.
    uid: Option<String>,
    refresh_token: String,
    cached: Option<IdToken>,
}

impl SecureTokenPrincipal {
    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn exchange(&self, refresh_token: &str) -> Result<RefreshTokenResponse, AuthError> {
        let response = self
            .http_client
            .post(self.token_url.clone())
            .form(&RefreshTokenRequest {
                grant_type: "refresh_token",
                refresh_token,
            })
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let code = serde_json::from_slice::<RefreshErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| status.to_string());
            return Err(AuthError::Rejected { code });
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl Principal for SecureTokenPrincipal {
    fn uid(&self) -> Option<String> {
        self.session().uid.clone()
    }

    async fn id_token(&self, force_refresh: bool) -> Result<IdToken, AuthError> {
        // The lock is never held across the exchange so cancelling a refresh can't wedge it.
        let refresh_token = {
            let session = self.session();
            if !force_refresh {
                if let Some(cached) = &session.cached {
                    if cached.is_usable_at(SystemTime::now(), TOKEN_EXPIRY_MARGIN) {
                        return Ok(cached.clone());
                    }
                }
            }
            session.refresh_token.clone()
        };

        let refreshed = self.exchange(&refresh_token).await?;
        let lifetime = Duration::from_secs(refreshed.expires_in.seconds()?);
        let id_token = IdToken::new(refreshed.id_token, SystemTime::now() + lifetime);

        let mut session = self.session();
        tracing::debug!(uid = %refreshed.user_id, "Refreshed id token.");
        session.uid = Some(refreshed.user_id);
        session.refresh_token = refreshed.refresh_token;
        session.cached = Some(id_token.clone());
        Ok(id_token)
    }
}
