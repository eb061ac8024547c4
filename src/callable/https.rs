use crate::auth::IdToken;
use crate::callable::requests::CallableRequest;
use crate::callable::responses::{CallableErrorEnvelope, CallableResponse};
use crate::callable::{CallableClient, CallableError};
use crate::endpoints::base_url;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

/// Invokes HTTPS callable functions: `POST {functions_url}/{name}` with `{"data": ...}`.
#[derive(Clone, Debug)]
pub struct HttpsCallableClient {
    http_client: Client,
    functions_url: Url,
}

impl HttpsCallableClient {
    pub fn new(functions_url: Url) -> Self {
        Self {
            http_client: Client::new(),
            functions_url: base_url(functions_url),
        }
    }

    pub fn endpoint(&self, name: &str) -> Result<Url, CallableError> {
        Ok(self.functions_url.join(name)?)
    }
}

#[async_trait]
impl CallableClient for HttpsCallableClient {
    async fn call(
        &self,
        name: &str,
        payload: Value,
        id_token: &IdToken,
    ) -> Result<Value, CallableError> {
        let response = self
            .http_client
            .post(self.endpoint(name)?)
            .bearer_auth(id_token.as_str())
            .json(&CallableRequest { data: &payload })
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(
                match serde_json::from_slice::<CallableErrorEnvelope>(&body) {
                    Ok(envelope) => CallableError::Remote {
                        status: envelope.error.status,
                        message: envelope.error.message,
                        details: envelope.error.details,
                    },
                    Err(_) => CallableError::Http {
                        status,
                        body: String::from_utf8_lossy(&body).into_owned(),
                    },
                },
            );
        }

        let envelope: CallableResponse = serde_json::from_slice(&body)?;
        Ok(envelope.result)
    }
}
