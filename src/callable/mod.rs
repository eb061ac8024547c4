use crate::auth::IdToken;
use async_trait::async_trait;
use serde_json::Value;

pub mod errors;
pub mod https;
pub mod requests;
pub mod responses;

pub use errors::CallableError;

/// A named remote procedure taking and returning JSON.
#[async_trait]
pub trait CallableClient: Send + Sync {
    async fn call(
        &self,
        name: &str,
        payload: Value,
        id_token: &IdToken,
    ) -> Result<Value, CallableError>;
}
