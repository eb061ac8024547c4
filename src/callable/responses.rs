use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct CallableResponse {
    // Functions that return nothing answer with `{"result": null}` or omit it.
    #[serde(default)]
    pub result: Value,
}

#[derive(Debug, Deserialize)]
pub struct CallableErrorEnvelope {
    pub error: CallableErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct CallableErrorBody {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Option<Value>,
}
