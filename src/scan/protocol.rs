use serde::Serialize;
use serde_json::Value;

/// Revision of the remote validation contract. A build talks to exactly one of them and never
/// falls back to the other.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationProtocol {
    V1,
    V2 { device_id: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationRequest<'a> {
    qr_text: &'a str,
    event_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    device_id: Option<&'a str>,
}

impl ValidationProtocol {
    pub fn function_name(&self) -> &'static str {
        match self {
            ValidationProtocol::V1 => "validateEntryByPass",
            ValidationProtocol::V2 { .. } => "validateEntryByPassV2",
        }
    }

    pub fn payload(&self, qr_text: &str, event_id: &str) -> Value {
        let device_id = match self {
            ValidationProtocol::V1 => None,
            ValidationProtocol::V2 { device_id } => Some(device_id.as_str()),
        };
        let request = ValidationRequest {
            qr_text,
            event_id,
            device_id,
        };
        // A struct of string fields always serializes.
        serde_json::to_value(request).unwrap_or(Value::Null)
    }
}
