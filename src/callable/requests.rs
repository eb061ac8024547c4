use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct CallableRequest<'d> {
    pub data: &'d Value,
}
