use crate::scan::decision::{RejectReason, ScanDecision};
use crate::scan::errors::ScanError;
use serde_json::{Map, Value};

pub fn decision_from_response(response: &Value) -> Result<ScanDecision, ScanError> {
    let Some(fields) = response.as_object() else {
        return Err(ScanError::MalformedResponse(format!(
            "expected a mapping, got {}",
            json_kind(response)
        )));
    };
    let status = match fields.get("status") {
        Some(Value::String(status)) => status,
        Some(other) => {
            return Err(ScanError::MalformedResponse(format!(
                "`status` must be a string, got {}",
                json_kind(other)
            )))
        }
        None => {
            return Err(ScanError::MalformedResponse(String::from(
                "missing `status`",
            )))
        }
    };

    let scanned_at_epoch_seconds = integer_field(fields, "scannedAt");
    if status.eq_ignore_ascii_case("accepted") {
        Ok(ScanDecision::Accepted {
            ticket_id: fields
                .get("ticketId")
                .and_then(Value::as_str)
                .map(str::to_string),
            scanned_at_epoch_seconds,
            remaining: integer_field(fields, "remaining"),
        })
    } else {
        Ok(ScanDecision::Rejected {
            reason: RejectReason::from_wire(fields.get("reason").and_then(Value::as_str)),
            scanned_at_epoch_seconds,
        })
    }
}

/// Integer and floating-point wire values are both accepted; fractions are truncated.
fn integer_field(fields: &Map<String, Value>, key: &str) -> Option<i64> {
    let Value::Number(number) = fields.get(key)? else {
        return None;
    };
    number
        .as_i64()
        .or_else(|| number.as_f64().map(|value| value as i64))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}
