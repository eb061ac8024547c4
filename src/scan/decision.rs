use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ScanDecision {
    #[serde(rename_all = "camelCase")]
    Accepted {
        ticket_id: Option<String>,
        scanned_at_epoch_seconds: Option<i64>,
        /// Entries still available after this scan, if the backend tracks them.
        remaining: Option<i64>,
    },
    #[serde(rename_all = "camelCase")]
    Rejected {
        reason: RejectReason,
        /// Only populated when the ticket was already scanned.
        scanned_at_epoch_seconds: Option<i64>,
    },
}

impl ScanDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ScanDecision::Accepted { .. })
    }

    pub fn outcome(&self) -> &'static str {
        match self {
            ScanDecision::Accepted { .. } => "accepted",
            ScanDecision::Rejected { .. } => "rejected",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    Unregistered,
    AlreadyScanned,
    BadSignature,
    Revoked,
    Unknown,
}

impl RejectReason {
    pub fn from_wire(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return RejectReason::Unknown;
        };
        match value.to_ascii_uppercase().as_str() {
            "UNREGISTERED" => RejectReason::Unregistered,
            "ALREADY_SCANNED" => RejectReason::AlreadyScanned,
            "BAD_SIGNATURE" => RejectReason::BadSignature,
            "REVOKED" => RejectReason::Revoked,
            _ => RejectReason::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Unregistered => "UNREGISTERED",
            RejectReason::AlreadyScanned => "ALREADY_SCANNED",
            RejectReason::BadSignature => "BAD_SIGNATURE",
            RejectReason::Revoked => "REVOKED",
            RejectReason::Unknown => "UNKNOWN",
        }
    }
}
