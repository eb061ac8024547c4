use crate::scan::ScanDecision;
use serde::Serialize;

#[derive(Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScanReport {
    Decision(ScanDecision),
    Failure(FailureReport),
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    pub outcome: &'static str,
    pub kind: &'static str,
    pub message: String,
}

impl ScanReport {
    pub fn failure(kind: &'static str, message: String) -> Self {
        ScanReport::Failure(FailureReport {
            outcome: "error",
            kind,
            message,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KioskSummary {
    pub accepted: u64,
    pub rejected: u64,
    pub failed: u64,
}

impl KioskSummary {
    pub fn record(&mut self, report: &ScanReport) {
        match report {
            ScanReport::Decision(decision) if decision.is_accepted() => self.accepted += 1,
            ScanReport::Decision(_) => self.rejected += 1,
            ScanReport::Failure(_) => self.failed += 1,
        }
    }
}
