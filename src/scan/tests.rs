use crate::auth::{AuthError, AuthProvider, IdToken, Principal};
use crate::callable::{CallableClient, CallableError};
use crate::scan::{
    InvalidInput, RejectReason, ScanDecision, ScanError, ScanValidator, ValidationProtocol,
};
use async_trait::async_trait;
use futures_util::future::join_all;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

pub struct FakeAuth {
    principal: Option<Arc<FakePrincipal>>,
}

impl FakeAuth {
    pub fn signed_in(principal: Arc<FakePrincipal>) -> Arc<Self> {
        Arc::new(Self {
            principal: Some(principal),
        })
    }

    pub fn signed_out() -> Arc<Self> {
        Arc::new(Self { principal: None })
    }
}

impl AuthProvider for FakeAuth {
    fn current_principal(&self) -> Option<Arc<dyn Principal>> {
        self.principal
            .clone()
            .map(|principal| principal as Arc<dyn Principal>)
    }
}

pub struct FakePrincipal {
    failure: Option<fn() -> AuthError>,
    refreshes: AtomicUsize,
    forced_refreshes: AtomicUsize,
}

impl FakePrincipal {
    pub fn healthy() -> Arc<Self> {
        Arc::new(Self {
            failure: None,
            refreshes: AtomicUsize::new(0),
            forced_refreshes: AtomicUsize::new(0),
        })
    }

    pub fn failing(failure: fn() -> AuthError) -> Arc<Self> {
        Arc::new(Self {
            failure: Some(failure),
            refreshes: AtomicUsize::new(0),
            forced_refreshes: AtomicUsize::new(0),
        })
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn forced_refreshes(&self) -> usize {
        self.forced_refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Principal for FakePrincipal {
    fn uid(&self) -> Option<String> {
        Some(String::from("staff-1"))
    }

    async fn id_token(&self, force_refresh: bool) -> Result<IdToken, AuthError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if force_refresh {
            self.forced_refreshes.fetch_add(1, Ordering::SeqCst);
        }
        match self.failure {
            Some(failure) => Err(failure()),
            None => Ok(IdToken::new(
                "fake-token",
                SystemTime::now() + Duration::from_secs(3600),
            )),
        }
    }
}

pub enum Reply {
    Fixed(Value),
    /// Accepts every ticket, using the QR text as the ticket id.
    Echo,
    Fail(fn() -> CallableError),
    Hang,
}

pub struct FakeCallable {
    reply: Reply,
    calls: Mutex<Vec<(String, Value)>>,
}

impl FakeCallable {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn responding(response: Value) -> Arc<Self> {
        Self::new(Reply::Fixed(response))
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CallableClient for FakeCallable {
    async fn call(
        &self,
        name: &str,
        payload: Value,
        id_token: &IdToken,
    ) -> Result<Value, CallableError> {
        assert_eq!(id_token.as_str(), "fake-token");
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), payload.clone()));
        match &self.reply {
            Reply::Fixed(response) => Ok(response.clone()),
            Reply::Echo => {
                let qr_text = payload["qrText"].as_str().unwrap_or_default().to_string();
                // Stagger the answers so concurrent calls finish out of order.
                let delay = Duration::from_millis((qr_text.len() % 7) as u64);
                tokio::time::sleep(delay).await;
                Ok(json!({ "status": "accepted", "ticketId": qr_text }))
            }
            Reply::Fail(failure) => Err(failure()),
            Reply::Hang => std::future::pending().await,
        }
    }
}

pub fn validator(auth: Arc<FakeAuth>, callable: Arc<FakeCallable>) -> ScanValidator {
    ScanValidator::new(auth, callable, ValidationProtocol::V1)
}

async fn decide(response: Value) -> Result<ScanDecision, ScanError> {
    let callable = FakeCallable::responding(response);
    validator(FakeAuth::signed_in(FakePrincipal::healthy()), callable)
        .validate("qr-payload", "event-1")
        .await
}

#[tokio::test]
async fn test_blank_input_never_reaches_network() {
    let principal = FakePrincipal::healthy();
    let callable = FakeCallable::responding(json!({ "status": "accepted" }));
    let validator = validator(FakeAuth::signed_in(principal.clone()), callable.clone());

    for (qr_text, event_id, expected) in [
        ("", "event-1", InvalidInput::BlankQrText),
        (" \t\n", "event-1", InvalidInput::BlankQrText),
        ("qr-payload", "", InvalidInput::BlankEventId),
        ("qr-payload", "   ", InvalidInput::BlankEventId),
    ] {
        let result = validator.validate(qr_text, event_id).await;
        assert!(
            matches!(result, Err(ScanError::InvalidInput(reason)) if reason == expected),
            "{qr_text:?} / {event_id:?}"
        );
    }

    assert_eq!(principal.refreshes(), 0);
    assert!(callable.calls().is_empty());
}

#[tokio::test]
async fn test_signed_out_staff_is_refused_before_input_checks() {
    let callable = FakeCallable::responding(json!({ "status": "accepted" }));
    let validator = validator(FakeAuth::signed_out(), callable.clone());

    for (qr_text, event_id) in [("qr-payload", "event-1"), ("", "")] {
        let err = validator.validate(qr_text, event_id).await.unwrap_err();
        assert!(matches!(err, ScanError::NotAuthenticated));
        assert_eq!(err.to_string(), "Please login to scan tickets");
    }

    assert!(callable.calls().is_empty());
}

#[tokio::test]
async fn test_token_is_force_refreshed_before_calling() {
    let principal = FakePrincipal::healthy();
    let callable = FakeCallable::responding(json!({ "status": "accepted" }));
    let validator = validator(FakeAuth::signed_in(principal.clone()), callable.clone());

    validator.validate("qr-payload", "event-1").await.unwrap();
    validator.validate("qr-payload", "event-1").await.unwrap();

    assert_eq!(principal.forced_refreshes(), 2);
    assert_eq!(callable.calls().len(), 2);
}

#[tokio::test]
async fn test_network_refresh_failure_is_classified() {
    let principal = FakePrincipal::failing(|| {
        AuthError::Provider(String::from(
            "A network error (such as timeout, interrupted connection or unreachable host) \
             has occurred.",
        ))
    });
    let callable = FakeCallable::responding(json!({ "status": "accepted" }));
    let validator = validator(FakeAuth::signed_in(principal), callable.clone());

    let err = validator.validate("qr-payload", "event-1").await.unwrap_err();

    assert!(matches!(err, ScanError::NetworkFailure(_)));
    assert_eq!(
        err.to_string(),
        "Network connection failed. Please check your internet connection."
    );
    assert!(callable.calls().is_empty());
}

#[tokio::test]
async fn test_other_refresh_failures_mean_session_expired() {
    let failures: [fn() -> AuthError; 3] = [
        || AuthError::Rejected {
            code: String::from("TOKEN_EXPIRED"),
        },
        || AuthError::Provider(String::from("USER_DISABLED")),
        || AuthError::Expired { expired_at: 0 },
    ];
    for failure in failures {
        let callable = FakeCallable::responding(json!({ "status": "accepted" }));
        let validator = validator(
            FakeAuth::signed_in(FakePrincipal::failing(failure)),
            callable.clone(),
        );

        let err = validator.validate("qr-payload", "event-1").await.unwrap_err();

        assert!(matches!(err, ScanError::SessionExpired(_)), "{err:?}");
        assert!(callable.calls().is_empty());
    }
}

#[tokio::test]
async fn test_request_uses_fixed_contract_and_trimmed_input() {
    let callable = FakeCallable::responding(json!({ "status": "accepted" }));
    let validator = validator(FakeAuth::signed_in(FakePrincipal::healthy()), callable.clone());

    validator.validate("  qr-payload\n", " event-1 ").await.unwrap();

    assert_eq!(
        callable.calls(),
        vec![(
            String::from("validateEntryByPass"),
            json!({ "qrText": "qr-payload", "eventId": "event-1" })
        )]
    );
}

#[tokio::test]
async fn test_v2_contract_sends_device_id() {
    let callable = FakeCallable::responding(json!({ "status": "accepted" }));
    let validator = ScanValidator::new(
        FakeAuth::signed_in(FakePrincipal::healthy()),
        callable.clone(),
        ValidationProtocol::V2 {
            device_id: String::from("gate-3"),
        },
    );

    assert_eq!(validator.protocol().function_name(), "validateEntryByPassV2");
    validator.validate("qr-payload", "event-1").await.unwrap();

    let (name, payload) = callable.calls().remove(0);
    assert_eq!(name, "validateEntryByPassV2");
    assert_eq!(payload["deviceId"], "gate-3");
}

#[tokio::test]
async fn test_accepted_response_with_all_fields() {
    let decision = decide(json!({
        "status": "accepted",
        "ticketId": "t1",
        "scannedAt": 1_700_000_000,
        "remaining": 5,
    }))
    .await
    .unwrap();

    assert_eq!(
        decision,
        ScanDecision::Accepted {
            ticket_id: Some(String::from("t1")),
            scanned_at_epoch_seconds: Some(1_700_000_000),
            remaining: Some(5),
        }
    );
}

#[tokio::test]
async fn test_bare_accepted_response() {
    let decision = decide(json!({ "status": "accepted" })).await.unwrap();

    assert_eq!(
        decision,
        ScanDecision::Accepted {
            ticket_id: None,
            scanned_at_epoch_seconds: None,
            remaining: None,
        }
    );
}

#[tokio::test]
async fn test_already_scanned_in_any_case() {
    for reason in ["already_scanned", "ALREADY_SCANNED", "Already_Scanned"] {
        let decision = decide(json!({
            "status": "rejected",
            "reason": reason,
            "scannedAt": 1_700_000_000,
        }))
        .await
        .unwrap();

        assert_eq!(
            decision,
            ScanDecision::Rejected {
                reason: RejectReason::AlreadyScanned,
                scanned_at_epoch_seconds: Some(1_700_000_000),
            }
        );
    }
}

#[tokio::test]
async fn test_missing_or_unknown_reason() {
    for response in [
        json!({ "status": "rejected" }),
        json!({ "status": "rejected", "reason": "bogus" }),
        json!({ "status": "REJECTED", "reason": null }),
    ] {
        let decision = decide(response).await.unwrap();

        assert_eq!(
            decision,
            ScanDecision::Rejected {
                reason: RejectReason::Unknown,
                scanned_at_epoch_seconds: None,
            }
        );
    }
}

#[tokio::test]
async fn test_malformed_responses() {
    for response in [
        Value::Null,
        json!("accepted"),
        json!(["accepted"]),
        json!({ "ticketId": "t1" }),
    ] {
        let err = decide(response.clone()).await.unwrap_err();
        assert!(matches!(err, ScanError::MalformedResponse(_)), "{response}");
    }
}

#[tokio::test]
async fn test_float_remaining() {
    let decision = decide(json!({ "status": "accepted", "remaining": 10.0 }))
        .await
        .unwrap();

    assert!(matches!(
        decision,
        ScanDecision::Accepted {
            remaining: Some(10),
            ..
        }
    ));
}

#[tokio::test]
async fn test_remote_failure_is_propagated_verbatim() {
    let callable = FakeCallable::new(Reply::Fail(|| CallableError::Remote {
        status: String::from("PERMISSION_DENIED"),
        message: String::from("Not a staff member of this event's organization"),
        details: None,
    }));
    let validator = validator(FakeAuth::signed_in(FakePrincipal::healthy()), callable);

    let err = validator.validate("qr-payload", "event-1").await.unwrap_err();

    match err {
        ScanError::Remote(CallableError::Remote {
            status, message, ..
        }) => {
            assert_eq!(status, "PERMISSION_DENIED");
            assert_eq!(message, "Not a staff member of this event's organization");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_remote_failure_mentioning_network_is_not_reclassified() {
    let callable = FakeCallable::new(Reply::Fail(|| CallableError::Remote {
        status: String::from("UNAVAILABLE"),
        message: String::from("network timeout upstream"),
        details: None,
    }));
    let validator = validator(FakeAuth::signed_in(FakePrincipal::healthy()), callable);

    let err = validator.validate("qr-payload", "event-1").await.unwrap_err();

    assert!(matches!(err, ScanError::Remote(_)));
}

#[tokio::test]
async fn test_concurrent_scans_do_not_interfere() {
    let callable = FakeCallable::new(Reply::Echo);
    let validator = validator(FakeAuth::signed_in(FakePrincipal::healthy()), callable.clone());
    let qr_texts: Vec<String> = (0..32).map(|i| format!("ticket-{i}-{}", "x".repeat(i))).collect();

    let decisions = join_all(
        qr_texts
            .iter()
            .map(|qr_text| validator.validate(qr_text, "event-1")),
    )
    .await;

    for (qr_text, decision) in qr_texts.iter().zip(decisions) {
        match decision.unwrap() {
            ScanDecision::Accepted { ticket_id, .. } => {
                assert_eq!(ticket_id.as_deref(), Some(qr_text.as_str()))
            }
            other => panic!("unexpected decision: {other:?}"),
        }
    }
    assert_eq!(callable.calls().len(), qr_texts.len());
}

#[tokio::test]
async fn test_cancelled_scan_yields_no_decision() {
    let callable = FakeCallable::new(Reply::Hang);
    let validator = validator(FakeAuth::signed_in(FakePrincipal::healthy()), callable.clone());

    let outcome = tokio::time::timeout(
        Duration::from_millis(20),
        validator.validate("qr-payload", "event-1"),
    )
    .await;

    assert!(outcome.is_err());
    assert_eq!(callable.calls().len(), 1);
}
