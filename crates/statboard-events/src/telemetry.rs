use serde::{Deserialize, Serialize};
use statboard_core::{SessionToken, SubjectId};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info};
use uuid::Uuid;

const TELEMETRY_TARGET: &str = "statboard::events::telemetry";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionLifecycle {
    Start,
    Settled,
    Failed,
    Discarded,
}

impl fmt::Display for SessionLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "session_start"),
            Self::Settled => write!(f, "session_settled"),
            Self::Failed => write!(f, "session_failed"),
            Self::Discarded => write!(f, "session_discarded"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTelemetry {
    pub correlation_id: String,
    pub subject: SubjectId,
    pub token: SessionToken,
    pub lifecycle: SessionLifecycle,
    pub error_reason: Option<String>,
    pub duration_ms: Option<u128>,
}

impl SessionTelemetry {
    fn new(
        correlation_id: &str,
        subject: SubjectId,
        token: SessionToken,
        lifecycle: SessionLifecycle,
    ) -> Self {
        Self {
            correlation_id: correlation_id.to_string(),
            subject,
            token,
            lifecycle,
            error_reason: None,
            duration_ms: None,
        }
    }

    fn now_unix_ms() -> u128 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default()
    }
}

pub fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn session_start(
    correlation_id: &str,
    subject: SubjectId,
    token: SessionToken,
) -> SessionTelemetry {
    let telemetry =
        SessionTelemetry::new(correlation_id, subject, token, SessionLifecycle::Start);
    info!(
        target: TELEMETRY_TARGET,
        subject = %telemetry.subject,
        token = %telemetry.token,
        correlation_id = %telemetry.correlation_id,
        lifecycle = %telemetry.lifecycle,
        timestamp_ms = SessionTelemetry::now_unix_ms(),
        "session_start"
    );
    telemetry
}

pub fn session_settled(
    correlation_id: &str,
    subject: SubjectId,
    token: SessionToken,
    duration_ms: Option<u128>,
) -> SessionTelemetry {
    let mut telemetry =
        SessionTelemetry::new(correlation_id, subject, token, SessionLifecycle::Settled);
    telemetry.duration_ms = duration_ms;
    info!(
        target: TELEMETRY_TARGET,
        subject = %telemetry.subject,
        token = %telemetry.token,
        correlation_id = %telemetry.correlation_id,
        lifecycle = %telemetry.lifecycle,
        duration_ms = ?telemetry.duration_ms,
        timestamp_ms = SessionTelemetry::now_unix_ms(),
        "session_settled"
    );
    telemetry
}

pub fn session_failed(
    correlation_id: &str,
    subject: SubjectId,
    token: SessionToken,
    reason: Option<String>,
) -> SessionTelemetry {
    let mut telemetry =
        SessionTelemetry::new(correlation_id, subject, token, SessionLifecycle::Failed);
    telemetry.error_reason = reason;
    let error_reason = telemetry.error_reason.as_deref().unwrap_or("unclassified");

    error!(
        target: TELEMETRY_TARGET,
        subject = %telemetry.subject,
        token = %telemetry.token,
        correlation_id = %telemetry.correlation_id,
        lifecycle = %telemetry.lifecycle,
        error = %error_reason,
        timestamp_ms = SessionTelemetry::now_unix_ms(),
        "session_failed"
    );
    telemetry
}

/// Stale settlements are expected under out-of-order completion, so they only
/// log at debug.
pub fn session_discarded(
    correlation_id: &str,
    subject: SubjectId,
    token: SessionToken,
) -> SessionTelemetry {
    let telemetry =
        SessionTelemetry::new(correlation_id, subject, token, SessionLifecycle::Discarded);
    debug!(
        target: TELEMETRY_TARGET,
        subject = %telemetry.subject,
        token = %telemetry.token,
        correlation_id = %telemetry.correlation_id,
        lifecycle = %telemetry.lifecycle,
        timestamp_ms = SessionTelemetry::now_unix_ms(),
        "session_discarded"
    );
    telemetry
}
