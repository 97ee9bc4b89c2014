//! Request lifecycle for data-backed overlays.
//!
//! A [`RequestController`] runs at most one authoritative fetch at a time.
//! Starting a new session supersedes the previous one: its transport is
//! cancelled on a best-effort basis and its token stops being current. Fetch
//! tasks report back through a channel, and a settlement is only applied if
//! its token is still the current one when the owner drains it. That check is
//! the only guard against out-of-order completion; cancellation is never
//! relied upon.

use crate::cancellation::CancellationToken;
use crate::source::SubjectSource;
use statboard_core::{OverlayError, SessionToken, SubjectId};
use statboard_events::{Event, EventBus, telemetry};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Maps a raw fetch payload into what the presentational layer draws.
pub type Transform<R, D> = Box<dyn Fn(R) -> D>;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus<D> {
    /// No live session.
    Idle,
    Pending,
    Ok(D),
    Error(String),
}

impl<D> SessionStatus<D> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// A finished fetch, tagged with the session it belongs to.
#[derive(Debug)]
pub struct Settlement<R> {
    pub token: SessionToken,
    pub subject: SubjectId,
    pub outcome: Result<R, OverlayError>,
    pub elapsed: Duration,
}

/// What happened to a settlement handed to [`RequestController::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The settlement belonged to the live session and updated its status.
    Current,
    /// The settlement belonged to a superseded session and was dropped.
    Stale,
}

struct LiveSession {
    subject: SubjectId,
    token: SessionToken,
    cancel: CancellationToken,
    correlation_id: String,
}

pub struct RequestController<S: SubjectSource, D> {
    source: S,
    transform: Transform<S::Raw, D>,
    runtime: Handle,
    settlements_tx: UnboundedSender<Settlement<S::Raw>>,
    settlements_rx: UnboundedReceiver<Settlement<S::Raw>>,
    in_flight: usize,
    last_token: SessionToken,
    live: Option<LiveSession>,
    status: SessionStatus<D>,
    events: Option<EventBus>,
}

impl<S: SubjectSource, D> RequestController<S, D> {
    /// Fetch tasks are spawned onto `runtime`.
    pub fn new(source: S, transform: impl Fn(S::Raw) -> D + 'static, runtime: Handle) -> Self {
        let (settlements_tx, settlements_rx) = mpsc::unbounded_channel();
        Self {
            source,
            transform: Box::new(transform),
            runtime,
            settlements_tx,
            settlements_rx,
            in_flight: 0,
            last_token: SessionToken::default(),
            live: None,
            status: SessionStatus::Idle,
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.set_events(events);
        self
    }

    pub fn set_events(&mut self, events: EventBus) {
        self.events = Some(events);
    }

    pub fn status(&self) -> &SessionStatus<D> {
        &self.status
    }

    /// Subject of the live session, if any.
    pub fn subject(&self) -> Option<SubjectId> {
        self.live.as_ref().map(|live| live.subject)
    }

    /// Token a settlement must carry to be applied.
    pub fn current_token(&self) -> Option<SessionToken> {
        self.live.as_ref().map(|live| live.token)
    }

    /// Number of spawned fetches whose settlement has not been drained yet,
    /// superseded ones included.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start a session for `subject`, superseding any live one.
    pub fn start(&mut self, subject: SubjectId) -> SessionToken {
        self.stop();

        let token = self.last_token.next();
        self.last_token = token;
        let cancel = CancellationToken::new();
        let correlation_id = telemetry::new_correlation_id();

        let fetch = self.source.fetch(subject, cancel.clone());
        let tx = self.settlements_tx.clone();
        let task_cancel = cancel.clone();
        let started = Instant::now();
        self.runtime.spawn(async move {
            let outcome = tokio::select! {
                biased;
                _ = task_cancel.cancelled() => Err(OverlayError::Aborted),
                result = fetch => result,
            };
            let _ = tx.send(Settlement {
                token,
                subject,
                outcome,
                elapsed: started.elapsed(),
            });
        });
        self.in_flight += 1;

        telemetry::session_start(&correlation_id, subject, token);
        self.publish(Event::SessionStarted { subject, token });

        self.live = Some(LiveSession {
            subject,
            token,
            cancel,
            correlation_id,
        });
        self.status = SessionStatus::Pending;
        token
    }

    /// Supersede the live session, if any. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(live) = self.live.take() {
            live.cancel.cancel();
            debug!(subject = %live.subject, token = %live.token, "session stopped");
        }
        self.status = SessionStatus::Idle;
    }

    /// Apply a settlement if it belongs to the live session.
    pub fn apply(&mut self, settlement: Settlement<S::Raw>) -> Applied {
        let Settlement {
            token,
            subject,
            outcome,
            elapsed,
        } = settlement;

        let live = match &self.live {
            Some(live) if live.token == token => live,
            _ => {
                let correlation_id = self
                    .live
                    .as_ref()
                    .map(|live| live.correlation_id.as_str())
                    .unwrap_or("none");
                telemetry::session_discarded(correlation_id, subject, token);
                self.publish(Event::SessionDiscarded { subject, token });
                return Applied::Stale;
            }
        };

        // A settled session can not settle twice.
        if !self.status.is_pending() {
            return Applied::Stale;
        }

        match outcome {
            Ok(raw) => {
                telemetry::session_settled(
                    &live.correlation_id,
                    subject,
                    token,
                    Some(elapsed.as_millis()),
                );
                self.status = SessionStatus::Ok((self.transform)(raw));
                self.publish(Event::SessionSettled {
                    subject,
                    token,
                    ok: true,
                });
            }
            Err(error) => {
                telemetry::session_failed(
                    &live.correlation_id,
                    subject,
                    token,
                    Some(error.to_string()),
                );
                self.status = SessionStatus::Error(error.to_string());
                self.publish(Event::SessionSettled {
                    subject,
                    token,
                    ok: false,
                });
            }
        }
        Applied::Current
    }

    /// Apply every settlement that has already arrived, without blocking.
    /// Returns how many of them were current.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(settlement) = self.settlements_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            if self.apply(settlement) == Applied::Current {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next settlement and apply it. Returns `None` when no fetch
    /// is outstanding.
    pub async fn settle_next(&mut self) -> Option<Applied> {
        if self.in_flight == 0 {
            return None;
        }
        let settlement = self.settlements_rx.recv().await?;
        self.in_flight -= 1;
        Some(self.apply(settlement))
    }

    fn publish(&self, event: Event) {
        if let Some(events) = &self.events {
            events.publish(event);
        }
    }
}

impl<S: SubjectSource, D> Drop for RequestController<S, D> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FetchFuture;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::oneshot;

    /// Fetches that only complete when the test says so.
    #[derive(Clone, Default)]
    struct GatedSource {
        gates: Arc<Mutex<HashMap<i64, oneshot::Receiver<Result<u32, OverlayError>>>>>,
    }

    impl GatedSource {
        fn gate(&self, subject: i64) -> oneshot::Sender<Result<u32, OverlayError>> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().insert(subject, rx);
            tx
        }
    }

    impl SubjectSource for GatedSource {
        type Raw = u32;

        fn fetch(&self, subject: SubjectId, _cancel: CancellationToken) -> FetchFuture<u32> {
            let gate = self.gates.lock().remove(&subject.0);
            Box::pin(async move {
                match gate {
                    Some(rx) => rx
                        .await
                        .unwrap_or_else(|_| Err(OverlayError::fetch("gate dropped"))),
                    None => Err(OverlayError::fetch("no gate")),
                }
            })
        }
    }

    fn controller(source: GatedSource) -> RequestController<GatedSource, String> {
        RequestController::new(source, |raw: u32| format!("payload {raw}"), Handle::current())
    }

    #[tokio::test]
    async fn test_success_transforms_payload() {
        let source = GatedSource::default();
        let gate = source.gate(1);
        let mut requests = controller(source);

        let token = requests.start(SubjectId(1));
        assert_eq!(requests.status(), &SessionStatus::Pending);
        assert_eq!(requests.current_token(), Some(token));

        gate.send(Ok(7)).unwrap();
        assert_eq!(requests.settle_next().await, Some(Applied::Current));
        assert_eq!(requests.status(), &SessionStatus::Ok("payload 7".to_string()));
        assert_eq!(requests.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_failure_surfaces_message() {
        let source = GatedSource::default();
        let gate = source.gate(1);
        let mut requests = controller(source);

        requests.start(SubjectId(1));
        gate.send(Err(OverlayError::fetch("Failed to fetch"))).unwrap();

        assert_eq!(requests.settle_next().await, Some(Applied::Current));
        assert_eq!(
            requests.status(),
            &SessionStatus::Error("Failed to fetch".to_string())
        );
    }

    #[tokio::test]
    async fn test_stop_discards_late_arrival() {
        let source = GatedSource::default();
        let _gate = source.gate(1);
        let mut requests = controller(source);

        requests.start(SubjectId(1));
        requests.stop();
        assert_eq!(requests.status(), &SessionStatus::Idle);
        assert!(requests.current_token().is_none());

        // The cancelled task still reports, and is dropped.
        assert_eq!(requests.settle_next().await, Some(Applied::Stale));
        assert_eq!(requests.status(), &SessionStatus::Idle);
        assert_eq!(requests.settle_next().await, None);
    }

    #[tokio::test]
    async fn test_manual_stale_settlement_is_ignored() {
        let source = GatedSource::default();
        let _a = source.gate(1);
        let _b = source.gate(2);
        let mut requests = controller(source);

        let first = requests.start(SubjectId(1));
        let second = requests.start(SubjectId(2));
        assert!(second > first);

        let applied = requests.apply(Settlement {
            token: first,
            subject: SubjectId(1),
            outcome: Ok(1),
            elapsed: Duration::ZERO,
        });
        assert_eq!(applied, Applied::Stale);
        assert!(requests.status().is_pending());
        assert_eq!(requests.subject(), Some(SubjectId(2)));
    }

    #[tokio::test]
    async fn test_stale_payload_after_current_settled_is_ignored() {
        let source = GatedSource::default();
        let _a = source.gate(1);
        let gate_b = source.gate(2);
        let mut requests = controller(source);

        let first = requests.start(SubjectId(1));
        requests.start(SubjectId(2));

        // The superseded fetch reports its abort first.
        assert_eq!(requests.settle_next().await, Some(Applied::Stale));
        gate_b.send(Ok(2)).unwrap();
        assert_eq!(requests.settle_next().await, Some(Applied::Current));
        assert_eq!(requests.status(), &SessionStatus::Ok("payload 2".to_string()));

        // A transport that ignored the abort delivers its payload late.
        let applied = requests.apply(Settlement {
            token: first,
            subject: SubjectId(1),
            outcome: Ok(1),
            elapsed: Duration::from_millis(900),
        });
        assert_eq!(applied, Applied::Stale);
        assert_eq!(requests.status(), &SessionStatus::Ok("payload 2".to_string()));
        assert_eq!(requests.subject(), Some(SubjectId(2)));
    }

    #[tokio::test]
    async fn test_stale_failure_after_current_settled_is_ignored() {
        let source = GatedSource::default();
        let _a = source.gate(1);
        let gate_b = source.gate(2);
        let mut requests = controller(source);

        let first = requests.start(SubjectId(1));
        requests.start(SubjectId(2));
        gate_b.send(Ok(2)).unwrap();
        while requests.settle_next().await == Some(Applied::Stale) {}

        let applied = requests.apply(Settlement {
            token: first,
            subject: SubjectId(1),
            outcome: Err(OverlayError::fetch("Failed to fetch")),
            elapsed: Duration::ZERO,
        });
        assert_eq!(applied, Applied::Stale);
        assert_eq!(requests.status(), &SessionStatus::Ok("payload 2".to_string()));
    }

    #[tokio::test]
    async fn test_events_are_published() {
        let source = GatedSource::default();
        let gate = source.gate(5);
        let bus = EventBus::new();
        let mut requests = controller(source).with_events(bus.clone());

        let token = requests.start(SubjectId(5));
        gate.send(Ok(1)).unwrap();
        requests.settle_next().await;

        let events = bus.drain();
        assert_eq!(
            events,
            vec![
                Event::SessionStarted {
                    subject: SubjectId(5),
                    token
                },
                Event::SessionSettled {
                    subject: SubjectId(5),
                    token,
                    ok: true
                },
            ]
        );
    }
}
