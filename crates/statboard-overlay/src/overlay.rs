use crate::session::{Applied, RequestController, SessionStatus};
use crate::settings::OverlaySettings;
use crate::source::SubjectSource;
use statboard_core::{OverlayError, SessionToken, SubjectId};
use statboard_events::{Event, EventBus};
use statboard_geometry::{OverlayPosition, Rect, compute_position};
use tokio::runtime::Handle;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
    Closed,
    /// Position computed, session not yet started. Only observable from
    /// inside `activate`.
    Opening,
    Pending,
    Ready,
    Failed,
}

#[derive(Debug, PartialEq)]
pub enum OverlayContent<'a, D> {
    Nothing,
    Loading,
    Error(&'a str),
    Ready(&'a D),
}

/// Everything the presentational layer needs to draw the overlay.
#[derive(Debug, PartialEq)]
pub struct OverlayView<'a, D> {
    pub phase: OverlayPhase,
    pub subject: Option<SubjectId>,
    pub position: Option<OverlayPosition>,
    pub content: OverlayContent<'a, D>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Opened { token: SessionToken },
    /// The overlay already shows this subject; nothing was refetched.
    Unchanged,
}

/// Click-triggered overlay showing a fetched breakdown for one subject.
///
/// Dropping the controller closes the overlay and supersedes its session.
pub struct OverlayController<S: SubjectSource, D> {
    settings: OverlaySettings,
    requests: RequestController<S, D>,
    subject: Option<SubjectId>,
    position: Option<OverlayPosition>,
    events: Option<EventBus>,
}

impl<S: SubjectSource, D> OverlayController<S, D> {
    pub fn new(
        settings: OverlaySettings,
        source: S,
        transform: impl Fn(S::Raw) -> D + 'static,
        runtime: Handle,
    ) -> Self {
        Self {
            settings,
            requests: RequestController::new(source, transform, runtime),
            subject: None,
            position: None,
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.requests.set_events(events.clone());
        self.events = Some(events);
        self
    }

    pub fn settings(&self) -> &OverlaySettings {
        &self.settings
    }

    pub fn requests(&self) -> &RequestController<S, D> {
        &self.requests
    }

    pub fn subject(&self) -> Option<SubjectId> {
        self.subject
    }

    pub fn is_open(&self) -> bool {
        self.subject.is_some()
    }

    pub fn phase(&self) -> OverlayPhase {
        if self.subject.is_none() {
            return OverlayPhase::Closed;
        }
        match self.requests.status() {
            SessionStatus::Idle => OverlayPhase::Opening,
            SessionStatus::Pending => OverlayPhase::Pending,
            SessionStatus::Ok(_) => OverlayPhase::Ready,
            SessionStatus::Error(_) => OverlayPhase::Failed,
        }
    }

    /// Open the overlay for `subject` below `anchor`.
    ///
    /// `anchor` and `container` are the rectangles measured at gesture time;
    /// `None` or a degenerate rect means the element is detached, which closes
    /// the overlay instead of opening it. Re-activating the subject already
    /// shown is a no-op.
    pub fn activate(
        &mut self,
        anchor: Option<Rect>,
        container: Option<Rect>,
        subject: SubjectId,
    ) -> Result<Activation, OverlayError> {
        let (anchor, container) = match (anchor, container) {
            (Some(anchor), Some(container))
                if anchor.is_measurable() && container.is_measurable() =>
            {
                (anchor, container)
            }
            _ => {
                warn!(%subject, "overlay anchor cannot be measured");
                self.close();
                self.publish(Event::OverlayRejected);
                return Err(OverlayError::UnmeasurableAnchor);
            }
        };

        if self.subject == Some(subject) {
            debug!(%subject, "overlay already open for subject");
            return Ok(Activation::Unchanged);
        }

        self.requests.stop();
        let position = compute_position(
            anchor,
            container,
            self.settings.overlay_width,
            self.settings.side_padding,
            self.settings.vertical_offset,
        );
        self.subject = Some(subject);
        self.position = Some(position);

        let token = self.requests.start(subject);
        debug!(%subject, %token, top = position.top, left = position.left, "overlay opened");
        self.publish(Event::OverlayOpened { subject, position });
        Ok(Activation::Opened { token })
    }

    /// Close the overlay and supersede its session. Closing a closed overlay
    /// does nothing.
    pub fn close(&mut self) {
        self.requests.stop();
        self.position = None;
        if let Some(subject) = self.subject.take() {
            debug!(%subject, "overlay closed");
            self.publish(Event::OverlayClosed {
                subject: Some(subject),
            });
        }
    }

    /// Forced cleanup when the owning view goes away.
    pub fn teardown(&mut self) {
        self.close();
    }

    /// Apply settlements that have already arrived. Call once per frame.
    pub fn pump(&mut self) -> usize {
        self.requests.pump()
    }

    /// Wait for the next settlement and apply it.
    pub async fn settle_next(&mut self) -> Option<Applied> {
        self.requests.settle_next().await
    }

    pub fn render(&self) -> OverlayView<'_, D> {
        let content = if self.subject.is_none() {
            OverlayContent::Nothing
        } else {
            match self.requests.status() {
                SessionStatus::Idle | SessionStatus::Pending => OverlayContent::Loading,
                SessionStatus::Ok(payload) => OverlayContent::Ready(payload),
                SessionStatus::Error(message) => OverlayContent::Error(message),
            }
        };

        OverlayView {
            phase: self.phase(),
            subject: self.subject,
            position: self.position,
            content,
        }
    }

    fn publish(&self, event: Event) {
        if let Some(events) = &self.events {
            events.publish(event);
        }
    }
}

impl<S: SubjectSource, D> Drop for OverlayController<S, D> {
    fn drop(&mut self) {
        self.teardown();
    }
}
