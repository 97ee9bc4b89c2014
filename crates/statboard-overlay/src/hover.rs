//! Hover-intent tooltip.
//!
//! A pointer has to dwell on the trigger for the configured delay before the
//! tooltip materializes; leaving or clicking hides it at once. Keyboard focus
//! shows it immediately and pins it until blur.
//!
//! Timers are deadlines checked by [`HoverIntent::tick`], which the UI loop
//! calls with the current time (see [`HoverIntent::next_wakeup`]).

use crate::host::{NodeHandle, OverlayHost};
use crate::settings::OverlaySettings;
use statboard_events::{Event, EventBus};
use statboard_geometry::{Point, place_near_pointer};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverState {
    Idle,
    /// Pointer is over the trigger, delay running, nothing shown yet.
    Waiting,
    Visible,
    /// Shown because the trigger holds keyboard focus.
    FocusVisible,
}

pub struct HoverIntent<H: OverlayHost> {
    host: H,
    markup: String,
    delay: Duration,
    cursor_gap: f32,
    state: HoverState,
    pointer: Point,
    deadline: Option<Instant>,
    mounted: Option<NodeHandle>,
    reveal_pending: bool,
    events: Option<EventBus>,
}

impl<H: OverlayHost> HoverIntent<H> {
    pub fn new(host: H, markup: impl Into<String>, settings: &OverlaySettings) -> Self {
        Self {
            host,
            markup: markup.into(),
            delay: settings.hover_delay(),
            cursor_gap: settings.cursor_gap,
            state: HoverState::Idle,
            pointer: Point::default(),
            deadline: None,
            mounted: None,
            reveal_pending: false,
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn state(&self) -> HoverState {
        self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn mounted(&self) -> Option<NodeHandle> {
        self.mounted
    }

    /// When the loop should call [`tick`](Self::tick) next, if anything is
    /// scheduled. A pending reveal wants the very next tick.
    pub fn next_wakeup(&self, now: Instant) -> Option<Instant> {
        if self.reveal_pending {
            return Some(now);
        }
        self.deadline
    }

    pub fn pointer_enter(&mut self, pos: Point, now: Instant) {
        if self.state != HoverState::Idle {
            return;
        }
        self.pointer = pos;
        self.deadline = Some(now + self.delay);
        self.state = HoverState::Waiting;
    }

    pub fn pointer_move(&mut self, pos: Point) {
        match self.state {
            HoverState::Waiting => self.pointer = pos,
            HoverState::Visible => {
                self.pointer = pos;
                if let Some(at) = self.place() {
                    trace!(x = at.x, y = at.y, "tooltip moved");
                }
            }
            HoverState::Idle | HoverState::FocusVisible => {}
        }
    }

    pub fn pointer_leave(&mut self) {
        if self.state != HoverState::FocusVisible {
            self.dispose();
        }
    }

    pub fn click(&mut self) {
        self.pointer_leave();
    }

    pub fn focus(&mut self) {
        if self.state == HoverState::FocusVisible {
            return;
        }
        self.dispose();
        self.show();
        self.state = HoverState::FocusVisible;
    }

    pub fn blur(&mut self) {
        if self.state == HoverState::FocusVisible {
            self.dispose();
        }
    }

    /// Fire whatever timers are due at `now`.
    pub fn tick(&mut self, now: Instant) {
        // Reveal before checking the delay so a node mounted by this tick
        // stays invisible until the next one.
        if self.reveal_pending {
            self.reveal_pending = false;
            if let Some(node) = self.mounted {
                self.host.reveal(node);
            }
        }

        if self.state == HoverState::Waiting && self.deadline.is_some_and(|d| now >= d) {
            self.show();
            self.state = HoverState::Visible;
        }
    }

    /// Release everything regardless of state.
    pub fn teardown(&mut self) {
        self.dispose();
    }

    /// Mount the content invisibly, position it by its measured size, and
    /// schedule the reveal.
    fn show(&mut self) {
        self.deadline = None;
        let node = self.host.mount(&self.markup);
        self.mounted = Some(node);
        if let Some(at) = self.place() {
            debug!(x = at.x, y = at.y, "tooltip shown");
            self.publish(Event::TooltipShown { x: at.x, y: at.y });
        }
        self.reveal_pending = true;
    }

    fn place(&mut self) -> Option<Point> {
        let node = self.mounted?;
        let plate = self.host.measure(node);
        let at = place_near_pointer(self.pointer, plate, self.host.viewport(), self.cursor_gap);
        self.host.place(node, at);
        Some(at)
    }

    fn dispose(&mut self) {
        if let Some(node) = self.mounted.take() {
            self.host.unmount(node);
            debug!("tooltip hidden");
            self.publish(Event::TooltipHidden);
        }
        self.deadline = None;
        self.reveal_pending = false;
        self.state = HoverState::Idle;
    }

    fn publish(&self, event: Event) {
        if let Some(events) = &self.events {
            events.publish(event);
        }
    }
}

impl<H: OverlayHost> Drop for HoverIntent<H> {
    fn drop(&mut self) {
        self.dispose();
    }
}
