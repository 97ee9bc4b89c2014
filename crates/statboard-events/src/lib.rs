use crossbeam_channel::{Receiver, Sender, unbounded};
use serde::{Deserialize, Serialize};
use statboard_core::{SessionToken, SubjectId};
use statboard_geometry::OverlayPosition;

pub mod telemetry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // Click overlay
    OverlayOpened {
        subject: SubjectId,
        position: OverlayPosition,
    },
    OverlayClosed {
        subject: Option<SubjectId>,
    },
    /// An activation could not be measured, so nothing opened.
    OverlayRejected,

    // Sessions
    SessionStarted {
        subject: SubjectId,
        token: SessionToken,
    },
    SessionSettled {
        subject: SubjectId,
        token: SessionToken,
        ok: bool,
    },
    /// A settlement arrived for a superseded session and was dropped.
    SessionDiscarded {
        subject: SubjectId,
        token: SessionToken,
    },

    // Hover tooltip
    TooltipShown {
        x: f32,
        y: f32,
    },
    TooltipHidden,
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    /// Drain every pending event without blocking.
    pub fn drain(&self) -> Vec<Event> {
        self.rx.try_iter().collect()
    }

    /// Dispatch all pending events to a listener.
    /// This is useful for processing events in the UI loop.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }
}

/// Trait for components that respond to events.
/// Implement this to receive events from the EventBus.
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_bus_publish_receive() {
        let bus = EventBus::new();
        let sender = bus.sender();
        let receiver = bus.receiver();

        let event = Event::SessionStarted {
            subject: SubjectId(7),
            token: SessionToken(1),
        };

        sender.send(event.clone()).unwrap();

        match receiver.recv().unwrap() {
            Event::SessionStarted { subject, token } => {
                assert_eq!(subject, SubjectId(7));
                assert_eq!(token, SessionToken(1));
            }
            _ => panic!("Expected SessionStarted event"),
        }
    }

    #[derive(Default)]
    struct Counter {
        shown: usize,
        hidden: usize,
    }

    impl EventListener for Counter {
        fn handle_event(&mut self, event: &Event) {
            match event {
                Event::TooltipShown { .. } => self.shown += 1,
                Event::TooltipHidden => self.hidden += 1,
                _ => {}
            }
        }
    }

    #[test]
    fn test_dispatch_to_listener() {
        let bus = EventBus::new();
        bus.publish(Event::TooltipShown { x: 1.0, y: 2.0 });
        bus.publish(Event::TooltipHidden);
        bus.publish(Event::OverlayRejected);

        let mut counter = Counter::default();
        bus.dispatch_to(&mut counter);

        assert_eq!(counter.shown, 1);
        assert_eq!(counter.hidden, 1);
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_events_serialize() {
        let event = Event::OverlayOpened {
            subject: SubjectId(3),
            position: OverlayPosition {
                top: 150.0,
                left: 152.0,
                connector_offset: 388.0,
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
