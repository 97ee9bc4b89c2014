//! Contextual overlays for the statboard dashboard.
//!
//! Two overlay kinds live here: the click-triggered, data-backed breakdown
//! ([`OverlayController`]) and the passive hover tooltip ([`HoverIntent`]).
//! Both are driven from a single UI owner; fetches run on tokio tasks and only
//! ever report back through [`RequestController`] settlements.

pub mod cancellation;
pub mod hover;
pub mod host;
pub mod overlay;
pub mod session;
pub mod settings;
pub mod source;

pub use cancellation::CancellationToken;
pub use hover::{HoverIntent, HoverState};
pub use host::{MemoryHost, MountedNode, NodeHandle, OverlayHost};
pub use overlay::{Activation, OverlayContent, OverlayController, OverlayPhase, OverlayView};
pub use session::{Applied, RequestController, SessionStatus, Settlement};
pub use settings::OverlaySettings;
pub use source::{FetchFuture, JsonDirSource, SubjectSource};
