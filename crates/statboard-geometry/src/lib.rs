pub mod placement;
pub mod rect;

pub use placement::{OverlayPosition, compute_position, place_near_pointer};
pub use rect::{Point, Rect, Size};
