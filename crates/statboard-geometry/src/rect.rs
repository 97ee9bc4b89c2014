use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned box in container-relative pixels, as measured at gesture time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(top: f32, left: f32, width: f32, height: f32) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// What a detached element measures as.
    pub const NOTHING: Self = Self {
        top: 0.0,
        left: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Horizontal midpoint, where the overlay connector points.
    pub fn center_x(&self) -> f32 {
        self.left + self.width * 0.5
    }

    /// A detached element reports a zero-area or non-finite box; such a rect
    /// cannot anchor anything.
    pub fn is_measurable(&self) -> bool {
        [self.top, self.left, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(100.0, 500.0, 80.0, 30.0);
        assert_eq!(r.right(), 580.0);
        assert_eq!(r.bottom(), 130.0);
        assert_eq!(r.center_x(), 540.0);
    }

    #[test]
    fn test_measurable() {
        assert!(Rect::new(0.0, 0.0, 1.0, 1.0).is_measurable());
        assert!(!Rect::NOTHING.is_measurable());
        assert!(!Rect::new(0.0, 0.0, 10.0, 0.0).is_measurable());
        assert!(!Rect::new(f32::NAN, 0.0, 10.0, 10.0).is_measurable());
        assert!(!Rect::new(0.0, 0.0, f32::INFINITY, 10.0).is_measurable());
    }
}
