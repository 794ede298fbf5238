//! Diagram interchange geometry.

/// Bounds of a shape or label, or one waypoint of an edge.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GraphicInfo {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub expanded: Option<bool>,
}

impl GraphicInfo {
    pub fn bounds(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            expanded: None,
        }
    }

    pub fn waypoint(x: f64, y: f64) -> Self {
        Self::bounds(x, y, 0.0, 0.0)
    }
}
