//! Container geometry for bounded gestures.
//!
//! Drag and pinch positions are reported relative to, and clamped inside, the
//! bounds of the node the gesture started on (or the whole viewport for
//! global gestures).

use horizon_gesture_core::{Insets, Point, Rect, Size};

use crate::config::BoxSizing;

/// Geometry of the node a gesture is bound to.
pub trait GestureNode {
    /// The node's border box in viewport coordinates.
    fn bounding_rect(&self) -> Rect;

    /// The node's padding, used for `content-box` bounds.
    fn padding(&self) -> Insets {
        Insets::ZERO
    }

    /// Size of the viewport the node lives in.
    fn viewport(&self) -> Size;
}

/// Absolute container bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    /// Bounds covering a rectangle.
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            min_x: rect.left(),
            min_y: rect.top(),
            max_x: rect.right(),
            max_y: rect.bottom(),
        }
    }

    /// Clamp a point into the bounds and make it container-relative.
    pub fn clamp(&self, point: Point) -> Point {
        Point::new(
            point.x.max(self.min_x).min(self.max_x.max(self.min_x)) - self.min_x,
            point.y.max(self.min_y).min(self.max_y.max(self.min_y)) - self.min_y,
        )
    }
}

/// Compute the bounds a gesture is confined to.
///
/// Returns `None` without a node; positions are then passed through
/// unclamped.
pub fn container_bounds(
    node: Option<&dyn GestureNode>,
    box_sizing: BoxSizing,
    global: bool,
) -> Option<Bounds> {
    let node = node?;
    if global {
        let viewport = node.viewport();
        return Some(Bounds::from_rect(Rect::new(
            0.0,
            0.0,
            viewport.width,
            viewport.height,
        )));
    }

    let rect = node.bounding_rect();
    let rect = match box_sizing {
        BoxSizing::BorderBox => rect,
        BoxSizing::ContentBox => rect.inset(node.padding()),
    };
    Some(Bounds::from_rect(rect))
}

/// Clamp `point` into optional bounds.
pub(crate) fn clamp_to(bounds: Option<&Bounds>, point: Point) -> Point {
    bounds.map_or(point, |bounds| bounds.clamp(point))
}

/// A plain node description, handy for hosts that already know the geometry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StaticNode {
    pub rect: Rect,
    pub padding: Insets,
    pub viewport: Size,
}

impl StaticNode {
    pub fn new(rect: Rect, viewport: Size) -> Self {
        Self {
            rect,
            padding: Insets::ZERO,
            viewport,
        }
    }

    pub fn with_padding(mut self, padding: Insets) -> Self {
        self.padding = padding;
        self
    }
}

impl GestureNode for StaticNode {
    fn bounding_rect(&self) -> Rect {
        self.rect
    }

    fn padding(&self) -> Insets {
        self.padding
    }

    fn viewport(&self) -> Size {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> StaticNode {
        StaticNode::new(Rect::new(10.0, 20.0, 100.0, 100.0), Size::new(800.0, 600.0))
            .with_padding(Insets::uniform(5.0))
    }

    #[test]
    fn test_border_box_bounds() {
        let node = node();
        let bounds = container_bounds(Some(&node), BoxSizing::BorderBox, false).unwrap();
        assert_eq!(
            bounds,
            Bounds {
                min_x: 10.0,
                min_y: 20.0,
                max_x: 110.0,
                max_y: 120.0
            }
        );
    }

    #[test]
    fn test_content_box_bounds() {
        let node = node();
        let bounds = container_bounds(Some(&node), BoxSizing::ContentBox, false).unwrap();
        assert_eq!(bounds.min_x, 15.0);
        assert_eq!(bounds.max_y, 115.0);
    }

    #[test]
    fn test_global_bounds_use_viewport() {
        let node = node();
        let bounds = container_bounds(Some(&node), BoxSizing::ContentBox, true).unwrap();
        assert_eq!(bounds.min_x, 0.0);
        assert_eq!(bounds.max_x, 800.0);
        assert_eq!(bounds.max_y, 600.0);
    }

    #[test]
    fn test_missing_node_skips_bounds() {
        assert_eq!(container_bounds(None, BoxSizing::BorderBox, false), None);
        assert_eq!(clamp_to(None, Point::new(-5.0, 900.0)), Point::new(-5.0, 900.0));
    }

    #[test]
    fn test_clamp_is_container_relative() {
        let bounds = Bounds::from_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(bounds.clamp(Point::new(150.0, 50.0)), Point::new(100.0, 50.0));

        let offset = Bounds::from_rect(Rect::new(50.0, 50.0, 10.0, 10.0));
        assert_eq!(offset.clamp(Point::new(0.0, 55.0)), Point::new(0.0, 5.0));
    }

    #[test]
    fn test_clamp_survives_nan_bounds() {
        let bounds = Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: f32::NAN,
            max_y: f32::NAN,
        };
        assert_eq!(bounds.clamp(Point::new(50.0, 50.0)), Point::ZERO);

        let unset = Bounds {
            min_x: f32::NAN,
            min_y: 0.0,
            max_x: 10.0,
            max_y: 10.0,
        };
        assert!(unset.clamp(Point::new(5.0, 20.0)).x.is_nan());
    }
}
