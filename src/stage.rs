//! The document surface the effects draw on.
//!
//! Everything the core needs from the page goes through [`Stage`], so the same
//! particle and mascot code runs against the live DOM (`web::DomStage`) and
//! against the headless `sim::SimStage` used by tests.

use crate::error::FxResult;

/// 2D position in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset by `distance` along `angle` (radians, screen y grows down).
    pub fn polar(self, angle: f64, distance: f64) -> Self {
        Self::new(self.x + angle.cos() * distance, self.y + angle.sin() * distance)
    }
}

/// Bounding box as reported by `getBoundingClientRect` (viewport relative).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// DOM operations used by the effect layer.
///
/// Mutations on a node that has already been detached must be harmless:
/// timers are never cancelled, so reverts and removals regularly land on
/// elements whose lifecycle has moved on.
pub trait Stage: 'static {
    type Node: Clone + PartialEq + 'static;

    fn body(&self) -> FxResult<Self::Node>;
    fn by_id(&self, id: &str) -> Option<Self::Node>;
    /// All elements matching a simple class selector (no leading dot).
    fn by_class(&self, class: &str) -> Vec<Self::Node>;

    fn create(&self, tag: &str, class: Option<&str>) -> FxResult<Self::Node>;
    fn append_to_body(&self, node: &Self::Node) -> FxResult<()>;
    /// Remove from the document; a no-op when already detached.
    fn detach(&self, node: &Self::Node);
    fn is_attached(&self, node: &Self::Node) -> bool;

    fn set_style(&self, node: &Self::Node, property: &str, value: &str) -> FxResult<()>;
    fn set_text(&self, node: &Self::Node, text: &str);
    fn text(&self, node: &Self::Node) -> String;
    fn set_attr(&self, node: &Self::Node, name: &str, value: &str) -> FxResult<()>;
    fn attr(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn add_class(&self, node: &Self::Node, class: &str);
    fn remove_class(&self, node: &Self::Node, class: &str);
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    /// Viewport-relative box; `FxError::Layout` when the element has no size.
    fn rect(&self, node: &Self::Node) -> FxResult<Rect>;
    fn viewport(&self) -> Viewport;
    fn scroll_offset(&self) -> Point;

    /// Attribute on the root `<html>` element (theme lives here).
    fn root_attr(&self, name: &str) -> Option<String>;
    fn set_root_attr(&self, name: &str, value: &str) -> FxResult<()>;
}

/// Write several style properties, stopping at the first rejection.
pub fn set_styles<S: Stage>(stage: &S, node: &S::Node, props: &[(&str, &str)]) -> FxResult<()> {
    for (prop, value) in props {
        stage.set_style(node, prop, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn polar_offsets_follow_screen_axes() {
        let p = Point::new(10.0, 10.0).polar(PI / 2.0, 5.0);
        assert!((p.x - 10.0).abs() < 1e-9);
        assert!((p.y - 15.0).abs() < 1e-9);
    }

    #[test]
    fn rect_center() {
        let r = Rect { left: 100.0, top: 50.0, width: 40.0, height: 20.0 };
        assert_eq!(r.center(), Point::new(120.0, 60.0));
    }
}
