#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::{HANDLE_RADIUS, ROTATE_HANDLE_OFFSET};
use crate::doc::{DocStore, ElementId, LayoutElement};
use crate::geometry::{BoundBox, Point};

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
    RotateHandle,
}

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    pub const ALL: [Self; 8] = [Self::N, Self::Ne, Self::E, Self::Se, Self::S, Self::Sw, Self::W, Self::Nw];

    /// Handle position in the box's local (unrotated) frame.
    #[must_use]
    pub fn local_position(self, width: f64, height: f64) -> Point {
        let (fx, fy) = match self {
            Self::N => (0.5, 0.0),
            Self::Ne => (1.0, 0.0),
            Self::E => (1.0, 0.5),
            Self::Se => (1.0, 1.0),
            Self::S => (0.5, 1.0),
            Self::Sw => (0.0, 1.0),
            Self::W => (0.0, 0.5),
            Self::Nw => (0.0, 0.0),
        };
        Point::new(width * fx, height * fy)
    }

    /// Whether dragging this handle moves the left edge.
    #[must_use]
    pub fn moves_left(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    #[must_use]
    pub fn moves_right(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    #[must_use]
    pub fn moves_top(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    #[must_use]
    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub element_id: ElementId,
    pub part: HitPart,
}

/// Local-frame position of the rotate handle for a box of `width`.
#[must_use]
pub fn rotate_handle_local(width: f64) -> Point {
    Point::new(width / 2.0, -ROTATE_HANDLE_OFFSET)
}

/// Test which element (if any) is under `pt`.
///
/// The selected element's handles are checked first so they win over bodies
/// drawn above them. Bodies are then checked topmost-first in painter's order.
#[must_use]
pub fn hit_test(pt: Point, doc: &DocStore, selected_id: Option<ElementId>) -> Option<Hit> {
    if let Some(selected) = selected_id.and_then(|id| doc.get(&id)) {
        if let Some(part) = handle_at(pt, selected) {
            return Some(Hit { element_id: selected.id(), part });
        }
    }

    doc.draw_order()
        .into_iter()
        .rev()
        .find(|element| element.bounds().contains(pt))
        .map(|element| Hit { element_id: element.id(), part: HitPart::Body })
}

fn handle_at(pt: Point, element: &LayoutElement) -> Option<HitPart> {
    let bounds = element.bounds();
    let local = bounds.to_local(pt);

    if element.kind().is_rotatable() && near(local, rotate_handle_local(bounds.width)) {
        return Some(HitPart::RotateHandle);
    }

    ResizeAnchor::ALL
        .into_iter()
        .find(|anchor| near(local, anchor.local_position(bounds.width, bounds.height)))
        .map(HitPart::ResizeHandle)
}

fn near(a: Point, b: Point) -> bool {
    let d = a.sub(b);
    d.x.hypot(d.y) <= HANDLE_RADIUS
}

/// Proposed box after dragging `anchor` from `start` to `current`.
///
/// The pointer delta is measured in the box's local frame so rotated
/// elements resize along their own axes. The opposite edge stays fixed.
#[must_use]
pub fn resize_box(original: &BoundBox, anchor: ResizeAnchor, start: Point, current: Point) -> BoundBox {
    let delta = current.sub(start).rotate(-original.rotation);

    let mut left = 0.0;
    let mut top = 0.0;
    let mut right = original.width;
    let mut bottom = original.height;
    if anchor.moves_left() {
        left += delta.x;
    }
    if anchor.moves_right() {
        right += delta.x;
    }
    if anchor.moves_top() {
        top += delta.y;
    }
    if anchor.moves_bottom() {
        bottom += delta.y;
    }

    let origin = original.to_canvas(Point::new(left, top));
    BoundBox {
        x: origin.x,
        y: origin.y,
        width: right - left,
        height: bottom - top,
        rotation: original.rotation,
    }
}

/// Raw rotation after dragging the rotate handle to `current`.
///
/// The pivot is the box origin; the angle is measured so the handle's
/// resting position maps to the box's current rotation.
#[must_use]
pub fn rotate_angle(original: &BoundBox, current: Point) -> f64 {
    let rest = rotate_handle_local(original.width);
    let rest_angle = rest.y.atan2(rest.x);
    let d = current.sub(original.origin());
    (d.y.atan2(d.x) - rest_angle).to_degrees()
}
