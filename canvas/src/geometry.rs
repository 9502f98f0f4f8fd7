//! Grid snapping and transform absorption.
//!
//! Every function here is pure. Pointer and transform-handle output arrives as
//! raw floating-point values; these helpers map it onto the integer grid,
//! clamp it into each variant's size bounds, and fold transient scale factors
//! back into width/height/font size so geometry is the only persisted size.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use crate::consts::{DOOR_ROTATION_STEP, ELEMENT_MAX_SIZE, GRID_UNIT, MIN_SIZE, SPACE_MAX_SIZE};
use crate::doc::LayoutElement;

/// A point in logical canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn sub(self, other: Self) -> Self {
        Self { x: self.x - other.x, y: self.y - other.y }
    }

    #[must_use]
    pub fn add(self, other: Self) -> Self {
        Self { x: self.x + other.x, y: self.y + other.y }
    }

    /// Rotate around the origin by `degrees`, clockwise in screen space (y down).
    #[must_use]
    pub fn rotate(self, degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self { x: self.x * cos - self.y * sin, y: self.x * sin + self.y * cos }
    }
}

/// An element's box as seen by the transform handles: position, size, and
/// rotation around the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
}

impl BoundBox {
    #[must_use]
    pub fn from_ints(x: i32, y: i32, width: i32, height: i32, rotation: i32) -> Self {
        Self {
            x: f64::from(x),
            y: f64::from(y),
            width: f64::from(width),
            height: f64::from(height),
            rotation: f64::from(rotation),
        }
    }

    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Convert a canvas point into this box's unrotated local frame.
    #[must_use]
    pub fn to_local(&self, pt: Point) -> Point {
        pt.sub(self.origin()).rotate(-self.rotation)
    }

    /// Convert a local-frame point back to canvas coordinates.
    #[must_use]
    pub fn to_canvas(&self, local: Point) -> Point {
        local.rotate(self.rotation).add(self.origin())
    }

    /// Whether `pt` (canvas coordinates) falls inside the box.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        let local = self.to_local(pt);
        local.x >= 0.0 && local.y >= 0.0 && local.x <= self.width && local.y <= self.height
    }
}

/// Transform-node output captured when a resize/rotate gesture ends.
///
/// `x`/`y` are the node's raw position, `scale_x`/`scale_y` the factors the
/// handle applied on top of the committed size, and `rotation` the raw angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation: f64,
}

impl Transform {
    /// A transform that leaves `element` where it is at its current size.
    #[must_use]
    pub fn identity(element: &LayoutElement) -> Self {
        let (x, y) = element.position();
        Self {
            x: f64::from(x),
            y: f64::from(y),
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: f64::from(element.rotation().unwrap_or(0)),
        }
    }
}

/// Round to the nearest multiple of `unit`, halves away from zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn snap_to(value: f64, unit: i32) -> i32 {
    let unit_f = f64::from(unit);
    ((value / unit_f).round() as i32).saturating_mul(unit)
}

/// Round to the nearest grid multiple. Applied to every placed position.
#[must_use]
pub fn snap_point(value: f64) -> i32 {
    snap_to(value, GRID_UNIT)
}

/// Like [`snap_to`] but never below one `unit`.
#[must_use]
pub fn snap_size_to(value: f64, unit: i32) -> i32 {
    snap_to(value, unit).max(unit)
}

/// Grid-snapped size, floored at one grid unit.
#[must_use]
pub fn snap_size(value: f64) -> i32 {
    snap_size_to(value, GRID_UNIT)
}

/// Cap at `max`, then snap. The cap comes first so a large request lands
/// exactly on the bound rather than on the grid multiple past it.
#[must_use]
pub fn clamp_size(value: f64, max: i32) -> i32 {
    snap_size(value.min(f64::from(max)))
}

/// Round a raw door angle to the nearest 30° step.
#[must_use]
pub fn snap_rotation(raw: f64) -> i32 {
    snap_to(raw, DOOR_ROTATION_STEP)
}

/// Round a raw angle to whole degrees without snapping it to a step.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn whole_degrees(raw: f64) -> i32 {
    raw.round() as i32
}

/// Resize-handle guard: keep `previous` when `proposed` would be thinner than
/// one grid unit on either axis, otherwise accept `proposed`. A handle dragged
/// past the opposite edge yields a negative size and is rejected too.
#[must_use]
pub fn accept_bound_box(previous: BoundBox, proposed: BoundBox) -> BoundBox {
    let min = f64::from(MIN_SIZE);
    if proposed.width < min || proposed.height < min {
        previous
    } else {
        proposed
    }
}

/// Fold a finished transform into the element's geometry.
///
/// Scale factors are absorbed into width/height (or font size for text) and
/// never survive on the returned element. Position is always re-snapped.
#[must_use]
pub fn apply_transform(element: &LayoutElement, t: &Transform) -> LayoutElement {
    let x = snap_point(t.x);
    let y = snap_point(t.y);
    let mut out = element.clone();
    match &mut out {
        LayoutElement::Space(s) => {
            s.width = clamp_size(f64::from(s.width) * t.scale_x, SPACE_MAX_SIZE);
            s.height = clamp_size(f64::from(s.height) * t.scale_y, SPACE_MAX_SIZE);
        }
        LayoutElement::Text(txt) => {
            txt.font_size = clamp_size(f64::from(txt.font_size) * t.scale_y, ELEMENT_MAX_SIZE);
        }
        LayoutElement::Door(d) => {
            d.width = clamp_size(f64::from(d.width) * t.scale_x, ELEMENT_MAX_SIZE);
            d.height = clamp_size(f64::from(d.height) * t.scale_y, ELEMENT_MAX_SIZE);
            d.rotation = snap_rotation(t.rotation);
        }
        LayoutElement::Room(r) => {
            r.width = clamp_size(f64::from(r.width) * t.scale_x, ELEMENT_MAX_SIZE);
            r.height = clamp_size(f64::from(r.height) * t.scale_y, ELEMENT_MAX_SIZE);
            r.rotation = whole_degrees(t.rotation);
        }
    }
    out.set_position(x, y);
    out
}
