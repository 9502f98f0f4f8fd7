//! Rendering: builds a display list of the current scene.
//!
//! The host draws the list in order with whatever surface it has. Items carry
//! the derived hover and selection state so the host never needs to look at
//! the interaction state machine. Nothing here mutates the engine, and none
//! of it is ever written back into an element.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH, GRID_UNIT, SELECTION_COLOR};
use crate::doc::{ElementId, ElementKind, LayoutElement};
use crate::engine::EngineCore;
use crate::geometry::{BoundBox, Point};
use crate::hit::{ResizeAnchor, rotate_handle_local};

/// One element as the host should draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderItem {
    pub id: ElementId,
    pub kind: ElementKind,
    /// Position, size and rotation including any live gesture preview.
    pub bounds: BoundBox,
    pub fill: String,
    /// `None` for text, which has no outline.
    pub stroke: Option<String>,
    pub stroke_width: u32,
    /// Text drawn centered on rooms, or the body of a text label.
    pub label: Option<String>,
    /// Font size for text labels; follows a resize preview.
    pub font_size: Option<f64>,
    pub highlighted: bool,
    pub hovered: bool,
}

/// A background grid line from (`x1`, `y1`) to (`x2`, `y2`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Draw list for the engine's current state, bottom first. Every `Space`
/// comes before every other variant.
#[must_use]
pub fn display_list(engine: &EngineCore) -> Vec<RenderItem> {
    let selected = engine.selection();
    let hovered = engine.ui.hovered_id;
    engine
        .doc
        .draw_order()
        .into_iter()
        .map(|element| {
            let highlighted = selected == Some(element.id());
            let mut item = base_item(element, engine.display_bounds(element));
            item.hovered = hovered == Some(element.id());
            item.highlighted = highlighted;
            if highlighted {
                match item.kind {
                    ElementKind::Text => SELECTION_COLOR.clone_into(&mut item.fill),
                    ElementKind::Space | ElementKind::Room | ElementKind::Door => {
                        item.stroke = Some(SELECTION_COLOR.to_owned());
                    }
                }
            }
            item
        })
        .collect()
}

fn base_item(element: &LayoutElement, bounds: BoundBox) -> RenderItem {
    let label = element.label().map(str::to_owned);
    let (fill, stroke, stroke_width, font_size) = match element {
        LayoutElement::Space(s) => (s.style.fill.clone(), Some(s.style.stroke.clone()), s.style.stroke_width, None),
        LayoutElement::Room(r) => (r.style.fill.clone(), Some(r.style.stroke.clone()), r.style.stroke_width, None),
        LayoutElement::Door(d) => (d.style.fill.clone(), Some(d.style.stroke.clone()), d.style.stroke_width, None),
        LayoutElement::Text(t) => (t.fill.clone(), None, 0, Some(bounds.height)),
    };
    RenderItem {
        id: element.id(),
        kind: element.kind(),
        bounds,
        fill,
        stroke,
        stroke_width,
        label,
        font_size,
        highlighted: false,
        hovered: false,
    }
}

/// Canvas-space positions of the selected element's transform handles:
/// eight resize handles, then the rotate handle for rotatable variants.
#[must_use]
pub fn selection_handles(engine: &EngineCore) -> Vec<Point> {
    let Some(element) = engine.selection().and_then(|id| engine.element(&id)) else {
        return Vec::new();
    };
    let bounds = engine.display_bounds(element);
    let mut handles: Vec<Point> = ResizeAnchor::ALL
        .into_iter()
        .map(|anchor| bounds.to_canvas(anchor.local_position(bounds.width, bounds.height)))
        .collect();
    if element.kind().is_rotatable() {
        handles.push(bounds.to_canvas(rotate_handle_local(bounds.width)));
    }
    handles
}

/// Grid lines every grid unit across the fixed canvas extent, vertical
/// lines first. Drawn in [`crate::consts::GRID_LINE_COLOR`].
#[must_use]
pub fn grid_lines() -> Vec<GridLine> {
    let width = f64::from(CANVAS_WIDTH);
    let height = f64::from(CANVAS_HEIGHT);
    let step = usize::try_from(GRID_UNIT).unwrap_or(1);
    let verticals = (0..=CANVAS_WIDTH).step_by(step).map(|x| {
        let x = f64::from(x);
        GridLine { x1: x, y1: 0.0, x2: x, y2: height }
    });
    let horizontals = (0..=CANVAS_HEIGHT).step_by(step).map(|y| {
        let y = f64::from(y);
        GridLine { x1: 0.0, y1: y, x2: width, y2: y }
    });
    verticals.chain(horizontals).collect()
}

