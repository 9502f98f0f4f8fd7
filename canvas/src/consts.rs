//! Shared numeric constants for the canvas crate.
//!
//! The grid unit and canvas extent are part of the persisted contract: stored
//! layouts assume them.

// ── Grid ────────────────────────────────────────────────────────

/// Snapping granularity for position and size, in logical units.
pub const GRID_UNIT: i32 = 20;

/// Smallest width, height, or font size any element may have.
pub const MIN_SIZE: i32 = GRID_UNIT;

// ── Canvas extent ───────────────────────────────────────────────

/// Logical width of the drawing surface.
pub const CANVAS_WIDTH: i32 = 800;

/// Logical height of the drawing surface.
pub const CANVAS_HEIGHT: i32 = 600;

// ── Size bounds ─────────────────────────────────────────────────

/// Largest width/height of a `Space`.
pub const SPACE_MAX_SIZE: i32 = 2000;

/// Largest width/height of a `Room` or `Door`, and largest text font size.
pub const ELEMENT_MAX_SIZE: i32 = 600;

// ── Rotation ────────────────────────────────────────────────────

/// Door rotations are committed in multiples of this many degrees.
pub const DOOR_ROTATION_STEP: i32 = 30;

// ── Hit-testing ─────────────────────────────────────────────────

/// Hit slop around transform handles, in logical units.
pub const HANDLE_RADIUS: f64 = 8.0;

/// Distance from the top edge of the bound box to the rotate handle.
pub const ROTATE_HANDLE_OFFSET: f64 = 24.0;

/// Approximate glyph advance as a fraction of the font size, used to size
/// text labels for hit-testing.
pub const TEXT_ADVANCE_RATIO: f64 = 0.6;

// ── Colors ──────────────────────────────────────────────────────

/// Stroke (or text fill) used to highlight the selected element.
pub const SELECTION_COLOR: &str = "#ff5252";

/// Color of the background grid lines.
pub const GRID_LINE_COLOR: &str = "#e0e0e0";
