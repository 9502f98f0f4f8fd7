//! Input model: keys, persistent UI state, and the gesture state machine.
//!
//! `InteractionState` is the gesture being tracked between pointer-down and
//! pointer-up. Each variant carries what the engine needs to compute the live
//! preview and to commit on release. `Phase` is the coarse, externally visible
//! view of the same state (`Idle`, `Selected`, `Dragging`, `Transforming`).

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::doc::{ElementId, LayoutElement};
use crate::geometry::{BoundBox, Point};
use crate::hit::HitPart;

/// A keyboard key.
///
/// The inner string holds the key name as reported by the host (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    /// Whether this key issues the delete command.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        matches!(self.0.as_str(), "Delete" | "Backspace")
    }

    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape"
    }
}

/// Derived visual state. Never part of a persisted element.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// The single selected element, if any.
    pub selected_id: Option<ElementId>,
    /// The element under the pointer, if any.
    pub hovered_id: Option<ElementId>,
}

/// Internal state for the interaction state machine.
#[derive(Debug, Clone, Default)]
pub enum InteractionState {
    /// No element selected and no gesture in progress.
    #[default]
    Idle,
    /// An element is selected. `grab` is set while the pointer is held on its
    /// body but has not moved yet.
    Selected {
        id: ElementId,
        /// Offset from the element origin to the pointer at pointer-down.
        grab: Option<Point>,
    },
    /// The selected element is following the pointer.
    Dragging {
        id: ElementId,
        grab: Point,
        /// Live-snapped position shown while dragging. Not committed.
        preview: (i32, i32),
        /// Unsnapped position of the last pointer-move; committed on release.
        raw: Point,
    },
    /// A resize or rotate handle of the selected element is held.
    Transforming {
        id: ElementId,
        /// Which handle started the gesture.
        part: HitPart,
        /// Element as it was at pointer-down, restored on cancel.
        original: LayoutElement,
        /// Pointer position at pointer-down.
        start: Point,
        /// Current bound box after the minimum-size guard.
        bound_box: BoundBox,
    },
}

impl InteractionState {
    /// Coarse phase of the state machine.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            Self::Idle => Phase::Idle,
            Self::Selected { id, .. } => Phase::Selected(*id),
            Self::Dragging { id, .. } => Phase::Dragging(*id),
            Self::Transforming { id, .. } => Phase::Transforming(*id),
        }
    }

    /// The element the state refers to, if any.
    #[must_use]
    pub fn element_id(&self) -> Option<ElementId> {
        match self.phase() {
            Phase::Idle => None,
            Phase::Selected(id) | Phase::Dragging(id) | Phase::Transforming(id) => Some(id),
        }
    }
}

/// Externally visible phase of the interaction state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Selected(ElementId),
    Dragging(ElementId),
    Transforming(ElementId),
}
