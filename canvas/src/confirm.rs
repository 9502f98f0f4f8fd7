//! Confirmation capability for destructive actions.
//!
//! The engine and the floor manager never open dialogs themselves. Anything
//! that deletes data or discards edits asks its caller through [`Confirm`],
//! which a UI host implements with a modal and a test implements with a
//! closure or a fixed answer.

#[cfg(test)]
#[path = "confirm_test.rs"]
mod confirm_test;

use crate::doc::ElementId;

/// What the user is being asked to approve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Remove a single element from the active floor.
    DeleteElement { id: ElementId },
    /// Remove a floor and its stored layout.
    DeleteFloor { number: i32 },
    /// Leave a floor whose edits have not been saved.
    DiscardUnsavedEdits { floor: i32 },
}

impl Prompt {
    /// Human-readable question for the prompt.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::DeleteElement { .. } => "Delete the selected element?".to_owned(),
            Self::DeleteFloor { number } => format!("Delete floor {number} and its layout?"),
            Self::DiscardUnsavedEdits { floor } => {
                format!("Floor {floor} has unsaved changes. Discard them?")
            }
        }
    }
}

/// Asks the user to approve a destructive action.
pub trait Confirm {
    /// Return `true` to proceed, `false` to abort with no state change.
    fn confirm(&mut self, prompt: &Prompt) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&Prompt) -> bool,
{
    fn confirm(&mut self, prompt: &Prompt) -> bool {
        self(prompt)
    }
}

/// A fixed answer, for hosts that collected confirmation before calling in
/// (for example a request flag).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preconfirmed(pub bool);

impl Confirm for Preconfirmed {
    fn confirm(&mut self, _prompt: &Prompt) -> bool {
        self.0
    }
}
