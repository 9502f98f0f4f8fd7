//! Built-in starting layouts.

#[cfg(test)]
#[path = "templates_test.rs"]
mod templates_test;

use crate::doc::{LayoutElement, Room, Text};

/// Template recorded on floors that were never started from a layout.
pub const DEFAULT_TEMPLATE_ID: &str = "blank";

/// A named starting layout.
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    build: fn() -> Vec<LayoutElement>,
}

impl Template {
    /// The template's elements under freshly generated ids.
    #[must_use]
    pub fn instantiate(&self) -> Vec<LayoutElement> {
        (self.build)()
    }
}

/// Every built-in template, in catalog order.
pub const TEMPLATES: &[Template] = &[
    Template { id: DEFAULT_TEMPLATE_ID, name: "Blank floor", build: Vec::new },
    Template { id: "single-room-office", name: "Single room office", build: single_room_office },
];

/// Look up a built-in template by id.
#[must_use]
pub fn find(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}

fn single_room_office() -> Vec<LayoutElement> {
    let space = LayoutElement::new_space();
    let space_id = space.id();

    let mut room = LayoutElement::new_room(Some(space_id));
    if let LayoutElement::Room(Room { x, y, width, height, room_number, room_name, capacity, .. }) = &mut room {
        (*x, *y, *width, *height) = (200, 140, 160, 120);
        "101".clone_into(room_number);
        "Office".clone_into(room_name);
        *capacity = 4;
    }

    let door = LayoutElement::new_door(Some(space_id));

    let mut label = LayoutElement::new_text();
    if let LayoutElement::Text(Text { x, y, text, .. }) = &mut label {
        (*x, *y) = (100, 100);
        "Lobby".clone_into(text);
    }

    vec![space, room, door, label]
}
