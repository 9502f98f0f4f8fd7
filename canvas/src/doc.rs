//! Document model: layout elements, their properties, and the in-memory store.
//!
//! This module defines the four element variants that can be placed on a
//! floor (`Space`, `Room`, `Door`, `Text`), the closed `LayoutElement` sum type
//! that wraps them, a sparse-update type for the properties editor
//! (`ElementPatch`), and the runtime store that owns the active floor's
//! elements (`DocStore`).
//!
//! Elements arrive here from persisted snapshots (JSON deserialization) and
//! from the engine (factories and gesture commits). The renderer reads the
//! store through `draw_order`, which fixes z-order by variant.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{ELEMENT_MAX_SIZE, GRID_UNIT, SPACE_MAX_SIZE, TEXT_ADVANCE_RATIO};
use crate::geometry::{BoundBox, clamp_size, snap_point, snap_rotation};

/// Unique identifier for a layout element. Generated once, never reused.
pub type ElementId = Uuid;

/// The variant tag of a layout element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// A bounded area such as a hall, corridor, or restroom.
    Space,
    /// A bookable room or seat, usually placed inside a space.
    Room,
    /// An entrance on a space boundary.
    Door,
    /// A free-standing text label.
    Text,
}

impl ElementKind {
    /// Largest width/height (or font size) the variant accepts.
    #[must_use]
    pub fn max_size(self) -> i32 {
        match self {
            Self::Space => SPACE_MAX_SIZE,
            Self::Room | Self::Door | Self::Text => ELEMENT_MAX_SIZE,
        }
    }

    /// Whether the variant exposes a rotate handle.
    #[must_use]
    pub fn is_rotatable(self) -> bool {
        matches!(self, Self::Room | Self::Door)
    }
}

/// Fill and stroke applied to shape variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    /// Interior color as a CSS color string.
    pub fill: String,
    /// Outline color as a CSS color string.
    pub stroke: String,
    /// Outline width in logical units.
    pub stroke_width: u32,
}

impl Style {
    fn new(fill: &str, stroke: &str) -> Self {
        Self { fill: fill.to_owned(), stroke: stroke.to_owned(), stroke_width: 2 }
    }
}

/// Which way a door opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorDirection {
    Left,
    #[default]
    Right,
    Top,
    Bottom,
}

/// A bounded area of the floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub id: ElementId,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub style: Style,
}

/// A bookable room inside a space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: ElementId,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Clockwise rotation in degrees around the top-left corner. Not snapped.
    pub rotation: i32,
    /// Containing space, if the room was placed into one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ElementId>,
    pub room_number: String,
    pub room_name: String,
    pub capacity: u32,
    pub price_per_hour: u32,
    pub style: Style,
}

/// An entrance placed on a space boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Door {
    pub id: ElementId,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Clockwise rotation in degrees; always a multiple of 30 after a transform.
    pub rotation: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ElementId>,
    pub direction: DoorDirection,
    pub style: Style,
}

/// A text label. Sized by its font size rather than a bound box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub id: ElementId,
    pub x: i32,
    pub y: i32,
    pub text: String,
    pub font_size: i32,
    pub fill: String,
}

/// A layout element as stored in the document and in persisted snapshots.
///
/// Serialized with an internal `type` tag (`"space"`, `"room"`, `"door"`,
/// `"text"`) so the persisted shape stays flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayoutElement {
    Space(Space),
    Room(Room),
    Door(Door),
    Text(Text),
}

impl LayoutElement {
    // --- Factories ---

    /// Create a new element of `kind` with default geometry and style.
    #[must_use]
    pub fn create(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Space => Self::new_space(),
            ElementKind::Room => Self::new_room(None),
            ElementKind::Door => Self::new_door(None),
            ElementKind::Text => Self::new_text(),
        }
    }

    /// A 400×240 space at (80, 80).
    #[must_use]
    pub fn new_space() -> Self {
        Self::Space(Space {
            id: Uuid::new_v4(),
            x: 80,
            y: 80,
            width: 400,
            height: 240,
            style: Style::new("#f0f0f0", "#1976d2"),
        })
    }

    /// A 40×40 single-seat room at (120, 120).
    #[must_use]
    pub fn new_room(parent_id: Option<ElementId>) -> Self {
        Self::Room(Room {
            id: Uuid::new_v4(),
            x: 120,
            y: 120,
            width: 40,
            height: 40,
            rotation: 0,
            parent_id,
            room_number: String::new(),
            room_name: "Room".to_owned(),
            capacity: 1,
            price_per_hour: 10_000,
            style: Style::new("#e3f2fd", "#1976d2"),
        })
    }

    /// A 20×40 right-opening door at (100, 80).
    #[must_use]
    pub fn new_door(parent_id: Option<ElementId>) -> Self {
        Self::Door(Door {
            id: Uuid::new_v4(),
            x: 100,
            y: 80,
            width: 20,
            height: 40,
            rotation: 0,
            parent_id,
            direction: DoorDirection::Right,
            style: Style::new("#ffe082", "#bfa600"),
        })
    }

    /// A one-grid-unit text label at (120, 120).
    #[must_use]
    pub fn new_text() -> Self {
        Self::Text(Text {
            id: Uuid::new_v4(),
            x: 120,
            y: 120,
            text: "Text".to_owned(),
            font_size: GRID_UNIT,
            fill: "#333".to_owned(),
        })
    }

    /// Copy of this element under a freshly generated id.
    #[must_use]
    pub fn with_fresh_id(&self) -> Self {
        let mut copy = self.clone();
        let id = Uuid::new_v4();
        match &mut copy {
            Self::Space(s) => s.id = id,
            Self::Room(r) => r.id = id,
            Self::Door(d) => d.id = id,
            Self::Text(t) => t.id = id,
        }
        copy
    }

    // --- Accessors ---

    #[must_use]
    pub fn id(&self) -> ElementId {
        match self {
            Self::Space(s) => s.id,
            Self::Room(r) => r.id,
            Self::Door(d) => d.id,
            Self::Text(t) => t.id,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Space(_) => ElementKind::Space,
            Self::Room(_) => ElementKind::Room,
            Self::Door(_) => ElementKind::Door,
            Self::Text(_) => ElementKind::Text,
        }
    }

    /// Top-left corner in logical canvas units.
    #[must_use]
    pub fn position(&self) -> (i32, i32) {
        match self {
            Self::Space(s) => (s.x, s.y),
            Self::Room(r) => (r.x, r.y),
            Self::Door(d) => (d.x, d.y),
            Self::Text(t) => (t.x, t.y),
        }
    }

    /// Move the element. Callers are expected to pass grid-aligned values.
    pub fn set_position(&mut self, x: i32, y: i32) {
        match self {
            Self::Space(s) => (s.x, s.y) = (x, y),
            Self::Room(r) => (r.x, r.y) = (x, y),
            Self::Door(d) => (d.x, d.y) = (x, y),
            Self::Text(t) => (t.x, t.y) = (x, y),
        }
    }

    /// Rotation in degrees, for the variants that have one.
    #[must_use]
    pub fn rotation(&self) -> Option<i32> {
        match self {
            Self::Room(r) => Some(r.rotation),
            Self::Door(d) => Some(d.rotation),
            Self::Space(_) | Self::Text(_) => None,
        }
    }

    /// The element's bound box in its own (unrotated) frame, anchored at its
    /// position. Text is measured from its character count and font size.
    #[must_use]
    pub fn bounds(&self) -> BoundBox {
        match self {
            Self::Space(s) => BoundBox::from_ints(s.x, s.y, s.width, s.height, 0),
            Self::Room(r) => BoundBox::from_ints(r.x, r.y, r.width, r.height, r.rotation),
            Self::Door(d) => BoundBox::from_ints(d.x, d.y, d.width, d.height, d.rotation),
            Self::Text(t) => {
                let chars = t.text.chars().count().max(1);
                #[allow(clippy::cast_precision_loss)]
                let width = chars as f64 * f64::from(t.font_size) * TEXT_ADVANCE_RATIO;
                BoundBox {
                    x: f64::from(t.x),
                    y: f64::from(t.y),
                    width,
                    height: f64::from(t.font_size),
                    rotation: 0.0,
                }
            }
        }
    }

    // --- Properties editor ---

    /// Apply a sparse properties update. Fields that do not exist on this
    /// variant are ignored. Position is re-snapped and sizes are clamped into
    /// the variant's bounds; style is never touched. Returns `true` if any
    /// field changed.
    pub fn apply_patch(&mut self, patch: &ElementPatch) -> bool {
        let before = self.clone();
        let max = self.kind().max_size();

        if patch.x.is_some() || patch.y.is_some() {
            let (x, y) = self.position();
            let x = patch.x.map_or(x, |v| snap_point(f64::from(v)));
            let y = patch.y.map_or(y, |v| snap_point(f64::from(v)));
            self.set_position(x, y);
        }

        match self {
            Self::Space(s) => {
                apply_size(&mut s.width, patch.width, max);
                apply_size(&mut s.height, patch.height, max);
            }
            Self::Room(r) => {
                apply_size(&mut r.width, patch.width, max);
                apply_size(&mut r.height, patch.height, max);
                if let Some(rotation) = patch.rotation {
                    r.rotation = rotation;
                }
                if let Some(number) = &patch.room_number {
                    r.room_number.clone_from(number);
                }
                if let Some(name) = &patch.room_name {
                    r.room_name.clone_from(name);
                }
                if let Some(capacity) = patch.capacity {
                    r.capacity = capacity;
                }
                if let Some(price) = patch.price_per_hour {
                    r.price_per_hour = price;
                }
            }
            Self::Door(d) => {
                apply_size(&mut d.width, patch.width, max);
                apply_size(&mut d.height, patch.height, max);
                if let Some(rotation) = patch.rotation {
                    d.rotation = snap_rotation(f64::from(rotation));
                }
                if let Some(direction) = patch.direction {
                    d.direction = direction;
                }
            }
            Self::Text(t) => {
                apply_size(&mut t.font_size, patch.font_size, max);
                if let Some(text) = &patch.text {
                    t.text.clone_from(text);
                }
            }
        }

        *self != before
    }

    /// Label drawn on top of the element, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Room(r) if !r.room_number.is_empty() => Some(r.room_number.as_str()),
            Self::Room(r) if !r.room_name.is_empty() => Some(r.room_name.as_str()),
            Self::Text(t) => Some(t.text.as_str()),
            _ => None,
        }
    }
}

fn apply_size(slot: &mut i32, requested: Option<i32>, max: i32) {
    if let Some(v) = requested {
        *slot = clamp_size(f64::from(v), max);
    }
}

/// Sparse update from the properties editor. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    /// Rooms store this verbatim; doors snap it to 30° steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<DoorDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_hour: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<i32>,
}

/// In-memory store of the active floor's elements.
///
/// Keeps insertion order so a floor saved and reloaded round-trips to an
/// identical element list.
#[derive(Debug, Clone, Default)]
pub struct DocStore {
    elements: Vec<LayoutElement>,
}

impl DocStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { elements: Vec::new() }
    }

    /// Insert an element, replacing any existing element with the same id in place.
    pub fn insert(&mut self, element: LayoutElement) {
        match self.position_of(&element.id()) {
            Some(idx) => self.elements[idx] = element,
            None => self.elements.push(element),
        }
    }

    /// Remove an element by id, returning it if it was present.
    pub fn remove(&mut self, id: &ElementId) -> Option<LayoutElement> {
        let idx = self.position_of(id)?;
        Some(self.elements.remove(idx))
    }

    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&LayoutElement> {
        self.elements.iter().find(|e| e.id() == *id)
    }

    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut LayoutElement> {
        self.elements.iter_mut().find(|e| e.id() == *id)
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.position_of(id).is_some()
    }

    /// Replace all elements with a snapshot.
    pub fn load_snapshot(&mut self, elements: Vec<LayoutElement>) {
        self.elements = elements;
    }

    /// All elements in insertion order.
    #[must_use]
    pub fn elements(&self) -> &[LayoutElement] {
        &self.elements
    }

    /// Elements in painter's order: every `Space` first, then everything
    /// else, each group in insertion order.
    #[must_use]
    pub fn draw_order(&self) -> Vec<&LayoutElement> {
        let spaces = self.elements.iter().filter(|e| e.kind() == ElementKind::Space);
        let others = self.elements.iter().filter(|e| e.kind() != ElementKind::Space);
        spaces.chain(others).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn position_of(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id() == *id)
    }
}
