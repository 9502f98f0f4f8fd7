use crate::confirm::{Confirm, Prompt};
use crate::doc::{DocStore, ElementId, ElementKind, ElementPatch, LayoutElement};
use crate::geometry::{BoundBox, Point, Transform, accept_bound_box, apply_transform, snap_point};
use crate::hit::{HitPart, hit_test, resize_box, rotate_angle};
use crate::input::{InteractionState, Key, Phase, UiState};
use crate::templates::{DEFAULT_TEMPLATE_ID, Template};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ElementAdded(LayoutElement),
    ElementUpdated(LayoutElement),
    ElementDeleted { id: ElementId },
    SelectionChanged(Option<ElementId>),
    RenderNeeded,
}

/// Editing engine for one floor's elements.
///
/// Holds the element store, the selection, the gesture in progress, and the
/// unsaved-changes flag. Geometry only changes on commit (pointer-up, a
/// properties patch, add/delete, or a template); pointer-move only updates
/// the preview.
#[derive(Debug, Clone)]
pub struct EngineCore {
    pub doc: DocStore,
    pub ui: UiState,
    pub input: InteractionState,
    template_id: String,
    dirty: bool,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            doc: DocStore::new(),
            ui: UiState::default(),
            input: InteractionState::default(),
            template_id: DEFAULT_TEMPLATE_ID.to_owned(),
            dirty: false,
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Replace the document with a loaded floor. Clears selection, any
    /// gesture, and the unsaved-changes flag.
    pub fn load_elements(&mut self, template_id: &str, elements: Vec<LayoutElement>) {
        self.doc.load_snapshot(elements);
        template_id.clone_into(&mut self.template_id);
        self.ui = UiState::default();
        self.input = InteractionState::Idle;
        self.dirty = false;
    }

    /// Add a default element of `kind`. Rooms and doors added while a space
    /// is selected are parented to that space. The new element is selected.
    pub fn add_element(&mut self, kind: ElementKind) -> Vec<Action> {
        let parent = self
            .selection()
            .and_then(|id| self.doc.get(&id))
            .filter(|el| el.kind() == ElementKind::Space)
            .map(LayoutElement::id);
        let element = match kind {
            ElementKind::Room => LayoutElement::new_room(parent),
            ElementKind::Door => LayoutElement::new_door(parent),
            ElementKind::Space | ElementKind::Text => LayoutElement::create(kind),
        };
        let id = element.id();
        self.doc.insert(element.clone());
        self.dirty = true;

        let mut actions = vec![Action::ElementAdded(element)];
        actions.extend(self.set_selection(Some(id)));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Replace every element with a fresh copy of `template`'s elements.
    pub fn apply_template(&mut self, template: &Template) -> Vec<Action> {
        let had_selection = self.selection().is_some();
        self.doc.load_snapshot(template.instantiate());
        template.id.clone_into(&mut self.template_id);
        self.ui = UiState::default();
        self.input = InteractionState::Idle;
        self.dirty = true;

        let mut actions = Vec::new();
        if had_selection {
            actions.push(Action::SelectionChanged(None));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Selection ---

    /// Select `id`, or clear the selection with `None`. Ids that are not in
    /// the document clear the selection.
    pub fn select(&mut self, id: Option<ElementId>) -> Vec<Action> {
        let id = id.filter(|id| self.doc.contains(id));
        let mut actions = self.set_selection(id);
        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    fn set_selection(&mut self, id: Option<ElementId>) -> Vec<Action> {
        let changed = self.ui.selected_id != id;
        self.ui.selected_id = id;
        self.input = match id {
            Some(id) => InteractionState::Selected { id, grab: None },
            None => InteractionState::Idle,
        };
        if changed { vec![Action::SelectionChanged(id)] } else { Vec::new() }
    }

    // --- Commits ---

    /// Apply a properties-editor patch to element `id`.
    pub fn update_properties(&mut self, id: &ElementId, patch: &ElementPatch) -> Vec<Action> {
        let Some(element) = self.doc.get_mut(id) else {
            return Vec::new();
        };
        if !element.apply_patch(patch) {
            return Vec::new();
        }
        let updated = element.clone();
        self.dirty = true;
        vec![Action::ElementUpdated(updated), Action::RenderNeeded]
    }

    /// Commit a drag that ended with the element's origin at the raw
    /// position (`raw_x`, `raw_y`).
    pub fn commit_drag(&mut self, id: &ElementId, raw_x: f64, raw_y: f64) -> Vec<Action> {
        let Some(element) = self.doc.get_mut(id) else {
            return Vec::new();
        };
        element.set_position(snap_point(raw_x), snap_point(raw_y));
        let updated = element.clone();
        self.dirty = true;
        vec![Action::ElementUpdated(updated), Action::RenderNeeded]
    }

    /// Fold a finished resize/rotate into element `id`.
    pub fn commit_transform(&mut self, id: &ElementId, transform: &Transform) -> Vec<Action> {
        let Some(element) = self.doc.get(id) else {
            return Vec::new();
        };
        let updated = apply_transform(element, transform);
        self.doc.insert(updated.clone());
        self.dirty = true;
        vec![Action::ElementUpdated(updated), Action::RenderNeeded]
    }

    /// Delete the selected element after the caller confirms. Only allowed
    /// while an element is selected and no gesture is in progress.
    pub fn delete_selected(&mut self, confirm: &mut impl Confirm) -> Vec<Action> {
        let Phase::Selected(id) = self.phase() else {
            return Vec::new();
        };
        if !confirm.confirm(&Prompt::DeleteElement { id }) {
            return Vec::new();
        }
        if self.doc.remove(&id).is_none() {
            return Vec::new();
        }
        self.dirty = true;
        if self.ui.hovered_id == Some(id) {
            self.ui.hovered_id = None;
        }

        let mut actions = vec![Action::ElementDeleted { id }];
        actions.extend(self.set_selection(None));
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, pt: Point) -> Vec<Action> {
        let hit = hit_test(pt, &self.doc, self.selection());
        let Some(hit) = hit else {
            let mut actions = self.set_selection(None);
            if !actions.is_empty() {
                actions.push(Action::RenderNeeded);
            }
            return actions;
        };
        let Some(element) = self.doc.get(&hit.element_id).cloned() else {
            return Vec::new();
        };

        let mut actions = self.set_selection(Some(hit.element_id));
        self.input = match hit.part {
            HitPart::Body => {
                let (x, y) = element.position();
                let grab = pt.sub(Point::new(f64::from(x), f64::from(y)));
                InteractionState::Selected { id: hit.element_id, grab: Some(grab) }
            }
            HitPart::ResizeHandle(_) | HitPart::RotateHandle => InteractionState::Transforming {
                id: hit.element_id,
                part: hit.part,
                bound_box: element.bounds(),
                original: element,
                start: pt,
            },
        };
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn on_pointer_move(&mut self, pt: Point) -> Vec<Action> {
        let mut render = self.update_hover(pt);

        if let InteractionState::Selected { id, grab: Some(grab) } = self.input {
            let raw = pt.sub(grab);
            self.input = InteractionState::Dragging { id, grab, preview: preview_of(raw), raw };
            return vec![Action::RenderNeeded];
        }

        match &mut self.input {
            InteractionState::Idle | InteractionState::Selected { .. } => {}
            InteractionState::Dragging { grab, preview, raw, .. } => {
                *raw = pt.sub(*grab);
                *preview = preview_of(*raw);
                render = true;
            }
            InteractionState::Transforming { part, original, start, bound_box, .. } => {
                let base = original.bounds();
                *bound_box = match *part {
                    HitPart::ResizeHandle(anchor) => {
                        accept_bound_box(*bound_box, resize_box(&base, anchor, *start, pt))
                    }
                    HitPart::RotateHandle => BoundBox { rotation: rotate_angle(&base, pt), ..base },
                    HitPart::Body => *bound_box,
                };
                render = true;
            }
        }

        if render { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    pub fn on_pointer_up(&mut self, pt: Point) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InteractionState::Idle => Vec::new(),
            InteractionState::Selected { id, .. } => {
                self.input = InteractionState::Selected { id, grab: None };
                Vec::new()
            }
            InteractionState::Dragging { id, grab, .. } => {
                let raw = pt.sub(grab);
                let actions = self.commit_drag(&id, raw.x, raw.y);
                self.input = InteractionState::Selected { id, grab: None };
                actions
            }
            InteractionState::Transforming { id, original, bound_box, .. } => {
                let transform = transform_from_box(&original, &bound_box);
                let actions = self.commit_transform(&id, &transform);
                self.input = InteractionState::Selected { id, grab: None };
                actions
            }
        }
    }

    /// `Delete`/`Backspace` deletes the selection (confirmation-gated);
    /// `Escape` cancels a gesture, or clears the selection when idle.
    pub fn on_key_down(&mut self, key: &Key, confirm: &mut impl Confirm) -> Vec<Action> {
        if key.is_delete() {
            return self.delete_selected(confirm);
        }
        if !key.is_escape() {
            return Vec::new();
        }
        match self.phase() {
            Phase::Idle => Vec::new(),
            Phase::Dragging(id) | Phase::Transforming(id) => {
                self.input = InteractionState::Selected { id, grab: None };
                vec![Action::RenderNeeded]
            }
            Phase::Selected(_) => {
                let mut actions = self.set_selection(None);
                actions.push(Action::RenderNeeded);
                actions
            }
        }
    }

    fn update_hover(&mut self, pt: Point) -> bool {
        let hovered = hit_test(pt, &self.doc, None).map(|hit| hit.element_id);
        let changed = self.ui.hovered_id != hovered;
        self.ui.hovered_id = hovered;
        changed
    }

    // --- Unsaved changes ---

    /// Whether any element changed since the last load or save.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Clear the unsaved-changes flag after a completed save.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    // --- Queries ---

    /// All elements in insertion order.
    #[must_use]
    pub fn elements(&self) -> &[LayoutElement] {
        self.doc.elements()
    }

    /// Template the current elements were started from.
    #[must_use]
    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    /// The currently selected element, if any.
    #[must_use]
    pub fn selection(&self) -> Option<ElementId> {
        self.ui.selected_id
    }

    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&LayoutElement> {
        self.doc.get(id)
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.input.phase()
    }

    /// Bounds to draw for `element`, including any uncommitted gesture preview.
    #[must_use]
    pub fn display_bounds(&self, element: &LayoutElement) -> BoundBox {
        let bounds = element.bounds();
        match &self.input {
            InteractionState::Dragging { id, preview, .. } if *id == element.id() => {
                BoundBox { x: f64::from(preview.0), y: f64::from(preview.1), ..bounds }
            }
            InteractionState::Transforming { id, bound_box, .. } if *id == element.id() => *bound_box,
            _ => bounds,
        }
    }
}

fn preview_of(raw: Point) -> (i32, i32) {
    (snap_point(raw.x), snap_point(raw.y))
}

/// The transform a gesture produced: the box's position and rotation, and its
/// size relative to the element's committed size.
fn transform_from_box(original: &LayoutElement, bound_box: &BoundBox) -> Transform {
    let base = original.bounds();
    Transform {
        x: bound_box.x,
        y: bound_box.y,
        scale_x: bound_box.width / base.width,
        scale_y: bound_box.height / base.height,
        rotation: bound_box.rotation,
    }
}
