#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::confirm::Preconfirmed;
use crate::doc::DoorDirection;
use crate::templates;

fn engine_with(elements: Vec<LayoutElement>) -> EngineCore {
    let mut engine = EngineCore::new();
    engine.load_elements("blank", elements);
    engine
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn key(name: &str) -> Key {
    Key(name.to_owned())
}

fn size_of(engine: &EngineCore, id: &ElementId) -> (f64, f64) {
    let b = engine.element(id).unwrap().bounds();
    (b.width, b.height)
}

// =============================================================
// Loading and adding
// =============================================================

#[test]
fn new_engine_is_idle_and_clean() {
    let engine = EngineCore::new();
    assert_eq!(engine.phase(), Phase::Idle);
    assert!(engine.elements().is_empty());
    assert!(!engine.has_unsaved_changes());
    assert_eq!(engine.template_id(), "blank");
}

#[test]
fn load_clears_selection_and_dirty_flag() {
    let mut engine = EngineCore::new();
    engine.add_element(ElementKind::Room);
    assert!(engine.has_unsaved_changes());
    let room = LayoutElement::new_room(None);
    engine.load_elements("single-room-office", vec![room.clone()]);
    assert_eq!(engine.selection(), None);
    assert_eq!(engine.phase(), Phase::Idle);
    assert!(!engine.has_unsaved_changes());
    assert_eq!(engine.elements(), &[room]);
    assert_eq!(engine.template_id(), "single-room-office");
}

#[test]
fn add_element_selects_and_marks_dirty() {
    let mut engine = EngineCore::new();
    let actions = engine.add_element(ElementKind::Door);
    let Some(Action::ElementAdded(door)) = actions.first() else {
        panic!("expected ElementAdded, got {actions:?}");
    };
    assert_eq!(door.kind(), ElementKind::Door);
    assert!(actions.contains(&Action::SelectionChanged(Some(door.id()))));
    assert_eq!(engine.phase(), Phase::Selected(door.id()));
    assert!(engine.has_unsaved_changes());
}

#[test]
fn rooms_added_with_space_selected_get_parent() {
    let space = LayoutElement::new_space();
    let space_id = space.id();
    let mut engine = engine_with(vec![space]);
    engine.select(Some(space_id));
    engine.add_element(ElementKind::Room);
    let room_id = engine.selection().unwrap();
    let Some(LayoutElement::Room(room)) = engine.element(&room_id) else {
        panic!("expected room");
    };
    assert_eq!(room.parent_id, Some(space_id));
}

#[test]
fn rooms_added_without_space_have_no_parent() {
    let mut engine = EngineCore::new();
    engine.add_element(ElementKind::Room);
    let room_id = engine.selection().unwrap();
    let Some(LayoutElement::Room(room)) = engine.element(&room_id) else {
        panic!("expected room");
    };
    assert_eq!(room.parent_id, None);
}

// =============================================================
// Selection
// =============================================================

#[test]
fn selecting_new_element_replaces_previous() {
    let a = LayoutElement::new_room(None);
    let b = LayoutElement::new_space();
    let (a_id, b_id) = (a.id(), b.id());
    let mut engine = engine_with(vec![a, b]);
    engine.select(Some(a_id));
    let actions = engine.select(Some(b_id));
    assert_eq!(actions, vec![Action::SelectionChanged(Some(b_id)), Action::RenderNeeded]);
    assert_eq!(engine.selection(), Some(b_id));
    assert_eq!(engine.phase(), Phase::Selected(b_id));
}

#[test]
fn selecting_unknown_id_clears_selection() {
    let room = LayoutElement::new_room(None);
    let id = room.id();
    let mut engine = engine_with(vec![room]);
    engine.select(Some(id));
    engine.select(Some(Uuid::new_v4()));
    assert_eq!(engine.selection(), None);
    assert_eq!(engine.phase(), Phase::Idle);
}

#[test]
fn reselecting_same_element_emits_nothing() {
    let room = LayoutElement::new_room(None);
    let id = room.id();
    let mut engine = engine_with(vec![room]);
    engine.select(Some(id));
    assert!(engine.select(Some(id)).is_empty());
}

#[test]
fn click_on_element_selects_it() {
    let room = LayoutElement::new_room(None);
    let id = room.id();
    let mut engine = engine_with(vec![room.clone()]);
    let actions = engine.on_pointer_down(pt(130.0, 130.0));
    assert!(actions.contains(&Action::SelectionChanged(Some(id))));
    let actions = engine.on_pointer_up(pt(130.0, 130.0));
    assert!(actions.is_empty());
    assert_eq!(engine.phase(), Phase::Selected(id));
    assert_eq!(engine.element(&id), Some(&room));
    assert!(!engine.has_unsaved_changes());
}

#[test]
fn click_on_background_clears_selection() {
    let room = LayoutElement::new_room(None);
    let id = room.id();
    let mut engine = engine_with(vec![room]);
    engine.select(Some(id));
    let actions = engine.on_pointer_down(pt(700.0, 500.0));
    assert_eq!(actions, vec![Action::SelectionChanged(None), Action::RenderNeeded]);
    assert_eq!(engine.phase(), Phase::Idle);
}

// =============================================================
// Dragging
// =============================================================

#[test]
fn drag_commits_snapped_position() {
    // Room at (120, 120); grabbed 10 units in, dropped with its origin at
    // the raw position (131, 127).
    let room = LayoutElement::new_room(None);
    let id = room.id();
    let mut engine = engine_with(vec![room]);
    engine.on_pointer_down(pt(130.0, 130.0));
    engine.on_pointer_move(pt(138.0, 134.0));
    assert_eq!(engine.phase(), Phase::Dragging(id));
    engine.on_pointer_move(pt(141.0, 137.0));
    let actions = engine.on_pointer_up(pt(141.0, 137.0));

    assert_eq!(engine.element(&id).map(LayoutElement::position), Some((140, 120)));
    assert!(matches!(actions.first(), Some(Action::ElementUpdated(el)) if el.id() == id));
    assert_eq!(engine.phase(), Phase::Selected(id));
    assert!(engine.has_unsaved_changes());
}

#[test]
fn commit_drag_snaps_raw_coordinates() {
    let room = LayoutElement::new_room(None);
    let id = room.id();
    let mut engine = engine_with(vec![room]);
    engine.commit_drag(&id, 131.0, 127.0);
    assert_eq!(engine.element(&id).map(LayoutElement::position), Some((140, 120)));
}

#[test]
fn drag_does_not_mutate_until_release() {
    let room = LayoutElement::new_room(None);
    let id = room.id();
    let mut engine = engine_with(vec![room]);
    engine.on_pointer_down(pt(130.0, 130.0));
    engine.on_pointer_move(pt(300.0, 300.0));
    assert_eq!(engine.element(&id).map(LayoutElement::position), Some((120, 120)));
    assert!(!engine.has_unsaved_changes());
}

#[test]
fn escape_cancels_drag() {
    let room = LayoutElement::new_room(None);
    let id = room.id();
    let mut engine = engine_with(vec![room]);
    engine.on_pointer_down(pt(130.0, 130.0));
    engine.on_pointer_move(pt(300.0, 300.0));
    engine.on_key_down(&key("Escape"), &mut Preconfirmed(true));
    assert_eq!(engine.phase(), Phase::Selected(id));
    assert!(engine.on_pointer_up(pt(300.0, 300.0)).is_empty());
    assert_eq!(engine.element(&id).map(LayoutElement::position), Some((120, 120)));
}

// =============================================================
// Transforming
// =============================================================

#[test]
fn commit_transform_clamps_room_width() {
    let room = LayoutElement::new_room(None);
    let id = room.id();
    let mut engine = engine_with(vec![room.clone()]);
    let t = Transform { scale_x: 20.0, ..Transform::identity(&room) };
    engine.commit_transform(&id, &t);
    assert_eq!(size_of(&engine, &id), (600.0, 40.0));
}

#[test]
fn commit_transform_snaps_door_rotation() {
    let door = LayoutElement::new_door(None);
    let id = door.id();
    let mut engine = engine_with(vec![door.clone()]);
    let t = Transform { rotation: 47.0, ..Transform::identity(&door) };
    engine.commit_transform(&id, &t);
    assert_eq!(engine.element(&id).and_then(LayoutElement::rotation), Some(60));
}

#[test]
fn resize_gesture_commits_snapped_size() {
    let room = LayoutElement::new_room(None);
    let id = room.id();
    let mut engine = engine_with(vec![room]);
    engine.select(Some(id));
    engine.on_pointer_down(pt(160.0, 160.0));
    assert_eq!(engine.phase(), Phase::Transforming(id));
    engine.on_pointer_move(pt(203.0, 181.0));
    engine.on_pointer_up(pt(203.0, 181.0));
    assert_eq!(size_of(&engine, &id), (80.0, 60.0));
    assert_eq!(engine.element(&id).map(LayoutElement::position), Some((120, 120)));
    assert_eq!(engine.phase(), Phase::Selected(id));
}

#[test]
fn resize_gesture_refuses_degenerate_box() {
    let room = LayoutElement::new_room(None);
    let id = room.id();
    let mut engine = engine_with(vec![room]);
    engine.select(Some(id));
    engine.on_pointer_down(pt(160.0, 160.0));
    engine.on_pointer_move(pt(190.0, 160.0));
    // Collapsing the height below one grid unit keeps the previous box.
    engine.on_pointer_move(pt(250.0, 125.0));
    let InteractionState::Transforming { bound_box, .. } = &engine.input else {
        panic!("expected transforming");
    };
    assert_eq!((bound_box.width, bound_box.height), (70.0, 40.0));
    engine.on_pointer_up(pt(250.0, 125.0));
    assert_eq!(size_of(&engine, &id), (80.0, 40.0));
}

#[test]
fn resize_gesture_refuses_flipped_box() {
    let room = LayoutElement::new_room(None);
    let id = room.id();
    let mut engine = engine_with(vec![room]);
    engine.select(Some(id));
    // Room at (120, 120), 40x40: drag the south-east handle past the west edge.
    engine.on_pointer_down(pt(160.0, 160.0));
    engine.on_pointer_move(pt(80.0, 160.0));
    let InteractionState::Transforming { bound_box, .. } = &engine.input else {
        panic!("expected transforming");
    };
    assert_eq!((bound_box.width, bound_box.height), (40.0, 40.0));
    engine.on_pointer_up(pt(80.0, 160.0));
    assert_eq!(size_of(&engine, &id), (40.0, 40.0));
    assert_eq!(engine.element(&id).map(LayoutElement::position), Some((120, 120)));
}

#[test]
fn rotate_gesture_on_door_snaps_to_step() {
    let door = LayoutElement::new_door(None);
    let id = door.id();
    let mut engine = engine_with(vec![door]);
    engine.select(Some(id));
    // Door at (100, 80), 20 wide: rotate handle rests at (110, 56).
    engine.on_pointer_down(pt(110.0, 57.0));
    assert_eq!(engine.phase(), Phase::Transforming(id));
    // A quarter turn clockwise around the top-left corner moves the handle
    // to (124, 90); stop a little short of it.
    engine.on_pointer_move(pt(124.0, 86.0));
    engine.on_pointer_up(pt(124.0, 86.0));
    assert_eq!(engine.element(&id).and_then(LayoutElement::rotation), Some(90));
    assert_eq!(engine.element(&id).map(LayoutElement::position), Some((100, 80)));
}

#[test]
fn escape_cancels_transform() {
    let room = LayoutElement::new_room(None);
    let id = room.id();
    let mut engine = engine_with(vec![room.clone()]);
    engine.select(Some(id));
    engine.on_pointer_down(pt(160.0, 160.0));
    engine.on_pointer_move(pt(300.0, 300.0));
    engine.on_key_down(&key("Escape"), &mut Preconfirmed(true));
    engine.on_pointer_up(pt(300.0, 300.0));
    assert_eq!(engine.element(&id), Some(&room));
    assert!(!engine.has_unsaved_changes());
}

// =============================================================
// Properties editor
// =============================================================

#[test]
fn update_properties_marks_dirty_and_reports() {
    let room = LayoutElement::new_room(None);
    let id = room.id();
    let mut engine = engine_with(vec![room]);
    let patch = ElementPatch { room_number: Some("101".into()), capacity: Some(8), ..Default::default() };
    let actions = engine.update_properties(&id, &patch);
    assert!(matches!(actions.first(), Some(Action::ElementUpdated(el)) if el.label() == Some("101")));
    assert!(engine.has_unsaved_changes());
}

#[test]
fn noop_patch_leaves_flag_clean() {
    let door = LayoutElement::new_door(None);
    let id = door.id();
    let mut engine = engine_with(vec![door]);
    let patch = ElementPatch { direction: Some(DoorDirection::Right), ..Default::default() };
    assert!(engine.update_properties(&id, &patch).is_empty());
    assert!(!engine.has_unsaved_changes());
}

#[test]
fn patch_on_missing_element_is_ignored() {
    let mut engine = EngineCore::new();
    assert!(engine.update_properties(&Uuid::new_v4(), &ElementPatch::default()).is_empty());
}

// =============================================================
// Delete
// =============================================================

#[test]
fn delete_requires_confirmation() {
    let room = LayoutElement::new_room(None);
    let id = room.id();
    let mut engine = engine_with(vec![room]);
    engine.select(Some(id));
    assert!(engine.delete_selected(&mut Preconfirmed(false)).is_empty());
    assert!(engine.element(&id).is_some());
    assert_eq!(engine.selection(), Some(id));
}

#[test]
fn confirmed_delete_removes_and_returns_to_idle() {
    let room = LayoutElement::new_room(None);
    let id = room.id();
    let mut engine = engine_with(vec![room]);
    engine.select(Some(id));
    let mut asked = Vec::new();
    let mut confirm = |p: &Prompt| {
        asked.push(p.clone());
        true
    };
    let actions = engine.on_key_down(&key("Delete"), &mut confirm);
    assert_eq!(asked, vec![Prompt::DeleteElement { id }]);
    assert_eq!(
        actions,
        vec![Action::ElementDeleted { id }, Action::SelectionChanged(None), Action::RenderNeeded]
    );
    assert_eq!(engine.selection(), None);
    assert_eq!(engine.phase(), Phase::Idle);
    assert!(engine.has_unsaved_changes());
}

#[test]
fn delete_without_selection_does_not_prompt() {
    let mut engine = engine_with(vec![LayoutElement::new_room(None)]);
    let mut asked = false;
    let mut confirm = |_: &Prompt| {
        asked = true;
        true
    };
    assert!(engine.on_key_down(&key("Backspace"), &mut confirm).is_empty());
    assert!(!asked);
}

#[test]
fn escape_clears_selection() {
    let room = LayoutElement::new_room(None);
    let id = room.id();
    let mut engine = engine_with(vec![room]);
    engine.select(Some(id));
    let actions = engine.on_key_down(&key("Escape"), &mut Preconfirmed(false));
    assert_eq!(actions, vec![Action::SelectionChanged(None), Action::RenderNeeded]);
    assert_eq!(engine.phase(), Phase::Idle);
}

#[test]
fn other_keys_are_ignored() {
    let mut engine = engine_with(vec![LayoutElement::new_room(None)]);
    assert!(engine.on_key_down(&key("a"), &mut Preconfirmed(true)).is_empty());
}

// =============================================================
// Templates and saving
// =============================================================

#[test]
fn applying_template_replaces_elements() {
    let room = LayoutElement::new_room(None);
    let id = room.id();
    let mut engine = engine_with(vec![room]);
    engine.select(Some(id));
    let office = templates::find("single-room-office").unwrap();
    let actions = engine.apply_template(office);
    assert_eq!(actions, vec![Action::SelectionChanged(None), Action::RenderNeeded]);
    assert_eq!(engine.elements().len(), office.instantiate().len());
    assert!(engine.element(&id).is_none());
    assert_eq!(engine.template_id(), "single-room-office");
    assert!(engine.has_unsaved_changes());
}

#[test]
fn mark_saved_clears_flag() {
    let mut engine = EngineCore::new();
    engine.add_element(ElementKind::Text);
    engine.mark_saved();
    assert!(!engine.has_unsaved_changes());
}

#[test]
fn at_most_one_selected_through_any_sequence() {
    let mut engine = EngineCore::new();
    for kind in [ElementKind::Space, ElementKind::Room, ElementKind::Door, ElementKind::Text] {
        engine.add_element(kind);
    }
    let ids: Vec<_> = engine.elements().iter().map(LayoutElement::id).collect();
    for id in &ids {
        engine.select(Some(*id));
        assert_eq!(engine.selection(), Some(*id));
        assert_eq!(engine.input.element_id(), Some(*id));
    }
    engine.on_key_down(&key("Delete"), &mut Preconfirmed(true));
    assert_eq!(engine.selection(), None);
    assert_eq!(engine.elements().len(), ids.len() - 1);
}
