#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{DocStore, LayoutElement};

fn doc_with(elements: Vec<LayoutElement>) -> DocStore {
    let mut doc = DocStore::new();
    for el in elements {
        doc.insert(el);
    }
    doc
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

// =============================================================
// hit_test: bodies
// =============================================================

#[test]
fn empty_canvas_hits_nothing() {
    let doc = doc_with(vec![LayoutElement::new_room(None)]);
    assert_eq!(hit_test(Point::new(700.0, 500.0), &doc, None), None);
}

#[test]
fn body_hit_returns_element() {
    let room = LayoutElement::new_room(None);
    let id = room.id();
    let doc = doc_with(vec![room]);
    let hit = hit_test(Point::new(130.0, 130.0), &doc, None);
    assert_eq!(hit, Some(Hit { element_id: id, part: HitPart::Body }));
}

#[test]
fn room_above_space_wins_regardless_of_insertion_order() {
    let room = LayoutElement::new_room(None);
    let room_id = room.id();
    let doc = doc_with(vec![room, LayoutElement::new_space()]);
    let hit = hit_test(Point::new(130.0, 130.0), &doc, None);
    assert_eq!(hit.map(|h| h.element_id), Some(room_id));
}

#[test]
fn handles_of_unselected_elements_are_ignored() {
    let room = LayoutElement::new_room(None);
    let id = room.id();
    let doc = doc_with(vec![room]);
    let hit = hit_test(Point::new(160.0, 160.0), &doc, None);
    assert_eq!(hit, Some(Hit { element_id: id, part: HitPart::Body }));
}

// =============================================================
// hit_test: handles
// =============================================================

#[test]
fn selected_corner_handle_wins_over_body() {
    let room = LayoutElement::new_room(None);
    let id = room.id();
    let doc = doc_with(vec![room]);
    let hit = hit_test(Point::new(159.0, 161.0), &doc, Some(id));
    assert_eq!(hit, Some(Hit { element_id: id, part: HitPart::ResizeHandle(ResizeAnchor::Se) }));
    let hit = hit_test(Point::new(119.0, 121.0), &doc, Some(id));
    assert_eq!(hit.map(|h| h.part), Some(HitPart::ResizeHandle(ResizeAnchor::Nw)));
}

#[test]
fn rotate_handle_above_rotatable_elements() {
    let room = LayoutElement::new_room(None);
    let id = room.id();
    let doc = doc_with(vec![room]);
    let hit = hit_test(Point::new(140.0, 98.0), &doc, Some(id));
    assert_eq!(hit, Some(Hit { element_id: id, part: HitPart::RotateHandle }));
}

#[test]
fn spaces_have_no_rotate_handle() {
    let space = LayoutElement::new_space();
    let id = space.id();
    let doc = doc_with(vec![space]);
    assert_eq!(hit_test(Point::new(280.0, 56.0), &doc, Some(id)), None);
}

// =============================================================
// Gesture math
// =============================================================

#[test]
fn resize_from_south_east_grows_box() {
    let original = BoundBox::from_ints(0, 0, 40, 40, 0);
    let out = resize_box(&original, ResizeAnchor::Se, Point::new(40.0, 40.0), Point::new(60.0, 80.0));
    assert_eq!((out.x, out.y, out.width, out.height), (0.0, 0.0, 60.0, 80.0));
}

#[test]
fn resize_from_north_west_moves_origin() {
    let original = BoundBox::from_ints(0, 0, 40, 40, 0);
    let out = resize_box(&original, ResizeAnchor::Nw, Point::new(0.0, 0.0), Point::new(-20.0, -20.0));
    assert_eq!((out.x, out.y, out.width, out.height), (-20.0, -20.0, 60.0, 60.0));
}

#[test]
fn resize_edge_handle_moves_one_axis() {
    let original = BoundBox::from_ints(0, 0, 40, 40, 0);
    let out = resize_box(&original, ResizeAnchor::N, Point::new(20.0, 0.0), Point::new(35.0, -20.0));
    assert_eq!((out.width, out.height), (40.0, 60.0));
}

#[test]
fn resize_follows_element_axes_when_rotated() {
    let original = BoundBox::from_ints(0, 0, 40, 40, 90);
    let out = resize_box(&original, ResizeAnchor::E, Point::new(0.0, 40.0), Point::new(0.0, 60.0));
    assert_close(out.width, 60.0);
    assert_close(out.height, 40.0);
    assert_close(out.x, 0.0);
    assert_close(out.y, 0.0);
}

#[test]
fn rotate_angle_zero_at_rest() {
    let original = BoundBox::from_ints(0, 0, 40, 40, 0);
    assert_close(rotate_angle(&original, Point::new(20.0, -24.0)), 0.0);
}

#[test]
fn rotate_angle_quarter_turn() {
    let original = BoundBox::from_ints(0, 0, 40, 40, 0);
    assert_close(rotate_angle(&original, Point::new(24.0, 20.0)), 90.0);
}

#[test]
fn anchor_edges() {
    assert!(ResizeAnchor::Nw.moves_left() && ResizeAnchor::Nw.moves_top());
    assert!(ResizeAnchor::Se.moves_right() && ResizeAnchor::Se.moves_bottom());
    assert!(!ResizeAnchor::N.moves_left() && !ResizeAnchor::N.moves_right());
}
