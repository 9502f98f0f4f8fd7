//! Floor-plan editing engine.
//!
//! This crate owns everything that happens on the drawing surface of the
//! layout editor: the element model (spaces, rooms, doors, text labels), the
//! grid snapping rules, and the pointer/keyboard state machine that turns
//! gestures into element mutations. It performs no I/O; the host decides when
//! to persist the resulting [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::EngineCore`] driving gestures and edits |
//! | [`doc`] | Element variants and the in-memory element store |
//! | [`geometry`] | Grid snapping, size clamps, and transform absorption |
//! | [`input`] | Interaction states and input types |
//! | [`hit`] | Hit-testing against elements and transform handles |
//! | [`render`] | Painter's-order display list with derived highlight state |
//! | [`templates`] | Built-in starting layouts |
//! | [`confirm`] | Confirmation capability for destructive actions |
//! | [`consts`] | Shared numeric constants (grid unit, canvas extent, size bounds) |

pub mod confirm;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod geometry;
pub mod hit;
pub mod input;
pub mod render;
pub mod templates;
