//! Floor and layout services behind the HTTP surface.
//!
//! | Module | Role |
//! |--------|------|
//! | [`floor`] | Per-facility floor list and the editor session on the active floor |
//! | [`layout`] | Dual-tier layout persistence |
//! | [`identity`] | Sentinel facility-id resolution |
//! | [`local`] | Local cache tier |
//! | [`remote`] | Remote `space_layouts` tier |

pub mod floor;
pub mod identity;
pub mod layout;
pub mod local;
pub mod remote;
