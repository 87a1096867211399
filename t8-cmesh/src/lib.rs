//! Byte-packed coarse-mesh storage and face-connectivity engine.
//!
//! `trees` is the per-owner packed arena (§4.1 of the design); `face` is the
//! symmetric face relation built on top of it (§4.2); `cmesh` is the
//! committed, read-only view a forest is built against.

pub mod cmesh;
pub mod errors;
pub mod face;
pub mod layout;
pub mod trees;

pub use cmesh::{single_part_cmesh, Cmesh, CmeshBuilder};
pub use errors::CmeshError;
pub use face::{is_face_consistent, set_all_boundary};
pub use trees::{GhostFace, GhostView, Part, Trees, TreeFace, TreeView};
