//! Element-class registry and per-class refinement scheme for a forest of
//! connected element-trees.
//!
//! This crate knows nothing about parallelism, storage layout or face
//! connectivity between trees — it only answers "given an element of class
//! `C`, what are its children/parent/faces". `t8-cmesh` and `t8-forest`
//! build the distributed mesh on top of the [`Scheme`] contract defined
//! here.

pub mod element;
pub mod errors;
pub mod registry;
pub mod scheme;
pub mod scheme_set;
pub mod ttf;

pub use element::{Element, Path};
pub use errors::SchemeError;
pub use registry::{EClass, ALL_CLASSES, N_CLASS};
pub use scheme::{DefaultScheme, Family, Scheme};
pub use scheme_set::SchemeSet;
pub use ttf::Ttf;
