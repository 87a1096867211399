//! Constant tables keyed by element class: dimension, vertex/face/children
//! counts, the face-to-face-class map and the boundary-count matrix.
//!
//! Values are read off `t8_eclass.c`'s `t8_eclass_to_dimension`,
//! `t8_eclass_num_faces`, `t8_eclass_num_vertices`, `t8_eclass_num_children`,
//! `t8_eclass_face_types` and `t8_eclass_boundary_count` tables.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The eight element classes a coarse tree (or one of its descendants) can
/// take. Order matches the source's `T8_ECLASS_*` enumeration, which the
/// registry tables below are indexed by.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EClass {
    Vertex = 0,
    Line = 1,
    Quad = 2,
    Triangle = 3,
    Hex = 4,
    Tet = 5,
    Prism = 6,
    Pyramid = 7,
}

/// Number of element classes, `N_CLASS` in `spec.md` §6.
pub const N_CLASS: usize = 8;

pub const ALL_CLASSES: [EClass; N_CLASS] = [
    EClass::Vertex,
    EClass::Line,
    EClass::Quad,
    EClass::Triangle,
    EClass::Hex,
    EClass::Tet,
    EClass::Prism,
    EClass::Pyramid,
];

impl EClass {
    #[inline]
    pub fn index(self) -> usize {
        self as u8 as usize
    }

    pub fn from_index(i: usize) -> Option<EClass> {
        ALL_CLASSES.get(i).copied()
    }

    /// Spatial dimension of the class.
    #[inline]
    pub fn dim(self) -> u8 {
        DIM[self.index()]
    }

    /// Number of vertices of the reference element.
    #[inline]
    pub fn num_vertices(self) -> u8 {
        NUM_VERTICES[self.index()]
    }

    /// Number of faces (codimension-1 boundary facets) of the class.
    #[inline]
    pub fn num_faces(self) -> u8 {
        NUM_FACES[self.index()]
    }

    /// Number of children produced by one uniform refinement step.
    /// Zero for `Vertex`: a 0-dimensional element is always a leaf.
    #[inline]
    pub fn num_children(self) -> u8 {
        NUM_CHILDREN[self.index()]
    }

    /// The class of the `face`-th face of `self`.
    pub fn face_class(self, face: u8) -> Option<EClass> {
        FACE_TYPES[self.index()]
            .get(face as usize)
            .copied()
            .flatten()
    }

    /// Number of boundary entities of class `to` on the boundary of `self`.
    pub fn boundary_count(self, to: EClass) -> u32 {
        BOUNDARY_COUNT[self.index()][to.index()]
    }
}

impl fmt::Display for EClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EClass::Vertex => "vertex",
            EClass::Line => "line",
            EClass::Quad => "quad",
            EClass::Triangle => "triangle",
            EClass::Hex => "hex",
            EClass::Tet => "tet",
            EClass::Prism => "prism",
            EClass::Pyramid => "pyramid",
        };
        write!(f, "{name}")
    }
}

const DIM: [u8; N_CLASS] = [0, 1, 2, 2, 3, 3, 3, 3];
const NUM_FACES: [u8; N_CLASS] = [0, 2, 4, 3, 6, 4, 5, 5];
const NUM_VERTICES: [u8; N_CLASS] = [1, 2, 4, 3, 8, 4, 6, 5];
const NUM_CHILDREN: [u8; N_CLASS] = [0, 2, 4, 4, 8, 8, 8, 10];

/// `t8_eclass_face_types`: the class of each face, `None` past `num_faces`.
const FACE_TYPES: [[Option<EClass>; 6]; N_CLASS] = {
    const V: Option<EClass> = Some(EClass::Vertex);
    const L: Option<EClass> = Some(EClass::Line);
    const Q: Option<EClass> = Some(EClass::Quad);
    const T: Option<EClass> = Some(EClass::Triangle);
    const N: Option<EClass> = None;
    [
        [N, N, N, N, N, N],
        [V, V, N, N, N, N],
        [L, L, L, L, N, N],
        [L, L, L, N, N, N],
        [Q, Q, Q, Q, Q, Q],
        [T, T, T, T, N, N],
        [Q, Q, Q, T, T, N],
        [T, T, T, T, Q, N],
    ]
};

/// `t8_eclass_boundary_count[from][to]`.
const BOUNDARY_COUNT: [[u32; N_CLASS]; N_CLASS] = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [2, 0, 0, 0, 0, 0, 0, 0],
    [4, 4, 0, 0, 0, 0, 0, 0],
    [3, 3, 0, 0, 0, 0, 0, 0],
    [8, 12, 6, 0, 0, 0, 0, 0],
    [4, 6, 0, 4, 0, 0, 0, 0],
    [6, 9, 3, 2, 0, 0, 0, 0],
    [5, 8, 1, 4, 0, 0, 0, 0],
];

/// Max faces among all classes sharing dimension `dim`; the *ttf* encoding
/// (`spec.md` §3.4) uses `F[dim]` so `face_index < F[dim]` round-trips
/// unambiguously regardless of which class is on either side of the face.
pub const MAX_FACES_PER_DIM: [u8; 4] = [1, 2, 4, 6];

/// Looks up `F[dim]` for the dimension of `class`.
pub fn max_faces_per_dimension(class: EClass) -> u8 {
    MAX_FACES_PER_DIM[class.dim() as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dims_match_classes() {
        assert_eq!(EClass::Vertex.dim(), 0);
        assert_eq!(EClass::Hex.dim(), 3);
        assert_eq!(EClass::Pyramid.dim(), 3);
    }

    #[test]
    fn vertex_has_no_children() {
        println!("a 0-dimensional element can never be refined");
        assert_eq!(EClass::Vertex.num_children(), 0);
    }

    #[test]
    fn hex_faces_are_quads() {
        for f in 0..EClass::Hex.num_faces() {
            assert_eq!(EClass::Hex.face_class(f), Some(EClass::Quad));
        }
        assert_eq!(EClass::Hex.face_class(EClass::Hex.num_faces()), None);
    }

    #[test]
    fn prism_faces_mix_quad_and_triangle() {
        let faces: Vec<_> = (0..EClass::Prism.num_faces())
            .map(|f| EClass::Prism.face_class(f))
            .collect();
        assert_eq!(
            faces,
            vec![
                Some(EClass::Quad),
                Some(EClass::Quad),
                Some(EClass::Quad),
                Some(EClass::Triangle),
                Some(EClass::Triangle),
            ]
        );
    }

    #[test]
    fn boundary_count_hex() {
        assert_eq!(EClass::Hex.boundary_count(EClass::Vertex), 8);
        assert_eq!(EClass::Hex.boundary_count(EClass::Line), 12);
        assert_eq!(EClass::Hex.boundary_count(EClass::Quad), 6);
        assert_eq!(EClass::Hex.boundary_count(EClass::Hex), 0);
    }

    #[test]
    fn max_faces_per_dim_covers_every_class() {
        for class in ALL_CLASSES {
            assert!(class.num_faces() as usize <= MAX_FACES_PER_DIM[class.dim() as usize] as usize);
        }
    }
}
