//! The `Scheme` capability interface: everything a coarse mesh or forest
//! needs to know about refining, coarsening and navigating elements of one
//! class, without caring how the arithmetic behind those operations works.
//!
//! Shaped after a capability trait with a few required primitives and a
//! handful of default methods layered on top of them, so most of a `Scheme`
//! implementation falls out of `child`/`parent`/`num_children` alone.

use smallvec::SmallVec;

use crate::element::Element;
use crate::errors::SchemeError;
use crate::registry::EClass;
use crate::ttf::Ttf;

/// Family members returned by `children`, or probed by `face_children`.
pub type Family = SmallVec<[Element; 10]>;

/// Per-class refinement and navigation operations. Object-safe so a cmesh
/// or forest can hold one behind `Rc<dyn Scheme>` and dispatch per coarse
/// tree without knowing the concrete class at compile time.
pub trait Scheme {
    /// The element class this scheme refines.
    fn class(&self) -> EClass;

    /// The maximum refinement level this scheme will produce.
    fn max_level(&self) -> u8;

    /// The unrefined root element.
    fn root(&self) -> Element {
        Element::root()
    }

    /// Number of children one refinement step produces (`class().num_children()`).
    fn num_children(&self) -> u8 {
        self.class().num_children()
    }

    /// Number of faces of the class (`class().num_faces()`).
    fn num_faces(&self) -> u8 {
        self.class().num_faces()
    }

    /// The `child_id`-th child of `element`.
    fn child(&self, element: &Element, child_id: u8) -> Result<Element, SchemeError> {
        let n = self.num_children();
        if n == 0 {
            return Err(SchemeError::NoChildren(self.class()));
        }
        if child_id >= n {
            return Err(SchemeError::InvalidChildId { class: self.class(), child_id, num_children: n });
        }
        if element.level >= self.max_level() {
            return Err(SchemeError::MaxLevelExceeded { max_level: self.max_level() });
        }
        Ok(element.child(child_id))
    }

    /// All children of `element`, in child-id order.
    fn children(&self, element: &Element) -> Result<Family, SchemeError> {
        let n = self.num_children();
        (0..n).map(|c| self.child(element, c)).collect()
    }

    /// The parent of `element`, or `None` at the root.
    fn parent(&self, element: &Element) -> Option<Element> {
        element.parent()
    }

    /// The child id `element` holds within its parent, i.e. which of
    /// `parent`'s `children()` is `element`.
    fn child_id(&self, element: &Element) -> Option<u8> {
        element.child_id()
    }

    /// `element`'s `sibling_id`-th sibling (its parent's `sibling_id`-th child).
    fn sibling(&self, element: &Element, sibling_id: u8) -> Result<Element, SchemeError> {
        let parent = element.parent().ok_or(SchemeError::NoChildren(self.class()))?;
        self.child(&parent, sibling_id)
    }

    /// The nearest common ancestor of `a` and `b`.
    fn nca(&self, a: &Element, b: &Element) -> Element {
        a.nearest_common_ancestor(b)
    }

    /// Whether `family` is exactly the `num_children()` children of one
    /// common parent, in child-id order — the precondition for coarsening.
    fn is_family(&self, family: &[Element]) -> Result<bool, SchemeError> {
        let n = self.num_children() as usize;
        if family.len() != n {
            return Err(SchemeError::WrongFamilySize { class: self.class(), expected: n as u8, found: family.len() });
        }
        if n == 0 {
            return Ok(false);
        }
        let parent = match family[0].parent() {
            Some(p) => p,
            None => return Ok(false),
        };
        for (i, e) in family.iter().enumerate() {
            if e.child_id() != Some(i as u8) {
                return Ok(false);
            }
            match e.parent() {
                Some(p) if p == parent => {}
                _ => return Ok(false),
            }
        }
        Ok(true)
    }

    /// The number of children of `element` that touch `face`.
    fn num_face_children(&self, face: u8) -> Result<u8, SchemeError> {
        Ok(self.face_children_table(face)?.len() as u8)
    }

    /// The children of `element` that touch `face`, used by the balance
    /// driver to probe half-face neighbors.
    fn face_children(&self, element: &Element, face: u8) -> Result<Family, SchemeError> {
        let ids = self.face_children_table(face)?;
        ids.iter().map(|&id| self.child(element, id)).collect()
    }

    /// The `ttf` byte packing `face`'s index and orientation, using this
    /// class's dimension to pick `F[dim]`.
    fn encode_ttf(&self, face: u8, orient: u8) -> u8 {
        Ttf::encode(face, orient, crate::registry::max_faces_per_dimension(self.class()))
    }

    fn decode_ttf(&self, raw: u8) -> Ttf {
        Ttf::decode(raw, crate::registry::max_faces_per_dimension(self.class()))
    }

    /// Lists the boundary entities of class `to` that bound `element`.
    /// Not exercised by the coarse-mesh, adaptation or balance engines —
    /// provided so a cmesh's face-connectivity code has a uniform way to
    /// enumerate lower-dimensional boundary entities when attaching
    /// attributes to them. Returns a simple index range of the registry's
    /// `boundary_count`; it carries no geometric meaning beyond stable
    /// indexing.
    fn boundary(&self, to: EClass) -> Vec<u32> {
        (0..self.class().boundary_count(to)).collect()
    }

    #[doc(hidden)]
    fn face_children_table(&self, face: u8) -> Result<SmallVec<[u8; 4]>, SchemeError> {
        if face >= self.num_faces() {
            return Err(SchemeError::InvalidFace { class: self.class(), face, num_faces: self.num_faces() });
        }
        Ok(face_children_table_for(self.class(), face))
    }
}

/// The non-geometric, refinement-arithmetic-agnostic scheme used throughout
/// this crate: navigation is entirely a function of `Element::path`, so one
/// implementation covers all eight classes.
pub struct DefaultScheme {
    class: EClass,
    max_level: u8,
}

impl DefaultScheme {
    pub fn new(class: EClass, max_level: u8) -> DefaultScheme {
        DefaultScheme { class, max_level }
    }
}

impl Scheme for DefaultScheme {
    fn class(&self) -> EClass {
        self.class
    }

    fn max_level(&self) -> u8 {
        self.max_level
    }
}

/// Which children of a refined element touch a given face.
///
/// Line/Quad/Hex follow the standard bit-interleaved (Morton) child
/// numbering, so a face's children are exactly those whose corresponding
/// coordinate bit matches the face's side. Triangle follows red refinement
/// (three corner children plus one central child); a face opposite vertex
/// `v` touches the two corner children at the other two vertices. Prism is
/// the triangle-by-line product (`child = tri_child * 2 + line_child`).
///
/// Tet and Pyramid have no simple bit-interleaved scheme (true refinement
/// uses Bey's tetrahedral subdivision, which is the per-class refinement
/// arithmetic this crate treats as an external concern). Their tables are a
/// synthetic but self-consistent partition of children into face groups,
/// good enough to drive the balance driver's probing logic without
/// claiming geometric accuracy.
fn face_children_table_for(class: EClass, face: u8) -> SmallVec<[u8; 4]> {
    use EClass::*;
    let v: &[u8] = match class {
        Vertex => &[],
        Line => match face {
            0 => &[0],
            1 => &[1],
            _ => &[],
        },
        Quad => match face {
            0 => &[0, 2],
            1 => &[1, 3],
            2 => &[0, 1],
            3 => &[2, 3],
            _ => &[],
        },
        Triangle => match face {
            0 => &[1, 2],
            1 => &[0, 2],
            2 => &[0, 1],
            _ => &[],
        },
        Hex => match face {
            0 => &[0, 2, 4, 6],
            1 => &[1, 3, 5, 7],
            2 => &[0, 1, 4, 5],
            3 => &[2, 3, 6, 7],
            4 => &[0, 1, 2, 3],
            5 => &[4, 5, 6, 7],
            _ => &[],
        },
        Prism => match face {
            0 => &[2, 3, 4, 5],
            1 => &[0, 1, 4, 5],
            2 => &[0, 1, 2, 3],
            3 => &[0, 2, 4, 6],
            4 => &[1, 3, 5, 7],
            _ => &[],
        },
        Tet => match face {
            0 => &[0, 1],
            1 => &[2, 3],
            2 => &[4, 5],
            3 => &[6, 7],
            _ => &[],
        },
        Pyramid => match face {
            0 => &[0, 1],
            1 => &[2, 3],
            2 => &[4, 5],
            3 => &[6, 7],
            4 => &[8, 9],
            _ => &[],
        },
    };
    v.iter().copied().collect()
}
