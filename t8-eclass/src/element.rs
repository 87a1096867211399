//! The element representation shared by every class: a root-to-element path
//! of child ids. Kept concrete (not a per-class associated type) so `Scheme`
//! stays object-safe — callers hold `Rc<dyn Scheme>` against a single
//! `Element` type rather than monomorphizing per class.

use smallvec::SmallVec;

/// Most refinement hierarchies this crate targets stay well under 24 levels
/// deep before `path` would need to spill to the heap.
pub type Path = SmallVec<[u8; 24]>;

/// A mesh element identified by its depth and the sequence of child ids
/// chosen at each refinement level from the coarse tree's root element.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Element {
    pub level: u8,
    pub path: Path,
}

impl Element {
    /// The unrefined root element of a coarse tree.
    pub fn root() -> Element {
        Element {
            level: 0,
            path: Path::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.level == 0
    }

    /// The child-id chosen to reach `self` from its immediate parent, or
    /// `None` at the root.
    pub fn child_id(&self) -> Option<u8> {
        self.path.last().copied()
    }

    fn child_of(&self, child_id: u8) -> Element {
        let mut path = self.path.clone();
        path.push(child_id);
        Element {
            level: self.level + 1,
            path,
        }
    }

    fn parent_of(&self) -> Option<Element> {
        if self.is_root() {
            return None;
        }
        let mut path = self.path.clone();
        path.pop();
        Some(Element {
            level: self.level - 1,
            path,
        })
    }

    pub(crate) fn child(&self, child_id: u8) -> Element {
        self.child_of(child_id)
    }

    pub(crate) fn parent(&self) -> Option<Element> {
        self.parent_of()
    }

    /// The nearest common ancestor of `self` and `other`, i.e. the longest
    /// shared path prefix.
    pub fn nearest_common_ancestor(&self, other: &Element) -> Element {
        let shared = self
            .path
            .iter()
            .zip(other.path.iter())
            .take_while(|(a, b)| a == b)
            .count();
        Element {
            level: shared as u8,
            path: self.path[..shared].iter().copied().collect(),
        }
    }

    /// Whether `self` is an ancestor of (or equal to) `other`.
    pub fn is_ancestor_of(&self, other: &Element) -> bool {
        self.level as usize <= other.path.len() && self.path[..] == other.path[..self.path.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_has_no_parent_and_no_child_id() {
        let root = Element::root();
        assert!(root.parent().is_none());
        assert_eq!(root.child_id(), None);
    }

    #[test]
    fn child_then_parent_round_trips() {
        let root = Element::root();
        let c = root.child(3);
        assert_eq!(c.level, 1);
        assert_eq!(c.child_id(), Some(3));
        assert_eq!(c.parent().unwrap(), root);
    }

    #[test]
    fn nca_finds_shared_prefix() {
        let root = Element::root();
        let a = root.child(0).child(1).child(2);
        let b = root.child(0).child(1).child(3);
        let nca = a.nearest_common_ancestor(&b);
        assert_eq!(nca, root.child(0).child(1));
        assert!(nca.is_ancestor_of(&a));
        assert!(nca.is_ancestor_of(&b));
    }
}
