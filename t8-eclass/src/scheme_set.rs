//! A `SchemeSet` aggregates one [`Scheme`] per element class, the way a
//! coarse mesh spanning several classes (e.g. hexes and tets in one forest)
//! needs to dispatch by a tree's class rather than committing to one class
//! at compile time.

use std::rc::Rc;

use crate::registry::{EClass, N_CLASS};
use crate::scheme::{DefaultScheme, Scheme};

pub struct SchemeSet {
    by_class: [Option<Rc<dyn Scheme>>; N_CLASS],
}

impl SchemeSet {
    pub fn empty() -> SchemeSet {
        SchemeSet { by_class: Default::default() }
    }

    /// A set with `DefaultScheme::new(class, max_level)` registered for
    /// every class — the common case when no class needs a specialized
    /// scheme.
    pub fn default_for_all(max_level: u8) -> SchemeSet {
        let mut set = SchemeSet::empty();
        for class in crate::registry::ALL_CLASSES {
            set.set(class, Rc::new(DefaultScheme::new(class, max_level)));
        }
        set
    }

    pub fn set(&mut self, class: EClass, scheme: Rc<dyn Scheme>) {
        self.by_class[class.index()] = Some(scheme);
    }

    pub fn get(&self, class: EClass) -> Option<&Rc<dyn Scheme>> {
        self.by_class[class.index()].as_ref()
    }
}

impl Default for SchemeSet {
    fn default() -> Self {
        SchemeSet::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_for_all_covers_every_class() {
        let set = SchemeSet::default_for_all(5);
        for class in crate::registry::ALL_CLASSES {
            assert_eq!(set.get(class).unwrap().class(), class);
        }
    }

    #[test]
    fn empty_set_has_no_schemes() {
        let set = SchemeSet::empty();
        assert!(set.get(EClass::Hex).is_none());
    }
}
