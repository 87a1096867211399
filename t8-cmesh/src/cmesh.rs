//! The coarse mesh ("cmesh"): the committed, read-only view over `Trees`
//! that a forest is built on. Built with a chainable setter builder, the way
//! a cover tree's parameters are assembled before `build()` commits them.

use std::rc::Rc;

use t8_eclass::{EClass, SchemeSet};

use crate::errors::CmeshError;
use crate::face;
use crate::trees::{GhostView, TreeView, Trees};

/// A committed coarse mesh: the global tree/ghost layout plus the scheme
/// set used to interpret each tree's class.
pub struct Cmesh {
    trees: Rc<Trees>,
    schemes: Rc<SchemeSet>,
    num_global_trees: u32,
}

impl Cmesh {
    pub fn num_global_trees(&self) -> u32 {
        self.num_global_trees
    }

    pub fn num_local_trees(&self) -> u32 {
        self.trees.tree_to_proc.len() as u32
    }

    pub fn num_local_ghosts(&self) -> u32 {
        self.trees.ghost_to_proc.len() as u32
    }

    pub fn tree_owner(&self, local: u32) -> u32 {
        self.trees.tree_to_proc[local as usize]
    }

    pub fn ghost_owner(&self, local_ghost: u32) -> u32 {
        self.trees.ghost_to_proc[local_ghost as usize]
    }

    pub fn get_tree(&self, local: u32) -> Result<TreeView, CmeshError> {
        self.trees.get_tree(local)
    }

    pub fn get_ghost(&self, local_ghost: u32) -> Result<GhostView, CmeshError> {
        self.trees.get_ghost(local_ghost)
    }

    pub fn get_attribute(&self, local: u32, package_id: u32, key: u32) -> Result<Option<&[u8]>, CmeshError> {
        self.trees.get_attribute(local, package_id, key)
    }

    pub fn is_face_consistent(&self) -> Result<bool, CmeshError> {
        face::is_face_consistent(&self.trees)
    }

    pub fn trees(&self) -> &Rc<Trees> {
        &self.trees
    }

    pub fn schemes(&self) -> &Rc<SchemeSet> {
        &self.schemes
    }

    /// Looks up the class of tree `local` and resolves it against the
    /// scheme set; the contract-violation error a forest hits if asked to
    /// refine a class with no registered scheme.
    pub fn scheme_for_tree(&self, local: u32) -> Result<&Rc<dyn t8_eclass::Scheme>, CmeshError> {
        let class = self.get_tree(local)?.class;
        self.schemes
            .get(class)
            .ok_or(CmeshError::ContractViolation("no scheme registered for tree's class"))
    }
}

/// Assembles a [`Cmesh`] from an already-built, already-committed [`Trees`].
/// Mirrors the chainable-setter-then-`build()` shape used throughout this
/// workspace's configuration layers.
pub struct CmeshBuilder {
    trees: Option<Trees>,
    schemes: Option<SchemeSet>,
    num_global_trees: Option<u32>,
    verbosity: u32,
}

impl Default for CmeshBuilder {
    fn default() -> Self {
        CmeshBuilder { trees: None, schemes: None, num_global_trees: None, verbosity: 0 }
    }
}

impl CmeshBuilder {
    pub fn new() -> CmeshBuilder {
        CmeshBuilder::default()
    }

    pub fn set_trees(&mut self, trees: Trees) -> &mut Self {
        self.trees = Some(trees);
        self
    }

    pub fn set_schemes(&mut self, schemes: SchemeSet) -> &mut Self {
        self.schemes = Some(schemes);
        self
    }

    pub fn set_num_global_trees(&mut self, n: u32) -> &mut Self {
        self.num_global_trees = Some(n);
        self
    }

    pub fn set_verbosity(&mut self, x: u32) -> &mut Self {
        self.verbosity = x;
        self
    }

    /// Every part referenced by `trees` must already be finished (`Part::finish`
    /// called) — a contract violation otherwise.
    pub fn commit(self) -> Result<Cmesh, CmeshError> {
        let trees = self.trees.ok_or(CmeshError::ContractViolation("cmesh requires set_trees"))?;
        let schemes = self.schemes.ok_or(CmeshError::ContractViolation("cmesh requires set_schemes"))?;
        let num_global_trees = self
            .num_global_trees
            .ok_or(CmeshError::ContractViolation("cmesh requires set_num_global_trees"))?;
        for part in &trees.parts {
            if !part.is_finished() {
                return Err(CmeshError::ContractViolation("commit requires every part to be finished"));
            }
        }
        if self.verbosity > 0 {
            println!(
                "t8-cmesh: committed {} global trees ({} local, {} local ghosts)",
                num_global_trees,
                trees.tree_to_proc.len(),
                trees.ghost_to_proc.len()
            );
        }
        Ok(Cmesh { trees: Rc::new(trees), schemes: Rc::new(schemes), num_global_trees })
    }
}

/// Convenience for the common single-process test topology: every tree is
/// `class`, owned by rank 0, with no ghosts and all-boundary faces.
pub fn single_part_cmesh(class: EClass, num_trees: u32, max_level: u8) -> Result<Cmesh, CmeshError> {
    let mut trees = Trees::init(1, num_trees, 0);
    trees.start_part(0, 0, num_trees, 0, 0);
    {
        let part = &mut trees.parts[0];
        for l in 0..num_trees {
            part.add_tree(l, class)?;
        }
        part.finish()?;
    }
    face::set_all_boundary(&mut trees)?;

    CmeshBuilder::new()
        .set_trees(trees)
        .set_schemes(SchemeSet::default_for_all(max_level))
        .set_num_global_trees(num_trees)
        .commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_tree_boundary_cmesh_is_consistent() {
        let cmesh = single_part_cmesh(EClass::Quad, 2, 5).unwrap();
        assert!(cmesh.is_face_consistent().unwrap());
        assert_eq!(cmesh.num_local_trees(), 2);
        assert_eq!(cmesh.num_global_trees(), 2);
    }

    #[test]
    fn commit_requires_finished_parts() {
        let mut trees = Trees::init(1, 1, 0);
        trees.start_part(0, 0, 1, 0, 0);
        trees.parts[0].add_tree(0, EClass::Quad).unwrap();
        // note: no finish() call

        let result = CmeshBuilder::new()
            .set_trees(trees)
            .set_schemes(SchemeSet::default_for_all(5))
            .set_num_global_trees(1)
            .commit();
        assert!(matches!(result, Err(CmeshError::ContractViolation(_))));
    }

    #[test]
    fn scheme_lookup_resolves_by_tree_class() {
        let cmesh = single_part_cmesh(EClass::Hex, 1, 5).unwrap();
        let scheme = cmesh.scheme_for_tree(0).unwrap();
        assert_eq!(scheme.class(), EClass::Hex);
    }
}
