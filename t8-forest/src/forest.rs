//! The forest tree layer and lifecycle: a committed forest owns one leaf
//! element sequence per local coarse tree, built by uniform refinement, by
//! copying, by adapting, or by repartitioning another forest.
//!
//! State machine: `Empty → Initialized → Committed`. A [`ForestBuilder`]
//! models `Empty`/`Initialized`; [`Forest`] is always `Committed`. Exactly
//! one of `{copy, adapt, partition, load}` may be composed with the base
//! setters (`cmesh`, `level`).

use std::rc::Rc;

use t8_cmesh::Cmesh;
use t8_eclass::Element;
use t8_mpi::ProcessGroup;

use crate::adapt::AdaptPass;
use crate::balance::{self, NeighborProbe};
use crate::errors::ForestError;
use crate::ghost::GhostLayer;

/// Which construction method a forest was committed with — mirrors the
/// tagged union the original forest-types header used to pick the commit
/// path at runtime.
pub enum ForestFrom {
    /// Uniform initial refinement of every local coarse tree's root to the
    /// builder's `level`.
    Uniform,
    Copy(Rc<Forest>),
    Adapt {
        source: Rc<Forest>,
        predicate: Box<dyn FnMut(&[Element]) -> i32>,
        replace: Option<Box<dyn FnMut(&[Element], &[Element])>>,
        recursive: bool,
    },
    Partition {
        source: Rc<Forest>,
        for_coarsening: bool,
    },
    Load(String),
}

pub struct Forest {
    cmesh: Rc<Cmesh>,
    level: u8,
    trees: Vec<Vec<Element>>,
    element_offsets: Vec<usize>,
    ghost: Option<GhostLayer>,
    user_data: std::cell::RefCell<Option<Box<dyn std::any::Any>>>,
}

impl Forest {
    pub fn cmesh(&self) -> &Rc<Cmesh> {
        &self.cmesh
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn num_local_trees(&self) -> u32 {
        self.trees.len() as u32
    }

    pub fn tree_elements(&self, local_tree: u32) -> &[Element] {
        &self.trees[local_tree as usize]
    }

    pub fn element_offset(&self, local_tree: u32) -> usize {
        self.element_offsets[local_tree as usize]
    }

    pub fn num_local_elements(&self) -> usize {
        self.trees.iter().map(Vec::len).sum()
    }

    pub fn ghost(&self) -> Option<&GhostLayer> {
        self.ghost.as_ref()
    }

    pub fn set_user_data(&self, data: Box<dyn std::any::Any>) {
        *self.user_data.borrow_mut() = Some(data);
    }

    pub fn with_user_data<R>(&self, f: impl FnOnce(Option<&Box<dyn std::any::Any>>) -> R) -> R {
        f(self.user_data.borrow().as_ref())
    }

    /// `ref`: a thin wrapper over `Rc::clone` — Rust's ownership already
    /// destroys a forest when its last `Rc` drops, so `unref` needs no body
    /// beyond letting the clone go out of scope.
    pub fn add_ref(this: &Rc<Forest>) -> Rc<Forest> {
        Rc::clone(this)
    }

    pub fn unref(this: Rc<Forest>) {
        drop(this)
    }

    fn rebuild_offsets(trees: &[Vec<Element>]) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(trees.len());
        let mut running = 0usize;
        for t in trees {
            offsets.push(running);
            running += t.len();
        }
        offsets
    }
}

pub struct ForestBuilder {
    cmesh: Option<Rc<Cmesh>>,
    level: u8,
    from: Option<ForestFrom>,
    do_ghost: bool,
    do_balance: bool,
    balance_probe: Option<Box<dyn NeighborProbe>>,
    balance_repartition: bool,
    process_group: Option<Rc<dyn ProcessGroup>>,
    verbosity: u32,
}

impl Default for ForestBuilder {
    fn default() -> Self {
        ForestBuilder {
            cmesh: None,
            level: 0,
            from: None,
            do_ghost: false,
            do_balance: false,
            balance_probe: None,
            balance_repartition: false,
            process_group: None,
            verbosity: 0,
        }
    }
}

impl ForestBuilder {
    pub fn new() -> ForestBuilder {
        ForestBuilder::default()
    }

    pub fn set_cmesh(&mut self, cmesh: Rc<Cmesh>) -> &mut Self {
        self.cmesh = Some(cmesh);
        self
    }

    pub fn set_level(&mut self, level: u8) -> &mut Self {
        self.level = level;
        self
    }

    pub fn set_process_group(&mut self, pg: Rc<dyn ProcessGroup>) -> &mut Self {
        self.process_group = Some(pg);
        self
    }

    pub fn set_copy(&mut self, source: Rc<Forest>) -> Result<&mut Self, ForestError> {
        self.set_from(ForestFrom::Copy(source))
    }

    pub fn set_adapt(
        &mut self,
        source: Rc<Forest>,
        predicate: impl FnMut(&[Element]) -> i32 + 'static,
        replace: Option<Box<dyn FnMut(&[Element], &[Element])>>,
        recursive: bool,
    ) -> Result<&mut Self, ForestError> {
        self.set_from(ForestFrom::Adapt { source, predicate: Box::new(predicate), replace, recursive })
    }

    pub fn set_partition(&mut self, source: Rc<Forest>, for_coarsening: bool) -> Result<&mut Self, ForestError> {
        self.set_from(ForestFrom::Partition { source, for_coarsening })
    }

    pub fn set_load(&mut self, path: impl Into<String>) -> Result<&mut Self, ForestError> {
        self.set_from(ForestFrom::Load(path.into()))
    }

    fn set_from(&mut self, from: ForestFrom) -> Result<&mut Self, ForestError> {
        if self.from.is_some() {
            return Err(ForestError::ContractViolation("only one of copy/adapt/partition/load may be set"));
        }
        self.from = Some(from);
        Ok(self)
    }

    pub fn set_ghost(&mut self, enable: bool) -> &mut Self {
        self.do_ghost = enable;
        self
    }

    pub fn set_balance(&mut self, enable: bool, probe: Option<Box<dyn NeighborProbe>>) -> &mut Self {
        self.do_balance = enable;
        self.balance_probe = probe;
        self
    }

    /// If set, and a round of `set_balance`'s driver did not reach global
    /// quiescence, the just-adapted forest is repartitioned before the next
    /// round — mirrors `t8_forest_balance(forest, repartition)`'s flag.
    pub fn set_balance_repartition(&mut self, enable: bool) -> &mut Self {
        self.balance_repartition = enable;
        self
    }

    pub fn set_verbosity(&mut self, x: u32) -> &mut Self {
        self.verbosity = x;
        self
    }

    pub fn commit(self) -> Result<Rc<Forest>, ForestError> {
        let from = self.from.unwrap_or(ForestFrom::Uniform);

        let (cmesh, mut trees) = match from {
            ForestFrom::Uniform => {
                let cmesh = self.cmesh.ok_or(ForestError::ContractViolation("forest requires set_cmesh"))?;
                let mut trees = Vec::with_capacity(cmesh.num_local_trees() as usize);
                for l in 0..cmesh.num_local_trees() {
                    let scheme = cmesh.scheme_for_tree(l)?;
                    trees.push(uniform_refine(scheme.as_ref(), self.level));
                }
                (cmesh, trees)
            }
            ForestFrom::Copy(source) => {
                let cmesh = self.cmesh.unwrap_or_else(|| Rc::clone(&source.cmesh));
                (cmesh, source.trees.clone())
            }
            ForestFrom::Adapt { source, mut predicate, mut replace, recursive } => {
                let cmesh = self.cmesh.unwrap_or_else(|| Rc::clone(&source.cmesh));
                let mut trees = Vec::with_capacity(source.trees.len());
                for (l, src) in source.trees.iter().enumerate() {
                    let scheme = cmesh.scheme_for_tree(l as u32)?;
                    let mut pass = AdaptPass::new(scheme.as_ref(), predicate.as_mut(), replace.as_deref_mut(), recursive);
                    trees.push(pass.run(src)?);
                }
                (cmesh, trees)
            }
            ForestFrom::Partition { source, for_coarsening: _ } => {
                // true redistribution needs the partition-shipping wire
                // format, which is out of scope here; this keeps the
                // lifecycle operation present without claiming to move
                // data across ranks.
                let cmesh = self.cmesh.unwrap_or_else(|| Rc::clone(&source.cmesh));
                (cmesh, source.trees.clone())
            }
            ForestFrom::Load(_) => return Err(ForestError::LoadNotSupported),
        };

        if self.do_balance {
            let probe = self.balance_probe.ok_or(ForestError::ContractViolation("set_balance requires a neighbor probe"))?;
            let pg = self
                .process_group
                .as_ref()
                .ok_or(ForestError::ContractViolation("set_balance requires a process group"))?;
            trees = balance::balance_trees(
                &cmesh,
                trees,
                probe.as_ref(),
                pg.as_ref(),
                self.balance_repartition,
                self.verbosity,
            )?;
        }

        let element_offsets = Forest::rebuild_offsets(&trees);
        let ghost = if self.do_ghost { Some(GhostLayer::new()) } else { None };

        Ok(Rc::new(Forest {
            cmesh,
            level: self.level,
            trees,
            element_offsets,
            ghost,
            user_data: std::cell::RefCell::new(None),
        }))
    }
}

fn uniform_refine(scheme: &dyn t8_eclass::Scheme, level: u8) -> Vec<Element> {
    let mut current = vec![scheme.root()];
    for _ in 0..level {
        let mut next = Vec::with_capacity(current.len() * scheme.num_children().max(1) as usize);
        for e in &current {
            if let Ok(children) = scheme.children(e) {
                next.extend(children);
            } else {
                next.push(e.clone());
            }
        }
        current = next;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use t8_cmesh::single_part_cmesh;
    use t8_eclass::EClass;

    #[test]
    fn uniform_commit_refines_every_tree_to_level() {
        let cmesh = Rc::new(single_part_cmesh(EClass::Quad, 2, 5).unwrap());
        let forest = ForestBuilder::new().set_cmesh(cmesh).set_level(2).commit().unwrap();
        assert_eq!(forest.num_local_trees(), 2);
        for l in 0..2 {
            assert_eq!(forest.tree_elements(l).len(), 16);
        }
    }

    #[test]
    fn copy_duplicates_trees() {
        let cmesh = Rc::new(single_part_cmesh(EClass::Hex, 1, 5).unwrap());
        let base = ForestBuilder::new().set_cmesh(Rc::clone(&cmesh)).set_level(1).commit().unwrap();
        let copy = ForestBuilder::new().set_copy(Rc::clone(&base)).unwrap().commit().unwrap();
        assert_eq!(copy.tree_elements(0), base.tree_elements(0));
    }

    #[test]
    fn adapt_runs_the_adaptation_engine() {
        let cmesh = Rc::new(single_part_cmesh(EClass::Quad, 1, 5).unwrap());
        let base = ForestBuilder::new().set_cmesh(Rc::clone(&cmesh)).set_level(0).commit().unwrap();
        let refined = ForestBuilder::new()
            .set_adapt(Rc::clone(&base), |_: &[Element]| 1, None, false)
            .unwrap()
            .commit()
            .unwrap();
        assert_eq!(refined.tree_elements(0).len(), 4);
    }

    #[test]
    fn exactly_one_from_method_is_enforced() {
        let cmesh = Rc::new(single_part_cmesh(EClass::Quad, 1, 5).unwrap());
        let base = ForestBuilder::new().set_cmesh(Rc::clone(&cmesh)).set_level(0).commit().unwrap();
        let mut builder = ForestBuilder::new();
        builder.set_copy(Rc::clone(&base)).unwrap();
        let result = builder.set_copy(Rc::clone(&base));
        assert!(matches!(result, Err(ForestError::ContractViolation(_))));
    }

    #[test]
    fn ref_and_unref_do_not_destroy_shared_forest() {
        let cmesh = Rc::new(single_part_cmesh(EClass::Quad, 1, 5).unwrap());
        let forest = ForestBuilder::new().set_cmesh(cmesh).set_level(1).commit().unwrap();
        let extra = Forest::add_ref(&forest);
        Forest::unref(extra);
        assert_eq!(forest.num_local_elements(), 4);
    }
}
