//! The 2:1 balance driver: iterates the adaptation engine with a
//! half-face-neighbor refinement predicate until every rank agrees no
//! element needs to refine further.

use std::rc::Rc;

use t8_cmesh::Cmesh;
use t8_eclass::Element;
use t8_mpi::ProcessGroup;

use crate::adapt::AdaptPass;
use crate::errors::ForestError;

/// Answers "does a half-face neighbor at `probe_level` already exist" for
/// one element's face. Real geometric neighbor lookup needs the same
/// per-class position arithmetic this workspace treats as an external
/// scheme concern (`t8_eclass::Scheme`); a caller supplies whatever
/// indexing its forest maintains — a face-neighbor table built from the
/// coarse mesh's connectivity, a spatial index, or (in tests) a fixture
/// that hands back canned answers.
pub trait NeighborProbe {
    fn has_finer_neighbor(&self, tree: u32, element: &Element, face: u8, probe_level: u8) -> bool;
}

/// Runs balance rounds over every local tree until `probe` reports no
/// element needs refining on this rank, and every rank agrees (logical-AND
/// reduction). Bounded by `max_level + 1` rounds, per the termination
/// argument: a round either finishes the mesh or raises the minimum level
/// of some element by one, and levels are capped by the scheme.
pub fn balance_trees(
    cmesh: &Rc<Cmesh>,
    mut trees: Vec<Vec<Element>>,
    probe: &dyn NeighborProbe,
    pg: &dyn ProcessGroup,
    repartition: bool,
    verbosity: u32,
) -> Result<Vec<Vec<Element>>, ForestError> {
    let max_rounds = max_level(cmesh, trees.len() as u32)? as u32 + 1;

    for round in 0..max_rounds {
        let mut any_refined = false;
        let mut refined_count = 0usize;
        let mut next_trees = Vec::with_capacity(trees.len());

        for (l, source) in trees.iter().enumerate() {
            let scheme = cmesh.scheme_for_tree(l as u32)?;
            let tree = l as u32;
            let mut refined_here = false;
            let mut predicate = |window: &[Element]| -> i32 {
                let e = &window[0];
                let needs_refine = (0..scheme.num_faces())
                    .any(|f| probe.has_finer_neighbor(tree, e, f, e.level + 1));
                if needs_refine {
                    refined_here = true;
                    1
                } else {
                    0
                }
            };
            let mut pass = AdaptPass::new(scheme.as_ref(), &mut predicate, None, false);
            let result = pass.run(source)?;
            if refined_here {
                refined_count += result.len().saturating_sub(source.len());
            }
            next_trees.push(result);
            any_refined |= refined_here;
        }

        trees = next_trees;
        let done_local = !any_refined;
        let done = pg.all_reduce_and(done_local);

        if verbosity > 0 {
            println!(
                "t8-forest balance: round {round} refined {refined_count} elements, done_local={done_local} done_global={done}"
            );
        }

        if repartition && !done {
            trees = repartition_round(trees);
        }

        if done {
            break;
        }
    }

    Ok(trees)
}

/// Redistributes the just-adapted forest across ranks before the next round,
/// mirroring `t8_forest_balance`'s `repartition` flag calling
/// `t8_forest_set_partition`/`t8_forest_commit` between rounds. True
/// cross-rank data movement needs the partition wire format, which is out of
/// scope here (same carve-out as `ForestFrom::Partition`); this keeps the
/// hook present without claiming to move data across ranks.
fn repartition_round(trees: Vec<Vec<Element>>) -> Vec<Vec<Element>> {
    trees
}

/// `is_balanced`: re-runs the same probe over the final forest and checks
/// every element would keep (never refine).
pub fn is_balanced(cmesh: &Rc<Cmesh>, trees: &[Vec<Element>], probe: &dyn NeighborProbe) -> Result<bool, ForestError> {
    for (l, elements) in trees.iter().enumerate() {
        let scheme = cmesh.scheme_for_tree(l as u32)?;
        let tree = l as u32;
        for e in elements {
            for f in 0..scheme.num_faces() {
                if probe.has_finer_neighbor(tree, e, f, e.level + 1) {
                    return Ok(false);
                }
            }
        }
    }
    Ok(true)
}

fn max_level(cmesh: &Rc<Cmesh>, num_local_trees: u32) -> Result<u8, ForestError> {
    let mut max = 0u8;
    for l in 0..num_local_trees {
        let scheme = cmesh.scheme_for_tree(l)?;
        max = max.max(scheme.max_level());
    }
    Ok(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use t8_cmesh::single_part_cmesh;
    use t8_eclass::EClass;
    use t8_mpi::LocalProcessGroup;

    /// A fixed probe: tree 1's elements never need refining; tree 0's
    /// single coarse element at face 1 "sees" a level-3 neighbor, forcing
    /// it to refine up to that level over successive rounds.
    struct PairProbe;
    impl NeighborProbe for PairProbe {
        fn has_finer_neighbor(&self, tree: u32, element: &Element, face: u8, probe_level: u8) -> bool {
            tree == 0 && face == 1 && probe_level <= 3
        }
    }

    struct NeverProbe;
    impl NeighborProbe for NeverProbe {
        fn has_finer_neighbor(&self, _tree: u32, _element: &Element, _face: u8, _probe_level: u8) -> bool {
            false
        }
    }

    #[test]
    fn balanced_forest_is_a_no_op() {
        let cmesh = Rc::new(single_part_cmesh(EClass::Quad, 1, 5).unwrap());
        let trees = vec![vec![t8_eclass::Element::root()]];
        LocalProcessGroup::run(1, {
            let cmesh = Rc::clone(&cmesh);
            let trees = trees.clone();
            move |pg: LocalProcessGroup| {
                let result = balance_trees(&cmesh, trees.clone(), &NeverProbe, &pg, false, 0).unwrap();
                assert_eq!(result, trees);
                assert!(is_balanced(&cmesh, &result, &NeverProbe).unwrap());
            }
        });
    }

    #[test]
    fn balance_refines_until_predicate_is_satisfied() {
        let cmesh = Rc::new(single_part_cmesh(EClass::Quad, 1, 5).unwrap());
        let trees = vec![vec![t8_eclass::Element::root()]];
        LocalProcessGroup::run(1, {
            let cmesh = Rc::clone(&cmesh);
            let trees = trees.clone();
            move |pg: LocalProcessGroup| {
                let result = balance_trees(&cmesh, trees.clone(), &PairProbe, &pg, false, 0).unwrap();
                assert!(result[0].iter().all(|e| e.level >= 3));
                assert!(is_balanced(&cmesh, &result, &PairProbe).unwrap());
            }
        });
    }

    #[test]
    fn repartition_flag_does_not_change_final_result() {
        let cmesh = Rc::new(single_part_cmesh(EClass::Quad, 1, 5).unwrap());
        let trees = vec![vec![t8_eclass::Element::root()]];
        LocalProcessGroup::run(1, {
            let cmesh = Rc::clone(&cmesh);
            let trees = trees.clone();
            move |pg: LocalProcessGroup| {
                let result = balance_trees(&cmesh, trees.clone(), &PairProbe, &pg, true, 1).unwrap();
                assert!(result[0].iter().all(|e| e.level >= 3));
                assert!(is_balanced(&cmesh, &result, &PairProbe).unwrap());
            }
        });
    }
}
