//! The adaptation engine: given a source per-tree element sequence, a user
//! predicate and an optional replace callback, produces the target
//! sequence — refining, coarsening or keeping each element.

use t8_eclass::{Element, Scheme};

use crate::errors::ForestError;

/// `refine_decision`/`coarsen_decision` contract: called with a family in
/// child-id order (`< 0` coarsen, `> 0` refine the head, `0` keep) or a
/// single element (`> 0` refine, else keep — coarsening a lone element is
/// not a legal answer and is simply never offered).
pub type Predicate<'a> = dyn FnMut(&[Element]) -> i32 + 'a;

/// Called whenever a refinement (1→C) or coarsening (C→1) happens:
/// `replace(produced, consumed)`.
pub type Replace<'a> = dyn FnMut(&[Element], &[Element]) + 'a;

pub struct AdaptPass<'a> {
    scheme: &'a dyn Scheme,
    predicate: &'a mut Predicate<'a>,
    replace: Option<&'a mut Replace<'a>>,
    recursive: bool,
}

impl<'a> AdaptPass<'a> {
    pub fn new(
        scheme: &'a dyn Scheme,
        predicate: &'a mut Predicate<'a>,
        replace: Option<&'a mut Replace<'a>>,
        recursive: bool,
    ) -> AdaptPass<'a> {
        AdaptPass { scheme, predicate, replace, recursive }
    }

    /// Runs one pass over a single coarse tree's element sequence.
    pub fn run(&mut self, source: &[Element]) -> Result<Vec<Element>, ForestError> {
        let c = self.scheme.num_children() as usize;
        let mut target: Vec<Element> = Vec::with_capacity(source.len());
        let mut i = 0usize;
        let mut coarsen_watermark = 0usize;

        while i < source.len() {
            let remaining = source.len() - i;
            let is_family = c > 0 && remaining >= c && self.scheme.is_family(&source[i..i + c])?;

            if is_family {
                let verdict = (self.predicate)(&source[i..i + c]);
                if verdict < 0 {
                    let parent = self
                        .scheme
                        .parent(&source[i])
                        .ok_or(ForestError::ContractViolation("coarsen requested at the root"))?;
                    if let Some(cb) = self.replace.as_deref_mut() {
                        cb(std::slice::from_ref(&parent), &source[i..i + c]);
                    }
                    target.push(parent);
                    i += c;
                } else if verdict > 0 {
                    let head = source[i].clone();
                    coarsen_watermark = target.len() + c;
                    self.refine_recursive(&head, &mut target)?;
                    i += 1;
                } else {
                    target.push(source[i].clone());
                    i += 1;
                }
            } else {
                let verdict = (self.predicate)(std::slice::from_ref(&source[i]));
                if verdict > 0 {
                    let head = source[i].clone();
                    coarsen_watermark = target.len() + c;
                    self.refine_recursive(&head, &mut target)?;
                    i += 1;
                } else {
                    target.push(source[i].clone());
                    i += 1;
                }
            }

            if self.recursive {
                self.try_coarsen_tail(&mut target, coarsen_watermark)?;
            }
        }

        Ok(target)
    }

    fn refine_recursive(&mut self, elem: &Element, target: &mut Vec<Element>) -> Result<(), ForestError> {
        let children = self.scheme.children(elem)?;
        if let Some(cb) = self.replace.as_deref_mut() {
            cb(&children, std::slice::from_ref(elem));
        }
        if !self.recursive {
            target.extend(children);
            return Ok(());
        }
        let mut stack: Vec<Element> = children.into_iter().rev().collect();
        while let Some(e) = stack.pop() {
            let verdict = (self.predicate)(std::slice::from_ref(&e));
            if verdict > 0 {
                let kids = self.scheme.children(&e)?;
                if let Some(cb) = self.replace.as_deref_mut() {
                    cb(&kids, std::slice::from_ref(&e));
                }
                for k in kids.into_iter().rev() {
                    stack.push(k);
                }
            } else {
                target.push(e);
            }
        }
        Ok(())
    }

    fn try_coarsen_tail(&mut self, target: &mut Vec<Element>, watermark: usize) -> Result<(), ForestError> {
        let c = self.scheme.num_children() as usize;
        if c == 0 {
            return Ok(());
        }
        loop {
            if target.len() < c || target.len() - c < watermark {
                return Ok(());
            }
            let tail_start = target.len() - c;
            if target[target.len() - 1].child_id() != Some(c as u8 - 1) {
                return Ok(());
            }
            if !self.scheme.is_family(&target[tail_start..])? {
                return Ok(());
            }
            let verdict = (self.predicate)(&target[tail_start..]);
            if verdict < 0 {
                let parent = self
                    .scheme
                    .parent(&target[tail_start])
                    .ok_or(ForestError::ContractViolation("coarsen requested at the root"))?;
                let removed = target.split_off(tail_start);
                if let Some(cb) = self.replace.as_deref_mut() {
                    cb(std::slice::from_ref(&parent), &removed);
                }
                target.push(parent);
            } else {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use t8_eclass::{DefaultScheme, EClass};

    fn uniform(scheme: &dyn Scheme, level: u8) -> Vec<Element> {
        let mut cur = vec![scheme.root()];
        for _ in 0..level {
            let mut next = Vec::new();
            for e in &cur {
                next.extend(scheme.children(e).unwrap());
            }
            cur = next;
        }
        cur
    }

    #[test]
    fn always_refine_then_always_coarsen_round_trips() {
        let scheme = DefaultScheme::new(EClass::Hex, 5);
        let source = vec![scheme.root()];

        let mut refine_all = |_: &[Element]| 1;
        let refined = AdaptPass::new(&scheme, &mut refine_all, None, false).run(&source).unwrap();
        assert_eq!(refined.len(), 8);
        assert_eq!(refined, scheme.children(&scheme.root()).unwrap().into_vec());

        let mut coarsen_all = |family: &[Element]| if family.len() == 8 { -1 } else { 0 };
        let coarsened = AdaptPass::new(&scheme, &mut coarsen_all, None, false).run(&refined).unwrap();
        assert_eq!(coarsened, source);
    }

    #[test]
    fn keep_leaves_sequence_untouched() {
        let scheme = DefaultScheme::new(EClass::Quad, 5);
        let source = uniform(&scheme, 2);
        let mut keep_all = |_: &[Element]| 0;
        let result = AdaptPass::new(&scheme, &mut keep_all, None, false).run(&source).unwrap();
        assert_eq!(result, source);
    }

    #[test]
    fn element_count_conserved_by_refine_coarsen_arithmetic() {
        let scheme = DefaultScheme::new(EClass::Quad, 5);
        let source = uniform(&scheme, 2);
        let n = source.len();
        let c = scheme.num_children() as usize;

        // refine exactly the first leaf, leave the rest
        let mut first_only = {
            let mut seen = false;
            move |w: &[Element]| {
                if w.len() == 1 && !seen {
                    seen = true;
                    1
                } else {
                    0
                }
            }
        };
        let result = AdaptPass::new(&scheme, &mut first_only, None, false).run(&source).unwrap();
        assert_eq!(result.len(), n + (c - 1));
    }

    #[test]
    fn recursive_refine_reaches_requested_depth() {
        let scheme = DefaultScheme::new(EClass::Line, 5);
        let source = vec![scheme.root()];
        let mut refine_to_level_3 = |w: &[Element]| if w[0].level < 3 { 1 } else { 0 };
        let result = AdaptPass::new(&scheme, &mut refine_to_level_3, None, true).run(&source).unwrap();
        assert_eq!(result.len(), 8);
        assert!(result.iter().all(|e| e.level == 3));
    }

    #[test]
    fn nested_recursive_refine_then_adjacent_coarsen_uses_pre_cascade_watermark() {
        let scheme = DefaultScheme::new(EClass::Quad, 5);
        let root = scheme.root();
        let filler = root.child(0).child(0);
        let mut source = vec![filler; 10];
        source.push(root.clone());

        // c0, c1 keep; c2 and c3 each refine one level deeper. The cascade's
        // own tail (c3's children) only becomes eligible to coarsen back
        // once the watermark computed *before* the cascade started — not
        // the inflated length left behind by also refining c2 — is passed.
        let mut predicate = |w: &[Element]| -> i32 {
            if w.len() == 1 {
                let e = &w[0];
                if e.is_root() {
                    return 1;
                }
                if e.level == 1 && (e.child_id() == Some(2) || e.child_id() == Some(3)) {
                    return 1;
                }
                0
            } else {
                match scheme.parent(&w[0]) {
                    Some(parent) if parent.level == 1 && parent.child_id() == Some(3) => -1,
                    _ => 0,
                }
            }
        };

        let result = AdaptPass::new(&scheme, &mut predicate, None, true).run(&source).unwrap();

        // 10 filler + c0 + c1 + c2's 4 children + c3 restored from its
        // refined-then-coarsened children.
        assert_eq!(result.len(), 10 + 2 + 4 + 1);
        let c3 = scheme.child(&root, 3).unwrap();
        assert_eq!(result.last(), Some(&c3));
    }

    #[test]
    fn replace_callback_fires_on_refine() {
        let scheme = DefaultScheme::new(EClass::Quad, 5);
        let source = vec![scheme.root()];
        let mut refine_once = |w: &[Element]| if w.len() == 1 && w[0].level == 0 { 1 } else { 0 };
        let mut calls = Vec::new();
        {
            let mut replace = |produced: &[Element], consumed: &[Element]| {
                calls.push((produced.len(), consumed.len()));
            };
            AdaptPass::new(&scheme, &mut refine_once, Some(&mut replace), false).run(&source).unwrap();
        }
        assert_eq!(calls, vec![(4, 1)]);
    }
}
