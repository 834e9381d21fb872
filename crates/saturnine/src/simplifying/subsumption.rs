//! Subsumption and subsumption resolution
//!
//! A clause C subsumes D iff some substitution σ maps the literals of C
//! injectively onto a sub-multiset of D. The matcher backtracks over
//! literal alignments under one accumulated substitution; a cheap
//! length-and-header prefilter rejects most candidate pairs first.
//! Subsumption resolution removes one literal of D when C matches into
//! D with exactly one literal flipped onto its complement.
//!
//! Only unconditional clauses (⊥ propositional part, no splits) may
//! delete or cut other clauses.

use crate::fol::{Clause, LiteralId, TermStore};
use crate::inference::Rule;
use crate::saturation::state::{
    DeletionReason, RuleContext, SaturationIndices, SaturationState, Simplification,
    SimplifyingRule,
};
use crate::unification::Matcher;

/// Does `subsumer` subsume `target` (multiset semantics)?
pub fn subsumes(store: &TermStore, subsumer: &[LiteralId], target: &[LiteralId]) -> bool {
    if subsumer.len() > target.len() {
        return false;
    }
    let mut matcher = Matcher::new();
    let mut used = vec![false; target.len()];
    match_rest(store, subsumer, target, 0, &mut used, &mut matcher, None).is_some()
}

/// Try subsumption resolution: find a literal of `target` that can be
/// cut because `subsumer` matches into `target` with exactly one literal
/// landing on that literal's complement. Returns the index of the cut
/// literal.
pub fn subsumption_resolution(
    store: &TermStore,
    subsumer: &[LiteralId],
    target: &[LiteralId],
) -> Option<usize> {
    if subsumer.len() > target.len() {
        return None;
    }
    let mut matcher = Matcher::new();
    let mut used = vec![false; target.len()];
    match_rest(
        store,
        subsumer,
        target,
        0,
        &mut used,
        &mut matcher,
        Some(CutState::Unused),
    )
}

/// Tracks whether the single complement match of subsumption resolution
/// has been spent yet.
#[derive(Clone, Copy, PartialEq, Eq)]
enum CutState {
    Unused,
    UsedAt(usize),
}

/// Backtracking alignment of `subsumer[i..]` into unused target
/// literals. With `cut` set, exactly one subsumer literal must match the
/// complement of its target; the function returns that target's index.
/// Without it, the function returns `usize::MAX` on plain success.
fn match_rest(
    store: &TermStore,
    subsumer: &[LiteralId],
    target: &[LiteralId],
    i: usize,
    used: &mut [bool],
    matcher: &mut Matcher,
    cut: Option<CutState>,
) -> Option<usize> {
    if i == subsumer.len() {
        return match cut {
            None => Some(usize::MAX),
            Some(CutState::UsedAt(idx)) => Some(idx),
            Some(CutState::Unused) => None,
        };
    }
    let lit = subsumer[i];
    for (j, &cand) in target.iter().enumerate() {
        if used[j] {
            continue;
        }
        // Straight match
        if store.header(lit) == store.header(cand) {
            let mark = matcher.checkpoint();
            if matcher.match_literal(store, lit, cand) {
                used[j] = true;
                if let Some(hit) = match_rest(store, subsumer, target, i + 1, used, matcher, cut) {
                    return Some(hit);
                }
                used[j] = false;
            }
            matcher.rollback_to(mark);
        }
        // Complement match, once, for subsumption resolution
        if cut == Some(CutState::Unused) && store.header(lit) == store.complementary_header(cand) {
            let mark = matcher.checkpoint();
            if match_complement(store, matcher, lit, cand) {
                used[j] = true;
                if let Some(hit) = match_rest(
                    store,
                    subsumer,
                    target,
                    i + 1,
                    used,
                    matcher,
                    Some(CutState::UsedAt(j)),
                ) {
                    return Some(hit);
                }
                used[j] = false;
            }
            matcher.rollback_to(mark);
        }
    }
    None
}

/// Match the arguments of `lit` onto those of `cand` (their headers are
/// already known to be complementary).
fn match_complement(
    store: &TermStore,
    matcher: &mut Matcher,
    lit: LiteralId,
    cand: LiteralId,
) -> bool {
    let a = store.lit(lit);
    let b = store.lit(cand);
    debug_assert_eq!(a.predicate, b.predicate);
    let mark = matcher.checkpoint();
    for (&pa, &ta) in a.args.iter().zip(b.args.iter()) {
        if !matcher.match_term(store, pa, ta) {
            matcher.rollback_to(mark);
            return false;
        }
    }
    true
}

/// May this clause act as a subsumer / resolver?
fn is_unconditional(clause: &Clause) -> bool {
    clause.prop == crate::prop::NodeId::FALSE && clause.splits.is_empty()
}

pub struct SubsumptionRule;

impl SubsumptionRule {
    pub fn new() -> Self {
        SubsumptionRule
    }
}

impl Default for SubsumptionRule {
    fn default() -> Self {
        Self::new()
    }
}

impl SimplifyingRule for SubsumptionRule {
    fn name(&self) -> &'static str {
        "subsumption"
    }

    fn simplify_forward(
        &self,
        target: usize,
        state: &SaturationState,
        ctx: &mut RuleContext,
        _indices: &SaturationIndices,
    ) -> Option<Simplification> {
        let clause = state.clause(target);
        let store = &*ctx.store;

        for &other in state.active.iter().chain(state.passive.iter()) {
            if other == target {
                continue;
            }
            let candidate = state.clause(other);
            if !is_unconditional(candidate) || candidate.literals.len() > clause.literals.len() {
                continue;
            }
            // Forward subsumption
            if subsumes(store, &candidate.literals, &clause.literals) {
                return Some(Simplification::Delete {
                    target,
                    reason: DeletionReason::ForwardSubsumed,
                });
            }
            // Forward subsumption resolution
            if let Some(cut) =
                subsumption_resolution(store, &candidate.literals, &clause.literals)
            {
                let literals: Vec<LiteralId> = clause
                    .literals
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| i != cut)
                    .map(|(_, &l)| l)
                    .collect();
                return Some(Simplification::Replace {
                    target,
                    literals,
                    rule: Rule::ForwardSubsumptionResolution,
                    premises: vec![target, other],
                });
            }
        }
        None
    }

    fn simplify_backward(
        &self,
        new_active: usize,
        state: &SaturationState,
        ctx: &mut RuleContext,
        _indices: &SaturationIndices,
    ) -> Vec<Simplification> {
        let subsumer = state.clause(new_active);
        if !is_unconditional(subsumer) {
            return Vec::new();
        }
        let store = &*ctx.store;
        let mut changes = Vec::new();

        for &other in state.active.iter().chain(state.passive.iter()) {
            if other == new_active {
                continue;
            }
            let candidate = state.clause(other);
            if subsumer.literals.len() > candidate.literals.len() {
                continue;
            }
            if subsumes(store, &subsumer.literals, &candidate.literals) {
                changes.push(Simplification::Delete {
                    target: other,
                    reason: DeletionReason::BackwardSubsumed,
                });
            } else if let Some(cut) =
                subsumption_resolution(store, &subsumer.literals, &candidate.literals)
            {
                let literals: Vec<LiteralId> = candidate
                    .literals
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| i != cut)
                    .map(|(_, &l)| l)
                    .collect();
                changes.push(Simplification::Replace {
                    target: other,
                    literals,
                    rule: Rule::BackwardSubsumptionResolution,
                    premises: vec![other, new_active],
                });
            }
        }
        changes
    }
}
