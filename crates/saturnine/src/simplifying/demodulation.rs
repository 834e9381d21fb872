//! Demodulation: rewriting with oriented unit equalities
//!
//! Forward demodulation rewrites a new clause using the unit equalities
//! in the rewrite index; backward demodulation uses a freshly activated
//! unit equality to rewrite older clauses. A rewrite `l -> r` fires on a
//! subterm `t` when some matcher σ gives `lσ = t` and the ordering
//! confirms `lσ ≻ rσ`. Only unconditional premises (⊥ propositional
//! part, no splits) may simplify; conditional rewrites would not justify
//! deleting the original clause.

use crate::fol::{Clause, LiteralId, OrderResult, Term, TermId, TermStore};
use crate::inference::Rule;
use crate::saturation::state::{
    RuleContext, SaturationIndices, SaturationState, Simplification, SimplifyingRule,
};
use crate::unification::match_term;

pub struct DemodulationRule;

impl DemodulationRule {
    pub fn new() -> Self {
        DemodulationRule
    }

    /// The oriented sides of a unit positive equality, if the clause is
    /// one and is unconditional.
    pub fn as_rewrite_rule(store: &TermStore, clause: &Clause) -> Option<(TermId, TermId)> {
        if clause.literals.len() != 1 || clause.prop != crate::prop::NodeId::FALSE {
            return None;
        }
        if !clause.splits.is_empty() {
            return None;
        }
        let lit = store.lit(clause.literals[0]);
        if !lit.polarity || !store.is_equality(clause.literals[0]) {
            return None;
        }
        Some((lit.args[0], lit.args[1]))
    }

    /// Try to rewrite one subterm of `target` with `lhs -> rhs`.
    /// Returns the rewritten literal list on success.
    fn rewrite_clause(
        ctx: &mut RuleContext,
        target: &Clause,
        lhs: TermId,
        rhs: TermId,
    ) -> Option<Vec<LiteralId>> {
        for (lit_idx, &lit) in target.literals.iter().enumerate() {
            let args: Vec<TermId> = ctx.store.lit(lit).args.to_vec();
            for &arg in &args {
                if let Some((from, to)) = Self::rewrite_in_term(ctx, arg, lhs, rhs) {
                    let l = ctx.store.lit(lit);
                    let (predicate, polarity) = (l.predicate, l.polarity);
                    let new_args: Vec<TermId> = args
                        .iter()
                        .map(|&a| ctx.store.replace(a, from, to))
                        .collect();
                    let new_lit = ctx.store.literal(ctx.interner, predicate, polarity, new_args);
                    let mut literals = target.literals.clone();
                    literals[lit_idx] = new_lit;
                    return Some(literals);
                }
            }
        }
        None
    }

    /// Find the first subterm of `term` that `lhs -> rhs` rewrites,
    /// returning the matched instance and its replacement.
    fn rewrite_in_term(
        ctx: &mut RuleContext,
        term: TermId,
        lhs: TermId,
        rhs: TermId,
    ) -> Option<(TermId, TermId)> {
        if let Some(matcher) = match_term(ctx.store, lhs, term) {
            let lhs_instance = term;
            let rhs_instance = matcher.apply(ctx.store, rhs);
            if ctx.ordering.compare(ctx.store, lhs_instance, rhs_instance) == OrderResult::Greater {
                return Some((lhs_instance, rhs_instance));
            }
        }
        if let Term::App(_, args) = ctx.store.term(term) {
            let args: Vec<TermId> = args.clone();
            for arg in args {
                if let Some(hit) = Self::rewrite_in_term(ctx, arg, lhs, rhs) {
                    return Some(hit);
                }
            }
        }
        None
    }
}

impl Default for DemodulationRule {
    fn default() -> Self {
        Self::new()
    }
}

impl SimplifyingRule for DemodulationRule {
    fn name(&self) -> &'static str {
        "demodulation"
    }

    fn simplify_forward(
        &self,
        target: usize,
        state: &SaturationState,
        ctx: &mut RuleContext,
        indices: &SaturationIndices,
    ) -> Option<Simplification> {
        let clause = state.clause(target);

        // Collect candidate rules from the index for every subterm
        let mut candidates: Vec<usize> = Vec::new();
        for &lit in &clause.literals {
            let args: Vec<TermId> = ctx.store.lit(lit).args.to_vec();
            for arg in args {
                for sub in ctx.store.subterms(arg) {
                    for (rule_clause, _) in indices.rewrites.generalisations(ctx.store, sub) {
                        if rule_clause != target && !candidates.contains(&rule_clause) {
                            candidates.push(rule_clause);
                        }
                    }
                }
            }
        }

        for rule_clause in candidates {
            let unit = state.clause(rule_clause);
            let Some((lhs, rhs)) = Self::as_rewrite_rule(ctx.store, unit) else {
                continue;
            };
            if let Some(literals) = Self::rewrite_clause(ctx, clause, lhs, rhs) {
                return Some(Simplification::Replace {
                    target,
                    literals,
                    rule: Rule::ForwardDemodulation,
                    premises: vec![target, rule_clause],
                });
            }
            // An unoriented unit equality can still rewrite right-to-left
            if let Some(literals) = Self::rewrite_clause(ctx, clause, rhs, lhs) {
                return Some(Simplification::Replace {
                    target,
                    literals,
                    rule: Rule::ForwardDemodulation,
                    premises: vec![target, rule_clause],
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
        let unit = state.clause(new_active);
        let Some((lhs, rhs)) = Self::as_rewrite_rule(ctx.store, unit) else {
            return Vec::new();
        };

        let mut changes = Vec::new();
        let targets: Vec<usize> = state
            .passive
            .iter()
            .chain(state.active.iter())
            .copied()
            .filter(|&idx| idx != new_active)
            .collect();
        for target in targets {
            let clause = state.clause(target);
            if let Some(literals) = Self::rewrite_clause(ctx, clause, lhs, rhs) {
                changes.push(Simplification::Replace {
                    target,
                    literals,
                    rule: Rule::BackwardDemodulation,
                    premises: vec![target, new_active],
                });
            }
        }
        changes
    }
}
