//! Superposition
//!
//! From `l = r | C` and `L[s] | D` with σ = mgu(l, s), s not a variable,
//! and σl not smaller than σr, derive `(L[r] | C | D)σ`. The given
//! clause acts as the rewriting side (forward), as the rewritten side
//! (backward), and as both (self superposition). The rewriter sits in
//! bank 0 when it is the given clause, the partner always in the other
//! bank.

use super::common::{collect_side_literals, dedup_literals};
use crate::fol::{Clause, LiteralId, OrderResult, Term, TermId};
use crate::inference::Rule;
use crate::saturation::state::{
    GeneratingRule, NewClause, RuleContext, SaturationIndices, SaturationState,
};
use crate::unification::{FreshRenaming, RobSubstitution};

/// Positions of positive equality literals among the selected literals.
fn selected_equalities(ctx: &RuleContext, clause: &Clause) -> Vec<usize> {
    clause
        .selected_indices()
        .into_iter()
        .filter(|&i| {
            let lit = clause.literals[i];
            ctx.store.is_equality(lit) && ctx.store.lit(lit).polarity
        })
        .collect()
}

/// All non-variable subterm positions of a literal's arguments, as
/// (argument index, subterm) pairs.
fn rewritable_subterms(ctx: &RuleContext, lit: LiteralId) -> Vec<(usize, TermId)> {
    let mut out = Vec::new();
    for (arg_idx, &arg) in ctx.store.lit(lit).args.iter().enumerate() {
        for sub in ctx.store.subterms(arg) {
            if matches!(ctx.store.term(sub), Term::App(..)) {
                out.push((arg_idx, sub));
            }
        }
    }
    out
}

/// Superpose `eq_clause` (bank `eq_bank`, equality literal `eq_idx`,
/// oriented as `l -> r`) into `target` (bank `target_bank`, literal
/// `target_idx`, subterm `sub`). Returns the conclusion literals.
#[allow(clippy::too_many_arguments)]
fn superpose(
    ctx: &mut RuleContext,
    eq_clause: &Clause,
    eq_bank: u8,
    eq_idx: usize,
    l: TermId,
    r: TermId,
    target: &Clause,
    target_bank: u8,
    target_idx: usize,
    sub: TermId,
) -> Option<Vec<LiteralId>> {
    let mut subst = RobSubstitution::new();
    if !subst.unify(ctx.store, l, eq_bank, sub, target_bank) {
        return None;
    }

    // Ordering check on the instantiated equality: σl must not be
    // smaller than σr
    let mut probe = FreshRenaming::new();
    let l_inst = subst.apply(ctx.store, l, eq_bank, &mut probe);
    let r_inst = subst.apply(ctx.store, r, eq_bank, &mut probe);
    if ctx.ordering.compare(ctx.store, l_inst, r_inst) == OrderResult::Less {
        return None;
    }

    // Build the rewritten literal: apply the unifier to the target
    // literal and replace the instantiated subterm by the instantiated
    // right-hand side. The shared renaming keeps variable names
    // consistent across all applications.
    let mut renaming = FreshRenaming::new();
    let target_lit = target.literals[target_idx];
    let lit = ctx.store.lit(target_lit);
    let (predicate, polarity) = (lit.predicate, lit.polarity);
    let args: Vec<TermId> = lit.args.to_vec();

    let sub_applied = subst.apply(ctx.store, sub, target_bank, &mut renaming);
    let r_applied = subst.apply(ctx.store, r, eq_bank, &mut renaming);
    let new_args: Vec<TermId> = args
        .iter()
        .map(|&a| {
            let applied = subst.apply(ctx.store, a, target_bank, &mut renaming);
            ctx.store.replace(applied, sub_applied, r_applied)
        })
        .collect();
    let new_lit = ctx.store.literal(ctx.interner, predicate, polarity, new_args);

    let mut literals = vec![new_lit];
    collect_side_literals(
        ctx.store,
        ctx.interner,
        &subst,
        &mut renaming,
        &target.literals,
        target_bank,
        target_idx,
        &mut literals,
    );
    collect_side_literals(
        ctx.store,
        ctx.interner,
        &subst,
        &mut renaming,
        &eq_clause.literals,
        eq_bank,
        eq_idx,
        &mut literals,
    );
    Some(dedup_literals(literals))
}

/// Run all superpositions of `eq_clause` into `target` and collect
/// conclusions tagged with `rule`.
#[allow(clippy::too_many_arguments)]
fn superpose_into(
    ctx: &mut RuleContext,
    eq_clause_idx: usize,
    eq_clause: &Clause,
    eq_bank: u8,
    target_idx_global: usize,
    target: &Clause,
    target_bank: u8,
    rule: Rule,
    out: &mut Vec<NewClause>,
) {
    for eq_idx in selected_equalities(ctx, eq_clause) {
        let eq_lit = eq_clause.literals[eq_idx];
        let (a0, a1) = {
            let lit = ctx.store.lit(eq_lit);
            (lit.args[0], lit.args[1])
        };
        for (l, r) in [(a0, a1), (a1, a0)] {
            // Never rewrite from a bare variable side
            if !matches!(ctx.store.term(l), Term::App(..)) {
                continue;
            }
            for target_lit_idx in target.selected_indices() {
                for (_, sub) in rewritable_subterms(ctx, target.literals[target_lit_idx]) {
                    if let Some(literals) = superpose(
                        ctx,
                        eq_clause,
                        eq_bank,
                        eq_idx,
                        l,
                        r,
                        target,
                        target_bank,
                        target_lit_idx,
                        sub,
                    ) {
                        out.push(NewClause {
                            literals,
                            rule,
                            parents: vec![eq_clause_idx, target_idx_global],
                        });
                    }
                }
            }
        }
    }
}

pub struct SuperpositionRule;

impl SuperpositionRule {
    pub fn new() -> Self {
        SuperpositionRule
    }
}

impl Default for SuperpositionRule {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratingRule for SuperpositionRule {
    fn name(&self) -> &'static str {
        "superposition"
    }

    fn generate(
        &self,
        given: usize,
        state: &SaturationState,
        ctx: &mut RuleContext,
        _indices: &SaturationIndices,
    ) -> Vec<NewClause> {
        let given_clause = state.clause(given);
        let mut conclusions = Vec::new();

        for &active in state.active.iter() {
            if active == given {
                continue;
            }
            let partner = state.clause(active);
            // Forward: given rewrites into the active partner
            superpose_into(
                ctx,
                given,
                given_clause,
                0,
                active,
                partner,
                1,
                Rule::ForwardSuperposition,
                &mut conclusions,
            );
            // Backward: the active partner rewrites into given
            superpose_into(
                ctx,
                active,
                partner,
                1,
                given,
                given_clause,
                0,
                Rule::BackwardSuperposition,
                &mut conclusions,
            );
        }
        // Self superposition: given into a renamed copy of itself
        superpose_into(
            ctx,
            given,
            given_clause,
            0,
            given,
            given_clause,
            1,
            Rule::SelfSuperposition,
            &mut conclusions,
        );
        conclusions
    }
}
