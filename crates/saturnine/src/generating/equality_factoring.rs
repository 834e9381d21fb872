//! Equality factoring
//!
//! From `s = t | u = v | R` with σ = mgu(s, u), derive
//! `(t != v | u = v | R)σ`, provided σs is not smaller than σt.
//! Applies to pairs of selected positive equalities of the given clause.

use super::common::{collect_side_literals, dedup_literals};
use crate::fol::OrderResult;
use crate::inference::Rule;
use crate::saturation::state::{
    GeneratingRule, NewClause, RuleContext, SaturationIndices, SaturationState,
};
use crate::unification::{FreshRenaming, RobSubstitution};

pub struct EqualityFactoringRule;

impl EqualityFactoringRule {
    pub fn new() -> Self {
        EqualityFactoringRule
    }
}

impl Default for EqualityFactoringRule {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratingRule for EqualityFactoringRule {
    fn name(&self) -> &'static str {
        "equality_factoring"
    }

    fn generate(
        &self,
        given: usize,
        state: &SaturationState,
        ctx: &mut RuleContext,
        _indices: &SaturationIndices,
    ) -> Vec<NewClause> {
        let clause = state.clause(given);
        let mut conclusions = Vec::new();
        let selected = clause.selected_indices();

        for &i in &selected {
            let li = clause.literals[i];
            if !ctx.store.is_equality(li) || !ctx.store.lit(li).polarity {
                continue;
            }
            for &j in &selected {
                if i == j {
                    continue;
                }
                let lj = clause.literals[j];
                if !ctx.store.is_equality(lj) || !ctx.store.lit(lj).polarity {
                    continue;
                }
                // Try both orientations of the first equality
                for (s, t) in [
                    (ctx.store.lit(li).args[0], ctx.store.lit(li).args[1]),
                    (ctx.store.lit(li).args[1], ctx.store.lit(li).args[0]),
                ] {
                    let u = ctx.store.lit(lj).args[0];
                    let v = ctx.store.lit(lj).args[1];
                    let mut subst = RobSubstitution::new();
                    if !subst.unify(ctx.store, s, 0, u, 0) {
                        continue;
                    }
                    // The factored side must not be the small one
                    if ctx.ordering.compare(ctx.store, s, t) == OrderResult::Less {
                        continue;
                    }
                    let mut renaming = FreshRenaming::new();
                    let new_t = subst.apply(ctx.store, t, 0, &mut renaming);
                    let new_v = subst.apply(ctx.store, v, 0, &mut renaming);
                    let residual = ctx.store.equality(ctx.interner, false, new_t, new_v);

                    let mut literals = vec![residual];
                    collect_side_literals(
                        ctx.store,
                        ctx.interner,
                        &subst,
                        &mut renaming,
                        &clause.literals,
                        0,
                        i,
                        &mut literals,
                    );
                    conclusions.push(NewClause {
                        literals: dedup_literals(literals),
                        rule: Rule::EqualityFactoring,
                        parents: vec![given],
                    });
                }
            }
        }
        conclusions
    }
}
