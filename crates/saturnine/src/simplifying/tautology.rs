//! Cheap literal-level simplifications
//!
//! Duplicate-literal removal, trivial-inequality elimination (dropping
//! `t != t` literals), and tautology deletion (complementary literals or
//! a reflexive positive equality). These run first in the forward
//! simplification chain because they need no indices.

use crate::fol::{LiteralId, TermStore};
use crate::inference::Rule;
use crate::saturation::state::{
    DeletionReason, RuleContext, SaturationIndices, SaturationState, Simplification,
    SimplifyingRule,
};

pub struct TautologyRule;

impl TautologyRule {
    pub fn new() -> Self {
        TautologyRule
    }

    /// Complementary pair of literals?
    fn has_complementary_pair(store: &TermStore, literals: &[LiteralId]) -> bool {
        literals.iter().enumerate().any(|(i, &a)| {
            literals[i + 1..].iter().any(|&b| {
                store.header(a) == store.complementary_header(b)
                    && store.lit(a).args == store.lit(b).args
            })
        })
    }

    /// Positive equality t = t?
    fn has_reflexive_equality(store: &TermStore, literals: &[LiteralId]) -> bool {
        literals.iter().any(|&l| {
            let lit = store.lit(l);
            store.is_equality(l) && lit.polarity && lit.args[0] == lit.args[1]
        })
    }
}

impl Default for TautologyRule {
    fn default() -> Self {
        Self::new()
    }
}

impl SimplifyingRule for TautologyRule {
    fn name(&self) -> &'static str {
        "tautology"
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

        // Duplicate literal removal
        let mut deduped: Vec<LiteralId> = Vec::with_capacity(clause.literals.len());
        for &lit in &clause.literals {
            if !deduped.contains(&lit) {
                deduped.push(lit);
            }
        }
        if deduped.len() < clause.literals.len() {
            return Some(Simplification::Replace {
                target,
                literals: deduped,
                rule: Rule::DuplicateLiteralRemoval,
                premises: vec![target],
            });
        }

        // Trivial inequality elimination: drop t != t literals
        let kept: Vec<LiteralId> = clause
            .literals
            .iter()
            .copied()
            .filter(|&l| {
                let lit = store.lit(l);
                !(store.is_equality(l) && !lit.polarity && lit.args[0] == lit.args[1])
            })
            .collect();
        if kept.len() < clause.literals.len() {
            return Some(Simplification::Replace {
                target,
                literals: kept,
                rule: Rule::TrivialInequalityRemoval,
                premises: vec![target],
            });
        }

        // Tautology deletion
        if Self::has_complementary_pair(store, &clause.literals) {
            return Some(Simplification::Delete {
                target,
                reason: DeletionReason::SimpleTautology,
            });
        }
        if Self::has_reflexive_equality(store, &clause.literals) {
            return Some(Simplification::Delete {
                target,
                reason: DeletionReason::EquationalTautology,
            });
        }
        None
    }
}
