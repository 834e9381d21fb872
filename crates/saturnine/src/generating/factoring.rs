//! Factoring
//!
//! Unifies two selected literals of the same polarity within the given
//! clause and keeps a single copy. Works entirely in bank 0.

use super::common::{collect_side_literals, dedup_literals};
use crate::inference::Rule;
use crate::saturation::state::{
    GeneratingRule, NewClause, RuleContext, SaturationIndices, SaturationState,
};
use crate::unification::{FreshRenaming, RobSubstitution};

pub struct FactoringRule;

impl FactoringRule {
    pub fn new() -> Self {
        FactoringRule
    }
}

impl Default for FactoringRule {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratingRule for FactoringRule {
    fn name(&self) -> &'static str {
        "factoring"
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

        for (a, &i) in selected.iter().enumerate() {
            for &j in &selected[a + 1..] {
                let li = clause.literals[i];
                let lj = clause.literals[j];
                if ctx.store.header(li) != ctx.store.header(lj) {
                    continue;
                }
                let mut subst = RobSubstitution::new();
                if !subst.unify_args(ctx.store, li, 0, lj, 0) {
                    continue;
                }
                let mut renaming = FreshRenaming::new();
                let mut literals = Vec::with_capacity(clause.len() - 1);
                // Keep literal i, drop literal j
                collect_side_literals(
                    ctx.store,
                    ctx.interner,
                    &subst,
                    &mut renaming,
                    &clause.literals,
                    0,
                    j,
                    &mut literals,
                );
                conclusions.push(NewClause {
                    literals: dedup_literals(literals),
                    rule: Rule::Factoring,
                    parents: vec![given],
                });
            }
        }
        conclusions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fol::{Clause, Interner, KboConfig, PredicateId, TermId, TermOrdering, TermStore};
    use crate::selection::LiteralSelection;

    struct TestContext {
        store: TermStore,
        interner: Interner,
        ordering: TermOrdering,
    }

    impl TestContext {
        fn new() -> Self {
            TestContext {
                store: TermStore::new(),
                interner: Interner::new(),
                ordering: TermOrdering::kbo(KboConfig::new()),
            }
        }

        fn const_(&mut self, name: &str) -> TermId {
            let f = self.interner.intern_function(name, 0);
            self.store.constant(f)
        }

        fn pred(&mut self, name: &str, arity: u8) -> PredicateId {
            self.interner.intern_predicate(name, arity)
        }

        fn factor(&mut self, clause: Clause) -> Vec<NewClause> {
            let mut state = SaturationState::new();
            state.clauses.push(clause);
            let indices = SaturationIndices::default();
            let mut rule_ctx = RuleContext {
                store: &mut self.store,
                interner: &self.interner,
                ordering: &self.ordering,
                selection: LiteralSelection::Sel0,
            };
            FactoringRule::new().generate(0, &state, &mut rule_ctx, &indices)
        }
    }

    #[test]
    fn test_factoring_unifies_copies() {
        let mut ctx = TestContext::new();
        let p = ctx.pred("p", 1);
        let q = ctx.pred("q", 1);
        let x = ctx.store.var(0);
        let a = ctx.const_("a");

        // p(X) | p(a) | q(X) factors to p(a) | q(a)
        let px = ctx.store.literal(&ctx.interner, p, true, vec![x]);
        let pa = ctx.store.literal(&ctx.interner, p, true, vec![a]);
        let qx = ctx.store.literal(&ctx.interner, q, true, vec![x]);
        let clause = Clause::new(vec![px, pa, qx], &ctx.store);

        let conclusions = ctx.factor(clause);
        assert_eq!(conclusions.len(), 1);
        let literals = &conclusions[0].literals;
        assert_eq!(literals.len(), 2);
        let l0 = ctx.store.lit(literals[0]);
        let l1 = ctx.store.lit(literals[1]);
        assert_eq!(l0.predicate, p);
        assert_eq!(l0.args, &[a]);
        assert_eq!(l1.predicate, q);
        assert_eq!(l1.args, &[a]);
    }

    #[test]
    fn test_no_factoring_on_opposite_polarity() {
        let mut ctx = TestContext::new();
        let p = ctx.pred("p", 1);
        let x = ctx.store.var(0);
        let a = ctx.const_("a");
        let px = ctx.store.literal(&ctx.interner, p, true, vec![x]);
        let npa = ctx.store.literal(&ctx.interner, p, false, vec![a]);
        let clause = Clause::new(vec![px, npa], &ctx.store);

        assert!(ctx.factor(clause).is_empty());
    }
}
