//! Equality resolution
//!
//! From `s != t | R` with σ = mgu(s, t), derive `Rσ`. Applies to
//! selected negative equality literals of the given clause.

use super::common::{collect_side_literals, dedup_literals};
use crate::inference::Rule;
use crate::saturation::state::{
    GeneratingRule, NewClause, RuleContext, SaturationIndices, SaturationState,
};
use crate::unification::{FreshRenaming, RobSubstitution};

pub struct EqualityResolutionRule;

impl EqualityResolutionRule {
    pub fn new() -> Self {
        EqualityResolutionRule
    }
}

impl Default for EqualityResolutionRule {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratingRule for EqualityResolutionRule {
    fn name(&self) -> &'static str {
        "equality_resolution"
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

        for i in clause.selected_indices() {
            let lit_id = clause.literals[i];
            let lit = ctx.store.lit(lit_id);
            if lit.polarity || !ctx.store.is_equality(lit_id) {
                continue;
            }
            let (s, t) = (lit.args[0], lit.args[1]);
            let mut subst = RobSubstitution::new();
            if !subst.unify(ctx.store, s, 0, t, 0) {
                continue;
            }
            let mut renaming = FreshRenaming::new();
            let mut literals = Vec::with_capacity(clause.len() - 1);
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
                rule: Rule::EqualityResolution,
                parents: vec![given],
            });
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

        fn run(&mut self, clause: Clause) -> Vec<NewClause> {
            let mut state = SaturationState::new();
            state.clauses.push(clause);
            let indices = SaturationIndices::default();
            let mut rule_ctx = RuleContext {
                store: &mut self.store,
                interner: &self.interner,
                ordering: &self.ordering,
                selection: LiteralSelection::Sel0,
            };
            EqualityResolutionRule::new().generate(0, &state, &mut rule_ctx, &indices)
        }
    }

    #[test]
    fn test_resolves_unifiable_inequality() {
        let mut ctx = TestContext::new();
        let p = ctx.pred("p", 1);
        let x = ctx.store.var(0);
        let a = ctx.const_("a");
        let f = ctx.interner.intern_function("f", 1);
        let fx = ctx.store.app(f, vec![x]);
        let fa = ctx.store.app(f, vec![a]);

        // f(X) != f(a) | p(X)  derives  p(a)
        let neq = ctx.store.equality(&ctx.interner, false, fx, fa);
        let px = ctx.store.literal(&ctx.interner, p, true, vec![x]);
        let clause = Clause::new(vec![neq, px], &ctx.store);

        let conclusions = ctx.run(clause);
        assert_eq!(conclusions.len(), 1);
        let lit = ctx.store.lit(conclusions[0].literals[0]);
        assert_eq!(lit.predicate, p);
        assert_eq!(lit.args, &[a]);
    }

    #[test]
    fn test_derives_empty_clause() {
        let mut ctx = TestContext::new();
        let x = ctx.store.var(0);
        let y = ctx.store.var(1);
        // X != Y alone derives the empty clause
        let neq = ctx.store.equality(&ctx.interner, false, x, y);
        let clause = Clause::new(vec![neq], &ctx.store);

        let conclusions = ctx.run(clause);
        assert_eq!(conclusions.len(), 1);
        assert!(conclusions[0].literals.is_empty());
    }

    #[test]
    fn test_skips_positive_equalities() {
        let mut ctx = TestContext::new();
        let a = ctx.const_("a");
        let x = ctx.store.var(0);
        let eq = ctx.store.equality(&ctx.interner, true, x, a);
        let clause = Clause::new(vec![eq], &ctx.store);
        assert!(ctx.run(clause).is_empty());
    }
}
