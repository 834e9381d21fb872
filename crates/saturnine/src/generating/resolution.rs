//! Binary resolution
//!
//! Resolves a selected literal of the given clause against complementary
//! selected literals of active clauses, retrieved through the literal
//! index. The given clause sits in bank 0, the partner in bank 1.

use super::common::{collect_side_literals, dedup_literals};
use crate::fol::Clause;
use crate::inference::Rule;
use crate::saturation::state::{
    GeneratingRule, NewClause, RuleContext, SaturationIndices, SaturationState,
};
use crate::unification::{FreshRenaming, RobSubstitution};

/// Resolve `given` (bank 0) against `partner` (bank 1) on the literal
/// pair (i, j), which must be complementary-headed.
pub fn resolve_pair(
    ctx: &mut RuleContext,
    given: &Clause,
    partner: &Clause,
    i: usize,
    j: usize,
) -> Option<Vec<crate::fol::LiteralId>> {
    let mut subst = RobSubstitution::new();
    if !subst.unify_args(ctx.store, given.literals[i], 0, partner.literals[j], 1) {
        return None;
    }
    let mut renaming = FreshRenaming::new();
    let mut literals = Vec::with_capacity(given.len() + partner.len() - 2);
    collect_side_literals(
        ctx.store,
        ctx.interner,
        &subst,
        &mut renaming,
        &given.literals,
        0,
        i,
        &mut literals,
    );
    collect_side_literals(
        ctx.store,
        ctx.interner,
        &subst,
        &mut renaming,
        &partner.literals,
        1,
        j,
        &mut literals,
    );
    Some(dedup_literals(literals))
}

pub struct ResolutionRule;

impl ResolutionRule {
    pub fn new() -> Self {
        ResolutionRule
    }
}

impl Default for ResolutionRule {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratingRule for ResolutionRule {
    fn name(&self) -> &'static str {
        "resolution"
    }

    fn generate(
        &self,
        given: usize,
        state: &SaturationState,
        ctx: &mut RuleContext,
        indices: &SaturationIndices,
    ) -> Vec<NewClause> {
        let given_clause = state.clause(given);
        let mut conclusions = Vec::new();

        for i in given_clause.selected_indices() {
            let lit = given_clause.literals[i];
            let candidates = indices.active_literals.unifiable(ctx.store, lit, true);
            for (partner_lit, partner_idx) in candidates {
                let partner = state.clause(partner_idx);
                let Some(j) = partner.literals.iter().position(|&l| l == partner_lit) else {
                    continue;
                };
                if let Some(literals) = resolve_pair(ctx, given_clause, partner, i, j) {
                    conclusions.push(NewClause {
                        literals,
                        rule: Rule::Resolution,
                        parents: vec![given, partner_idx],
                    });
                }
            }
        }
        conclusions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fol::{Interner, KboConfig, PredicateId, TermId, TermOrdering, TermStore};
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

        fn rule_ctx(&mut self) -> RuleContext<'_> {
            RuleContext {
                store: &mut self.store,
                interner: &self.interner,
                ordering: &self.ordering,
                selection: LiteralSelection::Sel0,
            }
        }
    }

    #[test]
    fn test_basic_resolution() {
        let mut ctx = TestContext::new();
        let p = ctx.pred("p", 1);
        let q = ctx.pred("q", 1);
        let r = ctx.pred("r", 1);
        let a = ctx.const_("a");
        let b = ctx.const_("b");
        let x = ctx.store.var(0);

        // p(a) | q(X)   and   ~p(a) | r(b)
        let pa = ctx.store.literal(&ctx.interner, p, true, vec![a]);
        let qx = ctx.store.literal(&ctx.interner, q, true, vec![x]);
        let npa = ctx.store.literal(&ctx.interner, p, false, vec![a]);
        let rb = ctx.store.literal(&ctx.interner, r, true, vec![b]);

        let c1 = Clause::new(vec![pa, qx], &ctx.store);
        let c2 = Clause::new(vec![npa, rb], &ctx.store);

        let mut rule_ctx = ctx.rule_ctx();
        let literals = resolve_pair(&mut rule_ctx, &c1, &c2, 0, 0).unwrap();
        assert_eq!(literals.len(), 2);
        drop(rule_ctx);

        // Result is q(X') | r(b)
        let lits: Vec<_> = literals.iter().map(|&l| ctx.store.lit(l)).collect();
        assert_eq!(lits[0].predicate, q);
        assert_eq!(lits[1].predicate, r);
    }

    #[test]
    fn test_self_resolution_renames_apart() {
        let mut ctx = TestContext::new();
        let p = ctx.pred("p", 1);
        let x = ctx.store.var(0);
        let f = ctx.interner.intern_function("f", 1);
        let fx = ctx.store.app(f, vec![x]);

        // p(X) | ~p(f(X)) resolved with itself on (0, 1):
        // X@0 = f(X@1) gives ~p(f(f(X))) ... | p(X) sides
        let px = ctx.store.literal(&ctx.interner, p, true, vec![x]);
        let npfx = ctx.store.literal(&ctx.interner, p, false, vec![fx]);
        let c = Clause::new(vec![px, npfx], &ctx.store);

        let mut rule_ctx = ctx.rule_ctx();
        let literals = resolve_pair(&mut rule_ctx, &c, &c, 0, 1).unwrap();
        drop(rule_ctx);

        assert_eq!(literals.len(), 2);
        // The conclusion must not collapse to a single literal: banks
        // keep the two copies distinct
        let l0 = ctx.store.lit(literals[0]);
        let l1 = ctx.store.lit(literals[1]);
        assert_ne!(l0.polarity, l1.polarity);
    }

    #[test]
    fn test_clash_returns_none() {
        let mut ctx = TestContext::new();
        let p = ctx.pred("p", 1);
        let a = ctx.const_("a");
        let b = ctx.const_("b");
        let pa = ctx.store.literal(&ctx.interner, p, true, vec![a]);
        let npb = ctx.store.literal(&ctx.interner, p, false, vec![b]);
        let c1 = Clause::new(vec![pa], &ctx.store);
        let c2 = Clause::new(vec![npb], &ctx.store);

        let mut rule_ctx = ctx.rule_ctx();
        assert!(resolve_pair(&mut rule_ctx, &c1, &c2, 0, 0).is_none());
    }

    #[test]
    fn test_generate_through_index() {
        let mut ctx = TestContext::new();
        let p = ctx.pred("p", 1);
        let a = ctx.const_("a");
        let pa = ctx.store.literal(&ctx.interner, p, true, vec![a]);
        let npa = ctx.store.literal(&ctx.interner, p, false, vec![a]);

        let mut state = SaturationState::new();
        state.clauses.push(Clause::new(vec![pa], &ctx.store));
        state.clauses.push(Clause::new(vec![npa], &ctx.store));
        state.active.insert(1);

        let mut indices = SaturationIndices::default();
        indices.active_literals.insert(&ctx.store, npa, 1);

        let mut rule_ctx = ctx.rule_ctx();
        let conclusions = ResolutionRule::new().generate(0, &state, &mut rule_ctx, &indices);
        assert_eq!(conclusions.len(), 1);
        assert!(conclusions[0].literals.is_empty());
        assert_eq!(conclusions[0].parents, vec![0, 1]);
    }
}
