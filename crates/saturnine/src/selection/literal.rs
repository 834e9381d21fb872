//! Literal selection strategies based on Hoder et al. "Selecting the
//! selection" (2016)
//!
//! Selection determines which literals of a clause are eligible for
//! generating inferences. The numbers match Vampire's --selection
//! option:
//! - Sel0: select all literals
//! - Sel20: select all maximal literals
//! - Sel21: unique maximal, else max-weight negative, else all maximal
//! - Sel22: max-weight negative literal, else all maximal

use crate::fol::{Clause, Interner, LiteralId, TermOrdering, TermStore};
use serde::Serialize;

/// The closed set of built-in selection strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LiteralSelection {
    /// Selection 0: select all literals (no selection)
    Sel0,
    /// Selection 20: select all maximal literals
    Sel20,
    /// Selection 21: unique maximal, else max-weight negative, else all maximal
    #[default]
    Sel21,
    /// Selection 22: max-weight negative literal, else all maximal
    Sel22,
}

impl LiteralSelection {
    pub fn name(&self) -> &'static str {
        match self {
            LiteralSelection::Sel0 => "sel0",
            LiteralSelection::Sel20 => "sel20",
            LiteralSelection::Sel21 => "sel21",
            LiteralSelection::Sel22 => "sel22",
        }
    }

    /// Strategies that keep the calculus refutationally complete.
    pub fn is_complete(&self) -> bool {
        matches!(self, LiteralSelection::Sel0 | LiteralSelection::Sel20)
    }

    /// Compute the selection bitmap for a clause: bit i set means
    /// literal i participates in generating inferences. Always selects
    /// at least one eligible literal of a non-empty clause. Answer
    /// literals are never selected (they have no inference partners and
    /// ride along until capture), unless the clause has nothing else.
    pub fn select(
        &self,
        store: &TermStore,
        interner: &Interner,
        ordering: &TermOrdering,
        clause: &Clause,
    ) -> u64 {
        let n = clause.literals.len().min(64);
        if n == 0 {
            return 0;
        }
        let eligible: Vec<usize> = (0..n)
            .filter(|&i| {
                !interner.is_answer_predicate(store.lit(clause.literals[i]).predicate)
            })
            .collect();
        if eligible.is_empty() {
            return if n == 64 { u64::MAX } else { (1 << n) - 1 };
        }
        let all: u64 = eligible.iter().fold(0, |acc, &i| acc | (1 << i));

        match self {
            LiteralSelection::Sel0 => all,
            LiteralSelection::Sel20 => {
                maximal_bitmap(store, ordering, &clause.literals, &eligible)
            }
            LiteralSelection::Sel21 => {
                let maximal = maximal_bitmap(store, ordering, &clause.literals, &eligible);
                if maximal.count_ones() == 1 {
                    return maximal;
                }
                match max_weight_negative(store, &clause.literals, &eligible) {
                    Some(i) => 1 << i,
                    None => maximal,
                }
            }
            LiteralSelection::Sel22 => {
                match max_weight_negative(store, &clause.literals, &eligible) {
                    Some(i) => 1 << i,
                    None => maximal_bitmap(store, ordering, &clause.literals, &eligible),
                }
            }
        }
    }
}

/// Bitmap of eligible literals not dominated by another eligible
/// literal of the clause.
fn maximal_bitmap(
    store: &TermStore,
    ordering: &TermOrdering,
    literals: &[LiteralId],
    eligible: &[usize],
) -> u64 {
    let mut bitmap = 0u64;
    for &i in eligible {
        let dominated = eligible.iter().any(|&j| {
            i != j && ordering.literal_greater(store, literals[j], literals[i])
        });
        if !dominated {
            bitmap |= 1 << i;
        }
    }
    debug_assert!(bitmap != 0);
    bitmap
}

/// Index of the heaviest eligible negative literal, ties broken by
/// position.
fn max_weight_negative(
    store: &TermStore,
    literals: &[LiteralId],
    eligible: &[usize],
) -> Option<usize> {
    eligible
        .iter()
        .copied()
        .filter(|&i| !store.lit(literals[i]).polarity)
        .max_by_key(|&i| (store.literal_weight(literals[i]), usize::MAX - i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fol::{KboConfig, PredicateId, TermId};

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

        fn func(&mut self, name: &str, args: Vec<TermId>) -> TermId {
            let f = self.interner.intern_function(name, args.len() as u8);
            self.store.app(f, args)
        }

        fn pred(&mut self, name: &str, arity: u8) -> PredicateId {
            self.interner.intern_predicate(name, arity)
        }

        fn lit(&mut self, pred: PredicateId, polarity: bool, args: Vec<TermId>) -> LiteralId {
            self.store.literal(&self.interner, pred, polarity, args)
        }
    }

    #[test]
    fn test_sel0_selects_all() {
        let mut ctx = TestContext::new();
        let p = ctx.pred("p", 0);
        let q = ctx.pred("q", 0);
        let lp = ctx.lit(p, true, vec![]);
        let lq = ctx.lit(q, false, vec![]);
        let clause = Clause::new(vec![lp, lq], &ctx.store);

        let bitmap = LiteralSelection::Sel0.select(&ctx.store, &ctx.interner, &ctx.ordering, &clause);
        assert_eq!(bitmap, 0b11);
    }

    #[test]
    fn test_sel20_selects_maximal() {
        let mut ctx = TestContext::new();
        let p = ctx.pred("p", 1);
        let a = ctx.const_("a");
        let fa = ctx.func("f", vec![a]);
        let ffa = ctx.func("f", vec![fa]);
        // p(f(f(a))) outweighs p(a)
        let heavy = ctx.lit(p, true, vec![ffa]);
        let light = ctx.lit(p, true, vec![a]);
        let clause = Clause::new(vec![light, heavy], &ctx.store);

        let bitmap = LiteralSelection::Sel20.select(&ctx.store, &ctx.interner, &ctx.ordering, &clause);
        assert_eq!(bitmap, 0b10);
    }

    #[test]
    fn test_sel21_prefers_unique_maximal() {
        let mut ctx = TestContext::new();
        let p = ctx.pred("p", 1);
        let a = ctx.const_("a");
        let fa = ctx.func("f", vec![a]);
        let heavy = ctx.lit(p, true, vec![fa]);
        let light = ctx.lit(p, false, vec![a]);
        let clause = Clause::new(vec![light, heavy], &ctx.store);

        // Unique maximal literal wins even over the negative one
        let bitmap = LiteralSelection::Sel21.select(&ctx.store, &ctx.interner, &ctx.ordering, &clause);
        assert_eq!(bitmap, 0b10);
    }

    #[test]
    fn test_sel22_prefers_negative() {
        let mut ctx = TestContext::new();
        let p = ctx.pred("p", 1);
        let q = ctx.pred("q", 1);
        let a = ctx.const_("a");
        let pos = ctx.lit(p, true, vec![a]);
        let neg = ctx.lit(q, false, vec![a]);
        let clause = Clause::new(vec![pos, neg], &ctx.store);

        let bitmap = LiteralSelection::Sel22.select(&ctx.store, &ctx.interner, &ctx.ordering, &clause);
        assert_eq!(bitmap, 0b10);
    }

    #[test]
    fn test_selection_never_empty() {
        let mut ctx = TestContext::new();
        let p = ctx.pred("p", 1);
        let x = ctx.store.var(0);
        let y = ctx.store.var(1);
        // Two incomparable literals: both are maximal
        let l1 = ctx.lit(p, true, vec![x]);
        let l2 = ctx.lit(p, true, vec![y]);
        let clause = Clause::new(vec![l1, l2], &ctx.store);

        for strategy in [
            LiteralSelection::Sel0,
            LiteralSelection::Sel20,
            LiteralSelection::Sel21,
            LiteralSelection::Sel22,
        ] {
            let bitmap = strategy.select(&ctx.store, &ctx.interner, &ctx.ordering, &clause);
            assert_ne!(bitmap, 0, "{} selected nothing", strategy.name());
        }
    }
}
