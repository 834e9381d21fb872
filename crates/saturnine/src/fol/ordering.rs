//! Simplification orderings on shared terms
//!
//! Both Knuth-Bendix (KBO) and lexicographic path (LPO) orderings are
//! supported; the choice is part of the proving strategy. Symbol
//! precedence defaults to interning order, symbol weight to 1.

use super::interner::FunctionId;
use super::literal::LiteralId;
use super::term::{Term, TermId, TermStore};
use std::collections::HashMap;

/// Result of comparing two terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderResult {
    Greater,
    Less,
    Equal,
    Incomparable,
}

impl OrderResult {
    pub fn flip(self) -> OrderResult {
        match self {
            OrderResult::Greater => OrderResult::Less,
            OrderResult::Less => OrderResult::Greater,
            other => other,
        }
    }
}

/// Configuration for the Knuth-Bendix ordering.
#[derive(Debug, Clone, Default)]
pub struct KboConfig {
    /// Weight of each function symbol (default 1)
    pub symbol_weights: HashMap<FunctionId, u32>,
    /// Precedence (higher = bigger; default is the symbol id)
    pub precedence: HashMap<FunctionId, u32>,
    /// Weight of variables (must be positive)
    pub variable_weight: u32,
}

impl KboConfig {
    pub fn new() -> Self {
        KboConfig {
            symbol_weights: HashMap::new(),
            precedence: HashMap::new(),
            variable_weight: 1,
        }
    }
}

/// Knuth-Bendix ordering.
#[derive(Debug, Clone)]
pub struct Kbo {
    config: KboConfig,
}

impl Kbo {
    pub fn new(mut config: KboConfig) -> Self {
        if config.variable_weight == 0 {
            config.variable_weight = 1;
        }
        Kbo { config }
    }

    fn symbol_weight(&self, id: FunctionId) -> u32 {
        self.config.symbol_weights.get(&id).copied().unwrap_or(1)
    }

    fn precedence(&self, id: FunctionId) -> u32 {
        self.config
            .precedence
            .get(&id)
            .copied()
            .unwrap_or(id.as_u32())
    }

    /// KBO term weight under the configured symbol weights.
    fn term_weight(&self, store: &TermStore, t: TermId) -> u32 {
        match store.term(t) {
            Term::Var(_) | Term::SpecialVar(_) => self.config.variable_weight,
            Term::App(f, args) => {
                self.symbol_weight(*f)
                    + args
                        .iter()
                        .map(|&a| self.term_weight(store, a))
                        .sum::<u32>()
            }
        }
    }

    pub fn compare(&self, store: &TermStore, s: TermId, t: TermId) -> OrderResult {
        if s == t {
            return OrderResult::Equal;
        }

        let mut vars_s = HashMap::new();
        let mut vars_t = HashMap::new();
        store.count_vars(s, &mut vars_s);
        store.count_vars(t, &mut vars_t);

        // s > t requires #(x, s) >= #(x, t) for every variable x
        let s_covers_t = vars_t
            .iter()
            .all(|(v, ct)| vars_s.get(v).copied().unwrap_or(0) >= *ct);
        let t_covers_s = vars_s
            .iter()
            .all(|(v, cs)| vars_t.get(v).copied().unwrap_or(0) >= *cs);

        let ws = self.term_weight(store, s);
        let wt = self.term_weight(store, t);

        if ws > wt && s_covers_t {
            OrderResult::Greater
        } else if wt > ws && t_covers_s {
            OrderResult::Less
        } else if ws == wt {
            match self.compare_lex(store, s, t) {
                OrderResult::Greater if s_covers_t => OrderResult::Greater,
                OrderResult::Less if t_covers_s => OrderResult::Less,
                OrderResult::Equal => OrderResult::Equal,
                _ => OrderResult::Incomparable,
            }
        } else {
            OrderResult::Incomparable
        }
    }

    /// Precedence-then-lexicographic tie break for equal weights.
    fn compare_lex(&self, store: &TermStore, s: TermId, t: TermId) -> OrderResult {
        if s == t {
            return OrderResult::Equal;
        }
        match (store.term(s), store.term(t)) {
            (Term::Var(_), _) | (Term::SpecialVar(_), _) => OrderResult::Incomparable,
            (_, Term::Var(_)) | (_, Term::SpecialVar(_)) => OrderResult::Incomparable,
            (Term::App(f, args_s), Term::App(g, args_t)) => {
                if f != g {
                    let (pf, pg) = (self.precedence(*f), self.precedence(*g));
                    if pf > pg {
                        OrderResult::Greater
                    } else if pf < pg {
                        OrderResult::Less
                    } else if f.as_u32() > g.as_u32() {
                        OrderResult::Greater
                    } else {
                        OrderResult::Less
                    }
                } else {
                    for (&a, &b) in args_s.iter().zip(args_t.iter()) {
                        match self.compare(store, a, b) {
                            OrderResult::Equal => continue,
                            other => return other,
                        }
                    }
                    OrderResult::Equal
                }
            }
        }
    }
}

/// Lexicographic path ordering.
#[derive(Debug, Clone)]
pub struct Lpo {
    precedence: HashMap<FunctionId, u32>,
}

impl Lpo {
    pub fn new(precedence: HashMap<FunctionId, u32>) -> Self {
        Lpo { precedence }
    }

    fn precedence(&self, id: FunctionId) -> u32 {
        self.precedence.get(&id).copied().unwrap_or(id.as_u32())
    }

    pub fn compare(&self, store: &TermStore, s: TermId, t: TermId) -> OrderResult {
        if s == t {
            OrderResult::Equal
        } else if self.greater(store, s, t) {
            OrderResult::Greater
        } else if self.greater(store, t, s) {
            OrderResult::Less
        } else {
            OrderResult::Incomparable
        }
    }

    /// s >lpo t
    fn greater(&self, store: &TermStore, s: TermId, t: TermId) -> bool {
        if s == t {
            return false;
        }
        match (store.term(s), store.term(t)) {
            // A variable is greater than nothing
            (Term::Var(_), _) | (Term::SpecialVar(_), _) => false,
            // s > x iff x occurs in s
            (_, Term::Var(v)) => store.contains_var(s, *v),
            (_, Term::SpecialVar(_)) => false,
            (Term::App(f, args_s), Term::App(g, args_t)) => {
                // (1) some argument of s is >= t
                if args_s
                    .iter()
                    .any(|&a| a == t || self.greater(store, a, t))
                {
                    return true;
                }
                let (pf, pg) = (self.precedence(*f), self.precedence(*g));
                let f_above_g = pf > pg || (pf == pg && f.as_u32() > g.as_u32());
                if f != g && f_above_g {
                    // (2) f > g and s dominates every argument of t
                    return args_t.iter().all(|&b| self.greater(store, s, b));
                }
                if f == g {
                    // (3) equal heads: lexicographic on arguments, s must
                    // still dominate the remaining arguments of t
                    for (i, (&a, &b)) in args_s.iter().zip(args_t.iter()).enumerate() {
                        if a == b {
                            continue;
                        }
                        return self.greater(store, a, b)
                            && args_t[i + 1..].iter().all(|&rest| self.greater(store, s, rest));
                    }
                }
                false
            }
        }
    }
}

/// The strategy's term ordering: a closed choice between KBO and LPO.
#[derive(Debug, Clone)]
pub enum TermOrdering {
    Kbo(Kbo),
    Lpo(Lpo),
}

impl TermOrdering {
    pub fn kbo(config: KboConfig) -> Self {
        TermOrdering::Kbo(Kbo::new(config))
    }

    pub fn lpo(precedence: HashMap<FunctionId, u32>) -> Self {
        TermOrdering::Lpo(Lpo::new(precedence))
    }

    pub fn compare(&self, store: &TermStore, s: TermId, t: TermId) -> OrderResult {
        match self {
            TermOrdering::Kbo(kbo) => kbo.compare(store, s, t),
            TermOrdering::Lpo(lpo) => lpo.compare(store, s, t),
        }
    }

    /// Compare two literals by extending the term ordering to atoms:
    /// header weight first, then variable condition, then argument
    /// comparison. Used by literal selection for maximality.
    pub fn literal_greater(&self, store: &TermStore, l1: LiteralId, l2: LiteralId) -> bool {
        if l1 == l2 {
            return false;
        }
        let a = store.lit(l1);
        let b = store.lit(l2);

        let mut vars1 = HashMap::new();
        let mut vars2 = HashMap::new();
        for &arg in a.args {
            store.count_vars(arg, &mut vars1);
        }
        for &arg in b.args {
            store.count_vars(arg, &mut vars2);
        }
        let covers = vars2
            .iter()
            .all(|(v, c2)| vars1.get(v).copied().unwrap_or(0) >= *c2);
        if !covers {
            return false;
        }

        let w1 = store.literal_weight(l1);
        let w2 = store.literal_weight(l2);
        if w1 != w2 {
            return w1 > w2;
        }

        if a.predicate != b.predicate {
            return a.predicate > b.predicate;
        }
        // Negative before positive counts as bigger at equal atoms
        for (&s, &t) in a.args.iter().zip(b.args.iter()) {
            match self.compare(store, s, t) {
                OrderResult::Greater => return true,
                OrderResult::Less => return false,
                OrderResult::Equal | OrderResult::Incomparable => continue,
            }
        }
        !a.polarity && b.polarity
    }
}

/// Re-orient the positive equalities of a clause so that the greater side
/// comes first whenever the ordering can decide.
pub fn orient_equalities(
    store: &mut TermStore,
    ordering: &TermOrdering,
    literals: &mut [LiteralId],
) {
    for lit in literals.iter_mut() {
        if !store.is_equality(*lit) {
            continue;
        }
        let l = store.lit(*lit);
        let (polarity, lhs, rhs) = (l.polarity, l.args[0], l.args[1]);
        match ordering.compare(store, lhs, rhs) {
            OrderResult::Less => *lit = store.oriented_equality(polarity, rhs, lhs),
            OrderResult::Greater => *lit = store.oriented_equality(polarity, lhs, rhs),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fol::Interner;

    struct TestContext {
        store: TermStore,
        interner: Interner,
    }

    impl TestContext {
        fn new() -> Self {
            TestContext {
                store: TermStore::new(),
                interner: Interner::new(),
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
    }

    #[test]
    fn test_kbo_subterm() {
        let mut ctx = TestContext::new();
        let kbo = Kbo::new(KboConfig::new());
        let x = ctx.store.var(0);
        let fx = ctx.func("f", vec![x]);
        assert_eq!(kbo.compare(&ctx.store, fx, x), OrderResult::Greater);
        assert_eq!(kbo.compare(&ctx.store, x, fx), OrderResult::Less);
    }

    #[test]
    fn test_kbo_variable_condition() {
        let mut ctx = TestContext::new();
        let kbo = Kbo::new(KboConfig::new());
        let x = ctx.store.var(0);
        let y = ctx.store.var(1);
        let a = ctx.const_("a");
        // distinct variables are incomparable
        assert_eq!(kbo.compare(&ctx.store, x, y), OrderResult::Incomparable);
        // a > X fails the variable condition
        assert_eq!(kbo.compare(&ctx.store, a, x), OrderResult::Incomparable);
    }

    #[test]
    fn test_kbo_precedence() {
        let mut ctx = TestContext::new();
        let a = ctx.const_("a");
        let fa = ctx.func("f", vec![a]);
        let ga = ctx.func("g", vec![a]);

        let f_id = ctx.interner.intern_function("f", 1);
        let g_id = ctx.interner.intern_function("g", 1);
        let mut config = KboConfig::new();
        config.precedence.insert(f_id, 2);
        config.precedence.insert(g_id, 1);
        let kbo = Kbo::new(config);

        assert_eq!(kbo.compare(&ctx.store, fa, ga), OrderResult::Greater);
    }

    #[test]
    fn test_lpo_subterm_and_precedence() {
        let mut ctx = TestContext::new();
        let lpo = Lpo::new(HashMap::new());
        let x = ctx.store.var(0);
        let a = ctx.const_("a");
        let fx = ctx.func("f", vec![x]);
        let ffx = ctx.func("f", vec![fx]);

        assert_eq!(lpo.compare(&ctx.store, fx, x), OrderResult::Greater);
        assert_eq!(lpo.compare(&ctx.store, ffx, fx), OrderResult::Greater);
        assert_eq!(lpo.compare(&ctx.store, x, fx), OrderResult::Less);
        // ground comparison decided by precedence (interning order)
        let fa = ctx.func("f", vec![a]);
        let ga = ctx.func("g", vec![a]);
        assert_ne!(lpo.compare(&ctx.store, fa, ga), OrderResult::Incomparable);
    }

    #[test]
    fn test_orient_equalities() {
        let mut ctx = TestContext::new();
        let ordering = TermOrdering::kbo(KboConfig::new());
        let a = ctx.const_("a");
        let fa = ctx.func("f", vec![a]);
        // a = f(a) must be flipped so the heavy side leads
        let lit = ctx.store.equality(&ctx.interner, true, a, fa);
        let mut lits = vec![lit];
        orient_equalities(&mut ctx.store, &ordering, &mut lits);
        let oriented = ctx.store.lit(lits[0]);
        assert_eq!(oriented.args[0], fa);
        assert_eq!(oriented.args[1], a);
    }
}
