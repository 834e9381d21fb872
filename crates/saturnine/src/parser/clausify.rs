//! Clausification: NNF, skolemization, and distribution
//!
//! Converts preprocessed formula units into clauses. Negation is pushed
//! to the atoms, existential variables are replaced by Skolem terms over
//! the universals in scope, and disjunctions are distributed over
//! conjunctions. Every produced clause records a `Clausify` inference
//! back to its formula unit.

use super::fof::Formula;
use crate::fol::{Interner, LiteralId, Term, TermId, TermStore};
use std::collections::HashMap;

/// Push negations to the atoms.
fn nnf(formula: Formula, store: &mut TermStore, negated: bool) -> Formula {
    match formula {
        Formula::Atom(lit) => {
            if negated {
                Formula::Atom(store.complement(lit))
            } else {
                Formula::Atom(lit)
            }
        }
        Formula::Not(inner) => nnf(*inner, store, !negated),
        Formula::And(fs) => {
            let converted: Vec<Formula> = fs.into_iter().map(|f| nnf(f, store, negated)).collect();
            if negated {
                Formula::Or(converted)
            } else {
                Formula::And(converted)
            }
        }
        Formula::Or(fs) => {
            let converted: Vec<Formula> = fs.into_iter().map(|f| nnf(f, store, negated)).collect();
            if negated {
                Formula::And(converted)
            } else {
                Formula::Or(converted)
            }
        }
        Formula::Implies(a, b) => {
            // a => b is ~a | b
            let na = nnf(*a, store, !negated);
            let nb = nnf(*b, store, negated);
            if negated {
                // ~(a => b) is a & ~b
                Formula::And(vec![na, nb])
            } else {
                Formula::Or(vec![na, nb])
            }
        }
        Formula::Iff(a, b) => {
            // a <=> b is (a => b) & (b => a); expand before recursing
            let expansion = Formula::And(vec![
                Formula::Implies(a.clone(), b.clone()),
                Formula::Implies(b, a),
            ]);
            nnf(expansion, store, negated)
        }
        Formula::Forall(vars, inner) => {
            let converted = nnf(*inner, store, negated);
            if negated {
                Formula::Exists(vars, Box::new(converted))
            } else {
                Formula::Forall(vars, Box::new(converted))
            }
        }
        Formula::Exists(vars, inner) => {
            let converted = nnf(*inner, store, negated);
            if negated {
                Formula::Forall(vars, Box::new(converted))
            } else {
                Formula::Exists(vars, Box::new(converted))
            }
        }
    }
}

/// Replace existential variables by Skolem terms over the universals in
/// scope. The input must be in NNF.
fn skolemize(
    formula: Formula,
    store: &mut TermStore,
    interner: &mut Interner,
    universals: &mut Vec<u32>,
    substitution: &mut HashMap<u32, TermId>,
) -> Formula {
    match formula {
        Formula::Atom(lit) => {
            if substitution.is_empty() {
                Formula::Atom(lit)
            } else {
                Formula::Atom(apply_to_literal(store, interner, lit, substitution))
            }
        }
        Formula::And(fs) => Formula::And(
            fs.into_iter()
                .map(|f| skolemize(f, store, interner, universals, substitution))
                .collect(),
        ),
        Formula::Or(fs) => Formula::Or(
            fs.into_iter()
                .map(|f| skolemize(f, store, interner, universals, substitution))
                .collect(),
        ),
        Formula::Forall(vars, inner) => {
            universals.extend(&vars);
            let converted = skolemize(*inner, store, interner, universals, substitution);
            universals.truncate(universals.len() - vars.len());
            // Universal quantification becomes implicit in CNF
            converted
        }
        Formula::Exists(vars, inner) => {
            let mut introduced = Vec::new();
            for var in &vars {
                let sk = interner.fresh_skolem(universals.len() as u8);
                let args: Vec<TermId> = universals.iter().map(|&u| store.var(u)).collect();
                let sk_term = store.app(sk, args);
                substitution.insert(*var, sk_term);
                introduced.push(*var);
            }
            let converted = skolemize(*inner, store, interner, universals, substitution);
            for var in introduced {
                substitution.remove(&var);
            }
            converted
        }
        Formula::Not(_) | Formula::Implies(..) | Formula::Iff(..) => {
            unreachable!("skolemize expects NNF input")
        }
    }
}

fn apply_to_term(store: &mut TermStore, term: TermId, subst: &HashMap<u32, TermId>) -> TermId {
    match store.term(term).clone() {
        Term::Var(v) => subst.get(&v).copied().unwrap_or(term),
        Term::SpecialVar(_) => term,
        Term::App(f, args) => {
            let new_args = args
                .iter()
                .map(|&a| apply_to_term(store, a, subst))
                .collect();
            store.app(f, new_args)
        }
    }
}

fn apply_to_literal(
    store: &mut TermStore,
    interner: &Interner,
    lit: LiteralId,
    subst: &HashMap<u32, TermId>,
) -> LiteralId {
    let l = store.lit(lit);
    let (predicate, polarity) = (l.predicate, l.polarity);
    let args: Vec<TermId> = l.args.to_vec();
    let new_args = args
        .iter()
        .map(|&a| apply_to_term(store, a, subst))
        .collect();
    store.literal(interner, predicate, polarity, new_args)
}

/// Distribute disjunction over conjunction, producing literal lists.
/// The input must be quantifier-free NNF.
fn distribute(formula: Formula) -> Vec<Vec<LiteralId>> {
    match formula {
        Formula::Atom(lit) => vec![vec![lit]],
        Formula::And(fs) => fs.into_iter().flat_map(distribute).collect(),
        Formula::Or(fs) => {
            let mut clauses: Vec<Vec<LiteralId>> = vec![vec![]];
            for f in fs {
                let sub = distribute(f);
                let mut next = Vec::with_capacity(clauses.len() * sub.len());
                for existing in &clauses {
                    for branch in &sub {
                        let mut merged = existing.clone();
                        merged.extend(branch.iter().copied());
                        next.push(merged);
                    }
                }
                clauses = next;
            }
            clauses
        }
        other => unreachable!("distribute expects quantifier-free NNF, got {:?}", other),
    }
}

/// Convert one formula to clause literal lists.
pub fn clausify(
    formula: Formula,
    store: &mut TermStore,
    interner: &mut Interner,
) -> Vec<Vec<LiteralId>> {
    let formula = nnf(formula, store, false);
    let mut universals = Vec::new();
    let mut substitution = HashMap::new();
    let formula = skolemize(formula, store, interner, &mut universals, &mut substitution);
    distribute(formula.flatten())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fol::PredicateId;

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

        fn pred(&mut self, name: &str, arity: u8) -> PredicateId {
            self.interner.intern_predicate(name, arity)
        }

        fn atom(&mut self, pred: PredicateId, args: Vec<TermId>) -> Formula {
            Formula::Atom(self.store.literal(&self.interner, pred, true, args))
        }
    }

    #[test]
    fn test_implication_clausifies() {
        let mut ctx = TestContext::new();
        let p = ctx.pred("p", 1);
        let q = ctx.pred("q", 1);
        let x = ctx.store.var(0);
        let px = ctx.atom(p, vec![x]);
        let qx = ctx.atom(q, vec![x]);

        // ![X]: (p(X) => q(X)) gives one clause {~p(X), q(X)}
        let f = Formula::Forall(
            vec![0],
            Box::new(Formula::Implies(Box::new(px), Box::new(qx))),
        );
        let clauses = clausify(f, &mut ctx.store, &mut ctx.interner);
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].len(), 2);
        let polarities: Vec<bool> = clauses[0]
            .iter()
            .map(|&l| ctx.store.lit(l).polarity)
            .collect();
        assert!(polarities.contains(&true) && polarities.contains(&false));
    }

    #[test]
    fn test_negated_exists_conjunction() {
        let mut ctx = TestContext::new();
        let p = ctx.pred("p", 1);
        let q = ctx.pred("q", 1);
        let x = ctx.store.var(0);
        let px = ctx.atom(p, vec![x]);
        let qx = ctx.atom(q, vec![x]);

        // ~(?[X]: (p(X) & q(X))) gives one clause {~p(X), ~q(X)}
        let f = Formula::Not(Box::new(Formula::Exists(
            vec![0],
            Box::new(Formula::And(vec![px, qx])),
        )));
        let clauses = clausify(f, &mut ctx.store, &mut ctx.interner);
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].len(), 2);
        assert!(clauses[0]
            .iter()
            .all(|&l| !ctx.store.lit(l).polarity));
    }

    #[test]
    fn test_skolemization_under_universal() {
        let mut ctx = TestContext::new();
        let p = ctx.pred("p", 2);
        let x = ctx.store.var(0);
        let y = ctx.store.var(1);
        let pxy = ctx.atom(p, vec![x, y]);

        // ![X]: ?[Y]: p(X, Y) skolemizes Y to sK0(X)
        let f = Formula::Forall(vec![0], Box::new(Formula::Exists(vec![1], Box::new(pxy))));
        let clauses = clausify(f, &mut ctx.store, &mut ctx.interner);
        assert_eq!(clauses.len(), 1);
        let lit = ctx.store.lit(clauses[0][0]);
        // Second argument is now a function of X
        match ctx.store.term(lit.args[1]) {
            Term::App(sk, args) => {
                assert!(ctx.interner.resolve_function(*sk).starts_with("sK"));
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected skolem term, got {:?}", other),
        }
    }

    #[test]
    fn test_distribution() {
        let mut ctx = TestContext::new();
        let p = ctx.pred("p", 0);
        let q = ctx.pred("q", 0);
        let r = ctx.pred("r", 0);
        let fp = ctx.atom(p, vec![]);
        let fq = ctx.atom(q, vec![]);
        let fr = ctx.atom(r, vec![]);

        // p | (q & r) gives two clauses {p, q} and {p, r}
        let f = Formula::Or(vec![fp, Formula::And(vec![fq, fr])]);
        let clauses = clausify(f, &mut ctx.store, &mut ctx.interner);
        assert_eq!(clauses.len(), 2);
        assert!(clauses.iter().all(|c| c.len() == 2));
    }
}
