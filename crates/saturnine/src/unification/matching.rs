//! One-way matching
//!
//! Matching binds variables of the pattern side only: `match_term(p, t)`
//! succeeds iff there is a substitution σ with `pσ = t`. Used by
//! demodulation (rewrite rule left-hand sides onto subterms) and by
//! subsumption (clause literals onto candidate instances).

use crate::fol::{LiteralId, Term, TermId, TermStore};
use std::collections::HashMap;

/// Accumulating matcher; bindings persist across calls so one consistent
/// substitution can be built over several literals.
#[derive(Debug, Default)]
pub struct Matcher {
    bindings: HashMap<u32, TermId>,
    trail: Vec<u32>,
}

impl Matcher {
    pub fn new() -> Self {
        Matcher {
            bindings: HashMap::new(),
            trail: Vec::new(),
        }
    }

    pub fn checkpoint(&self) -> usize {
        self.trail.len()
    }

    pub fn rollback_to(&mut self, mark: usize) {
        while self.trail.len() > mark {
            let var = self.trail.pop().unwrap();
            self.bindings.remove(&var);
        }
    }

    pub fn binding(&self, var: u32) -> Option<TermId> {
        self.bindings.get(&var).copied()
    }

    /// Match pattern onto term, extending the current bindings. On
    /// failure the bindings are left unchanged.
    pub fn match_term(&mut self, store: &TermStore, pattern: TermId, term: TermId) -> bool {
        let mark = self.checkpoint();
        if self.match_rec(store, pattern, term) {
            true
        } else {
            self.rollback_to(mark);
            false
        }
    }

    fn match_rec(&mut self, store: &TermStore, pattern: TermId, term: TermId) -> bool {
        match store.term(pattern) {
            Term::Var(v) => match self.bindings.get(v) {
                Some(&bound) => bound == term,
                None => {
                    self.bindings.insert(*v, term);
                    self.trail.push(*v);
                    true
                }
            },
            // Special variables never occur in rewrite patterns
            Term::SpecialVar(_) => pattern == term,
            Term::App(f, args_p) => match store.term(term) {
                Term::App(g, args_t) if f == g && args_p.len() == args_t.len() => {
                    let pairs: Vec<(TermId, TermId)> = args_p
                        .iter()
                        .copied()
                        .zip(args_t.iter().copied())
                        .collect();
                    pairs.into_iter().all(|(p, t)| self.match_rec(store, p, t))
                }
                _ => false,
            },
        }
    }

    /// Match the arguments of a pattern literal onto a target literal
    /// with the same predicate and polarity.
    pub fn match_literal(&mut self, store: &TermStore, pattern: LiteralId, target: LiteralId) -> bool {
        let p = store.lit(pattern);
        let t = store.lit(target);
        if p.predicate != t.predicate || p.polarity != t.polarity || p.args.len() != t.args.len() {
            return false;
        }
        let pairs: Vec<(TermId, TermId)> = p
            .args
            .iter()
            .copied()
            .zip(t.args.iter().copied())
            .collect();
        let mark = self.checkpoint();
        for (pa, ta) in pairs {
            if !self.match_rec(store, pa, ta) {
                self.rollback_to(mark);
                return false;
            }
        }
        true
    }

    /// Apply the accumulated bindings to a term; unbound variables stay.
    pub fn apply(&self, store: &mut TermStore, term: TermId) -> TermId {
        match store.term(term).clone() {
            Term::Var(v) => self.bindings.get(&v).copied().unwrap_or(term),
            Term::SpecialVar(_) => term,
            Term::App(f, args) => {
                let new_args = args.iter().map(|&a| self.apply(store, a)).collect();
                store.app(f, new_args)
            }
        }
    }
}

/// One-shot matching of a pattern term onto a target term.
pub fn match_term(store: &TermStore, pattern: TermId, term: TermId) -> Option<Matcher> {
    let mut matcher = Matcher::new();
    if matcher.match_term(store, pattern, term) {
        Some(matcher)
    } else {
        None
    }
}

/// One-shot matching of a pattern literal onto a target literal.
pub fn match_literal(store: &TermStore, pattern: LiteralId, target: LiteralId) -> Option<Matcher> {
    let mut matcher = Matcher::new();
    if matcher.match_literal(store, pattern, target) {
        Some(matcher)
    } else {
        None
    }
}
