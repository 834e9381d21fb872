//! Banked substitutions with trail-based backtracking
//!
//! `RobSubstitution` implements Robinson unification with occurs check.
//! Bindings are recorded on a trail; `checkpoint`/`rollback_to` undo any
//! suffix of the trail, and checkpoints nest as a stack. A failed
//! `unify` always leaves the substitution exactly as it found it.

use crate::fol::{LiteralId, Term, TermId, TermStore};
use std::collections::HashMap;

/// A variable paired with its bank. Special variables live in a disjoint
/// namespace within each bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BankedVar {
    pub var: u32,
    pub bank: u8,
    pub special: bool,
}

impl BankedVar {
    pub fn ordinary(var: u32, bank: u8) -> Self {
        BankedVar {
            var,
            bank,
            special: false,
        }
    }

    pub fn special(var: u32, bank: u8) -> Self {
        BankedVar {
            var,
            bank,
            special: true,
        }
    }
}

/// A trail position; rolling back to it undoes all later bindings.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint(usize);

/// Substitution mapping banked variables to banked terms.
#[derive(Debug, Default)]
pub struct RobSubstitution {
    bindings: HashMap<BankedVar, (TermId, u8)>,
    trail: Vec<BankedVar>,
}

impl RobSubstitution {
    pub fn new() -> Self {
        RobSubstitution {
            bindings: HashMap::new(),
            trail: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Start a recording; bindings made after this point are undone by
    /// `rollback_to`. Checkpoints nest as a stack.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.trail.len())
    }

    /// Undo every binding made since the checkpoint.
    pub fn rollback_to(&mut self, cp: Checkpoint) {
        while self.trail.len() > cp.0 {
            let var = self.trail.pop().unwrap();
            self.bindings.remove(&var);
        }
    }

    /// Keep everything bound since the checkpoint.
    pub fn commit(&mut self, _cp: Checkpoint) {}

    fn bind(&mut self, var: BankedVar, term: TermId, bank: u8) {
        debug_assert!(!self.bindings.contains_key(&var), "variable bound twice");
        self.bindings.insert(var, (term, bank));
        self.trail.push(var);
    }

    pub fn lookup(&self, var: BankedVar) -> Option<(TermId, u8)> {
        self.bindings.get(&var).copied()
    }

    /// Chase variable bindings until a non-variable term or an unbound
    /// variable is reached.
    fn deref(&self, store: &TermStore, mut term: TermId, mut bank: u8) -> (TermId, u8) {
        loop {
            let var = match store.term(term) {
                Term::Var(v) => BankedVar::ordinary(*v, bank),
                Term::SpecialVar(v) => BankedVar::special(*v, bank),
                Term::App(..) => return (term, bank),
            };
            match self.bindings.get(&var) {
                Some(&(bound, bound_bank)) => {
                    term = bound;
                    bank = bound_bank;
                }
                None => return (term, bank),
            }
        }
    }

    fn occurs(&self, store: &TermStore, var: BankedVar, term: TermId, bank: u8) -> bool {
        let (term, bank) = self.deref(store, term, bank);
        match store.term(term) {
            Term::Var(v) => BankedVar::ordinary(*v, bank) == var,
            Term::SpecialVar(v) => BankedVar::special(*v, bank) == var,
            Term::App(_, args) => args
                .iter()
                .any(|&arg| self.occurs(store, var, arg, bank)),
        }
    }

    /// Robinson unification of two banked terms. On success the
    /// substitution is extended; on failure it is left unchanged.
    pub fn unify(&mut self, store: &TermStore, t1: TermId, b1: u8, t2: TermId, b2: u8) -> bool {
        let cp = self.checkpoint();
        if self.unify_rec(store, t1, b1, t2, b2) {
            true
        } else {
            self.rollback_to(cp);
            false
        }
    }

    fn unify_rec(&mut self, store: &TermStore, t1: TermId, b1: u8, t2: TermId, b2: u8) -> bool {
        let (t1, b1) = self.deref(store, t1, b1);
        let (t2, b2) = self.deref(store, t2, b2);
        if t1 == t2 && b1 == b2 {
            return true;
        }
        let var1 = match store.term(t1) {
            Term::Var(v) => Some(BankedVar::ordinary(*v, b1)),
            Term::SpecialVar(v) => Some(BankedVar::special(*v, b1)),
            Term::App(..) => None,
        };
        if let Some(var) = var1 {
            if self.occurs(store, var, t2, b2) {
                return false;
            }
            self.bind(var, t2, b2);
            return true;
        }
        let var2 = match store.term(t2) {
            Term::Var(v) => Some(BankedVar::ordinary(*v, b2)),
            Term::SpecialVar(v) => Some(BankedVar::special(*v, b2)),
            Term::App(..) => None,
        };
        if let Some(var) = var2 {
            if self.occurs(store, var, t1, b1) {
                return false;
            }
            self.bind(var, t1, b1);
            return true;
        }
        match (store.term(t1).clone(), store.term(t2).clone()) {
            (Term::App(f, args1), Term::App(g, args2)) => {
                if f != g || args1.len() != args2.len() {
                    return false;
                }
                args1
                    .iter()
                    .zip(args2.iter())
                    .all(|(&a1, &a2)| self.unify_rec(store, a1, b1, a2, b2))
            }
            _ => false,
        }
    }

    /// Unify the argument lists of two literals whose headers agree up to
    /// polarity. On failure the substitution is left unchanged.
    pub fn unify_args(
        &mut self,
        store: &TermStore,
        l1: LiteralId,
        b1: u8,
        l2: LiteralId,
        b2: u8,
    ) -> bool {
        let lit1 = store.lit(l1);
        let lit2 = store.lit(l2);
        if lit1.predicate != lit2.predicate || lit1.args.len() != lit2.args.len() {
            return false;
        }
        let args1: Vec<TermId> = lit1.args.to_vec();
        let args2: Vec<TermId> = lit2.args.to_vec();
        let cp = self.checkpoint();
        for (&a1, &a2) in args1.iter().zip(args2.iter()) {
            if !self.unify_rec(store, a1, b1, a2, b2) {
                self.rollback_to(cp);
                return false;
            }
        }
        true
    }

    /// Apply the substitution to a banked term, producing a plain term
    /// whose surviving free variables are renamed fresh through
    /// `renaming`.
    pub fn apply(
        &self,
        store: &mut TermStore,
        term: TermId,
        bank: u8,
        renaming: &mut FreshRenaming,
    ) -> TermId {
        let (term, bank) = self.deref(store, term, bank);
        match store.term(term).clone() {
            Term::Var(v) => {
                let fresh = renaming.rename(BankedVar::ordinary(v, bank));
                store.var(fresh)
            }
            Term::SpecialVar(v) => {
                let fresh = renaming.rename(BankedVar::special(v, bank));
                store.var(fresh)
            }
            Term::App(f, args) => {
                let new_args = args
                    .iter()
                    .map(|&a| self.apply(store, a, bank, renaming))
                    .collect();
                store.app(f, new_args)
            }
        }
    }

    /// Apply the substitution to a banked literal.
    pub fn apply_literal(
        &self,
        store: &mut TermStore,
        interner: &crate::fol::Interner,
        lit: LiteralId,
        bank: u8,
        renaming: &mut FreshRenaming,
    ) -> LiteralId {
        let l = store.lit(lit);
        let (predicate, polarity) = (l.predicate, l.polarity);
        let args: Vec<TermId> = l.args.to_vec();
        let new_args = args
            .iter()
            .map(|&a| self.apply(store, a, bank, renaming))
            .collect();
        store.literal(interner, predicate, polarity, new_args)
    }
}

/// Fresh-variable renaming used while applying a substitution: every
/// unbound banked variable is mapped to a fresh output variable, numbered
/// from zero so result clauses are normalised.
#[derive(Debug, Default)]
pub struct FreshRenaming {
    map: HashMap<BankedVar, u32>,
    next: u32,
}

impl FreshRenaming {
    pub fn new() -> Self {
        FreshRenaming {
            map: HashMap::new(),
            next: 0,
        }
    }

    fn rename(&mut self, var: BankedVar) -> u32 {
        if let Some(&v) = self.map.get(&var) {
            return v;
        }
        let v = self.next;
        self.next += 1;
        self.map.insert(var, v);
        v
    }
}
