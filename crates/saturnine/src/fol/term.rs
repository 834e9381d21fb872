//! Hash-consed terms
//!
//! All terms live in a `TermStore` arena and are referred to by `TermId`.
//! Structurally equal terms always share the same id, so equality and
//! hashing of terms are O(1). Each stored compound caches its weight
//! (symbol count), groundness, total variable occurrences, and a lazily
//! computed distinct-variable count.

use super::interner::{FunctionId, Interner};
use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Handle to a shared term.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(pub(crate) u32);

impl TermId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Structure of a term. Constants are arity-0 applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// Ordinary variable (clause-scoped index)
    Var(u32),
    /// Special variable from the reserved internal namespace
    SpecialVar(u32),
    /// Function application
    App(FunctionId, Vec<TermId>),
}

/// Sentinel for a not-yet-computed distinct-variable count.
const VARS_UNKNOWN: u32 = u32::MAX;

struct TermEntry {
    term: Term,
    weight: u32,
    var_occurrences: u32,
    ground: bool,
    distinct_vars: Cell<u32>,
}

/// Arena of hash-consed terms and literals.
///
/// The literal half of the store lives in `fol::literal`.
pub struct TermStore {
    entries: Vec<TermEntry>,
    dedup: HashMap<Term, TermId>,
    pub(super) literals: Vec<super::literal::LiteralEntry>,
    pub(super) literal_dedup: HashMap<super::literal::LiteralKey, super::literal::LiteralId>,
}

impl Default for TermStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TermStore {
    pub fn new() -> Self {
        TermStore {
            entries: Vec::new(),
            dedup: HashMap::new(),
            literals: Vec::new(),
            literal_dedup: HashMap::new(),
        }
    }

    fn insert(&mut self, term: Term) -> TermId {
        if let Some(&id) = self.dedup.get(&term) {
            return id;
        }
        let (weight, var_occurrences, ground) = match &term {
            Term::Var(_) | Term::SpecialVar(_) => (1, 1, false),
            Term::App(_, args) => {
                let mut weight = 1u32;
                let mut occs = 0u32;
                let mut ground = true;
                for &arg in args {
                    let e = &self.entries[arg.0 as usize];
                    weight += e.weight;
                    occs += e.var_occurrences;
                    ground &= e.ground;
                }
                (weight, occs, ground)
            }
        };
        let id = TermId(self.entries.len() as u32);
        self.entries.push(TermEntry {
            term: term.clone(),
            weight,
            var_occurrences,
            ground,
            distinct_vars: Cell::new(if ground { 0 } else { VARS_UNKNOWN }),
        });
        self.dedup.insert(term, id);
        id
    }

    /// Get-or-create an ordinary variable term.
    pub fn var(&mut self, index: u32) -> TermId {
        self.insert(Term::Var(index))
    }

    /// Get-or-create a special variable term.
    pub fn special_var(&mut self, index: u32) -> TermId {
        self.insert(Term::SpecialVar(index))
    }

    /// Get-or-create a function application. Deterministic: the same
    /// functor and argument ids always return the same `TermId`.
    pub fn app(&mut self, functor: FunctionId, args: Vec<TermId>) -> TermId {
        self.insert(Term::App(functor, args))
    }

    /// Shorthand for an arity-0 application.
    pub fn constant(&mut self, functor: FunctionId) -> TermId {
        self.app(functor, Vec::new())
    }

    pub fn term(&self, id: TermId) -> &Term {
        &self.entries[id.0 as usize].term
    }

    /// Weight invariant: `weight(f(t1..tn)) = 1 + sum(weight(ti))`,
    /// variables weigh 1.
    pub fn weight(&self, id: TermId) -> u32 {
        self.entries[id.0 as usize].weight
    }

    pub fn is_ground(&self, id: TermId) -> bool {
        self.entries[id.0 as usize].ground
    }

    /// Total number of variable occurrences in the term.
    pub fn var_occurrences(&self, id: TermId) -> u32 {
        self.entries[id.0 as usize].var_occurrences
    }

    /// Number of distinct ordinary variables, computed on first use.
    pub fn distinct_vars(&self, id: TermId) -> u32 {
        let entry = &self.entries[id.0 as usize];
        let cached = entry.distinct_vars.get();
        if cached != VARS_UNKNOWN {
            return cached;
        }
        let mut vars = HashSet::new();
        self.collect_vars(id, &mut vars);
        let count = vars.len() as u32;
        entry.distinct_vars.set(count);
        count
    }

    /// Collect the ordinary variables occurring in a term.
    pub fn collect_vars(&self, id: TermId, vars: &mut HashSet<u32>) {
        match self.term(id) {
            Term::Var(v) => {
                vars.insert(*v);
            }
            Term::SpecialVar(_) => {}
            Term::App(_, args) => {
                for &arg in args {
                    self.collect_vars(arg, vars);
                }
            }
        }
    }

    /// Check whether an ordinary variable occurs in a term.
    pub fn contains_var(&self, id: TermId, var: u32) -> bool {
        match self.term(id) {
            Term::Var(v) => *v == var,
            Term::SpecialVar(_) => false,
            Term::App(_, args) => args.iter().any(|&a| self.contains_var(a, var)),
        }
    }

    /// Count occurrences of each ordinary variable in a term.
    pub fn count_vars(&self, id: TermId, counts: &mut HashMap<u32, u32>) {
        match self.term(id) {
            Term::Var(v) => {
                *counts.entry(*v).or_insert(0) += 1;
            }
            Term::SpecialVar(_) => {}
            Term::App(_, args) => {
                for &arg in args {
                    self.count_vars(arg, counts);
                }
            }
        }
    }

    /// All subterms of a term including itself, preorder.
    pub fn subterms(&self, id: TermId) -> Vec<TermId> {
        let mut out = Vec::new();
        let mut todo = vec![id];
        while let Some(t) = todo.pop() {
            out.push(t);
            if let Term::App(_, args) = self.term(t) {
                for &arg in args.iter().rev() {
                    todo.push(arg);
                }
            }
        }
        out
    }

    /// Replace every occurrence of `from` by `to` inside `id`.
    pub fn replace(&mut self, id: TermId, from: TermId, to: TermId) -> TermId {
        if id == from {
            return to;
        }
        match self.term(id).clone() {
            Term::Var(_) | Term::SpecialVar(_) => id,
            Term::App(f, args) => {
                let new_args: Vec<TermId> =
                    args.iter().map(|&a| self.replace(a, from, to)).collect();
                if new_args == args {
                    id
                } else {
                    self.app(f, new_args)
                }
            }
        }
    }

    pub fn term_count(&self) -> usize {
        self.entries.len()
    }

    /// Format a term with an interner for name resolution.
    pub fn display_term<'a>(&'a self, id: TermId, interner: &'a Interner) -> TermDisplay<'a> {
        TermDisplay {
            store: self,
            interner,
            id,
        }
    }
}

/// Display wrapper resolving symbol names through the interner.
pub struct TermDisplay<'a> {
    store: &'a TermStore,
    interner: &'a Interner,
    id: TermId,
}

impl<'a> fmt::Display for TermDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.store.term(self.id) {
            Term::Var(v) => write!(f, "X{}", v),
            Term::SpecialVar(v) => write!(f, "S{}", v),
            Term::App(func, args) => {
                write!(f, "{}", self.interner.resolve_function(*func))?;
                if !args.is_empty() {
                    write!(f, "(")?;
                    for (i, &arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, "{}", self.store.display_term(arg, self.interner))?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_symbols() -> (TermStore, Interner, FunctionId, FunctionId) {
        let mut interner = Interner::new();
        let f = interner.intern_function("f", 2);
        let a = interner.intern_function("a", 0);
        (TermStore::new(), interner, f, a)
    }

    #[test]
    fn test_sharing() {
        let (mut store, _interner, f, a) = store_with_symbols();
        let ta = store.constant(a);
        let x = store.var(0);
        let t1 = store.app(f, vec![ta, x]);
        let t2 = store.app(f, vec![ta, x]);
        assert_eq!(t1, t2);

        let y = store.var(1);
        let t3 = store.app(f, vec![ta, y]);
        assert_ne!(t1, t3);
    }

    #[test]
    fn test_weight_invariant() {
        let (mut store, _interner, f, a) = store_with_symbols();
        let ta = store.constant(a);
        let x = store.var(0);
        assert_eq!(store.weight(ta), 1);
        assert_eq!(store.weight(x), 1);

        // f(a, X) = 1 + 1 + 1
        let t = store.app(f, vec![ta, x]);
        assert_eq!(store.weight(t), 3);

        // f(f(a, X), a) = 1 + 3 + 1
        let t2 = store.app(f, vec![t, ta]);
        assert_eq!(store.weight(t2), 5);
    }

    #[test]
    fn test_ground_flag() {
        let (mut store, _interner, f, a) = store_with_symbols();
        let ta = store.constant(a);
        let x = store.var(0);
        let ground = store.app(f, vec![ta, ta]);
        let open = store.app(f, vec![ta, x]);
        assert!(store.is_ground(ground));
        assert!(!store.is_ground(open));
    }

    #[test]
    fn test_distinct_vars_lazy() {
        let (mut store, _interner, f, _a) = store_with_symbols();
        let x = store.var(0);
        let y = store.var(1);
        let t = store.app(f, vec![x, y]);
        let t2 = store.app(f, vec![t, x]);
        assert_eq!(store.var_occurrences(t2), 3);
        assert_eq!(store.distinct_vars(t2), 2);
        // Second call hits the cache
        assert_eq!(store.distinct_vars(t2), 2);
    }

    #[test]
    fn test_special_vars_disjoint() {
        let mut store = TermStore::new();
        let v = store.var(3);
        let s = store.special_var(3);
        assert_ne!(v, s);
    }

    #[test]
    fn test_replace() {
        let (mut store, _interner, f, a) = store_with_symbols();
        let ta = store.constant(a);
        let x = store.var(0);
        let fxa = store.app(f, vec![x, ta]);
        let replaced = store.replace(fxa, x, ta);
        let expected = store.app(f, vec![ta, ta]);
        assert_eq!(replaced, expected);
    }
}
