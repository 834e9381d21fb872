//! Clause variant index
//!
//! Two clauses are variants iff they are equal up to variable renaming.
//! The index buckets clauses by a cheap shape key (sorted literal headers
//! and weights) and verifies candidates with an exact variance check:
//! a backtracking literal alignment under an injective variable renaming.
//! Used by the splitter to recognise already-known components.

use crate::fol::{Clause, LiteralId, Term, TermId, TermStore};
use std::collections::HashMap;

/// Shape key: multiset of (header, weight) pairs, sorted.
type ShapeKey = Vec<(u32, u32)>;

fn shape_key(store: &TermStore, literals: &[LiteralId]) -> ShapeKey {
    let mut key: Vec<(u32, u32)> = literals
        .iter()
        .map(|&l| (store.header(l), store.literal_weight(l)))
        .collect();
    key.sort_unstable();
    key
}

/// Injective variable renaming accumulated during a variance check.
#[derive(Debug, Default)]
struct Renaming {
    forward: HashMap<u32, u32>,
    backward: HashMap<u32, u32>,
    trail: Vec<(u32, u32)>,
}

impl Renaming {
    fn checkpoint(&self) -> usize {
        self.trail.len()
    }

    fn rollback_to(&mut self, mark: usize) {
        while self.trail.len() > mark {
            let (a, b) = self.trail.pop().unwrap();
            self.forward.remove(&a);
            self.backward.remove(&b);
        }
    }

    fn pair(&mut self, a: u32, b: u32) -> bool {
        match (self.forward.get(&a), self.backward.get(&b)) {
            (Some(&fb), Some(&ba)) => fb == b && ba == a,
            (None, None) => {
                self.forward.insert(a, b);
                self.backward.insert(b, a);
                self.trail.push((a, b));
                true
            }
            _ => false,
        }
    }
}

fn terms_variant(store: &TermStore, s: TermId, t: TermId, renaming: &mut Renaming) -> bool {
    match (store.term(s), store.term(t)) {
        (Term::Var(a), Term::Var(b)) => renaming.pair(*a, *b),
        (Term::SpecialVar(a), Term::SpecialVar(b)) => a == b,
        (Term::App(f, args_s), Term::App(g, args_t)) => {
            f == g
                && args_s.len() == args_t.len()
                && args_s
                    .iter()
                    .zip(args_t.iter())
                    .all(|(&a, &b)| terms_variant(store, a, b, renaming))
        }
        _ => false,
    }
}

fn literals_variant(store: &TermStore, a: LiteralId, b: LiteralId, renaming: &mut Renaming) -> bool {
    let la = store.lit(a);
    let lb = store.lit(b);
    if la.predicate != lb.predicate || la.polarity != lb.polarity || la.args.len() != lb.args.len()
    {
        return false;
    }
    la.args
        .iter()
        .zip(lb.args.iter())
        .all(|(&s, &t)| terms_variant(store, s, t, renaming))
}

/// Check whether two literal multisets are variants of each other.
pub fn are_variants(store: &TermStore, a: &[LiteralId], b: &[LiteralId]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut renaming = Renaming::default();
    let mut used = vec![false; b.len()];
    align(store, a, b, 0, &mut used, &mut renaming)
}

fn align(
    store: &TermStore,
    a: &[LiteralId],
    b: &[LiteralId],
    i: usize,
    used: &mut [bool],
    renaming: &mut Renaming,
) -> bool {
    if i == a.len() {
        return true;
    }
    for j in 0..b.len() {
        if used[j] {
            continue;
        }
        let mark = renaming.checkpoint();
        if literals_variant(store, a[i], b[j], renaming) {
            used[j] = true;
            if align(store, a, b, i + 1, used, renaming) {
                return true;
            }
            used[j] = false;
        }
        renaming.rollback_to(mark);
    }
    false
}

/// Index of clauses retrievable up to variable renaming.
#[derive(Debug, Default)]
pub struct VariantIndex {
    buckets: HashMap<ShapeKey, Vec<usize>>,
    len: usize,
}

impl VariantIndex {
    pub fn new() -> Self {
        VariantIndex::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a clause under its shape key.
    pub fn insert(&mut self, store: &TermStore, clause_idx: usize, clause: &Clause) {
        let key = shape_key(store, &clause.literals);
        self.buckets.entry(key).or_default().push(clause_idx);
        self.len += 1;
    }

    /// Find the clause (if any) whose literals are a variant of `literals`.
    pub fn retrieve_variant(
        &self,
        store: &TermStore,
        clauses: &[Clause],
        literals: &[LiteralId],
    ) -> Option<usize> {
        let key = shape_key(store, literals);
        let bucket = self.buckets.get(&key)?;
        bucket
            .iter()
            .copied()
            .find(|&idx| are_variants(store, &clauses[idx].literals, literals))
    }
}
