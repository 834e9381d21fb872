//! Discrimination tree indices
//!
//! Literals are indexed in a trie keyed by their header followed by the
//! preorder traversal of their arguments, with variables flattened to a
//! wildcard. Retrieval supports three modes: unification candidates
//! (wildcards match on both sides), generalisations (stored wildcards
//! match query subterms), and instances (query variables match stored
//! subterms). The tree is a pre-filter: callers finish candidates with
//! real unification or matching, so a returned literal may still fail.
//! Every stored literal is returned at most once per query.
//!
//! A term-keyed variant of the same trie indexes the left-hand sides of
//! rewrite rules for demodulation.

use crate::fol::{FunctionId, LiteralId, Term, TermId, TermStore};
use std::collections::BTreeMap;

/// Key type for a single node in the flattened preorder traversal.
/// Ordered so trie iteration (and hence retrieval order) is
/// deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum FlatKey {
    /// Function symbol (arity drives skip counts during wildcard traversal)
    App(FunctionId, u8),
    /// Any variable (ordinary or special)
    Star,
}

#[derive(Debug)]
struct TrieNode<E> {
    children: BTreeMap<FlatKey, TrieNode<E>>,
    entries: Vec<E>,
}

impl<E> Default for TrieNode<E> {
    fn default() -> Self {
        TrieNode {
            children: BTreeMap::new(),
            entries: Vec::new(),
        }
    }
}

fn flatten_term(store: &TermStore, term: TermId, keys: &mut Vec<FlatKey>) {
    match store.term(term) {
        Term::Var(_) | Term::SpecialVar(_) => keys.push(FlatKey::Star),
        Term::App(f, args) => {
            keys.push(FlatKey::App(*f, args.len() as u8));
            for &arg in args {
                flatten_term(store, arg, keys);
            }
        }
    }
}

/// Number of flat keys the subterm starting at `pos` occupies.
fn subterm_size(keys: &[FlatKey], pos: usize) -> usize {
    match keys[pos] {
        FlatKey::Star => 1,
        FlatKey::App(_, arity) => {
            let mut size = 1;
            for _ in 0..arity {
                size += subterm_size(keys, pos + size);
            }
            size
        }
    }
}

/// Walk past one stored subterm in the trie, collecting every node that
/// can follow it.
fn skip_stored_subterm<'a, E>(node: &'a TrieNode<E>, out: &mut Vec<&'a TrieNode<E>>) {
    for (key, child) in &node.children {
        match key {
            FlatKey::Star => out.push(child),
            FlatKey::App(_, arity) => {
                let mut frontier = vec![child];
                for _ in 0..*arity {
                    let mut next = Vec::new();
                    for n in frontier {
                        skip_stored_subterm(n, &mut next);
                    }
                    frontier = next;
                }
                out.extend(frontier);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetrievalMode {
    Unifiable,
    Generalisations,
    Instances,
}

/// Literal index over headers and argument structure.
#[derive(Debug, Default)]
pub struct LiteralIndex {
    roots: BTreeMap<u32, TrieNode<(LiteralId, usize)>>,
    len: usize,
}

impl LiteralIndex {
    pub fn new() -> Self {
        LiteralIndex {
            roots: BTreeMap::new(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn key_path(store: &TermStore, lit: LiteralId) -> Vec<FlatKey> {
        let mut keys = Vec::new();
        for &arg in store.lit(lit).args {
            flatten_term(store, arg, &mut keys);
        }
        keys
    }

    /// Insert a literal occurrence. Inserting the same (literal, clause)
    /// pair twice is a no-op.
    pub fn insert(&mut self, store: &TermStore, lit: LiteralId, clause: usize) {
        let header = store.header(lit);
        let keys = Self::key_path(store, lit);
        let mut node = self.roots.entry(header).or_default();
        for key in keys {
            node = node.children.entry(key).or_default();
        }
        if !node.entries.contains(&(lit, clause)) {
            node.entries.push((lit, clause));
            self.len += 1;
        }
    }

    /// Remove a literal occurrence previously inserted.
    pub fn remove(&mut self, store: &TermStore, lit: LiteralId, clause: usize) {
        let header = store.header(lit);
        let keys = Self::key_path(store, lit);
        let Some(mut node) = self.roots.get_mut(&header) else {
            return;
        };
        for key in keys {
            match node.children.get_mut(&key) {
                Some(child) => node = child,
                None => return,
            }
        }
        if let Some(pos) = node.entries.iter().position(|&e| e == (lit, clause)) {
            node.entries.remove(pos);
            self.len -= 1;
        }
    }

    fn retrieve(
        &self,
        store: &TermStore,
        query: LiteralId,
        complementary: bool,
        mode: RetrievalMode,
    ) -> Vec<(LiteralId, usize)> {
        let header = if complementary {
            store.complementary_header(query)
        } else {
            store.header(query)
        };
        let Some(root) = self.roots.get(&header) else {
            return Vec::new();
        };
        let mut keys = Vec::new();
        for &arg in store.lit(query).args {
            flatten_term(store, arg, &mut keys);
        }
        let mut results = Vec::new();
        retrieve_rec(root, &keys, 0, mode, &mut results);
        results
    }

    /// Candidates that may unify with the query (or its complement).
    pub fn unifiable(
        &self,
        store: &TermStore,
        query: LiteralId,
        complementary: bool,
    ) -> Vec<(LiteralId, usize)> {
        self.retrieve(store, query, complementary, RetrievalMode::Unifiable)
    }

    /// Candidates that may generalise the query.
    pub fn generalisations(
        &self,
        store: &TermStore,
        query: LiteralId,
        complementary: bool,
    ) -> Vec<(LiteralId, usize)> {
        self.retrieve(store, query, complementary, RetrievalMode::Generalisations)
    }

    /// Candidates that may be instances of the query.
    pub fn instances(
        &self,
        store: &TermStore,
        query: LiteralId,
        complementary: bool,
    ) -> Vec<(LiteralId, usize)> {
        self.retrieve(store, query, complementary, RetrievalMode::Instances)
    }

    /// All stored entries, in trie order.
    pub fn all(&self) -> Vec<(LiteralId, usize)> {
        let mut out = Vec::new();
        for root in self.roots.values() {
            collect_all(root, &mut out);
        }
        out
    }
}

fn collect_all<E: Copy>(node: &TrieNode<E>, out: &mut Vec<E>) {
    out.extend(node.entries.iter().copied());
    for child in node.children.values() {
        collect_all(child, out);
    }
}

fn retrieve_rec<E: Copy>(
    node: &TrieNode<E>,
    keys: &[FlatKey],
    pos: usize,
    mode: RetrievalMode,
    results: &mut Vec<E>,
) {
    if pos == keys.len() {
        results.extend(node.entries.iter().copied());
        return;
    }
    let key = keys[pos];

    match key {
        FlatKey::App(..) => {
            // Exact symbol match
            if let Some(child) = node.children.get(&key) {
                retrieve_rec(child, keys, pos + 1, mode, results);
            }
            // A stored wildcard swallows this query subterm
            if mode != RetrievalMode::Instances {
                if let Some(star) = node.children.get(&FlatKey::Star) {
                    let skip = subterm_size(keys, pos);
                    retrieve_rec(star, keys, pos + skip, mode, results);
                }
            }
        }
        FlatKey::Star => {
            // A query variable matches a stored wildcard
            if let Some(star) = node.children.get(&FlatKey::Star) {
                retrieve_rec(star, keys, pos + 1, mode, results);
            }
            // ... and, unless we ask for generalisations only, any stored
            // subterm
            if mode != RetrievalMode::Generalisations {
                let mut landings = Vec::new();
                for (child_key, child) in &node.children {
                    match child_key {
                        FlatKey::Star => {}
                        FlatKey::App(_, arity) => {
                            let mut frontier = vec![child];
                            for _ in 0..*arity {
                                let mut next = Vec::new();
                                for n in frontier {
                                    skip_stored_subterm(n, &mut next);
                                }
                                frontier = next;
                            }
                            landings.extend(frontier);
                        }
                    }
                }
                for landing in landings {
                    retrieve_rec(landing, keys, pos + 1, mode, results);
                }
            }
        }
    }
}

// =============================================================================
// Rewrite index (term-keyed)
// =============================================================================

/// Index of rewrite rule left-hand sides for demodulation: maps query
/// subterms to candidate unit equalities whose lhs may generalise them.
#[derive(Debug, Default)]
pub struct RewriteIndex {
    root: TrieNode<(usize, TermId)>,
    len: usize,
}

/// Entry of the rewrite index: the oriented equality `lhs -> rhs` of the
/// unit clause at `clause`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteRule {
    pub clause: usize,
    pub lhs: TermId,
    pub rhs: TermId,
}

impl RewriteIndex {
    pub fn new() -> Self {
        RewriteIndex::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, store: &TermStore, rule: RewriteRule) {
        let mut keys = Vec::new();
        flatten_term(store, rule.lhs, &mut keys);
        let mut node = &mut self.root;
        for key in keys {
            node = node.children.entry(key).or_default();
        }
        let entry = (rule.clause, rule.rhs);
        if !node.entries.contains(&entry) {
            node.entries.push(entry);
            self.len += 1;
        }
    }

    pub fn remove(&mut self, store: &TermStore, rule: RewriteRule) {
        let mut keys = Vec::new();
        flatten_term(store, rule.lhs, &mut keys);
        let mut node = &mut self.root;
        for key in keys {
            match node.children.get_mut(&key) {
                Some(child) => node = child,
                None => return,
            }
        }
        let entry = (rule.clause, rule.rhs);
        if let Some(pos) = node.entries.iter().position(|&e| e == entry) {
            node.entries.remove(pos);
            self.len -= 1;
        }
    }

    /// Rules whose lhs may generalise the query term.
    pub fn generalisations(&self, store: &TermStore, query: TermId) -> Vec<(usize, TermId)> {
        let mut keys = Vec::new();
        flatten_term(store, query, &mut keys);
        let mut results = Vec::new();
        retrieve_rec(
            &self.root,
            &keys,
            0,
            RetrievalMode::Generalisations,
            &mut results,
        );
        results
    }
}
