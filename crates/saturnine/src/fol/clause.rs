//! Clauses
//!
//! A clause is a multiset of shared literals together with its input
//! type, its propositional part (a BDD node: `FALSE` means the clause is
//! unconditional, `TRUE` means it is vacuous), the set of split levels it
//! depends on, and bookkeeping for selection and clause ordering. The
//! derivation of every clause is recorded in the `InferenceStore` under
//! the clause's arena index.

use super::interner::Interner;
use super::literal::LiteralId;
use super::term::TermStore;
use crate::prop::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// How a clause entered the problem.
///
/// The ordering is significant: a derived clause inherits the maximum of
/// its parents' input types, so conjecture-descendants stay recognisable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum InputType {
    #[default]
    Axiom,
    Hypothesis,
    Assumption,
    Conjecture,
    NegatedConjecture,
}

impl InputType {
    pub fn from_tptp_role(role: &str) -> Self {
        match role {
            "hypothesis" => InputType::Hypothesis,
            "assumption" => InputType::Assumption,
            "conjecture" => InputType::Conjecture,
            "negated_conjecture" => InputType::NegatedConjecture,
            _ => InputType::Axiom,
        }
    }

    pub fn tptp_role(&self) -> &'static str {
        match self {
            InputType::Axiom => "axiom",
            InputType::Hypothesis => "hypothesis",
            InputType::Assumption => "assumption",
            InputType::Conjecture => "conjecture",
            InputType::NegatedConjecture => "negated_conjecture",
        }
    }
}

/// A clause (disjunction of shared literals plus its propositional guard).
#[derive(Debug, Clone)]
pub struct Clause {
    pub literals: Vec<LiteralId>,
    pub id: Option<usize>,
    pub input_type: InputType,
    /// BDD node under whose falsity the clause holds; `FALSE` means
    /// unconditional, `TRUE` means the clause carries no obligation.
    pub prop: NodeId,
    /// Split levels this clause depends on.
    pub splits: BTreeSet<u32>,
    /// Iteration at which the clause was created (0 for input clauses).
    pub age: u32,
    /// Symbol count, cached at construction.
    pub weight: u32,
    /// Literal selection bitmap, bit i = literal i selected.
    /// 0 until selection runs on activation.
    pub selected: u64,
}

impl Clause {
    /// Create a new unconditional clause from literals.
    pub fn new(literals: Vec<LiteralId>, store: &TermStore) -> Self {
        let weight = literals.iter().map(|&l| store.literal_weight(l)).sum();
        Clause {
            literals,
            id: None,
            input_type: InputType::default(),
            prop: NodeId::FALSE,
            splits: BTreeSet::new(),
            age: 0,
            weight,
            selected: 0,
        }
    }

    pub fn with_input_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// The empty refutation: no literals and an unconditional guard.
    pub fn is_refutation(&self) -> bool {
        self.literals.is_empty() && self.prop == NodeId::FALSE
    }

    /// Indices of selected literals according to the bitmap; all literals
    /// if selection has not run yet.
    pub fn selected_indices(&self) -> Vec<usize> {
        if self.selected == 0 {
            (0..self.literals.len()).collect()
        } else {
            (0..self.literals.len().min(64))
                .filter(|i| self.selected & (1 << i) != 0)
                .collect()
        }
    }

    /// Collect all ordinary variables of the clause.
    pub fn collect_vars(&self, store: &TermStore, vars: &mut std::collections::HashSet<u32>) {
        for &lit in &self.literals {
            for &arg in store.lit(lit).args {
                store.collect_vars(arg, vars);
            }
        }
    }

    /// Format this clause with store and interner for name resolution.
    pub fn display<'a>(&'a self, store: &'a TermStore, interner: &'a Interner) -> ClauseDisplay<'a> {
        ClauseDisplay {
            clause: self,
            store,
            interner,
        }
    }
}

/// Display wrapper for clauses.
pub struct ClauseDisplay<'a> {
    clause: &'a Clause,
    store: &'a TermStore,
    interner: &'a Interner,
}

impl<'a> fmt::Display for ClauseDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clause.is_empty() {
            write!(f, "$false")
        } else {
            for (i, &lit) in self.clause.literals.iter().enumerate() {
                if i > 0 {
                    write!(f, " | ")?;
                }
                write!(f, "{}", self.store.display_literal(lit, self.interner))?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fol::PredicateId;

    #[test]
    fn test_input_type_max() {
        assert!(InputType::NegatedConjecture > InputType::Axiom);
        assert_eq!(
            InputType::Axiom.max(InputType::NegatedConjecture),
            InputType::NegatedConjecture
        );
    }

    #[test]
    fn test_clause_weight_and_refutation() {
        let mut store = TermStore::new();
        let interner = Interner::new();
        let x = store.var(0);
        let y = store.var(1);
        let lit = store.literal(&interner, PredicateId::EQUALITY, true, vec![x, y]);

        let clause = Clause::new(vec![lit], &store);
        assert_eq!(clause.weight, 3);
        assert!(!clause.is_refutation());

        let empty = Clause::new(vec![], &store);
        assert!(empty.is_refutation());

        let mut guarded = Clause::new(vec![], &store);
        guarded.prop = NodeId::TRUE;
        assert!(!guarded.is_refutation());
    }

    #[test]
    fn test_selected_indices_default_all() {
        let mut store = TermStore::new();
        let mut interner = Interner::new();
        let p = interner.intern_predicate("p", 0);
        let q = interner.intern_predicate("q", 0);
        let lp = store.literal(&interner, p, true, vec![]);
        let lq = store.literal(&interner, q, true, vec![]);

        let mut clause = Clause::new(vec![lp, lq], &store);
        assert_eq!(clause.selected_indices(), vec![0, 1]);

        clause.selected = 0b10;
        assert_eq!(clause.selected_indices(), vec![1]);
    }
}
