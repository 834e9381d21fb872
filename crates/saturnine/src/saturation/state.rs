//! Saturation state and rule interfaces
//!
//! `SaturationState` holds the clause arena and the three clause
//! collections of the given-clause algorithm: `unprocessed` (FIFO of new
//! clauses awaiting forward simplification and splitting), `passive`
//! (clauses awaiting selection), and `active` (clauses participating in
//! generating inferences). The algorithm itself lives in `Prover`.

use crate::fol::{Clause, Interner, LiteralId, TermOrdering, TermStore};
use crate::index::{LiteralIndex, RewriteIndex};
use crate::inference::Rule;
use crate::selection::LiteralSelection;
use indexmap::IndexSet;
use std::collections::VecDeque;

/// Clause sets of the given-clause algorithm.
#[derive(Default)]
pub struct SaturationState {
    /// Arena of all clauses ever created, indexed by clause id
    pub clauses: Vec<Clause>,
    /// New clauses awaiting forward simplification and splitting (FIFO)
    pub unprocessed: VecDeque<usize>,
    /// Clauses awaiting selection as given clause
    pub passive: IndexSet<usize>,
    /// Clauses registered in the generating indices
    pub active: IndexSet<usize>,
}

impl SaturationState {
    pub fn new() -> Self {
        SaturationState::default()
    }

    pub fn clause(&self, idx: usize) -> &Clause {
        &self.clauses[idx]
    }
}

/// Shared retrieval indices maintained by the loop.
#[derive(Default)]
pub struct SaturationIndices {
    /// Selected literals of active clauses
    pub active_literals: LiteralIndex,
    /// Oriented unconditional unit equalities for demodulation
    pub rewrites: RewriteIndex,
}

/// Mutable context threaded through every inference rule.
pub struct RuleContext<'a> {
    pub store: &'a mut TermStore,
    pub interner: &'a Interner,
    pub ordering: &'a TermOrdering,
    pub selection: LiteralSelection,
}

/// A conclusion produced by a generating rule, before it is interned
/// into the clause arena.
#[derive(Debug, Clone)]
pub struct NewClause {
    pub literals: Vec<LiteralId>,
    pub rule: Rule,
    pub parents: Vec<usize>,
}

/// Why a clause was deleted outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionReason {
    SimpleTautology,
    EquationalTautology,
    ForwardSubsumed,
    BackwardSubsumed,
}

/// Outcome of a simplifying rule on a target clause.
#[derive(Debug, Clone)]
pub enum Simplification {
    /// The target clause is redundant and is dropped
    Delete {
        target: usize,
        reason: DeletionReason,
    },
    /// The target clause is replaced by a simpler one
    Replace {
        target: usize,
        literals: Vec<LiteralId>,
        rule: Rule,
        premises: Vec<usize>,
    },
}

/// A generating inference rule of the superposition calculus.
pub trait GeneratingRule {
    fn name(&self) -> &'static str;

    /// Produce all conclusions between the given clause and the active
    /// set reachable through the indices.
    fn generate(
        &self,
        given: usize,
        state: &SaturationState,
        ctx: &mut RuleContext,
        indices: &SaturationIndices,
    ) -> Vec<NewClause>;
}

/// A simplifying (or deleting) inference rule.
pub trait SimplifyingRule {
    fn name(&self) -> &'static str;

    /// Simplify a new clause against the current clause sets. Returns
    /// the first applicable simplification, if any.
    fn simplify_forward(
        &self,
        target: usize,
        state: &SaturationState,
        ctx: &mut RuleContext,
        indices: &SaturationIndices,
    ) -> Option<Simplification>;

    /// Use a freshly activated clause to simplify older clauses.
    fn simplify_backward(
        &self,
        _new_active: usize,
        _state: &SaturationState,
        _ctx: &mut RuleContext,
        _indices: &SaturationIndices,
    ) -> Vec<Simplification> {
        Vec::new()
    }
}
