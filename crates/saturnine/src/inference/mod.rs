//! The inference store: a DAG of derivations
//!
//! Every unit (clause or input formula) owns exactly one inference
//! record naming its rule and ordered parents; leaves are input units.
//! Side tables keep per-rule metadata needed for proof reconstruction:
//! propositional-part alterations, splitting events, and variant merges.
//! Units are arena-indexed and live as long as the prover, so the store
//! needs no reference counting.

use crate::prop::NodeId;
use serde::Serialize;
use std::collections::HashMap;

/// Identity of a unit in the derivation DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnitId {
    /// Index into the clause arena
    Clause(usize),
    /// Index into the input formula list
    Formula(usize),
}

/// Inference rules known to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Rule {
    Input,
    Axiom,
    NegatedConjecture,
    Clausify,
    AnswerLiteral,
    Resolution,
    Factoring,
    ForwardSuperposition,
    BackwardSuperposition,
    SelfSuperposition,
    EqualityResolution,
    EqualityFactoring,
    ForwardDemodulation,
    BackwardDemodulation,
    ForwardSubsumptionResolution,
    BackwardSubsumptionResolution,
    DuplicateLiteralRemoval,
    TrivialInequalityRemoval,
    TautologyIntroduction,
    ClauseNaming,
    Splitting,
    UnitResultingResolution,
}

impl Rule {
    /// TPTP-style rule name used in derivation output.
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Input => "input",
            Rule::Axiom => "axiom",
            Rule::NegatedConjecture => "negated_conjecture",
            Rule::Clausify => "clausify",
            Rule::AnswerLiteral => "answer_literal",
            Rule::Resolution => "resolution",
            Rule::Factoring => "factoring",
            Rule::ForwardSuperposition => "forward_superposition",
            Rule::BackwardSuperposition => "backward_superposition",
            Rule::SelfSuperposition => "self_superposition",
            Rule::EqualityResolution => "equality_resolution",
            Rule::EqualityFactoring => "equality_factoring",
            Rule::ForwardDemodulation => "forward_demodulation",
            Rule::BackwardDemodulation => "backward_demodulation",
            Rule::ForwardSubsumptionResolution => "forward_subsumption_resolution",
            Rule::BackwardSubsumptionResolution => "backward_subsumption_resolution",
            Rule::DuplicateLiteralRemoval => "duplicate_literal_removal",
            Rule::TrivialInequalityRemoval => "trivial_inequality_removal",
            Rule::TautologyIntroduction => "tautology_introduction",
            Rule::ClauseNaming => "clause_naming",
            Rule::Splitting => "splitting",
            Rule::UnitResultingResolution => "unit_resulting_resolution",
        }
    }

    /// Rules whose conclusions may stand without parents: inputs,
    /// axioms, and the parentless introductions of splitting and answer
    /// extraction (component interning, naming premises, resolver
    /// clauses).
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Rule::Input
                | Rule::Axiom
                | Rule::TautologyIntroduction
                | Rule::ClauseNaming
                | Rule::AnswerLiteral
        )
    }
}

/// One derivation record.
#[derive(Debug, Clone)]
pub struct InferenceRecord {
    pub rule: Rule,
    pub parents: Vec<UnitId>,
}

/// Record of a propositional-part change on a clause.
#[derive(Debug, Clone, Copy)]
pub struct PropAlteration {
    pub old_prop: NodeId,
    pub new_prop: NodeId,
    pub rule: Rule,
}

/// Record of a splitting step: the master clause, the naming premises,
/// and the propositional part before and after.
#[derive(Debug, Clone)]
pub struct SplitEvent {
    pub clause: usize,
    pub premises: Vec<usize>,
    pub old_prop: NodeId,
    pub new_prop: NodeId,
}

/// Record of a variant merge: `clause` absorbed the propositional part
/// of `merged_with`.
#[derive(Debug, Clone, Copy)]
pub struct MergeEvent {
    pub clause: usize,
    pub merged_with: usize,
    pub old_prop: NodeId,
    pub new_prop: NodeId,
}

/// The derivation DAG plus its side tables.
#[derive(Debug, Default)]
pub struct InferenceStore {
    records: HashMap<UnitId, InferenceRecord>,
    prop_alterations: HashMap<usize, Vec<PropAlteration>>,
    split_events: Vec<SplitEvent>,
    merge_events: Vec<MergeEvent>,
}

impl InferenceStore {
    pub fn new() -> Self {
        InferenceStore::default()
    }

    /// Record the inference that produced a unit. A derived unit must
    /// name at least one parent; leaves must name none.
    pub fn record(&mut self, unit: UnitId, rule: Rule, parents: Vec<UnitId>) {
        debug_assert!(
            rule.is_leaf() || !parents.is_empty(),
            "derived unit without parents"
        );
        debug_assert!(
            !self.records.contains_key(&unit),
            "unit already has an inference"
        );
        self.records.insert(unit, InferenceRecord { rule, parents });
    }

    pub fn get(&self, unit: UnitId) -> Option<&InferenceRecord> {
        self.records.get(&unit)
    }

    pub fn rule(&self, unit: UnitId) -> Option<Rule> {
        self.records.get(&unit).map(|r| r.rule)
    }

    pub fn record_prop_alteration(
        &mut self,
        clause: usize,
        old_prop: NodeId,
        new_prop: NodeId,
        rule: Rule,
    ) {
        self.prop_alterations
            .entry(clause)
            .or_default()
            .push(PropAlteration {
                old_prop,
                new_prop,
                rule,
            });
    }

    pub fn record_splitting(
        &mut self,
        clause: usize,
        premises: Vec<usize>,
        old_prop: NodeId,
        new_prop: NodeId,
    ) {
        self.split_events.push(SplitEvent {
            clause,
            premises,
            old_prop,
            new_prop,
        });
    }

    pub fn record_merge(
        &mut self,
        clause: usize,
        merged_with: usize,
        old_prop: NodeId,
        new_prop: NodeId,
    ) {
        self.merge_events.push(MergeEvent {
            clause,
            merged_with,
            old_prop,
            new_prop,
        });
    }

    pub fn prop_alterations(&self, clause: usize) -> &[PropAlteration] {
        self.prop_alterations
            .get(&clause)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn split_events(&self) -> &[SplitEvent] {
        &self.split_events
    }

    pub fn merge_events(&self) -> &[MergeEvent] {
        &self.merge_events
    }

    /// All units reachable from `unit` through parent edges, including
    /// `unit` itself, in a parent-before-child topological order.
    pub fn ancestors(&self, unit: UnitId) -> Vec<UnitId> {
        let mut order = Vec::new();
        let mut seen = std::collections::HashSet::new();
        self.visit(unit, &mut seen, &mut order);
        order
    }

    fn visit(
        &self,
        unit: UnitId,
        seen: &mut std::collections::HashSet<UnitId>,
        order: &mut Vec<UnitId>,
    ) {
        if !seen.insert(unit) {
            return;
        }
        if let Some(record) = self.records.get(&unit) {
            for &parent in &record.parents {
                self.visit(parent, seen, order);
            }
        }
        order.push(unit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_lookup() {
        let mut store = InferenceStore::new();
        store.record(UnitId::Clause(0), Rule::Input, vec![]);
        store.record(UnitId::Clause(1), Rule::Input, vec![]);
        store.record(
            UnitId::Clause(2),
            Rule::Resolution,
            vec![UnitId::Clause(0), UnitId::Clause(1)],
        );

        let record = store.get(UnitId::Clause(2)).unwrap();
        assert_eq!(record.rule, Rule::Resolution);
        assert_eq!(record.parents.len(), 2);
        assert_eq!(store.rule(UnitId::Clause(0)), Some(Rule::Input));
    }

    #[test]
    fn test_ancestors_topological() {
        let mut store = InferenceStore::new();
        store.record(UnitId::Clause(0), Rule::Input, vec![]);
        store.record(UnitId::Clause(1), Rule::Input, vec![]);
        store.record(
            UnitId::Clause(2),
            Rule::Resolution,
            vec![UnitId::Clause(0), UnitId::Clause(1)],
        );
        store.record(
            UnitId::Clause(3),
            Rule::Factoring,
            vec![UnitId::Clause(2)],
        );

        let order = store.ancestors(UnitId::Clause(3));
        assert_eq!(order.len(), 4);
        let pos =
            |u: UnitId| order.iter().position(|&x| x == u).unwrap();
        assert!(pos(UnitId::Clause(0)) < pos(UnitId::Clause(2)));
        assert!(pos(UnitId::Clause(1)) < pos(UnitId::Clause(2)));
        assert!(pos(UnitId::Clause(2)) < pos(UnitId::Clause(3)));
    }

    #[test]
    fn test_side_tables() {
        let mut store = InferenceStore::new();
        store.record_prop_alteration(5, NodeId::FALSE, NodeId::TRUE, Rule::ClauseNaming);
        store.record_splitting(5, vec![1, 2], NodeId::FALSE, NodeId::TRUE);
        store.record_merge(5, 6, NodeId::FALSE, NodeId::TRUE);

        assert_eq!(store.prop_alterations(5).len(), 1);
        assert_eq!(store.prop_alterations(9).len(), 0);
        assert_eq!(store.split_events().len(), 1);
        assert_eq!(store.merge_events()[0].merged_with, 6);
    }
}
