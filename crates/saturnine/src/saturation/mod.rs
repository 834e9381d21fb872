//! The given-clause saturation loop
//!
//! `Prover` drives the three-collection schedule: drain `unprocessed`
//! through forward simplification and splitting, promote survivors to
//! `passive`, pick a given clause by the age/weight ratio, activate it
//! in the indices, run backward simplifications and the generating
//! rules, and check limits. Deriving the empty clause with an
//! unconditional guard is a structured return, not an error.

pub mod state;

pub use state::{
    DeletionReason, GeneratingRule, NewClause, RuleContext, SaturationIndices, SaturationState,
    Simplification, SimplifyingRule,
};

use crate::answer::AnswerLiteralManager;
use crate::config::{process_memory_mb, OrderingKind, ProverConfig, SplitMode};
use crate::fol::{orient_equalities, Clause, InputType, Interner, KboConfig, TermOrdering, TermStore};
use crate::generating::{
    EqualityFactoringRule, EqualityResolutionRule, FactoringRule, ResolutionRule,
    SuperpositionRule,
};
use crate::index::RewriteRule;
use crate::inference::{InferenceStore, Rule, UnitId};
use crate::parser::{clausify_problem, FormulaUnit, Problem};
use crate::prop::Bdd;
use crate::selection::AgeWeightQueue;
use crate::simplifying::{DemodulationRule, SubsumptionRule, TautologyRule};
use crate::splitting::{SplitContext, Splitter};
use crate::stats::{ExecutionPhase, Statistics, TerminationReason};
use log::{debug, info};
use std::collections::HashMap;
use std::time::Instant;

/// How the saturation loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The empty clause with an unconditional guard (arena index)
    Refutation(usize),
    /// Passive and unprocessed drained without a refutation
    Saturated,
    TimeLimit,
    MemoryLimit,
    /// Clause or iteration limit reached
    ResourceLimit,
}

/// The saturation prover.
pub struct Prover {
    pub config: ProverConfig,
    pub store: TermStore,
    pub interner: Interner,
    pub bdd: Bdd,
    pub inferences: InferenceStore,
    pub stats: Statistics,
    pub state: SaturationState,
    /// Formula units kept for proof output and answer extraction
    pub formulas: Vec<FormulaUnit>,
    pub answers: AnswerLiteralManager,
    splitter: Splitter,
    ordering: TermOrdering,
    queue: AgeWeightQueue,
    indices: SaturationIndices,
    simplifiers: Vec<Box<dyn SimplifyingRule>>,
    generators: Vec<Box<dyn GeneratingRule>>,
    start: Option<Instant>,
}

impl Prover {
    /// Build a prover from a parsed problem: inject answer literals,
    /// clausify, orient equalities, and seed the clause sets.
    pub fn new(mut problem: Problem, mut config: ProverConfig) -> Self {
        if config.problem_name.is_empty() {
            config.problem_name = problem.name.clone();
        }
        let mut stats = Statistics::new();
        stats.phase = ExecutionPhase::Preprocessing;
        stats.input_clauses = problem.clauses.len() as u64;
        stats.input_formulas = problem
            .formulas
            .iter()
            .filter(|f| !f.superseded)
            .count() as u64;

        let mut answers = AnswerLiteralManager::new();
        answers.add_answer_literals(&mut problem);
        if answers.is_active() {
            // Answer capture needs unconditional guards; splitting would
            // fragment the support of the answer literals
            config.split_mode = SplitMode::Off;
        }
        clausify_problem(&mut problem);
        stats.initial_clauses = problem.clauses.len() as u64;

        let ordering = match config.ordering {
            OrderingKind::Kbo => TermOrdering::kbo(KboConfig::new()),
            OrderingKind::Lpo => TermOrdering::lpo(HashMap::new()),
        };

        let Problem {
            mut store,
            interner,
            mut clauses,
            formulas,
            inferences,
            ..
        } = problem;

        for clause in clauses.iter_mut() {
            orient_equalities(&mut store, &ordering, &mut clause.literals);
        }

        let mut state = SaturationState::new();
        for idx in 0..clauses.len() {
            state.unprocessed.push_back(idx);
        }
        state.clauses = clauses;

        let simplifiers: Vec<Box<dyn SimplifyingRule>> = vec![
            Box::new(TautologyRule::new()),
            Box::new(DemodulationRule::new()),
            Box::new(SubsumptionRule::new()),
        ];
        let generators: Vec<Box<dyn GeneratingRule>> = vec![
            Box::new(FactoringRule::new()),
            Box::new(EqualityResolutionRule::new()),
            Box::new(EqualityFactoringRule::new()),
            Box::new(ResolutionRule::new()),
            Box::new(SuperpositionRule::new()),
        ];

        Prover {
            queue: AgeWeightQueue::new(config.age_weight_ratio),
            config,
            store,
            interner,
            bdd: Bdd::new(),
            inferences,
            stats,
            state,
            formulas,
            answers,
            splitter: Splitter::new(),
            ordering,
            indices: SaturationIndices::default(),
            simplifiers,
            generators,
            start: None,
        }
    }

    /// Run saturation to completion and fill in the final statistics.
    pub fn prove(&mut self) -> Outcome {
        let outcome = self.run();
        self.stats.phase = ExecutionPhase::Finalization;
        self.stats.termination = match outcome {
            Outcome::Refutation(idx) => {
                self.stats.refutation = Some(idx);
                TerminationReason::Refutation
            }
            Outcome::Saturated => {
                if self.config.selection.is_complete() {
                    TerminationReason::Satisfiable
                } else {
                    TerminationReason::RefutationNotFound
                }
            }
            Outcome::TimeLimit => TerminationReason::TimeLimit,
            Outcome::MemoryLimit => TerminationReason::MemoryLimit,
            Outcome::ResourceLimit => TerminationReason::Unknown,
        };
        outcome
    }

    fn run(&mut self) -> Outcome {
        self.stats.phase = ExecutionPhase::Saturation;
        self.start = Some(Instant::now());
        info!(
            "saturation start: {} initial clauses",
            self.state.clauses.len()
        );

        loop {
            // Drain new clauses through simplification and splitting
            while let Some(idx) = self.state.unprocessed.pop_front() {
                if let Some(outcome) = self.process_new_clause(idx) {
                    return outcome;
                }
            }

            if let Some(outcome) = self.check_limits() {
                return outcome;
            }

            // Saturation test
            let Some(given) = self.queue.select() else {
                info!("saturated after {} iterations", self.stats.iterations);
                return Outcome::Saturated;
            };
            self.stats.iterations += 1;

            self.activate(given);
            debug!(
                "given clause {}: {}",
                given,
                self.state.clauses[given].display(&self.store, &self.interner)
            );

            // Backward simplification by the given clause
            let backward = self.backward_simplify(given);
            for change in backward {
                self.apply_backward(change);
            }

            // Generating inferences against the active set
            let conclusions = self.generate(given);
            for conclusion in conclusions {
                self.add_clause(conclusion);
            }
        }
    }

    /// Forward-simplify, capture, and split one new clause.
    /// Returns an outcome to abort the loop, `None` to continue.
    fn process_new_clause(&mut self, idx: usize) -> Option<Outcome> {
        if let Some(outcome) = self.check_limits() {
            return Some(outcome);
        }
        if self.bdd.is_true(self.state.clauses[idx].prop) {
            self.stats.discarded_vacuous += 1;
            return None;
        }

        let idx = self.forward_simplify(idx)?;

        if self.state.clauses[idx].is_refutation() {
            return Some(Outcome::Refutation(idx));
        }

        if let Some(refutation) = self.answers.on_new_clause(
            idx,
            &mut self.state.clauses,
            &mut self.store,
            &self.interner,
            &mut self.inferences,
        ) {
            self.stats.ur_resolution += 1;
            return Some(Outcome::Refutation(refutation));
        }

        if self.wants_split(idx) {
            let mut ctx = SplitContext {
                clauses: &mut self.state.clauses,
                store: &mut self.store,
                interner: &self.interner,
                bdd: &mut self.bdd,
                inferences: &mut self.inferences,
                stats: &mut self.stats,
            };
            let result = self.splitter.split(idx, &mut ctx);
            for &modified in &result.modified {
                if self.state.clauses[modified].is_refutation() {
                    return Some(Outcome::Refutation(modified));
                }
                self.reanimate(modified);
            }
            for &fresh in &result.new_clauses {
                if self.state.clauses[fresh].is_refutation() {
                    return Some(Outcome::Refutation(fresh));
                }
                self.promote(fresh);
            }
        } else {
            self.promote(idx);
        }
        None
    }

    fn wants_split(&self, idx: usize) -> bool {
        match self.config.split_mode {
            SplitMode::Off => false,
            SplitMode::Full => true,
            // Conditional empty clauses still need the variant merge,
            // and propositional units must reach their shared name
            SplitMode::Input => {
                let clause = &self.state.clauses[idx];
                clause.age == 0
                    || clause.is_empty()
                    || (clause.literals.len() == 1
                        && self.store.lit(clause.literals[0]).args.is_empty())
            }
        }
    }

    /// Run the forward simplification chain to a fixed point. Returns
    /// the surviving clause index, or `None` if the clause was deleted.
    fn forward_simplify(&mut self, mut idx: usize) -> Option<usize> {
        let simplifiers = std::mem::take(&mut self.simplifiers);
        let mut alive = true;
        'outer: loop {
            for rule in &simplifiers {
                let mut ctx = RuleContext {
                    store: &mut self.store,
                    interner: &self.interner,
                    ordering: &self.ordering,
                    selection: self.config.selection,
                };
                let Some(simplification) =
                    rule.simplify_forward(idx, &self.state, &mut ctx, &self.indices)
                else {
                    continue;
                };
                match simplification {
                    Simplification::Delete { reason, .. } => {
                        self.count_deletion(reason);
                        alive = false;
                        break 'outer;
                    }
                    Simplification::Replace {
                        literals,
                        rule,
                        premises,
                        ..
                    } => {
                        self.count_replacement(rule);
                        idx = self.intern_replacement(idx, literals, rule, premises);
                        continue 'outer;
                    }
                }
            }
            break;
        }
        self.simplifiers = simplifiers;
        alive.then_some(idx)
    }

    /// Collect backward simplifications triggered by a new active clause.
    fn backward_simplify(&mut self, given: usize) -> Vec<Simplification> {
        let simplifiers = std::mem::take(&mut self.simplifiers);
        let mut changes = Vec::new();
        for rule in &simplifiers {
            let mut ctx = RuleContext {
                store: &mut self.store,
                interner: &self.interner,
                ordering: &self.ordering,
                selection: self.config.selection,
            };
            changes.extend(rule.simplify_backward(given, &self.state, &mut ctx, &self.indices));
        }
        self.simplifiers = simplifiers;
        changes
    }

    fn apply_backward(&mut self, change: Simplification) {
        match change {
            Simplification::Delete { target, reason } => {
                self.count_deletion(reason);
                self.retire(target);
            }
            Simplification::Replace {
                target,
                literals,
                rule,
                premises,
            } => {
                self.count_replacement(rule);
                self.retire(target);
                let replacement = self.intern_replacement(target, literals, rule, premises);
                self.state.unprocessed.push_back(replacement);
            }
        }
    }

    /// Build the replacement clause of a simplification: guard and
    /// splits are inherited from all premises.
    fn intern_replacement(
        &mut self,
        target: usize,
        literals: Vec<crate::fol::LiteralId>,
        rule: Rule,
        premises: Vec<usize>,
    ) -> usize {
        let mut literals = literals;
        orient_equalities(&mut self.store, &self.ordering, &mut literals);

        let idx = self.state.clauses.len();
        let mut clause = Clause::new(literals, &self.store);
        clause.id = Some(idx);
        clause.age = self.state.clauses[target].age;
        let mut prop = self.state.clauses[target].prop;
        let mut input_type = InputType::Axiom;
        for &premise in &premises {
            prop = self.bdd.disjunction(prop, self.state.clauses[premise].prop);
            input_type = input_type.max(self.state.clauses[premise].input_type);
            for &split in &self.state.clauses[premise].splits {
                clause.splits.insert(split);
            }
        }
        clause.prop = prop;
        clause.input_type = input_type;
        self.state.clauses.push(clause);
        self.inferences.record(
            UnitId::Clause(idx),
            rule,
            premises.into_iter().map(UnitId::Clause).collect(),
        );
        idx
    }

    /// Intern a generating conclusion and queue it as unprocessed.
    fn add_clause(&mut self, conclusion: NewClause) {
        if conclusion.literals.len() > self.config.max_clause_size {
            return;
        }
        let NewClause {
            mut literals,
            rule,
            parents,
        } = conclusion;
        orient_equalities(&mut self.store, &self.ordering, &mut literals);

        let idx = self.state.clauses.len();
        let mut clause = Clause::new(literals, &self.store);
        clause.id = Some(idx);
        clause.age = self.stats.iterations as u32;
        let mut input_type = InputType::Axiom;
        let mut prop = crate::prop::NodeId::FALSE;
        for &parent in &parents {
            prop = self.bdd.disjunction(prop, self.state.clauses[parent].prop);
            input_type = input_type.max(self.state.clauses[parent].input_type);
            for &split in &self.state.clauses[parent].splits {
                clause.splits.insert(split);
            }
        }
        clause.prop = prop;
        clause.input_type = input_type;
        self.state.clauses.push(clause);
        self.inferences.record(
            UnitId::Clause(idx),
            rule,
            parents.into_iter().map(UnitId::Clause).collect(),
        );

        self.stats.generated_clauses += 1;
        match rule {
            Rule::Resolution => self.stats.resolution += 1,
            Rule::Factoring => self.stats.factoring += 1,
            Rule::ForwardSuperposition => self.stats.forward_superposition += 1,
            Rule::BackwardSuperposition => self.stats.backward_superposition += 1,
            Rule::SelfSuperposition => self.stats.self_superposition += 1,
            Rule::EqualityResolution => self.stats.equality_resolution += 1,
            Rule::EqualityFactoring => self.stats.equality_factoring += 1,
            Rule::UnitResultingResolution => self.stats.ur_resolution += 1,
            _ => {}
        }
        self.state.unprocessed.push_back(idx);
    }

    /// Move a clause into the passive collection.
    fn promote(&mut self, idx: usize) {
        if self.state.passive.contains(&idx) || self.state.active.contains(&idx) {
            return;
        }
        let clause = &self.state.clauses[idx];
        self.queue.insert(idx, clause.age, clause.weight);
        self.state.passive.insert(idx);
    }

    /// Remove a clause from passive/active and all indices.
    fn retire(&mut self, idx: usize) {
        self.queue.remove(idx);
        self.state.passive.shift_remove(&idx);
        if self.state.active.shift_remove(&idx) {
            self.deindex(idx);
        }
    }

    /// A split-modified clause re-enters processing.
    fn reanimate(&mut self, idx: usize) {
        self.retire(idx);
        self.state.unprocessed.push_back(idx);
    }

    /// Move the given clause from passive to active: compute literal
    /// selection and register it in the generating indices.
    fn activate(&mut self, given: usize) {
        self.state.passive.shift_remove(&given);
        let bitmap = self.config.selection.select(
            &self.store,
            &self.interner,
            &self.ordering,
            &self.state.clauses[given],
        );
        self.state.clauses[given].selected = bitmap;
        for i in self.state.clauses[given].selected_indices() {
            let lit = self.state.clauses[given].literals[i];
            self.indices.active_literals.insert(&self.store, lit, given);
        }
        if let Some((lhs, rhs)) =
            DemodulationRule::as_rewrite_rule(&self.store, &self.state.clauses[given])
        {
            self.indices.rewrites.insert(
                &self.store,
                RewriteRule {
                    clause: given,
                    lhs,
                    rhs,
                },
            );
            self.indices.rewrites.insert(
                &self.store,
                RewriteRule {
                    clause: given,
                    lhs: rhs,
                    rhs: lhs,
                },
            );
        }
        self.state.active.insert(given);
        self.stats.activated_clauses += 1;
    }

    /// Unregister a retired active clause from the indices.
    fn deindex(&mut self, idx: usize) {
        for i in self.state.clauses[idx].selected_indices() {
            let lit = self.state.clauses[idx].literals[i];
            self.indices.active_literals.remove(&self.store, lit, idx);
        }
        if let Some((lhs, rhs)) =
            DemodulationRule::as_rewrite_rule(&self.store, &self.state.clauses[idx])
        {
            self.indices.rewrites.remove(
                &self.store,
                RewriteRule {
                    clause: idx,
                    lhs,
                    rhs,
                },
            );
            self.indices.rewrites.remove(
                &self.store,
                RewriteRule {
                    clause: idx,
                    lhs: rhs,
                    rhs: lhs,
                },
            );
        }
    }

    /// Run all generating rules on the given clause.
    fn generate(&mut self, given: usize) -> Vec<NewClause> {
        let generators = std::mem::take(&mut self.generators);
        let mut conclusions = Vec::new();
        for rule in &generators {
            let mut ctx = RuleContext {
                store: &mut self.store,
                interner: &self.interner,
                ordering: &self.ordering,
                selection: self.config.selection,
            };
            conclusions.extend(rule.generate(given, &self.state, &mut ctx, &self.indices));
        }
        self.generators = generators;
        conclusions
    }

    fn count_deletion(&mut self, reason: DeletionReason) {
        match reason {
            DeletionReason::SimpleTautology => self.stats.simple_tautologies += 1,
            DeletionReason::EquationalTautology => self.stats.equational_tautologies += 1,
            DeletionReason::ForwardSubsumed => self.stats.forward_subsumed += 1,
            DeletionReason::BackwardSubsumed => self.stats.backward_subsumed += 1,
        }
    }

    fn count_replacement(&mut self, rule: Rule) {
        match rule {
            Rule::DuplicateLiteralRemoval => self.stats.duplicate_literals += 1,
            Rule::TrivialInequalityRemoval => self.stats.trivial_inequalities += 1,
            Rule::ForwardDemodulation => self.stats.forward_demodulations += 1,
            Rule::BackwardDemodulation => self.stats.backward_demodulations += 1,
            Rule::ForwardSubsumptionResolution => {
                self.stats.forward_subsumption_resolutions += 1
            }
            Rule::BackwardSubsumptionResolution => {
                self.stats.backward_subsumption_resolutions += 1
            }
            _ => {}
        }
    }

    /// Reconstruct an answer tuple from a refutation: the direct route
    /// first, then conjunctive goal extraction.
    pub fn extract_answer(&mut self, refutation: usize) -> Option<Vec<crate::fol::TermId>> {
        if let Some(tuple) = self
            .answers
            .try_get_answer(&self.store, &self.state.clauses)
        {
            return Some(tuple);
        }
        crate::answer::extractor::conjunctive_goal_answer(
            refutation,
            &self.formulas,
            &self.state.clauses,
            &self.inferences,
            &mut self.store,
            &self.interner,
        )
    }

    /// Poll the soft limits.
    fn check_limits(&self) -> Option<Outcome> {
        if let (Some(limit), Some(start)) = (self.config.time_limit, self.start) {
            if start.elapsed() > limit {
                return Some(Outcome::TimeLimit);
            }
        }
        if let Some(limit_mb) = self.config.memory_limit_mb {
            if let Some(used) = process_memory_mb() {
                if used >= limit_mb {
                    return Some(Outcome::MemoryLimit);
                }
            }
        }
        if self.config.max_clauses > 0 && self.state.clauses.len() >= self.config.max_clauses {
            return Some(Outcome::ResourceLimit);
        }
        if self.config.max_iterations > 0
            && self.stats.iterations >= self.config.max_iterations as u64
        {
            return Some(Outcome::ResourceLimit);
        }
        None
    }
}

/// Parse, preprocess, and saturate a problem in one call.
pub fn prove_problem(problem: Problem, config: ProverConfig) -> (Outcome, Prover) {
    let mut prover = Prover::new(problem, config);
    let outcome = prover.prove();
    (outcome, prover)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_problem;

    fn prove_text(input: &str) -> (Outcome, Prover) {
        let problem = parse_problem(input, &[], "test").unwrap();
        prove_problem(problem, ProverConfig::default())
    }

    #[test]
    fn test_propositional_refutation() {
        let (outcome, prover) = prove_text("cnf(a1, axiom, p). cnf(a2, axiom, ~p).");
        match outcome {
            Outcome::Refutation(idx) => {
                assert!(prover.state.clauses[idx].is_refutation());
                assert_eq!(prover.stats.termination, TerminationReason::Refutation);
            }
            other => panic!("expected refutation, got {:?}", other),
        }
    }

    #[test]
    fn test_unit_chain_refutation() {
        let (outcome, _) = prove_text(
            "cnf(a, axiom, p(c)).
             cnf(b, axiom, ~p(X) | q(X)).
             cnf(c, axiom, ~q(c)).",
        );
        assert!(matches!(outcome, Outcome::Refutation(_)));
    }

    #[test]
    fn test_satisfiable_saturation() {
        let problem = parse_problem("cnf(a, axiom, p). cnf(b, axiom, q).", &[], "sat").unwrap();
        let mut config = ProverConfig::default();
        config.selection = crate::selection::LiteralSelection::Sel0;
        config.split_mode = SplitMode::Off;
        let (outcome, prover) = prove_problem(problem, config);
        assert_eq!(outcome, Outcome::Saturated);
        assert_eq!(prover.stats.termination, TerminationReason::Satisfiable);
    }

    #[test]
    fn test_equality_refutation() {
        let (outcome, _) = prove_text(
            "cnf(e, axiom, a = b).
             cnf(f, axiom, f(a) != f(b)).",
        );
        assert!(matches!(outcome, Outcome::Refutation(_)));
    }

    #[test]
    fn test_tautology_never_enters_passive() {
        let (outcome, prover) = prove_text(
            "cnf(t, axiom, p(X) | ~p(X) | r(Y)).
             cnf(a, axiom, q).",
        );
        assert_eq!(outcome, Outcome::Saturated);
        assert_eq!(prover.stats.simple_tautologies, 1);
    }

    #[test]
    fn test_splitting_refutation() {
        let problem = parse_problem(
            "cnf(split_me, axiom, p(X) | q(Y)).
             cnf(np, axiom, ~p(a)).
             cnf(nq, axiom, ~q(a)).",
            &[],
            "split",
        )
        .unwrap();
        let mut config = ProverConfig::default();
        config.split_mode = SplitMode::Full;
        let (outcome, prover) = prove_problem(problem, config);
        assert!(matches!(outcome, Outcome::Refutation(_)));
        assert!(prover.stats.split_clauses >= 1);
    }

    #[test]
    fn test_fof_conjecture_proved() {
        let (outcome, _) = prove_text(
            "fof(a, axiom, p(c)).
             fof(g, conjecture, ?[X]: p(X)).",
        );
        assert!(matches!(outcome, Outcome::Refutation(_)));
    }

    #[test]
    fn test_iteration_limit_reported() {
        let problem = parse_problem(
            "cnf(a, axiom, p(X) | p(f(X))).
             cnf(b, axiom, ~p(X) | p(g(X))).",
            &[],
            "lim",
        )
        .unwrap();
        let mut config = ProverConfig::default();
        config.max_iterations = 3;
        config.split_mode = SplitMode::Off;
        let (outcome, prover) = prove_problem(problem, config);
        assert!(matches!(
            outcome,
            Outcome::ResourceLimit | Outcome::Saturated
        ));
        let _ = prover;
    }
}
