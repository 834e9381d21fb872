//! Answer literals: injection, capture, and the synthetic refutation
//!
//! Conjectures of the shape `¬∃x̄.φ` are rewritten to
//! `¬∃x̄.(φ ∧ ans(x̄))` with a fresh answer predicate, so witness terms
//! for the existential variables surface as arguments of `ans` literals
//! during saturation. A new clause consisting solely of answer literals
//! (with an unconditional guard and no splits) is captured as an answer
//! and closed into a refutation by unit-resulting resolution against
//! identity resolver clauses.

pub mod extractor;

use crate::fol::{Clause, Interner, LiteralId, PredicateId, TermStore};
use crate::inference::{InferenceStore, Rule, UnitId};
use crate::parser::{Formula, FormulaUnit, Problem};
use crate::prop::NodeId;
use log::debug;
use std::collections::HashMap;

/// Manager for answer predicates and captured answer clauses.
#[derive(Debug, Default)]
pub struct AnswerLiteralManager {
    /// Clauses captured as answers, in capture order
    answers: Vec<usize>,
    /// Identity resolver clause per answer predicate
    resolvers: HashMap<PredicateId, usize>,
    /// Whether any answer literal was injected
    active: bool,
}

impl AnswerLiteralManager {
    pub fn new() -> Self {
        AnswerLiteralManager::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn answers(&self) -> &[usize] {
        &self.answers
    }

    /// Rewrite every negated conjecture `¬∃x̄.φ` in the problem to
    /// `¬∃x̄.(φ ∧ ans(x̄))`. One pass over the unit list, before
    /// clausification.
    pub fn add_answer_literals(&mut self, problem: &mut Problem) {
        let unit_count = problem.formulas.len();
        for idx in 0..unit_count {
            if problem.formulas[idx].superseded {
                continue;
            }
            let Formula::Not(inner) = &problem.formulas[idx].formula else {
                continue;
            };
            let Formula::Exists(vars, body) = inner.as_ref() else {
                continue;
            };
            let vars = vars.clone();
            let body = body.as_ref().clone();

            let ans = problem
                .interner
                .fresh_answer_predicate(vars.len() as u8);
            let args: Vec<_> = vars.iter().map(|&v| problem.store.var(v)).collect();
            let ans_lit = problem
                .store
                .literal(&problem.interner, ans, true, args);
            let rewritten = Formula::Not(Box::new(Formula::Exists(
                vars,
                Box::new(Formula::And(vec![body, Formula::Atom(ans_lit)])),
            )));

            problem.formulas[idx].superseded = true;
            let new_idx = problem.formulas.len();
            let name = format!("{}_answer", problem.formulas[idx].name);
            problem.formulas.push(FormulaUnit::new(
                name,
                problem.formulas[idx].input_type,
                rewritten,
            ));
            problem.inferences.record(
                UnitId::Formula(new_idx),
                Rule::AnswerLiteral,
                vec![UnitId::Formula(idx)],
            );
            self.active = true;
            debug!("injected answer literal into unit {}", idx);
        }
    }

    /// Is every literal of the clause an answer-predicate literal?
    fn all_answer_literals(
        &self,
        store: &TermStore,
        interner: &Interner,
        literals: &[LiteralId],
    ) -> bool {
        !literals.is_empty()
            && literals
                .iter()
                .all(|&l| interner.is_answer_predicate(store.lit(l).predicate))
    }

    /// Inspect a freshly created clause. If it consists solely of
    /// answer literals, has an unconditional guard, and depends on no
    /// splits, capture it and manufacture the synthetic refutation.
    /// Returns the refutation clause index.
    #[allow(clippy::too_many_arguments)]
    pub fn on_new_clause(
        &mut self,
        clause_idx: usize,
        clauses: &mut Vec<Clause>,
        store: &mut TermStore,
        interner: &Interner,
        inferences: &mut InferenceStore,
    ) -> Option<usize> {
        if !self.active {
            return None;
        }
        let clause = &clauses[clause_idx];
        if clause.prop != NodeId::FALSE || !clause.splits.is_empty() {
            return None;
        }
        if !self.all_answer_literals(store, interner, &clause.literals) {
            return None;
        }

        self.answers.push(clause_idx);
        debug!("captured answer clause {}", clause_idx);

        // Resolve every answer literal against its identity resolver
        let predicates: Vec<PredicateId> = clauses[clause_idx]
            .literals
            .iter()
            .map(|&l| store.lit(l).predicate)
            .collect();
        let mut parents = vec![UnitId::Clause(clause_idx)];
        for predicate in predicates {
            let resolver = self.resolver_clause(predicate, clauses, store, interner, inferences);
            parents.push(UnitId::Clause(resolver));
        }

        let refutation_idx = clauses.len();
        let mut refutation = Clause::new(Vec::new(), store);
        refutation.id = Some(refutation_idx);
        refutation.input_type = clauses[clause_idx].input_type;
        refutation.age = clauses[clause_idx].age;
        clauses.push(refutation);
        inferences.record(
            UnitId::Clause(refutation_idx),
            Rule::UnitResultingResolution,
            parents,
        );
        Some(refutation_idx)
    }

    /// The identity resolver clause `{ans(X0,…,Xn-1)}` for an answer
    /// predicate, created on first use.
    fn resolver_clause(
        &mut self,
        predicate: PredicateId,
        clauses: &mut Vec<Clause>,
        store: &mut TermStore,
        interner: &Interner,
        inferences: &mut InferenceStore,
    ) -> usize {
        if let Some(&idx) = self.resolvers.get(&predicate) {
            return idx;
        }
        let arity = interner.predicate_arity(predicate);
        let args: Vec<_> = (0..arity as u32).map(|i| store.var(i)).collect();
        let lit = store.literal(interner, predicate, true, args);
        let idx = clauses.len();
        let mut clause = Clause::new(vec![lit], store);
        clause.id = Some(idx);
        clauses.push(clause);
        inferences.record(UnitId::Clause(idx), Rule::AnswerLiteral, vec![]);
        self.resolvers.insert(predicate, idx);
        idx
    }

    /// Direct witness extraction: a captured answer clause with a
    /// single answer literal yields its arguments.
    pub fn try_get_answer(
        &self,
        store: &TermStore,
        clauses: &[Clause],
    ) -> Option<Vec<crate::fol::TermId>> {
        for &idx in &self.answers {
            let clause = &clauses[idx];
            if clause.literals.len() != 1 {
                continue;
            }
            return Some(store.lit(clause.literals[0]).args.to_vec());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_problem;

    #[test]
    fn test_injection_rewrites_conjecture() {
        let mut problem = parse_problem(
            "fof(g, conjecture, ?[X]: (p(X) & q(X))).",
            &[],
            "inj",
        )
        .unwrap();
        let mut manager = AnswerLiteralManager::new();
        manager.add_answer_literals(&mut problem);

        assert!(manager.is_active());
        // Original, negated, and injected unit
        assert_eq!(problem.formulas.len(), 3);
        let injected = problem.formulas.last().unwrap();
        assert!(!injected.superseded);
        match &injected.formula {
            Formula::Not(inner) => match inner.as_ref() {
                Formula::Exists(vars, body) => {
                    assert_eq!(vars.len(), 1);
                    match body.as_ref() {
                        Formula::And(parts) => {
                            let last = parts.last().unwrap();
                            let Formula::Atom(lit) = last else {
                                panic!("expected answer atom");
                            };
                            let pred = problem.store.lit(*lit).predicate;
                            assert!(problem.interner.is_answer_predicate(pred));
                        }
                        other => panic!("expected conjunction, got {:?}", other),
                    }
                }
                other => panic!("expected exists, got {:?}", other),
            },
            other => panic!("expected negation, got {:?}", other),
        }
    }

    #[test]
    fn test_injection_skips_universal_conjecture() {
        let mut problem = parse_problem(
            "fof(g, conjecture, ![X]: p(X)).",
            &[],
            "skip",
        )
        .unwrap();
        let mut manager = AnswerLiteralManager::new();
        manager.add_answer_literals(&mut problem);
        // ¬∀ is not of the ¬∃ shape
        assert!(!manager.is_active());
    }

    #[test]
    fn test_capture_and_synthetic_refutation() {
        let mut store = TermStore::new();
        let mut interner = Interner::new();
        let mut inferences = InferenceStore::new();
        let ans = interner.fresh_answer_predicate(1);
        let c = {
            let f = interner.intern_function("c", 0);
            store.constant(f)
        };
        let lit = store.literal(&interner, ans, false, vec![c]);

        let mut clauses = vec![];
        let mut clause = Clause::new(vec![lit], &store);
        clause.id = Some(0);
        clauses.push(clause);
        inferences.record(UnitId::Clause(0), Rule::Input, vec![]);

        let mut manager = AnswerLiteralManager {
            active: true,
            ..Default::default()
        };
        let refutation = manager
            .on_new_clause(0, &mut clauses, &mut store, &interner, &mut inferences)
            .expect("should capture");

        assert!(clauses[refutation].is_refutation());
        let record = inferences.get(UnitId::Clause(refutation)).unwrap();
        assert_eq!(record.rule, Rule::UnitResultingResolution);
        // Parents: the answer clause plus one resolver
        assert_eq!(record.parents.len(), 2);

        // Direct extraction yields the witness
        let tuple = manager.try_get_answer(&store, &clauses).unwrap();
        assert_eq!(tuple, vec![c]);
    }

    #[test]
    fn test_ordinary_clause_not_captured() {
        let mut store = TermStore::new();
        let mut interner = Interner::new();
        let mut inferences = InferenceStore::new();
        let p = interner.intern_predicate("p", 0);
        let lit = store.literal(&interner, p, true, vec![]);

        let mut clauses = vec![Clause::new(vec![lit], &store)];
        let mut manager = AnswerLiteralManager {
            active: true,
            ..Default::default()
        };
        assert!(manager
            .on_new_clause(0, &mut clauses, &mut store, &interner, &mut inferences)
            .is_none());
    }
}
