//! Conjunctive goal answer extraction
//!
//! When the direct route fails, the goal `¬∃x̄.(L₁ ∧ … ∧ Lₖ)` is
//! re-proved constructively: the input and clausification premises
//! reachable from the refutation are saturated into a unit-lemma index
//! by bounded forward chaining (tabulation), and a depth-first search
//! assembles one substitution σ unifying every goal literal with some
//! lemma. The answer tuple is `σ(x₁),…,σ(xₙ)`. At each goal a fallback
//! tries two-sided unification of positive goal equalities.

use crate::fol::{Clause, Interner, LiteralId, TermId, TermStore};
use crate::index::LiteralIndex;
use crate::inference::{InferenceStore, Rule, UnitId};
use crate::parser::{Formula, FormulaUnit};
use crate::unification::{FreshRenaming, RobSubstitution};
use log::debug;

/// Bound on tabulation rounds.
const TABULATION_ROUNDS: usize = 6;
/// Bound on the lemma set size.
const LEMMA_LIMIT: usize = 512;

/// Try to reconstruct an answer tuple from a refutation.
pub fn conjunctive_goal_answer(
    refutation: usize,
    formulas: &[FormulaUnit],
    clauses: &[Clause],
    inferences: &InferenceStore,
    store: &mut TermStore,
    interner: &Interner,
) -> Option<Vec<TermId>> {
    let (goal_vars, goal_lits) = extract_goals(refutation, formulas, inferences)?;
    let premises = premise_clauses(refutation, clauses, inferences, interner, store);
    debug!(
        "goal extraction over {} premises, {} goals",
        premises.len(),
        goal_lits.len()
    );

    let (_lemmas, lemma_index) = tabulate(&premises, clauses, store, interner);

    let mut subst = RobSubstitution::new();
    if !SubstBuilder::new(store, &goal_lits, &lemma_index).run(&mut subst) {
        return None;
    }

    let mut renaming = FreshRenaming::new();
    let tuple = goal_vars
        .iter()
        .map(|&v| {
            let term = store.var(v);
            subst.apply(store, term, 0, &mut renaming)
        })
        .collect();
    Some(tuple)
}

/// Find the single negated conjecture among the refutation's ancestors
/// and flatten it into goal literals.
fn extract_goals(
    refutation: usize,
    formulas: &[FormulaUnit],
    inferences: &InferenceStore,
) -> Option<(Vec<u32>, Vec<LiteralId>)> {
    let mut conjectures = Vec::new();
    for unit in inferences.ancestors(UnitId::Clause(refutation)) {
        if let UnitId::Formula(idx) = unit {
            if inferences.rule(unit) == Some(Rule::NegatedConjecture) {
                conjectures.push(idx);
            }
        }
    }
    if conjectures.len() != 1 {
        return None;
    }
    let formula = formulas[conjectures[0]].formula.clone().flatten();

    let Formula::Not(inner) = formula else {
        return None;
    };
    let Formula::Exists(vars, body) = *inner else {
        return None;
    };
    let mut goals = Vec::new();
    match *body {
        Formula::Atom(lit) => goals.push(lit),
        Formula::And(parts) => {
            for part in parts {
                match part {
                    Formula::Atom(lit) => goals.push(lit),
                    _ => return None,
                }
            }
        }
        _ => return None,
    }
    Some((vars, goals))
}

/// Input and clausification clauses reachable from the refutation,
/// excluding clauses that mention answer predicates.
fn premise_clauses(
    refutation: usize,
    clauses: &[Clause],
    inferences: &InferenceStore,
    interner: &Interner,
    store: &TermStore,
) -> Vec<usize> {
    let mut premises = Vec::new();
    for unit in inferences.ancestors(UnitId::Clause(refutation)) {
        let UnitId::Clause(idx) = unit else {
            continue;
        };
        let rule = inferences.rule(unit);
        if !matches!(
            rule,
            Some(Rule::Input) | Some(Rule::Clausify) | Some(Rule::NegatedConjecture)
        ) {
            continue;
        }
        let clause = &clauses[idx];
        let mentions_answer = clause
            .literals
            .iter()
            .any(|&l| interner.is_answer_predicate(store.lit(l).predicate));
        if !mentions_answer {
            premises.push(idx);
        }
    }
    premises
}

/// Bounded forward chaining over the premise clauses: unit premises
/// seed the lemma set, and unit-resulting resolution of non-unit
/// premises against known lemmas grows it to a fixed point (or bound).
fn tabulate(
    premises: &[usize],
    clauses: &[Clause],
    store: &mut TermStore,
    interner: &Interner,
) -> (Vec<LiteralId>, LiteralIndex) {
    let mut lemmas: Vec<LiteralId> = Vec::new();
    let mut index = LiteralIndex::new();

    let mut add = |lit: LiteralId, lemmas: &mut Vec<LiteralId>, index: &mut LiteralIndex, store: &TermStore| {
        if lemmas.contains(&lit) {
            return false;
        }
        index.insert(store, lit, lemmas.len());
        lemmas.push(lit);
        true
    };

    for &idx in premises {
        let clause = &clauses[idx];
        if clause.literals.len() == 1 {
            add(clause.literals[0], &mut lemmas, &mut index, store);
        }
    }

    for _ in 0..TABULATION_ROUNDS {
        let mut grew = false;
        for &idx in premises {
            let literals = clauses[idx].literals.clone();
            if literals.len() < 2 {
                continue;
            }
            // Try each literal as the surviving result
            for result_pos in 0..literals.len() {
                let derived = ur_resolve(&literals, result_pos, &index, store, interner);
                for lit in derived {
                    if lemmas.len() >= LEMMA_LIMIT {
                        return (lemmas, index);
                    }
                    grew |= add(lit, &mut lemmas, &mut index, store);
                }
            }
        }
        if !grew {
            break;
        }
    }
    (lemmas, index)
}

/// Unit-resulting resolution: unify every literal of the clause except
/// `result_pos` with a complementary lemma, and return the instantiated
/// surviving literals for all complete assignments.
fn ur_resolve(
    literals: &[LiteralId],
    result_pos: usize,
    index: &LiteralIndex,
    store: &mut TermStore,
    interner: &Interner,
) -> Vec<LiteralId> {
    let mut results = Vec::new();
    let mut subst = RobSubstitution::new();
    let side: Vec<LiteralId> = literals
        .iter()
        .copied()
        .enumerate()
        .filter(|&(i, _)| i != result_pos)
        .map(|(_, l)| l)
        .collect();
    ur_resolve_rec(
        &side,
        0,
        literals[result_pos],
        index,
        store,
        interner,
        &mut subst,
        &mut results,
    );
    results
}

#[allow(clippy::too_many_arguments)]
fn ur_resolve_rec(
    side: &[LiteralId],
    depth: usize,
    result: LiteralId,
    index: &LiteralIndex,
    store: &mut TermStore,
    interner: &Interner,
    subst: &mut RobSubstitution,
    results: &mut Vec<LiteralId>,
) {
    if depth == side.len() {
        let mut renaming = FreshRenaming::new();
        results.push(subst.apply_literal(store, interner, result, 0, &mut renaming));
        return;
    }
    let lit = side[depth];
    // Lemma banks start at 1, one per side literal
    let bank = (depth + 1) as u8;
    for (lemma, _) in index.unifiable(store, lit, true) {
        let cp = subst.checkpoint();
        if subst.unify_args(store, lit, 0, lemma, bank) {
            ur_resolve_rec(side, depth + 1, result, index, store, interner, subst, results);
        }
        subst.rollback_to(cp);
    }
}

/// Depth-first construction of one substitution covering all goals,
/// with per-depth backtracking and the positive-equality fallback.
struct SubstBuilder<'a> {
    store: &'a mut TermStore,
    goals: &'a [LiteralId],
    lemmas: &'a LiteralIndex,
}

impl<'a> SubstBuilder<'a> {
    fn new(store: &'a mut TermStore, goals: &'a [LiteralId], lemmas: &'a LiteralIndex) -> Self {
        SubstBuilder {
            store,
            goals,
            lemmas,
        }
    }

    fn run(&mut self, subst: &mut RobSubstitution) -> bool {
        self.solve(0, subst)
    }

    fn solve(&mut self, depth: usize, subst: &mut RobSubstitution) -> bool {
        if depth == self.goals.len() {
            return true;
        }
        let goal = self.goals[depth];
        // Lemmas for every depth live in their own bank
        let bank = (depth + 1) as u8;

        let candidates = self.lemmas.unifiable(self.store, goal, false);
        for (lemma, _) in candidates {
            let cp = subst.checkpoint();
            if subst.unify_args(self.store, goal, 0, lemma, bank)
                && self.solve(depth + 1, subst)
            {
                return true;
            }
            subst.rollback_to(cp);
        }

        // Fallback: a positive goal equality may close by unifying its
        // own two sides
        let lit = self.store.lit(goal);
        if lit.polarity && self.store.is_equality(goal) {
            let (lhs, rhs) = (lit.args[0], lit.args[1]);
            let cp = subst.checkpoint();
            if subst.unify(self.store, lhs, 0, rhs, 0) && self.solve(depth + 1, subst) {
                return true;
            }
            subst.rollback_to(cp);
        }
        false
    }
}
