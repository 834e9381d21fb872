//! Splitting behaviour through the full prover.

use saturnine::parser::parse_problem;
use saturnine::saturation::prove_problem;
use saturnine::{Outcome, Prover, ProverConfig, SplitMode};

fn prove_with_mode(input: &str, mode: SplitMode) -> (Outcome, Prover) {
    let problem = parse_problem(input, &[], "split").unwrap();
    let mut config = ProverConfig::default();
    config.split_mode = mode;
    prove_problem(problem, config)
}

#[test]
fn variable_disjoint_clause_is_split_and_refuted() {
    // {p(X), q(Y)} splits into two named components; each side is
    // refuted against its axiom and the guards disjoin to false
    let input = "cnf(split_me, axiom, p(X) | q(Y)).
                 cnf(np, axiom, ~p(a)).
                 cnf(nq, axiom, ~q(a)).";

    let (outcome, prover) = prove_with_mode(input, SplitMode::Full);
    let Outcome::Refutation(idx) = outcome else {
        panic!("expected refutation, got {:?}", outcome);
    };
    assert!(prover.state.clauses[idx].is_refutation());
    assert_eq!(prover.stats.split_clauses, 1);
    assert_eq!(prover.stats.split_components, 2);
    assert!(prover.stats.unique_components >= 2);
    // The splitter recorded its event with premises
    assert!(!prover.inferences.split_events().is_empty());
}

#[test]
fn same_problem_proves_without_splitting() {
    let input = "cnf(split_me, axiom, p(X) | q(Y)).
                 cnf(np, axiom, ~p(a)).
                 cnf(nq, axiom, ~q(a)).";

    let (outcome, prover) = prove_with_mode(input, SplitMode::Off);
    assert!(matches!(outcome, Outcome::Refutation(_)));
    assert_eq!(prover.stats.split_clauses, 0);
}

#[test]
fn input_mode_splits_only_input_clauses() {
    let input = "cnf(split_me, axiom, p(X) | q(Y)).
                 cnf(np, axiom, ~p(a)).
                 cnf(nq, axiom, ~q(a)).";

    let (outcome, prover) = prove_with_mode(input, SplitMode::Input);
    assert!(matches!(outcome, Outcome::Refutation(_)));
    assert!(prover.stats.split_clauses >= 1);
}

#[test]
fn propositional_atoms_share_names() {
    // Both occurrences of the propositional atom p go through the same
    // split name, so the two guarded empty clauses merge to a refutation
    let input = "cnf(a, axiom, p).
                 cnf(b, axiom, ~p).";
    let (outcome, prover) = prove_with_mode(input, SplitMode::Full);
    assert!(matches!(outcome, Outcome::Refutation(_)));
    assert_eq!(prover.stats.prop_unit_names, 2);
}

#[test]
fn three_way_split() {
    let input = "cnf(wide, axiom, p(X) | q(Y) | r(Z)).
                 cnf(np, axiom, ~p(a)).
                 cnf(nq, axiom, ~q(b)).
                 cnf(nr, axiom, ~r(c)).";
    let (outcome, prover) = prove_with_mode(input, SplitMode::Full);
    assert!(matches!(outcome, Outcome::Refutation(_)));
    assert_eq!(prover.stats.split_components, 3);
}

#[test]
fn shared_component_named_once() {
    // q(Y) occurs as a component of two different clauses; the variant
    // index must reuse it
    let input = "cnf(one, axiom, p(X) | q(Y)).
                 cnf(two, axiom, r(X) | q(Y)).
                 cnf(np, axiom, ~p(a)).
                 cnf(nr, axiom, ~r(a)).
                 cnf(nq, axiom, ~q(a)).";
    let (outcome, prover) = prove_with_mode(input, SplitMode::Full);
    assert!(matches!(outcome, Outcome::Refutation(_)));
    // Two split clauses but only three unique non-empty components
    assert_eq!(prover.stats.split_clauses, 2);
}
