//! Answer-literal injection and witness reconstruction.

use saturnine::parser::parse_problem;
use saturnine::saturation::prove_problem;
use saturnine::{Outcome, Prover, ProverConfig};

fn prove(input: &str) -> (Outcome, Prover) {
    let problem = parse_problem(input, &[], "answers").unwrap();
    prove_problem(problem, ProverConfig::default())
}

fn witness_names(prover: &mut Prover, refutation: usize) -> Vec<String> {
    let tuple = prover.extract_answer(refutation).expect("answer expected");
    tuple
        .iter()
        .map(|&t| {
            prover
                .store
                .display_term(t, &prover.interner)
                .to_string()
        })
        .collect()
}

#[test]
fn conjunctive_answer_extraction() {
    let (outcome, mut prover) = prove(
        "fof(a, axiom, p(c)).
         fof(b, axiom, q(c)).
         fof(g, conjecture, ?[X]: (p(X) & q(X))).",
    );
    let Outcome::Refutation(refutation) = outcome else {
        panic!("expected refutation, got {:?}", outcome);
    };
    assert_eq!(witness_names(&mut prover, refutation), vec!["c"]);
}

#[test]
fn single_goal_answer() {
    let (outcome, mut prover) = prove(
        "fof(a, axiom, p(d)).
         fof(g, conjecture, ?[X]: p(X)).",
    );
    let Outcome::Refutation(refutation) = outcome else {
        panic!("expected refutation, got {:?}", outcome);
    };
    assert_eq!(witness_names(&mut prover, refutation), vec!["d"]);
}

#[test]
fn answer_among_alternatives() {
    // Only b satisfies both goals
    let (outcome, mut prover) = prove(
        "fof(a1, axiom, p(a)).
         fof(a2, axiom, p(b)).
         fof(a3, axiom, q(b)).
         fof(g, conjecture, ?[X]: (p(X) & q(X))).",
    );
    let Outcome::Refutation(refutation) = outcome else {
        panic!("expected refutation, got {:?}", outcome);
    };
    assert_eq!(witness_names(&mut prover, refutation), vec!["b"]);
}

#[test]
fn binary_witness_tuple() {
    let (outcome, mut prover) = prove(
        "fof(a, axiom, edge(a, b)).
         fof(g, conjecture, ?[X, Y]: edge(X, Y)).",
    );
    let Outcome::Refutation(refutation) = outcome else {
        panic!("expected refutation, got {:?}", outcome);
    };
    assert_eq!(witness_names(&mut prover, refutation), vec!["a", "b"]);
}

#[test]
fn refutation_without_answer_still_succeeds() {
    // Universal conjecture: no answer literal is injected, the proof
    // stands on its own
    let (outcome, prover) = prove(
        "fof(a, axiom, ![X]: p(X)).
         fof(g, conjecture, p(c)).",
    );
    assert!(matches!(outcome, Outcome::Refutation(_)));
    assert!(!prover.answers.is_active());
}

#[test]
fn disjunctive_support_yields_no_answer() {
    // p(a) | p(b) proves ?[X]: p(X) but pins no single witness; the
    // prover reports the refutation and stays silent on answers
    let (outcome, mut prover) = prove(
        "fof(a, axiom, p(a) | p(b)).
         fof(g, conjecture, ?[X]: p(X)).",
    );
    let Outcome::Refutation(refutation) = outcome else {
        panic!("expected refutation, got {:?}", outcome);
    };
    assert!(prover.extract_answer(refutation).is_none());
}

#[test]
fn derived_fact_supports_answer() {
    // q(c) is only derivable through the implication; tabulation in the
    // conjunctive extractor must chain through it
    let (outcome, mut prover) = prove(
        "fof(a, axiom, p(c)).
         fof(i, axiom, ![X]: (p(X) => q(X))).
         fof(g, conjecture, ?[X]: (p(X) & q(X))).",
    );
    let Outcome::Refutation(refutation) = outcome else {
        panic!("expected refutation, got {:?}", outcome);
    };
    assert_eq!(witness_names(&mut prover, refutation), vec!["c"]);
}
