//! SZS result lines and TPTP derivation output
//!
//! Prints the machine-readable result status, the refutation as a TPTP
//! derivation (one `cnf`/`fof` line per proof-relevant unit with its
//! inference source), and answer tuples. Conjectures are printed back
//! at their original positive polarity.

use crate::fol::{InputType, TermId};
use crate::inference::{Rule, UnitId};
use crate::saturation::{Outcome, Prover};
use crate::stats::TerminationReason;
use std::io::{self, Write};

/// The SZS status word for an outcome.
pub fn szs_status(outcome: Outcome, prover: &Prover) -> &'static str {
    let has_conjecture = prover
        .formulas
        .iter()
        .any(|f| f.input_type == InputType::Conjecture)
        || prover
            .state
            .clauses
            .iter()
            .any(|c| c.input_type == InputType::NegatedConjecture);
    match outcome {
        Outcome::Refutation(_) => {
            if has_conjecture {
                "Theorem"
            } else {
                "Unsatisfiable"
            }
        }
        Outcome::Saturated => match prover.stats.termination {
            TerminationReason::Satisfiable => {
                if has_conjecture {
                    "CounterSatisfiable"
                } else {
                    "Satisfiable"
                }
            }
            _ => "GaveUp",
        },
        Outcome::TimeLimit => "Timeout",
        Outcome::MemoryLimit | Outcome::ResourceLimit => "GaveUp",
    }
}

/// Print the `% SZS status` line.
pub fn write_status(out: &mut impl Write, outcome: Outcome, prover: &Prover) -> io::Result<()> {
    writeln!(
        out,
        "% SZS status {} for {}",
        szs_status(outcome, prover),
        prover.config.problem_name
    )
}

/// Print an answer tuple.
pub fn write_answer(
    out: &mut impl Write,
    tuple: &[TermId],
    prover: &Prover,
) -> io::Result<()> {
    write!(out, "% SZS answers Tuple [[")?;
    for (i, &term) in tuple.iter().enumerate() {
        if i > 0 {
            write!(out, ",")?;
        }
        write!(out, "{}", prover.store.display_term(term, &prover.interner))?;
    }
    writeln!(out, "]|_] for {}", prover.config.problem_name)
}

fn unit_name(unit: UnitId) -> String {
    match unit {
        UnitId::Clause(idx) => format!("c{}", idx),
        UnitId::Formula(idx) => format!("f{}", idx),
    }
}

fn unit_role(prover: &Prover, unit: UnitId, rule: Rule) -> &'static str {
    let input_type = match unit {
        UnitId::Clause(idx) => prover.state.clauses[idx].input_type,
        UnitId::Formula(idx) => prover.formulas[idx].input_type,
    };
    match rule {
        Rule::Input | Rule::Axiom => input_type.tptp_role(),
        Rule::NegatedConjecture => "negated_conjecture",
        _ => "plain",
    }
}

/// Print the derivation of a refutation: every reachable unit in
/// parent-before-child order.
pub fn write_refutation(
    out: &mut impl Write,
    refutation: usize,
    prover: &Prover,
) -> io::Result<()> {
    writeln!(
        out,
        "% SZS output start CNFRefutation for {}",
        prover.config.problem_name
    )?;
    for unit in prover.inferences.ancestors(UnitId::Clause(refutation)) {
        let Some(record) = prover.inferences.get(unit) else {
            continue;
        };
        let role = unit_role(prover, unit, record.rule);
        let source = if record.parents.is_empty() {
            match record.rule {
                Rule::Input => format!("file('{}', {})", prover.config.problem_name, unit_name(unit)),
                rule => format!("introduced({})", rule.name()),
            }
        } else {
            let parents: Vec<String> = record.parents.iter().map(|&p| unit_name(p)).collect();
            format!(
                "inference({},[status(thm)],[{}])",
                record.rule.name(),
                parents.join(",")
            )
        };
        match unit {
            UnitId::Clause(idx) => {
                writeln!(
                    out,
                    "cnf({},{},({}),{}).",
                    unit_name(unit),
                    role,
                    prover.state.clauses[idx].display(&prover.store, &prover.interner),
                    source
                )?;
            }
            UnitId::Formula(idx) => {
                writeln!(
                    out,
                    "fof({},{},({}),{}).",
                    unit_name(unit),
                    role,
                    prover.formulas[idx]
                        .formula
                        .display(&prover.store, &prover.interner),
                    source
                )?;
            }
        }
    }
    writeln!(
        out,
        "% SZS output end CNFRefutation for {}",
        prover.config.problem_name
    )
}
