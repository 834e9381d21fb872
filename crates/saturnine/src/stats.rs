//! Proof-search statistics and termination reporting
//!
//! A flat record of counters incremented throughout the run, the current
//! execution phase, and the final termination reason. Printed in a
//! stable textual form so scripts can scrape it; also serialisable as
//! JSON.

use serde::Serialize;
use std::fmt;

/// Phase of the prover's execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ExecutionPhase {
    #[default]
    Initialization,
    Parsing,
    Preprocessing,
    Saturation,
    Finalization,
}

impl fmt::Display for ExecutionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionPhase::Initialization => "initialization",
            ExecutionPhase::Parsing => "parsing",
            ExecutionPhase::Preprocessing => "preprocessing",
            ExecutionPhase::Saturation => "saturation",
            ExecutionPhase::Finalization => "finalization",
        };
        write!(f, "{}", name)
    }
}

/// Why the saturation loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TerminationReason {
    Refutation,
    Satisfiable,
    RefutationNotFound,
    #[default]
    Unknown,
    TimeLimit,
    MemoryLimit,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TerminationReason::Refutation => "refutation",
            TerminationReason::Satisfiable => "satisfiable",
            TerminationReason::RefutationNotFound => "refutation not found",
            TerminationReason::Unknown => "unknown",
            TerminationReason::TimeLimit => "time limit",
            TerminationReason::MemoryLimit => "memory limit",
        };
        write!(f, "{}", name)
    }
}

/// Flat counter record for one prover run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Statistics {
    // Input
    pub input_clauses: u64,
    pub input_formulas: u64,
    pub initial_clauses: u64,

    // Generating inferences
    pub resolution: u64,
    pub factoring: u64,
    pub forward_superposition: u64,
    pub backward_superposition: u64,
    pub self_superposition: u64,
    pub equality_resolution: u64,
    pub equality_factoring: u64,
    pub ur_resolution: u64,

    // Simplifying inferences
    pub duplicate_literals: u64,
    pub trivial_inequalities: u64,
    pub forward_demodulations: u64,
    pub backward_demodulations: u64,
    pub forward_subsumption_resolutions: u64,
    pub backward_subsumption_resolutions: u64,

    // Deletions
    pub simple_tautologies: u64,
    pub equational_tautologies: u64,
    pub forward_subsumed: u64,
    pub backward_subsumed: u64,

    // Splitting
    pub split_clauses: u64,
    pub split_components: u64,
    pub unique_components: u64,
    pub prop_unit_names: u64,
    pub variant_merges: u64,

    // Saturation
    pub generated_clauses: u64,
    pub activated_clauses: u64,
    pub discarded_vacuous: u64,
    pub iterations: u64,

    // Final state
    pub phase: ExecutionPhase,
    pub termination: TerminationReason,
    /// Arena index of the refuting clause, when one was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refutation: Option<usize>,
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "% ------------------------------")?;
        writeln!(f, "% termination: {}", self.termination)?;
        writeln!(f, "% phase: {}", self.phase)?;
        writeln!(f, "% input clauses: {}", self.input_clauses)?;
        writeln!(f, "% input formulas: {}", self.input_formulas)?;
        writeln!(f, "% initial clauses: {}", self.initial_clauses)?;
        writeln!(f, "% generated clauses: {}", self.generated_clauses)?;
        writeln!(f, "% activated clauses: {}", self.activated_clauses)?;
        writeln!(f, "% iterations: {}", self.iterations)?;
        writeln!(f, "% resolution: {}", self.resolution)?;
        writeln!(f, "% factoring: {}", self.factoring)?;
        writeln!(f, "% forward superposition: {}", self.forward_superposition)?;
        writeln!(f, "% backward superposition: {}", self.backward_superposition)?;
        writeln!(f, "% self superposition: {}", self.self_superposition)?;
        writeln!(f, "% equality resolution: {}", self.equality_resolution)?;
        writeln!(f, "% equality factoring: {}", self.equality_factoring)?;
        writeln!(f, "% unit resulting resolution: {}", self.ur_resolution)?;
        writeln!(f, "% duplicate literals: {}", self.duplicate_literals)?;
        writeln!(f, "% trivial inequalities: {}", self.trivial_inequalities)?;
        writeln!(f, "% forward demodulations: {}", self.forward_demodulations)?;
        writeln!(f, "% backward demodulations: {}", self.backward_demodulations)?;
        writeln!(
            f,
            "% forward subsumption resolutions: {}",
            self.forward_subsumption_resolutions
        )?;
        writeln!(
            f,
            "% backward subsumption resolutions: {}",
            self.backward_subsumption_resolutions
        )?;
        writeln!(f, "% simple tautologies: {}", self.simple_tautologies)?;
        writeln!(f, "% equational tautologies: {}", self.equational_tautologies)?;
        writeln!(f, "% forward subsumed: {}", self.forward_subsumed)?;
        writeln!(f, "% backward subsumed: {}", self.backward_subsumed)?;
        writeln!(f, "% split clauses: {}", self.split_clauses)?;
        writeln!(f, "% split components: {}", self.split_components)?;
        writeln!(f, "% unique components: {}", self.unique_components)?;
        writeln!(f, "% propositional unit names: {}", self.prop_unit_names)?;
        writeln!(f, "% variant merges: {}", self.variant_merges)?;
        write!(f, "% ------------------------------")
    }
}
