//! Saturnine: a saturation-based theorem prover for first-order logic
//! with equality.
//!
//! The prover runs a given-clause algorithm over hash-consed terms, with
//! clause splitting guarded by a propositional BDD, and reconstructs
//! witness terms for existential conjectures from the refutation.

pub mod answer;
pub mod config;
pub mod fol;
pub mod generating;
pub mod index;
pub mod inference;
pub mod output;
pub mod parser;
pub mod prop;
pub mod saturation;
pub mod selection;
pub mod simplifying;
pub mod splitting;
pub mod stats;
pub mod unification;
pub mod util;

// Re-export commonly used types from fol
pub use fol::{
    Clause, FunctionId, InputType, Interner, KboConfig, Literal, LiteralId, OrderResult,
    PredicateId, Term, TermId, TermOrdering, TermStore,
};

// Re-export the propositional layer
pub use prop::{Bdd, NodeId};

// Re-export inference bookkeeping
pub use inference::{InferenceStore, Rule, UnitId};

// Re-export saturation types
pub use saturation::{Outcome, Prover, SaturationState};

pub use answer::AnswerLiteralManager;
pub use config::{OrderingKind, OutputMode, ProverConfig, SplitMode};
pub use parser::{parse_problem, parse_problem_file, ParseError, Problem};
pub use selection::LiteralSelection;
pub use splitting::Splitter;
pub use stats::{ExecutionPhase, Statistics, TerminationReason};
pub use unification::RobSubstitution;
