//! First-order logic data structures
//!
//! Hash-consed terms and literals, clauses with propositional guards,
//! symbol interning, and the simplification orderings.

pub mod clause;
pub mod interner;
pub mod literal;
pub mod ordering;
pub mod term;

pub use clause::{Clause, ClauseDisplay, InputType};
pub use interner::{Colour, FunctionId, Interner, PredicateId};
pub use literal::{Literal, LiteralDisplay, LiteralId, DEFAULT_SORT};
pub use ordering::{orient_equalities, Kbo, KboConfig, Lpo, OrderResult, TermOrdering};
pub use term::{Term, TermDisplay, TermId, TermStore};
