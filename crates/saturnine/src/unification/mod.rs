//! Unification, matching, and substitution over shared terms
//!
//! Variables carry a *bank* chosen by the caller (0 = goal side, 1 =
//! indexed side, higher banks for further premises), so the same variable
//! number from two clauses never collides and clauses need no up-front
//! renaming. All binding mutations go through a trail so failed branches
//! roll back cheaply.

pub mod matching;
pub mod substitution;

pub use matching::{match_literal, match_term, Matcher};
pub use substitution::{BankedVar, Checkpoint, FreshRenaming, RobSubstitution};
