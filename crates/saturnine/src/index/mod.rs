//! Retrieval indices for saturation
//!
//! The literal discrimination tree answers unification, generalisation,
//! and instance queries over the selected literals of active clauses;
//! the rewrite index tracks oriented unit equalities for demodulation;
//! the variant index recognises clauses equal up to renaming.

pub mod disc_tree;
pub mod variant;

pub use disc_tree::{LiteralIndex, RewriteIndex, RewriteRule};
pub use variant::{are_variants, VariantIndex};
