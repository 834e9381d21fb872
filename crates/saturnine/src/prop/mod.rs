//! Propositional layer: the BDD guarding split clauses.

pub mod bdd;

pub use bdd::{Bdd, NodeId};
