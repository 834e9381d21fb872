//! Result output: SZS status lines, derivations, answer tuples.

pub mod szs;

pub use szs::{szs_status, write_answer, write_refutation, write_status};
