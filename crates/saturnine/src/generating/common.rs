//! Shared helpers for generating inference rules
//!
//! Binary rules keep the given clause in bank 0 and the partner clause
//! in bank 1, so the two never collide even when a clause is paired with
//! itself. Conclusions are built by applying the accumulated unifier and
//! renaming surviving variables fresh from zero.

use crate::fol::{Interner, LiteralId, TermStore};
use crate::unification::{FreshRenaming, RobSubstitution};

/// Apply `subst` to all literals of `side` except the one at `skip`,
/// appending the results to `out`.
pub fn collect_side_literals(
    store: &mut TermStore,
    interner: &Interner,
    subst: &RobSubstitution,
    renaming: &mut FreshRenaming,
    side: &[LiteralId],
    bank: u8,
    skip: usize,
    out: &mut Vec<LiteralId>,
) {
    for (i, &lit) in side.iter().enumerate() {
        if i == skip {
            continue;
        }
        out.push(subst.apply_literal(store, interner, lit, bank, renaming));
    }
}

/// Drop duplicate literals from a freshly built conclusion.
pub fn dedup_literals(literals: Vec<LiteralId>) -> Vec<LiteralId> {
    let mut out: Vec<LiteralId> = Vec::with_capacity(literals.len());
    for lit in literals {
        if !out.contains(&lit) {
            out.push(lit);
        }
    }
    out
}
