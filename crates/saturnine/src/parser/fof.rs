//! First-order formulas as parsed from FOF input
//!
//! Atoms are lowered to shared literals at parse time; variables use the
//! unit-local numbering handed out by the parser, so a formula's
//! variables are consistent across its subformulas.

use crate::fol::{InputType, Interner, LiteralId, TermStore};
use std::fmt;

/// A first-order formula over shared literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    /// An atom or its negation, as a shared literal
    Atom(LiteralId),
    Not(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    Iff(Box<Formula>, Box<Formula>),
    Forall(Vec<u32>, Box<Formula>),
    Exists(Vec<u32>, Box<Formula>),
}

impl Formula {
    /// Remove double negations and collapse nested juncts of the same
    /// connective.
    pub fn flatten(self) -> Formula {
        match self {
            Formula::Not(inner) => match inner.flatten() {
                Formula::Not(f) => f.flatten(),
                f => Formula::Not(Box::new(f)),
            },
            Formula::And(fs) => {
                let mut out = Vec::new();
                for f in fs {
                    match f.flatten() {
                        Formula::And(inner) => out.extend(inner),
                        other => out.push(other),
                    }
                }
                if out.len() == 1 {
                    out.pop().unwrap()
                } else {
                    Formula::And(out)
                }
            }
            Formula::Or(fs) => {
                let mut out = Vec::new();
                for f in fs {
                    match f.flatten() {
                        Formula::Or(inner) => out.extend(inner),
                        other => out.push(other),
                    }
                }
                if out.len() == 1 {
                    out.pop().unwrap()
                } else {
                    Formula::Or(out)
                }
            }
            Formula::Implies(a, b) => {
                Formula::Implies(Box::new(a.flatten()), Box::new(b.flatten()))
            }
            Formula::Iff(a, b) => Formula::Iff(Box::new(a.flatten()), Box::new(b.flatten())),
            Formula::Forall(vars, f) => Formula::Forall(vars, Box::new(f.flatten())),
            Formula::Exists(vars, f) => Formula::Exists(vars, Box::new(f.flatten())),
            atom => atom,
        }
    }

    /// Format with store and interner for name resolution.
    pub fn display<'a>(
        &'a self,
        store: &'a TermStore,
        interner: &'a Interner,
    ) -> FormulaDisplay<'a> {
        FormulaDisplay {
            formula: self,
            store,
            interner,
        }
    }
}

/// A named input formula with its role.
#[derive(Debug, Clone)]
pub struct FormulaUnit {
    pub name: String,
    pub input_type: InputType,
    pub formula: Formula,
    /// Set when a preprocessing step replaced this unit
    pub superseded: bool,
}

impl FormulaUnit {
    pub fn new(name: String, input_type: InputType, formula: Formula) -> Self {
        FormulaUnit {
            name,
            input_type,
            formula,
            superseded: false,
        }
    }
}

/// TPTP-syntax display for formulas.
pub struct FormulaDisplay<'a> {
    formula: &'a Formula,
    store: &'a TermStore,
    interner: &'a Interner,
}

impl<'a> FormulaDisplay<'a> {
    fn child(&self, f: &'a Formula) -> FormulaDisplay<'a> {
        FormulaDisplay {
            formula: f,
            store: self.store,
            interner: self.interner,
        }
    }
}

impl<'a> fmt::Display for FormulaDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.formula {
            Formula::Atom(lit) => write!(f, "{}", self.store.display_literal(*lit, self.interner)),
            Formula::Not(inner) => write!(f, "~({})", self.child(inner)),
            Formula::And(fs) => {
                write!(f, "(")?;
                for (i, sub) in fs.iter().enumerate() {
                    if i > 0 {
                        write!(f, " & ")?;
                    }
                    write!(f, "{}", self.child(sub))?;
                }
                write!(f, ")")
            }
            Formula::Or(fs) => {
                write!(f, "(")?;
                for (i, sub) in fs.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", self.child(sub))?;
                }
                write!(f, ")")
            }
            Formula::Implies(a, b) => {
                write!(f, "({} => {})", self.child(a), self.child(b))
            }
            Formula::Iff(a, b) => write!(f, "({} <=> {})", self.child(a), self.child(b)),
            Formula::Forall(vars, inner) => {
                write!(f, "![")?;
                for (i, v) in vars.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "X{}", v)?;
                }
                write!(f, "]: ({})", self.child(inner))
            }
            Formula::Exists(vars, inner) => {
                write!(f, "?[")?;
                for (i, v) in vars.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "X{}", v)?;
                }
                write!(f, "]: ({})", self.child(inner))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fol::PredicateId;

    #[test]
    fn test_flatten_collapses() {
        let mut store = TermStore::new();
        let mut interner = Interner::new();
        let p = interner.intern_predicate("p", 0);
        let q = interner.intern_predicate("q", 0);
        let lp = store.literal(&interner, p, true, vec![]);
        let lq = store.literal(&interner, q, true, vec![]);

        // ~~p flattens to p
        let f = Formula::Not(Box::new(Formula::Not(Box::new(Formula::Atom(lp)))));
        assert_eq!(f.flatten(), Formula::Atom(lp));

        // (p & (q & p)) flattens to one conjunction of three
        let nested = Formula::And(vec![
            Formula::Atom(lp),
            Formula::And(vec![Formula::Atom(lq), Formula::Atom(lp)]),
        ]);
        match nested.flatten() {
            Formula::And(fs) => assert_eq!(fs.len(), 3),
            other => panic!("unexpected {:?}", other),
        }

        let _ = PredicateId::EQUALITY;
    }
}
