//! Problem input: TPTP parsing, lowering, and clausification
//!
//! `parse_problem` reads TPTP text (resolving `include` directives) and
//! lowers it into shared terms: CNF units become clauses directly, FOF
//! units become formula units with conjectures negated. The later
//! preprocessing steps (answer-literal injection, clausification) run
//! over the resulting `Problem` before saturation starts.

pub mod clausify;
pub mod fof;
pub mod tptp;

pub use fof::{Formula, FormulaUnit};

use crate::fol::{Clause, InputType, Interner, LiteralId, TermId, TermStore};
use crate::inference::{InferenceStore, Rule, UnitId};
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tptp::{AstFormula, AstTerm, AstUnit};

/// Errors reported while reading a problem.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("include file not found: {0}")]
    IncludeNotFound(String),
    #[error("circular include: {0}")]
    CircularInclude(String),
}

/// A parsed and lowered problem, ready for preprocessing.
pub struct Problem {
    pub store: TermStore,
    pub interner: Interner,
    /// Initial clauses from CNF input (ids match arena positions)
    pub clauses: Vec<Clause>,
    /// Formula units from FOF input, conjectures already negated
    pub formulas: Vec<FormulaUnit>,
    pub inferences: InferenceStore,
    pub name: String,
}

struct Lowering {
    store: TermStore,
    interner: Interner,
    clauses: Vec<Clause>,
    formulas: Vec<FormulaUnit>,
    inferences: InferenceStore,
}

impl Lowering {
    fn new() -> Self {
        Lowering {
            store: TermStore::new(),
            interner: Interner::new(),
            clauses: Vec::new(),
            formulas: Vec::new(),
            inferences: InferenceStore::new(),
        }
    }

    fn lower_term(&mut self, term: &AstTerm, vars: &mut HashMap<String, u32>) -> TermId {
        match term {
            AstTerm::Var(name) => {
                let next = vars.len() as u32;
                let index = *vars.entry(name.clone()).or_insert(next);
                self.store.var(index)
            }
            AstTerm::App(name, args) => {
                let lowered: Vec<TermId> = args
                    .iter()
                    .map(|a| self.lower_term(a, vars))
                    .collect();
                let f = self
                    .interner
                    .intern_function(name, lowered.len() as u8);
                self.store.app(f, lowered)
            }
        }
    }

    fn lower_atom(
        &mut self,
        formula: &AstFormula,
        polarity: bool,
        vars: &mut HashMap<String, u32>,
    ) -> Result<LiteralId, ParseError> {
        match formula {
            AstFormula::Pred(name, args) => {
                let lowered: Vec<TermId> = args
                    .iter()
                    .map(|a| self.lower_term(a, vars))
                    .collect();
                let p = self
                    .interner
                    .intern_predicate(name, lowered.len() as u8);
                Ok(self.store.literal(&self.interner, p, polarity, lowered))
            }
            AstFormula::Eq(lhs, rhs) => {
                let l = self.lower_term(lhs, vars);
                let r = self.lower_term(rhs, vars);
                Ok(self.store.equality(&self.interner, polarity, l, r))
            }
            AstFormula::Neq(lhs, rhs) => {
                let l = self.lower_term(lhs, vars);
                let r = self.lower_term(rhs, vars);
                Ok(self.store.equality(&self.interner, !polarity, l, r))
            }
            other => Err(ParseError::Syntax(format!(
                "expected a literal, found {:?}",
                other
            ))),
        }
    }

    /// Lower a CNF formula (disjunction of literals) to a literal list.
    fn lower_cnf(
        &mut self,
        formula: &AstFormula,
        vars: &mut HashMap<String, u32>,
        out: &mut Vec<LiteralId>,
    ) -> Result<(), ParseError> {
        match formula {
            AstFormula::Or(juncts) => {
                for j in juncts {
                    self.lower_cnf(j, vars, out)?;
                }
                Ok(())
            }
            AstFormula::Not(inner) => {
                out.push(self.lower_atom(inner, false, vars)?);
                Ok(())
            }
            atom => {
                out.push(self.lower_atom(atom, true, vars)?);
                Ok(())
            }
        }
    }

    /// Lower a FOF formula into the shared representation.
    fn lower_fof(
        &mut self,
        formula: &AstFormula,
        vars: &mut HashMap<String, u32>,
    ) -> Result<Formula, ParseError> {
        match formula {
            AstFormula::Pred(..) | AstFormula::Eq(..) | AstFormula::Neq(..) => {
                Ok(Formula::Atom(self.lower_atom(formula, true, vars)?))
            }
            AstFormula::Not(inner) => Ok(Formula::Not(Box::new(self.lower_fof(inner, vars)?))),
            AstFormula::And(fs) => Ok(Formula::And(
                fs.iter()
                    .map(|f| self.lower_fof(f, vars))
                    .collect::<Result<_, _>>()?,
            )),
            AstFormula::Or(fs) => Ok(Formula::Or(
                fs.iter()
                    .map(|f| self.lower_fof(f, vars))
                    .collect::<Result<_, _>>()?,
            )),
            AstFormula::Implies(a, b) => Ok(Formula::Implies(
                Box::new(self.lower_fof(a, vars)?),
                Box::new(self.lower_fof(b, vars)?),
            )),
            AstFormula::Iff(a, b) => Ok(Formula::Iff(
                Box::new(self.lower_fof(a, vars)?),
                Box::new(self.lower_fof(b, vars)?),
            )),
            AstFormula::Forall(names, body) => {
                let indices = self.bind_vars(names, vars);
                let lowered = self.lower_fof(body, vars)?;
                Ok(Formula::Forall(indices, Box::new(lowered)))
            }
            AstFormula::Exists(names, body) => {
                let indices = self.bind_vars(names, vars);
                let lowered = self.lower_fof(body, vars)?;
                Ok(Formula::Exists(indices, Box::new(lowered)))
            }
        }
    }

    fn bind_vars(&mut self, names: &[String], vars: &mut HashMap<String, u32>) -> Vec<u32> {
        names
            .iter()
            .map(|name| {
                let next = vars.len() as u32;
                *vars.entry(name.clone()).or_insert(next)
            })
            .collect()
    }

    fn add_unit(&mut self, unit: &AstUnit) -> Result<(), ParseError> {
        match unit {
            AstUnit::Cnf { role, formula, .. } => {
                let mut vars = HashMap::new();
                let mut literals = Vec::new();
                self.lower_cnf(formula, &mut vars, &mut literals)?;
                let idx = self.clauses.len();
                let mut clause = Clause::new(literals, &self.store);
                clause.id = Some(idx);
                clause.input_type = InputType::from_tptp_role(role);
                if clause.input_type == InputType::Conjecture {
                    clause.input_type = InputType::NegatedConjecture;
                }
                self.clauses.push(clause);
                self.inferences
                    .record(UnitId::Clause(idx), Rule::Input, vec![]);
                Ok(())
            }
            AstUnit::Fof {
                name,
                role,
                formula,
            } => {
                let mut vars = HashMap::new();
                let lowered = self.lower_fof(formula, &mut vars)?;
                let input_type = InputType::from_tptp_role(role);
                let idx = self.formulas.len();
                self.formulas
                    .push(FormulaUnit::new(name.clone(), input_type, lowered.clone()));
                self.inferences
                    .record(UnitId::Formula(idx), Rule::Input, vec![]);

                if input_type == InputType::Conjecture {
                    // The refutation works on the negated conjecture
                    self.formulas[idx].superseded = true;
                    let negated = Formula::Not(Box::new(lowered)).flatten();
                    let neg_idx = self.formulas.len();
                    self.formulas.push(FormulaUnit::new(
                        format!("{}_negated", name),
                        InputType::NegatedConjecture,
                        negated,
                    ));
                    self.inferences.record(
                        UnitId::Formula(neg_idx),
                        Rule::NegatedConjecture,
                        vec![UnitId::Formula(idx)],
                    );
                }
                Ok(())
            }
            AstUnit::Include(_) => unreachable!("includes resolved before lowering"),
        }
    }
}

fn resolve_include(
    path: &str,
    current_dir: &Path,
    include_dirs: &[PathBuf],
) -> Result<PathBuf, ParseError> {
    let direct = current_dir.join(path);
    if direct.exists() {
        return Ok(direct);
    }
    for dir in include_dirs {
        let candidate = dir.join(path);
        if candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(ParseError::IncludeNotFound(path.to_string()))
}

fn parse_recursive(
    input: &str,
    current_dir: &Path,
    include_dirs: &[PathBuf],
    visited: &mut HashSet<PathBuf>,
    lowering: &mut Lowering,
) -> Result<(), ParseError> {
    let units = tptp::parse_units(input).map_err(ParseError::Syntax)?;
    for unit in &units {
        match unit {
            AstUnit::Include(path) => {
                let resolved = resolve_include(path, current_dir, include_dirs)?;
                if !visited.insert(resolved.clone()) {
                    return Err(ParseError::CircularInclude(path.clone()));
                }
                let content = std::fs::read_to_string(&resolved).map_err(|source| {
                    ParseError::Io {
                        path: resolved.clone(),
                        source,
                    }
                })?;
                let parent = resolved
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
                parse_recursive(&content, &parent, include_dirs, visited, lowering)?;
            }
            other => lowering.add_unit(other)?,
        }
    }
    Ok(())
}

/// Parse TPTP text into a problem.
pub fn parse_problem(
    input: &str,
    include_dirs: &[PathBuf],
    name: &str,
) -> Result<Problem, ParseError> {
    let mut lowering = Lowering::new();
    let mut visited = HashSet::new();
    parse_recursive(
        input,
        Path::new("."),
        include_dirs,
        &mut visited,
        &mut lowering,
    )?;
    Ok(Problem {
        store: lowering.store,
        interner: lowering.interner,
        clauses: lowering.clauses,
        formulas: lowering.formulas,
        inferences: lowering.inferences,
        name: name.to_string(),
    })
}

/// Parse a TPTP problem file.
pub fn parse_problem_file(
    path: &Path,
    include_dirs: &[PathBuf],
) -> Result<Problem, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut lowering = Lowering::new();
    let mut visited = HashSet::new();
    visited.insert(path.to_path_buf());
    let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
    parse_recursive(&content, &parent, include_dirs, &mut visited, &mut lowering)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Problem {
        store: lowering.store,
        interner: lowering.interner,
        clauses: lowering.clauses,
        formulas: lowering.formulas,
        inferences: lowering.inferences,
        name,
    })
}

/// Clausify every active formula unit, appending the produced clauses
/// to the problem's clause list with `Clausify` inferences.
pub fn clausify_problem(problem: &mut Problem) {
    let unit_count = problem.formulas.len();
    for idx in 0..unit_count {
        if problem.formulas[idx].superseded {
            continue;
        }
        let formula = problem.formulas[idx].formula.clone();
        let input_type = problem.formulas[idx].input_type;
        let clause_lists = clausify::clausify(formula, &mut problem.store, &mut problem.interner);
        for literals in clause_lists {
            let clause_idx = problem.clauses.len();
            let mut clause = Clause::new(literals, &problem.store);
            clause.id = Some(clause_idx);
            clause.input_type = input_type;
            problem.clauses.push(clause);
            problem.inferences.record(
                UnitId::Clause(clause_idx),
                Rule::Clausify,
                vec![UnitId::Formula(idx)],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cnf_problem() {
        let problem = parse_problem(
            "cnf(a1, axiom, p). cnf(a2, axiom, ~p).",
            &[],
            "basic",
        )
        .unwrap();
        assert_eq!(problem.clauses.len(), 2);
        assert!(problem.formulas.is_empty());
        assert_eq!(
            problem.inferences.rule(UnitId::Clause(0)),
            Some(Rule::Input)
        );
    }

    #[test]
    fn test_variables_scoped_per_clause() {
        let problem = parse_problem(
            "cnf(a, axiom, p(X) | q(X)). cnf(b, axiom, r(X)).",
            &[],
            "scopes",
        )
        .unwrap();
        // X in clause a and X in clause b both lower to variable 0
        let store = &problem.store;
        let a_args = store.lit(problem.clauses[0].literals[0]).args;
        let b_args = store.lit(problem.clauses[1].literals[0]).args;
        assert_eq!(a_args[0], b_args[0]);
    }

    #[test]
    fn test_conjecture_negated() {
        let problem = parse_problem(
            "fof(g, conjecture, ?[X]: p(X)).",
            &[],
            "conj",
        )
        .unwrap();
        assert_eq!(problem.formulas.len(), 2);
        assert!(problem.formulas[0].superseded);
        assert!(!problem.formulas[1].superseded);
        assert_eq!(
            problem.formulas[1].input_type,
            InputType::NegatedConjecture
        );
        assert_eq!(
            problem.inferences.rule(UnitId::Formula(1)),
            Some(Rule::NegatedConjecture)
        );
        assert!(matches!(problem.formulas[1].formula, Formula::Not(_)));
    }

    #[test]
    fn test_clausify_problem_records_inferences() {
        let mut problem = parse_problem(
            "fof(ax, axiom, ![X]: (p(X) => q(X))).",
            &[],
            "cl",
        )
        .unwrap();
        clausify_problem(&mut problem);
        assert_eq!(problem.clauses.len(), 1);
        assert_eq!(problem.clauses[0].literals.len(), 2);
        assert_eq!(
            problem.inferences.rule(UnitId::Clause(0)),
            Some(Rule::Clausify)
        );
    }

    #[test]
    fn test_unknown_include_fails() {
        let err = parse_problem("include('nope/missing.ax').", &[], "inc");
        assert!(matches!(err, Err(ParseError::IncludeNotFound(_))));
    }
}
