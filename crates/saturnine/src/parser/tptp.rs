//! TPTP reader (CNF and FOF)
//!
//! A nom-based parser for the TPTP subset the prover consumes:
//! `cnf`/`fof` annotated formulas and `include` directives. Parsing goes
//! through an untyped AST first; lowering into shared terms happens in
//! `super::mod` with a per-unit variable numbering.

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_while, take_while1},
    character::complete::{char, multispace1},
    combinator::{map, not, opt, recognize, value},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

/// Term of the untyped AST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstTerm {
    Var(String),
    App(String, Vec<AstTerm>),
}

/// Formula of the untyped AST.
#[derive(Debug, Clone, PartialEq)]
pub enum AstFormula {
    Pred(String, Vec<AstTerm>),
    Eq(AstTerm, AstTerm),
    Neq(AstTerm, AstTerm),
    Not(Box<AstFormula>),
    And(Vec<AstFormula>),
    Or(Vec<AstFormula>),
    Implies(Box<AstFormula>, Box<AstFormula>),
    Iff(Box<AstFormula>, Box<AstFormula>),
    Forall(Vec<String>, Box<AstFormula>),
    Exists(Vec<String>, Box<AstFormula>),
}

/// One annotated input unit.
#[derive(Debug, Clone, PartialEq)]
pub enum AstUnit {
    Cnf {
        name: String,
        role: String,
        formula: AstFormula,
    },
    Fof {
        name: String,
        role: String,
        formula: AstFormula,
    },
    Include(String),
}

/// Whitespace and `%`-to-end-of-line / block comments.
fn sp(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            value((), pair(char('%'), opt(is_not("\n")))),
            value((), tuple((tag("/*"), take_until_close, tag("*/")))),
        ))),
    )(input)
}

fn take_until_close(input: &str) -> IResult<&str, &str> {
    match input.find("*/") {
        Some(pos) => Ok((&input[pos..], &input[..pos])),
        None => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::TakeUntil,
        ))),
    }
}

/// Lexeme: skip leading space and comments.
fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    preceded(sp, inner)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Lower-case identifier, digits-led numerals, or single-quoted atom.
fn lower_word(input: &str) -> IResult<&str, String> {
    alt((
        map(
            recognize(pair(
                take_while1(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit()),
                take_while(is_ident_char),
            )),
            |s: &str| s.to_string(),
        ),
        map(
            delimited(char('\''), is_not("'"), char('\'')),
            |s: &str| s.to_string(),
        ),
    ))(input)
}

/// Upper-case variable name.
fn upper_word(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            take_while1(|c: char| c.is_ascii_uppercase()),
            take_while(is_ident_char),
        )),
        |s: &str| s.to_string(),
    )(input)
}

fn term(input: &str) -> IResult<&str, AstTerm> {
    alt((
        map(ws(upper_word), AstTerm::Var),
        map(
            pair(
                ws(lower_word),
                opt(delimited(
                    ws(char('(')),
                    separated_list1(ws(char(',')), term),
                    ws(char(')')),
                )),
            ),
            |(name, args)| AstTerm::App(name, args.unwrap_or_default()),
        ),
    ))(input)
}

/// Atom, equality, or inequality. A bare `=` must not swallow the
/// first character of `=>`.
fn atomic_formula(input: &str) -> IResult<&str, AstFormula> {
    let (rest, lhs) = term(input)?;
    let (rest, op) = opt(alt((
        ws(tag("!=")),
        ws(terminated(tag("="), not(char('>')))),
    )))(rest)?;
    match op {
        Some("=") => {
            let (rest, rhs) = term(rest)?;
            Ok((rest, AstFormula::Eq(lhs, rhs)))
        }
        Some(_) => {
            let (rest, rhs) = term(rest)?;
            Ok((rest, AstFormula::Neq(lhs, rhs)))
        }
        None => match lhs {
            AstTerm::App(name, args) => Ok((rest, AstFormula::Pred(name, args))),
            AstTerm::Var(_) => Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Verify,
            ))),
        },
    }
}

fn quantified(input: &str) -> IResult<&str, AstFormula> {
    let (rest, quantifier) = ws(alt((char('!'), char('?'))))(input)?;
    let (rest, vars) = delimited(
        ws(char('[')),
        separated_list1(ws(char(',')), ws(upper_word)),
        ws(char(']')),
    )(rest)?;
    let (rest, _) = ws(char(':'))(rest)?;
    let (rest, body) = unitary_formula(rest)?;
    let formula = if quantifier == '!' {
        AstFormula::Forall(vars, Box::new(body))
    } else {
        AstFormula::Exists(vars, Box::new(body))
    };
    Ok((rest, formula))
}

fn unitary_formula(input: &str) -> IResult<&str, AstFormula> {
    alt((
        quantified,
        map(preceded(ws(char('~')), unitary_formula), |f| {
            AstFormula::Not(Box::new(f))
        }),
        delimited(ws(char('(')), formula, ws(char(')'))),
        atomic_formula,
    ))(input)
}

/// Binary level: chains of `&` or `|`, or a single `=>` / `<=>`.
fn formula(input: &str) -> IResult<&str, AstFormula> {
    let (rest, first) = unitary_formula(input)?;
    let (rest, op) = opt(alt((
        ws(tag("<=>")),
        ws(tag("=>")),
        ws(tag("&")),
        ws(tag("|")),
    )))(rest)?;
    match op {
        None => Ok((rest, first)),
        Some("<=>") => {
            let (rest, second) = unitary_formula(rest)?;
            Ok((rest, AstFormula::Iff(Box::new(first), Box::new(second))))
        }
        Some("=>") => {
            let (rest, second) = unitary_formula(rest)?;
            Ok((rest, AstFormula::Implies(Box::new(first), Box::new(second))))
        }
        Some(connective) => {
            let (rest, others) =
                separated_list1(ws(tag(connective)), unitary_formula)(rest)?;
            let mut juncts = vec![first];
            juncts.extend(others);
            let combined = if connective == "&" {
                AstFormula::And(juncts)
            } else {
                AstFormula::Or(juncts)
            };
            Ok((rest, combined))
        }
    }
}

fn unit_name(input: &str) -> IResult<&str, String> {
    ws(lower_word)(input)
}

fn annotated(keyword: &'static str) -> impl FnMut(&str) -> IResult<&str, (String, String, AstFormula)> {
    move |input: &str| {
        let (rest, _) = ws(tag(keyword))(input)?;
        let (rest, _) = ws(char('('))(rest)?;
        let (rest, name) = unit_name(rest)?;
        let (rest, _) = ws(char(','))(rest)?;
        let (rest, role) = ws(lower_word)(rest)?;
        let (rest, _) = ws(char(','))(rest)?;
        let (rest, f) = formula(rest)?;
        let (rest, _) = ws(char(')'))(rest)?;
        let (rest, _) = ws(char('.'))(rest)?;
        Ok((rest, (name, role, f)))
    }
}

fn include_directive(input: &str) -> IResult<&str, AstUnit> {
    let (rest, _) = ws(tag("include"))(input)?;
    let (rest, path) = delimited(
        ws(char('(')),
        delimited(ws(char('\'')), is_not("'"), char('\'')),
        ws(char(')')),
    )(rest)?;
    let (rest, _) = ws(char('.'))(rest)?;
    Ok((rest, AstUnit::Include(path.to_string())))
}

fn unit(input: &str) -> IResult<&str, AstUnit> {
    alt((
        map(annotated("cnf"), |(name, role, formula)| AstUnit::Cnf {
            name,
            role,
            formula,
        }),
        map(annotated("fof"), |(name, role, formula)| AstUnit::Fof {
            name,
            role,
            formula,
        }),
        include_directive,
    ))(input)
}

/// Parse a whole TPTP file into AST units.
pub fn parse_units(input: &str) -> Result<Vec<AstUnit>, String> {
    let (rest, units) = many0(unit)(input).map_err(|e| e.to_string())?;
    let (leftover, _) = sp(rest).map_err(|e: nom::Err<nom::error::Error<&str>>| e.to_string())?;
    if !leftover.is_empty() {
        return Err(format!(
            "unexpected input near: {}",
            &leftover[..leftover.len().min(40)]
        ));
    }
    Ok(units)
}
