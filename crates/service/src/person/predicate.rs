//! Constrained filter language for the find-by-clause route.
//!
//! ```text
//! clause     := comparison ( AND comparison )*
//! comparison := column op literal
//! column     := id | first_name | last_name | firstname | lastname
//! op         := = | != | <> | < | <= | > | >= | LIKE
//! literal    := integer | 'text' ('' escapes a quote)
//! ```
//!
//! A bare integer is shorthand for `id = N`. Keywords and column names are
//! case-insensitive. Literals are always bound as statement parameters.

use std::cmp::Ordering;
use std::fmt;

use sea_orm::{sea_query::SimpleExpr, ColumnTrait, Condition};
use thiserror::Error;

use models::person;

use super::domain::Person;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    FirstName,
    LastName,
}

impl Field {
    fn parse(ident: &str) -> Option<Self> {
        match ident.to_ascii_lowercase().as_str() {
            "id" => Some(Field::Id),
            "first_name" | "firstname" => Some(Field::FirstName),
            "last_name" | "lastname" => Some(Field::LastName),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::FirstName => "first_name",
            Field::LastName => "last_name",
        }
    }

    fn column(self) -> person::Column {
        match self {
            Field::Id => person::Column::Id,
            Field::FirstName => person::Column::FirstName,
            Field::LastName => person::Column::LastName,
        }
    }

    fn is_text(self) -> bool {
        !matches!(self, Field::Id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
}

impl Op {
    fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Like => "LIKE",
        }
    }

    fn holds(self, ord: Ordering) -> bool {
        match self {
            Op::Eq => ord == Ordering::Equal,
            Op::Ne => ord != Ordering::Equal,
            Op::Lt => ord == Ordering::Less,
            Op::Le => ord != Ordering::Greater,
            Op::Gt => ord == Ordering::Greater,
            Op::Ge => ord != Ordering::Less,
            Op::Like => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Int(i32),
    Text(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{v}"),
            Literal::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub field: Field,
    pub op: Op,
    pub value: Literal,
}

impl Comparison {
    fn to_expr(&self) -> SimpleExpr {
        let col = self.field.column();
        let v: sea_orm::Value = match &self.value {
            Literal::Int(i) => (*i).into(),
            Literal::Text(s) => s.clone().into(),
        };
        match self.op {
            Op::Eq => col.eq(v),
            Op::Ne => col.ne(v),
            Op::Lt => col.lt(v),
            Op::Le => col.lte(v),
            Op::Gt => col.gt(v),
            Op::Ge => col.gte(v),
            Op::Like => col.like(self.value.to_string()),
        }
    }

    fn matches(&self, p: &Person) -> bool {
        match (self.field, &self.value) {
            (Field::Id, Literal::Int(v)) => self.op.holds(p.id.cmp(v)),
            (Field::FirstName, Literal::Text(s)) => text_holds(self.op, &p.first_name, s),
            (Field::LastName, Literal::Text(s)) => text_holds(self.op, &p.last_name, s),
            _ => false,
        }
    }
}

fn text_holds(op: Op, actual: &str, expected: &str) -> bool {
    if op == Op::Like {
        like_match(actual, expected)
    } else {
        op.holds(actual.cmp(expected))
    }
}

/// SQL `LIKE` with `%` and `_` wildcards, case-sensitive.
fn like_match(text: &str, pattern: &str) -> bool {
    let t: Vec<char> = text.chars().collect();
    // dp[j]: the pattern consumed so far matches t[..j]
    let mut dp = vec![false; t.len() + 1];
    dp[0] = true;
    for pc in pattern.chars() {
        let mut next = vec![false; t.len() + 1];
        match pc {
            '%' => {
                let mut seen = false;
                for j in 0..=t.len() {
                    seen |= dp[j];
                    next[j] = seen;
                }
            }
            '_' => {
                for j in 1..=t.len() {
                    next[j] = dp[j - 1];
                }
            }
            c => {
                for j in 1..=t.len() {
                    next[j] = dp[j - 1] && t[j - 1] == c;
                }
            }
        }
        dp = next;
    }
    dp[t.len()]
}

/// Conjunction of comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filter {
    pub comparisons: Vec<Comparison>,
}

impl Filter {
    pub fn id_eq(id: i32) -> Self {
        Self { comparisons: vec![Comparison { field: Field::Id, op: Op::Eq, value: Literal::Int(id) }] }
    }

    pub fn to_condition(&self) -> Condition {
        self.comparisons
            .iter()
            .fold(Condition::all(), |cond, c| cond.add(c.to_expr()))
    }

    /// Evaluate against an in-memory row with Postgres semantics: `LIKE` is
    /// case-sensitive here, while SQLite's `LIKE` ignores ASCII case.
    pub fn matches(&self, p: &Person) -> bool {
        self.comparisons.iter().all(|c| c.matches(p))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PredicateError {
    #[error("empty predicate")]
    Empty,
    #[error("unexpected character `{0}` at offset {1}")]
    UnexpectedChar(char, usize),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("integer literal out of range: {0}")]
    IntOutOfRange(String),
    #[error("unknown column `{0}`")]
    UnknownColumn(String),
    #[error("expected {expected}, found {found}")]
    Unexpected { expected: &'static str, found: String },
    #[error("column `{0}` cannot be compared that way")]
    TypeMismatch(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Int(String),
    Text(String),
    Op(Op),
}

fn describe(tok: Option<&Token>) -> String {
    match tok {
        None => "end of input".into(),
        Some(Token::Ident(s)) | Some(Token::Int(s)) => format!("`{s}`"),
        Some(Token::Text(s)) => format!("'{s}'"),
        Some(Token::Op(op)) => format!("`{}`", op.as_str()),
    }
}

fn unexpected(expected: &'static str, found: Option<Token>) -> PredicateError {
    PredicateError::Unexpected { expected, found: describe(found.as_ref()) }
}

fn tokenize(input: &str) -> Result<Vec<Token>, PredicateError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some(&(pos, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '\'' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some((_, '\'')) => {
                            if matches!(chars.peek(), Some(&(_, '\''))) {
                                chars.next();
                                text.push('\'');
                            } else {
                                break;
                            }
                        }
                        Some((_, ch)) => text.push(ch),
                        None => return Err(PredicateError::UnterminatedString),
                    }
                }
                tokens.push(Token::Text(text));
            }
            '-' | '0'..='9' => {
                let mut digits = String::from(c);
                chars.next();
                while let Some(&(_, d)) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    digits.push(d);
                    chars.next();
                }
                if digits == "-" {
                    return Err(PredicateError::UnexpectedChar('-', pos));
                }
                tokens.push(Token::Int(digits));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if !(d.is_ascii_alphanumeric() || d == '_') {
                        break;
                    }
                    ident.push(d);
                    chars.next();
                }
                tokens.push(Token::Ident(ident));
            }
            '=' => {
                chars.next();
                tokens.push(Token::Op(Op::Eq));
            }
            '!' => {
                chars.next();
                match chars.next() {
                    Some((_, '=')) => tokens.push(Token::Op(Op::Ne)),
                    _ => return Err(PredicateError::UnexpectedChar('!', pos)),
                }
            }
            '<' => {
                chars.next();
                let op = match chars.peek() {
                    Some(&(_, '=')) => Op::Le,
                    Some(&(_, '>')) => Op::Ne,
                    _ => Op::Lt,
                };
                if op != Op::Lt {
                    chars.next();
                }
                tokens.push(Token::Op(op));
            }
            '>' => {
                chars.next();
                let op = if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    Op::Ge
                } else {
                    Op::Gt
                };
                tokens.push(Token::Op(op));
            }
            other => return Err(PredicateError::UnexpectedChar(other, pos)),
        }
    }
    Ok(tokens)
}

fn parse_int(raw: &str) -> Result<i32, PredicateError> {
    raw.parse::<i32>()
        .map_err(|_| PredicateError::IntOutOfRange(raw.to_string()))
}

fn parse_comparison(tokens: &mut impl Iterator<Item = Token>) -> Result<Comparison, PredicateError> {
    let field = match tokens.next() {
        Some(Token::Ident(name)) => match Field::parse(&name) {
            Some(f) => f,
            None => return Err(PredicateError::UnknownColumn(name)),
        },
        other => return Err(unexpected("column name", other)),
    };
    let op = match tokens.next() {
        Some(Token::Op(op)) => op,
        Some(Token::Ident(kw)) if kw.eq_ignore_ascii_case("like") => Op::Like,
        other => return Err(unexpected("comparison operator", other)),
    };
    let value = match tokens.next() {
        Some(Token::Int(raw)) => Literal::Int(parse_int(&raw)?),
        Some(Token::Text(s)) => Literal::Text(s),
        other => return Err(unexpected("literal", other)),
    };
    let compatible = match &value {
        Literal::Int(_) => !field.is_text() && op != Op::Like,
        Literal::Text(_) => field.is_text(),
    };
    if !compatible {
        return Err(PredicateError::TypeMismatch(field.name()));
    }
    Ok(Comparison { field, op, value })
}

pub fn parse(input: &str) -> Result<Filter, PredicateError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(PredicateError::Empty);
    }
    if let [Token::Int(raw)] = tokens.as_slice() {
        return Ok(Filter::id_eq(parse_int(raw)?));
    }

    let mut comparisons = Vec::new();
    let mut iter = tokens.into_iter();
    loop {
        comparisons.push(parse_comparison(&mut iter)?);
        match iter.next() {
            None => break,
            Some(Token::Ident(kw)) if kw.eq_ignore_ascii_case("and") => continue,
            other => return Err(unexpected("AND", other)),
        }
    }
    Ok(Filter { comparisons })
}
