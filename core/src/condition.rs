//! Conditions: the parsed form of a rule's boolean expression.
//!
//! A [`Condition`] is a conjunction of [`Clause`]s, each comparing one
//! [`Field`] against a [`Literal`] with a [`CmpOp`]. The textual grammar
//! (`"Currency == USD && Amount > 5000"`) lives in [`crate::parse`]; this
//! module is the runtime side: total evaluation, canonical display, and
//! the string-form serde used by the rule JSON contract.
//!
//! Evaluation never fails. Everything that could go wrong (unknown field,
//! ordering operator on text, out-of-domain literal) was rejected when the
//! condition was parsed, and absent context attributes evaluate clauses to
//! `false` rather than erroring. An empty condition is the catch-all: it
//! holds for every context.
//!
//! # Example
//!
//! ```
//! use rust_decimal::Decimal;
//! use shunt::{Condition, Currency, PaymentMethod, Region, RiskScore, TransactionContext};
//!
//! let cond: Condition = "Currency == EUR && Amount > 500".parse().unwrap();
//! let ctx = TransactionContext::new(
//!     Decimal::new(750, 0),
//!     Currency::Eur,
//!     PaymentMethod::Wallet,
//!     Region::Eu,
//!     RiskScore::new(20),
//! );
//! assert!(cond.evaluate(&ctx));
//! assert_eq!(cond.to_string(), "Currency == EUR && Amount > 500");
//! ```

use crate::context::TransactionContext;
use crate::field::{Field, FieldValue};
use crate::parse;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Comparison operator of a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>` (numeric fields only)
    Gt,
    /// `<` (numeric fields only)
    Lt,
    /// `>=` (numeric fields only)
    Ge,
    /// `<=` (numeric fields only)
    Le,
}

impl CmpOp {
    /// The operator's source spelling.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
        }
    }

    /// `true` for the operators restricted to numeric fields.
    #[must_use]
    pub fn is_ordering(self) -> bool {
        matches!(self, Self::Gt | Self::Lt | Self::Ge | Self::Le)
    }

    fn holds(self, ord: Ordering) -> bool {
        match self {
            Self::Eq => ord == Ordering::Equal,
            Self::Ne => ord != Ordering::Equal,
            Self::Gt => ord == Ordering::Greater,
            Self::Lt => ord == Ordering::Less,
            Self::Ge => ord != Ordering::Less,
            Self::Le => ord != Ordering::Greater,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for CmpOp {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            ">" => Ok(Self::Gt),
            "<" => Ok(Self::Lt),
            ">=" => Ok(Self::Ge),
            "<=" => Ok(Self::Le),
            _ => Err(ValidationError::UnknownOperator(s.to_string())),
        }
    }
}

/// The right-hand side of a clause.
///
/// Text literals for enumerated fields are stored in the field's canonical
/// spelling (the parser normalizes them), so evaluation is a plain
/// equality check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// An exact decimal.
    Number(Decimal),
    /// A text value, canonicalized where the field's domain is closed.
    Text(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(t) if parse::lexes_as_ident(t) => f.write_str(t),
            Self::Text(t) if !t.contains('\'') => write!(f, "'{t}'"),
            Self::Text(t) => write!(f, "\"{t}\""),
        }
    }
}

/// One `field op literal` comparison.
///
/// Parsed clauses uphold the grammar's typing rules. `Clause::new` is the
/// unvalidated programmatic path; a hand-built clause that pairs an
/// ordering operator with a text field simply never matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    field: Field,
    op: CmpOp,
    literal: Literal,
}

impl Clause {
    /// Build a clause directly, bypassing grammar validation.
    ///
    /// Quoted strings in the grammar carry no escapes, so a text literal
    /// containing both `'` and `"` has no parseable spelling: the clause
    /// still displays and evaluates, but its `Display` output cannot
    /// round-trip through [`Condition::parse`].
    #[must_use]
    pub fn new(field: Field, op: CmpOp, literal: Literal) -> Self {
        Self { field, op, literal }
    }

    /// The field being compared.
    #[must_use]
    #[inline]
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// The comparison operator.
    #[must_use]
    #[inline]
    pub fn op(&self) -> CmpOp {
        self.op
    }

    /// The right-hand side.
    #[must_use]
    #[inline]
    pub fn literal(&self) -> &Literal {
        &self.literal
    }

    /// Evaluate against a context. Total: absent fields and domain
    /// mismatches are `false`, never errors.
    #[must_use]
    pub fn evaluate(&self, ctx: &TransactionContext) -> bool {
        match (self.field.resolve(ctx), &self.literal) {
            (FieldValue::None, _) => false,
            (FieldValue::Number(have), Literal::Number(want)) => self.op.holds(have.cmp(want)),
            (FieldValue::Text(have), Literal::Text(want)) => match self.op {
                CmpOp::Eq => have == *want,
                CmpOp::Ne => have != *want,
                // The parser rejects ordering on text; hand-built clauses
                // land here and never match.
                _ => false,
            },
            _ => false,
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.literal)
    }
}

/// A conjunction of clauses. Empty means "always matches".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Condition {
    clauses: Vec<Clause>,
}

impl Condition {
    /// The catch-all condition (zero clauses, holds for every context).
    #[must_use]
    pub fn always() -> Self {
        Self::default()
    }

    /// Build from already-constructed clauses.
    #[must_use]
    pub fn from_clauses(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }

    /// Parse the textual grammar.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for malformed syntax, unknown fields or
    /// operators, typing violations, out-of-domain enumerated literals,
    /// and oversized input. See [`crate::parse`].
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        parse::parse_condition(input)
    }

    /// The clauses in source order.
    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// `true` for the catch-all (empty) condition.
    #[must_use]
    pub fn is_always(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluate the conjunction. Short-circuits on the first `false`
    /// clause; an empty condition is `true`.
    #[must_use]
    pub fn evaluate(&self, ctx: &TransactionContext) -> bool {
        self.clauses.iter().all(|clause| clause.evaluate(ctx))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(" && ")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}

impl FromStr for Condition {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Condition {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Condition {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
