//! Error taxonomy for the routing core.
//!
//! Every error here belongs to the write path (rule creation, store
//! mutation, engine construction). The read path is total by design:
//! [`RoutingEngine::route`](crate::RoutingEngine::route) and
//! [`Condition::evaluate`](crate::Condition::evaluate) cannot fail for a
//! rule set that passed validation, because everything that could go wrong
//! is rejected before a rule enters the active set.

use crate::condition::CmpOp;
use crate::destination::Destination;
use crate::field::Field;
use crate::rule::RuleId;
use thiserror::Error;

/// Errors raised while validating a rule draft or its condition.
///
/// Raised at rule creation/edit time, never during `route()`. Fix the
/// draft and resubmit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The rule name is empty or whitespace-only.
    #[error("rule name must not be empty")]
    EmptyName,

    /// The rule's destination is not in the destination registry.
    #[error("unknown destination `{0}`")]
    UnknownDestination(Destination),

    /// Two hydrated rules carry the same id.
    #[error("duplicate rule id `{0}`")]
    DuplicateRuleId(RuleId),

    /// The condition text is not well formed.
    #[error("condition syntax error at byte {at}: {message}")]
    Syntax {
        /// Byte offset of the offending token.
        at: usize,
        /// What the parser expected or found.
        message: String,
    },

    /// An identifier in field position is not a known field keyword or a
    /// `metadata.<key>` reference.
    #[error("unknown field `{0}`")]
    UnknownField(String),

    /// A comparison operator that is not one of `==`, `!=`, `>`, `<`,
    /// `>=`, `<=`.
    #[error("unknown operator `{0}`")]
    UnknownOperator(String),

    /// An ordering operator applied to a text field.
    #[error("operator `{op}` needs a numeric field, but `{field}` is text")]
    NumericOperatorOnText {
        /// The text field in the clause.
        field: Field,
        /// The ordering operator that was used.
        op: CmpOp,
    },

    /// A non-numeric literal compared against a numeric field.
    #[error("field `{field}` compares against numbers, got `{value}`")]
    ExpectedNumber {
        /// The numeric field in the clause.
        field: Field,
        /// The literal as written.
        value: String,
    },

    /// A literal outside the closed domain of an enumerated field.
    #[error("`{value}` is not a valid value for field `{field}`")]
    UnknownValue {
        /// The enumerated field in the clause.
        field: Field,
        /// The literal as written.
        value: String,
    },

    /// The condition text exceeds [`MAX_CONDITION_LENGTH`](crate::MAX_CONDITION_LENGTH).
    #[error("condition is {len} bytes, but the maximum is {max}")]
    ConditionTooLong {
        /// Actual length in bytes.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// The condition has more clauses than [`MAX_CLAUSES`](crate::MAX_CLAUSES).
    #[error("condition has {count} clauses, but the maximum is {max}")]
    TooManyClauses {
        /// Actual clause count.
        count: usize,
        /// Maximum allowed count.
        max: usize,
    },

    /// The store is at [`MAX_RULES`](crate::MAX_RULES) capacity.
    #[error("store holds {count} rules, but the maximum is {max}")]
    TooManyRules {
        /// Rules currently held.
        count: usize,
        /// Maximum allowed count.
        max: usize,
    },

    /// The priority space is exhausted: the requested rank and every rank
    /// above it are held by active rules, up to `u32::MAX`.
    #[error("no free priority at or above {requested}")]
    PriorityUnavailable {
        /// The requested rank; for appends, the occupied active maximum.
        requested: u32,
    },
}

/// A mutation referenced a rule id that is not in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no rule with id `{id}`")]
pub struct RuleNotFound {
    /// The id that was looked up.
    pub id: RuleId,
}

/// Errors from [`RuleStore::update_rule`](crate::RuleStore::update_rule).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    /// The replacement draft failed validation; the stored rule is untouched.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// No rule with the given id exists.
    #[error(transparent)]
    NotFound(#[from] RuleNotFound),
}

/// Fatal engine construction errors.
///
/// A misconfigured default destination is a startup-time problem, never a
/// per-request one: [`RoutingEngine::new`](crate::RoutingEngine::new)
/// refuses to construct an engine that could not answer every `route()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No default destination was configured.
    #[error("default destination is not configured")]
    MissingDefaultDestination,
    /// The configured default is not in the destination registry.
    #[error("default destination `{0}` is not in the destination registry")]
    UnknownDefaultDestination(Destination),
}

/// A country code that is not exactly two ASCII letters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{value}` is not a two-letter country code")]
pub struct InvalidCountryCode {
    /// The rejected input.
    pub value: String,
}
