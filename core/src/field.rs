//! Fields addressable by conditions, and their erased values.
//!
//! [`Field`] names one attribute of a [`TransactionContext`];
//! [`Field::resolve`] extracts it as a [`FieldValue`], the erased type the
//! evaluator compares against literals. Erasure keeps the evaluator
//! uniform: one comparison routine handles every field, and optional
//! attributes surface as [`FieldValue::None`].
//!
//! # Invariant: `FieldValue::None` evaluates to non-match
//!
//! A clause whose field resolves to `None` (a `CardFunding` test on a QR
//! payment, a `metadata.*` key the context never set) is `false`, never an
//! error. The fallback path of the engine depends on this: absent data
//! silently disqualifies a rule instead of aborting the evaluation.

use crate::context::TransactionContext;
use crate::error::ValidationError;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// The comparison domain of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Compared with exact decimal ordering.
    Number,
    /// Compared with canonical-form string equality.
    Text,
}

/// One attribute of a transaction, as named in a condition.
///
/// The seven keyword fields parse case-insensitively; anything spelled
/// `metadata.<key>` addresses the free-form metadata map (keys are
/// case-sensitive). Canonical `Display` spelling is the PascalCase
/// keyword.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    /// Transaction amount (numeric).
    Amount,
    /// Transaction currency.
    Currency,
    /// Payment method, scheme spellings included.
    Method,
    /// Card funding type (absent for non-card methods).
    CardFunding,
    /// Card issuing country (absent when unknown).
    CardCountry,
    /// Region tag.
    Region,
    /// Risk score (numeric).
    RiskScore,
    /// A free-form metadata entry.
    Metadata(String),
}

impl Field {
    /// Which comparison domain this field belongs to.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Amount | Self::RiskScore => ValueKind::Number,
            _ => ValueKind::Text,
        }
    }

    /// Extract this field's value from a context.
    ///
    /// Enumerated attributes come out in their canonical spelling, which
    /// is also what the parser normalized the literal to, so equality on
    /// the extracted text is case-insensitive equality on the original.
    #[must_use]
    pub fn resolve(&self, ctx: &TransactionContext) -> FieldValue {
        match self {
            Self::Amount => FieldValue::Number(ctx.amount()),
            Self::Currency => FieldValue::Text(ctx.currency().to_string()),
            Self::Method => FieldValue::Text(ctx.method().to_string()),
            Self::CardFunding => ctx
                .card_funding()
                .map_or(FieldValue::None, |f| FieldValue::Text(f.to_string())),
            Self::CardCountry => ctx
                .card_country()
                .map_or(FieldValue::None, |c| FieldValue::Text(c.to_string())),
            Self::Region => FieldValue::Text(ctx.region().to_string()),
            Self::RiskScore => FieldValue::Number(Decimal::from(ctx.risk_score().value())),
            Self::Metadata(key) => ctx
                .metadata(key)
                .map_or(FieldValue::None, |v| FieldValue::Text(v.to_string())),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount => f.write_str("Amount"),
            Self::Currency => f.write_str("Currency"),
            Self::Method => f.write_str("Method"),
            Self::CardFunding => f.write_str("CardFunding"),
            Self::CardCountry => f.write_str("CardCountry"),
            Self::Region => f.write_str("Region"),
            Self::RiskScore => f.write_str("RiskScore"),
            Self::Metadata(key) => write!(f, "metadata.{key}"),
        }
    }
}

impl FromStr for Field {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "amount" => Ok(Self::Amount),
            "currency" => Ok(Self::Currency),
            "method" => Ok(Self::Method),
            "cardfunding" | "card_funding" => Ok(Self::CardFunding),
            "cardcountry" | "card_country" => Ok(Self::CardCountry),
            "region" => Ok(Self::Region),
            "riskscore" | "risk_score" => Ok(Self::RiskScore),
            _ => {
                if let Some(key) = lower
                    .starts_with("metadata.")
                    .then(|| &s["metadata.".len()..])
                {
                    if key.is_empty() {
                        return Err(ValidationError::UnknownField(s.to_string()));
                    }
                    // Key case is preserved even though the prefix is not.
                    return Ok(Self::Metadata(key.to_string()));
                }
                Err(ValidationError::UnknownField(s.to_string()))
            }
        }
    }
}

/// An extracted field value, erased to the two comparison domains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// The attribute is absent from the context.
    None,
    /// A numeric attribute.
    Number(Decimal),
    /// A text attribute in canonical spelling.
    Text(String),
}

impl FieldValue {
    /// `true` when the attribute was absent.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}
