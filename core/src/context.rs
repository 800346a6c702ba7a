//! `TransactionContext`: the immutable per-evaluation input.
//!
//! A context is fully resolved by the caller before it reaches the engine.
//! Nothing here fetches data: risk scoring, region derivation, and bin
//! lookups all happen upstream, and the engine only reads what it is
//! handed. Optional attributes (`card_funding`, `card_country`) stay
//! `None` for methods that have no card leg; conditions referencing them
//! then evaluate to non-match, never to an error.
//!
//! The enumerated attributes are closed sets. Each derives a
//! case-insensitive `FromStr` and a canonical `Display` spelling, which is
//! what the condition parser uses to normalize literals and what
//! [`Field::resolve`](crate::Field::resolve) emits at extraction time, so
//! string comparisons in clauses reduce to exact equality of canonical
//! forms.
//!
//! # Example
//!
//! ```
//! use rust_decimal::Decimal;
//! use shunt::{CardFunding, CountryCode, Currency, PaymentMethod, Region, RiskScore, TransactionContext};
//!
//! let ctx = TransactionContext::new(
//!     Decimal::new(1500, 2), // 15.00
//!     Currency::Usd,
//!     PaymentMethod::Card,
//!     Region::Us,
//!     RiskScore::new(25),
//! )
//! .with_card_funding(CardFunding::Debit)
//! .with_card_country("US".parse::<CountryCode>().unwrap())
//! .with_metadata("merchant_tier", "gold");
//!
//! assert_eq!(ctx.currency().to_string(), "USD");
//! assert_eq!(ctx.metadata("merchant_tier"), Some("gold"));
//! ```

use crate::error::InvalidCountryCode;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Transaction currency (closed ISO 4217-like set).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(ascii_case_insensitive, serialize_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Jpy,
    Sgd,
    Idr,
    Myr,
    Thb,
    Vnd,
    Php,
}

/// How the payment is carried.
///
/// Regional rail schemes are accepted as spellings of their method when
/// parsing conditions: `QRIS` is a QR payment, `VA` is a virtual account,
/// and `PayNow`/`DuitNow`/`BI-FAST` are real-time transfers. The canonical
/// spelling is always the snake_case method name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum PaymentMethod {
    #[strum(serialize = "card")]
    Card,
    #[strum(serialize = "wallet")]
    Wallet,
    #[strum(serialize = "bank_transfer")]
    BankTransfer,
    #[strum(to_string = "qr", serialize = "qris")]
    Qr,
    #[strum(to_string = "virtual_account", serialize = "va")]
    VirtualAccount,
    #[strum(
        to_string = "realtime_transfer",
        serialize = "paynow",
        serialize = "duitnow",
        serialize = "bi-fast",
        serialize = "bi_fast"
    )]
    RealtimeTransfer,
    #[strum(serialize = "crypto")]
    Crypto,
}

/// Card funding type from the token's bin metadata.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum CardFunding {
    Debit,
    Credit,
    Prepaid,
}

/// Region tag, derived externally (issuer/country mapping).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(ascii_case_insensitive, serialize_all = "UPPERCASE")]
pub enum Region {
    Us,
    Eu,
    Uk,
    Apac,
    Sea,
    Latam,
}

/// Externally computed risk score, 0 to 100.
///
/// Construction saturates at 100 so a context can always be built from
/// whatever the scoring collaborator produced; the engine never rejects a
/// resolved context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RiskScore(u8);

impl RiskScore {
    /// Highest representable score.
    pub const MAX: u8 = 100;

    /// Build a score, saturating values above [`Self::MAX`].
    #[must_use]
    pub fn new(score: u8) -> Self {
        Self(score.min(Self::MAX))
    }

    /// The score as an integer.
    #[must_use]
    #[inline]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<u8> for RiskScore {
    fn from(score: u8) -> Self {
        Self::new(score)
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Two-letter country code, stored uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountryCode([u8; 2]);

impl CountryCode {
    /// Parse a two-ASCII-letter code, normalizing to uppercase.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCountryCode`] for anything that is not exactly two
    /// ASCII letters.
    pub fn new(code: &str) -> Result<Self, InvalidCountryCode> {
        let bytes = code.as_bytes();
        if bytes.len() == 2 && bytes.iter().all(u8::is_ascii_alphabetic) {
            Ok(Self([
                bytes[0].to_ascii_uppercase(),
                bytes[1].to_ascii_uppercase(),
            ]))
        } else {
            Err(InvalidCountryCode {
                value: code.to_string(),
            })
        }
    }
}

impl FromStr for CountryCode {
    type Err = InvalidCountryCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0[0] as char, self.0[1] as char)
    }
}

/// The resolved input to one routing evaluation.
///
/// Amounts are minor-unit-free decimals (USD 20.00 is `20.00`, not
/// `2000`), compared with exact decimal semantics. The metadata map holds
/// free-form extension attributes addressable in conditions as
/// `metadata.<key>`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionContext {
    amount: Decimal,
    currency: Currency,
    method: PaymentMethod,
    card_funding: Option<CardFunding>,
    card_country: Option<CountryCode>,
    region: Region,
    risk_score: RiskScore,
    metadata: BTreeMap<String, String>,
}

impl TransactionContext {
    /// Build a context from the attributes every transaction carries.
    ///
    /// Optional attributes are attached with the `with_*` builders.
    #[must_use]
    pub fn new(
        amount: Decimal,
        currency: Currency,
        method: PaymentMethod,
        region: Region,
        risk_score: RiskScore,
    ) -> Self {
        Self {
            amount,
            currency,
            method,
            card_funding: None,
            card_country: None,
            region,
            risk_score,
            metadata: BTreeMap::new(),
        }
    }

    /// Attach the card funding type (card-like methods only).
    #[must_use]
    pub fn with_card_funding(mut self, funding: CardFunding) -> Self {
        self.card_funding = Some(funding);
        self
    }

    /// Attach the card issuing country.
    #[must_use]
    pub fn with_card_country(mut self, country: CountryCode) -> Self {
        self.card_country = Some(country);
        self
    }

    /// Attach one metadata entry, addressable as `metadata.<key>`.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Transaction amount in minor-unit-free decimal units.
    #[must_use]
    #[inline]
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Transaction currency.
    #[must_use]
    #[inline]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Payment method.
    #[must_use]
    #[inline]
    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    /// Card funding type, if the method has a card leg.
    #[must_use]
    #[inline]
    pub fn card_funding(&self) -> Option<CardFunding> {
        self.card_funding
    }

    /// Card issuing country, if known.
    #[must_use]
    #[inline]
    pub fn card_country(&self) -> Option<CountryCode> {
        self.card_country
    }

    /// Region tag.
    #[must_use]
    #[inline]
    pub fn region(&self) -> Region {
        self.region
    }

    /// Externally computed risk score.
    #[must_use]
    #[inline]
    pub fn risk_score(&self) -> RiskScore {
        self.risk_score
    }

    /// Look up one metadata value.
    #[must_use]
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}
