//! shunt - rule-driven payment routing
//!
//! A routing engine that picks a payment processor for each transaction
//! from an ordered list of operator-authored rules, with deterministic
//! fallback when nothing matches.
//!
//! # Architecture
//!
//! - [`TransactionContext`] — the attributes of one transaction
//! - [`Condition`] — a parsed conjunction of field comparisons (`&&` only)
//! - [`RuleStore`] — validated [`RoutingRule`]s behind copy-on-write snapshots
//! - [`RoutingEngine`] — first-match-wins selection over a [`RuleSet`] snapshot
//! - [`RoutingDecision`] — destination, matched rule, reason, fallback queue
//! - [`ExecutionAdapter`] — async seam to the processors themselves
//!
//! # Key Design Insights
//!
//! 1. **Validate on write, evaluate totally**: every syntactic and semantic
//!    check runs when a rule enters the store, so `route()` cannot fail.
//!    A condition over data the transaction does not carry is a non-match,
//!    never an error.
//!
//! 2. **Copy-on-write snapshots**: readers route against an `Arc`'d
//!    [`RuleSet`]; writers build a new one and swap it in. A decision in
//!    flight never observes a half-applied change.
//!
//! 3. **Decisions explain themselves**: every decision names the rule that
//!    fired (or the `DEFAULT` sentinel), carries a reason string, and
//!    queues the fallback destinations for cascading retries.
//!
//! # Example
//!
//! ```
//! use shunt::prelude::*;
//! use rust_decimal_macros::dec;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry: DestinationRegistry = ["Stripe", "Adyen"].into_iter().collect();
//!
//! let store = RuleStore::new(registry);
//! store.add_rule(RuleDraft::new(
//!     "High value",
//!     "Currency == USD && Amount > 5000",
//!     "Adyen",
//! ))?;
//!
//! let engine = RoutingEngine::new(&RouterConfig::new("Stripe"), store.registry())?;
//!
//! let ctx = TransactionContext::new(
//!     dec!(9500),
//!     Currency::Usd,
//!     PaymentMethod::Card,
//!     Region::Us,
//!     RiskScore::new(12),
//! );
//! let decision = engine.route(&ctx, &store.snapshot());
//! assert_eq!(decision.destination().as_str(), "Adyen");
//! assert_eq!(
//!     decision.reason(),
//!     "High value matched: Currency == USD && Amount > 5000"
//! );
//! # Ok(())
//! # }
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod adapter;
mod condition;
mod context;
mod decision;
mod destination;
mod engine;
mod error;
mod field;
mod parse;
mod rule;
mod store;
mod trace;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Transaction attributes
pub use context::{
    CardFunding, CountryCode, Currency, PaymentMethod, Region, RiskScore, TransactionContext,
};

// Conditions
pub use condition::{Clause, CmpOp, Condition, Literal};
pub use field::{Field, FieldValue, ValueKind};

// Rules and storage
pub use destination::{Destination, DestinationRegistry};
pub use rule::{RoutingRule, RuleDraft, RuleId};
pub use store::{RuleSet, RuleStore};

// Engine and decisions
pub use decision::{MatchedRule, RoutingDecision};
pub use engine::{RouterConfig, RoutingEngine};
pub use trace::{RouteTrace, RuleEval};

// Execution
pub use adapter::{AttemptOutcome, ExecutionAdapter};

// Errors
pub use error::{
    ConfigError, InvalidCountryCode, RuleNotFound, UpdateError, ValidationError,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use shunt::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Execution
        AttemptOutcome,
        CardFunding,
        // Conditions
        Clause,
        CmpOp,
        Condition,
        // Errors
        ConfigError,
        CountryCode,
        // Transaction attributes
        Currency,
        // Destinations
        Destination,
        DestinationRegistry,
        ExecutionAdapter,
        Field,
        FieldValue,
        // Decisions
        MatchedRule,
        PaymentMethod,
        Region,
        RiskScore,
        RouteTrace,
        RouterConfig,
        // Engine
        RoutingDecision,
        RoutingEngine,
        // Rules and storage
        RoutingRule,
        RuleDraft,
        RuleEval,
        RuleId,
        RuleNotFound,
        RuleSet,
        RuleStore,
        TransactionContext,
        UpdateError,
        ValidationError,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum byte length of a condition's textual form.
///
/// Bounds the work a single draft can hand the parser. Checked before
/// lexing in [`Condition::parse`].
pub const MAX_CONDITION_LENGTH: usize = 1024;

/// Maximum number of clauses in one condition.
///
/// Conditions are flat conjunctions, so clause count is the only width
/// a condition has. Checked at parse time.
pub const MAX_CLAUSES: usize = 32;

/// Maximum number of rules a store will hold, inactive ones included.
///
/// Bounds the scan `route()` performs per transaction. Checked on add
/// and on hydration.
pub const MAX_RULES: usize = 512;
