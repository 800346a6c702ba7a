//! Shared fixtures: the acquirer catalog, the standard rule set, and
//! regional context builders.
//!
//! Everything here mirrors the production shapes the suite needs to
//! exercise; tests that want a one-off store build it inline instead.

use std::sync::Once;

use rust_decimal::Decimal;
use shunt::prelude::*;

/// Default destination for the standard setups.
pub const DEFAULT_ACQUIRER: &str = "Stripe";

/// The full acquirer catalog.
#[must_use]
pub fn acquirers() -> DestinationRegistry {
    [
        "Chase Paymentech",
        "Worldpay",
        "Adyen",
        "Stripe",
        "Checkout.com",
        "BCA (SNAP)",
        "Mandiri (SNAP)",
        "Xendit",
        "DBS (MAX)",
        "UOB",
        "TabaPay",
    ]
    .into_iter()
    .collect()
}

/// The standard five-rule set, priorities 1 through 5.
#[must_use]
pub fn standard_store() -> RuleStore {
    let store = RuleStore::new(acquirers());
    let rules = [
        (
            "US high value",
            "Currency == USD && Amount > 5000",
            "Chase Paymentech",
        ),
        ("European traffic", "Region == EU", "Adyen"),
        (
            "Indonesian QRIS",
            "Method == QRIS && Currency == IDR",
            "BCA (SNAP)",
        ),
        (
            "Singapore PayNow",
            "Method == PayNow && Currency == SGD",
            "DBS (MAX)",
        ),
        ("Low risk", "RiskScore < 10", "Stripe"),
    ];
    for (name, condition, destination) in rules {
        store
            .add_rule(RuleDraft::new(name, condition, destination))
            .expect("standard rule is valid");
    }
    store
}

/// Engine routing unmatched traffic to [`DEFAULT_ACQUIRER`].
#[must_use]
pub fn standard_engine(store: &RuleStore) -> RoutingEngine {
    RoutingEngine::new(&RouterConfig::new(DEFAULT_ACQUIRER), store.registry())
        .expect("default acquirer is registered")
}

/// A US-issued debit card payment.
#[must_use]
pub fn us_card(amount: Decimal) -> TransactionContext {
    TransactionContext::new(
        amount,
        Currency::Usd,
        PaymentMethod::Card,
        Region::Us,
        RiskScore::new(25),
    )
    .with_card_funding(CardFunding::Debit)
    .with_card_country(CountryCode::new("US").expect("static country code"))
}

/// A European wallet payment.
#[must_use]
pub fn eu_wallet(amount: Decimal) -> TransactionContext {
    TransactionContext::new(
        amount,
        Currency::Eur,
        PaymentMethod::Wallet,
        Region::Eu,
        RiskScore::new(20),
    )
}

/// An Indonesian QRIS payment.
#[must_use]
pub fn idr_qris(amount: Decimal) -> TransactionContext {
    TransactionContext::new(
        amount,
        Currency::Idr,
        PaymentMethod::Qr,
        Region::Sea,
        RiskScore::new(15),
    )
}

/// A Singapore PayNow payment.
#[must_use]
pub fn sgd_paynow(amount: Decimal) -> TransactionContext {
    TransactionContext::new(
        amount,
        Currency::Sgd,
        PaymentMethod::RealtimeTransfer,
        Region::Sea,
        RiskScore::new(10),
    )
}

/// A Malaysian DuitNow payment.
#[must_use]
pub fn myr_duitnow(amount: Decimal) -> TransactionContext {
    TransactionContext::new(
        amount,
        Currency::Myr,
        PaymentMethod::RealtimeTransfer,
        Region::Sea,
        RiskScore::new(12),
    )
}

/// Install a process-wide test subscriber, once.
///
/// Safe to call from every test; later calls are no-ops, and a subscriber
/// already installed elsewhere wins quietly. Filtering follows
/// `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn regional_contexts_route_to_their_acquirers() {
        let store = standard_store();
        let engine = standard_engine(&store);
        let snapshot = store.snapshot();

        let cases = [
            (eu_wallet(dec!(80)), "Adyen"),
            (idr_qris(dec!(250_000)), "BCA (SNAP)"),
            (sgd_paynow(dec!(60)), "DBS (MAX)"),
        ];
        for (ctx, expect) in cases {
            let decision = engine.route(&ctx, &snapshot);
            assert_eq!(decision.destination().as_str(), expect);
        }
    }

    #[test]
    fn duitnow_falls_through_to_the_default() {
        let store = standard_store();
        let engine = standard_engine(&store);
        let decision = engine.route(&myr_duitnow(dec!(45)), &store.snapshot());
        assert!(decision.is_default());
        assert_eq!(decision.destination().as_str(), DEFAULT_ACQUIRER);
    }

    #[test]
    fn us_card_below_threshold_is_not_high_value() {
        let store = standard_store();
        let engine = standard_engine(&store);
        let decision = engine.route(&us_card(dec!(4999.99)), &store.snapshot());
        assert!(decision.is_default());

        let decision = engine.route(&us_card(dec!(5000.01)), &store.snapshot());
        assert_eq!(decision.destination().as_str(), "Chase Paymentech");
    }
}
