//! Conformance tests for routing semantics.
//!
//! Run with: cargo test -p shunt-test --test conformance

use shunt_test::prelude::*;

/// Two-rule set: EU high value to Adyen, US debit to TabaPay.
fn regional_store() -> RuleStore {
    let store = RuleStore::new(acquirers());
    store
        .add_rule(
            RuleDraft::new("EU high value", "Currency == EUR && Amount > 500", "Adyen")
                .with_priority(1),
        )
        .expect("valid rule");
    store
        .add_rule(
            RuleDraft::new(
                "US debit",
                "CardFunding == debit && Currency == USD",
                "TabaPay",
            )
            .with_priority(2),
        )
        .expect("valid rule");
    store
}

fn engine(store: &RuleStore) -> RoutingEngine {
    standard_engine(store)
}

fn usd_debit(amount: rust_decimal::Decimal) -> TransactionContext {
    TransactionContext::new(
        amount,
        Currency::Usd,
        PaymentMethod::Card,
        Region::Us,
        RiskScore::new(30),
    )
    .with_card_funding(CardFunding::Debit)
}

#[test]
fn second_rule_catches_what_the_first_misses() {
    init_tracing();
    let store = regional_store();
    let decision = engine(&store).route(&usd_debit(dec!(15)), &store.snapshot());

    assert_eq!(decision.destination().as_str(), "TabaPay");
    assert_eq!(
        decision.reason(),
        "US debit matched: CardFunding == debit && Currency == USD"
    );
    assert!(!decision.is_default());
}

#[test]
fn unmatched_context_takes_the_default() {
    init_tracing();
    let store = regional_store();
    let ctx = TransactionContext::new(
        dec!(10),
        Currency::Gbp,
        PaymentMethod::Card,
        Region::Uk,
        RiskScore::new(30),
    );
    let decision = engine(&store).route(&ctx, &store.snapshot());

    assert_eq!(decision.destination().as_str(), DEFAULT_ACQUIRER);
    assert_eq!(decision.matched_rule(), MatchedRule::Default);
    assert_eq!(decision.reason(), "no rule matched; default route");
    assert_eq!(decision.alternatives().count(), 0);
}

#[test]
fn inactive_rule_is_never_selected() {
    init_tracing();
    let store = RuleStore::new(acquirers());
    store
        .add_rule(
            RuleDraft::new("Indonesian QRIS", "Method == QRIS && Currency == IDR", "BCA (SNAP)")
                .with_priority(1)
                .inactive(),
        )
        .expect("valid rule");

    let decision = engine(&store).route(&idr_qris(dec!(50_000)), &store.snapshot());
    assert_eq!(decision.destination().as_str(), DEFAULT_ACQUIRER);
    assert!(decision.is_default());
}

#[test]
fn empty_condition_is_a_catch_all() {
    init_tracing();
    let store = RuleStore::new(acquirers());
    store
        .add_rule(RuleDraft::new("Low risk", "RiskScore < 10", "Stripe").with_priority(1))
        .expect("valid rule");
    store
        .add_rule(RuleDraft::new("Catch all", "", "Adyen").with_priority(2))
        .expect("valid rule");

    let risky = TransactionContext::new(
        dec!(100),
        Currency::Usd,
        PaymentMethod::Card,
        Region::Us,
        RiskScore::new(45),
    );
    let decision = engine(&store).route(&risky, &store.snapshot());
    assert_eq!(decision.destination().as_str(), "Adyen");
    assert_eq!(decision.reason(), "Catch all matched: ");
}

#[test]
fn absent_field_clause_is_a_non_match_not_an_error() {
    init_tracing();
    let store = RuleStore::new(acquirers());
    store
        .add_rule(RuleDraft::new("Debit only", "CardFunding == debit", "TabaPay"))
        .expect("valid rule");

    // eu_wallet carries no card funding at all.
    let decision = engine(&store).route(&eu_wallet(dec!(25)), &store.snapshot());
    assert!(decision.is_default());
}

#[test]
fn first_match_wins_over_later_matches() {
    init_tracing();
    let store = RuleStore::new(acquirers());
    store
        .add_rule(RuleDraft::new("first", "Amount > 1", "Adyen").with_priority(1))
        .expect("valid rule");
    store
        .add_rule(RuleDraft::new("also matches", "Amount > 1", "UOB").with_priority(2))
        .expect("valid rule");

    let decision = engine(&store).route(&us_card(dec!(50)), &store.snapshot());
    assert_eq!(decision.destination().as_str(), "Adyen");
    let queued: Vec<&str> = decision.alternatives().map(Destination::as_str).collect();
    assert_eq!(queued, ["UOB", "Stripe"]);
}

#[test]
fn routing_is_deterministic() {
    init_tracing();
    let store = standard_store();
    let engine = engine(&store);
    let snapshot = store.snapshot();
    let ctx = us_card(dec!(7500));

    let first = engine.route(&ctx, &snapshot);
    for _ in 0..10 {
        assert_eq!(engine.route(&ctx, &snapshot), first);
    }
}

#[test]
fn standard_rules_cover_their_regions() {
    init_tracing();
    let store = standard_store();
    let engine = engine(&store);
    let snapshot = store.snapshot();

    let cases: [(TransactionContext, &str); 5] = [
        (us_card(dec!(9000)), "Chase Paymentech"),
        (eu_wallet(dec!(40)), "Adyen"),
        (idr_qris(dec!(150_000)), "BCA (SNAP)"),
        (sgd_paynow(dec!(80)), "DBS (MAX)"),
        (myr_duitnow(dec!(30)), "Stripe"),
    ];
    for (ctx, expect) in cases {
        assert_eq!(engine.route(&ctx, &snapshot).destination().as_str(), expect);
    }
}

#[test]
fn reason_shows_the_canonical_condition() {
    init_tracing();
    let store = standard_store();
    let decision = engine(&store).route(&idr_qris(dec!(75_000)), &store.snapshot());

    // `QRIS` and `PayNow` style aliases canonicalize at parse time.
    assert_eq!(
        decision.reason(),
        "Indonesian QRIS matched: Method == qr && Currency == IDR"
    );
}

#[test]
fn trace_explains_the_walk() {
    init_tracing();
    let store = standard_store();
    let ctx = sgd_paynow(dec!(80));
    let (decision, trace) = engine(&store).route_with_trace(&ctx, &store.snapshot());

    assert_eq!(decision.destination().as_str(), "DBS (MAX)");
    assert_eq!(trace.steps.len(), 5);
    assert!(!trace.used_default);
    let matched: Vec<bool> = trace.steps.iter().map(|s| s.matched).collect();
    assert_eq!(matched, [false, false, false, true, false]);
    assert_eq!(trace.first_match().unwrap().rule_name, "Singapore PayNow");
}
