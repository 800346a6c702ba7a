//! Wire contract for rules, decisions, and engine configuration.
//!
//! Run with: cargo test -p shunt-test --test serde_conformance

use serde_json::json;
use shunt_test::prelude::*;

#[test]
fn rule_wire_shape() {
    let store = standard_store();
    let rule = store
        .list_active()
        .into_iter()
        .find(|r| r.name() == "US high value")
        .expect("fixture rule present");

    // Field order is part of the contract; check the raw text.
    let text = serde_json::to_string(&rule).expect("serialize rule");
    assert_eq!(
        text,
        format!(
            concat!(
                "{{\"id\":\"{}\",\"name\":\"US high value\",\"priority\":1,",
                "\"condition\":\"Currency == USD && Amount > 5000\",",
                "\"destination\":\"Chase Paymentech\",\"active\":true}}"
            ),
            rule.id()
        )
    );

    let value = serde_json::to_value(&rule).expect("serialize rule");
    assert_eq!(value["name"], json!("US high value"));
    assert_eq!(value["priority"], json!(1));
    assert_eq!(value["condition"], json!("Currency == USD && Amount > 5000"));
    assert_eq!(value["destination"], json!("Chase Paymentech"));
    assert_eq!(value["active"], json!(true));
    let id = value["id"].as_str().expect("id is a string");
    assert_eq!(id.parse::<RuleId>().expect("id is a uuid"), rule.id());
}

#[test]
fn rule_round_trips() {
    let store = standard_store();
    for rule in store.list_all() {
        let text = serde_json::to_string(&rule).expect("serialize");
        let back: RoutingRule = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, rule);
    }
}

#[test]
fn condition_canonicalizes_on_the_way_in() {
    let text = json!({
        "id": RuleId::new().to_string(),
        "name": "qris",
        "priority": 3,
        "condition": "method == qris && currency == idr",
        "destination": "BCA (SNAP)",
        "active": true
    });
    let rule: RoutingRule = serde_json::from_value(text).expect("deserialize");
    assert_eq!(
        rule.condition().to_string(),
        "Method == qr && Currency == IDR"
    );
}

#[test]
fn malformed_condition_is_rejected_at_the_wire() {
    let text = json!({
        "id": RuleId::new().to_string(),
        "name": "broken",
        "priority": 1,
        "condition": "Amount >",
        "destination": "Stripe",
        "active": true
    });
    assert!(serde_json::from_value::<RoutingRule>(text).is_err());
}

#[test]
fn draft_defaults_apply_on_deserialize() {
    let draft: RuleDraft = serde_json::from_value(json!({
        "name": "EU",
        "condition": "Region == EU",
        "destination": "Adyen"
    }))
    .expect("deserialize draft");
    assert_eq!(draft.priority, None);
    assert!(draft.active);

    let draft: RuleDraft = serde_json::from_value(json!({
        "name": "EU",
        "condition": "Region == EU",
        "destination": "Adyen",
        "priority": 4,
        "active": false
    }))
    .expect("deserialize draft");
    assert_eq!(draft.priority, Some(4));
    assert!(!draft.active);
}

#[test]
fn decision_carries_the_matched_rule_id() {
    let store = standard_store();
    let engine = standard_engine(&store);
    let decision = engine.route(&eu_wallet(dec!(50)), &store.snapshot());

    let value = serde_json::to_value(&decision).expect("serialize decision");
    assert_eq!(value["destination"], json!("Adyen"));
    let matched = value["matched_rule"].as_str().expect("string sentinel");
    let id = matched.parse::<RuleId>().expect("uuid for a matched rule");
    assert_eq!(Some(id), decision.matched_rule().rule_id());
    assert_eq!(
        value["reason"],
        json!("European traffic matched: Region == EU")
    );
}

#[test]
fn default_decision_serializes_the_sentinel() {
    let store = RuleStore::new(acquirers());
    let engine = standard_engine(&store);
    let decision = engine.route(&us_card(dec!(10)), &store.snapshot());

    let value = serde_json::to_value(&decision).expect("serialize decision");
    assert_eq!(value["matched_rule"], json!("DEFAULT"));
    assert_eq!(value["alternatives"], json!([]));

    let back: RoutingDecision = serde_json::from_value(value).expect("deserialize decision");
    assert_eq!(back, decision);
}

#[test]
fn matched_rule_rejects_garbage() {
    assert_eq!(
        serde_json::from_value::<MatchedRule>(json!("DEFAULT")).expect("sentinel"),
        MatchedRule::Default
    );
    assert!(serde_json::from_value::<MatchedRule>(json!("not-a-uuid")).is_err());
}

#[test]
fn router_config_from_json() {
    let config: RouterConfig =
        serde_json::from_value(json!({ "default_destination": "Stripe" })).expect("config");
    assert_eq!(config, RouterConfig::new("Stripe"));

    let config: RouterConfig = serde_json::from_value(json!({})).expect("empty config");
    assert_eq!(config, RouterConfig::default());
    assert!(RoutingEngine::new(&config, &acquirers()).is_err());
}
