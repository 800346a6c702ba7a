//! The routing engine: first-match-wins selection with a guaranteed answer.
//!
//! [`RoutingEngine::route`] walks the active rules of a [`RuleSet`] in
//! priority order and picks the first whose condition holds. Matching
//! rules further down the order contribute their destinations to the
//! decision's fallback queue, and the engine's default destination closes
//! the queue, so a cascading caller always has somewhere left to try.
//!
//! `route()` is total: the rules were validated on the way into the store,
//! a condition over absent data evaluates to `false` rather than erroring,
//! and the default destination is checked at construction. Given a
//! snapshot and a transaction there is always exactly one answer.

use std::collections::VecDeque;

use crate::context::TransactionContext;
use crate::decision::{MatchedRule, RoutingDecision};
use crate::destination::{Destination, DestinationRegistry};
use crate::error::ConfigError;
use crate::rule::RoutingRule;
use crate::store::RuleSet;
use crate::trace::{RouteTrace, RuleEval};

/// Engine configuration.
///
/// Deserializable so the default route can come straight from an
/// application config file.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct RouterConfig {
    /// Destination used when no rule matches. Required; engine
    /// construction fails without it.
    pub default_destination: Option<Destination>,
}

impl RouterConfig {
    /// Configuration with the given default destination.
    #[must_use]
    pub fn new(default_destination: impl Into<Destination>) -> Self {
        Self {
            default_destination: Some(default_destination.into()),
        }
    }
}

/// Stateless decision-maker over rule set snapshots.
///
/// The engine holds only its default destination; rules are passed in per
/// call, so one engine serves any number of concurrent routes against any
/// number of snapshots.
#[derive(Debug, Clone)]
pub struct RoutingEngine {
    default_destination: Destination,
}

impl RoutingEngine {
    /// Build an engine, verifying the default destination up front.
    ///
    /// A missing or unregistered default is refused here so that `route()`
    /// never has to fail.
    pub fn new(
        config: &RouterConfig,
        registry: &DestinationRegistry,
    ) -> Result<Self, ConfigError> {
        let default_destination = match &config.default_destination {
            Some(d) if !d.as_str().trim().is_empty() => d.clone(),
            _ => return Err(ConfigError::MissingDefaultDestination),
        };
        if !registry.contains(&default_destination) {
            return Err(ConfigError::UnknownDefaultDestination(default_destination));
        }
        Ok(Self {
            default_destination,
        })
    }

    /// The destination used when no rule matches.
    #[must_use]
    #[inline]
    pub fn default_destination(&self) -> &Destination {
        &self.default_destination
    }

    /// Route one transaction against a rule set snapshot.
    ///
    /// The first active rule whose condition holds selects the
    /// destination. Later matching rules feed the fallback queue, primary
    /// destination excluded and duplicates dropped, with the default
    /// destination appended last. When nothing matches, the decision is
    /// the default destination with an empty queue.
    pub fn route(&self, ctx: &TransactionContext, rules: &RuleSet) -> RoutingDecision {
        let decision = self.decide(ctx, rules, |_, _| {});
        tracing::debug!(
            destination = %decision.destination(),
            matched = %decision.matched_rule(),
            alternatives = decision.alternatives().count(),
            "routing decision"
        );
        decision
    }

    /// Route one transaction, recording every rule evaluation.
    ///
    /// The decision is identical to [`route`](Self::route); the trace
    /// carries one entry per active rule in evaluation order.
    pub fn route_with_trace(
        &self,
        ctx: &TransactionContext,
        rules: &RuleSet,
    ) -> (RoutingDecision, RouteTrace) {
        let mut steps = Vec::new();
        let decision = self.decide(ctx, rules, |rule, matched| {
            steps.push(RuleEval {
                rule_id: rule.id(),
                rule_name: rule.name().to_string(),
                priority: rule.priority(),
                matched,
            });
        });
        let trace = RouteTrace {
            steps,
            used_default: decision.is_default(),
        };
        (decision, trace)
    }

    fn decide<F>(
        &self,
        ctx: &TransactionContext,
        rules: &RuleSet,
        mut observe: F,
    ) -> RoutingDecision
    where
        F: FnMut(&RoutingRule, bool),
    {
        let mut primary: Option<&RoutingRule> = None;
        let mut alternatives: VecDeque<Destination> = VecDeque::new();
        for rule in rules.active() {
            let matched = rule.condition().evaluate(ctx);
            observe(rule, matched);
            if !matched {
                continue;
            }
            match primary {
                None => primary = Some(rule),
                Some(first) => {
                    let dest = rule.destination();
                    if dest != first.destination() && !alternatives.contains(dest) {
                        alternatives.push_back(dest.clone());
                    }
                }
            }
        }
        match primary {
            Some(rule) => {
                if *rule.destination() != self.default_destination
                    && !alternatives.contains(&self.default_destination)
                {
                    alternatives.push_back(self.default_destination.clone());
                }
                RoutingDecision::new(
                    rule.destination().clone(),
                    MatchedRule::Rule(rule.id()),
                    format!("{} matched: {}", rule.name(), rule.condition()),
                    alternatives,
                )
            }
            None => RoutingDecision::new(
                self.default_destination.clone(),
                MatchedRule::Default,
                "no rule matched; default route".to_string(),
                VecDeque::new(),
            ),
        }
    }
}
