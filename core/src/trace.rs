//! Evaluation traces for debugging routing behavior.
//!
//! [`RouteTrace`] captures what [`RoutingEngine::route`](crate::RoutingEngine::route)
//! saw on the way to a decision: every active rule in evaluation order and
//! whether its condition held for the transaction. Use
//! [`route_with_trace`](crate::RoutingEngine::route_with_trace) when a
//! decision needs explaining; the plain `route()` skips the bookkeeping.
//!
//! # Example
//!
//! ```ignore
//! let (decision, trace) = engine.route_with_trace(&ctx, &snapshot);
//! for step in &trace.steps {
//!     println!("[{}] {}: matched={}", step.priority, step.rule_name, step.matched);
//! }
//! println!("-> {} ({})", decision.destination(), decision.reason());
//! ```

use crate::rule::RuleId;

/// Trace of a full routing evaluation.
///
/// The decision returned alongside a trace is identical to what `route()`
/// would produce for the same snapshot and transaction.
#[derive(Debug, Clone)]
pub struct RouteTrace {
    /// One entry per active rule, in evaluation order.
    pub steps: Vec<RuleEval>,
    /// Whether the default destination was used.
    pub used_default: bool,
}

impl RouteTrace {
    /// The first matching step, which is the one that decided the route.
    #[must_use]
    pub fn first_match(&self) -> Option<&RuleEval> {
        self.steps.iter().find(|s| s.matched)
    }

    /// `true` when at least one rule matched.
    #[must_use]
    pub fn matched_any(&self) -> bool {
        self.steps.iter().any(|s| s.matched)
    }
}

/// One rule's evaluation in a trace.
#[derive(Debug, Clone)]
pub struct RuleEval {
    /// Id of the rule that was evaluated.
    pub rule_id: RuleId,
    /// The rule's display name.
    pub rule_name: String,
    /// The rule's priority at evaluation time.
    pub priority: u32,
    /// Whether the rule's condition held.
    pub matched: bool,
}
