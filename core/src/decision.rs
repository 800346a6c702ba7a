//! The outcome of routing one transaction.

use std::collections::VecDeque;
use std::fmt;

use crate::destination::Destination;
use crate::rule::RuleId;

/// Which rule produced a decision.
///
/// Serialized as the rule's uuid, or the sentinel string `DEFAULT` when no
/// rule matched and the engine's default destination was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchedRule {
    /// A stored rule matched.
    Rule(RuleId),
    /// No rule matched; the default destination was used.
    Default,
}

impl MatchedRule {
    /// `true` for the default-destination sentinel.
    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    /// The matching rule's id, if any rule matched.
    #[must_use]
    pub fn rule_id(&self) -> Option<RuleId> {
        match self {
            Self::Rule(id) => Some(*id),
            Self::Default => None,
        }
    }
}

impl fmt::Display for MatchedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rule(id) => write!(f, "{id}"),
            Self::Default => f.write_str("DEFAULT"),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for MatchedRule {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for MatchedRule {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text == "DEFAULT" {
            return Ok(Self::Default);
        }
        text.parse::<RuleId>()
            .map(Self::Rule)
            .map_err(serde::de::Error::custom)
    }
}

/// Where a transaction should go, and why.
///
/// Alternatives are the fallback queue for cascading retries: destinations
/// of lower-priority matching rules, deduplicated, with the default
/// destination last. The primary destination never appears in the queue.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutingDecision {
    destination: Destination,
    matched_rule: MatchedRule,
    reason: String,
    alternatives: VecDeque<Destination>,
}

impl RoutingDecision {
    pub(crate) fn new(
        destination: Destination,
        matched_rule: MatchedRule,
        reason: String,
        alternatives: VecDeque<Destination>,
    ) -> Self {
        Self {
            destination,
            matched_rule,
            reason,
            alternatives,
        }
    }

    /// The selected destination.
    #[must_use]
    #[inline]
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Which rule selected it.
    #[must_use]
    #[inline]
    pub fn matched_rule(&self) -> MatchedRule {
        self.matched_rule
    }

    /// Human-readable explanation of the decision.
    #[must_use]
    #[inline]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// `true` when no rule matched and the default destination was used.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.matched_rule.is_default()
    }

    /// Remaining fallback destinations, nearest first.
    pub fn alternatives(&self) -> impl Iterator<Item = &Destination> {
        self.alternatives.iter()
    }

    /// Consume the nearest fallback destination.
    ///
    /// Each call hands out the next destination to try and removes it from
    /// the queue; `None` means the cascade is exhausted.
    pub fn next_alternative(&mut self) -> Option<Destination> {
        self.alternatives.pop_front()
    }
}
