//! Routing rules and the drafts they are created from.
//!
//! A [`RoutingRule`] is an immutable description: evaluation order comes
//! from `priority` (ascending, lower first), applicability from
//! `condition`, and the outcome is `destination`. Inactive rules stay in
//! the store for audit but are never evaluated.
//!
//! Rules enter the store through a [`RuleDraft`], which carries the
//! condition as text; [`RuleStore::add_rule`](crate::RuleStore::add_rule)
//! parses and validates it, assigns the id, and settles the priority.
//!
//! With the `serde` feature the rule serializes as
//! `{id, name, priority, condition, destination, active}` with the
//! condition in its canonical string form. That shape is the contract an
//! external management surface speaks.

use crate::condition::Condition;
use crate::destination::Destination;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique rule identifier, assigned at creation, immutable after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct RuleId(Uuid);

impl RuleId {
    /// Mint a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    #[must_use]
    #[inline]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RuleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RuleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// One routing rule, as held by the store.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutingRule {
    pub(crate) id: RuleId,
    pub(crate) name: String,
    pub(crate) priority: u32,
    pub(crate) condition: Condition,
    pub(crate) destination: Destination,
    pub(crate) active: bool,
}

impl RoutingRule {
    /// Assemble a rule from already-validated parts.
    ///
    /// The store is the validating path; rules built here and handed to
    /// [`RuleStore::with_rules`](crate::RuleStore::with_rules) are
    /// re-checked on entry.
    #[must_use]
    pub fn new(
        id: RuleId,
        name: impl Into<String>,
        priority: u32,
        condition: Condition,
        destination: impl Into<Destination>,
        active: bool,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            priority,
            condition,
            destination: destination.into(),
            active,
        }
    }

    /// The rule's identifier.
    #[must_use]
    #[inline]
    pub fn id(&self) -> RuleId {
        self.id
    }

    /// Display label.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluation rank, ascending (lower evaluates first).
    #[must_use]
    #[inline]
    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// The applicability condition.
    #[must_use]
    #[inline]
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Where matching transactions go.
    #[must_use]
    #[inline]
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Whether the rule participates in evaluation.
    #[must_use]
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl fmt::Display for RoutingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} -> {} ({})",
            self.priority,
            self.name,
            self.destination,
            if self.active { "active" } else { "inactive" }
        )
    }
}

#[cfg(feature = "serde")]
fn default_active() -> bool {
    true
}

/// Input to rule creation and update.
///
/// The condition travels as text and is parsed by the store. A draft
/// without a priority is appended after the current active maximum on
/// add, and keeps the rule's existing priority on update.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleDraft {
    /// Display label, must be non-empty.
    pub name: String,
    /// Condition in the textual grammar; empty means catch-all.
    pub condition: String,
    /// Target destination, validated against the registry.
    pub destination: Destination,
    /// Explicit evaluation rank; `None` lets the store choose.
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: Option<u32>,
    /// Whether the rule starts active. Defaults to `true`.
    #[cfg_attr(feature = "serde", serde(default = "default_active"))]
    pub active: bool,
}

impl RuleDraft {
    /// Draft an active rule with store-assigned priority.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        condition: impl Into<String>,
        destination: impl Into<Destination>,
    ) -> Self {
        Self {
            name: name.into(),
            condition: condition.into(),
            destination: destination.into(),
            priority: None,
            active: true,
        }
    }

    /// Request an explicit priority.
    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Start the rule inactive.
    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}
