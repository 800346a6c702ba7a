//! Rule storage with copy-on-write snapshots.
//!
//! [`RuleStore`] owns the live rule set behind a [`parking_lot::RwLock`].
//! Writers clone the current [`RuleSet`], mutate the clone, and swap it in
//! as a fresh [`Arc`]; readers grab the `Arc` via [`RuleStore::snapshot`]
//! and evaluate against it without holding any lock. A request that
//! started against one snapshot finishes against it, no matter how many
//! writes land in between.
//!
//! Priorities follow one invariant: no two ACTIVE rules share a priority.
//! Inserting at an occupied priority shifts the occupant, and every rule
//! in the contiguous run above it, down by one rank (numerically `+1`).
//! A shift or append that would need a rank past `u32::MAX` is rejected
//! as [`ValidationError::PriorityUnavailable`] with the store unchanged.
//! Inactive rules sit outside the ordering and may collide freely.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::condition::Condition;
use crate::destination::DestinationRegistry;
use crate::error::{RuleNotFound, UpdateError, ValidationError};
use crate::rule::{RoutingRule, RuleDraft, RuleId};

#[derive(Debug, Clone)]
struct StoredRule {
    rule: RoutingRule,
    /// Insertion order, used to break priority ties among inactive rules.
    seq: u64,
}

/// An immutable, priority-ordered view of the rule set.
///
/// Entries are kept sorted by `(priority, insertion order)`; iteration
/// yields rules in evaluation order without further sorting.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    entries: Vec<StoredRule>,
}

impl RuleSet {
    /// Active rules in evaluation order.
    pub fn active(&self) -> impl Iterator<Item = &RoutingRule> {
        self.entries.iter().map(|e| &e.rule).filter(|r| r.active)
    }

    /// All rules, active and inactive, in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &RoutingRule> {
        self.entries.iter().map(|e| &e.rule)
    }

    /// Look up a rule by id.
    #[must_use]
    pub fn get(&self, id: RuleId) -> Option<&RoutingRule> {
        self.entries.iter().map(|e| &e.rule).find(|r| r.id == id)
    }

    /// Number of rules held, inactive ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no rules are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, id: RuleId) -> Option<usize> {
        self.entries.iter().position(|e| e.rule.id == id)
    }

    fn sort(&mut self) {
        self.entries.sort_by_key(|e| (e.rule.priority, e.seq));
    }

    /// Smallest priority that sorts after every active rule.
    ///
    /// Fails when the active maximum is already `u32::MAX`: there is no
    /// rank left to append at.
    fn next_priority(&self, skip: Option<RuleId>) -> Result<u32, ValidationError> {
        match self
            .entries
            .iter()
            .filter(|e| e.rule.active && skip != Some(e.rule.id))
            .map(|e| e.rule.priority)
            .max()
        {
            Some(u32::MAX) => Err(ValidationError::PriorityUnavailable {
                requested: u32::MAX,
            }),
            Some(p) => Ok(p + 1),
            None => Ok(1),
        }
    }

    /// Make room at `start` by bumping the active occupant, and the
    /// contiguous run of active priorities above it, down one rank each.
    /// No-op when `start` is free.
    ///
    /// Fails when the run reaches `u32::MAX`: the topmost occupant has no
    /// rank to move to. Nothing is shifted on failure.
    fn shift_chain(&mut self, start: u32, skip: Option<RuleId>) -> Result<(), ValidationError> {
        let occupied: BTreeSet<u32> = self
            .entries
            .iter()
            .filter(|e| e.rule.active && skip != Some(e.rule.id))
            .map(|e| e.rule.priority)
            .collect();
        if !occupied.contains(&start) {
            return Ok(());
        }
        let mut end = start;
        loop {
            let Some(next) = end.checked_add(1) else {
                return Err(ValidationError::PriorityUnavailable { requested: start });
            };
            if occupied.contains(&next) {
                end = next;
            } else {
                break;
            }
        }
        // `end` sits below the ceiling; the bump cannot overflow.
        for entry in &mut self.entries {
            if skip == Some(entry.rule.id) {
                continue;
            }
            if entry.rule.active && (start..=end).contains(&entry.rule.priority) {
                entry.rule.priority += 1;
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
struct Inner {
    snapshot: Arc<RuleSet>,
    next_seq: u64,
}

/// Thread-safe owner of the routing rules.
///
/// Construction fixes the [`DestinationRegistry`]; every draft is
/// validated against it before a rule is admitted, which is what lets the
/// read path stay total.
#[derive(Debug)]
pub struct RuleStore {
    registry: DestinationRegistry,
    inner: RwLock<Inner>,
}

impl RuleStore {
    /// An empty store over the given registry.
    #[must_use]
    pub fn new(registry: DestinationRegistry) -> Self {
        Self {
            registry,
            inner: RwLock::new(Inner {
                snapshot: Arc::new(RuleSet::default()),
                next_seq: 0,
            }),
        }
    }

    /// Hydrate a store from already-constructed rules, in order.
    ///
    /// Each rule is re-validated on entry (non-empty name, known
    /// destination, unique id) and the priority collision policy is
    /// applied as if the rules were added one at a time.
    pub fn with_rules(
        registry: DestinationRegistry,
        rules: Vec<RoutingRule>,
    ) -> Result<Self, ValidationError> {
        if rules.len() > crate::MAX_RULES {
            return Err(ValidationError::TooManyRules {
                count: rules.len(),
                max: crate::MAX_RULES,
            });
        }
        let mut set = RuleSet::default();
        let mut next_seq = 0u64;
        for rule in rules {
            if rule.name.trim().is_empty() {
                return Err(ValidationError::EmptyName);
            }
            if !registry.contains(&rule.destination) {
                return Err(ValidationError::UnknownDestination(rule.destination.clone()));
            }
            if set.get(rule.id).is_some() {
                return Err(ValidationError::DuplicateRuleId(rule.id));
            }
            if rule.active {
                set.shift_chain(rule.priority, None)?;
            }
            set.entries.push(StoredRule { rule, seq: next_seq });
            next_seq += 1;
        }
        set.sort();
        tracing::debug!(rules = set.len(), "store hydrated");
        Ok(Self {
            registry,
            inner: RwLock::new(Inner {
                snapshot: Arc::new(set),
                next_seq,
            }),
        })
    }

    /// The registry this store validates destinations against.
    #[must_use]
    pub fn registry(&self) -> &DestinationRegistry {
        &self.registry
    }

    /// The current rule set.
    ///
    /// The returned `Arc` is detached from the store; later writes produce
    /// new snapshots and never touch this one.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RuleSet> {
        Arc::clone(&self.inner.read().snapshot)
    }

    /// Validate and admit a new rule.
    ///
    /// Without an explicit priority the rule is appended after the current
    /// active maximum. With one, an active collision shifts the incumbent
    /// chain so the new rule takes the requested rank. Either path fails
    /// with [`ValidationError::PriorityUnavailable`] when it would need a
    /// rank past `u32::MAX`.
    pub fn add_rule(&self, draft: RuleDraft) -> Result<RoutingRule, ValidationError> {
        let (name, condition) = self.validate_draft(&draft)?;
        let mut inner = self.inner.write();
        if inner.snapshot.len() >= crate::MAX_RULES {
            return Err(ValidationError::TooManyRules {
                count: inner.snapshot.len(),
                max: crate::MAX_RULES,
            });
        }
        let mut set = (*inner.snapshot).clone();
        let priority = match draft.priority {
            Some(p) => {
                if draft.active {
                    set.shift_chain(p, None)?;
                }
                p
            }
            None => set.next_priority(None)?,
        };
        let rule = RoutingRule::new(
            RuleId::new(),
            name,
            priority,
            condition,
            draft.destination,
            draft.active,
        );
        let seq = inner.next_seq;
        inner.next_seq += 1;
        set.entries.push(StoredRule {
            rule: rule.clone(),
            seq,
        });
        set.sort();
        tracing::debug!(
            rule = %rule.id(),
            name = rule.name(),
            priority = rule.priority(),
            "rule added"
        );
        inner.snapshot = Arc::new(set);
        Ok(rule)
    }

    /// Replace a rule's contents, keeping its id and insertion order.
    ///
    /// Validation runs before the lookup, so a bad draft never reports
    /// `NotFound`. A draft without a priority keeps the rule's current
    /// one; an explicit priority applies the same collision policy as
    /// [`add_rule`](Self::add_rule), with the rule itself excluded.
    pub fn update_rule(&self, id: RuleId, draft: RuleDraft) -> Result<RoutingRule, UpdateError> {
        let (name, condition) = self.validate_draft(&draft)?;
        let mut inner = self.inner.write();
        let Some(pos) = inner.snapshot.position(id) else {
            return Err(RuleNotFound { id }.into());
        };
        let mut set = (*inner.snapshot).clone();
        let priority = draft.priority.unwrap_or(set.entries[pos].rule.priority);
        if draft.active {
            set.shift_chain(priority, Some(id))?;
        }
        {
            let entry = &mut set.entries[pos];
            entry.rule.name = name;
            entry.rule.priority = priority;
            entry.rule.condition = condition;
            entry.rule.destination = draft.destination;
            entry.rule.active = draft.active;
        }
        let rule = set.entries[pos].rule.clone();
        set.sort();
        tracing::debug!(rule = %id, priority = rule.priority(), "rule updated");
        inner.snapshot = Arc::new(set);
        Ok(rule)
    }

    /// Remove a rule. Returns the removed rule, or `None` if the id is
    /// unknown; removal is idempotent.
    pub fn remove_rule(&self, id: RuleId) -> Option<RoutingRule> {
        let mut inner = self.inner.write();
        let pos = inner.snapshot.position(id)?;
        let mut set = (*inner.snapshot).clone();
        let removed = set.entries.remove(pos).rule;
        tracing::debug!(rule = %id, "rule removed");
        inner.snapshot = Arc::new(set);
        Some(removed)
    }

    /// Flip a rule's active flag, returning the new state.
    ///
    /// A rule reactivated into a priority now held by another active rule
    /// does not displace it; the reactivated rule moves to the end of the
    /// active ordering instead. When no rank is left there the toggle
    /// fails with [`UpdateError::Invalid`] and the rule stays inactive.
    pub fn toggle_active(&self, id: RuleId) -> Result<bool, UpdateError> {
        let mut inner = self.inner.write();
        let Some(pos) = inner.snapshot.position(id) else {
            return Err(RuleNotFound { id }.into());
        };
        let mut set = (*inner.snapshot).clone();
        let now_active = !set.entries[pos].rule.active;
        set.entries[pos].rule.active = now_active;
        if now_active {
            let priority = set.entries[pos].rule.priority;
            let collides = set
                .entries
                .iter()
                .enumerate()
                .any(|(i, e)| i != pos && e.rule.active && e.rule.priority == priority);
            if collides {
                set.entries[pos].rule.priority = set.next_priority(Some(id))?;
            }
        }
        set.sort();
        tracing::debug!(rule = %id, active = now_active, "rule toggled");
        inner.snapshot = Arc::new(set);
        Ok(now_active)
    }

    /// Look up a rule by id.
    #[must_use]
    pub fn get(&self, id: RuleId) -> Option<RoutingRule> {
        self.inner.read().snapshot.get(id).cloned()
    }

    /// Active rules in evaluation order.
    #[must_use]
    pub fn list_active(&self) -> Vec<RoutingRule> {
        self.snapshot().active().cloned().collect()
    }

    /// All rules, active and inactive, in priority order.
    #[must_use]
    pub fn list_all(&self) -> Vec<RoutingRule> {
        self.snapshot().iter().cloned().collect()
    }

    /// Number of rules held, inactive ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().snapshot.len()
    }

    /// `true` when no rules are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().snapshot.is_empty()
    }

    fn validate_draft(&self, draft: &RuleDraft) -> Result<(String, Condition), ValidationError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !self.registry.contains(&draft.destination) {
            return Err(ValidationError::UnknownDestination(draft.destination.clone()));
        }
        let condition = Condition::parse(&draft.condition)?;
        Ok((name.to_string(), condition))
    }
}
