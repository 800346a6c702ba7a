//! Destinations and the registry of known ones.
//!
//! A [`Destination`] is an opaque processor/rail identifier; the engine
//! routes to it without knowing what it is. The caller supplies a
//! [`DestinationRegistry`] of valid identifiers, and the store and engine
//! validate against it on the write path (rule creation, engine
//! construction). Nothing here manages destinations; ownership of the set
//! stays with the surrounding application.

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

/// Opaque identifier of a processor or payment rail.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Destination(String);

impl Destination {
    /// Wrap an identifier.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The identifier as text.
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Destination {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Destination {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for Destination {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Destination {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Destination {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Destination {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// The set of destinations rules are allowed to target.
///
/// Membership is what the write path cares about; iteration is
/// lexicographic and therefore deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationRegistry {
    known: BTreeSet<Destination>,
}

impl DestinationRegistry {
    /// An empty registry. Useful only as a starting point; an engine
    /// cannot be constructed against a registry missing its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a destination. Returns `false` if it was already known.
    pub fn insert(&mut self, destination: impl Into<Destination>) -> bool {
        self.known.insert(destination.into())
    }

    /// Membership test.
    #[must_use]
    pub fn contains(&self, destination: &Destination) -> bool {
        self.known.contains(destination)
    }

    /// Membership test by name.
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.known.contains(name)
    }

    /// All known destinations, in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &Destination> {
        self.known.iter()
    }

    /// Number of known destinations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.known.len()
    }

    /// `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

impl<D: Into<Destination>> FromIterator<D> for DestinationRegistry {
    fn from_iter<I: IntoIterator<Item = D>>(iter: I) -> Self {
        Self {
            known: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<D: Into<Destination>> Extend<D> for DestinationRegistry {
    fn extend<I: IntoIterator<Item = D>>(&mut self, iter: I) {
        self.known.extend(iter.into_iter().map(Into::into));
    }
}
