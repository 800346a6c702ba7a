//! Execution adapters: the seam between deciding and doing.
//!
//! The engine only decides; submitting a transaction to a processor is
//! the caller's job, behind [`ExecutionAdapter`]. A cascading caller
//! attempts the decision's primary destination first and walks
//! [`next_alternative`](crate::RoutingDecision::next_alternative) on each
//! non-success until an attempt lands or the queue runs out.

use async_trait::async_trait;

use crate::context::TransactionContext;
use crate::destination::Destination;

/// Result of one submission attempt against a destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The destination accepted the transaction.
    Succeeded,
    /// The destination rejected the transaction.
    Failed {
        /// Processor-reported reason.
        reason: String,
    },
    /// The destination could not be reached.
    Unavailable,
}

impl AttemptOutcome {
    /// `true` only for [`Succeeded`](Self::Succeeded); every other
    /// outcome is eligible for cascading.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl std::fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Succeeded => f.write_str("succeeded"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
            Self::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// Submits transactions to destinations.
///
/// Implementations wrap processor clients, sandboxes, or scripted test
/// doubles. `attempt` reports the outcome; it does not retry or cascade
/// on its own.
#[async_trait]
pub trait ExecutionAdapter: Send + Sync {
    /// Adapter label for logs.
    fn name(&self) -> &str;

    /// Submit one transaction to one destination.
    async fn attempt(
        &self,
        destination: &Destination,
        ctx: &TransactionContext,
    ) -> AttemptOutcome;
}
