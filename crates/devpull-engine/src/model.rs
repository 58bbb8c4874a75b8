//! Domain models for one transfer/deletion run.
//!
//! # Design
//! - Entries are created once per enumeration and live for the rest of the
//!   run; only the outcome field ever changes.
//! - Keep the types serializable so listings can render as JSON.

use devpull_device::ObjectId;
use serde::{Deserialize, Serialize};

/// One enumerated object: its opaque identifier and resolved display name.
///
/// Names are not guaranteed unique among siblings; lookups take the first
/// match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Device-native identifier, opaque to the engine.
    pub id: ObjectId,
    /// Display name, preferring the variant with a file extension.
    pub name: String,
}

/// Per-item result state carried across the copy and delete phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// No phase has touched the item yet.
    Pending,
    /// The most recent phase succeeded.
    Succeeded,
    /// A phase failed; the item is excluded from later submissions.
    Failed {
        /// Operator-facing failure cause.
        reason: String,
    },
}

/// One matched object plus its phase outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedObject {
    /// The enumerated object.
    pub object: ObjectRef,
    /// Current outcome, updated once per phase the item participates in.
    pub outcome: Outcome,
}

impl MatchedObject {
    /// Wrap a freshly enumerated object with a pending outcome.
    #[must_use]
    pub const fn new(object: ObjectRef) -> Self {
        Self {
            object,
            outcome: Outcome::Pending,
        }
    }

    /// Whether a prior phase already failed this item.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }

    /// Record a successful phase.
    pub fn mark_succeeded(&mut self) {
        self.outcome = Outcome::Succeeded;
    }

    /// Record a failed phase with its cause.
    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.outcome = Outcome::Failed {
            reason: reason.into(),
        };
    }
}
