//! Paginated, filtered enumeration of one object's direct children.

use devpull_device::{DeviceSession, ObjectId};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::model::ObjectRef;
use crate::naming::resolve_object_name;

/// Number of child identifiers requested per page.
pub const ENUM_BATCH_SIZE: usize = 32;

/// Predicate applied to resolved child names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameFilter {
    /// Accept every child.
    All,
    /// Accept names containing the needle (case-sensitive).
    Contains(String),
}

impl NameFilter {
    /// Build a filter from an optional substring needle.
    #[must_use]
    pub fn from_needle(needle: Option<String>) -> Self {
        needle.map_or(Self::All, Self::Contains)
    }

    /// Whether `name` passes the filter.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Contains(needle) => name.contains(needle.as_str()),
        }
    }
}

/// Walk every direct child of `parent`, invoking `visit` with its identifier
/// and resolved name. The walk stops early when `visit` returns `false`.
///
/// A name-resolution failure aborts the whole walk: a single unreadable
/// object invalidates the pass rather than being skipped silently.
pub(crate) fn each_child(
    session: &dyn DeviceSession,
    parent: &ObjectId,
    mut visit: impl FnMut(ObjectId, String) -> bool,
) -> EngineResult<()> {
    let mut pager = session
        .enumerate_children(parent)
        .map_err(|source| EngineError::device("enumerating children", source))?;
    loop {
        let batch = pager
            .next_batch(ENUM_BATCH_SIZE)
            .map_err(|source| EngineError::device("enumerating children", source))?;
        if batch.is_empty() {
            return Ok(());
        }
        for id in batch {
            let name = resolve_object_name(session, &id)?;
            if !visit(id, name) {
                return Ok(());
            }
        }
    }
}

/// Enumerate the direct children of `parent` whose names pass `filter`.
///
/// Insertion order follows the device's enumeration order. The walk always
/// terminates once the device reports end-of-sequence; a fresh call re-walks
/// from the beginning.
///
/// # Errors
///
/// Returns an error when the enumeration or any child's name resolution
/// fails; no partial listing is returned.
pub fn enumerate_matching(
    session: &dyn DeviceSession,
    parent: &ObjectId,
    filter: &NameFilter,
) -> EngineResult<Vec<ObjectRef>> {
    let mut matches = Vec::with_capacity(ENUM_BATCH_SIZE);
    each_child(session, parent, |id, name| {
        if filter.matches(&name) {
            matches.push(ObjectRef { id, name });
        }
        true
    })?;
    debug!(parent = %parent, matched = matches.len(), "enumeration complete");
    Ok(matches)
}
