//! Slash-separated path resolution over the device object tree.
//!
//! The device exposes no path lookup, only parent-to-children enumeration,
//! so each component is resolved by a linear scan of the current object's
//! children.

use devpull_device::{DeviceSession, ObjectId};
use tracing::debug;

use crate::enumerate::each_child;
use crate::error::{EngineError, EngineResult};

/// Resolve a slash-separated directory path to an object identifier.
///
/// Resolution starts at the store's root. Components are compared to
/// resolved child names case-insensitively; the first matching child wins,
/// even when siblings share a name. Empty components (leading, trailing, or
/// doubled separators) are ignored, so an empty path resolves to the root.
/// Both `/` and `\` act as separators.
///
/// # Errors
///
/// Returns [`EngineError::PathNotFound`] for the first component with no
/// matching child; later components are not attempted. Enumeration or
/// name-resolution failures at any step are fatal to the whole resolution.
pub fn resolve_path(session: &dyn DeviceSession, path: &str) -> EngineResult<ObjectId> {
    let mut current = session.root_id();
    for component in path
        .split(['/', '\\'])
        .filter(|component| !component.is_empty())
    {
        current = find_child(session, &current, component)?
            .ok_or_else(|| EngineError::path_not_found(component, path))?;
        debug!(component, object = %current, "resolved path component");
    }
    Ok(current)
}

/// Scan the children of `parent` for the first name equal to `component`,
/// ignoring case.
fn find_child(
    session: &dyn DeviceSession,
    parent: &ObjectId,
    component: &str,
) -> EngineResult<Option<ObjectId>> {
    let wanted = component.to_lowercase();
    let mut found = None;
    each_child(session, parent, |id, name| {
        if name.to_lowercase() == wanted {
            found = Some(id);
            return false;
        }
        true
    })?;
    Ok(found)
}
