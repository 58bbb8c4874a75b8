//! Display-name resolution for enumerated objects.

use devpull_device::{DeviceSession, ObjectId, PropertyKind};
use tracing::debug;

use crate::error::{EngineError, EngineResult};

/// Resolve an object's display name.
///
/// Prefers the original file name (which keeps the extension) and falls back
/// to the plain name property when the first read fails. Both failing is an
/// error; the fallback's cause is the one reported.
///
/// # Errors
///
/// Returns an error when neither name property can be read.
pub fn resolve_object_name(session: &dyn DeviceSession, id: &ObjectId) -> EngineResult<String> {
    match session.read_property(id, PropertyKind::OriginalFileName) {
        Ok(name) => Ok(name),
        Err(first) => {
            debug!(object = %id, error = %first, "original file name unavailable, trying plain name");
            session
                .read_property(id, PropertyKind::Name)
                .map_err(|source| EngineError::device("resolving object name", source))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devpull_test_support::mocks::{ROOT_ID, ScriptedDevice};

    #[test]
    fn prefers_the_name_with_extension() {
        let device = ScriptedDevice::new().file(ROOT_ID, "f1", "track.mp3", b"");
        let name = resolve_object_name(&device, &ObjectId::from("f1")).expect("name");
        assert_eq!(name, "track.mp3");
    }

    #[test]
    fn falls_back_to_the_plain_name() {
        let device = ScriptedDevice::new().file_without_original(ROOT_ID, "f1", "track", b"");
        let name = resolve_object_name(&device, &ObjectId::from("f1")).expect("name");
        assert_eq!(name, "track");
    }

    #[test]
    fn fails_when_both_properties_are_unreadable() {
        let device = ScriptedDevice::new().nameless(ROOT_ID, "f1");
        let err = resolve_object_name(&device, &ObjectId::from("f1")).expect_err("no name");
        assert!(matches!(
            err,
            EngineError::Device {
                operation: "resolving object name",
                ..
            }
        ));
    }

    #[test]
    fn io_failure_on_both_reads_surfaces_the_fallback_error() {
        let device = ScriptedDevice::new()
            .file(ROOT_ID, "f1", "track.mp3", b"")
            .fail_property_reads("f1");
        let err = resolve_object_name(&device, &ObjectId::from("f1")).expect_err("io failure");
        assert!(err.describe().contains("resolving object name"));
    }
}
