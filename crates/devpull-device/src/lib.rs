#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Provider-agnostic device session interfaces and DTOs.
//!
//! A device exposes a hierarchical object store navigable only through
//! parent-to-children enumeration. Everything here is synchronous and
//! blocking; a session is exclusive to one run and must be closed when the
//! run ends.

use std::fmt::{self, Display};
use std::io::Read;

use serde::{Deserialize, Serialize};

pub mod error;

pub use error::{DeviceError, DeviceResult};

/// Opaque device-assigned identifier for one item in the object store.
///
/// Only meaningful to the session that produced it; never parsed by callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ObjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Object display-name properties a session can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// The name including its file extension, when the device tracks one.
    OriginalFileName,
    /// The plain display name, typically without an extension.
    Name,
}

impl PropertyKind {
    /// Stable label used in logs and error context.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OriginalFileName => "original_file_name",
            Self::Name => "name",
        }
    }
}

/// Advertised identity of one connected device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Human-readable device name shown to the operator.
    pub friendly_name: String,
    /// Device manufacturer, when advertised.
    pub manufacturer: String,
    /// Longer device description, when advertised.
    pub description: String,
}

/// Criteria used to pick one device among those a provider advertises.
#[derive(Debug, Clone, Default)]
pub struct DeviceSelector {
    /// Match against [`DeviceInfo::friendly_name`].
    pub friendly_name: Option<String>,
    /// Match against [`DeviceInfo::description`].
    pub description: Option<String>,
}

impl DeviceSelector {
    /// Whether no criteria were supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.friendly_name.is_none() && self.description.is_none()
    }

    /// Whether the given device satisfies this selector.
    ///
    /// Either criterion is sufficient; comparison ignores case but matches
    /// the whole field.
    #[must_use]
    pub fn matches(&self, info: &DeviceInfo) -> bool {
        let by_name = self
            .friendly_name
            .as_deref()
            .is_some_and(|name| name.to_lowercase() == info.friendly_name.to_lowercase());
        let by_description = self
            .description
            .as_deref()
            .is_some_and(|description| {
                description.to_lowercase() == info.description.to_lowercase()
            });
        by_name || by_description
    }

    /// Render the criteria for error reporting.
    #[must_use]
    pub fn describe(&self) -> String {
        match (self.friendly_name.as_deref(), self.description.as_deref()) {
            (Some(name), Some(description)) => format!("{name} / {description}"),
            (Some(name), None) => name.to_owned(),
            (None, Some(description)) => description.to_owned(),
            (None, None) => "<any>".to_owned(),
        }
    }
}

/// Open read stream over one object's content.
pub struct ObjectStream {
    /// Blocking reader over the object's bytes.
    pub reader: Box<dyn Read>,
    /// Transfer unit size the device suggests for efficient streaming.
    pub chunk_size: usize,
}

/// Signed per-item status code returned by a batch deletion.
///
/// Negative codes indicate failure, mirroring the convention of the device
/// protocols this seam fronts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStatus(pub i32);

impl DeviceStatus {
    /// The canonical success code.
    pub const OK: Self = Self(0);

    /// Whether this code reports success.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 0
    }
}

/// Raw per-item value handed back by a batch deletion.
///
/// Drivers are expected to return a status code per submitted identifier,
/// but a misbehaving one can hand back something else entirely; callers must
/// treat that shape as an error rather than guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteReply {
    /// The expected shape: one status code for the submitted identifier.
    Status(DeviceStatus),
    /// Any other value type, rendered for diagnostics.
    Other(String),
}

/// Paginated cursor over the direct children of one object.
pub trait ObjectPager {
    /// Fetch up to `max` child identifiers; an empty batch ends the sequence.
    ///
    /// # Errors
    ///
    /// Returns an error when the device fails to produce the next page.
    fn next_batch(&mut self, max: usize) -> DeviceResult<Vec<ObjectId>>;
}

/// Exclusive, blocking session against one device's object store.
pub trait DeviceSession {
    /// Identifier of the store's well-known root object.
    fn root_id(&self) -> ObjectId;

    /// Open a paginated cursor over the direct children of `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error when `parent` is unknown or the device rejects the
    /// enumeration.
    fn enumerate_children(&self, parent: &ObjectId) -> DeviceResult<Box<dyn ObjectPager>>;

    /// Read a display-name property of one object.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::NotFound`] when the object does not carry the
    /// property, or an IO error when the read fails.
    fn read_property(&self, id: &ObjectId, kind: PropertyKind) -> DeviceResult<String>;

    /// Open a read stream over one object's content.
    ///
    /// # Errors
    ///
    /// Returns an error when the object cannot be streamed.
    fn open_read_stream(&self, id: &ObjectId) -> DeviceResult<ObjectStream>;

    /// Delete the given objects in one request.
    ///
    /// The reply is dense: one value per submitted identifier, in submission
    /// order.
    ///
    /// # Errors
    ///
    /// Returns an error when the batch as a whole cannot be executed;
    /// per-item failures are reported inside the reply instead.
    fn delete_batch(&self, ids: &[ObjectId]) -> DeviceResult<Vec<DeleteReply>>;

    /// Release the session.
    ///
    /// Must be called at the end of every run so co-resident device browsers
    /// are not left facing a dangling session. Subsequent calls fail with
    /// [`DeviceError::SessionClosed`].
    ///
    /// # Errors
    ///
    /// Returns an error when the device rejects the close.
    fn close(&mut self) -> DeviceResult<()>;
}

/// Source of connected devices and sessions against them.
pub trait DeviceProvider {
    /// Advertise the devices currently available.
    ///
    /// # Errors
    ///
    /// Returns an error when the device inventory cannot be read.
    fn list_devices(&self) -> DeviceResult<Vec<DeviceInfo>>;

    /// Open an exclusive session against the first device matching
    /// `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::NotFound`] when no advertised device matches.
    fn open(&self, selector: &DeviceSelector) -> DeviceResult<Box<dyn DeviceSession>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_info() -> DeviceInfo {
        DeviceInfo {
            friendly_name: "Pixel 8".to_owned(),
            manufacturer: "Google".to_owned(),
            description: "Android phone".to_owned(),
        }
    }

    #[test]
    fn selector_matches_on_friendly_name() {
        let selector = DeviceSelector {
            friendly_name: Some("Pixel 8".to_owned()),
            description: None,
        };
        assert!(selector.matches(&sample_info()));
    }

    #[test]
    fn selector_matches_on_description() {
        let selector = DeviceSelector {
            friendly_name: None,
            description: Some("Android phone".to_owned()),
        };
        assert!(selector.matches(&sample_info()));
    }

    #[test]
    fn selector_comparison_ignores_case_but_not_partial_names() {
        let insensitive = DeviceSelector {
            friendly_name: Some("PIXEL 8".to_owned()),
            description: None,
        };
        assert!(insensitive.matches(&sample_info()));

        let partial = DeviceSelector {
            friendly_name: Some("Pixel".to_owned()),
            description: None,
        };
        assert!(!partial.matches(&sample_info()));
    }

    #[test]
    fn empty_selector_matches_nothing() {
        let selector = DeviceSelector::default();
        assert!(selector.is_empty());
        assert!(!selector.matches(&sample_info()));
        assert_eq!(selector.describe(), "<any>");
    }

    #[test]
    fn status_sign_convention() {
        assert!(DeviceStatus::OK.is_success());
        assert!(DeviceStatus(1).is_success());
        assert!(!DeviceStatus(-2_147_024_894).is_success());
    }

    #[test]
    fn object_id_round_trips_through_serde() {
        let id = ObjectId::from("o42");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"o42\"");
        let back: ObjectId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }
}
