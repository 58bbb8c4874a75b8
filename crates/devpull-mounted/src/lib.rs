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

//! Device provider backed by locally mounted device filesystems.
//!
//! Many portable devices surface their object store as an ordinary mounted
//! directory (MTP/gvfs mounts, mass-storage cards). This adapter exposes a
//! set of declared mounts through the [`DeviceProvider`]/[`DeviceSession`]
//! contract so the engine stays agnostic of how the device is reached.
//!
//! Object identifiers encode absolute paths under the mount root; they stay
//! opaque to callers, as the contract requires.

use std::fs::{self, File};
use std::path::PathBuf;

use devpull_device::{
    DeleteReply, DeviceError, DeviceInfo, DeviceProvider, DeviceResult, DeviceSelector,
    DeviceSession, DeviceStatus, ObjectId, ObjectPager, ObjectStream, PropertyKind,
};
use tracing::{debug, warn};

mod error;

pub use error::{MountError, MountResult};

/// Transfer unit suggested for streams served from a mounted filesystem.
pub const SUGGESTED_CHUNK_SIZE: usize = 128 * 1024;

const MANUFACTURER: &str = "local mount";

/// One declared mount: a device name bound to a directory root.
#[derive(Debug, Clone)]
pub struct Mount {
    name: String,
    description: String,
    root: PathBuf,
}

impl Mount {
    /// Parse a `NAME=PATH[:DESCRIPTION]` declaration.
    ///
    /// The description defaults to the path when omitted.
    ///
    /// # Errors
    ///
    /// Returns [`MountError::InvalidSpec`] when the declaration is malformed.
    pub fn parse(spec: &str) -> MountResult<Self> {
        let (name, rest) = spec
            .split_once('=')
            .ok_or_else(|| MountError::invalid_spec(spec, "missing '=' between name and path"))?;
        if name.is_empty() {
            return Err(MountError::invalid_spec(spec, "device name is empty"));
        }
        let (path, description) = match rest.split_once(':') {
            Some((path, description)) if !description.is_empty() => {
                (path, Some(description.to_owned()))
            }
            Some((path, _)) => (path, None),
            None => (rest, None),
        };
        if path.is_empty() {
            return Err(MountError::invalid_spec(spec, "mount path is empty"));
        }
        Ok(Self {
            name: name.to_owned(),
            description: description.unwrap_or_else(|| path.to_owned()),
            root: PathBuf::from(path),
        })
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            friendly_name: self.name.clone(),
            manufacturer: MANUFACTURER.to_owned(),
            description: self.description.clone(),
        }
    }
}

/// Provider advertising declared mounts as devices.
#[derive(Debug, Clone, Default)]
pub struct MountedDeviceProvider {
    mounts: Vec<Mount>,
}

impl MountedDeviceProvider {
    /// Build a provider from parsed mounts.
    #[must_use]
    pub const fn new(mounts: Vec<Mount>) -> Self {
        Self { mounts }
    }

    /// Build a provider from raw `NAME=PATH[:DESCRIPTION]` declarations.
    ///
    /// # Errors
    ///
    /// Returns the first declaration that fails to parse.
    pub fn from_specs<S: AsRef<str>>(specs: &[S]) -> MountResult<Self> {
        let mounts = specs
            .iter()
            .map(|spec| Mount::parse(spec.as_ref()))
            .collect::<MountResult<Vec<_>>>()?;
        Ok(Self::new(mounts))
    }
}

impl DeviceProvider for MountedDeviceProvider {
    fn list_devices(&self) -> DeviceResult<Vec<DeviceInfo>> {
        Ok(self.mounts.iter().map(Mount::info).collect())
    }

    fn open(&self, selector: &DeviceSelector) -> DeviceResult<Box<dyn DeviceSession>> {
        let mount = self
            .mounts
            .iter()
            .find(|mount| selector.matches(&mount.info()))
            .ok_or_else(|| DeviceError::not_found("device", selector.describe()))?;
        if !mount.root.is_dir() {
            return Err(DeviceError::not_found(
                "device",
                mount.root.display().to_string(),
            ));
        }
        debug!(device = %mount.name, root = %mount.root.display(), "opened mounted session");
        Ok(Box::new(MountedSession {
            root: mount.root.clone(),
            closed: false,
        }))
    }
}

/// Exclusive session over one mounted directory tree.
pub struct MountedSession {
    root: PathBuf,
    closed: bool,
}

impl MountedSession {
    fn ensure_open(&self, operation: &'static str) -> DeviceResult<()> {
        if self.closed {
            return Err(DeviceError::closed(operation));
        }
        Ok(())
    }

    fn object_path(id: &ObjectId) -> PathBuf {
        PathBuf::from(id.as_str())
    }

    fn existing_path(id: &ObjectId) -> DeviceResult<PathBuf> {
        let path = Self::object_path(id);
        if path.exists() {
            Ok(path)
        } else {
            Err(DeviceError::not_found("object", id.as_str()))
        }
    }
}

impl DeviceSession for MountedSession {
    fn root_id(&self) -> ObjectId {
        ObjectId::from(self.root.display().to_string())
    }

    fn enumerate_children(&self, parent: &ObjectId) -> DeviceResult<Box<dyn ObjectPager>> {
        self.ensure_open("enumerate_children")?;
        let parent_path = Self::existing_path(parent)?;
        let entries = fs::read_dir(&parent_path)
            .map_err(|source| DeviceError::io("enumerate_children", source))?;
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| DeviceError::io("enumerate_children", source))?;
            paths.push(entry.path());
        }
        // Directory order is platform-dependent; sort so runs are repeatable.
        paths.sort();
        let ids = paths
            .into_iter()
            .map(|path| ObjectId::from(path.display().to_string()))
            .collect();
        Ok(Box::new(SnapshotPager { ids, offset: 0 }))
    }

    fn read_property(&self, id: &ObjectId, kind: PropertyKind) -> DeviceResult<String> {
        self.ensure_open("read_property")?;
        let path = Self::existing_path(id)?;
        let value = match kind {
            PropertyKind::OriginalFileName => path.file_name().and_then(|name| name.to_str()),
            PropertyKind::Name => path.file_stem().and_then(|stem| stem.to_str()),
        };
        value.map(str::to_owned).ok_or_else(|| {
            DeviceError::not_found("property", format!("{id}/{}", kind.as_str()))
        })
    }

    fn open_read_stream(&self, id: &ObjectId) -> DeviceResult<ObjectStream> {
        self.ensure_open("open_read_stream")?;
        let path = Self::existing_path(id)?;
        let file =
            File::open(&path).map_err(|source| DeviceError::io("open_read_stream", source))?;
        Ok(ObjectStream {
            reader: Box::new(file),
            chunk_size: SUGGESTED_CHUNK_SIZE,
        })
    }

    fn delete_batch(&self, ids: &[ObjectId]) -> DeviceResult<Vec<DeleteReply>> {
        self.ensure_open("delete_batch")?;
        let replies = ids
            .iter()
            .map(|id| {
                let path = Self::object_path(id);
                match fs::remove_file(&path) {
                    Ok(()) => DeleteReply::Status(DeviceStatus::OK),
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "mounted delete failed");
                        DeleteReply::Status(DeviceStatus(-1))
                    }
                }
            })
            .collect();
        Ok(replies)
    }

    fn close(&mut self) -> DeviceResult<()> {
        if self.closed {
            return Err(DeviceError::closed("close"));
        }
        self.closed = true;
        Ok(())
    }
}

struct SnapshotPager {
    ids: Vec<ObjectId>,
    offset: usize,
}

impl ObjectPager for SnapshotPager {
    fn next_batch(&mut self, max: usize) -> DeviceResult<Vec<ObjectId>> {
        let end = self.ids.len().min(self.offset + max);
        let batch = self.ids[self.offset..end].to_vec();
        self.offset = end;
        Ok(batch)
    }
}
