//! Scripted in-memory device session for engine and CLI tests.
//!
//! The mock holds a flat object table with parent links, serves child pages
//! in insertion order, and lets tests inject property, page, stream, and
//! deletion failures per object.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::io::{self, Read};
use std::rc::Rc;

use devpull_device::{
    DeleteReply, DeviceError, DeviceResult, DeviceSession, DeviceStatus, ObjectId, ObjectPager,
    ObjectStream, PropertyKind,
};

/// Identifier of the scripted store's root object.
pub const ROOT_ID: &str = "ROOT";

/// Default chunk size the scripted device suggests for streams.
pub const DEFAULT_CHUNK: usize = 8;

#[derive(Debug, Clone)]
struct ScriptedObject {
    id: ObjectId,
    parent: ObjectId,
    original_name: Option<String>,
    name: Option<String>,
    content: Vec<u8>,
}

/// In-memory [`DeviceSession`] with scriptable failures.
pub struct ScriptedDevice {
    objects: Vec<ScriptedObject>,
    chunk_size: usize,
    property_io_failures: HashSet<ObjectId>,
    enumeration_failures: HashSet<ObjectId>,
    stream_open_failures: HashSet<ObjectId>,
    stream_fail_after: HashMap<ObjectId, usize>,
    reply_overrides: HashMap<ObjectId, DeleteReply>,
    reply_len_override: Option<usize>,
    delete_log: RefCell<Vec<Vec<ObjectId>>>,
    page_requests: Rc<RefCell<Vec<usize>>>,
    closed: Cell<bool>,
}

impl Default for ScriptedDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedDevice {
    /// Create an empty scripted device.
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            chunk_size: DEFAULT_CHUNK,
            property_io_failures: HashSet::new(),
            enumeration_failures: HashSet::new(),
            stream_open_failures: HashSet::new(),
            stream_fail_after: HashMap::new(),
            reply_overrides: HashMap::new(),
            reply_len_override: None,
            delete_log: RefCell::new(Vec::new()),
            page_requests: Rc::new(RefCell::new(Vec::new())),
            closed: Cell::new(false),
        }
    }

    /// Override the suggested stream chunk size.
    #[must_use]
    pub const fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Add a directory object carrying both name properties.
    #[must_use]
    pub fn dir(mut self, parent: &str, id: &str, name: &str) -> Self {
        self.objects.push(ScriptedObject {
            id: ObjectId::from(id),
            parent: ObjectId::from(parent),
            original_name: Some(name.to_owned()),
            name: Some(name.to_owned()),
            content: Vec::new(),
        });
        self
    }

    /// Add a file object whose plain name is the stem of `name`.
    #[must_use]
    pub fn file(mut self, parent: &str, id: &str, name: &str, content: &[u8]) -> Self {
        let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
        self.objects.push(ScriptedObject {
            id: ObjectId::from(id),
            parent: ObjectId::from(parent),
            original_name: Some(name.to_owned()),
            name: Some(stem.to_owned()),
            content: content.to_vec(),
        });
        self
    }

    /// Add a file that only advertises the plain name property.
    #[must_use]
    pub fn file_without_original(
        mut self,
        parent: &str,
        id: &str,
        plain_name: &str,
        content: &[u8],
    ) -> Self {
        self.objects.push(ScriptedObject {
            id: ObjectId::from(id),
            parent: ObjectId::from(parent),
            original_name: None,
            name: Some(plain_name.to_owned()),
            content: content.to_vec(),
        });
        self
    }

    /// Add an object that advertises no name property at all.
    #[must_use]
    pub fn nameless(mut self, parent: &str, id: &str) -> Self {
        self.objects.push(ScriptedObject {
            id: ObjectId::from(id),
            parent: ObjectId::from(parent),
            original_name: None,
            name: None,
            content: Vec::new(),
        });
        self
    }

    /// Fail every property read for `id` with an IO error.
    #[must_use]
    pub fn fail_property_reads(mut self, id: &str) -> Self {
        self.property_io_failures.insert(ObjectId::from(id));
        self
    }

    /// Fail child enumeration under `parent` on the first page fetch.
    #[must_use]
    pub fn fail_enumeration(mut self, parent: &str) -> Self {
        self.enumeration_failures.insert(ObjectId::from(parent));
        self
    }

    /// Fail opening a read stream for `id`.
    #[must_use]
    pub fn fail_stream_open(mut self, id: &str) -> Self {
        self.stream_open_failures.insert(ObjectId::from(id));
        self
    }

    /// Serve `bytes` of content for `id`, then fail the next read.
    #[must_use]
    pub fn fail_stream_after(mut self, id: &str, bytes: usize) -> Self {
        self.stream_fail_after.insert(ObjectId::from(id), bytes);
        self
    }

    /// Report a failing deletion status for `id`.
    #[must_use]
    pub fn fail_delete(mut self, id: &str) -> Self {
        self.reply_overrides
            .insert(ObjectId::from(id), DeleteReply::Status(DeviceStatus(-1)));
        self
    }

    /// Hand back an arbitrary deletion reply for `id`.
    #[must_use]
    pub fn delete_reply(mut self, id: &str, reply: DeleteReply) -> Self {
        self.reply_overrides.insert(ObjectId::from(id), reply);
        self
    }

    /// Truncate every deletion reply list to `len` entries.
    #[must_use]
    pub const fn truncate_delete_replies(mut self, len: usize) -> Self {
        self.reply_len_override = Some(len);
        self
    }

    /// Batches submitted to [`DeviceSession::delete_batch`], in call order.
    #[must_use]
    pub fn delete_batches(&self) -> Vec<Vec<ObjectId>> {
        self.delete_log.borrow().clone()
    }

    /// Page sizes requested from child pagers, in call order.
    #[must_use]
    pub fn page_requests(&self) -> Vec<usize> {
        self.page_requests.borrow().clone()
    }

    /// Whether [`DeviceSession::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    fn ensure_open(&self, operation: &'static str) -> DeviceResult<()> {
        if self.closed.get() {
            return Err(DeviceError::closed(operation));
        }
        Ok(())
    }

    fn find(&self, id: &ObjectId) -> Option<&ScriptedObject> {
        self.objects.iter().find(|object| object.id == *id)
    }

    fn knows(&self, id: &ObjectId) -> bool {
        id.as_str() == ROOT_ID || self.find(id).is_some()
    }
}

impl DeviceSession for ScriptedDevice {
    fn root_id(&self) -> ObjectId {
        ObjectId::from(ROOT_ID)
    }

    fn enumerate_children(&self, parent: &ObjectId) -> DeviceResult<Box<dyn ObjectPager>> {
        self.ensure_open("enumerate_children")?;
        if !self.knows(parent) {
            return Err(DeviceError::not_found("object", parent.as_str()));
        }
        let ids = self
            .objects
            .iter()
            .filter(|object| object.parent == *parent)
            .map(|object| object.id.clone())
            .collect();
        Ok(Box::new(ScriptedPager {
            ids,
            offset: 0,
            fail: self.enumeration_failures.contains(parent),
            requests: Rc::clone(&self.page_requests),
        }))
    }

    fn read_property(&self, id: &ObjectId, kind: PropertyKind) -> DeviceResult<String> {
        self.ensure_open("read_property")?;
        let object = self
            .find(id)
            .ok_or_else(|| DeviceError::not_found("object", id.as_str()))?;
        if self.property_io_failures.contains(id) {
            return Err(DeviceError::io(
                "read_property",
                io::Error::other("scripted property failure"),
            ));
        }
        let value = match kind {
            PropertyKind::OriginalFileName => object.original_name.clone(),
            PropertyKind::Name => object.name.clone(),
        };
        value.ok_or_else(|| DeviceError::not_found("property", format!("{id}/{}", kind.as_str())))
    }

    fn open_read_stream(&self, id: &ObjectId) -> DeviceResult<ObjectStream> {
        self.ensure_open("open_read_stream")?;
        let object = self
            .find(id)
            .ok_or_else(|| DeviceError::not_found("object", id.as_str()))?;
        if self.stream_open_failures.contains(id) {
            return Err(DeviceError::io(
                "open_read_stream",
                io::Error::other("scripted stream failure"),
            ));
        }
        Ok(ObjectStream {
            reader: Box::new(FlakyReader {
                data: object.content.clone(),
                pos: 0,
                fail_after: self.stream_fail_after.get(id).copied(),
            }),
            chunk_size: self.chunk_size,
        })
    }

    fn delete_batch(&self, ids: &[ObjectId]) -> DeviceResult<Vec<DeleteReply>> {
        self.ensure_open("delete_batch")?;
        self.delete_log.borrow_mut().push(ids.to_vec());
        let mut replies: Vec<DeleteReply> = ids
            .iter()
            .map(|id| {
                self.reply_overrides
                    .get(id)
                    .cloned()
                    .unwrap_or(DeleteReply::Status(DeviceStatus::OK))
            })
            .collect();
        if let Some(len) = self.reply_len_override {
            replies.truncate(len);
        }
        Ok(replies)
    }

    fn close(&mut self) -> DeviceResult<()> {
        if self.closed.replace(true) {
            return Err(DeviceError::closed("close"));
        }
        Ok(())
    }
}

struct ScriptedPager {
    ids: Vec<ObjectId>,
    offset: usize,
    fail: bool,
    requests: Rc<RefCell<Vec<usize>>>,
}

impl ObjectPager for ScriptedPager {
    fn next_batch(&mut self, max: usize) -> DeviceResult<Vec<ObjectId>> {
        self.requests.borrow_mut().push(max);
        if self.fail {
            return Err(DeviceError::io(
                "next_batch",
                io::Error::other("scripted page failure"),
            ));
        }
        let end = self.ids.len().min(self.offset + max);
        let batch = self.ids[self.offset..end].to_vec();
        self.offset = end;
        Ok(batch)
    }
}

struct FlakyReader {
    data: Vec<u8>,
    pos: usize,
    fail_after: Option<usize>,
}

impl Read for FlakyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut limit = self.data.len();
        if let Some(fail_after) = self.fail_after {
            if self.pos >= fail_after {
                return Err(io::Error::other("scripted mid-stream failure"));
            }
            limit = limit.min(fail_after);
        }
        let available = limit.saturating_sub(self.pos);
        let count = available.min(buf.len());
        buf[..count].copy_from_slice(&self.data[self.pos..self.pos + count]);
        self.pos += count;
        Ok(count)
    }
}
