//! Streaming copy of one remote object into a local file.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use devpull_device::DeviceSession;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::model::ObjectRef;

/// Chunk size used when the device suggests a zero-byte transfer unit.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Copy one object's bytes into `destination_dir`, named after the object.
///
/// The destination file is created for writing, truncating any existing
/// file, so repeated copies overwrite rather than append. One
/// buffer of the negotiated chunk size is reused for the whole transfer; a
/// zero-length read ends the copy successfully. A short write is a hard
/// failure, not retried. All handles are dropped on every exit path.
///
/// Returns the number of bytes copied.
///
/// # Errors
///
/// Failures carry the stage that produced them: `"reading source"`,
/// `"creating destination"`, or `"writing destination"`.
pub fn copy_object(
    session: &dyn DeviceSession,
    object: &ObjectRef,
    destination_dir: &Path,
) -> EngineResult<u64> {
    let stream = session
        .open_read_stream(&object.id)
        .map_err(|source| EngineError::device("reading source", source))?;
    let chunk_size = if stream.chunk_size == 0 {
        DEFAULT_CHUNK_SIZE
    } else {
        stream.chunk_size
    };

    let target = destination_dir.join(&object.name);
    let mut writer = File::create(&target)
        .map_err(|source| EngineError::io("creating destination", &target, source))?;

    let mut reader = stream.reader;
    let mut buffer = vec![0_u8; chunk_size];
    let mut total: u64 = 0;
    loop {
        let nread = reader.read(&mut buffer).map_err(|source| {
            EngineError::io("reading source", PathBuf::from(&object.name), source)
        })?;
        if nread == 0 {
            break;
        }
        let nwritten = writer
            .write(&buffer[..nread])
            .map_err(|source| EngineError::io("writing destination", &target, source))?;
        if nwritten != nread {
            return Err(EngineError::short_write(&target, nread, nwritten));
        }
        total = total.saturating_add(u64::try_from(nread).unwrap_or(u64::MAX));
    }
    debug!(file = %object.name, bytes = total, chunk = chunk_size, "copy complete");
    Ok(total)
}
