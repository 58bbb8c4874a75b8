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

//! Object-tree resolution and batch transfer/deletion engine.
//!
//! Resolves a slash-separated path on a device's hierarchical object store,
//! enumerates files under it with a substring filter, copies them to local
//! storage, and deletes them from the device while tracking success per
//! file. A file whose copy failed is never submitted for deletion.
//!
//! Everything here is single-threaded, synchronous, and blocking; a run owns
//! its device session exclusively and retains no state afterwards.

mod delete;
mod enumerate;
mod error;
mod model;
mod naming;
mod resolve;
mod run;
mod transfer;

pub use delete::delete_matched;
pub use enumerate::{ENUM_BATCH_SIZE, NameFilter, enumerate_matching};
pub use error::{EngineError, EngineResult};
pub use model::{MatchedObject, ObjectRef, Outcome};
pub use naming::resolve_object_name;
pub use resolve::resolve_path;
pub use run::{RunReport, RunRequest, execute};
pub use transfer::{DEFAULT_CHUNK_SIZE, copy_object};
