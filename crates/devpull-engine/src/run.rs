//! Run orchestration: resolve, enumerate, copy, delete.

use std::path::PathBuf;

use devpull_device::DeviceSession;
use serde::Serialize;
use tracing::{info, warn};

use crate::delete::delete_matched;
use crate::enumerate::{NameFilter, enumerate_matching};
use crate::error::{EngineError, EngineResult};
use crate::model::{MatchedObject, Outcome};
use crate::resolve::resolve_path;
use crate::transfer::copy_object;

/// Immutable inputs for one run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Slash-separated path of the source directory on the device.
    pub source_path: String,
    /// Filter applied to enumerated child names.
    pub filter: NameFilter,
    /// Local directory receiving copies; required when `copy` is set.
    pub destination: Option<PathBuf>,
    /// Whether matched files are copied to the destination.
    pub copy: bool,
    /// Whether matched files are deleted from the device.
    pub delete: bool,
}

/// Per-item and aggregate results of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Every matched object with its final outcome.
    pub items: Vec<MatchedObject>,
    /// Items copied successfully.
    pub copied: usize,
    /// Bytes written to the destination across all successful copies.
    pub copied_bytes: u64,
    /// Items deleted successfully.
    pub deleted: usize,
}

impl RunReport {
    /// Items whose final outcome is failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.items.iter().filter(|item| item.is_failed()).count()
    }

    /// Whether any item failed a phase it participated in.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.items.iter().any(MatchedObject::is_failed)
    }
}

/// Execute one run and close the session.
///
/// The session is closed on every path, success or failure, so co-resident
/// device browsers never face a dangling session. A close failure is logged
/// but does not replace the run's own result.
///
/// # Errors
///
/// Returns an error when path resolution, enumeration, or a whole-batch
/// deletion submission fails. Per-item copy and delete failures are recorded
/// on the report instead.
pub fn execute(session: &mut dyn DeviceSession, request: &RunRequest) -> EngineResult<RunReport> {
    let result = run_phases(&*session, request);
    if let Err(err) = session.close() {
        warn!(error = %err, "failed to close device session");
    }
    result
}

fn run_phases(session: &dyn DeviceSession, request: &RunRequest) -> EngineResult<RunReport> {
    let source = resolve_path(session, &request.source_path)?;
    info!(path = %request.source_path, object = %source, "resolved source directory");

    let matches = enumerate_matching(session, &source, &request.filter)?;
    let mut items: Vec<MatchedObject> = matches.into_iter().map(MatchedObject::new).collect();
    if items.is_empty() {
        info!(path = %request.source_path, "no files matched");
        return Ok(RunReport {
            items,
            copied: 0,
            copied_bytes: 0,
            deleted: 0,
        });
    }
    info!(matched = items.len(), "enumeration matched files");

    let mut copied = 0;
    let mut copied_bytes: u64 = 0;
    if request.copy {
        let destination = request
            .destination
            .as_deref()
            .ok_or(EngineError::InvalidInput {
                field: "destination_directory",
                reason: "copy requested without a destination directory",
            })?;
        for item in &mut items {
            match copy_object(session, &item.object, destination) {
                Ok(bytes) => {
                    info!(file = %item.object.name, bytes, "copied");
                    item.mark_succeeded();
                    copied += 1;
                    copied_bytes += bytes;
                }
                Err(err) => {
                    let reason = err.describe();
                    warn!(file = %item.object.name, error = %reason, "copy failed");
                    item.mark_failed(reason);
                }
            }
        }
    }

    let mut deleted = 0;
    if request.delete {
        delete_matched(session, &mut items)?;
        deleted = items
            .iter()
            .filter(|item| item.outcome == Outcome::Succeeded)
            .count();
    }

    Ok(RunReport {
        items,
        copied,
        copied_bytes,
        deleted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use devpull_device::ObjectId;
    use devpull_test_support::fixtures::temp_dir;
    use devpull_test_support::mocks::{ROOT_ID, ScriptedDevice};
    use std::fs;

    fn photo_device() -> ScriptedDevice {
        ScriptedDevice::new()
            .dir(ROOT_ID, "dcim", "DCIM")
            .file("dcim", "f1", "IMG_0001.jpg", b"one")
            .file("dcim", "f2", "IMG_0002.jpg", b"two")
            .file("dcim", "f3", "notes.txt", b"text")
    }

    fn request(copy: bool, delete: bool, destination: Option<PathBuf>) -> RunRequest {
        RunRequest {
            source_path: "DCIM".to_owned(),
            filter: NameFilter::from_needle(Some(".jpg".to_owned())),
            destination,
            copy,
            delete,
        }
    }

    #[test]
    fn copy_then_delete_processes_every_match() -> Result<()> {
        let mut device = photo_device();
        let dir = temp_dir()?;

        let report = execute(
            &mut device,
            &request(true, true, Some(dir.path().to_path_buf())),
        )?;

        assert_eq!(report.copied, 2);
        assert_eq!(report.copied_bytes, 6);
        assert_eq!(report.deleted, 2);
        assert!(!report.has_failures());
        assert_eq!(fs::read(dir.path().join("IMG_0001.jpg"))?, b"one");
        assert_eq!(fs::read(dir.path().join("IMG_0002.jpg"))?, b"two");
        assert!(!dir.path().join("notes.txt").exists());
        assert_eq!(
            device.delete_batches(),
            vec![vec![ObjectId::from("f1"), ObjectId::from("f2")]]
        );
        assert!(device.is_closed());
        Ok(())
    }

    #[test]
    fn failed_copy_excludes_the_item_from_deletion() -> Result<()> {
        let mut device = photo_device().fail_stream_open("f1");
        let dir = temp_dir()?;

        let report = execute(
            &mut device,
            &request(true, true, Some(dir.path().to_path_buf())),
        )?;

        assert_eq!(report.copied, 1);
        assert_eq!(report.deleted, 1);
        assert!(report.has_failures());
        assert!(matches!(
            report.items[0].outcome,
            Outcome::Failed { ref reason } if reason.starts_with("reading source")
        ));
        assert_eq!(report.items[1].outcome, Outcome::Succeeded);
        assert_eq!(device.delete_batches(), vec![vec![ObjectId::from("f2")]]);
        Ok(())
    }

    #[test]
    fn zero_matches_end_the_run_successfully() -> Result<()> {
        let mut device = photo_device();
        let report = execute(
            &mut device,
            &RunRequest {
                source_path: "DCIM".to_owned(),
                filter: NameFilter::Contains(".raw".to_owned()),
                destination: None,
                copy: false,
                delete: true,
            },
        )?;

        assert!(report.items.is_empty());
        assert!(!report.has_failures());
        assert!(device.delete_batches().is_empty());
        assert!(device.is_closed());
        Ok(())
    }

    #[test]
    fn listing_run_leaves_outcomes_pending() -> Result<()> {
        let mut device = photo_device();
        let report = execute(&mut device, &request(false, false, None))?;

        assert_eq!(report.items.len(), 2);
        assert!(
            report
                .items
                .iter()
                .all(|item| item.outcome == Outcome::Pending)
        );
        assert_eq!(report.copied, 0);
        assert_eq!(report.deleted, 0);
        Ok(())
    }

    #[test]
    fn delete_without_copy_submits_pending_items() -> Result<()> {
        let mut device = photo_device();
        let report = execute(&mut device, &request(false, true, None))?;

        assert_eq!(report.deleted, 2);
        assert_eq!(
            device.delete_batches(),
            vec![vec![ObjectId::from("f1"), ObjectId::from("f2")]]
        );
        Ok(())
    }

    #[test]
    fn session_is_closed_when_resolution_fails() {
        let mut device = photo_device();
        let err = execute(
            &mut device,
            &RunRequest {
                source_path: "Missing".to_owned(),
                filter: NameFilter::All,
                destination: None,
                copy: false,
                delete: false,
            },
        )
        .expect_err("path does not exist");

        assert!(matches!(err, EngineError::PathNotFound { .. }));
        assert!(device.is_closed());
    }

    #[test]
    fn copy_without_destination_is_rejected() {
        let mut device = photo_device();
        let err = execute(&mut device, &request(true, false, None))
            .expect_err("destination is required");
        assert!(matches!(err, EngineError::InvalidInput { .. }));
        assert!(device.is_closed());
    }
}
