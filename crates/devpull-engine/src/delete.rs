//! Batched deletion with sparse-to-dense result correlation.
//!
//! # Design
//! - The device reply is dense: one value per *submitted* identifier. The
//!   caller's list is sparse because items already failed in an earlier
//!   phase are skipped, not submitted.
//! - An explicit original-index list is carried for every submitted item so
//!   replies map back without re-deriving which items were skipped.

use devpull_device::{DeleteReply, DeviceSession};
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::model::MatchedObject;

/// Delete every item whose outcome is not already `Failed`, updating each
/// submitted item's outcome in place from the device reply.
///
/// Skipped items keep their prior outcome and are never shown a deletion
/// result. A reply value of an unexpected shape marks that single item
/// failed; the rest of the batch is still applied.
///
/// # Errors
///
/// Returns an error when the batch cannot be submitted, or when the reply
/// length disagrees with the submission count; correlation is impossible
/// then, so no outcome is updated.
pub fn delete_matched(
    session: &dyn DeviceSession,
    items: &mut [MatchedObject],
) -> EngineResult<()> {
    let mut original_indices = Vec::with_capacity(items.len());
    let mut ids = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if !item.is_failed() {
            original_indices.push(index);
            ids.push(item.object.id.clone());
        }
    }
    if ids.is_empty() {
        info!("no items eligible for deletion");
        return Ok(());
    }

    let replies = session
        .delete_batch(&ids)
        .map_err(|source| EngineError::device("submitting deletion batch", source))?;
    if replies.len() != ids.len() {
        return Err(EngineError::unexpected_reply(
            "delete_batch",
            Some(format!(
                "{} replies for {} submitted items",
                replies.len(),
                ids.len()
            )),
        ));
    }

    for (reply, &index) in replies.iter().zip(&original_indices) {
        let item = &mut items[index];
        match reply {
            DeleteReply::Status(status) if status.is_success() => {
                info!(file = %item.object.name, "deleted");
                item.mark_succeeded();
            }
            DeleteReply::Status(status) => {
                warn!(file = %item.object.name, code = status.0, "delete failed");
                item.mark_failed(format!("device status {}", status.0));
            }
            DeleteReply::Other(value) => {
                warn!(file = %item.object.name, value = %value, "unexpected delete reply shape");
                item.mark_failed(format!("unexpected delete reply shape: {value}"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ObjectRef, Outcome};
    use devpull_device::{DeleteReply, ObjectId};
    use devpull_test_support::mocks::{ROOT_ID, ScriptedDevice};

    fn item(id: &str, name: &str) -> MatchedObject {
        MatchedObject::new(ObjectRef {
            id: ObjectId::from(id),
            name: name.to_owned(),
        })
    }

    fn failed_item(id: &str, name: &str) -> MatchedObject {
        let mut item = item(id, name);
        item.mark_failed("copy failed earlier");
        item
    }

    #[test]
    fn failed_items_are_skipped_and_results_realigned() {
        // Original list [A:Failed, B:Pending, C:Pending]; the device returns
        // [ok, error] for the submitted [B, C]. A must never read reply 0.
        let device = ScriptedDevice::new()
            .file(ROOT_ID, "b", "b.jpg", b"")
            .file(ROOT_ID, "c", "c.jpg", b"")
            .fail_delete("c");
        let mut items = vec![
            failed_item("a", "a.jpg"),
            item("b", "b.jpg"),
            item("c", "c.jpg"),
        ];

        delete_matched(&device, &mut items).expect("batch");

        assert!(matches!(
            items[0].outcome,
            Outcome::Failed { ref reason } if reason == "copy failed earlier"
        ));
        assert_eq!(items[1].outcome, Outcome::Succeeded);
        assert!(matches!(
            items[2].outcome,
            Outcome::Failed { ref reason } if reason.contains("device status")
        ));
        assert_eq!(
            device.delete_batches(),
            vec![vec![ObjectId::from("b"), ObjectId::from("c")]]
        );
    }

    #[test]
    fn reply_count_equals_submission_count() {
        let device = ScriptedDevice::new()
            .file(ROOT_ID, "a", "a.jpg", b"")
            .file(ROOT_ID, "c", "c.jpg", b"");
        let mut items = vec![
            item("a", "a.jpg"),
            failed_item("b", "b.jpg"),
            item("c", "c.jpg"),
            failed_item("d", "d.jpg"),
        ];

        delete_matched(&device, &mut items).expect("batch");

        let batches = device.delete_batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
        let updated = items
            .iter()
            .filter(|item| item.outcome == Outcome::Succeeded)
            .count();
        assert_eq!(updated, batches[0].len());
    }

    #[test]
    fn empty_submission_skips_the_device_call() {
        let device = ScriptedDevice::new();
        let mut items = vec![failed_item("a", "a.jpg"), failed_item("b", "b.jpg")];

        delete_matched(&device, &mut items).expect("nothing to submit");
        assert!(device.delete_batches().is_empty());
        assert!(items.iter().all(MatchedObject::is_failed));
    }

    #[test]
    fn malformed_reply_fails_only_that_item() {
        let device = ScriptedDevice::new()
            .file(ROOT_ID, "a", "a.jpg", b"")
            .file(ROOT_ID, "b", "b.jpg", b"")
            .delete_reply("a", DeleteReply::Other("VT_UI4".to_owned()));
        let mut items = vec![item("a", "a.jpg"), item("b", "b.jpg")];

        delete_matched(&device, &mut items).expect("batch");

        assert!(matches!(
            items[0].outcome,
            Outcome::Failed { ref reason } if reason.contains("VT_UI4")
        ));
        assert_eq!(items[1].outcome, Outcome::Succeeded);
    }

    #[test]
    fn truncated_reply_list_is_fatal_and_touches_no_outcome() {
        let device = ScriptedDevice::new()
            .file(ROOT_ID, "a", "a.jpg", b"")
            .file(ROOT_ID, "b", "b.jpg", b"")
            .truncate_delete_replies(1);
        let mut items = vec![item("a", "a.jpg"), item("b", "b.jpg")];

        let err = delete_matched(&device, &mut items).expect_err("reply too short");
        assert!(matches!(err, EngineError::UnexpectedReply { .. }));
        assert!(
            items
                .iter()
                .all(|item| item.outcome == Outcome::Pending)
        );
    }
}
