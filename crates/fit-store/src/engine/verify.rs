//! Integrity check over the stored history.

use fit_core::digest::hash_buffer;
use tracing::{debug, info, warn};

use super::{SnapshotEngine, VerifyIssue, VerifyReport};

impl SnapshotEngine {
    /// Re-hash the blob range of every snapshot record
    pub fn verify(&self) -> VerifyReport {
        let blob = self.store.blob();
        let mut report = VerifyReport::default();

        for (snapshot_index, snapshot) in self.store.snapshots().iter().enumerate() {
            report.snapshots_checked += 1;
            for record in snapshot {
                report.records_checked += 1;
                let issue = match blob.read(record.range) {
                    Err(_) => Some(VerifyIssue::OutOfBounds {
                        snapshot_index,
                        path: record.path.clone(),
                        range: record.range,
                        blob_len: blob.len(),
                    }),
                    Ok(content) => {
                        let actual = hash_buffer(content);
                        (actual != record.digest).then(|| VerifyIssue::DigestMismatch {
                            snapshot_index,
                            path: record.path.clone(),
                            expected: record.digest.clone(),
                            actual,
                        })
                    },
                };

                match issue {
                    Some(issue) => {
                        warn!(%issue, "Integrity check failed");
                        report.issues.push(issue);
                    },
                    None => debug!(snapshot = snapshot_index, path = %record.path, "Verified"),
                }
            }
        }

        info!(
            snapshots = report.snapshots_checked,
            records = report.records_checked,
            issues = report.issues.len(),
            "Verified store"
        );
        report
    }
}
