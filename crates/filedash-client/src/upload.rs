//! Upload pipeline
//!
//! Drives a bounded, strictly sequential upload of user-selected files to
//! object storage via presigned URLs. Each item runs its full round trip
//! (URL generation, binary transfer, completion acknowledgment) before the
//! next begins, so a single shared progress percentage stays unambiguous.
//! One item failing never aborts the run; it is logged, marked, and skipped
//! past.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use filedash_core::constants::{MAX_UPLOAD_FILES, UPLOAD_SETTLE_DELAY_MS};
use filedash_core::error::ClientError;
use filedash_core::models::{mime_type_for, UploadDestination, UploadUrlRequest};

use crate::ApiClient;

/// Client-side lifecycle of one queued file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadItemStatus {
    Idle,
    Pending,
    Uploading,
    Success,
    Error,
}

/// One queued file. `id` is client-generated, unique within the queue, and
/// unrelated to any server identity.
#[derive(Debug, Clone)]
pub struct UploadItem {
    pub id: Uuid,
    pub path: PathBuf,
    pub filename: String,
    pub file_size: u64,
    pub mime_type: String,
    pub status: UploadItemStatus,
}

/// Result of adding files to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionOutcome {
    pub accepted: usize,
    /// Files dropped because the queue bound was hit.
    pub truncated: usize,
}

/// Aggregate result of one upload run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl UploadSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// Single user-facing summary line, phrased as full or partial success.
    pub fn message(&self) -> String {
        if self.all_succeeded() {
            format!("{} file(s) uploaded", self.succeeded)
        } else {
            format!("{} uploaded, {} failed", self.succeeded, self.failed)
        }
    }
}

/// Hooks for surfaces that render per-item status, the shared progress
/// percentage, and the run summary.
pub trait UploadObserver: Send + Sync {
    fn on_item_status(&self, _item_id: Uuid, _status: UploadItemStatus) {}
    fn on_progress(&self, _percent: u8) {}
    fn on_summary(&self, _summary: &UploadSummary) {}
}

/// No-op implementation for headless runs.
pub struct NoOpUploadObserver;

impl UploadObserver for NoOpUploadObserver {}

/// Queue plus run state for one upload dialog invocation.
pub struct UploadPipeline {
    client: ApiClient,
    destination: UploadDestination,
    items: Vec<UploadItem>,
    settle_delay: Duration,
    progress: u8,
}

impl UploadPipeline {
    pub fn new(client: ApiClient, destination: UploadDestination) -> Self {
        Self {
            client,
            destination,
            items: Vec::new(),
            settle_delay: Duration::from_millis(UPLOAD_SETTLE_DELAY_MS),
            progress: 0,
        }
    }

    /// Override the post-run settle delay. Tests set this to zero.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn items(&self) -> &[UploadItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Shared progress of the currently transferring item, 0-100.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Add files to the queue, truncating at the queue bound rather than
    /// rejecting the whole selection. Selecting nothing is a no-op.
    pub fn select_files(&mut self, paths: &[PathBuf]) -> Result<SelectionOutcome, ClientError> {
        if paths.is_empty() {
            return Ok(SelectionOutcome {
                accepted: 0,
                truncated: 0,
            });
        }

        let capacity = MAX_UPLOAD_FILES.saturating_sub(self.items.len());
        let accepted = paths.len().min(capacity);
        let truncated = paths.len() - accepted;
        if truncated > 0 {
            tracing::warn!(
                selected = paths.len(),
                kept = accepted,
                limit = MAX_UPLOAD_FILES,
                "too many files selected, extra files dropped"
            );
        }

        for path in &paths[..accepted] {
            let metadata = std::fs::metadata(path).map_err(|err| {
                ClientError::validation(format!("Cannot read {}: {}", path.display(), err))
            })?;
            let filename = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    ClientError::validation(format!("Invalid filename: {}", path.display()))
                })?;
            self.items.push(UploadItem {
                id: Uuid::new_v4(),
                path: path.clone(),
                filename,
                file_size: metadata.len(),
                mime_type: mime_type_for(path),
                status: UploadItemStatus::Idle,
            });
        }

        Ok(SelectionOutcome {
            accepted,
            truncated,
        })
    }

    /// Remove an idle item. Items in any other state belong to a run and
    /// stay put.
    pub fn remove_item(&mut self, item_id: Uuid) {
        self.items
            .retain(|item| item.id != item_id || item.status != UploadItemStatus::Idle);
    }

    /// Process the queue strictly sequentially. Per-item failures are
    /// isolated; after every item settles, progress is forced to 100, the
    /// summary is reported, and (after the settle delay) the queue is
    /// cleared. Callers refresh the authoritative file list afterwards.
    pub async fn run(&mut self, observer: Arc<dyn UploadObserver>) -> UploadSummary {
        if self.items.is_empty() {
            return UploadSummary {
                succeeded: 0,
                failed: 0,
            };
        }

        let snapshot: Vec<Uuid> = self.items.iter().map(|item| item.id).collect();
        for id in &snapshot {
            self.set_status(*id, UploadItemStatus::Pending, &observer);
        }

        let mut succeeded = 0;
        let mut failed = 0;

        for id in snapshot {
            let Some(item) = self.items.iter().find(|item| item.id == id).cloned() else {
                continue;
            };

            let target = match self
                .client
                .request_upload_url(&UploadUrlRequest {
                    filename: item.filename.clone(),
                    file_size: item.file_size,
                    mime_type: item.mime_type.clone(),
                    upload_to: self.destination,
                })
                .await
            {
                Ok(target) => target,
                Err(err) => {
                    self.mark_failed(&item, "upload-url generation", err, &observer);
                    failed += 1;
                    continue;
                }
            };

            self.set_status(id, UploadItemStatus::Uploading, &observer);
            self.progress = 0;
            observer.on_progress(0);

            if let Err(err) =
                transfer_to_storage(self.client.http(), &item, &target.upload_url, &observer).await
            {
                self.mark_failed(&item, "storage transfer", err, &observer);
                failed += 1;
                continue;
            }

            if let Err(err) = self.client.complete_upload(target.file_id).await {
                self.mark_failed(&item, "completion acknowledgment", err, &observer);
                failed += 1;
                continue;
            }

            self.set_status(id, UploadItemStatus::Success, &observer);
            succeeded += 1;
        }

        self.progress = 100;
        observer.on_progress(100);

        let summary = UploadSummary { succeeded, failed };
        observer.on_summary(&summary);
        if summary.all_succeeded() {
            tracing::info!(succeeded, "upload run finished");
        } else {
            tracing::warn!(succeeded, failed, "upload run finished with failures");
        }

        tokio::time::sleep(self.settle_delay).await;
        self.items.clear();
        self.progress = 0;

        summary
    }

    fn set_status(&mut self, item_id: Uuid, status: UploadItemStatus, observer: &Arc<dyn UploadObserver>) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == item_id) {
            item.status = status;
            observer.on_item_status(item_id, status);
        }
    }

    fn mark_failed(
        &mut self,
        item: &UploadItem,
        stage: &str,
        err: ClientError,
        observer: &Arc<dyn UploadObserver>,
    ) {
        tracing::error!(
            item_id = %item.id,
            filename = %item.filename,
            stage,
            error = %err,
            kind = err.error_type(),
            http_status = ?err.http_status(),
            "upload item failed"
        );
        self.set_status(item.id, UploadItemStatus::Error, observer);
    }
}

/// PUT the raw file body to the presigned URL, reporting progress as a 0-100
/// percentage of bytes handed to the transport.
async fn transfer_to_storage(
    http: &reqwest::Client,
    item: &UploadItem,
    upload_url: &str,
    observer: &Arc<dyn UploadObserver>,
) -> Result<(), ClientError> {
    let file = tokio::fs::File::open(&item.path).await?;
    let total = item.file_size.max(1);
    let sent = Arc::new(AtomicU64::new(0));
    let progress_observer = Arc::clone(observer);

    let body_stream = ReaderStream::new(file).inspect(move |chunk| {
        if let Ok(bytes) = chunk {
            let done = sent.fetch_add(bytes.len() as u64, Ordering::Relaxed) + bytes.len() as u64;
            let percent = (done.min(total) * 100 / total) as u8;
            progress_observer.on_progress(percent);
        }
    });

    let response = http
        .put(upload_url)
        .header(reqwest::header::CONTENT_TYPE, item.mime_type.clone())
        .header(reqwest::header::CONTENT_LENGTH, item.file_size)
        .body(reqwest::Body::wrap_stream(body_stream))
        .send()
        .await
        .map_err(|err| ClientError::network(err.to_string()))?;

    if !response.status().is_success() {
        return Err(ClientError::Http {
            status: response.status().as_u16(),
            message: format!("Object storage rejected the transfer of {}", item.filename),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySessionStore;
    use filedash_core::ClientConfig;
    use std::path::Path;
    use tempfile::TempDir;

    fn pipeline() -> UploadPipeline {
        let config = ClientConfig {
            api_base_url: "http://localhost:0".to_string(),
            request_timeout_secs: 5,
            session_file: PathBuf::from("/dev/null"),
        };
        let client = ApiClient::new(&config, Arc::new(MemorySessionStore::new())).unwrap();
        UploadPipeline::new(client, UploadDestination::Uploads)
    }

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"content").unwrap();
        path
    }

    #[test]
    fn selection_within_bound_keeps_all_items_idle() {
        let dir = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = (0..2).map(|i| touch(dir.path(), &format!("f{i}.txt"))).collect();

        let mut pipeline = pipeline();
        let outcome = pipeline.select_files(&paths).unwrap();

        assert_eq!(outcome, SelectionOutcome { accepted: 2, truncated: 0 });
        assert_eq!(pipeline.items().len(), 2);
        assert!(pipeline
            .items()
            .iter()
            .all(|item| item.status == UploadItemStatus::Idle));
    }

    #[test]
    fn selection_over_bound_truncates_to_first_three() {
        let dir = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = (0..5).map(|i| touch(dir.path(), &format!("f{i}.txt"))).collect();

        let mut pipeline = pipeline();
        let outcome = pipeline.select_files(&paths).unwrap();

        assert_eq!(outcome, SelectionOutcome { accepted: 3, truncated: 2 });
        let names: Vec<&str> = pipeline
            .items()
            .iter()
            .map(|item| item.filename.as_str())
            .collect();
        assert_eq!(names, vec!["f0.txt", "f1.txt", "f2.txt"]);
    }

    #[test]
    fn empty_selection_is_a_no_op() {
        let mut pipeline = pipeline();
        let outcome = pipeline.select_files(&[]).unwrap();
        assert_eq!(outcome, SelectionOutcome { accepted: 0, truncated: 0 });
        assert!(pipeline.is_empty());
    }

    #[test]
    fn item_ids_are_unique_within_queue() {
        let dir = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = (0..3).map(|i| touch(dir.path(), &format!("f{i}.txt"))).collect();

        let mut pipeline = pipeline();
        pipeline.select_files(&paths).unwrap();

        let mut ids: Vec<Uuid> = pipeline.items().iter().map(|item| item.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn remove_only_touches_idle_items() {
        let dir = TempDir::new().unwrap();
        let path = touch(dir.path(), "f.txt");

        let mut pipeline = pipeline();
        pipeline.select_files(&[path]).unwrap();
        let id = pipeline.items()[0].id;

        pipeline.items[0].status = UploadItemStatus::Uploading;
        pipeline.remove_item(id);
        assert_eq!(pipeline.items().len(), 1);

        pipeline.items[0].status = UploadItemStatus::Idle;
        pipeline.remove_item(id);
        assert!(pipeline.is_empty());
    }

    #[test]
    fn mime_types_inferred_at_selection() {
        let dir = TempDir::new().unwrap();
        let path = touch(dir.path(), "photo.png");

        let mut pipeline = pipeline();
        pipeline.select_files(&[path]).unwrap();
        assert_eq!(pipeline.items()[0].mime_type, "image/png");
    }
}
