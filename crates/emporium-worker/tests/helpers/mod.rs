//! Shared fixtures for the worker integration tests: a controllable blob
//! store stub, a recording search-sync stub, and a polling helper for
//! asserting on asynchronously applied state.

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio::time::{sleep, Instant};
use uuid::Uuid;

use emporium_core::error::AppError;
use emporium_core::models::{SearchDocPatch, UploadedBlob};
use emporium_storage::{MediaStore, StorageError, StorageResult};
use emporium_worker::SearchSync;

/// What the stub store observed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Upload(String),
    Delete { location: String, existed: bool },
}

/// Blob store stub with controllable latency and programmable failures.
pub struct StubMediaStore {
    latency: Duration,
    fail_uploads_from: Option<usize>,
    error_on_missing_delete: bool,
    upload_counter: AtomicUsize,
    stored: Mutex<HashSet<String>>,
    events: Mutex<Vec<StoreEvent>>,
}

impl StubMediaStore {
    pub fn new() -> Self {
        Self {
            latency: Duration::ZERO,
            fail_uploads_from: None,
            error_on_missing_delete: false,
            upload_counter: AtomicUsize::new(0),
            stored: Mutex::new(HashSet::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fail every upload starting from the given zero-based call index.
    pub fn failing_uploads_from(mut self, index: usize) -> Self {
        self.fail_uploads_from = Some(index);
        self
    }

    /// Report a missing blob as an error instead of the contract's no-op,
    /// to exercise the worker's tolerance of misbehaving backends.
    pub fn erroring_on_missing_delete(mut self) -> Self {
        self.error_on_missing_delete = true;
        self
    }

    pub fn events(&self) -> Vec<StoreEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn upload_count(&self) -> usize {
        self.upload_counter.load(Ordering::SeqCst)
    }

    pub fn uploaded_locations(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                StoreEvent::Upload(location) => Some(location),
                _ => None,
            })
            .collect()
    }

    pub fn contains(&self, location: &str) -> bool {
        self.stored.lock().unwrap().contains(location)
    }
}

#[async_trait]
impl MediaStore for StubMediaStore {
    async fn upload(&self, bytes: Bytes, kind_tag: &str) -> StorageResult<UploadedBlob> {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }

        let index = self.upload_counter.fetch_add(1, Ordering::SeqCst);
        if matches!(self.fail_uploads_from, Some(from) if index >= from) {
            return Err(StorageError::UploadFailed(format!(
                "stub configured to fail upload #{}",
                index
            )));
        }

        let location = format!("http://stub/{}/{}", kind_tag, index);
        self.stored.lock().unwrap().insert(location.clone());
        self.events
            .lock()
            .unwrap()
            .push(StoreEvent::Upload(location.clone()));

        Ok(UploadedBlob {
            location,
            format: "webp".to_string(),
            size_bytes: bytes.len() as u64,
            created_at: Utc::now(),
        })
    }

    async fn delete(&self, location: &str) -> StorageResult<()> {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }

        let existed = self.stored.lock().unwrap().remove(location);
        self.events.lock().unwrap().push(StoreEvent::Delete {
            location: location.to_string(),
            existed,
        });

        if !existed && self.error_on_missing_delete {
            return Err(StorageError::NotFound(location.to_string()));
        }

        Ok(())
    }
}

/// Search-sync stub that records every patch it is asked to apply.
#[derive(Default)]
pub struct RecordingSearchSync {
    patches: Mutex<Vec<(Uuid, SearchDocPatch)>>,
}

impl RecordingSearchSync {
    pub fn patches(&self) -> Vec<(Uuid, SearchDocPatch)> {
        self.patches.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchSync for RecordingSearchSync {
    async fn reconcile(&self, product_id: Uuid, patch: SearchDocPatch) -> Result<(), AppError> {
        self.patches.lock().unwrap().push((product_id, patch));
        Ok(())
    }
}

/// Install a subscriber once so failing tests show the pipeline's logs.
/// `RUST_LOG` filters as usual.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_test_writer()
        .try_init();
}

/// Poll until the condition holds, panicking after two seconds.
pub async fn wait_until<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        if condition().await {
            return;
        }
        if Instant::now() > deadline {
            panic!("condition not met within 2s");
        }
        sleep(Duration::from_millis(20)).await;
    }
}

/// Helper to keep `Arc<StubMediaStore>` usable both as the context's
/// `Arc<dyn MediaStore>` and for assertions.
pub fn shared(store: StubMediaStore) -> Arc<StubMediaStore> {
    Arc::new(store)
}
