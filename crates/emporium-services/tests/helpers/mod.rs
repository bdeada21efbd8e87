//! Full-stack fixture: in-memory repositories, a gated blob-store stub, the
//! queue, the worker pool, and every service wired the way an embedder would
//! wire them.

// Each test binary uses its own subset of this module.
#![allow(dead_code)]

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{sleep, Instant};

use emporium_core::config::MediaLimits;
use emporium_core::models::UploadedBlob;
use emporium_db::{
    InMemoryBrands, InMemoryCategories, InMemoryProducts, InMemoryReviews, InMemorySearchIndex,
    InMemoryStores, InMemoryUsers,
};
use emporium_services::{
    AggregationEngine, CatalogAuthorizer, ReviewService, SearchIndexSync, UploadOrchestrator,
};
use emporium_storage::{MediaStore, StorageResult};
use emporium_worker::{MediaJobQueue, MediaWorkerPool, QueueConfig, WorkerContext};

/// What the stub store observed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Upload(String),
    Delete(String),
}

/// Blob-store stub whose uploads can be held behind a gate, so tests can
/// assert that submission returns while no store call has completed yet.
pub struct GatedMediaStore {
    open_tx: watch::Sender<bool>,
    // Keep a receiver alive so the gate value survives a `release()` that
    // lands before any worker has subscribed: `watch::Sender::send` drops the
    // new value when the receiver count is zero.
    _open_rx: watch::Receiver<bool>,
    upload_counter: AtomicUsize,
    completed_uploads: AtomicUsize,
    stored: Mutex<HashSet<String>>,
    events: Mutex<Vec<StoreEvent>>,
}

impl GatedMediaStore {
    /// Store that serves immediately.
    pub fn open() -> Self {
        Self::with_gate(true)
    }

    /// Store whose uploads block until [`release`](Self::release) is called.
    pub fn gated() -> Self {
        Self::with_gate(false)
    }

    fn with_gate(open: bool) -> Self {
        let (open_tx, open_rx) = watch::channel(open);
        Self {
            open_tx,
            _open_rx: open_rx,
            upload_counter: AtomicUsize::new(0),
            completed_uploads: AtomicUsize::new(0),
            stored: Mutex::new(HashSet::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn release(&self) {
        let _ = self.open_tx.send(true);
    }

    pub fn completed_uploads(&self) -> usize {
        self.completed_uploads.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Vec<StoreEvent> {
        self.events.lock().unwrap().clone()
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
}

#[async_trait]
impl MediaStore for GatedMediaStore {
    async fn upload(&self, bytes: Bytes, kind_tag: &str) -> StorageResult<UploadedBlob> {
        let mut open_rx = self.open_tx.subscribe();
        while !*open_rx.borrow() {
            if open_rx.changed().await.is_err() {
                break;
            }
        }

        let index = self.upload_counter.fetch_add(1, Ordering::SeqCst);
        let location = format!("http://stub/{}/{}", kind_tag, index);
        self.stored.lock().unwrap().insert(location.clone());
        self.events
            .lock()
            .unwrap()
            .push(StoreEvent::Upload(location.clone()));
        self.completed_uploads.fetch_add(1, Ordering::SeqCst);

        Ok(UploadedBlob {
            location,
            format: "webp".to_string(),
            size_bytes: bytes.len() as u64,
            created_at: Utc::now(),
        })
    }

    async fn delete(&self, location: &str) -> StorageResult<()> {
        self.stored.lock().unwrap().remove(location);
        self.events
            .lock()
            .unwrap()
            .push(StoreEvent::Delete(location.to_string()));
        Ok(())
    }
}

/// Install a subscriber once so failing tests show the pipeline's logs.
/// `RUST_LOG` filters as usual.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_test_writer()
        .try_init();
}

/// Everything a test needs, wired like a real embedder would wire it.
pub struct TestApp {
    pub orchestrator: UploadOrchestrator,
    pub review_service: ReviewService,
    pub aggregation: Arc<AggregationEngine>,
    pub pool: MediaWorkerPool,
    pub store: Arc<GatedMediaStore>,
    pub categories: InMemoryCategories,
    pub brands: InMemoryBrands,
    pub users: InMemoryUsers,
    pub products: InMemoryProducts,
    pub stores: InMemoryStores,
    pub reviews: InMemoryReviews,
    pub index: InMemorySearchIndex,
}

pub fn setup_test_app(store: GatedMediaStore) -> TestApp {
    init_tracing();
    let store = Arc::new(store);
    let categories = InMemoryCategories::default();
    let brands = InMemoryBrands::default();
    let users = InMemoryUsers::default();
    let products = InMemoryProducts::default();
    let stores = InMemoryStores::default();
    let reviews = InMemoryReviews::default();
    let index = InMemorySearchIndex::default();

    let search_sync = Arc::new(SearchIndexSync::new(Arc::new(index.clone())));

    let (queue, lanes) = MediaJobQueue::new(QueueConfig {
        lanes: 2,
        lane_capacity: 32,
    });

    let ctx = Arc::new(WorkerContext {
        media_store: store.clone(),
        categories: Arc::new(categories.clone()),
        brands: Arc::new(brands.clone()),
        users: Arc::new(users.clone()),
        products: Arc::new(products.clone()),
        reviews: Arc::new(reviews.clone()),
        search: search_sync.clone(),
        store_timeout: Duration::from_secs(2),
    });
    let pool = MediaWorkerPool::spawn(lanes, ctx);

    let authorizer = Arc::new(CatalogAuthorizer::new(Arc::new(stores.clone())));
    let orchestrator = UploadOrchestrator::new(
        queue,
        authorizer,
        Arc::new(categories.clone()),
        Arc::new(brands.clone()),
        Arc::new(users.clone()),
        Arc::new(products.clone()),
        Arc::new(reviews.clone()),
        MediaLimits::default(),
    );

    let aggregation = Arc::new(AggregationEngine::new(
        Arc::new(products.clone()),
        Arc::new(stores.clone()),
        Arc::new(reviews.clone()),
        search_sync,
    ));
    let review_service = ReviewService::new(
        Arc::new(reviews.clone()),
        Arc::new(products.clone()),
        aggregation.clone(),
    );

    TestApp {
        orchestrator,
        review_service,
        aggregation,
        pool,
        store,
        categories,
        brands,
        users,
        products,
        stores,
        reviews,
        index,
    }
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

/// A PNG-looking test file.
pub fn png_file(name: &str) -> emporium_core::models::RawFile {
    emporium_core::models::RawFile::new(name, "image/png", Bytes::from_static(b"\x89PNG fake"))
}

/// An MP4-looking test file.
pub fn mp4_file(name: &str) -> emporium_core::models::RawFile {
    emporium_core::models::RawFile::new(name, "video/mp4", Bytes::from_static(b"\x00\x00ftyp"))
}
