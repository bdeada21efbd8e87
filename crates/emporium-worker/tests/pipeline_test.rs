mod helpers;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use uuid::Uuid;

use emporium_core::models::{DeletionJob, MediaJob, MediaKind, Product, User};
use emporium_db::{
    InMemoryBrands, InMemoryCategories, InMemoryProducts, InMemoryReviews, InMemoryUsers,
    ProductRepository, UserRepository,
};
use emporium_storage::MediaStore;
use emporium_worker::{MediaJobQueue, MediaWorkerPool, QueueConfig, WorkerContext};

use helpers::{shared, wait_until, RecordingSearchSync, StoreEvent, StubMediaStore};

struct TestBed {
    queue: MediaJobQueue,
    pool: MediaWorkerPool,
    store: Arc<StubMediaStore>,
    users: InMemoryUsers,
    products: InMemoryProducts,
    search: Arc<RecordingSearchSync>,
}

fn test_bed(store: StubMediaStore, store_timeout: Duration) -> TestBed {
    helpers::init_tracing();
    let store = shared(store);
    let users = InMemoryUsers::default();
    let products = InMemoryProducts::default();
    let search = Arc::new(RecordingSearchSync::default());

    let (queue, lanes) = MediaJobQueue::new(QueueConfig {
        lanes: 2,
        lane_capacity: 32,
    });

    let ctx = Arc::new(WorkerContext {
        media_store: store.clone(),
        categories: Arc::new(InMemoryCategories::default()),
        brands: Arc::new(InMemoryBrands::default()),
        users: Arc::new(users.clone()),
        products: Arc::new(products.clone()),
        reviews: Arc::new(InMemoryReviews::default()),
        search: search.clone(),
        store_timeout,
    });

    let pool = MediaWorkerPool::spawn(lanes, ctx);

    TestBed {
        queue,
        pool,
        store,
        users,
        products,
        search,
    }
}

#[tokio::test]
async fn upload_updates_entity_and_notifies_search_index() {
    let bed = test_bed(StubMediaStore::new(), Duration::from_secs(1));

    let product = Product::new(Uuid::new_v4(), "keyboard");
    let product_id = product.id;
    bed.products.insert(product).await;

    bed.queue
        .publish_upload(MediaJob::single(
            product_id,
            MediaKind::ProductMainImage,
            Bytes::from_static(b"image bytes"),
        ))
        .await
        .unwrap();

    let products = bed.products.clone();
    wait_until(|| {
        let products = products.clone();
        async move {
            products
                .get(product_id)
                .await
                .unwrap()
                .unwrap()
                .main_image_url
                .is_some()
        }
    })
    .await;

    let stored = bed.store.uploaded_locations();
    assert_eq!(stored.len(), 1);
    let product = bed.products.get(product_id).await.unwrap().unwrap();
    assert_eq!(product.main_image_url.as_deref(), Some(stored[0].as_str()));

    let patches = bed.search.patches();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].0, product_id);
    assert_eq!(
        patches[0].1.main_image_url,
        Some(Some(stored[0].clone()))
    );

    bed.pool.shutdown().await;
}

#[tokio::test]
async fn same_target_delete_is_processed_before_subsequent_upload() {
    let bed = test_bed(StubMediaStore::new(), Duration::from_secs(1));

    let user = User::new("ada");
    let user_id = user.id;
    bed.users.insert(user).await;

    let old_location = "http://stub/user_image/previous".to_string();
    bed.queue
        .publish_delete(DeletionJob::new(
            user_id,
            MediaKind::UserImage,
            vec![old_location.clone()],
        ))
        .await
        .unwrap();
    bed.queue
        .publish_upload(MediaJob::single(
            user_id,
            MediaKind::UserImage,
            Bytes::from_static(b"fresh"),
        ))
        .await
        .unwrap();

    let users = bed.users.clone();
    wait_until(|| {
        let users = users.clone();
        async move { users.get(user_id).await.unwrap().unwrap().image_url.is_some() }
    })
    .await;

    let events = bed.store.events();
    let delete_pos = events
        .iter()
        .position(|event| matches!(event, StoreEvent::Delete { location, .. } if *location == old_location))
        .expect("old location was deleted");
    let upload_pos = events
        .iter()
        .position(|event| matches!(event, StoreEvent::Upload(_)))
        .expect("new blob was uploaded");
    assert!(
        delete_pos < upload_pos,
        "reclamation of the old blob must precede the new upload: {:?}",
        events
    );

    bed.pool.shutdown().await;
}

#[tokio::test]
async fn duplicate_deletion_delivery_is_a_no_op() {
    let bed = test_bed(StubMediaStore::new(), Duration::from_secs(1));

    let target_id = Uuid::new_v4();
    let location = {
        // Seed one blob so the first delivery has something to reclaim.
        let blob = bed
            .store
            .upload(Bytes::from_static(b"blob"), "brand_logo")
            .await
            .unwrap();
        blob.location
    };

    let job = DeletionJob::new(target_id, MediaKind::BrandLogo, vec![location.clone()]);
    bed.queue.publish_delete(job.clone()).await.unwrap();
    bed.queue.publish_delete(job).await.unwrap();

    let store = bed.store.clone();
    let expected_location = location.clone();
    wait_until(|| {
        let store = store.clone();
        let expected_location = expected_location.clone();
        async move {
            store
                .events()
                .iter()
                .filter(|event| {
                    matches!(event, StoreEvent::Delete { location, .. } if *location == expected_location)
                })
                .count()
                == 2
        }
    })
    .await;

    assert!(!bed.store.contains(&location));

    // The pool is still healthy after the redelivery: a follow-up job
    // completes normally.
    let user = User::new("grace");
    let user_id = user.id;
    bed.users.insert(user).await;
    bed.queue
        .publish_upload(MediaJob::single(
            user_id,
            MediaKind::UserImage,
            Bytes::from_static(b"img"),
        ))
        .await
        .unwrap();

    let users = bed.users.clone();
    wait_until(|| {
        let users = users.clone();
        async move { users.get(user_id).await.unwrap().unwrap().image_url.is_some() }
    })
    .await;

    bed.pool.shutdown().await;
}

#[tokio::test]
async fn misbehaving_store_on_redelivery_does_not_poison_the_lane() {
    let bed = test_bed(
        StubMediaStore::new().erroring_on_missing_delete(),
        Duration::from_secs(1),
    );

    let target_id = Uuid::new_v4();
    let job = DeletionJob::new(
        target_id,
        MediaKind::CategoryImage,
        vec!["http://stub/category_image/never-stored".to_string()],
    );
    bed.queue.publish_delete(job.clone()).await.unwrap();
    bed.queue.publish_delete(job).await.unwrap();

    // Both deliveries fail inside the store; the lane keeps consuming.
    let user = User::new("lin");
    let user_id = user.id;
    bed.users.insert(user).await;
    bed.queue
        .publish_upload(MediaJob::single(
            user_id,
            MediaKind::UserImage,
            Bytes::from_static(b"img"),
        ))
        .await
        .unwrap();

    let users = bed.users.clone();
    wait_until(|| {
        let users = users.clone();
        async move { users.get(user_id).await.unwrap().unwrap().image_url.is_some() }
    })
    .await;

    bed.pool.shutdown().await;
}

#[tokio::test]
async fn failed_upload_leaves_entity_untouched() {
    let bed = test_bed(StubMediaStore::new().failing_uploads_from(0), Duration::from_secs(1));

    let mut product = Product::new(Uuid::new_v4(), "lamp");
    product.main_image_url = Some("http://stub/product_main_image/previous".to_string());
    let product_id = product.id;
    bed.products.insert(product).await;

    bed.queue
        .publish_upload(MediaJob::single(
            product_id,
            MediaKind::ProductMainImage,
            Bytes::from_static(b"new image"),
        ))
        .await
        .unwrap();

    let store = bed.store.clone();
    wait_until(|| {
        let store = store.clone();
        async move { store.upload_count() == 1 }
    })
    .await;
    // Give the worker a beat to (wrongly) mutate anything after the failure.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let product = bed.products.get(product_id).await.unwrap().unwrap();
    assert_eq!(
        product.main_image_url.as_deref(),
        Some("http://stub/product_main_image/previous")
    );
    assert!(bed.search.patches().is_empty());

    bed.pool.shutdown().await;
}

#[tokio::test]
async fn partial_gallery_failure_reclaims_stored_blobs() {
    // First upload succeeds, second fails: nothing may reach the entity and
    // the stored partial must be reclaimed.
    let bed = test_bed(StubMediaStore::new().failing_uploads_from(1), Duration::from_secs(1));

    let product = Product::new(Uuid::new_v4(), "chair");
    let product_id = product.id;
    bed.products.insert(product).await;

    bed.queue
        .publish_upload(MediaJob::many(
            product_id,
            MediaKind::ProductGalleryImages,
            vec![Bytes::from_static(b"one"), Bytes::from_static(b"two")],
        ))
        .await
        .unwrap();

    let store = bed.store.clone();
    wait_until(|| {
        let store = store.clone();
        async move {
            store.events().iter().any(|event| {
                matches!(event, StoreEvent::Delete { existed: true, .. })
            })
        }
    })
    .await;

    let product = bed.products.get(product_id).await.unwrap().unwrap();
    assert!(product.gallery.is_empty());
    let uploaded = bed.store.uploaded_locations();
    assert_eq!(uploaded.len(), 1);
    assert!(!bed.store.contains(&uploaded[0]));

    bed.pool.shutdown().await;
}

#[tokio::test]
async fn store_timeout_counts_as_upload_failure() {
    let bed = test_bed(
        StubMediaStore::new().with_latency(Duration::from_millis(250)),
        Duration::from_millis(50),
    );

    let product = Product::new(Uuid::new_v4(), "monitor");
    let product_id = product.id;
    bed.products.insert(product).await;

    bed.queue
        .publish_upload(MediaJob::single(
            product_id,
            MediaKind::ProductVideo,
            Bytes::from_static(b"video bytes"),
        ))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(400)).await;

    let product = bed.products.get(product_id).await.unwrap().unwrap();
    assert!(product.video_url.is_none());
    assert!(bed.search.patches().is_empty());

    bed.pool.shutdown().await;
}

#[tokio::test]
async fn jobs_on_different_targets_do_not_block_each_other() {
    // A slow job on one target must not stall a fast job on another: the two
    // ids below hash to different lanes, and each lane is independent.
    let bed = test_bed(
        StubMediaStore::new().with_latency(Duration::from_millis(150)),
        Duration::from_secs(1),
    );

    let mut ids: Vec<Uuid> = Vec::new();
    // Find two ids on different lanes (two lanes configured).
    while ids.len() < 2 {
        let candidate = Uuid::new_v4();
        if ids.is_empty()
            || emporium_worker::lane_for_target(candidate, 2)
                != emporium_worker::lane_for_target(ids[0], 2)
        {
            ids.push(candidate);
        }
    }

    for id in &ids {
        let user = User {
            id: *id,
            username: format!("user-{}", id),
            image_url: None,
        };
        bed.users.insert(user).await;
        bed.queue
            .publish_upload(MediaJob::single(
                *id,
                MediaKind::UserImage,
                Bytes::from_static(b"img"),
            ))
            .await
            .unwrap();
    }

    let users = bed.users.clone();
    let (a, b) = (ids[0], ids[1]);
    wait_until(|| {
        let users = users.clone();
        async move {
            users.get(a).await.unwrap().unwrap().image_url.is_some()
                && users.get(b).await.unwrap().unwrap().image_url.is_some()
        }
    })
    .await;

    bed.pool.shutdown().await;
}
