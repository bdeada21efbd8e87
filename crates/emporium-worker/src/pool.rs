//! Media worker pool: one consumer task per queue lane.
//!
//! Shutdown: [`MediaWorkerPool::shutdown`] signals every lane and waits for
//! the in-flight job of each to finish; queued jobs behind it are dropped.
//! A job failure never affects other jobs; upload failures leave the owning
//! entity untouched, deletion failures are best-effort and only logged.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use emporium_core::error::AppError;
use emporium_core::models::{
    DeletionJob, MediaJob, MediaKind, MediaTask, SearchDocPatch, UploadedBlob,
};

use crate::context::WorkerContext;
use crate::queue::LaneReceiver;

pub struct MediaWorkerPool {
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl MediaWorkerPool {
    /// Spawn one consumer per lane receiver.
    pub fn spawn(lanes: Vec<LaneReceiver>, ctx: Arc<WorkerContext>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let lane_count = lanes.len();
        let handles = lanes
            .into_iter()
            .enumerate()
            .map(|(lane, rx)| {
                let ctx = ctx.clone();
                let shutdown_rx = shutdown_rx.clone();
                tokio::spawn(run_lane(lane, rx, ctx, shutdown_rx))
            })
            .collect();

        tracing::info!(lanes = lane_count, "Media worker pool started");

        Self {
            shutdown_tx,
            handles,
        }
    }

    /// Signal every lane to stop and wait for in-flight jobs to finish.
    pub async fn shutdown(self) {
        tracing::info!("Initiating media worker pool shutdown");
        let _ = self.shutdown_tx.send(true);
        for handle in self.handles {
            let _ = handle.await;
        }
        tracing::info!("Media worker pool stopped");
    }
}

async fn run_lane(
    lane: usize,
    mut rx: LaneReceiver,
    ctx: Arc<WorkerContext>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    tracing::debug!(lane, "Worker lane started");

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,
            task = rx.recv() => match task {
                Some(task) => {
                    let target_id = task.target_id();
                    let kind = task.kind();
                    if let Err(e) = process_task(&ctx, task).await {
                        // Failure isolation: log and move to the lane's next job.
                        tracing::error!(
                            error = %e,
                            lane,
                            target_id = %target_id,
                            kind = %kind,
                            "Media job failed"
                        );
                    }
                }
                None => break,
            }
        }
    }

    tracing::debug!(lane, "Worker lane stopped");
}

async fn process_task(ctx: &WorkerContext, task: MediaTask) -> Result<()> {
    match task {
        MediaTask::Upload(job) => handle_upload(ctx, job).await,
        MediaTask::Delete(job) => handle_delete(ctx, job).await,
    }
}

/// Store every payload blob, then apply the new locations to the owning
/// entity and (for product slots) the search record. All blobs must land
/// before any entity mutation; a failure mid-way reclaims the partials and
/// leaves the entity exactly as it was.
async fn handle_upload(ctx: &WorkerContext, job: MediaJob) -> Result<()> {
    let kind_tag = job.kind.kind_tag();
    let mut uploaded: Vec<UploadedBlob> = Vec::with_capacity(job.payload.len());

    for bytes in job.payload.blobs() {
        let stored = match timeout(
            ctx.store_timeout,
            ctx.media_store.upload(bytes.clone(), kind_tag),
        )
        .await
        {
            Ok(Ok(blob)) => blob,
            Ok(Err(e)) => {
                reclaim_blobs(ctx, &uploaded).await;
                return Err(AppError::UploadFailed(format!(
                    "blob store rejected {} upload: {}",
                    kind_tag, e
                ))
                .into());
            }
            Err(_) => {
                reclaim_blobs(ctx, &uploaded).await;
                return Err(AppError::UploadFailed(format!(
                    "blob store timed out after {:?} for {}",
                    ctx.store_timeout, kind_tag
                ))
                .into());
            }
        };
        uploaded.push(stored);
    }

    if let Err(e) = apply_upload(ctx, &job, &uploaded).await {
        // The blobs are stored but nothing references them; reclaim so the
        // entity keeps its previous, still-live record.
        reclaim_blobs(ctx, &uploaded).await;
        return Err(e).context("entity update after successful upload");
    }

    tracing::info!(
        target_id = %job.target_id,
        kind = %job.kind,
        blobs = uploaded.len(),
        "Media job completed"
    );

    Ok(())
}

/// Update the owning entity's media record, then notify the search index for
/// product slots. The pair is one logical unit: a failed index write is
/// logged for out-of-band reconciliation, never rolled back or retried here.
async fn apply_upload(
    ctx: &WorkerContext,
    job: &MediaJob,
    uploaded: &[UploadedBlob],
) -> Result<()> {
    let first = uploaded
        .first()
        .ok_or_else(|| AppError::Internal("upload job resolved with no blobs".to_string()))?;
    let locations: Vec<String> = uploaded.iter().map(|blob| blob.location.clone()).collect();
    let id = job.target_id;

    let patch = match job.kind {
        MediaKind::CategoryImage => {
            ctx.categories
                .set_image_url(id, Some(first.location.clone()))
                .await?;
            None
        }
        MediaKind::CategoryIcon => {
            ctx.categories
                .set_icon_url(id, Some(first.location.clone()))
                .await?;
            None
        }
        MediaKind::UserImage => {
            ctx.users
                .set_image_url(id, Some(first.location.clone()))
                .await?;
            None
        }
        MediaKind::BrandLogo => {
            ctx.brands
                .set_logo_url(id, Some(first.location.clone()))
                .await?;
            None
        }
        MediaKind::ProductMainImage => {
            ctx.products
                .set_main_image_url(id, Some(first.location.clone()))
                .await?;
            Some(SearchDocPatch::main_image(Some(first.location.clone())))
        }
        MediaKind::ProductGalleryImages => {
            ctx.products.replace_gallery(id, locations.clone()).await?;
            Some(SearchDocPatch::gallery(locations.clone()))
        }
        MediaKind::ProductVideo => {
            ctx.products
                .set_video_url(id, Some(first.location.clone()))
                .await?;
            Some(SearchDocPatch::video(Some(first.location.clone())))
        }
        MediaKind::ReviewImages => {
            ctx.reviews.set_images(id, locations.clone()).await?;
            None
        }
        MediaKind::ReviewVideo => {
            ctx.reviews
                .set_video_url(id, Some(first.location.clone()))
                .await?;
            None
        }
    };

    if let Some(patch) = patch {
        if let Err(e) = ctx.search.reconcile(id, patch).await {
            tracing::warn!(
                error = %e,
                product_id = %id,
                kind = %job.kind,
                "Product updated but search index sync failed; index left stale"
            );
        }
    }

    Ok(())
}

/// Best-effort cleanup of blobs stored before a failure. Misses are logged
/// and tolerated; an unreferenced blob is preferable to a dangling location.
async fn reclaim_blobs(ctx: &WorkerContext, uploaded: &[UploadedBlob]) {
    for blob in uploaded {
        if let Err(e) = ctx.media_store.delete(&blob.location).await {
            tracing::warn!(
                error = %e,
                location = %blob.location,
                "Failed to reclaim partially uploaded blob"
            );
        }
    }
}

/// Delete every location, best effort. A missing blob is a no-op by the
/// store contract; other failures are logged and the remaining locations are
/// still attempted. Nothing escalates; the original request has long
/// since returned.
async fn handle_delete(ctx: &WorkerContext, job: DeletionJob) -> Result<()> {
    for location in &job.locations {
        match timeout(ctx.store_timeout, ctx.media_store.delete(location)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(
                    error = %e,
                    target_id = %job.target_id,
                    kind = %job.kind,
                    location = %location,
                    "Blob deletion failed"
                );
            }
            Err(_) => {
                tracing::warn!(
                    target_id = %job.target_id,
                    kind = %job.kind,
                    location = %location,
                    timeout = ?ctx.store_timeout,
                    "Blob deletion timed out"
                );
            }
        }
    }

    // A deletion changes a product's authoritative media fields (the
    // orchestrator cleared them when it enqueued this job), so bring the
    // search record back in line with whatever the product row now holds.
    if job.kind.syncs_search_index() {
        if let Some(product) = ctx.products.get(job.target_id).await? {
            let patch = SearchDocPatch {
                main_image_url: Some(product.main_image_url.clone()),
                gallery_urls: Some(product.gallery_urls()),
                video_url: Some(product.video_url.clone()),
                rating: None,
            };
            if let Err(e) = ctx.search.reconcile(job.target_id, patch).await {
                tracing::warn!(
                    error = %e,
                    product_id = %job.target_id,
                    "Blob reclamation done but search index sync failed; index left stale"
                );
            }
        }
    }

    tracing::debug!(
        target_id = %job.target_id,
        kind = %job.kind,
        locations = job.locations.len(),
        "Deletion job completed"
    );

    Ok(())
}
