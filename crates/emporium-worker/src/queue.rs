//! Media job queue: typed channel with per-key ordered lanes.
//!
//! Delivery contract: FIFO per target id, at-least-once from the consumer's
//! point of view; handlers must tolerate redelivery. Cross-key ordering is
//! unspecified. Publishing blocks only on the queue's own backpressure (a full
//! lane), never on worker availability.

use tokio::sync::mpsc;
use uuid::Uuid;

use emporium_core::error::AppError;
use emporium_core::models::{DeletionJob, MediaJob, MediaTask};

/// Receiving end of one lane, handed to the worker pool.
pub type LaneReceiver = mpsc::Receiver<MediaTask>;

#[derive(Clone)]
pub struct QueueConfig {
    /// Number of lanes; also the worker pool's concurrency bound.
    pub lanes: usize,
    /// Bounded capacity per lane.
    pub lane_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            lanes: 4,
            lane_capacity: 64,
        }
    }
}

/// FNV-1a over the target id bytes; stable across processes so a given target
/// always lands on the same lane.
#[inline]
pub fn lane_for_target(target_id: Uuid, lanes: usize) -> usize {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = FNV_OFFSET;
    for byte in target_id.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    (hash % lanes as u64) as usize
}

/// Producer side of the media job queue.
///
/// Cloneable; the orchestrator holds one handle, the worker pool holds the
/// lane receivers. Dropping every handle closes the lanes and lets the pool
/// drain and stop.
#[derive(Clone)]
pub struct MediaJobQueue {
    senders: Vec<mpsc::Sender<MediaTask>>,
}

impl MediaJobQueue {
    /// Create the queue and the lane receivers for the worker pool.
    pub fn new(config: QueueConfig) -> (Self, Vec<LaneReceiver>) {
        let lanes = config.lanes.max(1);
        let capacity = config.lane_capacity.max(1);

        let mut senders = Vec::with_capacity(lanes);
        let mut receivers = Vec::with_capacity(lanes);
        for _ in 0..lanes {
            let (tx, rx) = mpsc::channel(capacity);
            senders.push(tx);
            receivers.push(rx);
        }

        tracing::info!(lanes, lane_capacity = capacity, "Media job queue created");

        (Self { senders }, receivers)
    }

    /// Publish an upload job on the upload channel.
    #[tracing::instrument(skip(self, job), fields(target_id = %job.target_id, kind = %job.kind))]
    pub async fn publish_upload(&self, job: MediaJob) -> Result<(), AppError> {
        self.publish(MediaTask::Upload(job)).await
    }

    /// Publish a deletion job on the deletion channel.
    #[tracing::instrument(skip(self, job), fields(target_id = %job.target_id, kind = %job.kind))]
    pub async fn publish_delete(&self, job: DeletionJob) -> Result<(), AppError> {
        self.publish(MediaTask::Delete(job)).await
    }

    async fn publish(&self, task: MediaTask) -> Result<(), AppError> {
        let lane = lane_for_target(task.target_id(), self.senders.len());
        self.senders[lane].send(task).await.map_err(|_| {
            AppError::QueueClosed("media job queue lanes are closed".to_string())
        })?;
        tracing::debug!(lane, "Job published to queue");
        Ok(())
    }
}
