//! Queue message types.
//!
//! The queue carries exactly two message variants, unified under [`MediaTask`]:
//! uploads and deletions. Both are ephemeral: created by the orchestrator,
//! consumed exactly once by the worker pool, then discarded. Delivery is
//! at-least-once from the consumer's point of view, so handlers must tolerate
//! redelivery (re-deleting a missing blob is a no-op).

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::media::MediaKind;

/// Upload payload: one blob for single slots, several for galleries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaPayload {
    Single(Bytes),
    Many(Vec<Bytes>),
}

impl MediaPayload {
    pub fn blobs(&self) -> &[Bytes] {
        match self {
            MediaPayload::Single(bytes) => std::slice::from_ref(bytes),
            MediaPayload::Many(list) => list,
        }
    }

    pub fn len(&self) -> usize {
        self.blobs().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs().is_empty()
    }
}

/// An upload to perform against the blob store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaJob {
    pub target_id: Uuid,
    pub kind: MediaKind,
    pub payload: MediaPayload,
    pub created_at: DateTime<Utc>,
}

impl MediaJob {
    pub fn single(target_id: Uuid, kind: MediaKind, bytes: Bytes) -> Self {
        Self {
            target_id,
            kind,
            payload: MediaPayload::Single(bytes),
            created_at: Utc::now(),
        }
    }

    pub fn many(target_id: Uuid, kind: MediaKind, blobs: Vec<Bytes>) -> Self {
        Self {
            target_id,
            kind,
            payload: MediaPayload::Many(blobs),
            created_at: Utc::now(),
        }
    }
}

/// Blob reclamation for locations no longer referenced by any entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionJob {
    pub target_id: Uuid,
    pub kind: MediaKind,
    pub locations: Vec<String>,
}

impl DeletionJob {
    pub fn new(target_id: Uuid, kind: MediaKind, locations: Vec<String>) -> Self {
        Self {
            target_id,
            kind,
            locations,
        }
    }
}

/// The queue's tagged union of message variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum MediaTask {
    Upload(MediaJob),
    Delete(DeletionJob),
}

impl MediaTask {
    /// The per-key ordering key: jobs sharing a target are delivered FIFO.
    pub fn target_id(&self) -> Uuid {
        match self {
            MediaTask::Upload(job) => job.target_id,
            MediaTask::Delete(job) => job.target_id,
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            MediaTask::Upload(job) => job.kind,
            MediaTask::Delete(job) => job.kind,
        }
    }
}
