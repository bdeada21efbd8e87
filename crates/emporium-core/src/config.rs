//! Configuration module
//!
//! This module provides configuration structures for the media pipeline:
//! queue/worker sizing, blob-store timeouts, per-kind file validation limits,
//! and local storage settings.

use std::env;
use std::time::Duration;

// Common defaults
const WORKER_LANES: usize = 4;
const LANE_CAPACITY: usize = 64;
const STORE_TIMEOUT_SECS: u64 = 30;
const MAX_IMAGE_SIZE_MB: usize = 10;
const MAX_VIDEO_SIZE_MB: usize = 500;

/// File validation limits, grouped per media class.
#[derive(Clone, Debug)]
pub struct MediaLimits {
    pub max_image_size_bytes: usize,
    pub image_allowed_content_types: Vec<String>,
    pub max_video_size_bytes: usize,
    pub video_allowed_content_types: Vec<String>,
}

impl Default for MediaLimits {
    fn default() -> Self {
        Self {
            max_image_size_bytes: MAX_IMAGE_SIZE_MB * 1024 * 1024,
            image_allowed_content_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/gif".to_string(),
                "image/webp".to_string(),
            ],
            max_video_size_bytes: MAX_VIDEO_SIZE_MB * 1024 * 1024,
            video_allowed_content_types: vec![
                "video/mp4".to_string(),
                "video/webm".to_string(),
                "video/quicktime".to_string(),
            ],
        }
    }
}

/// Local blob-store settings for the bundled filesystem backend.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub local_storage_path: String,
    pub local_storage_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            local_storage_path: "./media".to_string(),
            local_storage_base_url: "http://localhost:4000/media".to_string(),
        }
    }
}

/// Pipeline configuration: queue sizing, worker pool, blob-store timeout.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Number of queue lanes, which is also the number of concurrent workers.
    pub worker_lanes: usize,
    /// Bounded capacity of each lane; publishers block only on a full lane.
    pub lane_capacity: usize,
    /// A blob-store call not returning within this window counts as failed.
    pub store_timeout: Duration,
    pub limits: MediaLimits,
    pub storage: StorageConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_lanes: WORKER_LANES,
            lane_capacity: LANE_CAPACITY,
            store_timeout: Duration::from_secs(STORE_TIMEOUT_SECS),
            limits: MediaLimits::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Build the configuration from environment variables, falling back to the
    /// defaults above for anything unset or unparsable.
    pub fn from_env() -> Self {
        let worker_lanes = env::var("MEDIA_WORKER_LANES")
            .unwrap_or_else(|_| WORKER_LANES.to_string())
            .parse::<usize>()
            .unwrap_or(WORKER_LANES)
            .max(1);

        let lane_capacity = env::var("MEDIA_LANE_CAPACITY")
            .unwrap_or_else(|_| LANE_CAPACITY.to_string())
            .parse::<usize>()
            .unwrap_or(LANE_CAPACITY)
            .max(1);

        let store_timeout_secs = env::var("MEDIA_STORE_TIMEOUT_SECS")
            .unwrap_or_else(|_| STORE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .unwrap_or(STORE_TIMEOUT_SECS);

        let max_image_size_mb = env::var("MAX_IMAGE_SIZE_MB")
            .unwrap_or_else(|_| MAX_IMAGE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_IMAGE_SIZE_MB);

        let max_video_size_mb = env::var("MAX_VIDEO_SIZE_MB")
            .unwrap_or_else(|_| MAX_VIDEO_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_VIDEO_SIZE_MB);

        let image_allowed_content_types = env::var("IMAGE_ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| "image/jpeg,image/png,image/gif,image/webp".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        let video_allowed_content_types = env::var("VIDEO_ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| "video/mp4,video/webm,video/quicktime".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        let storage = StorageConfig {
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| StorageConfig::default().local_storage_path),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|_| StorageConfig::default().local_storage_base_url),
        };

        Self {
            worker_lanes,
            lane_capacity,
            store_timeout: Duration::from_secs(store_timeout_secs),
            limits: MediaLimits {
                max_image_size_bytes: max_image_size_mb * 1024 * 1024,
                image_allowed_content_types,
                max_video_size_bytes: max_video_size_mb * 1024 * 1024,
                video_allowed_content_types,
            },
            storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = PipelineConfig::default();
        assert_eq!(config.worker_lanes, 4);
        assert_eq!(config.store_timeout, Duration::from_secs(30));
        assert!(config
            .limits
            .image_allowed_content_types
            .contains(&"image/webp".to_string()));
    }
}
