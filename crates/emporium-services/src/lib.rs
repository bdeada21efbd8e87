//! Emporium services: the request-facing orchestration layer of the media
//! pipeline and the derived-state synchronization that follows media changes
//! and review writes.
//!
//! Everything here is explicitly constructed and injected (repositories,
//! queue handle, authorizer), never reached through ambient globals.

pub mod access;
pub mod aggregation;
pub mod media;
pub mod reviews;
pub mod search_sync;

pub use access::{Actor, Authorizer, CatalogAuthorizer, Role};
pub use aggregation::AggregationEngine;
pub use media::UploadOrchestrator;
pub use reviews::ReviewService;
pub use search_sync::SearchIndexSync;
