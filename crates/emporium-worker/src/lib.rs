//! Emporium worker infrastructure: the media job queue and the worker pool
//! consuming it.
//!
//! The queue is an owned, explicitly constructed structure; there is no
//! ambient executor or broker client. Jobs sharing a target id share a lane
//! and are delivered FIFO; the pool runs one consumer per lane, so every media
//! slot is effectively single-writer.

pub mod context;
pub mod pool;
pub mod queue;

pub use context::{SearchSync, WorkerContext};
pub use pool::MediaWorkerPool;
pub use queue::{lane_for_target, LaneReceiver, MediaJobQueue, QueueConfig};
