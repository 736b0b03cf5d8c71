//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Deferred commit: Flushes deferred items at configured intervals

mod commit;

pub use commit::spawn_commit_task;
