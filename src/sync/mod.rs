//! Feed synchronization engine.
//!
//! The heartbeat loop ([`SyncEngine`]) and the per-subscription pipeline
//! ([`poll_subscription`]) that fetches, diffs, notifies and commits.

pub mod engine;
pub mod pipeline;

pub use engine::{EngineHandle, SyncEngine};
pub use pipeline::{compose_body, poll_subscription, PollOutcome};
