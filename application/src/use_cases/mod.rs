//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod execute_task;
pub mod ingest_webhook;
pub mod run_consensus;
pub mod scheduler;
