//! Scheduler - the discrete-event driving loop
//!
//! See `engine.rs` for the loop itself and `report.rs` for what a run
//! reports back.

pub mod engine;
pub mod report;

// Re-export main types for convenience
pub use engine::{QueueKind, Scheduler, SchedulerConfig, SchedulerError, TieBreak};
pub use report::{compute_config_hash, RunReport, Termination};
