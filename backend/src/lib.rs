//! Event Scheduler Core - Rust Engine
//!
//! A minimal discrete-event simulation scheduler.
//!
//! # Architecture
//!
//! - **heap**: Binary min-heap ordering pending items by a comparator
//! - **calendar**: Calendar queue of heap bins for time-keyed items
//! - **pool**: Bounded LIFO free-list recycling items between uses
//! - **core**: Simulation clock
//! - **models**: Event records and their ordering
//! - **scheduler**: The driving loop and its run report
//! - **workload**: The self-rescheduling throughput workload
//!
//! # Critical Invariants
//!
//! 1. The heap root is always a minimum under its comparator
//! 2. The pool never retains more than its capacity
//! 3. The clock never moves backwards
//! 4. Every event record has exactly one owner: queue, running loop
//!    iteration, or pool
//!
//! Everything is single-threaded. Contract violations (out-of-range
//! deletes, freeing a non-empty heap, scheduling into the past) panic.

// Module declarations
pub mod calendar;
pub mod core;
pub mod heap;
pub mod models;
pub mod pool;
pub mod scheduler;
pub mod workload;

// Re-exports for convenience
pub use crate::calendar::CalendarQueue;
pub use crate::core::time::{SimClock, SimTime};
pub use heap::{Heap, HEAP_INITIAL_CAPACITY};
pub use models::event::{Action, Event, EventRecord};
pub use pool::{FnFactory, ItemFactory, Pool, PoolStats};
pub use scheduler::{
    compute_config_hash, QueueKind, RunReport, Scheduler, SchedulerConfig, SchedulerError,
    Termination, TieBreak,
};
