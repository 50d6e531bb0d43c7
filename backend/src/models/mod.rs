//! Domain models for the scheduler

pub mod event;

// Re-exports
pub use event::{Action, Event, EventFactory, EventRecord};
