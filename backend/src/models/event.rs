//! Event records
//!
//! An event is a timestamp plus the action to run when the clock reaches it.
//! Records live in a [`Box`] so the scheduler can hand the same allocation
//! back and forth between its queue and its pool.
//!
//! # Ownership
//!
//! A record is owned by exactly one of: the pending queue, the loop iteration
//! currently executing it, or the pool's idle stack. It moves between them by
//! value and is never shared.

use crate::core::time::SimTime;
use crate::pool::ItemFactory;
use crate::scheduler::Scheduler;
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ops::ControlFlow;

/// Event action
///
/// Runs with full access to the scheduler, so it can read the clock, touch
/// the caller state and schedule follow-up events. Returning
/// `ControlFlow::Break(())` ends the run.
pub type Action<S> = fn(&mut Scheduler<S>) -> ControlFlow<()>;

/// Heap-allocated event record as stored in the queue and the pool
pub type EventRecord<S> = Box<Event<S>>;

/// A scheduled event
pub struct Event<S> {
    /// Simulation time at which the event fires
    pub time: SimTime,

    /// Scheduling sequence number (monotonic per scheduler)
    pub seq: u64,

    /// What to run
    pub action: Action<S>,
}

impl<S> Event<S> {
    pub fn new(time: SimTime, seq: u64, action: Action<S>) -> Self {
        Self { time, seq, action }
    }

    /// A blank record as produced for the pool
    pub fn idle() -> Self {
        Self::new(0, 0, no_op::<S>)
    }

    /// Overwrite a recycled record in place
    pub fn set(&mut self, time: SimTime, seq: u64, action: Action<S>) {
        self.time = time;
        self.seq = seq;
        self.action = action;
    }
}

impl<S> fmt::Debug for Event<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("time", &self.time)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

fn no_op<S>(_: &mut Scheduler<S>) -> ControlFlow<()> {
    ControlFlow::Continue(())
}

/// Order events by timestamp alone
pub fn compare_by_time<S>(a: &Event<S>, b: &Event<S>) -> Ordering {
    a.time.cmp(&b.time)
}

/// Order events by timestamp, then by scheduling order
///
/// Equal timestamps fire first-scheduled-first.
pub fn compare_by_time_then_seq<S>(a: &Event<S>, b: &Event<S>) -> Ordering {
    a.time.cmp(&b.time).then(a.seq.cmp(&b.seq))
}

/// Pool factory for event records
pub struct EventFactory<S> {
    _marker: PhantomData<fn() -> S>,
}

impl<S> EventFactory<S> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<S> Default for EventFactory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ItemFactory<EventRecord<S>> for EventFactory<S> {
    fn create(&mut self) -> EventRecord<S> {
        Box::new(Event::idle())
    }

    fn destroy(&mut self, record: EventRecord<S>) {
        drop(record);
    }
}
