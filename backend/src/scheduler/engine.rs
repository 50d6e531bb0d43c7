//! Scheduler Engine
//!
//! Owns the simulation clock, the pending-event queue and (optionally) the
//! event-record pool, and runs the event loop:
//!
//! ```text
//! schedule terminal event at end_time
//! schedule initial event at now
//! while the queue is not empty:
//!     pop the earliest event
//!     advance the clock to its timestamp
//!     run its action (which may schedule more events)
//!     recycle or free the record
//!     stop if the action returned Break
//! ```
//!
//! # Example
//!
//! ```rust
//! use event_scheduler_core::{Scheduler, SchedulerConfig, Termination};
//! use std::ops::ControlFlow;
//!
//! fn count(s: &mut Scheduler<u32>) -> ControlFlow<()> {
//!     *s.state_mut() += 1;
//!     s.schedule_in(10, count);
//!     ControlFlow::Continue(())
//! }
//!
//! fn stop(_: &mut Scheduler<u32>) -> ControlFlow<()> {
//!     ControlFlow::Break(())
//! }
//!
//! let config = SchedulerConfig { end_time: 100, ..Default::default() };
//! let mut scheduler = Scheduler::new(config, 0u32).unwrap();
//! let report = scheduler.run(count, stop);
//!
//! assert_eq!(report.termination, Termination::Stopped { at: 100 });
//! assert_eq!(scheduler.into_state(), 10); // fired at 0, 10, ..., 90
//! ```

use crate::calendar::CalendarQueue;
use crate::core::time::{SimClock, SimTime};
use crate::heap::Heap;
use crate::models::event::{
    compare_by_time, compare_by_time_then_seq, Action, Event, EventFactory, EventRecord,
};
use crate::pool::{Pool, PoolStats};
use crate::scheduler::report::{compute_config_hash, RunReport, Termination};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::ControlFlow;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

// ============================================================================
// Configuration Types
// ============================================================================

/// How events with equal timestamps are ordered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// First scheduled, first fired
    #[default]
    Insertion,

    /// Timestamp only; equal events fire in unspecified order
    Unordered,
}

/// Data structure holding pending events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueueKind {
    /// Single binary heap
    #[default]
    Heap,

    /// Calendar queue of `bins` heaps covering a `width`-tick year
    Calendar { width: SimTime, bins: usize },
}

/// Scheduler configuration
///
/// Every field has a default, so a JSON config only needs the fields it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Timestamp of the terminal sentinel event
    pub end_time: SimTime,

    /// Recycle event records through a pool instead of allocating each one
    pub pooling: bool,

    /// Maximum number of idle records the pool retains
    pub pool_capacity: usize,

    /// Initial capacity of the pending-event heap (heap backend only)
    pub initial_heap_capacity: usize,

    /// Ordering of events with equal timestamps
    pub tie_break: TieBreak,

    /// Pending-event queue backend
    pub queue: QueueKind,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            end_time: 1000,
            pooling: false,
            pool_capacity: 10,
            initial_heap_capacity: crate::heap::HEAP_INITIAL_CAPACITY,
            tie_break: TieBreak::default(),
            queue: QueueKind::default(),
        }
    }
}

impl SchedulerConfig {
    /// Parse a configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self, SchedulerError> {
        serde_json::from_str(json)
            .map_err(|e| SchedulerError::Serialization(format!("Config parse failed: {}", e)))
    }

    /// Check the configuration for values the scheduler cannot run with
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.initial_heap_capacity == 0 {
            return Err(SchedulerError::InvalidConfig(
                "initial_heap_capacity must be positive".to_string(),
            ));
        }
        if self.pooling && self.pool_capacity == 0 {
            return Err(SchedulerError::InvalidConfig(
                "pool_capacity must be positive when pooling is enabled".to_string(),
            ));
        }
        if let QueueKind::Calendar { width, bins } = self.queue {
            if bins == 0 || width <= bins as SimTime {
                return Err(SchedulerError::InvalidConfig(format!(
                    "calendar width {} must exceed a positive bin count {}",
                    width, bins
                )));
            }
        }
        Ok(())
    }
}

/// Scheduler error types
///
/// These cover the configuration surface only. Misuse of the scheduler
/// itself (scheduling into the past, freeing with events pending) panics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulerError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

// ============================================================================
// Pending Queue
// ============================================================================

type EventComparator<S> = fn(&EventRecord<S>, &EventRecord<S>) -> Ordering;
type EventKey<S> = fn(&EventRecord<S>) -> SimTime;

/// Pending events, in whichever structure the config asked for
enum EventQueue<S> {
    Heap(Heap<EventRecord<S>, EventComparator<S>>),
    Calendar(CalendarQueue<EventRecord<S>, EventComparator<S>, EventKey<S>>),
}

impl<S> EventQueue<S> {
    fn new(config: &SchedulerConfig, comparator: EventComparator<S>) -> Self {
        match config.queue {
            QueueKind::Heap => {
                EventQueue::Heap(Heap::with_capacity(config.initial_heap_capacity, comparator))
            }
            QueueKind::Calendar { width, bins } => {
                let key: EventKey<S> = |record| record.time;
                EventQueue::Calendar(CalendarQueue::new(width, bins, key, comparator))
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            EventQueue::Heap(heap) => heap.len(),
            EventQueue::Calendar(calendar) => calendar.len(),
        }
    }

    fn insert(&mut self, record: EventRecord<S>) {
        match self {
            EventQueue::Heap(heap) => {
                heap.insert(record);
            }
            EventQueue::Calendar(calendar) => calendar.insert(record),
        }
    }

    fn peek_first(&self) -> Option<&EventRecord<S>> {
        match self {
            EventQueue::Heap(heap) => heap.peek_first(),
            EventQueue::Calendar(calendar) => calendar.peek_first(),
        }
    }

    fn pop_first(&mut self) -> Option<EventRecord<S>> {
        match self {
            EventQueue::Heap(heap) => heap.pop_first(),
            EventQueue::Calendar(calendar) => calendar.pop_first(),
        }
    }

    /// Hand every pending record to `release`; returns how many there were
    fn drain_into(&mut self, mut release: impl FnMut(EventRecord<S>)) -> usize {
        let mut drained = 0;
        let mut take = |record: EventRecord<S>| {
            release(record);
            drained += 1;
        };
        match self {
            EventQueue::Heap(heap) => heap.drain().for_each(&mut take),
            EventQueue::Calendar(calendar) => calendar.drain().for_each(&mut take),
        }
        drained
    }

    fn free(self) {
        match self {
            EventQueue::Heap(heap) => heap.free(),
            EventQueue::Calendar(calendar) => calendar.free(),
        }
    }
}

// ============================================================================
// Record Storage
// ============================================================================

/// Where event records come from and go back to
enum EventStore<S> {
    /// Allocate per event, free after execution
    Fresh,

    /// Recycle through a bounded pool
    Pooled(Pool<EventRecord<S>, EventFactory<S>>),
}

impl<S> EventStore<S> {
    fn acquire(&mut self, time: SimTime, seq: u64, action: Action<S>) -> EventRecord<S> {
        match self {
            EventStore::Fresh => Box::new(Event::new(time, seq, action)),
            EventStore::Pooled(pool) => {
                let mut record = pool.get();
                record.set(time, seq, action);
                record
            }
        }
    }

    fn release(&mut self, record: EventRecord<S>) {
        match self {
            EventStore::Fresh => drop(record),
            EventStore::Pooled(pool) => pool.put(record),
        }
    }

    fn stats(&self) -> Option<PoolStats> {
        match self {
            EventStore::Fresh => None,
            EventStore::Pooled(pool) => Some(pool.stats()),
        }
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Single-threaded discrete-event scheduler
///
/// `S` is caller state made available to every event action through
/// [`Scheduler::state`] and [`Scheduler::state_mut`].
pub struct Scheduler<S> {
    config: SchedulerConfig,
    config_hash: String,
    clock: SimClock,
    queue: EventQueue<S>,
    store: EventStore<S>,
    next_seq: u64,
    events_processed: u64,
    state: S,
}

impl<S> Scheduler<S> {
    /// Create a scheduler from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Scheduler)` - clock at zero, no events pending
    /// * `Err(SchedulerError)` - configuration validation failed
    pub fn new(config: SchedulerConfig, state: S) -> Result<Self, SchedulerError> {
        config.validate()?;
        let config_hash = compute_config_hash(&config)?;

        let comparator: EventComparator<S> = match config.tie_break {
            TieBreak::Insertion => |a, b| compare_by_time_then_seq::<S>(a, b),
            TieBreak::Unordered => |a, b| compare_by_time::<S>(a, b),
        };
        let queue = EventQueue::new(&config, comparator);

        let store = if config.pooling {
            EventStore::Pooled(Pool::new(config.pool_capacity, EventFactory::new()))
        } else {
            EventStore::Fresh
        };

        Ok(Self {
            config,
            config_hash,
            clock: SimClock::new(),
            queue,
            store,
            next_seq: 0,
            events_processed: 0,
            state,
        })
    }

    /// Current simulation time
    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// Number of events waiting in the queue
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Timestamp of the next event to fire, if any
    pub fn next_time(&self) -> Option<SimTime> {
        self.queue.peek_first().map(|event| event.time)
    }

    /// Total events executed over the scheduler's lifetime
    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Pool counters, or `None` when pooling is disabled
    pub fn pool_stats(&self) -> Option<PoolStats> {
        self.store.stats()
    }

    /// Schedule `action` to fire at `time`
    ///
    /// # Panics
    /// Panics if `time` is earlier than the current time.
    pub fn schedule(&mut self, time: SimTime, action: Action<S>) {
        assert!(
            time >= self.clock.now(),
            "cannot schedule an event at {} before the current time {}",
            time,
            self.clock.now()
        );

        let seq = self.next_seq;
        self.next_seq += 1;

        let record = self.store.acquire(time, seq, action);
        self.queue.insert(record);
    }

    /// Schedule `action` to fire `delay` ticks from now
    ///
    /// # Panics
    /// Panics if `now + delay` does not fit in [`SimTime`].
    pub fn schedule_in(&mut self, delay: SimTime, action: Action<S>) {
        let now = self.clock.now();
        let time = match now.checked_add(delay) {
            Some(time) => time,
            None => panic!("event delay {} from time {} overflows the clock", delay, now),
        };
        self.schedule(time, action);
    }

    /// Execute the earliest pending event
    ///
    /// Returns `None` if nothing is pending, otherwise what the action
    /// returned.
    pub fn step(&mut self) -> Option<ControlFlow<()>> {
        let record = self.queue.pop_first()?;
        self.clock.advance_to(record.time);
        self.events_processed += 1;

        let flow = (record.action)(self);
        self.store.release(record);
        Some(flow)
    }

    /// Run the event loop
    ///
    /// Schedules `terminal` at the configured end time and `initial` at the
    /// current time, then executes events until an action returns `Break` or
    /// the queue runs dry. Events left pending after a `Break` are discarded
    /// so the queue is empty when this returns.
    ///
    /// # Panics
    /// Panics if the clock is already past the configured end time.
    pub fn run(&mut self, initial: Action<S>, terminal: Action<S>) -> RunReport {
        let started = Instant::now();
        let processed_before = self.events_processed;
        let run_id = Uuid::new_v4();

        info!(
            %run_id,
            end_time = self.config.end_time,
            pooling = self.config.pooling,
            queue = ?self.config.queue,
            "simulation starting"
        );

        self.schedule(self.config.end_time, terminal);
        self.schedule(self.clock.now(), initial);

        let mut termination = Termination::Exhausted;
        while let Some(flow) = self.step() {
            if flow.is_break() {
                termination = Termination::Stopped {
                    at: self.clock.now(),
                };
                break;
            }
        }

        let discarded = self.discard_pending();
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let report = RunReport {
            run_id,
            config_hash: self.config_hash.clone(),
            events_processed: self.events_processed - processed_before,
            final_time: self.clock.now(),
            discarded,
            termination,
            pool: self.store.stats(),
            elapsed_ms,
        };

        info!(
            %run_id,
            events = report.events_processed,
            final_time = report.final_time,
            discarded,
            elapsed_ms,
            "simulation finished"
        );

        report
    }

    /// Drop every pending event without running it
    ///
    /// Records go back to the pool (or are freed). Returns how many were
    /// discarded.
    pub fn discard_pending(&mut self) -> usize {
        let store = &mut self.store;
        let discarded = self.queue.drain_into(|record| store.release(record));
        if discarded > 0 {
            debug!(discarded, "discarded pending events");
        }
        discarded
    }

    /// Tear down the scheduler and return the caller state
    ///
    /// # Panics
    /// Panics if events are still pending; call
    /// [`Scheduler::discard_pending`] first.
    pub fn into_state(self) -> S {
        let Scheduler {
            queue,
            store,
            state,
            ..
        } = self;

        queue.free();
        if let EventStore::Pooled(pool) = store {
            pool.free();
        }
        state
    }
}
