//! Bounded object pool
//!
//! A fixed-capacity LIFO free-list of reusable items. `get` hands back the
//! most recently released item when one is idle and falls back to the
//! factory otherwise; `put` keeps the item while there is room and destroys it
//! once the pool is full. The idle stack never grows past its capacity.
//!
//! The pool is a cache, not an allocator: it does not track items it has
//! handed out and does not guard against an item being `put` twice.
//!
//! # Example
//!
//! ```rust
//! use event_scheduler_core::Pool;
//!
//! let mut pool = Pool::with_fns(2, || Vec::<u8>::with_capacity(64), drop);
//!
//! let buf = pool.get(); // pool is empty: created
//! pool.put(buf);
//! let again = pool.get(); // reused
//! assert_eq!(again.capacity(), 64);
//! assert_eq!(pool.stats().created, 1);
//! assert_eq!(pool.stats().reused, 1);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

/// Produces and releases pooled items
///
/// `create` is called when `get` finds the pool empty; `destroy` is called
/// for every item the pool declines to keep and for every idle item at
/// teardown.
pub trait ItemFactory<T> {
    /// Produce a fresh item
    fn create(&mut self) -> T;

    /// Release an item the pool will not retain
    fn destroy(&mut self, item: T);
}

/// [`ItemFactory`] built from a pair of closures
pub struct FnFactory<C, D> {
    create: C,
    destroy: D,
}

impl<C, D> FnFactory<C, D> {
    pub fn new(create: C, destroy: D) -> Self {
        Self { create, destroy }
    }
}

impl<T, C, D> ItemFactory<T> for FnFactory<C, D>
where
    C: FnMut() -> T,
    D: FnMut(T),
{
    fn create(&mut self) -> T {
        (self.create)()
    }

    fn destroy(&mut self, item: T) {
        (self.destroy)(item)
    }
}

/// Lifetime counters for a pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Items produced by the factory
    pub created: u64,

    /// Items handed to the factory for destruction
    pub destroyed: u64,

    /// `get` calls served from the idle stack
    pub reused: u64,

    /// `put` calls that kept the item
    pub recycled: u64,
}

/// Fixed-capacity LIFO pool of reusable items
pub struct Pool<T, F: ItemFactory<T>> {
    /// Idle items, most recently released last
    idle: Vec<T>,

    /// Maximum number of idle items retained
    capacity: usize,

    factory: F,
    stats: PoolStats,
}

impl<T, C, D> Pool<T, FnFactory<C, D>>
where
    C: FnMut() -> T,
    D: FnMut(T),
{
    /// Create a pool from `create`/`destroy` closures
    pub fn with_fns(capacity: usize, create: C, destroy: D) -> Self {
        Self::new(capacity, FnFactory::new(create, destroy))
    }
}

impl<T, F: ItemFactory<T>> Pool<T, F> {
    /// Create an empty pool retaining at most `capacity` idle items
    pub fn new(capacity: usize, factory: F) -> Self {
        debug!(capacity, "pool created");
        Self {
            idle: Vec::with_capacity(capacity),
            capacity,
            factory,
            stats: PoolStats::default(),
        }
    }

    /// Take an item: the most recently released idle one, or a fresh one
    pub fn get(&mut self) -> T {
        match self.idle.pop() {
            Some(item) => {
                self.stats.reused += 1;
                item
            }
            None => {
                self.stats.created += 1;
                self.factory.create()
            }
        }
    }

    /// Return an item to the pool
    ///
    /// The item is kept if fewer than `capacity` items are idle and destroyed
    /// immediately otherwise. The caller must not hold on to it either way.
    pub fn put(&mut self, item: T) {
        if self.idle.len() < self.capacity {
            self.idle.push(item);
            self.stats.recycled += 1;
        } else {
            trace!(capacity = self.capacity, "pool full, destroying item");
            self.stats.destroyed += 1;
            self.factory.destroy(item);
        }
    }

    /// Fill the idle stack up to capacity with fresh items
    pub fn prefill(&mut self) {
        while self.idle.len() < self.capacity {
            self.stats.created += 1;
            let item = self.factory.create();
            self.idle.push(item);
        }
    }

    /// Number of idle items
    pub fn idle(&self) -> usize {
        self.idle.len()
    }

    /// Maximum number of idle items retained
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Destroy every idle item and release the pool
    ///
    /// Unlike [`Heap::free`](crate::Heap::free) this is fine to call with
    /// items still idle. Dropping the pool does the same.
    pub fn free(mut self) {
        let idle = self.idle.len();
        self.drain_idle();
        debug!(idle, stats = ?self.stats, "pool freed");
    }

    fn drain_idle(&mut self) {
        while let Some(item) = self.idle.pop() {
            self.stats.destroyed += 1;
            self.factory.destroy(item);
        }
    }
}

impl<T, F: ItemFactory<T>> Drop for Pool<T, F> {
    fn drop(&mut self) {
        self.drain_idle();
    }
}

impl<T, F: ItemFactory<T>> fmt::Debug for Pool<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("idle", &self.idle.len())
            .field("capacity", &self.capacity)
            .field("stats", &self.stats)
            .finish()
    }
}
