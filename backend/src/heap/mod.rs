//! Binary min-heap with a caller-supplied comparator
//!
//! The heap orders arbitrary items by a total order passed in at
//! construction. It is the pending-event queue of the scheduler, but knows
//! nothing about events: items are opaque to it apart from the comparator.
//!
//! # Invariants
//!
//! 1. Heap order: for every `i > 0`, `cmp(items[(i - 1) / 2], items[i])` is
//!    never `Greater`, so the root is always a minimum
//! 2. Items are dense in `[0, len)`
//! 3. `len <= capacity`; capacity doubles on overflow and never shrinks
//!
//! Items comparing `Equal` come out in no particular order. Callers that need
//! a stable order must fold a secondary key (such as an insertion sequence
//! number) into the comparator.
//!
//! # Example
//!
//! ```rust
//! use event_scheduler_core::Heap;
//!
//! let mut heap = Heap::new(|a: &u32, b: &u32| a.cmp(b));
//! for t in [5, 1, 3, 2, 4] {
//!     heap.insert(t);
//! }
//!
//! let drained: Vec<u32> = std::iter::from_fn(|| heap.pop_first()).collect();
//! assert_eq!(drained, vec![1, 2, 3, 4, 5]);
//! heap.free();
//! ```

use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

/// Capacity of a heap created with [`Heap::new`]
pub const HEAP_INITIAL_CAPACITY: usize = 8;

/// Array-backed binary min-heap
///
/// `C` is the comparator; any `Fn(&T, &T) -> Ordering` works, including
/// closures and plain function pointers.
pub struct Heap<T, C = fn(&T, &T) -> Ordering> {
    /// Items in heap-array order
    items: Vec<T>,

    /// Logical capacity (doubles when `items` fills it)
    capacity: usize,

    /// Total order over items
    comparator: C,
}

impl<T, C> Heap<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    /// Create an empty heap with [`HEAP_INITIAL_CAPACITY`] slots
    pub fn new(comparator: C) -> Self {
        Self::with_capacity(HEAP_INITIAL_CAPACITY, comparator)
    }

    /// Create an empty heap with room for `capacity` items before growing
    ///
    /// A requested capacity of zero is bumped to one so doubling always
    /// makes progress.
    pub fn with_capacity(capacity: usize, comparator: C) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            comparator,
        }
    }

    /// Number of items currently queued
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the heap holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current logical capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert an item, returning the index where it came to rest
    ///
    /// The index is informational only: any later insert or delete may move
    /// the item.
    ///
    /// # Example
    /// ```
    /// use event_scheduler_core::Heap;
    ///
    /// let mut heap = Heap::new(|a: &i32, b: &i32| a.cmp(b));
    /// assert_eq!(heap.insert(10), 0);
    /// assert_eq!(heap.insert(3), 0); // smaller item sifts up to the root
    /// assert_eq!(heap.peek_first(), Some(&3));
    /// ```
    pub fn insert(&mut self, item: T) -> usize {
        if self.items.len() == self.capacity {
            self.double_capacity();
        }
        self.items.push(item);
        self.sift_up(self.items.len() - 1)
    }

    /// Remove and return the item at `index`
    ///
    /// The last item fills the hole and is then moved down (or, when it
    /// belongs above the hole, up) until heap order holds again.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    pub fn delete(&mut self, index: usize) -> T {
        assert!(
            index < self.items.len(),
            "heap index {} out of range (size {})",
            index,
            self.items.len()
        );

        let item = self.items.swap_remove(index);
        if index < self.items.len() && self.sift_down(index) == index {
            self.sift_up(index);
        }
        item
    }

    /// Remove and return a minimum item
    ///
    /// # Panics
    /// Panics if the heap is empty.
    pub fn delete_first(&mut self) -> T {
        assert!(!self.items.is_empty(), "delete_first on an empty heap");
        self.delete(0)
    }

    /// Remove and return a minimum item, or `None` if the heap is empty
    pub fn pop_first(&mut self) -> Option<T> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.delete(0))
        }
    }

    /// Borrow a minimum item without removing it
    pub fn peek_first(&self) -> Option<&T> {
        self.items.first()
    }

    /// Remove every item; capacity is kept
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Remove every item, yielding them in heap-array order
    pub fn drain(&mut self) -> std::vec::Drain<'_, T> {
        self.items.drain(..)
    }

    /// Iterate over queued items in heap-array order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Check the heap-order invariant over the whole array
    pub fn is_heap(&self) -> bool {
        (1..self.items.len()).all(|i| {
            (self.comparator)(&self.items[(i - 1) / 2], &self.items[i]) != Ordering::Greater
        })
    }

    /// Release the heap
    ///
    /// # Panics
    /// Panics if any item is still queued. Queued items are never drained
    /// implicitly; call [`Heap::drain`] or [`Heap::clear`] first.
    pub fn free(self) {
        assert!(
            self.items.is_empty(),
            "cannot free a heap still holding {} items",
            self.items.len()
        );
    }

    fn double_capacity(&mut self) {
        let doubled = self.capacity.saturating_mul(2);
        self.items.reserve_exact(doubled - self.items.len());
        debug!(from = self.capacity, to = doubled, "heap capacity doubled");
        self.capacity = doubled;
    }

    fn less(&self, a: usize, b: usize) -> bool {
        (self.comparator)(&self.items[a], &self.items[b]) == Ordering::Less
    }

    // move the item at `i` toward the root while it is strictly less than
    // its parent; returns its final index
    fn sift_up(&mut self, mut i: usize) -> usize {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.less(i, parent) {
                break;
            }
            self.items.swap(i, parent);
            i = parent;
        }
        i
    }

    // move the item at `i` toward the leaves while some child is strictly
    // less than it; returns its final index
    fn sift_down(&mut self, mut i: usize) -> usize {
        let len = self.items.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;

            let mut smallest = i;
            if left < len && self.less(left, smallest) {
                smallest = left;
            }
            if right < len && self.less(right, smallest) {
                smallest = right;
            }

            if smallest == i {
                return i;
            }
            self.items.swap(i, smallest);
            i = smallest;
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for Heap<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap")
            .field("len", &self.items.len())
            .field("capacity", &self.capacity)
            .field("items", &self.items)
            .finish()
    }
}
