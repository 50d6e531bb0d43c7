//! Calendar queue
//!
//! Brown's calendar queue: the time line is cut into `nbins` "days" of equal
//! width that repeat every "year" (`width`). Each day is a [`Heap`], and an
//! item lands in the day its timestamp maps to, whatever year it falls in.
//! Removal walks forward from the last day an item was found in, taking the
//! first day whose minimum falls inside the current year, and falls back to
//! a direct search over every day when a whole year turns up nothing.
//!
//! R. Brown, "Calendar queues: a fast O(1) priority queue implementation for
//! the simulation event set problem", Comm. ACM 31(10), 1988.
//!
//! # Requirements for users
//!
//! The queue is monotone: an item must not be inserted with a timestamp
//! earlier than the last item removed. Scheduler events satisfy this because
//! nothing may be scheduled before the current time. Violations panic.
//!
//! The comparator must agree with the timestamp key (items with smaller keys
//! compare `Less`); it only decides order among items of the same day.
//!
//! # Example
//!
//! ```rust
//! use event_scheduler_core::CalendarQueue;
//!
//! let mut queue = CalendarQueue::new(100, 10, |t: &u64| *t, |a: &u64, b: &u64| a.cmp(b));
//! for t in [250, 3, 97, 41, 1000] {
//!     queue.insert(t);
//! }
//!
//! let drained: Vec<u64> = std::iter::from_fn(|| queue.pop_first()).collect();
//! assert_eq!(drained, vec![3, 41, 97, 250, 1000]);
//! queue.free();
//! ```

use crate::core::time::SimTime;
use crate::heap::Heap;
use std::cmp::Ordering;
use std::fmt;

/// Calendar queue of items keyed by a timestamp
///
/// `K` extracts an item's timestamp; `C` orders items within a day.
pub struct CalendarQueue<T, C = fn(&T, &T) -> Ordering, K = fn(&T) -> SimTime> {
    /// One heap per day
    bins: Vec<Heap<T, C>>,

    /// Items across all days
    len: usize,

    /// Length of a day
    bin_width: SimTime,

    /// Day the last item was removed from
    last_bin: usize,

    /// Exclusive upper bound of `last_bin`'s current window
    bin_max: SimTime,

    /// Timestamp of the last removed item
    floor: SimTime,

    key: K,
}

impl<T, C, K> CalendarQueue<T, C, K>
where
    C: Fn(&T, &T) -> Ordering + Clone,
    K: Fn(&T) -> SimTime,
{
    /// Create a calendar of `nbins` days spanning `width` time units
    ///
    /// # Panics
    /// Panics unless `width > nbins` and `nbins > 0`, which keeps every day
    /// at least one time unit wide.
    pub fn new(width: SimTime, nbins: usize, key: K, comparator: C) -> Self {
        assert!(nbins > 0, "calendar needs at least one bin");
        assert!(
            width > nbins as SimTime,
            "calendar width {} must exceed its bin count {}",
            width,
            nbins
        );

        let bin_width = width / nbins as SimTime;
        Self {
            bins: (0..nbins).map(|_| Heap::new(comparator.clone())).collect(),
            len: 0,
            bin_width,
            last_bin: 0,
            bin_max: bin_width,
            floor: 0,
            key,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of days in a year
    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    /// Length of a day
    pub fn bin_width(&self) -> SimTime {
        self.bin_width
    }

    /// Insert an item into the day its timestamp maps to
    ///
    /// # Panics
    /// Panics if the item's timestamp is earlier than the last removed item.
    pub fn insert(&mut self, item: T) {
        let time = (self.key)(&item);
        assert!(
            time >= self.floor,
            "calendar insert at {} precedes last removed time {}",
            time,
            self.floor
        );

        let bin = self.bin_of(time);
        self.bins[bin].insert(item);
        self.len += 1;
    }

    /// Borrow a minimum item without removing it
    pub fn peek_first(&self) -> Option<&T> {
        let (bin, _) = self.locate()?;
        self.bins[bin].peek_first()
    }

    /// Remove and return a minimum item, or `None` if the queue is empty
    pub fn pop_first(&mut self) -> Option<T> {
        let (bin, bin_max) = self.locate()?;
        let item = self.bins[bin].pop_first()?;

        self.last_bin = bin;
        self.bin_max = bin_max;
        self.floor = (self.key)(&item);
        self.len -= 1;
        Some(item)
    }

    /// Remove and return a minimum item
    ///
    /// # Panics
    /// Panics if the queue is empty.
    pub fn delete_first(&mut self) -> T {
        match self.pop_first() {
            Some(item) => item,
            None => panic!("delete_first on an empty calendar queue"),
        }
    }

    /// Remove every item, day by day
    ///
    /// Items not yet yielded when the iterator is dropped stay queued.
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        let mut bin = 0;
        std::iter::from_fn(move || {
            while bin < self.bins.len() {
                if let Some(item) = self.bins[bin].pop_first() {
                    self.len -= 1;
                    return Some(item);
                }
                bin += 1;
            }
            None
        })
    }

    /// Release the queue
    ///
    /// # Panics
    /// Panics if any item is still queued.
    pub fn free(self) {
        assert!(
            self.len == 0,
            "cannot free a calendar queue still holding {} items",
            self.len
        );
        for bin in self.bins {
            bin.free();
        }
    }

    fn bin_of(&self, time: SimTime) -> usize {
        ((time / self.bin_width) % self.bins.len() as SimTime) as usize
    }

    // find the day holding the next item and the upper bound of the window
    // it was found in
    fn locate(&self) -> Option<(usize, SimTime)> {
        if self.len == 0 {
            return None;
        }

        // walk one year forward from the last day used
        let nbins = self.bins.len();
        let mut bin = self.last_bin;
        let mut bin_max = self.bin_max;
        loop {
            if let Some(first) = self.bins[bin].peek_first() {
                if (self.key)(first) < bin_max {
                    return Some((bin, bin_max));
                }
            }
            bin = (bin + 1) % nbins;
            // saturates only in the final window before SimTime::MAX
            bin_max = bin_max.saturating_add(self.bin_width);
            if bin == self.last_bin {
                break;
            }
        }

        // nothing this year: direct search for the smallest head
        let (bin, time) = self
            .bins
            .iter()
            .enumerate()
            .filter_map(|(i, heap)| heap.peek_first().map(|first| (i, (self.key)(first))))
            .min_by_key(|&(_, time)| time)?;
        let window_start = time - time % self.bin_width;
        Some((bin, window_start.saturating_add(self.bin_width)))
    }
}

impl<T, C, K> fmt::Debug for CalendarQueue<T, C, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarQueue")
            .field("len", &self.len)
            .field("bins", &self.bins.len())
            .field("bin_width", &self.bin_width)
            .field("last_bin", &self.last_bin)
            .field("bin_max", &self.bin_max)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Times = CalendarQueue<u64>;

    fn by_value(a: &u64, b: &u64) -> Ordering {
        a.cmp(b)
    }

    fn identity(t: &u64) -> SimTime {
        *t
    }

    fn calendar(width: SimTime, nbins: usize) -> Times {
        CalendarQueue::new(
            width,
            nbins,
            identity as fn(&u64) -> SimTime,
            by_value as fn(&u64, &u64) -> Ordering,
        )
    }

    #[test]
    fn test_bin_width_is_width_over_bins() {
        let queue = calendar(1000, 8);
        assert_eq!(queue.bin_width(), 125);
        assert_eq!(queue.bin_count(), 8);
    }

    #[test]
    #[should_panic(expected = "calendar width 10 must exceed its bin count 10")]
    fn test_width_not_exceeding_bins_panics() {
        calendar(10, 10);
    }

    #[test]
    fn test_same_bin_different_years() {
        // 5 and 105 share day 0 of a 100-wide year
        let mut queue = calendar(100, 10);
        queue.insert(105);
        queue.insert(5);
        queue.insert(55);

        assert_eq!(queue.pop_first(), Some(5));
        assert_eq!(queue.pop_first(), Some(55));
        assert_eq!(queue.pop_first(), Some(105));
        assert_eq!(queue.pop_first(), None);
    }

    #[test]
    fn test_far_future_item_found_by_direct_search() {
        let mut queue = calendar(100, 10);
        queue.insert(1_000_007);
        assert_eq!(queue.peek_first(), Some(&1_000_007));
        assert_eq!(queue.pop_first(), Some(1_000_007));
        // the next insert in the same window is found on the fast path
        queue.insert(1_000_008);
        assert_eq!(queue.pop_first(), Some(1_000_008));
    }

    #[test]
    #[should_panic(expected = "precedes last removed time 40")]
    fn test_insert_before_floor_panics() {
        let mut queue = calendar(100, 10);
        queue.insert(40);
        queue.pop_first();
        queue.insert(39);
    }

    #[test]
    #[should_panic(expected = "cannot free a calendar queue still holding 1 items")]
    fn test_free_non_empty_panics() {
        let mut queue = calendar(100, 10);
        queue.insert(1);
        queue.free();
    }

    #[test]
    fn test_drain_empties_every_bin() {
        let mut queue = calendar(100, 10);
        for t in [1, 15, 250, 999] {
            queue.insert(t);
        }
        assert_eq!(queue.drain().count(), 4);
        assert!(queue.is_empty());
        queue.free();
    }

    #[test]
    fn test_partial_drain_keeps_the_rest() {
        let mut queue = calendar(100, 10);
        for t in [1, 2, 3] {
            queue.insert(t);
        }
        assert_eq!(queue.drain().next(), Some(1));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop_first(), Some(2));
    }
}
