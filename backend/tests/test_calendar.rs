//! Tests for CalendarQueue
//!
//! Random batches must come back in non-decreasing time order, and a
//! scheduler-style workload (pop, then insert at or after the popped time)
//! must agree with a single heap.

use event_scheduler_core::{CalendarQueue, Heap, SimTime};
use proptest::prelude::*;
use std::cmp::Ordering;

// ============================================================================
// Test Helpers
// ============================================================================

type Stamped = (SimTime, u32);

fn by_time_then_tag(a: &Stamped, b: &Stamped) -> Ordering {
    a.cmp(b)
}

fn time_of(item: &Stamped) -> SimTime {
    item.0
}

fn calendar(width: SimTime, nbins: usize) -> CalendarQueue<Stamped> {
    CalendarQueue::new(
        width,
        nbins,
        time_of as fn(&Stamped) -> SimTime,
        by_time_then_tag as fn(&Stamped, &Stamped) -> Ordering,
    )
}

fn drain_times(queue: &mut CalendarQueue<Stamped>) -> Vec<SimTime> {
    std::iter::from_fn(|| queue.pop_first())
        .map(|(time, _)| time)
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_wide_calendar_removes_in_time_order() {
    // a few thousand spread over most of the u64 range, 1000 days per year
    let mut queue = calendar(SimTime::MAX / 10_000, 1000);
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    for tag in 0..5000 {
        // xorshift64
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        queue.insert((state, tag));
    }
    assert_eq!(queue.len(), 5000);

    let times = drain_times(&mut queue);
    assert_eq!(times.len(), 5000);
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
    queue.free();
}

#[test]
fn test_equal_times_follow_comparator() {
    let mut queue = calendar(64, 8);
    queue.insert((10, 3));
    queue.insert((10, 1));
    queue.insert((10, 2));

    assert_eq!(queue.delete_first(), (10, 1));
    assert_eq!(queue.delete_first(), (10, 2));
    assert_eq!(queue.delete_first(), (10, 3));
}

#[test]
fn test_peek_does_not_move_the_calendar() {
    let mut queue = calendar(100, 10);
    queue.insert((530, 0));
    queue.insert((12, 1));

    assert_eq!(queue.peek_first(), Some(&(12, 1)));
    assert_eq!(queue.peek_first(), Some(&(12, 1)));
    assert_eq!(queue.pop_first(), Some((12, 1)));
    assert_eq!(queue.peek_first(), Some(&(530, 0)));
}

#[test]
#[should_panic(expected = "delete_first on an empty calendar queue")]
fn test_delete_first_on_empty_panics() {
    calendar(100, 10).delete_first();
}

proptest! {
    #[test]
    fn batch_removal_is_non_decreasing(
        times in prop::collection::vec(0u64..10_000, 0..400),
        nbins in 1usize..32,
        extra in 1u64..500,
    ) {
        let mut queue = calendar(nbins as SimTime + extra, nbins);
        for (tag, &time) in times.iter().enumerate() {
            queue.insert((time, tag as u32));
        }

        let drained = drain_times(&mut queue);
        let mut expected = times.clone();
        expected.sort();
        prop_assert_eq!(drained, expected);
        prop_assert!(queue.is_empty());
        queue.free();
    }

    #[test]
    fn monotone_workload_matches_heap(
        delays in prop::collection::vec(0u64..300, 1..400),
        nbins in 1usize..16,
    ) {
        let mut queue = calendar(nbins as SimTime * 7 + 1, nbins);
        let mut heap = Heap::new(by_time_then_tag as fn(&Stamped, &Stamped) -> Ordering);

        queue.insert((0, 0));
        heap.insert((0, 0));
        for (tag, &delay) in delays.iter().enumerate() {
            let got = queue.pop_first();
            prop_assert_eq!(got, heap.pop_first());
            let now = got.map_or(0, |(time, _)| time);

            // each pop schedules up to two follow-ups at or after now
            for next in [delay, delay / 3] {
                let item = (now + next, tag as u32);
                queue.insert(item);
                heap.insert(item);
            }
            prop_assert_eq!(queue.len(), heap.len());
        }

        let rest: Vec<Stamped> = std::iter::from_fn(|| queue.pop_first()).collect();
        let expected: Vec<Stamped> = std::iter::from_fn(|| heap.pop_first()).collect();
        prop_assert_eq!(rest, expected);
    }
}
