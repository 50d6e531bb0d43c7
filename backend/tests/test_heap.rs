//! Tests for Heap
//!
//! Covers ordering, capacity growth, arbitrary deletes and the
//! free-while-non-empty contract.

use event_scheduler_core::{Heap, HEAP_INITIAL_CAPACITY};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
struct Ev {
    time: i32,
    tag: &'static str,
}

fn by_time(a: &Ev, b: &Ev) -> Ordering {
    a.time.cmp(&b.time)
}

fn ev(time: i32, tag: &'static str) -> Ev {
    Ev { time, tag }
}

#[test]
fn test_delete_first_yields_ascending_timestamps() {
    let mut heap = Heap::new(by_time);
    for t in [5, 1, 3, 2, 4] {
        heap.insert(ev(t, "x"));
    }

    let order: Vec<i32> = (0..5).map(|_| heap.delete_first().time).collect();
    assert_eq!(order, vec![1, 2, 3, 4, 5]);
    assert!(heap.is_empty());
    heap.free();
}

#[test]
fn test_size_tracks_inserts_and_deletes() {
    let mut heap = Heap::new(by_time);
    assert_eq!(heap.len(), 0);

    heap.insert(ev(3, "a"));
    heap.insert(ev(1, "b"));
    heap.insert(ev(2, "c"));
    assert_eq!(heap.len(), 3);

    heap.delete(1);
    assert_eq!(heap.len(), 2);

    heap.delete_first();
    heap.delete_first();
    assert_eq!(heap.len(), 0);
}

#[test]
fn test_capacity_doubles_and_keeps_items() {
    let mut heap = Heap::new(by_time);
    assert_eq!(heap.capacity(), HEAP_INITIAL_CAPACITY);

    // reverse order forces every insert to sift all the way up
    for t in (0..HEAP_INITIAL_CAPACITY as i32 + 1).rev() {
        heap.insert(ev(t, "x"));
    }
    assert_eq!(heap.capacity(), HEAP_INITIAL_CAPACITY * 2);
    assert!(heap.is_heap());

    for t in HEAP_INITIAL_CAPACITY as i32 + 1..40 {
        heap.insert(ev(t, "x"));
    }
    assert_eq!(heap.capacity(), 64);
    assert_eq!(heap.len(), 40);

    let drained: Vec<i32> = std::iter::from_fn(|| heap.pop_first())
        .map(|e| e.time)
        .collect();
    assert_eq!(drained, (0..40).collect::<Vec<_>>());
}

#[test]
fn test_capacity_never_shrinks() {
    let mut heap = Heap::new(by_time);
    for t in 0..20 {
        heap.insert(ev(t, "x"));
    }
    let grown = heap.capacity();
    while heap.pop_first().is_some() {}
    assert_eq!(heap.capacity(), grown);
}

#[test]
fn test_insert_returns_resting_index() {
    let mut heap = Heap::new(by_time);
    assert_eq!(heap.insert(ev(10, "a")), 0);
    assert_eq!(heap.insert(ev(20, "b")), 1);
    assert_eq!(heap.insert(ev(30, "c")), 2);
    // smaller than everything: ends at the root
    assert_eq!(heap.insert(ev(0, "d")), 0);
}

#[test]
fn test_delete_arbitrary_index_returns_that_item() {
    let mut heap = Heap::new(by_time);
    for (t, tag) in [(4, "a"), (8, "b"), (6, "c"), (9, "d"), (12, "e")] {
        heap.insert(ev(t, tag));
    }

    let target = heap.iter().position(|e| e.tag == "b").unwrap();
    let removed = heap.delete(target);
    assert_eq!(removed, ev(8, "b"));
    assert!(heap.is_heap());
    assert!(heap.iter().all(|e| e.tag != "b"));
}

#[test]
fn test_peek_does_not_remove() {
    let mut heap = Heap::new(by_time);
    assert!(heap.peek_first().is_none());
    heap.insert(ev(2, "a"));
    heap.insert(ev(1, "b"));
    assert_eq!(heap.peek_first().map(|e| e.tag), Some("b"));
    assert_eq!(heap.len(), 2);
}

#[test]
fn test_equal_children_do_not_swap() {
    let mut heap = Heap::new(by_time);
    heap.insert(ev(1, "root"));
    heap.insert(ev(5, "left"));
    heap.insert(ev(5, "right"));
    heap.insert(ev(5, "last"));

    // "last" fills the root hole; both children compare equal to it
    heap.delete_first();
    assert_eq!(heap.peek_first().map(|e| e.tag), Some("last"));
}

#[test]
fn test_custom_comparator_max_heap() {
    let mut heap = Heap::new(|a: &i32, b: &i32| b.cmp(a));
    for v in [3, 9, 1, 7] {
        heap.insert(v);
    }
    assert_eq!(heap.delete_first(), 9);
    assert_eq!(heap.delete_first(), 7);
}

#[test]
#[should_panic(expected = "cannot free a heap still holding 1 items")]
fn test_free_non_empty_heap_panics() {
    let mut heap = Heap::new(by_time);
    heap.insert(ev(1, "leak"));
    heap.free();
}

#[test]
#[should_panic(expected = "heap index 3 out of range (size 3)")]
fn test_delete_past_end_panics() {
    let mut heap = Heap::new(by_time);
    for t in 0..3 {
        heap.insert(ev(t, "x"));
    }
    heap.delete(3);
}

#[test]
fn test_drain_empties_heap() {
    let mut heap = Heap::new(by_time);
    for t in 0..10 {
        heap.insert(ev(t, "x"));
    }
    assert_eq!(heap.drain().count(), 10);
    heap.free();
}
