// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Allocation Checker Tests
//!
//! Checks that a tree built with reserved capacity locks, waits and
//! releases without touching the heap. Allocations are counted per thread
//! by a wrapper around the system allocator.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::thread;

use super::wait_until;
use crate::kernel::sync::{RangeLock, RangeLockTree, ThreadWaiter};

struct CountingAllocator;

thread_local! {
    static ALLOCATIONS: Cell<usize> = const { Cell::new(0) };
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let _ = ALLOCATIONS.try_with(|n| n.set(n.get() + 1));
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let _ = ALLOCATIONS.try_with(|n| n.set(n.get() + 1));
        System.realloc(ptr, layout, new_size)
    }
}

#[global_allocator]
static ALLOCATOR: CountingAllocator = CountingAllocator;

/// Allocations made so far by the calling thread
fn allocations() -> usize {
    ALLOCATIONS.with(Cell::get)
}

/// Test that releasing a range and granting its waiter does not allocate
#[test]
fn test_unlock_with_waiter_does_not_allocate() {
    let tree: RangeLockTree<ThreadWaiter> = RangeLockTree::with_capacity(16);
    let tree = &tree;
    let mut holder = RangeLock::new(0, 10).unwrap();
    tree.write_lock(&mut holder).unwrap();

    thread::scope(|s| {
        let waiter = s.spawn(move || {
            let mut lock = RangeLock::new(5, 15).unwrap();
            tree.write_lock(&mut lock).unwrap();
            tree.write_unlock(&mut lock).unwrap();
        });
        wait_until("writer to queue", || tree.len() == 2);

        let before = allocations();
        tree.write_unlock(&mut holder).unwrap();
        assert_eq!(allocations() - before, 0, "unlock allocated");

        waiter.join().unwrap();
    });

    assert!(tree.is_empty());
}

/// Test that a steady lock/unlock cycle within capacity does not allocate
#[test]
fn test_steady_state_does_not_allocate() {
    let tree: RangeLockTree<ThreadWaiter> = RangeLockTree::with_capacity(8);
    let mut locks: Vec<RangeLock> = (0..8u64)
        .map(|i| RangeLock::new(i * 100, i * 100 + 99).unwrap())
        .collect();

    // Warm up the thread's waiter handle.
    assert!(tree.write_trylock(&mut locks[0]));
    tree.write_unlock(&mut locks[0]).unwrap();

    let before = allocations();
    for _ in 0..4 {
        for lock in &mut locks {
            tree.read_lock(lock).unwrap();
        }
        for lock in &mut locks {
            tree.read_unlock(lock).unwrap();
        }
    }
    assert_eq!(allocations() - before, 0, "steady-state locking allocated");
    assert!(tree.is_empty());
}
