// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Wait Queue
//!
//! This module provides the seam between the synchronization primitives
//! and whatever scheduler hosts them. A primitive never blocks by itself:
//! it asks the [`Waiter`] of the current execution context to sleep, and it
//! resumes a sleeping context through that context's [`Waiter`].
//!
//! # Design
//!
//! - **Token semantics**: a `wake()` that lands before the matching `sleep()`
//!   must make that `sleep()` return, so a primitive may drop its guard
//!   before sleeping without losing the wakeup
//! - **Spurious wakeups**: `sleep()` may return early; callers re-check
//!   their predicate in a loop
//! - **Deferred wakeups**: owners to resume are collected in a
//!   [`WakeQueue`] while a guard is held and woken after it is dropped.
//!   The queue's space is reserved ahead of time so collecting never
//!   allocates under the guard.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut wake_q = WakeQueue::with_capacity(16);
//! {
//!     let mut inner = guard.lock();
//!     // ... decide who may run ...
//!     wake_q.add(owner.clone());
//! }
//! wake_q.wake_all();
//! ```

use alloc::collections::{TryReserveError, VecDeque};

/// ============================================================================
/// Task State
/// ============================================================================

/// Which pending signals may cut a sleep short
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Ignore all signals
    Uninterruptible,

    /// Any pending signal aborts the wait
    Interruptible,

    /// Only a fatal signal aborts the wait
    Killable,
}

impl TaskState {
    /// Whether this state ever reacts to signals
    pub const fn is_interruptible(self) -> bool {
        !matches!(self, TaskState::Uninterruptible)
    }
}

/// ============================================================================
/// Waiter
/// ============================================================================

/// Handle to an execution context that can be put to sleep and resumed
///
/// This is the host scheduler's side of the contract. Cloning a waiter
/// yields another handle to the same context.
pub trait Waiter: Clone + Send {
    /// Handle for the calling execution context
    fn current() -> Self;

    /// Suspend the calling context until woken
    ///
    /// Must only be called by the context this handle refers to. May return
    /// spuriously. Returns immediately if a wakeup was delivered since the
    /// last sleep, or if a signal matching `state` is pending.
    fn sleep(&self, state: TaskState);

    /// Resume this context, or make its next `sleep()` return immediately
    fn wake(&self);

    /// Check for a pending signal that a wait in `state` must honor
    fn signal_pending(&self, state: TaskState) -> bool;
}

/// ============================================================================
/// Wake Queue
/// ============================================================================

/// Owners to be woken once the guard protecting their state is dropped
///
/// Space is reserved up front with [`WakeQueue::try_reserve`], so queueing
/// an owner under a spinlock never allocates as long as the caller keeps
/// enough room for every owner it may grant.
pub struct WakeQueue<W: Waiter> {
    waiters: VecDeque<W>,
}

impl<W: Waiter> WakeQueue<W> {
    /// Create an empty wake queue
    pub const fn new() -> Self {
        Self {
            waiters: VecDeque::new(),
        }
    }

    /// Create an empty wake queue with room for `capacity` owners
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            waiters: VecDeque::with_capacity(capacity),
        }
    }

    /// Make room for `additional` owners beyond those already queued
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.waiters.try_reserve(additional)
    }

    /// Number of owners that fit without reallocating
    pub fn capacity(&self) -> usize {
        self.waiters.capacity()
    }

    /// Queue an owner for wakeup
    pub fn add(&mut self, waiter: W) {
        self.waiters.push_back(waiter);
    }

    /// Take the oldest queued owner
    pub fn pop(&mut self) -> Option<W> {
        self.waiters.pop_front()
    }

    /// Check if the wake queue is empty
    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }

    /// Get the number of queued owners
    pub fn len(&self) -> usize {
        self.waiters.len()
    }

    /// Wake every queued owner, keeping the reserved space
    ///
    /// # Returns
    ///
    /// Number of owners woken
    pub fn wake_all(&mut self) -> usize {
        let count = self.waiters.len();
        for waiter in self.waiters.drain(..) {
            waiter.wake();
        }
        count
    }
}

impl<W: Waiter> Default for WakeQueue<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Waiter> Drop for WakeQueue<W> {
    fn drop(&mut self) {
        // Never strand an owner whose grant was already decided.
        self.wake_all();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct CountingWaiter {
        wakes: Arc<AtomicUsize>,
    }

    impl Waiter for CountingWaiter {
        fn current() -> Self {
            Self::default()
        }

        fn sleep(&self, _state: TaskState) {}

        fn wake(&self) {
            self.wakes.fetch_add(1, Ordering::SeqCst);
        }

        fn signal_pending(&self, _state: TaskState) -> bool {
            false
        }
    }

    #[test]
    fn test_wake_queue_new() {
        let wake_q: WakeQueue<CountingWaiter> = WakeQueue::new();
        assert!(wake_q.is_empty());
        assert_eq!(wake_q.len(), 0);
    }

    #[test]
    fn test_wake_queue_wake_all() {
        let waiter = CountingWaiter::default();
        let mut wake_q = WakeQueue::new();
        wake_q.add(waiter.clone());
        wake_q.add(waiter.clone());

        assert_eq!(wake_q.wake_all(), 2);
        assert_eq!(waiter.wakes.load(Ordering::SeqCst), 2);
        assert!(wake_q.is_empty());
    }

    #[test]
    fn test_wake_queue_wakes_on_drop() {
        let waiter = CountingWaiter::default();
        {
            let mut wake_q = WakeQueue::new();
            wake_q.add(waiter.clone());
        }
        assert_eq!(waiter.wakes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_wake_queue_fifo_within_reserve() {
        let first = CountingWaiter::default();
        let second = CountingWaiter::default();
        let mut wake_q = WakeQueue::new();
        wake_q.try_reserve(2).unwrap();
        let capacity = wake_q.capacity();
        assert!(capacity >= 2);

        wake_q.add(first.clone());
        wake_q.add(second.clone());
        assert_eq!(wake_q.capacity(), capacity);

        let popped = wake_q.pop().unwrap();
        assert!(Arc::ptr_eq(&popped.wakes, &first.wakes));
        assert_eq!(wake_q.len(), 1);

        wake_q.wake_all();
        assert_eq!(second.wakes.load(Ordering::SeqCst), 1);
        assert_eq!(first.wakes.load(Ordering::SeqCst), 0);
        assert_eq!(wake_q.capacity(), capacity);
    }

    #[test]
    fn test_task_state_interruptible() {
        assert!(!TaskState::Uninterruptible.is_interruptible());
        assert!(TaskState::Interruptible.is_interruptible());
        assert!(TaskState::Killable.is_interruptible());
    }
}
