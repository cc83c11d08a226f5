// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Thread Waiter
//!
//! [`Waiter`] backend for hosted builds: each OS thread owns one
//! [`ThreadWaiter`], reached through [`Waiter::current`]. Sleeping parks
//! the thread and waking unparks it, which gives the token semantics the
//! wait protocol relies on.
//!
//! Signals are simulated with a pending set: [`ThreadWaiter::interrupt`]
//! and [`ThreadWaiter::kill`] post a signal and unpark the owner. A posted
//! signal stays pending until [`ThreadWaiter::clear_signals`].

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, Thread};

use bitflags::bitflags;

use super::wait_queue::{TaskState, Waiter};

bitflags! {
    /// Signals pending on a thread
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Signals: u32 {
        /// Ordinary signal: aborts interruptible waits
        const INTERRUPT = 1 << 0;
        /// Fatal signal: aborts interruptible and killable waits
        const KILL = 1 << 1;
    }
}

impl Signals {
    /// Signals that abort a wait in `state`
    pub const fn honored_by(state: TaskState) -> Self {
        match state {
            TaskState::Uninterruptible => Signals::empty(),
            TaskState::Interruptible => Signals::all(),
            TaskState::Killable => Signals::KILL,
        }
    }
}

struct Inner {
    thread: Thread,
    pending: AtomicU32,
}

/// Handle to a parked-or-running OS thread
#[derive(Clone)]
pub struct ThreadWaiter {
    inner: Arc<Inner>,
}

thread_local! {
    static CURRENT: ThreadWaiter = ThreadWaiter {
        inner: Arc::new(Inner {
            thread: thread::current(),
            pending: AtomicU32::new(0),
        }),
    };
}

impl ThreadWaiter {
    /// Post an ordinary signal and kick the thread out of its sleep
    pub fn interrupt(&self) {
        self.post(Signals::INTERRUPT);
    }

    /// Post a fatal signal and kick the thread out of its sleep
    pub fn kill(&self) {
        self.post(Signals::KILL);
    }

    /// Signals currently pending
    pub fn pending(&self) -> Signals {
        Signals::from_bits_truncate(self.inner.pending.load(Ordering::Acquire))
    }

    /// Discard all pending signals
    pub fn clear_signals(&self) {
        self.inner.pending.store(0, Ordering::Release);
    }

    /// The thread this handle refers to
    pub fn thread(&self) -> &Thread {
        &self.inner.thread
    }

    fn post(&self, signals: Signals) {
        self.inner.pending.fetch_or(signals.bits(), Ordering::AcqRel);
        self.inner.thread.unpark();
    }
}

impl Waiter for ThreadWaiter {
    fn current() -> Self {
        CURRENT.with(Clone::clone)
    }

    fn sleep(&self, state: TaskState) {
        debug_assert_eq!(
            thread::current().id(),
            self.inner.thread.id(),
            "sleep() called on another thread's waiter"
        );
        if self.signal_pending(state) {
            return;
        }
        thread::park();
    }

    fn wake(&self) {
        self.inner.thread.unpark();
    }

    fn signal_pending(&self, state: TaskState) -> bool {
        self.pending().intersects(Signals::honored_by(state))
    }
}

impl core::fmt::Debug for ThreadWaiter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ThreadWaiter")
            .field("thread", &self.inner.thread.id())
            .field("pending", &self.pending())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_current_is_stable_per_thread() {
        let a = ThreadWaiter::current();
        let b = ThreadWaiter::current();
        assert!(Arc::ptr_eq(&a.inner, &b.inner));

        let other = thread::spawn(ThreadWaiter::current).join().unwrap();
        assert!(!Arc::ptr_eq(&a.inner, &other.inner));
    }

    #[test]
    fn test_wake_before_sleep_is_not_lost() {
        let waiter = ThreadWaiter::current();
        waiter.wake();
        // Returns at once thanks to the unpark token.
        waiter.sleep(TaskState::Uninterruptible);
    }

    #[test]
    fn test_signal_honored_by_state() {
        let waiter = ThreadWaiter::current();
        waiter.clear_signals();

        waiter.interrupt();
        assert!(waiter.signal_pending(TaskState::Interruptible));
        assert!(!waiter.signal_pending(TaskState::Killable));
        assert!(!waiter.signal_pending(TaskState::Uninterruptible));

        waiter.kill();
        assert!(waiter.signal_pending(TaskState::Killable));
        assert_eq!(waiter.pending(), Signals::INTERRUPT | Signals::KILL);

        waiter.clear_signals();
        assert!(waiter.pending().is_empty());
    }

    #[test]
    fn test_wake_resumes_sleeper() {
        let (tx, rx) = mpsc::channel();
        let sleeper = thread::spawn(move || {
            let me = ThreadWaiter::current();
            tx.send(me.clone()).unwrap();
            me.sleep(TaskState::Uninterruptible);
        });

        let handle = rx.recv().unwrap();
        handle.wake();
        sleeper.join().unwrap();
    }
}
