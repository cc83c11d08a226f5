// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Rustux Kernel Test Suite
//!
//! Multi-threaded tests for the synchronization primitives. Unit tests for
//! each primitive live next to it; the suites here run real OS threads
//! through [`ThreadWaiter`] and check what the primitives promise across
//! threads.
//!
//! # Organization
//!
//! - [`range_lock_tests`] - Exclusion, fairness, downgrade and signal tests
//! - [`alloc_checker_tests`] - Heap use of the lock and release paths
//!
//! # Running Tests
//!
//! ```text
//! cargo test --lib kernel::tests
//! ```
//!
//! [`ThreadWaiter`]: crate::kernel::sync::ThreadWaiter

pub mod alloc_checker_tests;

use std::thread;
use std::time::{Duration, Instant};

/// How long a suite waits for another thread before giving up
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Poll `cond` until it holds, panicking after [`TEST_TIMEOUT`]
pub fn wait_until<F: FnMut() -> bool>(what: &str, mut cond: F) {
    let deadline = Instant::now() + TEST_TIMEOUT;
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for {}", what);
        thread::sleep(Duration::from_millis(1));
    }
}
