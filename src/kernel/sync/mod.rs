// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Kernel Synchronization Primitives
//!
//! This module provides the range lock and the wait primitives it is built
//! on.
//!
//! # Primitives
//!
//! - **Range Lock**: Fair reader/writer lock over sub-ranges of an address space
//! - **Range Lock Guards**: RAII wrappers that unlock on drop
//! - **Wait Queue**: The `Waiter` seam to the host scheduler, and deferred wakeups
//! - **Thread Waiter**: `Waiter` backed by OS threads (hosted builds)
//!
//! # Design
//!
//! The primitives never block on their own. They sleep and wake owners
//! through [`Waiter`], so the same lock works on top of kernel threads,
//! OS threads, or any scheduler that can park and unpark a context.

pub mod range_lock;
pub mod range_lock_guard;
pub mod wait_queue;

#[cfg(any(test, feature = "std"))]
pub mod thread_waiter;

// Re-exports
pub use range_lock::*;
pub use range_lock_guard::*;
pub use wait_queue::*;

#[cfg(any(test, feature = "std"))]
pub use thread_waiter::*;
