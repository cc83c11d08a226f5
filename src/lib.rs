// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Rustux Range Locks
//!
//! Reader/writer locks over sub-ranges of one address space (byte ranges
//! of a file, pages of a mapping, keys of an index). Locks on disjoint
//! ranges proceed in parallel; overlapping requests are granted strictly in
//! arrival order, except that readers share.
//!
//! # Features
//!
//! - `std` (default): hosted build with [`ThreadWaiter`]; without it the
//!   crate is `no_std` and only needs `alloc`
//! - `logging` (default): route diagnostics through the `log` facade
//!
//! # Usage
//!
//! ```rust
//! use rangelock::{RangeLock, RangeLockTree, ThreadWaiter};
//!
//! let tree: RangeLockTree<ThreadWaiter> = RangeLockTree::new();
//!
//! let mut head = RangeLock::new(0, 4095).unwrap();
//! let mut tail = RangeLock::new(4096, 8191).unwrap();
//! tree.write_lock(&mut head).unwrap();
//! tree.write_lock(&mut tail).unwrap();
//!
//! tree.write_unlock(&mut head).unwrap();
//! tree.write_unlock(&mut tail).unwrap();
//! assert!(tree.is_empty());
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

pub mod err;
pub mod kernel;

// Re-exports
pub use err::{Error, Result};
pub use kernel::lib::interval_tree::{IntervalNode, IntervalTree, NodeId};
pub use kernel::sync::{
    RangeLock, RangeLockInfo, RangeLockMode, RangeLockState, RangeLockTree, RangeReadGuard,
    RangeWriteGuard, TaskState, WakeQueue, Waiter, RANGE_FULL,
};

#[cfg(any(test, feature = "std"))]
pub use kernel::sync::{Signals, ThreadWaiter};
