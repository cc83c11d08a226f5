// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Range Lock Guards
//!
//! RAII wrappers around [`RangeLock`]: the range is unlocked when the guard
//! goes out of scope.
//!
//! # Usage
//!
//! ```rust,ignore
//! let tree: RangeLockTree<ThreadWaiter> = RangeLockTree::new();
//!
//! let writer = tree.write(0, 4095)?;
//! // ... modify [0, 4095] ...
//! let reader = writer.downgrade();
//! // ... other readers may now run ...
//! drop(reader);
//! ```

use core::mem;

use crate::err::Result;
use crate::kernel::sync::range_lock::{RangeLock, RangeLockTree};
use crate::kernel::sync::wait_queue::Waiter;

/// Shared access to a range, released on drop
#[must_use = "the range is unlocked as soon as the guard is dropped"]
#[derive(Debug)]
pub struct RangeReadGuard<'a, W: Waiter> {
    tree: &'a RangeLockTree<W>,
    lock: RangeLock,
}

/// Exclusive access to a range, released on drop
#[must_use = "the range is unlocked as soon as the guard is dropped"]
#[derive(Debug)]
pub struct RangeWriteGuard<'a, W: Waiter> {
    tree: &'a RangeLockTree<W>,
    lock: RangeLock,
}

impl<W: Waiter> RangeLockTree<W> {
    /// Lock `[start, last]` for reading, sleeping until granted
    pub fn read(&self, start: u64, last: u64) -> Result<RangeReadGuard<'_, W>> {
        let mut lock = RangeLock::new(start, last)?;
        self.read_lock(&mut lock)?;
        Ok(RangeReadGuard { tree: self, lock })
    }

    /// Lock `[start, last]` for writing, sleeping until granted
    pub fn write(&self, start: u64, last: u64) -> Result<RangeWriteGuard<'_, W>> {
        let mut lock = RangeLock::new(start, last)?;
        self.write_lock(&mut lock)?;
        Ok(RangeWriteGuard { tree: self, lock })
    }

    /// Lock `[start, last]` for reading if that needs no wait
    pub fn try_read(&self, start: u64, last: u64) -> Option<RangeReadGuard<'_, W>> {
        let mut lock = RangeLock::new(start, last).ok()?;
        if self.read_trylock(&mut lock) {
            Some(RangeReadGuard { tree: self, lock })
        } else {
            None
        }
    }

    /// Lock `[start, last]` for writing if that needs no wait
    pub fn try_write(&self, start: u64, last: u64) -> Option<RangeWriteGuard<'_, W>> {
        let mut lock = RangeLock::new(start, last).ok()?;
        if self.write_trylock(&mut lock) {
            Some(RangeWriteGuard { tree: self, lock })
        } else {
            None
        }
    }
}

impl<'a, W: Waiter> RangeReadGuard<'a, W> {
    /// The locked range as `(start, last)`
    pub fn range(&self) -> (u64, u64) {
        (self.lock.start(), self.lock.last())
    }
}

impl<'a, W: Waiter> RangeWriteGuard<'a, W> {
    /// The locked range as `(start, last)`
    pub fn range(&self) -> (u64, u64) {
        (self.lock.start(), self.lock.last())
    }

    /// Keep the range but only for reading
    pub fn downgrade(mut self) -> RangeReadGuard<'a, W> {
        let mut lock = mem::replace(&mut self.lock, RangeLock::new_full());
        // Only fails if the guard does not hold its lock, which it always does.
        let _ = self.tree.downgrade_write(&mut lock);
        RangeReadGuard {
            tree: self.tree,
            lock,
        }
    }
}

impl<'a, W: Waiter> Drop for RangeReadGuard<'a, W> {
    fn drop(&mut self) {
        if self.lock.is_held() {
            let _ = self.tree.read_unlock(&mut self.lock);
        }
    }
}

impl<'a, W: Waiter> Drop for RangeWriteGuard<'a, W> {
    fn drop(&mut self) {
        if self.lock.is_held() {
            let _ = self.tree.write_unlock(&mut self.lock);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::kernel::sync::thread_waiter::ThreadWaiter;
    use crate::kernel::sync::RangeLockTree;

    #[test]
    fn test_guards_unlock_on_drop() {
        let tree: RangeLockTree<ThreadWaiter> = RangeLockTree::new();
        {
            let a = tree.read(0, 10).unwrap();
            let b = tree.read(5, 15).unwrap();
            assert_eq!(a.range(), (0, 10));
            assert_eq!(b.range(), (5, 15));
            assert!(tree.try_write(0, 0).is_none());
            assert_eq!(tree.len(), 2);
        }
        assert!(tree.is_empty());
        assert!(tree.try_write(0, 15).is_some());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_write_guard_downgrade() {
        let tree: RangeLockTree<ThreadWaiter> = RangeLockTree::new();
        let writer = tree.write(0, 10).unwrap();
        assert!(tree.try_read(5, 5).is_none());

        let reader = writer.downgrade();
        assert_eq!(reader.range(), (0, 10));
        let other = tree.try_read(5, 5);
        assert!(other.is_some());
        assert!(tree.try_write(5, 5).is_none());

        drop(other);
        drop(reader);
        assert!(tree.is_empty());
        tree.validate();
    }

    #[test]
    fn test_guard_rejects_reversed_range() {
        let tree: RangeLockTree<ThreadWaiter> = RangeLockTree::new();
        assert!(tree.read(10, 0).is_err());
        assert!(tree.try_write(10, 0).is_none());
    }
}
