// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Range Locks
//!
//! This module provides reader/writer locks over sub-ranges of a single
//! address space. Requests on disjoint ranges never wait for each other;
//! requests on overlapping ranges are serialized unless both are readers.
//!
//! # Design
//!
//! - **One tree, one guard**: every pending and granted range sits in an
//!   [`IntervalTree`] protected by a single spinlock. The guard is held only
//!   for bounded tree work and never across a sleep.
//! - **Blocking count**: on insertion a request counts the conflicting
//!   ranges already in the tree, granted or waiting. The count only ever
//!   goes down afterwards; the request is granted when it reaches zero.
//! - **No lock stealing**: because waiting requests are counted too, a
//!   request can never be granted ahead of an earlier conflicting one.
//!   There is no FIFO queue; ordering falls out of the counts.
//! - **Cascading wakeup**: removing a range decrements every later
//!   conflicting range it overlaps and wakes the ones that reach zero. An
//!   interrupted wait goes through the same path as an unlock.
//! - **Nothing slow under the guard**: granted owners go into a wake queue
//!   whose space was reserved when they started waiting, and are woken once
//!   the guard is dropped. Log output is also produced outside the guard.
//!
//! # Usage
//!
//! ```rust,ignore
//! let tree: RangeLockTree<ThreadWaiter> = RangeLockTree::new();
//! let mut lock = RangeLock::new(0, 4095)?;
//!
//! tree.write_lock(&mut lock)?;
//! // ... modify [0, 4095] ...
//! tree.downgrade_write(&mut lock)?;
//! // ... other readers of [0, 4095] may now run ...
//! tree.read_unlock(&mut lock)?;
//! ```

use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

use spin::Mutex;

use crate::err::{Error, Result};
use crate::kernel::lib::interval_tree::{IntervalNode, IntervalTree, NodeId};
use crate::kernel::sync::wait_queue::{TaskState, WakeQueue, Waiter};

// Import logging macros
use crate::{log_debug, log_trace, log_warn};

/// Last point of the full range
pub const RANGE_FULL: u64 = u64::MAX;

/// Source of tree identities, so a lock cannot be unlocked on a tree it
/// was never inserted into
static TREE_IDS: AtomicU64 = AtomicU64::new(1);

/// ============================================================================
/// Modes and States
/// ============================================================================

/// Access mode of a range lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeLockMode {
    /// Shared access
    Read,

    /// Exclusive access
    Write,
}

impl RangeLockMode {
    /// Whether two overlapping requests in these modes exclude each other
    ///
    /// Only two readers may share a range.
    #[inline]
    pub const fn conflicts(self, other: Self) -> bool {
        !matches!((self, other), (RangeLockMode::Read, RangeLockMode::Read))
    }
}

/// Lifecycle of a range lock request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeLockState {
    /// Not in any tree
    Released,

    /// In the tree, blocked by earlier conflicting ranges
    Waiting,

    /// In the tree and granted
    Granted,
}

/// ============================================================================
/// Range Lock
/// ============================================================================

/// Where a range lock sits while it is in a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Link {
    tree: u64,
    generation: u64,
    node: NodeId,
    seqnum: u64,
}

/// A range lock request, owned by the caller
///
/// The same `RangeLock` can be locked and unlocked repeatedly; it must be
/// unlocked before it is locked again.
#[derive(Debug)]
pub struct RangeLock {
    start: u64,
    last: u64,
    mode: RangeLockMode,
    state: RangeLockState,
    link: Option<Link>,
}

impl RangeLock {
    /// Create a lock request covering `[start, last]`
    ///
    /// # Returns
    ///
    /// `Err(Error::InvalidArgs)` if `start > last`
    pub fn new(start: u64, last: u64) -> Result<Self> {
        if start > last {
            return Err(Error::InvalidArgs);
        }
        Ok(Self {
            start,
            last,
            mode: RangeLockMode::Read,
            state: RangeLockState::Released,
            link: None,
        })
    }

    /// Create a lock request covering `[0, RANGE_FULL]`
    pub const fn new_full() -> Self {
        Self {
            start: 0,
            last: RANGE_FULL,
            mode: RangeLockMode::Read,
            state: RangeLockState::Released,
            link: None,
        }
    }

    /// Re-target a released lock request to `[start, last]`
    pub fn init(&mut self, start: u64, last: u64) -> Result {
        if self.link.is_some() {
            return Err(Error::InvalidState);
        }
        *self = Self::new(start, last)?;
        Ok(())
    }

    /// Re-target a released lock request to the full range
    pub fn init_full(&mut self) -> Result {
        if self.link.is_some() {
            return Err(Error::InvalidState);
        }
        *self = Self::new_full();
        Ok(())
    }

    /// First point covered
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last point covered (inclusive)
    pub fn last(&self) -> u64 {
        self.last
    }

    /// Mode of the current or most recent acquisition
    pub fn mode(&self) -> RangeLockMode {
        self.mode
    }

    /// Lifecycle state as seen by the owner
    pub fn state(&self) -> RangeLockState {
        self.state
    }

    /// Check if the lock is currently granted
    pub fn is_held(&self) -> bool {
        self.state == RangeLockState::Granted
    }

    /// Check if `[start, last]` overlaps `other`
    pub fn overlaps(&self, other: &RangeLock) -> bool {
        self.start <= other.last && other.start <= self.last
    }

    fn release_link(&mut self) {
        self.link = None;
        self.state = RangeLockState::Released;
    }
}

/// Read-only view of one request in a tree, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeLockInfo {
    /// First point covered
    pub start: u64,
    /// Last point covered (inclusive)
    pub last: u64,
    /// Current mode
    pub mode: RangeLockMode,
    /// Waiting or granted
    pub state: RangeLockState,
    /// Earlier conflicting ranges still in the tree
    pub blocking_ranges: u32,
    /// Insertion order
    pub seqnum: u64,
}

/// ============================================================================
/// Range Lock Tree
/// ============================================================================

/// Per-request bookkeeping kept in the tree
struct RangeNode<W> {
    mode: RangeLockMode,
    owner: W,
    blocking_ranges: u32,
    state: RangeLockState,
}

/// Everything the guard protects
struct TreeInner<W: Waiter> {
    root: IntervalTree<RangeNode<W>>,
    seqnum: u64,
    /// Requests currently in `Waiting`
    waiting: usize,
    /// Granted owners not yet woken; always has room for `waiting` more
    wake_q: WakeQueue<W>,
}

/// Why a lock could not be resolved to a granted node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Misuse {
    Unlinked,
    Foreign,
    Orphaned,
    NotGranted,
}

/// A set of range locks over one address space
///
/// `W` is the host's handle for suspending and resuming the owner of a
/// request.
pub struct RangeLockTree<W: Waiter> {
    id: u64,
    /// Bumped by [`RangeLockTree::init`]; links from older generations are
    /// orphans
    generation: u64,
    inner: Mutex<TreeInner<W>>,
}

impl<W: Waiter> RangeLockTree<W> {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty tree with storage for `capacity` concurrent requests
    ///
    /// Up to `capacity` requests can then be locked, waited on and released
    /// without allocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id: TREE_IDS.fetch_add(1, Ordering::Relaxed),
            generation: 0,
            inner: Mutex::new(TreeInner {
                root: IntervalTree::with_capacity(capacity),
                seqnum: 0,
                waiting: 0,
                wake_q: WakeQueue::with_capacity(capacity),
            }),
        }
    }

    /// Reset to an empty tree
    ///
    /// Requests still linked to the old contents are orphaned: unlocking
    /// them reports `Error::InvalidState` and leaves them released, ready to
    /// be locked again.
    pub fn init(&mut self) {
        let inner = self.inner.get_mut();
        if !inner.root.is_empty() {
            log_warn!("range lock tree reset with {} ranges present", inner.root.len());
        }
        inner.wake_q.wake_all();
        inner.root.clear();
        inner.seqnum = 0;
        inner.waiting = 0;
        self.generation += 1;
    }

    // ------------------------------------------------------------------------
    // Readers
    // ------------------------------------------------------------------------

    /// Acquire `lock` for reading, sleeping until granted
    pub fn read_lock(&self, lock: &mut RangeLock) -> Result {
        self.lock_common(lock, RangeLockMode::Read, TaskState::Uninterruptible)
    }

    /// Acquire `lock` for reading; any pending signal aborts the wait
    pub fn read_lock_interruptible(&self, lock: &mut RangeLock) -> Result {
        self.lock_common(lock, RangeLockMode::Read, TaskState::Interruptible)
    }

    /// Acquire `lock` for reading; a fatal signal aborts the wait
    pub fn read_lock_killable(&self, lock: &mut RangeLock) -> Result {
        self.lock_common(lock, RangeLockMode::Read, TaskState::Killable)
    }

    /// Acquire `lock` for reading only if that needs no wait
    pub fn read_trylock(&self, lock: &mut RangeLock) -> bool {
        self.trylock_common(lock, RangeLockMode::Read)
    }

    /// Release a read lock
    pub fn read_unlock(&self, lock: &mut RangeLock) -> Result {
        self.unlock_common(lock, RangeLockMode::Read)
    }

    // ------------------------------------------------------------------------
    // Writers
    // ------------------------------------------------------------------------

    /// Acquire `lock` for writing, sleeping until granted
    pub fn write_lock(&self, lock: &mut RangeLock) -> Result {
        self.lock_common(lock, RangeLockMode::Write, TaskState::Uninterruptible)
    }

    /// Acquire `lock` for writing; any pending signal aborts the wait
    pub fn write_lock_interruptible(&self, lock: &mut RangeLock) -> Result {
        self.lock_common(lock, RangeLockMode::Write, TaskState::Interruptible)
    }

    /// Acquire `lock` for writing; a fatal signal aborts the wait
    pub fn write_lock_killable(&self, lock: &mut RangeLock) -> Result {
        self.lock_common(lock, RangeLockMode::Write, TaskState::Killable)
    }

    /// Acquire `lock` for writing only if that needs no wait
    pub fn write_trylock(&self, lock: &mut RangeLock) -> bool {
        self.trylock_common(lock, RangeLockMode::Write)
    }

    /// Release a write lock
    pub fn write_unlock(&self, lock: &mut RangeLock) -> Result {
        self.unlock_common(lock, RangeLockMode::Write)
    }

    /// Turn a granted write lock into a read lock without releasing it
    ///
    /// Later readers that were only waiting on this writer are granted.
    pub fn downgrade_write(&self, lock: &mut RangeLock) -> Result {
        let resolved = {
            let mut inner = self.inner.lock();
            self.granted_link(&inner, lock, RangeLockMode::Write)
                .map(|link| inner.downgrade(link))
        };
        let granted = match resolved {
            Ok(granted) => granted,
            Err(misuse) => return Err(self.report(lock, RangeLockMode::Write, misuse)),
        };

        lock.mode = RangeLockMode::Read;
        log_debug!(
            "range [{:#x}, {:#x}] downgraded, waking {}",
            lock.start,
            lock.last,
            granted
        );
        if granted > 0 {
            self.flush_wakeups();
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Check whether any request, granted or waiting, overlaps `[start, last]`
    pub fn is_locked(&self, start: u64, last: u64) -> bool {
        self.inner.lock().root.overlaps(start, last)
    }

    /// Number of requests in the tree
    pub fn len(&self) -> usize {
        self.inner.lock().root.len()
    }

    /// Check if the tree holds no requests
    pub fn is_empty(&self) -> bool {
        self.inner.lock().root.is_empty()
    }

    /// Copy out every request, ordered by `(start, seqnum)`
    pub fn snapshot(&self) -> Vec<RangeLockInfo> {
        let inner = self.inner.lock();
        let mut infos = Vec::with_capacity(inner.root.len());
        inner.root.for_each(|_, node| infos.push(info(node)));
        infos
    }

    /// Log every request in the tree
    pub fn dump(&self) {
        let infos = self.snapshot();
        log_debug!("range lock tree: {} ranges", infos.len());
        for node in &infos {
            log_debug!(
                "  [{:#x}, {:#x}] {:?} {:?} blocking={} seq={}",
                node.start,
                node.last,
                node.mode,
                node.state,
                node.blocking_ranges,
                node.seqnum
            );
        }
    }

    /// Check the tree and every blocking count
    ///
    /// Panics unless the interval tree is well formed and each request's
    /// blocking count equals the number of earlier, overlapping,
    /// conflicting requests still present, with exactly the zero-count
    /// requests granted.
    pub fn validate(&self) {
        let inner = self.inner.lock();
        inner.root.validate();

        let mut waiting = 0;
        inner.root.for_each(|_, node| {
            let mode = node.value().mode;
            let mut expected = 0u32;
            inner.root.for_each_overlap(node.start(), node.last(), |_, other| {
                if other.seq() < node.seq() && other.value().mode.conflicts(mode) {
                    expected += 1;
                }
            });

            assert!(node.seq() < inner.seqnum, "range lock: seqnum from the future");
            assert_eq!(
                node.value().blocking_ranges,
                expected,
                "range lock: blocking count of [{:#x}, {:#x}] drifted",
                node.start(),
                node.last()
            );
            let state = if expected == 0 {
                RangeLockState::Granted
            } else {
                waiting += 1;
                RangeLockState::Waiting
            };
            assert_eq!(node.value().state, state, "range lock: state out of sync");
        });

        assert_eq!(inner.waiting, waiting, "range lock: waiting count drifted");
        assert!(
            inner.wake_q.capacity() >= inner.wake_q.len() + inner.waiting,
            "range lock: wake queue cannot take every waiter"
        );
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Insert `lock` and count its blockers
    ///
    /// # Returns
    ///
    /// Whether the request was granted on the spot
    pub(crate) fn insert(&self, lock: &mut RangeLock, mode: RangeLockMode, owner: W) -> Result<bool> {
        if lock.link.is_some() {
            log_warn!(
                "range [{:#x}, {:#x}] locked again before unlock",
                lock.start,
                lock.last
            );
            return Err(Error::InvalidState);
        }

        let (seqnum, blocking_ranges) = {
            let mut inner = self.inner.lock();
            let blocking_ranges = inner.blocking_ranges(lock.start, lock.last, mode);
            (self.link(&mut inner, lock, mode, owner, blocking_ranges)?, blocking_ranges)
        };

        log_trace!(
            "range [{:#x}, {:#x}] {:?} inserted seq={} blocking={}",
            lock.start,
            lock.last,
            mode,
            seqnum,
            blocking_ranges
        );
        Ok(blocking_ranges == 0)
    }

    /// Stamp and insert a node for `lock`
    ///
    /// Every allocation happens before the tree changes.
    ///
    /// # Returns
    ///
    /// The sequence number given to the node
    fn link(
        &self,
        inner: &mut TreeInner<W>,
        lock: &mut RangeLock,
        mode: RangeLockMode,
        owner: W,
        blocking_ranges: u32,
    ) -> Result<u64> {
        let seqnum = inner.seqnum;
        let state = if blocking_ranges == 0 {
            RangeLockState::Granted
        } else {
            // Room for this owner once a release grants it.
            let additional = inner.waiting + 1;
            inner
                .wake_q
                .try_reserve(additional)
                .map_err(|_| Error::NoMemory)?;
            RangeLockState::Waiting
        };
        let node = RangeNode {
            mode,
            owner,
            blocking_ranges,
            state,
        };

        let node = inner
            .root
            .insert(lock.start, lock.last, seqnum, node)
            .map_err(|_| Error::NoMemory)?;
        inner.seqnum += 1;
        if state == RangeLockState::Waiting {
            inner.waiting += 1;
        }

        lock.link = Some(Link {
            tree: self.id,
            generation: self.generation,
            node,
            seqnum,
        });
        lock.mode = mode;
        lock.state = state;
        Ok(seqnum)
    }

    fn lock_common(&self, lock: &mut RangeLock, mode: RangeLockMode, state: TaskState) -> Result {
        let owner = W::current();
        if self.insert(lock, mode, owner.clone())? {
            return Ok(());
        }

        log_debug!(
            "range [{:#x}, {:#x}] {:?} waiting",
            lock.start,
            lock.last,
            mode
        );
        self.wait(lock, &owner, state)
    }

    /// Sleep until `lock` is granted or a signal honored by `state` arrives
    pub(crate) fn wait(&self, lock: &mut RangeLock, owner: &W, state: TaskState) -> Result {
        let link = lock.link.ok_or(Error::InvalidState)?;

        loop {
            {
                let mut inner = self.inner.lock();
                let granted = match inner.root.get(link.node) {
                    Some(node) if self.owns(link) && node.seq() == link.seqnum => {
                        node.value().state == RangeLockState::Granted
                    }
                    _ => {
                        // The tree was reset underneath us.
                        lock.release_link();
                        return Err(Error::InvalidState);
                    }
                };

                if granted {
                    lock.state = RangeLockState::Granted;
                    return Ok(());
                }

                if state.is_interruptible() && owner.signal_pending(state) {
                    let granted = inner.remove(link);
                    drop(inner);

                    lock.release_link();
                    log_debug!(
                        "range [{:#x}, {:#x}] wait interrupted, waking {}",
                        lock.start,
                        lock.last,
                        granted
                    );
                    if granted > 0 {
                        self.flush_wakeups();
                    }
                    return Err(Error::Interrupted);
                }
            }

            owner.sleep(state);
        }
    }

    fn trylock_common(&self, lock: &mut RangeLock, mode: RangeLockMode) -> bool {
        if lock.link.is_some() {
            log_warn!(
                "range [{:#x}, {:#x}] trylocked again before unlock",
                lock.start,
                lock.last
            );
            return false;
        }

        let linked = {
            let mut inner = self.inner.lock();
            if inner.blocking_ranges(lock.start, lock.last, mode) != 0 {
                return false;
            }
            self.link(&mut inner, lock, mode, W::current(), 0)
        };

        match linked {
            Ok(seqnum) => {
                log_trace!(
                    "range [{:#x}, {:#x}] {:?} trylocked seq={}",
                    lock.start,
                    lock.last,
                    mode,
                    seqnum
                );
                true
            }
            Err(_) => false,
        }
    }

    fn unlock_common(&self, lock: &mut RangeLock, mode: RangeLockMode) -> Result {
        let resolved = {
            let mut inner = self.inner.lock();
            self.granted_link(&inner, lock, mode)
                .map(|link| inner.remove(link))
        };
        let granted = match resolved {
            Ok(granted) => granted,
            Err(misuse) => return Err(self.report(lock, mode, misuse)),
        };

        lock.release_link();
        log_trace!(
            "range [{:#x}, {:#x}] {:?} unlocked, waking {}",
            lock.start,
            lock.last,
            mode,
            granted
        );
        if granted > 0 {
            self.flush_wakeups();
        }
        Ok(())
    }

    /// Whether `link` was made by this tree since its last reset
    fn owns(&self, link: Link) -> bool {
        link.tree == self.id && link.generation == self.generation
    }

    /// Resolve `lock` to its node, which must be granted in `mode`
    fn granted_link(
        &self,
        inner: &TreeInner<W>,
        lock: &RangeLock,
        mode: RangeLockMode,
    ) -> core::result::Result<Link, Misuse> {
        let link = match lock.link {
            None => return Err(Misuse::Unlinked),
            Some(link) if link.tree != self.id => return Err(Misuse::Foreign),
            Some(link) if link.generation != self.generation => return Err(Misuse::Orphaned),
            Some(link) => link,
        };

        match inner.root.get(link.node) {
            Some(node)
                if node.seq() == link.seqnum
                    && node.value().state == RangeLockState::Granted
                    && node.value().mode == mode =>
            {
                Ok(link)
            }
            _ => Err(Misuse::NotGranted),
        }
    }

    /// Log a rejected unlock or downgrade; the guard must not be held
    fn report(&self, lock: &mut RangeLock, mode: RangeLockMode, misuse: Misuse) -> Error {
        match misuse {
            Misuse::Unlinked => {
                log_warn!("range [{:#x}, {:#x}] is not locked", lock.start, lock.last);
            }
            Misuse::Foreign => {
                log_warn!(
                    "range [{:#x}, {:#x}] is linked to another tree",
                    lock.start,
                    lock.last
                );
            }
            Misuse::Orphaned => {
                log_warn!(
                    "range [{:#x}, {:#x}] was orphaned by a tree reset",
                    lock.start,
                    lock.last
                );
                lock.release_link();
            }
            Misuse::NotGranted => {
                log_warn!(
                    "range [{:#x}, {:#x}] is not granted for {:?}",
                    lock.start,
                    lock.last,
                    mode
                );
            }
        }
        Error::InvalidState
    }

    /// Wake the owners queued by a cascade
    ///
    /// Each owner is taken out under its own short guard hold, so nothing is
    /// allocated and no wakeup runs under the guard. Owners queued by a
    /// concurrent release may be woken here too.
    fn flush_wakeups(&self) {
        loop {
            let owner = self.inner.lock().wake_q.pop();
            match owner {
                Some(owner) => owner.wake(),
                None => break,
            }
        }
    }
}

impl<W: Waiter> Default for RangeLockTree<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Waiter> core::fmt::Debug for RangeLockTree<W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("RangeLockTree")
            .field("ranges", &inner.root.len())
            .field("waiting", &inner.waiting)
            .field("seqnum", &inner.seqnum)
            .finish()
    }
}

impl<W: Waiter> TreeInner<W> {
    /// Number of present ranges overlapping `[start, last]` that conflict
    /// with `mode`
    fn blocking_ranges(&self, start: u64, last: u64, mode: RangeLockMode) -> u32 {
        let mut count = 0;
        self.root.for_each_overlap(start, last, |_, node| {
            if node.value().mode.conflicts(mode) {
                count += 1;
            }
        });
        count
    }

    /// Unlink a node and release every later request it was blocking
    ///
    /// Every path that takes a node out of the tree goes through here.
    ///
    /// # Returns
    ///
    /// Number of owners granted and queued for wakeup
    fn remove(&mut self, link: Link) -> usize {
        let (start, last) = match self.root.get(link.node) {
            Some(node) => (node.start(), node.last()),
            None => return 0,
        };
        let removed = match self.root.remove(link.node) {
            Some(removed) => removed,
            None => return 0,
        };
        if removed.state == RangeLockState::Waiting {
            self.waiting -= 1;
        }

        let Self {
            root,
            waiting,
            wake_q,
            ..
        } = self;
        let mut granted = 0;
        root.for_each_overlap_mut(start, last, |_, blocked| {
            if blocked.seq() > link.seqnum
                && blocked.value().mode.conflicts(removed.mode)
                && put_blocked(blocked.value_mut(), waiting, wake_q)
            {
                granted += 1;
            }
        });
        granted
    }

    /// Switch a granted writer to read and release the later readers it was
    /// blocking
    ///
    /// # Returns
    ///
    /// Number of owners granted and queued for wakeup
    fn downgrade(&mut self, link: Link) -> usize {
        let Self {
            root,
            waiting,
            wake_q,
            ..
        } = self;
        let (start, last) = match root.get_mut(link.node) {
            Some(node) => {
                node.value_mut().mode = RangeLockMode::Read;
                (node.start(), node.last())
            }
            None => return 0,
        };

        let mut granted = 0;
        root.for_each_overlap_mut(start, last, |_, blocked| {
            if blocked.seq() > link.seqnum
                && blocked.value().mode == RangeLockMode::Read
                && put_blocked(blocked.value_mut(), waiting, wake_q)
            {
                granted += 1;
            }
        });
        granted
    }
}

/// Drop one blocker from `node`, granting it when none remain
///
/// # Returns
///
/// Whether the node was granted and its owner queued
fn put_blocked<W: Waiter>(
    node: &mut RangeNode<W>,
    waiting: &mut usize,
    wake_q: &mut WakeQueue<W>,
) -> bool {
    debug_assert!(node.blocking_ranges > 0, "blocking count underflow");
    node.blocking_ranges = node.blocking_ranges.saturating_sub(1);

    if node.blocking_ranges == 0 && node.state == RangeLockState::Waiting {
        node.state = RangeLockState::Granted;
        *waiting -= 1;
        // Space was reserved when the node was inserted.
        wake_q.add(node.owner.clone());
        return true;
    }
    false
}

fn info<W>(node: &IntervalNode<RangeNode<W>>) -> RangeLockInfo {
    RangeLockInfo {
        start: node.start(),
        last: node.last(),
        mode: node.value().mode,
        state: node.value().state,
        blocking_ranges: node.value().blocking_ranges,
        seqnum: node.seq(),
    }
}

// ============================================================================
// Tests
// ============================================================================
