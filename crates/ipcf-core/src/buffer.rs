//! Thread-safe growable request buffer with amortised reserve growth
//! (spec.md §4.5). One instance exists per request-type and per role (the
//! GET buffer, the SET buffer, and the client's PendingGET buffer are all
//! this same type parameterised over `T`).
//!
//! Grounded on `examples/original_source/IPCFile.h`'s `FRequestBuffer`
//! (reserve-size * multiplier growth under a spin-lock, atomic size
//! counter readable without locking) and on the teacher's `sync::RwCell`
//! for the `UnsafeCell` + atomic-guard + explicit `unsafe impl Send/Sync`
//! shape used to give lock-free readers access to atomic counters while
//! the vector itself stays behind the spin-lock.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::request::RequestShape;
use crate::spinlock::{BackoffMode, SpinLock};

pub const BUFFER_MAX: usize = 65536;

pub struct Buffer<T> {
    reserved: usize,
    multiplier: AtomicUsize,
    count: AtomicUsize,
    lock: SpinLock,
    items: UnsafeCell<Vec<T>>,
}

unsafe impl<T: Send> Send for Buffer<T> {}
unsafe impl<T: Send> Sync for Buffer<T> {}

impl<T> Buffer<T> {
    pub fn new() -> Self {
        Self::with_reserve(BUFFER_MAX)
    }

    pub fn with_reserve(reserved: usize) -> Self {
        Buffer {
            reserved,
            multiplier: AtomicUsize::new(1),
            count: AtomicUsize::new(0),
            lock: SpinLock::new(BackoffMode::Sleep),
            items: UnsafeCell::new(Vec::with_capacity(reserved)),
        }
    }

    /// Current element count; an atomic read, safe without the lock.
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current growth multiplier; an atomic read, safe without the lock.
    pub fn multiplier(&self) -> usize {
        self.multiplier.load(Ordering::Acquire)
    }

    pub fn reserved(&self) -> usize {
        self.reserved
    }

    /// Append `item`. Fails only if `item.is_empty()` (the manager is
    /// expected to have already filtered this). When `count` would exceed
    /// `reserved * multiplier`, the multiplier advances and the backing
    /// vector is reserved to the new capacity before the append, all
    /// under the same lock acquisition.
    pub fn push(&self, item: T) -> bool
    where
        T: RequestShape,
    {
        if item.is_empty() {
            return false;
        }
        self.lock.guarded(|| {
            let items = unsafe { &mut *self.items.get() };
            if items.len() + 1 > self.reserved * self.multiplier.load(Ordering::Relaxed) {
                let new_multiplier = self.multiplier.fetch_add(1, Ordering::AcqRel) + 1;
                let target = self.reserved * new_multiplier;
                // `reserve` is relative to `len`, not `capacity` — Vec's own
                // amortized growth can already have left `capacity()` ahead
                // of `target` from an earlier step, so subtracting
                // `items.capacity()` here would underflow. Sizing off `len`
                // keeps this a no-op whenever the vector is already big
                // enough.
                items.reserve(target.saturating_sub(items.len()));
            }
            items.push(item);
            self.count.fetch_add(1, Ordering::AcqRel);
        });
        true
    }

    /// Empty the buffer and shrink the reservation back to `reserved * 1`.
    pub fn clear(&self) {
        self.lock.guarded(|| {
            let items = unsafe { &mut *self.items.get() };
            items.clear();
            items.shrink_to(self.reserved);
            self.count.store(0, Ordering::Release);
            self.multiplier.store(1, Ordering::Release);
        });
    }

    /// Expose the internal lock for a compound traversal (e.g.
    /// encode-then-clear) that must be atomic with respect to concurrent
    /// pushes. `f` sees the current contents and may mutate them; it must
    /// not block on anything that could itself try to push (that would
    /// deadlock against this same lock).
    pub fn guarded<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        self.lock.guarded(|| {
            let items = unsafe { &mut *self.items.get() };
            f(items)
        })
    }

    /// Remove and return the first item matching `predicate`, if any,
    /// keeping `count` in sync. Used by pending-GET correlation, which
    /// needs point removal rather than a full drain.
    pub fn remove_first<F>(&self, mut predicate: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        self.lock.guarded(|| {
            let items = unsafe { &mut *self.items.get() };
            let pos = items.iter().position(|item| predicate(item))?;
            self.count.fetch_sub(1, Ordering::AcqRel);
            Some(items.remove(pos))
        })
    }

    /// Atomically snapshot-and-clear: hands `f` a read-only view of every
    /// currently buffered item, then clears the buffer before releasing
    /// the lock, so no push interleaves between the read and the clear.
    pub fn drain_with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        self.lock.guarded(|| {
            let items = unsafe { &mut *self.items.get() };
            let result = f(items);
            items.clear();
            items.shrink_to(self.reserved);
            self.count.store(0, Ordering::Release);
            self.multiplier.store(1, Ordering::Release);
            result
        })
    }
}

impl<T> Default for Buffer<T> {
    fn default() -> Self {
        Self::new()
    }
}
