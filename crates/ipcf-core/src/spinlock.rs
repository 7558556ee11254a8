//! Test-and-set spin-lock with a runtime-selectable back-off (spec.md
//! §4.4). Grounded on the fail-fast atomic guard pattern in the teacher's
//! `sync::RwCell` (compare-and-swap plus a guard that releases on every
//! exit path) and on `examples/original_source/IPCFile.h`'s
//! `FSpinLoop<bShouldUseSleep>`, which picks sleep vs. pause back-off at
//! compile time; here it's a runtime field so one process can hold both a
//! buffer lock (sleep mode, rare contention, long critical section) and a
//! fast-path counter guard (pause mode) without two monomorphized types.

use std::hint;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

const SLEEP_BACKOFF: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffMode {
    /// Sleep a fixed short interval between failed acquires. Used for
    /// buffer locks where contention is rare but hold time may include
    /// reallocation.
    Sleep,
    /// Spin with a CPU relaxation hint. Used for very short critical
    /// sections such as incrementing a counter.
    Pause,
}

pub struct SpinLock {
    flag: AtomicBool,
    mode: BackoffMode,
}

impl SpinLock {
    pub fn new(mode: BackoffMode) -> Self {
        SpinLock {
            flag: AtomicBool::new(false),
            mode,
        }
    }

    /// Block until acquisition. Not reentrant.
    pub fn lock(&self) {
        loop {
            if self.flag.compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed).is_ok() {
                return;
            }
            while self.flag.load(Ordering::Relaxed) {
                match self.mode {
                    BackoffMode::Sleep => thread::sleep(SLEEP_BACKOFF),
                    BackoffMode::Pause => hint::spin_loop(),
                }
            }
        }
    }

    /// Acquire without blocking; `true` on success.
    pub fn try_lock(&self) -> bool {
        !self.flag.load(Ordering::Relaxed)
            && self.flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed).is_ok()
    }

    /// Release with release ordering.
    pub fn unlock(&self) {
        self.flag.store(false, Ordering::Release);
    }

    /// Run `f` between `lock` and `unlock`, guaranteeing release on every
    /// exit path including unwind.
    pub fn guarded<R>(&self, f: impl FnOnce() -> R) -> R {
        self.lock();
        let _guard = ReleaseOnDrop(self);
        f()
    }
}

struct ReleaseOnDrop<'a>(&'a SpinLock);

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        self.0.unlock();
    }
}
