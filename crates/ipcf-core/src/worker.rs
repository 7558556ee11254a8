//! Fixed-tick cooperative worker loop (spec.md §4.6).
//!
//! The original detaches its tick thread and never joins it
//! (`examples/original_source/IPCFile.h`'s `FBufferThread::StartThread`).
//! Per spec.md §9 ("replace detached thread with an owned thread handle
//! that shutdown can join"), `Worker` keeps the `JoinHandle` so `stop`
//! can actually wait for the loop to notice `stop_requested` rather than
//! just setting a flag and hoping.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub const DEFAULT_TICK_RATE: u64 = 8;

pub fn tick_interval(tick_rate: u64) -> Duration {
    Duration::from_millis(1000 / tick_rate.max(1))
}

struct SharedState {
    running: AtomicBool,
    stop_requested: AtomicBool,
}

/// One worker loop, driving a single directional concern (a GET-flush, a
/// SET-poll, etc.). Cancellation is cooperative: a tick already in flight
/// completes before `stop` returns.
pub struct Worker {
    state: Arc<SharedState>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn the loop: check `stop_requested`, invoke `tick` once, sleep
    /// for `1000 / tick_rate` ms, repeat.
    pub fn spawn(tick_rate: u64, mut tick: impl FnMut() + Send + 'static) -> Self {
        let state = Arc::new(SharedState {
            running: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
        });
        let interval = tick_interval(tick_rate);
        let loop_state = Arc::clone(&state);
        let handle = thread::spawn(move || {
            loop_state.running.store(true, Ordering::Release);
            loop {
                if loop_state.stop_requested.load(Ordering::Acquire) {
                    break;
                }
                tick();
                thread::sleep(interval);
            }
            loop_state.running.store(false, Ordering::Release);
        });
        Worker {
            state,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::Acquire)
    }

    /// Request the loop to stop and block (busy-sleeping every 10 ms,
    /// per spec.md §4.6) until it has actually joined.
    pub fn stop(&mut self) {
        self.state.stop_requested.store(true, Ordering::Release);
        while self.state.running.load(Ordering::Acquire) {
            thread::sleep(Duration::from_millis(10));
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    #[test]
    fn tick_runs_repeatedly_until_stopped() {
        let count = Arc::new(AtomicU64::new(0));
        let tick_count = Arc::clone(&count);
        let mut worker = Worker::spawn(200, move || {
            tick_count.fetch_add(1, Ordering::Relaxed);
        });
        thread::sleep(Duration::from_millis(50));
        worker.stop();
        assert!(count.load(Ordering::Relaxed) >= 1);
        assert!(!worker.is_running());
    }

    #[test]
    fn stop_waits_for_in_flight_tick_to_complete() {
        let done = Arc::new(AtomicBool::new(false));
        let tick_done = Arc::clone(&done);
        let mut worker = Worker::spawn(1000, move || {
            thread::sleep(Duration::from_millis(30));
            tick_done.store(true, Ordering::Release);
        });
        thread::sleep(Duration::from_millis(5));
        worker.stop();
        assert!(done.load(Ordering::Acquire));
    }

    #[test]
    fn tick_interval_matches_default_rate() {
        assert_eq!(tick_interval(DEFAULT_TICK_RATE), Duration::from_millis(125));
    }
}
