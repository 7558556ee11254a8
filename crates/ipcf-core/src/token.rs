//! Process-wide monotonic token allocator (spec.md §4.1).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A textual request identifier drawn from the global token counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rid(u64);

impl Rid {
    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Rid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Rid {
    fn from(v: u64) -> Self {
        Rid(v)
    }
}

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Hand out the next monotonically increasing token. Lock-free, safe under
/// concurrent access, and totally ordered: two threads racing `next()`
/// always agree on which one observed the smaller value.
#[inline]
pub fn next() -> Rid {
    Rid(COUNTER.fetch_add(1, Ordering::SeqCst))
}
