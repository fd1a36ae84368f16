use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// A free list of byte buffers keyed by exact length.
///
/// The transport churns through short-lived buffers whenever data crosses
/// a hand-off boundary; the pool amortizes those allocations. It is
/// unbounded and scoped to its owner (one per peer), not to the process.
#[derive(Debug, Default)]
pub struct ArrayPool {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    free: HashMap<usize, Vec<Vec<u8>>>,
    /// Allocation addresses currently held by the pool. A buffer whose
    /// address is already present is refused, so one allocation can never
    /// be queued twice and later handed to two callers.
    pooled: HashSet<usize>,
}

impl ArrayPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a zeroed buffer of exactly `size` bytes, reusing a pooled
    /// one when available.
    pub fn get(&self, size: usize) -> Vec<u8> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if let Some(stack) = inner.free.get_mut(&size) {
            if let Some(mut buf) = stack.pop() {
                inner.pooled.remove(&(buf.as_ptr() as usize));
                buf.fill(0);
                return buf;
            }
        }
        vec![0; size]
    }

    /// Hands a buffer back to the pool. Zero-length buffers and buffers
    /// the pool already holds are refused.
    pub fn recycle(&self, buf: Vec<u8>) {
        if buf.is_empty() {
            warn!("refusing to recycle a zero-length buffer");
            return;
        }
        let addr = buf.as_ptr() as usize;
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if !inner.pooled.insert(addr) {
            warn!(addr, "buffer recycled twice, dropping the duplicate");
            return;
        }
        inner.free.entry(buf.len()).or_default().push(buf);
    }

    /// Number of buffers currently held.
    pub fn pooled(&self) -> usize {
        self.inner.lock().free.values().map(Vec::len).sum()
    }

    /// Discards every pooled buffer.
    pub fn reset(&self) {
        let mut guard = self.inner.lock();
        guard.free.clear();
        guard.pooled.clear();
    }
}
