//! Byte Buffer Pool
//!
//! Reusable byte buffers grouped by size class. The pool watches the lengths
//! of released buffers and periodically recalibrates: the most common size
//! class becomes the capacity of freshly allocated buffers, and buffers much
//! larger than what 95% of callers need are dropped instead of pooled.

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::trace;

// == Size Classes ==
const MIN_BIT_SIZE: usize = 6;
/// Number of size classes.
pub const STEPS: usize = 20;
/// Upper bound of the smallest class (64 bytes).
pub const MIN_SIZE: usize = 1 << MIN_BIT_SIZE;
/// Upper bound of the largest class (16 MiB).
pub const MAX_SIZE: usize = 1 << (MIN_BIT_SIZE + STEPS - 1);

/// Releases into one class before the pool recalibrates.
pub const CALIBRATE_CALLS_THRESHOLD: u64 = 42_000;
const MAX_PERCENTILE: f64 = 0.95;
/// Buffers kept per size class.
const MAX_FREE_PER_CLASS: usize = 64;

// == Index ==
/// Maps a buffer length to its size class.
pub fn index(n: usize) -> usize {
    let mut n = n.saturating_sub(1) >> MIN_BIT_SIZE;
    let mut idx = 0;
    while n > 0 {
        n >>= 1;
        idx += 1;
    }
    idx.min(STEPS - 1)
}

// == Byte Buffer ==
/// Growable byte buffer handed out by [`BufferPool`].
#[derive(Default, Clone, PartialEq, Eq)]
pub struct ByteBuffer {
    buf: Vec<u8>,
}

impl ByteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Appends raw bytes.
    pub fn extend_from_slice(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Appends a string's bytes.
    pub fn write_str(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
    }

    /// Empties the buffer, keeping its allocation.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("len", &self.buf.len())
            .field("capacity", &self.buf.capacity())
            .finish()
    }
}

impl io::Write for ByteBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Write for ByteBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        ByteBuffer::write_str(self, s);
        Ok(())
    }
}

impl AsRef<[u8]> for ByteBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

// == Buffer Pool ==
/// Thread-safe pool of [`ByteBuffer`]s with calibrated size classes.
///
/// Releasing a buffer hands it back to the pool; using it afterwards is
/// impossible because `release` takes it by value.
#[derive(Debug)]
pub struct BufferPool {
    calls: [AtomicU64; STEPS],
    calibrating: AtomicBool,
    default_size: AtomicUsize,
    max_size: AtomicUsize,
    free: [Mutex<Vec<ByteBuffer>>; STEPS],
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferPool {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            calls: std::array::from_fn(|_| AtomicU64::new(0)),
            calibrating: AtomicBool::new(false),
            default_size: AtomicUsize::new(0),
            max_size: AtomicUsize::new(0),
            free: std::array::from_fn(|_| Mutex::new(Vec::new())),
        }
    }

    // == Acquire ==
    /// Returns an empty buffer, reusing a pooled one when available.
    pub fn acquire(&self) -> ByteBuffer {
        let default_size = self.default_size();
        let start = index(default_size);
        for class in self.free[start..].iter().chain(self.free[..start].iter()) {
            if let Some(mut buf) = class.lock().pop() {
                buf.reset();
                return buf;
            }
        }
        ByteBuffer::with_capacity(default_size)
    }

    // == Release ==
    /// Returns a buffer to the pool.
    pub fn release(&self, mut buf: ByteBuffer) {
        let idx = index(buf.len());
        if self.calls[idx].fetch_add(1, Ordering::Relaxed) + 1 > CALIBRATE_CALLS_THRESHOLD {
            self.calibrate();
        }

        let max_size = self.max_size();
        if max_size != 0 && buf.capacity() > max_size {
            return;
        }

        buf.reset();
        let mut class = self.free[index(buf.capacity())].lock();
        if class.len() < MAX_FREE_PER_CLASS {
            class.push(buf);
        }
    }

    /// Capacity given to freshly allocated buffers.
    pub fn default_size(&self) -> usize {
        self.default_size.load(Ordering::Relaxed)
    }

    /// Largest capacity kept in the pool, 0 before the first calibration.
    pub fn max_size(&self) -> usize {
        self.max_size.load(Ordering::Relaxed)
    }

    /// Number of buffers currently pooled.
    pub fn pooled(&self) -> usize {
        self.free.iter().map(|class| class.lock().len()).sum()
    }

    // == Calibrate ==
    /// Recomputes default and max sizes from the release histogram and
    /// resets the histogram. Concurrent calls are skipped.
    pub(crate) fn calibrate(&self) {
        if self.calibrating.swap(true, Ordering::Acquire) {
            return;
        }

        let mut classes: Vec<(u64, usize)> = self
            .calls
            .iter()
            .enumerate()
            .map(|(i, calls)| (calls.swap(0, Ordering::Relaxed), MIN_SIZE << i))
            .collect();
        let calls_sum: u64 = classes.iter().map(|(calls, _)| calls).sum();

        if calls_sum > 0 {
            classes.sort_by(|a, b| b.0.cmp(&a.0));

            let default_size = classes[0].1;
            let max_sum = (calls_sum as f64 * MAX_PERCENTILE) as u64;
            let mut max_size = 0;
            let mut covered = 0;
            for (calls, size) in &classes {
                if covered > max_sum {
                    break;
                }
                covered += calls;
                max_size = max_size.max(*size);
            }

            self.default_size.store(default_size, Ordering::Relaxed);
            self.max_size.store(max_size, Ordering::Relaxed);
            trace!(default_size, max_size, "buffer pool calibrated");
        }

        self.calibrating.store(false, Ordering::Release);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_index() {
        assert_eq!(index(0), 0);
        assert_eq!(index(1), 0);

        assert_eq!(index(MIN_SIZE - 1), 0);
        assert_eq!(index(MIN_SIZE), 0);
        assert_eq!(index(MIN_SIZE + 1), 1);

        assert_eq!(index(2 * MIN_SIZE - 1), 1);
        assert_eq!(index(2 * MIN_SIZE), 1);
        assert_eq!(index(2 * MIN_SIZE + 1), 2);

        assert_eq!(index(MAX_SIZE - 1), STEPS - 1);
        assert_eq!(index(MAX_SIZE), STEPS - 1);
        assert_eq!(index(MAX_SIZE + 1), STEPS - 1);
    }

    fn get_put(pool: &BufferPool, n: usize) {
        let mut buf = pool.acquire();
        assert!(buf.is_empty(), "non-empty byte buffer returned from acquire");
        buf.extend_from_slice(&vec![0u8; n]);
        pool.release(buf);
    }

    #[test]
    fn test_buffer_writes() {
        let pool = BufferPool::new();
        let mut buf = pool.acquire();

        buf.write_str("first line\n");
        buf.write_all(b"second line\n").unwrap();
        std::fmt::Write::write_fmt(&mut buf, format_args!("{} line\n", "third")).unwrap();

        assert_eq!(buf.as_bytes(), b"first line\nsecond line\nthird line\n");
        pool.release(buf);
        assert_eq!(pool.pooled(), 1);
    }

    #[test]
    fn test_released_buffer_is_reused_empty() {
        let pool = BufferPool::new();

        let mut buf = pool.acquire();
        buf.extend_from_slice(&[1u8; 300]);
        let capacity = buf.capacity();
        pool.release(buf);

        let reused = pool.acquire();
        assert!(reused.is_empty());
        assert_eq!(reused.capacity(), capacity);
        assert_eq!(pool.pooled(), 0);
    }

    #[test]
    fn test_calibrate_picks_common_size() {
        let pool = BufferPool::new();

        for _ in 0..100 {
            get_put(&pool, 1004);
        }
        for _ in 0..2 {
            get_put(&pool, 15_000);
        }
        pool.calibrate();

        assert_eq!(pool.default_size(), 1024);
        assert_eq!(pool.max_size(), 1024);
    }

    #[test]
    fn test_oversized_buffers_are_dropped_after_calibration() {
        let pool = BufferPool::new();
        for _ in 0..50 {
            get_put(&pool, 100);
        }
        pool.calibrate();
        assert_eq!(pool.max_size(), 128);
        let pooled = pool.pooled();

        let mut big = ByteBuffer::new();
        big.extend_from_slice(&vec![0u8; 10_000]);
        pool.release(big);

        assert_eq!(pool.pooled(), pooled);
    }

    #[test]
    fn test_calibration_threshold_triggers() {
        let pool = BufferPool::new();
        for _ in 0..=CALIBRATE_CALLS_THRESHOLD {
            pool.release(ByteBuffer::with_capacity(0));
        }
        assert_eq!(pool.default_size(), MIN_SIZE);
    }

    #[test]
    fn test_pool_various_sizes_concurrent() {
        let pool = Arc::new(BufferPool::new());
        let handles: Vec<_> = (0..5)
            .map(|_| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for i in 0..STEPS + 1 {
                        let n = 1usize << i;
                        get_put(&pool, n);
                        get_put(&pool, n + 1);
                        get_put(&pool, n - 1);
                        for j in 0..10 {
                            get_put(&pool, j + n);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("pool worker panicked");
        }
        assert!(pool.pooled() > 0);
    }
}
