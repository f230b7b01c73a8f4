/*
Buffer Pool
===========

The evaluator needs scratch buffers every callback, in sizes that follow the
host's frame count. Allocating them on the audio thread is not allowed, so
buffers are recycled through size classes:

    class k holds buffers with capacity 2^k samples

    acquire(300)  → class 9 (512), resized to 300, zeroed
    release(buf)  → back into class 9

Requests are clamped to `max_samples`, so the number of classes is fixed at
construction and growth is bounded. A class only allocates when it is empty,
which after `prewarm` means never.
*/

/// Size-class pool of zeroed sample buffers.
#[derive(Debug)]
pub struct BufferPool {
    max_samples: usize,
    classes: Vec<Vec<Vec<f32>>>,
}

/// Buffers kept per size class before extras are dropped.
const CLASS_DEPTH: usize = 8;

#[inline]
fn class_of(samples: usize) -> usize {
    samples.max(1).next_power_of_two().trailing_zeros() as usize
}

impl BufferPool {
    pub fn new(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        let classes = (0..=class_of(max_samples))
            .map(|_| Vec::with_capacity(CLASS_DEPTH))
            .collect();
        Self {
            max_samples,
            classes,
        }
    }

    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    /// Allocate `count` buffers able to hold `samples` up front.
    pub fn prewarm(&mut self, samples: usize, count: usize) {
        let samples = samples.min(self.max_samples);
        let class = class_of(samples);
        for _ in 0..count.min(CLASS_DEPTH) {
            if self.classes[class].len() < CLASS_DEPTH {
                self.classes[class].push(Vec::with_capacity(1 << class));
            }
        }
    }

    /// A zeroed buffer of `samples` (clamped to the pool maximum).
    pub fn acquire(&mut self, samples: usize) -> Vec<f32> {
        let samples = samples.min(self.max_samples);
        let class = class_of(samples);
        let mut buffer = self.classes[class]
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(1 << class));
        buffer.clear();
        buffer.resize(samples, 0.0);
        buffer
    }

    /// Return a buffer for reuse.
    pub fn release(&mut self, buffer: Vec<f32>) {
        let capacity = buffer.capacity();
        if capacity == 0 || !capacity.is_power_of_two() {
            return;
        }
        let class = capacity.trailing_zeros() as usize;
        if let Some(free) = self.classes.get_mut(class) {
            if free.len() < CLASS_DEPTH {
                free.push(buffer);
            }
        }
    }

    /// Buffers currently parked in the pool.
    pub fn available(&self) -> usize {
        self.classes.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_is_zeroed_even_after_reuse() {
        let mut pool = BufferPool::new(1_024);
        let mut buffer = pool.acquire(100);
        buffer.fill(0.9);
        pool.release(buffer);

        let buffer = pool.acquire(128);
        assert_eq!(buffer.len(), 128);
        assert!(buffer.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn reuses_the_same_allocation() {
        let mut pool = BufferPool::new(1_024);
        pool.prewarm(256, 1);
        assert_eq!(pool.available(), 1);

        let buffer = pool.acquire(200);
        assert_eq!(pool.available(), 0);
        let ptr = buffer.as_ptr();
        pool.release(buffer);

        let again = pool.acquire(256);
        assert_eq!(again.as_ptr(), ptr);
    }

    #[test]
    fn requests_are_clamped() {
        let mut pool = BufferPool::new(64);
        let buffer = pool.acquire(10_000);
        assert_eq!(buffer.len(), 64);
    }

    #[test]
    fn foreign_buffers_are_not_kept() {
        let mut pool = BufferPool::new(64);
        pool.release(Vec::with_capacity(3));
        pool.release(Vec::with_capacity(1 << 20));
        assert_eq!(pool.available(), 0);
    }
}
