use crate::graph::buffer::ScratchBuffer;

/*
Per-Callback Render Cache
=========================

One record per node: the timestamp it last rendered for and a copy of what
it produced.

    pull #1 at T   miss → render → store (T, buffer)
    pull #2 at T   hit  → copy stored buffer
    pull #1 at T+1 miss → render → store (T+1, buffer)

A hit at the same timestamp with a different buffer length copies the
overlapping prefix and zeroes the rest; it never renders again.
*/

#[derive(Debug, Default)]
pub struct RenderCache {
    timestamp: Option<u64>,
    buffer: ScratchBuffer,
}

impl RenderCache {
    pub fn with_capacity(samples: usize) -> Self {
        Self {
            timestamp: None,
            buffer: ScratchBuffer::with_capacity(samples),
        }
    }

    /// Timestamp of the stored render, if any.
    pub fn timestamp(&self) -> Option<u64> {
        self.timestamp
    }

    #[inline]
    pub fn is_fresh(&self, timestamp: u64) -> bool {
        self.timestamp == Some(timestamp)
    }

    /// Copy the stored buffer into `out` if it was rendered at `timestamp`.
    pub fn copy_if_fresh(&self, timestamp: u64, out: &mut [f32]) -> bool {
        if !self.is_fresh(timestamp) {
            return false;
        }
        let cached = self.buffer.as_slice();
        let shared = cached.len().min(out.len());
        out[..shared].copy_from_slice(&cached[..shared]);
        out[shared..].fill(0.0);
        true
    }

    pub fn store(&mut self, timestamp: u64, rendered: &[f32]) {
        self.buffer.resize(rendered.len());
        self.buffer.as_mut_slice().copy_from_slice(rendered);
        self.timestamp = Some(timestamp);
    }

    /// Samples the cache can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn clear(&mut self) {
        self.timestamp = None;
    }
}
