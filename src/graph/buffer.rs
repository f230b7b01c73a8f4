/// Growable sample buffer reused across callbacks.
///
/// Every resize zeroes the whole visible region, so a buffer that last held
/// a longer or differently-patched signal never leaks stale samples.
#[derive(Debug, Default, Clone)]
pub struct ScratchBuffer {
    data: Vec<f32>,
}

impl ScratchBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(samples: usize) -> Self {
        Self {
            data: Vec::with_capacity(samples),
        }
    }

    /// Resize to `len` samples, all zero.
    ///
    /// Only allocates when `len` exceeds every previous size.
    #[inline]
    pub fn resize(&mut self, len: usize) {
        self.data.clear();
        self.data.resize(len, 0.0);
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }
}
