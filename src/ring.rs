//! Per-level ring buffers of labeled-pixel vectors.
//!
//! Each cascade level keeps the `timebin_num` most recent pixel-intensity
//! vectors written at that level. All levels share one contiguous block of
//! memory and views are handed out, rather than each level owning its own
//! allocation.

use ndarray::{Array3, ArrayView1, ArrayViewMut1, s};

/// Ring buffers for every cascade level.
///
/// There is no locking here: each run owns its own store, so there is no
/// cross-run contention. Writes are strictly sequential within a run.
pub struct RingBufferStore {
    // [num_levels, capacity, n_pixels]
    data: Array3<f64>,
    // per-level write cursor, in [0, capacity)
    cursors: Vec<usize>,
}

impl RingBufferStore {
    pub fn new(num_levels: usize, capacity: usize, n_pixels: usize) -> Self {
        debug_assert!(capacity >= 2);
        Self {
            data: Array3::zeros((num_levels, capacity, n_pixels)),
            cursors: vec![0; num_levels],
        }
    }

    pub fn num_levels(&self) -> usize {
        self.cursors.len()
    }

    pub fn capacity(&self) -> usize {
        self.data.shape()[1]
    }

    /// Advance `level`'s cursor and hand the newly-current slot to `fill`.
    pub fn write_with(&mut self, level: usize, fill: impl FnOnce(&mut ArrayViewMut1<'_, f64>)) {
        let capacity = self.capacity();
        self.cursors[level] = (self.cursors[level] + 1) % capacity;
        let slot = self.cursors[level];
        fill(&mut self.data.slice_mut(s![level, slot, ..]));
    }

    /// the most recently written slot at `level`
    pub fn current(&self, level: usize) -> ArrayView1<'_, f64> {
        self.data.slice(s![level, self.cursors[level], ..])
    }

    /// the two most recently written slots at `level`: (current, predecessor)
    pub fn read_pair(&self, level: usize) -> (ArrayView1<'_, f64>, ArrayView1<'_, f64>) {
        let capacity = self.capacity();
        let cur = self.cursors[level];
        let prev = (cur + capacity - 1) % capacity;
        (
            self.data.slice(s![level, cur, ..]),
            self.data.slice(s![level, prev, ..]),
        )
    }
}
