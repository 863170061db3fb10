//! The multi-tau doubling cascade for one run.
//!
//! Level 0 sees every frame. Level k receives one entry per `timebin_num^k`
//! frames: once a level has seen both halves of a pair, the arithmetic mean
//! of the two most recent entries below it is pushed up, and propagation
//! continues to the next level. Every new entry, at whatever level, is
//! folded into that level's histogram statistics.
//!
//! All of this state is private to the run. It is created at run start and
//! discarded after the run's result is folded into the global accumulators;
//! nothing here is ever shared across runs.

use ndarray::{Array1, ArrayView2, Zip};

use crate::accum::{HistogramAccumulator, RunAccum};
use crate::bins::CountBins;
use crate::error::Error;
use crate::labels::RoiIndex;
use crate::ring::RingBufferStore;

/// Per-run cascade state: ring buffers, pair flags and running statistics.
pub struct RunState<'a> {
    index: &'a RoiIndex,
    store: RingBufferStore,
    // whether a level is holding the first half of a pair, waiting for the
    // second before it can push an average upward
    awaiting_pair: Vec<bool>,
    accum: HistogramAccumulator,
    avg_scratch: Array1<f64>,
    frames_seen: usize,
}

impl<'a> RunState<'a> {
    pub fn new(index: &'a RoiIndex, num_levels: usize, timebin_num: usize, bins: CountBins) -> Self {
        Self {
            store: RingBufferStore::new(num_levels, timebin_num, index.n_pixels()),
            awaiting_pair: vec![false; num_levels],
            accum: HistogramAccumulator::new(num_levels, index.n_rois(), bins),
            avg_scratch: Array1::zeros(index.n_pixels()),
            frames_seen: 0,
            index,
        }
    }

    pub fn frames_seen(&self) -> usize {
        self.frames_seen
    }

    /// number of buffer entries processed at `level` so far
    pub fn entries_at_level(&self, level: usize) -> u64 {
        self.accum.fill_count(level)
    }

    /// Feed one frame through the cascade.
    ///
    /// The frame is fully propagated (every level that can produce an entry
    /// does so, and its statistics are updated) before this returns; the
    /// ring-buffer cursors are strictly sequential, so frames must arrive
    /// one at a time, in order.
    pub fn push_frame(&mut self, frame: ArrayView2<'_, f64>) -> Result<(), Error> {
        let expected = self.index.frame_shape();
        let actual = [frame.shape()[0], frame.shape()[1]];
        if actual != expected {
            return Err(Error::frame_shape(expected, actual, self.frames_seen));
        }

        let Self {
            index,
            store,
            awaiting_pair,
            accum,
            avg_scratch,
            frames_seen,
        } = self;
        let index: &RoiIndex = &**index;

        store.write_with(0, |slot| index.pack_frame(frame, slot));
        accum.update(0, store.current(0), index);
        *frames_seen += 1;

        // propagate upward while levels have complete pairs
        let num_levels = store.num_levels();
        for level in 1..num_levels {
            if !awaiting_pair[level] {
                // only the first half of this level's pair has arrived
                awaiting_pair[level] = true;
                break;
            }
            let (cur, prev) = store.read_pair(level - 1);
            Zip::from(&mut *avg_scratch)
                .and(&cur)
                .and(&prev)
                .for_each(|a, &c, &p| *a = 0.5 * (c + p));
            store.write_with(level, |slot| slot.assign(&*avg_scratch));
            awaiting_pair[level] = false;
            accum.update(level, store.current(level), index);
        }
        Ok(())
    }

    /// Tear down the cascade and hand back the run's statistics.
    pub fn finish(self) -> RunAccum {
        self.accum.finish()
    }
}
