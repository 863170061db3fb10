//! Photon-count histogram bins.
//!
//! Deriving a bin range from each batch of pixel values would put
//! histograms from different frames on different axes, and averaging such
//! histograms is meaningless. We instead bin on the fixed unit grid `[0, 1), [1, 2), …, [max_cts − 1, max_cts]`. `max_cts` is the
//! counting-statistics resolution: photon counts at or above it are dropped.

use ndarray::{ArrayView1, ArrayViewMut1};

use crate::error::Error;

/// Unit-width photon-count bins over `[0, max_cts]`.
///
/// Intervals don't include their right edge, except for the last bin: a
/// value exactly equal to `max_cts` lands in bin `max_cts - 1` (the usual
/// histogram convention, so averaged pair values that hit the top of the
/// range aren't lost).
#[derive(Clone)]
pub struct CountBins {
    n_bins: usize,
}

impl CountBins {
    pub fn new(max_cts: usize) -> Result<Self, Error> {
        if max_cts == 0 {
            Err(Error::integer_range("max_cts", 0, 1, i64::MAX))
        } else {
            Ok(Self { n_bins: max_cts })
        }
    }

    /// Calculate the bin index for a given value (`None` if out of range).
    pub fn bin_index(&self, value: f64) -> Option<usize> {
        let max = self.n_bins as f64;
        if value < 0.0 || value > max {
            None
        } else if value == max {
            Some(self.n_bins - 1)
        } else {
            // this cast handles the truncation
            Some(value as usize)
        }
    }

    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Histogram `values` into `out` (length `n_bins`), normalized so the
    /// bins sum to 1 whenever at least one value lands in range.
    ///
    /// Out-of-range values are dropped, exactly like an accumulator ignoring
    /// a datum that misses every bucket.
    pub fn fill_histogram(&self, values: ArrayView1<'_, f64>, out: &mut ArrayViewMut1<'_, f64>) {
        debug_assert_eq!(out.len(), self.n_bins);
        out.fill(0.0);
        let mut in_range = 0_u64;
        for &v in values.iter() {
            if let Some(idx) = self.bin_index(v) {
                out[idx] += 1.0;
                in_range += 1;
            }
        }
        if in_range > 0 {
            let norm = in_range as f64;
            out.mapv_inplace(|x| x / norm);
        }
    }
}
