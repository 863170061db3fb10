//! Incremental per-(level, ROI) histogram statistics.
//!
//! Every time a cascade level produces a buffer entry, each ROI's slice of
//! that entry is histogrammed and folded into a running mean and a running
//! mean-of-squares with the incremental update `m ← m + (h − m) / n`. The
//! incremental form is numerically stabler than summing then dividing, and
//! it lets a run stream indefinitely without storing per-frame histograms.

use ndarray::{Array1, Array3, ArrayView1, Zip, s};

use crate::bins::CountBins;
use crate::labels::RoiIndex;

/// A completed run's per-(level, ROI) statistics.
///
/// Entries for levels the run never activated are NaN, so that a too-short
/// run is distinguishable from one that genuinely produced all-zero
/// histograms.
pub struct RunAccum {
    /// mean histogram, `[num_levels, n_rois, max_cts]`
    pub speckle_cts: Array3<f64>,
    /// mean of the squared histogram, same shape
    pub speckle_cts_pow: Array3<f64>,
}

/// Running mean / mean-of-squares of histograms for one run.
pub struct HistogramAccumulator {
    bins: CountBins,
    mean: Array3<f64>,
    mean_pow: Array3<f64>,
    // number of buffer entries folded in at each level (shared by every
    // ROI, since an update at a level touches all ROIs)
    fills: Vec<u64>,
    hist_scratch: Array1<f64>,
}

impl HistogramAccumulator {
    pub fn new(num_levels: usize, n_rois: usize, bins: CountBins) -> Self {
        let shape = (num_levels, n_rois, bins.n_bins());
        Self {
            mean: Array3::from_elem(shape, f64::NAN),
            mean_pow: Array3::from_elem(shape, f64::NAN),
            fills: vec![0; num_levels],
            hist_scratch: Array1::zeros(bins.n_bins()),
            bins,
        }
    }

    /// number of buffer entries folded in at `level` so far
    pub fn fill_count(&self, level: usize) -> u64 {
        self.fills[level]
    }

    /// Fold one buffer entry (the packed labeled-pixel vector produced at
    /// `level`) into every ROI's running statistics.
    pub fn update(&mut self, level: usize, packed: ArrayView1<'_, f64>, index: &RoiIndex) {
        self.fills[level] += 1;
        let n = self.fills[level] as f64;
        let first = self.fills[level] == 1;

        for roi in 0..index.n_rois() {
            let values = packed.slice(s![index.roi_range(roi)]);
            self.bins
                .fill_histogram(values, &mut self.hist_scratch.view_mut());

            let mut mean = self.mean.slice_mut(s![level, roi, ..]);
            let mut mean_pow = self.mean_pow.slice_mut(s![level, roi, ..]);
            if first {
                // assign rather than update, so the NaN initialization never
                // leaks into an activated level
                Zip::from(&mut mean)
                    .and(&self.hist_scratch)
                    .for_each(|m, &h| *m = h);
                Zip::from(&mut mean_pow)
                    .and(&self.hist_scratch)
                    .for_each(|p, &h| *p = h * h);
            } else {
                Zip::from(&mut mean)
                    .and(&self.hist_scratch)
                    .for_each(|m, &h| *m += (h - *m) / n);
                Zip::from(&mut mean_pow)
                    .and(&self.hist_scratch)
                    .for_each(|p, &h| *p += (h * h - *p) / n);
            }
        }
    }

    pub fn finish(self) -> RunAccum {
        RunAccum {
            speckle_cts: self.mean,
            speckle_cts_pow: self.mean_pow,
        }
    }
}
