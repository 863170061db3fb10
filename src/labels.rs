//! The labeled-pixel index.
//!
//! An ROI label map assigns each detector pixel an integer id (0 means
//! unlabeled/background and is excluded). The cascade never touches the
//! label map itself; it works from a [`RoiIndex`] built once up front,
//! which records where every labeled pixel sits in a frame and where each
//! ROI's pixels sit in the packed labeled-pixel vector.
//!
//! Pixels are packed grouped by ROI, so a single ROI is always a contiguous
//! range of the packed vector. That keeps the downstream histogram tensors
//! fixed-shape: no ragged per-ROI containers anywhere.

use core::ops::Range;

use ndarray::{ArrayView2, ArrayViewMut1};

use crate::error::Error;

/// Read-only index of labeled pixels, shared by every run.
pub struct RoiIndex {
    shape: [usize; 2],
    // flat frame indices of all labeled pixels, grouped by ROI
    flat: Vec<usize>,
    // bounds[r]..bounds[r + 1] is ROI r's range in the packed vector
    bounds: Vec<usize>,
}

impl RoiIndex {
    /// Build the index from a label map.
    ///
    /// ROI ids are expected to be `1..=n_rois` where `n_rois` is the largest
    /// id present. An id in that range with no pixels is a configuration
    /// error (as is a map with no labeled pixels at all): it is raised here,
    /// before any frame is processed, never as a per-frame fault.
    pub fn from_label_array(label_array: ArrayView2<'_, usize>) -> Result<Self, Error> {
        let shape = [label_array.shape()[0], label_array.shape()[1]];
        let n_rois = label_array.iter().copied().max().unwrap_or(0);
        if n_rois == 0 {
            return Err(Error::no_labeled_pixels());
        }

        let mut counts = vec![0_usize; n_rois];
        for &id in label_array.iter() {
            if id > 0 {
                counts[id - 1] += 1;
            }
        }
        if let Some(missing) = counts.iter().position(|&c| c == 0) {
            return Err(Error::empty_roi(missing + 1));
        }

        let mut bounds = Vec::with_capacity(n_rois + 1);
        bounds.push(0);
        for &c in &counts {
            bounds.push(bounds.last().copied().unwrap_or(0) + c);
        }

        let mut flat = vec![0_usize; *bounds.last().unwrap()];
        let mut write_pos: Vec<usize> = bounds[..n_rois].to_vec();
        for (flat_idx, &id) in label_array.iter().enumerate() {
            if id > 0 {
                flat[write_pos[id - 1]] = flat_idx;
                write_pos[id - 1] += 1;
            }
        }

        Ok(Self { shape, flat, bounds })
    }

    /// shape of the label map (and of every conforming frame)
    pub fn frame_shape(&self) -> [usize; 2] {
        self.shape
    }

    pub fn n_rois(&self) -> usize {
        self.bounds.len() - 1
    }

    /// total number of labeled pixels (the packed vector's length)
    pub fn n_pixels(&self) -> usize {
        self.flat.len()
    }

    /// ROI `roi`'s range within the packed labeled-pixel vector
    /// (0-based ROI index, i.e. ROI id `roi + 1`)
    pub fn roi_range(&self, roi: usize) -> Range<usize> {
        self.bounds[roi]..self.bounds[roi + 1]
    }

    /// Gather a frame's labeled pixels into `out` (length [`Self::n_pixels`]),
    /// in packed order. The caller has already checked the frame's shape.
    pub(crate) fn pack_frame(&self, frame: ArrayView2<'_, f64>, out: &mut ArrayViewMut1<'_, f64>) {
        debug_assert_eq!(frame.shape(), &self.shape);
        debug_assert_eq!(out.len(), self.flat.len());
        let ncols = self.shape[1];
        for (k, &idx) in self.flat.iter().enumerate() {
            out[k] = frame[[idx / ncols, idx % ncols]];
        }
    }
}
