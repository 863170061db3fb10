//! Run drivers and the cross-run average.
//!
//! A run's frames stream through a private [`RunState`]; when the run
//! completes, its per-(level, ROI) statistics fold into the global
//! accumulators as one unit. Nothing is committed mid-run, so abandoning a
//! source between frames simply discards that run.
//!
//! Folding into the global accumulators once per *frame* while keyed by
//! the *run* index would replay early frames of a run over and over with
//! an inconsistent denominator, so we fold once per completed run; see
//! DESIGN.md for the full rationale.

use ndarray::{Array3, ArrayView2, Zip};

use crate::accum::RunAccum;
use crate::bins::CountBins;
use crate::cascade::RunState;
use crate::error::Error;
use crate::labels::RoiIndex;
use crate::lags::lag_table;
use crate::source::FrameSource;

/// Validated computation parameters.
#[derive(Clone, Copy)]
pub struct XsvsParams {
    timebin_num: usize,
    max_cts: usize,
    number_of_img: usize,
}

impl XsvsParams {
    /// `timebin_num` is the cascade branching factor (at least 2),
    /// `max_cts` the counting-statistics resolution (histogram bin count),
    /// `number_of_img` the per-run frame count used to size the cascade.
    pub fn new(timebin_num: usize, max_cts: usize, number_of_img: usize) -> Result<Self, Error> {
        if timebin_num < 2 {
            return Err(Error::integer_range(
                "timebin_num",
                timebin_num as i64,
                2,
                i64::MAX,
            ));
        }
        if max_cts == 0 {
            return Err(Error::integer_range("max_cts", 0, 1, i64::MAX));
        }
        if number_of_img == 0 {
            return Err(Error::integer_range("number_of_img", 0, 1, i64::MAX));
        }
        Ok(Self {
            timebin_num,
            max_cts,
            number_of_img,
        })
    }

    pub fn timebin_num(&self) -> usize {
        self.timebin_num
    }

    pub fn max_cts(&self) -> usize {
        self.max_cts
    }

    pub fn number_of_img(&self) -> usize {
        self.number_of_img
    }
}

/// The global result tensors, each `[num_levels, n_rois, max_cts]`.
///
/// If no run contributed any frames, every entry is NaN (distinct from a
/// genuine all-zero histogram). Entries at levels no folded run activated
/// are NaN as well.
pub struct SpeckleResult {
    /// mean histogram across frames and runs
    pub speckle_cts: Array3<f64>,
    /// mean of the squared histogram across frames and runs
    pub speckle_cts_pow: Array3<f64>,
    /// elementwise `sqrt(speckle_cts − speckle_cts_pow²)`
    pub std_dev: Array3<f64>,
    /// lag (in frames) of each cascade level
    pub lags: Vec<usize>,
}

/// Incremental average of completed runs.
///
/// `fold` is the only shared-mutation point of the whole computation: runs
/// may be processed concurrently as long as their results pass through here
/// one at a time, in some definite order.
pub struct CrossRunAverager {
    speckle_cts: Array3<f64>,
    speckle_cts_pow: Array3<f64>,
    n_runs: usize,
}

impl CrossRunAverager {
    pub fn new(num_levels: usize, n_rois: usize, max_cts: usize) -> Self {
        let shape = (num_levels, n_rois, max_cts);
        Self {
            speckle_cts: Array3::from_elem(shape, f64::NAN),
            speckle_cts_pow: Array3::from_elem(shape, f64::NAN),
            n_runs: 0,
        }
    }

    /// number of runs folded in so far
    pub fn n_runs(&self) -> usize {
        self.n_runs
    }

    /// Fold one run's statistics into the global average:
    /// `global ← global + (run − global) / run_index`.
    pub fn fold(&mut self, run: &RunAccum) {
        self.n_runs += 1;
        if self.n_runs == 1 {
            self.speckle_cts.assign(&run.speckle_cts);
            self.speckle_cts_pow.assign(&run.speckle_cts_pow);
        } else {
            let n = self.n_runs as f64;
            Zip::from(&mut self.speckle_cts)
                .and(&run.speckle_cts)
                .for_each(|g, &r| *g += (r - *g) / n);
            Zip::from(&mut self.speckle_cts_pow)
                .and(&run.speckle_cts_pow)
                .for_each(|g, &r| *g += (r - *g) / n);
        }
    }

    /// Derive the standard-deviation tensor and hand back the result.
    pub fn finish(self, lags: Vec<usize>) -> SpeckleResult {
        let mut std_dev = Array3::from_elem(self.speckle_cts.raw_dim(), f64::NAN);
        Zip::from(&mut std_dev)
            .and(&self.speckle_cts)
            .and(&self.speckle_cts_pow)
            .for_each(|s, &m, &p| *s = (m - p * p).sqrt());
        SpeckleResult {
            speckle_cts: self.speckle_cts,
            speckle_cts_pow: self.speckle_cts_pow,
            std_dev,
            lags,
        }
    }
}

/// Stream one run's frames through a fresh cascade.
///
/// Returns `Ok(None)` for a zero-length run (it contributes nothing to the
/// cross-run average). A source fault or shape mismatch fails the whole run.
pub fn process_run<S: FrameSource>(
    source: &mut S,
    index: &RoiIndex,
    num_levels: usize,
    params: &XsvsParams,
) -> Result<Option<RunAccum>, Error> {
    let bins = CountBins::new(params.max_cts())?;
    let mut run = RunState::new(index, num_levels, params.timebin_num(), bins);
    while let Some(frame) = source.next_frame() {
        let frame = frame?;
        run.push_frame(frame.view())?;
    }
    if run.frames_seen() == 0 {
        Ok(None)
    } else {
        Ok(Some(run.finish()))
    }
}

/// Process every run serially, in input order, and average the results.
pub fn process_runs<S: FrameSource>(
    samples: Vec<(String, S)>,
    label_array: ArrayView2<'_, usize>,
    params: &XsvsParams,
) -> Result<SpeckleResult, Error> {
    let index = RoiIndex::from_label_array(label_array)?;
    let lags = lag_table(params.timebin_num(), params.number_of_img());

    let mut global = CrossRunAverager::new(lags.len(), index.n_rois(), params.max_cts());
    for (_run_id, mut source) in samples {
        if let Some(run) = process_run(&mut source, &index, lags.len(), params)? {
            global.fold(&run);
        }
    }
    Ok(global.finish(lags))
}

/// Process runs on one worker thread each, then fold in input order.
///
/// Runs are independent (each owns its cascade state), so only the fold
/// must be serialized; deferring every fold until after the workers join
/// keeps the fold order deterministic, and the output bitwise identical to
/// [`process_runs`].
pub fn process_runs_parallel<S: FrameSource + Send>(
    samples: Vec<(String, S)>,
    label_array: ArrayView2<'_, usize>,
    params: &XsvsParams,
) -> Result<SpeckleResult, Error> {
    let index = RoiIndex::from_label_array(label_array)?;
    let lags = lag_table(params.timebin_num(), params.number_of_img());
    let num_levels = lags.len();

    let results: Vec<Result<Option<RunAccum>, Error>> = std::thread::scope(|scope| {
        let handles: Vec<_> = samples
            .into_iter()
            .map(|(_run_id, mut source)| {
                let index = &index;
                scope.spawn(move || process_run(&mut source, index, num_levels, params))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(payload) => std::panic::resume_unwind(payload),
            })
            .collect()
    });

    let mut global = CrossRunAverager::new(num_levels, index.n_rois(), params.max_cts());
    for result in results {
        if let Some(run) = result? {
            global.fold(&run);
        }
    }
    Ok(global.finish(lags))
}
