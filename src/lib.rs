/*!
Photon-count-distribution statistics for X-ray Speckle Visibility
Spectroscopy (XSVS).

Given a stream of detector frames and a map of regions of interest (ROIs),
this crate produces, for a cascade of geometrically increasing time lags,
the per-ROI histogram of pixel intensities, incrementally averaged across
frames and across repeated measurement runs.

# High-Level: speckle visibility

A coherent X-ray beam scattered off a sample produces a speckle pattern
whose contrast decays as the sample's internal dynamics blur the pattern
over the exposure time. Measuring the photon-count distribution within
each ROI at a range of effective exposure times (time lags) is the basis
of speckle visibility spectroscopy; see Bandyopadhyay et al.,
Rev. Sci. Instrum. 76, 093110 (2005).

Rather than re-integrating frames at every lag (O(N) storage), the
multi-tau cascade keeps a small ring buffer per lag level and propagates
pair averages upward, for O(log N) storage.

# User Guide

The one-call entry points are [`process_runs`] (serial) and
[`process_runs_parallel`] (one worker thread per run). For streaming use,
drive a [`RunState`] frame by frame and fold the finished runs through a
[`CrossRunAverager`] yourself.

Geometry calibration, reciprocal-space conversion and ROI labeling are
upstream concerns: this crate consumes a labeled-pixel index
([`RoiIndex`]) and produces histogram tensors, nothing more.
*/

#![deny(rustdoc::broken_intra_doc_links)]

// inform build-system of the modules in this package
mod accum;
mod bins;
mod cascade;
mod driver;
mod error;
mod labels;
mod lags;
mod ring;
mod source;

// pull in symbols that are visible outside of the package
pub use accum::{HistogramAccumulator, RunAccum};
pub use bins::CountBins;
pub use cascade::RunState;
pub use driver::{
    CrossRunAverager, SpeckleResult, XsvsParams, process_run, process_runs, process_runs_parallel,
};
pub use error::Error;
pub use labels::RoiIndex;
pub use lags::lag_table;
pub use ring::RingBufferStore;
pub use source::{FrameSource, StackFrameSource};
