// the reason this is named mod.rs has to do with some complexities of how
// testing is handled
//
// we are following the advice of the rust book
// https://doc.rust-lang.org/book/ch11-03-test-organization.html#submodules-in-integration-tests

use ndarray::{Array1, Array2, Array3, ArrayView1, Axis};

// based on numpy!
// https://numpy.org/doc/stable/reference/generated/numpy.isclose.html
//
// NaN compares equal to NaN here: a never-activated level is expected to be
// NaN on both sides of a comparison
pub fn isclose(actual: f64, ref_val: f64, rtol: f64, atol: f64) -> bool {
    let actual_nan = actual.is_nan();
    let ref_nan = ref_val.is_nan();
    if actual_nan || ref_nan {
        actual_nan && ref_nan
    } else {
        (actual - ref_val).abs() <= (atol + rtol * ref_val.abs())
    }
}

pub fn assert_allclose(actual: &Array3<f64>, expected: &Array3<f64>, rtol: f64, atol: f64) {
    assert_eq!(actual.shape(), expected.shape());
    for (idx, (&a, &e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            isclose(a, e, rtol, atol),
            "mismatch at flat index {idx}: {a} vs {e}"
        );
    }
}

/// a frame stack where frame `i` is constant-valued `values[i]`
#[allow(dead_code)]
pub fn constant_stack(shape: [usize; 2], values: &[f64]) -> Array3<f64> {
    let mut stack = Array3::zeros((values.len(), shape[0], shape[1]));
    for (i, &v) in values.iter().enumerate() {
        stack.index_axis_mut(Axis(0), i).fill(v);
    }
    stack
}

/// a frame stack built from explicit per-frame arrays
#[allow(dead_code)]
pub fn stack_from_frames(frames: &[Array2<f64>]) -> Array3<f64> {
    let shape = frames[0].dim();
    let mut stack = Array3::zeros((frames.len(), shape.0, shape.1));
    for (i, frame) in frames.iter().enumerate() {
        stack.index_axis_mut(Axis(0), i).assign(frame);
    }
    stack
}

/// histogram `values` on the unit grid `[0, max_cts]` (right edge
/// inclusive), normalized by the in-range count -- a naive reference for
/// the crate's incremental statistics
#[allow(dead_code)]
pub fn naive_histogram(values: ArrayView1<'_, f64>, max_cts: usize) -> Array1<f64> {
    let mut hist = Array1::<f64>::zeros(max_cts);
    let mut in_range = 0_u64;
    for &v in values.iter() {
        if (0.0..max_cts as f64).contains(&v) {
            hist[v as usize] += 1.0;
            in_range += 1;
        } else if v == max_cts as f64 {
            hist[max_cts - 1] += 1.0;
            in_range += 1;
        }
    }
    if in_range > 0 {
        hist / in_range as f64
    } else {
        hist
    }
}
