use ndarray::{Array3, array, s};

use xsvs::{Error, StackFrameSource, XsvsParams, process_runs};

mod common;

fn single_run(stack: Array3<f64>) -> Vec<(String, StackFrameSource)> {
    vec![("run0".to_string(), StackFrameSource::new(stack))]
}

#[test]
fn invalid_params() {
    assert!(XsvsParams::new(1, 4, 4).is_err());
    assert!(XsvsParams::new(2, 0, 4).is_err());
    assert!(XsvsParams::new(2, 4, 0).is_err());
    assert!(XsvsParams::new(2, 4, 4).is_ok());
}

#[test]
fn two_constant_rois() {
    // timebin_num=2, number_of_img=4 => levels with lags [1, 2].
    // ROI A's pixels are always 1, ROI B's always 2: every histogram, at
    // both levels, is a single-bin delta, unchanged by averaging.
    let labels = array![[1_usize, 1, 1, 1], [2, 2, 2, 2]];
    let frame = array![[1.0, 1.0, 1.0, 1.0], [2.0, 2.0, 2.0, 2.0]];
    let stack = common::stack_from_frames(&[frame.clone(), frame.clone(), frame.clone(), frame]);

    let params = XsvsParams::new(2, 4, 4).unwrap();
    let result = process_runs(single_run(stack), labels.view(), &params).unwrap();

    assert_eq!(result.lags, vec![1, 2]);
    assert_eq!(result.speckle_cts.shape(), &[2, 2, 4]);

    let mut expected = Array3::<f64>::zeros((2, 2, 4));
    expected.slice_mut(s![.., 0, 1]).fill(1.0); // ROI A: delta at 1
    expected.slice_mut(s![.., 1, 2]).fill(1.0); // ROI B: delta at 2
    common::assert_allclose(&result.speckle_cts, &expected, 0.0, 1e-12);
    common::assert_allclose(&result.speckle_cts_pow, &expected, 0.0, 1e-12);

    // sqrt(m - p^2) is exactly 0 everywhere for delta histograms
    let zeros = Array3::<f64>::zeros((2, 2, 4));
    common::assert_allclose(&result.std_dev, &zeros, 0.0, 1e-12);
}

#[test]
fn alternating_frames() {
    // frames [1, 3, 1, 3]: level 0 splits evenly between the bins for 1
    // and 3, while every level-1 pair average is (1+3)/2 = 2
    let labels = array![[1_usize, 1, 1, 1]];
    let stack = common::constant_stack([1, 4], &[1.0, 3.0, 1.0, 3.0]);

    let params = XsvsParams::new(2, 4, 4).unwrap();
    let result = process_runs(single_run(stack), labels.view(), &params).unwrap();

    let mut expected = Array3::<f64>::zeros((2, 1, 4));
    expected[[0, 0, 1]] = 0.5;
    expected[[0, 0, 3]] = 0.5;
    expected[[1, 0, 2]] = 1.0;
    common::assert_allclose(&result.speckle_cts, &expected, 0.0, 1e-12);
    // each per-entry histogram is a delta, so hist^2 == hist at every update
    common::assert_allclose(&result.speckle_cts_pow, &expected, 0.0, 1e-12);

    // level 0: sqrt(0.5 - 0.5^2) = 0.5 in the two populated bins
    let mut expected_std = Array3::<f64>::zeros((2, 1, 4));
    expected_std[[0, 0, 1]] = 0.5;
    expected_std[[0, 0, 3]] = 0.5;
    common::assert_allclose(&result.std_dev, &expected_std, 1e-12, 1e-12);
}

#[test]
fn histograms_sum_to_one() {
    // mixed pixel values within each frame
    let labels = array![[1_usize, 1, 1, 1], [2, 2, 2, 2]];
    let mut stack = Array3::<f64>::zeros((8, 2, 4));
    for (i, mut frame) in stack.outer_iter_mut().enumerate() {
        for (j, v) in frame.iter_mut().enumerate() {
            *v = ((i + 3 * j) % 5) as f64;
        }
    }

    let params = XsvsParams::new(2, 6, 8).unwrap();
    let result = process_runs(single_run(stack), labels.view(), &params).unwrap();

    assert_eq!(result.lags, vec![1, 2, 4]);
    for level in 0..3 {
        for roi in 0..2 {
            let total = result.speckle_cts.slice(s![level, roi, ..]).sum();
            assert!(
                common::isclose(total, 1.0, 1e-12, 1e-12),
                "level {level} roi {roi} sums to {total}"
            );
        }
    }
}

#[test]
fn level_activation() {
    let labels = array![[1_usize, 1]];
    let params = XsvsParams::new(2, 4, 8).unwrap(); // 3 levels

    // timebin_num^2 - 1 frames never activate level 2...
    let short = common::constant_stack([1, 2], &[1.0; 3]);
    let result = process_runs(single_run(short), labels.view(), &params).unwrap();
    assert!(result.speckle_cts.slice(s![2, .., ..]).iter().all(|x| x.is_nan()));
    assert!(result.speckle_cts.slice(s![1, .., ..]).iter().all(|x| !x.is_nan()));

    // ...while timebin_num^2 frames activate it at least once
    let long = common::constant_stack([1, 2], &[1.0; 4]);
    let result = process_runs(single_run(long), labels.view(), &params).unwrap();
    assert!(result.speckle_cts.slice(s![2, .., ..]).iter().all(|x| !x.is_nan()));
}

#[test]
fn empty_sample_collection_is_nan() {
    let labels = array![[1_usize, 1]];
    let params = XsvsParams::new(2, 4, 4).unwrap();
    let result = process_runs(
        Vec::<(String, StackFrameSource)>::new(),
        labels.view(),
        &params,
    )
    .unwrap();
    // never silently zero
    assert!(result.speckle_cts.iter().all(|x| x.is_nan()));
    assert!(result.speckle_cts_pow.iter().all(|x| x.is_nan()));
    assert!(result.std_dev.iter().all(|x| x.is_nan()));
}

#[test]
fn zero_length_run_contributes_nothing() {
    let labels = array![[1_usize, 1]];
    let params = XsvsParams::new(2, 4, 4).unwrap();
    let stack = common::constant_stack([1, 2], &[1.0, 3.0, 1.0, 3.0]);

    let with_empty = vec![
        (
            "empty".to_string(),
            StackFrameSource::new(Array3::zeros((0, 1, 2))),
        ),
        ("real".to_string(), StackFrameSource::new(stack.clone())),
    ];
    let a = process_runs(with_empty, labels.view(), &params).unwrap();
    let b = process_runs(single_run(stack), labels.view(), &params).unwrap();
    common::assert_allclose(&a.speckle_cts, &b.speckle_cts, 0.0, 0.0);
    common::assert_allclose(&a.std_dev, &b.std_dev, 0.0, 0.0);
}

#[test]
fn frame_shape_mismatch_fails_run() {
    let labels = array![[1_usize, 1]];
    let params = XsvsParams::new(2, 4, 4).unwrap();
    // frames are 1x3 but the label map is 1x2
    let stack = common::constant_stack([1, 3], &[1.0, 1.0]);
    assert!(process_runs(single_run(stack), labels.view(), &params).is_err());
}

#[test]
fn label_map_validation() {
    let params = XsvsParams::new(2, 4, 4).unwrap();
    let stack = common::constant_stack([1, 2], &[1.0]);

    // no labeled pixels at all
    let unlabeled = array![[0_usize, 0]];
    assert!(
        process_runs(
            vec![("r".to_string(), StackFrameSource::new(stack.clone()))],
            unlabeled.view(),
            &params
        )
        .is_err()
    );

    // id 2 present, id 1 empty
    let gappy = array![[2_usize, 2]];
    assert!(
        process_runs(
            vec![("r".to_string(), StackFrameSource::new(stack))],
            gappy.view(),
            &params
        )
        .is_err()
    );
}

#[test]
fn source_fault_aborts_run() {
    let labels = array![[1_usize, 1]];
    let params = XsvsParams::new(2, 4, 4).unwrap();

    let frames: Vec<Result<ndarray::Array2<f64>, Error>> = vec![
        Ok(array![[1.0, 1.0]]),
        Err(Error::frame_source("detector stream dropped".to_string())),
    ];
    let samples = vec![("flaky".to_string(), frames.into_iter())];
    assert!(process_runs(samples, labels.view(), &params).is_err());
}
