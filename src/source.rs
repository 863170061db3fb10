//! Frame sources.
//!
//! A run is a finite, ordered sequence of frames. Where those frames come
//! from (an in-memory stack, a file, a socket) is opaque to the cascade:
//! a source may block inside [`FrameSource::next_frame`] and the core will
//! simply wait. Faults are fatal for the run being read; there is no retry
//! layer here.

use ndarray::{Array2, Array3, Axis};

use crate::error::Error;

/// A pull-based supplier of one run's frames.
pub trait FrameSource {
    /// The next frame, `None` once the run is exhausted, or an error if the
    /// underlying medium failed (which aborts the run).
    fn next_frame(&mut self) -> Option<Result<Array2<f64>, Error>>;
}

/// Any fallible frame iterator is a frame source.
impl<I> FrameSource for I
where
    I: Iterator<Item = Result<Array2<f64>, Error>>,
{
    fn next_frame(&mut self) -> Option<Result<Array2<f64>, Error>> {
        self.next()
    }
}

/// An in-memory frame stack (`[n_img, n_rows, n_cols]`) viewed as a source.
pub struct StackFrameSource {
    stack: Array3<f64>,
    pos: usize,
}

impl StackFrameSource {
    pub fn new(stack: Array3<f64>) -> Self {
        Self { stack, pos: 0 }
    }
}

impl FrameSource for StackFrameSource {
    fn next_frame(&mut self) -> Option<Result<Array2<f64>, Error>> {
        if self.pos >= self.stack.len_of(Axis(0)) {
            return None;
        }
        let frame = self.stack.index_axis(Axis(0), self.pos).to_owned();
        self.pos += 1;
        Some(Ok(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_source_yields_each_frame_once() {
        let stack = Array3::from_shape_fn((3, 2, 2), |(i, _, _)| i as f64);
        let mut source = StackFrameSource::new(stack);
        for expected in 0..3 {
            let frame = source.next_frame().unwrap().unwrap();
            assert!(frame.iter().all(|&v| v == expected as f64));
        }
        assert!(source.next_frame().is_none());
    }
}
