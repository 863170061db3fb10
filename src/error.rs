//! The crate-wide error type.
//!
//! Internal modules report failures through a single [`Error`] type that
//! wraps a private `ErrorKind` enum. Callers match on behavior (via
//! `Display`/`std::error::Error`) rather than on the concrete variants,
//! which keeps us free to reorganize the kinds as the crate evolves.

/// The error type returned by fallible operations in this crate.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

/// The underlying internal error type
#[non_exhaustive]
#[derive(Clone, Debug)]
enum ErrorKind {
    /// A frame's shape doesn't match the ROI label map
    FrameShape(FrameShapeError),
    /// A fault reported by a [`crate::FrameSource`] while reading a run
    FrameSource(FrameSourceError),
    /// An error that occurs when an integer parameter lies outside of the
    /// acceptable range of values
    IntegerRange(IntegerRangeError),
    /// A problem with the ROI label map detected before processing begins
    LabelMap(LabelMapError),
}

// define constructor methods for Error
impl Error {
    /// produce an error indicating that a frame's shape doesn't match the
    /// shape of the ROI label map
    pub(crate) fn frame_shape(expected: [usize; 2], actual: [usize; 2], frame_idx: usize) -> Self {
        Error {
            kind: ErrorKind::FrameShape(FrameShapeError {
                expected,
                actual,
                frame_idx,
            }),
        }
    }

    /// produce an error wrapping a fault from a frame source.
    ///
    /// This is public so that [`crate::FrameSource`] implementations outside
    /// this crate can report I/O faults. Such faults are fatal for the run
    /// being read; the core never retries them.
    pub fn frame_source(message: String) -> Self {
        Error {
            kind: ErrorKind::FrameSource(FrameSourceError { message }),
        }
    }

    /// produce an error indicating that an integer parameter lies outside
    /// the acceptable range of values
    pub(crate) fn integer_range(
        description: &'static str,
        actual: i64,
        min_val: i64,
        max_val: i64,
    ) -> Self {
        Error {
            kind: ErrorKind::IntegerRange(IntegerRangeError {
                description,
                actual,
                min_val,
                max_val,
            }),
        }
    }

    /// produce an error indicating that an ROI id has no labeled pixels
    pub(crate) fn empty_roi(roi_id: usize) -> Self {
        Error {
            kind: ErrorKind::LabelMap(LabelMapError::EmptyRoi { roi_id }),
        }
    }

    /// produce an error indicating that the label map contains no labeled
    /// pixels at all
    pub(crate) fn no_labeled_pixels() -> Self {
        Error {
            kind: ErrorKind::LabelMap(LabelMapError::NoLabeledPixels),
        }
    }
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        self.kind.fmt(f)
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            ErrorKind::FrameShape(ref err) => err.fmt(f),
            ErrorKind::FrameSource(ref err) => err.fmt(f),
            ErrorKind::IntegerRange(ref err) => err.fmt(f),
            ErrorKind::LabelMap(ref err) => err.fmt(f),
        }
    }
}

/// A frame's shape doesn't match the ROI label map.
///
/// This fails the run immediately (the offending frame is not partially
/// processed).
#[derive(Clone, Debug)]
struct FrameShapeError {
    expected: [usize; 2],
    actual: [usize; 2],
    frame_idx: usize,
}

impl core::fmt::Display for FrameShapeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "frame {} has shape [{}, {}], but the ROI label map has shape \
             [{}, {}]",
            self.frame_idx, self.actual[0], self.actual[1], self.expected[0], self.expected[1]
        )
    }
}

/// A fault reported by a frame source while reading a run
#[derive(Clone, Debug)]
struct FrameSourceError {
    message: String,
}

impl core::fmt::Display for FrameSourceError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "frame source fault: {}", self.message)
    }
}

/// An error that occurs when an integer parameter lies outside of the
/// acceptable range of values
#[derive(Clone, Debug)]
struct IntegerRangeError {
    description: &'static str,
    actual: i64,
    min_val: i64,
    max_val: i64,
}

impl core::fmt::Display for IntegerRangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{} has a value of {}. The value should be no less than {} and \
             not exceed {}",
            self.description, self.actual, self.min_val, self.max_val
        )
    }
}

/// A problem with the ROI label map detected before processing begins
#[derive(Clone, Debug)]
enum LabelMapError {
    EmptyRoi { roi_id: usize },
    NoLabeledPixels,
}

impl core::fmt::Display for LabelMapError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            LabelMapError::EmptyRoi { roi_id } => {
                write!(f, "ROI id {roi_id} has no labeled pixels")
            }
            LabelMapError::NoLabeledPixels => {
                write!(f, "the label map assigns no pixel to any ROI (all ids are 0)")
            }
        }
    }
}
