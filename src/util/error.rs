//! Error types for palmcode.

use thiserror::Error;

/// Result alias for palmcode operations.
pub type PalmcodeResult<T> = std::result::Result<T, PalmcodeError>;

/// Failure kinds of the geometric ROI extraction.
///
/// A geometry failure is fatal to that single extraction attempt and is never
/// retried automatically. It is distinct from a negative verification
/// outcome, which is a normal result and not an error at all.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    /// No foreground boundary was found in the binarized frame.
    #[error("no contour found")]
    NoContour,
    /// Fewer than two usable valleys remained after noise filtering.
    #[error("expected at least 2 usable valleys, found {found}")]
    InsufficientValleys {
        /// Number of usable valleys that were found.
        found: usize,
    },
    /// No common internal tangent exists between the selected valleys.
    #[error("no tangent pair found between the selected valleys")]
    NoTangent,
    /// The keypoints are vertically coincident, so the rotation angle is undefined.
    #[error("degenerate keypoint baseline")]
    DegenerateBaseline,
}

/// Errors that can occur when running palmcode algorithms.
#[derive(Debug, Error)]
pub enum PalmcodeError {
    /// ROI extraction failed on the hand geometry.
    #[error("roi extraction failed: {0}")]
    Geometry(#[from] GeometryError),
    /// The image dimensions are invalid.
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width in pixels.
        width: usize,
        /// Requested height in pixels.
        height: usize,
    },
    /// The pixel buffer does not match the given dimensions.
    #[error("buffer length mismatch: needed {needed}, got {got}")]
    BufferSizeMismatch {
        /// Number of samples required by the dimensions.
        needed: usize,
        /// Number of samples provided.
        got: usize,
    },
    /// A decoded image expected to be binary carries other sample values.
    ///
    /// This indicates corrupted storage or a programming error upstream, not
    /// a runtime business case.
    #[error("non-binary sample value {value} in {context}")]
    NonBinary {
        /// Offending sample value.
        value: u8,
        /// Which input carried the value.
        context: &'static str,
    },
    /// Two bit grids expected to be co-registered differ in size.
    #[error("bit grid size mismatch: {left} vs {right} bits")]
    CodeSizeMismatch {
        /// Bit length of the left-hand grid.
        left: usize,
        /// Bit length of the right-hand grid.
        right: usize,
    },
    /// The storage collaborator reported a failure.
    #[error("template store failure: {reason}")]
    Store {
        /// Description supplied by the collaborator.
        reason: String,
    },
    /// Image decoding or encoding failed.
    #[cfg(feature = "image-io")]
    #[error("image i/o failure: {reason}")]
    ImageIo {
        /// Description of the codec failure.
        reason: String,
    },
}

impl PalmcodeError {
    /// Returns the geometry failure kind if this error is one.
    pub fn geometry(&self) -> Option<GeometryError> {
        match self {
            Self::Geometry(kind) => Some(*kind),
            _ => None,
        }
    }
}
