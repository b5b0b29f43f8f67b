//! Owned grayscale and binary image buffers.
//!
//! `GrayImage` is a contiguous row-major `u8` grid with the origin at the
//! top-left. `BinaryImage` wraps a `GrayImage` whose samples are restricted
//! to the two sentinel values; the constructor enforces the restriction so
//! downstream bit operations never re-validate.

use crate::util::{PalmcodeError, PalmcodeResult};

pub mod ops;

#[cfg(feature = "image-io")]
pub mod io;

/// Sample value marking hand tissue in a binary image.
pub const FOREGROUND: u8 = 255;
/// Sample value marking background in a binary image.
pub const BACKGROUND: u8 = 0;

/// Owned contiguous grayscale image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl GrayImage {
    /// Creates an image from a row-major buffer of exactly `width * height` samples.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> PalmcodeResult<Self> {
        if width == 0 || height == 0 {
            return Err(PalmcodeError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(PalmcodeError::InvalidDimensions { width, height })?;
        if data.len() != needed {
            return Err(PalmcodeError::BufferSizeMismatch {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Creates an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F: FnMut(usize, usize) -> u8>(
        width: usize,
        height: usize,
        mut f: F,
    ) -> PalmcodeResult<Self> {
        if width == 0 || height == 0 {
            return Err(PalmcodeError::InvalidDimensions { width, height });
        }
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self::new(data, width, height)
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the backing row-major slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Returns the sample at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Returns a contiguous slice for row `y`.
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.data.get(start..start + self.width)
    }

    /// Returns the mean intensity over all samples.
    pub fn mean(&self) -> f64 {
        let sum: u64 = self.data.iter().map(|&v| v as u64).sum();
        sum as f64 / self.data.len() as f64
    }
}

/// Grayscale image whose samples are all `FOREGROUND` or `BACKGROUND`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryImage {
    img: GrayImage,
}

impl BinaryImage {
    /// Validates that every sample is one of the two sentinel values.
    ///
    /// `context` names the input for the error message; decoded storage bytes
    /// are the usual caller.
    pub fn from_gray(img: GrayImage, context: &'static str) -> PalmcodeResult<Self> {
        for &value in img.as_slice() {
            if value != FOREGROUND && value != BACKGROUND {
                return Err(PalmcodeError::NonBinary { value, context });
            }
        }
        Ok(Self { img })
    }

    /// Wraps an image already known to carry only sentinel values.
    pub(crate) fn from_gray_unchecked(img: GrayImage) -> Self {
        debug_assert!(img
            .as_slice()
            .iter()
            .all(|&v| v == FOREGROUND || v == BACKGROUND));
        Self { img }
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.img.width()
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.img.height()
    }

    /// Borrows the underlying grayscale image.
    pub fn as_gray(&self) -> &GrayImage {
        &self.img
    }

    /// Unwraps into the underlying grayscale image.
    pub fn into_gray(self) -> GrayImage {
        self.img
    }

    /// Returns whether `(x, y)` is a foreground sample; `None` out of bounds.
    pub fn is_foreground(&self, x: usize, y: usize) -> Option<bool> {
        self.img.get(x, y).map(|v| v == FOREGROUND)
    }
}
