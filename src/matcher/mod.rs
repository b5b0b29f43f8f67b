//! Palm code comparison by masked Hamming distance.
//!
//! Codes and masks are co-registered bit grids cut from the same ROI. The
//! distance between two prints is the fraction of bits that disagree where
//! both masks mark hand tissue. Small registration errors are absorbed by
//! re-evaluating the distance over a palette of query translations and
//! keeping the minimum.

use crate::config::MatchingConfig;
use crate::image::{BinaryImage, GrayImage, BACKGROUND, FOREGROUND};
use crate::util::{PalmcodeError, PalmcodeResult};

/// Dense row-major bit grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitGrid {
    bits: Vec<bool>,
    width: usize,
    height: usize,
}

impl BitGrid {
    /// Builds a code grid from an encoded ROI; dark samples are line bits.
    pub fn from_code(code: &BinaryImage) -> Self {
        Self {
            bits: code.as_gray().as_slice().iter().map(|&v| v == BACKGROUND).collect(),
            width: code.width(),
            height: code.height(),
        }
    }

    /// Builds a mask grid from a foreground mask; bright samples are kept.
    pub fn from_mask(mask: &BinaryImage) -> Self {
        Self {
            bits: mask.as_gray().as_slice().iter().map(|&v| v == FOREGROUND).collect(),
            width: mask.width(),
            height: mask.height(),
        }
    }

    /// Validates a raw grayscale image as a code grid.
    ///
    /// Storage bytes arrive here after decoding; any sample outside the two
    /// sentinel values is rejected as corruption.
    pub fn from_code_image(img: GrayImage, context: &'static str) -> PalmcodeResult<Self> {
        Ok(Self::from_code(&BinaryImage::from_gray(img, context)?))
    }

    /// Validates a raw grayscale image as a mask grid.
    pub fn from_mask_image(img: GrayImage, context: &'static str) -> PalmcodeResult<Self> {
        Ok(Self::from_mask(&BinaryImage::from_gray(img, context)?))
    }

    /// Grid width in bits.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in bits.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns whether the grid holds no bits.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Bit at `(x, y)`; `None` out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<bool> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.bits.get(y * self.width + x).copied()
    }

    /// Translates the grid by `(dx, dy)`, filling vacated bits with `false`.
    pub fn shifted(&self, dx: i32, dy: i32) -> Self {
        let mut bits = vec![false; self.bits.len()];
        for y in 0..self.height {
            let sy = y as i64 - dy as i64;
            if sy < 0 || sy >= self.height as i64 {
                continue;
            }
            for x in 0..self.width {
                let sx = x as i64 - dx as i64;
                if sx < 0 || sx >= self.width as i64 {
                    continue;
                }
                bits[y * self.width + x] = self.bits[sy as usize * self.width + sx as usize];
            }
        }
        Self {
            bits,
            width: self.width,
            height: self.height,
        }
    }

    /// Crops `margin` bits from every side; `None` when nothing remains.
    pub fn inset(&self, margin: usize) -> Option<Self> {
        if 2 * margin >= self.width || 2 * margin >= self.height {
            return None;
        }
        let width = self.width - 2 * margin;
        let height = self.height - 2 * margin;
        let mut bits = Vec::with_capacity(width * height);
        for y in 0..height {
            let start = (y + margin) * self.width + margin;
            bits.extend_from_slice(&self.bits[start..start + width]);
        }
        Some(Self {
            bits,
            width,
            height,
        })
    }
}

/// Fraction of bits that disagree between two codes where both masks mark
/// hand tissue.
///
/// The denominator is the full grid size, not the masked area, so heavily
/// masked prints cannot inflate their apparent dissimilarity.
pub fn masked_hamming(
    code_a: &BitGrid,
    mask_a: &BitGrid,
    code_b: &BitGrid,
    mask_b: &BitGrid,
) -> PalmcodeResult<f64> {
    for (left, right) in [
        (code_a.len(), mask_a.len()),
        (code_b.len(), mask_b.len()),
        (code_a.len(), code_b.len()),
    ] {
        if left != right {
            return Err(PalmcodeError::CodeSizeMismatch { left, right });
        }
    }

    let mut mismatches = 0usize;
    for i in 0..code_a.bits.len() {
        if (code_a.bits[i] ^ code_b.bits[i]) && mask_a.bits[i] && mask_b.bits[i] {
            mismatches += 1;
        }
    }
    Ok(mismatches as f64 / code_a.len() as f64)
}

/// Minimum masked Hamming distance over the zero offset and the translation
/// palette.
///
/// The zero-offset comparison uses the full grids. Each palette entry shifts
/// the query, crops `inset` from both grids so the vacated border never takes
/// part, and re-measures; comparisons that cannot be evaluated count as the
/// worst distance.
pub fn match_distance(
    query_code: &BitGrid,
    query_mask: &BitGrid,
    tpl_code: &BitGrid,
    tpl_mask: &BitGrid,
    cfg: &MatchingConfig,
) -> f64 {
    let mut best = masked_hamming(query_code, query_mask, tpl_code, tpl_mask).unwrap_or(1.0);

    let cropped = tpl_code.inset(cfg.inset).zip(tpl_mask.inset(cfg.inset));
    if let Some((tpl_code_in, tpl_mask_in)) = cropped {
        for &(dx, dy) in &cfg.offsets {
            let shifted_code = query_code.shifted(dx, dy).inset(cfg.inset);
            let shifted_mask = query_mask.shifted(dx, dy).inset(cfg.inset);
            let Some((code, mask)) = shifted_code.zip(shifted_mask) else {
                continue;
            };
            let d = masked_hamming(&code, &mask, &tpl_code_in, &tpl_mask_in).unwrap_or(1.0);
            if d < best {
                best = d;
            }
        }
    }

    best
}

/// Best template comparison for one query.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchResult {
    /// Identity label of the matched template.
    pub identity: String,
    /// Minimum masked Hamming distance over the translation palette.
    pub distance: f64,
}

/// Outcome of a verification.
#[derive(Clone, Debug, PartialEq)]
pub enum Decision {
    /// The best comparison cleared the acceptance threshold.
    Accepted(MatchResult),
    /// No comparison cleared the threshold; the best one (if any templates
    /// were enrolled) is carried for diagnostics.
    Rejected(Option<MatchResult>),
}

impl Decision {
    /// Applies the acceptance threshold to the best comparison found.
    pub fn from_best(best: Option<MatchResult>, threshold: f64) -> Self {
        match best {
            Some(result) if result.distance <= threshold => Self::Accepted(result),
            other => Self::Rejected(other),
        }
    }

    /// Returns whether the query was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// Best comparison carried by the decision, accepted or not.
    pub fn best(&self) -> Option<&MatchResult> {
        match self {
            Self::Accepted(result) => Some(result),
            Self::Rejected(result) => result.as_ref(),
        }
    }
}
