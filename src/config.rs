//! Tunable pipeline parameters.
//!
//! The defaults are the constants the pipeline was tuned with. They are
//! exposed as named configuration rather than literals so the thresholds,
//! radii, orientation count and translation palette can be adjusted (and
//! A/B-tested) without touching the algorithms.

/// Parameters of the geometric ROI extraction.
#[derive(Clone, Debug)]
pub struct ExtractConfig {
    /// Binarization threshold as a fraction of the blurred image mean.
    pub thresh_factor: f64,
    /// Side of the Gaussian blur kernel (odd).
    pub blur_kernel: usize,
    /// Number of directions `n` in the neighborhood curvature test.
    pub curvature_samples: u32,
    /// Sampling radius `r` of the curvature test, in pixels.
    pub curvature_radius: i64,
    /// Lower bound of the curvature acceptance band.
    pub curvature_low: f64,
    /// Upper bound of the curvature acceptance band.
    pub curvature_high: f64,
    /// Half-side of the brightness gate window around a candidate point.
    pub brightness_window: i64,
    /// Minimum mean grayscale brightness for a valley point.
    pub brightness_floor: f64,
    /// Maximum contour-index gap between points of the same valley.
    pub connectivity_gap: usize,
    /// Number of points each selected valley is resampled to.
    pub interp_steps: usize,
    /// Half-side of the square ROI, in pixels.
    pub roi_radius: usize,
    /// Horizontal offset of the ROI from the proximal keypoint.
    pub roi_offset: usize,
    /// Brightness floor separating hand tissue from background in the mask.
    pub mask_threshold: u8,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            thresh_factor: 0.5,
            blur_kernel: 7,
            curvature_samples: 32,
            curvature_radius: 10,
            curvature_low: 23.0 / 32.0,
            curvature_high: 31.0 / 32.0,
            brightness_window: 10,
            brightness_floor: 150.0,
            connectivity_gap: 15,
            interp_steps: 10,
            roi_radius: 75,
            roi_offset: 10,
            mask_threshold: 85,
        }
    }
}

/// Parameters of the Gabor filter bank encoder.
#[derive(Clone, Debug)]
pub struct GaborConfig {
    /// Side of the square kernels (odd).
    pub kernel_size: usize,
    /// Standard deviation of the Gaussian envelope.
    pub sigma: f64,
    /// Number of orientations, evenly spaced over `[0, pi)`.
    pub orientations: usize,
    /// Wavelength of the sinusoidal factor.
    pub wavelength: f64,
    /// Spatial aspect ratio of the envelope.
    pub aspect: f64,
    /// Phase offset of the sinusoidal factor.
    pub phase: f64,
    /// Response threshold separating line pixels from the rest.
    pub threshold: u8,
}

impl Default for GaborConfig {
    fn default() -> Self {
        Self {
            kernel_size: 35,
            sigma: 5.6179,
            orientations: 32,
            wavelength: 1.0 / 0.0916,
            aspect: 0.7,
            phase: 0.0,
            threshold: 150,
        }
    }
}

/// Parameters of the masked Hamming matcher.
#[derive(Clone, Debug)]
pub struct MatchingConfig {
    /// Maximum distance at which a query is accepted.
    pub hamming_threshold: f64,
    /// Border margin cropped from both sides before a shifted comparison.
    pub inset: usize,
    /// Translation palette searched in addition to the zero offset.
    pub offsets: Vec<(i32, i32)>,
    /// Evaluate template comparisons in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl MatchingConfig {
    /// The translation palette the matcher was tuned with: the eight unit
    /// offsets and the eight two-pixel offsets around the origin.
    pub fn default_offsets() -> Vec<(i32, i32)> {
        vec![
            (-1, -1),
            (0, -1),
            (1, -1),
            (1, 0),
            (1, 1),
            (0, 1),
            (-1, 1),
            (-1, 0),
            (-2, -2),
            (0, -2),
            (2, -2),
            (2, 0),
            (2, 2),
            (0, 2),
            (-2, 2),
            (-2, 0),
        ]
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            hamming_threshold: 0.43,
            inset: 2,
            offsets: Self::default_offsets(),
            parallel: true,
        }
    }
}
