//! Texture encoding with a bank of oriented Gabor filters.
//!
//! The bank holds one kernel per orientation, evenly spaced over `[0, pi)`.
//! Each kernel is correlated with the ROI, the responses are merged by
//! per-pixel minimum so a line detected under any orientation survives, and
//! the merged response is thresholded into the binary palm code. Dark code
//! samples mark line pixels.
//!
//! Kernels are compiled once per configuration and reused across encodes.

use std::f64::consts::PI;

use crate::config::GaborConfig;
use crate::image::{ops, BinaryImage, GrayImage, BACKGROUND, FOREGROUND};

/// One compiled real-valued square kernel.
#[derive(Clone, Debug)]
struct Kernel {
    /// Row-major weights, `size * size` of them.
    weights: Vec<f64>,
    /// Kernel side (odd).
    size: usize,
}

/// Precompiled Gabor filter bank.
#[derive(Clone, Debug)]
pub struct GaborBank {
    kernels: Vec<Kernel>,
    threshold: u8,
}

impl GaborBank {
    /// Compiles the kernels for every orientation of `cfg`.
    pub fn compile(cfg: &GaborConfig) -> Self {
        let kernels = (0..cfg.orientations)
            .map(|i| {
                let theta = i as f64 * PI / cfg.orientations as f64;
                Kernel {
                    weights: gabor_weights(
                        cfg.kernel_size,
                        cfg.sigma,
                        theta,
                        cfg.wavelength,
                        cfg.aspect,
                        cfg.phase,
                    ),
                    size: cfg.kernel_size,
                }
            })
            .collect();
        Self {
            kernels,
            threshold: cfg.threshold,
        }
    }

    /// Number of orientations in the bank.
    pub fn orientations(&self) -> usize {
        self.kernels.len()
    }

    /// Encodes an ROI into its binary palm code.
    ///
    /// The code has the ROI dimensions; a `BACKGROUND` sample marks a line
    /// pixel (strong filter response under at least one orientation).
    pub fn encode(&self, roi: &GrayImage) -> BinaryImage {
        let width = roi.width();
        let height = roi.height();

        let mut merged = vec![u8::MAX; width * height];
        for kernel in &self.kernels {
            let response = correlate(roi, kernel);
            for (m, &r) in merged.iter_mut().zip(response.iter()) {
                *m = (*m).min(r);
            }
        }

        let data = merged
            .into_iter()
            .map(|v| if v < self.threshold { BACKGROUND } else { FOREGROUND })
            .collect();
        let out = GrayImage::new(data, width, height).expect("same shape as input");
        BinaryImage::from_gray_unchecked(out)
    }
}

/// Evaluates the Gabor function on a `size x size` grid centered at the
/// origin.
///
/// The envelope has standard deviation `sigma` along the wave direction and
/// `sigma / aspect` across it; the carrier is a cosine of the given
/// wavelength and phase along the wave direction.
fn gabor_weights(
    size: usize,
    sigma: f64,
    theta: f64,
    wavelength: f64,
    aspect: f64,
    phase: f64,
) -> Vec<f64> {
    debug_assert!(size % 2 == 1 && size >= 1);
    let half = (size / 2) as i64;
    let (sin_t, cos_t) = theta.sin_cos();
    let ex = -0.5 / (sigma * sigma);
    let sigma_y = sigma / aspect;
    let ey = -0.5 / (sigma_y * sigma_y);
    let freq = 2.0 * PI / wavelength;

    let mut weights = Vec::with_capacity(size * size);
    for y in -half..=half {
        for x in -half..=half {
            let xr = x as f64 * cos_t + y as f64 * sin_t;
            let yr = -(x as f64) * sin_t + y as f64 * cos_t;
            weights.push((ex * xr * xr + ey * yr * yr).exp() * (freq * xr + phase).cos());
        }
    }
    weights
}

/// Correlates the image with a kernel under reflect-101 boundary handling,
/// saturating each response sample to `u8`.
fn correlate(img: &GrayImage, kernel: &Kernel) -> Vec<u8> {
    let width = img.width();
    let height = img.height();
    let half = (kernel.size / 2) as i64;

    let mut out = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0f64;
            let mut w = kernel.weights.iter();
            for ky in -half..=half {
                let sy = ops::reflect_101(y as i64 + ky, height);
                let row = img.row(sy).expect("reflected row in bounds");
                for kx in -half..=half {
                    let sx = ops::reflect_101(x as i64 + kx, width);
                    acc += w.next().expect("weights match kernel size") * row[sx] as f64;
                }
            }
            out[y * width + x] = acc.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}
