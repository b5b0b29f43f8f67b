//! Valley detection along the hand contour.
//!
//! Valleys are locally concave clusters of contour points, which for a spread
//! hand correspond to the gaps between fingers. Concavity is estimated with a
//! neighborhood sampling test and gated by the local grayscale brightness so
//! dips that fall on shadow or background are rejected.

use crate::config::ExtractConfig;
use crate::contour::{Contour, Point};
use crate::image::{ops, BinaryImage, GrayImage};

/// One concave run of contour points, in contour-walk order.
#[derive(Clone, Debug)]
pub struct Valley {
    /// Points of the run; never empty.
    pub points: Vec<Point>,
}

/// Approximates the local curvature at `p` by sampling `n` neighbor
/// directions at radius `r` and measuring the fraction that lands on
/// foreground.
///
/// Directions cover one quadrant at `360 / n` degree increments and are
/// mirrored into the other quadrants by sign construction. A fraction close
/// to 1 means `p` sits in a sharp concave dip. Points within `r` of any image
/// edge return exactly 0.0; curvature there is unreliable.
pub fn neighborhood_curvature(p: Point, bin: &BinaryImage, n: u32, r: i64) -> f64 {
    let width = bin.width() as i64;
    let height = bin.height() as i64;
    if p.x == 0
        || p.y == 0
        || p.x + r >= width
        || p.x - r < 0
        || p.y + r >= height
        || p.y - r < 0
    {
        return 0.0;
    }

    let fg = |x: i64, y: i64| -> u32 {
        u32::from(bin.is_foreground(x as usize, y as usize).unwrap_or(false))
    };

    let stepsize = (360 / n) as usize;
    let mut hits = 0u32;
    for a in (0..90).step_by(stepsize) {
        let rad = (a as f64).to_radians();
        // two-decimal rounding keeps the sample ring stable across platforms
        let d_y = (rad.cos() * 100.0).round() / 100.0;
        let d_x = (rad.sin() * 100.0).round() / 100.0;
        let y_p = (p.y as f64 - r as f64 * d_y).round() as i64;
        let y_n = (p.y as f64 + r as f64 * d_y).round() as i64;
        let x_p = (p.x as f64 + r as f64 * d_x).round() as i64;
        let x_n = (p.x as f64 - r as f64 * d_x).round() as i64;

        hits += fg(x_p, y_p) + fg(x_p, y_n) + fg(x_n, y_n) + fg(x_n, y_p);
    }

    hits as f64 / n as f64
}

/// Scans the contour for valleys.
///
/// A point qualifies when its curvature falls inside the acceptance band and
/// the mean grayscale brightness of the window around it clears the floor.
/// Qualifying points are merged into the current valley while the
/// contour-index gap stays within `connectivity_gap`; a larger gap starts a
/// new valley.
pub fn find_valleys(
    gray: &GrayImage,
    bin: &BinaryImage,
    contour: &Contour,
    cfg: &ExtractConfig,
) -> Vec<Valley> {
    let mut valleys: Vec<Valley> = Vec::new();
    let mut last = 0usize;

    for (i, &c) in contour.points().iter().enumerate() {
        let curvature =
            neighborhood_curvature(c, bin, cfg.curvature_samples, cfg.curvature_radius);
        if curvature < cfg.curvature_low || curvature > cfg.curvature_high {
            continue;
        }
        if ops::mean_window(gray, c.x, c.y, cfg.brightness_window) < cfg.brightness_floor {
            continue;
        }

        match valleys.last_mut() {
            Some(v) if i - last <= cfg.connectivity_gap => v.points.push(c),
            _ => valleys.push(Valley { points: vec![c] }),
        }
        last = i;
    }

    valleys
}
