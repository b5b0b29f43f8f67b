//! Even resampling of point sequences.
//!
//! Valley curves come out of the contour walk with per-pixel jaggedness.
//! Resampling a curve to a fixed number of evenly spaced points (linear
//! interpolation over the sequence index) smooths it without moving the
//! endpoints.

use crate::contour::PointF;

/// Resamples `points` to `steps` evenly spaced points.
///
/// Sample positions are spread linearly over the sequence index range, so the
/// first and last input points are reproduced exactly, as is any sample whose
/// position coincides with an input index.
pub fn resample_even(points: &[PointF], steps: usize) -> Vec<PointF> {
    if points.is_empty() || steps == 0 {
        return Vec::new();
    }
    if points.len() == 1 || steps == 1 {
        return vec![points[0]];
    }

    let last = (points.len() - 1) as f64;
    let mut out = Vec::with_capacity(steps);
    for k in 0..steps {
        let s = (k as f64 / (steps - 1) as f64) * last;
        let j = s.floor() as usize;
        if j >= points.len() - 1 {
            out.push(points[points.len() - 1]);
            continue;
        }
        let t = s - j as f64;
        if t == 0.0 {
            out.push(points[j]);
            continue;
        }
        let a = points[j];
        let b = points[j + 1];
        out.push(PointF {
            x: a.x + t * (b.x - a.x),
            y: a.y + t * (b.y - a.y),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::resample_even;
    use crate::contour::PointF;

    fn pt(x: f64, y: f64) -> PointF {
        PointF { x, y }
    }

    #[test]
    fn colinear_pair_resamples_evenly() {
        let points = [pt(0.0, 0.0), pt(0.0, 1.0)];
        let out = resample_even(&points, 5);
        let expected = [
            pt(0.0, 0.0),
            pt(0.0, 0.25),
            pt(0.0, 0.5),
            pt(0.0, 0.75),
            pt(0.0, 1.0),
        ];
        assert_eq!(out.len(), 5);
        for (got, want) in out.iter().zip(expected.iter()) {
            assert_eq!(got.x, want.x);
            assert_eq!(got.y, want.y);
        }
    }

    #[test]
    fn parabola_samples_hit_input_indices_exactly() {
        // y = x^2 sampled at x = 0, 1, 2; steps chosen so indices 0, 1, 2
        // coincide with sample positions 0, 2, 4.
        let points = [pt(0.0, 0.0), pt(1.0, 1.0), pt(2.0, 4.0)];
        let out = resample_even(&points, 5);
        assert_eq!(out.len(), 5);
        assert_eq!((out[0].x, out[0].y), (0.0, 0.0));
        assert_eq!((out[2].x, out[2].y), (1.0, 1.0));
        assert_eq!((out[4].x, out[4].y), (2.0, 4.0));
        // interior samples lie on the chords
        assert_eq!((out[1].x, out[1].y), (0.5, 0.5));
        assert_eq!((out[3].x, out[3].y), (1.5, 2.5));
    }

    #[test]
    fn degenerate_inputs() {
        assert!(resample_even(&[], 5).is_empty());
        let single = resample_even(&[pt(3.0, 4.0)], 5);
        assert_eq!(single.len(), 1);
        assert_eq!((single[0].x, single[0].y), (3.0, 4.0));
    }
}
