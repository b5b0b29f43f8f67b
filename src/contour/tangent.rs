//! Keypoint location via the common internal tangent of two valleys.
//!
//! The two valleys flanking the middle fingers anchor the ROI coordinate
//! frame: the line touching both valley curves without crossing into either
//! interior meets them at the two keypoints.

use crate::config::ExtractConfig;
use crate::contour::valley::Valley;
use crate::contour::{Point, PointF};
use crate::util::interp::resample_even;
use crate::util::GeometryError;

/// The two anchor points of one ROI extraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Keypoints {
    /// Touch point on the topmost valley.
    pub distal: Point,
    /// Touch point on the bottommost valley; the ROI is anchored here.
    pub proximal: Point,
}

/// Selects the two valleys of interest and finds their tangent points.
///
/// Single-point valleys are discarded as noise first. The remaining valleys
/// are ordered by the vertical position of their first point; the topmost and
/// bottommost are resampled to `interp_steps` points and searched for a
/// common internal tangent.
pub fn locate_keypoints(
    valleys: &[Valley],
    cfg: &ExtractConfig,
) -> Result<Keypoints, GeometryError> {
    if valleys.len() < 2 {
        return Err(GeometryError::InsufficientValleys {
            found: valleys.len(),
        });
    }

    let mut usable: Vec<&Valley> = valleys.iter().filter(|v| v.points.len() > 1).collect();
    if usable.len() < 2 {
        return Err(GeometryError::InsufficientValleys {
            found: usable.len(),
        });
    }
    usable.sort_by_key(|v| v.points[0].y);

    let as_float = |v: &Valley| -> Vec<PointF> { v.points.iter().map(|p| p.to_f()).collect() };
    let top = resample_even(&as_float(usable[0]), cfg.interp_steps);
    let bottom = resample_even(&as_float(usable[usable.len() - 1]), cfg.interp_steps);

    let (distal, proximal) = find_tangent_points(&top, &bottom).ok_or(GeometryError::NoTangent)?;
    Ok(Keypoints { distal, proximal })
}

/// Searches for a pair of points whose connecting line is a common internal
/// tangent of both curves.
///
/// For each candidate pair the line's implicit equation is evaluated at every
/// point of both curves; the first pair for which no point lies beyond the
/// line is returned, rounded to integer pixels. Pairs with coincident
/// y-coordinates are skipped since the line equation degenerates there.
pub fn find_tangent_points(v_1: &[PointF], v_2: &[PointF]) -> Option<(Point, Point)> {
    for p_1 in v_1 {
        for p_2 in v_2 {
            if p_1.y == p_2.y {
                continue;
            }
            let touches = v_1.iter().chain(v_2.iter()).all(|p| {
                p_1.x * ((p.y - p_2.y) / (p_1.y - p_2.y))
                    + p_2.x * ((p.y - p_1.y) / (p_2.y - p_1.y))
                    >= p.x
            });
            if touches {
                return Some((p_1.round(), p_2.round()));
            }
        }
    }
    None
}
