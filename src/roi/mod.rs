//! ROI normalization: rotate the palm into a canonical pose and crop a fixed
//! square window next to the keypoint baseline.
//!
//! The baseline runs from the proximal keypoint up to the distal one. The
//! frame is rotated about the proximal keypoint until the baseline is
//! vertical, then a `2 * roi_radius` square is cropped to the right of it,
//! centered on the baseline midpoint. Out-of-frame samples are zero-filled so
//! the ROI always has the same dimensions.

use crate::config::ExtractConfig;
use crate::contour::tangent::Keypoints;
use crate::image::{ops, BinaryImage, GrayImage, BACKGROUND, FOREGROUND};
use crate::util::{GeometryError, PalmcodeResult};

/// Canonical ROI with its foreground mask.
#[derive(Clone, Debug)]
pub struct RoiExtraction {
    /// Pose-normalized grayscale window.
    pub roi: GrayImage,
    /// Foreground mask of the window; background is everything darker than
    /// the mask threshold.
    pub mask: BinaryImage,
}

/// Rotates the frame so the keypoint baseline is vertical and crops the ROI.
///
/// Fails with [`GeometryError::DegenerateBaseline`] when the keypoints share a
/// row, leaving the rotation angle undefined.
pub fn normalize_roi(
    img: &GrayImage,
    kp: Keypoints,
    cfg: &ExtractConfig,
) -> PalmcodeResult<GrayImage> {
    let a = (kp.distal.x - kp.proximal.x) as f64;
    let b = (kp.proximal.y - kp.distal.y) as f64;
    if b == 0.0 {
        return Err(GeometryError::DegenerateBaseline.into());
    }

    let angle_deg = (a / b).atan().to_degrees();
    let center = (kp.proximal.x as f64, kp.proximal.y as f64);
    let rotated = ops::rotate_about(img, center, angle_deg, 0);

    let dist = (a * a + b * b).sqrt();
    let y_mid = kp.proximal.y - (dist * 0.5).round() as i64;
    let side = 2 * cfg.roi_radius;
    ops::crop_with_fill(
        &rotated,
        kp.proximal.x + cfg.roi_offset as i64,
        y_mid - cfg.roi_radius as i64,
        side,
        side,
        0,
    )
}

/// Thresholds the ROI into its foreground mask: samples below `threshold`
/// are background, everything else hand tissue.
pub fn build_mask(roi: &GrayImage, threshold: u8) -> BinaryImage {
    let data = roi
        .as_slice()
        .iter()
        .map(|&v| if v < threshold { BACKGROUND } else { FOREGROUND })
        .collect();
    let out =
        GrayImage::new(data, roi.width(), roi.height()).expect("same shape as input");
    BinaryImage::from_gray_unchecked(out)
}

#[cfg(test)]
mod tests {
    use super::{build_mask, normalize_roi};
    use crate::config::ExtractConfig;
    use crate::contour::tangent::Keypoints;
    use crate::contour::Point;
    use crate::image::{ops, GrayImage};
    use crate::util::GeometryError;

    fn pt(x: i64, y: i64) -> Point {
        Point { x, y }
    }

    #[test]
    fn roi_has_fixed_dimensions_even_off_frame() {
        // source much smaller than the crop window
        let img = GrayImage::from_fn(80, 80, |x, y| (x + y) as u8).unwrap();
        let cfg = ExtractConfig::default();
        let kp = Keypoints {
            distal: pt(20, 10),
            proximal: pt(20, 70),
        };
        let roi = normalize_roi(&img, kp, &cfg).unwrap();
        assert_eq!(roi.width(), 150);
        assert_eq!(roi.height(), 150);
    }

    #[test]
    fn vertical_baseline_reduces_to_a_plain_crop() {
        // distal directly above proximal: rotation angle is zero and the ROI
        // must equal a direct crop of the source
        let img = GrayImage::from_fn(220, 220, |x, y| ((x * 3 + y * 5) % 251) as u8).unwrap();
        let cfg = ExtractConfig::default();
        let kp = Keypoints {
            distal: pt(30, 40),
            proximal: pt(30, 160),
        };
        let roi = normalize_roi(&img, kp, &cfg).unwrap();

        // baseline length 120, midpoint row 100
        let expected = ops::crop_with_fill(&img, 40, 25, 150, 150, 0).unwrap();
        assert_eq!(roi, expected);
    }

    #[test]
    fn coincident_rows_are_degenerate() {
        let img = GrayImage::from_fn(80, 80, |_, _| 128).unwrap();
        let cfg = ExtractConfig::default();
        let kp = Keypoints {
            distal: pt(10, 40),
            proximal: pt(30, 40),
        };
        let err = normalize_roi(&img, kp, &cfg).unwrap_err();
        assert_eq!(err.geometry(), Some(GeometryError::DegenerateBaseline));
    }

    #[test]
    fn mask_splits_at_threshold() {
        let roi = GrayImage::new(vec![0, 84, 85, 200], 2, 2).unwrap();
        let mask = build_mask(&roi, 85);
        assert_eq!(mask.as_gray().as_slice(), &[0, 0, 255, 255]);
    }
}
