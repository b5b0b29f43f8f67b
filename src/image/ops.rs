//! Pixel operations used by the extraction pipeline.

use crate::image::{BinaryImage, GrayImage, BACKGROUND, FOREGROUND};
use crate::util::PalmcodeResult;

/// Reflects an index into `[0, len)` without repeating the border sample
/// (reflect-101 boundary handling).
pub(crate) fn reflect_101(idx: i64, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as i64 - 1);
    let mut i = idx.rem_euclid(period);
    if i >= len as i64 {
        i = period - i;
    }
    i as usize
}

fn gaussian_kernel_1d(ksize: usize) -> Vec<f64> {
    debug_assert!(ksize % 2 == 1 && ksize >= 1);
    // Sigma derived from the kernel size the same way OpenCV does when the
    // caller leaves it unspecified.
    let sigma = 0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let half = (ksize / 2) as i64;
    let mut kernel = Vec::with_capacity(ksize);
    let mut sum = 0.0;
    for i in -half..=half {
        let v = (-(i * i) as f64 / (2.0 * sigma * sigma)).exp();
        kernel.push(v);
        sum += v;
    }
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Applies a separable Gaussian blur with an odd kernel size.
pub fn gaussian_blur(img: &GrayImage, ksize: usize) -> GrayImage {
    let kernel = gaussian_kernel_1d(ksize);
    let half = (ksize / 2) as i64;
    let width = img.width();
    let height = img.height();

    // horizontal pass
    let mut horiz = vec![0.0f64; width * height];
    for y in 0..height {
        let row = img.row(y).expect("row within image");
        for x in 0..width {
            let mut acc = 0.0;
            for (k, &w) in kernel.iter().enumerate() {
                let sx = reflect_101(x as i64 + k as i64 - half, width);
                acc += w * row[sx] as f64;
            }
            horiz[y * width + x] = acc;
        }
    }

    // vertical pass
    let mut data = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (k, &w) in kernel.iter().enumerate() {
                let sy = reflect_101(y as i64 + k as i64 - half, height);
                acc += w * horiz[sy * width + x];
            }
            data[y * width + x] = acc.round().clamp(0.0, 255.0) as u8;
        }
    }

    GrayImage::new(data, width, height).expect("blur output is contiguous")
}

/// Thresholds an image into a binary one: samples strictly above `threshold`
/// become foreground, everything else background.
pub fn binarize(img: &GrayImage, threshold: f64) -> BinaryImage {
    let data = img
        .as_slice()
        .iter()
        .map(|&v| if (v as f64) > threshold { FOREGROUND } else { BACKGROUND })
        .collect();
    let out = GrayImage::new(data, img.width(), img.height()).expect("same shape as input");
    BinaryImage::from_gray_unchecked(out)
}

/// Rotates an image about an arbitrary center, keeping the source dimensions.
///
/// Positive angles rotate counter-clockwise in the usual image orientation
/// (the `getRotationMatrix2D` convention). Destination pixels are mapped back
/// into the source with the inverse rotation and sampled bilinearly; samples
/// outside the source are filled with `fill`.
pub fn rotate_about(img: &GrayImage, center: (f64, f64), angle_deg: f64, fill: u8) -> GrayImage {
    let width = img.width();
    let height = img.height();
    let mut out = vec![fill; width * height];

    let (sin_a, cos_a) = angle_deg.to_radians().sin_cos();
    let (cx, cy) = center;
    let max_x = width as f64 - 1.0;
    let max_y = height as f64 - 1.0;

    for y in 0..height {
        for x in 0..width {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            let src_x = cos_a * dx - sin_a * dy + cx;
            let src_y = sin_a * dx + cos_a * dy + cy;

            let epsilon = 1e-6;
            if !src_x.is_finite()
                || !src_y.is_finite()
                || src_x < -epsilon
                || src_y < -epsilon
                || src_x > max_x + epsilon
                || src_y > max_y + epsilon
            {
                continue;
            }

            let src_x = src_x.clamp(0.0, max_x);
            let src_y = src_y.clamp(0.0, max_y);
            let x0 = src_x.floor() as usize;
            let y0 = src_y.floor() as usize;
            let x1 = (x0 + 1).min(width - 1);
            let y1 = (y0 + 1).min(height - 1);
            let fx = src_x - x0 as f64;
            let fy = src_y - y0 as f64;

            let row0 = img.row(y0).expect("row in bounds");
            let row1 = img.row(y1).expect("row in bounds");
            let a = row0[x0] as f64;
            let b = row0[x1] as f64;
            let c = row1[x0] as f64;
            let d = row1[x1] as f64;

            let value = a * (1.0 - fx) * (1.0 - fy)
                + b * fx * (1.0 - fy)
                + c * (1.0 - fx) * fy
                + d * fx * fy;
            out[y * width + x] = value.round().clamp(0.0, 255.0) as u8;
        }
    }

    GrayImage::new(out, width, height).expect("rotation output is contiguous")
}

/// Crops a window that may extend past the image bounds; out-of-frame samples
/// take `fill`, so the output always has the requested size.
pub fn crop_with_fill(
    img: &GrayImage,
    x0: i64,
    y0: i64,
    width: usize,
    height: usize,
    fill: u8,
) -> PalmcodeResult<GrayImage> {
    let mut data = vec![fill; width * height];
    for y in 0..height {
        let sy = y0 + y as i64;
        if sy < 0 || sy >= img.height() as i64 {
            continue;
        }
        for x in 0..width {
            let sx = x0 + x as i64;
            if sx < 0 || sx >= img.width() as i64 {
                continue;
            }
            data[y * width + x] = img
                .get(sx as usize, sy as usize)
                .expect("coordinates checked against bounds");
        }
    }
    GrayImage::new(data, width, height)
}

/// Mean intensity of the square window of half-side `half` centered at
/// `(cx, cy)`, clamped to the image bounds. Returns 0.0 for an empty window.
pub fn mean_window(img: &GrayImage, cx: i64, cy: i64, half: i64) -> f64 {
    let x_lo = (cx - half).max(0);
    let x_hi = (cx + half).min(img.width() as i64);
    let y_lo = (cy - half).max(0);
    let y_hi = (cy + half).min(img.height() as i64);
    if x_lo >= x_hi || y_lo >= y_hi {
        return 0.0;
    }

    let mut sum = 0u64;
    let mut count = 0u64;
    for y in y_lo..y_hi {
        let row = img.row(y as usize).expect("row within image");
        for x in x_lo..x_hi {
            sum += row[x as usize] as u64;
            count += 1;
        }
    }
    sum as f64 / count as f64
}

#[cfg(test)]
mod tests {
    use super::{binarize, crop_with_fill, gaussian_blur, mean_window, reflect_101, rotate_about};
    use crate::image::GrayImage;

    #[test]
    fn reflect_101_mirrors_without_border_repeat() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(2, 5), 2);
        assert_eq!(reflect_101(-3, 1), 0);
    }

    #[test]
    fn blur_preserves_uniform_images() {
        let img = GrayImage::new(vec![90u8; 64], 8, 8).unwrap();
        let blurred = gaussian_blur(&img, 7);
        assert!(blurred.as_slice().iter().all(|&v| v == 90));
    }

    #[test]
    fn binarize_splits_at_threshold() {
        let img = GrayImage::new(vec![10, 100, 101, 200], 2, 2).unwrap();
        let bin = binarize(&img, 100.0);
        assert_eq!(bin.as_gray().as_slice(), &[0, 0, 255, 255]);
    }

    #[test]
    fn rotate_quarter_turn_about_center() {
        let img = GrayImage::new(vec![1, 2, 3, 4, 5, 6, 7, 8, 9], 3, 3).unwrap();
        let rotated = rotate_about(&img, (1.0, 1.0), 90.0, 0);
        assert_eq!(rotated.as_slice(), &[3, 6, 9, 2, 5, 8, 1, 4, 7]);
    }

    #[test]
    fn rotate_zero_is_identity() {
        let img = GrayImage::from_fn(5, 4, |x, y| (x * 7 + y * 13) as u8).unwrap();
        let rotated = rotate_about(&img, (2.0, 1.5), 0.0, 0);
        assert_eq!(rotated.as_slice(), img.as_slice());
    }

    #[test]
    fn crop_fills_out_of_frame_samples() {
        let img = GrayImage::new(vec![1, 2, 3, 4], 2, 2).unwrap();
        let cropped = crop_with_fill(&img, -1, 0, 3, 2, 9).unwrap();
        assert_eq!(cropped.as_slice(), &[9, 1, 2, 9, 3, 4]);
    }

    #[test]
    fn window_mean_clamps_to_bounds() {
        let img = GrayImage::new(vec![10, 20, 30, 40], 2, 2).unwrap();
        // full window
        assert!((mean_window(&img, 1, 1, 1) - 25.0).abs() < 1e-12);
        // clamped at the corner: samples (0,0) only
        assert!((mean_window(&img, 0, 0, 1) - 10.0).abs() < 1e-12);
    }
}
