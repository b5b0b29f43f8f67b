//! Convenience helpers around the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Persisted templates go
//! through PNG because the codec is lossless: a code or mask image written by
//! [`encode_png`] decodes back bit-identical.

use crate::image::GrayImage;
use crate::util::{PalmcodeError, PalmcodeResult};
use std::io::Cursor;
use std::path::Path;

/// Converts a grayscale buffer from the `image` crate.
pub fn from_luma8(img: &image::GrayImage) -> PalmcodeResult<GrayImage> {
    GrayImage::new(
        img.as_raw().clone(),
        img.width() as usize,
        img.height() as usize,
    )
}

/// Loads an image from disk and converts it to grayscale.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> PalmcodeResult<GrayImage> {
    let img = image::open(path).map_err(|err| PalmcodeError::ImageIo {
        reason: err.to_string(),
    })?;
    from_luma8(&img.to_luma8())
}

/// Encodes an image as PNG bytes.
pub fn encode_png(img: &GrayImage) -> PalmcodeResult<Vec<u8>> {
    let buf = image::GrayImage::from_raw(
        img.width() as u32,
        img.height() as u32,
        img.as_slice().to_vec(),
    )
    .ok_or(PalmcodeError::BufferSizeMismatch {
        needed: img.width() * img.height(),
        got: img.as_slice().len(),
    })?;

    let mut bytes = Vec::new();
    buf.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|err| PalmcodeError::ImageIo {
            reason: err.to_string(),
        })?;
    Ok(bytes)
}

/// Decodes PNG bytes back into a grayscale image.
pub fn decode_png(bytes: &[u8]) -> PalmcodeResult<GrayImage> {
    let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Png).map_err(
        |err| PalmcodeError::ImageIo {
            reason: err.to_string(),
        },
    )?;
    from_luma8(&img.to_luma8())
}
