//! Palmprint identification from grayscale hand captures.
//!
//! The pipeline finds the hand contour in a binarized frame, locates the
//! finger valleys, anchors a canonical region of interest between two valley
//! keypoints, encodes its texture with a bank of oriented Gabor filters and
//! compares the resulting binary codes by masked Hamming distance with a
//! small translation search.
//!
//! [`Scanner`] bundles the stages behind one configured object:
//!
//! ```
//! use palmcode::{GrayImage, Scanner};
//!
//! let scanner = Scanner::new();
//! let frame = GrayImage::new(vec![0u8; 640 * 480], 640, 480)?;
//! match scanner.verify(&frame, &[]) {
//!     Ok(decision) => println!("accepted: {}", decision.is_accepted()),
//!     Err(err) => eprintln!("extraction failed: {err}"),
//! }
//! # Ok::<(), palmcode::PalmcodeError>(())
//! ```
//!
//! # Features
//!
//! - `rayon`: parallel template comparisons during verification.
//! - `image-io`: PNG/JPEG loading and encoding for images and stored codes.
//! - `tracing`: spans and events around the pipeline stages.

pub mod config;
pub mod contour;
pub mod gabor;
pub mod image;
pub mod matcher;
pub mod pipeline;
pub mod roi;
pub(crate) mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use config::{ExtractConfig, GaborConfig, MatchingConfig};
pub use gabor::GaborBank;
pub use image::{BinaryImage, GrayImage};
pub use matcher::{masked_hamming, match_distance, BitGrid, Decision, MatchResult};
pub use pipeline::{EnrollmentRecord, Scanner, Template, TemplateStore};
pub use roi::RoiExtraction;
pub use util::{GeometryError, PalmcodeError, PalmcodeResult};
