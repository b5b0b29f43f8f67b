//! Shared utility helpers.

pub mod error;
pub mod interp;

pub use error::{GeometryError, PalmcodeError, PalmcodeResult};
