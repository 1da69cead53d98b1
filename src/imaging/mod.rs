//! Raster probing, decoding and thumbnail generation
//!
//! - [`probe`] reads dimensions from the header only
//! - [`decode`] materializes pixels into a [`DecodedImage`], whose resource lease
//!   is released on drop
//! - [`transform`] applies downscale-to-fit and re-encodes in the source format

mod decode;
mod format;
mod probe;
mod transform;

pub use decode::{DecodedImage, decode};
pub use format::{RASTER_EXTENSIONS, RasterFormat};
pub use probe::probe;
pub use transform::{TransformSettings, transform};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImagingError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode {format} thumbnail: {source}")]
    Encode {
        format: &'static str,
        #[source]
        source: image::ImageError,
    },
}

/// Pixel size of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Requested maximum size; `max_height` of `None` leaves the height unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub max_width: u32,
    pub max_height: Option<u32>,
}

impl Bounds {
    pub fn new(max_width: u32, max_height: Option<u32>) -> Self {
        Self {
            max_width,
            max_height,
        }
    }
}
