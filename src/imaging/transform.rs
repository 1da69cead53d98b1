//! Downscale-to-fit thumbnails, re-encoded in the source container format

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageResult};
use std::io::Cursor;

use super::{Bounds, DecodedImage, Dimensions, ImagingError, RasterFormat};

/// Encoder parameters; not caller-controlled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformSettings {
    pub jpeg_quality: u8,
    pub max_decode_bytes: u64,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            jpeg_quality: 85,
            max_decode_bytes: 512 * 1024 * 1024,
        }
    }
}

impl Bounds {
    /// Whether `source` is within both bounds; an absent height is unbounded
    pub fn contains(&self, source: Dimensions) -> bool {
        source.width <= self.max_width
            && self.max_height.is_none_or(|max_height| source.height <= max_height)
    }

    /// Uniform scale factor `min(1, max_w / w, max_h / h)`
    pub fn scale_for(&self, source: Dimensions) -> f64 {
        let mut scale = 1.0_f64;
        if source.width > 0 {
            scale = scale.min(f64::from(self.max_width) / f64::from(source.width));
        }
        if let Some(max_height) = self.max_height {
            if source.height > 0 {
                scale = scale.min(f64::from(max_height) / f64::from(source.height));
            }
        }
        scale
    }

    /// Output size for `source`: each axis rounded, never zero and never past a bound
    pub fn fit(&self, source: Dimensions) -> Dimensions {
        let scale = self.scale_for(source);
        let scaled = |length: u32, bound: Option<u32>| {
            let rounded = (f64::from(length) * scale).round() as u32;
            let capped = bound.map_or(rounded, |bound| rounded.min(bound));
            capped.max(1)
        };

        Dimensions {
            width: scaled(source.width, Some(self.max_width)),
            height: scaled(source.height, self.max_height),
        }
    }
}

/// Resize `image` to fit `bounds` and encode it as `format`.
///
/// The decoded source is consumed and released before encoding starts.
pub fn transform(
    image: DecodedImage,
    bounds: Bounds,
    format: RasterFormat,
    settings: &TransformSettings,
) -> Result<Vec<u8>, ImagingError> {
    let source = image.dimensions();
    let target = bounds.fit(source);

    let resized = image
        .image()
        .resize_exact(target.width, target.height, FilterType::Lanczos3);
    drop(image);

    tracing::debug!(
        %format,
        source_width = source.width,
        source_height = source.height,
        width = target.width,
        height = target.height,
        "Resized image"
    );

    encode(resized, format, settings.jpeg_quality).map_err(|source| ImagingError::Encode {
        format: format.name(),
        source,
    })
}

fn encode(image: DynamicImage, format: RasterFormat, jpeg_quality: u8) -> ImageResult<Vec<u8>> {
    let mut buffer = Vec::new();

    match format {
        RasterFormat::Jpeg => {
            // JPEG has no alpha channel and no 16-bit mode
            let image = match image {
                DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image,
                other => DynamicImage::ImageRgb8(other.to_rgb8()),
            };
            image.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, jpeg_quality))?;
        }
        RasterFormat::Png => {
            image.write_to(&mut Cursor::new(&mut buffer), format.image_format())?;
        }
        RasterFormat::Bmp | RasterFormat::WebP => {
            let image = match image {
                DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => image,
                other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
                other => DynamicImage::ImageRgb8(other.to_rgb8()),
            };
            image.write_to(&mut Cursor::new(&mut buffer), format.image_format())?;
        }
    }

    Ok(buffer)
}
