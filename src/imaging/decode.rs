use image::{DynamicImage, Limits};
use std::sync::Arc;

use super::probe::reader;
use super::{Dimensions, ImagingError, RasterFormat};
use crate::observability::{Metrics, ResourceKind, ResourceLease};

/// Decoded pixel buffer; its lease is released when the value is dropped
#[derive(Debug)]
pub struct DecodedImage {
    image: DynamicImage,
    _lease: ResourceLease,
}

impl DecodedImage {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.image.width(),
            height: self.image.height(),
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

/// Fully decode `source`, refusing allocations above `max_alloc` bytes
pub fn decode(
    source: &[u8],
    format: RasterFormat,
    max_alloc: u64,
    metrics: &Arc<Metrics>,
) -> Result<DecodedImage, ImagingError> {
    let mut limits = Limits::default();
    limits.max_alloc = Some(max_alloc);

    let mut reader = reader(source, format)?;
    reader.limits(limits);

    let image = reader.decode().map_err(ImagingError::Decode)?;

    Ok(DecodedImage {
        image,
        _lease: metrics.acquire(ResourceKind::Image),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(width, height));
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn decoded_image_releases_its_lease() {
        let metrics = Arc::new(Metrics::new());

        let decoded = decode(&png(40, 30), RasterFormat::Png, 1 << 30, &metrics).unwrap();
        assert_eq!(decoded.dimensions(), Dimensions { width: 40, height: 30 });
        assert_eq!(metrics.snapshot().leaks(), (0, 1));

        drop(decoded);
        assert_eq!(metrics.snapshot().leaks(), (0, 0));
    }

    #[test]
    fn failed_decode_acquires_nothing() {
        let metrics = Arc::new(Metrics::new());

        let err = decode(b"\x89PNG\r\n\x1a\nbroken", RasterFormat::Png, 1 << 30, &metrics)
            .unwrap_err();
        assert!(matches!(err, ImagingError::Decode(_)));
        assert_eq!(metrics.snapshot().images_acquired, 0);
    }

    #[test]
    fn allocation_limit_is_enforced() {
        let metrics = Arc::new(Metrics::new());

        let result = decode(&png(256, 256), RasterFormat::Png, 1024, &metrics);
        assert!(matches!(result, Err(ImagingError::Decode(_))));
    }
}
