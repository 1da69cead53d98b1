use image::ImageReader;
use std::io::Cursor;

use super::{Dimensions, ImagingError, RasterFormat};

/// Reader over `source`, trusting the content signature over the extension
pub(super) fn reader(
    source: &[u8],
    fallback: RasterFormat,
) -> Result<ImageReader<Cursor<&[u8]>>, ImagingError> {
    let mut reader = ImageReader::new(Cursor::new(source))
        .with_guessed_format()
        .map_err(|err| ImagingError::Decode(err.into()))?;

    if reader.format().is_none() {
        reader.set_format(fallback.image_format());
    }

    Ok(reader)
}

/// Pixel dimensions from the image header, without decoding pixel data
pub fn probe(source: &[u8], format: RasterFormat) -> Result<Dimensions, ImagingError> {
    let (width, height) = reader(source, format)?
        .into_dimensions()
        .map_err(ImagingError::Decode)?;

    Ok(Dimensions { width, height })
}
