use image::ImageFormat;

/// Extensions eligible for on-demand resizing
pub const RASTER_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".bmp", ".png", ".webp"];

/// Container formats the transformer can decode and re-encode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterFormat {
    Jpeg,
    Png,
    Bmp,
    WebP,
}

impl RasterFormat {
    /// Case-insensitive, with or without the leading dot
    pub fn from_extension(extension: &str) -> Option<Self> {
        let ext = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "bmp" => Some(Self::Bmp),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Bmp => ImageFormat::Bmp,
            Self::WebP => ImageFormat::WebP,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::WebP => "webp",
        }
    }
}

impl std::fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_raster_extension_maps_to_a_format() {
        for ext in RASTER_EXTENSIONS {
            assert!(RasterFormat::from_extension(ext).is_some(), "{ext}");
        }
    }

    #[test]
    fn matching_ignores_case_and_dot() {
        assert_eq!(RasterFormat::from_extension(".JPG"), Some(RasterFormat::Jpeg));
        assert_eq!(RasterFormat::from_extension("jpeg"), Some(RasterFormat::Jpeg));
        assert_eq!(RasterFormat::from_extension(".WebP"), Some(RasterFormat::WebP));
    }

    #[test]
    fn non_raster_extensions_are_excluded() {
        for ext in [".gif", ".svg", ".pdf", ".tiff", ""] {
            assert_eq!(RasterFormat::from_extension(ext), None, "{ext}");
        }
    }

    #[test]
    fn raster_extensions_are_registered_content_types() {
        let registry = crate::content_type::ContentTypeRegistry::with_defaults();
        for ext in RASTER_EXTENSIONS {
            assert!(registry.contains(ext), "{ext}");
        }
    }
}
