use super::DeliveryError;
use crate::imaging::Bounds;

/// Logical asset path plus the optional `w`/`h` query bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub path: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl AssetRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            width: None,
            height: None,
        }
    }

    pub fn with_bounds(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Size bounds, present only when a width was requested.
    ///
    /// A height without a width never triggers resizing and is not validated.
    pub fn bounds(&self) -> Result<Option<Bounds>, DeliveryError> {
        let Some(width) = self.width else {
            return Ok(None);
        };

        if width == 0 || self.height == Some(0) {
            return Err(DeliveryError::InvalidBounds);
        }

        Ok(Some(Bounds::new(width, self.height)))
    }
}
