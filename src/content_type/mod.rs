//! Extension → MIME type registry
//!
//! Built once at startup from the built-in table plus an optional
//! mapping file, then shared read-only behind an `Arc`. Lookups are
//! case-insensitive; a key registered first is never replaced.

mod defaults;
mod mapping;

pub use mapping::{MappingError, MappingFile, MimeMapEntry};

use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ContentTypeRegistry {
    mappings: HashMap<String, String>,
}

/// Lower-cased extension with a leading dot; `None` for an empty extension
pub fn normalize_extension(extension: &str) -> Option<String> {
    let trimmed = extension.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_ascii_lowercase()))
}

/// Extension of the last path segment, including the dot (`a/b/photo.JPG` → `.JPG`)
pub fn extension_of(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let dot = name.rfind('.')?;
    let extension = &name[dot..];
    (extension.len() > 1).then_some(extension)
}

impl ContentTypeRegistry {
    /// Registry without any entries
    pub fn empty() -> Self {
        Self {
            mappings: HashMap::new(),
        }
    }

    /// Registry seeded with the built-in table
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for (extension, mime_type) in defaults::DEFAULT_MAPPINGS {
            registry.register(extension, mime_type);
        }
        registry
    }

    /// Built-in table extended from the mapping file at `path`.
    ///
    /// An absent or unreadable file leaves the defaults in effect.
    pub fn load(path: &Path) -> Self {
        let mut registry = Self::with_defaults();

        match MappingFile::read(path) {
            Ok(Some(file)) => {
                let added = registry.extend(&file);
                tracing::info!(path = %path.display(), added, "Loaded MIME mapping file");
            }
            Ok(None) => {
                tracing::debug!(path = %path.display(), "No MIME mapping file, using defaults");
            }
            Err(err) => {
                tracing::warn!(error = %err, "Ignoring MIME mapping file, using defaults");
            }
        }

        registry
    }

    /// Add every valid entry not already present; returns how many were added
    pub fn extend(&mut self, file: &MappingFile) -> usize {
        let mut added = 0;
        for entry in &file.mime_map {
            if entry.mime_type.parse::<mime::Mime>().is_err() {
                tracing::warn!(
                    extension = %entry.file_extension,
                    mime_type = %entry.mime_type,
                    "Skipping mapping entry with invalid media type"
                );
                continue;
            }
            if self.register(&entry.file_extension, &entry.mime_type) {
                added += 1;
            }
        }
        added
    }

    /// Insert unless the extension is already registered; returns whether it was inserted
    pub fn register(&mut self, extension: &str, mime_type: &str) -> bool {
        let Some(key) = normalize_extension(extension) else {
            return false;
        };
        if self.mappings.contains_key(&key) {
            return false;
        }
        self.mappings.insert(key, mime_type.to_string());
        true
    }

    /// MIME type for an extension (with or without the leading dot)
    pub fn resolve(&self, extension: &str) -> Option<&str> {
        let key = normalize_extension(extension)?;
        self.mappings.get(&key).map(String::as_str)
    }

    pub fn contains(&self, extension: &str) -> bool {
        self.resolve(extension).is_some()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl Default for ContentTypeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
