// Application state module
// Immutable state shared by every connection task

use super::types::Config;
use crate::media::TransformOptions;
use crate::storage::{Storage, StorageError};

/// Application state
pub struct AppState {
    pub config: Config,
    pub storage: Storage,
}

impl AppState {
    /// Resolve the storage directory and build the shared state
    pub fn new(config: Config) -> Result<Self, StorageError> {
        let storage = Storage::open(&config.storage.dir)?;
        Ok(Self { config, storage })
    }

    /// Image pipeline settings derived from the configuration
    pub const fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            max_width: self.config.image.max_width,
            jpeg_quality: self.config.image.jpeg_quality,
            preserve_png: self.config.image.preserve_png,
            max_pixels: self.config.image.max_pixels,
        }
    }
}
