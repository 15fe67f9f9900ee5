//! Media handling module
//!
//! Maps an upload's file extension to the processing path it takes and runs
//! the raster image pipeline (decode, downsample, re-encode).

mod transform;

pub use transform::{target_dimensions, transform, TransformError, TransformOptions, Transformed};

use image::ImageFormat;
use std::fmt;

/// Processing path selected from the upload's extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// `jpg` / `jpeg`
    Jpeg,
    /// `png`
    Png,
    /// Anything else, stored byte-for-byte
    Other,
}

impl MediaKind {
    /// Select the processing path, ignoring ASCII case
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Self::Jpeg,
            "png" => Self::Png,
            _ => Self::Other,
        }
    }

    /// Decoder to use, `None` for pass-through uploads
    pub const fn image_format(self) -> Option<ImageFormat> {
        match self {
            Self::Jpeg => Some(ImageFormat::Jpeg),
            Self::Png => Some(ImageFormat::Png),
            Self::Other => None,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Extension of an uploaded file name
///
/// Only the last path component counts; the extension is whatever follows
/// its last `.`, or empty when there is none.
pub fn extension_of(file_name: &str) -> &str {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    base.rsplit_once('.').map_or("", |(_, ext)| ext)
}
