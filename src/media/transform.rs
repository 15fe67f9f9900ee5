//! Raster image pipeline
//!
//! Decodes an uploaded JPEG or PNG, scales it down to a maximum width with
//! Lanczos3 resampling and re-encodes it. Images larger than `max_pixels` are
//! rejected from their header before any pixel buffer is allocated. The output is JPEG for both input
//! formats unless `preserve_png` is set.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageError, ImageFormat, ImageReader, Limits};
use std::io::Cursor;
use thiserror::Error;

/// Image pipeline settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformOptions {
    pub max_width: u32,
    pub jpeg_quality: u8,
    pub preserve_png: bool,
    pub max_pixels: u64,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            max_width: 1000,
            jpeg_quality: 75,
            preserve_png: false,
            max_pixels: 40_000_000,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("can't decode {format:?} image: {source}")]
    Decode {
        format: ImageFormat,
        #[source]
        source: ImageError,
    },
    #[error("{width}x{height} image exceeds the {limit} pixel limit")]
    TooManyPixels { width: u32, height: u32, limit: u64 },
    #[error("can't encode {format:?} image: {source}")]
    Encode {
        format: ImageFormat,
        #[source]
        source: ImageError,
    },
}

/// Encoded output of the pipeline
#[derive(Debug)]
pub struct Transformed {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Output size for an image of `width` x `height`
///
/// Images no wider than `max_width` keep their size. Wider ones are scaled to
/// `max_width` with the height rounded to the nearest pixel (at least 1).
pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }
    let scaled = (u64::from(height) * u64::from(max_width) + u64::from(width) / 2) / u64::from(width);
    let scaled = u32::try_from(scaled).unwrap_or(u32::MAX).max(1);
    (max_width, scaled)
}

/// Decode `input` as `format`, downsample and re-encode it
pub fn transform(
    input: &[u8],
    format: ImageFormat,
    options: &TransformOptions,
) -> Result<Transformed, TransformError> {
    let decoded = decode(input, format, options.max_pixels)?;

    let (width, height) = target_dimensions(decoded.width(), decoded.height(), options.max_width);
    let resized = if (width, height) == (decoded.width(), decoded.height()) {
        decoded
    } else {
        decoded.resize_exact(width, height, FilterType::Lanczos3)
    };

    let output = if format == ImageFormat::Png && options.preserve_png {
        ImageFormat::Png
    } else {
        ImageFormat::Jpeg
    };

    let bytes = encode(&resized, output, options.jpeg_quality)
        .map_err(|source| TransformError::Encode { format: output, source })?;

    Ok(Transformed {
        bytes,
        format: output,
        width,
        height,
    })
}

fn decode(
    input: &[u8],
    format: ImageFormat,
    max_pixels: u64,
) -> Result<DynamicImage, TransformError> {
    let decode_error = |source: ImageError| TransformError::Decode { format, source };

    let (width, height) = ImageReader::with_format(Cursor::new(input), format)
        .into_dimensions()
        .map_err(decode_error)?;
    if u64::from(width) * u64::from(height) > max_pixels {
        return Err(TransformError::TooManyPixels {
            width,
            height,
            limit: max_pixels,
        });
    }

    // 16-bit RGBA is the widest pixel either decoder produces
    let mut limits = Limits::default();
    limits.max_alloc = Some(max_pixels.saturating_mul(8));
    let mut reader = ImageReader::with_format(Cursor::new(input), format);
    reader.limits(limits);
    reader.decode().map_err(decode_error)
}

fn encode(image: &DynamicImage, format: ImageFormat, quality: u8) -> Result<Vec<u8>, ImageError> {
    let mut out = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = image.to_rgb8();
            JpegEncoder::new_with_quality(&mut out, quality).encode_image(&rgb)?;
        }
        other => image.write_to(&mut Cursor::new(&mut out), other)?,
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        }))
    }

    fn encoded(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut out = Vec::new();
        image.write_to(&mut Cursor::new(&mut out), format).unwrap();
        out
    }

    #[test]
    fn test_target_dimensions() {
        assert_eq!(target_dimensions(2000, 1000, 1000), (1000, 500));
        assert_eq!(target_dimensions(1000, 700, 1000), (1000, 700));
        assert_eq!(target_dimensions(640, 480, 1000), (640, 480));
        assert_eq!(target_dimensions(1001, 333, 1000), (1000, 333));
        assert_eq!(target_dimensions(3000, 1, 1000), (1000, 1));
        assert_eq!(target_dimensions(0, 0, 1000), (0, 0));
    }

    #[test]
    fn test_wide_png_becomes_jpeg() {
        let input = encoded(&gradient(2000, 1000), ImageFormat::Png);
        let out = transform(&input, ImageFormat::Png, &TransformOptions::default()).unwrap();

        assert_eq!(out.format, ImageFormat::Jpeg);
        assert_eq!((out.width, out.height), (1000, 500));
        assert_eq!(image::guess_format(&out.bytes).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1000, 500));
    }

    #[test]
    fn test_narrow_jpeg_keeps_size() {
        let input = encoded(&gradient(300, 200), ImageFormat::Jpeg);
        let out = transform(&input, ImageFormat::Jpeg, &TransformOptions::default()).unwrap();

        assert_eq!(out.format, ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (300, 200));
    }

    #[test]
    fn test_preserve_png() {
        let input = encoded(&gradient(1500, 600), ImageFormat::Png);
        let options = TransformOptions {
            preserve_png: true,
            ..TransformOptions::default()
        };
        let out = transform(&input, ImageFormat::Png, &options).unwrap();

        assert_eq!(out.format, ImageFormat::Png);
        assert_eq!(image::guess_format(&out.bytes).unwrap(), ImageFormat::Png);
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1000, 400));
    }

    #[test]
    fn test_preserve_png_does_not_affect_jpeg() {
        let input = encoded(&gradient(50, 50), ImageFormat::Jpeg);
        let options = TransformOptions {
            preserve_png: true,
            ..TransformOptions::default()
        };
        let out = transform(&input, ImageFormat::Jpeg, &options).unwrap();
        assert_eq!(out.format, ImageFormat::Jpeg);
    }

    #[test]
    fn test_transparent_png_encodes_as_jpeg() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1200, 300, Rgba([10, 20, 30, 0])));
        let input = encoded(&rgba, ImageFormat::Png);
        let out = transform(&input, ImageFormat::Png, &TransformOptions::default()).unwrap();

        assert_eq!(out.format, ImageFormat::Jpeg);
        assert_eq!((out.width, out.height), (1000, 250));
    }

    #[test]
    fn test_custom_max_width() {
        let input = encoded(&gradient(800, 600), ImageFormat::Png);
        let options = TransformOptions {
            max_width: 400,
            ..TransformOptions::default()
        };
        let out = transform(&input, ImageFormat::Png, &options).unwrap();
        assert_eq!((out.width, out.height), (400, 300));
    }

    #[test]
    fn test_invalid_bytes_fail_to_decode() {
        let err = transform(b"definitely not a jpeg", ImageFormat::Jpeg, &TransformOptions::default())
            .unwrap_err();
        assert!(matches!(err, TransformError::Decode { format: ImageFormat::Jpeg, .. }));
    }

    #[test]
    fn test_pixel_limit_rejects_before_decoding() {
        let input = encoded(&gradient(400, 300), ImageFormat::Png);
        let options = TransformOptions {
            max_pixels: 400 * 300 - 1,
            ..TransformOptions::default()
        };
        let err = transform(&input, ImageFormat::Png, &options).unwrap_err();
        assert!(matches!(
            err,
            TransformError::TooManyPixels { width: 400, height: 300, .. }
        ));

        let options = TransformOptions {
            max_pixels: 400 * 300,
            ..TransformOptions::default()
        };
        assert!(transform(&input, ImageFormat::Png, &options).is_ok());
    }

    #[test]
    fn test_declared_format_is_enforced() {
        // PNG bytes uploaded under a .jpg name
        let input = encoded(&gradient(10, 10), ImageFormat::Png);
        let err = transform(&input, ImageFormat::Jpeg, &TransformOptions::default()).unwrap_err();
        assert!(matches!(err, TransformError::Decode { .. }));
    }
}
