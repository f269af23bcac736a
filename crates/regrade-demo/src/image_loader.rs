//! Image decoding and encoding for the demo application.

use std::path::{Path, PathBuf};

use regrade_core::CoreError;
use regrade_core::image::ImageBuffer;

/// Decode an image from disk into an RGBA8 `ImageBuffer`.
///
/// Supports common formats via the `image` crate (PNG, JPEG, ...). Every
/// source is converted to 8-bit RGBA.
pub fn load_image(path: &Path) -> Result<ImageBuffer, ImageLoadError> {
    let img = image::open(path).map_err(|source| ImageLoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(ImageBuffer::from_rgba8(width, height, rgba.into_raw())?)
}

/// Encode `buffer` to `path`, picking the format from the extension.
///
/// Formats without an alpha channel (JPEG) get the RGB channels only.
pub fn save_image(path: &Path, buffer: &ImageBuffer) -> Result<(), ImageLoadError> {
    let rgba = image::RgbaImage::from_raw(buffer.width(), buffer.height(), buffer.as_bytes().to_vec())
        .ok_or(ImageLoadError::BufferSize)?;

    let drops_alpha = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "jpg" | "jpeg"));

    let result = if drops_alpha {
        image::DynamicImage::ImageRgba8(rgba).to_rgb8().save(path)
    } else {
        rgba.save(path)
    };

    result.map_err(|source| ImageLoadError::Encode {
        path: path.to_path_buf(),
        source,
    })
}

/// Errors that can occur while reading or writing images.
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("decoded image is malformed: {0}")]
    Buffer(#[from] CoreError),
    #[error("pixel buffer does not match its dimensions")]
    BufferSize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use regrade_core::image::Pixel;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("regrade-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_png_round_trip_keeps_alpha() {
        let pixels = vec![
            Pixel::new(255, 0, 0, 255),
            Pixel::new(0, 255, 0, 128),
            Pixel::new(0, 0, 255, 0),
            Pixel::new(10, 20, 30, 40),
        ];
        let original = ImageBuffer::new(2, 2, pixels).unwrap();
        let path = temp_path("round-trip.png");

        save_image(&path, &original).unwrap();
        let loaded = load_image(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, original);
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let err = load_image(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, ImageLoadError::Decode { .. }));
    }
}
