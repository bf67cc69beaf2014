//! Raster loading, saving, resizing and conversion into scoring arrays

use crate::io::configuration::{PLACEHOLDER_GRAY, PLACEHOLDER_SIZE};
use crate::io::error::{AttackError, Result};
use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use ndarray::Array3;
use std::path::Path;

/// Convert an 8-bit RGB raster into a `(height, width, 3)` float array
///
/// Values keep the 0-255 range; the scorer normalizes per image.
pub fn rgb_to_array(img: &RgbImage) -> Array3<f32> {
    let (width, height) = (img.width() as usize, img.height() as usize);
    let mut data = Array3::zeros((height, width, 3));

    for (x, y, pixel) in img.enumerate_pixels() {
        for (c, &value) in pixel.0.iter().enumerate() {
            if let Some(slot) = data.get_mut((y as usize, x as usize, c)) {
                *slot = f32::from(value);
            }
        }
    }

    data
}

/// Resize a generation to the square scoring resolution with Lanczos filtering
pub fn resize_for_scoring(img: &RgbImage, side: u32) -> RgbImage {
    if img.width() == side && img.height() == side {
        return img.clone();
    }
    image::imageops::resize(img, side, side, FilterType::Lanczos3)
}

/// Uniform gray stand-in for images that could not be obtained
pub fn placeholder() -> RgbImage {
    RgbImage::from_pixel(
        PLACEHOLDER_SIZE,
        PLACEHOLDER_SIZE,
        Rgb([PLACEHOLDER_GRAY; 3]),
    )
}

/// Load any supported image file as 8-bit RGB
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    let img = image::open(path).map_err(|e| AttackError::ImageLoad {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(img.to_rgb8())
}

/// Save an RGB image, creating parent directories as needed
///
/// The format follows the file extension.
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The image cannot be encoded or written
pub fn save_rgb(img: &RgbImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| AttackError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }
    }

    img.save(path).map_err(|e| AttackError::ImageExport {
        path: path.to_path_buf(),
        source: e,
    })
}
