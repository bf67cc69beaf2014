//! Pairwise edge agreement across a group of generations for one caption
//!
//! Verbatim copies keep sharp, seed-independent edges even after a single
//! denoising step, while ordinary samples come out blurry and diverse. The
//! score is the mean weighted Jaccard overlap of the normalized edge maps over
//! every unordered pair of images in the group:
//!
//! - `1.0` when all images share identical edge structure
//! - `0.0` when the edges never coincide, or when no image has any edges

use crate::io::configuration::MIN_GROUP_SIZE;
use crate::io::error::{AttackError, Result};
use crate::io::image::rgb_to_array;
use crate::scoring::edges::EdgeMap;
use image::RgbImage;
use ndarray::Array3;

/// Same-caption generations as `(height, width, channels)` arrays
#[derive(Debug, Clone, Default)]
pub struct ImageGroup {
    images: Vec<Array3<f32>>,
}

impl ImageGroup {
    /// Create an empty group
    pub const fn new() -> Self {
        Self { images: Vec::new() }
    }

    /// Wrap already converted arrays
    pub const fn from_arrays(images: Vec<Array3<f32>>) -> Self {
        Self { images }
    }

    /// Convert 8-bit rasters into a group
    pub fn from_rgb(images: &[RgbImage]) -> Self {
        images.iter().map(rgb_to_array).collect()
    }

    /// Append one image
    pub fn push(&mut self, image: Array3<f32>) {
        self.images.push(image);
    }

    /// Convert and append one 8-bit raster
    pub fn push_rgb(&mut self, image: &RgbImage) {
        self.images.push(rgb_to_array(image));
    }

    /// Number of images in the group
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the group has no images
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Images in insertion order
    pub fn images(&self) -> &[Array3<f32>] {
        &self.images
    }

    /// Check group size and shared dimensions, returning (height, width)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The group holds fewer than two images
    /// - Any image differs in height or width from the first
    pub fn validate(&self) -> Result<(usize, usize)> {
        let Some(first) = self.images.first() else {
            return Err(AttackError::EmptyGroup { len: 0 });
        };
        if self.images.len() < MIN_GROUP_SIZE {
            return Err(AttackError::EmptyGroup {
                len: self.images.len(),
            });
        }

        let (height, width, _) = first.dim();
        for (index, image) in self.images.iter().enumerate().skip(1) {
            let (h, w, _) = image.dim();
            if (h, w) != (height, width) {
                return Err(AttackError::ShapeMismatch {
                    index,
                    expected: (height, width),
                    found: (h, w),
                });
            }
        }

        Ok((height, width))
    }
}

impl FromIterator<Array3<f32>> for ImageGroup {
    fn from_iter<I: IntoIterator<Item = Array3<f32>>>(iter: I) -> Self {
        Self {
            images: iter.into_iter().collect(),
        }
    }
}

/// Score how consistently edges appear across a group of generations
///
/// # Errors
///
/// Returns an error if:
/// - The group holds fewer than two images (`EmptyGroup`)
/// - The images differ in size (`ShapeMismatch`)
pub fn edge_overlap_score(group: &ImageGroup) -> Result<f64> {
    let maps = edge_maps(group)?;
    Ok(mean_overlap(&pairwise_overlaps(&maps)))
}

/// Normalized edge map of every image in a validated group
///
/// # Errors
///
/// Returns the same errors as [`ImageGroup::validate`]
pub fn edge_maps(group: &ImageGroup) -> Result<Vec<EdgeMap>> {
    group.validate()?;
    Ok(group.images().iter().map(EdgeMap::from_image).collect())
}

/// Overlap of every unordered pair `(i, j)` with `i < j`
///
/// Pairs of differently sized maps are skipped.
pub fn pairwise_overlaps(maps: &[EdgeMap]) -> Vec<f64> {
    let mut overlaps = Vec::with_capacity(maps.len() * maps.len().saturating_sub(1) / 2);
    for (i, a) in maps.iter().enumerate() {
        for b in maps.iter().skip(i + 1) {
            if let Some(value) = a.overlap(b) {
                overlaps.push(value);
            }
        }
    }
    overlaps
}

/// Mean of pair overlaps, summed in sorted order so that any permutation of
/// the group yields a bit-identical result
pub fn mean_overlap(overlaps: &[f64]) -> f64 {
    if overlaps.is_empty() {
        return 0.0;
    }
    let mut sorted = overlaps.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.iter().sum::<f64>() / sorted.len() as f64
}
