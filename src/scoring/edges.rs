//! Gradient-magnitude edge maps normalized per image
//!
//! Each map is divided by its own maximum, so a generation that is uniformly
//! brighter or higher in contrast than its siblings produces the same map.

use ndarray::{Array2, Array3, Axis, Zip, s};

/// Rec. 601 luma weights
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Normalized edge strength of one image, values in `[0, 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMap {
    strength: Array2<f32>,
}

impl EdgeMap {
    /// Build the normalized edge map of a `(height, width, channels)` image
    pub fn from_image(image: &Array3<f32>) -> Self {
        Self::from_luminance(&luminance(image))
    }

    /// Build the normalized edge map of a single-channel image
    pub fn from_luminance(luma: &Array2<f32>) -> Self {
        let mut strength = sobel_magnitude(luma);
        normalize_by_max(&mut strength);
        Self { strength }
    }

    /// Dimensions as (height, width)
    pub fn dim(&self) -> (usize, usize) {
        self.strength.dim()
    }

    /// Normalized edge strengths
    pub const fn strength(&self) -> &Array2<f32> {
        &self.strength
    }

    /// Whether any pixel carries edge strength
    pub fn has_edges(&self) -> bool {
        self.strength.iter().any(|&v| v > 0.0)
    }

    /// Weighted Jaccard agreement `sum(min) / sum(max)` with another map
    ///
    /// Two edgeless maps agree with value `0.0`: without edges there is no
    /// evidence of a shared structure. Returns `None` if the dimensions differ.
    pub fn overlap(&self, other: &Self) -> Option<f64> {
        if self.dim() != other.dim() {
            return None;
        }

        let mut intersection = 0.0_f64;
        let mut union = 0.0_f64;
        Zip::from(&self.strength)
            .and(&other.strength)
            .for_each(|&a, &b| {
                intersection += f64::from(a.min(b));
                union += f64::from(a.max(b));
            });

        if union > 0.0 {
            Some(intersection / union)
        } else {
            Some(0.0)
        }
    }
}

/// Collapse color channels to luma
///
/// Single-channel images pass through; channels past the third (alpha) are
/// ignored.
pub fn luminance(image: &Array3<f32>) -> Array2<f32> {
    let (height, width, channels) = image.dim();
    match channels {
        0 => Array2::zeros((height, width)),
        1 | 2 => image.index_axis(Axis(2), 0).to_owned(),
        _ => {
            let mut luma = Array2::zeros((height, width));
            Zip::from(&mut luma)
                .and(image.index_axis(Axis(2), 0))
                .and(image.index_axis(Axis(2), 1))
                .and(image.index_axis(Axis(2), 2))
                .for_each(|y, &r, &g, &b| {
                    *y = LUMA_R.mul_add(r, LUMA_G.mul_add(g, LUMA_B * b));
                });
            luma
        }
    }
}

/// Sobel gradient magnitude; the one-pixel border stays zero
pub fn sobel_magnitude(luma: &Array2<f32>) -> Array2<f32> {
    let (height, width) = luma.dim();
    let mut magnitude = Array2::zeros((height, width));
    if height < 3 || width < 3 {
        return magnitude;
    }

    Zip::from(magnitude.slice_mut(s![1..height - 1, 1..width - 1]))
        .and(luma.windows((3, 3)))
        .for_each(|out, w| {
            let gx = (w[[0, 2]] + 2.0 * w[[1, 2]] + w[[2, 2]])
                - (w[[0, 0]] + 2.0 * w[[1, 0]] + w[[2, 0]]);
            let gy = (w[[2, 0]] + 2.0 * w[[2, 1]] + w[[2, 2]])
                - (w[[0, 0]] + 2.0 * w[[0, 1]] + w[[0, 2]]);
            *out = gx.hypot(gy);
        });

    magnitude
}

// Maps without a positive finite maximum are cleared to all-zero
fn normalize_by_max(values: &mut Array2<f32>) {
    let max = values.iter().copied().fold(0.0_f32, f32::max);
    if max > 0.0 && max.is_finite() {
        values.mapv_inplace(|v| v / max);
    } else {
        values.fill(0.0);
    }
}
