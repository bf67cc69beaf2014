//! Side-by-side strips of a training image and its few-step generations

use crate::attack::naming::generation_path;
use crate::external::download::{Download, ImageSource, load_or_placeholder};
use crate::io::configuration::{
    CAPTION_COLUMN, COMPARISON_SEEDS, DEFAULT_COMPARISON_NAME, DEFAULT_COMPARISON_ROOT,
    URL_COLUMN,
};
use crate::io::error::{AttackError, Result};
use crate::io::image::save_rgb;
use crate::table::frame::Table;
use image::RgbImage;
use std::path::PathBuf;
use tracing::{info, warn};

/// Where generations are read from and strips are written to
#[derive(Debug, Clone)]
pub struct ComparisonOptions {
    /// Folder holding `{caption folder}/{seed:04}.jpg` generations
    pub attack_folder: PathBuf,
    /// Root folder for strips
    pub output_root: PathBuf,
    /// Subfolder below `output_root`
    pub output_name: String,
    /// Count rows from the top (`true`) or from the bottom (`false`)
    pub best: bool,
    /// Generations shown per strip, seeds `0..seeds`
    pub seeds: u64,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            attack_folder: PathBuf::new(),
            output_root: PathBuf::from(DEFAULT_COMPARISON_ROOT),
            output_name: DEFAULT_COMPARISON_NAME.to_string(),
            best: true,
            seeds: COMPARISON_SEEDS,
        }
    }
}

impl ComparisonOptions {
    /// Path of the strip for `index`
    pub fn strip_path(&self, index: usize) -> PathBuf {
        self.output_root
            .join(&self.output_name)
            .join(format!("combined_{index}.jpg"))
    }
}

/// Paste images left to right on a black canvas of summed width and
/// maximum height
pub fn combine_horizontally(images: &[RgbImage]) -> RgbImage {
    let total_width = images.iter().map(RgbImage::width).sum();
    let max_height = images.iter().map(RgbImage::height).max().unwrap_or(0);

    let mut canvas = RgbImage::new(total_width, max_height);
    let mut x_offset = 0_i64;
    for img in images {
        image::imageops::replace(&mut canvas, img, x_offset, 0);
        x_offset += i64::from(img.width());
    }
    canvas
}

/// Render and save the strip for one ranked row
///
/// The original comes from the row's `url` through `source`; generations are
/// read from `options.attack_folder`. Missing images become placeholders.
///
/// # Errors
///
/// Returns an error if:
/// - `index` is outside the table
/// - The caption or url column is missing
/// - The strip cannot be saved
pub fn render_comparison(
    table: &Table,
    index: usize,
    options: &ComparisonOptions,
    source: &dyn ImageSource,
) -> Result<PathBuf> {
    let rows = table.num_rows();
    let row = if options.best {
        Some(index)
    } else {
        rows.checked_sub(index + 1)
    }
    .filter(|&r| r < rows)
    .ok_or_else(|| AttackError::InvalidParameter {
        parameter: "index",
        value: index.to_string(),
        reason: format!("table has {rows} rows"),
    })?;

    let captions = table.strings(CAPTION_COLUMN)?;
    let urls = table.strings(URL_COLUMN)?;
    let caption = captions.get(row).cloned().flatten().unwrap_or_default();

    let original = match urls.get(row).cloned().flatten() {
        Some(url) => source.fetch(&url),
        None => {
            warn!(row, "Row has no url, using placeholder");
            Download::placeholder("missing url")
        }
    };

    let mut strip = Vec::with_capacity(options.seeds as usize + 1);
    strip.push(original.into_image());
    for seed in 0..options.seeds {
        let path = generation_path(&options.attack_folder, &caption, seed);
        strip.push(load_or_placeholder(&path).into_image());
    }

    let output_path = options.strip_path(index);
    save_rgb(&combine_horizontally(&strip), &output_path)?;
    info!(path = %output_path.display(), "Saved comparison strip");

    Ok(output_path)
}
