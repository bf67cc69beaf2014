//! Caption loop of the black-box attack
//!
//! Every caption is synthesized with a handful of consecutive seeds and a
//! single denoising step. The generations are resized to a common resolution,
//! scored as one group, and the score is appended to the caption's row.

use crate::attack::naming::generation_path;
use crate::external::generation::{GenerationRequest, ImageGenerator};
use crate::io::configuration::{
    CAPTION_COLUMN, DEFAULT_GENERATION_STEPS, DEFAULT_SEED_OFFSET, DEFAULT_SEEDS_PER_CAPTION,
    EDGE_SCORE_COLUMN, MIN_GROUP_SIZE, SCORING_RESOLUTION,
};
use crate::io::error::{Result, invalid_parameter};
use crate::io::image::{resize_for_scoring, save_rgb};
use crate::io::progress::ProgressManager;
use crate::scoring::overlap::{ImageGroup, edge_overlap_score};
use crate::table::frame::Table;
use std::ops::Range;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Parameters of one attack run
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Generations per caption
    pub seeds_per_caption: usize,
    /// First seed of every caption
    pub seed_offset: u64,
    /// Index of the first caption to attack
    pub caption_offset: usize,
    /// Captions to attack, `None` for all remaining
    pub caption_limit: Option<usize>,
    /// Denoising steps per generation
    pub steps: u32,
    /// Square side generations are resized to before scoring
    pub resolution: u32,
    /// Folder receiving the raw generations, `None` to skip saving
    pub outfolder: Option<PathBuf>,
    /// Display progress bars
    pub show_progress: bool,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            seeds_per_caption: DEFAULT_SEEDS_PER_CAPTION,
            seed_offset: DEFAULT_SEED_OFFSET,
            caption_offset: 0,
            caption_limit: None,
            steps: DEFAULT_GENERATION_STEPS,
            resolution: SCORING_RESOLUTION,
            outfolder: None,
            show_progress: false,
        }
    }
}

impl AttackConfig {
    /// Check the parameters the scorer depends on
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two seeds, zero steps, or a zero
    /// resolution are requested, or if the seed range passes `u64::MAX`
    pub fn validate(&self) -> Result<()> {
        if self.seeds_per_caption < MIN_GROUP_SIZE {
            return Err(invalid_parameter(
                "seeds_per_caption",
                &self.seeds_per_caption,
                &format!("scoring needs at least {MIN_GROUP_SIZE} generations per caption"),
            ));
        }
        if self
            .seed_offset
            .checked_add(self.seeds_per_caption as u64)
            .is_none()
        {
            return Err(invalid_parameter(
                "seed_offset",
                &self.seed_offset,
                &format!("{} seeds from here exceed u64", self.seeds_per_caption),
            ));
        }
        if self.steps == 0 {
            return Err(invalid_parameter(
                "steps",
                &self.steps,
                &"at least one denoising step is required",
            ));
        }
        if self.resolution == 0 {
            return Err(invalid_parameter(
                "resolution",
                &self.resolution,
                &"must be positive",
            ));
        }
        Ok(())
    }

    /// Rows attacked in a table of `total` rows
    pub fn caption_window(&self, total: usize) -> Range<usize> {
        let start = self.caption_offset.min(total);
        let end = self
            .caption_limit
            .map_or(total, |limit| start.saturating_add(limit).min(total));
        start..end
    }

    /// Seeds used for every caption, cut short at `u64::MAX`
    pub const fn seeds(&self) -> Range<u64> {
        self.seed_offset..self.seed_offset.saturating_add(self.seeds_per_caption as u64)
    }
}

/// Runs the attack over the captions of a table
pub struct AttackRunner<G> {
    generator: G,
    config: AttackConfig,
    progress_manager: Option<ProgressManager>,
}

impl<G: ImageGenerator> AttackRunner<G> {
    /// Create a runner
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn new(generator: G, config: AttackConfig) -> Result<Self> {
        config.validate()?;
        let progress_manager = config.show_progress.then(ProgressManager::new);
        Ok(Self {
            generator,
            config,
            progress_manager,
        })
    }

    /// Configuration of this runner
    pub const fn config(&self) -> &AttackConfig {
        &self.config
    }

    /// Attack the captions in the configured window
    ///
    /// Returns the windowed rows with an `edge_scores` column appended.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The table has no caption column, or a caption is null
    /// - A generation fails (no retry)
    /// - A generation cannot be saved
    pub fn run(&mut self, table: &Table) -> Result<Table> {
        let captions = table.strings(CAPTION_COLUMN)?;
        let window = self.config.caption_window(table.num_rows());
        let windowed = table.slice_rows(window.clone());
        let selected = captions.get(window.clone()).unwrap_or_default();

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(selected.len(), self.config.seeds_per_caption);
        }

        let start_time = Instant::now();
        let mut scores = Vec::with_capacity(selected.len());
        for (offset, caption) in selected.iter().enumerate() {
            let row = window.start + offset;
            let caption = caption
                .as_deref()
                .ok_or_else(|| invalid_parameter("caption", &row, &"caption is null"))?;

            debug!(row, caption, "Synthesizing caption");
            let score = self.score_caption(caption)?;
            debug!(row, score, "Scored caption");
            scores.push(score);

            if let Some(ref pm) = self.progress_manager {
                pm.complete_caption();
            }
        }

        if let Some(ref pm) = self.progress_manager {
            pm.finish();
        }
        info!(
            captions = scores.len(),
            elapsed_secs = start_time.elapsed().as_secs_f64(),
            "Attack finished"
        );

        windowed.with_f64_column(EDGE_SCORE_COLUMN, &scores)
    }

    /// Generate, optionally save, and score every seed of one caption
    ///
    /// # Errors
    ///
    /// Returns an error if a generation fails or cannot be saved
    pub fn score_caption(&self, caption: &str) -> Result<f64> {
        edge_overlap_score(&self.generate_group(caption)?)
    }

    fn generate_group(&self, caption: &str) -> Result<ImageGroup> {
        if let Some(ref pm) = self.progress_manager {
            pm.start_caption(caption);
        }

        let mut group = ImageGroup::new();
        for seed in self.config.seeds() {
            let request = GenerationRequest {
                prompt: caption.to_string(),
                seed,
                steps: self.config.steps,
            };
            let image = self.generator.generate(&request)?;

            if let Some(ref outfolder) = self.config.outfolder {
                save_rgb(&image, &generation_path(outfolder, caption, seed))?;
            }

            group.push_rgb(&resize_for_scoring(&image, self.config.resolution));

            if let Some(ref pm) = self.progress_manager {
                pm.advance_seed();
            }
        }

        Ok(group)
    }
}
