//! Command-line interface for attacking, ranking and visualizing

use crate::attack::driver::{AttackConfig, AttackRunner};
use crate::external::download::HttpImageSource;
use crate::external::generation::{HttpGenerator, ImageGenerator, ReplayGenerator};
use crate::io::configuration::{
    COMPARISON_SEEDS, DEFAULT_BEST_AMOUNT, DEFAULT_COMPARISON_NAME, DEFAULT_COMPARISON_ROOT,
    DEFAULT_GENERATION_STEPS, DEFAULT_PREPARE_AMOUNT, DEFAULT_SEED_OFFSET,
    DEFAULT_SEEDS_PER_CAPTION, EDGE_SCORE_COLUMN, SCORING_RESOLUTION,
};
use crate::io::error::{Result, invalid_parameter};
use crate::io::logging::default_filter;
use crate::io::visualization::{ComparisonOptions, render_comparison};
use crate::table::frame::Table;
use crate::table::ranking::{RankOptions, SortOrder, best_scoring, prepare_for_multiple};
use clap::{Args, Parser, Subcommand};
use std::ops::Range;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "verbatim")]
#[command(
    author,
    version,
    about = "Score few-step diffusion generations for verbatim training-data copies"
)]
/// Command-line arguments for the attack toolkit
pub struct Cli {
    /// Suppress progress bars and informational logs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log every caption as it is processed
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available operations
#[derive(Subcommand)]
pub enum Command {
    /// Generate images per caption and append edge-overlap scores
    Attack(AttackArgs),
    /// Keep the rows with the lowest reconstruction error
    Prepare(PrepareArgs),
    /// Keep the top rows by a score column
    Best(BestArgs),
    /// Save original-versus-generations strips for ranked rows
    Combine(CombineArgs),
}

/// Arguments of `attack`
#[derive(Args)]
pub struct AttackArgs {
    /// Parquet file with a `caption` column
    #[arg(short, long)]
    pub input: PathBuf,

    /// Parquet file receiving the scored rows
    #[arg(short, long)]
    pub output: PathBuf,

    /// URL of the image generation service
    #[arg(long, conflicts_with = "replay", required_unless_present = "replay")]
    pub endpoint: Option<String>,

    /// Re-score generations saved below this folder instead of generating
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Generations per caption
    #[arg(short = 'n', long, default_value_t = DEFAULT_SEEDS_PER_CAPTION)]
    pub seeds: usize,

    /// First seed of every caption
    #[arg(long, default_value_t = DEFAULT_SEED_OFFSET)]
    pub seed_offset: u64,

    /// Index of the first caption to attack
    #[arg(long, default_value_t = 0)]
    pub caption_offset: usize,

    /// Number of captions to attack (all remaining if omitted or 0)
    #[arg(long)]
    pub captions: Option<usize>,

    /// Denoising steps per generation
    #[arg(long, default_value_t = DEFAULT_GENERATION_STEPS)]
    pub steps: u32,

    /// Square resolution generations are scored at
    #[arg(long, default_value_t = SCORING_RESOLUTION)]
    pub resolution: u32,

    /// Save every generation below this folder
    #[arg(long)]
    pub outfolder: Option<PathBuf>,
}

/// Arguments of `prepare`
#[derive(Args)]
pub struct PrepareArgs {
    /// Fully analyzed parquet file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Parquet file receiving the selected rows
    #[arg(short, long)]
    pub output: PathBuf,

    /// Number of rows to keep
    #[arg(short, long, default_value_t = DEFAULT_PREPARE_AMOUNT)]
    pub amount: usize,

    /// Drop the analysis columns
    #[arg(short, long)]
    pub drop: bool,
}

/// Arguments of `best`
#[derive(Args)]
pub struct BestArgs {
    /// Scored parquet file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Parquet file receiving the ranked rows
    #[arg(short, long)]
    pub output: PathBuf,

    /// Number of rows to keep
    #[arg(short, long, default_value_t = DEFAULT_BEST_AMOUNT)]
    pub amount: usize,

    /// Column to rank by
    #[arg(short, long, default_value = EDGE_SCORE_COLUMN)]
    pub sort_by: String,

    /// Rank smallest values first
    #[arg(long)]
    pub ascending: bool,

    /// Drop the analysis columns
    #[arg(short, long)]
    pub drop: bool,
}

/// Arguments of `combine`
#[derive(Args)]
pub struct CombineArgs {
    /// Ranked parquet file with `caption` and `url` columns
    #[arg(short, long)]
    pub input: PathBuf,

    /// Folder holding the saved generations
    #[arg(short, long)]
    pub attack_folder: PathBuf,

    /// First ranked row to render
    #[arg(long, default_value_t = 0)]
    pub index: usize,

    /// Number of consecutive rows to render
    #[arg(short, long, default_value_t = 1)]
    pub count: usize,

    /// Count rows from the bottom of the ranking
    #[arg(short, long)]
    pub worst: bool,

    /// Generations per strip
    #[arg(long, default_value_t = COMPARISON_SEEDS)]
    pub seeds: u64,

    /// Subfolder for the strips
    #[arg(long, default_value = DEFAULT_COMPARISON_NAME)]
    pub output: String,

    /// Root folder for the strips
    #[arg(long, default_value = DEFAULT_COMPARISON_ROOT)]
    pub output_root: PathBuf,
}

impl AttackArgs {
    /// Attack configuration described by these arguments
    pub fn to_config(&self, show_progress: bool) -> AttackConfig {
        AttackConfig {
            seeds_per_caption: self.seeds,
            seed_offset: self.seed_offset,
            caption_offset: self.caption_offset,
            caption_limit: self.captions.filter(|&count| count > 0),
            steps: self.steps,
            resolution: self.resolution,
            outfolder: self.outfolder.clone(),
            show_progress,
        }
    }

    fn generator(&self) -> Result<Box<dyn ImageGenerator>> {
        match (&self.endpoint, &self.replay) {
            (_, Some(root)) => Ok(Box::new(ReplayGenerator::new(root.clone()))),
            (Some(endpoint), None) => Ok(Box::new(HttpGenerator::new(endpoint.clone())?)),
            (None, None) => Err(invalid_parameter(
                "endpoint",
                &"",
                &"either --endpoint or --replay is required",
            )),
        }
    }
}

impl CombineArgs {
    /// Strip options described by these arguments
    pub fn to_options(&self) -> ComparisonOptions {
        ComparisonOptions {
            attack_folder: self.attack_folder.clone(),
            output_root: self.output_root.clone(),
            output_name: self.output.clone(),
            best: !self.worst,
            seeds: self.seeds,
        }
    }

    /// Ranked row indices to render, cut short at `usize::MAX`
    pub const fn indices(&self) -> Range<usize> {
        self.index..self.index.saturating_add(self.count)
    }
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Log filter used when `RUST_LOG` is unset
    pub const fn log_filter(&self) -> &'static str {
        default_filter(self.verbose, self.quiet)
    }

    /// Execute the selected command
    ///
    /// # Errors
    ///
    /// Returns an error if reading, processing or writing fails
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Command::Attack(args) => self.run_attack(args),
            Command::Prepare(args) => Self::run_prepare(args),
            Command::Best(args) => Self::run_best(args),
            Command::Combine(args) => Self::run_combine(args),
        }
    }

    fn run_attack(&self, args: &AttackArgs) -> Result<()> {
        let table = Table::read_parquet(&args.input)?;
        info!(path = %args.input.display(), rows = table.num_rows(), "Loaded captions");

        let mut runner =
            AttackRunner::new(args.generator()?, args.to_config(self.should_show_progress()))?;
        let scored = runner.run(&table)?;
        scored.write_parquet(&args.output)?;

        info!(path = %args.output.display(), rows = scored.num_rows(), "Saved edge scores");
        Ok(())
    }

    fn run_prepare(args: &PrepareArgs) -> Result<()> {
        let table = Table::read_parquet(&args.input)?;
        let prepared = prepare_for_multiple(&table, args.amount, args.drop)?;
        prepared.write_parquet(&args.output)?;

        info!(path = %args.output.display(), rows = prepared.num_rows(), "Prepared data saved");
        Ok(())
    }

    fn run_best(args: &BestArgs) -> Result<()> {
        let table = Table::read_parquet(&args.input)?;
        let options = RankOptions {
            sort_by: args.sort_by.clone(),
            order: SortOrder::from_ascending(args.ascending),
            amount: args.amount,
            drop_auxiliary: args.drop,
        };
        let ranked = best_scoring(&table, &options)?;
        ranked.write_parquet(&args.output)?;

        info!(path = %args.output.display(), rows = ranked.num_rows(), "Ranked rows saved");
        Ok(())
    }

    fn run_combine(args: &CombineArgs) -> Result<()> {
        let table = Table::read_parquet(&args.input)?;
        let source = HttpImageSource::new()?;
        let options = args.to_options();

        for index in args.indices() {
            render_comparison(&table, index, &options, &source)?;
        }
        Ok(())
    }
}
