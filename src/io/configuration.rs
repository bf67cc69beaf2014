//! Attack constants and runtime configuration defaults

// Generation settings
/// Independent seeds generated per caption
pub const DEFAULT_SEEDS_PER_CAPTION: usize = 4;
/// First seed of every caption's seed range
pub const DEFAULT_SEED_OFFSET: u64 = 0;
/// Denoising steps requested from the generator (single-step attack)
pub const DEFAULT_GENERATION_STEPS: u32 = 1;
/// Minimum group size the scorer accepts
pub const MIN_GROUP_SIZE: usize = 2;

// Scoring settings
/// Square resolution generations are resized to before scoring
pub const SCORING_RESOLUTION: u32 = 256;

// Naming
/// Maximum characters in a caption-derived folder name
pub const MAX_FOLDER_NAME_LEN: usize = 200;
/// Extension used for saved generations
pub const GENERATION_EXTENSION: &str = "jpg";

// Table columns
/// Column holding the captions to attack
pub const CAPTION_COLUMN: &str = "caption";
/// Column holding the provenance URL of the training image
pub const URL_COLUMN: &str = "url";
/// Column appended by the attack
pub const EDGE_SCORE_COLUMN: &str = "edge_scores";
/// Externally computed reconstruction error column
pub const MSE_COLUMN: &str = "mse_real_gen";
/// Column whose presence marks a fully analyzed table
pub const TEMPLATE_COLUMN: &str = "template_indices";
/// Analysis columns removed when dropping is requested
pub const AUXILIARY_COLUMNS: [&str; 6] = [
    EDGE_SCORE_COLUMN,
    MSE_COLUMN,
    "overfit_type",
    "gen_seeds",
    "retrieved_urls",
    TEMPLATE_COLUMN,
];
/// Schema metadata key written by pandas, stale once columns change
pub const PANDAS_METADATA_KEY: &str = "pandas";
/// Column pandas stores an unnamed index in; carries row identity on disk
pub const PANDAS_INDEX_COLUMN: &str = "__index_level_0__";

// Ranking defaults
/// Rows kept by `best`
pub const DEFAULT_BEST_AMOUNT: usize = 200;
/// Rows kept by `prepare`
pub const DEFAULT_PREPARE_AMOUNT: usize = 400;

// Download and visualization
/// Timeout for fetching source images
pub const DOWNLOAD_TIMEOUT_SECS: u64 = 5;
/// Side length of gray placeholder images
pub const PLACEHOLDER_SIZE: u32 = 256;
/// Gray level of placeholder images
pub const PLACEHOLDER_GRAY: u8 = 128;
/// Generations shown next to the original in a comparison strip
pub const COMPARISON_SEEDS: u64 = 10;
/// Default root folder for comparison strips
pub const DEFAULT_COMPARISON_ROOT: &str = "output_combined_images";
/// Default subfolder for comparison strips
pub const DEFAULT_COMPARISON_NAME: &str = "onestep";

// Progress bar display settings
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;
/// Characters of the caption shown next to the seed bar
pub const PROGRESS_CAPTION_CHARS: usize = 48;
