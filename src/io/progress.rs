//! Caption and seed progress display for attack runs

use crate::io::configuration::{PROGRESS_BAR_WIDTH, PROGRESS_CAPTION_CHARS};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static CAPTION_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] Captions: [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} ({{eta}})"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

static SEED_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:20.green/white}] {pos}/{len} seeds")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Two stacked bars: captions done, and seeds of the current caption
pub struct ProgressManager {
    multi_progress: MultiProgress,
    caption_bar: Option<ProgressBar>,
    seed_bar: Option<ProgressBar>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Create a progress manager with no bars yet
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            caption_bar: None,
            seed_bar: None,
        }
    }

    /// Create the bars for `captions` captions of `seeds` generations each
    pub fn initialize(&mut self, captions: usize, seeds: usize) {
        let caption_bar = ProgressBar::new(captions as u64);
        caption_bar.set_style(CAPTION_STYLE.clone());
        self.caption_bar = Some(self.multi_progress.add(caption_bar));

        let seed_bar = ProgressBar::new(seeds as u64);
        seed_bar.set_style(SEED_STYLE.clone());
        self.seed_bar = Some(self.multi_progress.add(seed_bar));
    }

    /// Show the caption currently being synthesized
    pub fn start_caption(&self, caption: &str) {
        if let Some(ref bar) = self.seed_bar {
            bar.set_position(0);
            bar.set_message(shorten(caption, PROGRESS_CAPTION_CHARS));
        }
    }

    /// Record one finished generation
    pub fn advance_seed(&self) {
        if let Some(ref bar) = self.seed_bar {
            bar.inc(1);
        }
    }

    /// Record one scored caption
    pub fn complete_caption(&self) {
        if let Some(ref bar) = self.caption_bar {
            bar.inc(1);
        }
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref bar) = self.caption_bar {
            bar.finish_with_message("All captions scored");
        }
        if let Some(ref bar) = self.seed_bar {
            bar.finish_and_clear();
        }
        let _ = self.multi_progress.clear();
    }
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `…`
pub fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    short.push('…');
    short
}
