//! Source image retrieval that never fails the caller
//!
//! Comparison strips prefer completeness over correctness: any image that
//! cannot be fetched or decoded is replaced by a gray placeholder, and the
//! reason travels with it in [`Download::Placeholder`].

use crate::io::configuration::DOWNLOAD_TIMEOUT_SECS;
use crate::io::error::{AttackError, Result};
use crate::io::image::{load_rgb, placeholder};
use image::RgbImage;
use reqwest::blocking::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Outcome of fetching one image
#[derive(Debug, Clone)]
pub enum Download {
    /// The image was retrieved and decoded
    Image(RgbImage),
    /// The image could not be obtained; a gray stand-in is used instead
    Placeholder {
        /// Stand-in raster
        image: RgbImage,
        /// Why the real image is missing
        reason: String,
    },
}

impl Download {
    /// Gray placeholder carrying the failure reason
    pub fn placeholder(reason: impl Into<String>) -> Self {
        Self::Placeholder {
            image: placeholder(),
            reason: reason.into(),
        }
    }

    /// The retrieved image or the placeholder
    pub const fn image(&self) -> &RgbImage {
        match self {
            Self::Image(image) | Self::Placeholder { image, .. } => image,
        }
    }

    /// Consume into the retrieved image or the placeholder
    pub fn into_image(self) -> RgbImage {
        match self {
            Self::Image(image) | Self::Placeholder { image, .. } => image,
        }
    }

    /// Whether this is a placeholder
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }
}

/// Anything that can resolve an image URL
pub trait ImageSource {
    /// Fetch the image at `url`, substituting a placeholder on failure
    fn fetch(&self, url: &str) -> Download;
}

/// HTTP(S) image source with a short timeout
pub struct HttpImageSource {
    client: Client,
}

impl HttpImageSource {
    /// Create a source with the default download timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
    }

    /// Create a source with a custom timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    fn try_fetch(&self, url: &str) -> Result<RgbImage> {
        let response = self.client.get(url).send()?.error_for_status()?;
        let bytes = response.bytes()?;
        let image = image::load_from_memory(&bytes).map_err(|e| AttackError::ImageLoad {
            path: PathBuf::from(url),
            source: e,
        })?;
        Ok(image.to_rgb8())
    }
}

impl ImageSource for HttpImageSource {
    fn fetch(&self, url: &str) -> Download {
        match self.try_fetch(url) {
            Ok(image) => Download::Image(image),
            Err(e) => {
                warn!(url, error = %e, "Download failed, using placeholder");
                Download::placeholder(e.to_string())
            }
        }
    }
}

/// Load a local image, substituting a placeholder on failure
pub fn load_or_placeholder(path: &Path) -> Download {
    match load_rgb(path) {
        Ok(image) => Download::Image(image),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Image unavailable, using placeholder");
            Download::placeholder(e.to_string())
        }
    }
}
