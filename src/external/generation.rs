//! Image synthesis capability
//!
//! The diffusion model runs outside this crate. [`HttpGenerator`] talks to an
//! inference service; [`ReplayGenerator`] re-reads generations saved by an
//! earlier run so that scores can be recomputed offline.

use crate::attack::naming::generation_path;
use crate::io::error::{AttackError, Result};
use crate::io::image::load_rgb;
use image::RgbImage;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One unconditioned synthesis request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    /// Caption to condition on
    pub prompt: String,
    /// Seed of the sampling trajectory
    pub seed: u64,
    /// Number of denoising steps
    pub steps: u32,
}

/// Produces one raster per request
pub trait ImageGenerator {
    /// Synthesize the image for `request`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails; callers do not retry
    fn generate(&self, request: &GenerationRequest) -> Result<RgbImage>;
}

impl<G: ImageGenerator + ?Sized> ImageGenerator for Box<G> {
    fn generate(&self, request: &GenerationRequest) -> Result<RgbImage> {
        (**self).generate(request)
    }
}

impl<G: ImageGenerator + ?Sized> ImageGenerator for &G {
    fn generate(&self, request: &GenerationRequest) -> Result<RgbImage> {
        (**self).generate(request)
    }
}

/// Inference service reached over HTTP
///
/// Requests are POSTed as JSON `{"prompt", "seed", "steps"}`; the response
/// body must be an encoded image. No timeout is applied.
pub struct HttpGenerator {
    client: Client,
    endpoint: String,
}

impl HttpGenerator {
    /// Create a generator for the given endpoint URL
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(None::<Duration>).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Endpoint URL requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ImageGenerator for HttpGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<RgbImage> {
        let failure = |reason: String| AttackError::Generation {
            prompt: request.prompt.clone(),
            seed: request.seed,
            reason,
        };

        let body = serde_json::to_vec(request).map_err(|e| failure(e.to_string()))?;
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure(format!("service returned {status}")));
        }

        let bytes = response.bytes()?;
        let image = image::load_from_memory(&bytes)
            .map_err(|e| failure(format!("undecodable image: {e}")))?;
        Ok(image.to_rgb8())
    }
}

/// Serves generations saved under `{root}/{caption folder}/{seed:04}.jpg`
pub struct ReplayGenerator {
    root: PathBuf,
}

impl ReplayGenerator {
    /// Replay generations stored below `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Folder the generations are read from
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageGenerator for ReplayGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<RgbImage> {
        load_rgb(&generation_path(&self.root, &request.prompt, request.seed))
    }
}
