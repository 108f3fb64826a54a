//! Raster export: image reference → `flowchart.png` on disk.
//!
//! DESIGN
//! ======
//! Export is fetch → rasterize → write. Fetching sits behind
//! [`ImageFetcher`] so the controller can be exercised against failing
//! transports without a network. Nothing here touches session state; the
//! controller applies the outcome after the export completes.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{EXPORT_FILE_NAME, HttpTimeouts};
use crate::raster;

/// Failures anywhere in the export pipeline. The message is the cause shown
/// after "Failed to download flowchart: ".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    #[error("{0}")]
    Fetch(String),

    #[error("render service returned status {0}")]
    Status(u16),

    #[error("could not decode image: {0}")]
    Decode(String),

    #[error("could not rasterize image: {0}")]
    Rasterize(String),

    #[error("could not encode PNG: {0}")]
    Encode(String),

    #[error("could not save file: {0}")]
    Write(String),
}

// =============================================================================
// FETCHER
// =============================================================================

/// Retrieves the vector image behind an image reference.
#[async_trait::async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch the SVG document at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Fetch`] or [`ExportError::Status`] when the
    /// image cannot be retrieved.
    async fn fetch_svg(&self, url: &str) -> Result<String, ExportError>;
}

/// [`ImageFetcher`] over HTTP.
pub struct HttpImageFetcher {
    http: reqwest::Client,
}

impl HttpImageFetcher {
    /// # Errors
    ///
    /// Returns [`ExportError::Fetch`] if the HTTP client cannot be built.
    pub fn new(timeouts: HttpTimeouts) -> Result<Self, ExportError> {
        let mut builder = reqwest::Client::builder().connect_timeout(timeouts.connect);
        if let Some(request) = timeouts.request {
            builder = builder.timeout(request);
        }
        let http = builder.build().map_err(|e| ExportError::Fetch(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch_svg(&self, url: &str) -> Result<String, ExportError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ExportError::Fetch(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::Status(status.as_u16()));
        }
        response.text().await.map_err(|e| ExportError::Fetch(e.to_string()))
    }
}

// =============================================================================
// EXPORTER
// =============================================================================

/// Turns an image reference into a PNG file with a fixed name.
pub struct RasterExporter {
    fetcher: Box<dyn ImageFetcher>,
    out_dir: PathBuf,
}

impl RasterExporter {
    pub fn new(fetcher: Box<dyn ImageFetcher>, out_dir: impl Into<PathBuf>) -> Self {
        Self { fetcher, out_dir: out_dir.into() }
    }

    #[must_use]
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Where [`export`](Self::export) writes the PNG.
    #[must_use]
    pub fn target_path(&self) -> PathBuf {
        self.out_dir.join(EXPORT_FILE_NAME)
    }

    /// Fetch, rasterize, and save the image at `image_url`.
    ///
    /// Returns the path of the written file. An existing file is replaced.
    ///
    /// # Errors
    ///
    /// Returns the first [`ExportError`] hit along the way; no retry.
    pub async fn export(&self, image_url: &str) -> Result<PathBuf, ExportError> {
        let svg = self.fetcher.fetch_svg(image_url).await?;
        debug!(bytes = svg.len(), "fetched svg");

        let png = raster::svg_to_png(&svg)?;

        let path = self.target_path();
        tokio::fs::write(&path, &png)
            .await
            .map_err(|e| ExportError::Write(format!("{}: {e}", path.display())))?;

        info!(path = %path.display(), bytes = png.len(), "exported flowchart");
        Ok(path)
    }
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
