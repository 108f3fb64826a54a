//! Render references: image URLs derived from diagram source.

use crate::encoder;

/// Public PlantUML server, SVG output.
pub const DEFAULT_RENDER_BASE_URL: &str = "https://www.plantuml.com/plantuml/svg";

/// Join a render base URL and an encoded token into `{base}/{token}`.
#[must_use]
pub fn build_reference(token: &str, base_url: &str) -> String {
    format!("{}/{token}", base_url.trim_end_matches('/'))
}

/// Derives image references from diagram source for one render service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceBuilder {
    base_url: String,
}

impl ReferenceBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Image reference for `document`, or `""` when the document is empty.
    ///
    /// An empty document never reaches the encoder, so no render request
    /// for "nothing" is ever built.
    #[must_use]
    pub fn reference_for(&self, document: &str) -> String {
        if document.is_empty() {
            return String::new();
        }
        build_reference(&encoder::encode(document), &self.base_url)
    }
}

impl Default for ReferenceBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_RENDER_BASE_URL)
    }
}

#[cfg(test)]
#[path = "reference_test.rs"]
mod tests;
