//! Pipeline controller: owns one session and runs its I/O.
//!
//! DESIGN
//! ======
//! The controller holds the only [`SessionState`] of a session. User intents
//! become [`Event`]s; each event goes through the pure transition function,
//! and any [`Effect`] it asks for (a generation request or an export) is
//! awaited here and its outcome fed back as the next event. Taking
//! `&mut self` for the async intents means one operation is in flight at a
//! time; nothing is cancelled once started.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::export::{ExportError, HttpImageFetcher, RasterExporter};
use crate::generation::{DiagramGenerator, GenerationError, HttpGenerator};
use crate::reference::ReferenceBuilder;
use crate::session::{Effect, Event, SessionState};

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("generation client: {0}")]
    Generation(#[from] GenerationError),
    #[error("image fetcher: {0}")]
    Export(#[from] ExportError),
}

pub struct PipelineController {
    state: SessionState,
    refs: ReferenceBuilder,
    generator: Box<dyn DiagramGenerator>,
    exporter: RasterExporter,
}

impl PipelineController {
    pub fn new(generator: Box<dyn DiagramGenerator>, exporter: RasterExporter, refs: ReferenceBuilder) -> Self {
        Self { state: SessionState::default(), refs, generator, exporter }
    }

    /// Build a controller wired to the HTTP generation and render services.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] if an HTTP client cannot be built.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, SetupError> {
        let generator = HttpGenerator::new(config.generate_url.clone(), config.timeouts)?;
        let fetcher = HttpImageFetcher::new(config.timeouts)?;
        let exporter = RasterExporter::new(Box::new(fetcher), config.out_dir.clone());
        Ok(Self::new(Box::new(generator), exporter, ReferenceBuilder::new(config.render_base_url.clone())))
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn references(&self) -> &ReferenceBuilder {
        &self.refs
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.apply_local(Event::PromptChanged(prompt.into()));
    }

    /// Submit the current prompt and wait for the generation service.
    ///
    /// # Errors
    ///
    /// Returns the error the session ends up holding: an empty prompt, an
    /// unavailable service, or an empty result. The same error stays
    /// visible through [`SessionState::error`].
    pub async fn submit(&mut self) -> Result<(), PipelineError> {
        self.dispatch(Event::Submit).await;
        self.state.error().cloned().map_or(Ok(()), Err)
    }

    /// Replace the document with hand-edited text and return the new image
    /// reference.
    pub fn edit_document(&mut self, text: impl Into<String>) -> &str {
        self.apply_local(Event::DocumentEdited(text.into()));
        self.state.image_reference()
    }

    /// Export the current image as PNG.
    ///
    /// Returns `Ok(None)` when there is no image to export.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Export`] if fetching, rasterizing, or saving
    /// fails. Document and image reference are left as they were.
    pub async fn export(&mut self) -> Result<Option<PathBuf>, PipelineError> {
        if self.state.image_reference().is_empty() {
            self.apply_local(Event::ExportRequested);
            return Ok(None);
        }
        self.dispatch(Event::ExportRequested).await;
        match self.state.error() {
            Some(err) => Err(err.clone()),
            None => Ok(self.state.last_export().map(PathBuf::from)),
        }
    }

    pub fn reset(&mut self) {
        self.apply_local(Event::Reset);
    }

    async fn dispatch(&mut self, event: Event) {
        let mut next = Some(event);
        while let Some(event) = next.take() {
            let (state, effect) = std::mem::take(&mut self.state).apply(event, &self.refs);
            self.state = state;
            if let Some(effect) = effect {
                next = Some(self.run_effect(effect).await);
            }
        }
    }

    async fn run_effect(&self, effect: Effect) -> Event {
        match effect {
            Effect::Generate { prompt } => {
                info!(prompt_len = prompt.len(), "requesting diagram");
                match self.generator.generate(&prompt).await {
                    Ok(raw) => Event::GenerationSucceeded(raw),
                    Err(e) => {
                        warn!(error = %e, "diagram generation failed");
                        Event::GenerationFailed(e.into())
                    }
                }
            }
            Effect::Export { image_url } => match self.exporter.export(&image_url).await {
                Ok(path) => Event::ExportSucceeded(path),
                Err(e) => {
                    warn!(error = %e, %image_url, "export failed");
                    Event::ExportFailed(e)
                }
            },
        }
    }

    fn apply_local(&mut self, event: Event) {
        let (state, effect) = std::mem::take(&mut self.state).apply(event, &self.refs);
        self.state = state;
        debug_assert!(effect.is_none(), "local events never request I/O");
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
