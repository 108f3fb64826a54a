//! Session state machine.
//!
//! DESIGN
//! ======
//! A session is a plain [`SessionState`] value. [`SessionState::apply`] is
//! a pure `(state, event) → (state, effect)` function: it never performs
//! I/O, it only names the I/O the caller must run next ([`Effect`]). The
//! caller feeds the outcome back in as another [`Event`].
//!
//! The image reference is a cache of the document. It is written only by
//! `recompute`, which runs after every transition that can change the
//! document, so it can never go stale.
//!
//! ```text
//!        submit             success
//!  Idle ───────▶ Awaiting ──────────▶ Ready ◀─┐
//!   ▲               │                  │      │ edit
//!   │               │ failure          │      │
//!   │ reset         ▼                  ▼      │
//!   └──────────── Failed ──────────────┴──────┘
//! ```

use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::export::ExportError;
use crate::generation::strip_fences;
use crate::reference::ReferenceBuilder;

/// Where the session is in the prompt → diagram cycle. No phase is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    /// A generation request is in flight; submission is disabled.
    AwaitingGeneration,
    Ready,
    Failed,
}

/// Something that happened to the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The prompt input changed.
    PromptChanged(String),
    /// The user asked to generate a diagram from the current prompt.
    Submit,
    /// The generation service answered with raw `result` text.
    GenerationSucceeded(String),
    /// The generation request failed or returned nothing usable.
    GenerationFailed(PipelineError),
    /// The user replaced the document text.
    DocumentEdited(String),
    /// The user asked for a PNG export of the current image.
    ExportRequested,
    ExportSucceeded(PathBuf),
    ExportFailed(ExportError),
    Reset,
}

/// I/O the caller must perform after a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Generate { prompt: String },
    Export { image_url: String },
}

/// Complete state of one session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    phase: Phase,
    prompt: String,
    document: String,
    image_reference: String,
    error: Option<PipelineError>,
    last_export: Option<PathBuf>,
}

impl SessionState {
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Current diagram source.
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Image URL for the current document; empty when the document is.
    #[must_use]
    pub fn image_reference(&self) -> &str {
        &self.image_reference
    }

    #[must_use]
    pub fn error(&self) -> Option<&PipelineError> {
        self.error.as_ref()
    }

    /// The single error message to show, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    #[must_use]
    pub fn last_export(&self) -> Option<&Path> {
        self.last_export.as_deref()
    }

    /// Whether a new prompt submission would be accepted.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.phase != Phase::AwaitingGeneration
    }

    /// Apply `event`, returning the next state and any I/O to perform.
    #[must_use]
    pub fn apply(mut self, event: Event, refs: &ReferenceBuilder) -> (Self, Option<Effect>) {
        let effect = match event {
            Event::PromptChanged(prompt) => {
                self.prompt = prompt;
                None
            }
            Event::Submit => self.submit(),
            Event::GenerationSucceeded(raw) => {
                self.accept_generation(&raw, refs);
                None
            }
            Event::GenerationFailed(err) => {
                if self.phase == Phase::AwaitingGeneration {
                    self.phase = Phase::Failed;
                    self.error = Some(err);
                }
                None
            }
            Event::DocumentEdited(text) => {
                self.edit_document(text, refs);
                None
            }
            Event::ExportRequested => {
                self.error = None;
                if self.image_reference.is_empty() {
                    None
                } else {
                    Some(Effect::Export { image_url: self.image_reference.clone() })
                }
            }
            Event::ExportSucceeded(path) => {
                self.last_export = Some(path);
                None
            }
            Event::ExportFailed(err) => {
                self.error = Some(PipelineError::Export(err));
                None
            }
            Event::Reset => return (Self::default(), None),
        };
        (self, effect)
    }

    fn submit(&mut self) -> Option<Effect> {
        if !self.can_submit() {
            return None;
        }
        if self.prompt.is_empty() {
            self.error = Some(PipelineError::EmptyPrompt);
            return None;
        }
        self.error = None;
        self.phase = Phase::AwaitingGeneration;
        Some(Effect::Generate { prompt: self.prompt.clone() })
    }

    fn accept_generation(&mut self, raw: &str, refs: &ReferenceBuilder) {
        // A late answer after a reset belongs to a session that no longer exists.
        if self.phase != Phase::AwaitingGeneration {
            return;
        }
        let cleaned = strip_fences(raw);
        if cleaned.is_empty() {
            self.phase = Phase::Failed;
            self.error = Some(PipelineError::EmptyResult);
            return;
        }
        self.document = cleaned.to_string();
        self.recompute(refs);
        self.phase = Phase::Ready;
    }

    fn edit_document(&mut self, text: String, refs: &ReferenceBuilder) {
        if self.phase == Phase::AwaitingGeneration {
            return;
        }
        self.document = text;
        self.recompute(refs);
        self.error = None;
        self.phase = Phase::Ready;
    }

    fn recompute(&mut self, refs: &ReferenceBuilder) {
        self.image_reference = refs.reference_for(&self.document);
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
