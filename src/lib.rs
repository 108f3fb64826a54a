//! Flowchart: prompt-to-PlantUML pipeline.
//!
//! DESIGN
//! ======
//! A prompt goes to an external generation service which answers with
//! PlantUML source. The source is encoded into a render-service token, the
//! token into an image URL, and the image can be rasterized to PNG on
//! demand. The session itself is an explicit [`session::SessionState`]
//! value driven by pure transitions; [`controller::PipelineController`]
//! performs the I/O those transitions ask for.

pub mod config;
pub mod controller;
pub mod encoder;
pub mod error;
pub mod export;
pub mod generation;
pub mod raster;
pub mod reference;
pub mod session;

pub use config::PipelineConfig;
pub use controller::PipelineController;
pub use error::PipelineError;
pub use session::{Phase, SessionState};
