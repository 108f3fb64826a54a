//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the model interaction so route handlers can stay
//! focused on protocol translation.

pub mod diagram;
