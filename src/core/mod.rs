//! Core domain models for Pipeline
//!
//! This module defines the step kinds, the pipeline that orders them,
//! and the state and errors produced while running them.

pub mod error;
pub mod pipeline;
pub mod state;
pub mod step;

pub use error::*;
pub use pipeline::*;
pub use state::*;
pub use step::*;
