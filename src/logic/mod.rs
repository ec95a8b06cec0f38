//! Inference logic
//!
//! Artifact loading, the two concrete collaborators, and the request pipeline.

pub mod artifacts;
pub mod classifier;
pub mod pipeline;
pub mod preprocessor;
pub mod record;

pub use artifacts::ArtifactPaths;
pub use pipeline::{InferencePipeline, PredictionError};
