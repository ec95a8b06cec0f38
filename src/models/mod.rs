//! Data models

pub mod choices;
pub mod record;
pub mod prediction;

pub use choices::*;
pub use record::*;
pub use prediction::*;
