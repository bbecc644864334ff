//! Score model
//!
//! The regressor itself is trained elsewhere; this module only knows how
//! to rebuild it from a saved record and its metadata sidecar.

pub mod metadata;
pub mod regressor;

pub use metadata::ModelMetadata;
pub use regressor::{RegressorConfig, ScoreRegressor};
