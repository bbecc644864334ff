//! Feature extraction and encoding
//!
//! Converts form input into model-ready features.

pub mod encoding;
pub mod match_state;
pub mod validation;

pub use encoding::FeatureVector;
pub use match_state::{MatchInput, MatchState};
pub use validation::{check_overs, validate, Advisory, OversPolicy};
