//! Prediction and inference
//!
//! Load the trained score model once and score match states against it.

pub mod adapter;
pub mod inference;

pub use adapter::{BurnScoreModel, InferenceBackend, ScoreModel};
pub use inference::{
    format_prediction, format_prediction_csv, format_prediction_json, Prediction, Predictor,
    ScoreRange, CSV_HEADER,
};
