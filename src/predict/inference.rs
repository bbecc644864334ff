//! Score prediction from match state

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::features::{validate, Advisory, FeatureVector, MatchState, OversPolicy};
use crate::predict::adapter::{check_dimension, ScoreModel};
use crate::{Config, IplError, Result};

/// Predicted final total, shown as a band around the rounded estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub low: i32,
    pub high: i32,
}

impl ScoreRange {
    /// Round to the nearest run (halves away from zero) and widen by `margin`.
    ///
    /// Estimates beyond `i32` saturate at its bounds.
    pub fn from_estimate(estimate: f32, margin: i32) -> Self {
        let centre = estimate.round() as i32;
        ScoreRange {
            low: centre.saturating_sub(margin),
            high: centre.saturating_add(margin),
        }
    }
}

impl fmt::Display for ScoreRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.low, self.high)
    }
}

/// Model output for one form submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub estimate: f32,
    pub range: ScoreRange,
    /// Problems with the input that did not stop the prediction
    pub advisories: Vec<Advisory>,
}

/// Runs match states through the encoder and a shared score model
pub struct Predictor {
    model: Arc<dyn ScoreModel>,
    policy: OversPolicy,
    margin: i32,
}

impl Predictor {
    /// Create a predictor with the default ±5 band and advisory overs check
    pub fn new(model: Arc<dyn ScoreModel>) -> Self {
        Predictor {
            model,
            policy: OversPolicy::Advisory,
            margin: 5,
        }
    }

    /// Create a predictor using the `[prediction]` config section
    pub fn from_config(model: Arc<dyn ScoreModel>, config: &Config) -> Self {
        Predictor::new(model)
            .with_policy(OversPolicy::from_strict(config.prediction.strict_overs))
            .with_margin(config.prediction.range_margin)
    }

    pub fn with_policy(mut self, policy: OversPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_margin(mut self, margin: i32) -> Self {
        self.margin = margin;
        self
    }

    pub fn policy(&self) -> OversPolicy {
        self.policy
    }

    /// Validate, encode and score a match state
    pub fn predict(&self, state: &MatchState) -> Result<Prediction> {
        let advisories = validate(state, self.policy)?;
        let features = FeatureVector::encode(state)?;
        let estimate = self.predict_features(&features)?;

        Ok(Prediction {
            estimate,
            range: ScoreRange::from_estimate(estimate, self.margin),
            advisories,
        })
    }

    /// Score an already encoded vector
    pub fn predict_features(&self, features: &FeatureVector) -> Result<f32> {
        check_dimension(self.model.as_ref(), features.as_slice())?;
        let estimate = self.model.predict(features.as_slice())?;
        if !estimate.is_finite() {
            log::error!("Model produced {} for {:?}", estimate, features.as_slice());
            return Err(IplError::NonFiniteEstimate(estimate));
        }
        Ok(estimate)
    }
}

/// Format a prediction for display
pub fn format_prediction(pred: &Prediction, state: &MatchState) -> String {
    let balls = match state.balls_bowled() {
        Some(balls) => format!(" ({} balls)", balls),
        None => String::new(),
    };

    let mut out = format!(
        r#"
┌─────────────────────────────────────────────────┐
│  {} batting vs {}
├─────────────────────────────────────────────────┤
│  Score:            {}/{} after {} overs{}
│  Last 5 overs:     {}/{}
│  Predicted total:  {} runs
└─────────────────────────────────────────────────┘
"#,
        state.batting_team,
        state.bowling_team,
        state.current_runs,
        state.wickets_fallen,
        state.overs_completed,
        balls,
        state.runs_last_five_overs,
        state.wickets_last_five_overs,
        pred.range,
    );

    for advisory in &pred.advisories {
        out.push_str(&format!("⚠️  {}\n", advisory));
    }

    out
}

/// Format a prediction as pretty JSON; `balls_bowled` is null for impossible overs
pub fn format_prediction_json(pred: &Prediction, state: &MatchState) -> Result<String> {
    let json = serde_json::json!({
        "batting": state.batting_team.name(),
        "bowling": state.bowling_team.name(),
        "overs": state.overs_completed,
        "balls_bowled": state.balls_bowled(),
        "runs": state.current_runs,
        "wickets": state.wickets_fallen,
        "runs_last_5": state.runs_last_five_overs,
        "wickets_last_5": state.wickets_last_five_overs,
        "estimate": pred.estimate,
        "low": pred.range.low,
        "high": pred.range.high,
        "advisories": pred
            .advisories
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>(),
    });
    serde_json::to_string_pretty(&json).map_err(|e| IplError::Parse(e.to_string()))
}

pub const CSV_HEADER: &str =
    "batting,bowling,overs,balls_bowled,runs,wickets,estimate,low,high,advisories";

/// Format a prediction as one CSV row matching [`CSV_HEADER`]
pub fn format_prediction_csv(pred: &Prediction, state: &MatchState) -> String {
    format!(
        "{},{},{},{},{},{},{:.1},{},{},{}",
        state.batting_team.code(),
        state.bowling_team.code(),
        state.overs_completed,
        state.balls_bowled().map(|b| b.to_string()).unwrap_or_default(),
        state.current_runs,
        state.wickets_fallen,
        pred.estimate,
        pred.range.low,
        pred.range.high,
        pred.advisories.len()
    )
}
