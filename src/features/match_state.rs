//! Match state as entered on the prediction form
//!
//! [`MatchInput`] holds raw values; converting it into a [`MatchState`]
//! applies the same bounds the form widgets enforce.

use serde::{Deserialize, Serialize};

use crate::Team;

/// Fewest overs the model gives usable predictions for
pub const MIN_OVERS: f64 = 5.0;
/// Length of a T20 innings
pub const MAX_OVERS: f64 = 20.0;
pub const MAX_RUNS: u32 = 300;
pub const MAX_WICKETS: u32 = 9;
pub const BALLS_PER_OVER: u32 = 6;

/// Tolerance for decimal overs such as 10.5 that are not exact in binary
const OVERS_EPSILON: f64 = 1e-6;

/// Raw form values before any bounds are applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchInput {
    pub batting_team: Team,
    pub bowling_team: Team,
    pub overs: f64,
    pub runs: i64,
    pub wickets: i64,
    pub runs_last_five: i64,
    pub wickets_last_five: i64,
}

impl MatchInput {
    /// Clamp every field into its allowed range.
    ///
    /// Last-five-overs figures are bounded by the (already clamped) innings
    /// totals, so they can never exceed them.
    pub fn into_state(self) -> MatchState {
        let overs = if self.overs.is_finite() {
            self.overs.clamp(MIN_OVERS, MAX_OVERS)
        } else {
            MIN_OVERS
        };
        let runs = clamp_count(self.runs, MAX_RUNS);
        let wickets = clamp_count(self.wickets, MAX_WICKETS);
        let runs_last_five = clamp_count(self.runs_last_five, runs);
        let wickets_last_five = clamp_count(self.wickets_last_five, wickets);

        if overs != self.overs
            || i64::from(runs) != self.runs
            || i64::from(wickets) != self.wickets
            || i64::from(runs_last_five) != self.runs_last_five
            || i64::from(wickets_last_five) != self.wickets_last_five
        {
            log::warn!(
                "Clamped form input: overs {} -> {}, runs {} -> {}, wickets {} -> {}, last five {}/{} -> {}/{}",
                self.overs,
                overs,
                self.runs,
                runs,
                self.wickets,
                wickets,
                self.runs_last_five,
                self.wickets_last_five,
                runs_last_five,
                wickets_last_five
            );
        }

        MatchState {
            batting_team: self.batting_team,
            bowling_team: self.bowling_team,
            overs_completed: overs,
            current_runs: runs,
            wickets_fallen: wickets,
            runs_last_five_overs: runs_last_five,
            wickets_last_five_overs: wickets_last_five,
        }
    }
}

fn clamp_count(value: i64, max: u32) -> u32 {
    value.clamp(0, i64::from(max)) as u32
}

/// In-progress first innings, within form bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub batting_team: Team,
    pub bowling_team: Team,
    /// Cricket notation: 10.3 means ten overs and three balls
    pub overs_completed: f64,
    pub current_runs: u32,
    pub wickets_fallen: u32,
    pub runs_last_five_overs: u32,
    pub wickets_last_five_overs: u32,
}

impl MatchState {
    /// True when the fractional part is a real ball count (.0 to .5)
    pub fn has_valid_overs(&self) -> bool {
        overs_fraction_valid(self.overs_completed)
    }

    /// Total legal deliveries bowled so far, `None` for overs like 10.7
    pub fn balls_bowled(&self) -> Option<u32> {
        if !self.has_valid_overs() {
            return None;
        }
        let whole = self.overs_completed.floor();
        let balls = ((self.overs_completed - whole) * 10.0).round() as u32;
        Some(whole as u32 * BALLS_PER_OVER + balls)
    }
}

/// An over has six balls, so only .0 through .5 are meaningful
pub fn overs_fraction_valid(overs: f64) -> bool {
    overs - overs.floor() <= 0.5 + OVERS_EPSILON
}
