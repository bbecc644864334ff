//! Fixed-order feature vector for the score model
//!
//! Layout (length 21):
//! - `[0..8)`   batting team one-hot
//! - `[8..16)`  bowling team one-hot
//! - `[16..21)` runs, wickets, overs, runs last 5, wickets last 5
//!
//! The layout must match what the model was trained on.

use crate::features::MatchState;
use crate::{IplError, Result, Team};

/// Model input built from a [`MatchState`]
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f32; FeatureVector::DIM],
}

impl FeatureVector {
    /// Number of scalar match fields after the two one-hot blocks
    pub const SCALARS: usize = 5;
    /// Dimension of the feature vector
    pub const DIM: usize = 2 * Team::COUNT + Self::SCALARS;

    const BOWLING_OFFSET: usize = Team::COUNT;
    const SCALAR_OFFSET: usize = 2 * Team::COUNT;

    /// Encode a match state.
    ///
    /// Fails with [`IplError::InvalidSelection`] when one team is on both
    /// sides; callers filtering the bowling list is not relied upon.
    pub fn encode(state: &MatchState) -> Result<Self> {
        if state.batting_team == state.bowling_team {
            return Err(IplError::InvalidSelection(state.batting_team));
        }

        let mut values = [0.0f32; Self::DIM];

        for (i, team) in Team::ALL.iter().enumerate() {
            values[i] = one_hot(*team == state.batting_team);
            values[Self::BOWLING_OFFSET + i] = one_hot(*team == state.bowling_team);
        }

        let scalars = [
            state.current_runs as f32,
            state.wickets_fallen as f32,
            state.overs_completed as f32,
            state.runs_last_five_overs as f32,
            state.wickets_last_five_overs as f32,
        ];
        values[Self::SCALAR_OFFSET..].copy_from_slice(&scalars);

        log::debug!("Encoded {:?} vs {:?}: {:?}", state.batting_team, state.bowling_team, values);

        Ok(FeatureVector { values })
    }

    pub fn batting_block(&self) -> &[f32] {
        &self.values[..Self::BOWLING_OFFSET]
    }

    pub fn bowling_block(&self) -> &[f32] {
        &self.values[Self::BOWLING_OFFSET..Self::SCALAR_OFFSET]
    }

    /// Runs, wickets, overs, runs last 5, wickets last 5
    pub fn scalars(&self) -> &[f32] {
        &self.values[Self::SCALAR_OFFSET..]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

fn one_hot(selected: bool) -> f32 {
    if selected {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::MatchInput;

    fn state(batting: Team, bowling: Team) -> MatchState {
        MatchInput {
            batting_team: batting,
            bowling_team: bowling,
            overs: 10.0,
            runs: 80,
            wickets: 2,
            runs_last_five: 40,
            wickets_last_five: 1,
        }
        .into_state()
    }

    #[test]
    fn test_dimension() {
        assert_eq!(FeatureVector::DIM, 21);
        let v = FeatureVector::encode(&state(Team::KingsXiPunjab, Team::RajasthanRoyals)).unwrap();
        assert_eq!(v.as_slice().len(), 21);
    }

    #[test]
    fn test_mumbai_vs_chennai_layout() {
        let v =
            FeatureVector::encode(&state(Team::MumbaiIndians, Team::ChennaiSuperKings)).unwrap();

        let expected: [f32; 21] = [
            0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, // batting
            1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, // bowling
            80.0, 2.0, 10.0, 40.0, 1.0,
        ];
        assert_eq!(v.as_slice(), &expected);
    }

    #[test]
    fn test_same_team_rejected() {
        for team in Team::ALL {
            let err = FeatureVector::encode(&state(team, team)).unwrap_err();
            assert!(matches!(err, IplError::InvalidSelection(t) if t == team));
        }
    }

    #[test]
    fn test_one_hot_positions() {
        for batting in Team::ALL {
            for bowling in Team::bowling_options(batting) {
                let v = FeatureVector::encode(&state(batting, bowling)).unwrap();

                for (i, team) in Team::ALL.iter().enumerate() {
                    let want_bat = if *team == batting { 1.0 } else { 0.0 };
                    let want_bowl = if *team == bowling { 1.0 } else { 0.0 };
                    assert_eq!(v.batting_block()[i], want_bat);
                    assert_eq!(v.bowling_block()[i], want_bowl);
                }
                assert_eq!(v.batting_block().iter().sum::<f32>(), 1.0);
                assert_eq!(v.bowling_block().iter().sum::<f32>(), 1.0);

                // blocks never mark the same team
                assert!(v
                    .batting_block()
                    .iter()
                    .zip(v.bowling_block())
                    .all(|(a, b)| a * b == 0.0));
            }
        }
    }

    #[test]
    fn test_scalar_order() {
        let s = MatchInput {
            batting_team: Team::SunrisersHyderabad,
            bowling_team: Team::DelhiDaredevils,
            overs: 14.2,
            runs: 121,
            wickets: 4,
            runs_last_five: 47,
            wickets_last_five: 2,
        }
        .into_state();
        let v = FeatureVector::encode(&s).unwrap();
        assert_eq!(v.scalars(), &[121.0, 4.0, 14.2f64 as f32, 47.0, 2.0]);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let s = state(Team::RoyalChallengersBangalore, Team::KolkataKnightRiders);
        let a = FeatureVector::encode(&s).unwrap();
        let b = FeatureVector::encode(&s).unwrap();

        let bits = |v: &FeatureVector| v.as_slice().iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }
}
