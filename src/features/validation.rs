//! Checks for physically impossible match states
//!
//! Numeric ranges are already enforced when a [`MatchInput`] becomes a
//! [`MatchState`]. What is left here is team selection and the overs
//! notation, which the form only warns about.
//!
//! [`MatchInput`]: crate::features::MatchInput

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::features::match_state::overs_fraction_valid;
use crate::features::MatchState;
use crate::{IplError, Result};

/// How an impossible overs value such as 10.7 is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OversPolicy {
    /// Report it and keep going
    #[default]
    Advisory,
    /// Refuse to predict
    Strict,
}

impl OversPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            OversPolicy::Strict
        } else {
            OversPolicy::Advisory
        }
    }
}

/// Non-fatal problem found in a match state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Advisory {
    InvalidOversFormat { overs: f64 },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::InvalidOversFormat { overs } => {
                write!(f, "Invalid input {}: 1 over has only 6 balls", overs)
            }
        }
    }
}

/// Validate a state before encoding.
///
/// Same-team selection is always an error. Overs notation is an error only
/// under [`OversPolicy::Strict`]; otherwise it comes back as an advisory.
pub fn validate(state: &MatchState, policy: OversPolicy) -> Result<Vec<Advisory>> {
    if state.batting_team == state.bowling_team {
        return Err(IplError::InvalidSelection(state.batting_team));
    }

    Ok(check_overs(state.overs_completed, policy)?
        .into_iter()
        .collect())
}

/// Check a single overs entry, as soon as it is typed
pub fn check_overs(overs: f64, policy: OversPolicy) -> Result<Option<Advisory>> {
    if overs_fraction_valid(overs) {
        return Ok(None);
    }

    match policy {
        OversPolicy::Strict => Err(IplError::InvalidOversFormat { overs }),
        OversPolicy::Advisory => {
            log::warn!("Overs {} has more than 5 balls in the current over", overs);
            Ok(Some(Advisory::InvalidOversFormat { overs }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::MatchInput;
    use crate::Team;

    fn state_with_overs(overs: f64) -> MatchState {
        MatchInput {
            batting_team: Team::MumbaiIndians,
            bowling_team: Team::ChennaiSuperKings,
            overs,
            runs: 80,
            wickets: 2,
            runs_last_five: 40,
            wickets_last_five: 1,
        }
        .into_state()
    }

    #[test]
    fn test_valid_state_has_no_advisories() {
        let advisories = validate(&state_with_overs(10.0), OversPolicy::Advisory).unwrap();
        assert!(advisories.is_empty());

        let advisories = validate(&state_with_overs(10.5), OversPolicy::Strict).unwrap();
        assert!(advisories.is_empty());
    }

    #[test]
    fn test_bad_overs_flagged_as_advisory() {
        let advisories = validate(&state_with_overs(10.7), OversPolicy::Advisory).unwrap();
        assert_eq!(advisories.len(), 1);
        assert!(matches!(
            advisories[0],
            Advisory::InvalidOversFormat { overs } if (overs - 10.7).abs() < 1e-9
        ));
        assert!(advisories[0].to_string().contains("6 balls"));
    }

    #[test]
    fn test_bad_overs_rejected_when_strict() {
        let err = validate(&state_with_overs(10.7), OversPolicy::Strict).unwrap_err();
        assert!(matches!(err, IplError::InvalidOversFormat { .. }));
    }

    #[test]
    fn test_same_team_is_always_an_error() {
        let mut state = state_with_overs(10.0);
        state.bowling_team = state.batting_team;

        for policy in [OversPolicy::Advisory, OversPolicy::Strict] {
            let err = validate(&state, policy).unwrap_err();
            assert!(matches!(err, IplError::InvalidSelection(Team::MumbaiIndians)));
        }
    }

    #[test]
    fn test_check_single_overs_entry() {
        assert_eq!(check_overs(12.3, OversPolicy::Strict).unwrap(), None);
        assert_eq!(
            check_overs(12.9, OversPolicy::Advisory).unwrap(),
            Some(Advisory::InvalidOversFormat { overs: 12.9 })
        );
        assert!(matches!(
            check_overs(12.9, OversPolicy::Strict),
            Err(IplError::InvalidOversFormat { .. })
        ));
    }

    #[test]
    fn test_policy_from_flag() {
        assert_eq!(OversPolicy::from_strict(true), OversPolicy::Strict);
        assert_eq!(OversPolicy::from_strict(false), OversPolicy::Advisory);
        assert_eq!(OversPolicy::default(), OversPolicy::Advisory);
    }
}
