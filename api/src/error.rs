use crate::client::ApiError;
use crate::path::MissingField;
use serde::Serialize;
use thiserror::Error;

pub type CalcResult<T> = Result<T, CalcError>;

/// Failures that abort a calculation. The public `calculate` entry points
/// log these and hand back `None`.
#[derive(Debug, Error)]
pub enum CalcError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] ApiError),
    #[error("{0} payload was empty")]
    EmptyPayload(&'static str),
    #[error("required field missing: {0}")]
    MissingField(#[from] MissingField),
}

/// A broken structural assumption about league data. Logged and collected;
/// the calculation carries on with whatever data is there.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvariantViolation {
    #[error("week {week} matchup has {found} teams, expected 2")]
    MatchupTeamCount { week: u32, found: usize },
    #[error("week {week} matchup has {found} stat winners, expected 9")]
    StatWinnerCount { week: u32, found: usize },
    #[error("team {team_key} in week {week} matchup is missing from standings")]
    UnknownTeam { week: u32, team_key: String },
    #[error("rank groups cover {covered} teams, league size is {league_size}")]
    RankGroupSum { covered: usize, league_size: usize },
}
