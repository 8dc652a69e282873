//! Builders for compact provider trees and an in-memory provider, shared by
//! the unit tests of the calculators.
use crate::client::{AccessToken, ApiError, ApiResult, DataProvider, WeekRange};
use crate::stat_id;
use serde_json::{Value, json};
use std::sync::Mutex;

/// The nine head-to-head categories in Yahoo's display order.
pub const NINE_CATS: [u32; 9] = [
    stat_id::FIELD_GOAL_PCT,
    stat_id::FREE_THROW_PCT,
    stat_id::THREES,
    stat_id::POINTS,
    stat_id::REBOUNDS,
    stat_id::ASSISTS,
    stat_id::STEALS,
    stat_id::BLOCKS,
    stat_id::TURNOVERS,
];

pub fn text(v: impl ToString) -> Value {
    json!({ "_text": v.to_string() })
}

fn team_node(key: &str) -> Value {
    json!({
        "team_key": text(key),
        "team_id": text(key.rsplit('.').next().unwrap_or(key)),
        "name": text(format!("Team {key}")),
        "team_logos": { "team_logo": { "url": text(format!("https://img.test/{key}.png")) } },
    })
}

/// `(team_key, wins, losses, ties)` per team, as of before `current_week`.
pub fn standings_tree(current_week: u32, teams: &[(&str, u32, u32, u32)]) -> Value {
    let teams: Vec<Value> = teams
        .iter()
        .enumerate()
        .map(|(i, (key, w, l, t))| {
            let mut node = team_node(key);
            node["team_standings"] = json!({
                "rank": text(i + 1),
                "outcome_totals": { "wins": text(w), "losses": text(l), "ties": text(t) },
            });
            node
        })
        .collect();
    json!({ "fantasy_content": { "league": {
        "current_week": text(current_week),
        "start_week": text(1),
        "standings": { "teams": { "team": teams } },
    }}})
}

pub fn scoreboard_tree(current_week: u32, start_week: u32, matchups: Vec<Value>) -> Value {
    json!({ "fantasy_content": { "league": {
        "current_week": text(current_week),
        "start_week": text(start_week),
        "scoreboard": { "matchups": { "matchup": matchups } },
    }}})
}

#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    Won(&'static str),
    Tied,
}

/// A matchup whose stat winners follow `outcomes`, assigned to categories in
/// [`NINE_CATS`] order.
pub fn matchup(week: u32, teams: [&str; 2], outcomes: &[Outcome]) -> Value {
    let winners: Vec<Value> = outcomes
        .iter()
        .zip(NINE_CATS.iter().cycle())
        .map(|(outcome, id)| match outcome {
            Outcome::Won(key) => json!({ "stat_id": text(id), "winner_team_key": text(key) }),
            Outcome::Tied => json!({ "stat_id": text(id), "is_tied": text(1) }),
        })
        .collect();
    json!({
        "week": text(week),
        "stat_winners": { "stat_winner": winners },
        "teams": { "team": teams.iter().map(|k| team_node(k)).collect::<Vec<_>>() },
    })
}

/// `n` categories won by `a`, `m` by `b`, the rest tied.
pub fn split(a: &'static str, n: usize, b: &'static str, m: usize) -> Vec<Outcome> {
    let mut outcomes = vec![Outcome::Won(a); n];
    outcomes.extend(vec![Outcome::Won(b); m]);
    outcomes.extend(vec![Outcome::Tied; 9usize.saturating_sub(n + m)]);
    outcomes
}

/// A matchup with raw weekly stat values per team and no stat winners.
pub fn stat_line_matchup(week: u32, teams: &[(&str, &[(u32, &str)])]) -> Value {
    let teams: Vec<Value> = teams
        .iter()
        .map(|(key, stats)| {
            let mut node = team_node(key);
            let stats: Vec<Value> = stats
                .iter()
                .map(|(id, value)| json!({ "stat_id": text(id), "value": text(value) }))
                .collect();
            node["team_stats"] = json!({ "stats": { "stat": stats } });
            node
        })
        .collect();
    json!({ "week": text(week), "teams": { "team": teams } })
}

/// In-memory provider. `None` payloads fail like an unreachable API.
#[derive(Debug, Default)]
pub struct FakeProvider {
    pub scoreboard: Option<Value>,
    pub standings: Option<Value>,
    pub history: Option<Value>,
    pub requested_weeks: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn requested_weeks(&self) -> Vec<String> {
        self.requested_weeks.lock().unwrap().clone()
    }
}

fn unavailable(what: &str) -> ApiError {
    ApiError::Other(format!("{what} unavailable"))
}

impl DataProvider for FakeProvider {
    async fn current_scoreboard(&self, _token: &AccessToken) -> ApiResult<Value> {
        self.scoreboard.clone().ok_or_else(|| unavailable("scoreboard"))
    }

    async fn scoreboard_for_weeks(
        &self,
        _token: &AccessToken,
        weeks: WeekRange,
    ) -> ApiResult<Value> {
        self.requested_weeks.lock().unwrap().push(weeks.to_string());
        self.history.clone().ok_or_else(|| unavailable("history"))
    }

    async fn standings(&self, _token: &AccessToken) -> ApiResult<Value> {
        self.standings.clone().ok_or_else(|| unavailable("standings"))
    }
}
