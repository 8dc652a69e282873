//! Raw provider trees → typed league entities.
//!
//! All field paths the calculators depend on live in this module. Anything
//! optional falls back to a neutral value; anything that identifies an entity
//! (team key, matchup week) drops the entity with an error log instead.
use crate::path::{
    MissingField, leaf_number, optional_text, resolve_list, resolve_number, resolve_text,
    try_resolve,
};
use crate::{Matchup, MatchupTeam, StandingsEntry, StatWinner, Team, TeamStat, win_percentage};
use log::{error, warn};
use serde_json::Value;

const LEAGUE: [&str; 2] = ["fantasy_content", "league"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeagueWeeks {
    pub current_week: u32,
    pub start_week: u32,
}

/// Read `current_week` (required) and `start_week` (defaults to 1) from the
/// league node of any league payload.
pub fn league_weeks(object: &str, tree: &Value) -> Result<LeagueWeeks, MissingField> {
    let current_week = required_week(object, tree, "current_week")?;
    let start_week = required_week(object, tree, "start_week").unwrap_or_else(|missing| {
        warn!("{missing}; assuming the season starts in week 1");
        1
    });
    Ok(LeagueWeeks { current_week, start_week })
}

fn required_week(object: &str, tree: &Value, field: &str) -> Result<u32, MissingField> {
    let path = [LEAGUE[0], LEAGUE[1], field, crate::path::TEXT];
    try_resolve(object, tree, &path)
        .ok()
        .and_then(leaf_number)
        .and_then(whole)
        .ok_or_else(|| MissingField { object: object.to_owned(), path: path.join(".") })
}

/// Baseline standings as Yahoo reports them, i.e. before the current week.
pub fn standings(tree: &Value) -> Vec<StandingsEntry> {
    resolve_list("standings", tree, &[LEAGUE[0], LEAGUE[1], "standings", "teams", "team"])
        .into_iter()
        .filter_map(standings_entry)
        .collect()
}

fn standings_entry(node: &Value) -> Option<StandingsEntry> {
    let team = team(node)?;
    // Rank is blank before the first week is final.
    let rank = optional_count(node, &["team_standings", "rank"]);
    let wins = count(node, &["team_standings", "outcome_totals", "wins"]);
    let losses = count(node, &["team_standings", "outcome_totals", "losses"]);
    let ties = count(node, &["team_standings", "outcome_totals", "ties"]);
    Some(StandingsEntry {
        team,
        rank,
        wins,
        losses,
        ties,
        win_percentage: win_percentage(wins, ties),
    })
}

/// Every matchup in a scoreboard payload, whether it covers one week or many.
pub fn matchups(tree: &Value) -> Vec<Matchup> {
    resolve_list("scoreboard", tree, &[LEAGUE[0], LEAGUE[1], "scoreboard", "matchups", "matchup"])
        .into_iter()
        .filter_map(matchup)
        .collect()
}

fn matchup(node: &Value) -> Option<Matchup> {
    let Some(week) = resolve_number("matchup", node, &["week"]).and_then(whole) else {
        error!("dropping matchup without a readable week");
        return None;
    };

    let teams = resolve_list("matchup", node, &["teams", "team"])
        .into_iter()
        .filter_map(|t| Some(MatchupTeam { team: team(t)?, stats: team_stats(t) }))
        .collect();

    let stat_winners = resolve_list("matchup", node, &["stat_winners", "stat_winner"])
        .into_iter()
        .filter_map(stat_winner)
        .collect();

    Some(Matchup { week, teams, stat_winners })
}

fn team(node: &Value) -> Option<Team> {
    let Some(key) = resolve_text("team", node, &["team_key"]) else {
        error!("dropping team without a team_key");
        return None;
    };
    let logo_url = resolve_list("team", node, &["team_logos", "team_logo"])
        .first()
        .and_then(|logo| optional_text(logo, &["url"]));
    Some(Team {
        id: resolve_text("team", node, &["team_id"]).unwrap_or_default(),
        name: resolve_text("team", node, &["name"]).unwrap_or_else(|| key.clone()),
        key,
        logo_url,
    })
}

fn team_stats(node: &Value) -> Vec<TeamStat> {
    resolve_list("team", node, &["team_stats", "stats", "stat"])
        .into_iter()
        .filter_map(|stat| {
            let stat_id = stat_id(stat)?;
            // "-" until the team has played a game that week.
            let value = optional_text(stat, &["value"]).and_then(|v| v.trim().parse::<f64>().ok());
            Some(TeamStat { stat_id, value })
        })
        .collect()
}

fn stat_winner(node: &Value) -> Option<StatWinner> {
    let stat_id = stat_id(node)?;
    let winner_team_key = optional_text(node, &["winner_team_key"]).filter(|k| !k.is_empty());
    let is_tied =
        winner_team_key.is_none() && optional_text(node, &["is_tied"]).as_deref() == Some("1");
    Some(StatWinner { stat_id, winner_team_key, is_tied })
}

fn stat_id(node: &Value) -> Option<u32> {
    let id = resolve_text("stat", node, &["stat_id"])?;
    match id.trim().parse::<u32>() {
        Ok(id) => Some(id),
        Err(_) => {
            warn!("ignoring stat with non-numeric id {id:?}");
            None
        }
    }
}

fn count(node: &Value, path: &[&str]) -> u32 {
    resolve_number("team", node, path).and_then(whole).unwrap_or(0)
}

fn optional_count(node: &Value, path: &[&str]) -> u32 {
    optional_text(node, path)
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(0)
}

fn whole(n: f64) -> Option<u32> {
    (n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX)).then_some(n as u32)
}
