//! Live standings: "if the week ended right now, where would everyone rank?"
//!
//! Yahoo's standings endpoint only reflects completed weeks. The current
//! week's category results are folded in on top, teams are ranked by
//! win percentage with dense-tied ranks, and colliding teams are handed to a
//! tie-break resolver together with the season's prior matchups.
use crate::client::{CredentialProvider, DataProvider, WeekRange};
use crate::error::{CalcError, CalcResult, InvariantViolation};
use crate::normalize::{self, LeagueWeeks};
use crate::{Matchup, StandingsEntry, win_percentage};
use futures_util::future::try_join;
use log::{debug, error, info};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub const DEFAULT_LEAGUE_SIZE: usize = 12;
pub const STAT_WINNERS_PER_MATCHUP: usize = 9;

/// Teams sharing one win percentage, and the rank they share.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankGroup {
    pub rank: u32,
    pub win_percentage: f64,
    pub team_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveStandings {
    pub current_week: u32,
    /// Ordered by rank, then team key.
    pub entries: Vec<StandingsEntry>,
    /// Groups of team keys that shared a win percentage before tie-breaks.
    pub collisions: Vec<Vec<String>>,
    /// Name of the tie-break resolver that produced the final ranks.
    pub tie_break: Option<&'static str>,
    pub violations: Vec<InvariantViolation>,
}

impl LiveStandings {
    pub fn entry(&self, team_key: &str) -> Option<&StandingsEntry> {
        self.entries.iter().find(|e| e.team.key == team_key)
    }

    pub fn by_team_key(&self) -> BTreeMap<&str, &StandingsEntry> {
        self.entries.iter().map(|e| (e.team.key.as_str(), e)).collect()
    }
}

// ---------------------------------------------------------------------------
// Tie-break resolution
// ---------------------------------------------------------------------------

/// Everything a tie-break policy gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct TieBreakContext<'a> {
    pub current_week: u32,
    /// Matchups from the start week through the week before `current_week`.
    pub history: &'a [Matchup],
    pub collisions: &'a [Vec<String>],
    /// Standings with dense-tied ranks, before any tie is broken.
    pub standings: &'a [StandingsEntry],
}

pub trait TieBreakResolver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Return the full standings with final ranks.
    fn resolve(&self, ctx: &TieBreakContext<'_>) -> Vec<StandingsEntry>;
}

/// Leaves colliding teams on their shared rank.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreserveTiedRanks;

impl TieBreakResolver for PreserveTiedRanks {
    fn name(&self) -> &'static str {
        "preserve"
    }

    fn resolve(&self, ctx: &TieBreakContext<'_>) -> Vec<StandingsEntry> {
        ctx.standings.to_vec()
    }
}

/// Yahoo's regular-season rule: the better win percentage in the most recent
/// prior week wins, walking back one week at a time until the tie breaks.
/// Teams still level once history runs out keep sharing a rank.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecentWeekWinPercentage;

impl TieBreakResolver for RecentWeekWinPercentage {
    fn name(&self) -> &'static str {
        "recent-weeks"
    }

    fn resolve(&self, ctx: &TieBreakContext<'_>) -> Vec<StandingsEntry> {
        let mut by_week: BTreeMap<u32, Vec<&Matchup>> = BTreeMap::new();
        for m in ctx.history.iter().filter(|m| m.week < ctx.current_week) {
            by_week.entry(m.week).or_default().push(m);
        }
        let weeks_desc: Vec<u32> = by_week.keys().rev().copied().collect();

        let mut entries = ctx.standings.to_vec();
        for group in ctx.collisions {
            let Some(shared_rank) = entries
                .iter()
                .filter(|e| group.contains(&e.team.key))
                .map(|e| e.rank)
                .min()
            else {
                continue;
            };

            let tiers = break_ties(group.clone(), &weeks_desc, &by_week);
            debug!("tie-break for {group:?} at rank {shared_rank}: {tiers:?}");

            let mut offset = 0u32;
            for tier in tiers {
                for entry in entries.iter_mut().filter(|e| tier.contains(&e.team.key)) {
                    entry.rank = shared_rank + offset;
                }
                offset += tier.len() as u32;
            }
        }
        sort_entries(&mut entries);
        entries
    }
}

fn break_ties(
    keys: Vec<String>,
    weeks: &[u32],
    by_week: &BTreeMap<u32, Vec<&Matchup>>,
) -> Vec<Vec<String>> {
    let Some((week, earlier)) = weeks.split_first() else {
        return vec![keys];
    };
    if keys.len() < 2 {
        return vec![keys];
    }

    let matchups = by_week.get(week).map(Vec::as_slice).unwrap_or_default();
    let mut scored: Vec<(f64, String)> = keys
        .into_iter()
        // A team with no matchup that week sorts below everyone who played.
        .map(|key| (weekly_win_percentage(matchups, &key).unwrap_or(f64::NEG_INFINITY), key))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    scored
        .chunk_by(|a, b| a.0 == b.0)
        .flat_map(|tier| {
            let keys: Vec<String> = tier.iter().map(|(_, k)| k.clone()).collect();
            break_ties(keys, earlier, by_week)
        })
        .collect()
}

fn weekly_win_percentage(matchups: &[&Matchup], team_key: &str) -> Option<f64> {
    let matchup = matchups.iter().find(|m| m.involves(team_key))?;
    let wins = matchup
        .stat_winners
        .iter()
        .filter(|s| s.winner_team_key.as_deref() == Some(team_key))
        .count() as u32;
    let ties = matchup.stat_winners.iter().filter(|s| s.is_tied).count() as u32;
    Some(win_percentage(wins, ties))
}

/// Named tie-break policies selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreakStrategy {
    #[default]
    PreserveTiedRanks,
    RecentWeeks,
}

impl TieBreakStrategy {
    pub fn resolver(self) -> Box<dyn TieBreakResolver> {
        match self {
            TieBreakStrategy::PreserveTiedRanks => Box::new(PreserveTiedRanks),
            TieBreakStrategy::RecentWeeks => Box::new(RecentWeekWinPercentage),
        }
    }
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Fold one current-week matchup into the running table. Every stat winner
/// gives each team a win, a tie or a loss.
pub fn apply_matchup(
    table: &mut BTreeMap<String, StandingsEntry>,
    matchup: &Matchup,
    violations: &mut Vec<InvariantViolation>,
) {
    let week = matchup.week;
    let keys = matchup.team_keys();
    if keys.len() != 2 {
        report(violations, InvariantViolation::MatchupTeamCount { week, found: keys.len() });
    }
    let found = matchup.stat_winners.len();
    if found != 0 && found != STAT_WINNERS_PER_MATCHUP {
        report(violations, InvariantViolation::StatWinnerCount { week, found });
    }

    for key in keys {
        let Some(entry) = table.get_mut(key) else {
            let team_key = key.to_owned();
            report(violations, InvariantViolation::UnknownTeam { week, team_key });
            continue;
        };
        for stat in &matchup.stat_winners {
            if stat.winner_team_key.as_deref() == Some(key) {
                entry.wins += 1;
            } else if stat.is_tied {
                entry.ties += 1;
            } else {
                entry.losses += 1;
            }
        }
    }
}

/// Recompute win percentages, sort, and hand out dense-tied ranks: teams on
/// the same win percentage share a rank and the next group starts after all
/// of them.
pub fn assign_ranks(entries: &mut [StandingsEntry]) -> Vec<RankGroup> {
    for entry in entries.iter_mut() {
        entry.win_percentage = win_percentage(entry.wins, entry.ties);
    }
    entries.sort_by(|a, b| {
        b.win_percentage
            .total_cmp(&a.win_percentage)
            .then_with(|| a.team.key.cmp(&b.team.key))
    });

    let mut groups = Vec::new();
    let mut placed = 0u32;
    for chunk in entries.chunk_by_mut(|a, b| a.win_percentage == b.win_percentage) {
        let rank = placed + 1;
        for entry in chunk.iter_mut() {
            entry.rank = rank;
        }
        groups.push(RankGroup {
            rank,
            win_percentage: chunk[0].win_percentage,
            team_keys: chunk.iter().map(|e| e.team.key.clone()).collect(),
        });
        placed += chunk.len() as u32;
    }
    groups
}

/// Pure part of the calculation: baseline + current week → ranked standings
/// with collisions identified but not broken.
pub fn rank_live(
    baseline: Vec<StandingsEntry>,
    current_matchups: &[Matchup],
    current_week: u32,
    league_size: usize,
) -> LiveStandings {
    let mut violations = Vec::new();
    let mut table: BTreeMap<String, StandingsEntry> =
        baseline.into_iter().map(|e| (e.team.key.clone(), e)).collect();

    for matchup in current_matchups.iter().filter(|m| m.week == current_week) {
        apply_matchup(&mut table, matchup, &mut violations);
    }

    let mut entries: Vec<StandingsEntry> = table.into_values().collect();
    let groups = assign_ranks(&mut entries);

    let covered: usize = groups.iter().map(|g| g.team_keys.len()).sum();
    if covered != league_size {
        report(&mut violations, InvariantViolation::RankGroupSum { covered, league_size });
    }

    let collisions = groups
        .into_iter()
        .filter(|g| g.team_keys.len() > 1)
        .map(|g| g.team_keys)
        .collect();

    LiveStandings { current_week, entries, collisions, tie_break: None, violations }
}

fn sort_entries(entries: &mut [StandingsEntry]) {
    entries.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.team.key.cmp(&b.team.key)));
}

fn report(violations: &mut Vec<InvariantViolation>, violation: InvariantViolation) {
    error!("Invariant violation: {violation}");
    violations.push(violation);
}

pub(crate) fn require_payload(name: &'static str, tree: Value) -> CalcResult<Value> {
    let empty = match &tree {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    };
    if empty {
        return Err(CalcError::EmptyPayload(name));
    }
    Ok(tree)
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

pub struct LiveStandingsCalculator {
    league_size: usize,
    resolver: Box<dyn TieBreakResolver>,
}

impl Default for LiveStandingsCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_LEAGUE_SIZE, TieBreakStrategy::default())
    }
}

impl LiveStandingsCalculator {
    pub fn new(league_size: usize, strategy: TieBreakStrategy) -> Self {
        Self::with_resolver(league_size, strategy.resolver())
    }

    pub fn with_resolver(league_size: usize, resolver: Box<dyn TieBreakResolver>) -> Self {
        Self { league_size, resolver }
    }

    pub fn tie_break_name(&self) -> &'static str {
        self.resolver.name()
    }

    /// Live standings, or `None` when any required fetch fails. The failure
    /// is logged.
    pub async fn calculate<P, C>(&self, provider: &P, credentials: &C) -> Option<LiveStandings>
    where
        P: DataProvider,
        C: CredentialProvider,
    {
        match self.try_calculate(provider, credentials).await {
            Ok(standings) => Some(standings),
            Err(e) => {
                error!("Failed to calculate live standings: {e}");
                None
            }
        }
    }

    /// A tie-break (and its history fetch) runs when any rank group holds
    /// more than one team.
    pub async fn try_calculate<P, C>(
        &self,
        provider: &P,
        credentials: &C,
    ) -> CalcResult<LiveStandings>
    where
        P: DataProvider,
        C: CredentialProvider,
    {
        let token = credentials.access_token().await?;

        info!("Fetching scoreboard and standings...");
        let (scoreboard, standings) =
            try_join(provider.current_scoreboard(&token), provider.standings(&token)).await?;
        let scoreboard = require_payload("scoreboard", scoreboard)?;
        let standings = require_payload("standings", standings)?;

        let LeagueWeeks { current_week, start_week } =
            normalize::league_weeks("scoreboard", &scoreboard)?;
        let baseline = normalize::standings(&standings);
        debug!("{} teams in standings prior to week {current_week}", baseline.len());

        let current = normalize::matchups(&scoreboard);
        let mut live = rank_live(baseline, &current, current_week, self.league_size);

        if live.collisions.is_empty() {
            debug!("no win percentage collisions in week {current_week}");
            return Ok(live);
        }

        info!(
            "{} win percentage collision(s); fetching prior weeks for tie-breaks...",
            live.collisions.len()
        );
        let history = match WeekRange::prior_to(start_week, current_week) {
            Some(weeks) => {
                let tree = provider.scoreboard_for_weeks(&token, weeks).await?;
                normalize::matchups(&require_payload("prior scoreboard", tree)?)
            }
            None => {
                debug!("week {current_week} is the first week; no history to break ties with");
                Vec::new()
            }
        };

        let ctx = TieBreakContext {
            current_week,
            history: &history,
            collisions: &live.collisions,
            standings: &live.entries,
        };
        let mut resolved = self.resolver.resolve(&ctx);
        sort_entries(&mut resolved);
        live.entries = resolved;
        live.tie_break = Some(self.resolver.name());
        Ok(live)
    }
}
