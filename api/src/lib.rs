pub mod client;
pub mod error;
pub mod normalize;
pub mod path;
pub mod records;
pub mod standings;
pub mod yahoo;

#[cfg(test)]
mod test_support;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Domain types, independent of the Yahoo wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Team {
    pub id: String,
    pub key: String, // "428.l.12345.t.7", unique within a league
    pub name: String,
    pub logo_url: Option<String>,
}

/// One category result inside a head-to-head matchup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatWinner {
    pub stat_id: u32,
    pub winner_team_key: Option<String>,
    pub is_tied: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TeamStat {
    pub stat_id: u32,
    pub value: Option<f64>, // None when Yahoo reports "-" (no games played yet)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchupTeam {
    pub team: Team,
    pub stats: Vec<TeamStat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Matchup {
    pub week: u32,
    pub teams: Vec<MatchupTeam>,
    pub stat_winners: Vec<StatWinner>,
}

impl Matchup {
    pub fn team_keys(&self) -> Vec<&str> {
        self.teams.iter().map(|t| t.team.key.as_str()).collect()
    }

    pub fn involves(&self, team_key: &str) -> bool {
        self.teams.iter().any(|t| t.team.key == team_key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StandingsEntry {
    pub team: Team,
    pub rank: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub win_percentage: f64,
}

/// Yahoo's league ranking score: ties count half, and the total is not
/// divided by games played.
pub fn win_percentage(wins: u32, ties: u32) -> f64 {
    f64::from(wins) + f64::from(ties) * 0.5
}

/// Yahoo stat ids for NBA head-to-head category leagues.
pub mod stat_id {
    pub const FIELD_GOAL_PCT: u32 = 5;
    pub const FREE_THROW_PCT: u32 = 8;
    pub const THREES: u32 = 10;
    pub const POINTS: u32 = 12;
    pub const REBOUNDS: u32 = 15;
    pub const ASSISTS: u32 = 16;
    pub const STEALS: u32 = 17;
    pub const BLOCKS: u32 = 18;
    pub const TURNOVERS: u32 = 19;
}

/// Counting stats eligible for weekly record tracking. Efficiency categories
/// (FG%, FT%) and turnovers are never tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    Threes,
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
}

impl Category {
    /// Table order used for record output.
    pub const TRACKED: [Category; 6] = [
        Category::Threes,
        Category::Points,
        Category::Rebounds,
        Category::Assists,
        Category::Steals,
        Category::Blocks,
    ];

    pub fn stat_id(&self) -> u32 {
        match self {
            Category::Threes => stat_id::THREES,
            Category::Points => stat_id::POINTS,
            Category::Rebounds => stat_id::REBOUNDS,
            Category::Assists => stat_id::ASSISTS,
            Category::Steals => stat_id::STEALS,
            Category::Blocks => stat_id::BLOCKS,
        }
    }

    pub fn from_stat_id(id: u32) -> Option<Self> {
        Self::TRACKED.into_iter().find(|c| c.stat_id() == id)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Threes => "Threes",
            Category::Points => "Points",
            Category::Rebounds => "Rebounds",
            Category::Assists => "Assists",
            Category::Steals => "Steals",
            Category::Blocks => "Blocks",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRecord {
    pub category: Category,
    pub record_total: f64,
    pub holder: Option<Team>,
    pub week_recorded: Option<u32>,
}

impl CategoryRecord {
    pub fn empty(category: Category) -> Self {
        Self { category, record_total: 0.0, holder: None, week_recorded: None }
    }
}
