use clap::{Args, ValueEnum};
use std::time::Duration;
use yahoo_fantasy_api::client::{StaticToken, YahooApi};
use yahoo_fantasy_api::standings::{DEFAULT_LEAGUE_SIZE, LiveStandingsCalculator, TieBreakStrategy};

/// Connection and ranking settings. Every flag can also come from the
/// environment or a `.env` file.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Numeric Yahoo league id.
    #[arg(long, env = "YAHOO_LEAGUE_ID")]
    pub league_id: String,

    /// OAuth access token for the Yahoo Fantasy API.
    #[arg(long, env = "YAHOO_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    /// Yahoo game code or numeric game id (e.g. "nba" or "428").
    #[arg(long, env = "YAHOO_GAME_CODE", default_value = "nba")]
    pub game_code: String,

    /// Override the API base URL.
    #[arg(long, env = "YAHOO_API_BASE")]
    pub api_base: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "YAHOO_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    #[arg(long, env = "LEAGUE_SIZE", default_value_t = DEFAULT_LEAGUE_SIZE)]
    pub league_size: usize,

    /// How to order teams that finish on the same win percentage.
    #[arg(long, env = "TIE_BREAK", value_enum, default_value_t = TieBreak::Preserve)]
    pub tie_break: TieBreak,

    /// Log filter, e.g. "debug" or "yahoo_fantasy_api=trace". Falls back to RUST_LOG.
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TieBreak {
    /// Leave tied teams on a shared rank.
    Preserve,
    /// Better win percentage in the most recent prior week goes first.
    RecentWeeks,
}

impl From<TieBreak> for TieBreakStrategy {
    fn from(value: TieBreak) -> Self {
        match value {
            TieBreak::Preserve => TieBreakStrategy::PreserveTiedRanks,
            TieBreak::RecentWeeks => TieBreakStrategy::RecentWeeks,
        }
    }
}

impl Settings {
    pub fn api(&self) -> YahooApi {
        let api = YahooApi::new(&self.league_id)
            .with_game_code(&self.game_code)
            .with_timeout(Duration::from_secs(self.timeout_secs));
        match &self.api_base {
            Some(base) => api.with_base_url(base),
            None => api,
        }
    }

    pub fn credentials(&self) -> StaticToken {
        StaticToken::new(self.access_token.clone())
    }

    pub fn standings_calculator(&self) -> LiveStandingsCalculator {
        LiveStandingsCalculator::new(self.league_size, self.tie_break.into())
    }
}
