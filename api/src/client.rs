use crate::yahoo::xml_to_tree;
use log::debug;
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::ops::RangeInclusive;
use std::time::Duration;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

const FANTASY_V2: &str = "https://fantasysports.yahooapis.com/fantasy/v2";
const DEFAULT_GAME_CODE: &str = "nba";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error for {1}: {0}")]
    Network(reqwest::Error, String),
    #[error("API error for {1}: {0}")]
    Api(reqwest::Error, String),
    #[error("Parse error for {1}: {0}")]
    Parsing(String, String),
    #[error("Credentials unavailable: {0}")]
    Credentials(String),
    #[error("Error: {0}")]
    Other(String),
}

// ---------------------------------------------------------------------------
// Collaborator seams
// ---------------------------------------------------------------------------

/// OAuth bearer token. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(***)")
    }
}

/// Source of league payloads. Trees are the compact XML shape from
/// [`crate::yahoo`], rooted at `fantasy_content`.
pub trait DataProvider {
    fn current_scoreboard(
        &self,
        token: &AccessToken,
    ) -> impl Future<Output = ApiResult<Value>> + Send;

    fn scoreboard_for_weeks(
        &self,
        token: &AccessToken,
        weeks: WeekRange,
    ) -> impl Future<Output = ApiResult<Value>> + Send;

    fn standings(&self, token: &AccessToken) -> impl Future<Output = ApiResult<Value>> + Send;
}

/// Hands out a currently valid access token. Expiry and refresh live behind
/// this trait.
pub trait CredentialProvider {
    fn access_token(&self) -> impl Future<Output = ApiResult<AccessToken>> + Send;
}

/// A token obtained elsewhere (env var, secrets manager, manual OAuth dance).
#[derive(Debug, Clone)]
pub struct StaticToken(AccessToken);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(AccessToken::new(token))
    }
}

impl CredentialProvider for StaticToken {
    async fn access_token(&self) -> ApiResult<AccessToken> {
        if self.0.secret().trim().is_empty() {
            return Err(ApiError::Credentials("access token is empty".into()));
        }
        Ok(self.0.clone())
    }
}

/// Inclusive, ascending run of weeks. Renders as Yahoo's `week=` list,
/// e.g. `1,2,3`. Empty ranges can't be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekRange {
    first: u32,
    last: u32,
}

impl WeekRange {
    pub fn new(first: u32, last: u32) -> Option<Self> {
        (first <= last).then_some(Self { first, last })
    }

    /// Every week from `start_week` up to, but not including, `current_week`.
    pub fn prior_to(start_week: u32, current_week: u32) -> Option<Self> {
        Self::new(start_week, current_week.checked_sub(1)?)
    }

    pub fn weeks(&self) -> RangeInclusive<u32> {
        self.first..=self.last
    }

    pub fn first(&self) -> u32 {
        self.first
    }

    pub fn last(&self) -> u32 {
        self.last
    }
}

impl fmt::Display for WeekRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let weeks: Vec<String> = self.weeks().map(|w| w.to_string()).collect();
        f.write_str(&weeks.join(","))
    }
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Yahoo Fantasy Sports v2 client for a single league.
#[derive(Debug, Clone)]
pub struct YahooApi {
    client: Client,
    timeout: Duration,
    base_url: String,
    game_code: String,
    league_id: String,
}

impl YahooApi {
    pub fn new(league_id: &str) -> Self {
        Self {
            client: Client::builder()
                .user_agent("fantasy-standings/0.1 (league standings bot)")
                .build()
                .unwrap_or_default(),
            timeout: Duration::from_secs(10),
            base_url: FANTASY_V2.to_owned(),
            game_code: DEFAULT_GAME_CODE.to_owned(),
            league_id: league_id.to_owned(),
        }
    }

    /// Yahoo game code or numeric game id, e.g. `nba` or `428`.
    pub fn with_game_code(mut self, game_code: &str) -> Self {
        self.game_code = game_code.to_owned();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn league_key(&self) -> String {
        format!("{}.l.{}", self.game_code, self.league_id)
    }

    fn league_url(&self, resource: &str) -> String {
        format!("{}/league/{}/{resource}", self.base_url, self.league_key())
    }

    async fn get(&self, url: &str, token: &AccessToken) -> ApiResult<Value> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .bearer_auth(token.secret())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        // Unlike public scoreboards, a 4xx here is almost always an expired
        // token, so it must fail the calculation.
        let response = response
            .error_for_status()
            .map_err(|e| ApiError::Api(e, url.to_owned()))?;

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;
        debug!("received {} bytes from {url}", body.len());

        xml_to_tree(&body).map_err(|e| ApiError::Parsing(e.to_string(), url.to_owned()))
    }
}

impl DataProvider for YahooApi {
    async fn current_scoreboard(&self, token: &AccessToken) -> ApiResult<Value> {
        self.get(&self.league_url("scoreboard"), token).await
    }

    async fn scoreboard_for_weeks(
        &self,
        token: &AccessToken,
        weeks: WeekRange,
    ) -> ApiResult<Value> {
        self.get(&self.league_url(&format!("scoreboard;week={weeks}")), token).await
    }

    async fn standings(&self, token: &AccessToken) -> ApiResult<Value> {
        self.get(&self.league_url("standings"), token).await
    }
}
