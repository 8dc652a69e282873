//! Season-best single-week totals for the tracked counting categories.
use crate::client::{CredentialProvider, DataProvider, WeekRange};
use crate::error::CalcResult;
use crate::normalize::{self, LeagueWeeks};
use crate::standings::require_payload;
use crate::{Category, CategoryRecord, Matchup};
use log::{debug, error, info};

/// Walk every team's stat line in every completed week and keep the highest
/// total per category. Only a strictly greater total takes a record over, so
/// the first team to reach a mark keeps it.
pub fn tally_records(matchups: &[Matchup], current_week: u32) -> Vec<CategoryRecord> {
    let mut table: Vec<CategoryRecord> =
        Category::TRACKED.into_iter().map(CategoryRecord::empty).collect();

    for matchup in matchups.iter().filter(|m| m.week < current_week) {
        for side in &matchup.teams {
            for stat in &side.stats {
                let (Some(category), Some(value)) =
                    (Category::from_stat_id(stat.stat_id), stat.value)
                else {
                    continue;
                };
                let Some(record) = table.iter_mut().find(|r| r.category == category) else {
                    continue;
                };
                if value > record.record_total {
                    debug!(
                        "new {} record: {value} by {} in week {}",
                        category.label(),
                        side.team.key,
                        matchup.week
                    );
                    record.record_total = value;
                    record.holder = Some(side.team.clone());
                    record.week_recorded = Some(matchup.week);
                }
            }
        }
    }
    table
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryRecordCalculator;

impl CategoryRecordCalculator {
    /// Record table, or `None` when a fetch fails. The failure is logged.
    pub async fn calculate<P, C>(
        &self,
        provider: &P,
        credentials: &C,
    ) -> Option<Vec<CategoryRecord>>
    where
        P: DataProvider,
        C: CredentialProvider,
    {
        match self.try_calculate(provider, credentials).await {
            Ok(records) => Some(records),
            Err(e) => {
                error!("Failed to calculate category records: {e}");
                None
            }
        }
    }

    pub async fn try_calculate<P, C>(
        &self,
        provider: &P,
        credentials: &C,
    ) -> CalcResult<Vec<CategoryRecord>>
    where
        P: DataProvider,
        C: CredentialProvider,
    {
        let token = credentials.access_token().await?;

        info!("Fetching current scoreboard...");
        let scoreboard = provider.current_scoreboard(&token).await?;
        let scoreboard = require_payload("scoreboard", scoreboard)?;
        let LeagueWeeks { current_week, start_week } =
            normalize::league_weeks("scoreboard", &scoreboard)?;

        let Some(weeks) = WeekRange::prior_to(start_week, current_week) else {
            info!("No completed weeks before week {current_week}; nothing to tally");
            return Ok(tally_records(&[], current_week));
        };

        info!("Fetching scoreboards for weeks {weeks}...");
        let history = provider.scoreboard_for_weeks(&token, weeks).await?;
        let history = require_payload("prior scoreboard", history)?;
        let matchups = normalize::matchups(&history);
        debug!("{} matchups across weeks {}-{}", matchups.len(), weeks.first(), weeks.last());

        Ok(tally_records(&matchups, current_week))
    }
}
