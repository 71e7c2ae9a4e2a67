use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use shared::{
    timezone::{civil_date, week_start},
    Set, StreakSummary,
};

/// Core streak and activity calculation engine
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    streak_config: StreakConfig,
}

/// Active-week streak configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakConfig {
    /// Sets a Monday-start week needs to count as active
    pub min_sets_per_week: u32,
    /// Whole weeks that may pass after the last active week before the
    /// current streak is void
    pub grace_weeks: u32,
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            min_sets_per_week: 5,
            grace_weeks: 1,
        }
    }
}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(streak_config: StreakConfig) -> Self {
        Self { streak_config }
    }

    pub fn config(&self) -> &StreakConfig {
        &self.streak_config
    }

    /// Win and active-week streaks of one player as of the civil date `today`.
    ///
    /// Only completed results count. Input order does not matter, sets are
    /// scanned by date then id.
    pub fn calculate_streaks(&self, player_id: &str, sets: &[Set], today: NaiveDate) -> StreakSummary {
        let mut played: Vec<&Set> = sets
            .iter()
            .filter(|s| s.counts_as_result() && s.involves(player_id))
            .collect();
        played.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

        let mut summary = StreakSummary {
            player_id: player_id.to_string(),
            ..StreakSummary::default()
        };

        let mut run = 0u32;
        for set in &played {
            summary.sets_played += 1;
            let won = set.won_by(player_id);
            if won {
                summary.sets_won += 1;
                run += 1;
                summary.longest_win_streak = summary.longest_win_streak.max(run);
            } else {
                // Losses and level scores both end the run
                run = 0;
            }
            if set.is_shutout() {
                if won {
                    summary.shutouts_won += 1;
                } else if set.winner().is_some() {
                    summary.shutouts_lost += 1;
                }
            }
        }
        summary.current_win_streak = run;

        self.fill_active_weeks(&mut summary, &played, today);
        summary
    }

    /// Same as [`calculate_streaks`](Self::calculate_streaks) with "today"
    /// taken from a UTC instant on the club's wall clock
    pub fn calculate_streaks_at(&self, player_id: &str, sets: &[Set], now: DateTime<Utc>, tz: Tz) -> StreakSummary {
        self.calculate_streaks(player_id, sets, civil_date(now, tz))
    }

    /// Streaks for every player appearing in `sets`, ordered by player id
    pub fn calculate_all_streaks(&self, sets: &[Set], today: NaiveDate) -> Vec<StreakSummary> {
        let players: BTreeSet<&str> = sets.iter().flat_map(|s| s.participants()).collect();
        players
            .into_iter()
            .map(|p| self.calculate_streaks(p, sets, today))
            .collect()
    }

    fn fill_active_weeks(&self, summary: &mut StreakSummary, played: &[&Set], today: NaiveDate) {
        let mut per_week: BTreeMap<NaiveDate, u32> = BTreeMap::new();
        for set in played {
            *per_week.entry(week_start(set.date)).or_insert(0) += 1;
        }
        let qualifying: Vec<NaiveDate> = per_week
            .into_iter()
            .filter(|(_, count)| *count >= self.streak_config.min_sets_per_week)
            .map(|(week, _)| week)
            .collect();

        let mut run = 0u32;
        let mut previous: Option<NaiveDate> = None;
        for &week in &qualifying {
            run = match previous {
                Some(prev) if (week - prev).num_days() == 7 => run + 1,
                _ => 1,
            };
            summary.longest_active_weeks = summary.longest_active_weeks.max(run);
            previous = Some(week);
        }

        summary.qualifying_weeks = qualifying.len() as u32;
        summary.last_qualifying_week = previous;
        summary.current_active_weeks = match previous {
            Some(last) => {
                let weeks_since = (week_start(today) - last).num_days() / 7;
                if weeks_since > self.streak_config.grace_weeks as i64 {
                    0
                } else {
                    run
                }
            }
            None => 0,
        };
    }
}
