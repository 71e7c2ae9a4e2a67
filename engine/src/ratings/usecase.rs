use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use log::{debug, info};
use shared::timezone::{current_month_window, month_window};
use shared::{
    sort_chronologically, PlayerDelta, RatingBaselines, RatingLeaderboardEntry, RatingMap, RatingPoint, RatingValue,
    Result, Season, SeasonScore, Set, SharedError,
};
use validator::Validate;

use super::elo::{apply_matches, EloConfig, RatingFold, RatingOutcome};
use super::season::{self, SeasonConfig};
use crate::analytics::cache::{AnalyticsCache, CacheKeys};
use crate::config::{Config, ExhibitionPolicy};

/// Entry point for every rating read model.
///
/// Nothing here stores a rating. Each call folds the set log it is given, so
/// the log is the only source of truth and the optional cache is a pure
/// memo of those folds.
#[derive(Clone)]
pub struct RatingsUsecase {
    params: EloConfig,
    baselines: RatingBaselines,
    season: SeasonConfig,
    policy: ExhibitionPolicy,
    cache: Option<AnalyticsCache>,
}

impl RatingsUsecase {
    pub fn new(params: EloConfig, baselines: RatingBaselines) -> Self {
        Self {
            params,
            baselines,
            season: SeasonConfig::default(),
            policy: ExhibitionPolicy::default(),
            cache: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            params: config.elo,
            baselines: config.baselines(),
            season: config.season,
            policy: config.exhibition_policy,
            cache: None,
        }
    }

    pub fn with_season_config(mut self, season: SeasonConfig) -> Self {
        self.season = season;
        self
    }

    pub fn with_policy(mut self, policy: ExhibitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cache(mut self, cache: AnalyticsCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn params(&self) -> &EloConfig {
        &self.params
    }

    pub fn baselines(&self) -> &RatingBaselines {
        &self.baselines
    }

    fn cache_scope(&self) -> String {
        CacheKeys::scope(&self.params, &self.baselines, self.policy)
    }

    /// Policy-filtered copy of `sets` in canonical date-then-id order
    pub fn prepare(&self, sets: &[Set]) -> Vec<Set> {
        let mut selected = self.policy.select(sets);
        sort_chronologically(&mut selected);
        selected
    }

    /// Fold `ordered_sets` exactly as given onto `initial`
    pub fn apply_matches(&self, ordered_sets: &[Set], initial: &RatingMap) -> RatingOutcome {
        apply_matches(ordered_sets, initial, &self.baselines, &self.params)
    }

    /// Current ratings of everyone in the log, folded from the baselines
    pub fn live_ratings(&self, sets: &[Set]) -> RatingMap {
        let ordered = self.prepare(sets);
        let compute = || self.apply_matches(&ordered, &RatingMap::new()).final_ratings;
        match &self.cache {
            Some(cache) => cache.get_or_compute(CacheKeys::live_ratings(&self.cache_scope(), &ordered), compute),
            None => compute(),
        }
    }

    pub fn leaderboard(&self, sets: &[Set]) -> Vec<RatingLeaderboardEntry> {
        let ordered = self.prepare(sets);
        let ratings = self.live_ratings(&ordered);

        let mut stats: BTreeMap<&str, (u32, u32, Option<NaiveDate>)> = BTreeMap::new();
        for set in ordered.iter().filter(|s| s.counts_as_result()) {
            for player in set.participants() {
                let entry = stats.entry(player).or_insert((0, 0, None));
                entry.0 += 1;
                if set.won_by(player) {
                    entry.1 += 1;
                }
                entry.2 = Some(set.date);
            }
        }

        let mut rows: Vec<(&String, RatingValue)> = ratings.iter().map(|(p, r)| (p, *r)).collect();
        rows.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        rows.into_iter()
            .enumerate()
            .map(|(i, (player, rating))| {
                let (sets_played, sets_won, last_played) = stats.get(player.as_str()).copied().unwrap_or((0, 0, None));
                RatingLeaderboardEntry {
                    rank: i + 1,
                    player_id: player.clone(),
                    rating,
                    sets_played,
                    sets_won,
                    last_played,
                }
            })
            .collect()
    }

    /// Rating trajectory of `player`, one point per completed set they played.
    ///
    /// Single pass over the fold; produces the same points as
    /// [`history_replayed`](Self::history_replayed).
    pub fn history(&self, player: &str, ordered_sets: &[Set], initial: &RatingMap) -> Vec<RatingPoint> {
        let mut fold = RatingFold::new(&self.params, &self.baselines, initial.clone());
        let mut points = Vec::new();
        for set in ordered_sets {
            fold.apply(set);
            if is_history_point(set, player) {
                points.push(RatingPoint {
                    set_id: set.id,
                    date: set.date,
                    rating: fold.rating_of(player),
                });
            }
        }
        points
    }

    /// Reference history: every point re-folds the whole prefix up to it.
    ///
    /// O(n) per point and O(n^2) overall. Kept as the oracle the incremental
    /// [`history`](Self::history) is checked against.
    pub fn history_replayed(&self, player: &str, ordered_sets: &[Set], initial: &RatingMap) -> Vec<RatingPoint> {
        ordered_sets
            .iter()
            .enumerate()
            .filter(|(_, set)| is_history_point(set, player))
            .map(|(i, set)| {
                let outcome = self.apply_matches(&ordered_sets[..=i], initial);
                RatingPoint {
                    set_id: set.id,
                    date: set.date,
                    rating: self.baselines.lookup(&outcome.final_ratings, player),
                }
            })
            .collect()
    }

    /// Histories of every player in one fold
    pub fn all_histories(&self, ordered_sets: &[Set], initial: &RatingMap) -> BTreeMap<String, Vec<RatingPoint>> {
        let mut fold = RatingFold::new(&self.params, &self.baselines, initial.clone());
        let mut histories: BTreeMap<String, Vec<RatingPoint>> = BTreeMap::new();
        for set in ordered_sets {
            if fold.apply(set).is_none() || !set.counts_as_result() {
                continue;
            }
            for player in set.participants() {
                histories.entry(player.to_string()).or_default().push(RatingPoint {
                    set_id: set.id,
                    date: set.date,
                    rating: fold.rating_of(player),
                });
            }
        }
        histories
    }

    /// History of `player` over the whole log, from the baselines
    pub fn player_history(&self, player: &str, sets: &[Set]) -> Vec<RatingPoint> {
        let ordered = self.prepare(sets);
        let compute = || self.history(player, &ordered, &RatingMap::new());
        match &self.cache {
            Some(cache) => cache.get_or_compute(
                CacheKeys::player_history(&self.cache_scope(), player, &ordered),
                compute,
            ),
            None => compute(),
        }
    }

    /// Last history point, or the player's baseline if they never played
    pub fn current_rating(&self, player: &str, ordered_sets: &[Set], initial: &RatingMap) -> RatingValue {
        self.history(player, ordered_sets, initial)
            .last()
            .map(|p| p.rating)
            .unwrap_or_else(|| self.baselines.lookup(initial, player))
    }

    /// Net rating change per player over `[start, end)`.
    ///
    /// Only players whose rating moved are returned, biggest gain first.
    pub fn period_deltas(&self, sets: &[Set], start: NaiveDate, end: NaiveDate) -> Result<Vec<PlayerDelta>> {
        if start >= end {
            return Err(SharedError::InvalidDateRange { start, end });
        }
        let ordered = self.prepare(sets);
        let compute = || self.compute_period_deltas(&ordered, start, end);
        Ok(match &self.cache {
            Some(cache) => cache.get_or_compute(
                CacheKeys::period_deltas(&self.cache_scope(), &start.to_string(), &end.to_string(), &ordered),
                compute,
            ),
            None => compute(),
        })
    }

    fn compute_period_deltas(&self, ordered: &[Set], start: NaiveDate, end: NaiveDate) -> Vec<PlayerDelta> {
        let before: Vec<Set> = ordered.iter().filter(|s| s.date < start).cloned().collect();
        let within: Vec<Set> = ordered
            .iter()
            .filter(|s| s.date >= start && s.date < end)
            .cloned()
            .collect();
        debug!(
            "Period {}..{}: {} sets before, {} within",
            start,
            end,
            before.len(),
            within.len()
        );

        let at_start = self.apply_matches(&before, &RatingMap::new()).final_ratings;
        let at_end = self.apply_matches(&within, &at_start).final_ratings;

        let players: BTreeSet<&String> = at_start.keys().chain(at_end.keys()).collect();
        let mut deltas: Vec<PlayerDelta> = players
            .into_iter()
            .filter_map(|player| {
                let rating_at_start = self.baselines.lookup(&at_start, player);
                let rating_at_end = self.baselines.lookup(&at_end, player);
                let delta = rating_at_end - rating_at_start;
                (delta != 0.0).then(|| PlayerDelta {
                    player_id: player.clone(),
                    rating_at_start,
                    rating_at_end,
                    delta,
                })
            })
            .collect();
        deltas.sort_by(|a, b| b.delta.total_cmp(&a.delta).then_with(|| a.player_id.cmp(&b.player_id)));
        deltas
    }

    pub fn monthly_deltas(&self, sets: &[Set], year: i32, month: u32) -> Result<Vec<PlayerDelta>> {
        let (start, end) = month_window(year, month)?;
        self.period_deltas(sets, start, end)
    }

    /// Deltas for the calendar month `now` falls in on the club's wall clock
    pub fn current_month_deltas(&self, sets: &[Set], now: DateTime<Utc>, tz: Tz) -> Result<Vec<PlayerDelta>> {
        let (start, end) = current_month_window(now, tz)?;
        self.period_deltas(sets, start, end)
    }

    pub fn season_for(&self, reference: NaiveDate) -> Season {
        Season::containing(reference, self.season.start_month)
    }

    pub fn season_score(&self, player: &str, sets: &[Set], reference: NaiveDate) -> SeasonScore {
        let ordered = self.prepare(sets);
        let history = self.history(player, &ordered, &RatingMap::new());
        season::season_score(
            player,
            &history,
            &ordered,
            &self.season_for(reference),
            &self.season,
            self.baselines.rating_for(player),
        )
    }

    /// Season scores of every player in the log, highest total first
    pub fn season_leaderboard(&self, sets: &[Set], reference: NaiveDate) -> Vec<SeasonScore> {
        let ordered = self.prepare(sets);
        let season_window = self.season_for(reference);
        let histories = self.all_histories(&ordered, &RatingMap::new());
        let players: BTreeSet<&str> = ordered.iter().flat_map(|s| s.participants()).collect();

        let mut scores: Vec<SeasonScore> = players
            .into_iter()
            .map(|player| {
                let history = histories.get(player).map(Vec::as_slice).unwrap_or(&[]);
                season::season_score(
                    player,
                    history,
                    &ordered,
                    &season_window,
                    &self.season,
                    self.baselines.rating_for(player),
                )
            })
            .collect();
        scores.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.player_id.cmp(&b.player_id)));

        info!(
            "Season {}-{:02}: scored {} players",
            season_window.start_year,
            season_window.start_month,
            scores.len()
        );
        scores
    }
}

/// A set contributes a history point for `player` when it is a completed
/// result they played and the fold would accept it
fn is_history_point(set: &Set, player: &str) -> bool {
    set.counts_as_result() && set.involves(player) && set.validate().is_ok()
}
