use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};
use shared::{RatingPoint, RatingValue, Season, SeasonScore, Set, SEASON_START_MONTH, SEASON_WEIGHTS};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonConfig {
    pub start_month: u32,
    /// One weight per season month, in season order
    pub weights: [f64; 6],
    /// Weekday of the club session that earns the attendance bonus
    pub session_weekday: Weekday,
    pub session_bonus: f64,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            start_month: SEASON_START_MONTH,
            weights: SEASON_WEIGHTS,
            session_weekday: Weekday::Thu,
            session_bonus: 5.0,
        }
    }
}

/// Weighted mean of monthly average ratings over one season
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedRating {
    pub value: RatingValue,
    pub months_with_data: Vec<(i32, u32)>,
    pub from_fallback: bool,
}

/// Weighted season rating from a player's rating history.
///
/// Months without a snapshot carry no weight at all. With no data anywhere in
/// the season the value is the last point of `history`, or `baseline` for a
/// player who never played.
pub fn weighted_rating(
    history: &[RatingPoint],
    season: &Season,
    config: &SeasonConfig,
    baseline: RatingValue,
) -> WeightedRating {
    let mut buckets: BTreeMap<usize, (f64, u32)> = BTreeMap::new();
    for point in history {
        if let Some(index) = season.month_index(point.date.year(), point.date.month()) {
            let bucket = buckets.entry(index).or_insert((0.0, 0));
            bucket.0 += point.rating;
            bucket.1 += 1;
        }
    }

    if buckets.is_empty() {
        return WeightedRating {
            value: history.last().map(|p| p.rating).unwrap_or(baseline),
            months_with_data: Vec::new(),
            from_fallback: true,
        };
    }

    let months = season.months();
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    let mut months_with_data = Vec::with_capacity(buckets.len());
    for (&index, &(sum, count)) in &buckets {
        let weight = config.weights[index];
        weighted_sum += (sum / count as f64) * weight;
        weight_total += weight;
        months_with_data.push(months[index]);
    }

    let value = if weight_total > 0.0 {
        weighted_sum / weight_total
    } else {
        // Only zero-weight months had data
        history.last().map(|p| p.rating).unwrap_or(baseline)
    };

    WeightedRating {
        value,
        months_with_data,
        from_fallback: weight_total <= 0.0,
    }
}

/// Distinct session-day dates in the season on which the player completed a set
pub fn session_count(player: &str, sets: &[Set], season: &Season, weekday: Weekday) -> u32 {
    sets.iter()
        .filter(|s| s.counts_as_result() && s.involves(player))
        .filter(|s| s.date.weekday() == weekday && season.contains(s.date))
        .map(|s| s.date)
        .collect::<BTreeSet<_>>()
        .len() as u32
}

pub fn season_score(
    player: &str,
    history: &[RatingPoint],
    sets: &[Set],
    season: &Season,
    config: &SeasonConfig,
    baseline: RatingValue,
) -> SeasonScore {
    let weighted = weighted_rating(history, season, config, baseline);
    let sessions = session_count(player, sets, season, config.session_weekday);
    let bonus = sessions as f64 * config.session_bonus;

    SeasonScore {
        player_id: player.to_string(),
        weighted_rating: weighted.value,
        bonus,
        sessions,
        months_with_data: weighted.months_with_data,
        from_fallback: weighted.from_fallback,
        total: weighted.value + bonus,
    }
}
