// Doubles Elo on the classic 400-point logistic scale.
// Side strength is the mean of the two partners, the result is scored from the
// game margin instead of a flat 1/0, and both partners move by the same amount.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};
use shared::{RatingBaselines, RatingChange, RatingMap, Set, Side, TieBreakKind};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EloConfig {
    pub default_rating: f64,        // 1500
    pub k_factor: f64,              // points swung by a fully unexpected result
    pub margin_floor: f64,          // share of the swing a narrow win still earns, 0..=1
    pub set_tiebreak_factor: f64,   // damping for 7-6 style sets
    pub match_tiebreak_factor: f64, // damping for super tiebreaks
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            default_rating: 1500.0,
            k_factor: 32.0,
            margin_floor: 0.5,
            set_tiebreak_factor: 0.75,
            match_tiebreak_factor: 0.5,
        }
    }
}

/// Ratings after a fold plus the change record of every set that was applied
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RatingOutcome {
    pub final_ratings: RatingMap,
    pub changes: BTreeMap<i64, RatingChange>,
}

pub fn expected_score(r_a: f64, r_b: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((r_b - r_a) / 400.0))
}

/// Effective rating of a pair
pub fn side_rating(r1: f64, r2: f64) -> f64 {
    (r1 + r2) / 2.0
}

fn tiebreak_factor(kind: TieBreakKind, params: &EloConfig) -> f64 {
    match kind {
        TieBreakKind::None => 1.0,
        TieBreakKind::SetTiebreak => params.set_tiebreak_factor,
        TieBreakKind::MatchTiebreak => params.match_tiebreak_factor,
    }
}

// Score of the winning side in [0.5, 1]: a bagel is worth 1.0, a narrow win
// slides toward 0.5 + margin_floor / 2, tiebreaks pull it closer to 0.5.
fn winner_score(won: u32, lost: u32, kind: TieBreakKind, params: &EloConfig) -> f64 {
    let margin = (won - lost) as f64 / won as f64;
    let share = params.margin_floor + (1.0 - params.margin_floor) * margin;
    0.5 + 0.5 * share * tiebreak_factor(kind, params)
}

/// Actual-outcome value for side A, derived from the game margin
pub fn outcome_for_a(set: &Set, params: &EloConfig) -> f64 {
    match set.winner() {
        Some(Side::A) => winner_score(set.score_a, set.score_b, set.tie_break, params),
        Some(Side::B) => 1.0 - winner_score(set.score_b, set.score_a, set.tie_break, params),
        None => 0.5,
    }
}

/// Sequential rating fold.
///
/// Every set is rated against the ratings left behind by all sets applied
/// before it, so the order sets are fed in is part of the result.
#[derive(Debug, Clone)]
pub struct RatingFold<'a> {
    params: &'a EloConfig,
    baselines: &'a RatingBaselines,
    ratings: RatingMap,
}

impl<'a> RatingFold<'a> {
    pub fn new(params: &'a EloConfig, baselines: &'a RatingBaselines, initial: RatingMap) -> Self {
        Self {
            params,
            baselines,
            ratings: initial,
        }
    }

    pub fn rating_of(&self, player: &str) -> f64 {
        self.baselines.lookup(&self.ratings, player)
    }

    pub fn ratings(&self) -> &RatingMap {
        &self.ratings
    }

    pub fn into_ratings(self) -> RatingMap {
        self.ratings
    }

    /// Apply one set. Returns `None` when the set was skipped.
    ///
    /// Unfinished or malformed sets are skipped without touching any rating.
    /// A 0-0 set yields an all-zero record and leaves the map as it was.
    pub fn apply(&mut self, set: &Set) -> Option<RatingChange> {
        if !set.finished {
            warn!("Skipping unfinished set {} in rating fold", set.id);
            return None;
        }
        if let Err(e) = set.validate() {
            warn!("Skipping malformed set {} in rating fold: {}", set.id, e);
            return None;
        }

        let mut changes = BTreeMap::new();
        if set.is_zero_score() {
            for player in set.participants() {
                changes.insert(player.to_string(), 0.0);
            }
            return Some(RatingChange {
                set_id: set.id,
                date: set.date,
                changes,
            });
        }

        let [a1, a2] = set.team(Side::A);
        let [b1, b2] = set.team(Side::B);
        let rating_a = side_rating(self.rating_of(a1), self.rating_of(a2));
        let rating_b = side_rating(self.rating_of(b1), self.rating_of(b2));

        let expected_a = expected_score(rating_a, rating_b);
        let actual_a = outcome_for_a(set, self.params);
        let swing = self.params.k_factor * (actual_a - expected_a);

        for (player, delta) in [(a1, swing), (a2, swing), (b1, -swing), (b2, -swing)] {
            let updated = self.rating_of(player) + delta;
            self.ratings.insert(player.to_string(), updated);
            changes.insert(player.to_string(), delta);
        }

        Some(RatingChange {
            set_id: set.id,
            date: set.date,
            changes,
        })
    }
}

/// Fold `sets` in the exact order given, starting from `initial`.
///
/// Players missing from `initial` start at their baseline.
pub fn apply_matches(
    sets: &[Set],
    initial: &RatingMap,
    baselines: &RatingBaselines,
    params: &EloConfig,
) -> RatingOutcome {
    let mut fold = RatingFold::new(params, baselines, initial.clone());
    let mut changes = BTreeMap::new();
    for set in sets {
        if let Some(change) = fold.apply(set) {
            changes.insert(set.id, change);
        }
    }
    RatingOutcome {
        final_ratings: fold.into_ratings(),
        changes,
    }
}
