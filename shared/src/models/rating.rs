use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Player display name; identity is case-sensitive
pub type PlayerId = String;
pub type RatingValue = f64;

/// Player -> rating at some point of the set sequence.
///
/// Ordered so that iterating, serializing and comparing maps never depends
/// on hashing.
pub type RatingMap = BTreeMap<PlayerId, RatingValue>;

/// Signed rating deltas the four participants received from one set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingChange {
    pub set_id: i64,
    pub date: NaiveDate,
    pub changes: BTreeMap<PlayerId, RatingValue>,
}

impl RatingChange {
    pub fn delta_for(&self, player: &str) -> Option<RatingValue> {
        self.changes.get(player).copied()
    }

    pub fn is_noop(&self) -> bool {
        self.changes.values().all(|d| *d == 0.0)
    }
}

/// Starting ratings: a club-wide default plus per-player "starting rating" overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingBaselines {
    pub default_rating: RatingValue,
    #[serde(default)]
    pub overrides: RatingMap,
}

impl RatingBaselines {
    pub fn new(default_rating: RatingValue) -> Self {
        Self {
            default_rating,
            overrides: RatingMap::new(),
        }
    }

    pub fn with_override(mut self, player: impl Into<PlayerId>, rating: RatingValue) -> Self {
        self.overrides.insert(player.into(), rating);
        self
    }

    pub fn rating_for(&self, player: &str) -> RatingValue {
        self.overrides
            .get(player)
            .copied()
            .unwrap_or(self.default_rating)
    }

    /// Rating of `player` in `ratings`, falling back to their baseline
    pub fn lookup(&self, ratings: &RatingMap, player: &str) -> RatingValue {
        ratings
            .get(player)
            .copied()
            .unwrap_or_else(|| self.rating_for(player))
    }
}

impl Default for RatingBaselines {
    fn default() -> Self {
        Self::new(1500.0)
    }
}
