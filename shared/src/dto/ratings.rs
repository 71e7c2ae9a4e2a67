use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::rating::{PlayerId, RatingValue};

/// A player's rating right after one set they played
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingPoint {
    pub set_id: i64,
    pub date: NaiveDate,
    pub rating: RatingValue,
}

/// Net rating change of one player inside a calendar window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDelta {
    pub player_id: PlayerId,
    pub rating_at_start: RatingValue,
    pub rating_at_end: RatingValue,
    pub delta: RatingValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingLeaderboardEntry {
    pub rank: usize,
    pub player_id: PlayerId,
    pub rating: RatingValue,
    pub sets_played: u32,
    pub sets_won: u32,
    pub last_played: Option<NaiveDate>,
}

/// Seasonal weighted index for one player.
///
/// `weighted_rating` and `bonus` are reported separately; `total` is their sum
/// and is what the season leaderboard ranks on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonScore {
    pub player_id: PlayerId,
    pub weighted_rating: RatingValue,
    pub bonus: f64,
    pub sessions: u32,
    /// Season months that held at least one rating snapshot
    pub months_with_data: Vec<(i32, u32)>,
    /// True when no season month had data and the score is the fallback rating
    pub from_fallback: bool,
    pub total: f64,
}
