use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::rating::PlayerId;

/// Win and active-week streaks for one player
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub player_id: PlayerId,

    /// Completed (finished, non 0-0) sets played
    pub sets_played: u32,
    pub sets_won: u32,
    /// Completed sets where the losing side took no games
    pub shutouts_won: u32,
    pub shutouts_lost: u32,

    /// Consecutive sets won ending at the most recent set
    pub current_win_streak: u32,
    pub longest_win_streak: u32,

    /// Consecutive qualifying weeks ending at the last qualifying week,
    /// zero once the grace period has run out
    pub current_active_weeks: u32,
    pub longest_active_weeks: u32,
    /// Number of weeks meeting the minimum sets threshold
    pub qualifying_weeks: u32,
    /// Monday of the most recent qualifying week
    pub last_qualifying_week: Option<NaiveDate>,
}
