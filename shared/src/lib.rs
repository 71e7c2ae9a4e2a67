pub mod models {
    pub mod set;
    pub mod rating;
    pub mod season;
}

pub mod dto {
    pub mod ratings;
    pub mod analytics;
}

pub mod error;
pub mod timezone;
pub mod timezone_cache;

// Re-export commonly used items
pub use error::{SharedError, Result};

// Re-export models
pub use models::{
    set::{Set, Side, TieBreakKind, sort_chronologically},
    rating::{PlayerId, RatingValue, RatingMap, RatingChange, RatingBaselines},
    season::{Season, SEASON_WEIGHTS, SEASON_START_MONTH},
};

// Re-export DTOs
pub use dto::{
    ratings::{RatingPoint, PlayerDelta, RatingLeaderboardEntry, SeasonScore},
    analytics::StreakSummary,
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_serializes_camel_case() {
        let set = Set {
            id: 7,
            match_id: 3,
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            team_a1: "Ana".to_string(),
            team_a2: "Bea".to_string(),
            team_b1: "Carla".to_string(),
            team_b2: "Dani".to_string(),
            score_a: 6,
            score_b: 4,
            finished: true,
            is_exhibition: false,
            tie_break: TieBreakKind::None,
        };

        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["matchId"], 3);
        assert_eq!(json["teamA1"], "Ana");
        assert_eq!(json["tieBreak"], "none");
        assert_eq!(json["date"], "2025-03-10");

        let back: Set = serde_json::from_value(json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_streak_summary_default_is_empty() {
        let summary = StreakSummary::default();
        assert_eq!(summary.sets_played, 0);
        assert_eq!(summary.current_active_weeks, 0);
        assert_eq!(summary.last_qualifying_week, None);
    }
}
