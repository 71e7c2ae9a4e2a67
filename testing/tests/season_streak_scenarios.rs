use approx::assert_relative_eq;
use chrono::Duration;
use engine::analytics::{AnalyticsEngine, StreakConfig};
use engine::ratings::season::weighted_rating;
use engine::ratings::{EloConfig, RatingsUsecase, SeasonConfig};
use pretty_assertions::assert_eq;
use rstest::rstest;
use shared::{RatingBaselines, RatingPoint, Season, SEASON_START_MONTH};
use testing::{club_corpus, date, SetBuilder};

fn usecase() -> RatingsUsecase {
    RatingsUsecase::new(EloConfig::default(), RatingBaselines::default())
}

#[test]
fn test_season_for_march_reference_spans_aug_to_jan() {
    let season = Season::containing(date(2025, 3, 10), SEASON_START_MONTH);
    assert_eq!(
        season.months(),
        vec![(2024, 8), (2024, 9), (2024, 10), (2024, 11), (2024, 12), (2025, 1)]
    );
}

#[test]
fn test_first_and_last_month_weighted_average() {
    let season = Season::containing(date(2025, 3, 10), SEASON_START_MONTH);
    let history = vec![
        RatingPoint { set_id: 1, date: date(2024, 8, 8), rating: 1500.0 },
        RatingPoint { set_id: 2, date: date(2025, 1, 16), rating: 1600.0 },
    ];
    let weighted = weighted_rating(&history, &season, &SeasonConfig::default(), 1500.0);

    assert_relative_eq!(weighted.value, (1500.0 + 1600.0 * 6.0) / 7.0, epsilon = 1e-9);
    assert_relative_eq!(weighted.value, 1585.714_285_714, epsilon = 1e-6);
}

#[test_log::test]
fn test_club_season_leaderboard() {
    let sets = club_corpus();
    let board = usecase().season_leaderboard(&sets, date(2025, 3, 10));

    assert_eq!(board.len(), 6);
    for entry in &board {
        // Every corpus night is a Thursday inside or after the season
        assert!(entry.sessions > 0);
        assert_eq!(entry.bonus, entry.sessions as f64 * 5.0);
        assert_relative_eq!(entry.total, entry.weighted_rating + entry.bonus, epsilon = 1e-9);
        assert!(!entry.from_fallback);
        assert!(entry.months_with_data.iter().all(|&(y, m)| (y, m) >= (2024, 8) && (y, m) <= (2025, 1)));
    }
    // Ana plays every night, nobody can have more sessions
    let ana = board.iter().find(|e| e.player_id == "Ana").unwrap();
    assert!(board.iter().all(|e| e.sessions <= ana.sessions));
}

#[rstest]
#[case(5, 1)]
#[case(4, 0)]
fn test_weekly_threshold_boundary(#[case] sets_in_week: i64, #[case] qualifying: u32) {
    let monday = date(2025, 3, 3);
    let sets: Vec<_> = (0..sets_in_week)
        .map(|i| SetBuilder::new(i + 1).on(monday + Duration::days(i)).build())
        .collect();

    let summary = AnalyticsEngine::new().calculate_streaks("Ana", &sets, monday + Duration::days(6));
    assert_eq!(summary.qualifying_weeks, qualifying);
    assert_eq!(summary.current_active_weeks, qualifying);
}

#[test]
fn test_loss_breaks_win_streak_but_keeps_best() {
    let day = date(2025, 3, 3);
    let mut sets: Vec<_> = (1..=4).map(|id| SetBuilder::new(id).on(day).score(6, 2).build()).collect();
    sets.push(SetBuilder::new(5).on(day).score(3, 6).build());

    let engine = AnalyticsEngine::new();
    let broken = engine.calculate_streaks("Ana", &sets, day);
    assert_eq!(broken.current_win_streak, 0);
    assert_eq!(broken.longest_win_streak, 4);

    sets.push(SetBuilder::new(6).on(day + Duration::days(1)).score(6, 1).build());
    let resumed = engine.calculate_streaks("Ana", &sets, day);
    assert_eq!(resumed.current_win_streak, 1);
    assert_eq!(resumed.longest_win_streak, 4);
}

#[test]
fn test_two_week_gap_voids_active_streak() {
    let engine = AnalyticsEngine::with_config(StreakConfig {
        min_sets_per_week: 2,
        grace_weeks: 1,
    });
    let sets = club_corpus();
    // Last corpus night is 2025-03-06; its week starts Monday 2025-03-03
    let last_week = date(2025, 3, 3);

    let fresh = engine.calculate_streaks("Ana", &sets, date(2025, 3, 12));
    assert_eq!(fresh.last_qualifying_week, Some(last_week));
    assert_eq!(fresh.current_active_weeks, fresh.longest_active_weeks);
    assert!(fresh.current_active_weeks >= 30);

    let stale = engine.calculate_streaks("Ana", &sets, date(2025, 3, 17));
    assert_eq!(stale.current_active_weeks, 0);
    assert_eq!(stale.longest_active_weeks, fresh.longest_active_weeks);
}
