use chrono_tz::Europe::Madrid;
use engine::ratings::{EloConfig, RatingsUsecase};
use engine::{Normalizer, RejectionReason};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use shared::{RatingBaselines, TieBreakKind};
use testing::{club_corpus, legacy_row, SetBuilder};

fn usecase() -> RatingsUsecase {
    RatingsUsecase::new(EloConfig::default(), RatingBaselines::default())
}

#[test_log::test]
fn test_legacy_export_rates_like_canonical_sets() {
    let canonical = club_corpus();
    let rows: Vec<Value> = canonical.iter().map(legacy_row).collect();

    let report = Normalizer::new(Madrid).normalize_all(&rows);
    assert!(report.rejections.is_empty());
    assert_eq!(report.sets, canonical);
    assert_eq!(usecase().live_ratings(&report.sets), usecase().live_ratings(&canonical));
}

#[test]
fn test_canonical_serialization_is_accepted() {
    let set = SetBuilder::new(7).score(7, 6).tie_break(TieBreakKind::SetTiebreak).exhibition().build();
    let row = serde_json::to_value(&set).unwrap();
    assert_eq!(Normalizer::new(Madrid).normalize(&row), Ok(set));
}

#[test_log::test]
fn test_bad_rows_do_not_disturb_good_ones() {
    let canonical = club_corpus();
    let mut rows: Vec<Value> = canonical.iter().map(legacy_row).collect();
    rows.insert(3, json!({ "id": 900, "teamA1": "", "teamA2": "Bea", "teamB1": "Carla", "teamB2": "Dani" }));
    rows.insert(10, legacy_row(&SetBuilder::new(901).unfinished().build()));
    rows.push(json!({
        "id": 902, "date": "2025-03-06",
        "teamA1": "Ana", "teamA2": "Bea", "teamB1": "Carla", "teamB2": "Dani",
        "scoreA": "-1", "scoreB": 6, "finished": true
    }));

    let report = Normalizer::new(Madrid).normalize_all(&rows);
    assert_eq!(report.sets, canonical);
    assert_eq!(
        report.rejections,
        vec![
            (3, RejectionReason::EmptyPlayer("teamA1")),
            (10, RejectionReason::NotFinished),
            (
                rows.len() - 1,
                RejectionReason::NegativeScore {
                    field: "scoreA",
                    value: "\"-1\"".to_string()
                }
            ),
        ]
    );
}
