//! Shared fixtures for cross-crate tests.
//!
//! [`SetBuilder`] and [`club_corpus`] give hand-written scenarios; the
//! `*_strategy` functions generate random but well-formed set logs for
//! property tests.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use serde_json::{json, Value};
use shared::{sort_chronologically, Set, TieBreakKind};

pub const POOL: [&str; 6] = ["Ana", "Bea", "Carla", "Dani", "Eva", "Fran"];

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date")
}

/// Fluent builder for canonical sets; defaults to a finished 6-4 for side A
#[derive(Debug, Clone)]
pub struct SetBuilder {
    set: Set,
}

impl SetBuilder {
    pub fn new(id: i64) -> Self {
        Self {
            set: Set {
                id,
                match_id: id,
                date: date(2025, 1, 9),
                team_a1: "Ana".to_string(),
                team_a2: "Bea".to_string(),
                team_b1: "Carla".to_string(),
                team_b2: "Dani".to_string(),
                score_a: 6,
                score_b: 4,
                finished: true,
                is_exhibition: false,
                tie_break: TieBreakKind::None,
            },
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.set.date = date;
        self
    }

    pub fn in_match(mut self, match_id: i64) -> Self {
        self.set.match_id = match_id;
        self
    }

    pub fn teams(mut self, a: [&str; 2], b: [&str; 2]) -> Self {
        self.set.team_a1 = a[0].to_string();
        self.set.team_a2 = a[1].to_string();
        self.set.team_b1 = b[0].to_string();
        self.set.team_b2 = b[1].to_string();
        self
    }

    pub fn score(mut self, a: u32, b: u32) -> Self {
        self.set.score_a = a;
        self.set.score_b = b;
        self
    }

    pub fn tie_break(mut self, kind: TieBreakKind) -> Self {
        self.set.tie_break = kind;
        self
    }

    pub fn unfinished(mut self) -> Self {
        self.set.finished = false;
        self
    }

    pub fn exhibition(mut self) -> Self {
        self.set.is_exhibition = true;
        self
    }

    pub fn build(self) -> Set {
        self.set
    }
}

/// A small club season: Thursday sessions from August 2024 into March 2025,
/// two or three sets a night with partner rotation
pub fn club_corpus() -> Vec<Set> {
    let first_thursday = date(2024, 8, 1);
    let rotations: [([&str; 2], [&str; 2]); 3] = [
        (["Ana", "Bea"], ["Carla", "Dani"]),
        (["Ana", "Carla"], ["Bea", "Dani"]),
        (["Eva", "Fran"], ["Ana", "Dani"]),
    ];
    let scores = [(6, 3), (4, 6), (7, 5), (6, 0), (2, 6), (6, 4), (7, 6), (5, 7)];

    let mut sets = Vec::new();
    let mut id = 1;
    for week in 0..32i64 {
        let night = first_thursday + Duration::weeks(week);
        let sets_tonight = if week % 3 == 0 { 3 } else { 2 };
        for slot in 0..sets_tonight {
            let (a, b) = rotations[(week as usize + slot) % rotations.len()];
            let (sa, sb) = scores[(id as usize * 5 + week as usize) % scores.len()];
            let mut builder = SetBuilder::new(id).on(night).in_match(week + 1).teams(a, b).score(sa, sb);
            if (sa, sb) == (7, 6) {
                builder = builder.tie_break(TieBreakKind::SetTiebreak);
            }
            sets.push(builder.build());
            id += 1;
        }
    }
    sets
}

/// A set as a legacy export row with snake_case keys and stringly values
pub fn legacy_row(set: &Set) -> Value {
    json!({
        "id": set.id.to_string(),
        "match_id": set.match_id,
        "played_on": set.date.format("%d/%m/%Y").to_string(),
        "team_a1": set.team_a1,
        "team_a2": set.team_a2,
        "team_b1": set.team_b1,
        "team_b2": set.team_b2,
        "score_a": set.score_a.to_string(),
        "score_b": set.score_b,
        "is_finished": if set.finished { "1" } else { "0" },
        "is_exhibition": set.is_exhibition,
        "tie_break": set.tie_break.as_str(),
    })
}

/// Four distinct players from [`POOL`] in random slots
pub fn players_strategy() -> impl Strategy<Value = [&'static str; 4]> {
    Just(POOL.to_vec())
        .prop_shuffle()
        .prop_map(|p| [p[0], p[1], p[2], p[3]])
}

/// Game scores, mostly decided sets with an occasional 0-0 placeholder
pub fn score_strategy() -> impl Strategy<Value = (u32, u32)> {
    prop_oneof![
        8 => (0u32..=5).prop_map(|lost| (6, lost)),
        8 => (0u32..=5).prop_map(|lost| (lost, 6)),
        2 => prop_oneof![Just((7, 5)), Just((5, 7)), Just((7, 6)), Just((6, 7))],
        1 => Just((0, 0)),
    ]
}

/// Chronologically sorted, finished ladder sets over the first 60 days of 2025
pub fn corpus_strategy(max_len: usize) -> impl Strategy<Value = Vec<Set>> {
    proptest::collection::vec((players_strategy(), score_strategy(), 0i64..60), 1..=max_len).prop_map(|rows| {
        let mut sets: Vec<Set> = rows
            .into_iter()
            .enumerate()
            .map(|(i, (players, (a, b), day))| {
                let tie_break = if a.max(b) == 7 && a.min(b) == 6 {
                    TieBreakKind::SetTiebreak
                } else {
                    TieBreakKind::None
                };
                SetBuilder::new(i as i64 + 1)
                    .on(date(2025, 1, 1) + Duration::days(day))
                    .teams([players[0], players[1]], [players[2], players[3]])
                    .score(a, b)
                    .tie_break(tie_break)
                    .build()
            })
            .collect();
        sort_chronologically(&mut sets);
        sets
    })
}
