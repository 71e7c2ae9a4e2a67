//! Adapter from loosely shaped exported rows to canonical [`Set`]s.
//!
//! Everything lenient lives here: alternative field casings, scores sent as
//! strings, booleans sent as "1"/"yes"/"t", dates in several layouts. Nothing
//! downstream of [`Normalizer::normalize`] ever looks at a raw row.

use std::collections::BTreeMap;

use chrono_tz::Tz;
use log::{debug, info};
use serde::Serialize;
use serde_json::{Map, Value};
use shared::timezone::{civil_date_from_millis, parse_civil_date};
use shared::{Set, TieBreakKind};
use thiserror::Error;

/// Why a raw row did not become a [`Set`]
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum RejectionReason {
    #[error("row is not a JSON object")]
    NotAnObject,

    #[error("row could not be read: {0}")]
    Unreadable(String),

    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("invalid set id {0}")]
    InvalidId(String),

    #[error("player slot {0} is empty")]
    EmptyPlayer(&'static str),

    #[error("player {0} appears twice in the same set")]
    DuplicatePlayer(String),

    #[error("{field} is not a game count: {value}")]
    InvalidScore { field: &'static str, value: String },

    #[error("{field} is negative: {value}")]
    NegativeScore { field: &'static str, value: String },

    #[error("unreadable date {0}")]
    InvalidDate(String),

    #[error("set is not finished")]
    NotFinished,
}

impl RejectionReason {
    /// Stable label used when counting rejections
    pub fn kind(&self) -> &'static str {
        match self {
            RejectionReason::NotAnObject => "not_an_object",
            RejectionReason::Unreadable(_) => "unreadable",
            RejectionReason::MissingField(_) => "missing_field",
            RejectionReason::InvalidId(_) => "invalid_id",
            RejectionReason::EmptyPlayer(_) => "empty_player",
            RejectionReason::DuplicatePlayer(_) => "duplicate_player",
            RejectionReason::InvalidScore { .. } => "invalid_score",
            RejectionReason::NegativeScore { .. } => "negative_score",
            RejectionReason::InvalidDate(_) => "invalid_date",
            RejectionReason::NotFinished => "not_finished",
        }
    }
}

// Every column a row may carry, canonical name first, then every casing
// exports have used
const ID: &[&str] = &["id", "Id", "ID", "setId", "set_id"];
const MATCH_ID: &[&str] = &["matchId", "match_id", "MatchId", "matchID"];
const DATE: &[&str] = &["date", "Date", "playedOn", "played_on", "setDate", "set_date"];
const TEAM_A1: &[&str] = &["teamA1", "team_a1", "TeamA1", "teama1"];
const TEAM_A2: &[&str] = &["teamA2", "team_a2", "TeamA2", "teama2"];
const TEAM_B1: &[&str] = &["teamB1", "team_b1", "TeamB1", "teamb1"];
const TEAM_B2: &[&str] = &["teamB2", "team_b2", "TeamB2", "teamb2"];
const SCORE_A: &[&str] = &["scoreA", "score_a", "ScoreA", "gamesA"];
const SCORE_B: &[&str] = &["scoreB", "score_b", "ScoreB", "gamesB"];
const FINISHED: &[&str] = &["finished", "Finished", "isFinished", "is_finished", "completed"];
const IS_EXHIBITION: &[&str] = &["isExhibition", "is_exhibition", "IsExhibition", "exhibition", "isEvent"];
const TIE_BREAK: &[&str] = &["tieBreak", "tie_break", "TieBreak", "tieBreakKind", "tie_break_kind"];

/// A row's columns resolved to one value per canonical field
#[derive(Debug, Default)]
struct RawSetRow {
    id: Option<Value>,
    match_id: Option<Value>,
    date: Option<Value>,
    team_a1: Option<Value>,
    team_a2: Option<Value>,
    team_b1: Option<Value>,
    team_b2: Option<Value>,
    score_a: Option<Value>,
    score_b: Option<Value>,
    finished: Option<Value>,
    is_exhibition: Option<Value>,
    tie_break: Option<Value>,
}

impl RawSetRow {
    fn from_map(map: &Map<String, Value>) -> Result<Self, RejectionReason> {
        Ok(Self {
            id: resolve(map, ID)?,
            match_id: resolve(map, MATCH_ID)?,
            date: resolve(map, DATE)?,
            team_a1: resolve(map, TEAM_A1)?,
            team_a2: resolve(map, TEAM_A2)?,
            team_b1: resolve(map, TEAM_B1)?,
            team_b2: resolve(map, TEAM_B2)?,
            score_a: resolve(map, SCORE_A)?,
            score_b: resolve(map, SCORE_B)?,
            finished: resolve(map, FINISHED)?,
            is_exhibition: resolve(map, IS_EXHIBITION)?,
            tie_break: resolve(map, TIE_BREAK)?,
        })
    }
}

/// The one non-null value stored under any of `names`.
///
/// The same value repeated under several casings is fine; two different
/// values make the row unreadable.
fn resolve(map: &Map<String, Value>, names: &[&str]) -> Result<Option<Value>, RejectionReason> {
    let mut found: Option<(&str, &Value)> = None;
    for &name in names {
        let Some(value) = map.get(name).filter(|v| !v.is_null()) else {
            continue;
        };
        match found {
            None => found = Some((name, value)),
            Some((first, seen)) if seen != value => {
                return Err(RejectionReason::Unreadable(format!(
                    "conflicting values for {}: {} under {} and {} under {}",
                    names[0], seen, first, value, name
                )));
            }
            Some(_) => {}
        }
    }
    Ok(found.map(|(_, value)| value.clone()))
}

/// Result of normalizing a whole export
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizationReport {
    pub sets: Vec<Set>,
    /// Input position and reason of every rejected row
    pub rejections: Vec<(usize, RejectionReason)>,
}

impl NormalizationReport {
    pub fn rejection_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for (_, reason) in &self.rejections {
            *counts.entry(reason.kind()).or_insert(0) += 1;
        }
        counts
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    timezone: Tz,
}

impl Normalizer {
    /// `timezone` resolves timestamps with an offset to the club's civil date
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn normalize(&self, raw: &Value) -> Result<Set, RejectionReason> {
        let map = raw.as_object().ok_or(RejectionReason::NotAnObject)?;
        let row = RawSetRow::from_map(map)?;

        let id = match row.id.as_ref() {
            Some(v) => parse_id(v).ok_or_else(|| RejectionReason::InvalidId(v.to_string()))?,
            None => return Err(RejectionReason::MissingField("id")),
        };
        let match_id = match row.match_id.as_ref() {
            Some(Value::Null) | None => id,
            Some(v) => parse_id(v).ok_or_else(|| RejectionReason::InvalidId(v.to_string()))?,
        };

        let team_a1 = parse_player("teamA1", row.team_a1.as_ref())?;
        let team_a2 = parse_player("teamA2", row.team_a2.as_ref())?;
        let team_b1 = parse_player("teamB1", row.team_b1.as_ref())?;
        let team_b2 = parse_player("teamB2", row.team_b2.as_ref())?;
        let players = [&team_a1, &team_a2, &team_b1, &team_b2];
        for (i, player) in players.iter().enumerate() {
            if players[i + 1..].contains(player) {
                return Err(RejectionReason::DuplicatePlayer(player.to_string()));
            }
        }

        let score_a = parse_score("scoreA", row.score_a.as_ref())?;
        let score_b = parse_score("scoreB", row.score_b.as_ref())?;

        let date = match row.date.as_ref() {
            None | Some(Value::Null) => return Err(RejectionReason::MissingField("date")),
            Some(Value::String(s)) => parse_civil_date(s, self.timezone),
            Some(Value::Number(n)) => n.as_i64().and_then(|ms| civil_date_from_millis(ms, self.timezone)),
            Some(_) => None,
        };
        let date = date.ok_or_else(|| RejectionReason::InvalidDate(display(row.date.as_ref())))?;

        // A row that never says it finished is treated as still in progress
        let finished = row.finished.as_ref().and_then(parse_bool).unwrap_or(false);
        if !finished {
            return Err(RejectionReason::NotFinished);
        }

        let is_exhibition = row.is_exhibition.as_ref().and_then(parse_bool).unwrap_or(false);
        let tie_break = parse_tie_break(row.tie_break.as_ref(), score_a, score_b);

        Ok(Set {
            id,
            match_id,
            date,
            team_a1,
            team_a2,
            team_b1,
            team_b2,
            score_a,
            score_b,
            finished,
            is_exhibition,
            tie_break,
        })
    }

    /// Normalize every row, keeping the good ones in input order
    pub fn normalize_all(&self, rows: &[Value]) -> NormalizationReport {
        let mut report = NormalizationReport::default();
        for (index, raw) in rows.iter().enumerate() {
            match self.normalize(raw) {
                Ok(set) => report.sets.push(set),
                Err(reason) => {
                    debug!("Rejected row {}: {}", index, reason);
                    report.rejections.push((index, reason));
                }
            }
        }
        info!(
            "Normalized {} rows: {} sets accepted, {} rejected {:?}",
            rows.len(),
            report.sets.len(),
            report.rejections.len(),
            report.rejection_counts()
        );
        report
    }
}

fn display(value: Option<&Value>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn parse_id(value: &Value) -> Option<i64> {
    match value {
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_player(field: &'static str, value: Option<&Value>) -> Result<String, RejectionReason> {
    match value {
        None | Some(Value::Null) => Err(RejectionReason::MissingField(field)),
        Some(Value::String(s)) => {
            let name = s.trim();
            if name.is_empty() {
                Err(RejectionReason::EmptyPlayer(field))
            } else {
                Ok(name.to_string())
            }
        }
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(RejectionReason::EmptyPlayer(field)),
    }
}

fn parse_score(field: &'static str, value: Option<&Value>) -> Result<u32, RejectionReason> {
    let invalid = |v: &str| RejectionReason::InvalidScore {
        field,
        value: v.to_string(),
    };
    let negative = |v: &str| RejectionReason::NegativeScore {
        field,
        value: v.to_string(),
    };

    let number = match value {
        None | Some(Value::Null) => return Err(RejectionReason::MissingField(field)),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    let raw = display(value);
    let number = number.ok_or_else(|| invalid(&raw))?;

    if !number.is_finite() || number.fract() != 0.0 {
        return Err(invalid(&raw));
    }
    if number < 0.0 {
        return Err(negative(&raw));
    }
    if number > u32::MAX as f64 {
        return Err(invalid(&raw));
    }
    Ok(number as u32)
}

fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "0" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn parse_tie_break(value: Option<&Value>, score_a: u32, score_b: u32) -> TieBreakKind {
    // A bare "yes, tiebreak" flag is told apart by the score: super tiebreaks run to 10
    let flagged = || {
        if score_a.max(score_b) >= 10 {
            TieBreakKind::MatchTiebreak
        } else {
            TieBreakKind::SetTiebreak
        }
    };

    let Some(value) = value else {
        return TieBreakKind::None;
    };
    if let Value::String(s) = value {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "set" | "set_tiebreak" | "tiebreak" => return TieBreakKind::SetTiebreak,
            "match" | "match_tiebreak" | "super" | "super_tiebreak" => return TieBreakKind::MatchTiebreak,
            "none" | "" => return TieBreakKind::None,
            _ => {}
        }
    }
    match parse_bool(value) {
        Some(true) => flagged(),
        Some(false) => TieBreakKind::None,
        None => {
            debug!("Unrecognised tiebreak marker {}, treating as none", value);
            TieBreakKind::None
        }
    }
}
