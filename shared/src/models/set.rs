use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// How the score of a set was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakKind {
    /// Set decided outright on games
    #[default]
    None,
    /// Regular set decided by a 7-point tiebreak (e.g. 7-6)
    SetTiebreak,
    /// Deciding super tiebreak played instead of a third set (e.g. 10-8)
    MatchTiebreak,
}

impl TieBreakKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TieBreakKind::None => "none",
            TieBreakKind::SetTiebreak => "set_tiebreak",
            TieBreakKind::MatchTiebreak => "match_tiebreak",
        }
    }
}

/// One side of the net
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

/// One played set of doubles between two teams of two.
///
/// Sets are immutable historical facts. Every rating, history, delta and
/// streak figure is recomputed from an ordered list of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_distinct_players"))]
pub struct Set {
    /// Unique row id; the secondary chronological sort key
    pub id: i64,

    /// Groups consecutive sets played by the same four players
    pub match_id: i64,

    /// Civil date the set was played
    pub date: NaiveDate,

    #[validate(length(min = 1))]
    pub team_a1: String,

    #[validate(length(min = 1))]
    pub team_a2: String,

    #[validate(length(min = 1))]
    pub team_b1: String,

    #[validate(length(min = 1))]
    pub team_b2: String,

    /// Games won by side A
    pub score_a: u32,

    /// Games won by side B
    pub score_b: u32,

    pub finished: bool,

    /// Played inside an ad-hoc event rather than on the persistent ladder
    #[serde(default)]
    pub is_exhibition: bool,

    #[serde(default)]
    pub tie_break: TieBreakKind,
}

fn validate_distinct_players(set: &Set) -> Result<(), ValidationError> {
    let players = set.participants();
    for (i, a) in players.iter().enumerate() {
        if players[i + 1..].contains(a) {
            return Err(ValidationError::new("duplicate_player"));
        }
    }
    Ok(())
}

impl Set {
    /// All four players in slot order A1, A2, B1, B2
    pub fn participants(&self) -> [&str; 4] {
        [
            self.team_a1.as_str(),
            self.team_a2.as_str(),
            self.team_b1.as_str(),
            self.team_b2.as_str(),
        ]
    }

    pub fn team(&self, side: Side) -> [&str; 2] {
        match side {
            Side::A => [self.team_a1.as_str(), self.team_a2.as_str()],
            Side::B => [self.team_b1.as_str(), self.team_b2.as_str()],
        }
    }

    /// Which side the player was on, if they played this set
    pub fn side_of(&self, player: &str) -> Option<Side> {
        if self.team_a1 == player || self.team_a2 == player {
            Some(Side::A)
        } else if self.team_b1 == player || self.team_b2 == player {
            Some(Side::B)
        } else {
            None
        }
    }

    pub fn involves(&self, player: &str) -> bool {
        self.side_of(player).is_some()
    }

    pub fn games(&self, side: Side) -> u32 {
        match side {
            Side::A => self.score_a,
            Side::B => self.score_b,
        }
    }

    /// A 0-0 row is a placeholder, never a result
    pub fn is_zero_score(&self) -> bool {
        self.score_a == 0 && self.score_b == 0
    }

    /// The single "is this a real completed result" predicate.
    ///
    /// Ratings, streaks, activity counts and shutout detection all go through
    /// this so they can never disagree about which rows count.
    pub fn counts_as_result(&self) -> bool {
        self.finished && !self.is_zero_score()
    }

    /// Winning side, `None` for a level score
    pub fn winner(&self) -> Option<Side> {
        use std::cmp::Ordering;
        match self.score_a.cmp(&self.score_b) {
            Ordering::Greater => Some(Side::A),
            Ordering::Less => Some(Side::B),
            Ordering::Equal => None,
        }
    }

    /// Did the player's side win this set outright
    pub fn won_by(&self, player: &str) -> bool {
        match (self.side_of(player), self.winner()) {
            (Some(side), Some(winner)) => side == winner,
            _ => false,
        }
    }

    /// A completed set where the losing side took no games (an "egg")
    pub fn is_shutout(&self) -> bool {
        self.counts_as_result() && (self.score_a == 0 || self.score_b == 0)
    }
}

/// Sort sets into the canonical processing order: date, then id.
///
/// The sort is stable so sets sharing a date and id keep their given order.
pub fn sort_chronologically(sets: &mut [Set]) {
    sets.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
}
