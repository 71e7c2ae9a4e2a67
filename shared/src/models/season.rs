use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::timezone::{add_months, month_start};

/// One six-month season window, e.g. Aug 2024 .. Jan 2025
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    /// Year of the first season month
    pub start_year: i32,
    /// Calendar month the season opens in (August for the club ladder)
    pub start_month: u32,
}

/// Weights for [Aug, Sep, Oct, Nov, Dec, Jan]; later months count more
pub const SEASON_WEIGHTS: [f64; 6] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
pub const SEASON_START_MONTH: u32 = 8;

impl Season {
    /// Season a reference date belongs to: if the date's month is at or
    /// after the start month the season began this year, otherwise last year.
    pub fn containing(reference: NaiveDate, start_month: u32) -> Self {
        let start_year = if reference.month() >= start_month {
            reference.year()
        } else {
            reference.year() - 1
        };
        Self {
            start_year,
            start_month,
        }
    }

    /// The six `(year, month)` pairs of the season in order
    pub fn months(&self) -> Vec<(i32, u32)> {
        let Some(first) = month_start(self.start_year, self.start_month) else {
            return Vec::new();
        };
        (0..SEASON_WEIGHTS.len() as u32)
            .filter_map(|offset| add_months(first, offset))
            .map(|d| (d.year(), d.month()))
            .collect()
    }

    /// Index of `(year, month)` within the season, if it is a season month
    pub fn month_index(&self, year: i32, month: u32) -> Option<usize> {
        self.months().iter().position(|&ym| ym == (year, month))
    }

    /// First day of the season
    pub fn first_day(&self) -> Option<NaiveDate> {
        month_start(self.start_year, self.start_month)
    }

    /// First day after the season (exclusive end)
    pub fn end_exclusive(&self) -> Option<NaiveDate> {
        self.first_day()
            .and_then(|d| add_months(d, SEASON_WEIGHTS.len() as u32))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.month_index(date.year(), date.month()).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(2025, 3, 10, 2024)]
    #[case(2025, 8, 1, 2025)]
    #[case(2025, 7, 31, 2024)]
    #[case(2025, 12, 24, 2025)]
    #[case(2026, 1, 15, 2025)]
    fn test_season_selection(
        #[case] y: i32,
        #[case] m: u32,
        #[case] d: u32,
        #[case] expected_start: i32,
    ) {
        let season = Season::containing(NaiveDate::from_ymd_opt(y, m, d).unwrap(), SEASON_START_MONTH);
        assert_eq!(season.start_year, expected_start);
    }

    #[test]
    fn test_season_months_span_year_boundary() {
        let season = Season::containing(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(), 8);
        assert_eq!(
            season.months(),
            vec![(2024, 8), (2024, 9), (2024, 10), (2024, 11), (2024, 12), (2025, 1)]
        );
        assert_eq!(season.month_index(2025, 1), Some(5));
        assert_eq!(season.month_index(2025, 2), None);
        assert_eq!(season.first_day(), NaiveDate::from_ymd_opt(2024, 8, 1));
        assert_eq!(season.end_exclusive(), NaiveDate::from_ymd_opt(2025, 2, 1));
    }
}
