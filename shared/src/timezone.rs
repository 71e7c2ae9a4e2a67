use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::error::{Result, SharedError};
use crate::timezone_cache::resolve_zone;

/// Parse an IANA zone name such as "Europe/Madrid"
pub fn parse_timezone(timezone_name: &str) -> Result<Tz> {
    resolve_zone(timezone_name)
        .ok_or_else(|| SharedError::UnknownTimezone(timezone_name.to_string()))
}

/// Civil (wall-clock) date of a UTC instant in the given zone
pub fn civil_date(utc_dt: DateTime<Utc>, tz: Tz) -> NaiveDate {
    utc_dt.with_timezone(&tz).date_naive()
}

pub fn month_start(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Half-open `[first day, first day of next month)` window of a calendar month
pub fn month_window(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let start = month_start(year, month)
        .ok_or_else(|| SharedError::BadRequest(format!("Invalid month: {:04}-{:02}", year, month)))?;
    let end = add_months(start, 1)
        .ok_or_else(|| SharedError::BadRequest(format!("Month out of range: {:04}-{:02}", year, month)))?;
    Ok((start, end))
}

/// The calendar month containing `now` as seen on a wall clock in `tz`
pub fn current_month_window(now: DateTime<Utc>, tz: Tz) -> Result<(NaiveDate, NaiveDate)> {
    let local = civil_date(now, tz);
    month_window(local.year(), local.month())
}

/// Monday of the ISO week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Parse the date representations seen in exported set rows.
///
/// Plain dates are taken as civil dates. Timestamps carrying an offset are
/// converted to the civil date in `tz`; naive timestamps are assumed to be
/// wall-clock already.
pub fn parse_civil_date(raw: &str, tz: Tz) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(civil_date(dt.with_timezone(&Utc), tz));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%#z") {
        return Some(civil_date(dt.with_timezone(&Utc), tz));
    }

    const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y", "%Y/%m/%d"];
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }

    const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }

    log::debug!("Unrecognised date format: {:?}", raw);
    None
}

/// Civil date of a unix timestamp in milliseconds
pub fn civil_date_from_millis(millis: i64, tz: Tz) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| civil_date(dt, tz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_timezone() {
        assert!(parse_timezone("Europe/Madrid").is_ok());
        assert_eq!(
            parse_timezone("Invalid/Timezone"),
            Err(SharedError::UnknownTimezone("Invalid/Timezone".to_string()))
        );
    }

    #[test]
    fn test_month_boundary_follows_wall_clock() {
        // 23:30 UTC on Jan 31st is already February 1st in Madrid
        let tz = parse_timezone("Europe/Madrid").unwrap();
        let utc_time = Utc.with_ymd_and_hms(2025, 1, 31, 23, 30, 0).unwrap();
        assert_eq!(civil_date(utc_time, tz), ymd(2025, 2, 1));
        assert_eq!(
            current_month_window(utc_time, tz).unwrap(),
            (ymd(2025, 2, 1), ymd(2025, 3, 1))
        );
    }

    #[test]
    fn test_month_window_wraps_december() {
        assert_eq!(month_window(2024, 12).unwrap(), (ymd(2024, 12, 1), ymd(2025, 1, 1)));
        assert!(month_window(2024, 13).is_err());
    }

    #[rstest]
    #[case(ymd(2025, 3, 10), ymd(2025, 3, 10))]
    #[case(ymd(2025, 3, 16), ymd(2025, 3, 10))]
    #[case(ymd(2025, 1, 1), ymd(2024, 12, 30))]
    fn test_week_start_is_monday(#[case] date: NaiveDate, #[case] monday: NaiveDate) {
        assert_eq!(week_start(date), monday);
    }

    #[rstest]
    #[case("2025-03-10", Some(ymd(2025, 3, 10)))]
    #[case("10/03/2025", Some(ymd(2025, 3, 10)))]
    #[case("10.03.2025", Some(ymd(2025, 3, 10)))]
    #[case("2025-03-10 19:45:00", Some(ymd(2025, 3, 10)))]
    #[case("2025-03-10T19:45:00", Some(ymd(2025, 3, 10)))]
    #[case("2025-03-10T23:30:00Z", Some(ymd(2025, 3, 11)))]
    #[case("2025-03-10T23:30:00+01:00", Some(ymd(2025, 3, 10)))]
    #[case("", None)]
    #[case("yesterday", None)]
    fn test_parse_civil_date(#[case] raw: &str, #[case] expected: Option<NaiveDate>) {
        let tz = parse_timezone("Europe/Madrid").unwrap();
        assert_eq!(parse_civil_date(raw, tz), expected);
    }

    #[test]
    fn test_civil_date_from_millis() {
        let tz = parse_timezone("UTC").unwrap();
        assert_eq!(civil_date_from_millis(0, tz), Some(ymd(1970, 1, 1)));
    }
}
