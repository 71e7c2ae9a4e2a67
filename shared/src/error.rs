use thiserror::Error;
use chrono::NaiveDate;
use validator::ValidationErrors;
use serde_json::Error as JsonError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Error, Serialize, Deserialize, PartialEq)]
pub enum SharedError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Date range error: start date {start} must be before end date {end}")]
    InvalidDateRange {
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Unknown time zone: {0}")]
    UnknownTimezone(String),
}

impl From<ValidationErrors> for SharedError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl From<JsonError> for SharedError {
    fn from(error: JsonError) -> Self {
        Self::Conversion(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SharedError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_date_range_message() {
        let err = SharedError::InvalidDateRange {
            start: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Date range error: start date 2025-03-01 must be before end date 2025-02-01"
        );
    }

    #[test]
    fn test_validation_errors_convert() {
        use validator::Validate;
        let set = crate::Set {
            id: 1,
            match_id: 1,
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            team_a1: "Ana".to_string(),
            team_a2: "Ana".to_string(),
            team_b1: "Carla".to_string(),
            team_b2: String::new(),
            score_a: 6,
            score_b: 2,
            finished: true,
            is_exhibition: false,
            tie_break: crate::TieBreakKind::None,
        };
        let err: SharedError = set.validate().unwrap_err().into();
        assert!(matches!(err, SharedError::Validation(_)));
    }

    #[test]
    fn test_json_error_becomes_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: SharedError = json_err.into();
        assert!(matches!(err, SharedError::Conversion(_)));
    }
}
