#[cfg(test)]
mod config_tests {
    use crate::config::*;
    use chrono::{NaiveDate, Weekday};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use shared::{Set, SharedError, TieBreakKind};
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn set(id: i64, is_exhibition: bool) -> Set {
        Set {
            id,
            match_id: id,
            date: NaiveDate::from_ymd_opt(2025, 2, 6).unwrap(),
            team_a1: "Ana".to_string(),
            team_a2: "Bea".to_string(),
            team_b1: "Carla".to_string(),
            team_b2: "Dani".to_string(),
            score_a: 6,
            score_b: 3,
            finished: true,
            is_exhibition,
            tie_break: TieBreakKind::None,
        }
    }

    #[test_log::test]
    fn test_empty_environment_gives_defaults() {
        let config = Config::from_vars(&HashMap::new()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.elo.k_factor, 32.0);
        assert_eq!(config.season.session_weekday, Weekday::Thu);
        assert_eq!(config.streaks.min_sets_per_week, 5);
        assert_eq!(config.timezone, "Europe/Madrid");
    }

    #[test_log::test]
    fn test_overrides_are_read() {
        let config = Config::from_vars(&vars(&[
            ("RUST_ENV", "production"),
            ("LADDER_DEFAULT_RATING", "1200"),
            ("LADDER_K_FACTOR", "24"),
            ("LADDER_SESSION_WEEKDAY", "tuesday"),
            ("LADDER_SESSION_BONUS", "2.5"),
            ("LADDER_MIN_WEEKLY_SETS", "3"),
            ("LADDER_TIMEZONE", "America/New_York"),
            ("LADDER_EXHIBITION_POLICY", "combined"),
        ]))
        .unwrap();

        assert!(config.is_production());
        assert_eq!(config.elo.default_rating, 1200.0);
        assert_eq!(config.elo.k_factor, 24.0);
        assert_eq!(config.season.session_weekday, Weekday::Tue);
        assert_eq!(config.season.session_bonus, 2.5);
        assert_eq!(config.streaks.min_sets_per_week, 3);
        assert_eq!(config.timezone, "America/New_York");
        assert_eq!(config.exhibition_policy, ExhibitionPolicy::Combined);
        assert_eq!(config.baselines().rating_for("Nobody"), 1200.0);
    }

    #[test_log::test]
    fn test_unparseable_value_falls_back_to_default() {
        let config = Config::from_vars(&vars(&[("LADDER_K_FACTOR", "lots")])).unwrap();
        assert_eq!(config.elo.k_factor, 32.0);
    }

    #[rstest]
    #[case("LADDER_K_FACTOR", "0")]
    #[case("LADDER_K_FACTOR", "-8")]
    #[case("LADDER_MARGIN_FLOOR", "1.5")]
    #[case("LADDER_SET_TIEBREAK_FACTOR", "-0.1")]
    #[case("LADDER_MIN_WEEKLY_SETS", "0")]
    fn test_invalid_values_are_rejected(#[case] key: &str, #[case] value: &str) {
        let result = Config::from_vars(&vars(&[(key, value)]));
        assert!(matches!(result, Err(SharedError::Configuration(_))));
    }

    #[test]
    fn test_unknown_timezone_is_rejected() {
        let result = Config::from_vars(&vars(&[("LADDER_TIMEZONE", "Mars/Olympus")]));
        assert_eq!(result, Err(SharedError::UnknownTimezone("Mars/Olympus".to_string())));
    }

    #[rstest]
    #[case("development", Environment::Development)]
    #[case("DEV", Environment::Development)]
    #[case("test", Environment::Test)]
    #[case("prod", Environment::Production)]
    fn test_environment_from_str(#[case] raw: &str, #[case] expected: Environment) {
        assert_eq!(raw.parse::<Environment>().unwrap(), expected);
    }

    #[test]
    fn test_exhibition_policy_selects_rating_space() {
        let sets = vec![set(1, false), set(2, true), set(3, false)];
        let ids = |policy: ExhibitionPolicy| -> Vec<i64> { policy.select(&sets).iter().map(|s| s.id).collect() };

        assert_eq!(ids(ExhibitionPolicy::Ladder), vec![1, 3]);
        assert_eq!(ids(ExhibitionPolicy::Exhibition), vec![2]);
        assert_eq!(ids(ExhibitionPolicy::Combined), vec![1, 2, 3]);
        assert!("bogus".parse::<ExhibitionPolicy>().is_err());
    }
}
