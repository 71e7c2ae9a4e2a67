use std::collections::HashMap;
use std::env;
use std::str::FromStr;

use chrono::Weekday;
use dotenv::dotenv;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use shared::{timezone::parse_timezone, RatingBaselines, Result, Set, SharedError};

use crate::analytics::engine::StreakConfig;
use crate::ratings::elo::EloConfig;
use crate::ratings::season::SeasonConfig;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

/// Which sets feed a rating computation.
///
/// The engine rates every set it is handed; this is the one place the
/// exhibition flag is looked at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhibitionPolicy {
    /// Persistent ladder only, exhibition sets are left out
    #[default]
    Ladder,
    /// Separate rating space built from exhibition sets only
    Exhibition,
    /// Everything together
    Combined,
}

impl ExhibitionPolicy {
    pub fn includes(&self, set: &Set) -> bool {
        match self {
            ExhibitionPolicy::Ladder => !set.is_exhibition,
            ExhibitionPolicy::Exhibition => set.is_exhibition,
            ExhibitionPolicy::Combined => true,
        }
    }

    pub fn select(&self, sets: &[Set]) -> Vec<Set> {
        sets.iter().filter(|s| self.includes(s)).cloned().collect()
    }
}

impl FromStr for ExhibitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ladder" => Ok(ExhibitionPolicy::Ladder),
            "exhibition" | "event" => Ok(ExhibitionPolicy::Exhibition),
            "combined" | "all" => Ok(ExhibitionPolicy::Combined),
            _ => Err(format!("Unknown exhibition policy: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub environment: Environment,
    pub elo: EloConfig,
    pub season: SeasonConfig,
    pub streaks: StreakConfig,
    /// IANA zone month and week boundaries are resolved in
    pub timezone: String,
    pub exhibition_policy: ExhibitionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            elo: EloConfig::default(),
            season: SeasonConfig::default(),
            streaks: StreakConfig::default(),
            timezone: "Europe/Madrid".to_string(),
            exhibition_policy: ExhibitionPolicy::Ladder,
        }
    }
}

impl Config {
    /// Load `.env` files, then read the configuration from the process environment
    pub fn load() -> Result<Self> {
        match env::var("ENV_FILE_PATH") {
            Ok(env_file_path) if !env_file_path.is_empty() => {
                info!("Loading environment from ENV_FILE_PATH: {}", env_file_path);
                dotenv::from_filename(&env_file_path).ok();
            }
            _ => {
                dotenv().ok();
                // A non-development RUST_ENV layers .env.<env> over the base file
                let environment_hint = env::var("RUST_ENV")
                    .unwrap_or_else(|_| "development".to_string())
                    .parse()
                    .unwrap_or(Environment::Development);
                let env_file = format!(".env.{:?}", environment_hint).to_lowercase();
                if env_file != ".env.development" {
                    let _ = dotenv::from_filename(&env_file);
                }
            }
        }

        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Build the configuration from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let environment = vars
            .get("RUST_ENV")
            .map(|v| v.parse::<Environment>().unwrap_or_default())
            .unwrap_or_default();

        info!("Loading configuration for environment: {:?}", environment);

        let defaults = Config::default();
        let config = Config {
            environment,
            elo: Self::load_elo_config(vars),
            season: Self::load_season_config(vars),
            streaks: Self::load_streak_config(vars),
            timezone: vars
                .get("LADDER_TIMEZONE")
                .cloned()
                .unwrap_or(defaults.timezone),
            exhibition_policy: parse_var(vars, "LADDER_EXHIBITION_POLICY", defaults.exhibition_policy),
        };

        config.validate()?;
        config.log_configuration();

        Ok(config)
    }

    fn load_elo_config(vars: &HashMap<String, String>) -> EloConfig {
        let d = EloConfig::default();
        EloConfig {
            default_rating: parse_var(vars, "LADDER_DEFAULT_RATING", d.default_rating),
            k_factor: parse_var(vars, "LADDER_K_FACTOR", d.k_factor),
            margin_floor: parse_var(vars, "LADDER_MARGIN_FLOOR", d.margin_floor),
            set_tiebreak_factor: parse_var(vars, "LADDER_SET_TIEBREAK_FACTOR", d.set_tiebreak_factor),
            match_tiebreak_factor: parse_var(vars, "LADDER_MATCH_TIEBREAK_FACTOR", d.match_tiebreak_factor),
        }
    }

    fn load_season_config(vars: &HashMap<String, String>) -> SeasonConfig {
        let d = SeasonConfig::default();
        SeasonConfig {
            session_weekday: parse_var::<Weekday>(vars, "LADDER_SESSION_WEEKDAY", d.session_weekday),
            session_bonus: parse_var(vars, "LADDER_SESSION_BONUS", d.session_bonus),
            ..d
        }
    }

    fn load_streak_config(vars: &HashMap<String, String>) -> StreakConfig {
        let d = StreakConfig::default();
        StreakConfig {
            min_sets_per_week: parse_var(vars, "LADDER_MIN_WEEKLY_SETS", d.min_sets_per_week),
            grace_weeks: parse_var(vars, "LADDER_GRACE_WEEKS", d.grace_weeks),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let elo = &self.elo;
        if !elo.k_factor.is_finite() || elo.k_factor <= 0.0 {
            return Err(SharedError::Configuration(format!("K-factor must be positive, got {}", elo.k_factor)));
        }
        if !elo.default_rating.is_finite() {
            return Err(SharedError::Configuration("Default rating must be finite".into()));
        }
        for (name, value) in [
            ("margin floor", elo.margin_floor),
            ("set tiebreak factor", elo.set_tiebreak_factor),
            ("match tiebreak factor", elo.match_tiebreak_factor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SharedError::Configuration(format!("{} must be within [0, 1], got {}", name, value)));
            }
        }
        if !self.season.session_bonus.is_finite() {
            return Err(SharedError::Configuration("Session bonus must be finite".into()));
        }
        if !(1..=12).contains(&self.season.start_month) {
            return Err(SharedError::Configuration(format!("Season start month {} is not a month", self.season.start_month)));
        }
        if self.streaks.min_sets_per_week == 0 {
            return Err(SharedError::Configuration("Weekly set minimum cannot be 0".into()));
        }
        parse_timezone(&self.timezone)?;
        Ok(())
    }

    fn log_configuration(&self) {
        info!("Configuration loaded successfully");
        info!("Environment: {:?}", self.environment);
        info!(
            "Elo: default {} K {} margin floor {} tiebreak factors {}/{}",
            self.elo.default_rating,
            self.elo.k_factor,
            self.elo.margin_floor,
            self.elo.set_tiebreak_factor,
            self.elo.match_tiebreak_factor
        );
        info!(
            "Season: starts month {}, {} bonus points per {:?} session",
            self.season.start_month, self.season.session_bonus, self.season.session_weekday
        );
        info!(
            "Streaks: {} sets per active week, {} grace week(s)",
            self.streaks.min_sets_per_week, self.streaks.grace_weeks
        );
        info!("Time zone: {} | exhibition policy: {:?}", self.timezone, self.exhibition_policy);
    }

    pub fn baselines(&self) -> RatingBaselines {
        RatingBaselines::new(self.elo.default_rating)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn parse_var<T: FromStr>(vars: &HashMap<String, String>, key: &str, default: T) -> T {
    match vars.get(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparseable {}={:?}, using default", key, raw);
            default
        }),
        None => default,
    }
}
