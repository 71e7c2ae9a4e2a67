pub mod config;
pub mod normalization;

pub mod analytics {
    pub mod cache;
    pub mod engine;

    pub use cache::{AnalyticsCache, CacheKeys, CacheStats};
    pub use engine::{AnalyticsEngine, StreakConfig};

    #[cfg(test)]
    mod engine_tests;
}

pub mod ratings {
    pub mod elo;
    pub mod season;
    pub mod usecase;

    pub use elo::{apply_matches, EloConfig, RatingFold, RatingOutcome};
    pub use season::{SeasonConfig, WeightedRating};
    pub use usecase::RatingsUsecase;

    #[cfg(test)]
    mod elo_test;

    #[cfg(test)]
    mod usecase_tests;
}

pub use config::{Config, Environment, ExhibitionPolicy};
pub use normalization::{NormalizationReport, Normalizer, RejectionReason};


#[cfg(test)]
mod config_tests;
