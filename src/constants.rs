// ABOUTME: System-wide constants and configuration values for the NutriFit backend core
// ABOUTME: Groups terms-of-use, recipe normalization, signup, and infrastructure defaults
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 NutriFit.app

//! # Constants Module
//!
//! Application constants and environment-based configuration values, grouped
//! by domain. Numeric fallbacks used by the recipe normalizer live here so the
//! classifier defaults and the tests agree on a single source.

use std::env;

/// Environment-based configuration
pub mod env_config {
    use std::env;

    /// Get database URL from environment or default
    #[must_use]
    pub fn database_url() -> String {
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./data/nutrifit.db".into())
    }

    /// Get log level from environment or default
    #[must_use]
    pub fn log_level() -> String {
        env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into())
    }
}

/// Terms-of-use compliance defaults
pub mod terms {
    /// Current published terms version identifier
    pub const CURRENT_VERSION: &str = "2025-06-01";

    /// Canonical URL of the published terms document
    pub const DOCUMENT_URL: &str = "https://nutrifit.app/legal/terms";

    /// Consent state collection/table name
    pub const STATE_TABLE: &str = "user_terms_state";

    /// Immutable acceptance audit table name
    pub const AUDIT_TABLE: &str = "terms_acceptances";
}

/// Recipe normalization defaults
pub mod recipes {
    /// Fallback total preparation time when the source provides none (minutes)
    pub const DEFAULT_TOTAL_TIME_MINUTES: u32 = 30;

    /// Fallback servings when the source value is missing or non-positive
    pub const DEFAULT_SERVINGS: u32 = 4;

    /// Fallback calories per serving when no keyword rule matches
    pub const DEFAULT_CALORIES: u32 = 300;

    /// Fallback protein grams per serving
    pub const DEFAULT_PROTEIN_G: f64 = 15.0;

    /// Fallback carbohydrate grams per serving
    pub const DEFAULT_CARBS_G: f64 = 35.0;

    /// Fallback fat grams per serving
    pub const DEFAULT_FAT_G: f64 = 10.0;

    /// Scale applied to whole-recipe nutrition figures that plausibly describe
    /// a single portion already
    pub const PORTION_ESTIMATE_FACTOR: f64 = 0.5;

    /// Maximum number of derived tags per recipe
    pub const MAX_TAGS: usize = 5;

    /// Difficulty: at most this many steps for an easy rating
    pub const EASY_MAX_STEPS: usize = 3;

    /// Difficulty: at most this many minutes total time for an easy rating
    pub const EASY_MAX_MINUTES: u32 = 20;

    /// Difficulty: at most this many steps for a medium rating
    pub const MEDIUM_MAX_STEPS: usize = 5;

    /// Difficulty: at most this many minutes total time for a medium rating
    pub const MEDIUM_MAX_MINUTES: u32 = 40;

    /// Source label attached to bundled fallback recipes
    pub const BUNDLED_SOURCE: &str = "internal";

    /// Source label attached to recipes fetched from the remote catalog
    pub const REMOTE_SOURCE: &str = "catalog";
}

/// Signup flow configuration
pub mod signup {
    /// Generated access code length in characters
    pub const ACCESS_CODE_LENGTH: usize = 8;

    /// Minimum accepted password length
    pub const MIN_PASSWORD_LENGTH: usize = 8;
}

/// Timeout configurations
pub mod timeouts {
    /// Default HTTP client timeout in seconds
    pub const HTTP_CLIENT_TIMEOUT_SECS: u64 = 30;

    /// Origin lookup timeout in seconds, kept short since the lookup is
    /// best-effort enrichment
    pub const ORIGIN_LOOKUP_TIMEOUT_SECS: u64 = 5;

    /// Database connection timeout in seconds
    pub const DATABASE_TIMEOUT_SECS: u64 = 10;
}

/// Database configuration
pub mod database {
    /// Connection pool maximum size
    pub const POOL_MAX_SIZE: u32 = 10;

    /// Connection timeout in seconds
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;
}

/// Get the service name used in logs and user agents
#[must_use]
pub fn service_name() -> String {
    env::var("SERVICE_NAME").unwrap_or_else(|_| "nutrifit-core".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_defaults_are_consistent() {
        // The easy band must nest inside the medium band for the difficulty
        // ladder to be total.
        assert!(recipes::EASY_MAX_STEPS <= recipes::MEDIUM_MAX_STEPS);
        assert!(recipes::EASY_MAX_MINUTES <= recipes::MEDIUM_MAX_MINUTES);
        assert!(recipes::PORTION_ESTIMATE_FACTOR > 0.0);
        assert!(recipes::PORTION_ESTIMATE_FACTOR <= 1.0);
    }

    #[test]
    fn test_service_name_default() {
        assert!(!service_name().is_empty());
    }
}
