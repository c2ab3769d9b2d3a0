// src/config.rs
//
// Configuration
//
// MatchConfig is the explicit value handed to the resolution core at
// construction. AppConfig is the process-level configuration, loaded once at
// startup from the environment (and an optional .env file).

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

pub use crate::domain::OtherBucketPolicy;

pub const DEFAULT_TMDB_API_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_TMDB_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/";
pub const DEFAULT_TMDB_PROFILE_SIZE: &str = "w185";
pub const DEFAULT_API_CALL_DELAY_MS: u64 = 500;

// ============================================================================
// MATCH CONFIG
// ============================================================================

impl FromStr for OtherBucketPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" => Ok(OtherBucketPolicy::Accept),
            "reject-when-year-known" | "reject_when_year_known" => {
                Ok(OtherBucketPolicy::RejectWhenYearKnown)
            }
            other => Err(AppError::Config(format!(
                "unknown OTHER bucket policy '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    /// Minimum title similarity for a search hit to count as a candidate
    pub similarity_threshold: f64,
    /// Maximum year distance for the CLOSE bucket
    pub year_diff_threshold: u32,
    /// How many billed cast members are copied onto a film
    pub top_actor_count: usize,
    pub other_bucket_policy: OtherBucketPolicy,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
            year_diff_threshold: 2,
            top_actor_count: 5,
            other_bucket_policy: OtherBucketPolicy::Accept,
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> AppResult<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(AppError::Config(format!(
                "similarity threshold {} must be within [0, 1]",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}

// ============================================================================
// APP CONFIG
// ============================================================================

/// What the enrichment run does with films that match nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmatchedPolicy {
    #[default]
    Delete,
    Keep,
}

impl FromStr for UnmatchedPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delete" => Ok(UnmatchedPolicy::Delete),
            "keep" => Ok(UnmatchedPolicy::Keep),
            other => Err(AppError::Config(format!(
                "unknown unmatched policy '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TmdbConfig {
    /// Only required once a catalog client is built
    pub api_key: Option<String>,
    pub api_url: String,
    pub image_base_url: String,
    pub profile_size: String,
    /// Minimum spacing between catalog calls, in milliseconds
    pub call_delay_ms: u64,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_TMDB_API_URL.to_string(),
            image_base_url: DEFAULT_TMDB_IMAGE_BASE_URL.to_string(),
            profile_size: DEFAULT_TMDB_PROFILE_SIZE.to_string(),
            call_delay_ms: DEFAULT_API_CALL_DELAY_MS,
        }
    }
}

impl TmdbConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// The API key, or a Config error naming the missing variable
    pub fn require_api_key(&self) -> AppResult<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("Missing required TMDB_API_KEY".to_string()))
    }

    /// Full URL of an actor portrait
    pub fn profile_url(&self, profile_path: &str) -> String {
        format!("{}{}{}", self.image_base_url, self.profile_size, profile_path)
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub tmdb: TmdbConfig,
    /// None means the default location under the user data directory
    pub database_path: Option<PathBuf>,
    pub matching: MatchConfig,
    pub unmatched_policy: UnmatchedPolicy,
}

impl AppConfig {
    /// Load configuration from the process environment, after merging a
    /// `.env` file from the working directory if one exists.
    ///
    /// Fails with `AppError::Config` if a value does not parse. A missing
    /// TMDB_API_KEY is only an error once a catalog client is built.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut tmdb = TmdbConfig {
            api_key: lookup("TMDB_API_KEY").filter(|k| !k.trim().is_empty()),
            ..TmdbConfig::default()
        };
        if let Some(url) = lookup("TMDB_API_URL") {
            tmdb.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup("TMDB_IMAGE_BASE_URL") {
            tmdb.image_base_url = url;
        }
        if let Some(size) = lookup("TMDB_PROFILE_SIZE") {
            tmdb.profile_size = size;
        }
        if let Some(delay) = lookup("API_CALL_DELAY_MS") {
            tmdb.call_delay_ms = parse_value("API_CALL_DELAY_MS", &delay)?;
        }

        let mut matching = MatchConfig::default();
        if let Some(v) = lookup("TITLE_SIMILARITY_THRESHOLD") {
            matching.similarity_threshold = parse_value("TITLE_SIMILARITY_THRESHOLD", &v)?;
        }
        if let Some(v) = lookup("YEAR_DIFF_THRESHOLD") {
            matching.year_diff_threshold = parse_value("YEAR_DIFF_THRESHOLD", &v)?;
        }
        if let Some(v) = lookup("TOP_N_ACTORS") {
            matching.top_actor_count = parse_value("TOP_N_ACTORS", &v)?;
        }
        if let Some(v) = lookup("OTHER_BUCKET_POLICY") {
            matching.other_bucket_policy = v.parse()?;
        }
        matching.validate()?;

        let unmatched_policy = match lookup("UNMATCHED_POLICY") {
            Some(v) => v.parse()?,
            None => UnmatchedPolicy::default(),
        };

        Ok(Self {
            tmdb,
            database_path: lookup("FILMLINK_DATABASE_PATH").map(PathBuf::from),
            matching,
            unmatched_policy,
        })
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> AppResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{} has an invalid value '{}'", key, raw)))
}
