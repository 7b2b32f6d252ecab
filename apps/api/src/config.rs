use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::analysis::recommendations::RecommendationPolicy;
use crate::analysis::scorer::ScoringWeights;
use crate::analysis::AnalyzerSettings;

/// Application configuration loaded from environment variables.
/// Every variable is optional; invalid values fail start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    pub request_timeout: Duration,
    /// TOML taxonomy file; the built-in taxonomy is used when unset.
    pub taxonomy_path: Option<PathBuf>,
    pub similarity_weight: f64,
    pub strong_match_threshold: u32,
    pub max_recommendations: usize,
    /// Empty means any origin is allowed.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            max_upload_bytes: 16 * 1024 * 1024,
            request_timeout: Duration::from_secs(30),
            taxonomy_path: None,
            similarity_weight: 0.4,
            strong_match_threshold: 70,
            max_recommendations: 8,
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, falling back to defaults for absent keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Config {
            port: parse_or(&get, "PORT", defaults.port)?,
            rust_log: get("RUST_LOG").unwrap_or(defaults.rust_log),
            max_upload_bytes: parse_or(&get, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            request_timeout: Duration::from_secs(parse_or(
                &get,
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            taxonomy_path: get("TAXONOMY_PATH").map(PathBuf::from),
            similarity_weight: parse_or(&get, "SIMILARITY_WEIGHT", defaults.similarity_weight)?,
            strong_match_threshold: parse_or(
                &get,
                "STRONG_MATCH_THRESHOLD",
                defaults.strong_match_threshold,
            )?,
            max_recommendations: parse_or(
                &get,
                "MAX_RECOMMENDATIONS",
                defaults.max_recommendations,
            )?,
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            bail!("MAX_UPLOAD_BYTES must be greater than zero");
        }
        if self.request_timeout.is_zero() {
            bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }
        if !(0.0..=1.0).contains(&self.similarity_weight) {
            bail!(
                "SIMILARITY_WEIGHT must be within [0, 1], got {}",
                self.similarity_weight
            );
        }
        if self.strong_match_threshold > 100 {
            bail!(
                "STRONG_MATCH_THRESHOLD must be at most 100, got {}",
                self.strong_match_threshold
            );
        }
        if self.max_recommendations == 0 {
            bail!("MAX_RECOMMENDATIONS must be at least 1");
        }
        Ok(())
    }

    pub fn analyzer_settings(&self) -> AnalyzerSettings {
        AnalyzerSettings {
            max_resume_bytes: self.max_upload_bytes,
            weights: ScoringWeights::from_similarity_weight(self.similarity_weight),
            recommendations: RecommendationPolicy {
                strong_match_threshold: self.strong_match_threshold,
                max_recommendations: self.max_recommendations,
                ..RecommendationPolicy::default()
            },
        }
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
