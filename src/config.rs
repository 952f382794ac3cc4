use crate::model::{ConfigError, Genre, YearRange};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const TMDB_KEY_VAR: &str = "TMDB_API_KEY";
pub const NYT_KEY_VAR: &str = "NYT_API_KEY";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tmdb_base_url: String,
    pub nyt_base_url: String,
    pub start_year: i32,
    pub end_year: i32,
    pub genres: Vec<Genre>,
    pub actors: Vec<String>,
    /// Upper bound on TMDB result pages fetched per genre or actor.
    pub max_pages: u32,
    pub max_movies_per_entity: usize,
    pub fetch_mentions: bool,
    pub request_timeout_seconds: u64,
    pub retry_delay_ms: u64,
    pub output_dir: PathBuf,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tmdb_base_url: "https://api.themoviedb.org/3".to_string(),
            nyt_base_url: "https://api.nytimes.com/svc/search/v2/articlesearch.json".to_string(),
            start_year: 2020,
            end_year: 2024,
            genres: Genre::ALL.to_vec(),
            actors: vec!["Will Smith".to_string(), "Adam Sandler".to_string()],
            max_pages: 1,
            max_movies_per_entity: 20,
            fetch_mentions: true,
            request_timeout_seconds: 10,
            retry_delay_ms: 5000,
            output_dir: PathBuf::from("charts"),
            chart_width: 1000,
            chart_height: 600,
        }
    }
}

impl AppConfig {
    pub fn years(&self) -> YearRange {
        YearRange::new(self.start_year, self.end_year)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.start_year > self.end_year {
            return Err(ConfigError::Invalid(format!(
                "start_year {} is after end_year {}",
                self.start_year, self.end_year
            )));
        }
        if self.max_pages == 0 {
            return Err(ConfigError::Invalid("max_pages must be at least 1".into()));
        }
        if self.max_movies_per_entity == 0 {
            return Err(ConfigError::Invalid(
                "max_movies_per_entity must be at least 1".into(),
            ));
        }
        if self.chart_width == 0 || self.chart_height == 0 {
            return Err(ConfigError::Invalid("chart dimensions must be non-zero".into()));
        }
        Ok(())
    }
}

/// API keys read from the environment.
#[derive(Clone)]
pub struct Credentials {
    pub tmdb_api_key: String,
    pub nyt_api_key: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            tmdb_api_key: read_var(TMDB_KEY_VAR)?,
            nyt_api_key: read_var(NYT_KEY_VAR)?,
        })
    }
}

fn read_var(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

/// Loads the JSON config at `path`, falling back to defaults when the file is absent.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let config = if path.exists() {
        let content = fs::read_to_string(path)?;
        serde_json::from_str::<AppConfig>(&content)?
    } else {
        AppConfig::default()
    };
    config.validate()?;
    Ok(config)
}
