use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; only malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Remote ranking endpoint. `None` runs the ranker local-only.
    pub ranking_service_url: Option<String>,
    pub ranking_timeout: Duration,
    /// Size of the recommended window shown per slide.
    pub ranking_top_k: usize,
    /// JSON layout library; `None` uses the built-in one.
    pub layout_library_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            ranking_service_url: None,
            ranking_timeout: Duration::from_millis(3000),
            ranking_top_k: 6,
            layout_library_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        Ok(Config {
            port: parse_or("PORT", &lookup, defaults.port)?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            ranking_service_url: non_empty(lookup("RANKING_SERVICE_URL")),
            ranking_timeout: Duration::from_millis(parse_or(
                "RANKING_TIMEOUT_MS",
                &lookup,
                defaults.ranking_timeout.as_millis() as u64,
            )?),
            ranking_top_k: parse_or("RANKING_TOP_K", &lookup, defaults.ranking_top_k)?.max(1),
            layout_library_path: non_empty(lookup("LAYOUT_LIBRARY_PATH")),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_or<T>(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
