use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the job-analysis service, e.g. `http://localhost:5000`.
    pub analysis_service_url: String,
    /// Scraping plus generation routinely takes minutes.
    pub analysis_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            analysis_service_url: require_env("ANALYSIS_SERVICE_URL")?,
            analysis_timeout_secs: std::env::var("ANALYSIS_TIMEOUT_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse::<u64>()
                .context("ANALYSIS_TIMEOUT_SECS must be a whole number of seconds")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
