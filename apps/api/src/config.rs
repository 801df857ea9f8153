use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_RESUME_PATH: &str = "src/assets/resume.pdf";

/// Application configuration loaded from environment variables.
/// Everything has a default; only malformed numeric values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub groq_api_url: String,
    pub resume_path: PathBuf,
    pub port: u16,
    pub provider_timeout_secs: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            groq_api_key: std::env::var("GROQ_API_KEY").unwrap_or_default(),
            groq_api_url: env_or("GROQ_API_URL", DEFAULT_GROQ_API_URL),
            resume_path: PathBuf::from(env_or("RESUME_PATH", DEFAULT_RESUME_PATH)),
            port: env_or("PORT", "3001")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            provider_timeout_secs: env_or("PROVIDER_TIMEOUT_SECS", "60")
                .parse::<u64>()
                .context("PROVIDER_TIMEOUT_SECS must be a whole number of seconds")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
