use std::time::Duration;

use anyhow::{Context, Result};

use crate::resilience::{CircuitBreakerConfig, RetryPolicy};
use crate::upload::ValidationOptions;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Upper bound on uploaded résumé size, in bytes.
    pub max_upload_bytes: usize,
    /// Consecutive LLM failures before the circuit opens.
    pub llm_failure_threshold: u32,
    /// How long the LLM circuit stays open before probing again.
    pub llm_reset_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", "10485760")
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            llm_failure_threshold: env_or("LLM_FAILURE_THRESHOLD", "5")
                .parse::<u32>()
                .context("LLM_FAILURE_THRESHOLD must be an integer")?,
            llm_reset_timeout: Duration::from_secs(
                env_or("LLM_RESET_TIMEOUT_SECS", "30")
                    .parse::<u64>()
                    .context("LLM_RESET_TIMEOUT_SECS must be a number of seconds")?,
            ),
        })
    }

    /// Breaker configuration for the LLM call site.
    pub fn breaker_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.llm_failure_threshold,
            reset_timeout: self.llm_reset_timeout,
            retry: RetryPolicy::default(),
        }
    }

    /// Upload validation bounds derived from configuration.
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            max_size: self.max_upload_bytes,
            ..Default::default()
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
