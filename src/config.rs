use anyhow::{ensure, Context, Result};
use std::env;
use std::str::FromStr;

use crate::engine::EngineOptions;
use crate::services::bulk::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_IDS};
use crate::services::conversion::{DEFAULT_DEAL_CLOSE_DAYS, MAX_DEAL_CLOSE_DAYS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // Engine
    pub bulk_chunk_size: usize,
    pub max_bulk_ids: usize,
    pub deal_close_days: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env: Environment::Dev,
            server_addr: "0.0.0.0:8080".to_string(),
            cors_allow_origins: vec!["http://localhost:3000".to_string()],
            bulk_chunk_size: DEFAULT_CHUNK_SIZE,
            max_bulk_ids: DEFAULT_MAX_IDS,
            deal_close_days: DEFAULT_DEAL_CLOSE_DAYS,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup. Unset keys take their defaults;
    /// set but unparsable keys are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let env = lookup("ENV")
            .map(|value| Environment::from_str(&value))
            .unwrap_or(defaults.env);
        let server_addr = lookup("SERVER_ADDR").unwrap_or(defaults.server_addr);

        // CORS
        let cors_allow_origins = match lookup("CORS_ALLOW_ORIGINS") {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.cors_allow_origins,
        };

        // Engine
        let bulk_chunk_size = parsed(&lookup, "BULK_CHUNK_SIZE", defaults.bulk_chunk_size)?;
        let max_bulk_ids = parsed(&lookup, "MAX_BULK_IDS", defaults.max_bulk_ids)?;
        let deal_close_days = parsed(&lookup, "DEAL_CLOSE_DAYS", defaults.deal_close_days)?;

        ensure!(bulk_chunk_size > 0, "BULK_CHUNK_SIZE must be at least 1");
        ensure!(
            (0..=MAX_DEAL_CLOSE_DAYS).contains(&deal_close_days),
            "DEAL_CLOSE_DAYS must be between 0 and {MAX_DEAL_CLOSE_DAYS}"
        );

        Ok(Settings {
            env,
            server_addr,
            cors_allow_origins,
            bulk_chunk_size,
            max_bulk_ids,
            deal_close_days,
        })
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            bulk_chunk_size: self.bulk_chunk_size,
            max_bulk_ids: self.max_bulk_ids,
            deal_close_days: self.deal_close_days,
        }
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got '{raw}'")),
        None => Ok(default),
    }
}
