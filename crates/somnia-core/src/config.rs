//! Journal configuration
//!
//! Read from the environment; command-line flags override on top.
//!
//! | Variable | Default |
//! |---|---|
//! | `SOMNIA_DATA_DIR` | platform data directory |
//! | `SOMNIA_LLM_ENDPOINT` | `https://api.openai.com/v1` |
//! | `SOMNIA_LLM_MODEL` | `gpt-4o` |
//! | `SOMNIA_LLM_TIMEOUT_SECS` | `60` |
//! | `SOMNIA_SEARCH_TOP_K` | `5` |
//! | `SOMNIA_OPENAI_API_KEY`, then `OPENAI_API_KEY` | none |

use std::path::PathBuf;
use std::time::Duration;

use crate::search::DEFAULT_TOP_K;

pub const DEFAULT_LLM_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o";
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(60);

/// File name of the database inside a data directory
pub const DATABASE_FILE: &str = "somnia.db";

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{0} is set but empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalConfig {
    /// Directory holding the database; `None` uses the platform default
    pub data_dir: Option<PathBuf>,
    pub llm_endpoint: String,
    pub llm_model: String,
    pub llm_timeout: Duration,
    pub api_key: Option<String>,
    pub search_top_k: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            llm_endpoint: DEFAULT_LLM_ENDPOINT.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_timeout: DEFAULT_LLM_TIMEOUT,
            api_key: None,
            search_top_k: DEFAULT_TOP_K,
        }
    }
}

impl JournalConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("SOMNIA_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(non_empty("SOMNIA_DATA_DIR", dir)?));
        }
        if let Some(endpoint) = lookup("SOMNIA_LLM_ENDPOINT") {
            config.llm_endpoint = non_empty("SOMNIA_LLM_ENDPOINT", endpoint)?;
        }
        if let Some(model) = lookup("SOMNIA_LLM_MODEL") {
            config.llm_model = non_empty("SOMNIA_LLM_MODEL", model)?;
        }
        if let Some(secs) = lookup("SOMNIA_LLM_TIMEOUT_SECS") {
            config.llm_timeout = Duration::from_secs(positive("SOMNIA_LLM_TIMEOUT_SECS", &secs)?);
        }
        if let Some(k) = lookup("SOMNIA_SEARCH_TOP_K") {
            config.search_top_k = positive("SOMNIA_SEARCH_TOP_K", &k)? as usize;
        }

        // An empty key is treated as unset
        config.api_key = ["SOMNIA_OPENAI_API_KEY", "OPENAI_API_KEY"]
            .into_iter()
            .filter_map(&lookup)
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty());

        Ok(config)
    }

    /// Database file location, if a data directory is configured
    pub fn database_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join(DATABASE_FILE))
    }
}

fn non_empty(var: &'static str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Empty(var));
    }
    Ok(trimmed.to_string())
}

fn positive(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            var,
            value: value.to_string(),
        }),
    }
}
