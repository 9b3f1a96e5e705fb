//! Player configuration
//!
//! Read from the environment (after `.env` files are loaded by the binary).
//!
//! | variable | default |
//! |----------|---------|
//! | `TOPUP_API_BASE_URL` | `http://localhost:3000` |
//! | `TOPUP_DRAFT_EXPIRY_MS` | `86400000` (24 h) |
//! | `TOPUP_AUTOSAVE_DELAY_MS` | `2000` |
//! | `TOPUP_STORAGE_PATH` | OS config dir |
//! | `TOPUP_CATALOG_PATH` | built-in catalog |

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use validator::Validate;

use crate::application::services::TopupFormOptions;
use crate::infrastructure::http::DEFAULT_API_BASE_URL;

pub const API_BASE_URL_VAR: &str = "TOPUP_API_BASE_URL";
pub const DRAFT_EXPIRY_VAR: &str = "TOPUP_DRAFT_EXPIRY_MS";
pub const AUTOSAVE_DELAY_VAR: &str = "TOPUP_AUTOSAVE_DELAY_MS";
pub const STORAGE_PATH_VAR: &str = "TOPUP_STORAGE_PATH";
pub const CATALOG_PATH_VAR: &str = "TOPUP_CATALOG_PATH";

const DEFAULT_DRAFT_EXPIRY_MS: u64 = 24 * 60 * 60 * 1000;
const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 2000;
const MAX_DRAFT_EXPIRY_MS: u64 = 30 * 24 * 60 * 60 * 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of milliseconds, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must be at most {max} milliseconds, got {value}")]
    OutOfRange {
        var: &'static str,
        value: u64,
        max: u64,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct PlayerConfig {
    #[validate(url)]
    pub api_base_url: String,
    /// Up to 30 days, checked in `from_lookup`
    #[validate(range(min = 1))]
    pub draft_expiry_ms: u64,
    #[validate(range(max = 60_000))]
    pub autosave_delay_ms: u64,
    pub storage_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            draft_expiry_ms: DEFAULT_DRAFT_EXPIRY_MS,
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
            storage_path: None,
            catalog_path: None,
        }
    }
}

impl PlayerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the config from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| {
            lookup(var)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let millis = |var: &'static str, default: u64| match get(var) {
            Some(value) => value
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNumber { var, value }),
            None => Ok(default),
        };

        let config = Self {
            api_base_url: get(API_BASE_URL_VAR)
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            draft_expiry_ms: millis(DRAFT_EXPIRY_VAR, DEFAULT_DRAFT_EXPIRY_MS)?,
            autosave_delay_ms: millis(AUTOSAVE_DELAY_VAR, DEFAULT_AUTOSAVE_DELAY_MS)?,
            storage_path: get(STORAGE_PATH_VAR).map(PathBuf::from),
            catalog_path: get(CATALOG_PATH_VAR).map(PathBuf::from),
        };
        if config.draft_expiry_ms > MAX_DRAFT_EXPIRY_MS {
            return Err(ConfigError::OutOfRange {
                var: DRAFT_EXPIRY_VAR,
                value: config.draft_expiry_ms,
                max: MAX_DRAFT_EXPIRY_MS,
            });
        }
        config.validate()?;

        tracing::debug!(
            api_base_url = %config.api_base_url,
            draft_expiry_ms = config.draft_expiry_ms,
            autosave_delay_ms = config.autosave_delay_ms,
            "Player configuration loaded"
        );
        Ok(config)
    }

    pub fn form_options(&self) -> TopupFormOptions {
        TopupFormOptions {
            draft_expiry: Duration::from_millis(self.draft_expiry_ms),
            autosave_delay: Duration::from_millis(self.autosave_delay_ms),
        }
    }
}
