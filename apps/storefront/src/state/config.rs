//! # Configuration State
//!
//! Store configuration loaded at startup.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     FLORALS_STORE_NAME=...   FLORALS_DB_PATH=...                        │
//! │     FLORALS_FLAT_TAX=20.00   FLORALS_FREE_SHIPPING_THRESHOLD=75         │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     $FLORALS_CONFIG, else <platform config dir>/florals.toml            │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! store_name = "Rehoboth Florals"
//! database_path = "/var/lib/florals/florals.db"
//! page_size = 12
//!
//! # amounts in pesewas
//! [checkout]
//! free_shipping_threshold = 7500
//! reduced_shipping_threshold = 5000
//! reduced_shipping_fee = 599
//! standard_shipping_fee = 999
//! flat_tax = 2000
//! ```
//!
//! Read-only after initialization.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use florals_core::catalog::DEFAULT_PAGE_SIZE;
use florals_core::checkout::CheckoutRules;
use florals_core::money::CURRENCY_CODE;
use florals_core::{Money, STORE_NAME};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "FLORALS_";

const CONFIG_FILE_NAME: &str = "florals.toml";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Could not determine the application data directory")]
    NoDataDir,
}

// =============================================================================
// Config State
// =============================================================================

/// Storefront configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Displayed in CLI output and order confirmations.
    pub store_name: String,

    /// ISO 4217, always GHS today.
    pub currency_code: String,

    /// Explicit database file. `None` uses the platform data directory.
    pub database_path: Option<PathBuf>,

    /// Shop grid page size.
    pub page_size: u32,

    /// Shipping tiers and tax.
    pub checkout: CheckoutRules,
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            store_name: STORE_NAME.to_string(),
            currency_code: CURRENCY_CODE.to_string(),
            database_path: None,
            page_size: DEFAULT_PAGE_SIZE,
            checkout: CheckoutRules::default(),
        }
    }
}

/// On-disk shape. Every key is optional and overlays the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    store_name: Option<String>,
    database_path: Option<PathBuf>,
    page_size: Option<u32>,
    checkout: CheckoutFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CheckoutFile {
    free_shipping_threshold: Option<Money>,
    reduced_shipping_threshold: Option<Money>,
    reduced_shipping_fee: Option<Money>,
    standard_shipping_fee: Option<Money>,
    flat_tax: Option<Money>,
}

impl ConfigState {
    /// Defaults, then the config file, then `FLORALS_*` variables.
    ///
    /// An explicit `path` must exist. Without one, `$FLORALS_CONFIG` or the
    /// platform config file is read when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = ConfigState::default();

        match path {
            Some(path) => config.merge_file(path)?,
            None => {
                let file = std::env::var(format!("{}CONFIG", ENV_PREFIX))
                    .ok()
                    .map(PathBuf::from)
                    .or_else(default_config_path);

                if let Some(path) = file {
                    if path.exists() {
                        config.merge_file(&path)?;
                    } else {
                        debug!(path = %path.display(), "No config file, using defaults");
                    }
                }
            }
        }

        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlays the TOML file at `path`.
    pub fn merge_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.merge_toml(&raw)?;
        info!(path = %path.display(), "Loaded config file");
        Ok(())
    }

    /// Overlays a TOML document.
    pub fn merge_toml(&mut self, raw: &str) -> Result<(), ConfigError> {
        let file: ConfigFile = toml::from_str(raw)?;

        if let Some(name) = file.store_name {
            self.store_name = name;
        }
        if file.database_path.is_some() {
            self.database_path = file.database_path;
        }
        if let Some(size) = file.page_size {
            self.page_size = size;
        }

        let rules = &mut self.checkout;
        let c = file.checkout;
        rules.free_shipping_threshold = c.free_shipping_threshold.unwrap_or(rules.free_shipping_threshold);
        rules.reduced_shipping_threshold = c.reduced_shipping_threshold.unwrap_or(rules.reduced_shipping_threshold);
        rules.reduced_shipping_fee = c.reduced_shipping_fee.unwrap_or(rules.reduced_shipping_fee);
        rules.standard_shipping_fee = c.standard_shipping_fee.unwrap_or(rules.standard_shipping_fee);
        rules.flat_tax = c.flat_tax.unwrap_or(rules.flat_tax);

        Ok(())
    }

    /// Applies `FLORALS_*` overrides read through `get`.
    ///
    /// ## Environment Variables
    /// - `FLORALS_STORE_NAME`
    /// - `FLORALS_DB_PATH`
    /// - `FLORALS_PAGE_SIZE`
    /// - `FLORALS_FREE_SHIPPING_THRESHOLD`, `FLORALS_REDUCED_SHIPPING_THRESHOLD`,
    ///   `FLORALS_REDUCED_SHIPPING_FEE`, `FLORALS_STANDARD_SHIPPING_FEE`,
    ///   `FLORALS_FLAT_TAX`: decimal amounts in cedis, e.g. `"5.99"`
    pub fn apply_env_with<F>(&mut self, get: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            let key = format!("{}{}", ENV_PREFIX, name);
            get(&key).map(|value| (key, value))
        };

        if let Some((_, name)) = var("STORE_NAME") {
            self.store_name = name;
        }

        if let Some((_, path)) = var("DB_PATH") {
            self.database_path = Some(PathBuf::from(path));
        }

        if let Some((key, value)) = var("PAGE_SIZE") {
            self.page_size = value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidValue { key, value })?;
        }

        let amounts: [(&str, &mut Money); 5] = [
            ("FREE_SHIPPING_THRESHOLD", &mut self.checkout.free_shipping_threshold),
            ("REDUCED_SHIPPING_THRESHOLD", &mut self.checkout.reduced_shipping_threshold),
            ("REDUCED_SHIPPING_FEE", &mut self.checkout.reduced_shipping_fee),
            ("STANDARD_SHIPPING_FEE", &mut self.checkout.standard_shipping_fee),
            ("FLAT_TAX", &mut self.checkout.flat_tax),
        ];

        for (name, slot) in amounts {
            if let Some((key, value)) = var(name) {
                *slot = Money::parse(&value)
                    .filter(|m| !m.is_negative())
                    .ok_or(ConfigError::InvalidValue { key, value })?;
            }
        }

        Ok(())
    }

    /// The configured database path, else `<data dir>/florals.db`.
    ///
    /// The data directory is created when missing.
    pub fn resolve_database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }

        let dirs = project_dirs().ok_or(ConfigError::NoDataDir)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir).map_err(|source| ConfigError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;

        Ok(data_dir.join("florals.db"))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "rehoboth", "florals")
}

fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
