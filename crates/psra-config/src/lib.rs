//! # psra-config
//!
//! Layered configuration loading for PSRA dispatch using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`PSRA_*` prefix, `__` as separator)
//! 2. Project-level `.psra/config.toml`
//! 3. User-level `~/.config/psra/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `PSRA_STORE__PATH` -> `store.path`, `PSRA_RELAY__TRANSPORT` -> `relay.transport`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use psra_config::PsraConfig;
//!
//! let config = PsraConfig::load_with_dotenv().expect("config");
//! println!("store at {}", config.store.path);
//! ```

mod dispatch;
mod error;
mod relay;
mod store;

pub use dispatch::DispatchConfig;
pub use error::ConfigError;
pub use relay::{RelayConfig, TransportPreference};
pub use store::{StoreBackend, StoreConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PsraConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl PsraConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Extract and validate from an explicit figment (tests layer their own providers).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".psra/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("PSRA_").split("__"))
    }

    /// Reject values the dispatch core cannot work with.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.relay.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "relay.capacity".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.relay.channel_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "relay.channel_name".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.dispatch.points_per_close == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dispatch.points_per_close".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.store.path.trim().is_empty() && self.store.backend == StoreBackend::File {
            return Err(ConfigError::InvalidValue {
                field: "store.path".into(),
                reason: "file backend needs a directory".into(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("psra").join("config.toml"))
    }
}
