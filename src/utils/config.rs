use config::{Config as ConfigLib, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::core::matcher::MatchStrategy;
use crate::utils::error::{EngineError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub matcher: MatcherConfig,
    pub storage: StorageConfig,
    pub pin: PinConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatcherConfig {
    /// Which matching strategy the deployment runs.
    pub strategy: MatchStrategy,
    /// Accept/reject cut-off. Trades false accepts against false rejects;
    /// tunable per deployment rather than baked into the code.
    pub threshold: f32,
    /// Reference samples kept per identity. 1 keeps a single reference
    /// that re-enrollment replaces; higher values append, evicting the
    /// oldest sample at the cap.
    pub max_samples_per_identity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub gallery_file: String,
    pub pin_file: String,
    pub ledger_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PinConfig {
    /// Digest salt shared by all identities. Injected here instead of living
    /// as a constant in the code; a hardened deployment would move to one
    /// salt per identity, which changes the PIN store format.
    pub salt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            matcher: MatcherConfig {
                strategy: MatchStrategy::Embedding,
                threshold: 0.6,
                // One canonical reference per identity, as the embedding
                // strategy expects; correlation deployments raise this.
                max_samples_per_identity: 1,
            },
            storage: StorageConfig {
                data_dir: PathBuf::from("data"),
                gallery_file: "faces.json".to_string(),
                pin_file: "pin_data.json".to_string(),
                ledger_file: "transactions.json".to_string(),
            },
            pin: PinConfig {
                salt: "facepay-demo-salt".to_string(),
            },
        }
    }
}

impl Config {
    /// Loads configuration in layers: built-in defaults, then the optional
    /// `config/default` and `config/local` files, then `FACEPAY__*`
    /// environment overrides (e.g. `FACEPAY__MATCHER__THRESHOLD`).
    pub fn load() -> Result<Self> {
        let config = ConfigLib::builder()
            // Start with default values
            .set_default("matcher.strategy", "embedding")?
            .set_default("matcher.threshold", 0.6)?
            .set_default("matcher.max_samples_per_identity", 1)?
            .set_default("storage.data_dir", "data")?
            .set_default("storage.gallery_file", "faces.json")?
            .set_default("storage.pin_file", "pin_data.json")?
            .set_default("storage.ledger_file", "transactions.json")?
            .set_default("pin.salt", "facepay-demo-salt")?
            // Load from config files when present
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables
            .add_source(Environment::with_prefix("FACEPAY").separator("__"))
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.matcher.threshold.is_finite() || !(0.0..=1.0).contains(&self.matcher.threshold) {
            return Err(EngineError::Config(
                "matcher.threshold must lie in [0.0, 1.0]".into(),
            ));
        }
        if self.matcher.max_samples_per_identity == 0 {
            return Err(EngineError::Config(
                "matcher.max_samples_per_identity must be greater than 0".into(),
            ));
        }
        if self.pin.salt.is_empty() {
            return Err(EngineError::Config("pin.salt must be set".into()));
        }
        if self.storage.gallery_file.is_empty()
            || self.storage.pin_file.is_empty()
            || self.storage.ledger_file.is_empty()
        {
            return Err(EngineError::Config(
                "storage store file names must be set".into(),
            ));
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn gallery_path(&self) -> PathBuf {
        self.data_dir.join(&self.gallery_file)
    }

    pub fn pin_path(&self) -> PathBuf {
        self.data_dir.join(&self.pin_file)
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(&self.ledger_file)
    }
}

impl From<ConfigError> for EngineError {
    fn from(error: ConfigError) -> Self {
        EngineError::Config(error.to_string())
    }
}
