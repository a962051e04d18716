use super::{
    genotype::GenotypeConfig, objective::ObjectiveConfig, sweep::SweepConfig,
    traits::ConfigSection,
};
use crate::error::SweepError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Prefix of environment variables overriding file settings, e.g.
/// `GASWEEP__SWEEP__REPETITIONS=20`
pub const ENV_PREFIX: &str = "GASWEEP";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub genotype: GenotypeConfig,
    pub objective: ObjectiveConfig,
    pub sweep: SweepConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), SweepError> {
        self.genotype.validate()?;
        self.objective.validate()?;
        self.sweep.validate()?;
        Ok(())
    }

    /// Reads a TOML file, then applies `GASWEEP__SECTION__KEY` overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SweepError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SweepError::Configuration(format!(
                "Config file {} not found",
                path.display()
            )));
        }

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, SweepError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SweepError> {
        let config = AppConfig::load(path)?;
        *self.write() = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SweepError> {
        let toml_str = self.read().to_toml()?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.read().clone()
    }

    /// Applies `f` and keeps the result only if it still validates.
    pub fn update<F>(&self, f: F) -> Result<(), SweepError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.write();
        let mut candidate = config.clone();
        f(&mut candidate);
        candidate.validate()?;
        *config = candidate;
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, AppConfig> {
        self.config.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, AppConfig> {
        self.config.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
