mod types;

pub use types::{Config, SeedConfig, ServerConfig};

use crate::error::{OrmGraphError, Result};
use crate::model::ModelRegistry;
use std::fs;

/// Prefix of server environment overrides (`ORMGRAPH_SERVER_PORT=5000`)
pub const ENV_PREFIX: &str = "ORMGRAPH_SERVER";

impl Config {
    /// Normalize the configured entities into a model registry
    pub fn registry(&self) -> Result<ModelRegistry> {
        ModelRegistry::from_configs(&self.entity)
    }

    /// Check entities, association targets and seed tables
    pub fn validate(&self) -> Result<()> {
        let registry = self.registry()?;
        for seed in &self.seed {
            seed.validate().map_err(OrmGraphError::Config)?;
            if registry.get(&seed.entity).is_none() {
                return Err(OrmGraphError::Config(format!(
                    "Seed data names unknown entity '{}'",
                    seed.entity
                )));
            }
        }
        Ok(())
    }
}

/// Load configuration from a TOML file
///
/// `[server]` settings may be overridden from the environment
/// (`ORMGRAPH_SERVER_PORT`, `ORMGRAPH_SERVER_BIND`, `ORMGRAPH_SERVER_CURSOR`).
pub fn load_config(path: &str) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .map_err(|e| OrmGraphError::Config(format!("Failed to read config file '{}': {}", path, e)))?;

    let mut config: Config = toml::from_str(&contents)?;
    config.server = apply_env_overrides(&config.server)?;
    config.validate()?;

    Ok(config)
}

fn apply_env_overrides(server: &ServerConfig) -> Result<ServerConfig> {
    let settings = config::Config::builder()
        .add_source(config::Config::try_from(server)?)
        .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()?;
    Ok(settings.try_deserialize()?)
}

/// Save configuration to a TOML file
pub fn save_config(config: &Config, path: &str) -> Result<()> {
    config.validate()?;

    let toml_string = toml::to_string_pretty(config)?;
    fs::write(path, toml_string)
        .map_err(|e| OrmGraphError::Config(format!("Failed to write config file '{}': {}", path, e)))?;

    Ok(())
}
