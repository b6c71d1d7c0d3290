use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum OrmGraphError {
    #[error("Unable to convert {0} to a GraphQL type")]
    UnsupportedType(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Type name '{name}' is derived by both '{first}' and '{second}'")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schema generation error: {0}")]
    SchemaGeneration(String),

    #[error("Invalid cursor: {0}")]
    Cursor(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::ser::Error> for OrmGraphError {
    fn from(err: toml::ser::Error) -> Self {
        OrmGraphError::Serialization(format!("TOML serialization error: {}", err))
    }
}

impl From<toml::de::Error> for OrmGraphError {
    fn from(err: toml::de::Error) -> Self {
        OrmGraphError::Config(format!("TOML parse error: {}", err))
    }
}

impl From<config::ConfigError> for OrmGraphError {
    fn from(err: config::ConfigError) -> Self {
        OrmGraphError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for OrmGraphError {
    fn from(err: serde_json::Error) -> Self {
        OrmGraphError::Serialization(format!("JSON error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, OrmGraphError>;
