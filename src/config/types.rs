use crate::model::EntityConfig;
use crate::schema::cursor::CursorStyle;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    /// Entity model the schema is generated from
    #[serde(default)]
    pub entity: Vec<EntityConfig>,

    /// Rows loaded into the in-memory store on `serve`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seed: Vec<SeedConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to bind the server to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Interface to bind the server to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Namespace of connection cursors (`type_name` or `global`)
    #[serde(default)]
    pub cursor: CursorStyle,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            cursor: CursorStyle::default(),
        }
    }
}

fn default_port() -> u16 {
    4000
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

/// Initial rows for one entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    pub entity: String,

    #[serde(default)]
    pub rows: Vec<Value>,
}

impl SeedConfig {
    /// Validate seed configuration
    pub fn validate(&self) -> Result<(), String> {
        if let Some(row) = self.rows.iter().find(|row| !row.is_object()) {
            return Err(format!(
                "Seed rows for '{}' must be tables, found {}",
                self.entity, row
            ));
        }
        Ok(())
    }
}
