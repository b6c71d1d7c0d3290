pub mod config;
pub mod error;
pub mod model;
pub mod schema;
pub mod store;

// Re-export commonly used types
pub use config::{Config, SeedConfig, ServerConfig};
pub use error::{OrmGraphError, Result};
pub use model::{EntityConfig, ModelRegistry};
pub use schema::{GeneratedSchema, SchemaBuilder};
pub use store::{MemoryStore, Store};
