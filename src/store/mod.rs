/// Data-store interface
///
/// The generated resolvers never talk to a database directly; they go through
/// the `Store` trait. Errors raised by a store are handed back to the GraphQL
/// engine unchanged.

mod memory;

pub use memory::{InstanceMethod, MemoryStore, StaticMethod};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Query options passed verbatim from the `filter` argument
/// (`where`, `order`, `limit`, `offset`, `include`, ...)
pub type FindOptions = Map<String, Value>;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: String, id: String },

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Method '{method}' is not defined on {entity}")]
    UnknownMethod { entity: String, method: String },

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("{0}")]
    Backend(String),
}

/// One stored row, tagged with the entity it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub entity: String,
    pub values: Map<String, Value>,
}

impl Record {
    pub fn new(entity: impl Into<String>, values: Map<String, Value>) -> Self {
        Self {
            entity: entity.into(),
            values,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Whether this record belongs to `entity`
    pub fn is_instance_of(&self, entity: &str) -> bool {
        self.entity == entity
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.values.clone())
    }
}

/// Result of a counted page lookup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindAndCount {
    pub rows: Vec<Record>,
    pub count: u64,
}

/// Operations the generated resolvers need from a data store
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_by_id(
        &self,
        entity: &str,
        id: &Value,
        options: &FindOptions,
    ) -> StoreResult<Option<Record>>;

    async fn find_one(&self, entity: &str, options: &FindOptions) -> StoreResult<Option<Record>>;

    async fn find_and_count(&self, entity: &str, options: &FindOptions)
        -> StoreResult<FindAndCount>;

    async fn create(&self, entity: &str, data: Value) -> StoreResult<Record>;

    /// Apply `data` to an existing record in place
    async fn update(&self, record: Record, data: Value) -> StoreResult<Record>;

    /// Remove a record; `options` are store-specific destroy options
    async fn destroy(&self, record: Record, options: Option<Value>) -> StoreResult<Record>;

    async fn call_static(&self, entity: &str, method: &str, params: Vec<Value>)
        -> StoreResult<Value>;

    async fn call_instance(&self, record: Record, method: &str, params: Vec<Value>)
        -> StoreResult<Value>;
}

/// Render an id value for messages and cursors (strings unquoted)
pub fn id_to_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
