/// In-memory reference store
///
/// Backs the `serve` command and the integration tests. Supports `where`
/// equality (arrays mean "any of"), `order`, `limit` and `offset`, integer
/// primary keys and timestamp maintenance. Custom methods are plain closures
/// registered per entity.

use super::{id_to_string, FindAndCount, FindOptions, Record, Store, StoreError, StoreResult};
use crate::model::ModelRegistry;

use async_trait::async_trait;
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub type StaticMethod = Arc<dyn Fn(Vec<Value>) -> StoreResult<Value> + Send + Sync>;
pub type InstanceMethod = Arc<dyn Fn(&Record, Vec<Value>) -> StoreResult<Value> + Send + Sync>;

#[derive(Debug)]
struct Table {
    primary_key: String,
    timestamps: bool,
    next_id: i64,
    rows: Vec<Map<String, Value>>,
}

pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
    static_methods: HashMap<(String, String), StaticMethod>,
    instance_methods: HashMap<(String, String), InstanceMethod>,
}

impl MemoryStore {
    /// Create an empty table for every entity in the registry
    pub fn new(registry: &ModelRegistry) -> Self {
        let tables = registry
            .entities()
            .map(|entity| {
                (
                    entity.name.clone(),
                    Table {
                        primary_key: entity.primary_key.clone(),
                        timestamps: entity.attributes.contains_key("createdAt"),
                        next_id: 1,
                        rows: Vec::new(),
                    },
                )
            })
            .collect();

        Self {
            tables: RwLock::new(tables),
            static_methods: HashMap::new(),
            instance_methods: HashMap::new(),
        }
    }

    pub fn with_static_method(
        mut self,
        entity: &str,
        name: &str,
        f: impl Fn(Vec<Value>) -> StoreResult<Value> + Send + Sync + 'static,
    ) -> Self {
        self.static_methods
            .insert((entity.to_string(), name.to_string()), Arc::new(f));
        self
    }

    pub fn with_instance_method(
        mut self,
        entity: &str,
        name: &str,
        f: impl Fn(&Record, Vec<Value>) -> StoreResult<Value> + Send + Sync + 'static,
    ) -> Self {
        self.instance_methods
            .insert((entity.to_string(), name.to_string()), Arc::new(f));
        self
    }

    /// Rows matching `where`, ordered by `order`, before offset/limit
    async fn select(&self, entity: &str, options: &FindOptions) -> StoreResult<Vec<Record>> {
        let tables = self.tables.read().await;
        let table = tables
            .get(entity)
            .ok_or_else(|| StoreError::UnknownEntity(entity.to_string()))?;

        let mut rows: Vec<&Map<String, Value>> = table
            .rows
            .iter()
            .filter(|row| matches_where(row, options.get("where")))
            .collect();

        if let Some(order) = options.get("order") {
            let keys = order_keys(order);
            rows.sort_by(|a, b| {
                for (field, descending) in &keys {
                    let ordering = compare_values(
                        a.get(field).unwrap_or(&Value::Null),
                        b.get(field).unwrap_or(&Value::Null),
                    );
                    let ordering = if *descending { ordering.reverse() } else { ordering };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| Record::new(entity, row.clone()))
            .collect())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_by_id(
        &self,
        entity: &str,
        id: &Value,
        options: &FindOptions,
    ) -> StoreResult<Option<Record>> {
        let primary_key = {
            let tables = self.tables.read().await;
            tables
                .get(entity)
                .map(|t| t.primary_key.clone())
                .ok_or_else(|| StoreError::UnknownEntity(entity.to_string()))?
        };
        let rows = self.select(entity, options).await?;
        Ok(rows
            .into_iter()
            .find(|r| r.get(&primary_key).is_some_and(|v| loose_eq(v, id))))
    }

    async fn find_one(&self, entity: &str, options: &FindOptions) -> StoreResult<Option<Record>> {
        let rows = self.select(entity, options).await?;
        let offset = read_usize(options, "offset").unwrap_or(0);
        Ok(rows.into_iter().nth(offset))
    }

    async fn find_and_count(
        &self,
        entity: &str,
        options: &FindOptions,
    ) -> StoreResult<FindAndCount> {
        let rows = self.select(entity, options).await?;
        let count = rows.len() as u64;
        let offset = read_usize(options, "offset").unwrap_or(0);
        let limit = read_usize(options, "limit").unwrap_or(usize::MAX);
        Ok(FindAndCount {
            rows: rows.into_iter().skip(offset).take(limit).collect(),
            count,
        })
    }

    async fn create(&self, entity: &str, data: Value) -> StoreResult<Record> {
        let mut values = match data {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(StoreError::Constraint(format!(
                    "{} data must be an object, got {}",
                    entity, other
                )))
            }
        };

        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(entity)
            .ok_or_else(|| StoreError::UnknownEntity(entity.to_string()))?;

        let explicit_id = values
            .get(&table.primary_key)
            .filter(|id| !id.is_null())
            .cloned();
        match explicit_id {
            Some(id) => {
                if table
                    .rows
                    .iter()
                    .any(|row| row.get(&table.primary_key).is_some_and(|v| loose_eq(v, &id)))
                {
                    return Err(StoreError::Constraint(format!(
                        "{} with {} {} already exists",
                        entity,
                        table.primary_key,
                        id_to_string(&id)
                    )));
                }
                if let Some(n) = id.as_i64() {
                    table.next_id = table.next_id.max(n.saturating_add(1));
                }
            }
            None => {
                let id = Value::from(table.next_id);
                // next_id saturates at i64::MAX, which may already be taken
                if table
                    .rows
                    .iter()
                    .any(|row| row.get(&table.primary_key).is_some_and(|v| loose_eq(v, &id)))
                {
                    return Err(StoreError::Constraint(format!(
                        "{} has no {} values left to assign",
                        entity, table.primary_key
                    )));
                }
                values.insert(table.primary_key.clone(), id);
                table.next_id = table.next_id.saturating_add(1);
            }
        }

        if table.timestamps {
            let now = Value::String(chrono::Utc::now().to_rfc3339());
            values.entry("createdAt").or_insert_with(|| now.clone());
            values.entry("updatedAt").or_insert(now);
        }

        table.rows.push(values.clone());
        Ok(Record::new(entity, values))
    }

    async fn update(&self, record: Record, data: Value) -> StoreResult<Record> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&record.entity)
            .ok_or_else(|| StoreError::UnknownEntity(record.entity.clone()))?;

        let id = record.get(&table.primary_key).cloned().unwrap_or(Value::Null);
        let primary_key = table.primary_key.clone();
        let timestamps = table.timestamps;
        let row = table
            .rows
            .iter_mut()
            .find(|row| row.get(&primary_key).is_some_and(|v| loose_eq(v, &id)))
            .ok_or_else(|| StoreError::NotFound {
                entity: record.entity.clone(),
                id: id_to_string(&id),
            })?;

        if let Value::Object(changes) = data {
            for (key, value) in changes {
                if key != primary_key {
                    row.insert(key, value);
                }
            }
        }
        if timestamps {
            row.insert(
                "updatedAt".to_string(),
                Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }

        Ok(Record::new(record.entity, row.clone()))
    }

    async fn destroy(&self, record: Record, _options: Option<Value>) -> StoreResult<Record> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&record.entity)
            .ok_or_else(|| StoreError::UnknownEntity(record.entity.clone()))?;

        let id = record.get(&table.primary_key).cloned().unwrap_or(Value::Null);
        let position = table
            .rows
            .iter()
            .position(|row| row.get(&table.primary_key).is_some_and(|v| loose_eq(v, &id)))
            .ok_or_else(|| StoreError::NotFound {
                entity: record.entity.clone(),
                id: id_to_string(&id),
            })?;

        let removed = table.rows.remove(position);
        Ok(Record::new(record.entity, removed))
    }

    async fn call_static(
        &self,
        entity: &str,
        method: &str,
        params: Vec<Value>,
    ) -> StoreResult<Value> {
        let f = self
            .static_methods
            .get(&(entity.to_string(), method.to_string()))
            .ok_or_else(|| StoreError::UnknownMethod {
                entity: entity.to_string(),
                method: method.to_string(),
            })?;
        f(params)
    }

    async fn call_instance(
        &self,
        record: Record,
        method: &str,
        params: Vec<Value>,
    ) -> StoreResult<Value> {
        let f = self
            .instance_methods
            .get(&(record.entity.clone(), method.to_string()))
            .ok_or_else(|| StoreError::UnknownMethod {
                entity: record.entity.clone(),
                method: method.to_string(),
            })?;
        f(&record, params)
    }
}

/// Equality that treats `1` and `"1"` as the same key
fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_eq(x, y),
        (Value::String(_), Value::Number(_)) | (Value::Number(_), Value::String(_)) => {
            id_to_string(a) == id_to_string(b)
        }
        _ => a == b,
    }
}

/// Integers compare exactly; floats only when either side is one
fn numbers_eq(x: &Number, y: &Number) -> bool {
    if let (Some(p), Some(q)) = (x.as_i64(), y.as_i64()) {
        return p == q;
    }
    if let (Some(p), Some(q)) = (x.as_u64(), y.as_u64()) {
        return p == q;
    }
    if x.is_f64() || y.is_f64() {
        return x.as_f64() == y.as_f64();
    }
    // A negative i64 never equals a u64 above i64::MAX
    false
}

fn matches_where(row: &Map<String, Value>, clause: Option<&Value>) -> bool {
    let Some(Value::Object(clause)) = clause else {
        return true;
    };
    clause.iter().all(|(field, expected)| {
        let actual = row.get(field).unwrap_or(&Value::Null);
        match expected {
            Value::Array(candidates) => candidates.iter().any(|c| loose_eq(actual, c)),
            other => loose_eq(actual, other),
        }
    })
}

/// `order` is either a field name or a list of `[field, "ASC"|"DESC"]` pairs
fn order_keys(order: &Value) -> Vec<(String, bool)> {
    match order {
        Value::String(field) => vec![(field.clone(), false)],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(field) => Some((field.clone(), false)),
                Value::Array(pair) => {
                    let field = pair.first()?.as_str()?.to_string();
                    let descending = pair
                        .get(1)
                        .and_then(|d| d.as_str())
                        .is_some_and(|d| d.eq_ignore_ascii_case("DESC"));
                    Some((field, descending))
                }
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn read_usize(options: &FindOptions, key: &str) -> Option<usize> {
    options.get(key).and_then(|v| v.as_u64()).map(|n| n as usize)
}
