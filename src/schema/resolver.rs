/// GraphQL resolvers for generated fields
///
/// This module provides the resolver closures attached to generated fields:
/// - single-record and paginated collection lookups
/// - association traversal (belongs-to, has-one, has-many, belongs-to-many)
/// - create / update / delete mutations
/// - custom method invocation with argument extraction
///
/// A resolver is a four-argument function `(parent, args, context, info)`
/// returning a future. Store errors pass through untouched.

use crate::model::{Association, Entity, MethodDescriptor, ModelRegistry, RootFn};
use crate::schema::cursor::CursorStyle;
use crate::store::{id_to_string, FindOptions, Record, Store, StoreError, StoreResult};

use futures::future::{BoxFuture, FutureExt};
use heck::ToLowerCamelCase;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::future::Future;
use std::sync::Arc;

/// Field arguments as plain JSON
pub type Args = Map<String, Value>;

pub type ResolverFuture = BoxFuture<'static, StoreResult<Resolved>>;

/// `(parent, args, context, info) -> future`
pub type Resolver =
    Arc<dyn Fn(Resolved, Args, Arc<RequestContext>, FieldInfo) -> ResolverFuture + Send + Sync>;

/// Wrap an async closure as a `Resolver`
pub fn resolver<F, Fut>(f: F) -> Resolver
where
    F: Fn(Resolved, Args, Arc<RequestContext>, FieldInfo) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = StoreResult<Resolved>> + Send + 'static,
{
    Arc::new(move |parent, args, context, info| f(parent, args, context, info).boxed())
}

/// Per-request context handed to resolvers (caller identity, headers, ...)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    value: Value,
}

impl RequestContext {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }
}

/// Which field is being resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub parent_type: String,
    pub field_name: String,
}

impl FieldInfo {
    pub fn new(parent_type: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            parent_type: parent_type.into(),
            field_name: field_name.into(),
        }
    }
}

/// Composite result of a collection lookup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub first: Option<Record>,
    pub last: Option<Record>,
    pub list: Vec<Record>,
    pub count: u64,
    pub offset: u64,
}

/// Value produced by a resolver and passed as `parent` to nested fields
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Resolved {
    #[default]
    Null,
    Value(Value),
    Record(Record),
    List(Vec<Resolved>),
    Page(Page),
    Object(IndexMap<String, Resolved>),
}

impl Resolved {
    pub fn is_null(&self) -> bool {
        matches!(self, Resolved::Null | Resolved::Value(Value::Null))
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Resolved::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Default field resolution: read `name` off the parent
    pub fn field(&self, name: &str) -> Resolved {
        match self {
            Resolved::Record(record) => record
                .get(name)
                .cloned()
                .map(Resolved::Value)
                .unwrap_or_default(),
            Resolved::Value(Value::Object(map)) => {
                map.get(name).cloned().map(Resolved::Value).unwrap_or_default()
            }
            Resolved::Object(map) => map.get(name).cloned().unwrap_or_default(),
            _ => Resolved::Null,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Resolved::Null => Value::Null,
            Resolved::Value(value) => value.clone(),
            Resolved::Record(record) => record.to_json(),
            Resolved::List(items) => Value::Array(items.iter().map(Resolved::to_json).collect()),
            Resolved::Page(page) => json!({
                "first": page.first.as_ref().map(Record::to_json),
                "last": page.last.as_ref().map(Record::to_json),
                "list": page.list.iter().map(Record::to_json).collect::<Vec<_>>(),
                "count": page.count,
            }),
            Resolved::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<Option<Record>> for Resolved {
    fn from(record: Option<Record>) -> Self {
        record.map(Resolved::Record).unwrap_or_default()
    }
}

/// Copy the `filter` argument key-by-key into store query options
pub fn args_to_find_options(args: &Args) -> FindOptions {
    match args.get("filter") {
        Some(Value::Object(filter)) => filter.clone(),
        _ => FindOptions::new(),
    }
}

/// Merge `where: {key: value}` into the options; the injected key wins
fn inject_where(options: &mut FindOptions, key: &str, value: Value) {
    match options.get_mut("where") {
        Some(Value::Object(clause)) => {
            clause.insert(key.to_string(), value);
        }
        _ => {
            let mut clause = Map::new();
            clause.insert(key.to_string(), value);
            options.insert("where".to_string(), Value::Object(clause));
        }
    }
}

/// Run the first / last / counted-page reads concurrently
///
/// First and last use the options without `offset`; the page uses them as
/// given. Any failure fails the whole lookup.
pub async fn find_page(store: &dyn Store, entity: &str, options: FindOptions) -> StoreResult<Page> {
    let mut edge_options = options.clone();
    edge_options.remove("offset");

    let (first, last, counted) = futures::try_join!(
        store.find_one(entity, &edge_options),
        store.find_one(entity, &edge_options),
        store.find_and_count(entity, &options),
    )?;

    Ok(Page {
        first,
        last,
        list: counted.rows,
        count: counted.count,
        offset: options.get("offset").and_then(Value::as_u64).unwrap_or(0),
    })
}

/// Where a method argument comes from at call time
#[derive(Debug, Clone)]
pub enum ArgExtractor {
    /// A GraphQL argument of this name
    FromArg(String),
    /// The parent object
    FromRoot(RootSource),
    /// The whole request context
    FromContext,
}

/// How a root-extracted argument reads the parent object
#[derive(Debug, Clone)]
pub enum RootSource {
    /// Attribute with the parameter's own name
    Attribute(String),
    /// Dotted path into the parent
    Path(String),
    Func(RootFn),
}

impl ArgExtractor {
    pub fn extract(&self, parent: &Resolved, args: &Args, context: &RequestContext) -> Value {
        match self {
            ArgExtractor::FromArg(name) => match args.get(name) {
                // Hand the store a fresh plain map rather than the engine's value
                Some(Value::Object(map)) => Value::Object(map.clone()),
                Some(other) => other.clone(),
                None => Value::Null,
            },
            ArgExtractor::FromRoot(RootSource::Attribute(name)) => parent.field(name).to_json(),
            ArgExtractor::FromRoot(RootSource::Path(path)) => {
                let root = parent.to_json();
                path.split('.')
                    .try_fold(&root, |value, key| value.get(key))
                    .cloned()
                    .unwrap_or(Value::Null)
            }
            ArgExtractor::FromRoot(RootSource::Func(f)) => (f.0)(&parent.to_json()),
            ArgExtractor::FromContext => context.as_value().clone(),
        }
    }
}

/// Build the positional parameter list of a method call
pub fn build_params(
    extractors: &[ArgExtractor],
    parent: &Resolved,
    args: &Args,
    context: &RequestContext,
) -> Vec<Value> {
    extractors
        .iter()
        .map(|extractor| extractor.extract(parent, args, context))
        .collect()
}

/// Produces resolvers bound to one store
#[derive(Clone)]
pub struct ResolverFactory {
    store: Arc<dyn Store>,
    registry: Arc<ModelRegistry>,
    cursor_style: CursorStyle,
}

impl ResolverFactory {
    pub fn new(store: Arc<dyn Store>, registry: Arc<ModelRegistry>) -> Self {
        Self {
            store,
            registry,
            cursor_style: CursorStyle::default(),
        }
    }

    /// Namespace convention for `edges` and `pageInfo` cursors
    pub fn with_cursor_style(mut self, cursor_style: CursorStyle) -> Self {
        self.cursor_style = cursor_style;
        self
    }

    pub fn store(&self) -> Arc<dyn Store> {
        Arc::clone(&self.store)
    }

    fn primary_key(&self, entity: &str) -> String {
        self.registry
            .get(entity)
            .map(|e| e.primary_key.clone())
            .unwrap_or_else(|| "id".to_string())
    }

    /// Look up by `id` when given, otherwise the first record matching `filter`
    pub fn find_one(&self, entity: &Entity) -> Resolver {
        let store = self.store();
        let name = entity.name.clone();
        resolver(move |_parent, args, _context, _info| {
            let store = Arc::clone(&store);
            let name = name.clone();
            async move {
                let options = args_to_find_options(&args);
                let record = match args.get("id") {
                    Some(id) if !id.is_null() => store.find_by_id(&name, id, &options).await?,
                    _ => store.find_one(&name, &options).await?,
                };
                Ok(record.into())
            }
        })
    }

    /// Paginated lookup returning a `Page`
    pub fn find_all(&self, entity: &str) -> Resolver {
        let store = self.store();
        let name = entity.to_string();
        resolver(move |_parent, args, _context, _info| {
            let store = Arc::clone(&store);
            let name = name.clone();
            async move {
                let page = find_page(store.as_ref(), &name, args_to_find_options(&args)).await?;
                Ok(Resolved::Page(page))
            }
        })
    }

    /// Target record whose primary key is the parent's foreign key
    pub fn belongs_to(&self, association: &Association) -> Resolver {
        let store = self.store();
        let target = association.target.clone();
        let foreign_key = association.foreign_key.clone();
        resolver(move |parent, _args, _context, _info| {
            let store = Arc::clone(&store);
            let target = target.clone();
            let foreign_key = foreign_key.clone();
            async move {
                match parent.field(&foreign_key).to_json() {
                    Value::Null => Ok(Resolved::Null),
                    id => Ok(store.find_by_id(&target, &id, &FindOptions::new()).await?.into()),
                }
            }
        })
    }

    /// First target record whose foreign key is the parent's primary key
    pub fn has_one(&self, association: &Association) -> Resolver {
        let store = self.store();
        let target = association.target.clone();
        let foreign_key = association.foreign_key.clone();
        let source_key = self.primary_key(&association.source);
        resolver(move |parent, _args, _context, _info| {
            let store = Arc::clone(&store);
            let target = target.clone();
            let foreign_key = foreign_key.clone();
            let owner = parent.field(&source_key).to_json();
            async move {
                if owner.is_null() {
                    return Ok(Resolved::Null);
                }
                let mut options = FindOptions::new();
                inject_where(&mut options, &foreign_key, owner);
                Ok(store.find_one(&target, &options).await?.into())
            }
        })
    }

    /// Collection lookup restricted to records owned by the parent
    pub fn has_many(&self, association: &Association) -> Resolver {
        let store = self.store();
        let target = association.target.clone();
        let foreign_key = association.foreign_key.clone();
        let source_key = self.primary_key(&association.source);
        resolver(move |parent, args, _context, _info| {
            let store = Arc::clone(&store);
            let target = target.clone();
            let foreign_key = foreign_key.clone();
            let owner = parent.field(&source_key).to_json();
            async move {
                let mut options = args_to_find_options(&args);
                inject_where(&mut options, &foreign_key, owner);
                Ok(Resolved::Page(find_page(store.as_ref(), &target, options).await?))
            }
        })
    }

    /// Collection lookup through a join entity
    ///
    /// Without a `through` entity there is nothing to join on and the
    /// result is an empty page.
    pub fn belongs_to_many(&self, association: &Association) -> Resolver {
        let store = self.store();
        let target = association.target.clone();
        let foreign_key = association.foreign_key.clone();
        let through = association.through.clone();
        let other_key = association
            .other_key
            .clone()
            .unwrap_or_else(|| format!("{}Id", target.to_lower_camel_case()));
        let source_key = self.primary_key(&association.source);
        let target_key = self.primary_key(&association.target);
        resolver(move |parent, args, _context, _info| {
            let store = Arc::clone(&store);
            let target = target.clone();
            let foreign_key = foreign_key.clone();
            let through = through.clone();
            let other_key = other_key.clone();
            let target_key = target_key.clone();
            let owner = parent.field(&source_key).to_json();
            async move {
                let Some(through) = through else {
                    return Ok(Resolved::Page(Page::default()));
                };

                let mut link_options = FindOptions::new();
                inject_where(&mut link_options, &foreign_key, owner);
                let links = store.find_and_count(&through, &link_options).await?;
                let ids: Vec<Value> = links
                    .rows
                    .iter()
                    .filter_map(|link| link.get(&other_key).cloned())
                    .collect();

                let mut options = args_to_find_options(&args);
                inject_where(&mut options, &target_key, Value::Array(ids));
                Ok(Resolved::Page(find_page(store.as_ref(), &target, options).await?))
            }
        })
    }

    pub fn create(&self, entity: &str) -> Resolver {
        let store = self.store();
        let name = entity.to_string();
        resolver(move |_parent, args, _context, _info| {
            let store = Arc::clone(&store);
            let name = name.clone();
            async move {
                let data = args.get("data").cloned().unwrap_or(Value::Null);
                Ok(Resolved::Record(store.create(&name, data).await?))
            }
        })
    }

    pub fn update(&self, entity: &str) -> Resolver {
        let store = self.store();
        let name = entity.to_string();
        resolver(move |_parent, args, _context, _info| {
            let store = Arc::clone(&store);
            let name = name.clone();
            async move {
                let record = load_by_id_arg(store.as_ref(), &name, &args).await?;
                let data = args.get("data").cloned().unwrap_or(Value::Null);
                Ok(Resolved::Record(store.update(record, data).await?))
            }
        })
    }

    pub fn delete(&self, entity: &str) -> Resolver {
        let store = self.store();
        let name = entity.to_string();
        resolver(move |_parent, args, _context, _info| {
            let store = Arc::clone(&store);
            let name = name.clone();
            async move {
                let record = load_by_id_arg(store.as_ref(), &name, &args).await?;
                let options = args.get("data").cloned();
                Ok(Resolved::Record(store.destroy(record, options).await?))
            }
        })
    }

    /// Invoke a custom method with parameters built from `extractors`
    ///
    /// Static methods are called on the entity. Instance methods run on the
    /// parent record, or on the record named by the `id` argument when the
    /// field hangs off a root type; a parent of another entity yields null.
    pub fn method(
        &self,
        entity: &str,
        method: &MethodDescriptor,
        extractors: Vec<ArgExtractor>,
    ) -> Resolver {
        let store = self.store();
        let entity = entity.to_string();
        let method_name = method.name.clone();
        let is_static = method.is_static;
        let extractors = Arc::new(extractors);

        resolver(move |parent, args, context, _info| {
            let store = Arc::clone(&store);
            let entity = entity.clone();
            let method_name = method_name.clone();
            let extractors = Arc::clone(&extractors);
            async move {
                if is_static {
                    let params = build_params(&extractors, &parent, &args, &context);
                    let result = store.call_static(&entity, &method_name, params).await?;
                    return Ok(Resolved::Value(result));
                }

                let instance = match parent {
                    Resolved::Record(record) => {
                        if !record.is_instance_of(&entity) {
                            return Ok(Resolved::Null);
                        }
                        Some(record)
                    }
                    _ => match args.get("id") {
                        Some(id) if !id.is_null() => {
                            store.find_by_id(&entity, id, &FindOptions::new()).await?
                        }
                        _ => None,
                    },
                };
                let Some(instance) = instance else {
                    return Ok(Resolved::Null);
                };

                let root = Resolved::Record(instance.clone());
                let params = build_params(&extractors, &root, &args, &context);
                let result = store.call_instance(instance, &method_name, params).await?;
                Ok(Resolved::Value(result))
            }
        })
    }

    /// `pageInfo` of a connection
    pub fn page_info(&self, type_name: &str) -> Resolver {
        let namespace = self.cursor_style.namespace(type_name);
        let key = self.primary_key(type_name);
        resolver(move |parent, _args, _context, _info| {
            let result = match &parent {
                Resolved::Page(page) => {
                    let cursor = |record: &Option<Record>| {
                        record
                            .as_ref()
                            .map(|r| namespace.encode(&id_to_string(r.get(&key).unwrap_or(&Value::Null))))
                    };
                    Resolved::Value(json!({
                        "hasNextPage": page.offset + (page.list.len() as u64) < page.count,
                        "hasPreviousPage": page.offset > 0,
                        "startCursor": cursor(&page.first),
                        "endCursor": cursor(&page.last),
                    }))
                }
                _ => Resolved::Null,
            };
            futures::future::ready(Ok(result))
        })
    }

    /// `edges` of a connection: `{cursor, node}` per row
    pub fn edges(&self, type_name: &str) -> Resolver {
        let namespace = self.cursor_style.namespace(type_name);
        let key = self.primary_key(type_name);
        resolver(move |parent, _args, _context, _info| {
            let result = match &parent {
                Resolved::Page(page) => Resolved::List(
                    page.list
                        .iter()
                        .map(|record| {
                            let id = id_to_string(record.get(&key).unwrap_or(&Value::Null));
                            let mut edge = IndexMap::new();
                            edge.insert(
                                "cursor".to_string(),
                                Resolved::Value(Value::String(namespace.encode(&id))),
                            );
                            edge.insert("node".to_string(), Resolved::Record(record.clone()));
                            Resolved::Object(edge)
                        })
                        .collect(),
                ),
                _ => Resolved::List(Vec::new()),
            };
            futures::future::ready(Ok(result))
        })
    }

    /// `totalCount` of a connection
    pub fn total_count(&self) -> Resolver {
        resolver(|parent, _args, _context, _info| {
            let result = match &parent {
                Resolved::Page(page) => Resolved::Value(Value::from(page.count)),
                _ => Resolved::Null,
            };
            futures::future::ready(Ok(result))
        })
    }

    /// Plain list of a connection's rows
    pub fn page_rows(&self) -> Resolver {
        resolver(|parent, _args, _context, _info| {
            let result = match parent {
                Resolved::Page(page) => {
                    Resolved::List(page.list.into_iter().map(Resolved::Record).collect())
                }
                _ => Resolved::List(Vec::new()),
            };
            futures::future::ready(Ok(result))
        })
    }
}

/// Load the record named by the `id` argument; a missing record is a
/// `NotFound` store error
async fn load_by_id_arg(store: &dyn Store, entity: &str, args: &Args) -> StoreResult<Record> {
    let id = args.get("id").cloned().unwrap_or(Value::Null);
    store
        .find_by_id(entity, &id, &FindOptions::new())
        .await?
        .ok_or_else(|| StoreError::NotFound {
            entity: entity.to_string(),
            id: id_to_string(&id),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssociationKind, EntityConfig};
    use crate::schema::cursor::{CursorNamespace, GLOBAL_PREFIX};
    use crate::store::FindAndCount;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Store that records every call and answers from canned rows
    #[derive(Default)]
    struct RecordingStore {
        calls: Mutex<Vec<(String, FindOptions)>>,
        rows: Vec<Record>,
        fail_count: bool,
    }

    impl RecordingStore {
        fn with_rows(rows: Vec<Record>) -> Self {
            Self {
                rows,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<(String, FindOptions)> {
            self.calls.lock().unwrap().clone()
        }

        fn log(&self, op: &str, options: &FindOptions) {
            self.calls.lock().unwrap().push((op.to_string(), options.clone()));
        }
    }

    #[async_trait]
    impl Store for RecordingStore {
        async fn find_by_id(
            &self,
            _entity: &str,
            id: &Value,
            options: &FindOptions,
        ) -> StoreResult<Option<Record>> {
            self.log("find_by_id", options);
            Ok(self
                .rows
                .iter()
                .find(|r| r.get("id").map(id_to_string) == Some(id_to_string(id)))
                .cloned())
        }

        async fn find_one(&self, _entity: &str, options: &FindOptions) -> StoreResult<Option<Record>> {
            self.log("find_one", options);
            Ok(self.rows.first().cloned())
        }

        async fn find_and_count(
            &self,
            _entity: &str,
            options: &FindOptions,
        ) -> StoreResult<FindAndCount> {
            self.log("find_and_count", options);
            if self.fail_count {
                return Err(StoreError::Backend("connection lost".to_string()));
            }
            Ok(FindAndCount {
                rows: self.rows.clone(),
                count: self.rows.len() as u64,
            })
        }

        async fn create(&self, entity: &str, data: Value) -> StoreResult<Record> {
            Ok(Record::new(entity, data.as_object().cloned().unwrap_or_default()))
        }

        async fn update(&self, mut record: Record, data: Value) -> StoreResult<Record> {
            if let Value::Object(changes) = data {
                record.values.extend(changes);
            }
            Ok(record)
        }

        async fn destroy(&self, record: Record, _options: Option<Value>) -> StoreResult<Record> {
            Ok(record)
        }

        async fn call_static(
            &self,
            entity: &str,
            method: &str,
            params: Vec<Value>,
        ) -> StoreResult<Value> {
            Ok(json!({ "entity": entity, "method": method, "params": params }))
        }

        async fn call_instance(
            &self,
            record: Record,
            method: &str,
            params: Vec<Value>,
        ) -> StoreResult<Value> {
            Ok(json!({ "id": record.get("id"), "method": method, "params": params }))
        }
    }

    fn record(entity: &str, values: Value) -> Record {
        Record::new(entity, values.as_object().unwrap().clone())
    }

    fn args(value: Value) -> Args {
        value.as_object().unwrap().clone()
    }

    fn registry() -> Arc<ModelRegistry> {
        Arc::new(
            ModelRegistry::from_configs(&[
                EntityConfig::new("Customer")
                    .attribute("name", "STRING")
                    .association(AssociationKind::HasMany, "Machine"),
                EntityConfig::new("Machine").attribute("model", "STRING"),
            ])
            .unwrap(),
        )
    }

    fn factory(store: Arc<RecordingStore>) -> ResolverFactory {
        ResolverFactory::new(store, registry())
    }

    async fn call(resolver: &Resolver, parent: Resolved, args: Args) -> StoreResult<Resolved> {
        resolver(
            parent,
            args,
            Arc::new(RequestContext::default()),
            FieldInfo::new("Query", "test"),
        )
        .await
    }

    #[tokio::test]
    async fn test_collection_strips_offset_from_first_and_last() {
        let store = Arc::new(RecordingStore::default());
        let resolver = factory(Arc::clone(&store)).find_all("Machine");

        call(&resolver, Resolved::Null, args(json!({"filter": {"where": {"x": 1}, "offset": 5}})))
            .await
            .unwrap();

        let calls = store.calls();
        assert_eq!(calls.len(), 3);
        let stripped = args(json!({"where": {"x": 1}}));
        let full = args(json!({"where": {"x": 1}, "offset": 5}));
        for (op, options) in &calls {
            match op.as_str() {
                "find_one" => assert_eq!(options, &stripped),
                "find_and_count" => assert_eq!(options, &full),
                other => panic!("unexpected call {}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_collection_fails_as_a_whole() {
        let store = Arc::new(RecordingStore {
            fail_count: true,
            rows: vec![record("Machine", json!({"id": 1}))],
            ..Default::default()
        });
        let resolver = factory(store).find_all("Machine");
        let err = call(&resolver, Resolved::Null, Args::new()).await.unwrap_err();
        assert_eq!(err, StoreError::Backend("connection lost".to_string()));
    }

    #[tokio::test]
    async fn test_has_many_injects_ownership_filter() {
        let store = Arc::new(RecordingStore::default());
        let registry = registry();
        let association = registry.get("Customer").unwrap().associations["machines"].clone();
        let resolver = ResolverFactory::new(Arc::clone(&store) as Arc<dyn Store>, registry)
            .has_many(&association);

        let parent = Resolved::Record(record("Customer", json!({"id": 42})));
        call(
            &resolver,
            parent,
            args(json!({"filter": {"where": {"model": "X40", "customerId": 7}, "limit": 2}})),
        )
        .await
        .unwrap();

        let (_, options) = store
            .calls()
            .into_iter()
            .find(|(op, _)| op == "find_and_count")
            .unwrap();
        assert_eq!(
            options,
            args(json!({"where": {"model": "X40", "customerId": 42}, "limit": 2}))
        );
    }

    #[tokio::test]
    async fn test_find_one_prefers_id() {
        let store = Arc::new(RecordingStore::with_rows(vec![
            record("Machine", json!({"id": 1, "model": "X40"})),
            record("Machine", json!({"id": 2, "model": "X50"})),
        ]));
        let registry = registry();
        let resolver = ResolverFactory::new(Arc::clone(&store) as Arc<dyn Store>, Arc::clone(&registry))
            .find_one(registry.get("Machine").unwrap());

        let by_id = call(&resolver, Resolved::Null, args(json!({"id": "2"}))).await.unwrap();
        assert_eq!(by_id.field("model").to_json(), json!("X50"));

        let by_filter = call(&resolver, Resolved::Null, args(json!({"id": null}))).await.unwrap();
        assert_eq!(by_filter.field("model").to_json(), json!("X40"));
        assert_eq!(store.calls().last().unwrap().0, "find_one");
    }

    #[tokio::test]
    async fn test_update_of_missing_record_is_not_found() {
        let store = Arc::new(RecordingStore::default());
        let resolver = factory(store).update("Machine");
        let err = call(&resolver, Resolved::Null, args(json!({"id": "9", "data": {}})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_static_method_receives_extracted_params() {
        let store = Arc::new(RecordingStore::default());
        let method: MethodDescriptor = serde_json::from_value(json!({
            "name": "login", "isStatic": true,
            "accepts": [{"arg": "credentials", "type": "object"}]
        }))
        .unwrap();
        let resolver = factory(store).method(
            "User",
            &method,
            vec![ArgExtractor::FromArg("credentials".to_string()), ArgExtractor::FromContext],
        );

        let result = resolver(
            Resolved::Null,
            args(json!({"credentials": {"user": "a"}})),
            Arc::new(RequestContext::new(json!({"token": "t"}))),
            FieldInfo::new("Mutation", "UserLogin"),
        )
        .await
        .unwrap();

        assert_eq!(
            result.to_json(),
            json!({"entity": "User", "method": "login", "params": [{"user": "a"}, {"token": "t"}]})
        );
    }

    #[tokio::test]
    async fn test_instance_method_type_checks_parent() {
        let store = Arc::new(RecordingStore::default());
        let method: MethodDescriptor =
            serde_json::from_value(json!({"name": "label", "isStatic": false})).unwrap();
        let resolver = factory(store).method("Machine", &method, vec![]);

        let wrong = Resolved::Record(record("Customer", json!({"id": 1})));
        assert_eq!(call(&resolver, wrong, Args::new()).await.unwrap(), Resolved::Null);

        let right = Resolved::Record(record("Machine", json!({"id": 3})));
        let result = call(&resolver, right, Args::new()).await.unwrap();
        assert_eq!(result.to_json()["id"], json!(3));
    }

    #[test]
    fn test_root_extractors() {
        let parent = Resolved::Record(record("Machine", json!({"id": 3, "owner": {"name": "Apple"}})));
        let context = RequestContext::default();

        let by_name = ArgExtractor::FromRoot(RootSource::Attribute("id".to_string()));
        assert_eq!(by_name.extract(&parent, &Args::new(), &context), json!(3));

        let by_path = ArgExtractor::FromRoot(RootSource::Path("owner.name".to_string()));
        assert_eq!(by_path.extract(&parent, &Args::new(), &context), json!("Apple"));

        let by_fn = ArgExtractor::FromRoot(RootSource::Func(RootFn::new(|root| root["id"].clone())));
        assert_eq!(by_fn.extract(&parent, &Args::new(), &context), json!(3));
    }

    #[tokio::test]
    async fn test_page_info_and_edges() {
        let registry = registry();
        let factory = ResolverFactory::new(Arc::new(RecordingStore::default()), registry);
        let page = Page {
            first: Some(record("Machine", json!({"id": 1}))),
            last: Some(record("Machine", json!({"id": 4}))),
            list: vec![record("Machine", json!({"id": 2})), record("Machine", json!({"id": 3}))],
            count: 4,
            offset: 1,
        };

        let info = call(&factory.page_info("Machine"), Resolved::Page(page.clone()), Args::new())
            .await
            .unwrap()
            .to_json();
        assert_eq!(info["hasNextPage"], json!(true));
        assert_eq!(info["hasPreviousPage"], json!(true));
        assert_eq!(
            CursorNamespace::type_name("Machine")
                .decode(info["endCursor"].as_str().unwrap())
                .unwrap(),
            "4"
        );

        let edges = call(&factory.edges("Machine"), Resolved::Page(page), Args::new())
            .await
            .unwrap();
        let Resolved::List(edges) = edges else { panic!("expected list") };
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].field("node").field("id").to_json(), json!(2));
    }

    #[tokio::test]
    async fn test_global_cursor_style() {
        let factory = ResolverFactory::new(Arc::new(RecordingStore::default()), registry())
            .with_cursor_style(CursorStyle::Global);
        let page = Page {
            first: Some(record("Machine", json!({"id": 5}))),
            last: Some(record("Machine", json!({"id": 5}))),
            list: vec![record("Machine", json!({"id": 5}))],
            count: 1,
            offset: 0,
        };

        let info = call(&factory.page_info("Machine"), Resolved::Page(page.clone()), Args::new())
            .await
            .unwrap()
            .to_json();
        let start = info["startCursor"].as_str().unwrap();
        assert_eq!(start, CursorNamespace::Global.encode("5"));
        assert_eq!(crate::schema::cursor::decode(start, 0).unwrap(), format!("{}5", GLOBAL_PREFIX));

        let edges = call(&factory.edges("Machine"), Resolved::Page(page), Args::new())
            .await
            .unwrap();
        let Resolved::List(edges) = edges else { panic!("expected list") };
        assert_eq!(
            edges[0].field("cursor").to_json(),
            json!(CursorNamespace::Global.encode("5"))
        );
    }
}
