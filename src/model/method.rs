/// Custom method descriptors
///
/// Entities may declare static or instance methods that are exposed in the
/// generated schema. Each method lists the parameters it accepts, what it
/// returns, and optional exposure options.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A custom method declared on an entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,

    #[serde(default, alias = "isStatic")]
    pub is_static: bool,

    #[serde(default)]
    pub accepts: Vec<MethodAccept>,

    #[serde(default)]
    pub returns: Vec<MethodReturn>,

    /// Structured exposure options
    #[serde(default, alias = "graphQL", skip_serializing_if = "Option::is_none")]
    pub graphql: Option<MethodOptions>,

    /// Free-form notes; a JSON string or table carrying a `graphQL` key is
    /// read as exposure options when `graphql` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Value>,
}

/// Exposure options for a method
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodOptions {
    /// Explicit field name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Attach to the entity's own object type instead of `Mutation`
    #[serde(default, alias = "asProperty")]
    pub as_property: bool,

    /// Prefix with the singular (true) or plural (false) type name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singular: Option<bool>,

    /// Explicit return type
    #[serde(default, alias = "returnType", skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
}

/// Declared type of an accepted parameter: a single type name, or a
/// one-element array meaning "list of"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AcceptType {
    Single(String),
    List(Vec<String>),
}

impl Default for AcceptType {
    fn default() -> Self {
        AcceptType::Single("any".to_string())
    }
}

/// One accepted parameter of a method
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodAccept {
    pub arg: String,

    #[serde(rename = "type", default)]
    pub ty: AcceptType,

    #[serde(default, alias = "graphQL")]
    pub graphql: AcceptOptions,
}

/// Per-parameter exposure options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AcceptOptions {
    /// Exposed argument name
    #[serde(default, alias = "gqlName", skip_serializing_if = "Option::is_none")]
    pub gql_name: Option<String>,

    /// Exposed argument type, used verbatim
    #[serde(default, alias = "gqlType", skip_serializing_if = "Option::is_none")]
    pub gql_type: Option<String>,

    /// Drop from the exposed argument list
    #[serde(default)]
    pub omit: bool,

    /// Take the value from the resolved parent object
    #[serde(default, alias = "fromRoot", skip_serializing_if = "Option::is_none")]
    pub from_root: Option<FromRoot>,

    /// Pass the whole request context
    #[serde(default, alias = "fromContext")]
    pub from_context: bool,
}

/// Closure reading a parameter value from the parent object
#[derive(Clone)]
pub struct RootFn(pub Arc<dyn Fn(&Value) -> Value + Send + Sync>);

impl RootFn {
    pub fn new(f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        RootFn(Arc::new(f))
    }
}

impl fmt::Debug for RootFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RootFn(..)")
    }
}

/// Raw `from_root` setting as written in configuration
///
/// `Flag(true)` reads the parameter's own name from the parent, `Path` reads
/// a dotted path, `Func` runs a closure (builder API only). Anything else is
/// kept in `Other` and rejected during generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FromRoot {
    Flag(bool),
    Path(String),
    #[serde(skip)]
    Func(RootFn),
    Other(Value),
}

/// One declared return value of a method
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MethodReturn {
    /// The value is the resolved root object
    #[serde(default)]
    pub root: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,

    #[serde(rename = "type", default)]
    pub ty: String,
}

impl MethodDescriptor {
    /// Resolve exposure options from `graphql`, falling back to `notes`
    ///
    /// Notes that cannot be parsed yield default options.
    pub fn options(&self) -> MethodOptions {
        if let Some(options) = &self.graphql {
            return options.clone();
        }

        let notes = match &self.notes {
            None => return MethodOptions::default(),
            Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!(
                        "Ignoring unparsable notes on method '{}': {}",
                        self.name,
                        e
                    );
                    return MethodOptions::default();
                }
            },
            Some(other) => other.clone(),
        };

        match notes.get("graphQL").or_else(|| notes.get("graphql")) {
            Some(options) => serde_json::from_value(options.clone()).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed options on method '{}': {}", self.name, e);
                MethodOptions::default()
            }),
            None => MethodOptions::default(),
        }
    }
}
