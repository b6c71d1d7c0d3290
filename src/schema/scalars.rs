/// Built-in `JSON` and `Date` scalars
///
/// `JSON` passes values through untouched and converts GraphQL literals
/// (strings, booleans, numbers, objects, lists) to plain JSON. `Date` parses
/// RFC 3339 / `YYYY-MM-DD` text or millisecond timestamps and serializes to a
/// millisecond timestamp.

use async_graphql::dynamic::Scalar;
use async_graphql::Value as ConstValue;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::{Map, Number, Value};
use std::sync::Arc;

/// Parse/serialize hooks of a scalar
pub trait ScalarResolver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Value supplied through variables
    fn parse_value(&self, value: Value) -> Value;

    /// Value sent to the client
    fn serialize(&self, value: &Value) -> Value;

    /// Value written inline in the query document
    fn parse_literal(&self, literal: &ConstValue) -> Value;

    /// Whether an input value is acceptable at all
    fn is_valid(&self, _literal: &ConstValue) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonScalar;

#[derive(Debug, Clone, Copy, Default)]
pub struct DateScalar;

/// Convert a GraphQL literal to JSON; integers stay integers
pub fn literal_to_json(literal: &ConstValue) -> Value {
    match literal {
        ConstValue::String(s) => Value::String(s.clone()),
        ConstValue::Boolean(b) => Value::Bool(*b),
        ConstValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        ConstValue::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, value)| (name.to_string(), literal_to_json(value)))
                .collect::<Map<_, _>>(),
        ),
        ConstValue::List(items) => Value::Array(items.iter().map(literal_to_json).collect()),
        _ => Value::Null,
    }
}

impl ScalarResolver for JsonScalar {
    fn name(&self) -> &'static str {
        "JSON"
    }

    fn parse_value(&self, value: Value) -> Value {
        value
    }

    fn serialize(&self, value: &Value) -> Value {
        value.clone()
    }

    fn parse_literal(&self, literal: &ConstValue) -> Value {
        literal_to_json(literal)
    }
}

impl DateScalar {
    /// Parse text or a millisecond timestamp into a UTC instant
    pub fn parse(value: &Value) -> Option<DateTime<Utc>> {
        match value {
            Value::String(text) => DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(text, "%Y-%m-%d")
                        .ok()
                        .and_then(|date| date.and_hms_opt(0, 0, 0))
                        .map(|naive| Utc.from_utc_datetime(&naive))
                }),
            Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
            _ => None,
        }
    }
}

impl ScalarResolver for DateScalar {
    fn name(&self) -> &'static str {
        "Date"
    }

    fn parse_value(&self, value: Value) -> Value {
        DateScalar::parse(&value)
            .map(|dt| Value::String(dt.to_rfc3339()))
            .unwrap_or(Value::Null)
    }

    fn serialize(&self, value: &Value) -> Value {
        DateScalar::parse(value)
            .map(|dt| Value::from(dt.timestamp_millis()))
            .unwrap_or(Value::Null)
    }

    fn parse_literal(&self, literal: &ConstValue) -> Value {
        match literal {
            ConstValue::Number(_) | ConstValue::String(_) => self.parse_value(literal_to_json(literal)),
            _ => Value::Null,
        }
    }

    fn is_valid(&self, literal: &ConstValue) -> bool {
        DateScalar::parse(&literal_to_json(literal)).is_some()
    }
}

/// Built-in scalar resolvers, keyed by their schema name
pub fn builtin_scalars() -> Vec<Arc<dyn ScalarResolver>> {
    vec![Arc::new(JsonScalar), Arc::new(DateScalar)]
}

/// Dynamic-schema registrations for the built-in scalars
pub fn register_custom_scalars() -> Vec<Scalar> {
    vec![json_scalar(), date_scalar()]
}

fn json_scalar() -> Scalar {
    Scalar::new("JSON").description("Arbitrary JSON value")
}

fn date_scalar() -> Scalar {
    Scalar::new("Date")
        .description("Instant as RFC 3339 text or milliseconds since the epoch")
        .validator(|value| DateScalar.is_valid(value))
}
