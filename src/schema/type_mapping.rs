/// Attribute to GraphQL type mapping
///
/// This module handles conversion of ORM attribute types to GraphQL scalar
/// types, including arrays (nested to any depth) and computed attributes.

use crate::error::{OrmGraphError, Result};
use crate::model::AttributeType;
use crate::schema::ast::TypeExpr;
use std::fmt;

pub const BOOLEAN: &str = "Boolean";
pub const INT: &str = "Int";
pub const FLOAT: &str = "Float";
pub const STRING: &str = "String";
pub const ID: &str = "ID";
pub const JSON: &str = "JSON";
pub const DATE: &str = "Date";

/// Scalars that never get an `Input` suffix
pub const KNOWN_SCALARS: [&str; 7] = [BOOLEAN, INT, FLOAT, STRING, ID, JSON, DATE];

pub fn is_known_scalar(name: &str) -> bool {
    KNOWN_SCALARS.contains(&name)
}

/// Base of a mapped type: a scalar name or another mapped type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseType {
    Scalar(&'static str),
    Nested(Box<MappedType>),
}

/// Result of mapping an attribute type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedType {
    pub base: BaseType,
    pub is_list: bool,
    /// Reserved; the mapper never marks a type required
    pub is_required: bool,
}

impl MappedType {
    fn scalar(name: &'static str) -> Self {
        Self {
            base: BaseType::Scalar(name),
            is_list: false,
            is_required: false,
        }
    }

    fn wrap(inner: MappedType, is_list: bool) -> Self {
        Self {
            base: BaseType::Nested(Box::new(inner)),
            is_list,
            is_required: false,
        }
    }

    /// Convert to the AST's type expression
    pub fn to_type_expr(&self) -> TypeExpr {
        let mut expr = match &self.base {
            BaseType::Scalar(name) => TypeExpr::named(*name),
            BaseType::Nested(inner) => inner.to_type_expr(),
        };
        if self.is_list {
            expr = TypeExpr::list(expr);
        }
        if self.is_required {
            expr = TypeExpr::non_null(expr);
        }
        expr
    }
}

impl fmt::Display for MappedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_type_expr())
    }
}

/// Map an attribute type to a GraphQL type
///
/// # Type Mapping Rules
///
/// - `BOOLEAN` → `Boolean`
/// - `FLOAT`, `DOUBLE`, `REAL` → `Float`
/// - `INTEGER`, `TINYINT`, `SMALLINT`, `MEDIUMINT` → `Int`
/// - `STRING`, `CHAR`, `TEXT`, `UUID`, `DATE`, `DATEONLY`, `TIME`, `BIGINT`, `DECIMAL` → `String`
/// - `ARRAY(T)` → `[T]`
/// - `VIRTUAL(T)` → `T`, bare `VIRTUAL` → `JSON`
///
/// # Errors
///
/// Any other tag fails with `UnsupportedType` naming the tag.
pub fn attribute_to_graphql_type(attribute_type: &AttributeType) -> Result<MappedType> {
    let mapped = match attribute_type {
        AttributeType::Boolean => MappedType::scalar(BOOLEAN),

        AttributeType::Float | AttributeType::Double | AttributeType::Real => {
            MappedType::scalar(FLOAT)
        }

        AttributeType::Integer
        | AttributeType::TinyInt
        | AttributeType::SmallInt
        | AttributeType::MediumInt => MappedType::scalar(INT),

        // 64-bit integers and decimals overflow GraphQL Int/Float, so they travel as text
        AttributeType::String
        | AttributeType::Char
        | AttributeType::Text
        | AttributeType::Uuid
        | AttributeType::Date
        | AttributeType::DateOnly
        | AttributeType::Time
        | AttributeType::BigInt
        | AttributeType::Decimal => MappedType::scalar(STRING),

        AttributeType::Array(element) => {
            MappedType::wrap(attribute_to_graphql_type(element)?, true)
        }

        AttributeType::Virtual(Some(return_type)) => {
            MappedType::wrap(attribute_to_graphql_type(return_type)?, false)
        }
        AttributeType::Virtual(None) => MappedType::scalar(JSON),

        AttributeType::Other(tag) => {
            return Err(OrmGraphError::UnsupportedType(tag.clone()));
        }
    };

    Ok(mapped)
}

/// Map an attribute type straight to its rendered form (`[String]`, `Int`, ...)
pub fn attribute_type_string(attribute_type: &AttributeType) -> Result<String> {
    Ok(attribute_to_graphql_type(attribute_type)?.to_string())
}
