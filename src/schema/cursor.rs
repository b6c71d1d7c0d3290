/// Opaque pagination cursors
///
/// A cursor is the base64 encoding of a namespace string followed by the
/// record identity. Decoding strips the namespace by length. Two namespace
/// conventions are in use and both are kept: a fixed global prefix and the
/// owning type's name.

use crate::error::{OrmGraphError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Namespace used by `CursorNamespace::Global`
pub const GLOBAL_PREFIX: &str = "PREFIX";

/// Namespace strategy of a cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorNamespace {
    /// The fixed `PREFIX` string
    Global,
    /// The name of the type the record belongs to
    TypeName(String),
}

impl CursorNamespace {
    pub fn type_name(name: impl Into<String>) -> Self {
        CursorNamespace::TypeName(name.into())
    }

    pub fn prefix(&self) -> &str {
        match self {
            CursorNamespace::Global => GLOBAL_PREFIX,
            CursorNamespace::TypeName(name) => name,
        }
    }

    pub fn encode(&self, identity: &str) -> String {
        encode(self.prefix(), identity)
    }

    pub fn decode(&self, cursor: &str) -> Result<String> {
        decode(cursor, self.prefix().len())
    }
}

/// Which namespace connections put on their cursors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorStyle {
    /// Every cursor carries `PREFIX`
    Global,
    /// Cursors carry the name of the connection's node type
    #[default]
    TypeName,
}

impl CursorStyle {
    /// Namespace for cursors over records of `type_name`
    pub fn namespace(self, type_name: &str) -> CursorNamespace {
        match self {
            CursorStyle::Global => CursorNamespace::Global,
            CursorStyle::TypeName => CursorNamespace::type_name(type_name),
        }
    }
}

/// Encode `prefix + identity` as an opaque cursor
pub fn encode(prefix: &str, identity: &str) -> String {
    STANDARD.encode(format!("{}{}", prefix, identity))
}

/// Recover the identity from a cursor whose namespace is `prefix_len` bytes long
pub fn decode(cursor: &str, prefix_len: usize) -> Result<String> {
    let bytes = STANDARD
        .decode(cursor)
        .map_err(|e| OrmGraphError::Cursor(format!("'{}': {}", cursor, e)))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| OrmGraphError::Cursor(format!("'{}': {}", cursor, e)))?;
    text.get(prefix_len..)
        .map(str::to_string)
        .ok_or_else(|| OrmGraphError::Cursor(format!("'{}' is shorter than its namespace", cursor)))
}
