/// Attribute type tags
///
/// Attribute types are written as ORM-style tags (`STRING`, `INTEGER`,
/// `ARRAY(STRING)`, `VIRTUAL(BOOLEAN)`, ...). Parsing never fails: tags the
/// generator does not understand are preserved in `Other` so the type mapper
/// can report them by name.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AttributeType {
    Boolean,
    Float,
    Double,
    Real,
    Integer,
    TinyInt,
    SmallInt,
    MediumInt,
    BigInt,
    Decimal,
    String,
    Char,
    Text,
    Uuid,
    Date,
    DateOnly,
    Time,
    /// Array of the element type
    Array(Box<AttributeType>),
    /// Computed attribute with an optional declared return type
    Virtual(Option<Box<AttributeType>>),
    /// Any tag not listed above (ENUM, JSON, BLOB, GEOMETRY, ...)
    Other(std::string::String),
}

impl AttributeType {
    pub fn array(element: AttributeType) -> Self {
        AttributeType::Array(Box::new(element))
    }

    pub fn virtual_of(return_type: AttributeType) -> Self {
        AttributeType::Virtual(Some(Box::new(return_type)))
    }

    fn parse(tag: &str) -> Self {
        let tag = tag.trim();
        let upper = tag.to_ascii_uppercase();

        // Parameterised tags: NAME(inner)
        if let Some(open) = upper.find('(') {
            if upper.ends_with(')') {
                let head = &upper[..open];
                let inner = &tag[open + 1..tag.len() - 1];
                match head {
                    "ARRAY" => return AttributeType::array(AttributeType::parse(inner)),
                    "VIRTUAL" => {
                        return if inner.trim().is_empty() {
                            AttributeType::Virtual(None)
                        } else {
                            AttributeType::virtual_of(AttributeType::parse(inner))
                        };
                    }
                    // STRING(255), DECIMAL(10, 2) and friends carry only a length/precision
                    _ => {
                        let base = AttributeType::parse(head);
                        if !matches!(base, AttributeType::Other(_)) {
                            return base;
                        }
                        return AttributeType::Other(tag.to_string());
                    }
                }
            }
        }

        match upper.as_str() {
            "BOOLEAN" => AttributeType::Boolean,
            "FLOAT" => AttributeType::Float,
            "DOUBLE" => AttributeType::Double,
            "REAL" => AttributeType::Real,
            "INTEGER" => AttributeType::Integer,
            "TINYINT" => AttributeType::TinyInt,
            "SMALLINT" => AttributeType::SmallInt,
            "MEDIUMINT" => AttributeType::MediumInt,
            "BIGINT" => AttributeType::BigInt,
            "DECIMAL" => AttributeType::Decimal,
            "STRING" => AttributeType::String,
            "CHAR" => AttributeType::Char,
            "TEXT" => AttributeType::Text,
            "UUID" => AttributeType::Uuid,
            "DATE" => AttributeType::Date,
            "DATEONLY" => AttributeType::DateOnly,
            "TIME" => AttributeType::Time,
            "VIRTUAL" => AttributeType::Virtual(None),
            _ => AttributeType::Other(tag.to_string()),
        }
    }
}

impl From<std::string::String> for AttributeType {
    fn from(tag: std::string::String) -> Self {
        AttributeType::parse(&tag)
    }
}

impl From<&str> for AttributeType {
    fn from(tag: &str) -> Self {
        AttributeType::parse(tag)
    }
}

impl From<AttributeType> for std::string::String {
    fn from(ty: AttributeType) -> Self {
        ty.to_string()
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeType::Boolean => f.write_str("BOOLEAN"),
            AttributeType::Float => f.write_str("FLOAT"),
            AttributeType::Double => f.write_str("DOUBLE"),
            AttributeType::Real => f.write_str("REAL"),
            AttributeType::Integer => f.write_str("INTEGER"),
            AttributeType::TinyInt => f.write_str("TINYINT"),
            AttributeType::SmallInt => f.write_str("SMALLINT"),
            AttributeType::MediumInt => f.write_str("MEDIUMINT"),
            AttributeType::BigInt => f.write_str("BIGINT"),
            AttributeType::Decimal => f.write_str("DECIMAL"),
            AttributeType::String => f.write_str("STRING"),
            AttributeType::Char => f.write_str("CHAR"),
            AttributeType::Text => f.write_str("TEXT"),
            AttributeType::Uuid => f.write_str("UUID"),
            AttributeType::Date => f.write_str("DATE"),
            AttributeType::DateOnly => f.write_str("DATEONLY"),
            AttributeType::Time => f.write_str("TIME"),
            AttributeType::Array(inner) => write!(f, "ARRAY({})", inner),
            AttributeType::Virtual(None) => f.write_str("VIRTUAL"),
            AttributeType::Virtual(Some(inner)) => write!(f, "VIRTUAL({})", inner),
            AttributeType::Other(tag) => f.write_str(tag),
        }
    }
}
