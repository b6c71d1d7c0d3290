/// Data-model descriptors
///
/// This module holds the read-only description of the ORM model the schema is
/// derived from: entities, their attributes, associations and custom methods.
/// `EntityConfig` is what users write; `ModelRegistry` normalizes it into
/// `Entity` values with implicit attributes and association defaults filled in.

mod method;
mod types;

pub use method::{
    AcceptOptions, AcceptType, FromRoot, MethodAccept, MethodDescriptor, MethodOptions,
    MethodReturn, RootFn,
};
pub use types::AttributeType;

use crate::error::{OrmGraphError, Result};
use heck::ToLowerCamelCase;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Kind of relationship between two entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssociationKind {
    BelongsTo,
    HasOne,
    HasMany,
    BelongsToMany,
}

/// Association as written in configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationConfig {
    pub kind: AssociationKind,

    /// Target entity name
    pub target: String,

    /// Alias the field name is derived from
    #[serde(default, rename = "as", skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,

    /// Join entity for belongs-to-many
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub through: Option<String>,

    /// Key on the join entity pointing at the target (belongs-to-many)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_key: Option<String>,
}

/// Entity (model) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Entity name, used as the GraphQL type name (PascalCase)
    pub name: String,

    /// Optional description for GraphQL schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Primary key attribute name
    #[serde(default = "default_primary_key")]
    pub primary_key: String,

    /// Add `createdAt` / `updatedAt` attributes
    #[serde(default = "default_timestamps")]
    pub timestamps: bool,

    /// Attribute name -> type tag, in declaration order
    #[serde(default)]
    pub attributes: IndexMap<String, AttributeType>,

    #[serde(default)]
    pub associations: Vec<AssociationConfig>,

    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
}

fn default_primary_key() -> String {
    "id".to_string()
}

fn default_timestamps() -> bool {
    true
}

impl EntityConfig {
    /// Bare entity with an `id` key and no attributes
    ///
    /// Entities built here start without timestamps, while entities read
    /// from TOML get them unless `timestamps = false` is given. Set
    /// `timestamps` on the result to opt in.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            primary_key: default_primary_key(),
            timestamps: false,
            attributes: IndexMap::new(),
            associations: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn attribute(mut self, name: impl Into<String>, ty: impl Into<AttributeType>) -> Self {
        self.attributes.insert(name.into(), ty.into());
        self
    }

    pub fn association(mut self, kind: AssociationKind, target: impl Into<String>) -> Self {
        self.associations.push(AssociationConfig {
            kind,
            target: target.into(),
            alias: None,
            foreign_key: None,
            through: None,
            other_key: None,
        });
        self
    }

    /// Set the alias of the most recently added association
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        if let Some(association) = self.associations.last_mut() {
            association.alias = Some(alias.into());
        }
        self
    }

    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// Validate entity configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        // Validate GraphQL name (PascalCase, alphanumeric)
        if !self.name.chars().all(|c| c.is_alphanumeric()) {
            return Err(format!("Entity name '{}' must be alphanumeric", self.name));
        }

        if !self.name.chars().next().unwrap_or('_').is_uppercase() {
            return Err(format!(
                "Entity name '{}' must start with uppercase letter (PascalCase)",
                self.name
            ));
        }

        if self.primary_key.is_empty() {
            return Err(format!("Entity '{}' has an empty primary key", self.name));
        }

        Ok(())
    }
}

/// Normalized association descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    pub kind: AssociationKind,
    pub source: String,
    pub target: String,
    pub foreign_key: String,
    pub alias: String,
    pub through: Option<String>,
    pub other_key: Option<String>,
}

/// Normalized entity descriptor
#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,
    pub description: Option<String>,
    pub primary_key: String,
    pub attributes: IndexMap<String, AttributeType>,
    pub associations: IndexMap<String, Association>,
    pub methods: Vec<MethodDescriptor>,
}

/// All entities of a model, keyed by name in declaration order
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    entities: IndexMap<String, Entity>,
}

impl ModelRegistry {
    /// Normalize entity configurations into a registry
    ///
    /// Fills in the implicit primary key and timestamp attributes, and the
    /// default alias and foreign key of every association.
    pub fn from_configs(configs: &[EntityConfig]) -> Result<Self> {
        let mut entities = IndexMap::new();

        for config in configs {
            config.validate().map_err(OrmGraphError::Config)?;
            if entities.contains_key(&config.name) {
                return Err(OrmGraphError::Config(format!(
                    "Entity '{}' is declared twice",
                    config.name
                )));
            }

            let mut attributes = IndexMap::new();
            if !config.attributes.contains_key(&config.primary_key) {
                attributes.insert(config.primary_key.clone(), AttributeType::Integer);
            }
            for (name, ty) in &config.attributes {
                attributes.insert(name.clone(), ty.clone());
            }
            if config.timestamps {
                for stamp in ["createdAt", "updatedAt"] {
                    attributes
                        .entry(stamp.to_string())
                        .or_insert(AttributeType::Date);
                }
            }

            let mut associations = IndexMap::new();
            for association in &config.associations {
                if !configs.iter().any(|c| c.name == association.target) {
                    return Err(OrmGraphError::Config(format!(
                        "Association on '{}' targets unknown entity '{}'",
                        config.name, association.target
                    )));
                }
                let normalized = normalize_association(&config.name, association);
                associations.insert(normalized.alias.to_lower_camel_case(), normalized);
            }

            entities.insert(
                config.name.clone(),
                Entity {
                    name: config.name.clone(),
                    description: config.description.clone(),
                    primary_key: config.primary_key.clone(),
                    attributes,
                    associations,
                    methods: config.methods.clone(),
                },
            );
        }

        Ok(Self { entities })
    }

    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Apply ORM defaults: singular associations alias the target name and key on
/// `<alias>Id`; collections alias the plural target and key on `<source>Id`
fn normalize_association(source: &str, config: &AssociationConfig) -> Association {
    let (default_alias, default_key) = match config.kind {
        AssociationKind::BelongsTo => {
            let alias = config.alias.clone().unwrap_or_else(|| config.target.clone());
            let key = format!("{}Id", alias.to_lower_camel_case());
            (alias, key)
        }
        AssociationKind::HasOne => (
            config.target.clone(),
            format!("{}Id", source.to_lower_camel_case()),
        ),
        AssociationKind::HasMany | AssociationKind::BelongsToMany => (
            pluralizer::pluralize(&config.target, 2, false),
            format!("{}Id", source.to_lower_camel_case()),
        ),
    };

    let other_key = match config.kind {
        AssociationKind::BelongsToMany => Some(
            config
                .other_key
                .clone()
                .unwrap_or_else(|| format!("{}Id", config.target.to_lower_camel_case())),
        ),
        _ => config.other_key.clone(),
    };

    Association {
        kind: config.kind,
        source: source.to_string(),
        target: config.target.clone(),
        foreign_key: config.foreign_key.clone().unwrap_or(default_key),
        alias: config.alias.clone().unwrap_or(default_alias),
        through: config.through.clone(),
        other_key,
    }
}
