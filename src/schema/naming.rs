/// Naming conventions for generated types and fields
///
/// All names are pure functions of the entity name:
///
/// - type name: the entity name
/// - plural name: the pluralized entity name, or `<Name>List` when
///   pluralization leaves the name unchanged (`Sheep` → `SheepList`)
/// - connection name: pluralized entity name + `Connection`
/// - edge name: entity name + `Edge`

use crate::error::{OrmGraphError, Result};
use crate::model::ModelRegistry;
use std::collections::HashMap;

/// Names reserved by the root and global types
pub const RESERVED_NAMES: [&str; 13] = [
    "Query",
    "Mutation",
    "Subscription",
    "pageInfo",
    "Filter",
    "FilterInput",
    "JSON",
    "Date",
    "Boolean",
    "Int",
    "Float",
    "String",
    "ID",
];

fn pluralize(name: &str) -> String {
    pluralizer::pluralize(name, 2, false)
}

pub fn type_name(entity: &str) -> String {
    entity.to_string()
}

pub fn plural_name(entity: &str) -> String {
    let plural = pluralize(entity);
    if plural == entity {
        format!("{}List", entity)
    } else {
        plural
    }
}

pub fn connection_name(entity: &str) -> String {
    format!("{}Connection", pluralize(entity))
}

pub fn edge_name(entity: &str) -> String {
    format!("{}Edge", entity)
}

/// Every name derived from one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeNames {
    pub type_name: String,
    pub plural: String,
    pub connection: String,
    pub edge: String,
}

impl TypeNames {
    pub fn for_entity(entity: &str) -> Self {
        Self {
            type_name: type_name(entity),
            plural: plural_name(entity),
            connection: connection_name(entity),
            edge: edge_name(entity),
        }
    }

    fn all(&self) -> [&str; 4] {
        [&self.type_name, &self.plural, &self.connection, &self.edge]
    }
}

/// Fail if two entities derive the same name, or an entity derives a
/// reserved name
pub fn check_collisions(registry: &ModelRegistry) -> Result<()> {
    let mut owners: HashMap<String, String> = RESERVED_NAMES
        .iter()
        .map(|name| (name.to_string(), "<built-in>".to_string()))
        .collect();

    for entity in registry.entities() {
        let names = TypeNames::for_entity(&entity.name);
        for name in names.all() {
            match owners.get(name) {
                Some(owner) if owner != &entity.name => {
                    return Err(OrmGraphError::NameCollision {
                        name: name.to_string(),
                        first: owner.clone(),
                        second: entity.name.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    owners.insert(name.to_string(), entity.name.clone());
                }
            }
        }
    }

    Ok(())
}
