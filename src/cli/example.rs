use ormgraph::config::{Config, SeedConfig, ServerConfig};
use ormgraph::model::{
    AcceptType, AssociationKind, EntityConfig, MethodAccept, MethodDescriptor, MethodOptions,
    MethodReturn,
};
use ormgraph::store::{MemoryStore, StoreError};
use serde_json::{json, Value};

/// Example model: customers owning machines, with users that log in
pub fn create_example_config() -> Config {
    Config {
        server: ServerConfig::default(),
        entity: create_example_entities(),
        seed: create_example_seed(),
    }
}

pub fn create_example_entities() -> Vec<EntityConfig> {
    let mut customer = EntityConfig::new("Customer")
        .attribute("name", "STRING")
        .attribute("industry", "STRING")
        .association(AssociationKind::HasMany, "Machine")
        .association(AssociationKind::HasMany, "User");
    customer.description = Some("Organisation operating machines".to_string());
    customer.timestamps = true;

    let mut user = EntityConfig::new("User")
        .attribute("username", "STRING")
        .attribute("email", "STRING")
        .attribute("roles", "ARRAY(STRING)")
        .association(AssociationKind::BelongsTo, "Customer")
        .method(login_method())
        .method(display_name_method());
    user.description = Some("Person signing in on behalf of a customer".to_string());

    let machine = EntityConfig::new("Machine")
        .attribute("serial", "STRING")
        .attribute("model", "STRING")
        .attribute("active", "BOOLEAN")
        .attribute("installedAt", "DATEONLY")
        .association(AssociationKind::BelongsTo, "Customer");

    vec![customer, user, machine]
}

fn login_method() -> MethodDescriptor {
    MethodDescriptor {
        name: "login".to_string(),
        is_static: true,
        accepts: vec![MethodAccept {
            arg: "credentials".to_string(),
            ty: AcceptType::Single("object".to_string()),
            graphql: Default::default(),
        }],
        returns: vec![MethodReturn {
            root: true,
            arg: Some("session".to_string()),
            ty: "object".to_string(),
        }],
        graphql: Some(MethodOptions {
            singular: Some(true),
            ..Default::default()
        }),
        notes: None,
    }
}

fn display_name_method() -> MethodDescriptor {
    MethodDescriptor {
        name: "displayName".to_string(),
        is_static: false,
        accepts: vec![],
        returns: vec![MethodReturn {
            root: false,
            arg: Some("name".to_string()),
            ty: "string".to_string(),
        }],
        graphql: Some(MethodOptions {
            as_property: true,
            return_type: Some("String".to_string()),
            ..Default::default()
        }),
        notes: None,
    }
}

fn create_example_seed() -> Vec<SeedConfig> {
    vec![
        SeedConfig {
            entity: "Customer".to_string(),
            rows: vec![
                json!({ "name": "Apple", "industry": "Electronics" }),
                json!({ "name": "Initech", "industry": "Software" }),
            ],
        },
        SeedConfig {
            entity: "User".to_string(),
            rows: vec![
                json!({ "username": "ann", "email": "ann@apple.example", "roles": ["admin"], "customerId": 1 }),
                json!({ "username": "bob", "email": "bob@initech.example", "roles": [], "customerId": 2 }),
            ],
        },
        SeedConfig {
            entity: "Machine".to_string(),
            rows: vec![
                json!({ "serial": "AX-1001", "model": "X40", "active": true, "installedAt": "2023-04-01", "customerId": 1 }),
                json!({ "serial": "AX-1002", "model": "X50", "active": false, "installedAt": "2023-09-15", "customerId": 1 }),
                json!({ "serial": "IN-2001", "model": "X40", "active": true, "installedAt": "2024-01-20", "customerId": 2 }),
            ],
        },
    ]
}

/// Implementations of the example model's custom methods
pub fn register_example_methods(store: MemoryStore) -> MemoryStore {
    store
        .with_static_method("User", "login", |params| {
            let username = params
                .first()
                .and_then(|credentials| credentials.get("username"))
                .and_then(Value::as_str)
                .ok_or_else(|| StoreError::Constraint("credentials.username is required".to_string()))?;
            Ok(json!({ "username": username, "token": format!("session-{}", username) }))
        })
        .with_instance_method("User", "displayName", |record, _params| {
            let username = record.get("username").and_then(Value::as_str).unwrap_or_default();
            let email = record.get("email").and_then(Value::as_str).unwrap_or_default();
            Ok(Value::String(format!("{} <{}>", username, email)))
        })
}
