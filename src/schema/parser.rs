/// Model to AST
///
/// Walks every entity of a `ModelRegistry` and emits the type fragments the
/// schema is rendered from: root query/mutation/subscription fields, the
/// entity object type, its connection and edge types, one field per
/// association and one field per exposed method. Fragments are merged into a
/// single `Ast` together with the global `pageInfo` and `Filter` types.

use crate::error::{OrmGraphError, Result};
use crate::model::{Association, AssociationKind, Entity, ModelRegistry};
use crate::schema::ast::{ArgDef, Ast, FieldDef, TypeExpr, TypeFragment};
use crate::schema::methods::{map_methods, MUTATION};
use crate::schema::naming::{check_collisions, TypeNames};
use crate::schema::resolver::ResolverFactory;
use crate::schema::type_mapping::{attribute_to_graphql_type, BOOLEAN, ID, INT, JSON, STRING};

pub const QUERY: &str = "Query";
pub const SUBSCRIPTION: &str = "Subscription";
pub const PAGE_INFO: &str = "pageInfo";
pub const FILTER: &str = "Filter";

fn named(name: &str) -> TypeExpr {
    TypeExpr::named(name)
}

fn required(name: &str) -> TypeExpr {
    TypeExpr::non_null(named(name))
}

/// `id: ID, filter: FilterInput, options: JSON`
pub fn singular_args() -> Vec<ArgDef> {
    vec![
        ArgDef::new("id", named(ID)),
        ArgDef::new("filter", named("FilterInput")),
        ArgDef::new("options", named(JSON)),
    ]
}

/// `filter: FilterInput, options: JSON`
pub fn pagination_args() -> Vec<ArgDef> {
    vec![
        ArgDef::new("filter", named("FilterInput")),
        ArgDef::new("options", named(JSON)),
    ]
}

/// The `pageInfo` type and the `Filter` type with its `FilterInput` companion
pub fn global_fragments() -> Vec<TypeFragment> {
    let page_info = TypeFragment::object(PAGE_INFO)
        .field("hasNextPage", FieldDef::new(required(BOOLEAN)))
        .field("hasPreviousPage", FieldDef::new(required(BOOLEAN)))
        .field("startCursor", FieldDef::new(named(STRING)))
        .field("endCursor", FieldDef::new(named(STRING)));

    let filter = TypeFragment::object(FILTER)
        .input()
        .field("where", FieldDef::new(named(JSON)))
        .field("paranoid", FieldDef::new(named(BOOLEAN)))
        .field("include", FieldDef::new(named(JSON)))
        .field("order", FieldDef::new(named(JSON)))
        .field("after", FieldDef::new(named(STRING)))
        .field("before", FieldDef::new(named(STRING)))
        .field("first", FieldDef::new(named(INT)))
        .field("last", FieldDef::new(named(INT)));

    vec![page_info, filter]
}

/// Build the merged AST for every entity in the registry
///
/// # Errors
///
/// - `SchemaGeneration` when the registry is empty
/// - `NameCollision` when two entities derive the same type name
/// - `UnsupportedType` / `InvalidConfiguration` from attribute and method mapping
pub fn parse(registry: &ModelRegistry, factory: &ResolverFactory) -> Result<Ast> {
    if registry.is_empty() {
        return Err(OrmGraphError::SchemaGeneration("No entities provided".to_string()));
    }
    check_collisions(registry)?;

    let mut ast: Ast = global_fragments().into_iter().collect();
    for entity in registry.entities() {
        tracing::debug!("Mapping entity {}", entity.name);
        ast.merge(parse_entity(entity, registry, factory)?);
    }

    tracing::info!("Generated {} types from {} entities", ast.len(), registry.len());
    Ok(ast)
}

/// All fragments contributed by one entity
pub fn parse_entity(entity: &Entity, registry: &ModelRegistry, factory: &ResolverFactory) -> Result<Ast> {
    let mut ast: Ast = [
        TypeFragment::object(QUERY),
        TypeFragment::object(MUTATION),
        TypeFragment::object(SUBSCRIPTION),
    ]
    .into_iter()
    .collect();

    for fragment in map_root(entity, factory) {
        ast.insert(fragment);
    }
    ast.insert(map_attributes(entity)?);
    for fragment in map_connection(entity, factory) {
        ast.insert(fragment);
    }
    ast.insert(map_associations(entity, factory));
    for fragment in map_methods(entity, registry, factory)? {
        ast.insert(fragment);
    }

    Ok(ast)
}

fn map_root(entity: &Entity, factory: &ResolverFactory) -> Vec<TypeFragment> {
    let names = TypeNames::for_entity(&entity.name);

    let lookups = |root: &str| {
        TypeFragment::object(root)
            .field(
                names.type_name.clone(),
                FieldDef::new(named(&names.type_name))
                    .with_args(singular_args())
                    .resolver(factory.find_one(entity)),
            )
            .field(
                names.plural.clone(),
                FieldDef::new(named(&names.connection))
                    .with_args(pagination_args())
                    .resolver(factory.find_all(&entity.name)),
            )
    };

    let mutations = TypeFragment::object(MUTATION)
        .field(
            format!("{}Create", names.type_name),
            FieldDef::new(named(&names.type_name))
                .with_args(vec![ArgDef::new("data", required(JSON))])
                .relation()
                .resolver(factory.create(&entity.name)),
        )
        .field(
            format!("{}Update", names.type_name),
            FieldDef::new(named(&names.type_name))
                .with_args(vec![
                    ArgDef::new("id", required(ID)),
                    ArgDef::new("data", required(JSON)),
                ])
                .relation()
                .resolver(factory.update(&entity.name)),
        )
        .field(
            format!("{}Delete", names.type_name),
            FieldDef::new(named(&names.type_name))
                .with_args(vec![ArgDef::new("id", required(ID))])
                .relation()
                .resolver(factory.delete(&entity.name)),
        );

    vec![lookups(QUERY), lookups(SUBSCRIPTION), mutations]
}

fn map_attributes(entity: &Entity) -> Result<TypeFragment> {
    let mut fragment = TypeFragment::object(&entity.name).description(entity.description.clone());
    for (name, attribute_type) in &entity.attributes {
        let mapped = attribute_to_graphql_type(attribute_type)?;
        fragment = fragment.field(name.clone(), FieldDef::new(mapped.to_type_expr()));
    }
    Ok(fragment)
}

fn map_connection(entity: &Entity, factory: &ResolverFactory) -> Vec<TypeFragment> {
    let names = TypeNames::for_entity(&entity.name);

    let connection = TypeFragment::object(&names.connection)
        .connection()
        .field(
            "pageInfo",
            FieldDef::new(required(PAGE_INFO))
                .relation()
                .resolver(factory.page_info(&entity.name)),
        )
        .field(
            "edges",
            FieldDef::new(TypeExpr::non_null(TypeExpr::list(named(&names.edge))))
                .relation()
                .resolver(factory.edges(&entity.name)),
        )
        .field(
            "totalCount",
            FieldDef::new(named(INT)).resolver(factory.total_count()),
        )
        .field(
            names.plural.clone(),
            FieldDef::new(TypeExpr::list(named(&names.type_name)))
                .relation()
                .resolver(factory.page_rows()),
        );

    let edge = TypeFragment::object(&names.edge)
        .field("node", FieldDef::new(named(&names.type_name)).relation())
        .field("cursor", FieldDef::new(named(STRING)));

    vec![connection, edge]
}

fn map_associations(entity: &Entity, factory: &ResolverFactory) -> TypeFragment {
    entity
        .associations
        .iter()
        .fold(TypeFragment::object(&entity.name), |fragment, (name, association)| {
            fragment.field(name.clone(), map_association(association, factory))
        })
}

fn map_association(association: &Association, factory: &ResolverFactory) -> FieldDef {
    let target = TypeNames::for_entity(&association.target);
    match association.kind {
        AssociationKind::BelongsTo => FieldDef::new(named(&target.type_name))
            .relation()
            .resolver(factory.belongs_to(association)),
        AssociationKind::HasOne => FieldDef::new(named(&target.type_name))
            .relation()
            .resolver(factory.has_one(association)),
        AssociationKind::HasMany => FieldDef::new(named(&target.connection))
            .with_args(pagination_args())
            .relation()
            .resolver(factory.has_many(association)),
        AssociationKind::BelongsToMany => FieldDef::new(named(&target.connection))
            .with_args(pagination_args())
            .relation()
            .resolver(factory.belongs_to_many(association)),
    }
}
