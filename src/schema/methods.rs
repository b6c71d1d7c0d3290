/// Custom method exposure
///
/// Turns the methods declared on an entity into schema fields. Each method
/// becomes either a `Mutation` field (default) or a property field on the
/// entity's own type, with an argument list derived from its accepted
/// parameters and a resolver that calls the method through the store.

use crate::error::{OrmGraphError, Result};
use crate::model::{AcceptType, Entity, FromRoot, MethodAccept, MethodDescriptor, ModelRegistry};
use crate::schema::ast::{ArgDef, FieldDef, TypeExpr, TypeFragment};
use crate::schema::naming::TypeNames;
use crate::schema::resolver::{ArgExtractor, ResolverFactory, RootSource};
use crate::schema::type_mapping::{self, is_known_scalar};
use heck::ToUpperCamelCase;

/// Root type that non-property methods attach to
pub const MUTATION: &str = "Mutation";

/// Method parameter type aliases (matched case-insensitively)
const SCALAR_ALIASES: [(&str, &str); 12] = [
    ("any", type_mapping::JSON),
    ("object", type_mapping::JSON),
    ("json", type_mapping::JSON),
    ("number", type_mapping::FLOAT),
    ("string", type_mapping::STRING),
    ("boolean", type_mapping::BOOLEAN),
    ("objectid", type_mapping::ID),
    ("guid", type_mapping::ID),
    ("uuid", type_mapping::ID),
    ("uuidv4", type_mapping::ID),
    ("date", type_mapping::DATE),
    ("now", type_mapping::DATE),
];

/// GraphQL scalar for a method parameter type, if it is a scalar alias
pub fn scalar_alias(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    SCALAR_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, scalar)| *scalar)
}

fn element_type(name: &str) -> String {
    match scalar_alias(name) {
        Some(scalar) => scalar.to_string(),
        None if is_known_scalar(name) => name.to_string(),
        None => format!("{}Input", name),
    }
}

/// Exposed type of an accepted parameter
///
/// Scalars go through the alias table; anything else is an input object.
pub fn accept_type(ty: &AcceptType) -> TypeExpr {
    match ty {
        AcceptType::Single(name) => TypeExpr::named(element_type(name)),
        AcceptType::List(names) => {
            let element = names.first().map(String::as_str).unwrap_or(type_mapping::JSON);
            TypeExpr::list(TypeExpr::named(element_type(element)))
        }
    }
}

/// Schema shape of one exposed method
#[derive(Debug, Clone)]
pub struct MappedMethod {
    /// Type the field is attached to
    pub target: String,
    pub field_name: String,
    pub args: Vec<ArgDef>,
    pub return_type: TypeExpr,
    /// One extractor per method parameter, in declared order
    pub extractors: Vec<ArgExtractor>,
}

/// Derive field name, arguments, extractors and return type of a method
///
/// # Errors
///
/// Fails with `InvalidConfiguration` when a `from_root` option is neither a
/// flag, a path nor a closure, or when an explicit return type is not a type
/// expression.
pub fn map_method(
    entity: &Entity,
    method: &MethodDescriptor,
    registry: &ModelRegistry,
) -> Result<MappedMethod> {
    let names = TypeNames::for_entity(&entity.name);
    let options = method.options();

    let base = options.name.clone().unwrap_or_else(|| method.name.clone());
    let field_name = if options.as_property {
        base
    } else {
        let singular = options.singular.unwrap_or(!method.is_static);
        let prefix = if singular { &names.type_name } else { &names.plural };
        format!("{}{}", prefix, base.to_upper_camel_case())
    };

    let target = if options.as_property {
        names.type_name.clone()
    } else {
        MUTATION.to_string()
    };

    let mut args = Vec::new();
    if !method.is_static {
        // Property fields get their instance from the parent record
        let id = TypeExpr::named(type_mapping::ID);
        let id = if options.as_property { id } else { TypeExpr::non_null(id) };
        args.push(ArgDef::new("id", id));
    }

    let mut extractors = Vec::new();
    for accept in &method.accepts {
        if let Some((arg, extractor)) = map_accept(entity, method, accept)? {
            args.extend(arg);
            extractors.push(extractor);
        }
    }

    let return_type = match &options.return_type {
        Some(text) => TypeExpr::parse(text).ok_or_else(|| {
            OrmGraphError::InvalidConfiguration(format!(
                "Method '{}.{}' has an invalid return type '{}'",
                entity.name, method.name, text
            ))
        })?,
        None => match method.returns.first() {
            Some(ret) if ret.root && registry.get(&ret.ty).is_some() => TypeExpr::named(&ret.ty),
            _ => TypeExpr::named(type_mapping::JSON),
        },
    };

    tracing::debug!(
        "Method {}.{} exposed as {}.{} -> {}",
        entity.name,
        method.name,
        target,
        field_name,
        return_type
    );

    Ok(MappedMethod {
        target,
        field_name,
        args,
        return_type,
        extractors,
    })
}

/// Exposed argument (if any) and extractor of one accepted parameter;
/// `None` when the parameter is omitted without another source
fn map_accept(
    entity: &Entity,
    method: &MethodDescriptor,
    accept: &MethodAccept,
) -> Result<Option<(Option<ArgDef>, ArgExtractor)>> {
    let options = &accept.graphql;

    let root = match &options.from_root {
        None | Some(FromRoot::Flag(false)) => None,
        Some(FromRoot::Flag(true)) => Some(RootSource::Attribute(accept.arg.clone())),
        Some(FromRoot::Path(path)) => Some(RootSource::Path(path.clone())),
        Some(FromRoot::Func(f)) => Some(RootSource::Func(f.clone())),
        Some(FromRoot::Other(value)) => {
            return Err(OrmGraphError::InvalidConfiguration(format!(
                "Parameter '{}' of method '{}.{}' has invalid from_root {}",
                accept.arg, entity.name, method.name, value
            )));
        }
    };

    if let Some(root) = root {
        return Ok(Some((None, ArgExtractor::FromRoot(root))));
    }
    if options.omit {
        return Ok(None);
    }
    if options.from_context {
        return Ok(Some((None, ArgExtractor::FromContext)));
    }

    let name = options.gql_name.clone().unwrap_or_else(|| accept.arg.clone());
    let ty = match &options.gql_type {
        Some(text) => TypeExpr::parse(text).ok_or_else(|| {
            OrmGraphError::InvalidConfiguration(format!(
                "Parameter '{}' of method '{}.{}' has an invalid type '{}'",
                accept.arg, entity.name, method.name, text
            ))
        })?,
        None => accept_type(&accept.ty),
    };

    Ok(Some((
        Some(ArgDef::new(name.clone(), ty)),
        ArgExtractor::FromArg(name),
    )))
}

/// Map every method of an entity to schema fields wired to method resolvers
pub fn map_methods(
    entity: &Entity,
    registry: &ModelRegistry,
    factory: &ResolverFactory,
) -> Result<Vec<TypeFragment>> {
    entity
        .methods
        .iter()
        .map(|method| {
            let mapped = map_method(entity, method, registry)?;
            let resolver = factory.method(&entity.name, method, mapped.extractors);
            let field = FieldDef::new(mapped.return_type)
                .with_args(mapped.args)
                .relation()
                .resolver(resolver);
            Ok(TypeFragment::object(mapped.target).field(mapped.field_name, field))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityConfig, RootFn};
    use crate::schema::ast::args_to_string;
    use serde_json::json;

    fn registry_with(method: serde_json::Value) -> ModelRegistry {
        let method: MethodDescriptor = serde_json::from_value(method).unwrap();
        ModelRegistry::from_configs(&[EntityConfig::new("User")
            .attribute("username", "STRING")
            .method(method)])
        .unwrap()
    }

    fn mapped(method: serde_json::Value) -> MappedMethod {
        let registry = registry_with(method);
        let user = registry.get("User").unwrap();
        map_method(user, &user.methods[0], &registry).unwrap()
    }

    #[test]
    fn test_static_singular_login() {
        let m = mapped(json!({
            "name": "login", "isStatic": true,
            "accepts": [{"arg": "credentials", "type": "object"}],
            "graphql": {"singular": true}
        }));
        assert_eq!(m.target, "Mutation");
        assert_eq!(m.field_name, "UserLogin");
        assert_eq!(args_to_string(&m.args), "credentials: JSON");
        assert_eq!(m.return_type.to_string(), "JSON");
        assert!(matches!(&m.extractors[..], [ArgExtractor::FromArg(name)] if name == "credentials"));
    }

    #[test]
    fn test_static_methods_default_to_plural() {
        let m = mapped(json!({"name": "login", "isStatic": true}));
        assert_eq!(m.field_name, "UsersLogin");
    }

    #[test]
    fn test_instance_methods_get_leading_id() {
        let m = mapped(json!({
            "name": "resetPassword", "isStatic": false,
            "accepts": [{"arg": "password", "type": "string"}]
        }));
        assert_eq!(m.field_name, "UserResetPassword");
        assert_eq!(args_to_string(&m.args), "id: ID!, password: String");
        assert_eq!(m.extractors.len(), 1);
    }

    #[test]
    fn test_type_inference() {
        assert_eq!(accept_type(&AcceptType::Single("number".into())).to_string(), "Float");
        assert_eq!(accept_type(&AcceptType::Single("uuid".into())).to_string(), "ID");
        assert_eq!(accept_type(&AcceptType::Single("Date".into())).to_string(), "Date");
        assert_eq!(accept_type(&AcceptType::Single("any".into())).to_string(), "JSON");
        assert_eq!(accept_type(&AcceptType::Single("Address".into())).to_string(), "AddressInput");
        assert_eq!(accept_type(&AcceptType::List(vec!["string".into()])).to_string(), "[String]");
        assert_eq!(accept_type(&AcceptType::List(vec!["Address".into()])).to_string(), "[AddressInput]");
        assert_eq!(accept_type(&AcceptType::List(vec![])).to_string(), "[JSON]");
    }

    #[test]
    fn test_overrides_and_sources() {
        let m = mapped(json!({
            "name": "transfer", "isStatic": true,
            "accepts": [
                {"arg": "amount", "type": "number", "graphql": {"gqlName": "value", "gqlType": "Int!"}},
                {"arg": "ownerId", "type": "number", "graphql": {"omit": true, "fromRoot": "owner.id"}},
                {"arg": "dropped", "type": "string", "graphql": {"omit": true}},
                {"arg": "ctx", "type": "object", "graphql": {"fromContext": true}}
            ]
        }));
        assert_eq!(args_to_string(&m.args), "value: Int!");
        assert_eq!(m.extractors.len(), 3);
        assert!(matches!(&m.extractors[0], ArgExtractor::FromArg(name) if name == "value"));
        assert!(matches!(&m.extractors[1], ArgExtractor::FromRoot(RootSource::Path(p)) if p == "owner.id"));
        assert!(matches!(&m.extractors[2], ArgExtractor::FromContext));
    }

    #[test]
    fn test_property_method() {
        let m = mapped(json!({
            "name": "displayName", "isStatic": false,
            "notes": "{\"graphQL\": {\"asProperty\": true, \"returnType\": \"String\"}}"
        }));
        assert_eq!(m.target, "User");
        assert_eq!(m.field_name, "displayName");
        assert_eq!(args_to_string(&m.args), "id: ID");
        assert_eq!(m.return_type.to_string(), "String");
    }

    #[test]
    fn test_root_return_of_entity_type() {
        let m = mapped(json!({
            "name": "me", "isStatic": true,
            "returns": [{"root": true, "type": "User"}]
        }));
        assert_eq!(m.return_type.to_string(), "User");

        let m = mapped(json!({
            "name": "stats", "isStatic": true,
            "returns": [{"root": true, "type": "object"}]
        }));
        assert_eq!(m.return_type.to_string(), "JSON");
    }

    #[test]
    fn test_invalid_from_root_is_rejected() {
        let registry = registry_with(json!({
            "name": "bad", "isStatic": true,
            "accepts": [{"arg": "x", "type": "string", "graphql": {"fromRoot": 42}}]
        }));
        let user = registry.get("User").unwrap();
        let err = map_method(user, &user.methods[0], &registry).unwrap_err();
        assert!(matches!(err, OrmGraphError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_closure_from_root() {
        let mut method: MethodDescriptor = serde_json::from_value(json!({
            "name": "greet", "isStatic": false,
            "accepts": [{"arg": "who", "type": "string"}]
        }))
        .unwrap();
        method.accepts[0].graphql.from_root =
            Some(FromRoot::Func(RootFn::new(|root| root["username"].clone())));
        let registry =
            ModelRegistry::from_configs(&[EntityConfig::new("User").method(method)]).unwrap();
        let user = registry.get("User").unwrap();

        let m = map_method(user, &user.methods[0], &registry).unwrap();
        assert_eq!(args_to_string(&m.args), "id: ID!");
        assert!(matches!(&m.extractors[0], ArgExtractor::FromRoot(RootSource::Func(_))));
    }
}
