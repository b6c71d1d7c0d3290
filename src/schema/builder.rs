/// GraphQL schema builder
///
/// This module provides the `SchemaBuilder` which runs generation for a model
/// (AST, SDL text and resolver map) and binds the result into an executable
/// `async_graphql` dynamic schema.

use crate::error::{OrmGraphError, Result};
use crate::model::{EntityConfig, ModelRegistry};
use crate::schema::ast::{Ast, Category, FieldDef, TypeExpr, TypeFragment};
use crate::schema::cursor::CursorStyle;
use crate::schema::methods::MUTATION;
use crate::schema::parser::{self, QUERY, SUBSCRIPTION};
use crate::schema::resolver::{Args, FieldInfo, RequestContext, Resolved, Resolver, ResolverFactory};
use crate::schema::resolver_map::ResolverMap;
use crate::schema::scalars::{literal_to_json, register_custom_scalars, ScalarResolver};
use crate::schema::type_mapping::{is_known_scalar, JSON, KNOWN_SCALARS};
use crate::schema::typedefs;
use crate::store::Store;

use async_graphql::dynamic::{
    Enum, Field, FieldFuture, FieldValue, InputObject, InputValue, Object, ResolverContext, Schema,
    Subscription, SubscriptionField, SubscriptionFieldFuture, TypeRef, Union,
};
use async_graphql::Value as ConstValue;
use std::collections::HashSet;
use std::sync::Arc;

/// Output of one generation run
#[derive(Debug, Clone)]
pub struct GeneratedSchema {
    pub ast: Ast,
    /// Rendered SDL
    pub typedefs: String,
    pub resolvers: ResolverMap,
}

/// Schema builder for generating GraphQL schemas from a model
pub struct SchemaBuilder {
    registry: Arc<ModelRegistry>,
    store: Arc<dyn Store>,
    cursor_style: CursorStyle,
}

impl SchemaBuilder {
    /// Create a new schema builder
    pub fn new(registry: Arc<ModelRegistry>, store: Arc<dyn Store>) -> Self {
        Self {
            registry,
            store,
            cursor_style: CursorStyle::default(),
        }
    }

    /// Select the namespace connection cursors are encoded with
    pub fn with_cursor_style(mut self, cursor_style: CursorStyle) -> Self {
        self.cursor_style = cursor_style;
        self
    }

    /// Normalize entity configurations and bind them to a store
    pub fn from_configs(configs: &[EntityConfig], store: Arc<dyn Store>) -> Result<Self> {
        Ok(Self::new(Arc::new(ModelRegistry::from_configs(configs)?), store))
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Build the AST, render it and assemble the resolver map
    pub fn generate(&self) -> Result<GeneratedSchema> {
        let factory = ResolverFactory::new(Arc::clone(&self.store), Arc::clone(&self.registry))
            .with_cursor_style(self.cursor_style);
        let ast = parser::parse(&self.registry, &factory)?;
        let typedefs = typedefs::render(&ast);
        let resolvers = ResolverMap::assemble(&ast);

        Ok(GeneratedSchema {
            ast,
            typedefs,
            resolvers,
        })
    }

    /// Build complete executable GraphQL schema
    ///
    /// # Returns
    ///
    /// A dynamic GraphQL schema with query, mutation and subscription roots
    pub fn build_schema(&self) -> Result<Schema> {
        self.generate()?.to_dynamic_schema()
    }
}

/// How a field's resolved value is handed to the engine
#[derive(Clone)]
enum OutputKind {
    Object,
    Union,
    Leaf(Option<Arc<dyn ScalarResolver>>),
}

impl GeneratedSchema {
    /// Bind the AST and resolver map into an `async_graphql` dynamic schema
    pub fn to_dynamic_schema(&self) -> Result<Schema> {
        let input_types = self.input_type_names();
        let mut builder = Schema::build(QUERY, Some(MUTATION), Some(SUBSCRIPTION));

        for scalar in register_custom_scalars() {
            builder = builder.register(scalar);
        }

        for fragment in self.ast.types() {
            match fragment.category {
                Category::Type if fragment.name == SUBSCRIPTION => {
                    builder = builder.register(self.build_subscription(fragment, &input_types));
                }
                Category::Type => {
                    builder = builder.register(self.build_object(fragment, &input_types));
                    if fragment.input {
                        builder = builder.register(build_input_object(fragment));
                    }
                }
                Category::Enum => {
                    builder = builder.register(
                        Enum::new(fragment.name.as_str()).items(fragment.values.iter().map(String::as_str)),
                    );
                }
                Category::Union => {
                    let union = fragment
                        .values
                        .iter()
                        .fold(Union::new(fragment.name.as_str()), |union, member| {
                            union.possible_type(member.as_str())
                        });
                    builder = builder.register(union);
                }
            }
        }

        builder.finish().map_err(|e| {
            OrmGraphError::SchemaGeneration(format!("Failed to build schema: {}", e))
        })
    }

    /// Names usable as argument types: scalars, enums and `<Type>Input` companions
    fn input_type_names(&self) -> HashSet<String> {
        let mut names: HashSet<String> = KNOWN_SCALARS.iter().map(|s| s.to_string()).collect();
        for fragment in self.ast.types() {
            match fragment.category {
                Category::Enum => {
                    names.insert(fragment.name.clone());
                }
                Category::Type if fragment.input => {
                    names.insert(format!("{}Input", fragment.name));
                }
                _ => {}
            }
        }
        names
    }

    fn output_kind(&self, expr: &TypeExpr) -> OutputKind {
        let base = expr.base_name();
        match self.ast.get(base).map(|t| t.category) {
            Some(Category::Type) => OutputKind::Object,
            Some(Category::Union) => OutputKind::Union,
            _ => OutputKind::Leaf(self.resolvers.scalar(base).cloned()),
        }
    }

    /// Execution binding and engine arguments of one field
    fn bind_field(
        &self,
        type_name: &str,
        field_name: &str,
        field: &FieldDef,
        input_types: &HashSet<String>,
    ) -> (Arc<FieldBinding>, Vec<InputValue>) {
        let mut inputs = Vec::new();
        let mut arg_scalars = Vec::new();

        for arg in &field.args {
            let ty = arg.ty.map_base(&|base| {
                if input_types.contains(base) {
                    base.to_string()
                } else {
                    tracing::warn!(
                        "Argument {}.{}({}) names undeclared input type '{}', accepting JSON",
                        type_name,
                        field_name,
                        arg.name,
                        base
                    );
                    JSON.to_string()
                }
            });
            arg_scalars.push((arg.name.clone(), self.resolvers.scalar(ty.base_name()).cloned()));
            inputs.push(InputValue::new(arg.name.as_str(), type_ref(&ty)));
        }

        let binding = FieldBinding {
            info: FieldInfo::new(type_name, field_name),
            resolver: self.resolvers.get(type_name, field_name).cloned(),
            ty: field.ty.clone(),
            kind: self.output_kind(&field.ty),
            arg_scalars,
        };
        (Arc::new(binding), inputs)
    }

    fn build_object(&self, fragment: &TypeFragment, input_types: &HashSet<String>) -> Object {
        let mut object = Object::new(fragment.name.as_str());
        if let Some(description) = &fragment.description {
            object = object.description(description.as_str());
        }

        for (name, field) in &fragment.fields {
            let (binding, inputs) = self.bind_field(&fragment.name, name, field, input_types);

            let graphql_field = Field::new(name.as_str(), type_ref(&field.ty), move |ctx| {
                let binding = Arc::clone(&binding);
                FieldFuture::new(async move {
                    let resolved = binding.resolve(&ctx).await?;
                    Ok(to_field_value(resolved, &binding.ty, &binding.kind))
                })
            });
            object = object.field(inputs.into_iter().fold(graphql_field, Field::argument));
        }

        object
    }

    fn build_subscription(&self, fragment: &TypeFragment, input_types: &HashSet<String>) -> Subscription {
        let mut subscription = Subscription::new(fragment.name.as_str());

        for (name, field) in &fragment.fields {
            let (binding, inputs) = self.bind_field(&fragment.name, name, field, input_types);

            let graphql_field = SubscriptionField::new(name.as_str(), type_ref(&field.ty), move |ctx| {
                let binding = Arc::clone(&binding);
                SubscriptionFieldFuture::new(async move {
                    let resolved = binding.resolve(&ctx).await?;
                    let value = to_field_value(resolved, &binding.ty, &binding.kind)
                        .unwrap_or(FieldValue::NULL);
                    // One-shot: the current value, then the stream ends
                    Ok(futures::stream::once(async move {
                        Ok::<_, async_graphql::Error>(value)
                    }))
                })
            });
            subscription =
                subscription.field(inputs.into_iter().fold(graphql_field, SubscriptionField::argument));
        }

        subscription
    }
}

/// Everything a dynamic field needs at execution time
struct FieldBinding {
    info: FieldInfo,
    resolver: Option<Resolver>,
    ty: TypeExpr,
    kind: OutputKind,
    arg_scalars: Vec<(String, Option<Arc<dyn ScalarResolver>>)>,
}

impl FieldBinding {
    /// Run the attached resolver, or read the field off the parent
    async fn resolve(&self, ctx: &ResolverContext<'_>) -> async_graphql::Result<Resolved> {
        let parent = ctx
            .parent_value
            .try_downcast_ref::<Resolved>()
            .ok()
            .cloned()
            .unwrap_or_default();

        let Some(resolver) = &self.resolver else {
            return Ok(parent.field(&self.info.field_name));
        };

        let context = ctx
            .data_opt::<Arc<RequestContext>>()
            .cloned()
            .unwrap_or_default();

        let resolved = resolver(parent, self.args(ctx), context, self.info.clone()).await?;
        Ok(resolved)
    }

    fn args(&self, ctx: &ResolverContext<'_>) -> Args {
        ctx.args
            .as_index_map()
            .iter()
            .map(|(name, value)| {
                let scalar = self
                    .arg_scalars
                    .iter()
                    .find(|(arg, _)| arg == name.as_str())
                    .and_then(|(_, scalar)| scalar.as_ref());
                let json = match scalar {
                    Some(scalar) => scalar.parse_literal(value),
                    None => literal_to_json(value),
                };
                (name.to_string(), json)
            })
            .collect()
    }
}

fn type_ref(expr: &TypeExpr) -> TypeRef {
    match expr {
        TypeExpr::Named(name) => TypeRef::named(name.clone()),
        TypeExpr::List(inner) => TypeRef::List(Box::new(type_ref(inner))),
        TypeExpr::NonNull(inner) => TypeRef::NonNull(Box::new(type_ref(inner))),
    }
}

/// `<Name>Input` with the non-relation fields of an input-flagged type
fn build_input_object(fragment: &TypeFragment) -> InputObject {
    fragment
        .fields
        .iter()
        .filter(|(_, field)| !field.relation)
        .fold(
            InputObject::new(format!("{}Input", fragment.name)),
            |input, (name, field)| {
                let ty = field.ty.map_base(&|base| {
                    if is_known_scalar(base) {
                        base.to_string()
                    } else {
                        format!("{}Input", base)
                    }
                });
                input.field(InputValue::new(name.as_str(), type_ref(&ty)))
            },
        )
}

/// Shape a resolved value for the engine according to the field type
fn to_field_value<'a>(value: Resolved, expr: &TypeExpr, kind: &OutputKind) -> Option<FieldValue<'a>> {
    if value.is_null() {
        return None;
    }

    match expr {
        TypeExpr::NonNull(inner) => to_field_value(value, inner, kind),
        TypeExpr::List(inner) => {
            let items: Vec<Resolved> = match value {
                Resolved::List(items) => items,
                Resolved::Value(serde_json::Value::Array(items)) => {
                    items.into_iter().map(Resolved::Value).collect()
                }
                Resolved::Page(page) => page.list.into_iter().map(Resolved::Record).collect(),
                other => vec![other],
            };
            Some(FieldValue::list(items.into_iter().map(|item| {
                to_field_value(item, inner, kind).unwrap_or(FieldValue::NULL)
            })))
        }
        TypeExpr::Named(_) => match kind {
            OutputKind::Object => Some(FieldValue::owned_any(value)),
            OutputKind::Union => {
                let type_name = value.as_record().map(|record| record.entity.clone());
                let field_value = FieldValue::owned_any(value);
                Some(match type_name {
                    Some(name) => field_value.with_type(name),
                    None => field_value,
                })
            }
            OutputKind::Leaf(scalar) => {
                let json = value.to_json();
                let json = match scalar {
                    Some(scalar) => scalar.serialize(&json),
                    None => json,
                };
                ConstValue::from_json(json).ok().map(FieldValue::value)
            }
        },
    }
}
