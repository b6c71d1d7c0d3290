/// GraphQL schema generation from an ORM model
///
/// `parser` walks the model registry into an intermediate AST of type
/// fragments, `typedefs` renders that AST to SDL text and `resolver_map`
/// collects the field resolvers attached to it. `builder` ties the pieces
/// together and adapts the result into an executable dynamic schema.

pub mod ast;
pub mod builder;
pub mod cursor;
pub mod methods;
pub mod naming;
pub mod parser;
pub mod resolver;
pub mod resolver_map;
pub mod scalars;
pub mod type_mapping;
pub mod typedefs;

pub use ast::{Ast, FieldDef, TypeExpr, TypeFragment};
pub use builder::{GeneratedSchema, SchemaBuilder};
pub use cursor::{CursorNamespace, CursorStyle};
pub use resolver::{Page, RequestContext, Resolved, Resolver, ResolverFactory};
pub use resolver_map::ResolverMap;
pub use scalars::register_custom_scalars;
