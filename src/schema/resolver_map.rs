/// Resolver map assembly
///
/// Collects the resolvers attached to AST fields into a
/// `{type: {field: resolver}}` map, alongside the built-in scalar resolvers.

use crate::schema::ast::{Ast, Category};
use crate::schema::resolver::Resolver;
use crate::schema::scalars::{builtin_scalars, ScalarResolver};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct ResolverMap {
    types: IndexMap<String, IndexMap<String, Resolver>>,
    scalars: IndexMap<String, Arc<dyn ScalarResolver>>,
}

impl ResolverMap {
    /// Copy every attached field resolver out of the AST
    pub fn assemble(ast: &Ast) -> Self {
        let mut map = Self::default();

        for scalar in builtin_scalars() {
            map.scalars.insert(scalar.name().to_string(), scalar);
        }

        for fragment in ast.types().filter(|t| t.category == Category::Type) {
            let fields: IndexMap<String, Resolver> = fragment
                .fields
                .iter()
                .filter_map(|(name, field)| {
                    field
                        .resolver
                        .as_ref()
                        .map(|resolver| (name.clone(), Arc::clone(resolver)))
                })
                .collect();
            map.types.insert(fragment.name.clone(), fields);
        }

        tracing::debug!(
            "Assembled {} resolvers across {} types",
            map.resolver_count(),
            map.types.len()
        );
        map
    }

    pub fn get(&self, type_name: &str, field: &str) -> Option<&Resolver> {
        self.types.get(type_name).and_then(|fields| fields.get(field))
    }

    pub fn fields(&self, type_name: &str) -> Option<&IndexMap<String, Resolver>> {
        self.types.get(type_name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn scalar(&self, name: &str) -> Option<&Arc<dyn ScalarResolver>> {
        self.scalars.get(name)
    }

    pub fn resolver_count(&self) -> usize {
        self.types.values().map(IndexMap::len).sum()
    }
}

impl fmt::Debug for ResolverMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (type_name, fields) in &self.types {
            map.entry(type_name, &fields.keys().collect::<Vec<_>>());
        }
        map.finish()
    }
}
