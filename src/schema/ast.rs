/// Intermediate schema tree
///
/// Every mapping step contributes `TypeFragment`s; `Ast` accumulates them
/// with an explicit merge law:
///
/// - fragments with the same name merge field-by-field
/// - a field defined twice keeps the last definition (logged at debug level)
/// - `input` / `connection` flags are sticky once set
/// - enum/union values are unioned in first-seen order
///
/// Types and fields iterate in insertion order, which is the order the SDL
/// renderer emits them in.

use crate::schema::resolver::Resolver;
use indexmap::IndexMap;
use std::fmt;

/// A GraphQL type expression: `Name`, `[T]`, `T!`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Named(String),
    List(Box<TypeExpr>),
    NonNull(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(name.into())
    }

    pub fn list(inner: TypeExpr) -> Self {
        TypeExpr::List(Box::new(inner))
    }

    pub fn non_null(inner: TypeExpr) -> Self {
        match inner {
            already @ TypeExpr::NonNull(_) => already,
            other => TypeExpr::NonNull(Box::new(other)),
        }
    }

    /// Innermost named type
    pub fn base_name(&self) -> &str {
        match self {
            TypeExpr::Named(name) => name,
            TypeExpr::List(inner) | TypeExpr::NonNull(inner) => inner.base_name(),
        }
    }

    pub fn is_list(&self) -> bool {
        match self {
            TypeExpr::List(_) => true,
            TypeExpr::NonNull(inner) => inner.is_list(),
            TypeExpr::Named(_) => false,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, TypeExpr::NonNull(_))
    }

    /// Same shape with the innermost name replaced
    pub fn map_base(&self, f: &impl Fn(&str) -> String) -> TypeExpr {
        match self {
            TypeExpr::Named(name) => TypeExpr::Named(f(name)),
            TypeExpr::List(inner) => TypeExpr::List(Box::new(inner.map_base(f))),
            TypeExpr::NonNull(inner) => TypeExpr::NonNull(Box::new(inner.map_base(f))),
        }
    }

    /// Parse `Name`, `[Name]`, `Name!`, `[[Name!]]!` and so on
    pub fn parse(text: &str) -> Option<TypeExpr> {
        let text = text.trim();
        if let Some(inner) = text.strip_suffix('!') {
            return TypeExpr::parse(inner).map(TypeExpr::non_null);
        }
        if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
            return TypeExpr::parse(inner).map(TypeExpr::list);
        }
        if !text.is_empty() && text.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Some(TypeExpr::named(text));
        }
        None
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named(name) => f.write_str(name),
            TypeExpr::List(inner) => write!(f, "[{}]", inner),
            TypeExpr::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

/// One field argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgDef {
    pub name: String,
    pub ty: TypeExpr,
}

impl ArgDef {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Render an argument list as `a: T, b: U`
pub fn args_to_string(args: &[ArgDef]) -> String {
    args.iter()
        .map(|arg| format!("{}: {}", arg.name, arg.ty))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Field of an object type
#[derive(Clone)]
pub struct FieldDef {
    pub ty: TypeExpr,
    pub args: Vec<ArgDef>,
    /// Object-typed (relation) field; excluded from the companion input type
    pub relation: bool,
    pub resolver: Option<Resolver>,
}

impl FieldDef {
    pub fn new(ty: TypeExpr) -> Self {
        Self {
            ty,
            args: Vec::new(),
            relation: false,
            resolver: None,
        }
    }

    pub fn with_args(mut self, args: Vec<ArgDef>) -> Self {
        self.args = args;
        self
    }

    pub fn relation(mut self) -> Self {
        self.relation = true;
        self
    }

    pub fn resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("ty", &self.ty.to_string())
            .field("args", &args_to_string(&self.args))
            .field("relation", &self.relation)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Type,
    Enum,
    Union,
}

/// A named type, possibly partial until merged with the other fragments
#[derive(Debug, Clone)]
pub struct TypeFragment {
    pub name: String,
    pub category: Category,
    pub description: Option<String>,
    pub fields: IndexMap<String, FieldDef>,
    /// Enum values or union members
    pub values: Vec<String>,
    /// Also emit `<Name>Input`
    pub input: bool,
    /// Pagination wrapper type
    pub connection: bool,
}

impl TypeFragment {
    pub fn object(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: Category::Type,
            description: None,
            fields: IndexMap::new(),
            values: Vec::new(),
            input: false,
            connection: false,
        }
    }

    pub fn enumeration(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            category: Category::Enum,
            values: values.iter().map(|v| v.to_string()).collect(),
            ..Self::object(name)
        }
    }

    pub fn union(name: impl Into<String>, members: &[&str]) -> Self {
        Self {
            category: Category::Union,
            values: members.iter().map(|v| v.to_string()).collect(),
            ..Self::object(name)
        }
    }

    pub fn field(mut self, name: impl Into<String>, field: FieldDef) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn input(mut self) -> Self {
        self.input = true;
        self
    }

    pub fn connection(mut self) -> Self {
        self.connection = true;
        self
    }

    /// Merge a later fragment of the same type into this one
    pub fn merge(&mut self, other: TypeFragment) {
        if self.category != other.category {
            tracing::debug!(
                "Type '{}' redefined from {:?} to {:?}",
                self.name,
                self.category,
                other.category
            );
            self.category = other.category;
        }

        for (name, field) in other.fields {
            if self.fields.contains_key(&name) {
                tracing::debug!("Field '{}.{}' defined twice, keeping the last", self.name, name);
            }
            self.fields.insert(name, field);
        }

        for value in other.values {
            if !self.values.contains(&value) {
                self.values.push(value);
            }
        }

        self.input |= other.input;
        self.connection |= other.connection;
        if other.description.is_some() {
            self.description = other.description;
        }
    }
}

/// Ordered collection of merged type fragments
#[derive(Debug, Clone, Default)]
pub struct Ast {
    types: IndexMap<String, TypeFragment>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fragment, merging with an existing type of the same name
    pub fn insert(&mut self, fragment: TypeFragment) {
        match self.types.get_mut(&fragment.name) {
            Some(existing) => existing.merge(fragment),
            None => {
                self.types.insert(fragment.name.clone(), fragment);
            }
        }
    }

    pub fn merge(&mut self, other: Ast) {
        for fragment in other.types.into_values() {
            self.insert(fragment);
        }
    }

    pub fn merged(mut self, other: Ast) -> Self {
        self.merge(other);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TypeFragment> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeFragment> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Whether `name` is an object or union type (as opposed to a scalar/enum)
    pub fn is_composite(&self, name: &str) -> bool {
        self.types
            .get(name)
            .is_some_and(|t| matches!(t.category, Category::Type | Category::Union))
    }
}

impl FromIterator<TypeFragment> for Ast {
    fn from_iter<I: IntoIterator<Item = TypeFragment>>(iter: I) -> Self {
        let mut ast = Ast::new();
        for fragment in iter {
            ast.insert(fragment);
        }
        ast
    }
}
