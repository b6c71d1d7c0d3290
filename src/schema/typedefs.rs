/// SDL rendering
///
/// Renders an `Ast` into schema definition language text: the built-in
/// scalar preamble followed by every type in AST order.

use crate::schema::ast::{args_to_string, Ast, Category, FieldDef, TypeFragment};
use crate::schema::type_mapping::is_known_scalar;
use std::fmt::Write;

/// Built-in scalar declarations emitted before any type
pub const PREAMBLE: &str = "scalar JSON\nscalar Date\n";

/// Render the whole AST
pub fn render(ast: &Ast) -> String {
    let mut out = String::from(PREAMBLE);
    for fragment in ast.types() {
        out.push('\n');
        out.push_str(&render_type(fragment));
    }
    out
}

/// Render one type (and its input companion when flagged)
pub fn render_type(fragment: &TypeFragment) -> String {
    match fragment.category {
        Category::Type => render_object(fragment),
        Category::Enum => format!("enum {} {{{}}}\n", fragment.name, fragment.values.join(" ")),
        Category::Union => format!("union {} = {}\n", fragment.name, fragment.values.join(" | ")),
    }
}

/// Block string for a description, escaping embedded `"""`
///
/// A trailing quote would run into the closing delimiter, so such
/// descriptions fall back to a regular string.
fn description_literal(description: &str) -> String {
    if description.ends_with('"') {
        return serde_json::Value::String(description.to_string()).to_string();
    }
    format!("\"\"\"{}\"\"\"", description.replace("\"\"\"", "\\\"\"\""))
}

fn render_object(fragment: &TypeFragment) -> String {
    let mut out = String::new();
    if let Some(description) = &fragment.description {
        let _ = writeln!(out, "{}", description_literal(description));
    }

    let _ = writeln!(out, "type {} {{", fragment.name);
    for (name, field) in &fragment.fields {
        let _ = writeln!(out, "  {}", render_field(name, field));
    }
    out.push_str("}\n");

    if fragment.input {
        let _ = writeln!(out, "\ninput {}Input {{", fragment.name);
        for (name, field) in fragment.fields.iter().filter(|(_, f)| !f.relation) {
            let ty = field.ty.map_base(&|base| {
                if is_known_scalar(base) {
                    base.to_string()
                } else {
                    format!("{}Input", base)
                }
            });
            let _ = writeln!(out, "  {}: {}", name, ty);
        }
        out.push_str("}\n");
    }

    out
}

/// `name(args): Type`
pub fn render_field(name: &str, field: &FieldDef) -> String {
    if field.args.is_empty() {
        format!("{}: {}", name, field.ty)
    } else {
        format!("{}({}): {}", name, args_to_string(&field.args), field.ty)
    }
}
