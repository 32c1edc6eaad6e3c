//! SDL printing and AppSync post-processing.
//!
//! [`print_schema`] renders the model as standard GraphQL SDL.
//! [`to_appsync_sdl`] then reshapes that text into what the AppSync schema
//! upload accepts: no scalar declarations, no runs of blank lines, and
//! optionally `#` comments instead of block-string descriptions.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{
    BUILTIN_SCALARS, Directive, EnumValue, Field, InputValue, Schema, TypeDefinition, TypeKind,
};

const BLOCK_QUOTE: &str = "\"\"\"";
const INDENT: &str = "  ";
const DEFAULT_DEPRECATION_REASON: &str = "No longer supported";

static BLANK_LINE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n)+").expect("valid regex"));

/// Options for [`to_appsync_sdl`].
#[derive(Debug, Clone, Default)]
pub struct PrintOptions {
    /// Rewrite block-string descriptions as `#` comment lines.
    pub comment_descriptions: bool,
}

/// Prints the schema as GraphQL SDL, types in declaration order.
///
/// Built-in scalars are skipped. A `schema { ... }` block is emitted only
/// when a root type does not use its conventional name.
#[must_use]
pub fn print_schema(schema: &Schema) -> String {
    let mut blocks = Vec::new();

    if let Some(block) = schema_block(schema) {
        blocks.push(block);
    }
    for definition in schema.types.values() {
        if matches!(definition.kind, TypeKind::Scalar)
            && BUILTIN_SCALARS.contains(&definition.name.as_str())
        {
            continue;
        }
        blocks.push(print_type(definition));
    }

    let mut sdl = blocks.join("\n\n");
    sdl.push('\n');
    sdl
}

/// Prints the schema in the form accepted by AppSync.
#[must_use]
pub fn to_appsync_sdl(schema: &Schema, options: &PrintOptions) -> String {
    let sdl = strip_scalar_declarations(&print_schema(schema));
    let sdl = collapse_blank_lines(&sdl);
    if options.comment_descriptions {
        convert_block_descriptions(&sdl)
    } else {
        sdl
    }
}

fn schema_block(schema: &Schema) -> Option<String> {
    let roots = [
        ("query", schema.query_type.as_deref(), "Query"),
        ("mutation", schema.mutation_type.as_deref(), "Mutation"),
        ("subscription", schema.subscription_type.as_deref(), "Subscription"),
    ];
    let standard = roots
        .iter()
        .all(|(_, name, conventional)| name.is_none_or(|n| n == *conventional));
    if standard {
        return None;
    }

    let mut block = String::from("schema {\n");
    for (operation, name, _) in roots {
        if let Some(name) = name {
            let _ = writeln!(block, "{INDENT}{operation}: {name}");
        }
    }
    block.push('}');
    Some(block)
}

fn print_type(definition: &TypeDefinition) -> String {
    let mut out = description(definition.description.as_deref(), "");
    let name = &definition.name;

    match &definition.kind {
        TypeKind::Scalar => {
            let _ = write!(out, "scalar {name}");
        }
        TypeKind::Object { fields, interfaces } => {
            let _ = write!(out, "type {name}{}", implements(interfaces));
            push_fields(&mut out, fields.values().map(print_field));
        }
        TypeKind::Interface { fields, interfaces } => {
            let _ = write!(out, "interface {name}{}", implements(interfaces));
            push_fields(&mut out, fields.values().map(print_field));
        }
        TypeKind::Union { members } => {
            let _ = write!(out, "union {name}");
            if !members.is_empty() {
                let _ = write!(out, " = {}", members.join(" | "));
            }
        }
        TypeKind::Enum { values } => {
            let _ = write!(out, "enum {name}");
            push_fields(&mut out, values.iter().map(print_enum_value));
        }
        TypeKind::InputObject { fields } => {
            let _ = write!(out, "input {name}");
            push_fields(&mut out, fields.values().map(|f| print_input_value(f, INDENT)));
        }
    }
    out
}

fn implements(interfaces: &[String]) -> String {
    if interfaces.is_empty() {
        String::new()
    } else {
        format!(" implements {}", interfaces.join(" & "))
    }
}

/// Appends `{ ... }` with one entry per line; nothing for an empty body.
fn push_fields(out: &mut String, entries: impl Iterator<Item = String>) {
    let body: Vec<String> = entries.collect();
    if body.is_empty() {
        return;
    }
    out.push_str(" {\n");
    out.push_str(&body.join("\n"));
    out.push_str("\n}");
}

fn print_field(field: &Field) -> String {
    let mut out = description(field.description.as_deref(), INDENT);
    let _ = write!(out, "{INDENT}{}", field.name);

    if !field.args.is_empty() {
        let described = field.args.values().any(|a| a.description.is_some());
        if described {
            let nested = format!("{INDENT}{INDENT}");
            let args: Vec<String> = field
                .args
                .values()
                .map(|a| print_input_value(a, &nested))
                .collect();
            let _ = write!(out, "(\n{}\n{INDENT})", args.join("\n"));
        } else {
            let args: Vec<String> = field
                .args
                .values()
                .map(|a| print_input_value(a, ""))
                .collect();
            let _ = write!(out, "({})", args.join(", "));
        }
    }

    let _ = write!(out, ": {}", field.ty);
    out.push_str(&deprecated(field.deprecation_reason.as_deref()));
    for directive in &field.directives {
        out.push_str(&print_directive(directive));
    }
    out
}

fn print_input_value(value: &InputValue, indent: &str) -> String {
    let mut out = description(value.description.as_deref(), indent);
    let _ = write!(out, "{indent}{}: {}", value.name, value.ty);
    if let Some(default) = &value.default_value {
        let _ = write!(out, " = {default}");
    }
    out
}

fn print_enum_value(value: &EnumValue) -> String {
    let mut out = description(value.description.as_deref(), INDENT);
    let _ = write!(out, "{INDENT}{}", value.name);
    out.push_str(&deprecated(value.deprecation_reason.as_deref()));
    out
}

fn print_directive(directive: &Directive) -> String {
    format!(" {directive}")
}

fn deprecated(reason: Option<&str>) -> String {
    match reason {
        None => String::new(),
        Some("") | Some(DEFAULT_DEPRECATION_REASON) => " @deprecated".to_string(),
        Some(reason) => format!(" @deprecated(reason: {})", string_literal(reason)),
    }
}

fn string_literal(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}

/// Block-string description followed by a newline, or empty.
fn description(text: Option<&str>, indent: &str) -> String {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return String::new();
    };
    let escaped = text.replace(BLOCK_QUOTE, "\\\"\"\"");

    if !escaped.contains('\n') && !escaped.ends_with('"') && !escaped.ends_with('\\') {
        return format!("{indent}{BLOCK_QUOTE}{escaped}{BLOCK_QUOTE}\n");
    }

    let mut out = format!("{indent}{BLOCK_QUOTE}\n");
    for line in escaped.lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            let _ = writeln!(out, "{indent}{line}");
        }
    }
    let _ = writeln!(out, "{indent}{BLOCK_QUOTE}");
    out
}

/// Removes top-level `scalar X` declarations together with the description
/// directly above them.
fn strip_scalar_declarations(sdl: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut pending: Vec<&str> = Vec::new();
    let mut in_block = false;

    for line in sdl.lines() {
        if in_block {
            pending.push(line);
            if closing_content(line.trim_end()).is_some() {
                in_block = false;
            }
            continue;
        }
        if line.starts_with(BLOCK_QUOTE) {
            pending.push(line);
            in_block = !is_single_line_block(line);
            continue;
        }
        if line.starts_with('#') {
            pending.push(line);
            continue;
        }
        if line.starts_with("scalar ") {
            pending.clear();
            continue;
        }
        out.append(&mut pending);
        out.push(line);
    }
    out.append(&mut pending);

    let mut result = out.join("\n");
    result.push('\n');
    result
}

fn is_single_line_block(line: &str) -> bool {
    let line = line.trim();
    line.len() >= 2 * BLOCK_QUOTE.len() && closing_content(&line[BLOCK_QUOTE.len()..]).is_some()
}

/// Text before a closing `"""` at the end of `line`. An escaped `\"""` is
/// block content and does not close the block.
fn closing_content(line: &str) -> Option<&str> {
    let rest = line.strip_suffix(BLOCK_QUOTE)?;
    (!rest.ends_with('\\')).then_some(rest)
}

fn collapse_blank_lines(sdl: &str) -> String {
    let collapsed = BLANK_LINE_RUNS.replace_all(sdl, "\n\n");
    let trimmed = collapsed.trim_matches('\n');
    format!("{trimmed}\n")
}

/// Rewrites every block-string description as `#` comment lines at the
/// description's indentation.
fn convert_block_descriptions(sdl: &str) -> String {
    let mut out = String::with_capacity(sdl.len());
    let mut lines = sdl.lines();

    while let Some(line) = lines.next() {
        let trimmed = line.trim_start();
        if !trimmed.starts_with(BLOCK_QUOTE) {
            out.push_str(line);
            out.push('\n');
            continue;
        }
        let indent = &line[..line.len() - trimmed.len()];

        let mut content = Vec::new();
        if is_single_line_block(trimmed) {
            let inner = &trimmed[BLOCK_QUOTE.len()..trimmed.trim_end().len() - BLOCK_QUOTE.len()];
            content.push(inner.to_string());
        } else {
            let opening = trimmed[BLOCK_QUOTE.len()..].trim();
            if !opening.is_empty() {
                content.push(opening.to_string());
            }
            for inner in lines.by_ref() {
                let inner = inner.trim();
                if let Some(rest) = closing_content(inner) {
                    if !rest.is_empty() {
                        content.push(rest.to_string());
                    }
                    break;
                }
                content.push(inner.to_string());
            }
        }

        while content.last().is_some_and(|l| l.trim().is_empty()) {
            content.pop();
        }
        for text in content {
            let text = text.trim().replace("\\\"\"\"", BLOCK_QUOTE);
            if text.is_empty() {
                let _ = writeln!(out, "{indent}#");
            } else {
                let _ = writeln!(out, "{indent}# {text}");
            }
        }
    }
    out
}
