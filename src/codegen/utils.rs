//! Utility functions for code generation.

use convert_case::{Case, Casing};

/// Reserved words that cannot name a generated function.
const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield", "main",
];

/// Convert a string to snake_case
pub fn to_snake_case(s: &str) -> String {
    s.to_case(Case::Snake)
}

/// Escape a string for use in Rust string literals
pub fn escape_rust_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .replace('\0', "\\0")
}

/// Quote `s` as a Rust string literal
pub fn rust_string_literal(s: &str) -> String {
    format!("\"{}\"", escape_rust_string(s))
}

/// Render an optional index as `Some(n)` or `None`
pub fn option_literal(value: Option<usize>) -> String {
    match value {
        Some(n) => format!("Some({})", n),
        None => "None".to_string(),
    }
}

/// Whether `s` can be used verbatim as a Rust function name.
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && s != "_"
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !RUST_KEYWORDS.contains(&s)
}

/// Normalize `name` to a snake_case identifier, or return `fallback`.
pub fn to_function_name(name: &str, fallback: &str) -> String {
    let name = to_snake_case(name.trim());
    if is_valid_identifier(&name) {
        name
    } else {
        tracing::warn!(name = %name, fallback, "Invalid function name, using fallback");
        fallback.to_string()
    }
}

/// Source text with its trailing `#[cfg(test)]` module removed.
pub fn strip_test_module(source: &str) -> String {
    let body = match source.find("\n#[cfg(test)]") {
        Some(index) => &source[..index],
        None => source,
    };
    format!("{}\n", body.trim_end())
}
