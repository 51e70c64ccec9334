//! Code generation for standalone rewrite units.
//!
//! A rule set compiles to a single Rust source file exposing one
//! `fn(&str) -> Result<String, String>` that behaves like
//! [`Rewriter::rewrite`](crate::Rewriter::rewrite) on the same rules.

pub mod fs_utils;
pub mod rust_codegen;
pub mod utils;

pub use rust_codegen::{generate, generate_rust_code, CodegenConfig, DEFAULT_FUNCTION_NAME};

use crate::rules::RuleSet;
use std::path::Path;

/// Generate a unit for `rules` and write it to `output`.
///
/// Returns whether the file changed on disk.
pub fn generate_to_file(
    rules: &RuleSet,
    config: &CodegenConfig,
    output: impl AsRef<Path>,
) -> Result<bool, String> {
    let output = output.as_ref();
    let code = generate(rules, config);
    let changed = fs_utils::write_if_changed(output, code)
        .map_err(|e| format!("Failed to write {}: {}", output.display(), e))?;

    tracing::info!(
        path = %output.display(),
        rule_set = %rules.name,
        changed,
        "Generated rewrite unit"
    );
    Ok(changed)
}
