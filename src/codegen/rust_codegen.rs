//! Standalone Rust code generation from rule sets.
//!
//! The generated unit embeds the portable runtime (message model and text
//! splice) as private modules and unrolls every filter, row, mapping and
//! transform into straight-line code inside a single public function:
//!
//! ```text
//! pub fn transform(input: &str) -> Result<String, String>
//! ```
//!
//! Output is a pure function of the rule set and config, so it can be
//! snapshot-tested.

use crate::codegen::utils::{option_literal, rust_string_literal, strip_test_module, to_function_name};
use crate::engine::{Filter, Mapping};
use crate::locator::Locator;
use crate::predicate::{FilterCommand, FilterRow, Operator};
use crate::rules::RuleSet;
use crate::runtime::{MESSAGE_SOURCE, SPLICE_SOURCE};
use crate::transform::{Transform, TransformCommand};
use std::fmt::Write;

/// Default name of the generated entry point.
pub const DEFAULT_FUNCTION_NAME: &str = "transform";

/// Configuration for Rust code generation
#[derive(Debug, Clone)]
pub struct CodegenConfig {
    /// Name of the generated entry point, normalized to snake_case
    pub function_name: String,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            function_name: DEFAULT_FUNCTION_NAME.to_string(),
        }
    }
}

/// Generate the standalone unit for `rules` as a string.
pub fn generate(rules: &RuleSet, config: &CodegenConfig) -> String {
    let mut code = String::new();
    generate_rust_code(&mut code, rules, config).expect("writing to a String cannot fail");
    code
}

/// Write the standalone unit for `rules` to `out`.
pub fn generate_rust_code<W: Write>(
    out: &mut W,
    rules: &RuleSet,
    config: &CodegenConfig,
) -> std::fmt::Result {
    let function_name = to_function_name(&config.function_name, DEFAULT_FUNCTION_NAME);
    tracing::debug!(
        rule_set = %rules.name,
        function = %function_name,
        filters = rules.filters.len(),
        "Generating standalone rewrite unit"
    );

    writeln!(out, "//! Standalone HL7v2 rewrite generated from rule set {:?}.", rules.name)?;
    writeln!(out, "//!")?;
    writeln!(out, "//! Generated by hl7-rewrite. Regenerate instead of editing by hand.")?;
    writeln!(out)?;
    writeln!(out, "#![allow(dead_code)]")?;
    writeln!(out)?;

    writeln!(out, "mod message {{")?;
    write!(out, "{}", strip_test_module(MESSAGE_SOURCE))?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "mod splice {{")?;
    write!(out, "{}", strip_test_module(SPLICE_SOURCE))?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(out, "/// Apply rule set {:?} to `input`.", rules.name)?;
    writeln!(out, "///")?;
    writeln!(out, "/// Returns the rewritten message text, or `Err` when `input` or an")?;
    writeln!(out, "/// intermediate rewrite is not a valid message.")?;
    writeln!(out, "pub fn {}(input: &str) -> Result<String, String> {{", function_name)?;

    let writes = rules.filters.iter().any(|f| !f.mappings.is_empty());
    writeln!(
        out,
        "    let {}msg = message::Message::parse(input).map_err(|e| e.to_string())?;",
        if writes { "mut " } else { "" }
    )?;

    for (index, filter) in rules.filters.iter().enumerate() {
        writeln!(out)?;
        generate_filter(out, index, filter)?;
    }

    writeln!(out)?;
    writeln!(out, "    Ok(msg.to_string())")?;
    writeln!(out, "}}")?;

    Ok(())
}

fn read_call(locator: &Locator) -> String {
    format!(
        "msg.value({}, {}, {})",
        rust_string_literal(locator.segment()),
        option_literal(locator.field()),
        option_literal(locator.component())
    )
}

fn condition(row: &FilterRow) -> String {
    let value = rust_string_literal(&row.value);
    match row.command {
        FilterCommand::StartsWith => format!("source.starts_with({})", value),
        FilterCommand::Contains => format!("source.contains({})", value),
        FilterCommand::EndsWith => format!("source.ends_with({})", value),
        FilterCommand::Exact => format!("source == {}", value),
    }
}

fn generate_filter<W: Write>(out: &mut W, index: usize, filter: &Filter) -> std::fmt::Result {
    writeln!(out, "    // Filter {}: {}", index + 1, filter.src)?;
    writeln!(out, "    {{")?;

    match filter.filter_rows.split_first() {
        None => {
            writeln!(out, "        // No conditions: never matches")?;
            writeln!(out, "        let matched = false;")?;
        }
        Some((first, rest)) => {
            writeln!(out, "        let source = {};", read_call(&filter.src))?;
            writeln!(
                out,
                "        let {}matched = {};",
                if rest.is_empty() { "" } else { "mut " },
                condition(first)
            )?;
            for row in rest {
                let op = match row.operator {
                    Operator::And => "&&",
                    Operator::Or => "||",
                };
                writeln!(out, "        matched = matched {} {};", op, condition(row))?;
            }
        }
    }

    writeln!(out, "        if matched {{")?;
    for (index, mapping) in filter.mappings.iter().enumerate() {
        generate_mapping(out, index, mapping)?;
    }
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    Ok(())
}

fn generate_mapping<W: Write>(out: &mut W, index: usize, mapping: &Mapping) -> std::fmt::Result {
    writeln!(out, "            // Mapping {}: {} -> {}", index + 1, mapping.src, mapping.dst)?;
    writeln!(out, "            {{")?;

    let mutates = mapping.transforms.iter().any(|t| !t.is_identity());
    writeln!(
        out,
        "                let {}value = {};",
        if mutates { "mut " } else { "" },
        read_call(&mapping.src)
    )?;

    for (index, transform) in mapping.transforms.iter().enumerate() {
        generate_transform(out, index, transform)?;
    }

    writeln!(
        out,
        "                let text = splice::write_value(msg.as_str(), {}, {}, {}, &value);",
        rust_string_literal(mapping.dst.segment()),
        option_literal(mapping.dst.field()),
        option_literal(mapping.dst.component())
    )?;
    writeln!(
        out,
        "                msg = message::Message::parse(&text).map_err(|e| e.to_string())?;"
    )?;
    writeln!(out, "            }}")?;
    Ok(())
}

fn generate_transform<W: Write>(out: &mut W, index: usize, transform: &Transform) -> std::fmt::Result {
    const INDENT: &str = "                ";
    writeln!(out, "{}// Transform {}: {}", INDENT, index + 1, transform.command)?;

    let literal = rust_string_literal(&transform.args);
    match transform.command {
        TransformCommand::Passthrough => {}
        TransformCommand::Replace => match transform.replace_args() {
            Some((find, replacement)) => writeln!(
                out,
                "{}value = value.replacen({}, {}, 1);",
                INDENT,
                rust_string_literal(find),
                rust_string_literal(replacement)
            )?,
            None => writeln!(
                out,
                "{}// Skipped: malformed arguments {:?}",
                INDENT, transform.args
            )?,
        },
        TransformCommand::AddPrefix => {
            writeln!(out, "{}value = format!(\"{{}}{{}}\", {}, value);", INDENT, literal)?
        }
        TransformCommand::AddSuffix => writeln!(out, "{}value.push_str({});", INDENT, literal)?,
        TransformCommand::RemovePrefix => {
            writeln!(out, "{}if let Some(rest) = value.strip_prefix({}) {{", INDENT, literal)?;
            writeln!(out, "{}    value = rest.to_string();", INDENT)?;
            writeln!(out, "{}}}", INDENT)?;
        }
        TransformCommand::RemoveSuffix => {
            writeln!(out, "{}if let Some(rest) = value.strip_suffix({}) {{", INDENT, literal)?;
            writeln!(out, "{}    value = rest.to_string();", INDENT)?;
            writeln!(out, "{}}}", INDENT)?;
        }
    }
    Ok(())
}
