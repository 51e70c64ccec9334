//! Filter predicates.
//!
//! A filter holds ordered rows, each a string test against the filter's
//! source value. Rows fold strictly left to right: the first row seeds the
//! result and each following row combines with the accumulator through its
//! own operator. There is no operator precedence.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Deserialize a scalar (string, number, bool or null) as text.
///
/// YAML rule files often carry unquoted values such as `2.5` or `01`; numbers
/// are rendered back with their default formatting, so quote values whose exact
/// spelling matters.
pub(crate) fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        None => String::new(),
        Some(Scalar::Text(s)) => s,
        Some(Scalar::Int(i)) => i.to_string(),
        Some(Scalar::Float(f)) => f.to_string(),
        Some(Scalar::Bool(b)) => b.to_string(),
    })
}

/// How a row combines with the rows before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    #[default]
    And,
    Or,
}

/// String test applied by a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterCommand {
    StartsWith,
    Contains,
    EndsWith,
    Exact,
}

impl FilterCommand {
    /// Apply the test to `source`. Case-sensitive.
    pub fn test(self, source: &str, value: &str) -> bool {
        match self {
            FilterCommand::StartsWith => source.starts_with(value),
            FilterCommand::Contains => source.contains(value),
            FilterCommand::EndsWith => source.ends_with(value),
            FilterCommand::Exact => source == value,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterCommand::StartsWith => "startsWith",
            FilterCommand::Contains => "contains",
            FilterCommand::EndsWith => "endsWith",
            FilterCommand::Exact => "exact",
        }
    }
}

impl fmt::Display for FilterCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One condition of a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRow {
    /// Ignored on the first row
    #[serde(default)]
    pub operator: Operator,
    pub command: FilterCommand,
    #[serde(default, deserialize_with = "scalar_string")]
    pub value: String,
}

impl FilterRow {
    pub fn new(operator: Operator, command: FilterCommand, value: impl Into<String>) -> Self {
        Self {
            operator,
            command,
            value: value.into(),
        }
    }

    pub fn matches(&self, source: &str) -> bool {
        self.command.test(source, &self.value)
    }
}

/// Evaluate `rows` against `source`.
///
/// An empty row list never matches.
pub fn evaluate(source: &str, rows: &[FilterRow]) -> bool {
    let Some((first, rest)) = rows.split_first() else {
        return false;
    };

    rest.iter().fold(first.matches(source), |acc, row| {
        let matched = row.matches(source);
        match row.operator {
            Operator::And => acc && matched,
            Operator::Or => acc || matched,
        }
    })
}
