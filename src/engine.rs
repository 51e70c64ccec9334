//! Rule engine: filters guarding mappings, applied in order over a message.
//!
//! Each filter reads its source from the current message, evaluates its rows
//! and, on a match, runs its mappings. Every mapping write reparses the
//! message, so later mappings and later filters observe earlier writes.

use crate::locator::Locator;
use crate::predicate::{evaluate, FilterRow};
use crate::resolver::{resolve, write};
use crate::rules::RuleSet;
use crate::runtime::{Message, ParseError};
use crate::transform::{apply, Transform};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A source-to-destination rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub src: Locator,
    pub dst: Locator,
    #[serde(default)]
    pub transforms: Vec<Transform>,
}

/// Predicate-guarded group of mappings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub src: Locator,
    #[serde(default)]
    pub filter_rows: Vec<FilterRow>,
    #[serde(default)]
    pub mappings: Vec<Mapping>,
}

impl Filter {
    /// Whether the rows match the filter source in `message`.
    pub fn matches(&self, message: &Message) -> bool {
        evaluate(&resolve(message, &self.src), &self.filter_rows)
    }
}

/// Error type for rewrite runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteError {
    /// The input text is not a valid message
    InvalidInput(ParseError),
    /// A mapping wrote text that no longer parses (e.g. blanked MSH-2)
    InvalidRewrite {
        filter: usize,
        mapping: usize,
        source: ParseError,
    },
}

impl fmt::Display for RewriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewriteError::InvalidInput(e) => write!(f, "Invalid input message: {}", e),
            RewriteError::InvalidRewrite {
                filter,
                mapping,
                source,
            } => write!(
                f,
                "Filter {} mapping {} produced an invalid message: {}",
                filter + 1,
                mapping + 1,
                source
            ),
        }
    }
}

impl std::error::Error for RewriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RewriteError::InvalidInput(e) => Some(e),
            RewriteError::InvalidRewrite { source, .. } => Some(source),
        }
    }
}

impl From<ParseError> for RewriteError {
    fn from(err: ParseError) -> Self {
        RewriteError::InvalidInput(err)
    }
}

/// Apply `filters` in order to `message`, returning the rewritten message.
///
/// Returns the message unchanged when no filter matches.
pub fn apply_filters(message: &Message, filters: &[Filter]) -> Result<Message, RewriteError> {
    let mut current = message.clone();

    for (filter_index, filter) in filters.iter().enumerate() {
        let source = resolve(&current, &filter.src);
        let matched = evaluate(&source, &filter.filter_rows);
        tracing::debug!(
            filter = filter_index + 1,
            src = %filter.src,
            source = %source,
            matched,
            "Evaluated filter"
        );
        if !matched {
            continue;
        }

        for (mapping_index, mapping) in filter.mappings.iter().enumerate() {
            let value = apply(&resolve(&current, &mapping.src), &mapping.transforms);
            let text = write(current.as_str(), &mapping.dst, &value);
            tracing::debug!(
                filter = filter_index + 1,
                mapping = mapping_index + 1,
                src = %mapping.src,
                dst = %mapping.dst,
                value = %value,
                "Applied mapping"
            );
            current = Message::parse(&text).map_err(|source| RewriteError::InvalidRewrite {
                filter: filter_index,
                mapping: mapping_index,
                source,
            })?;
        }
    }

    Ok(current)
}

/// Applies a rule set to messages.
///
/// # Example
///
/// ```
/// use hl7_rewrite::{Rewriter, RuleSet};
///
/// let rules = RuleSet::from_yaml_str(r#"
/// name: prefix-sender
/// filters:
///   - src: MSH.3
///     filterRows:
///       - command: contains
///         value: MESA
///     mappings:
///       - src: MSH.3
///         dst: MSH.3
///         transforms:
///           - command: addPrefix
///             args: X_
/// "#).unwrap();
///
/// let out = Rewriter::new(rules).rewrite("MSH|^~\\&|MESA_RPT_MGR|EAST").unwrap();
/// assert_eq!(out, "MSH|^~\\&|X_MESA_RPT_MGR|EAST");
/// ```
#[derive(Debug, Clone)]
pub struct Rewriter {
    rules: RuleSet,
}

impl Rewriter {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Rewrite a parsed message.
    pub fn apply(&self, message: &Message) -> Result<Message, RewriteError> {
        apply_filters(message, &self.rules.filters)
    }

    /// Parse `text`, rewrite it and serialize the result.
    pub fn rewrite(&self, text: &str) -> Result<String, RewriteError> {
        let message = Message::parse(text)?;
        tracing::debug!(
            rule_set = %self.rules.name,
            segments = message.segments().len(),
            "Rewriting message"
        );
        Ok(self.apply(&message)?.to_string())
    }
}
