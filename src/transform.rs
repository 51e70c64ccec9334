//! Value rewrite pipeline.
//!
//! Each mapping runs its transforms in order, each step consuming the
//! previous step's output. Malformed arguments degrade to identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rewrite applied by one transform step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformCommand {
    Replace,
    Passthrough,
    AddPrefix,
    RemovePrefix,
    AddSuffix,
    RemoveSuffix,
}

impl TransformCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            TransformCommand::Replace => "replace",
            TransformCommand::Passthrough => "passthrough",
            TransformCommand::AddPrefix => "addPrefix",
            TransformCommand::RemovePrefix => "removePrefix",
            TransformCommand::AddSuffix => "addSuffix",
            TransformCommand::RemoveSuffix => "removeSuffix",
        }
    }
}

impl fmt::Display for TransformCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of a mapping's pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transform {
    pub command: TransformCommand,
    /// `replace`: "find replacement"; prefix/suffix commands: the literal
    #[serde(default, deserialize_with = "crate::predicate::scalar_string")]
    pub args: String,
}

impl Transform {
    pub fn new(command: TransformCommand, args: impl Into<String>) -> Self {
        Self {
            command,
            args: args.into(),
        }
    }

    pub fn passthrough() -> Self {
        Self::new(TransformCommand::Passthrough, "")
    }

    /// `(find, replacement)` for a well-formed `replace`.
    ///
    /// Arguments split on whitespace; tokens past the second are ignored.
    pub fn replace_args(&self) -> Option<(&str, &str)> {
        if self.command != TransformCommand::Replace {
            return None;
        }
        let mut tokens = self.args.split_whitespace();
        Some((tokens.next()?, tokens.next()?))
    }

    /// Whether this step can never change a value.
    pub fn is_identity(&self) -> bool {
        match self.command {
            TransformCommand::Passthrough => true,
            TransformCommand::Replace => self.replace_args().is_none(),
            _ => false,
        }
    }

    /// Apply this step to `value`.
    pub fn apply(&self, value: String) -> String {
        match self.command {
            TransformCommand::Passthrough => value,
            TransformCommand::Replace => match self.replace_args() {
                Some((find, replacement)) => value.replacen(find, replacement, 1),
                None => value,
            },
            TransformCommand::AddPrefix => format!("{}{}", self.args, value),
            TransformCommand::AddSuffix => format!("{}{}", value, self.args),
            TransformCommand::RemovePrefix => match value.strip_prefix(self.args.as_str()) {
                Some(rest) => rest.to_string(),
                None => value,
            },
            TransformCommand::RemoveSuffix => match value.strip_suffix(self.args.as_str()) {
                Some(rest) => rest.to_string(),
                None => value,
            },
        }
    }
}

/// Run `value` through `transforms` in order.
pub fn apply(value: &str, transforms: &[Transform]) -> String {
    transforms.iter().fold(value.to_string(), |current, transform| {
        let next = transform.apply(current);
        tracing::trace!(command = %transform.command, value = %next, "Applied transform");
        next
    })
}
