//! Rule-set persistence and validation.
//!
//! Rule sets are stored as YAML or JSON in the editor's record shape:
//!
//! ```yaml
//! name: lowercase-sender
//! filters:
//!   - src: MSH.3
//!     filterRows:
//!       - operator: AND
//!         command: startsWith
//!         value: MESA
//!     mappings:
//!       - src: MSH.3
//!         dst: MSH.3
//!         transforms:
//!           - command: replace
//!             args: MESA mesa
//! ```
//!
//! A bare list of filters is also accepted and loads as an unnamed rule set.

use crate::engine::Filter;
use crate::transform::TransformCommand;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Error type for rule-set loading and saving
#[derive(Debug)]
pub enum RuleSetError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Json(serde_json::Error),
}

impl From<std::io::Error> for RuleSetError {
    fn from(err: std::io::Error) -> Self {
        RuleSetError::Io(err)
    }
}

impl From<serde_yaml::Error> for RuleSetError {
    fn from(err: serde_yaml::Error) -> Self {
        RuleSetError::Yaml(err)
    }
}

impl From<serde_json::Error> for RuleSetError {
    fn from(err: serde_json::Error) -> Self {
        RuleSetError::Json(err)
    }
}

impl fmt::Display for RuleSetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSetError::Io(e) => write!(f, "IO error: {}", e),
            RuleSetError::Yaml(e) => write!(f, "YAML error: {}", e),
            RuleSetError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for RuleSetError {}

/// An ordered list of filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub filters: Vec<Filter>,
}

/// A structural problem in a rule set.
///
/// Issues never stop a run: the engine treats the offending part as a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleIssue {
    NoFilterRows { filter: usize },
    NoMappings { filter: usize },
    MalformedReplace {
        filter: usize,
        mapping: usize,
        transform: usize,
        args: String,
    },
}

impl fmt::Display for RuleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleIssue::NoFilterRows { filter } => {
                write!(f, "Filter {} has no conditions and never matches", filter + 1)
            }
            RuleIssue::NoMappings { filter } => {
                write!(f, "Filter {} has no mappings", filter + 1)
            }
            RuleIssue::MalformedReplace {
                filter,
                mapping,
                transform,
                args,
            } => write!(
                f,
                "Filter {} mapping {} transform {}: replace needs 'find replacement', got '{}'",
                filter + 1,
                mapping + 1,
                transform + 1,
                args
            ),
        }
    }
}

impl RuleSet {
    pub fn new(name: impl Into<String>, filters: Vec<Filter>) -> Self {
        Self {
            name: name.into(),
            filters,
        }
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, RuleSetError> {
        let yaml: serde_yaml::Value = serde_yaml::from_str(contents)?;
        if yaml.is_sequence() {
            return Ok(Self::new("", serde_yaml::from_value(yaml)?));
        }
        Ok(serde_yaml::from_value(yaml)?)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, RuleSetError> {
        let json: serde_json::Value = serde_json::from_str(contents)?;
        if json.is_array() {
            return Ok(Self::new("", serde_json::from_value(json)?));
        }
        Ok(serde_json::from_value(json)?)
    }

    /// Load a rule set from disk.
    ///
    /// `.yaml`/`.yml` files are read as YAML, anything else as JSON. An
    /// unnamed rule set takes the file stem as its name.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, RuleSetError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        let mut rules = if is_yaml(path) {
            Self::from_yaml_str(&contents)?
        } else {
            Self::from_json_str(&contents)?
        };

        if rules.name.is_empty() {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                rules.name = stem.to_string();
            }
        }

        tracing::info!(
            path = %path.display(),
            rule_set = %rules.name,
            filters = rules.filters.len(),
            "Loaded rule set"
        );
        Ok(rules)
    }

    pub fn to_yaml(&self) -> Result<String, RuleSetError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> Result<String, RuleSetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save to disk, choosing the format by extension like [`RuleSet::load_from_file`].
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), RuleSetError> {
        let path = path.as_ref();
        let contents = if is_yaml(path) { self.to_yaml()? } else { self.to_json()? };
        crate::codegen::fs_utils::write_file(path, contents)?;
        Ok(())
    }

    /// Report structural issues.
    pub fn validate(&self) -> Vec<RuleIssue> {
        let mut issues = Vec::new();

        for (f, filter) in self.filters.iter().enumerate() {
            if filter.filter_rows.is_empty() {
                issues.push(RuleIssue::NoFilterRows { filter: f });
            }
            if filter.mappings.is_empty() {
                issues.push(RuleIssue::NoMappings { filter: f });
            }
            for (m, mapping) in filter.mappings.iter().enumerate() {
                for (t, transform) in mapping.transforms.iter().enumerate() {
                    if transform.command == TransformCommand::Replace
                        && transform.replace_args().is_none()
                    {
                        issues.push(RuleIssue::MalformedReplace {
                            filter: f,
                            mapping: m,
                            transform: t,
                            args: transform.args.clone(),
                        });
                    }
                }
            }
        }

        issues
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
