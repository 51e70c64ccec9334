//! Application configuration.
//!
//! Settings come from an optional `hl7-rewrite.yaml` and are then overridden
//! by environment variables (after `.env` has been loaded by the binary):
//!
//! | Variable                | Setting          |
//! |-------------------------|------------------|
//! | `HL7_REWRITE_TEMPLATES` | `templates_path` |
//! | `HL7_REWRITE_LOG`       | `log_filter`     |
//! | `HL7_REWRITE_FUNCTION`  | `function_name`  |

use crate::codegen::{CodegenConfig, DEFAULT_FUNCTION_NAME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "hl7-rewrite.yaml";

pub const ENV_TEMPLATES: &str = "HL7_REWRITE_TEMPLATES";
pub const ENV_LOG: &str = "HL7_REWRITE_LOG";
pub const ENV_FUNCTION: &str = "HL7_REWRITE_FUNCTION";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// JSON file backing the template catalog
    pub templates_path: PathBuf,
    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Entry point name for generated units
    pub function_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            templates_path: PathBuf::from("templates.json"),
            log_filter: "warn".to_string(),
            function_name: DEFAULT_FUNCTION_NAME.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

        Self::from_yaml_str(&contents).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, String> {
        // An empty file is a valid, all-defaults config.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents).map_err(|e| e.to_string())
    }

    /// Resolve configuration for a run.
    ///
    /// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
    /// read when present. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides looked up by variable name.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_TEMPLATES).filter(|v| !v.is_empty()) {
            self.templates_path = PathBuf::from(path);
        }
        if let Some(filter) = lookup(ENV_LOG).filter(|v| !v.is_empty()) {
            self.log_filter = filter;
        }
        if let Some(name) = lookup(ENV_FUNCTION).filter(|v| !v.is_empty()) {
            self.function_name = name;
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.templates_path.as_os_str().is_empty() {
            return Err("templates_path must not be empty".to_string());
        }
        if self.log_filter.trim().is_empty() {
            return Err("log_filter must not be empty".to_string());
        }
        Ok(())
    }

    pub fn codegen(&self) -> CodegenConfig {
        CodegenConfig {
            function_name: self.function_name.clone(),
        }
    }
}
