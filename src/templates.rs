//! Message templates: named input/expected-output pairs used to check rule sets.
//!
//! Templates live behind the [`TemplateStore`] trait so the CLI (or any other
//! editor) can swap storage without touching the engine.

use crate::engine::{RewriteError, Rewriter};
use crate::runtime::line_spans;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A named pair of input and expected output messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub name: String,
    pub input: String,
    pub expected: String,
}

impl MessageTemplate {
    pub fn new(name: impl Into<String>, input: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            expected: expected.into(),
        }
    }
}

/// Built-in sample messages.
pub fn default_templates() -> Vec<MessageTemplate> {
    vec![
        MessageTemplate::new(
            "ORU R01 - Radiology Report",
            "MSH|^~\\&|MESA_RPT_MGR|EAST_RADIOLOGY|iFW|XYZ|||ORU^R01|MESA3b|P|2.4||||||||\n\
PID|||CR3^^^ADT1||CRTHREE^PAUL|||||||||||||PatientAcct||||||||||||\n\
PV1||1|CE||||12345^SMITH^BARON^H|||||||||||\n\
OBR|||||||20010501141500.0000||||||||||||||||||F||||||||||||||||||\n\
OBX|1|HD|SR Instance UID||1.113654.1.2001.30.2.1||||||F||||||\n\
OBX|2|TX|SR Text||Radiology Report History Cough Findings PA evaluation of the chest demonstrates the lungs to be expanded and clear.  Conclusions Normal PA chest x-ray.||||||F||||||",
            "MSH|^~\\&|mesa_RPT_MGR|EAST_radiology|iFW|XYZ|||ORU^R01|MESA3b|P|2.4||||||||\n\
PID|||CR3^^^ADT1||CRTHREE^PAUL|||||||||||||PatientAcct||||||||||||\n\
PV1||1|CE||||12345^SMITH^BARON^H|||||||||||\n\
OBR|||||||20010501141500.0000||||||||||||||||||F||||||||||||||||||\n\
OBX|1|HD|SR Instance UID||1.113654.1.2001.30.2.1||||||F||||||\n\
OBX|2|TX|SR Text||Radiology Report History Cough Findings PA evaluation of the chest demonstrates the lungs to be expanded and clear.  Conclusions Normal PA chest x-ray.||||||F||||||",
        ),
        MessageTemplate::new(
            "ADT A01 - Patient Admission",
            "MSH|^~\\&|MESA_ADT|EAST_HOSPITAL|RECEIVER|DEST|20230101120000||ADT^A01|MSG00001|P|2.5|||AL|NE|\n\
EVN|A01|20230101120000|||\n\
PID|1||10001^^^MRN||SMITH^JOHN||19800101|M|||123 MAIN ST^^ANYTOWN^CA^90210||555-555-5555||S||10001|123-45-6789||||\n\
PV1|1|I|WEST^389^1|1|||12345^DOCTOR^ROBERT|67890^DOCTOR^JANE||MED||||1|A0|",
            "MSH|^~\\&|mesa_ADT|EAST_hospital|RECEIVER|DEST|20230101120000||ADT^A01|MSG00001|P|2.5|||AL|NE|\n\
EVN|A01|20230101120000|||\n\
PID|1||10001^^^MRN||SMITH^JOHN||19800101|M|||123 MAIN ST^^ANYTOWN^CA^90210||555-555-5555||S||10001|123-45-6789||||\n\
PV1|1|I|WEST^389^1|1|||12345^DOCTOR^ROBERT|67890^DOCTOR^JANE||MED||||1|A0|",
        ),
        MessageTemplate::new(
            "ORM O01 - Order Message",
            "MSH|^~\\&|MESA_ORM|EAST_CLINIC|RECEIVER|DEST|20230101120000||ORM^O01|MSG00001|P|2.5|||AL|NE|\n\
PID|1||10001^^^MRN||SMITH^JOHN||19800101|M|||123 MAIN ST^^ANYTOWN^CA^90210||555-555-5555||S||10001|123-45-6789||||\n\
ORC|NW|ORD123456|||||^^^20230101120000||||12345^DOCTOR^ROBERT|\n\
OBR|1|ORD123456||76770^ULTRASOUND RETROPERITONEAL^CPT|R||20230101120000|||||||||12345^DOCTOR^ROBERT||||||||||",
            "MSH|^~\\&|mesa_ORM|EAST_clinic|RECEIVER|DEST|20230101120000||ORM^O01|MSG00001|P|2.5|||AL|NE|\n\
PID|1||10001^^^MRN||SMITH^JOHN||19800101|M|||123 MAIN ST^^ANYTOWN^CA^90210||555-555-5555||S||10001|123-45-6789||||\n\
ORC|NW|ORD123456|||||^^^20230101120000||||12345^DOCTOR^ROBERT|\n\
OBR|1|ORD123456||76770^ULTRASOUND RETROPERITONEAL^CPT|R||20230101120000|||||||||12345^DOCTOR^ROBERT||||||||||",
        ),
    ]
}

fn is_builtin(name: &str) -> bool {
    default_templates().iter().any(|t| t.name == name)
}

/// Error type for template storage
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Json(serde_json::Error),
    NotFound(String),
    Protected(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Json(err)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "IO error: {}", e),
            StoreError::Json(e) => write!(f, "JSON error: {}", e),
            StoreError::NotFound(name) => write!(f, "Template not found: {}", name),
            StoreError::Protected(name) => {
                write!(f, "Template '{}' is built in and cannot be removed", name)
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Templates keyed by name, in insertion order.
pub type TemplateMap = IndexMap<String, MessageTemplate>;

/// Load-all/save-all storage for templates.
pub trait TemplateStore {
    fn load_all(&self) -> Result<TemplateMap, StoreError>;

    fn save_all(&mut self, templates: &TemplateMap) -> Result<(), StoreError>;
}

fn to_map(templates: Vec<MessageTemplate>) -> TemplateMap {
    templates.into_iter().map(|t| (t.name.clone(), t)).collect()
}

/// Templates stored as a JSON array on disk.
///
/// A missing file loads the built-in templates.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TemplateStore for JsonFileStore {
    fn load_all(&self) -> Result<TemplateMap, StoreError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No template file, using built-in templates");
            return Ok(to_map(default_templates()));
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let templates: Vec<MessageTemplate> = serde_json::from_str(&contents)?;
        tracing::debug!(path = %self.path.display(), count = templates.len(), "Loaded templates");
        Ok(to_map(templates))
    }

    fn save_all(&mut self, templates: &TemplateMap) -> Result<(), StoreError> {
        let list: Vec<&MessageTemplate> = templates.values().collect();
        let json = serde_json::to_string_pretty(&list)?;
        crate::codegen::fs_utils::write_file(&self.path, json)?;
        tracing::info!(path = %self.path.display(), count = list.len(), "Saved templates");
        Ok(())
    }
}

/// In-memory store, seeded with the built-in templates.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    templates: TemplateMap,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            templates: to_map(default_templates()),
        }
    }

    pub fn empty() -> Self {
        Self {
            templates: TemplateMap::new(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateStore for MemoryStore {
    fn load_all(&self) -> Result<TemplateMap, StoreError> {
        Ok(self.templates.clone())
    }

    fn save_all(&mut self, templates: &TemplateMap) -> Result<(), StoreError> {
        self.templates = templates.clone();
        Ok(())
    }
}

/// Editable view over a store's templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: TemplateMap,
}

impl TemplateCatalog {
    pub fn load(store: &dyn TemplateStore) -> Result<Self, StoreError> {
        Ok(Self {
            templates: store.load_all()?,
        })
    }

    pub fn save(&self, store: &mut dyn TemplateStore) -> Result<(), StoreError> {
        store.save_all(&self.templates)
    }

    pub fn get(&self, name: &str) -> Option<&MessageTemplate> {
        self.templates.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Add a template, replacing any template with the same name in place.
    pub fn insert(&mut self, template: MessageTemplate) -> Option<MessageTemplate> {
        self.templates.insert(template.name.clone(), template)
    }

    /// Remove a user template. Built-in templates are protected.
    pub fn remove(&mut self, name: &str) -> Result<MessageTemplate, StoreError> {
        if is_builtin(name) {
            return Err(StoreError::Protected(name.to_string()));
        }
        self.templates
            .shift_remove(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }
}

/// Outcome of running a rule set over a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateCheck {
    pub name: String,
    pub actual: String,
    pub matches: bool,
    /// 1-based line numbers where actual and expected differ
    pub mismatched_lines: Vec<usize>,
}

/// Run `rewriter` over the template input and compare with `expected`.
pub fn check_template(
    template: &MessageTemplate,
    rewriter: &Rewriter,
) -> Result<TemplateCheck, RewriteError> {
    let actual = rewriter.rewrite(&template.input)?;
    let mismatched_lines = diff_lines(&actual, &template.expected);
    let matches = actual == template.expected;

    tracing::debug!(template = %template.name, matches, "Checked template");
    Ok(TemplateCheck {
        name: template.name.clone(),
        actual,
        matches,
        mismatched_lines,
    })
}

fn diff_lines(actual: &str, expected: &str) -> Vec<usize> {
    let lines = |text: &str| -> Vec<String> {
        line_spans(text)
            .into_iter()
            .map(|(start, end)| text[start..end].to_string())
            .collect()
    };
    let actual = lines(actual);
    let expected = lines(expected);

    (0..actual.len().max(expected.len()))
        .filter(|&i| actual.get(i) != expected.get(i))
        .map(|i| i + 1)
        .collect()
}
