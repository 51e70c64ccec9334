//! # hl7-rewrite: Rule-Driven HL7v2 Message Rewriting
//!
//! hl7-rewrite rewrites pipe-delimited HL7v2 messages with declarative rule
//! sets and compiles the same rule sets into standalone Rust functions.
//!
//! ## Features
//!
//! - **Locators**: `SEG`, `SEG.F`, `SEG.F.C` or `SEG-F.C` addresses, 1-based
//! - **Filters**: ordered `startsWith`/`contains`/`endsWith`/`exact` rows folded left to right with `AND`/`OR`
//! - **Transforms**: `replace`, `passthrough`, `addPrefix`, `removePrefix`, `addSuffix`, `removeSuffix`
//! - **Engine**: filters applied in order; every write reparses so later rules see earlier writes
//! - **Code generation**: a self-contained unit with the same behavior as the engine
//! - **Templates**: named input/expected pairs for checking rule sets
//!
//! ## Example: Rule Set
//!
//! ```yaml
//! name: lowercase-sender
//! filters:
//!   - src: MSH.3
//!     filterRows:
//!       - command: startsWith
//!         value: MESA
//!     mappings:
//!       - src: MSH.3
//!         dst: MSH.3
//!         transforms:
//!           - command: replace
//!             args: MESA mesa
//! ```
//!
//! ## Example: Rewriting
//!
//! ```
//! use hl7_rewrite::{Rewriter, RuleSet};
//!
//! let rules = RuleSet::from_yaml_str(r#"
//! filters:
//!   - src: MSH.3
//!     filterRows:
//!       - command: startsWith
//!         value: MESA
//!     mappings:
//!       - src: MSH.3
//!         dst: MSH.3
//!         transforms:
//!           - command: replace
//!             args: MESA mesa
//! "#).unwrap();
//!
//! let out = Rewriter::new(rules).rewrite("MSH|^~\\&|MESA_ADT|EAST").unwrap();
//! assert_eq!(out, "MSH|^~\\&|mesa_ADT|EAST");
//! ```

// Portable message runtime shared with generated code
pub mod runtime;

// Rule model and evaluation
pub mod locator;
pub mod resolver;
pub mod predicate;
pub mod transform;
pub mod engine;
pub mod rules;

// Sample messages and their storage
pub mod templates;

// Application settings
pub mod config;

// Code generation framework
pub mod codegen;

// Re-export key types
pub use locator::{Locator, LocatorError};
pub use predicate::{evaluate, FilterCommand, FilterRow, Operator};
pub use transform::{Transform, TransformCommand};
pub use engine::{apply_filters, Filter, Mapping, RewriteError, Rewriter};
pub use rules::{RuleIssue, RuleSet, RuleSetError};
pub use templates::{
    check_template, default_templates, JsonFileStore, MemoryStore, MessageTemplate, StoreError,
    TemplateCatalog, TemplateCheck, TemplateStore,
};
pub use config::AppConfig;

// Re-export runtime types
pub use runtime::{Message, ParseError, Segment, Field};

// Re-export codegen types
pub use codegen::{generate, CodegenConfig};
