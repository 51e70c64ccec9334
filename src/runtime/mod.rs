//! Portable message runtime.
//!
//! Everything under this module depends on `std` only. The rewrite engine
//! runs on it in-process, and the code generator embeds its source into
//! standalone rewrite units, so both execution paths share one
//! implementation of message reads and writes.

pub mod message;
pub mod splice;

pub use message::{line_spans, Field, Message, ParseError, Segment};
pub use splice::write_value;

/// Source of [`message`], embedded into generated units.
pub const MESSAGE_SOURCE: &str = include_str!("message.rs");

/// Source of [`splice`], embedded into generated units.
pub const SPLICE_SOURCE: &str = include_str!("splice.rs");
