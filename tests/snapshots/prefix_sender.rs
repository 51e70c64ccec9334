//! Standalone HL7v2 rewrite generated from rule set "prefix-sender".
//!
//! Generated by hl7-rewrite. Regenerate instead of editing by hand.

#![allow(dead_code)]

mod message {
//! HL7v2 message model.
//!
//! Parses message text into segments, fields and components while keeping the
//! original text, so an unmodified message serializes back byte-for-byte.
//! This module only depends on `std`: its source is embedded as-is into
//! generated rewrite units.

use std::fmt;

/// Name of the message header segment.
pub const HEADER_SEGMENT: &str = "MSH";

/// Field separator (`|`).
pub const FIELD_SEPARATOR: char = '|';

/// Component separator (`^`).
pub const COMPONENT_SEPARATOR: char = '^';

/// Error raised when message text cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The text holds no segment at all
    Empty,
    /// The first segment is not `MSH`
    MissingHeader { found: String },
    /// The header segment does not carry the `|` separator
    MissingFieldSeparator,
    /// MSH-2 (encoding characters) is absent or empty
    MissingEncodingCharacters,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "Message is empty"),
            ParseError::MissingHeader { found } => {
                write!(f, "Message must start with an MSH segment, found '{}'", found)
            }
            ParseError::MissingFieldSeparator => {
                write!(f, "MSH segment is missing the '|' field separator")
            }
            ParseError::MissingEncodingCharacters => {
                write!(f, "MSH segment is missing its encoding characters (MSH-2)")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Byte ranges of every line in `text`, terminators excluded.
///
/// Lines end at `\r\n`, `\r` or `\n`. A trailing terminator does not open an
/// extra empty line.
pub fn line_spans(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                spans.push((start, i));
                if i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
                    i += 1;
                }
                start = i + 1;
            }
            b'\n' => {
                spans.push((start, i));
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    if start < bytes.len() {
        spans.push((start, bytes.len()));
    }

    spans
}

/// A `|`-delimited slot within a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    text: String,
}

impl Field {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }

    /// Field text, components joined by `^`.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Component at a 1-based index, or `""` when absent.
    pub fn component(&self, index: usize) -> &str {
        if index == 0 {
            return "";
        }
        self.text
            .split(COMPONENT_SEPARATOR)
            .nth(index - 1)
            .unwrap_or("")
    }

    /// All components of the field.
    pub fn components(&self) -> Vec<&str> {
        self.text.split(COMPONENT_SEPARATOR).collect()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A named line of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    name: String,
    text: String,
    /// `fields[n - 1]` holds HL7 field `n`
    fields: Vec<Field>,
}

impl Segment {
    /// Parse one line (without its terminator or indentation).
    pub fn parse(line: &str) -> Self {
        let mut parts = line.split(FIELD_SEPARATOR);
        let name = parts.next().unwrap_or("").to_string();

        let mut fields = Vec::new();
        if name == HEADER_SEGMENT && line.contains(FIELD_SEPARATOR) {
            // MSH-1 is the separator itself.
            fields.push(Field::new("|"));
        }
        fields.extend(parts.map(Field::new));

        Self {
            name,
            text: line.to_string(),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Segment text, fields joined by `|`.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Field at a 1-based HL7 index.
    pub fn field(&self, index: usize) -> Option<&Field> {
        if index == 0 {
            return None;
        }
        self.fields.get(index - 1)
    }

    /// Number of fields after the segment name.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A parsed HL7v2 message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    text: String,
    segments: Vec<Segment>,
}

impl Message {
    /// Parse message text.
    ///
    /// Blank lines and leading indentation are skipped; the first segment
    /// must be a well-formed `MSH` header.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let segments: Vec<Segment> = line_spans(text)
            .into_iter()
            .map(|(start, end)| text[start..end].trim_start())
            .filter(|line| !line.trim().is_empty())
            .map(Segment::parse)
            .collect();

        let header = segments.first().ok_or(ParseError::Empty)?;
        if header.name() != HEADER_SEGMENT {
            return Err(ParseError::MissingHeader {
                found: header.name().to_string(),
            });
        }
        if !header.as_str().contains(FIELD_SEPARATOR) {
            return Err(ParseError::MissingFieldSeparator);
        }
        if header.field(2).map_or(true, |f| f.as_str().is_empty()) {
            return Err(ParseError::MissingEncodingCharacters);
        }

        Ok(Self {
            text: text.to_string(),
            segments,
        })
    }

    /// The message text exactly as parsed.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// First segment with the given name that carries fields.
    ///
    /// Lines without a `|` (a bare `PID`) are skipped, matching the line
    /// [`write_value`](super::splice::write_value) rewrites.
    pub fn segment(&self, name: &str) -> Option<&Segment> {
        self.segments
            .iter()
            .find(|s| s.name() == name && s.as_str().contains(FIELD_SEPARATOR))
    }

    /// Read the value addressed by `segment`, `field` and `component`.
    ///
    /// Absent segments, fields and components read as `""`. Without a field
    /// index the whole segment text is returned; without a component index the
    /// whole field text is returned.
    pub fn value(&self, segment: &str, field: Option<usize>, component: Option<usize>) -> String {
        let Some(segment) = self.segment(segment) else {
            return String::new();
        };
        let Some(field) = field else {
            return segment.as_str().to_string();
        };
        let Some(field) = segment.field(field) else {
            return String::new();
        };
        match component {
            Some(component) => field.component(component).to_string(),
            None => field.as_str().to_string(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
}

mod splice {
//! Text-level writes into HL7v2 messages.
//!
//! Writes rebuild only the target segment line and splice it back into the
//! original text, leaving every other byte untouched.

use super::message::{line_spans, COMPONENT_SEPARATOR, FIELD_SEPARATOR, HEADER_SEGMENT};

/// Write `value` at `segment`/`field`/`component` (1-based) in `text`.
///
/// The first line starting with `SEGMENT|` is rewritten. Returns `text`
/// unchanged when the segment is absent, when no field index is given, or
/// when an index is zero. Missing fields and components are padded with
/// empty slots. Writes to MSH-1 (the field separator itself) are no-ops.
pub fn write_value(
    text: &str,
    segment: &str,
    field: Option<usize>,
    component: Option<usize>,
    value: &str,
) -> String {
    let Some(field) = field else {
        return text.to_string();
    };
    if field == 0 || component == Some(0) {
        return text.to_string();
    }

    let prefix = format!("{}{}", segment, FIELD_SEPARATOR);
    let Some((start, end)) = line_spans(text)
        .into_iter()
        .find(|&(start, end)| text[start..end].trim_start().starts_with(&prefix))
    else {
        return text.to_string();
    };

    let line = &text[start..end];
    let body = line.trim_start();
    let indent = &line[..line.len() - body.len()];

    let mut fields: Vec<String> = body.split(FIELD_SEPARATOR).map(str::to_string).collect();

    // Re-insert MSH-1 so indices line up with every other segment.
    let is_header = segment == HEADER_SEGMENT;
    if is_header {
        fields.insert(1, FIELD_SEPARATOR.to_string());
    }

    while fields.len() <= field {
        fields.push(String::new());
    }

    match component {
        None => fields[field] = value.to_string(),
        Some(component) => {
            let mut components: Vec<&str> = fields[field].split(COMPONENT_SEPARATOR).collect();
            while components.len() < component {
                components.push("");
            }
            components[component - 1] = value;
            fields[field] = components.join("^");
        }
    }

    if is_header {
        fields.remove(1);
    }

    let mut out = String::with_capacity(text.len() + value.len());
    out.push_str(&text[..start]);
    out.push_str(indent);
    out.push_str(&fields.join("|"));
    out.push_str(&text[end..]);
    out
}
}

/// Apply rule set "prefix-sender" to `input`.
///
/// Returns the rewritten message text, or `Err` when `input` or an
/// intermediate rewrite is not a valid message.
pub fn prefix_sender(input: &str) -> Result<String, String> {
    let mut msg = message::Message::parse(input).map_err(|e| e.to_string())?;

    // Filter 1: MSH.3
    {
        let source = msg.value("MSH", Some(3), None);
        let matched = source.contains("MESA");
        if matched {
            // Mapping 1: MSH.3 -> MSH.3
            {
                let mut value = msg.value("MSH", Some(3), None);
                // Transform 1: addPrefix
                value = format!("{}{}", "X_", value);
                let text = splice::write_value(msg.as_str(), "MSH", Some(3), None, &value);
                msg = message::Message::parse(&text).map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(msg.to_string())
}
