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
