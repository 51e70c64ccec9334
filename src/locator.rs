//! Message addresses.
//!
//! A [`Locator`] is parsed once from an address such as `PID.5.1` or
//! `PID-5.1` and reused for every read and write.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

/// Error type for address parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    Empty,
    Malformed(String),
    ZeroIndex(String),
    IndexTooLarge(String),
}

impl fmt::Display for LocatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocatorError::Empty => write!(f, "Address is empty"),
            LocatorError::Malformed(raw) => write!(
                f,
                "Malformed address '{}': expected SEGMENT, SEGMENT.FIELD[.COMPONENT] or SEGMENT-FIELD[.COMPONENT]",
                raw
            ),
            LocatorError::ZeroIndex(raw) => {
                write!(f, "Address '{}' uses index 0; field and component indices start at 1", raw)
            }
            LocatorError::IndexTooLarge(raw) => {
                write!(f, "Address '{}' uses an index above {}", raw, MAX_INDEX)
            }
        }
    }
}

impl std::error::Error for LocatorError {}

/// Largest accepted field or component index.
///
/// Writes pad up to the target index, so the bound also caps how far a single
/// write can grow a segment.
pub const MAX_INDEX: usize = 9999;

fn address_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Z][A-Z0-9]{2,3})(?:[.\-](\d+)(?:\.(\d+))?)?$")
            .expect("address pattern is valid")
    })
}

/// A resolved `(segment, field?, component?)` address.
///
/// Dot and dash forms of the same address compare equal; the address text is
/// kept as written for display and serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locator {
    raw: String,
    segment: String,
    field: Option<usize>,
    component: Option<usize>,
}

impl Locator {
    /// Parse an address.
    ///
    /// # Example
    ///
    /// ```
    /// use hl7_rewrite::Locator;
    ///
    /// let dot = Locator::parse("PID.5.1").unwrap();
    /// let dash = Locator::parse("PID-5.1").unwrap();
    /// assert_eq!(dot, dash);
    /// assert_eq!(dot.field(), Some(5));
    /// ```
    pub fn parse(address: &str) -> Result<Self, LocatorError> {
        let raw = address.trim();
        if raw.is_empty() {
            return Err(LocatorError::Empty);
        }

        let captures = address_pattern()
            .captures(raw)
            .ok_or_else(|| LocatorError::Malformed(raw.to_string()))?;

        let index = |group: usize| -> Result<Option<usize>, LocatorError> {
            match captures.get(group) {
                None => Ok(None),
                Some(m) => {
                    // Digits only, so a parse failure is an overflow.
                    let value: usize = m
                        .as_str()
                        .parse()
                        .map_err(|_| LocatorError::IndexTooLarge(raw.to_string()))?;
                    if value == 0 {
                        return Err(LocatorError::ZeroIndex(raw.to_string()));
                    }
                    if value > MAX_INDEX {
                        return Err(LocatorError::IndexTooLarge(raw.to_string()));
                    }
                    Ok(Some(value))
                }
            }
        };

        Ok(Self {
            raw: raw.to_string(),
            segment: captures[1].to_string(),
            field: index(2)?,
            component: index(3)?,
        })
    }

    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// 1-based field index
    pub fn field(&self) -> Option<usize> {
        self.field
    }

    /// 1-based component index (only present alongside a field)
    pub fn component(&self) -> Option<usize> {
        self.component
    }

    /// The address as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Canonical dot form, e.g. `PID.5.1`.
    pub fn canonical(&self) -> String {
        match (self.field, self.component) {
            (Some(field), Some(component)) => format!("{}.{}.{}", self.segment, field, component),
            (Some(field), None) => format!("{}.{}", self.segment, field),
            _ => self.segment.clone(),
        }
    }
}

impl PartialEq for Locator {
    fn eq(&self, other: &Self) -> bool {
        self.segment == other.segment
            && self.field == other.field
            && self.component == other.component
    }
}

impl Eq for Locator {}

impl Hash for Locator {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.segment.hash(state);
        self.field.hash(state);
        self.component.hash(state);
    }
}

impl FromStr for Locator {
    type Err = LocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Locator {
    type Error = LocatorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Locator> for String {
    fn from(locator: Locator) -> Self {
        locator.raw
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
