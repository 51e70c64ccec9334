//! Locator-based reads and writes.

use crate::locator::Locator;
use crate::runtime::{splice, Message};

/// Read the value at `locator`; misses resolve to `""`.
pub fn resolve(message: &Message, locator: &Locator) -> String {
    message.value(locator.segment(), locator.field(), locator.component())
}

/// Write `value` at `locator` into message text.
///
/// Writing into an absent segment, or through a segment-only locator, returns
/// the text unchanged.
pub fn write(text: &str, locator: &Locator, value: &str) -> String {
    splice::write_value(
        text,
        locator.segment(),
        locator.field(),
        locator.component(),
        value,
    )
}
