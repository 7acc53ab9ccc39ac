//! Wire format of stored values.
//!
//! Terminals are written as JSON text so that strings, numbers, booleans and
//! `null` stay distinguishable after a round trip.

use serde_json::Value;

use crate::types::TerminalValue;

/// Encodes a terminal value as JSON text.
#[must_use]
pub fn encode(value: &TerminalValue) -> String {
    Value::from(value).to_string()
}

/// Decodes stored text.
///
/// Text that is not valid JSON is returned unchanged as [`TerminalValue::Raw`].
#[must_use]
pub fn decode(raw: &str) -> TerminalValue {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(_)) => TerminalValue::Raw(raw.to_string()),
        Ok(value) => TerminalValue::from(value),
        Err(e) => {
            tracing::debug!("Stored value is not JSON, returning raw text: {e}");
            TerminalValue::Raw(raw.to_string())
        }
    }
}
