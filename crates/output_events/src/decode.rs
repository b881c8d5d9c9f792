use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;
use tracing::debug;

use crate::error::DecodeError;
use crate::event::DecodedRecord;
use crate::marker::cursor_move_regex;

/// Decodes a marker payload: drop the cursor moves, base64, then JSON object.
pub fn decode_block(payload: &str) -> Result<DecodedRecord, DecodeError> {
    let encoded = cursor_move_regex().replace_all(payload, "");
    let bytes = general_purpose::STANDARD
        .decode(encoded.as_bytes())
        .or_else(|_| general_purpose::URL_SAFE.decode(encoded.as_bytes()))
        .map_err(|source| DecodeError::Base64 { source })?;
    match serde_json::from_slice::<Value>(&bytes).map_err(|source| DecodeError::Json { source })? {
        Value::Object(record) => Ok(record),
        other => Err(DecodeError::NotAnObject {
            found: json_kind(&other),
        }),
    }
}

/// [`decode_block`], degrading any failure to an empty record.
pub fn decode_block_or_empty(payload: &str) -> DecodedRecord {
    decode_block(payload).unwrap_or_else(|error| {
        debug!(%error, payload_bytes = payload.len(), "discarding undecodable event marker");
        DecodedRecord::new()
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Truthiness of a correlation identifier: absent, null, false, zero and
/// empty values do not open a correlation window.
pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().map_or(true, |n| n != 0.0),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
    }
}
