use crate::{StorageError, StorageResult};
use serde_json::Value;

/// Encodes a collection (always a JSON array value) to bytes and back.
///
/// The store converts typed records to and from [`Value`] itself, so codecs
/// stay object safe and independent of any entity type.
pub trait Codec: Send + Sync {
    /// Encodes a full record sequence.
    fn encode(&self, records: &Value) -> StorageResult<Vec<u8>>;

    /// Decodes bytes previously produced by [`Codec::encode`].
    fn decode(&self, bytes: &[u8]) -> StorageResult<Value>;
}

/// JSON array codec. Pretty-printed by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    /// Indented, human-readable output.
    #[must_use]
    pub const fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Single-line output.
    #[must_use]
    pub const fn compact() -> Self {
        Self { pretty: false }
    }

    #[must_use]
    pub const fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::pretty()
    }
}

impl Codec for JsonCodec {
    fn encode(&self, records: &Value) -> StorageResult<Vec<u8>> {
        if !records.is_array() {
            return Err(StorageError::InvalidData(
                "collection must encode as an array".to_string(),
            ));
        }
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(records)?
        } else {
            serde_json::to_vec(records)?
        };
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> StorageResult<Value> {
        // A zero-length or whitespace-only file holds no records.
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Array(Vec::new()));
        }
        let value: Value = serde_json::from_slice(bytes)?;
        match value {
            Value::Array(_) => Ok(value),
            Value::Null => Ok(Value::Array(Vec::new())),
            other => Err(StorageError::InvalidData(format!(
                "expected a JSON array, found {}",
                kind(&other)
            ))),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
