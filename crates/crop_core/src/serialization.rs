//! Canonical JSON serialization helpers.
//!
//! Provides utilities to serialize structures with deterministically sorted
//! object keys and stable formatting so that model artifacts can be hashed and
//! compared reliably across architectures.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{self, map::Map, ser::PrettyFormatter, Serializer, Value};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::errors::Result;

/// Recursively sort JSON object keys to obtain a canonical representation.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));

            let mut sorted = Map::with_capacity(entries.len());
            for (key, val) in entries {
                sorted.insert(key, canonicalize(val));
            }

            Value::Object(sorted)
        }
        Value::Array(elements) => Value::Array(elements.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serialize a value into canonical JSON and write it to the provided writer.
pub fn write_canonical_json<T, W>(
    mut writer: W,
    value: &T,
) -> std::result::Result<(), serde_json::Error>
where
    T: Serialize,
    W: Write,
{
    let canonical_value = canonicalize(serde_json::to_value(value)?);
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut writer, formatter);
    canonical_value.serialize(&mut serializer)?;
    Ok(())
}

/// Serialize a value into canonical JSON bytes.
pub fn canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_canonical_json(&mut buffer, value)?;
    buffer.push(b'\n');
    Ok(buffer)
}

/// BLAKE3 digest of raw bytes as a hex string.
pub fn blake3_hex(bytes: &[u8]) -> String {
    hex::encode(blake3::hash(bytes).as_bytes())
}

/// Write `value` as canonical JSON to `path`, creating parent directories and
/// replacing any existing file. Returns the BLAKE3 hex digest of the bytes
/// written.
pub fn save_canonical_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<String> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let bytes = canonical_json_bytes(value)?;
    fs::write(path, &bytes)?;
    Ok(blake3_hex(&bytes))
}

/// Read a JSON artifact from disk.
pub fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
