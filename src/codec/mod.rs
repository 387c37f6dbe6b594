//! Record ⇄ field-map codec
//!
//! Records cross the remote boundary as generic field maps (JSON objects
//! keyed by column name). Encoding drops `null` fields so a partial payload
//! never clobbers columns it does not mention; the update variant also
//! strips the primary key, which is carried by the request's key filter
//! instead. Decoding tolerates unknown columns and fails with the table
//! name when a required field is absent.

mod errors;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

pub use errors::{CodecError, CodecResult};

/// Generic row shape: column name to JSON value
pub type FieldMap = Map<String, Value>;

/// Encode a record into a field map, dropping `null` fields
pub fn encode<T: Serialize>(table: &str, record: &T) -> CodecResult<FieldMap> {
    let value = serde_json::to_value(record).map_err(|e| CodecError::Encode {
        table: table.to_string(),
        message: e.to_string(),
    })?;

    match value {
        Value::Object(mut fields) => {
            fields.retain(|_, v| !v.is_null());
            Ok(fields)
        }
        _ => Err(CodecError::NotAnObject {
            table: table.to_string(),
        }),
    }
}

/// Build an update payload from a JSON object of changed fields
///
/// Strips `null` fields and the primary-key column; the key travels with
/// the write request, never inside the payload.
pub fn update_payload(table: &str, primary_key: &str, changes: Value) -> CodecResult<FieldMap> {
    match changes {
        Value::Object(mut fields) => {
            fields.retain(|column, v| column != primary_key && !v.is_null());
            Ok(fields)
        }
        _ => Err(CodecError::NotAnObject {
            table: table.to_string(),
        }),
    }
}

/// Decode a field map into a record
///
/// Columns not declared by `T` are silently ignored. A required field
/// missing from the map fails with the serde message naming that field.
pub fn decode<T: DeserializeOwned>(table: &str, fields: FieldMap) -> CodecResult<T> {
    serde_json::from_value(Value::Object(fields)).map_err(|e| CodecError::Decode {
        table: table.to_string(),
        message: e.to_string(),
    })
}
