use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{DecodeError, QuerySnapshot, RecordSnapshot};


/// Decodes a single record. A record that does not exist decodes to `None`.
pub fn decode_record<T, R>(snapshot: &RecordSnapshot<R>) -> Result<Option<T>, DecodeError>
where
    T: DeserializeOwned,
{
    let Some(fields) = snapshot.fields() else {
        return Ok(None);
    };
    serde_json::from_value(Value::Object(fields.clone()))
        .map(Some)
        .map_err(|e| DecodeError::new(snapshot.id(), e))
}

/// Decodes every record of a query result, keeping the delivered order.
///
/// Each item is built from the record's fields plus `id` and `ref`,
/// which replace any fields of the same name.
pub fn decode_collection<T, R>(snapshot: &QuerySnapshot<R>) -> Result<Vec<T>, DecodeError>
where
    T: DeserializeOwned,
    R: Serialize,
{
    snapshot.records().iter().map(decode_item).collect()
}

fn decode_item<T, R>(snapshot: &RecordSnapshot<R>) -> Result<T, DecodeError>
where
    T: DeserializeOwned,
    R: Serialize,
{
    let id = snapshot.id();
    let reference =
        serde_json::to_value(snapshot.reference()).map_err(|e| DecodeError::new(id, e))?;
    let mut fields = snapshot.fields().cloned().unwrap_or_default();
    fields.insert("id".to_string(), Value::String(id.to_string()));
    fields.insert("ref".to_string(), reference);
    serde_json::from_value(Value::Object(fields)).map_err(|e| DecodeError::new(id, e))
}
