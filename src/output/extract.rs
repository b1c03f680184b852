//! Record array extraction
//!
//! Finds the list of record objects inside an API response without knowing
//! the resource. Handles bare arrays, `{"data": [...]}` and
//! `{"data": {"people": [...]}}` envelopes.

use serde_json::{Map, Value};

/// Locate the array of record objects in `document`.
///
/// Rules, first match wins:
/// 1. an array yields its object elements (other elements are dropped),
/// 2. an object with a `data` key recurses into that value,
/// 3. otherwise the first array-valued field of the object is used,
/// 4. anything else yields nothing.
///
/// "First" in rule 3 means lexicographic key order, so the result never
/// depends on how the map happens to be stored.
pub fn extract_records(document: &Value) -> Vec<Map<String, Value>> {
    extract_records_for(document, None)
}

/// Like [`extract_records`], but when an object has several array-valued
/// fields, the one named `preferred` wins over key order.
pub fn extract_records_for(document: &Value, preferred: Option<&str>) -> Vec<Map<String, Value>> {
    locate_array(document, preferred)
        .map(|items| objects_only(items))
        .unwrap_or_default()
}

/// The array the extraction rules settle on, before dropping non-objects
pub fn locate_array<'a>(document: &'a Value, preferred: Option<&str>) -> Option<&'a Vec<Value>> {
    match document {
        Value::Array(items) => Some(items),
        Value::Object(map) => {
            if let Some(data) = map.get("data") {
                return locate_array(data, preferred);
            }

            if let Some(Value::Array(items)) = preferred.and_then(|key| map.get(key)) {
                return Some(items);
            }

            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            keys.into_iter()
                .find_map(|key| map.get(key).and_then(Value::as_array))
        }
        _ => None,
    }
}

/// The single record in a get/create/update style response.
///
/// Follows `data` envelopes; inside one, an object whose only field is
/// itself an object (`{"data": {"createTask": {...}}}`) is unwrapped.
pub fn single_record(document: &Value) -> Option<&Map<String, Value>> {
    fn unwrap(value: &Value, enveloped: bool) -> Option<&Map<String, Value>> {
        let map = value.as_object()?;
        if let Some(data) = map.get("data") {
            return unwrap(data, true);
        }
        if enveloped && map.len() == 1 {
            if let Some(Value::Object(inner)) = map.values().next() {
                return Some(inner);
            }
        }
        Some(map)
    }

    unwrap(document, false)
}

fn objects_only(items: &[Value]) -> Vec<Map<String, Value>> {
    items
        .iter()
        .filter_map(|item| item.as_object().cloned())
        .collect()
}

/// Union of keys across `records`, sorted for stable column order
pub fn derive_headers(records: &[Map<String, Value>]) -> Vec<String> {
    let mut headers: Vec<String> = records
        .iter()
        .flat_map(|record| record.keys().cloned())
        .collect();
    headers.sort();
    headers.dedup();
    headers
}

/// Flatten a JSON value into a single table/CSV cell
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Cells for `record` in `headers` order; missing keys become empty cells
pub fn record_cells(record: &Map<String, Value>, headers: &[String]) -> Vec<String> {
    headers
        .iter()
        .map(|header| record.get(header).map(cell_text).unwrap_or_default())
        .collect()
}
