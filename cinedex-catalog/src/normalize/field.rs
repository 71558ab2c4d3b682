//! Typed field access over loosely-typed payloads
//!
//! Every accessor carries the dotted path of the field it reads, so a
//! failure names exactly where the payload went wrong. JSON null and an
//! absent key are treated the same throughout.

use cinedex_common::{Error, Result};
use serde_json::{Map, Value};

/// Append a key to a dotted path
pub(crate) fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

/// Append an array index to a path
pub(crate) fn index(parent: &str, i: usize) -> String {
    format!("{}[{}]", parent, i)
}

fn type_error(path: &str, expected: &str) -> Error {
    Error::validation(path, expected)
}

/// The value itself must be a JSON object
pub(crate) fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| type_error(path, "object"))
}

/// Field lookup treating JSON null as absent
pub(crate) fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|value| !value.is_null())
}

/// Required object field; returns the map together with its path
pub(crate) fn req_object<'a>(
    obj: &'a Map<String, Value>,
    parent: &str,
    key: &str,
) -> Result<(&'a Map<String, Value>, String)> {
    let path = join(parent, key);
    let value = present(obj, key).ok_or_else(|| type_error(&path, "object"))?;
    Ok((as_object(value, &path)?, path))
}

/// Optional object field; absent or null becomes None
pub(crate) fn opt_object<'a>(
    obj: &'a Map<String, Value>,
    parent: &str,
    key: &str,
) -> Result<Option<(&'a Map<String, Value>, String)>> {
    let path = join(parent, key);
    match present(obj, key) {
        None => Ok(None),
        Some(value) => {
            let map = value
                .as_object()
                .ok_or_else(|| type_error(&path, "object or null"))?;
            Ok(Some((map, path)))
        }
    }
}

/// Required string field
pub(crate) fn req_str(obj: &Map<String, Value>, parent: &str, key: &str) -> Result<String> {
    let path = join(parent, key);
    present(obj, key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| type_error(&path, "string"))
}

/// Optional string field; absent or null becomes None
pub(crate) fn opt_str(obj: &Map<String, Value>, parent: &str, key: &str) -> Result<Option<String>> {
    let path = join(parent, key);
    match present(obj, key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| type_error(&path, "string or null")),
    }
}

/// String field defaulting when absent or null
pub(crate) fn str_or(
    obj: &Map<String, Value>,
    parent: &str,
    key: &str,
    default: &str,
) -> Result<String> {
    Ok(opt_str(obj, parent, key)?.unwrap_or_else(|| default.to_string()))
}

/// Required integer field
pub(crate) fn req_i64(obj: &Map<String, Value>, parent: &str, key: &str) -> Result<i64> {
    let path = join(parent, key);
    present(obj, key)
        .and_then(Value::as_i64)
        .ok_or_else(|| type_error(&path, "integer"))
}

/// Optional integer field; absent or null becomes None
pub(crate) fn opt_i64(obj: &Map<String, Value>, parent: &str, key: &str) -> Result<Option<i64>> {
    let path = join(parent, key);
    match present(obj, key) {
        None => Ok(None),
        Some(value) => value
            .as_i64()
            .map(Some)
            .ok_or_else(|| type_error(&path, "integer or null")),
    }
}

/// Integer field defaulting when absent or null
pub(crate) fn i64_or(
    obj: &Map<String, Value>,
    parent: &str,
    key: &str,
    default: i64,
) -> Result<i64> {
    Ok(opt_i64(obj, parent, key)?.unwrap_or(default))
}

/// Required number field (integers accepted)
pub(crate) fn req_f64(obj: &Map<String, Value>, parent: &str, key: &str) -> Result<f64> {
    let path = join(parent, key);
    present(obj, key)
        .and_then(Value::as_f64)
        .ok_or_else(|| type_error(&path, "number"))
}

/// Optional number field; absent or null becomes None
pub(crate) fn opt_f64(obj: &Map<String, Value>, parent: &str, key: &str) -> Result<Option<f64>> {
    let path = join(parent, key);
    match present(obj, key) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| type_error(&path, "number or null")),
    }
}

/// Number field defaulting when absent or null
pub(crate) fn f64_or(
    obj: &Map<String, Value>,
    parent: &str,
    key: &str,
    default: f64,
) -> Result<f64> {
    Ok(opt_f64(obj, parent, key)?.unwrap_or(default))
}

/// Boolean field defaulting when absent or null
pub(crate) fn bool_or(
    obj: &Map<String, Value>,
    parent: &str,
    key: &str,
    default: bool,
) -> Result<bool> {
    let path = join(parent, key);
    match present(obj, key) {
        None => Ok(default),
        Some(value) => value.as_bool().ok_or_else(|| type_error(&path, "boolean")),
    }
}

/// Required array field
pub(crate) fn req_slice<'a>(
    obj: &'a Map<String, Value>,
    parent: &str,
    key: &str,
) -> Result<&'a [Value]> {
    let path = join(parent, key);
    present(obj, key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| type_error(&path, "array"))
}

/// Array field; absent or null yields the empty slice
pub(crate) fn slice_or_empty<'a>(
    obj: &'a Map<String, Value>,
    parent: &str,
    key: &str,
) -> Result<&'a [Value]> {
    let path = join(parent, key);
    match present(obj, key) {
        None => Ok(&[]),
        Some(value) => value
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| type_error(&path, "array or null")),
    }
}

/// Required array of plain strings
pub(crate) fn string_list(obj: &Map<String, Value>, parent: &str, key: &str) -> Result<Vec<String>> {
    let path = join(parent, key);
    string_items(req_slice(obj, parent, key)?, &path)
}

/// Every element of the slice must be a string
pub(crate) fn string_items(items: &[Value], path: &str) -> Result<Vec<String>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| type_error(&index(path, i), "string"))
        })
        .collect()
}
