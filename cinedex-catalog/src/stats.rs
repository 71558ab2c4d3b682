//! Catalog-wide field statistics
//!
//! `max_value` answers "largest value of this document field across the
//! catalog" for dotted paths into the stored movie document, including
//! paths whose final segment lives inside an array (`providers.rank`
//! means the element-wise maximum per document).

use cinedex_common::{Error, Result};
use serde_json::Value;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::db::movies::MovieFilter;

/// Largest numeric value of `property` across all matching movies
///
/// Returns 0.0 when no movie matches the filter, and `NotFound` when
/// movies match but none carries a numeric value at the path.
pub async fn max_value(
    pool: &SqlitePool,
    property: &str,
    filter: Option<&MovieFilter>,
) -> Result<f64> {
    if property.is_empty() {
        return Err(Error::InvalidInput("Empty field path".to_string()));
    }

    let Some(doc) = find_max_doc(pool, property, filter).await? else {
        return Ok(0.0);
    };

    extract_max(&doc, property)
        .ok_or_else(|| Error::NotFound(format!("No numeric value at `{}`", property)))
}

/// Fetch the document ordered first by the field, scalar or element-wise
///
/// The JSON path is a bind parameter, so arbitrary property strings are
/// safe; a path SQLite cannot parse just orders as NULL.
async fn find_max_doc(
    pool: &SqlitePool,
    property: &str,
    filter: Option<&MovieFilter>,
) -> Result<Option<Value>> {
    let full_path = json_path(property);

    let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("SELECT doc FROM movies");
    if let Some(filter) = filter {
        filter.push_where(&mut qb);
    }

    match property.rsplit_once('.') {
        None => {
            qb.push(" ORDER BY json_extract(doc, ")
                .push_bind(full_path)
                .push(") DESC LIMIT 1");
        }
        Some((parent, leaf)) => {
            let parent_path = json_path(parent);
            let leaf_path = json_path(leaf);
            qb.push(" ORDER BY COALESCE(json_extract(doc, ")
                .push_bind(full_path)
                .push("), CASE WHEN json_type(doc, ")
                .push_bind(parent_path.clone())
                .push(") = 'array' THEN (SELECT max(json_extract(je.value, ")
                .push_bind(leaf_path)
                .push(")) FROM json_each(doc, ")
                .push_bind(parent_path)
                .push(") AS je) END) DESC LIMIT 1");
        }
    }

    let row: Option<(String,)> = qb.build_query_as().fetch_optional(pool).await?;
    match row {
        None => Ok(None),
        Some((doc,)) => {
            let doc: Value = serde_json::from_str(&doc)
                .map_err(|e| Error::Internal(format!("Corrupt movie document: {}", e)))?;
            Ok(Some(doc))
        }
    }
}

/// Dotted property to a SQLite JSON path; all-digit segments index arrays
fn json_path(property: &str) -> String {
    let mut path = String::from("$");
    for segment in property.split('.') {
        if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()) {
            path.push('[');
            path.push_str(segment);
            path.push(']');
        } else {
            path.push_str(".\"");
            path.push_str(segment);
            path.push('"');
        }
    }
    path
}

/// Walk a dotted path; all-digit segments index into arrays
fn path_value<'a>(root: &'a Value, property: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in property.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Numeric value at the path, falling back to the element-wise maximum
/// when the parent of the final segment is an array
fn extract_max(doc: &Value, property: &str) -> Option<f64> {
    if let Some(value) = path_value(doc, property).and_then(Value::as_f64) {
        return Some(value);
    }

    let (parent, leaf) = property.rsplit_once('.')?;
    let items = path_value(doc, parent)?.as_array()?;
    items
        .iter()
        .filter_map(|item| path_value(item, leaf).and_then(Value::as_f64))
        .fold(None, |best: Option<f64>, value| {
            Some(best.map_or(value, |b| b.max(value)))
        })
}
