//! Annotation merging for the close path.
//!
//! An empty-string value in the incoming map is a tombstone: it means
//! "remove this key if it is present," never "set this key to empty."

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{EventApiError, Result};
use crate::pointer::json_type_name;

/// Merge `updates` into `existing` and decide whether anything changed.
///
/// Tombstones (empty values) delete a key only when it currently holds a
/// non-empty string; deleting an absent or already-empty key is a no-op, so
/// a tombstone alone never forces an update. Non-empty values overwrite or
/// insert.
///
/// Returns `None` when the merged result is identical to `existing`, in
/// which case the caller must skip the update call entirely; returns the
/// merged map otherwise.
pub fn merge_annotations(
    existing: &Map<String, Value>,
    updates: &BTreeMap<String, String>,
) -> Result<Option<Map<String, Value>>> {
    let mut merged = existing.clone();

    for (key, value) in updates {
        if value.is_empty() {
            match merged.get(key) {
                None => {}
                Some(Value::String(current)) => {
                    if !current.is_empty() {
                        merged.remove(key);
                    }
                }
                Some(other) => {
                    return Err(EventApiError::AnnotationNotString {
                        key: key.clone(),
                        found: json_type_name(other),
                    });
                }
            }
            continue;
        }

        merged.insert(key.clone(), Value::String(value.clone()));
    }

    if merged == *existing {
        Ok(None)
    } else {
        Ok(Some(merged))
    }
}
