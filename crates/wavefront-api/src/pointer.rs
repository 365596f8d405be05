//! Structural path lookups into decoded event JSON.
//!
//! Event payloads are schemaless as far as this resource is concerned, so
//! the few values it needs (`/id`, `/name`, `/runningState`, `/annotations`)
//! are pulled out with JSON-pointer lookups that report exactly how a lookup
//! failed instead of panicking on surprising payloads.

use serde_json::Value;

use crate::error::{EventApiError, Result};

/// Outcome of a structural lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Found(&'a Value),
    NotFound,
}

/// Resolve a JSON pointer (`/name`, `/annotations`, …) against `root`.
pub fn lookup<'a>(root: &'a Value, pointer: &str) -> Lookup<'a> {
    match root.pointer(pointer) {
        Some(value) => Lookup::Found(value),
        None => Lookup::NotFound,
    }
}

/// Resolve a pointer that must land on a string.
///
/// Distinguishes a missing path from a present-but-wrong-type value so the
/// caller can report which contract the remote payload broke.
pub fn lookup_string<'a>(root: &'a Value, pointer: &str) -> Result<&'a str> {
    match lookup(root, pointer) {
        Lookup::Found(Value::String(s)) => Ok(s),
        Lookup::Found(other) => Err(EventApiError::TypeMismatch {
            path: pointer.to_string(),
            found: json_type_name(other),
        }),
        Lookup::NotFound => Err(EventApiError::NotFound {
            path: pointer.to_string(),
        }),
    }
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
