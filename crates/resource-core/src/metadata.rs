//! Pipeline-visible metadata pulled out of event payloads.

use serde_json::Value;
use wavefront_api::pointer;

use crate::error::{ResourceError, Result};
use crate::types::{Metadata, Metadatum};

/// The event ID, as reported by the event payload itself.
pub fn event_id(event: &Value) -> Result<String> {
    let id = pointer::lookup_string(event, "/id").map_err(|source| ResourceError::Metadata {
        what: "event id",
        source,
    })?;
    Ok(id.to_string())
}

/// The two metadata pairs every invocation reports, in fixed order:
/// the event name, then its running state.
pub fn concourse_metadata(event: &Value) -> Result<Metadata> {
    let name = pointer::lookup_string(event, "/name").map_err(|source| ResourceError::Metadata {
        what: "event name",
        source,
    })?;
    let state =
        pointer::lookup_string(event, "/runningState").map_err(|source| ResourceError::Metadata {
            what: "event state",
            source,
        })?;

    Ok(vec![
        Metadatum {
            name: "name".to_string(),
            value: name.to_string(),
        },
        Metadatum {
            name: "state".to_string(),
            value: state.to_string(),
        },
    ])
}
