//! The `out` command core: create, start, or end an event.

use std::io::Read;
use std::path::Path;

use wavefront_api::{EventClient, Transport};

use crate::annotations::{build_annotations, expand_tags};
use crate::env::{interpolate, restricted, EnvLookup};
use crate::error::{ResourceError, Result};
use crate::types::{Action, ApplyRequest, Response, Version};
use crate::{io, metadata};

/// Apply the requested action against the event API.
///
/// The sequence is fixed: decode → validate → template → call → persist →
/// extract. Nothing is reported as having succeeded unless the whole chain
/// completed.
pub fn run<R: Read>(
    input: R,
    base_dir: &Path,
    transport: impl Transport + 'static,
    env: EnvLookup<'_>,
) -> Result<Response> {
    let request: ApplyRequest = serde_json::from_reader(input).map_err(ResourceError::Decode)?;
    request.source.validate()?;
    let action = request.params.validate()?;

    let client = EventClient::new(
        &request.source.tenant_url,
        &request.source.api_token,
        transport,
    )?;

    let annotations = build_annotations(request.params.annotations.as_ref(), env);
    let name = interpolate(&request.params.event_name, &restricted(env));
    let tags = expand_tags(&request.params.tags, env);

    tracing::debug!(%action, name = %name, "applying event action");
    let event = match action {
        Action::Create => client.create_instant_event(&name, &annotations, &tags)?,
        Action::Start => client.start_ongoing_event(&name, &annotations, &tags)?,
        Action::End => {
            let state_dir = base_dir.join(&request.params.event);
            let (id, snapshot) = io::read_event_state(&state_dir)?;

            // Absent annotations mean "leave them alone": only a supplied
            // map reaches the merge engine.
            let updates = request.params.annotations.as_ref().map(|_| &annotations);
            client.end_ongoing_event(&id, &snapshot, updates)?
        }
    };

    let id = metadata::event_id(&event)?;
    if action != Action::End && !request.params.event.is_empty() {
        io::write_event_state(&base_dir.join(&request.params.event), &id, &event)?;
    }

    let metadata = metadata::concourse_metadata(&event)?;
    Ok(Response {
        version: Version { id },
        metadata,
    })
}
