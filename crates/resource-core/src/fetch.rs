//! The `in` command core: fetch an existing event and persist it.

use std::io::Read;
use std::path::Path;

use wavefront_api::{EventClient, Transport};

use crate::error::{ResourceError, Result};
use crate::types::{FetchRequest, Response};
use crate::{io, metadata};

/// Fetch the event named by the request's version and write `id` plus
/// `event.json` into `output_dir` for later steps to consume.
///
/// The transport is injected so tests can drive the command against a fake;
/// the CLI passes the production retrying stack.
pub fn run<R: Read>(
    input: R,
    output_dir: &Path,
    transport: impl Transport + 'static,
) -> Result<Response> {
    let request: FetchRequest = serde_json::from_reader(input).map_err(ResourceError::Decode)?;
    request.source.validate()?;

    let client = EventClient::new(
        &request.source.tenant_url,
        &request.source.api_token,
        transport,
    )?;

    tracing::debug!(id = %request.version.id, "fetching event");
    let event = client.get_event(&request.version.id)?;

    io::write_event_state(output_dir, &request.version.id, &event)?;

    let metadata = metadata::concourse_metadata(&event)?;
    Ok(Response {
        version: request.version,
        metadata,
    })
}
