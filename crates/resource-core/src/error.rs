use std::path::PathBuf;

use thiserror::Error;
use wavefront_api::EventApiError;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("could not validate source configuration: tenant url is missing")]
    MissingTenantUrl,

    #[error("could not validate source configuration: api token is missing")]
    MissingApiToken,

    #[error("invalid action {0:?}")]
    InvalidAction(String),

    #[error(r#"the "event_name" parameter must be set when "action" is "start" or "create""#)]
    MissingEventName,

    #[error(r#"the "event" parameter must be set when "action" is "end""#)]
    MissingEventReference,

    #[error("could not decode request: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("could not complete API call: {0}")]
    Api(#[from] EventApiError),

    #[error("could not extract {what} from event: {source}")]
    Metadata {
        what: &'static str,
        #[source]
        source: EventApiError,
    },

    #[error("could not write {}: {source}", .path.display())]
    WriteState {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read {}: {source}", .path.display())]
    ReadState {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse persisted event json from {}: {source}", .path.display())]
    ParseState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not serialize event state: {0}")]
    Encode(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ResourceError>;
