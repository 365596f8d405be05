use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventApiError {
    #[error("invalid response status code: expected 200, got {status}")]
    BadResponseStatus { status: reqwest::StatusCode },

    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid base url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("base url {url:?} cannot carry an event path")]
    BaseUrlNotHierarchical { url: String },

    #[error("api token is not a valid header value")]
    InvalidAuthToken,

    #[error("could not decode response envelope: {0}")]
    Envelope(#[from] serde_json::Error),

    #[error("no value found at {path}")]
    NotFound { path: String },

    #[error("expected value at {path} to be a string, but it was {found}")]
    TypeMismatch { path: String, found: &'static str },

    #[error("event snapshot is missing the annotations field")]
    MissingAnnotations,

    #[error("expected existing annotation {key:?} to be a string, but it was {found}")]
    AnnotationNotString { key: String, found: &'static str },
}

pub type Result<T> = std::result::Result<T, EventApiError>;
