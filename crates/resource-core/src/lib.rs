//! Core domain for the Concourse observability event resource.
//!
//! The resource lets a pipeline open, update, and close events in a
//! Wavefront tenant. Two verbs exist: `fetch` (the resource `in` step)
//! reads an event and persists its state to the working directory, and
//! `apply` (the `out` step) creates, starts, or ends an event, stamping
//! build-provenance annotations on the way out.

pub mod annotations;
pub mod apply;
pub mod env;
pub mod error;
pub mod fetch;
pub mod io;
pub mod metadata;
pub mod types;

pub use error::{ResourceError, Result};
pub use types::{
    Action, ApplyRequest, FetchRequest, Metadata, Metadatum, Params, Response, Source, Version,
    APP_VERSION,
};
