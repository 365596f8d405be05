//! Client for the Wavefront events API.
//!
//! The crate covers exactly the slice of the API the Concourse resource
//! needs: fetching an event, creating an instantaneous event, starting an
//! ongoing event, and closing one (updating its annotations first when the
//! merge actually changes them).
//!
//! Requests travel through an explicit transport pipeline (bearer auth,
//! then bounded retry with backoff, then a blocking HTTP round trip).
//! Each stage is a [`Transport`] of its own, so tests can cut the chain
//! at any point.

pub mod client;
pub mod error;
pub mod merge;
pub mod pointer;
pub mod transport;

pub use client::EventClient;
pub use error::{EventApiError, Result};
pub use merge::merge_annotations;
pub use transport::{
    ApiRequest, ApiResponse, AuthTransport, HttpTransport, RetryPolicy, RetryTransport, Transport,
};
