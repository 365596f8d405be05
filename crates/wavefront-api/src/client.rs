//! The event API client.
//!
//! Four operations against the remote event API: fetch, create an
//! instantaneous event, start an ongoing event, and end an ongoing event.
//! Every response is the `{status, response}` envelope the API wraps its
//! payloads in; callers get the `response` sub-object.

use std::collections::BTreeMap;

use chrono::Utc;
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{EventApiError, Result};
use crate::merge::merge_annotations;
use crate::pointer::{self, Lookup};
use crate::transport::{ApiRequest, AuthTransport, HttpTransport, RetryPolicy, RetryTransport, Transport};

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Value,
    response: Value,
}

pub struct EventClient {
    base_url: Url,
    transport: Box<dyn Transport>,
}

impl std::fmt::Debug for EventClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl EventClient {
    /// Build a client that talks to `base_url` through `delegate`, wrapping
    /// the delegate in the bearer-auth stage.
    ///
    /// Tests pass a fake delegate here; production callers usually want
    /// [`EventClient::with_retry`].
    pub fn new(base_url: &str, token: &str, delegate: impl Transport + 'static) -> Result<Self> {
        let trimmed = base_url.trim_end_matches('/');
        let base = Url::parse(trimmed).map_err(|source| EventApiError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        if base.cannot_be_a_base() {
            return Err(EventApiError::BaseUrlNotHierarchical {
                url: base_url.to_string(),
            });
        }

        Ok(Self {
            base_url: base,
            transport: Box::new(AuthTransport::new(token, delegate)),
        })
    }

    /// The production pipeline: auth → retry → HTTP.
    pub fn with_retry(base_url: &str, token: &str, policy: RetryPolicy) -> Result<Self> {
        let http = HttpTransport::new()?;
        Self::new(base_url, token, RetryTransport::new(http, policy))
    }

    /// `GET /api/v2/event/{id}`.
    pub fn get_event(&self, event_id: &str) -> Result<Value> {
        let request = ApiRequest::new(Method::GET, self.event_url(&[event_id]));
        self.do_event_request(request)
    }

    /// Create an event that starts and ends immediately.
    pub fn create_instant_event(
        &self,
        name: &str,
        annotations: &BTreeMap<String, String>,
        tags: &[String],
    ) -> Result<Value> {
        let start = Utc::now().timestamp_millis();
        self.create_event(name, annotations, tags, Some(start), Some(start + 1))
    }

    /// Create an open-ended event; the server infers the ONGOING state from
    /// the missing time bounds.
    pub fn start_ongoing_event(
        &self,
        name: &str,
        annotations: &BTreeMap<String, String>,
        tags: &[String],
    ) -> Result<Value> {
        self.create_event(name, annotations, tags, None, None)
    }

    /// Close an ongoing event.
    ///
    /// When `new_annotations` is supplied, the merge engine runs against the
    /// snapshot's annotations first, and only a merge that actually changes
    /// them issues an update call before the close.
    pub fn end_ongoing_event(
        &self,
        event_id: &str,
        snapshot: &Value,
        new_annotations: Option<&BTreeMap<String, String>>,
    ) -> Result<Value> {
        if let Some(updates) = new_annotations {
            let existing = match pointer::lookup(snapshot, "/annotations") {
                Lookup::Found(Value::Object(map)) => map,
                Lookup::Found(other) => {
                    return Err(EventApiError::TypeMismatch {
                        path: "/annotations".to_string(),
                        found: pointer::json_type_name(other),
                    });
                }
                Lookup::NotFound => return Err(EventApiError::MissingAnnotations),
            };

            if let Some(merged) = merge_annotations(existing, updates)? {
                // The update endpoint takes the whole event body, so send the
                // snapshot back with only its annotations replaced.
                let mut updated = snapshot.clone();
                updated["annotations"] = Value::Object(merged);
                self.update_event(event_id, &updated)?;
            }
        }

        let request = ApiRequest::new(Method::POST, self.event_url(&[event_id, "close"]));
        self.do_event_request(request)
    }

    /// `PUT /api/v2/event/{id}` with the full replacement body.
    fn update_event(&self, event_id: &str, event: &Value) -> Result<()> {
        let request = ApiRequest::with_body(
            Method::PUT,
            self.event_url(&[event_id]),
            serde_json::to_vec(event)?,
        );
        self.do_event_request(request).map(|_| ())
    }

    fn create_event(
        &self,
        name: &str,
        annotations: &BTreeMap<String, String>,
        tags: &[String],
        start_time_millis: Option<i64>,
        end_time_millis: Option<i64>,
    ) -> Result<Value> {
        let mut body = serde_json::json!({
            "name": name,
            "annotations": annotations,
            "tags": tags,
        });
        if let Some(start) = start_time_millis {
            body["startTime"] = start.into();
        }
        if let Some(end) = end_time_millis {
            body["endTime"] = end.into();
        }

        let request = ApiRequest::with_body(
            Method::POST,
            self.event_url(&[]),
            serde_json::to_vec(&body)?,
        );
        self.do_event_request(request)
    }

    fn event_url(&self, tail: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .expect("base url is hierarchical, checked at construction");
            segments.pop_if_empty().extend(["api", "v2", "event"]);
            segments.extend(tail);
        }
        url
    }

    fn do_event_request(&self, request: ApiRequest) -> Result<Value> {
        tracing::debug!(method = %request.method, url = %request.url, "event api request");

        let response = self.transport.send(request)?;
        if response.status != StatusCode::OK {
            return Err(EventApiError::BadResponseStatus {
                status: response.status,
            });
        }

        let envelope: Envelope = serde_json::from_slice(&response.body)?;
        tracing::trace!(status = ?envelope.status, "event api envelope");
        Ok(envelope.response)
    }
}
