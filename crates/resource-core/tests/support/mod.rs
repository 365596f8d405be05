//! A fake Wavefront endpoint for command-core tests.
//!
//! Routes on the request path, checks the bearer token like the real API
//! would, and records hit counts and request bodies for assertions.

use std::collections::HashMap;
use std::sync::Mutex;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use wavefront_api::{ApiRequest, ApiResponse, Transport};

pub struct FakeWavefront {
    token: String,
    routes: HashMap<String, Route>,
    state: Mutex<State>,
}

struct Route {
    method: Method,
    response: String,
}

#[derive(Default)]
struct State {
    hits: HashMap<String, usize>,
    bodies: HashMap<String, String>,
    total: usize,
}

impl FakeWavefront {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            routes: HashMap::new(),
            state: Mutex::new(State::default()),
        }
    }

    pub fn stub(mut self, method: Method, path: &str, response: &str) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                method,
                response: response.to_string(),
            },
        );
        self
    }

    pub fn hit_count(&self, path: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .hits
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_requests(&self) -> usize {
        self.state.lock().unwrap().total
    }

    /// The last body sent to `path`, decoded as JSON.
    pub fn sent_body(&self, path: &str) -> Option<serde_json::Value> {
        self.state
            .lock()
            .unwrap()
            .bodies
            .get(path)
            .map(|b| serde_json::from_str(b).expect("recorded body is json"))
    }
}

impl Transport for FakeWavefront {
    fn send(&self, request: ApiRequest) -> wavefront_api::Result<ApiResponse> {
        let path = request.url.path().to_string();

        let mut state = self.state.lock().unwrap();
        state.total += 1;
        *state.hits.entry(path.clone()).or_insert(0) += 1;

        let Some(route) = self.routes.get(&path) else {
            return Ok(status_only(StatusCode::NOT_FOUND));
        };
        if route.method != request.method {
            return Ok(status_only(StatusCode::METHOD_NOT_ALLOWED));
        }

        let auth = request
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if auth != format!("Bearer {}", self.token) {
            return Ok(status_only(StatusCode::UNAUTHORIZED));
        }

        if let Some(body) = &request.body {
            state
                .bodies
                .insert(path, String::from_utf8_lossy(body).into_owned());
        }

        Ok(ApiResponse {
            status: StatusCode::OK,
            body: route.response.clone().into_bytes(),
        })
    }
}

fn status_only(status: StatusCode) -> ApiResponse {
    ApiResponse {
        status,
        body: Vec::new(),
    }
}
