//! Protocol types for the Concourse resource interface.
//!
//! A resource invocation reads one JSON request from stdin and writes one
//! JSON response to stdout. The shapes here mirror that contract:
//!
//! ```yaml
//! resources:
//! - name: events
//!   type: wavefront-event
//!   source:
//!     tenant_url: https://<tenant>.wavefront.com
//!     api_token: ((wavefront-token))
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ResourceError, Result};

/// Version of the running resource, embedded into provenance annotations.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// The `source` block configured on the pipeline resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub tenant_url: String,
    #[serde(default)]
    pub api_token: String,
}

impl Source {
    /// Check the required properties, before any network call is made.
    pub fn validate(&self) -> Result<()> {
        if self.tenant_url.is_empty() {
            return Err(ResourceError::MissingTenantUrl);
        }
        if self.api_token.is_empty() {
            return Err(ResourceError::MissingApiToken);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Version / Metadata
// ---------------------------------------------------------------------------

/// The only durable identity the resource carries between steps: an event ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    #[serde(default)]
    pub id: String,
}

/// One name/value pair surfaced to the pipeline UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadatum {
    pub name: String,
    pub value: String,
}

pub type Metadata = Vec<Metadatum>;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// What a `put` step asks the resource to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Create an instantaneous event.
    Create,
    /// Open an event with running state ONGOING.
    Start,
    /// Close a previously started event.
    End,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Start => "start",
            Action::End => "end",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Action {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "create" => Ok(Action::Create),
            "start" => Ok(Action::Start),
            "end" => Ok(Action::End),
            _ => Err(ResourceError::InvalidAction(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Params
// ---------------------------------------------------------------------------

/// The `params` block of a `put` step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Params {
    #[serde(default)]
    pub action: String,

    #[serde(default)]
    pub event_name: String,

    /// `None` means "do not touch annotations" on the end path, which is
    /// distinct from an explicitly empty map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Name of the step input holding the persisted event state; required
    /// when `action` is `end`.
    #[serde(default)]
    pub event: String,
}

impl Params {
    /// Check the action-specific requirements and return the parsed action.
    pub fn validate(&self) -> Result<Action> {
        let action: Action = self.action.parse()?;

        match action {
            Action::End if self.event.is_empty() => Err(ResourceError::MissingEventReference),
            Action::Create | Action::Start if self.event_name.is_empty() => {
                Err(ResourceError::MissingEventName)
            }
            _ => Ok(action),
        }
    }
}

// ---------------------------------------------------------------------------
// Requests / response
// ---------------------------------------------------------------------------

/// What a `get` step receives on stdin.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchRequest {
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub version: Version,
}

/// What a `put` step receives on stdin.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplyRequest {
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub params: Params,
}

/// What both steps write to stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub version: Version,
    pub metadata: Metadata,
}
