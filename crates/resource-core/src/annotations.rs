//! Build-provenance annotations.
//!
//! Every mutating invocation stamps a baseline of annotations describing the
//! build that produced the event, then overlays whatever the pipeline author
//! supplied. An empty user value is a tombstone against the baseline: the
//! key is dropped instead of shipped empty.

use std::collections::BTreeMap;

use crate::env::{interpolate, restricted, EnvLookup};
use crate::types::APP_VERSION;

/// Assemble the annotation map for an outgoing create/start/end call.
///
/// The baseline values come straight from the (unrestricted) environment;
/// user-supplied values are interpolated through the allow-list first.
pub fn build_annotations(
    custom: Option<&BTreeMap<String, String>>,
    lookup: EnvLookup<'_>,
) -> BTreeMap<String, String> {
    let var = |name: &str| lookup(name).unwrap_or_default();

    let mut annotations = BTreeMap::new();
    annotations.insert("concourse-team".to_string(), var("BUILD_TEAM_NAME"));
    annotations.insert("concourse-pipeline".to_string(), var("BUILD_PIPELINE_NAME"));
    annotations.insert("concourse-job".to_string(), var("BUILD_JOB_NAME"));
    annotations.insert(
        "concourse-build-url".to_string(),
        format!("{}/builds/{}", var("ATC_EXTERNAL_URL"), var("BUILD_ID")),
    );
    annotations.insert("severity".to_string(), "info".to_string());
    annotations.insert(
        "details".to_string(),
        format!("Created by Concourse observability-event-resource version {APP_VERSION}"),
    );

    let safe = restricted(lookup);
    for (key, value) in custom.into_iter().flatten() {
        if value.is_empty() {
            annotations.remove(key);
            continue;
        }
        annotations.insert(key.clone(), interpolate(value, &safe));
    }

    annotations
}

/// Interpolate each tag independently through the restricted allow-list.
pub fn expand_tags(tags: &[String], lookup: EnvLookup<'_>) -> Vec<String> {
    let safe = restricted(lookup);
    tags.iter().map(|tag| interpolate(tag, &safe)).collect()
}
