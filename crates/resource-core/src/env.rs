//! Restricted environment interpolation for templated fields.
//!
//! Event names, tags, and user-supplied annotation values may reference
//! `${VAR}` or `$VAR`. Only the build-provenance variables Concourse exposes
//! to resource containers are honoured; anything else expands to a loudly
//! wrong placeholder so a typo shows up in the event instead of vanishing
//! into an empty string.

/// Environment variables templated fields are allowed to reference.
pub const ALLOWED_VARS: [&str; 5] = [
    "ATC_EXTERNAL_URL",
    "BUILD_ID",
    "BUILD_JOB_NAME",
    "BUILD_PIPELINE_NAME",
    "BUILD_TEAM_NAME",
];

/// A lookup into the process environment (or a test double of it).
/// `None` means the variable is unset.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Wrap `lookup` with the allow-list: unknown names resolve to the visible
/// `INVALID ENV VAR <name>` sentinel, allowed-but-unset names to "".
pub fn restricted(lookup: EnvLookup<'_>) -> impl Fn(&str) -> Option<String> + '_ {
    move |name: &str| {
        if ALLOWED_VARS.contains(&name) {
            Some(lookup(name).unwrap_or_default())
        } else {
            Some(format!("INVALID ENV VAR {name}"))
        }
    }
}

/// Substitute `${VAR}` and `$VAR` references in `input` via `lookup`.
///
/// A `$` that does not begin a variable reference is kept literally, as is
/// an unterminated `${`.
pub fn interpolate(input: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    let mut output = String::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        let Some(offset) = input[i..].find('$') else {
            output.push_str(&input[i..]);
            break;
        };
        let dollar = i + offset;
        output.push_str(&input[i..dollar]);

        let rest = &input[dollar + 1..];
        if let Some(braced) = rest.strip_prefix('{') {
            if let Some(end) = braced.find('}') {
                output.push_str(&lookup(&braced[..end]).unwrap_or_default());
                i = dollar + 2 + end + 1;
            } else {
                // unterminated ${ is kept literally
                output.push('$');
                i = dollar + 1;
            }
            continue;
        }

        let starts_name = rest
            .chars()
            .next()
            .is_some_and(|c| c == '_' || c.is_ascii_alphabetic());
        if starts_name {
            let len = rest
                .find(|c: char| c != '_' && !c.is_ascii_alphanumeric())
                .unwrap_or(rest.len());
            output.push_str(&lookup(&rest[..len]).unwrap_or_default());
            i = dollar + 1 + len;
        } else {
            output.push('$');
            i = dollar + 1;
        }
    }

    output
}
