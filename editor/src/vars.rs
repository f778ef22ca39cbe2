//! Template variables for OID and string parameters.
//!
//! A parameter such as `sensor:${room}/temp` is resolved against the pool's
//! variable map at render and subscription time. Unknown names and malformed
//! references stay in the output untouched so the user can see them.

#[cfg(test)]
#[path = "vars_test.rs"]
mod vars_test;

use std::collections::BTreeMap;

/// Variable name → replacement text.
pub type Variables = BTreeMap<String, String>;

const OPEN: &str = "${";
const CLOSE: char = '}';

/// Replace every `${name}` in `template` whose `name` is defined in `vars`.
#[must_use]
pub fn substitute(template: &str, vars: &Variables) -> String {
    if vars.is_empty() || !template.contains(OPEN) {
        return template.to_owned();
    }
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after = &rest[start + OPEN.len()..];
        let Some(end) = after.find(CLOSE) else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        match vars.get(name) {
            Some(value) => out.push_str(value),
            None => out.push_str(&rest[start..start + OPEN.len() + end + 1]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

/// Apply [`substitute`] to every string inside a JSON value.
#[must_use]
pub fn substitute_value(value: &serde_json::Value, vars: &Variables) -> serde_json::Value {
    match value {
        serde_json::Value::String(s) => serde_json::Value::String(substitute(s, vars)),
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(|v| substitute_value(v, vars)).collect())
        }
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute_value(v, vars)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Names referenced by `template`, in order of appearance.
#[must_use]
pub fn references(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find(OPEN) {
        let after = &rest[start + OPEN.len()..];
        let Some(end) = after.find(CLOSE) else {
            break;
        };
        names.push(&after[..end]);
        rest = &after[end + 1..];
    }
    names
}

/// Whether `template` contains at least one `${...}` reference.
#[must_use]
pub fn is_template(template: &str) -> bool {
    !references(template).is_empty()
}

/// Parse `name=value` assignments, as given on command lines and query strings.
///
/// # Errors
///
/// Returns the offending input when it has no `=` or an empty name.
pub fn parse_assignment(input: &str) -> Result<(String, String), String> {
    match input.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_owned(), value.to_owned())),
        _ => Err(input.to_owned()),
    }
}
