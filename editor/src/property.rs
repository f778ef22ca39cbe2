//! Property editors: coercion of user input into element parameter values.
//!
//! Every class property names a [`PropertyKind`]. The sidebar renders a form
//! widget per kind; whatever the widget produces arrives here as a
//! [`PropertyInput`] and is turned into the JSON value stored in the
//! element's params, or rejected with a message shown under the widget.
//! `Ok(None)` means "remove the parameter".

#[cfg(test)]
#[path = "property_test.rs"]
mod property_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::formula::{self, FormulaError};
use crate::pack::PropertyKind;
use crate::vars;

/// Raw input from a property widget.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyInput {
    /// Text typed into a field.
    Text(String),
    /// A structured value (checkbox state, list dialog result, slider position).
    Value(Value),
}

impl From<&str> for PropertyInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<Value> for PropertyInput {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

/// Rejected property input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertyError {
    #[error("not a number: {0}")]
    NotANumber(String),
    #[error("value must be an integer")]
    NotAnInteger,
    #[error("value must be >= {0}")]
    BelowMin(f64),
    #[error("value must be <= {0}")]
    AboveMax(f64),
    #[error("expected {0}")]
    WrongType(&'static str),
    #[error("value is not one of the allowed options")]
    NotAnOption,
    #[error("invalid OID: {0}")]
    InvalidOid(String),
    #[error("OID must be of kind {0}")]
    WrongOidKind(String),
    #[error("invalid formula: {0}")]
    Formula(#[from] FormulaError),
}

/// Label/value/color row of a `value_map` property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueMapEntry {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub color: String,
}

/// Value/color row of a `value_color_map` property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueColorMapEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub color: String,
}

/// Coerce widget input for a property of `kind` with editor `params`.
///
/// # Errors
///
/// Returns a [`PropertyError`] describing why the input was rejected.
pub fn coerce(kind: &PropertyKind, params: Option<&Value>, input: PropertyInput) -> Result<Option<Value>, PropertyError> {
    match kind {
        PropertyKind::Number => coerce_number(params, &input).map(Some),
        PropertyKind::SelectNumber => to_f64(&input).map(|n| Some(number_value(n))),
        PropertyKind::SelectNumberSlider => coerce_slider(params, &input).map(Some),
        PropertyKind::String | PropertyKind::SelectColor | PropertyKind::SelectDatabase => {
            to_string(&input).map(|s| Some(Value::String(s)))
        }
        PropertyKind::SelectString => coerce_select_string(params, &input).map(Some),
        PropertyKind::Formula => {
            let s = to_string(&input)?;
            formula::calculate_formula(&s, 1.0)?;
            Ok(Some(Value::String(s)))
        }
        PropertyKind::StringList => coerce_string_list(&input).map(Some),
        PropertyKind::Boolean => coerce_bool(&input).map(|b| Some(Value::Bool(b))),
        PropertyKind::Oid | PropertyKind::OidSubscribed | PropertyKind::SelectServerOid => {
            coerce_oid(params, &input)
        }
        PropertyKind::ValueMap => coerce_value_map(&input).map(Some),
        PropertyKind::ValueColorMap => coerce_value_color_map(&input).map(Some),
        PropertyKind::Custom(_) => Ok(Some(match input {
            PropertyInput::Text(s) => Value::String(s),
            PropertyInput::Value(v) => v,
        })),
    }
}

fn param_f64(params: Option<&Value>, key: &str) -> Option<f64> {
    params.and_then(|p| p.get(key)).and_then(Value::as_f64)
}

fn param_bool(params: Option<&Value>, key: &str) -> bool {
    params
        .and_then(|p| p.get(key))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn to_f64(input: &PropertyInput) -> Result<f64, PropertyError> {
    let n = match input {
        PropertyInput::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| PropertyError::NotANumber(s.clone()))?,
        PropertyInput::Value(Value::Number(n)) => n.as_f64().ok_or_else(|| PropertyError::NotANumber(n.to_string()))?,
        PropertyInput::Value(Value::String(s)) => {
            return to_f64(&PropertyInput::Text(s.clone()));
        }
        PropertyInput::Value(other) => return Err(PropertyError::NotANumber(other.to_string())),
    };
    if n.is_finite() { Ok(n) } else { Err(PropertyError::NotANumber(n.to_string())) }
}

/// Integral values are stored as JSON integers, everything else as floats.
#[allow(clippy::cast_possible_truncation)]
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        return Value::from(n as i64);
    }
    Value::from(n)
}

fn coerce_number(params: Option<&Value>, input: &PropertyInput) -> Result<Value, PropertyError> {
    let n = to_f64(input)?;
    if !param_bool(params, "float") && n.fract() != 0.0 {
        return Err(PropertyError::NotAnInteger);
    }
    if let Some(min) = param_f64(params, "min") {
        if n < min {
            return Err(PropertyError::BelowMin(min));
        }
    }
    if let Some(max) = param_f64(params, "max") {
        if n > max {
            return Err(PropertyError::AboveMax(max));
        }
    }
    Ok(number_value(n))
}

fn coerce_slider(params: Option<&Value>, input: &PropertyInput) -> Result<Value, PropertyError> {
    let mut n = to_f64(input)?.round();
    if let Some(min) = param_f64(params, "min") {
        n = n.max(min);
    }
    if let Some(max) = param_f64(params, "max") {
        n = n.min(max);
    }
    Ok(number_value(n))
}

fn to_string(input: &PropertyInput) -> Result<String, PropertyError> {
    match input {
        PropertyInput::Text(s) | PropertyInput::Value(Value::String(s)) => Ok(s.clone()),
        PropertyInput::Value(Value::Number(n)) => Ok(n.to_string()),
        PropertyInput::Value(_) => Err(PropertyError::WrongType("a string")),
    }
}

fn coerce_select_string(params: Option<&Value>, input: &PropertyInput) -> Result<Value, PropertyError> {
    let s = to_string(input)?;
    if let Some(options) = params.and_then(Value::as_array).filter(|a| !a.is_empty()) {
        if !options.iter().any(|o| o.as_str() == Some(s.as_str())) {
            return Err(PropertyError::NotAnOption);
        }
    }
    Ok(Value::String(s))
}

fn coerce_string_list(input: &PropertyInput) -> Result<Value, PropertyError> {
    let items: Vec<String> = match input {
        PropertyInput::Text(s) => s.lines().map(str::to_owned).collect(),
        PropertyInput::Value(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_str().map(str::to_owned).ok_or(PropertyError::WrongType("a list of strings")))
            .collect::<Result<_, _>>()?,
        PropertyInput::Value(_) => return Err(PropertyError::WrongType("a list of strings")),
    };
    Ok(Value::from(
        items
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>(),
    ))
}

fn coerce_bool(input: &PropertyInput) -> Result<bool, PropertyError> {
    match input {
        PropertyInput::Value(Value::Bool(b)) => Ok(*b),
        PropertyInput::Text(s) | PropertyInput::Value(Value::String(s)) => match s.trim() {
            "true" | "1" | "on" => Ok(true),
            "false" | "0" | "off" | "" => Ok(false),
            _ => Err(PropertyError::WrongType("a boolean")),
        },
        PropertyInput::Value(_) => Err(PropertyError::WrongType("a boolean")),
    }
}

/// Whether `oid` has the `kind:path` shape.
#[must_use]
pub fn is_valid_oid(oid: &str) -> bool {
    let Some((kind, path)) = oid.split_once(':') else {
        return false;
    };
    !kind.is_empty()
        && kind.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !path.is_empty()
        && !path.chars().any(char::is_whitespace)
}

fn coerce_oid(params: Option<&Value>, input: &PropertyInput) -> Result<Option<Value>, PropertyError> {
    let oid = match input {
        PropertyInput::Value(Value::Null) => return Ok(None),
        other => to_string(other)?,
    };
    let oid = oid.trim().to_owned();
    if oid.is_empty() {
        return Ok(None);
    }
    if !vars::is_template(&oid) {
        if !is_valid_oid(&oid) {
            return Err(PropertyError::InvalidOid(oid));
        }
        if let Some(kind) = params.and_then(|p| p.get("kind")).and_then(Value::as_str) {
            if !oid.starts_with(&format!("{kind}:")) {
                return Err(PropertyError::WrongOidKind(kind.to_owned()));
            }
        }
    }
    Ok(Some(Value::String(oid)))
}

fn structured(input: &PropertyInput) -> Result<Value, PropertyError> {
    match input {
        PropertyInput::Value(v) => Ok(v.clone()),
        PropertyInput::Text(s) => serde_json::from_str(s).map_err(|_| PropertyError::WrongType("a JSON list")),
    }
}

fn coerce_value_map(input: &PropertyInput) -> Result<Value, PropertyError> {
    let entries: Vec<ValueMapEntry> =
        serde_json::from_value(structured(input)?).map_err(|_| PropertyError::WrongType("a list of value map rows"))?;
    let kept: Vec<ValueMapEntry> = entries.into_iter().filter(|e| !e.label.is_empty()).collect();
    serde_json::to_value(kept).map_err(|_| PropertyError::WrongType("a list of value map rows"))
}

fn coerce_value_color_map(input: &PropertyInput) -> Result<Value, PropertyError> {
    let entries: Vec<ValueColorMapEntry> = serde_json::from_value(structured(input)?)
        .map_err(|_| PropertyError::WrongType("a list of value color rows"))?;
    let kept: Vec<ValueColorMapEntry> = entries
        .into_iter()
        .filter(|e| e.value.as_deref().is_some_and(|v| !v.is_empty()))
        .collect();
    serde_json::to_value(kept).map_err(|_| PropertyError::WrongType("a list of value color rows"))
}
