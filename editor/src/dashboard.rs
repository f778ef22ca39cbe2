//! Persisted dashboard snapshot and source-text validation.
//!
//! `DashboardData` is the unit of save/load: the host persists it, the
//! viewer renders it, and the undo history stores copies of it. The source
//! dialog lets users paste arbitrary JSON, so [`DashboardData::from_source`]
//! is lenient about numeric strings but strict about the shape.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_GRID, DEFAULT_NAME, DEFAULT_SCALE, DEFAULT_VIEWPORT, MIN_VIEWPORT};
use crate::element::DElementData;
use crate::geom::Coords;

/// Reasons dashboard source text is rejected.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no dashboard name")]
    NoName,
    #[error("invalid viewport")]
    InvalidViewport,
    #[error("invalid grid")]
    InvalidGrid,
    #[error("invalid scale")]
    InvalidScale,
    #[error("no elements")]
    NoElements,
    #[error("invalid element #{index}: {source}")]
    InvalidElement {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// A saved dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub name: String,
    pub viewport: Coords,
    #[serde(default = "default_scale")]
    pub scale: f64,
    pub grid: u32,
    pub elements: Vec<DElementData>,
    /// Opaque host data, passed through unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<serde_json::Value>,
}

fn default_scale() -> f64 {
    DEFAULT_SCALE
}

impl Default for DashboardData {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_owned(),
            viewport: DEFAULT_VIEWPORT,
            scale: DEFAULT_SCALE,
            grid: DEFAULT_GRID,
            elements: Vec::new(),
            custom_data: None,
        }
    }
}

impl DashboardData {
    /// Parse and validate dashboard source text.
    ///
    /// Viewport dimensions and the grid may be numbers or numeric strings;
    /// only their integer part is kept. Viewport dimensions must be at least
    /// 100 and the grid at least 1.
    ///
    /// # Errors
    ///
    /// Returns the first [`SourceError`] found.
    pub fn from_source(source: &str) -> Result<Self, SourceError> {
        let value: serde_json::Value = serde_json::from_str(source)?;
        Self::from_value(&value)
    }

    /// Validate an already-parsed JSON value. See [`Self::from_source`].
    ///
    /// # Errors
    ///
    /// Returns the first [`SourceError`] found.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, SourceError> {
        let name = value
            .get("name")
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or(SourceError::NoName)?
            .to_owned();

        let viewport = value.get("viewport").ok_or(SourceError::InvalidViewport)?;
        let vx = viewport.get("x").and_then(parse_int).ok_or(SourceError::InvalidViewport)?;
        let vy = viewport.get("y").and_then(parse_int).ok_or(SourceError::InvalidViewport)?;
        if vx < MIN_VIEWPORT || vy < MIN_VIEWPORT {
            return Err(SourceError::InvalidViewport);
        }

        let grid = value.get("grid").and_then(parse_int).ok_or(SourceError::InvalidGrid)?;
        if grid < 1.0 || grid > f64::from(u32::MAX) {
            return Err(SourceError::InvalidGrid);
        }

        let scale = match value.get("scale") {
            None | Some(serde_json::Value::Null) => DEFAULT_SCALE,
            Some(v) => parse_float(v).filter(|s| *s > 0.0).ok_or(SourceError::InvalidScale)?,
        };

        let raw_elements = value
            .get("elements")
            .and_then(serde_json::Value::as_array)
            .ok_or(SourceError::NoElements)?;
        let elements = raw_elements
            .iter()
            .enumerate()
            .map(|(index, el)| {
                DElementData::deserialize(el).map_err(|source| SourceError::InvalidElement { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let custom_data = value.get("custom_data").filter(|v| !v.is_null()).cloned();

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let grid = grid as u32;
        Ok(Self { name, viewport: Coords::new(vx, vy), scale, grid, elements, custom_data })
    }

    /// Pretty-printed source text (two-space indent).
    ///
    /// # Errors
    ///
    /// Fails only if a parameter value cannot be represented as JSON.
    pub fn to_source(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Integer part of a JSON number, or the leading integer of a string
/// (`"1e3"` and `"12px"` read as 1 and 12).
fn parse_int(v: &serde_json::Value) -> Option<f64> {
    match v {
        serde_json::Value::String(s) => leading_int(s),
        _ => parse_float(v).map(f64::trunc),
    }
}

fn leading_int(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1.0, &s[1..]),
        Some(b'+') => (1.0, &s[1..]),
        _ => (1.0, s),
    };
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let Ok(n) = rest[..end].parse::<f64>() else {
        return None;
    };
    Some(sign * n).filter(|n| n.is_finite())
}

fn parse_float(v: &serde_json::Value) -> Option<f64> {
    let n = match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => match s.trim().parse::<f64>() {
            Ok(n) => Some(n),
            Err(_) => None,
        },
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Whether an uploaded file may be loaded into the source dialog.
#[must_use]
pub fn accepts_source_file(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    lower.ends_with(".json") || lower.ends_with(".txt")
}
