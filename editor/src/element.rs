//! Element model: placed dashboard elements and their persisted form.
//!
//! A `DElement` lives only inside the [`crate::pool::ElementPool`]; its `id`
//! is assigned on creation and never written to dashboard source. The
//! persisted counterpart, `DElementData`, is what travels through
//! [`crate::dashboard::DashboardData`] and undo snapshots.

#[cfg(test)]
#[path = "element_test.rs"]
mod element_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geom::Coords;

/// Unique identifier for a placed element.
pub type ElementId = Uuid;

/// A placed element as owned by the pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DElement {
    /// Runtime identifier, regenerated on every import.
    pub id: ElementId,
    /// Element class name, resolved against the element pack.
    pub kind: String,
    /// Free-form parameters; keys normally match the class property names.
    pub params: serde_json::Value,
    /// Top-left anchor in dashboard coordinates.
    pub position: Coords,
    /// Stacking order; lower values are drawn beneath higher values.
    pub zindex: i64,
}

/// A placed element as stored in dashboard source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DElementData {
    pub kind: String,
    #[serde(default = "empty_params")]
    pub params: serde_json::Value,
    #[serde(default)]
    pub position: Coords,
    #[serde(default)]
    pub zindex: i64,
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl DElement {
    /// Materialize persisted data under a fresh id.
    #[must_use]
    pub fn from_data(data: DElementData) -> Self {
        let params = if data.params.is_object() { data.params } else { empty_params() };
        Self { id: Uuid::new_v4(), kind: data.kind, params, position: data.position, zindex: data.zindex }
    }

    /// Persisted form of this element (drops the runtime id).
    #[must_use]
    pub fn to_data(&self) -> DElementData {
        DElementData {
            kind: self.kind.clone(),
            params: self.params.clone(),
            position: self.position,
            zindex: self.zindex,
        }
    }

    /// Typed view over `params`.
    #[must_use]
    pub fn params(&self) -> Params<'_> {
        Params::new(&self.params)
    }

    /// Set or remove (`None`) a single parameter.
    pub fn set_param(&mut self, name: &str, value: Option<serde_json::Value>) {
        if !self.params.is_object() {
            self.params = empty_params();
        }
        if let Some(map) = self.params.as_object_mut() {
            match value {
                Some(v) => {
                    map.insert(name.to_owned(), v);
                }
                None => {
                    map.remove(name);
                }
            }
        }
    }
}

/// Typed access to an element's parameter bag.
pub struct Params<'a> {
    value: &'a serde_json::Value,
}

impl<'a> Params<'a> {
    #[must_use]
    pub fn new(value: &'a serde_json::Value) -> Self {
        Self { value }
    }

    /// Raw parameter value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a serde_json::Value> {
        self.value.get(name)
    }

    /// String parameter, if present and a string.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&'a str> {
        self.value.get(name).and_then(serde_json::Value::as_str)
    }

    /// Numeric parameter, if present and a number.
    #[must_use]
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.value.get(name).and_then(serde_json::Value::as_f64)
    }

    /// Boolean parameter. Absent or non-boolean reads as `false`.
    #[must_use]
    pub fn get_bool(&self, name: &str) -> bool {
        self.value
            .get(name)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'a String, &'a serde_json::Value)> {
        self.value.as_object().into_iter().flat_map(serde_json::Map::iter)
    }
}
