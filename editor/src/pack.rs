//! Element pack: the externally supplied catalog of element classes.
//!
//! The pack arrives as JSON from the host. The editor only needs the static
//! schema of each class (defaults, property list, default size, palette
//! group and a couple of behavior flags); rendering stays with the host.

#[cfg(test)]
#[path = "pack_test.rs"]
mod pack_test;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geom::Coords;

/// Errors raised while loading an element pack.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("invalid element pack: {0}")]
    Json(#[from] serde_json::Error),
    #[error("element class `{kind}`: defaults must be an object")]
    DefaultsNotObject { kind: String },
}

/// Editor widget used for a class property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyKind {
    Number,
    SelectNumber,
    SelectNumberSlider,
    String,
    Formula,
    StringList,
    SelectString,
    SelectDatabase,
    SelectServerOid,
    SelectColor,
    Boolean,
    Oid,
    OidSubscribed,
    ValueMap,
    ValueColorMap,
    /// A kind this editor does not know; values are stored verbatim.
    Custom(String),
}

impl PropertyKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Number => "number",
            Self::SelectNumber => "select_number",
            Self::SelectNumberSlider => "select_number_slider",
            Self::String => "string",
            Self::Formula => "formula",
            Self::StringList => "string_list",
            Self::SelectString => "select_string",
            Self::SelectDatabase => "select_database",
            Self::SelectServerOid => "select_server_oid",
            Self::SelectColor => "select_color",
            Self::Boolean => "boolean",
            Self::Oid => "oid",
            Self::OidSubscribed => "oid_subscribed",
            Self::ValueMap => "value_map",
            Self::ValueColorMap => "value_color_map",
            Self::Custom(s) => s,
        }
    }

    /// Whether values of this kind name OIDs.
    #[must_use]
    pub fn is_oid(&self) -> bool {
        matches!(self, Self::Oid | Self::OidSubscribed | Self::SelectServerOid)
    }
}

impl From<String> for PropertyKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "number" => Self::Number,
            "select_number" => Self::SelectNumber,
            "select_number_slider" => Self::SelectNumberSlider,
            "string" => Self::String,
            "formula" => Self::Formula,
            "string_list" => Self::StringList,
            "select_string" => Self::SelectString,
            "select_database" => Self::SelectDatabase,
            "select_server_oid" => Self::SelectServerOid,
            "select_color" => Self::SelectColor,
            "boolean" => Self::Boolean,
            "oid" => Self::Oid,
            "oid_subscribed" => Self::OidSubscribed,
            "value_map" => Self::ValueMap,
            "value_color_map" => Self::ValueColorMap,
            _ => Self::Custom(s),
        }
    }
}

impl From<PropertyKind> for String {
    fn from(kind: PropertyKind) -> Self {
        kind.as_str().to_owned()
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configurable property of an element class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub kind: PropertyKind,
    /// Editor-specific options (bounds, choices, OID kind filter, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

/// Static schema of an element class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementClass {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub group: String,
    #[serde(default = "empty_object")]
    pub defaults: serde_json::Value,
    #[serde(default)]
    pub props: Vec<Property>,
    #[serde(default)]
    pub default_size: Coords,
    /// Rendered inside a framed box.
    #[serde(default)]
    pub boxed: bool,
    /// Can trigger engine actions; actions are disabled while editing.
    #[serde(default)]
    pub actions: bool,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl ElementClass {
    /// Look up a property by parameter name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.props.iter().find(|p| p.name == name)
    }
}

/// Palette group: a group name and its classes, ordered by kind.
pub type PaletteGroup<'a> = (&'a str, Vec<(&'a str, &'a ElementClass)>);

/// Catalog of element classes keyed by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementPack {
    pub classes: BTreeMap<String, ElementClass>,
}

impl ElementPack {
    /// Parse and validate a pack from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PackError`] when the JSON is malformed or a class has
    /// non-object defaults.
    pub fn from_json(json: &str) -> Result<Self, PackError> {
        let pack: Self = serde_json::from_str(json)?;
        if let Some((kind, _)) = pack.classes.iter().find(|(_, c)| !c.defaults.is_object()) {
            return Err(PackError::DefaultsNotObject { kind: kind.clone() });
        }
        Ok(pack)
    }

    /// Register a class, replacing any previous class of the same kind.
    pub fn insert(&mut self, kind: impl Into<String>, class: ElementClass) {
        self.classes.insert(kind.into(), class);
    }

    #[must_use]
    pub fn class(&self, kind: &str) -> Option<&ElementClass> {
        self.classes.get(kind)
    }

    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.classes.contains_key(kind)
    }

    /// Default size of a class; unknown kinds have no size.
    #[must_use]
    pub fn default_size(&self, kind: &str) -> Coords {
        self.class(kind).map(|c| c.default_size).unwrap_or_default()
    }

    /// Property kind of `param` for elements of `kind`.
    #[must_use]
    pub fn property_kind(&self, kind: &str, param: &str) -> Option<&PropertyKind> {
        self.class(kind).and_then(|c| c.property(param)).map(|p| &p.kind)
    }

    /// Classes grouped for the palette, groups and kinds ordered by name.
    #[must_use]
    pub fn groups(&self) -> Vec<PaletteGroup<'_>> {
        let mut groups: BTreeMap<&str, Vec<(&str, &ElementClass)>> = BTreeMap::new();
        for (kind, class) in &self.classes {
            groups.entry(class.group.as_str()).or_default().push((kind.as_str(), class));
        }
        groups.into_iter().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
