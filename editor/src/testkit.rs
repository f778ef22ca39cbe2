//! Shared fixtures for unit tests.

use serde_json::json;

use crate::geom::Coords;
use crate::pack::{ElementClass, ElementPack, Property, PropertyKind};

fn prop(name: &str, kind: PropertyKind, params: Option<serde_json::Value>) -> Property {
    Property { id: name.to_owned(), name: name.to_owned(), kind, params }
}

/// A small pack: `label` (20×20 text), `gauge` (100×50, subscribed OID,
/// boxed) and `button` (40×20, action-capable, plain OID).
pub fn pack() -> ElementPack {
    let mut pack = ElementPack::default();
    pack.insert(
        "label",
        ElementClass {
            description: "Text label".into(),
            group: "Text".into(),
            defaults: json!({"text": "label", "bold": false}),
            props: vec![
                prop("text", PropertyKind::String, None),
                prop("bold", PropertyKind::Boolean, None),
            ],
            default_size: Coords::new(20.0, 20.0),
            boxed: false,
            actions: false,
        },
    );
    pack.insert(
        "gauge",
        ElementClass {
            description: "Gauge".into(),
            group: "Meters".into(),
            defaults: json!({"oid": "", "max": 100, "formula": "x"}),
            props: vec![
                prop("oid", PropertyKind::OidSubscribed, Some(json!({"kind": "sensor"}))),
                prop("max", PropertyKind::Number, Some(json!({"min": 1, "max": 1000}))),
                prop("formula", PropertyKind::Formula, None),
            ],
            default_size: Coords::new(100.0, 50.0),
            boxed: true,
            actions: false,
        },
    );
    pack.insert(
        "button",
        ElementClass {
            description: "Action button".into(),
            group: "Controls".into(),
            defaults: json!({"oid": "unit:pump/main", "caption": "Run"}),
            props: vec![
                prop("oid", PropertyKind::Oid, Some(json!({"kind": "unit"}))),
                prop("caption", PropertyKind::String, None),
            ],
            default_size: Coords::new(40.0, 20.0),
            boxed: false,
            actions: true,
        },
    );
    pack
}
