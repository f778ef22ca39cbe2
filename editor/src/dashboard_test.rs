#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

fn source(v: serde_json::Value) -> String {
    v.to_string()
}

fn valid() -> serde_json::Value {
    json!({
        "name": "boiler room",
        "viewport": {"x": 1200, "y": 800},
        "scale": 1.5,
        "grid": 10,
        "elements": [
            {"kind": "label", "params": {"text": "hi"}, "position": {"x": 10, "y": 20}, "zindex": 2},
            {"kind": "gauge", "params": {}, "position": {"x": 0, "y": 0}}
        ],
        "custom_data": {"owner": "ops"}
    })
}

#[test]
fn default_dashboard() {
    let d = DashboardData::default();
    assert_eq!(d.name, "untitled");
    assert_eq!(d.viewport, Coords::new(900.0, 600.0));
    assert_eq!(d.scale, 1.0);
    assert_eq!(d.grid, 20);
    assert!(d.elements.is_empty());
    assert!(d.custom_data.is_none());
}

#[test]
fn from_source_accepts_valid() {
    let d = DashboardData::from_source(&source(valid())).unwrap();
    assert_eq!(d.name, "boiler room");
    assert_eq!(d.viewport, Coords::new(1200.0, 800.0));
    assert_eq!(d.scale, 1.5);
    assert_eq!(d.grid, 10);
    assert_eq!(d.elements.len(), 2);
    assert_eq!(d.elements[0].zindex, 2);
    assert_eq!(d.elements[1].zindex, 0);
    assert_eq!(d.custom_data, Some(json!({"owner": "ops"})));
}

#[test]
fn from_source_parses_numeric_strings_and_truncates() {
    let mut v = valid();
    v["viewport"] = json!({"x": "1000", "y": 700.9});
    v["grid"] = json!("25");
    let d = DashboardData::from_source(&source(v)).unwrap();
    assert_eq!(d.viewport, Coords::new(1000.0, 700.0));
    assert_eq!(d.grid, 25);
}

#[test]
fn from_source_reads_leading_integers_of_strings() {
    let mut v = valid();
    v["viewport"] = json!({"x": "300e2", "y": " 640px"});
    v["grid"] = json!("12.9");
    let d = DashboardData::from_source(&source(v)).unwrap();
    assert_eq!(d.viewport, Coords::new(300.0, 640.0));
    assert_eq!(d.grid, 12);

    let mut v = valid();
    v["viewport"] = json!({"x": "1e3", "y": 600});
    assert!(matches!(DashboardData::from_source(&source(v)), Err(SourceError::InvalidViewport)));

    let mut v = valid();
    v["grid"] = json!("px");
    assert!(matches!(DashboardData::from_source(&source(v)), Err(SourceError::InvalidGrid)));
}

#[test]
fn from_source_defaults_scale() {
    let mut v = valid();
    v.as_object_mut().unwrap().remove("scale");
    assert_eq!(DashboardData::from_source(&source(v)).unwrap().scale, 1.0);
}

#[test]
fn from_source_rejects_bad_json() {
    assert!(matches!(DashboardData::from_source("{nope"), Err(SourceError::Json(_))));
}

#[test]
fn from_source_requires_name() {
    for name in [json!(null), json!(""), json!(5)] {
        let mut v = valid();
        v["name"] = name;
        assert!(matches!(DashboardData::from_source(&source(v)), Err(SourceError::NoName)));
    }
}

#[test]
fn from_source_rejects_small_or_invalid_viewport() {
    for vp in [json!({"x": 99, "y": 600}), json!({"x": 900, "y": "abc"}), json!({"x": 900}), json!(null)] {
        let mut v = valid();
        v["viewport"] = vp;
        assert!(matches!(DashboardData::from_source(&source(v)), Err(SourceError::InvalidViewport)));
    }
}

#[test]
fn from_source_accepts_minimum_viewport() {
    let mut v = valid();
    v["viewport"] = json!({"x": 100, "y": 100});
    assert!(DashboardData::from_source(&source(v)).is_ok());
}

#[test]
fn from_source_rejects_invalid_grid() {
    for grid in [json!(0), json!(0.5), json!("x"), json!(null)] {
        let mut v = valid();
        v["grid"] = grid;
        assert!(matches!(DashboardData::from_source(&source(v)), Err(SourceError::InvalidGrid)));
    }
}

#[test]
fn from_source_rejects_invalid_scale() {
    let mut v = valid();
    v["scale"] = json!(-1);
    assert!(matches!(DashboardData::from_source(&source(v)), Err(SourceError::InvalidScale)));
}

#[test]
fn from_source_requires_elements_array() {
    let mut v = valid();
    v["elements"] = json!({"kind": "label"});
    assert!(matches!(DashboardData::from_source(&source(v)), Err(SourceError::NoElements)));
}

#[test]
fn from_source_reports_bad_element_index() {
    let mut v = valid();
    v["elements"] = json!([{"kind": "label"}, {"params": {}}]);
    let err = DashboardData::from_source(&source(v)).unwrap_err();
    assert!(matches!(err, SourceError::InvalidElement { index: 1, .. }));
}

#[test]
fn to_source_is_pretty_and_reparses() {
    let d = DashboardData::from_source(&source(valid())).unwrap();
    let text = d.to_source().unwrap();
    assert!(text.contains("\n  \"name\": \"boiler room\""));
    assert_eq!(DashboardData::from_source(&text).unwrap(), d);
}

#[test]
fn to_source_omits_missing_custom_data() {
    let text = DashboardData::default().to_source().unwrap();
    assert!(!text.contains("custom_data"));
}

#[test]
fn error_messages_match_dialog_text() {
    assert_eq!(SourceError::NoName.to_string(), "no dashboard name");
    assert_eq!(SourceError::InvalidViewport.to_string(), "invalid viewport");
    assert_eq!(SourceError::InvalidGrid.to_string(), "invalid grid");
    assert_eq!(SourceError::NoElements.to_string(), "no elements");
}

#[test]
fn upload_accepts_json_and_txt_only() {
    assert!(accepts_source_file("dashboard.json"));
    assert!(accepts_source_file("DASH.TXT"));
    assert!(!accepts_source_file("dashboard.yaml"));
    assert!(!accepts_source_file("json"));
}
