use super::*;

#[test]
fn pointer_targets_decode() {
    assert_eq!(pointer_target("viewport", None), Ok(PointerTarget::Viewport));
    assert_eq!(pointer_target("selection", None), Ok(PointerTarget::SelectionRect));
    assert_eq!(pointer_target("sidebar", None), Ok(PointerTarget::Other));
    let id = ElementId::new_v4();
    assert_eq!(pointer_target("element", Some(&id.to_string())), Ok(PointerTarget::Element(id)));
}

#[test]
fn element_target_needs_a_valid_id() {
    assert!(pointer_target("element", None).is_err());
    assert!(pointer_target("element", Some("nope")).is_err());
}

#[test]
fn touch_and_input_flags() {
    assert_eq!(pointer_kind(true), PointerKind::Touch);
    assert_eq!(pointer_kind(false), PointerKind::Mouse);
    assert_eq!(key_target(true), KeyTarget::Input);
    assert_eq!(key_target(false), KeyTarget::Body);
}

#[test]
fn dashboard_json_is_optional() {
    assert_eq!(parse_dashboard(None), Ok(None));
    let data = parse_dashboard(Some(r#"{"name": "a", "viewport": {"x": 300, "y": 300}, "grid": 5, "elements": []}"#.into()))
        .unwrap()
        .unwrap();
    assert_eq!(data.name, "a");
    assert!(parse_dashboard(Some("{}".into())).is_err());
}
