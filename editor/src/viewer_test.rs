use serde_json::json;

use super::*;
use crate::element::DElementData;
use crate::testkit;

fn viewer() -> DashboardViewer {
    let data = DashboardData {
        name: "plant".into(),
        scale: 0.5,
        elements: vec![
            DElementData {
                kind: "gauge".into(),
                params: json!({"oid": "sensor:${line}/t1"}),
                position: Coords::new(10.0, 10.0),
                zindex: 0,
            },
            DElementData {
                kind: "button".into(),
                params: json!({"oid": "unit:pump/main"}),
                position: Coords::new(200.0, 10.0),
                zindex: 1,
            },
        ],
        ..DashboardData::default()
    };
    DashboardViewer::new(data, testkit::pack())
}

#[test]
fn new_imports_elements() {
    let v = viewer();
    assert_eq!(v.name, "plant");
    assert_eq!(v.pool.len(), 2);
    assert!(!v.finish_allowed);
}

#[test]
fn subscriptions_follow_variables() {
    let mut v = viewer();
    assert_eq!(v.oids_to_subscribe(), vec!["sensor:${line}/t1".to_owned()]);
    let actions = v.set_variables(Variables::from([("line".to_owned(), "l2".to_owned())]));
    assert_eq!(actions[0], Action::SubscriptionsChanged { oids: vec!["sensor:l2/t1".into()] });
}

#[test]
fn shift_q_finishes_only_when_allowed() {
    let mut v = viewer();
    let shift = Modifiers::shift();
    assert!(v.key_down(KeyCode::KeyQ, shift, KeyTarget::Body).is_empty());
    v.finish_allowed = true;
    assert_eq!(v.key_down(KeyCode::KeyQ, shift, KeyTarget::Body), vec![Action::PreventDefault, Action::Finish]);
    assert!(v.key_down(KeyCode::KeyQ, Modifiers::default(), KeyTarget::Body).is_empty());
    assert!(v.key_down(KeyCode::KeyQ, shift, KeyTarget::Input).is_empty());
}

#[test]
fn meta_content_carries_scale() {
    assert_eq!(viewer().viewport_meta_content(), "width=device-width, initial-scale=0.5");
}

#[test]
fn viewers_share_one_pack() {
    let pack = Arc::new(testkit::pack());
    let a = DashboardViewer::new(DashboardData::default(), Arc::clone(&pack));
    let b = DashboardViewer::new(DashboardData::default(), Arc::clone(&pack));
    assert!(Arc::ptr_eq(&a.pack, &b.pack));
    assert_eq!(Arc::strong_count(&pack), 3);
}
