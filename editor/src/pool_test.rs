#![allow(clippy::float_cmp)]

use serde_json::json;
use uuid::Uuid;

use super::*;
use crate::testkit;

fn pool_with(kinds: &[&str]) -> (ElementPool, Vec<ElementId>) {
    let pack = testkit::pack();
    let mut pool = ElementPool::new();
    let ids = kinds
        .iter()
        .map(|k| pool.add(&pack, k, Coords::new(0.0, 0.0)).unwrap())
        .collect();
    (pool, ids)
}

// =============================================================
// add / delete / clear
// =============================================================

#[test]
fn add_copies_class_defaults() {
    let pack = testkit::pack();
    let mut pool = ElementPool::new();
    let id = pool.add(&pack, "gauge", Coords::new(10.0, 20.0)).unwrap();
    let el = pool.get(&id).unwrap();
    assert_eq!(el.kind, "gauge");
    assert_eq!(el.params, json!({"oid": "", "max": 100, "formula": "x"}));
    assert_eq!(el.position, Coords::new(10.0, 20.0));
    assert_eq!(el.zindex, 0);
}

#[test]
fn add_defaults_are_deep_copies() {
    let pack = testkit::pack();
    let mut pool = ElementPool::new();
    let a = pool.add(&pack, "label", Coords::default()).unwrap();
    let b = pool.add(&pack, "label", Coords::default()).unwrap();
    pool.get_mut(&a).unwrap().set_param("text", Some(json!("changed")));
    assert_eq!(pool.get(&b).unwrap().params["text"], "label");
    assert_eq!(pack.class("label").unwrap().defaults["text"], "label");
}

#[test]
fn add_unknown_kind_fails() {
    let pack = testkit::pack();
    let mut pool = ElementPool::new();
    let err = pool.add(&pack, "hexagon", Coords::default()).unwrap_err();
    assert_eq!(err, PoolError::UnknownKind("hexagon".into()));
    assert!(pool.is_empty());
}

#[test]
fn delete_removes_element_and_selection() {
    let (mut pool, ids) = pool_with(&["label", "gauge"]);
    pool.select(ids[0]);
    let removed = pool.delete(&ids[0]).unwrap();
    assert_eq!(removed.id, ids[0]);
    assert_eq!(pool.len(), 1);
    assert!(!pool.selection_active());
}

#[test]
fn delete_unknown_id_is_noop() {
    let (mut pool, _) = pool_with(&["label"]);
    assert!(pool.delete(&Uuid::new_v4()).is_none());
    assert_eq!(pool.len(), 1);
}

#[test]
fn clear_resets_everything() {
    let (mut pool, ids) = pool_with(&["label", "gauge"]);
    pool.select(ids[1]);
    pool.set_dragged(true);
    pool.clear();
    assert!(pool.is_empty());
    assert!(!pool.selection_active());
    assert!(!pool.elements_dragged());
}

// =============================================================
// Selection
// =============================================================

#[test]
fn select_adds_in_order_without_duplicates() {
    let (mut pool, ids) = pool_with(&["label", "gauge", "button"]);
    pool.select(ids[2]);
    pool.select(ids[0]);
    pool.select(ids[2]);
    assert_eq!(pool.selected_ids(), &[ids[2], ids[0]]);
}

#[test]
fn select_ignores_unknown_ids() {
    let (mut pool, _) = pool_with(&["label"]);
    pool.select(Uuid::new_v4());
    assert!(!pool.selection_active());
}

#[test]
fn set_selected_replaces_selection() {
    let (mut pool, ids) = pool_with(&["label", "gauge"]);
    pool.select(ids[0]);
    pool.set_selected(ids[1]);
    assert_eq!(pool.selected_ids(), &[ids[1]]);
}

#[test]
fn toggle_selected_flips_membership() {
    let (mut pool, ids) = pool_with(&["label", "gauge"]);
    pool.toggle_selected(ids[0]);
    pool.toggle_selected(ids[1]);
    assert!(pool.is_selected(&ids[0]));
    pool.toggle_selected(ids[0]);
    assert!(!pool.is_selected(&ids[0]));
    assert_eq!(pool.selected_ids(), &[ids[1]]);
}

#[test]
fn selected_indices_follow_array_positions() {
    let (mut pool, ids) = pool_with(&["label", "gauge", "button"]);
    pool.set_selection([ids[2], ids[0]]);
    assert_eq!(pool.selected_indices(), vec![2, 0]);
}

#[test]
fn top_selected_prefers_highest_zindex() {
    let (mut pool, ids) = pool_with(&["label", "gauge", "button"]);
    pool.get_mut(&ids[0]).unwrap().zindex = 5;
    pool.get_mut(&ids[1]).unwrap().zindex = 2;
    pool.set_selection([ids[0], ids[1]]);
    assert_eq!(pool.top_selected_element().unwrap().id, ids[0]);
}

#[test]
fn top_selected_tie_goes_to_latest_selected() {
    let (mut pool, ids) = pool_with(&["label", "gauge"]);
    pool.set_selection([ids[1], ids[0]]);
    assert_eq!(pool.top_selected_element().unwrap().id, ids[0]);
}

#[test]
fn top_selected_none_when_empty() {
    let (pool, _) = pool_with(&["label"]);
    assert!(pool.top_selected_element().is_none());
}

// =============================================================
// Variables and subscriptions
// =============================================================

#[test]
fn set_variables_bumps_map_id() {
    let mut pool = ElementPool::new();
    let before = pool.variables_map_id();
    pool.set_variable("room", "r1");
    assert!(pool.variables_map_id() > before);
    let mid = pool.variables_map_id();
    pool.set_variables(Variables::new());
    assert!(pool.variables_map_id() > mid);
    assert!(pool.variables().is_empty());
}

#[test]
fn oids_only_from_subscribed_properties() {
    let pack = testkit::pack();
    let (mut pool, ids) = pool_with(&["gauge", "button", "label"]);
    pool.get_mut(&ids[0]).unwrap().set_param("oid", Some(json!("sensor:plant/temp")));
    pool.get_mut(&ids[2]).unwrap().set_param("text", Some(json!("sensor:not/an/oid")));
    // button.oid is a plain `oid` property and must not be subscribed.
    assert_eq!(pool.oids_to_subscribe(&pack), vec!["sensor:plant/temp".to_owned()]);
}

#[test]
fn oids_deduplicated_sorted_and_skip_empty() {
    let pack = testkit::pack();
    let (mut pool, ids) = pool_with(&["gauge", "gauge", "gauge", "gauge"]);
    pool.get_mut(&ids[0]).unwrap().set_param("oid", Some(json!("sensor:b")));
    pool.get_mut(&ids[1]).unwrap().set_param("oid", Some(json!("sensor:a")));
    pool.get_mut(&ids[2]).unwrap().set_param("oid", Some(json!("sensor:b")));
    assert_eq!(pool.oids_to_subscribe(&pack), vec!["sensor:a".to_owned(), "sensor:b".to_owned()]);
}

#[test]
fn oids_apply_variables() {
    let pack = testkit::pack();
    let (mut pool, ids) = pool_with(&["gauge"]);
    pool.get_mut(&ids[0]).unwrap().set_param("oid", Some(json!("sensor:${room}/temp")));
    assert_eq!(pool.oids_to_subscribe(&pack), vec!["sensor:${room}/temp".to_owned()]);
    pool.set_variable("room", "r2");
    assert_eq!(pool.oids_to_subscribe(&pack), vec!["sensor:r2/temp".to_owned()]);
}

#[test]
fn oids_skip_unknown_classes() {
    let pack = testkit::pack();
    let mut pool = ElementPool::new();
    pool.import(vec![DElementData {
        kind: "ghost".into(),
        params: json!({"oid": "sensor:x"}),
        position: Coords::default(),
        zindex: 0,
    }]);
    assert!(pool.oids_to_subscribe(&pack).is_empty());
}

#[test]
fn resolved_params_substitute_variables() {
    let (mut pool, ids) = pool_with(&["label"]);
    pool.get_mut(&ids[0]).unwrap().set_param("text", Some(json!("Room ${room}")));
    pool.set_variable("room", "7");
    assert_eq!(pool.resolved_params(&ids[0]).unwrap()["text"], "Room 7");
    assert_eq!(pool.get(&ids[0]).unwrap().params["text"], "Room ${room}");
}

// =============================================================
// Import / export / display order
// =============================================================

#[test]
fn export_import_preserves_data_with_fresh_ids() {
    let (mut pool, ids) = pool_with(&["label", "gauge"]);
    pool.get_mut(&ids[1]).unwrap().zindex = 4;
    pool.select(ids[0]);
    pool.set_dragged(true);
    let exported = pool.export();
    pool.import(exported.clone());
    assert_eq!(pool.export(), exported);
    assert!(pool.get(&ids[0]).is_none());
    assert!(!pool.selection_active());
    assert!(!pool.elements_dragged());
}

#[test]
fn display_order_sorts_by_zindex_stably() {
    let (mut pool, ids) = pool_with(&["label", "gauge", "button"]);
    pool.get_mut(&ids[0]).unwrap().zindex = 2;
    let order: Vec<ElementId> = pool.display_order().iter().map(|el| el.id).collect();
    assert_eq!(order, vec![ids[1], ids[2], ids[0]]);
}
