#![allow(clippy::float_cmp)]

use super::*;

// --- Coords ---

#[test]
fn coords_new_and_offset() {
    let p = Coords::new(3.0, 4.0).offset_by(1.0, -2.0);
    assert_eq!(p, Coords::new(4.0, 2.0));
}

#[test]
fn coords_delta() {
    let d = Coords::new(10.0, 5.0).delta(Coords::new(4.0, 8.0));
    assert_eq!(d, Coords::new(6.0, -3.0));
}

#[test]
fn coords_serde_shape() {
    let json = serde_json::to_value(Coords::new(1.0, 2.0)).unwrap();
    assert_eq!(json, serde_json::json!({"x": 1.0, "y": 2.0}));
}

#[test]
fn coords_deserialize_integers() {
    let p: Coords = serde_json::from_str(r#"{"x": 900, "y": 600}"#).unwrap();
    assert_eq!(p, Coords::new(900.0, 600.0));
}

// --- Rect ---

#[test]
fn rect_from_corners_normalizes() {
    let r = Rect::from_corners(Coords::new(50.0, 10.0), Coords::new(20.0, 40.0));
    assert_eq!(r.left, 20.0);
    assert_eq!(r.top, 10.0);
    assert_eq!(r.right, 50.0);
    assert_eq!(r.bottom, 40.0);
    assert_eq!(r.width, 30.0);
    assert_eq!(r.height, 30.0);
}

#[test]
fn rect_map_translates() {
    let r = Rect::from_corners(Coords::new(0.0, 0.0), Coords::new(10.0, 10.0)).map(|p| p.offset_by(5.0, 7.0));
    assert_eq!(r.left, 5.0);
    assert_eq!(r.top, 7.0);
    assert_eq!(r.right, 15.0);
    assert_eq!(r.bottom, 17.0);
}

#[test]
fn rect_contains_anchor_requires_slop() {
    let r = Rect::from_corners(Coords::new(0.0, 0.0), Coords::new(100.0, 100.0));
    assert!(r.contains_anchor(Coords::new(0.0, 0.0), 5.0));
    assert!(r.contains_anchor(Coords::new(95.0, 95.0), 5.0));
    assert!(!r.contains_anchor(Coords::new(96.0, 50.0), 5.0));
    assert!(!r.contains_anchor(Coords::new(-1.0, 50.0), 5.0));
}

// --- Grid ---

#[test]
fn snap_rounds_to_nearest() {
    assert_eq!(snap(29.0, 20), 20.0);
    assert_eq!(snap(30.0, 20), 40.0);
    assert_eq!(snap(31.0, 20), 40.0);
    assert_eq!(snap(-9.0, 20), 0.0);
}

#[test]
fn snap_grid_one_rounds_fraction() {
    assert_eq!(snap(12.4, 1), 12.0);
}

#[test]
fn snap_zero_grid_is_identity() {
    assert_eq!(snap(12.4, 0), 12.4);
    assert_eq!(floor_to_grid(12.4, 0), 12.4);
}

#[test]
fn floor_to_grid_rounds_down() {
    assert_eq!(floor_to_grid(39.0, 20), 20.0);
    assert_eq!(floor_to_grid(40.0, 20), 40.0);
}

// --- Viewport clipping ---

#[test]
fn clip_pulls_far_edge_inside() {
    let p = clip_to_viewport(Coords::new(880.0, 590.0), Coords::new(100.0, 50.0), Coords::new(900.0, 600.0));
    assert_eq!(p, Coords::new(800.0, 550.0));
}

#[test]
fn clip_clamps_negative() {
    let p = clip_to_viewport(Coords::new(-10.0, -3.0), Coords::new(10.0, 10.0), Coords::new(900.0, 600.0));
    assert_eq!(p, Coords::new(0.0, 0.0));
}

#[test]
fn clip_oversized_element_lands_at_origin() {
    let p = clip_to_viewport(Coords::new(50.0, 50.0), Coords::new(1000.0, 700.0), Coords::new(900.0, 600.0));
    assert_eq!(p, Coords::new(0.0, 0.0));
}
