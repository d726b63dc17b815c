//! Tests for BoundingBox operations.

use dged_common::bbox::BoundingBox;

// ============================================================================
// Constructor tests
// ============================================================================

#[test]
fn test_bbox_new() {
    let bbox = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
    assert_eq!(bbox.min_x, -180.0);
    assert_eq!(bbox.min_y, -90.0);
    assert_eq!(bbox.max_x, 180.0);
    assert_eq!(bbox.max_y, 90.0);
}

#[test]
fn test_bbox_from_points() {
    let bbox = BoundingBox::from_points(&[(3.0, 1.0), (-2.0, 4.0), (0.0, -6.0)]).unwrap();
    assert_eq!(bbox, BoundingBox::new(-2.0, -6.0, 3.0, 4.0));
}

#[test]
fn test_bbox_from_points_empty() {
    assert!(BoundingBox::from_points(&[]).is_none());
}

#[test]
fn test_bbox_from_single_point_is_degenerate() {
    let bbox = BoundingBox::from_points(&[(5.0, 5.0)]).unwrap();
    assert!(bbox.is_degenerate());
}

// ============================================================================
// Dimension tests (width/height/center)
// ============================================================================

#[test]
fn test_bbox_width_height() {
    let bbox = BoundingBox::new(10.0, 5.0, 30.0, 25.0);
    assert_eq!(bbox.width(), 20.0);
    assert_eq!(bbox.height(), 20.0);
}

#[test]
fn test_bbox_width_crossing_zero() {
    let bbox = BoundingBox::new(-10.0, 0.0, 10.0, 10.0);
    assert_eq!(bbox.width(), 20.0);
}

#[test]
fn test_bbox_center() {
    let bbox = BoundingBox::new(700000.0, 6100000.0, 720000.0, 6140000.0);
    assert_eq!(bbox.center(), (710000.0, 6120000.0));
}

#[test]
fn test_bbox_inverted_is_degenerate() {
    // Constructor doesn't validate
    let bbox = BoundingBox::new(10.0, 10.0, 0.0, 0.0);
    assert_eq!(bbox.width(), -10.0);
    assert!(bbox.is_degenerate());
}

// ============================================================================
// Containment
// ============================================================================

#[test]
fn test_bbox_contains_point_on_edge() {
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    assert!(bbox.contains_point(0.0, 5.0));
    assert!(bbox.contains_point(10.0, 5.0));
    assert!(bbox.contains_point(5.0, 0.0));
    assert!(bbox.contains_point(5.0, 10.0));
    assert!(!bbox.contains_point(-0.001, 5.0));
}

#[test]
fn test_bbox_contains_box() {
    let outer = BoundingBox::new(-180.0, -90.0, 360.0, 90.0);
    assert!(outer.contains(&BoundingBox::new(-180.0, -90.0, 360.0, 90.0)));
    assert!(outer.contains(&BoundingBox::new(11.0, 55.0, 12.5, 56.0)));
    assert!(!outer.contains(&BoundingBox::new(690000.0, 6100000.0, 700000.0, 6110000.0)));
    assert!(!outer.contains(&BoundingBox::new(170.0, 80.0, 175.0, 90.5)));
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_bbox_serializes_with_named_fields() {
    let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
    let json = serde_json::to_value(bbox).unwrap();
    assert_eq!(json["min_x"], 1.0);
    assert_eq!(json["max_y"], 4.0);
}
