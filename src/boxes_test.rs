#![allow(clippy::float_cmp)]

use super::*;

fn make_box(x: f64, y: f64, w: f64, h: f64) -> AnnotationBox {
    AnnotationBox::from_xywh(x, y, w, h, "car")
}

// =============================================================
// AnnotationBox
// =============================================================

#[test]
fn new_boxes_get_distinct_ids() {
    let a = make_box(0.0, 0.0, 10.0, 10.0);
    let b = make_box(0.0, 0.0, 10.0, 10.0);
    assert_ne!(a.id, b.id);
}

#[test]
fn rect_of_inverted_box_is_positive() {
    let b = AnnotationBox::new(LogicalPoint::new(110.0, 60.0), LogicalPoint::new(10.0, 10.0), "car");
    let r = b.rect();
    assert_eq!((r.x, r.y, r.width, r.height), (10.0, 10.0, 100.0, 50.0));
}

#[test]
fn box_serializes_with_corners() {
    let b = make_box(1.0, 2.0, 3.0, 4.0);
    let json = serde_json::to_value(&b).unwrap();
    assert_eq!(json["start"]["x"], 1.0);
    assert_eq!(json["end"]["y"], 6.0);
    assert_eq!(json["label"], "car");
}

// =============================================================
// BoxPatch
// =============================================================

#[test]
fn empty_patch_is_empty() {
    assert!(BoxPatch::default().is_empty());
    assert!(!BoxPatch::label("dog").is_empty());
}

#[test]
fn patch_skips_absent_fields_when_serialized() {
    let json = serde_json::to_value(BoxPatch::label("dog")).unwrap();
    assert_eq!(json, serde_json::json!({ "label": "dog" }));
}

// =============================================================
// BoxStore
// =============================================================

#[test]
fn store_preserves_insertion_order() {
    let mut store = BoxStore::new();
    let a = make_box(0.0, 0.0, 10.0, 10.0);
    let b = make_box(5.0, 5.0, 10.0, 10.0);
    let (ida, idb) = (a.id, b.id);
    store.insert(a);
    store.insert(b);
    let ids: Vec<_> = store.as_slice().iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![ida, idb]);
    let top: Vec<_> = store.iter_topmost().map(|b| b.id).collect();
    assert_eq!(top, vec![idb, ida]);
}

#[test]
fn insert_same_id_replaces_in_place() {
    let mut store = BoxStore::new();
    let a = make_box(0.0, 0.0, 10.0, 10.0);
    let b = make_box(50.0, 50.0, 10.0, 10.0);
    let mut a2 = a.clone();
    a2.label = "bus".to_owned();
    store.insert(a.clone());
    store.insert(b);
    store.insert(a2);
    assert_eq!(store.len(), 2);
    assert_eq!(store.as_slice()[0].label, "bus");
}

#[test]
fn remove_returns_box() {
    let mut store = BoxStore::new();
    let a = make_box(0.0, 0.0, 10.0, 10.0);
    let id = a.id;
    store.insert(a);
    assert!(store.remove(&id).is_some());
    assert!(store.remove(&id).is_none());
    assert!(store.is_empty());
}

#[test]
fn apply_patch_updates_only_present_fields() {
    let mut store = BoxStore::new();
    let a = make_box(0.0, 0.0, 10.0, 10.0);
    let id = a.id;
    store.insert(a);
    let patch = BoxPatch { end: Some(LogicalPoint::new(40.0, 30.0)), ..Default::default() };
    assert!(store.apply_patch(&id, &patch));
    let b = store.get(&id).unwrap();
    assert_eq!(b.start, LogicalPoint::new(0.0, 0.0));
    assert_eq!(b.end, LogicalPoint::new(40.0, 30.0));
    assert_eq!(b.label, "car");
}

#[test]
fn apply_patch_missing_box_returns_false() {
    let mut store = BoxStore::new();
    assert!(!store.apply_patch(&Uuid::new_v4(), &BoxPatch::label("x")));
}

#[test]
fn load_and_clear() {
    let mut store = BoxStore::new();
    store.load(vec![make_box(0.0, 0.0, 1.0, 1.0), make_box(2.0, 2.0, 1.0, 1.0)]);
    assert_eq!(store.len(), 2);
    store.clear();
    assert!(store.is_empty());
}
