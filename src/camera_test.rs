#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-10;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn logical_approx_eq(a: LogicalPoint, b: LogicalPoint) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn dom_approx_eq(a: DomPoint, b: DomPoint) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

// --- Camera defaults ---

#[test]
fn camera_default_is_identity() {
    let cam = Camera::default();
    assert_eq!(cam.pan_x, 0.0);
    assert_eq!(cam.pan_y, 0.0);
    assert_eq!(cam.zoom, 1.0);
}

// --- dom_to_logical ---

#[test]
fn dom_to_logical_identity() {
    let cam = Camera::default();
    let p = cam.dom_to_logical(DomPoint::new(50.0, 75.0));
    assert!(logical_approx_eq(p, LogicalPoint::new(50.0, 75.0)));
}

#[test]
fn dom_to_logical_with_zoom() {
    let cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 4.0 };
    let p = cam.dom_to_logical(DomPoint::new(40.0, 80.0));
    assert!(logical_approx_eq(p, LogicalPoint::new(10.0, 20.0)));
}

#[test]
fn dom_to_logical_with_pan_and_zoom() {
    let cam = Camera { pan_x: 50.0, pan_y: 30.0, zoom: 2.0 };
    let p = cam.dom_to_logical(DomPoint::new(0.0, 0.0));
    assert!(approx_eq(p.x, -25.0));
    assert!(approx_eq(p.y, -15.0));
}

// --- logical_to_dom ---

#[test]
fn logical_to_dom_with_pan_and_zoom() {
    let cam = Camera { pan_x: 20.0, pan_y: 10.0, zoom: 3.0 };
    let d = cam.logical_to_dom(LogicalPoint::new(5.0, 5.0));
    // 5*3 + 20 = 35, 5*3 + 10 = 25
    assert!(dom_approx_eq(d, DomPoint::new(35.0, 25.0)));
}

#[test]
fn round_trip_fractional_zoom() {
    let cam = Camera { pan_x: 13.7, pan_y: -42.3, zoom: 0.75 };
    let p = LogicalPoint::new(333.3, -999.9);
    let back = cam.dom_to_logical(cam.logical_to_dom(p));
    assert!(logical_approx_eq(p, back));
}

// --- dom_dist_to_logical ---

#[test]
fn dom_dist_scales_by_zoom() {
    let cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 2.0 };
    assert!(approx_eq(cam.dom_dist_to_logical(10.0), 5.0));
}

#[test]
fn dom_dist_ignores_pan() {
    let cam = Camera { pan_x: 999.0, pan_y: -999.0, zoom: 4.0 };
    assert!(approx_eq(cam.dom_dist_to_logical(8.0), 2.0));
}

// --- zoom_about / pan_by ---

#[test]
fn zoom_about_keeps_anchor_fixed() {
    let mut cam = Camera { pan_x: 10.0, pan_y: 20.0, zoom: 1.0 };
    let anchor = DomPoint::new(300.0, 200.0);
    let before = cam.dom_to_logical(anchor);
    cam.zoom_about(anchor, 2.5);
    assert!(approx_eq(cam.zoom, 2.5));
    assert!(logical_approx_eq(cam.dom_to_logical(anchor), before));
}

#[test]
fn zoom_about_clamps_to_limits() {
    let mut cam = Camera::default();
    cam.zoom_about(DomPoint::new(0.0, 0.0), 1000.0);
    assert_eq!(cam.zoom, MAX_ZOOM);
    cam.zoom_about(DomPoint::new(0.0, 0.0), 0.0001);
    assert_eq!(cam.zoom, MIN_ZOOM);
}

#[test]
fn sanitized_clamps_zoom_and_drops_non_finite() {
    let zero = Camera { pan_x: 10.0, pan_y: 20.0, zoom: 0.0 }.sanitized();
    assert_eq!(zero, Camera { pan_x: 10.0, pan_y: 20.0, zoom: MIN_ZOOM });
    assert_eq!(Camera { pan_x: 0.0, pan_y: 0.0, zoom: 1e9 }.sanitized().zoom, MAX_ZOOM);
    let broken = Camera { pan_x: f64::NAN, pan_y: f64::INFINITY, zoom: f64::NAN }.sanitized();
    assert_eq!(broken, Camera::default());
    let ok = Camera { pan_x: -3.0, pan_y: 4.0, zoom: 2.5 };
    assert_eq!(ok.sanitized(), ok);
}

#[test]
fn pan_by_accumulates() {
    let mut cam = Camera::default();
    cam.pan_by(5.0, -3.0);
    cam.pan_by(1.0, 1.0);
    assert_eq!(cam.pan_x, 6.0);
    assert_eq!(cam.pan_y, -2.0);
}

#[test]
fn logical_point_offset() {
    let p = LogicalPoint::new(1.0, 2.0).offset(3.0, -4.0);
    assert_eq!(p, LogicalPoint::new(4.0, -2.0));
}
