#![allow(clippy::float_cmp)]

use super::*;
use crate::surface::{DrawCommand, RecordingSurface};

fn labels() -> Vec<String> {
    vec!["person".to_owned(), "car".to_owned()]
}

fn styler<'a>(options: &'a StyleOptions, labels: &'a [String]) -> BoxStyler<'a> {
    BoxStyler { options, labels, selected: None, zoom: 1.0 }
}

fn count<F: Fn(&DrawCommand) -> bool>(cmds: &[DrawCommand], f: F) -> usize {
    cmds.iter().filter(|&c| f(c)).count()
}

// =============================================================
// Colours and styles
// =============================================================

#[test]
fn color_prefers_override_then_palette_then_default() {
    let mut options = StyleOptions::default();
    options.label_colors.insert("car".to_owned(), "#123456".to_owned());
    let labels = labels();
    let st = styler(&options, &labels);
    assert_eq!(st.color_for("car"), "#123456");
    assert_eq!(st.color_for("person"), DEFAULT_PALETTE[0]);
    assert_eq!(st.color_for("zebra"), "#00FF00");
}

#[test]
fn palette_wraps_around() {
    let options = StyleOptions::default();
    let labels: Vec<String> = (0..12).map(|i| format!("c{i}")).collect();
    let st = styler(&options, &labels);
    assert_eq!(st.color_for("c11"), DEFAULT_PALETTE[1]);
}

#[test]
fn line_width_is_constant_on_screen() {
    let options = StyleOptions::default();
    let labels = labels();
    let st = BoxStyler { zoom: 4.0, ..styler(&options, &labels) };
    let b = AnnotationBox::from_xywh(0.0, 0.0, 10.0, 10.0, "car");
    assert_eq!(st.style_for(&b).line_width, 0.5);
}

#[test]
fn selected_box_gets_selected_style() {
    let options = StyleOptions { opacity: 0.4, ..StyleOptions::default() };
    let labels = labels();
    let b = AnnotationBox::from_xywh(0.0, 0.0, 10.0, 10.0, "car");
    let st = BoxStyler { selected: Some(b.id), ..styler(&options, &labels) };
    let style = st.style_for(&b);
    assert_eq!(style.color, "#1E90FF");
    assert_eq!(style.line_width, 3.0);
    assert_eq!(style.opacity, 1.0);
}

#[test]
fn style_options_deserialize_with_defaults() {
    let options: StyleOptions = serde_json::from_str(r##"{ "line_width": 5, "label_colors": { "car": "#ABCDEF" } }"##).unwrap();
    assert_eq!(options.line_width, 5.0);
    assert_eq!(options.label_colors["car"], "#ABCDEF");
    assert!(options.show_labels);
    assert_eq!(options.opacity, 1.0);
}

// =============================================================
// Grouping
// =============================================================

#[test]
fn groups_keep_first_appearance_order() {
    let options = StyleOptions::default();
    let labels = labels();
    let a = AnnotationBox::from_xywh(0.0, 0.0, 10.0, 10.0, "car");
    let b = AnnotationBox::from_xywh(20.0, 0.0, 10.0, 10.0, "person");
    let c = AnnotationBox::from_xywh(40.0, 0.0, 10.0, 10.0, "car");
    let groups = group_by_style(&[&a, &b, &c], &styler(&options, &labels));
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].0.color, DEFAULT_PALETTE[1]);
    let first: Vec<_> = groups[0].1.iter().map(|b| b.id).collect();
    assert_eq!(first, vec![a.id, c.id]);
    assert_eq!(groups[1].1[0].id, b.id);
}

// =============================================================
// batch_draw_boxes
// =============================================================

#[test]
fn draws_every_box_once() {
    let options = StyleOptions::default();
    let labels = labels();
    let boxes: Vec<_> = (0..9)
        .map(|i| AnnotationBox::from_xywh(f64::from(i) * 20.0, 0.0, 10.0, 10.0, if i % 3 == 0 { "car" } else { "person" }))
        .collect();
    let refs: Vec<_> = boxes.iter().collect();
    let mut s = RecordingSurface::new("s", 200, 200);
    let stats = batch_draw_boxes(&mut s, &refs, &styler(&options, &labels)).unwrap();
    let cmds = s.commands();
    assert_eq!(stats.boxes, 9);
    assert_eq!(stats.groups, 2);
    assert_eq!(count(&cmds, |c| matches!(c, DrawCommand::StrokeRect { .. })), 9);
    assert_eq!(count(&cmds, |c| matches!(c, DrawCommand::FillText { .. })), 9);
}

#[test]
fn style_assigned_once_per_group() {
    let options = StyleOptions::default();
    let labels = labels();
    let boxes: Vec<_> = (0..100)
        .map(|i| AnnotationBox::from_xywh(f64::from(i), 0.0, 10.0, 10.0, if i % 2 == 0 { "car" } else { "person" }))
        .collect();
    let refs: Vec<_> = boxes.iter().collect();
    let mut s = RecordingSurface::new("s", 200, 200);
    let stats = batch_draw_boxes(&mut s, &refs, &styler(&options, &labels)).unwrap();
    let cmds = s.commands();
    assert_eq!(count(&cmds, |c| matches!(c, DrawCommand::StrokeStyle(_))), 2);
    // Width and alpha are shared by both groups, so they are set once.
    assert_eq!(count(&cmds, |c| matches!(c, DrawCommand::LineWidth(_))), 1);
    assert_eq!(count(&cmds, |c| matches!(c, DrawCommand::GlobalAlpha(_))), 1);
    // font + (stroke, width, alpha, fill) + (stroke, fill)
    assert_eq!(stats.state_changes, 7);
}

#[test]
fn hidden_labels_skip_text_and_font() {
    let options = StyleOptions { show_labels: false, ..StyleOptions::default() };
    let labels = labels();
    let b = AnnotationBox::from_xywh(0.0, 0.0, 10.0, 10.0, "car");
    let mut s = RecordingSurface::new("s", 100, 100);
    let stats = batch_draw_boxes(&mut s, &[&b], &styler(&options, &labels)).unwrap();
    let cmds = s.commands();
    assert_eq!(count(&cmds, |c| matches!(c, DrawCommand::FillText { .. } | DrawCommand::Font(_))), 0);
    assert_eq!(stats.state_changes, 3);
}

#[test]
fn caption_sits_above_box() {
    let options = StyleOptions::default();
    let labels = labels();
    let b = AnnotationBox::from_xywh(10.0, 20.0, 30.0, 40.0, "person");
    let st = BoxStyler { zoom: 2.0, ..styler(&options, &labels) };
    let mut s = RecordingSurface::new("s", 100, 100);
    batch_draw_boxes(&mut s, &[&b], &st).unwrap();
    let cmds = s.commands();
    assert!(cmds.contains(&DrawCommand::FillText { text: "person".to_owned(), x: 10.0, y: 18.0 }));
    assert!(cmds.contains(&DrawCommand::Font("6px sans-serif".to_owned())));
}

#[test]
fn empty_input_draws_nothing() {
    let options = StyleOptions::default();
    let labels = labels();
    let mut s = RecordingSurface::new("s", 100, 100);
    let stats = batch_draw_boxes(&mut s, &[], &styler(&options, &labels)).unwrap();
    assert_eq!(stats, BatchStats::default());
    assert!(s.commands().is_empty());
}
