//! Viewport controller tests
//!
//! Tests for the zoom-to-scale mapping, the root anchoring pan offset and
//! the Loading -> Ready transition.

use fluxgraph::graph::{
    Direction, LayoutOptions, LayoutResult, NodeSize, ViewportController, ViewportPhase,
    ViewportSettings, build, layout,
};
use fluxgraph::models::{ReconciledObject, RootDescriptor};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn layout_with_children(count: usize, direction: Direction) -> LayoutResult {
    let objects: Vec<ReconciledObject> = (0..count)
        .map(|i| ReconciledObject {
            id: format!("child-{}", i),
            name: format!("child-{}", i),
            ..Default::default()
        })
        .collect();
    let graph = build(&objects, &RootDescriptor::new("apps", "flux-system", "Kustomization"));
    let options = LayoutOptions {
        direction,
        ..Default::default()
    };
    layout(&graph, &options).unwrap()
}

#[test]
fn test_scale_is_strictly_increasing() {
    let controller = ViewportController::new(ViewportSettings::default());
    for zoom in 0..100 {
        assert!(
            controller.scale_for(zoom) < controller.scale_for(zoom + 1),
            "scale not increasing at {}",
            zoom
        );
    }
}

#[test]
fn test_scale_formula_and_clamping() {
    let controller = ViewportController::new(ViewportSettings::default());
    assert!(approx(controller.scale_for(0), 0.2));
    assert!(approx(controller.scale_for(80), 1.0));
    assert_eq!(controller.scale_for(250), controller.scale_for(100));

    let custom = ViewportController::new(ViewportSettings {
        min_zoom: 10,
        max_zoom: 50,
        scale_offset: 0.0,
        scale_divisor: 50.0,
        ..Default::default()
    });
    assert_eq!(custom.clamp_zoom(0), 10);
    assert!(approx(custom.scale_for(50), 1.0));
}

#[test]
fn test_pan_offset_anchors_root() {
    let controller = ViewportController::new(ViewportSettings::default());
    let result = layout_with_children(1, Direction::LeftToRight);

    // root center x = 325, width 650
    assert!(approx(controller.pan_offset_for(&result, 0), -65.0));
    assert!(approx(controller.pan_offset_for(&result, 50), -1227.5));
}

#[test]
fn test_pan_offset_follows_root_position() {
    let controller = ViewportController::new(ViewportSettings::default());
    let narrow = layout_with_children(1, Direction::TopToBottom);
    let wide = layout_with_children(3, Direction::TopToBottom);

    assert!(approx(controller.pan_offset_for(&narrow, 0), -65.0));
    // root x = 1025 once it is centered over three children
    assert!(approx(controller.pan_offset_for(&wide, 0), 75.0));
}

#[test]
fn test_center_once() {
    let mut controller = ViewportController::new(ViewportSettings::default());
    let first = layout_with_children(1, Direction::TopToBottom);
    let wider = layout_with_children(3, Direction::TopToBottom);

    assert_eq!(controller.phase(), ViewportPhase::Loading);
    assert!(controller.center_once(&first));
    assert_eq!(controller.phase(), ViewportPhase::Ready);
    let pan = controller.state().pan_offset_x;

    assert!(!controller.center_once(&wider));
    assert_eq!(controller.state().pan_offset_x, pan);
}

#[test]
fn test_centering_at_offset_zero_is_not_repeated() {
    // Two 100-wide children with no gap put the root center at x == width
    let objects: Vec<ReconciledObject> = ["a", "b"]
        .iter()
        .map(|id| ReconciledObject {
            id: id.to_string(),
            name: id.to_string(),
            ..Default::default()
        })
        .collect();
    let graph = build(&objects, &RootDescriptor::new("apps", "flux-system", "Kustomization"));
    let options = LayoutOptions {
        direction: Direction::TopToBottom,
        node_size: NodeSize {
            width: 100.0,
            height: 40.0,
        },
        node_separation: 0.0,
        ..Default::default()
    };
    let result = layout(&graph, &options).unwrap();
    assert_eq!(result.root().map(|r| r.x), Some(100.0));

    let mut controller = ViewportController::new(ViewportSettings::default());
    assert!(controller.center_once(&result));
    assert_eq!(controller.state().pan_offset_x, 0.0);

    assert!(!controller.center_once(&layout_with_children(3, Direction::TopToBottom)));
    assert_eq!(controller.state().pan_offset_x, 0.0);
    assert_eq!(controller.phase(), ViewportPhase::Ready);
}

#[test]
fn test_zoom_change_recenters_with_current_layout() {
    let mut controller = ViewportController::new(ViewportSettings::default());
    let result = layout_with_children(1, Direction::LeftToRight);
    controller.center_once(&result);

    let state = controller.on_zoom_change(50, Some(&result));
    assert_eq!(state.zoom_percent, 50);
    assert!(approx(state.scale_ratio, 0.7));
    assert!(approx(state.pan_offset_x, -1227.5));
    assert!(state.initialized);

    let transform = controller.transform();
    assert!(approx(transform.translate_x, 1227.5));
    assert!(approx(transform.scale, 0.7));
}

#[test]
fn test_zoom_change_is_clamped() {
    let mut controller = ViewportController::new(ViewportSettings::default());
    let state = controller.on_zoom_change(400, None);
    assert_eq!(state.zoom_percent, 100);
    assert!(approx(state.scale_ratio, 1.2));
}

#[test]
fn test_reset_returns_to_loading() {
    let mut controller = ViewportController::new(ViewportSettings {
        default_zoom: 10,
        ..Default::default()
    });
    let result = layout_with_children(2, Direction::LeftToRight);
    controller.center_once(&result);
    controller.on_zoom_change(70, Some(&result));

    controller.reset();
    let state = controller.state();
    assert_eq!(controller.phase(), ViewportPhase::Loading);
    assert_eq!(state.zoom_percent, 10);
    assert_eq!(state.pan_offset_x, 0.0);
    assert!(approx(state.scale_ratio, 0.3));
}
