//! Graph session tests
//!
//! Tests for the session state machine, ordered event handling, the poller
//! and the drive loop that feeds a render adapter.

use anyhow::anyhow;
use fluxgraph::graph::{
    Direction, DrawCommand, GraphSession, JsonRenderAdapter, LayoutOptions, NodeSize, PlainLabel,
    RenderAdapter, SessionEvent, UpdateOutcome, ViewportPhase, ViewportSettings,
};
use fluxgraph::models::{ReconciledObject, RootDescriptor, Snapshot};
use fluxgraph::watcher::{self, FileSource, ObjectSource, Poller};
use mockall::mock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

mock! {
    pub Adapter {}

    impl RenderAdapter for Adapter {
        fn draw(&mut self, command: &DrawCommand) -> anyhow::Result<()>;
        fn show_loading(&mut self) -> anyhow::Result<()>;
    }
}

mock! {
    pub Source {}

    #[async_trait::async_trait]
    impl ObjectSource for Source {
        async fn fetch(&self) -> anyhow::Result<Snapshot>;
        fn describe(&self) -> String;
    }
}

fn snapshot(ids: &[&str]) -> Snapshot {
    let mut root = RootDescriptor::new("apps", "flux-system", "Kustomization");
    root.status = Some("Current".to_string());
    Snapshot::new(
        root,
        ids.iter()
            .map(|id| ReconciledObject {
                id: id.to_string(),
                name: id.to_string(),
                namespace: "apps".to_string(),
                kind: "Deployment".to_string(),
                status: "Current".to_string(),
                ..Default::default()
            })
            .collect(),
    )
}

fn session() -> GraphSession {
    GraphSession::new(
        LayoutOptions {
            direction: Direction::TopToBottom,
            ..Default::default()
        },
        ViewportSettings::default(),
    )
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_centering_happens_once_across_polls() {
    let mut session = session();
    let tick = snapshot(&["a", "b"]);

    assert_eq!(session.apply_snapshot(&tick), UpdateOutcome::Centered);
    let pan = session.viewport_state().pan_offset_x;
    let layout = session.layout().cloned();

    for _ in 0..5 {
        assert_eq!(session.apply_snapshot(&tick), UpdateOutcome::Refreshed);
        assert_eq!(session.viewport_state().pan_offset_x, pan);
        assert!(session.viewport_state().initialized);
        assert_eq!(session.layout().cloned(), layout);
    }
}

#[test]
fn test_empty_snapshot_stays_loading() {
    let mut session = session();

    assert_eq!(session.apply_snapshot(&snapshot(&[])), UpdateOutcome::StillLoading);
    assert_eq!(session.phase(), ViewportPhase::Loading);
    assert!(session.show_loading());
    assert!(session.draw_command(&PlainLabel).is_none());

    let graph = session.graph().unwrap();
    assert_eq!(graph.nodes.len(), 1);
    assert!(graph.edges.is_empty());

    let mut adapter = MockAdapter::new();
    adapter.expect_show_loading().times(1).returning(|| Ok(()));
    adapter.expect_draw().never();
    session.render(&mut adapter, &PlainLabel).unwrap();

    assert_eq!(session.apply_snapshot(&snapshot(&["a"])), UpdateOutcome::Centered);
    assert!(!session.show_loading());
}

#[test]
fn test_empty_snapshot_after_ready_draws_root_only() {
    let mut session = session();
    session.apply_snapshot(&snapshot(&["a"]));

    assert_eq!(session.apply_snapshot(&snapshot(&[])), UpdateOutcome::Refreshed);
    assert_eq!(session.phase(), ViewportPhase::Ready);
    let command = session.draw_command(&PlainLabel).unwrap();
    assert_eq!(command.nodes.len(), 1);
    assert!(command.edges.is_empty());
}

#[test]
fn test_topology_change_keeps_pan_until_zoom() {
    let mut session = session();
    session.apply_snapshot(&snapshot(&["a"]));
    assert!(approx(session.viewport_state().pan_offset_x, -65.0));

    assert_eq!(
        session.apply_snapshot(&snapshot(&["a", "b", "c"])),
        UpdateOutcome::Refreshed
    );
    assert!(approx(session.viewport_state().pan_offset_x, -65.0));

    // The next zoom change re-centers against the wider layout
    assert_eq!(session.on_zoom_change(0), UpdateOutcome::Zoomed);
    assert!(approx(session.viewport_state().pan_offset_x, 75.0));
}

#[test]
fn test_zoom_does_not_rebuild_graph() {
    let mut session = session();
    session.apply_snapshot(&snapshot(&["a", "b"]));
    let graph = session.graph().cloned();
    let layout = session.layout().cloned();

    assert_eq!(session.handle(SessionEvent::Zoom(60)), UpdateOutcome::Zoomed);

    assert_eq!(session.graph().cloned(), graph);
    assert_eq!(session.layout().cloned(), layout);
    let state = session.viewport_state();
    assert_eq!(state.zoom_percent, 60);
    assert!(approx(state.scale_ratio, 0.8));
}

#[test]
fn test_zoom_while_loading_does_not_center() {
    let mut session = session();

    assert_eq!(session.on_zoom_change(30), UpdateOutcome::Zoomed);
    assert_eq!(session.phase(), ViewportPhase::Loading);
    assert_eq!(session.viewport_state().zoom_percent, 30);

    // Centering uses the zoom chosen while loading
    assert_eq!(session.apply_snapshot(&snapshot(&["a"])), UpdateOutcome::Centered);
    assert!(approx(session.viewport_state().pan_offset_x, -600.0 - 325.0 * 0.5));
}

#[test]
fn test_teardown_resets_and_ignores_later_events() {
    let mut session = session();
    session.apply_snapshot(&snapshot(&["a"]));
    session.on_zoom_change(40);

    assert_eq!(session.handle(SessionEvent::Teardown), UpdateOutcome::TornDown);
    assert!(session.is_torn_down());
    assert!(session.graph().is_none());
    assert!(session.layout().is_none());
    assert_eq!(session.phase(), ViewportPhase::Loading);
    assert_eq!(session.viewport_state().zoom_percent, 0);

    assert_eq!(
        session.handle(SessionEvent::Data(snapshot(&["a"]))),
        UpdateOutcome::Ignored
    );
    assert_eq!(session.handle(SessionEvent::Zoom(10)), UpdateOutcome::Ignored);
    assert!(session.graph().is_none());
}

#[test]
fn test_render_draws_after_centering() {
    let mut session = session();
    session.apply_snapshot(&snapshot(&["a"]));

    let mut adapter = MockAdapter::new();
    adapter.expect_show_loading().never();
    adapter
        .expect_draw()
        .withf(|command| {
            command.nodes.len() == 2
                && command.edges.len() == 1
                && command.nodes[0].label_markup == "● apps\nKustomization\nflux-system"
        })
        .times(1)
        .returning(|_| Ok(()));

    session.render(&mut adapter, &PlainLabel).unwrap();
}

#[tokio::test]
async fn test_drive_renders_after_each_visible_change() {
    let mut session = session();
    let (tx, mut rx) = mpsc::unbounded_channel();
    tx.send(SessionEvent::Data(snapshot(&[]))).unwrap();
    tx.send(SessionEvent::Data(snapshot(&["a"]))).unwrap();
    tx.send(SessionEvent::Zoom(40)).unwrap();
    tx.send(SessionEvent::Data(snapshot(&["a", "b"]))).unwrap();
    tx.send(SessionEvent::Teardown).unwrap();
    tx.send(SessionEvent::Zoom(90)).unwrap();

    let mut adapter = MockAdapter::new();
    // Initial frame and the empty tick
    adapter.expect_show_loading().times(2).returning(|| Ok(()));
    // Centered, Zoomed, Refreshed
    adapter.expect_draw().times(3).returning(|_| Ok(()));

    watcher::drive(&mut session, &mut rx, &mut adapter, &PlainLabel)
        .await
        .unwrap();

    assert!(session.is_torn_down());
    assert!(tx.send(SessionEvent::Zoom(10)).is_err());
}

#[tokio::test]
async fn test_drive_skips_frames_when_layout_fails() {
    let mut session = GraphSession::new(
        LayoutOptions {
            node_size: NodeSize {
                width: 0.0,
                height: 0.0,
            },
            ..Default::default()
        },
        ViewportSettings::default(),
    );
    let (tx, mut rx) = mpsc::unbounded_channel();
    tx.send(SessionEvent::Data(snapshot(&["a"]))).unwrap();
    drop(tx);

    let mut adapter = MockAdapter::new();
    adapter.expect_show_loading().times(1).returning(|| Ok(()));
    adapter.expect_draw().never();

    watcher::drive(&mut session, &mut rx, &mut adapter, &PlainLabel)
        .await
        .unwrap();
    assert!(session.is_torn_down());
}

#[tokio::test]
async fn test_drive_propagates_adapter_errors() {
    let mut session = session();
    let (tx, mut rx) = mpsc::unbounded_channel();
    tx.send(SessionEvent::Data(snapshot(&["a"]))).unwrap();

    let mut adapter = MockAdapter::new();
    adapter.expect_show_loading().returning(|| Ok(()));
    adapter
        .expect_draw()
        .returning(|_| Err(anyhow!("surface gone")));

    let result = watcher::drive(&mut session, &mut rx, &mut adapter, &PlainLabel).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_poller_forwards_snapshots_and_survives_errors() {
    let mut source = MockSource::new();
    let tick = snapshot(&["a"]);
    let mut calls = 0;
    source.expect_fetch().returning(move || {
        calls += 1;
        if calls == 1 {
            Err(anyhow!("connection refused"))
        } else {
            Ok(tick.clone())
        }
    });
    source.expect_describe().returning(|| "mock".to_string());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let poller = Poller::spawn(Arc::new(source), Duration::from_millis(10), tx);

    for _ in 0..2 {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event, SessionEvent::Data(snapshot(&["a"])));
    }

    poller.stop().await;
}

#[tokio::test]
async fn test_poller_stops_when_session_channel_closes() {
    let mut source = MockSource::new();
    source
        .expect_fetch()
        .returning(|| Ok(snapshot(&["a"])));
    source.expect_describe().returning(|| "mock".to_string());

    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx);
    let poller = Poller::spawn(Arc::new(source), Duration::from_millis(10), tx);

    tokio::time::timeout(Duration::from_secs(5), async {
        while !poller.is_finished() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    poller.stop().await;
}

#[tokio::test]
async fn test_watch_file_until_teardown() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, serde_json::to_string(&snapshot(&["a", "b"])).unwrap()).unwrap();

    let mut session = session();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let source: Arc<dyn ObjectSource> = Arc::new(FileSource::new(&path));
    let poller = Poller::spawn(source, Duration::from_millis(10), tx.clone());

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let _ = tx.send(SessionEvent::Teardown);
    });

    let mut adapter = JsonRenderAdapter::lines(Vec::new());
    watcher::drive(&mut session, &mut rx, &mut adapter, &PlainLabel)
        .await
        .unwrap();
    poller.stop().await;

    let output = String::from_utf8(adapter.into_inner()).unwrap();
    let frames: Vec<serde_json::Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(frames[0]["frame"], "loading");
    assert!(frames.len() >= 2);
    assert!(frames[1..].iter().all(|f| f["frame"] == "draw"));
    assert_eq!(frames[1]["nodes"].as_array().map(Vec::len), Some(3));
}
