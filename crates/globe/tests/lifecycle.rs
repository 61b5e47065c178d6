use globe::builder::Viewport;
use globe::motion::{pulsed_point_opacity, pulsed_point_size};
use globe::{
    ContentOrigin, DatasetFetcher, FetchError, Globe, GlobeConfig, GlobeError, default_connections,
    load_boundaries,
};
use gpu::{Primitive, RecordingBackend, RenderCommand};
use scene::NodeKindTag;
use scene::components::Material;
use serde_json::Value;

struct Offline;

impl DatasetFetcher for Offline {
    async fn fetch_json(&self, _url: &str) -> Result<Value, FetchError> {
        Err(FetchError::Network("offline".to_string()))
    }
}

fn created() -> Globe<RecordingBackend> {
    Globe::create(RecordingBackend::new(), GlobeConfig::default(), Viewport::new(600, 600, 1.0))
        .expect("globe")
}

fn loaded() -> Globe<RecordingBackend> {
    let mut globe = created();
    let content = pollster::block_on(load_boundaries(&Offline, &globe.config().data_sources));
    assert_eq!(content.origin, ContentOrigin::Grid);
    assert!(globe.apply_geo_content(content));
    globe
}

#[test]
fn offline_globe_shows_grid_and_every_arc() {
    let mut globe = loaded();
    assert_eq!(globe.scene().count(NodeKindTag::Points), 1);
    assert_eq!(globe.scene().count(NodeKindTag::Line), default_connections().len());
    assert_eq!(globe.arcs().len(), 20);

    assert!(globe.tick(0.0));
    assert!(globe.tick(1.0));
    let frame = globe.backend().last_frame.as_ref().expect("frame");
    assert_eq!(frame.count(Primitive::Points), 1);
    // Only the first few arcs have started by t = 1s.
    assert!(frame.count(Primitive::Line) <= 4);
    assert!(globe.events().has_kind("geo.loaded"));
}

#[test]
fn pointer_gap_narrows_every_frame() {
    let mut globe = created();
    globe.on_pointer_move(0.0, 0.0, [0.0, 0.0, 600.0, 600.0]);
    let mut last = globe.motion().gap();
    assert!(last > 0.0);
    for i in 0..60 {
        globe.tick(f64::from(i) / 60.0);
        let gap = globe.motion().gap();
        assert!(gap < last, "gap grew at frame {i}");
        last = gap;
    }
    let tilt = globe.motion().current();
    assert!(tilt.yaw < 0.0 && tilt.pitch < 0.0);
}

#[test]
fn destroy_stops_rendering_and_releases_everything() {
    let mut globe = loaded();
    globe.tick(0.0);
    assert!(globe.backend().live_resources() > 0);

    globe.destroy();
    assert_eq!(globe.backend().live_resources(), 0);
    assert!(globe.backend().detached);
    assert!(globe.scene().is_empty());

    let renders = globe.backend().render_count;
    assert!(!globe.tick(1.0));
    assert_eq!(globe.backend().render_count, renders);

    globe.destroy();
    assert!(!globe.is_running());
    let destroyed = globe
        .drain_events()
        .into_iter()
        .filter(|e| e.kind == "lifecycle.destroyed")
        .count();
    assert_eq!(destroyed, 1);
}

#[test]
fn late_geo_content_is_discarded() {
    let mut globe = created();
    let pending = pollster::block_on(load_boundaries(&Offline, &globe.config().data_sources));
    globe.destroy();
    assert!(!globe.apply_geo_content(pending));
    assert!(globe.scene().is_empty());
    assert_eq!(globe.backend().live_resources(), 0);
    assert!(globe.events().has_kind("geo.discarded"));
}

#[test]
fn backend_failure_during_construction_cleans_up() {
    let mut backend = RecordingBackend::failing_after(3);
    let result = Globe::create(&mut backend, GlobeConfig::default(), Viewport::new(600, 600, 1.0));
    assert!(matches!(result, Err(GlobeError::BackendUnavailable(_))));
    drop(result);

    assert_eq!(backend.live_resources(), 0);
    assert_eq!(backend.released_resources(), 3);
    assert!(backend.detached);
    assert_eq!(backend.render_count, 0);
}

fn points_command(globe: &Globe<RecordingBackend>) -> RenderCommand {
    let frame = globe.backend().last_frame.as_ref().expect("frame");
    *frame
        .commands
        .iter()
        .find(|c| c.primitive == Primitive::Points)
        .expect("points drawn")
}

#[test]
fn boundary_dots_pulse_in_size_and_opacity() {
    let mut globe = loaded();
    let base = globe.config().base_point_size();
    let mut seen = Vec::new();
    for t in [0.0, 0.4, 0.8, 1.6] {
        globe.tick(t);
        let Material::Points(material) = points_command(&globe).material else {
            panic!("points drawn with a points material");
        };
        assert!((material.opacity - pulsed_point_opacity(t)).abs() < 1e-6, "opacity at {t}");
        assert!((material.size - pulsed_point_size(base, t)).abs() < 1e-7, "size at {t}");
        seen.push(material.size);
    }
    assert!(seen.windows(2).any(|w| (w[0] - w[1]).abs() > 1e-4));
}

#[test]
fn every_drawn_node_shares_the_globe_rotation() {
    let mut globe = loaded();
    globe.on_pointer_move(500.0, 100.0, [0.0, 0.0, 600.0, 600.0]);
    for i in 0..90 {
        globe.tick(f64::from(i) / 30.0);
    }
    let frame = globe.backend().last_frame.as_ref().expect("frame");
    assert!(frame.count(Primitive::Line) > 0);
    let first = frame.commands[0].rotation;
    assert!(first.y > 0.0 && first.x < 0.0);
    assert!(frame.commands.iter().all(|c| c.rotation == first));
}

#[test]
fn dragging_orbits_the_globe() {
    let mut config = GlobeConfig::default();
    config.auto_rotate = false;
    let viewport = Viewport::new(600, 600, 1.0);
    let mut still = Globe::create(RecordingBackend::new(), config.clone(), viewport).expect("globe");
    let mut dragged = Globe::create(RecordingBackend::new(), config, viewport).expect("globe");
    let rect = [0.0, 0.0, 600.0, 600.0];
    let yaw = |g: &Globe<RecordingBackend>| {
        g.backend().last_frame.as_ref().expect("frame").commands[0].rotation.y
    };

    dragged.on_pointer_down(300.0, 300.0);
    for g in [&mut still, &mut dragged] {
        g.on_pointer_move(450.0, 300.0, rect);
    }
    dragged.on_pointer_up();
    for i in 0..=120 {
        still.tick(f64::from(i) / 60.0);
        dragged.tick(f64::from(i) / 60.0);
    }
    // 150px of a 600px container at rotate speed 0.4.
    let queued = 150.0 / 600.0 * std::f64::consts::TAU * 0.4;
    assert!((yaw(&dragged) - yaw(&still) - queued).abs() < 0.01);

    // Released: plain moves only tilt, they no longer orbit.
    for g in [&mut still, &mut dragged] {
        g.on_pointer_move(0.0, 300.0, rect);
    }
    for i in 121..=600 {
        still.tick(f64::from(i) / 60.0);
        dragged.tick(f64::from(i) / 60.0);
    }
    assert!((yaw(&dragged) - yaw(&still) - queued).abs() < 1e-4);
}

#[test]
fn rejected_options_and_skipped_sources_reach_the_event_stream() {
    let parsed = GlobeConfig::parse(r#"{ "oceanColor": "teal", "dotSize": 3 }"#);
    let mut globe = Globe::create(RecordingBackend::new(), parsed.config, Viewport::new(600, 600, 1.0))
        .expect("globe")
        .with_config_warnings(&parsed.warnings);
    let content = pollster::block_on(load_boundaries(&Offline, &globe.config().data_sources));
    globe.apply_geo_content(content);

    let events = globe.drain_events();
    let invalid: Vec<_> = events.iter().filter(|e| e.kind == "config.invalid").collect();
    assert_eq!(invalid.len(), 1);
    assert!(invalid[0].message.starts_with("oceanColor"));
    let skipped = events.iter().filter(|e| e.kind == "geo.source_failed").count();
    assert_eq!(skipped, globe.config().data_sources.len());
    assert!(events.iter().any(|e| e.kind == "geo.loaded"));
}

#[test]
fn backend_failure_while_adding_geo_keeps_spinning() {
    let mut globe = Globe::create(
        RecordingBackend::failing_after(6),
        GlobeConfig::default(),
        Viewport::new(600, 600, 1.0),
    )
    .expect("base scene fits the budget");
    let content = pollster::block_on(load_boundaries(&Offline, &[]));
    assert!(!globe.apply_geo_content(content));
    assert!(!globe.has_geo_content());
    assert_eq!(globe.scene().count(NodeKindTag::Points), 0);
    assert!(globe.tick(0.0));
    assert_eq!(globe.backend().render_count, 1);

    globe.destroy();
    assert_eq!(globe.backend().live_resources(), 0);
}
