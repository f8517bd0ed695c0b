use std::cell::RefCell;
use std::rc::Rc;
use station::audio::{MediaSink, NullSink};
use station::config::StationConfig;
use station::core::StationEngine;
use station::error::StationError;
use station::model::{PlaybackState, StationEvent};

fn builtin_engine(seed: u64) -> StationEngine<NullSink> {
    let mut engine = StationEngine::seeded(&StationConfig::builtin(), seed).expect("engine");
    engine.bind(NullSink::new());
    engine
}

#[test]
fn builtin_station_plays_tracks_then_promo() {
    let mut engine = builtin_engine(21);
    assert_eq!(engine.station(), "mixed");
    assert_eq!(engine.order().len(), 18);
    assert!((engine.volume() - 0.7).abs() < f32::EPSILON);

    engine.play().expect("play");
    for _ in 0..3 {
        let event = engine.sink_mut().expect("sink").finish();
        engine.handle_event(event);
    }

    let loads = engine.sink().expect("sink").loads();
    assert_eq!(loads.len(), 4);
    assert!(
        loads[..3]
            .iter()
            .all(|uri| uri.starts_with("/audio/") && !uri.starts_with("/audio/cuts/"))
    );
    assert!(loads[3].starts_with("/audio/cuts/Listening_mixed-"));
    assert_eq!(engine.state(), PlaybackState::PlayingCut);
    assert!(engine.current_item().title.starts_with("📢 Mixed "));
}

#[test]
fn switching_stations_reports_new_head_and_keeps_playing() {
    let mut engine = builtin_engine(5);
    let events = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&events);
    engine.subscribe(move |event| log.borrow_mut().push(event.clone()));

    engine.play().expect("play");
    engine.select_station("instrumental").expect("switch");

    assert_eq!(engine.station(), "instrumental");
    assert!(engine.is_playing());
    let current = engine
        .sink()
        .and_then(|sink| sink.current_source())
        .expect("source")
        .to_string();
    assert_eq!(current, engine.current_item().file_ref);

    let track_changes = events
        .borrow()
        .iter()
        .filter(|event| matches!(event, StationEvent::TrackChanged { .. }))
        .count();
    assert_eq!(track_changes, 3);

    assert_eq!(
        engine.select_station("classical"),
        Err(StationError::UnknownStation(String::from("classical")))
    );
    assert_eq!(engine.station(), "instrumental");
}

#[test]
fn rapid_skips_ignore_completions_from_replaced_items() {
    let mut engine = builtin_engine(13);
    engine.play().expect("play");

    let mut stale = Vec::new();
    for _ in 0..4 {
        stale.push(engine.sink_mut().expect("sink").finish());
        engine.skip().expect("skip");
    }
    let cursor = engine.cursor();
    let loads = engine.sink().expect("sink").loads().len();

    for event in stale {
        engine.handle_event(event);
    }

    assert_eq!(engine.cursor(), cursor);
    assert_eq!(engine.sink().expect("sink").loads().len(), loads);
    assert_eq!(engine.tracks_since_promo(), 1);
}

#[test]
fn volume_and_mute_reach_the_sink() {
    let mut engine = builtin_engine(1);
    assert_eq!(engine.set_volume(150), 1.0);
    assert!(engine.toggle_mute());

    let sink = engine.sink().expect("sink");
    assert_eq!(sink.volume(), 1.0);
    assert!(sink.muted());
}
