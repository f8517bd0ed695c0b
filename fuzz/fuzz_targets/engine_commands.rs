#![no_main]

use libfuzzer_sys::fuzz_target;
use station::audio::NullSink;
use station::config::StationConfig;
use station::core::StationEngine;

fuzz_target!(|data: &[u8]| {
    let config = StationConfig::builtin();
    let seed = data.first().copied().map_or(0, u64::from);
    let Ok(mut engine) = StationEngine::<NullSink>::seeded(&config, seed) else {
        return;
    };
    engine.bind(NullSink::new());

    for byte in data {
        match byte % 10 {
            0 => {
                let _ = engine.play();
            }
            1 => engine.pause(),
            2 => {
                let _ = engine.skip();
            }
            3 => {
                let name = ["mixed", "vocals", "instrumental", "jazz"][usize::from(byte / 10 % 4)];
                let _ = engine.select_station(name);
            }
            4 => {
                engine.set_volume(i32::from(*byte) - 64);
            }
            5 => {
                engine.toggle_mute();
            }
            6 => {
                if let Some(event) = engine.sink_mut().map(|sink| sink.fail("fuzz")) {
                    engine.handle_event(event);
                }
            }
            7 => {
                if let Some(event) = engine.sink_mut().map(|sink| sink.tick(f64::from(*byte))) {
                    engine.handle_event(event);
                }
            }
            8 => engine.seek_to(f64::from(*byte) - 20.0),
            _ => {
                if let Some(event) = engine.sink_mut().map(|sink| sink.finish()) {
                    engine.handle_event(event);
                }
            }
        }

        assert!(engine.cursor() < engine.order().len());
        assert!(engine.tracks_since_promo() <= 3);
    }
});
