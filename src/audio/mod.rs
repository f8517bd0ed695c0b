use crate::model::{Generation, SinkEvent, SinkEventKind};

#[cfg(feature = "rodio")]
mod rodio_sink;
#[cfg(feature = "rodio")]
pub use rodio_sink::RodioSink;

/// Playback primitive the station engine drives.
///
/// Requests are fire-and-forget. Completion, progress and failure are
/// reported back as [`SinkEvent`]s carrying the [`Generation`] passed to the
/// `load` they belong to; the engine drops events from superseded loads.
/// Durations and positions are in seconds, with `NaN` for "unknown".
pub trait MediaSink {
    fn load(&mut self, uri: &str, generation: Generation);
    fn play(&mut self);
    fn pause(&mut self);
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    fn duration(&self) -> f64;
    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);
    fn muted(&self) -> bool;
    fn set_muted(&mut self, muted: bool);
}

#[derive(Debug, Clone)]
pub struct NullSink {
    current: Option<String>,
    generation: Generation,
    loads: Vec<String>,
    playing: bool,
    position: f64,
    duration: f64,
    volume: f32,
    muted: bool,
}

impl NullSink {
    pub fn new() -> Self {
        Self {
            current: None,
            generation: Generation::default(),
            loads: Vec::new(),
            playing: false,
            position: 0.0,
            duration: f64::NAN,
            volume: 1.0,
            muted: false,
        }
    }

    pub fn current_source(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn loads(&self) -> &[String] {
        &self.loads
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn finish(&mut self) -> SinkEvent {
        self.playing = false;
        if self.duration.is_finite() {
            self.position = self.duration;
        }
        self.event(SinkEventKind::Finished)
    }

    pub fn fail(&mut self, message: &str) -> SinkEvent {
        self.playing = false;
        self.event(SinkEventKind::Error(message.to_string()))
    }

    pub fn tick(&mut self, seconds: f64) -> SinkEvent {
        if self.playing && self.current.is_some() {
            self.position += seconds.max(0.0);
            if self.duration.is_finite() {
                self.position = self.position.min(self.duration);
            }
        }
        self.event(SinkEventKind::TimeUpdate)
    }

    pub fn report_metadata(&mut self, duration: f64) -> SinkEvent {
        self.duration = duration;
        self.event(SinkEventKind::MetadataReady)
    }

    fn event(&self, kind: SinkEventKind) -> SinkEvent {
        SinkEvent::new(self.generation, kind)
    }
}

impl Default for NullSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaSink for NullSink {
    fn load(&mut self, uri: &str, generation: Generation) {
        self.current = Some(uri.to_string());
        self.loads.push(uri.to_string());
        self.generation = generation;
        self.playing = false;
        self.position = 0.0;
        self.duration = f64::NAN;
    }

    fn play(&mut self) {
        self.playing = self.current.is_some();
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.position = seconds.max(0.0);
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn muted(&self) -> bool {
        self.muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}

#[cfg(test)]
mod tests {
    use super::{MediaSink, NullSink};
    use crate::model::{Generation, SinkEventKind};

    #[test]
    fn null_sink_position_advances_only_when_playing() {
        let mut sink = NullSink::new();
        sink.load("/audio/a.mp3", Generation(1));
        sink.tick(5.0);
        assert_eq!(sink.current_time(), 0.0);

        sink.play();
        sink.tick(5.0);
        assert_eq!(sink.current_time(), 5.0);

        sink.pause();
        sink.tick(5.0);
        assert_eq!(sink.current_time(), 5.0);
    }

    #[test]
    fn null_sink_clamps_position_to_known_duration() {
        let mut sink = NullSink::new();
        sink.load("/audio/a.mp3", Generation(1));
        sink.report_metadata(10.0);
        sink.play();
        sink.tick(25.0);
        assert_eq!(sink.current_time(), 10.0);
    }

    #[test]
    fn null_sink_events_carry_load_generation() {
        let mut sink = NullSink::new();
        sink.load("/audio/a.mp3", Generation(4));
        sink.play();
        let event = sink.finish();
        assert_eq!(event.generation, Generation(4));
        assert_eq!(event.kind, SinkEventKind::Finished);
        assert!(!sink.is_playing());

        sink.load("/audio/b.mp3", Generation(5));
        let event = sink.fail("decode error");
        assert_eq!(event.generation, Generation(5));
        assert_eq!(event.kind, SinkEventKind::Error(String::from("decode error")));
        assert_eq!(sink.loads(), ["/audio/a.mp3", "/audio/b.mp3"]);
    }

    #[test]
    fn null_sink_load_resets_clock_and_duration() {
        let mut sink = NullSink::new();
        sink.load("/audio/a.mp3", Generation(1));
        sink.report_metadata(30.0);
        sink.play();
        sink.tick(12.0);

        sink.load("/audio/b.mp3", Generation(2));
        assert_eq!(sink.current_time(), 0.0);
        assert!(sink.duration().is_nan());
        assert!(!sink.is_playing());
    }
}
