use super::MediaSink;
use crate::model::{Generation, SinkEvent, SinkEventKind};
use anyhow::{Context, Result};
use rodio::Source;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use std::collections::VecDeque;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub struct RodioSink {
    stream: OutputStream,
    sink: Sink,
    root: PathBuf,
    current: Option<PathBuf>,
    generation: Generation,
    track_duration: Option<Duration>,
    volume: f32,
    muted: bool,
    pending: VecDeque<SinkEvent>,
    finish_reported: bool,
}

impl RodioSink {
    pub fn new(root: &Path) -> Result<Self> {
        let mut stream = OutputStreamBuilder::from_default_device()
            .context("failed to open default system output stream")?
            .with_error_callback(|_| {})
            .open_stream_or_fallback()
            .context("failed to start default output stream")?;
        stream.log_on_drop(false);
        let sink = Sink::connect_new(stream.mixer());

        Ok(Self {
            stream,
            sink,
            root: root.to_path_buf(),
            current: None,
            generation: Generation::default(),
            track_duration: None,
            volume: 1.0,
            muted: false,
            pending: VecDeque::new(),
            finish_reported: false,
        })
    }

    pub fn poll(&mut self) -> Option<SinkEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }

        if self.current.is_some()
            && !self.finish_reported
            && !self.sink.is_paused()
            && self.sink.empty()
        {
            self.finish_reported = true;
            return Some(SinkEvent::new(self.generation, SinkEventKind::Finished));
        }
        None
    }

    pub fn time_update(&self) -> SinkEvent {
        SinkEvent::new(self.generation, SinkEventKind::TimeUpdate)
    }

    fn resolve(&self, uri: &str) -> PathBuf {
        self.root.join(uri.trim_start_matches('/'))
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }
}

impl MediaSink for RodioSink {
    fn load(&mut self, uri: &str, generation: Generation) {
        self.sink.stop();
        self.sink = Sink::connect_new(self.stream.mixer());
        self.sink.pause();
        self.sink.set_volume(self.effective_volume());
        self.generation = generation;
        self.track_duration = None;
        self.finish_reported = false;
        self.pending.clear();

        let path = self.resolve(uri);
        let opened = File::open(&path)
            .with_context(|| format!("failed to open track {}", path.display()))
            .and_then(|file| {
                Decoder::try_from(file)
                    .with_context(|| format!("failed to decode {}", path.display()))
            });
        match opened {
            Ok(source) => {
                self.track_duration = source.total_duration().filter(|d| !d.is_zero());
                self.sink.append(source);
                self.current = Some(path);
                self.pending
                    .push_back(SinkEvent::new(generation, SinkEventKind::MetadataReady));
            }
            Err(err) => {
                tracing::warn!("rodio sink could not load {uri}: {err:#}");
                self.current = None;
                self.pending.push_back(SinkEvent::new(
                    generation,
                    SinkEventKind::Error(format!("{err:#}")),
                ));
            }
        }
    }

    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn current_time(&self) -> f64 {
        if self.current.is_none() {
            return 0.0;
        }
        self.sink.get_pos().as_secs_f64()
    }

    fn set_current_time(&mut self, seconds: f64) {
        if self.current.is_none() || !seconds.is_finite() {
            return;
        }
        let position = Duration::from_secs_f64(seconds.max(0.0));
        if let Err(err) = self.sink.try_seek(position) {
            tracing::warn!("rodio sink seek failed: {err:?}");
        }
    }

    fn duration(&self) -> f64 {
        self.track_duration
            .map_or(f64::NAN, |duration| duration.as_secs_f64())
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.sink.set_volume(self.effective_volume());
    }

    fn muted(&self) -> bool {
        self.muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.sink.set_volume(self.effective_volume());
    }
}
