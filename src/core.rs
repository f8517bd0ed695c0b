use crate::audio::MediaSink;
use crate::catalog::{AssetLayout, Catalog};
use crate::config::StationConfig;
use crate::error::{CatalogError, StationError};
use crate::model::{
    Cut, Generation, NowPlaying, PROMO_TITLE_PREFIX, PlaybackState, Progress, SinkEvent,
    SinkEventKind, StationEvent, Track,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::{IndexedRandom, SliceRandom};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&StationEvent)>;

#[derive(Debug, Clone)]
struct Session {
    station: String,
    order: Vec<usize>,
    cursor: usize,
    tracks_since_promo: u32,
    is_playing: bool,
    volume: f32,
    muted: bool,
    state: PlaybackState,
    current_cut: Option<Cut>,
    generation: Generation,
}

/// Every sink `load` is stamped with a fresh [`Generation`]; events passed to
/// [`StationEngine::handle_event`] with any other stamp are ignored.
pub struct StationEngine<S: MediaSink> {
    catalog: Catalog,
    layout: AssetLayout,
    promo_interval: u32,
    promo_resets_on_wrap: bool,
    session: Session,
    sink: Option<S>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    rng: SmallRng,
}

impl<S: MediaSink> StationEngine<S> {
    pub fn new(config: &StationConfig) -> Result<Self, CatalogError> {
        Self::with_rng(config, rand::make_rng::<SmallRng>())
    }

    pub fn seeded(config: &StationConfig, seed: u64) -> Result<Self, CatalogError> {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(config: &StationConfig, rng: SmallRng) -> Result<Self, CatalogError> {
        let catalog = config.catalog()?;
        let session = Session {
            station: catalog.default_station().to_string(),
            order: Vec::new(),
            cursor: 0,
            tracks_since_promo: 0,
            is_playing: false,
            volume: config.initial_volume.clamp(0.0, 1.0),
            muted: false,
            state: PlaybackState::Idle,
            current_cut: None,
            generation: Generation::default(),
        };

        Ok(Self {
            catalog,
            layout: config.layout(),
            promo_interval: config.promo_interval,
            promo_resets_on_wrap: config.promo_resets_on_wrap,
            session,
            sink: None,
            listeners: Vec::new(),
            next_listener: 0,
            rng,
        })
    }

    pub fn bind(&mut self, mut sink: S) -> Option<S> {
        sink.set_volume(self.session.volume);
        sink.set_muted(self.session.muted);
        let previous = self.sink.replace(sink);
        if previous.is_some() {
            tracing::info!("replacing bound media sink");
        }

        self.session.state = PlaybackState::Stopped;
        self.set_playing(false);
        let station = self.session.station.clone();
        self.switch_station(&station);
        previous
    }

    pub fn unbind(&mut self) -> Option<S> {
        let mut sink = self.sink.take()?;
        sink.pause();
        self.session.generation = self.session.generation.next();
        self.session.state = PlaybackState::Idle;
        self.session.current_cut = None;
        self.set_playing(false);
        Some(sink)
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&StationEvent) + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn select_station(&mut self, name: &str) -> Result<(), StationError> {
        let Some(station) = self.catalog.station(name) else {
            tracing::warn!("ignoring unknown station {name}");
            return Err(StationError::UnknownStation(name.to_string()));
        };
        if station.tracks.is_empty() {
            tracing::warn!("ignoring empty station {name}");
            return Err(StationError::EmptyCatalog(name.to_string()));
        }

        let was_playing = self.session.is_playing;
        if was_playing && let Some(sink) = self.sink.as_mut() {
            sink.pause();
        }
        self.session.is_playing = false;
        if self.session.state.is_loaded() {
            self.session.state = PlaybackState::Stopped;
        }

        self.switch_station(name);
        tracing::info!("switched to station {name}");

        if was_playing {
            self.play()?;
        }
        Ok(())
    }

    /// Resumes a paused item in place; from Stopped it starts the item at the cursor.
    pub fn play(&mut self) -> Result<(), StationError> {
        if self.sink.is_none() {
            return Err(StationError::Unbound);
        }
        if self.session.is_playing {
            tracing::debug!("play requested while already playing");
            return Ok(());
        }

        if self.session.state.is_loaded() {
            if let Some(sink) = self.sink.as_mut() {
                sink.play();
            }
            self.set_playing(true);
            return Ok(());
        }

        self.ensure_order()?;
        self.play_at(self.session.cursor);
        Ok(())
    }

    pub fn pause(&mut self) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        sink.pause();
        self.set_playing(false);
    }

    pub fn toggle_play_pause(&mut self) -> Result<(), StationError> {
        if self.session.is_playing {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    pub fn skip(&mut self) -> Result<(), StationError> {
        if self.sink.is_none() {
            return Err(StationError::Unbound);
        }
        self.ensure_order()?;
        self.session.tracks_since_promo = 0;
        self.play_at(self.session.cursor + 1);
        Ok(())
    }

    pub fn set_volume(&mut self, level: i32) -> f32 {
        let volume = level.clamp(0, 100) as f32 / 100.0;
        self.session.volume = volume;
        if let Some(sink) = self.sink.as_mut() {
            sink.set_volume(volume);
        }
        volume
    }

    pub fn toggle_mute(&mut self) -> bool {
        let muted = !self
            .sink
            .as_ref()
            .map_or(self.session.muted, |sink| sink.muted());
        self.session.muted = muted;
        if let Some(sink) = self.sink.as_mut() {
            sink.set_muted(muted);
        }
        muted
    }

    pub fn seek_to(&mut self, seconds: f64) {
        if !self.session.state.is_loaded() || !seconds.is_finite() {
            return;
        }
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        let duration = sink.duration();
        let mut target = seconds.max(0.0);
        if duration.is_finite() && duration > 0.0 {
            target = target.min(duration);
        }
        sink.set_current_time(target);
    }

    pub fn handle_event(&mut self, event: SinkEvent) {
        if self.sink.is_none() {
            tracing::debug!("sink event while unbound: {:?}", event.kind);
            return;
        }
        if event.generation != self.session.generation || !self.session.state.is_loaded() {
            tracing::debug!(
                "discarding stale sink event {:?} from generation {}",
                event.kind,
                event.generation.0
            );
            return;
        }

        match event.kind {
            SinkEventKind::Finished => self.advance(),
            SinkEventKind::Error(message) => {
                tracing::warn!(
                    "playback failed for {}: {message}",
                    self.current_item().file_ref
                );
                self.advance();
            }
            SinkEventKind::TimeUpdate => {
                if let Some(sink) = self.sink.as_ref() {
                    let progress = Progress::new(sink.current_time(), sink.duration());
                    self.emit(StationEvent::ProgressUpdated(progress));
                }
            }
            SinkEventKind::MetadataReady => {
                if let Some(sink) = self.sink.as_ref() {
                    let progress = Progress::new(0.0, sink.duration());
                    self.emit(StationEvent::ProgressUpdated(progress));
                }
            }
        }
    }

    pub fn current_item(&self) -> NowPlaying {
        if self.session.state == PlaybackState::PlayingCut
            && let Some(cut) = &self.session.current_cut
        {
            return NowPlaying {
                title: format!("{PROMO_TITLE_PREFIX}{}", cut.title),
                file_ref: self.layout.cut_uri(cut),
                artwork_ref: None,
                is_promo: true,
            };
        }

        self.track_at(self.session.cursor)
            .map_or_else(NowPlaying::loading, |track| self.now_playing(track))
    }

    pub fn upcoming_item(&self) -> NowPlaying {
        let len = self.session.order.len();
        if len == 0 {
            return NowPlaying::upcoming_placeholder();
        }
        let position = if self.session.state == PlaybackState::PlayingCut {
            self.session.cursor
        } else {
            (self.session.cursor + 1) % len
        };
        self.track_at(position)
            .map_or_else(NowPlaying::upcoming_placeholder, |track| {
                self.now_playing(track)
            })
    }

    pub fn stations(&self) -> impl Iterator<Item = &str> {
        self.catalog.names()
    }

    pub fn station(&self) -> &str {
        &self.session.station
    }

    pub fn state(&self) -> PlaybackState {
        self.session.state
    }

    pub fn is_playing(&self) -> bool {
        self.session.is_playing
    }

    pub fn volume(&self) -> f32 {
        self.session.volume
    }

    pub fn is_muted(&self) -> bool {
        self.session.muted
    }

    pub fn cursor(&self) -> usize {
        self.session.cursor
    }

    pub fn tracks_since_promo(&self) -> u32 {
        self.session.tracks_since_promo
    }

    pub fn generation(&self) -> Generation {
        self.session.generation
    }

    pub fn order(&self) -> &[usize] {
        &self.session.order
    }

    pub fn sink(&self) -> Option<&S> {
        self.sink.as_ref()
    }

    pub fn sink_mut(&mut self) -> Option<&mut S> {
        self.sink.as_mut()
    }

    fn switch_station(&mut self, name: &str) {
        self.session.station = name.to_string();
        self.session.generation = self.session.generation.next();
        self.session.tracks_since_promo = 0;
        self.session.current_cut = None;
        self.rebuild_order(None);
        self.emit_track_changed();
    }

    fn ensure_order(&mut self) -> Result<(), StationError> {
        if self.session.order.is_empty() {
            self.rebuild_order(None);
        }
        if self.session.order.is_empty() {
            tracing::warn!("station {} has nothing to play", self.session.station);
            return Err(StationError::EmptyCatalog(self.session.station.clone()));
        }
        Ok(())
    }

    fn rebuild_order(&mut self, avoid_first: Option<usize>) {
        let len = self
            .catalog
            .station(&self.session.station)
            .map_or(0, |station| station.tracks.len());
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(&mut self.rng);
        if let Some(previous) = avoid_first
            && order.len() > 1
            && order[0] == previous
        {
            let last = order.len() - 1;
            order.swap(0, last);
        }
        self.session.order = order;
        self.session.cursor = 0;
    }

    fn play_at(&mut self, index: usize) {
        let mut index = index;
        if index >= self.session.order.len() {
            let previous = self.session.order.get(self.session.cursor).copied();
            self.rebuild_order(previous);
            index = 0;
            if self.promo_resets_on_wrap {
                self.session.tracks_since_promo = 0;
            }
            tracing::debug!("order exhausted, reshuffled {}", self.session.station);
        }
        self.session.cursor = index;

        if self.promo_due() {
            self.play_cut();
            return;
        }

        let Some(track) = self.track_at(index).cloned() else {
            tracing::warn!("station {} has nothing to play", self.session.station);
            return;
        };
        let uri = self.layout.track_uri(&track);
        self.load_and_play(&uri);
        self.session.tracks_since_promo = self.session.tracks_since_promo.saturating_add(1);
        self.session.state = PlaybackState::PlayingTrack;
        self.session.current_cut = None;
        tracing::info!("playing {} ({uri})", track.title);

        self.emit_track_changed();
        self.set_playing(true);
    }

    fn play_cut(&mut self) {
        self.session.tracks_since_promo = 0;
        let Some(cut) = self
            .catalog
            .station(&self.session.station)
            .and_then(|station| station.cuts.choose(&mut self.rng))
            .cloned()
        else {
            return;
        };

        let uri = self.layout.cut_uri(&cut);
        self.load_and_play(&uri);
        tracing::info!("playing promo {} ({uri})", cut.title);
        self.session.state = PlaybackState::PlayingCut;
        self.session.current_cut = Some(cut);

        self.emit_track_changed();
        self.set_playing(true);
    }

    fn advance(&mut self) {
        match self.session.state {
            PlaybackState::PlayingCut => self.play_at(self.session.cursor),
            PlaybackState::PlayingTrack => self.play_at(self.session.cursor + 1),
            PlaybackState::Idle | PlaybackState::Stopped => {}
        }
    }

    fn promo_due(&self) -> bool {
        self.promo_interval > 0
            && self.session.tracks_since_promo >= self.promo_interval
            && self.session.state != PlaybackState::PlayingCut
            && self
                .catalog
                .station(&self.session.station)
                .is_some_and(|station| !station.cuts.is_empty())
    }

    fn load_and_play(&mut self, uri: &str) {
        self.session.generation = self.session.generation.next();
        let generation = self.session.generation;
        if let Some(sink) = self.sink.as_mut() {
            sink.load(uri, generation);
            sink.play();
        }
    }

    fn track_at(&self, position: usize) -> Option<&Track> {
        let track_index = *self.session.order.get(position)?;
        self.catalog
            .station(&self.session.station)?
            .tracks
            .get(track_index)
    }

    fn now_playing(&self, track: &Track) -> NowPlaying {
        NowPlaying {
            title: track.title.clone(),
            file_ref: self.layout.track_uri(track),
            artwork_ref: track
                .artwork
                .as_deref()
                .map(|artwork| self.layout.artwork_uri(artwork)),
            is_promo: false,
        }
    }

    fn set_playing(&mut self, playing: bool) {
        if self.session.is_playing == playing {
            return;
        }
        self.session.is_playing = playing;
        self.emit(StationEvent::PlayStateChanged {
            is_playing: playing,
        });
    }

    fn emit_track_changed(&mut self) {
        let event = StationEvent::TrackChanged {
            current: self.current_item(),
            upcoming: self.upcoming_item(),
        };
        self.emit(event);
    }

    fn emit(&mut self, event: StationEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }
}
