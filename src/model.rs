use serde::{Deserialize, Serialize};

pub const PROMO_TITLE_PREFIX: &str = "📢 ";

const LOADING_TITLE: &str = "Loading...";
const UPCOMING_PLACEHOLDER_TITLE: &str = "...";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    pub title: String,
    pub file: String,
    #[serde(default, rename = "duration")]
    pub duration_seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cut {
    pub title: String,
    pub file: String,
    #[serde(default, rename = "duration")]
    pub duration_seconds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Stopped,
    PlayingTrack,
    PlayingCut,
}

impl PlaybackState {
    pub fn is_loaded(self) -> bool {
        matches!(self, Self::PlayingTrack | Self::PlayingCut)
    }
}

/// Stamp carried by every sink request and echoed back on its events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub title: String,
    pub file_ref: String,
    pub artwork_ref: Option<String>,
    pub is_promo: bool,
}

impl NowPlaying {
    pub fn loading() -> Self {
        Self::placeholder(LOADING_TITLE)
    }

    pub fn upcoming_placeholder() -> Self {
        Self::placeholder(UPCOMING_PLACEHOLDER_TITLE)
    }

    fn placeholder(title: &str) -> Self {
        Self {
            title: title.to_string(),
            file_ref: String::new(),
            artwork_ref: None,
            is_promo: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub percent: f64,
    pub elapsed_seconds: f64,
    pub total_seconds: f64,
}

impl Progress {
    /// Builds a progress report; an unknown or zero duration yields 0%.
    pub fn new(elapsed_seconds: f64, total_seconds: f64) -> Self {
        let elapsed_seconds = if elapsed_seconds.is_finite() {
            elapsed_seconds.max(0.0)
        } else {
            0.0
        };
        let percent = if total_seconds.is_finite() && total_seconds > 0.0 {
            (elapsed_seconds / total_seconds * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self {
            percent,
            elapsed_seconds,
            total_seconds,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StationEvent {
    TrackChanged {
        current: NowPlaying,
        upcoming: NowPlaying,
    },
    PlayStateChanged {
        is_playing: bool,
    },
    ProgressUpdated(Progress),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEventKind {
    Finished,
    TimeUpdate,
    MetadataReady,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkEvent {
    pub generation: Generation,
    pub kind: SinkEventKind,
}

impl SinkEvent {
    pub fn new(generation: Generation, kind: SinkEventKind) -> Self {
        Self { generation, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_with_unknown_duration_is_zero() {
        assert_eq!(Progress::new(12.0, 0.0).percent, 0.0);
        assert_eq!(Progress::new(12.0, f64::NAN).percent, 0.0);
        assert_eq!(Progress::new(12.0, f64::INFINITY).percent, 0.0);
        assert_eq!(Progress::new(f64::NAN, 100.0).percent, 0.0);
    }

    #[test]
    fn progress_is_clamped_to_range() {
        assert_eq!(Progress::new(50.0, 200.0).percent, 25.0);
        assert_eq!(Progress::new(300.0, 200.0).percent, 100.0);
    }

    #[test]
    fn track_reads_duration_field_from_json() {
        let track: Track =
            serde_json::from_str(r#"{"title":"Morning Light","file":"MorningLight.mp3","duration":240}"#)
                .expect("track json");
        assert_eq!(track.duration_seconds, 240.0);
        assert_eq!(track.artwork, None);
    }

    #[test]
    fn station_event_serializes_with_type_tag() {
        let json = serde_json::to_string(&StationEvent::PlayStateChanged { is_playing: true })
            .expect("serialize");
        assert_eq!(json, r#"{"type":"play_state_changed","is_playing":true}"#);
    }
}
