use crate::catalog::{AssetLayout, Catalog, StationDefinition};
use crate::error::CatalogError;
use crate::model::{Cut, Track};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_ENV: &str = "STATION_CONFIG";
const CONFIG_FILE: &str = "station.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StationConfig {
    #[serde(default)]
    pub asset_base: String,
    #[serde(default = "default_station")]
    pub default_station: String,
    #[serde(default = "default_promo_interval")]
    pub promo_interval: u32,
    #[serde(default = "default_initial_volume")]
    pub initial_volume: f32,
    /// Exhausting the shuffled order also clears a pending promo.
    #[serde(default)]
    pub promo_resets_on_wrap: bool,
    pub stations: Vec<StationDefinition>,
}

fn default_station() -> String {
    String::from("mixed")
}

fn default_promo_interval() -> u32 {
    3
}

fn default_initial_volume() -> f32 {
    0.7
}

impl StationConfig {
    pub fn catalog(&self) -> Result<Catalog, CatalogError> {
        Catalog::build(&self.stations, &self.default_station)
    }

    pub fn layout(&self) -> AssetLayout {
        AssetLayout::new(&self.asset_base)
    }

    pub fn builtin() -> Self {
        Self {
            asset_base: String::new(),
            default_station: default_station(),
            promo_interval: default_promo_interval(),
            initial_volume: default_initial_volume(),
            promo_resets_on_wrap: false,
            stations: vec![
                StationDefinition {
                    name: String::from("instrumental"),
                    tracks: tracks(INSTRUMENTAL_TRACKS),
                    cuts: cuts("Instrumental", "instrumentals"),
                    combine: Vec::new(),
                },
                StationDefinition {
                    name: String::from("vocals"),
                    tracks: tracks(VOCAL_TRACKS),
                    cuts: cuts("Vocals", "vocals"),
                    combine: Vec::new(),
                },
                StationDefinition {
                    name: String::from("mixed"),
                    tracks: Vec::new(),
                    cuts: cuts("Mixed", "mixed"),
                    combine: vec![String::from("instrumental"), String::from("vocals")],
                },
            ],
        }
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

const INSTRUMENTAL_TRACKS: &[(&str, &str, u32)] = &[
    ("Gentle Streams", "GentleStreams.mp3", 289),
    ("Heavenly Peace", "HeavenlyPeace.mp3", 239),
    ("Morning Light", "MorningLight.mp3", 240),
    ("Quiet Sanctuary", "QuietSanctuary.mp3", 202),
    ("Sacred Waters", "SacredWaters.mp3", 169),
    ("Peaceful Garden", "PeacefulGarden.mp3", 248),
];

const VOCAL_TRACKS: &[(&str, &str, u32)] = &[
    ("Rest in His Presence", "RestinHisPresence.mp3", 240),
    ("Morning Mercies", "MorningMercies.mp3", 225),
    ("Healing Waters", "HealingWaters.mp3", 255),
    ("Abide in Me", "AbideinMe.mp3", 210),
    ("Peace Be Still", "PeaceBeStill.mp3", 270),
    ("Come Away With Me", "ComeAwayWithMe.mp3", 230),
    ("Breathe on Me", "BreatheonMe.mp3", 215),
    ("In the Quiet", "IntheQuiet.mp3", 250),
    ("Everlasting Arms", "EverlastingArms.mp3", 235),
    ("Light of My Path", "LightOfMyPath.mp3", 265),
    ("Still Waters", "StillWaters.mp3", 220),
    ("Anchor for My Soul", "AnchorforMySoul.mp3", 240),
];

fn tracks(table: &[(&str, &str, u32)]) -> Vec<Track> {
    table
        .iter()
        .map(|(title, file, duration)| Track {
            title: title.to_string(),
            file: file.to_string(),
            duration_seconds: f64::from(*duration),
            artwork: None,
        })
        .collect()
}

fn cuts(label: &str, file_stem: &str) -> Vec<Cut> {
    ["Station ID", "Promo", "Feature"]
        .iter()
        .enumerate()
        .map(|(idx, kind)| Cut {
            title: format!("{label} {kind}"),
            file: format!("Listening_{file_stem}-{:04}.mp3", idx + 1),
            duration_seconds: 15.0,
        })
        .collect()
}

pub fn config_path() -> PathBuf {
    env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE))
}

pub fn load_config() -> Result<StationConfig> {
    let path = config_path();
    if !path.exists() {
        tracing::debug!("no config at {}, using built-in stations", path.display());
        return Ok(StationConfig::builtin());
    }
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<StationConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: StationConfig = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    config
        .catalog()
        .with_context(|| format!("invalid station catalog in {}", path.display()))?;
    Ok(config)
}

pub fn save_config(path: &Path, config: &StationConfig) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
