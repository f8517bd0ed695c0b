use crate::error::CatalogError;
use crate::model::{Cut, Track};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StationDefinition {
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub cuts: Vec<Cut>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub combine: Vec<String>,
}

impl StationDefinition {
    pub fn is_derived(&self) -> bool {
        !self.combine.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationCatalog {
    pub name: String,
    pub tracks: Vec<Track>,
    pub cuts: Vec<Cut>,
    pub derived: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    stations: Vec<StationCatalog>,
    default_station: String,
}

impl Catalog {
    pub fn build(
        definitions: &[StationDefinition],
        default_station: &str,
    ) -> Result<Self, CatalogError> {
        if definitions.is_empty() {
            return Err(CatalogError::NoStations);
        }

        let mut seen = HashSet::with_capacity(definitions.len());
        for definition in definitions {
            if !seen.insert(definition.name.as_str()) {
                return Err(CatalogError::DuplicateStation(definition.name.clone()));
            }
        }

        let mut stations = Vec::with_capacity(definitions.len());
        for definition in definitions {
            let tracks = if definition.is_derived() {
                combined_tracks(definition, definitions)?
            } else {
                definition.tracks.clone()
            };
            if tracks.is_empty() {
                tracing::warn!("station {} has no tracks", definition.name);
            }
            stations.push(StationCatalog {
                name: definition.name.clone(),
                tracks,
                cuts: definition.cuts.clone(),
                derived: definition.is_derived(),
            });
        }

        if !stations.iter().any(|station| station.name == default_station) {
            return Err(CatalogError::UnknownDefault(default_station.to_string()));
        }

        Ok(Self {
            stations,
            default_station: default_station.to_string(),
        })
    }

    pub fn station(&self, name: &str) -> Option<&StationCatalog> {
        self.stations.iter().find(|station| station.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stations.iter().map(|station| station.name.as_str())
    }

    pub fn default_station(&self) -> &str {
        &self.default_station
    }
}

fn combined_tracks(
    definition: &StationDefinition,
    definitions: &[StationDefinition],
) -> Result<Vec<Track>, CatalogError> {
    if !definition.tracks.is_empty() {
        tracing::warn!(
            "station {} combines other stations; its own track list is ignored",
            definition.name
        );
    }

    let mut tracks = Vec::new();
    for source_name in &definition.combine {
        let Some(source) = definitions.iter().find(|d| &d.name == source_name) else {
            return Err(CatalogError::UnknownSource {
                station: definition.name.clone(),
                source_name: source_name.clone(),
            });
        };
        if source.is_derived() {
            return Err(CatalogError::DerivedSource {
                station: definition.name.clone(),
                source_name: source_name.clone(),
            });
        }
        tracks.extend(source.tracks.iter().cloned());
    }
    Ok(tracks)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetLayout {
    base: String,
}

impl AssetLayout {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn track_uri(&self, track: &Track) -> String {
        format!("{}/audio/{}", self.base, track.file)
    }

    pub fn cut_uri(&self, cut: &Cut) -> String {
        format!("{}/audio/cuts/{}", self.base, cut.file)
    }

    pub fn artwork_uri(&self, artwork: &str) -> String {
        format!("{}/img/{}", self.base, artwork)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(file: &str) -> Track {
        Track {
            title: file.to_string(),
            file: file.to_string(),
            duration_seconds: 1.0,
            artwork: None,
        }
    }

    fn base(name: &str, files: &[&str]) -> StationDefinition {
        StationDefinition {
            name: name.to_string(),
            tracks: files.iter().map(|file| track(file)).collect(),
            ..StationDefinition::default()
        }
    }

    fn derived(name: &str, sources: &[&str]) -> StationDefinition {
        StationDefinition {
            name: name.to_string(),
            combine: sources.iter().map(|s| s.to_string()).collect(),
            ..StationDefinition::default()
        }
    }

    #[test]
    fn derived_station_concatenates_sources_in_order() {
        let catalog = Catalog::build(
            &[
                base("instrumental", &["a", "b"]),
                base("vocals", &["c"]),
                derived("mixed", &["instrumental", "vocals"]),
            ],
            "mixed",
        )
        .expect("catalog");

        let mixed = catalog.station("mixed").expect("mixed");
        let files: Vec<&str> = mixed.tracks.iter().map(|t| t.file.as_str()).collect();
        assert_eq!(files, vec!["a", "b", "c"]);
        assert!(mixed.derived);
    }

    #[test]
    fn rejects_duplicate_station_names() {
        let err = Catalog::build(&[base("a", &["x"]), base("a", &["y"])], "a")
            .expect_err("duplicate");
        assert_eq!(err, CatalogError::DuplicateStation(String::from("a")));
    }

    #[test]
    fn rejects_unknown_and_derived_sources() {
        let err = Catalog::build(&[derived("mixed", &["nope"])], "mixed").expect_err("unknown");
        assert!(matches!(err, CatalogError::UnknownSource { .. }));

        let err = Catalog::build(
            &[
                base("a", &["x"]),
                derived("b", &["a"]),
                derived("c", &["b"]),
            ],
            "a",
        )
        .expect_err("derived");
        assert!(matches!(err, CatalogError::DerivedSource { .. }));
    }

    #[test]
    fn rejects_unknown_default() {
        let err = Catalog::build(&[base("a", &["x"])], "b").expect_err("default");
        assert_eq!(err, CatalogError::UnknownDefault(String::from("b")));
    }

    #[test]
    fn empty_station_is_allowed() {
        let catalog = Catalog::build(&[base("a", &["x"]), base("quiet", &[])], "a")
            .expect("catalog");
        assert!(catalog.station("quiet").expect("quiet").tracks.is_empty());
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["a", "quiet"]);
    }

    #[test]
    fn asset_paths_follow_host_layout() {
        let layout = AssetLayout::default();
        let cut = Cut {
            title: String::from("ID"),
            file: String::from("id.mp3"),
            duration_seconds: 15.0,
        };
        assert_eq!(layout.track_uri(&track("song.mp3")), "/audio/song.mp3");
        assert_eq!(layout.cut_uri(&cut), "/audio/cuts/id.mp3");
        assert_eq!(layout.artwork_uri("song.jpg"), "/img/song.jpg");

        let hosted = AssetLayout::new("https://cdn.example.org/radio/");
        assert_eq!(
            hosted.track_uri(&track("song.mp3")),
            "https://cdn.example.org/radio/audio/song.mp3"
        );
    }
}
