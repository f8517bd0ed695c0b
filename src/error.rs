use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StationError {
    #[error("unknown station: {0}")]
    UnknownStation(String),

    #[error("station has no tracks: {0}")]
    EmptyCatalog(String),

    #[error("no media sink bound")]
    Unbound,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("duplicate station: {0}")]
    DuplicateStation(String),

    #[error("station {station} combines unknown station {source_name}")]
    UnknownSource { station: String, source_name: String },

    #[error("station {station} cannot combine derived station {source_name}")]
    DerivedSource { station: String, source_name: String },

    #[error("default station not found: {0}")]
    UnknownDefault(String),

    #[error("catalog has no stations")]
    NoStations,
}
