use crate::world::Position;
use schema::Species;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the species catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse species catalog: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("species catalog has no entry for {0}")]
    MissingSpecies(Species),
    #[error("species catalog lists {0} more than once")]
    DuplicateSpecies(Species),
    #[error("invalid species entry: {0}")]
    InvalidEntry(String),
}

/// Errors raised by the save-slot key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read save file {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write save file {path:?}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("save data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save entry '{key}' is corrupt: {reason}")]
    CorruptEntry { key: String, reason: String },
}

/// Errors raised while loading the game configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse game config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("failed to read game config from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid game config: {0}")]
    Invalid(String),
}

/// Errors raised while parsing a tile map.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("tile map has no rows")]
    Empty,
    #[error("tile map row {row} has width {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown tile '{tile}' at row {row}, column {column}")]
    UnknownTile {
        tile: char,
        row: usize,
        column: usize,
    },
    #[error("spawn {0} is outside the map or inside a wall")]
    BlockedSpawn(Position),
}

/// A typed command the text driver could not turn into a player intent.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognised command '{0}'")]
pub struct UnknownCommand(pub String);

/// Type alias for Results using StoreError
pub type StoreResult<T> = Result<T, StoreError>;

/// Type alias for Results using CatalogError
pub type CatalogResult<T> = Result<T, CatalogError>;
