/***************************************/
/*        3rd party libraries          */
/***************************************/
use std::path::PathBuf;
use thiserror::Error;

/***************************************/
/*               Errors                */
/***************************************/
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ElevatorError {
    #[error("invalid floor {0}, must be 1 or 2")]
    InvalidFloor(u8),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to initialise log store at {path}: {source}")]
    Init {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write log: {0}")]
    Write(#[source] rusqlite::Error),

    #[error("failed to read logs: {0}")]
    Read(#[source] rusqlite::Error),

    #[error("log store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export file: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}
