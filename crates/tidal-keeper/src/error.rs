//! Error types for the keeper service

use thiserror::Error;

use tidal_core::TidalCoreError;

#[derive(Error, Debug)]
pub enum KeeperError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("controller error: {0}")]
    Controller(#[from] TidalCoreError),
}
