//! Errors raised outside the tree core

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog fixture: {0}")]
    Fixture(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
