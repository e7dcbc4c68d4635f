//! Errors from loading, saving and locating configuration.

use std::io;

/// Configuration failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `config.ron` exists but could not be read.
    #[error("failed to read config: {0}")]
    ReadError(#[source] io::Error),

    /// The config directory or file could not be written.
    #[error("failed to write config: {0}")]
    WriteError(#[source] io::Error),

    /// `config.ron` is not valid RON for [`Config`](crate::Config).
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// The config could not be rendered as RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// No `--config` was given and the platform has no config directory.
    #[error("no config directory available; pass --config")]
    NoConfigDir,
}
