//! Configuration for the Strata chunk cache and its tools.
//!
//! Settings persist to disk as RON, can be overridden from the command line
//! via clap, and tolerate missing or unknown fields so older files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE_NAME, Config, DebugConfig, SubChunkMerge, WorldConfig, default_config_dir,
    resolve_config_dir,
};
pub use error::ConfigError;
