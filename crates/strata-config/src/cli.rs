//! Command-line overrides shared by Strata binaries.

use std::path::PathBuf;

use clap::Args;

use crate::{Config, SubChunkMerge};

/// Common command-line arguments.
///
/// CLI values override settings loaded from `config.ron`. Binaries flatten
/// this into their own argument struct.
#[derive(Args, Debug, Default, Clone)]
pub struct CliArgs {
    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// How sub-chunk responses are merged into columns.
    #[arg(long, value_enum)]
    pub merge: Option<SubChunkMerge>,

    /// Network block id of air.
    #[arg(long)]
    pub air_id: Option<u32>,

    /// Do not request sub-chunks missing from a column payload.
    #[arg(long)]
    pub no_requests: bool,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(merge) = args.merge {
            self.world.sub_chunk_merge = merge;
        }
        if let Some(air) = args.air_id {
            self.world.air_network_id = air;
        }
        if args.no_requests {
            self.world.request_missing_sub_chunks = false;
        }
    }
}
