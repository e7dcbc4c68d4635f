//! Offline inspector for captured chunk payloads.
//!
//! Decodes one level-chunk capture the same way a live session would and
//! prints what was found: inline sub-chunks, biome layers, trailer size and
//! the sub-chunk request that would be sent back.
//!
//! Run with: `cargo run -p strata-inspect -- capture.bin --x 3 --z -7`

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use strata_config::{CliArgs, Config, ConfigError, resolve_config_dir};
use strata_voxel::{BlockResolver, BlockTypeId, Chunk, Dimension};
use strata_world::{ChunkOutcome, LevelChunk, WorldSession};
use tracing::{info, warn};

/// Dimension names accepted on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum DimensionArg {
    #[default]
    Overworld,
    Nether,
    End,
}

impl From<DimensionArg> for Dimension {
    fn from(arg: DimensionArg) -> Self {
        match arg {
            DimensionArg::Overworld => Dimension::Overworld,
            DimensionArg::Nether => Dimension::Nether,
            DimensionArg::End => Dimension::End,
        }
    }
}

/// CLI arguments for the inspector.
#[derive(Parser, Debug)]
#[command(name = "strata-inspect", about = "Decode a captured level-chunk payload")]
struct InspectArgs {
    /// File holding the capture.
    input: PathBuf,

    /// Treat the file as a full level-chunk packet body rather than a bare payload.
    #[arg(long)]
    packet: bool,

    /// Column X (bare payloads only).
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    x: i32,

    /// Column Z (bare payloads only).
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    z: i32,

    /// Dimension (bare payloads only).
    #[arg(long, value_enum, default_value_t = DimensionArg::Overworld)]
    dimension: DimensionArg,

    /// Declared sub-chunk count (bare payloads only).
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    sub_chunk_count: i32,

    /// Declared highest sub-chunk count (bare payloads only).
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    highest: i32,

    /// Print the follow-up request as JSON.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    common: CliArgs,
}

/// Accepts every network id, using the id itself as the handle.
///
/// Captures are inspected without the server's block palette, so nothing
/// can be rejected as unknown.
struct PassthroughResolver {
    air: BlockTypeId,
}

impl BlockResolver for PassthroughResolver {
    fn resolve(&self, network_id: u32) -> Option<BlockTypeId> {
        Some(BlockTypeId(network_id))
    }

    fn air(&self) -> BlockTypeId {
        self.air
    }
}

fn main() -> ExitCode {
    let args = InspectArgs::parse();

    let config_dir = resolve_config_dir(args.common.config.as_deref());
    let (mut config, config_error) = match &config_dir {
        Ok(dir) => load_config(dir),
        Err(_) => (Config::default(), None),
    };
    config.apply_cli_overrides(&args.common);

    strata_log::init_logging(
        config_dir.as_deref().ok(),
        cfg!(debug_assertions),
        Some(&config),
    );
    if let Err(err) = &config_dir {
        warn!(%err, "no config directory, using defaults");
    }
    if let Some(err) = config_error {
        warn!(%err, "config not loaded, using defaults");
    }

    let bytes = match std::fs::read(&args.input) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("cannot read {}: {err}", args.input.display());
            return ExitCode::FAILURE;
        }
    };
    info!(path = %args.input.display(), len = bytes.len(), "loaded capture");

    let packet = if args.packet {
        match LevelChunk::decode(&bytes) {
            Ok(packet) => packet,
            Err(err) => {
                eprintln!("malformed packet: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        LevelChunk {
            x: args.x,
            z: args.z,
            dimension: args.dimension.into(),
            sub_chunk_count: args.sub_chunk_count,
            highest_sub_chunk_count: args.highest,
            data: bytes,
        }
    };

    let resolver = PassthroughResolver {
        air: BlockTypeId(config.world.air_network_id),
    };
    let mut session = WorldSession::new(resolver, &config.world);

    let outcome = match session.handle_level_chunk(&packet) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("malformed payload: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(chunk) = session.store().get_chunk(outcome.pos) {
        print!("{}", render_summary(chunk, &outcome));
    }

    if let Some(request) = &outcome.request {
        if args.json {
            match serde_json::to_string_pretty(request) {
                Ok(json) => println!("{json}"),
                Err(err) => warn!(%err, "could not serialize request"),
            }
        } else {
            let first = request.offsets.first().map(|o| o.y).unwrap_or_default();
            let last = request.offsets.last().map(|o| o.y).unwrap_or_default();
            println!(
                "request: {} offsets ({first}..={last}), {} bytes encoded",
                request.offsets.len(),
                request.encode().len()
            );
        }
    }

    ExitCode::SUCCESS
}

/// Config from `dir`, or the defaults together with the reason loading failed.
fn load_config(dir: &Path) -> (Config, Option<ConfigError>) {
    match Config::load_or_create(dir) {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    }
}

/// Human-readable description of a decoded column.
fn render_summary(chunk: &Chunk, outcome: &ChunkOutcome) -> String {
    let dimension = chunk.dimension();
    let mut out = format!(
        "chunk ({}, {}) {:?}: {} sub-chunks, {} biome layers, {} trailing bytes\n",
        outcome.pos.x,
        outcome.pos.z,
        dimension,
        outcome.sub_chunks,
        outcome.biome_layers,
        outcome.trailing_bytes
    );

    for (slot, sub_chunk) in chunk.sub_chunks().iter().enumerate() {
        let Some(sub_chunk) = sub_chunk else { continue };
        let palettes: Vec<String> = sub_chunk
            .layers()
            .iter()
            .map(|layer| format!("{}@{}b", layer.palette().len(), layer.bits()))
            .collect();
        out.push_str(&format!(
            "  y={:>3} v{} layers=[{}]\n",
            dimension.sub_chunk_y_for_slot(slot),
            sub_chunk.version(),
            palettes.join(", ")
        ));
    }

    out
}
