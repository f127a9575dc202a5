use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{eyre, Result};
use forest_core::{
    load_parameters_from_env, load_zone_config_from_env, AgentId, CaptureZoneGenerator, ChunkMiner,
    DiscoveryOutcome, ExplorationPattern, DEFAULT_CHUNK_SIZE,
};
use forest_prover::{
    load_prover_config_from_env, ProofMode, ProofPipeline, SnarkjsCliBackend, WitnessBuilder,
};
use forest_schema::{ChunkFootprint, Coordinate};
use serde::Serialize;
use serde_json::json;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Forest discovery and proving tool", long_about = None)]
struct Cli {
    /// Agent identity used for discovery bookkeeping.
    #[arg(long, default_value = "local")]
    agent: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mine a single chunk.
    #[command(allow_negative_numbers = true)]
    Mine {
        #[arg(long)]
        x: i64,
        #[arg(long)]
        y: i64,
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        side: u32,
        /// Treat `x,y` as the chunk center instead of its bottom-left corner.
        #[arg(long)]
        centered: bool,
    },
    /// Mine chunks along an exploration pattern.
    #[command(allow_negative_numbers = true)]
    Explore {
        #[arg(long, value_enum, default_value_t = PatternKind::Spiral)]
        pattern: PatternKind,
        #[arg(long, default_value_t = 0)]
        x: i64,
        #[arg(long, default_value_t = 0)]
        y: i64,
        /// Top-right corner for rectangular exploration.
        #[arg(long)]
        to_x: Option<i64>,
        #[arg(long)]
        to_y: Option<i64>,
        /// Radius for radial exploration; sizes the default budget of a spiral.
        #[arg(long)]
        radius: Option<f64>,
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: u32,
        #[arg(long)]
        max_chunks: Option<usize>,
    },
    /// Show the capture zones active at a block.
    #[command(allow_negative_numbers = true)]
    Zones {
        block: u64,
        /// Report which zone, if any, contains `x,y`.
        #[arg(long, requires = "y")]
        x: Option<i64>,
        #[arg(long, requires = "x")]
        y: Option<i64>,
    },
    /// Generate a proof for an action.
    #[command(allow_negative_numbers = true)]
    Prove {
        #[arg(value_enum)]
        kind: ProveKind,
        #[arg(long)]
        x: i64,
        #[arg(long)]
        y: i64,
        /// Destination for move proofs.
        #[arg(long)]
        to_x: Option<i64>,
        #[arg(long)]
        to_y: Option<i64>,
        #[arg(long, default_value_t = 0)]
        r: u64,
        #[arg(long, default_value_t = 0)]
        dist_max: u64,
        /// Return an all-zero proof without running the prover.
        #[arg(long)]
        mock: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PatternKind {
    Spiral,
    Rectangular,
    Radial,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ProveKind {
    Join,
    Move,
    Reveal,
    FindArtifact,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (params, params_source) = load_parameters_from_env();
    info!(builtin = params_source.is_builtin(), "parameters.loaded");
    let agent = AgentId::new(cli.agent);

    match cli.command {
        Command::Mine {
            x,
            y,
            side,
            centered,
        } => {
            let miner = ChunkMiner::new(params)?;
            let corner = Coordinate::new(x, y);
            let footprint = if centered {
                ChunkFootprint::centered(corner, side)
            } else {
                ChunkFootprint::new(corner, side)
            };
            let outcome = miner.discover(footprint, &agent)?;
            let output = match outcome {
                DiscoveryOutcome::Mined(chunk) => json!({ "outcome": "mined", "chunk": chunk }),
                other => json!({ "outcome": other.label() }),
            };
            print_json(&output)?;
        }
        Command::Explore {
            pattern,
            x,
            y,
            to_x,
            to_y,
            radius,
            chunk_size,
            max_chunks,
        } => {
            let miner = ChunkMiner::new(params)?;
            let origin = Coordinate::new(x, y);
            let pattern = match pattern {
                PatternKind::Spiral => ExplorationPattern::Spiral {
                    center: origin,
                    chunk_size,
                    radius,
                },
                PatternKind::Rectangular => ExplorationPattern::Rectangular {
                    bottom_left: origin,
                    top_right: Coordinate::new(
                        to_x.ok_or_else(|| eyre!("rectangular exploration needs --to-x"))?,
                        to_y.ok_or_else(|| eyre!("rectangular exploration needs --to-y"))?,
                    ),
                    chunk_size,
                },
                PatternKind::Radial => ExplorationPattern::Radial {
                    center: origin,
                    radius: radius.ok_or_else(|| eyre!("radial exploration needs --radius"))?,
                    chunk_size,
                },
            };
            let report = miner.explore(&agent, &pattern, max_chunks)?;
            print_json(&report)?;
        }
        Command::Zones { block, x, y } => {
            let (zone_config, _) = load_zone_config_from_env();
            let generator = CaptureZoneGenerator::new(zone_config, params.world_radius)?;
            generator.generate(block);
            let containing = match (x, y) {
                (Some(x), Some(y)) => generator.zone_containing(Coordinate::new(x, y)),
                _ => None,
            };
            print_json(&json!({
                "changeBlock": generator.snapshot().last_change_block,
                "nextChangeBlock": generator.next_change_block(block),
                "zones": generator.zones(),
                "containing": containing,
            }))?;
        }
        Command::Prove {
            kind,
            x,
            y,
            to_x,
            to_y,
            r,
            dist_max,
            mock,
        } => {
            let (mut config, _) = load_prover_config_from_env();
            if mock {
                config.mode = ProofMode::Mock;
            }
            let builder = WitnessBuilder::new(params);
            let at = Coordinate::new(x, y);
            let witness = match kind {
                ProveKind::Join => builder.join(at, r),
                ProveKind::Move => {
                    let to = Coordinate::new(
                        to_x.ok_or_else(|| eyre!("move proofs need --to-x"))?,
                        to_y.ok_or_else(|| eyre!("move proofs need --to-y"))?,
                    );
                    builder.movement(at, to, r, dist_max)
                }
                ProveKind::Reveal => builder.reveal(at),
                ProveKind::FindArtifact => builder.find_artifact(at),
            };
            let backend = SnarkjsCliBackend::new(config.prover_command.clone(), config.scratch_root());
            let pipeline = ProofPipeline::spawn(config, Arc::new(backend));
            let artifact = pipeline.submit(witness).await?;
            print_json(&artifact)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
