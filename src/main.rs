//! Binary entrypoint for the Nuggets game server.
//!
//! Commands:
//! - `start <MAP> [SEED] [--port <n>]` - load a map, scatter gold and serve one game over UDP
//! - `init` - write a starter `config.toml`
//! - `check <MAP>` - validate a map file and print a JSON summary
//!
//! See the library crate docs for module-level details: `nuggets::`.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;

use nuggets::config::Config;
use nuggets::game::{GameState, Grid, Symbol};
use nuggets::server::GameServer;
use nuggets::validation::parse_seed;

#[derive(Parser)]
#[command(name = "nuggets")]
#[command(about = "Multi-player treasure hunt server with line-of-sight fog of war")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a game on the given map
    Start {
        /// Map file
        map: String,

        /// Positive integer seed for a reproducible game
        seed: Option<String>,

        /// UDP port to listen on (overrides the config file; 0 picks one)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Write a default configuration file
    Init,
    /// Load a map and print its dimensions and cell counts
    Check {
        /// Map file
        map: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start { map, seed, port } => {
            let config_missing = !Path::new(&cli.config).exists();
            let mut config = if config_missing {
                Config::default()
            } else {
                Config::load(&cli.config).await?
            };
            init_logging(&Some(config.clone()), cli.verbose);
            if config_missing {
                warn!("Config file {} not found; using defaults", cli.config);
            }
            info!("Starting Nuggets v{}", env!("CARGO_PKG_VERSION"));

            if let Some(port) = port {
                config.server.port = port;
            }
            let rng = match seed {
                Some(raw) => {
                    let seed = parse_seed(&raw).context("Invalid seed")?;
                    info!("Using seed {}", seed);
                    StdRng::seed_from_u64(seed)
                }
                None => StdRng::from_entropy(),
            };

            let grid = Grid::load(&map).with_context(|| format!("Failed to load map {}", map))?;
            info!("Loaded map {} ({}x{})", map, grid.rows(), grid.cols());
            let game = GameState::new(grid, config.game.clone(), rng)
                .with_context(|| format!("Failed to set up a game on {}", map))?;

            let mut server = GameServer::new(config, game).await?;
            let addr = server.bind().await?;
            println!("Ready to play, waiting at port {}", addr.port());
            server.run().await?;
        }
        Commands::Init => {
            init_logging(&None, cli.verbose);
            info!("Writing default configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::Check { map } => {
            init_logging(&None, cli.verbose);
            let grid = Grid::load(&map).with_context(|| format!("Failed to load map {}", map))?;
            let payload = serde_json::json!({
                "map": map,
                "rows": grid.rows(),
                "cols": grid.cols(),
                "floor_cells": grid.count(Symbol::RoomFloor),
                "passage_cells": grid.count(Symbol::Passage),
            });
            println!("{}", payload);
        }
    }

    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity wins over the configured level
    let configured = config
        .as_ref()
        .and_then(|cfg| cfg.logging.level.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    let base_level = match verbosity {
        0 => configured,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });

    match log_file {
        Some(f) => {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            // Echo to the console only when someone is watching it
            let is_tty = atty::is(atty::Stream::Stdout);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                writeln!(
                    fmt,
                    "{} [{}] {}",
                    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                    record.level(),
                    record.args()
                )
            });
        }
    }
    let _ = builder.try_init();
}
