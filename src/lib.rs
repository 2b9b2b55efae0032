//! # Nuggets - multi-player treasure hunt with fog of war
//!
//! Nuggets is an authoritative game server. Up to 26 players and one
//! spectator connect over UDP to a shared dungeon, walk around it, and race to
//! pick up piles of gold. Each player only sees what is in their line of
//! sight and remembers the terrain they have already seen.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nuggets::config::Config;
//! use nuggets::game::{GameState, Grid};
//! use nuggets::server::GameServer;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let map = Grid::load("maps/main.txt")?;
//!     let game = GameState::new(map, config.game.clone(), StdRng::seed_from_u64(42))?;
//!
//!     let mut server = GameServer::new(config, game).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - grids, visibility, players and the game state machine
//! - [`server`] - UDP transport feeding the game
//! - [`config`] - configuration loading and validation
//! - [`validation`] - player name and seed validation
//! - [`logutil`] - single-line escaping for client text in logs
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   GameServer    │ ← UDP socket, one datagram per command
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   GameState     │ ← Commands, gold, roster, spectator
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │ Grid/Visibility │ ← Map storage and line-of-sight
//! └─────────────────┘
//! ```

pub mod config;
pub mod game;
pub mod logutil;
pub mod server;
pub mod validation;
