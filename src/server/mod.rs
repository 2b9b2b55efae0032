//! # Server Module
//!
//! UDP transport for a single Nuggets game.
//!
//! - [`game_server`] - [`GameServer`], the socket loop that feeds datagrams
//!   into the game and sends the replies
//!
//! ## Usage
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
//!     let game = GameState::new(map, config.game.clone(), StdRng::from_entropy())?;
//!     let mut server = GameServer::new(config, game).await?;
//!     server.run().await
//! }
//! ```
//!
//! Each datagram carries exactly one command. A client is identified by the
//! address its datagrams come from, so replies go straight back to that
//! address.

pub mod game_server;

pub use game_server::GameServer;
