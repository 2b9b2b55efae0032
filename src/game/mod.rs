//! # Game Module
//!
//! Everything that decides what happens in a Nuggets game, independent of
//! the network.
//!
//! ## Components
//!
//! - [`grid`] - dungeon maps, symbols and gold placement
//! - [`visibility`] - line-of-sight and per-player fog of war
//! - [`player`] - player ids and per-player state
//! - [`command`] - parsing `SPECTATE`, `PLAY` and `KEY` messages
//! - [`state`] - the authoritative [`GameState`] that applies commands
//! - [`errors`] - rejection and setup errors
//!
//! ## Message flow
//!
//! ```text
//! datagram text ──► parse_command ──► GameState::handle ──► Vec<Outbound>
//!                                          │
//!                                          └── recompute_visibility per player
//! ```

pub mod command;
pub mod errors;
pub mod grid;
pub mod player;
pub mod state;
pub mod visibility;

pub use command::{parse_command, ClientCommand, Direction, Keystroke};
pub use errors::{GameError, SetupError};
pub use grid::{Grid, GridError, Position, Symbol};
pub use player::{Player, PlayerId};
pub use state::{GameState, Outbound};
pub use visibility::{is_visible, recompute_visibility};
