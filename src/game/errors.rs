use thiserror::Error;

use super::grid::GridError;
use super::player::PlayerId;

/// Rejections of a single client command. None of these change world state;
/// the sender gets [`GameError::notice`] and play continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// All player ids are taken.
    #[error("game is full")]
    GameFull,

    /// Name was empty after sanitizing.
    #[error("player name is empty")]
    InvalidName,

    /// The sender already controls an active player.
    #[error("sender is already playing as {0}")]
    AlreadyPlaying(PlayerId),

    /// No free room floor was found to spawn on.
    #[error("no free floor to spawn on")]
    NoSpawnPoint,

    /// The move would leave the map or walk into rock or a boundary.
    #[error("move blocked")]
    Blocked,

    /// Spectators may only quit.
    #[error("spectators cannot move")]
    SpectatorCannotMove,

    #[error("unknown keystroke {0:?}")]
    UnknownKey(String),

    #[error("invalid action")]
    InvalidAction,
}

impl GameError {
    /// Wire text sent back to the offending client.
    pub fn notice(&self) -> String {
        match self {
            GameError::GameFull => "QUIT Game is full: no more players can join.".into(),
            GameError::InvalidName => "QUIT Sorry - you must provide player's name.".into(),
            GameError::AlreadyPlaying(id) => format!("ERROR you are already playing as {id}"),
            GameError::NoSpawnPoint => "QUIT Sorry - there is no room left in the dungeon.".into(),
            GameError::Blocked => "ERROR you cannot move there".into(),
            GameError::SpectatorCannotMove => "ERROR spectators cannot move".into(),
            GameError::UnknownKey(_) => "ERROR unknown keystroke".into(),
            GameError::InvalidAction => "ERROR invalid action provided".into(),
        }
    }
}

/// Problems building the initial world. These are fatal at startup.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("the map holds no gold piles")]
    NoGold,

    #[error("{piles} gold piles cannot share {nuggets} nuggets")]
    TooManyPiles { piles: usize, nuggets: u32 },

    #[error("static and live grids differ in shape")]
    ShapeMismatch,
}
