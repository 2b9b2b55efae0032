use std::fmt;

use super::grid::{Grid, Position};

/// Single-letter player identity, `'A'` through `'Z'`, handed out in join order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerId(char);

impl PlayerId {
    pub const FIRST: PlayerId = PlayerId('A');

    /// Highest number of ids that can ever be handed out.
    pub const CAPACITY: usize = 26;

    pub fn new(ch: char) -> Option<Self> {
        ch.is_ascii_uppercase().then_some(PlayerId(ch))
    }

    pub fn as_char(self) -> char {
        self.0
    }

    /// The id after this one, or `None` once `'Z'` is used up.
    pub fn next(self) -> Option<Self> {
        char::from_u32(self.0 as u32 + 1).and_then(PlayerId::new)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A joined player. `A` is the transport's recipient handle.
///
/// The player owns its visibility grid; it is dropped together with the
/// player when the game tears down.
#[derive(Debug, Clone)]
pub struct Player<A> {
    id: PlayerId,
    name: String,
    recipient: A,
    row: usize,
    col: usize,
    gold: u32,
    visibility: Grid,
    has_quit: bool,
}

impl<A> Player<A> {
    pub fn new(id: PlayerId, name: String, recipient: A, at: Position, visibility: Grid) -> Self {
        Self {
            id,
            name,
            recipient,
            row: at.0,
            col: at.1,
            gold: 0,
            visibility,
            has_quit: false,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn recipient(&self) -> &A {
        &self.recipient
    }

    pub fn position(&self) -> Position {
        (self.row, self.col)
    }

    pub fn gold(&self) -> u32 {
        self.gold
    }

    pub fn visibility(&self) -> &Grid {
        &self.visibility
    }

    pub fn has_quit(&self) -> bool {
        self.has_quit
    }

    pub fn is_active(&self) -> bool {
        !self.has_quit
    }

    pub(crate) fn visibility_mut(&mut self) -> &mut Grid {
        &mut self.visibility
    }

    pub(crate) fn move_to(&mut self, at: Position) {
        self.row = at.0;
        self.col = at.1;
    }

    pub(crate) fn add_gold(&mut self, nuggets: u32) {
        self.gold += nuggets;
    }

    pub(crate) fn quit(&mut self) {
        self.has_quit = true;
    }
}
