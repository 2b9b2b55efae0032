//! The authoritative game.
//!
//! [`GameState`] owns the dungeon, the roster and the spectator slot. Every
//! client command goes through [`GameState::handle`], which runs it to
//! completion and returns the messages to send. Nothing in here touches the
//! network; the transport decides what a recipient handle `A` is.

use std::collections::BTreeMap;
use std::fmt::Debug;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::Rng;

use super::command::{parse_command, ClientCommand, Direction, Keystroke};
use super::errors::{GameError, SetupError};
use super::grid::{Grid, Position, Symbol};
use super::player::{Player, PlayerId};
use super::visibility::recompute_visibility;
use crate::config::GameConfig;
use crate::logutil::escape_log;
use crate::validation::sanitize_player_name;

/// One message for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound<A> {
    pub to: A,
    pub text: String,
}

impl<A> Outbound<A> {
    fn new(to: A, text: impl Into<String>) -> Self {
        Self {
            to,
            text: text.into(),
        }
    }
}

enum Handled {
    Done,
    Ignored,
}

pub struct GameState<A> {
    settings: GameConfig,
    static_grid: Grid,
    live_grid: Grid,
    players: BTreeMap<PlayerId, Player<A>>,
    spectator: Option<A>,
    piles_remaining: usize,
    nuggets_remaining: u32,
    next_id: Option<PlayerId>,
    rng: StdRng,
    over: bool,
}

impl<A: Clone + PartialEq + Debug> GameState<A> {
    /// Start a game on `map`, scattering fresh gold over its room floor.
    pub fn new(map: Grid, settings: GameConfig, mut rng: StdRng) -> Result<Self, SetupError> {
        let static_grid = bare_terrain(&map);
        let mut live_grid = static_grid.clone();
        let piles = live_grid.scatter_gold(
            &mut rng,
            settings.gold_min_piles,
            settings.gold_max_piles,
            settings.placement_attempts,
        )?;
        info!(
            "Scattered {} nuggets over {} piles on a {}x{} map",
            settings.gold_total,
            piles,
            static_grid.rows(),
            static_grid.cols()
        );
        Self::assemble(static_grid, live_grid, piles, settings, rng)
    }

    /// Start a game from a hand-placed layout. `live` supplies the gold piles;
    /// any player letters in either grid are treated as floor.
    pub fn from_layout(
        static_grid: Grid,
        live: Grid,
        settings: GameConfig,
        rng: StdRng,
    ) -> Result<Self, SetupError> {
        if (static_grid.rows(), static_grid.cols()) != (live.rows(), live.cols()) {
            return Err(SetupError::ShapeMismatch);
        }
        let terrain = bare_terrain(&static_grid);
        let mut live_grid = terrain.clone();
        for (row, col) in live.positions() {
            if live.get(row, col) == Some(Symbol::GoldPile) {
                live_grid.set(row, col, Symbol::GoldPile);
            }
        }
        let piles = live_grid.count(Symbol::GoldPile);
        Self::assemble(terrain, live_grid, piles, settings, rng)
    }

    fn assemble(
        static_grid: Grid,
        live_grid: Grid,
        piles: usize,
        settings: GameConfig,
        rng: StdRng,
    ) -> Result<Self, SetupError> {
        if piles == 0 {
            return Err(SetupError::NoGold);
        }
        if piles > settings.gold_total as usize {
            return Err(SetupError::TooManyPiles {
                piles,
                nuggets: settings.gold_total,
            });
        }
        Ok(Self {
            nuggets_remaining: settings.gold_total,
            piles_remaining: piles,
            settings,
            static_grid,
            live_grid,
            players: BTreeMap::new(),
            spectator: None,
            next_id: Some(PlayerId::FIRST),
            rng,
            over: false,
        })
    }

    pub fn static_grid(&self) -> &Grid {
        &self.static_grid
    }

    pub fn live_grid(&self) -> &Grid {
        &self.live_grid
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player<A>> {
        self.players.get(&id)
    }

    /// Every player that ever joined, in join order.
    pub fn players(&self) -> impl Iterator<Item = &Player<A>> {
        self.players.values()
    }

    /// The active (not quit) player controlled by `who`.
    pub fn player_by_recipient(&self, who: &A) -> Option<&Player<A>> {
        self.players
            .values()
            .find(|p| p.is_active() && p.recipient() == who)
    }

    pub fn spectator(&self) -> Option<&A> {
        self.spectator.as_ref()
    }

    pub fn nuggets_remaining(&self) -> u32 {
        self.nuggets_remaining
    }

    pub fn piles_remaining(&self) -> usize {
        self.piles_remaining
    }

    pub fn gold_total(&self) -> u32 {
        self.settings.gold_total
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Apply one raw client message and collect everything that must be sent.
    pub fn handle(&mut self, from: A, raw: &str) -> Vec<Outbound<A>> {
        let mut out = Vec::new();
        if self.over {
            debug!("Game over, ignoring message from {:?}", from);
            return out;
        }

        let command = parse_command(raw);
        match self.dispatch(&from, command, &mut out) {
            Ok(Handled::Done) => {}
            Ok(Handled::Ignored) => return out,
            Err(e) => {
                debug!("Rejected command from {:?}: {}", from, e);
                out.push(Outbound::new(from, e.notice()));
            }
        }

        self.push_displays(&mut out);
        if self.nuggets_remaining == 0 {
            self.finish(&mut out);
        }
        out
    }

    fn dispatch(
        &mut self,
        from: &A,
        command: ClientCommand,
        out: &mut Vec<Outbound<A>>,
    ) -> Result<Handled, GameError> {
        match command {
            ClientCommand::Play(name) => self.join(from, &name, out).map(|_| Handled::Done),
            ClientCommand::Spectate => self.spectate(from, out).map(|_| Handled::Done),
            ClientCommand::Key(key) => self.key(from, key, out),
            ClientCommand::Invalid => Err(GameError::InvalidAction),
        }
    }

    fn join(
        &mut self,
        from: &A,
        raw_name: &str,
        out: &mut Vec<Outbound<A>>,
    ) -> Result<(), GameError> {
        let capacity = self.settings.max_players.min(PlayerId::CAPACITY);
        let id = match self.next_id {
            Some(id) if self.players.len() < capacity => id,
            _ => return Err(GameError::GameFull),
        };
        let name = sanitize_player_name(raw_name, self.settings.max_name_length)
            .map_err(|_| GameError::InvalidName)?;
        if let Some(existing) = self.player_by_recipient(from) {
            return Err(GameError::AlreadyPlaying(existing.id()));
        }
        let at = self
            .live_grid
            .random_cell_matching(
                &mut self.rng,
                Symbol::RoomFloor,
                self.settings.placement_attempts,
            )
            .ok_or(GameError::NoSpawnPoint)?;

        if self.spectator.as_ref() == Some(from) {
            debug!("Spectator {:?} is joining as a player", from);
            self.spectator = None;
        }
        self.next_id = id.next();
        self.live_grid.set(at.0, at.1, Symbol::PlayerMarker(id));
        let visibility = Grid::filled_like(&self.static_grid, Symbol::Wall);
        self.players
            .insert(id, Player::new(id, name, from.clone(), at, visibility));
        info!(
            "Player {} '{}' joined from {:?} at {:?}",
            id,
            escape_log(self.players[&id].name()),
            from,
            at
        );

        out.push(Outbound::new(from.clone(), format!("OK {}", id)));
        out.push(Outbound::new(from.clone(), self.grid_message()));
        out.push(Outbound::new(
            from.clone(),
            format!("GOLD 0 0 {}", self.nuggets_remaining),
        ));
        self.refresh_views();
        Ok(())
    }

    fn spectate(&mut self, from: &A, out: &mut Vec<Outbound<A>>) -> Result<(), GameError> {
        if let Some(player) = self.player_by_recipient(from) {
            return Err(GameError::AlreadyPlaying(player.id()));
        }
        if let Some(old) = self.spectator.replace(from.clone()) {
            if &old != from {
                info!("Spectator {:?} replaced by {:?}", old, from);
                out.push(Outbound::new(
                    old,
                    "QUIT You have been replaced by a new spectator.",
                ));
            }
        } else {
            info!("Spectator {:?} started watching", from);
        }
        out.push(Outbound::new(from.clone(), self.grid_message()));
        out.push(Outbound::new(
            from.clone(),
            format!("GOLD 0 0 {}", self.nuggets_remaining),
        ));
        Ok(())
    }

    fn key(
        &mut self,
        from: &A,
        key: Keystroke,
        out: &mut Vec<Outbound<A>>,
    ) -> Result<Handled, GameError> {
        let player = self.player_by_recipient(from).map(|p| p.id());
        let watching = self.spectator.as_ref() == Some(from);

        let Some(id) = player else {
            if !watching {
                debug!("Ignoring key from unknown sender {:?}", from);
                return Ok(Handled::Ignored);
            }
            return match key {
                Keystroke::Quit => {
                    info!("Spectator {:?} left", from);
                    self.spectator = None;
                    out.push(Outbound::new(from.clone(), "QUIT Thanks for watching!"));
                    Ok(Handled::Done)
                }
                Keystroke::Unknown(code) => Err(GameError::UnknownKey(code)),
                Keystroke::Step(_) | Keystroke::Run(_) => Err(GameError::SpectatorCannotMove),
            };
        };

        match key {
            Keystroke::Quit => {
                self.quit_player(id);
                out.push(Outbound::new(from.clone(), "QUIT Thanks for playing!"));
                Ok(Handled::Done)
            }
            Keystroke::Step(dir) => self.step(id, dir, out).map(|_| Handled::Done),
            Keystroke::Run(dir) => {
                let mut moved = 0usize;
                while self.nuggets_remaining > 0 && self.step(id, dir, out).is_ok() {
                    moved += 1;
                }
                debug!("Player {} ran {} steps {:?}", id, moved, dir);
                if moved == 0 {
                    return Err(GameError::Blocked);
                }
                Ok(Handled::Done)
            }
            Keystroke::Unknown(code) => Err(GameError::UnknownKey(code)),
        }
    }

    fn quit_player(&mut self, id: PlayerId) {
        let Some(player) = self.players.get_mut(&id) else {
            return;
        };
        let (row, col) = player.position();
        player.quit();
        info!("Player {} quit with {} nuggets", id, player.gold());
        if let Some(terrain) = self.static_grid.get(row, col) {
            self.live_grid.set(row, col, terrain);
        }
        self.refresh_views();
    }

    /// Move one cell. Nothing changes unless the step is accepted.
    fn step(
        &mut self,
        id: PlayerId,
        dir: Direction,
        out: &mut Vec<Outbound<A>>,
    ) -> Result<(), GameError> {
        let from = self
            .players
            .get(&id)
            .map(|p| p.position())
            .ok_or(GameError::InvalidAction)?;
        let dest = self
            .live_grid
            .offset(from, dir.delta())
            .ok_or(GameError::Blocked)?;
        let target = self
            .live_grid
            .get(dest.0, dest.1)
            .ok_or(GameError::Blocked)?;
        if target.blocks_movement() {
            return Err(GameError::Blocked);
        }

        self.clear_markers();
        match target {
            Symbol::GoldPile => {
                self.collect(id, dest, out);
                self.move_player(id, dest);
            }
            Symbol::PlayerMarker(other) if other != id => {
                debug!("Player {} swaps places with {}", id, other);
                self.move_player(other, from);
                self.move_player(id, dest);
            }
            _ => self.move_player(id, dest),
        }
        self.place_markers();
        self.refresh_views();
        Ok(())
    }

    fn move_player(&mut self, id: PlayerId, to: Position) {
        if let Some(player) = self.players.get_mut(&id) {
            player.move_to(to);
        }
    }

    fn collect(&mut self, id: PlayerId, at: Position, out: &mut Vec<Outbound<A>>) {
        self.piles_remaining = self.piles_remaining.saturating_sub(1);
        let nuggets = self.draw_pile();
        self.nuggets_remaining -= nuggets;
        self.live_grid.set(at.0, at.1, Symbol::RoomFloor);

        let remaining = self.nuggets_remaining;
        for player in self.players.values_mut().filter(|p| p.is_active()) {
            let found = if player.id() == id {
                player.add_gold(nuggets);
                nuggets
            } else {
                0
            };
            out.push(Outbound::new(
                player.recipient().clone(),
                format!("GOLD {} {} {}", found, player.gold(), remaining),
            ));
        }
        if let Some(spectator) = &self.spectator {
            out.push(Outbound::new(
                spectator.clone(),
                format!("GOLD 0 0 {}", remaining),
            ));
        }
        info!(
            "Player {} picked up {} nuggets ({} left in {} piles)",
            id, nuggets, remaining, self.piles_remaining
        );
    }

    /// Size of the pile just picked up. Every pile still on the map keeps
    /// at least one nugget; the last pile takes whatever is left.
    fn draw_pile(&mut self) -> u32 {
        let remaining = self.nuggets_remaining;
        if self.piles_remaining == 0 {
            return remaining;
        }
        let reserved = self.piles_remaining as u32;
        if remaining <= reserved {
            warn!(
                "{} nuggets cannot cover {} remaining piles",
                remaining, self.piles_remaining
            );
            return remaining.min(1);
        }
        // n = 1 always satisfies the bound, so this terminates.
        loop {
            let n = self.rng.gen_range(1..=remaining);
            if (remaining - n) / reserved >= 1 {
                return n;
            }
        }
    }

    fn clear_markers(&mut self) {
        for player in self.players.values().filter(|p| p.is_active()) {
            let (row, col) = player.position();
            if let Some(terrain) = self.static_grid.get(row, col) {
                self.live_grid.set(row, col, terrain);
            }
        }
    }

    fn place_markers(&mut self) {
        for player in self.players.values().filter(|p| p.is_active()) {
            let (row, col) = player.position();
            self.live_grid.set(row, col, Symbol::PlayerMarker(player.id()));
        }
    }

    fn refresh_views(&mut self) {
        for player in self.players.values_mut().filter(|p| p.is_active()) {
            let at = player.position();
            recompute_visibility(
                &self.static_grid,
                &self.live_grid,
                player.visibility_mut(),
                at,
            );
        }
    }

    fn grid_message(&self) -> String {
        format!("GRID {} {}", self.static_grid.rows(), self.static_grid.cols())
    }

    fn push_displays(&self, out: &mut Vec<Outbound<A>>) {
        for player in self.players.values().filter(|p| p.is_active()) {
            out.push(Outbound::new(
                player.recipient().clone(),
                format!("DISPLAY\n{}", player.visibility()),
            ));
        }
        if let Some(spectator) = &self.spectator {
            out.push(Outbound::new(
                spectator.clone(),
                format!("DISPLAY\n{}", self.live_grid),
            ));
        }
    }

    /// The `QUIT GAME OVER:` table, one row per player in join order.
    pub fn summary(&self) -> String {
        let width = self.settings.gold_total.to_string().len() + 1;
        let mut text = String::from("QUIT GAME OVER:\n");
        for player in self.players.values() {
            text.push_str(&format!(
                "{} {:>width$} {}\n",
                player.id(),
                player.gold(),
                player.name(),
                width = width
            ));
        }
        text
    }

    fn finish(&mut self, out: &mut Vec<Outbound<A>>) {
        let summary = self.summary();
        info!("All gold collected, game over");
        for player in self.players.values().filter(|p| p.is_active()) {
            out.push(Outbound::new(player.recipient().clone(), summary.clone()));
        }
        if let Some(spectator) = self.spectator.take() {
            out.push(Outbound::new(spectator, summary));
        }
        self.players.clear();
        self.over = true;
    }
}

/// The map with gold and any player letters flattened to room floor.
fn bare_terrain(map: &Grid) -> Grid {
    let mut terrain = map.clone();
    for (row, col) in map.positions() {
        if let Some(Symbol::GoldPile | Symbol::PlayerMarker(_) | Symbol::SelfMarker) =
            map.get(row, col)
        {
            terrain.set(row, col, Symbol::RoomFloor);
        }
    }
    terrain
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    const ROOM: &str = "\
+-----+
|.....|
|.....|
+-----+
";

    fn settings(total: u32) -> GameConfig {
        GameConfig {
            gold_total: total,
            gold_min_piles: 1,
            gold_max_piles: 3,
            ..GameConfig::default()
        }
    }

    fn layout(text: &str, total: u32) -> GameState<u8> {
        let live = Grid::parse(text).unwrap();
        GameState::from_layout(live.clone(), live, settings(total), StdRng::seed_from_u64(7))
            .unwrap()
    }

    fn texts_for(out: &[Outbound<u8>], to: u8) -> Vec<String> {
        out.iter().filter(|m| m.to == to).map(|m| m.text.clone()).collect()
    }

    #[test]
    fn new_scatters_gold_within_range() {
        let map = Grid::parse(ROOM).unwrap();
        let game: GameState<u8> =
            GameState::new(map, settings(50), StdRng::seed_from_u64(1)).unwrap();
        assert!((1..=3).contains(&game.piles_remaining()));
        assert_eq!(game.live_grid().count(Symbol::GoldPile), game.piles_remaining());
        assert_eq!(game.static_grid().count(Symbol::GoldPile), 0);
        assert_eq!(game.nuggets_remaining(), 50);
    }

    #[test]
    fn layout_without_gold_is_rejected() {
        let g = Grid::parse(ROOM).unwrap();
        let result: Result<GameState<u8>, _> =
            GameState::from_layout(g.clone(), g, settings(10), StdRng::seed_from_u64(1));
        assert!(matches!(result, Err(SetupError::NoGold)));

        let piles = Grid::parse("|***|").unwrap();
        let result: Result<GameState<u8>, _> =
            GameState::from_layout(piles.clone(), piles, settings(2), StdRng::seed_from_u64(1));
        assert!(matches!(result, Err(SetupError::TooManyPiles { piles: 3, nuggets: 2 })));
    }

    #[test]
    fn join_replies_ok_grid_gold_then_display() {
        let mut game = layout(ROOM.replace("|.....|\n+", "|....*|\n+").as_str(), 20);
        let out = game.handle(1, "PLAY alice");
        let mine = texts_for(&out, 1);
        assert_eq!(mine[0], "OK A");
        assert_eq!(mine[1], "GRID 4 7");
        assert_eq!(mine[2], "GOLD 0 0 20");
        assert!(mine[3].starts_with("DISPLAY\n"));
        assert_eq!(mine[3].matches('@').count(), 1);
    }

    #[test]
    fn blocked_step_changes_nothing() {
        let mut game = layout("+---+\n|.*.|\n+---+\n", 5);
        game.handle(1, "PLAY bob");
        let before = game.live_grid().clone();
        let pos = game.player(PlayerId::FIRST).unwrap().position();
        // Row 1 is the only floor row, so up is always a boundary.
        let out = game.handle(1, "KEY k");
        assert!(texts_for(&out, 1).contains(&"ERROR you cannot move there".to_string()));
        assert_eq!(game.live_grid(), &before);
        assert_eq!(game.player(PlayerId::FIRST).unwrap().position(), pos);
    }

    #[test]
    fn last_pile_takes_everything() {
        let mut game = layout("|.*|\n", 9);
        game.handle(1, "PLAY solo");
        // Only one floor cell besides the pile, so the player spawned at col 1.
        let out = game.handle(1, "KEY l");
        let mine = texts_for(&out, 1);
        assert_eq!(mine[0], "GOLD 9 9 0");
        assert!(mine[1].starts_with("DISPLAY\n"));
        assert_eq!(mine[2], "QUIT GAME OVER:\nA  9 solo\n");
        assert!(game.is_over());
        assert!(game.handle(1, "KEY h").is_empty());
    }

    #[test]
    fn spectator_quits_politely() {
        let mut game = layout("|.*.|\n", 5);
        game.handle(9, "SPECTATE");
        let out = game.handle(9, "KEY h");
        assert_eq!(texts_for(&out, 9)[0], "ERROR spectators cannot move");
        let out = game.handle(9, "KEY Q");
        assert_eq!(texts_for(&out, 9), vec!["QUIT Thanks for watching!".to_string()]);
        assert!(game.spectator().is_none());
    }

    #[test]
    fn unknown_senders_keys_are_ignored() {
        let mut game = layout("|.*.|\n", 5);
        assert!(game.handle(4, "KEY h").is_empty());
        let out = game.handle(4, "HELLO");
        assert_eq!(texts_for(&out, 4), vec!["ERROR invalid action provided".to_string()]);
    }
}
