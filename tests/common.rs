//! Test utilities & fixtures.
//! Maps live under `tests/test-data-int/maps`.

use std::path::{Path, PathBuf};

use nuggets::config::GameConfig;
use nuggets::game::{GameState, Grid, Outbound};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Return the path to the static integration test fixture directory.
#[allow(dead_code)]
pub fn fixture_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("test-data-int")
}

#[allow(dead_code)]
pub fn map_path(name: &str) -> PathBuf {
    fixture_root().join("maps").join(name)
}

#[allow(dead_code)]
pub fn load_map(name: &str) -> Grid {
    Grid::load(map_path(name)).expect("fixture map")
}

#[allow(dead_code)]
pub fn grid(lines: &[&str]) -> Grid {
    Grid::parse(&lines.join("\n")).expect("grid text")
}

/// Few piles so small fixture maps keep floor free for spawning.
#[allow(dead_code)]
pub fn small_game_config(gold_total: u32) -> GameConfig {
    GameConfig {
        gold_total,
        gold_min_piles: 2,
        gold_max_piles: 5,
        ..GameConfig::default()
    }
}

/// A game on a fixture map with scattered gold and a fixed seed.
#[allow(dead_code)]
pub fn seeded_game(map: &str, seed: u64) -> GameState<u16> {
    GameState::new(load_map(map), small_game_config(100), StdRng::seed_from_u64(seed))
        .expect("game setup")
}

/// A game whose gold piles are exactly the `*` cells in `lines`.
#[allow(dead_code)]
pub fn layout_game(lines: &[&str], gold_total: u32) -> GameState<u16> {
    let map = grid(lines);
    GameState::from_layout(
        map.clone(),
        map,
        small_game_config(gold_total),
        StdRng::seed_from_u64(99),
    )
    .expect("layout setup")
}

/// Every message text addressed to `to`, in send order.
#[allow(dead_code)]
pub fn texts_for(out: &[Outbound<u16>], to: u16) -> Vec<String> {
    out.iter()
        .filter(|m| m.to == to)
        .map(|m| m.text.clone())
        .collect()
}

/// Parse a `GOLD n purse remaining` message.
#[allow(dead_code)]
pub fn parse_gold(text: &str) -> Option<(u32, u32, u32)> {
    let mut parts = text.strip_prefix("GOLD ")?.split(' ');
    let n = parts.next()?.parse().ok()?;
    let purse = parts.next()?.parse().ok()?;
    let remaining = parts.next()?.parse().ok()?;
    Some((n, purse, remaining))
}
