//! # Configuration Management Module
//!
//! Server, game and logging settings loaded from a TOML file.
//!
//! ## Configuration Structure
//!
//! - [`ServerConfig`] - UDP bind address and port
//! - [`GameConfig`] - gold totals, pile counts, roster and name limits
//! - [`LoggingConfig`] - log level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nuggets::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("Gold in play: {}", config.game.gold_total);
//!     Config::create_default("config.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [server]
//! bind_address = "0.0.0.0"
//! port = 0            # 0 picks an ephemeral port
//!
//! [game]
//! gold_total = 250
//! gold_min_piles = 10
//! gold_max_piles = 30
//! max_players = 26
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Command line flags (port, seed) override values from the file.

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::game::player::PlayerId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    /// 0 lets the OS choose; the chosen port is logged and printed at startup.
    pub port: u16,
    /// Largest outbound payload we attempt to send in one datagram.
    #[serde(default = "default_max_datagram")]
    pub max_datagram: usize,
}

fn default_max_datagram() -> usize {
    65507
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Nuggets shared out across all piles.
    pub gold_total: u32,
    pub gold_min_piles: usize,
    pub gold_max_piles: usize,
    /// Roster capacity; never more than 26 since ids run A..Z.
    pub max_players: usize,
    pub max_name_length: usize,
    /// Upper bound on random draws when placing gold or spawning players.
    #[serde(default = "default_placement_attempts")]
    pub placement_attempts: usize,
}

fn default_placement_attempts() -> usize {
    100_000
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            gold_total: 250,
            gold_min_piles: 10,
            gold_max_piles: 30,
            max_players: PlayerId::CAPACITY,
            max_name_length: 50,
            placement_attempts: default_placement_attempts(),
        }
    }
}

impl GameConfig {
    /// Reject settings that would make the game unwinnable or unplayable.
    pub fn validate(&self) -> Result<()> {
        if self.gold_min_piles == 0 {
            bail!("game.gold_min_piles must be at least 1");
        }
        if self.gold_min_piles > self.gold_max_piles {
            bail!(
                "game.gold_min_piles ({}) exceeds game.gold_max_piles ({})",
                self.gold_min_piles,
                self.gold_max_piles
            );
        }
        if (self.gold_total as usize) < self.gold_max_piles {
            bail!(
                "game.gold_total ({}) must cover one nugget per pile (max {} piles)",
                self.gold_total,
                self.gold_max_piles
            );
        }
        if !(1..=PlayerId::CAPACITY).contains(&self.max_players) {
            bail!(
                "game.max_players must be between 1 and {}",
                PlayerId::CAPACITY
            );
        }
        if self.max_name_length == 0 {
            bail!("game.max_name_length must be positive");
        }
        if self.placement_attempts == 0 {
            bail!("game.placement_attempts must be positive");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub game: GameConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.max_datagram == 0 {
            bail!("server.max_datagram must be positive");
        }
        self.game.validate()
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 0,
                max_datagram: default_max_datagram(),
            },
            game: GameConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                file: None,
            },
        }
    }
}
