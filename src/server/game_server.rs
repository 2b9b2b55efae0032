use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;

use crate::config::Config;
use crate::game::{GameState, Outbound};
use crate::logutil::{escape_log, payload_preview};

/// Room for the largest UDP payload.
const RECV_BUFFER: usize = 65536;

pub struct GameServer {
    config: Config,
    game: GameState<SocketAddr>,
    socket: Option<Arc<UdpSocket>>,
    pub(crate) test_messages: Vec<(SocketAddr, String)>, // outbound messages recorded while unbound
}

impl GameServer {
    pub async fn new(config: Config, game: GameState<SocketAddr>) -> Result<Self> {
        config.validate()?;
        Ok(GameServer {
            config,
            game,
            socket: None,
            test_messages: Vec::new(),
        })
    }

    /// Bind the UDP socket and return the address actually in use.
    pub async fn bind(&mut self) -> Result<SocketAddr> {
        let wanted = format!(
            "{}:{}",
            self.config.server.bind_address, self.config.server.port
        );
        let socket = UdpSocket::bind(&wanted)
            .await
            .with_context(|| format!("Failed to bind UDP socket on {}", wanted))?;
        let local = socket.local_addr()?;
        info!("Listening for clients on {}", local);
        self.socket = Some(Arc::new(socket));
        Ok(local)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    /// Serve datagrams until the game ends or Ctrl-C arrives.
    pub async fn run(&mut self) -> Result<()> {
        if self.socket.is_none() {
            self.bind().await?;
        }
        let socket = self
            .socket
            .clone()
            .ok_or_else(|| anyhow!("socket not bound"))?;
        info!(
            "Game ready: {} nuggets in {} piles",
            self.game.nuggets_remaining(),
            self.game.piles_remaining()
        );

        let mut buf = vec![0u8; RECV_BUFFER];
        loop {
            tokio::select! {
                received = socket.recv_from(&mut buf) => {
                    match received {
                        Ok((len, from)) => {
                            if let Err(e) = self.route_datagram(from, &buf[..len]).await {
                                warn!("route_datagram error: {e:?}");
                            }
                            if self.game.is_over() {
                                info!("Game over, all nuggets collected");
                                break;
                            }
                        }
                        Err(e) => warn!("recv_from failed: {}", e),
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown().await
    }

    /// Feed one datagram to the game and deliver whatever it produces.
    pub async fn route_datagram(&mut self, from: SocketAddr, payload: &[u8]) -> Result<()> {
        let text = match std::str::from_utf8(payload) {
            Ok(text) => text,
            Err(_) => {
                warn!("Dropping non-UTF-8 datagram ({} bytes) from {}", payload.len(), from);
                return Ok(());
            }
        };
        debug!("<- {} {}", from, escape_log(text));
        let outbound = self.game.handle(from, text);
        self.deliver(outbound).await
    }

    async fn deliver(&mut self, outbound: Vec<Outbound<SocketAddr>>) -> Result<()> {
        let limit = self.config.server.max_datagram;
        for message in outbound {
            if message.text.len() > limit {
                warn!(
                    "Skipping {}-byte message to {} (limit {}): {}",
                    message.text.len(),
                    message.to,
                    limit,
                    payload_preview(&message.text)
                );
                continue;
            }
            match &self.socket {
                Some(socket) => {
                    if let Err(e) = socket.send_to(message.text.as_bytes(), message.to).await {
                        warn!("Failed to send to {}: {}", message.to, e);
                        continue;
                    }
                    debug!("-> {} {}", message.to, payload_preview(&message.text));
                }
                None => {
                    debug!(
                        "Mock send (unbound) to {}: {}",
                        message.to,
                        payload_preview(&message.text)
                    );
                    self.test_messages.push((message.to, message.text));
                }
            }
        }
        Ok(())
    }

    /// Route a text command without a socket; replies land in [`Self::test_messages`].
    pub async fn route_test_datagram(&mut self, from: SocketAddr, text: &str) -> Result<()> {
        self.route_datagram(from, text.as_bytes()).await
    }

    pub fn test_messages(&self) -> &Vec<(SocketAddr, String)> {
        &self.test_messages
    }

    pub fn game(&self) -> &GameState<SocketAddr> {
        &self.game
    }

    async fn shutdown(&mut self) -> Result<()> {
        info!("Shutting down game server...");
        for player in self.game.players() {
            debug!(
                "Player {} '{}' leaves with {} nuggets",
                player.id(),
                escape_log(player.name()),
                player.gold()
            );
        }
        self.socket = None;
        info!("Game server shutdown complete");
        Ok(())
    }
}
