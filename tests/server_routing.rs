use std::net::SocketAddr;
use std::time::Duration;

use nuggets::config::Config;
use nuggets::game::{GameState, Grid};
use nuggets::server::GameServer;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::net::UdpSocket;
use tokio::time::timeout;
mod common;
use common::small_game_config;

fn addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

fn one_pile_game() -> GameState<SocketAddr> {
    let map = Grid::parse("+---+\n|.*|\n+---+\n").unwrap();
    GameState::from_layout(map.clone(), map, small_game_config(7), StdRng::seed_from_u64(1))
        .unwrap()
}

async fn recv(client: &UdpSocket) -> String {
    let mut buf = vec![0u8; 65536];
    let (len, _) = timeout(Duration::from_secs(5), client.recv_from(&mut buf))
        .await
        .expect("reply in time")
        .expect("recv");
    String::from_utf8(buf[..len].to_vec()).expect("utf8")
}

fn messages_to(server: &GameServer, to: SocketAddr) -> Vec<String> {
    server
        .test_messages()
        .iter()
        .filter(|(dest, _)| *dest == to)
        .map(|(_, text)| text.clone())
        .collect()
}

#[tokio::test]
async fn unbound_server_records_replies() {
    let mut server = GameServer::new(Config::default(), one_pile_game())
        .await
        .expect("server");
    server
        .route_test_datagram(addr(4001), "PLAY alice")
        .await
        .expect("play");
    let replies = messages_to(&server, addr(4001));
    assert_eq!(replies[0], "OK A");
    assert_eq!(replies[1], "GRID 3 5");
    assert_eq!(replies[2], "GOLD 0 0 7");
    assert!(replies[3].starts_with("DISPLAY\n"));

    server
        .route_test_datagram(addr(4002), "SPECTATE")
        .await
        .expect("spectate");
    server
        .route_test_datagram(addr(4001), "KEY l")
        .await
        .expect("key");
    assert!(server.game().is_over());

    let watcher = messages_to(&server, addr(4002));
    assert_eq!(watcher.last().unwrap(), "QUIT GAME OVER:\nA  7 alice\n");
    let player = messages_to(&server, addr(4001));
    assert!(player.contains(&"GOLD 7 7 0".to_string()));
}

#[tokio::test]
async fn non_utf8_datagrams_are_dropped() {
    let mut server = GameServer::new(Config::default(), one_pile_game())
        .await
        .expect("server");
    server
        .route_datagram(addr(4003), &[0xff, 0xfe, 0x00])
        .await
        .expect("route");
    assert!(server.test_messages().is_empty());
}

#[tokio::test]
async fn oversized_messages_are_skipped() {
    let mut config = Config::default();
    config.server.max_datagram = 9;
    let mut server = GameServer::new(config, one_pile_game())
        .await
        .expect("server");
    server
        .route_test_datagram(addr(4004), "PLAY alice")
        .await
        .expect("play");
    // The 10-byte GOLD line and the DISPLAY exceed the limit.
    assert_eq!(
        messages_to(&server, addr(4004)),
        vec!["OK A".to_string(), "GRID 3 5".to_string()]
    );
}

#[tokio::test]
async fn invalid_config_is_refused() {
    let mut config = Config::default();
    config.game.gold_min_piles = 50;
    assert!(GameServer::new(config, one_pile_game()).await.is_err());
}

#[tokio::test]
async fn plays_a_game_over_loopback_udp() {
    let mut config = Config::default();
    config.server.bind_address = "127.0.0.1".to_string();
    config.server.port = 0;
    let mut server = GameServer::new(config, one_pile_game())
        .await
        .expect("server");
    let server_addr = server.bind().await.expect("bind");
    assert_eq!(server.local_addr(), Some(server_addr));
    let handle = tokio::spawn(async move { server.run().await });

    let client = UdpSocket::bind("127.0.0.1:0").await.expect("client socket");

    client.send_to(b"PLAY alice", server_addr).await.expect("send");
    assert_eq!(recv(&client).await, "OK A");
    assert_eq!(recv(&client).await, "GRID 3 5");
    assert_eq!(recv(&client).await, "GOLD 0 0 7");
    assert!(recv(&client).await.starts_with("DISPLAY\n"));

    client.send_to(b"KEY l", server_addr).await.expect("send");
    assert_eq!(recv(&client).await, "GOLD 7 7 0");
    assert!(recv(&client).await.starts_with("DISPLAY\n"));
    assert_eq!(recv(&client).await, "QUIT GAME OVER:\nA  7 alice\n");

    let result = timeout(Duration::from_secs(5), handle)
        .await
        .expect("server stops after game over")
        .expect("join");
    assert!(result.is_ok());
}
