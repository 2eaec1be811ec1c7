//! End-to-end gateway tests over real WebSocket connections.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use lockpick_rooms::StoreConfig;
use lockpick_server::LockpickServer;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server() -> SocketAddr {
    let server = LockpickServer::builder()
        .bind("127.0.0.1:0")
        .store_config(StoreConfig {
            require_reservation: false,
            ..StoreConfig::default()
        })
        .build()
        .await
        .expect("server should bind an ephemeral port");
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    addr
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}"))
        .await
        .expect("client should connect");
    client
}

async fn send(client: &mut Client, value: Value) {
    client
        .send(Message::Text(value.to_string().into()))
        .await
        .expect("send should succeed");
}

/// Next JSON event from the server, skipping any non-text frames.
async fn recv(client: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(
            Duration::from_secs(5),
            client.next(),
        )
        .await
        .expect("server should respond within 5s")
        .expect("stream should stay open")
        .expect("frame should be readable");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

/// Creates a room and joins a second player into it. Returns both
/// clients (host first) and the room code, with the join/broadcast
/// events already consumed.
async fn room_with_two(addr: SocketAddr) -> (Client, Client, String) {
    let mut host = connect(addr).await;
    send(&mut host, json!({"type": "create-room", "playerName": "Ada"}))
        .await;
    let created = recv(&mut host).await;
    assert_eq!(created["type"], "room-created");
    let code = created["roomCode"].as_str().unwrap().to_string();

    let mut guest = connect(addr).await;
    send(
        &mut guest,
        json!({
            "type": "join-room",
            "roomCode": code,
            "playerName": "Grace"
        }),
    )
    .await;
    let joined = recv(&mut guest).await;
    assert_eq!(joined["type"], "room-joined");

    let broadcast = recv(&mut host).await;
    assert_eq!(broadcast["type"], "player-joined");
    assert_eq!(broadcast["playerName"], "Grace");

    (host, guest, code)
}

#[tokio::test]
async fn test_create_room_returns_code_and_host_roster() {
    let addr = start_server().await;
    let mut client = connect(addr).await;

    send(
        &mut client,
        json!({"type": "create-room", "playerName": "Ada"}),
    )
    .await;
    let event = recv(&mut client).await;

    assert_eq!(event["type"], "room-created");
    assert_eq!(event["roomCode"].as_str().unwrap().len(), 6);
    assert_eq!(event["playerId"].as_str().unwrap().len(), 32);
    let players = event["players"].as_array().unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0]["name"], "Ada");
    assert_eq!(players[0]["isHost"], true);
    assert_eq!(players[0]["seat"], 0);
}

#[tokio::test]
async fn test_join_unknown_room_returns_error() {
    let addr = start_server().await;
    let mut client = connect(addr).await;

    send(
        &mut client,
        json!({
            "type": "join-room",
            "roomCode": "ZZZZZZ",
            "playerName": "Ada"
        }),
    )
    .await;
    let event = recv(&mut client).await;
    assert_eq!(event["type"], "error");
    assert_eq!(event["message"], "Room not found");
}

#[tokio::test]
async fn test_ping_answers_pong() {
    let addr = start_server().await;
    let mut client = connect(addr).await;

    send(&mut client, json!({"type": "ping"})).await;
    assert_eq!(recv(&mut client).await["type"], "pong");
}

#[tokio::test]
async fn test_validate_name_in_occupied_room() {
    let addr = start_server().await;
    let (mut host, _guest, code) = room_with_two(addr).await;

    send(
        &mut host,
        json!({
            "type": "validate-name",
            "roomCode": code,
            "playerName": "grace"
        }),
    )
    .await;
    let event = recv(&mut host).await;
    assert_eq!(event["type"], "name-validated");
    assert_eq!(event["valid"], false);
    assert_eq!(event["isTaken"], true);
}

#[tokio::test]
async fn test_reserve_name_issues_identity() {
    let addr = start_server().await;
    let mut host = connect(addr).await;
    send(&mut host, json!({"type": "create-room", "playerName": "Ada"}))
        .await;
    let code = recv(&mut host).await["roomCode"]
        .as_str()
        .unwrap()
        .to_string();

    let mut joiner = connect(addr).await;
    send(
        &mut joiner,
        json!({
            "type": "reserve-name",
            "roomCode": code,
            "playerName": "Grace"
        }),
    )
    .await;
    let reserved = recv(&mut joiner).await;
    assert_eq!(reserved["type"], "name-reserved");
    assert_eq!(reserved["playerId"].as_str().unwrap().len(), 32);
    assert_eq!(reserved["expiresInSecs"], 60);

    send(
        &mut joiner,
        json!({
            "type": "join-room",
            "roomCode": code,
            "playerName": "Grace",
            "playerId": reserved["playerId"]
        }),
    )
    .await;
    let joined = recv(&mut joiner).await;
    assert_eq!(joined["type"], "room-joined");
    assert_eq!(joined["playerId"], reserved["playerId"]);
}

#[tokio::test]
async fn test_non_host_cannot_start_game() {
    let addr = start_server().await;
    let (_host, mut guest, code) = room_with_two(addr).await;

    send(
        &mut guest,
        json!({"type": "start-game", "roomCode": code}),
    )
    .await;
    let event = recv(&mut guest).await;
    assert_eq!(event["type"], "error");
    assert_eq!(event["message"], "Only the host can start the game");
}

#[tokio::test]
async fn test_full_game_round_over_the_wire() {
    let addr = start_server().await;
    let (mut host, mut guest, code) = room_with_two(addr).await;

    send(&mut host, json!({"type": "start-game", "roomCode": code}))
        .await;
    let started_host = recv(&mut host).await;
    let started_guest = recv(&mut guest).await;
    assert_eq!(started_host["type"], "game-started");
    assert_eq!(started_guest["type"], "game-started");

    let hands = started_host["gameState"]["playerHands"]
        .as_array()
        .unwrap();
    assert_eq!(hands.len(), 2);
    assert_eq!(hands[0].as_array().unwrap().len(), 7);

    // Guest holds seat 1 and it is seat 0's turn.
    let guest_card = hands[1][0].clone();
    send(
        &mut guest,
        json!({
            "type": "play-card",
            "roomCode": code,
            "card": guest_card,
            "pileIndex": 0
        }),
    )
    .await;
    let rejected = recv(&mut guest).await;
    assert_eq!(rejected["type"], "error");
    assert_eq!(rejected["message"], "It is not your turn");

    // Host plays two cards onto the empty piles (always legal), then
    // ends the turn.
    let host_hand = hands[0].as_array().unwrap().clone();
    for (i, card) in host_hand.iter().take(2).enumerate() {
        send(
            &mut host,
            json!({
                "type": "play-card",
                "roomCode": code,
                "card": card,
                "pileIndex": i
            }),
        )
        .await;
        let played_host = recv(&mut host).await;
        let played_guest = recv(&mut guest).await;
        assert_eq!(played_host["type"], "card-played");
        assert_eq!(played_guest["type"], "card-played");
        assert_eq!(played_host["playerName"], "Ada");
        assert_eq!(&played_host["card"], card);
    }

    send(&mut host, json!({"type": "end-turn", "roomCode": code}))
        .await;
    let ended = recv(&mut host).await;
    assert_eq!(ended["type"], "turn-ended");
    assert_eq!(ended["gameState"]["currentPlayer"], 1);
    // Hand drawn back up to seven.
    assert_eq!(
        ended["gameState"]["playerHands"][0]
            .as_array()
            .unwrap()
            .len(),
        7
    );
    assert_eq!(recv(&mut guest).await["type"], "turn-ended");
}

#[tokio::test]
async fn test_cant_play_and_sort_hand() {
    let addr = start_server().await;
    let (mut host, mut guest, code) = room_with_two(addr).await;

    send(&mut host, json!({"type": "start-game", "roomCode": code}))
        .await;
    recv(&mut host).await;
    recv(&mut guest).await;

    send(&mut host, json!({"type": "cant-play", "roomCode": code}))
        .await;
    let event = recv(&mut guest).await;
    assert_eq!(event["type"], "cant-play");
    assert_eq!(event["playerName"], "Ada");
    assert_eq!(recv(&mut host).await["type"], "cant-play");

    // Sorting is private to the sorter.
    send(&mut guest, json!({"type": "sort-hand", "roomCode": code}))
        .await;
    let sorted = recv(&mut guest).await;
    assert_eq!(sorted["type"], "hand-sorted");
    let hand: Vec<u64> = sorted["gameState"]["playerHands"][1]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_u64().unwrap())
        .collect();
    assert!(hand.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_leave_room_transfers_host() {
    let addr = start_server().await;
    let (mut host, mut guest, code) = room_with_two(addr).await;

    send(&mut host, json!({"type": "leave-room", "roomCode": code}))
        .await;
    let event = recv(&mut guest).await;
    assert_eq!(event["type"], "player-left");
    assert_eq!(event["playerName"], "Ada");
    assert!(event["newHostId"].is_string());
    let players = event["players"].as_array().unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0]["name"], "Grace");
    assert_eq!(players[0]["isHost"], true);
}

#[tokio::test]
async fn test_dropped_connection_marks_player_disconnected() {
    let addr = start_server().await;
    let (mut host, guest, code) = room_with_two(addr).await;

    // Guest's socket dies without a leave-room.
    drop(guest);
    tokio::time::sleep(Duration::from_millis(200)).await;

    // Within the leave delay the participant is still in the room,
    // flagged disconnected; a fresh joiner sees them in the roster.
    let mut observer = connect(addr).await;
    send(
        &mut observer,
        json!({
            "type": "join-room",
            "roomCode": code,
            "playerName": "Lin"
        }),
    )
    .await;
    let joined = recv(&mut observer).await;
    assert_eq!(joined["type"], "room-joined");
    let players = joined["players"].as_array().unwrap();
    let grace = players
        .iter()
        .find(|p| p["name"] == "Grace")
        .expect("disconnected player still present");
    assert_eq!(grace["isConnected"], false);

    let _ = recv(&mut host).await; // player-joined for Lin
}
