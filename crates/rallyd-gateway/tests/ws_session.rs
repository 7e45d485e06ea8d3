//! Integration tests for the gateway: a real listener, real WebSocket
//! clients, full protocol flows against a live registry.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use rallyd_bracket::TournamentOrchestrator;
use rallyd_gateway::WsGateway;
use rallyd_protocol::{GameId, SimState, Slot};
use rallyd_registry::{
    AiNotifier, CollaboratorError, MatchIndex, MatchReport, RegistryConfig,
    SessionRegistry, StatsReporter,
};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Null collaborators
// =========================================================================

#[derive(Clone, Default)]
struct NullStats;

impl StatsReporter for NullStats {
    async fn report(&self, _report: MatchReport) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

#[derive(Clone, Default)]
struct NullNotifier;

impl AiNotifier for NullNotifier {
    async fn notify_assignment(
        &self,
        _game_id: GameId,
        _slot: Slot,
        _ai_name: String,
    ) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

type TestRegistry = SessionRegistry<NullStats, NullNotifier>;

// =========================================================================
// Helpers
// =========================================================================

type Ws = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a gateway on a random port and returns its address plus a
/// handle to the registry behind it.
async fn start_gateway() -> (String, Arc<TestRegistry>) {
    let index = Arc::new(MatchIndex::new());
    let registry = Arc::new(SessionRegistry::new(
        RegistryConfig::default(),
        NullStats,
        NullNotifier,
        Arc::clone(&index),
    ));
    let orchestrator = Arc::new(TournamentOrchestrator::new(
        Arc::clone(&registry),
        index,
    ));

    let gateway =
        WsGateway::bind("127.0.0.1:0", Arc::clone(&registry), orchestrator)
            .await
            .expect("gateway should bind");
    let addr = gateway
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = gateway.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    (addr, registry)
}

async fn connect(addr: &str) -> Ws {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("client should connect");
    ws
}

async fn send(ws: &mut Ws, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("send should succeed");
}

/// Receives the next text frame as JSON.
async fn recv(ws: &mut Ws) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for a message")
            .expect("stream ended")
            .expect("recv failed");
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).expect("reply should be JSON");
        }
    }
}

/// Skips broadcasts until a message of the wanted type arrives.
async fn recv_type(ws: &mut Ws, wanted: &str) -> Value {
    for _ in 0..50 {
        let value = recv(ws).await;
        if value["type"] == wanted {
            return value;
        }
    }
    panic!("never received a {wanted} message");
}

/// Creates a game for `player` and returns (socket, gameId).
async fn create_game(addr: &str, player: &str) -> (Ws, u64) {
    let mut ws = connect(addr).await;
    send(&mut ws, json!({ "type": "create", "playerName": player })).await;
    let created = recv_type(&mut ws, "created").await;
    let game_id = created["gameId"].as_u64().expect("gameId should be a number");
    (ws, game_id)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_create_returns_created_ack() {
    let (addr, _registry) = start_gateway().await;
    let mut ws = connect(&addr).await;

    send(
        &mut ws,
        json!({
            "type": "create",
            "playerName": "alice",
            "ballSpeed": "fast",
            "winningScore": 3
        }),
    )
    .await;

    let created = recv_type(&mut ws, "created").await;
    assert_eq!(created["playerNumber"], 1);
    assert_eq!(created["gameState"]["state"], "waiting");
    assert_eq!(created["gameState"]["player1"]["name"], "alice");
    assert_eq!(created["gameState"]["config"]["winningScore"], 3);
    assert_eq!(created["gameState"]["settings"]["ballSpeed"], "fast");
}

#[tokio::test]
async fn test_join_seats_second_player() {
    let (addr, _registry) = start_gateway().await;
    let (_host, game_id) = create_game(&addr, "alice").await;

    let mut guest = connect(&addr).await;
    send(
        &mut guest,
        json!({ "type": "join", "gameId": game_id, "playerName": "bob" }),
    )
    .await;

    let joined = recv_type(&mut guest, "joined").await;
    assert_eq!(joined["playerNumber"], 2);
    assert_eq!(joined["gameState"]["player2"]["name"], "bob");
}

#[tokio::test]
async fn test_taken_name_is_rejected_with_error() {
    let (addr, _registry) = start_gateway().await;
    let (_host, _game_id) = create_game(&addr, "alice").await;

    let mut second = connect(&addr).await;
    send(&mut second, json!({ "type": "create", "playerName": "alice" }))
        .await;

    let error = recv_type(&mut second, "error").await;
    let message = error["message"].as_str().unwrap();
    assert!(message.contains("alice"), "unexpected message: {message}");
}

#[tokio::test]
async fn test_start_acks_and_broadcasts_to_all_members() {
    let (addr, _registry) = start_gateway().await;
    let (mut host, game_id) = create_game(&addr, "alice").await;

    let mut guest = connect(&addr).await;
    send(
        &mut guest,
        json!({ "type": "join", "gameId": game_id, "playerName": "bob" }),
    )
    .await;
    recv_type(&mut guest, "joined").await;

    send(&mut host, json!({ "type": "start", "gameId": game_id })).await;

    let started = recv_type(&mut host, "started").await;
    assert_eq!(started["gameState"]["state"], "playing");

    // The joiner sees the broadcast even though it didn't issue start.
    let state = recv_type(&mut guest, "state").await;
    assert_eq!(state["data"]["state"], "playing");
}

#[tokio::test]
async fn test_start_without_both_players_is_an_error() {
    let (addr, _registry) = start_gateway().await;
    let (mut host, game_id) = create_game(&addr, "alice").await;

    send(&mut host, json!({ "type": "start", "gameId": game_id })).await;
    let error = recv_type(&mut host, "error").await;
    assert!(
        error["message"]
            .as_str()
            .unwrap()
            .contains("both players")
    );
}

#[tokio::test]
async fn test_malformed_json_gets_error_reply() {
    let (addr, _registry) = start_gateway().await;
    let mut ws = connect(&addr).await;

    ws.send(Message::Text("this is not json".to_string().into()))
        .await
        .unwrap();
    let error = recv_type(&mut ws, "error").await;
    assert!(
        error["message"]
            .as_str()
            .unwrap()
            .contains("invalid message")
    );
}

#[tokio::test]
async fn test_unknown_game_gets_error_reply() {
    let (addr, _registry) = start_gateway().await;
    let mut ws = connect(&addr).await;

    send(
        &mut ws,
        json!({ "type": "join", "gameId": 99999, "playerName": "bob" }),
    )
    .await;
    let error = recv_type(&mut ws, "error").await;
    assert!(error["message"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_ping_answers_pong() {
    let (addr, _registry) = start_gateway().await;
    let mut ws = connect(&addr).await;

    send(&mut ws, json!({ "type": "ping" })).await;
    recv_type(&mut ws, "pong").await;
}

#[tokio::test]
async fn test_move_has_no_ack_but_failures_surface() {
    let (addr, _registry) = start_gateway().await;
    let (mut host, game_id) = create_game(&addr, "alice").await;

    // A valid move gets no direct reply; the following ping's pong is
    // the next message on the wire.
    send(
        &mut host,
        json!({
            "type": "move", "gameId": game_id,
            "player": 1, "direction": "up"
        }),
    )
    .await;
    send(&mut host, json!({ "type": "ping" })).await;
    let next = recv(&mut host).await;
    assert_eq!(next["type"], "pong");

    // A move against a missing game is answered with an error.
    send(
        &mut host,
        json!({
            "type": "move", "gameId": 99999,
            "player": 1, "direction": "down"
        }),
    )
    .await;
    let error = recv_type(&mut host, "error").await;
    assert!(error["message"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_spectate_returns_snapshot_without_taking_a_seat() {
    let (addr, _registry) = start_gateway().await;
    let (_host, game_id) = create_game(&addr, "alice").await;

    let mut watcher = connect(&addr).await;
    send(
        &mut watcher,
        json!({
            "type": "spectate", "gameId": game_id,
            "spectatorName": "curious"
        }),
    )
    .await;

    let spectating = recv_type(&mut watcher, "spectating").await;
    assert_eq!(spectating["gameState"]["player1"]["name"], "alice");
    // Slot 2 is still open for an actual player.
    assert!(spectating["gameState"]["player2"]["name"].is_null());
}

#[tokio::test]
async fn test_socket_close_pauses_running_match() {
    let (addr, registry) = start_gateway().await;
    let (mut host, game_id) = create_game(&addr, "alice").await;

    let mut guest = connect(&addr).await;
    send(
        &mut guest,
        json!({ "type": "join", "gameId": game_id, "playerName": "bob" }),
    )
    .await;
    recv_type(&mut guest, "joined").await;

    send(&mut host, json!({ "type": "start", "gameId": game_id })).await;
    recv_type(&mut host, "started").await;

    // The guest vanishes mid-match.
    guest.close(None).await.unwrap();

    let game = GameId(game_id);
    let mut state = SimState::Playing;
    for _ in 0..100 {
        state = registry.snapshot(game).await.unwrap().state;
        if state == SimState::Paused {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(state, SimState::Paused);
}

#[tokio::test]
async fn test_next_on_quick_match_is_an_error() {
    let (addr, _registry) = start_gateway().await;
    let (mut host, game_id) = create_game(&addr, "alice").await;

    send(&mut host, json!({ "type": "next", "gameId": game_id })).await;
    let error = recv_type(&mut host, "error").await;
    assert!(
        error["message"]
            .as_str()
            .unwrap()
            .contains("not part of a tournament")
    );
}
