//! Per-connection handler: message parsing, dispatch, and the writer
//! task that pumps outbound messages onto the socket.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use rallyd_bracket::{AdvanceOutcome, TournamentOrchestrator};
use rallyd_protocol::{
    ClientMessage, ConnectionId, ServerMessage, Slot,
};
use rallyd_registry::{
    AiNotifier, OutboundSender, SessionRegistry, StatsReporter,
};
use rallyd_sim::GameOptions;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

type WsStream = WebSocketStream<TcpStream>;

/// Handles one connection from accept to close.
///
/// The socket is split: a spawned writer task drains the connection's
/// unbounded outbound channel (fed by both this handler's replies and
/// the registry's broadcasts), while this task reads inbound frames
/// and dispatches them. When the read side ends — clean close, error,
/// or timeout upstream — the connection is unregistered, which drops
/// the registry's sender clone and lets the writer finish.
pub(crate) async fn handle_connection<S, N>(
    ws: WsStream,
    connection_id: ConnectionId,
    registry: Arc<SessionRegistry<S, N>>,
    orchestrator: Arc<TournamentOrchestrator<S, N>>,
) where
    S: StatsReporter,
    N: AiNotifier,
{
    let (mut sink, mut stream) = ws.split();
    let (sender, mut outbound) = mpsc::unbounded_channel::<ServerMessage>();

    let writer = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            match serde_json::to_string(&message) {
                Ok(text) => {
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        // Dead socket: stop pumping, drain nothing more.
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "failed to encode outbound message");
                }
            }
        }
        let _ = sink.close().await;
    });

    while let Some(frame) = stream.next().await {
        let raw = match frame {
            Ok(Message::Text(text)) => text.to_string(),
            Ok(Message::Binary(data)) => {
                match String::from_utf8(data.to_vec()) {
                    Ok(text) => text,
                    Err(_) => {
                        let _ = sender.send(ServerMessage::Error {
                            message: "messages must be UTF-8 JSON".into(),
                        });
                        continue;
                    }
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => continue, // ping/pong/raw frames
            Err(e) => {
                tracing::debug!(%connection_id, error = %e, "recv error");
                break;
            }
        };

        if let Some(reply) = process_message(
            &raw,
            connection_id,
            &sender,
            &registry,
            &orchestrator,
        )
        .await
        {
            let _ = sender.send(reply);
        }
    }

    tracing::debug!(%connection_id, "connection closed");
    registry.unregister_connection(connection_id).await;
    drop(sender);
    let _ = writer.await;
}

/// Parses and dispatches one inbound message. Returns the direct reply
/// for the issuing client, if the operation has one.
async fn process_message<S, N>(
    raw: &str,
    connection_id: ConnectionId,
    sender: &OutboundSender,
    registry: &Arc<SessionRegistry<S, N>>,
    orchestrator: &Arc<TournamentOrchestrator<S, N>>,
) -> Option<ServerMessage>
where
    S: StatsReporter,
    N: AiNotifier,
{
    let message: ClientMessage = match serde_json::from_str(raw) {
        Ok(message) => message,
        Err(e) => {
            return Some(ServerMessage::Error {
                message: format!("invalid message: {e}"),
            });
        }
    };

    match handle_message(message, connection_id, sender, registry, orchestrator)
        .await
    {
        Ok(reply) => reply,
        Err(message) => Some(ServerMessage::Error { message }),
    }
}

/// Maps one protocol message to exactly one registry/orchestrator
/// call. Failures come back as the user-facing error text.
async fn handle_message<S, N>(
    message: ClientMessage,
    connection_id: ConnectionId,
    sender: &OutboundSender,
    registry: &Arc<SessionRegistry<S, N>>,
    orchestrator: &Arc<TournamentOrchestrator<S, N>>,
) -> Result<Option<ServerMessage>, String>
where
    S: StatsReporter,
    N: AiNotifier,
{
    match message {
        ClientMessage::Create {
            player_name,
            ball_speed,
            winning_score,
            acceleration_enabled,
            paddle_size,
        } => {
            let options = GameOptions {
                ball_speed,
                winning_score,
                acceleration_enabled,
                paddle_size,
            };
            let game_id = registry
                .create_with_player(&options, &player_name)
                .await
                .map_err(|e| e.to_string())?;
            registry
                .register_connection(
                    game_id,
                    connection_id,
                    sender.clone(),
                    Some(player_name),
                )
                .await
                .map_err(|e| e.to_string())?;
            let game_state = registry
                .snapshot(game_id)
                .await
                .map_err(|e| e.to_string())?;
            Ok(Some(ServerMessage::Created {
                game_id,
                player_number: Slot::One,
                game_state,
            }))
        }

        ClientMessage::Join {
            game_id,
            player_name,
        } => {
            let player_number = registry
                .join(game_id, &player_name)
                .await
                .map_err(|e| e.to_string())?;
            registry
                .register_connection(
                    game_id,
                    connection_id,
                    sender.clone(),
                    Some(player_name),
                )
                .await
                .map_err(|e| e.to_string())?;
            let game_state = registry
                .snapshot(game_id)
                .await
                .map_err(|e| e.to_string())?;
            Ok(Some(ServerMessage::Joined {
                game_id,
                player_number,
                game_state,
            }))
        }

        ClientMessage::Spectate {
            game_id,
            spectator_name,
        } => {
            registry
                .register_connection(
                    game_id,
                    connection_id,
                    sender.clone(),
                    None,
                )
                .await
                .map_err(|e| e.to_string())?;
            if let Some(name) = spectator_name {
                tracing::debug!(%game_id, spectator = %name, "spectator joined");
            }
            let game_state = registry
                .snapshot(game_id)
                .await
                .map_err(|e| e.to_string())?;
            Ok(Some(ServerMessage::Spectating {
                game_id,
                game_state,
            }))
        }

        ClientMessage::Start { game_id } => {
            let game_state =
                registry.start(game_id).await.map_err(|e| e.to_string())?;
            Ok(Some(ServerMessage::Started {
                game_id,
                game_state,
            }))
        }

        ClientMessage::Move {
            game_id,
            player,
            direction,
        } => {
            registry
                .set_paddle_intent(game_id, player, direction)
                .await
                .map_err(|e| e.to_string())?;
            Ok(None)
        }

        ClientMessage::Position { game_id, player, y } => {
            registry
                .set_paddle_position(game_id, player, y)
                .await
                .map_err(|e| e.to_string())?;
            Ok(None)
        }

        ClientMessage::Pause { game_id } => {
            let game_state =
                registry.pause(game_id).await.map_err(|e| e.to_string())?;
            Ok(Some(ServerMessage::Paused {
                game_id,
                game_state,
            }))
        }

        ClientMessage::Resume { game_id } => {
            let game_state =
                registry.resume(game_id).await.map_err(|e| e.to_string())?;
            Ok(Some(ServerMessage::Resumed {
                game_id,
                game_state,
            }))
        }

        ClientMessage::Reset { game_id } => {
            let game_state =
                registry.reset(game_id).await.map_err(|e| e.to_string())?;
            Ok(Some(ServerMessage::Reset {
                game_id,
                game_state,
            }))
        }

        ClientMessage::Next { game_id } => {
            match orchestrator
                .advance_from_game(game_id)
                .await
                .map_err(|e| e.to_string())?
            {
                AdvanceOutcome::NextMatchReady {
                    match_id,
                    game_id,
                    snapshot,
                } => Ok(Some(ServerMessage::NextMatch {
                    match_id,
                    game_id,
                    game_state: snapshot,
                })),
                AdvanceOutcome::AwaitingOpponent { tournament_id } => {
                    Ok(Some(ServerMessage::NextMatchPending {
                        tournament_id,
                    }))
                }
                AdvanceOutcome::TournamentComplete {
                    tournament_id,
                    ..
                } => Ok(Some(ServerMessage::TournamentComplete {
                    tournament_id,
                })),
            }
        }

        ClientMessage::Ping => Ok(Some(ServerMessage::Pong)),
    }
}
