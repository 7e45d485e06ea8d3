//! The duplex message protocol: flat JSON envelopes tagged with `type`.
//!
//! One message type per logical operation. Clients send a
//! [`ClientMessage`]; the server answers the issuing connection with a
//! direct acknowledgement and relies on the registry broadcast
//! (`state`) for everything the whole match needs to see. Any handler
//! failure is reported as `error{message}` — the connection stays open.

use serde::{Deserialize, Serialize};

use crate::{
    BallSpeed, GameId, GameSnapshot, MatchId, PaddleDirection, PaddleSize,
    Slot, TournamentId,
};

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Messages a client may send over its connection.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON — a `move`
/// message looks like:
///
/// ```json
/// { "type": "move", "gameId": 7, "player": 1, "direction": "up" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    /// Create a quick match and claim slot 1. Absent or out-of-range
    /// settings fall back to the configured defaults.
    Create {
        player_name: String,
        #[serde(default)]
        ball_speed: Option<BallSpeed>,
        #[serde(default)]
        winning_score: Option<u32>,
        #[serde(default)]
        acceleration_enabled: Option<bool>,
        #[serde(default)]
        paddle_size: Option<PaddleSize>,
    },

    /// Join an existing match in the first free slot, or rejoin the
    /// slot the name is already bound to.
    Join {
        game_id: GameId,
        player_name: String,
    },

    /// Watch a match without occupying a slot.
    Spectate {
        game_id: GameId,
        #[serde(default)]
        spectator_name: Option<String>,
    },

    /// Start the match (requires both slots bound).
    Start { game_id: GameId },

    /// Record a continuous movement intent for the next tick.
    Move {
        game_id: GameId,
        player: Slot,
        direction: PaddleDirection,
    },

    /// Set a paddle's absolute position (clamped server-side).
    Position {
        game_id: GameId,
        player: Slot,
        y: f64,
    },

    /// Pause a playing match.
    Pause { game_id: GameId },

    /// Resume a paused match.
    Resume { game_id: GameId },

    /// Reset scores and ball for a rematch.
    Reset { game_id: GameId },

    /// Advance a finished tournament game to the next bracket round.
    Next { game_id: GameId },

    /// Keepalive; answered with `pong`.
    Ping,
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// Messages the server sends: direct acknowledgements to the issuing
/// connection, plus the `state` broadcast every tick of an active match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// Reply to `create`.
    Created {
        game_id: GameId,
        player_number: Slot,
        game_state: GameSnapshot,
    },

    /// Reply to `join`.
    Joined {
        game_id: GameId,
        player_number: Slot,
        game_state: GameSnapshot,
    },

    /// Reply to `spectate`.
    Spectating {
        game_id: GameId,
        game_state: GameSnapshot,
    },

    /// Reply to `start`.
    Started {
        game_id: GameId,
        game_state: GameSnapshot,
    },

    /// Reply to `pause`.
    Paused {
        game_id: GameId,
        game_state: GameSnapshot,
    },

    /// Reply to `resume`.
    Resumed {
        game_id: GameId,
        game_state: GameSnapshot,
    },

    /// Reply to `reset`.
    Reset {
        game_id: GameId,
        game_state: GameSnapshot,
    },

    /// Broadcast on every tick of an active match, and after any
    /// lifecycle transition.
    State { data: GameSnapshot },

    /// Reply to `next` once both semifinal winners are known: the next
    /// bracket game exists and both players are seated.
    NextMatch {
        match_id: MatchId,
        game_id: GameId,
        game_state: GameSnapshot,
    },

    /// Reply to `next` while the other semifinal is still running.
    NextMatchPending { tournament_id: TournamentId },

    /// Reply to `next` on the final: the bracket is done.
    TournamentComplete { tournament_id: TournamentId },

    /// Reply to `ping`.
    Pong,

    /// Any handler failure.
    Error { message: String },
}

// =========================================================================
// Tests
// =========================================================================
