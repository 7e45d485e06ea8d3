//! Render-ready snapshot of a match, broadcast to clients every tick.
//!
//! A snapshot is an immutable copy — it shares no structure with the
//! simulation that produced it, so handing it to the transport layer
//! (or a test) can never observe a half-applied tick.

use serde::{Deserialize, Serialize};

use crate::{BallSpeed, PaddleSize, SimState, Slot};

/// Everything a client needs to draw one frame of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Current lifecycle state.
    pub state: SimState,
    /// The left (slot 1) player.
    pub player1: PlayerView,
    /// The right (slot 2) player.
    pub player2: PlayerView,
    /// Ball position.
    pub ball: BallView,
    /// Board geometry, echoed so clients never hardcode dimensions.
    pub config: BoardView,
    /// The settings the match was created with, echoed back.
    pub settings: SettingsView,
}

impl GameSnapshot {
    /// The player view for a slot.
    pub fn player(&self, slot: Slot) -> &PlayerView {
        match slot {
            Slot::One => &self.player1,
            Slot::Two => &self.player2,
        }
    }

    /// The slot currently ahead on points, or `None` on a tie.
    pub fn leader(&self) -> Option<Slot> {
        match self.player1.score.cmp(&self.player2.score) {
            std::cmp::Ordering::Greater => Some(Slot::One),
            std::cmp::Ordering::Less => Some(Slot::Two),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// One player slot as clients see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    /// Display name, `None` while the slot is unassigned.
    pub name: Option<String>,
    /// Paddle top edge, clamped to `[0, height - paddleHeight]`.
    pub y: f64,
    /// Points scored this match.
    pub score: u32,
    /// `true` when the slot is driven by an automated opponent.
    pub automated: bool,
}

/// Ball position (top-left corner of its bounding square).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallView {
    pub x: f64,
    pub y: f64,
}

/// Board geometry and the win condition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub width: f64,
    pub height: f64,
    pub paddle_width: f64,
    pub paddle_height: f64,
    pub ball_size: f64,
    pub winning_score: u32,
}

/// The creation-time settings, echoed in every snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub ball_speed: BallSpeed,
    pub paddle_size: PaddleSize,
    pub acceleration_enabled: bool,
}

// =========================================================================
// Tests
// =========================================================================
