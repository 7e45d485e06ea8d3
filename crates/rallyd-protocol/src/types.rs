//! Shared vocabulary: identity newtypes, settings tiers, and the match
//! lifecycle state machine's state set.
//!
//! Identity types follow the newtype-wrapper pattern: a `u64` wrapped in
//! a named struct so a `MatchId` can never be passed where a [`GameId`]
//! is expected. `#[serde(transparent)]` keeps them plain numbers on the
//! wire.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for one game session (one running match).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

/// A unique identifier for a bracket match (a slot in a tournament,
/// which may or may not have a [`GameId`] attached yet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub u64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M-{}", self.0)
    }
}

/// A unique identifier for a four-player tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TournamentId(pub u64);

impl fmt::Display for TournamentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T-{}", self.0)
    }
}

/// Opaque identifier for a transport connection. Assigned at accept
/// time, never serialized — it exists so the registry can key its
/// connection table without holding socket handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Slot — the two player positions
// ---------------------------------------------------------------------------

/// One of the two player positions in a match.
///
/// On the wire this is the number `1` or `2` (the client-facing
/// convention inherited from the protocol), so serde round-trips it
/// through `u8` rather than a string tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Slot {
    One,
    Two,
}

impl Slot {
    /// The other slot — slot 1's opponent is slot 2 and vice versa.
    pub fn other(self) -> Slot {
        match self {
            Slot::One => Slot::Two,
            Slot::Two => Slot::One,
        }
    }

    /// Zero-based index, for array-backed player storage.
    pub fn index(self) -> usize {
        match self {
            Slot::One => 0,
            Slot::Two => 1,
        }
    }

    /// The wire number (1 or 2).
    pub fn number(self) -> u8 {
        match self {
            Slot::One => 1,
            Slot::Two => 2,
        }
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> u8 {
        slot.number()
    }
}

impl TryFrom<u8> for Slot {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Slot::One),
            2 => Ok(Slot::Two),
            other => Err(ProtocolError::InvalidMessage(format!(
                "player slot must be 1 or 2, got {other}"
            ))),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.number())
    }
}

// ---------------------------------------------------------------------------
// Settings tiers
// ---------------------------------------------------------------------------

/// The ball's launch-speed tier. The simulation maps each tier to a
/// concrete speed; the protocol only carries the name.
///
/// Deserialized through `String` so an unknown tier falls back to the
/// default instead of rejecting the whole message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum BallSpeed {
    Slow,
    #[default]
    Medium,
    Fast,
}

impl From<String> for BallSpeed {
    fn from(value: String) -> Self {
        match value.as_str() {
            "slow" => Self::Slow,
            "fast" => Self::Fast,
            _ => Self::default(),
        }
    }
}

/// The paddle-length tier. Unknown tiers fall back to the default,
/// like [`BallSpeed`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum PaddleSize {
    Short,
    #[default]
    Medium,
    Long,
}

impl From<String> for PaddleSize {
    fn from(value: String) -> Self {
        match value.as_str() {
            "short" => Self::Short,
            "long" => Self::Long,
            _ => Self::default(),
        }
    }
}

/// A continuous paddle-movement intent, as sent in `move` messages.
///
/// `Stop` clears the intent; the paddle holds its position until the
/// next `up`/`down` arrives.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum PaddleDirection {
    Up,
    Down,
    #[default]
    Stop,
}

// ---------------------------------------------------------------------------
// SimState — match lifecycle
// ---------------------------------------------------------------------------

/// The lifecycle state of a match simulation.
///
/// ```text
/// waiting --start--> playing
/// playing --pause--> paused
/// paused  --resume-> playing
/// {waiting,playing,paused} --cancel--> cancelled   (terminal)
/// playing --win score reached--> finished          (terminal)
/// ```
///
/// Transition legality lives in the simulation crate; this type only
/// names the states and answers the questions the registry asks of
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimState {
    Waiting,
    Playing,
    Paused,
    Finished,
    Cancelled,
}

impl SimState {
    /// Returns `true` for states no transition can leave.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled)
    }

    /// Returns `true` while the match is active or about to start —
    /// the states in which a player's seat is held across a disconnect.
    pub fn holds_seats(self) -> bool {
        matches!(self, Self::Waiting | Self::Playing | Self::Paused)
    }
}

impl fmt::Display for SimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Playing => write!(f, "playing"),
            Self::Paused => write!(f, "paused"),
            Self::Finished => write!(f, "finished"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
