//! Error types for the session registry.

use rallyd_protocol::{GameId, SimState, Slot};

/// Errors that can occur during registry operations.
///
/// The transport layer translates these into protocol `error` replies;
/// a REST layer would map `NotFound` to 404 and `NameTaken` to 409.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The game does not exist (never created, cancelled away, or
    /// swept for inactivity).
    #[error("game {0} not found")]
    NotFound(GameId),

    /// A player name must be non-empty.
    #[error("player name must not be empty")]
    InvalidName,

    /// The name is bound to another live session. A name can occupy at
    /// most one active match at a time.
    #[error("player \"{name}\" is already in another game")]
    NameTaken { name: String },

    /// The slot already holds a different player.
    #[error("game {game}: {slot} is already taken")]
    SlotOccupied { game: GameId, slot: Slot },

    /// Both slots are bound to other players.
    #[error("game {0} already has two players")]
    SessionFull(GameId),

    /// Movement input addressed to an automated opponent's slot.
    #[error("game {game}: {slot} is an automated opponent")]
    AutomatedSlot { game: GameId, slot: Slot },

    /// The requested lifecycle transition is not legal from the
    /// session's current state.
    #[error("cannot {action} game {game} while {state}")]
    InvalidTransition {
        game: GameId,
        action: &'static str,
        state: SimState,
    },

    /// `start` requires both slots bound.
    #[error("game {0} needs both players before it can start")]
    MissingPlayers(GameId),
}
