//! Error types for the tournament orchestrator.

use rallyd_protocol::{GameId, MatchId, TournamentId};
use rallyd_registry::RegistryError;

/// Errors that can occur during bracket operations.
///
/// Every orchestrator method fails without partial bracket mutation:
/// a returned error means the tournament state is exactly what it was.
#[derive(Debug, thiserror::Error)]
pub enum BracketError {
    /// The tournament does not exist (never created, cancelled, or
    /// already completed).
    #[error("tournament {0} not found")]
    TournamentNotFound(TournamentId),

    /// The match does not exist.
    #[error("match {0} not found")]
    MatchNotFound(MatchId),

    /// A bracket needs exactly four players.
    #[error("a tournament requires exactly 4 players, got {0}")]
    RosterSize(usize),

    /// Player names must be distinct and non-empty.
    #[error("tournament player names must be distinct and non-empty")]
    InvalidRoster,

    /// The match's player slots are not both populated yet.
    #[error("match {0} does not have both players yet")]
    MatchNotReady(MatchId),

    /// A game has already been created for this match.
    #[error("match {0} already has a game")]
    GameAlreadyCreated(MatchId),

    /// This match's winner was already advanced.
    #[error("match {0} has already advanced its winner")]
    AlreadyAdvanced(MatchId),

    /// The named winner did not play in the match.
    #[error("\"{winner}\" did not play in match {match_id}")]
    InvalidWinner { match_id: MatchId, winner: String },

    /// The game is not indexed to any bracket match.
    #[error("game {0} is not part of a tournament")]
    NotATournamentGame(GameId),

    /// Advancement requires a finished game with a decided winner.
    #[error("game {0} has not finished")]
    GameNotFinished(GameId),

    /// A registry operation failed underneath the orchestrator.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
