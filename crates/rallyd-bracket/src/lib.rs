//! Tournament orchestration for rallyd: four-player single-elimination
//! brackets built on top of the session registry.
//!
//! A tournament is two semifinals and a final, all allocated at
//! creation. The final's player slots start empty and fill as
//! semifinal winners advance; only once both are known does the
//! orchestrator hand back a playable descriptor.
//!
//! # Key types
//!
//! - [`TournamentOrchestrator`] — bracket creation, game creation for
//!   matches, winner advancement, cancellation
//! - [`AdvanceOutcome`] — what advancing a finished bracket game led to
//! - [`BracketError`] — typed failures; every operation is
//!   side-effect-free on failure

mod error;
mod orchestrator;

pub use error::BracketError;
pub use orchestrator::{
    AdvanceOutcome, BracketMatch, NextMatchInfo, Tournament,
    TournamentOrchestrator, TournamentSummary,
};
