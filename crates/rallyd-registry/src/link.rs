//! The matchId↔gameId index shared between the tournament orchestrator
//! and the registry.
//!
//! The orchestrator owns the index and records an entry whenever it
//! creates a game for a bracket match. The registry holds a clone of
//! the `Arc` and asks one narrow question — "is this game a tournament
//! match, and which one?" — when it builds a result payload. Neither
//! side ever scans the other's tables.

use std::collections::HashMap;
use std::sync::Mutex;

use rallyd_protocol::{GameId, MatchId, TournamentId};

/// Which bracket stage a linked game plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStage {
    SemifinalOne,
    SemifinalTwo,
    Final,
}

impl MatchStage {
    /// Bracket round: 1 for semifinals, 2 for the final.
    pub fn round(self) -> u8 {
        match self {
            Self::SemifinalOne | Self::SemifinalTwo => 1,
            Self::Final => 2,
        }
    }

    /// The label stamped into the stats payload's `match_type`.
    pub fn label(self) -> &'static str {
        match self {
            Self::SemifinalOne => "Semifinal 1",
            Self::SemifinalTwo => "Semifinal 2",
            Self::Final => "Final",
        }
    }
}

/// Linkage between a bracket match and the session created for it.
#[derive(Debug, Clone, Copy)]
pub struct MatchLinkage {
    pub tournament_id: TournamentId,
    pub match_id: MatchId,
    pub stage: MatchStage,
    pub game_id: GameId,
}

/// Bidirectional matchId↔gameId lookup table.
///
/// A plain mutex: lookups are tiny map reads and no holder ever awaits.
#[derive(Debug, Default)]
pub struct MatchIndex {
    inner: Mutex<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    by_game: HashMap<GameId, MatchLinkage>,
    by_match: HashMap<MatchId, GameId>,
}

impl MatchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a newly created bracket game. Overwrites any previous
    /// entry for the same match.
    pub fn record(&self, linkage: MatchLinkage) {
        let mut tables = self.inner.lock().expect("match index poisoned");
        tables.by_match.insert(linkage.match_id, linkage.game_id);
        tables.by_game.insert(linkage.game_id, linkage);
    }

    /// The tournament linkage for a game, if it is a bracket game.
    pub fn linkage_for_game(&self, game_id: GameId) -> Option<MatchLinkage> {
        self.inner
            .lock()
            .expect("match index poisoned")
            .by_game
            .get(&game_id)
            .copied()
    }

    /// The game created for a bracket match, if any.
    pub fn game_for_match(&self, match_id: MatchId) -> Option<GameId> {
        self.inner
            .lock()
            .expect("match index poisoned")
            .by_match
            .get(&match_id)
            .copied()
    }

    /// Drops a match's entry from both directions.
    pub fn remove_match(&self, match_id: MatchId) {
        let mut tables = self.inner.lock().expect("match index poisoned");
        if let Some(game_id) = tables.by_match.remove(&match_id) {
            tables.by_game.remove(&game_id);
        }
    }
}
