//! The tournament orchestrator: creates brackets, wires matches, and
//! advances winners.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use rallyd_protocol::{GameId, GameSnapshot, MatchId, SimState, Slot, TournamentId};
use rallyd_registry::{
    AiNotifier, MatchIndex, MatchLinkage, MatchStage, SessionRegistry,
    StatsReporter,
};
use rallyd_sim::GameOptions;
use rand::seq::SliceRandom;
use tokio::sync::Mutex;

use crate::BracketError;

/// Counters for generating unique tournament and match ids.
static NEXT_TOURNAMENT_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_MATCH_ID: AtomicU64 = AtomicU64::new(1);

/// A four-player single-elimination tournament.
#[derive(Debug, Clone)]
pub struct Tournament {
    pub id: TournamentId,
    /// The seeding order after the creation-time shuffle.
    pub players: [String; 4],
    /// `[semifinal 1, semifinal 2, final]`.
    pub match_ids: [MatchId; 3],
    /// Settings every bracket game is created with.
    pub settings: GameOptions,
    pub created_at: DateTime<Utc>,
}

/// One bracket match. Both semifinals are fully seeded at creation;
/// the final's slots fill as winners advance.
#[derive(Debug, Clone)]
pub struct BracketMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub stage: MatchStage,
    pub player1: Option<String>,
    pub player2: Option<String>,
    /// The match this one's winner feeds, and which of its slots.
    pub feeds: Option<(MatchId, Slot)>,
    /// The session created for this match, once there is one.
    pub game_id: Option<GameId>,
    /// Set once the winner has been advanced out of this match.
    pub advanced: bool,
}

/// Returned by [`TournamentOrchestrator::create_tournament`].
#[derive(Debug, Clone)]
pub struct TournamentSummary {
    pub tournament_id: TournamentId,
    pub match_ids: [MatchId; 3],
    /// Shuffled seeding order.
    pub players: [String; 4],
}

/// Descriptor of a next-round match that just became fully seeded.
/// The caller is responsible for creating its game.
#[derive(Debug, Clone, PartialEq)]
pub struct NextMatchInfo {
    pub match_id: MatchId,
    pub stage: MatchStage,
    pub player1: String,
    pub player2: String,
}

/// What advancing a finished bracket game led to.
#[derive(Debug)]
pub enum AdvanceOutcome {
    /// Both feeders have reported; the next game exists with both
    /// winners seated (still `waiting` — someone has to start it).
    NextMatchReady {
        match_id: MatchId,
        game_id: GameId,
        snapshot: GameSnapshot,
    },
    /// The other semifinal has not finished yet.
    AwaitingOpponent { tournament_id: TournamentId },
    /// That was the final: the bracket is done.
    TournamentComplete {
        tournament_id: TournamentId,
        champion: String,
    },
}

/// Builds and advances four-player brackets on top of the registry.
///
/// Owns the [`MatchIndex`]; the registry holds a clone of the `Arc`
/// and queries it when stamping tournament linkage onto result
/// payloads.
pub struct TournamentOrchestrator<S, N> {
    registry: Arc<SessionRegistry<S, N>>,
    index: Arc<MatchIndex>,
    inner: Mutex<Brackets>,
}

struct Brackets {
    tournaments: HashMap<TournamentId, Tournament>,
    matches: HashMap<MatchId, BracketMatch>,
}

impl<S, N> TournamentOrchestrator<S, N>
where
    S: StatsReporter,
    N: AiNotifier,
{
    /// Creates an orchestrator sharing `index` with the registry.
    pub fn new(
        registry: Arc<SessionRegistry<S, N>>,
        index: Arc<MatchIndex>,
    ) -> Self {
        Self {
            registry,
            index,
            inner: Mutex::new(Brackets {
                tournaments: HashMap::new(),
                matches: HashMap::new(),
            }),
        }
    }

    /// Creates a bracket from exactly four distinct players.
    ///
    /// Players are shuffled uniformly; semifinal 1 pairs seeds 1 and 4,
    /// semifinal 2 pairs seeds 2 and 3, and each semifinal's winner
    /// feeds its own slot of the pre-allocated final.
    pub async fn create_tournament(
        &self,
        players: &[String],
        settings: GameOptions,
    ) -> Result<TournamentSummary, BracketError> {
        if players.len() != 4 {
            return Err(BracketError::RosterSize(players.len()));
        }
        let distinct: HashSet<&str> =
            players.iter().map(String::as_str).collect();
        if distinct.len() != 4
            || players.iter().any(|p| p.trim().is_empty())
        {
            return Err(BracketError::InvalidRoster);
        }

        let mut seeded = players.to_vec();
        seeded.shuffle(&mut rand::rng());
        let seeded: [String; 4] =
            seeded.try_into().expect("length checked above");

        let tournament_id =
            TournamentId(NEXT_TOURNAMENT_ID.fetch_add(1, Ordering::Relaxed));
        let semi1_id = MatchId(NEXT_MATCH_ID.fetch_add(1, Ordering::Relaxed));
        let semi2_id = MatchId(NEXT_MATCH_ID.fetch_add(1, Ordering::Relaxed));
        let final_id = MatchId(NEXT_MATCH_ID.fetch_add(1, Ordering::Relaxed));

        let semi1 = BracketMatch {
            id: semi1_id,
            tournament_id,
            stage: MatchStage::SemifinalOne,
            player1: Some(seeded[0].clone()),
            player2: Some(seeded[3].clone()),
            feeds: Some((final_id, Slot::One)),
            game_id: None,
            advanced: false,
        };
        let semi2 = BracketMatch {
            id: semi2_id,
            tournament_id,
            stage: MatchStage::SemifinalTwo,
            player1: Some(seeded[1].clone()),
            player2: Some(seeded[2].clone()),
            feeds: Some((final_id, Slot::Two)),
            game_id: None,
            advanced: false,
        };
        let final_match = BracketMatch {
            id: final_id,
            tournament_id,
            stage: MatchStage::Final,
            player1: None,
            player2: None,
            feeds: None,
            game_id: None,
            advanced: false,
        };

        let tournament = Tournament {
            id: tournament_id,
            players: seeded.clone(),
            match_ids: [semi1_id, semi2_id, final_id],
            settings,
            created_at: Utc::now(),
        };

        let mut brackets = self.inner.lock().await;
        brackets.matches.insert(semi1_id, semi1);
        brackets.matches.insert(semi2_id, semi2);
        brackets.matches.insert(final_id, final_match);
        brackets.tournaments.insert(tournament_id, tournament);

        tracing::info!(
            %tournament_id,
            players = ?seeded,
            "tournament created"
        );

        Ok(TournamentSummary {
            tournament_id,
            match_ids: [semi1_id, semi2_id, final_id],
            players: seeded,
        })
    }

    /// Creates a registry session for a fully seeded match, binds both
    /// players, and records the linkage in the [`MatchIndex`].
    pub async fn create_game_for_match(
        &self,
        match_id: MatchId,
        settings: &GameOptions,
    ) -> Result<GameId, BracketError> {
        let mut brackets = self.inner.lock().await;
        let (tournament_id, stage, player1, player2) = {
            let m = brackets
                .matches
                .get(&match_id)
                .ok_or(BracketError::MatchNotFound(match_id))?;
            if m.game_id.is_some() {
                return Err(BracketError::GameAlreadyCreated(match_id));
            }
            let (Some(p1), Some(p2)) = (&m.player1, &m.player2) else {
                return Err(BracketError::MatchNotReady(match_id));
            };
            (m.tournament_id, m.stage, p1.clone(), p2.clone())
        };

        let game_id = self.registry.create_session(settings).await;
        for (slot, player) in
            [(Slot::One, &player1), (Slot::Two, &player2)]
        {
            if let Err(e) =
                self.registry.add_player(game_id, slot, player).await
            {
                // Compensate so a bind failure leaves nothing behind.
                let _ = self.registry.cancel(game_id).await;
                return Err(BracketError::Registry(e));
            }
        }

        let m = brackets
            .matches
            .get_mut(&match_id)
            .expect("match checked above");
        m.game_id = Some(game_id);
        self.index.record(MatchLinkage {
            tournament_id,
            match_id,
            stage,
            game_id,
        });

        tracing::info!(
            %tournament_id, %match_id, %game_id,
            player1 = %player1, player2 = %player2,
            "bracket game created"
        );
        Ok(game_id)
    }

    /// Advances a match's winner into the next round.
    ///
    /// Returns the next match's descriptor exactly once — when the
    /// second of its feeders reports — and `None` otherwise (first
    /// feeder, or the final, which feeds nothing).
    pub async fn advance_winner(
        &self,
        match_id: MatchId,
        winner: &str,
    ) -> Result<Option<NextMatchInfo>, BracketError> {
        let mut brackets = self.inner.lock().await;
        Self::advance_winner_locked(&mut brackets, match_id, winner)
    }

    fn advance_winner_locked(
        brackets: &mut Brackets,
        match_id: MatchId,
        winner: &str,
    ) -> Result<Option<NextMatchInfo>, BracketError> {
        let feeds = {
            let m = brackets
                .matches
                .get(&match_id)
                .ok_or(BracketError::MatchNotFound(match_id))?;
            if m.player1.as_deref() != Some(winner)
                && m.player2.as_deref() != Some(winner)
            {
                return Err(BracketError::InvalidWinner {
                    match_id,
                    winner: winner.to_string(),
                });
            }
            if m.advanced {
                return Err(BracketError::AlreadyAdvanced(match_id));
            }
            m.feeds
        };

        let Some((next_id, slot)) = feeds else {
            // The final feeds nothing.
            brackets
                .matches
                .get_mut(&match_id)
                .expect("present above")
                .advanced = true;
            return Ok(None);
        };

        // Validate before mutating: failure must leave no trace.
        if !brackets.matches.contains_key(&next_id) {
            return Err(BracketError::MatchNotFound(next_id));
        }

        brackets
            .matches
            .get_mut(&match_id)
            .expect("present above")
            .advanced = true;
        let next = brackets
            .matches
            .get_mut(&next_id)
            .expect("checked above");
        match slot {
            Slot::One => next.player1 = Some(winner.to_string()),
            Slot::Two => next.player2 = Some(winner.to_string()),
        }
        tracing::info!(
            %match_id, winner, next_match = %next_id,
            slot = slot.number(),
            "winner advanced"
        );

        if let (Some(p1), Some(p2)) = (&next.player1, &next.player2) {
            Ok(Some(NextMatchInfo {
                match_id: next_id,
                stage: next.stage,
                player1: p1.clone(),
                player2: p2.clone(),
            }))
        } else {
            Ok(None)
        }
    }

    /// Drives the whole advancement flow from a finished bracket game:
    /// determines the winner from the final snapshot, advances them,
    /// and — when the next match just became fully seeded — creates its
    /// game.
    pub async fn advance_from_game(
        &self,
        game_id: GameId,
    ) -> Result<AdvanceOutcome, BracketError> {
        let linkage = self
            .index
            .linkage_for_game(game_id)
            .ok_or(BracketError::NotATournamentGame(game_id))?;

        let snapshot = self.registry.snapshot(game_id).await?;
        if snapshot.state != SimState::Finished {
            return Err(BracketError::GameNotFinished(game_id));
        }
        // A finished match always has a leader (the win score was
        // reached), so a tie can only mean a stale snapshot.
        let winner_slot = snapshot
            .leader()
            .ok_or(BracketError::GameNotFinished(game_id))?;
        let winner = snapshot
            .player(winner_slot)
            .name
            .clone()
            .ok_or(BracketError::GameNotFinished(game_id))?;

        if linkage.stage == MatchStage::Final {
            self.complete(linkage.tournament_id, &winner).await;
            return Ok(AdvanceOutcome::TournamentComplete {
                tournament_id: linkage.tournament_id,
                champion: winner,
            });
        }

        let (advanced, settings) = {
            let mut brackets = self.inner.lock().await;
            let settings = brackets
                .tournaments
                .get(&linkage.tournament_id)
                .ok_or(BracketError::TournamentNotFound(
                    linkage.tournament_id,
                ))?
                .settings
                .clone();
            let advanced = Self::advance_winner_locked(
                &mut brackets,
                linkage.match_id,
                &winner,
            )?;
            (advanced, settings)
        };

        match advanced {
            Some(info) => {
                let next_game = self
                    .create_game_for_match(info.match_id, &settings)
                    .await?;
                let snapshot = self.registry.snapshot(next_game).await?;
                Ok(AdvanceOutcome::NextMatchReady {
                    match_id: info.match_id,
                    game_id: next_game,
                    snapshot,
                })
            }
            None => Ok(AdvanceOutcome::AwaitingOpponent {
                tournament_id: linkage.tournament_id,
            }),
        }
    }

    /// Discards a completed tournament's bracket state.
    ///
    /// Semifinal index entries go too (their results were reported long
    /// before the final could finish); the final's entry stays until
    /// its own report has had its settle delay.
    async fn complete(&self, tournament_id: TournamentId, champion: &str) {
        let mut brackets = self.inner.lock().await;
        if let Some(tournament) =
            brackets.tournaments.remove(&tournament_id)
        {
            let [semi1, semi2, final_id] = tournament.match_ids;
            for match_id in [semi1, semi2, final_id] {
                brackets.matches.remove(&match_id);
            }
            self.index.remove_match(semi1);
            self.index.remove_match(semi2);
            tracing::info!(%tournament_id, champion, "tournament complete");
        }
    }

    /// Cancels every created session of a tournament and discards all
    /// orchestrator state for it.
    pub async fn cancel_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> Result<(), BracketError> {
        let games: Vec<GameId> = {
            let mut brackets = self.inner.lock().await;
            let tournament = brackets
                .tournaments
                .remove(&tournament_id)
                .ok_or(BracketError::TournamentNotFound(tournament_id))?;
            let mut games = Vec::new();
            for match_id in tournament.match_ids {
                if let Some(m) = brackets.matches.remove(&match_id) {
                    games.extend(m.game_id);
                }
                self.index.remove_match(match_id);
            }
            games
        };

        for game_id in games {
            if let Err(e) = self.registry.cancel(game_id).await {
                tracing::debug!(%game_id, error = %e, "bracket game already gone");
            }
        }

        tracing::info!(%tournament_id, "tournament cancelled");
        Ok(())
    }

    /// A tournament's current record.
    pub async fn tournament(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Tournament, BracketError> {
        self.inner
            .lock()
            .await
            .tournaments
            .get(&tournament_id)
            .cloned()
            .ok_or(BracketError::TournamentNotFound(tournament_id))
    }

    /// A match's current record.
    pub async fn match_info(
        &self,
        match_id: MatchId,
    ) -> Result<BracketMatch, BracketError> {
        self.inner
            .lock()
            .await
            .matches
            .get(&match_id)
            .cloned()
            .ok_or(BracketError::MatchNotFound(match_id))
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rallyd_registry::{CollaboratorError, MatchReport, RegistryConfig};
    use std::sync::Mutex as StdMutex;

    #[derive(Clone, Default)]
    struct RecordingStats {
        reports: Arc<StdMutex<Vec<MatchReport>>>,
    }

    impl StatsReporter for RecordingStats {
        async fn report(
            &self,
            report: MatchReport,
        ) -> Result<(), CollaboratorError> {
            self.reports.lock().unwrap().push(report);
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

    type TestOrchestrator = TournamentOrchestrator<RecordingStats, NullNotifier>;
    type TestRegistry = SessionRegistry<RecordingStats, NullNotifier>;

    fn setup() -> (Arc<TestRegistry>, TestOrchestrator) {
        let index = Arc::new(MatchIndex::new());
        let registry = Arc::new(SessionRegistry::new(
            RegistryConfig::default(),
            RecordingStats::default(),
            NullNotifier,
            Arc::clone(&index),
        ));
        let orchestrator =
            TournamentOrchestrator::new(Arc::clone(&registry), index);
        (registry, orchestrator)
    }

    fn roster() -> Vec<String> {
        ["Anna", "Bea", "Cleo", "Dot"]
            .map(String::from)
            .to_vec()
    }

    /// Drives a started bracket game to `finished` with slot 1 winning.
    async fn finish_with_slot_one_winning(
        registry: &TestRegistry,
        game_id: GameId,
    ) {
        registry.start(game_id).await.unwrap();
        registry
            .set_paddle_position(game_id, Slot::Two, 320.0)
            .await
            .unwrap();
        let mut now = 0;
        registry.advance_sessions(now).await;
        while registry.snapshot(game_id).await.unwrap().state
            != SimState::Finished
        {
            registry
                .place_ball(game_id, 595.0, 30.0, 8.0, 0.0)
                .await
                .unwrap();
            now += 17;
            registry.advance_sessions(now).await;
        }
    }

    // ==================================================================
    // Creation
    // ==================================================================

    #[tokio::test]
    async fn test_create_tournament_rejects_wrong_roster_size() {
        let (_registry, orchestrator) = setup();
        let three: Vec<String> =
            ["a", "b", "c"].map(String::from).to_vec();
        assert!(matches!(
            orchestrator
                .create_tournament(&three, GameOptions::default())
                .await,
            Err(BracketError::RosterSize(3))
        ));

        let five: Vec<String> =
            ["a", "b", "c", "d", "e"].map(String::from).to_vec();
        assert!(matches!(
            orchestrator
                .create_tournament(&five, GameOptions::default())
                .await,
            Err(BracketError::RosterSize(5))
        ));
    }

    #[tokio::test]
    async fn test_create_tournament_rejects_duplicate_names() {
        let (_registry, orchestrator) = setup();
        let dupes: Vec<String> =
            ["a", "b", "b", "d"].map(String::from).to_vec();
        assert!(matches!(
            orchestrator
                .create_tournament(&dupes, GameOptions::default())
                .await,
            Err(BracketError::InvalidRoster)
        ));
    }

    #[tokio::test]
    async fn test_create_tournament_yields_three_wired_matches() {
        let (_registry, orchestrator) = setup();
        let summary = orchestrator
            .create_tournament(&roster(), GameOptions::default())
            .await
            .unwrap();
        let [semi1_id, semi2_id, final_id] = summary.match_ids;

        // The seeding is a permutation of the input roster.
        let mut seeded = summary.players.to_vec();
        seeded.sort();
        let mut input = roster();
        input.sort();
        assert_eq!(seeded, input);

        // Semifinal 1 pairs seeds 1 and 4; semifinal 2 pairs 2 and 3.
        let semi1 = orchestrator.match_info(semi1_id).await.unwrap();
        assert_eq!(semi1.player1.as_deref(), Some(summary.players[0].as_str()));
        assert_eq!(semi1.player2.as_deref(), Some(summary.players[3].as_str()));
        assert_eq!(semi1.feeds, Some((final_id, Slot::One)));

        let semi2 = orchestrator.match_info(semi2_id).await.unwrap();
        assert_eq!(semi2.player1.as_deref(), Some(summary.players[1].as_str()));
        assert_eq!(semi2.player2.as_deref(), Some(summary.players[2].as_str()));
        assert_eq!(semi2.feeds, Some((final_id, Slot::Two)));

        // The final starts unseeded and feeds nothing.
        let final_match = orchestrator.match_info(final_id).await.unwrap();
        assert!(final_match.player1.is_none());
        assert!(final_match.player2.is_none());
        assert!(final_match.feeds.is_none());
        assert!(final_match.game_id.is_none());
    }

    // ==================================================================
    // Game creation
    // ==================================================================

    #[tokio::test]
    async fn test_create_game_binds_both_players_and_indexes_the_match() {
        let (registry, orchestrator) = setup();
        let summary = orchestrator
            .create_tournament(&roster(), GameOptions::default())
            .await
            .unwrap();
        let semi1_id = summary.match_ids[0];

        let game_id = orchestrator
            .create_game_for_match(semi1_id, &GameOptions::default())
            .await
            .unwrap();

        let snapshot = registry.snapshot(game_id).await.unwrap();
        assert_eq!(
            snapshot.player1.name.as_deref(),
            Some(summary.players[0].as_str())
        );
        assert_eq!(
            snapshot.player2.name.as_deref(),
            Some(summary.players[3].as_str())
        );

        let record = orchestrator.match_info(semi1_id).await.unwrap();
        assert_eq!(record.game_id, Some(game_id));
    }

    #[tokio::test]
    async fn test_create_game_for_unseeded_final_is_rejected() {
        let (_registry, orchestrator) = setup();
        let summary = orchestrator
            .create_tournament(&roster(), GameOptions::default())
            .await
            .unwrap();
        let final_id = summary.match_ids[2];

        assert!(matches!(
            orchestrator
                .create_game_for_match(final_id, &GameOptions::default())
                .await,
            Err(BracketError::MatchNotReady(_))
        ));
    }

    #[tokio::test]
    async fn test_create_game_twice_is_rejected() {
        let (_registry, orchestrator) = setup();
        let summary = orchestrator
            .create_tournament(&roster(), GameOptions::default())
            .await
            .unwrap();
        let semi1_id = summary.match_ids[0];

        orchestrator
            .create_game_for_match(semi1_id, &GameOptions::default())
            .await
            .unwrap();
        assert!(matches!(
            orchestrator
                .create_game_for_match(semi1_id, &GameOptions::default())
                .await,
            Err(BracketError::GameAlreadyCreated(_))
        ));
    }

    // ==================================================================
    // Winner advancement
    // ==================================================================

    #[tokio::test]
    async fn test_advance_winner_rejects_non_participant() {
        let (_registry, orchestrator) = setup();
        let summary = orchestrator
            .create_tournament(&roster(), GameOptions::default())
            .await
            .unwrap();

        let result = orchestrator
            .advance_winner(summary.match_ids[0], "Zelda")
            .await;
        assert!(matches!(result, Err(BracketError::InvalidWinner { .. })));
    }

    #[tokio::test]
    async fn test_advance_winner_twice_is_rejected() {
        let (_registry, orchestrator) = setup();
        let summary = orchestrator
            .create_tournament(&roster(), GameOptions::default())
            .await
            .unwrap();
        let winner = summary.players[0].clone();

        orchestrator
            .advance_winner(summary.match_ids[0], &winner)
            .await
            .unwrap();
        assert!(matches!(
            orchestrator
                .advance_winner(summary.match_ids[0], &winner)
                .await,
            Err(BracketError::AlreadyAdvanced(_))
        ));
    }

    #[tokio::test]
    async fn test_final_descriptor_returned_once_both_semis_report() {
        let (_registry, orchestrator) = setup();
        let summary = orchestrator
            .create_tournament(&roster(), GameOptions::default())
            .await
            .unwrap();
        let [semi1_id, semi2_id, final_id] = summary.match_ids;
        let semi1_winner = summary.players[0].clone();
        let semi2_winner = summary.players[2].clone();

        let first = orchestrator
            .advance_winner(semi1_id, &semi1_winner)
            .await
            .unwrap();
        assert!(first.is_none(), "final not ready after one semifinal");

        let second = orchestrator
            .advance_winner(semi2_id, &semi2_winner)
            .await
            .unwrap()
            .expect("final ready after both semifinals");
        assert_eq!(second.match_id, final_id);
        assert_eq!(second.player1, semi1_winner);
        assert_eq!(second.player2, semi2_winner);
    }

    #[tokio::test]
    async fn test_semifinal_order_does_not_matter() {
        let (_registry, orchestrator) = setup();
        let summary = orchestrator
            .create_tournament(&roster(), GameOptions::default())
            .await
            .unwrap();
        let [semi1_id, semi2_id, final_id] = summary.match_ids;

        // Second semifinal reports first this time.
        let first = orchestrator
            .advance_winner(semi2_id, &summary.players[1].clone())
            .await
            .unwrap();
        assert!(first.is_none());

        let second = orchestrator
            .advance_winner(semi1_id, &summary.players[3].clone())
            .await
            .unwrap()
            .expect("final ready");
        assert_eq!(second.match_id, final_id);
        // Winners land in their wired slots regardless of order.
        assert_eq!(second.player1, summary.players[3]);
        assert_eq!(second.player2, summary.players[1]);
    }

    // ==================================================================
    // Full flow through advance_from_game
    // ==================================================================

    #[tokio::test]
    async fn test_full_bracket_flow_to_champion() {
        let (registry, orchestrator) = setup();
        let summary = orchestrator
            .create_tournament(&roster(), GameOptions::default())
            .await
            .unwrap();
        let [semi1_id, semi2_id, _final_id] = summary.match_ids;

        // Semifinal 1: slot 1 (seed 1) wins.
        let game1 = orchestrator
            .create_game_for_match(semi1_id, &GameOptions::default())
            .await
            .unwrap();
        finish_with_slot_one_winning(&registry, game1).await;
        let outcome = orchestrator.advance_from_game(game1).await.unwrap();
        assert!(matches!(
            outcome,
            AdvanceOutcome::AwaitingOpponent { tournament_id }
                if tournament_id == summary.tournament_id
        ));

        // Semifinal 2: slot 1 (seed 2) wins — final becomes ready and
        // its game is created with both winners seated.
        let game2 = orchestrator
            .create_game_for_match(semi2_id, &GameOptions::default())
            .await
            .unwrap();
        finish_with_slot_one_winning(&registry, game2).await;
        let outcome = orchestrator.advance_from_game(game2).await.unwrap();
        let AdvanceOutcome::NextMatchReady {
            game_id: final_game,
            snapshot,
            ..
        } = outcome
        else {
            panic!("expected the final to become ready");
        };
        assert_eq!(snapshot.state, SimState::Waiting);
        assert_eq!(
            snapshot.player1.name.as_deref(),
            Some(summary.players[0].as_str())
        );
        assert_eq!(
            snapshot.player2.name.as_deref(),
            Some(summary.players[1].as_str())
        );

        // Final: slot 1 (seed 1) wins the bracket.
        finish_with_slot_one_winning(&registry, final_game).await;
        let outcome =
            orchestrator.advance_from_game(final_game).await.unwrap();
        let AdvanceOutcome::TournamentComplete {
            tournament_id,
            champion,
        } = outcome
        else {
            panic!("expected tournament completion");
        };
        assert_eq!(tournament_id, summary.tournament_id);
        assert_eq!(champion, summary.players[0]);

        // The bracket state is discarded.
        assert!(matches!(
            orchestrator.tournament(summary.tournament_id).await,
            Err(BracketError::TournamentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_advance_from_unfinished_game_is_rejected() {
        let (_registry, orchestrator) = setup();
        let summary = orchestrator
            .create_tournament(&roster(), GameOptions::default())
            .await
            .unwrap();
        let game = orchestrator
            .create_game_for_match(summary.match_ids[0], &GameOptions::default())
            .await
            .unwrap();

        assert!(matches!(
            orchestrator.advance_from_game(game).await,
            Err(BracketError::GameNotFinished(_))
        ));
    }

    #[tokio::test]
    async fn test_advance_from_non_tournament_game_is_rejected() {
        let (registry, orchestrator) = setup();
        let game = registry
            .create_with_player(&GameOptions::default(), "solo")
            .await
            .unwrap();
        assert!(matches!(
            orchestrator.advance_from_game(game).await,
            Err(BracketError::NotATournamentGame(_))
        ));
    }

    // ==================================================================
    // Cancellation
    // ==================================================================

    #[tokio::test]
    async fn test_cancel_tournament_cancels_created_games() {
        let (registry, orchestrator) = setup();
        let summary = orchestrator
            .create_tournament(&roster(), GameOptions::default())
            .await
            .unwrap();
        let game = orchestrator
            .create_game_for_match(summary.match_ids[0], &GameOptions::default())
            .await
            .unwrap();

        orchestrator
            .cancel_tournament(summary.tournament_id)
            .await
            .unwrap();

        let snapshot = registry.snapshot(game).await.unwrap();
        assert_eq!(snapshot.state, SimState::Cancelled);
        assert!(matches!(
            orchestrator.tournament(summary.tournament_id).await,
            Err(BracketError::TournamentNotFound(_))
        ));
        assert!(matches!(
            orchestrator.match_info(summary.match_ids[0]).await,
            Err(BracketError::MatchNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_unknown_tournament_is_not_found() {
        let (_registry, orchestrator) = setup();
        assert!(matches!(
            orchestrator.cancel_tournament(TournamentId(999)).await,
            Err(BracketError::TournamentNotFound(_))
        ));
    }
}
