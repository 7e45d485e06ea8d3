//! The session registry: owns every running match and all connection
//! and player-name bookkeeping.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::Utc;
use rallyd_protocol::{
    ConnectionId, GameId, GameSnapshot, PaddleDirection, ServerMessage,
    SimState, Slot,
};
use rallyd_sim::{GameOptions, Simulation};
use tokio::sync::Mutex;

use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::link::MatchIndex;
use crate::notify::AiNotifier;
use crate::report::{
    MatchReport, PlayerResult, ReportSettings, StatsReporter,
};
use crate::session::{
    ClientConnection, GameSession, OutboundSender, PlayerBinding,
};

/// Owns all game sessions and drives their bookkeeping.
///
/// Constructed once at startup and shared by `Arc` with the transport
/// layer, the tournament orchestrator, and the tick driver — never an
/// ambient global. Generic over its two outbound collaborators so tests
/// inject recording fakes the way production injects HTTP clients.
pub struct SessionRegistry<S, N> {
    config: RegistryConfig,
    stats: Arc<S>,
    notifier: Arc<N>,
    match_index: Arc<MatchIndex>,
    /// Monotonic epoch for the tick clock; `now_ms` is elapsed since
    /// construction.
    epoch: Instant,
    next_game_id: AtomicU64,
    inner: Mutex<Tables>,
}

/// The mutable tables, guarded by one lock. Handlers hold it only for
/// short field writes; nothing awaits network I/O while holding it.
struct Tables {
    sessions: HashMap<GameId, GameSession>,
    connections: HashMap<ConnectionId, ClientConnection>,
    /// Process-wide name index: a name occupies at most one live match.
    players: HashMap<String, PlayerBinding>,
}

impl<S, N> SessionRegistry<S, N>
where
    S: StatsReporter,
    N: AiNotifier,
{
    /// Creates an empty registry.
    pub fn new(
        config: RegistryConfig,
        stats: S,
        notifier: N,
        match_index: Arc<MatchIndex>,
    ) -> Self {
        Self {
            config,
            stats: Arc::new(stats),
            notifier: Arc::new(notifier),
            match_index,
            epoch: Instant::now(),
            next_game_id: AtomicU64::new(1),
            inner: Mutex::new(Tables {
                sessions: HashMap::new(),
                connections: HashMap::new(),
                players: HashMap::new(),
            }),
        }
    }

    /// The registry's configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Milliseconds of the registry's monotonic clock — the timestamps
    /// fed to `Simulation::tick`.
    pub fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Number of sessions currently held.
    pub async fn session_count(&self) -> usize {
        self.inner.lock().await.sessions.len()
    }

    // -- Session creation & player binding ------------------------------

    /// Allocates a new session wrapping a fresh simulation.
    pub async fn create_session(&self, options: &GameOptions) -> GameId {
        let game_id = GameId(self.next_game_id.fetch_add(1, Ordering::Relaxed));
        let mut guard = self.inner.lock().await;
        guard
            .sessions
            .insert(game_id, GameSession::new(Simulation::new(options)));
        tracing::info!(%game_id, "game created");
        game_id
    }

    /// Creates a session and seats `name` in slot 1, atomically — a
    /// name conflict leaves no session behind.
    pub async fn create_with_player(
        &self,
        options: &GameOptions,
        name: &str,
    ) -> Result<GameId, RegistryError> {
        if name.trim().is_empty() {
            return Err(RegistryError::InvalidName);
        }
        let game_id = {
            let mut guard = self.inner.lock().await;
            let tables = &mut *guard;
            Self::ensure_name_unbound(tables, name)?;

            let game_id =
                GameId(self.next_game_id.fetch_add(1, Ordering::Relaxed));
            tables
                .sessions
                .insert(game_id, GameSession::new(Simulation::new(options)));
            tracing::info!(%game_id, "game created");

            // Cannot conflict: the name was just released/verified free
            // and the session is empty.
            self.bind_player_locked(tables, game_id, Slot::One, name)?;
            game_id
        };
        self.maybe_notify_ai(game_id, Slot::One, name);
        Ok(game_id)
    }

    /// Binds a player to an explicit slot. Idempotent for the same
    /// name/slot pair; a conflict with a live session is rejected.
    pub async fn add_player(
        &self,
        game_id: GameId,
        slot: Slot,
        name: &str,
    ) -> Result<(), RegistryError> {
        {
            let mut guard = self.inner.lock().await;
            let tables = &mut *guard;
            self.bind_player_locked(tables, game_id, slot, name)?;
        }
        self.maybe_notify_ai(game_id, slot, name);
        Ok(())
    }

    /// Seats `name` in the first free slot, or returns the slot the
    /// name already occupies in this session (rejoin).
    pub async fn join(
        &self,
        game_id: GameId,
        name: &str,
    ) -> Result<Slot, RegistryError> {
        let slot = {
            let mut guard = self.inner.lock().await;
            let tables = &mut *guard;

            let session = tables
                .sessions
                .get(&game_id)
                .ok_or(RegistryError::NotFound(game_id))?;

            if let Some(binding) = tables.players.get(name) {
                if binding.game_id == game_id {
                    tracing::debug!(%game_id, player = %name, "rejoin");
                    return Ok(binding.slot);
                }
            }

            let slot = if session.sim.player(Slot::One).name.is_none() {
                Slot::One
            } else if session.sim.player(Slot::Two).name.is_none() {
                Slot::Two
            } else {
                return Err(RegistryError::SessionFull(game_id));
            };

            self.bind_player_locked(tables, game_id, slot, name)?;
            slot
        };
        self.maybe_notify_ai(game_id, slot, name);
        Ok(slot)
    }

    /// Seats a player under the lock. The caller fires the AI
    /// notification afterwards, outside the lock.
    fn bind_player_locked(
        &self,
        tables: &mut Tables,
        game_id: GameId,
        slot: Slot,
        name: &str,
    ) -> Result<(), RegistryError> {
        if name.trim().is_empty() {
            return Err(RegistryError::InvalidName);
        }
        if !tables.sessions.contains_key(&game_id) {
            return Err(RegistryError::NotFound(game_id));
        }

        match tables.players.get(name).copied() {
            Some(binding)
                if binding.game_id == game_id && binding.slot == slot =>
            {
                // Idempotent re-assignment.
                return Ok(());
            }
            Some(binding) if binding.game_id == game_id => {
                return Err(RegistryError::NameTaken {
                    name: name.to_string(),
                });
            }
            Some(_) => Self::ensure_name_unbound(tables, name)?,
            None => {}
        }

        let session = tables
            .sessions
            .get_mut(&game_id)
            .expect("session checked above");
        if let Some(existing) = &session.sim.player(slot).name {
            if existing != name {
                return Err(RegistryError::SlotOccupied {
                    game: game_id,
                    slot,
                });
            }
        }

        let automated = self.config.is_automated(name);
        session.sim.assign_player(slot, name, automated);
        session.touch();
        tables.players.insert(
            name.to_string(),
            PlayerBinding { game_id, slot },
        );

        tracing::info!(
            %game_id,
            player = %name,
            slot = slot.number(),
            automated,
            "player assigned"
        );
        Ok(())
    }

    /// Rejects a name bound to a live session; silently releases a
    /// stale binding to a terminal (or vanished) one. Without the
    /// release, a semifinal winner could never be seated in the final.
    fn ensure_name_unbound(
        tables: &mut Tables,
        name: &str,
    ) -> Result<(), RegistryError> {
        if let Some(binding) = tables.players.get(name) {
            let live = tables
                .sessions
                .get(&binding.game_id)
                .is_some_and(|s| s.sim.state().holds_seats());
            if live {
                return Err(RegistryError::NameTaken {
                    name: name.to_string(),
                });
            }
            tables.players.remove(name);
        }
        Ok(())
    }

    /// Fires the AI assignment notification if `name` is on the roster.
    /// Failures are logged, never fatal — automated opponents are not
    /// locked, so there is nothing to roll back.
    fn maybe_notify_ai(&self, game_id: GameId, slot: Slot, name: &str) {
        if !self.config.is_automated(name) {
            return;
        }
        let notifier = Arc::clone(&self.notifier);
        let ai_name = name.to_string();
        tokio::spawn(async move {
            match notifier
                .notify_assignment(game_id, slot, ai_name.clone())
                .await
            {
                Ok(()) => {
                    tracing::info!(%game_id, ai = %ai_name, "AI notified of assignment");
                }
                Err(e) => {
                    tracing::warn!(%game_id, ai = %ai_name, error = %e, "AI notification failed");
                }
            }
        });
    }

    // -- Connections ----------------------------------------------------

    /// Attaches a transport connection to a session. `name` is the
    /// bound player name, or `None` for spectators.
    ///
    /// A reconnecting player's disconnect entry is cleared; once no
    /// disconnected players remain on a session paused by a disconnect,
    /// the match auto-resumes and a broadcast is issued.
    pub async fn register_connection(
        &self,
        game_id: GameId,
        connection_id: ConnectionId,
        sender: OutboundSender,
        name: Option<String>,
    ) -> Result<(), RegistryError> {
        let mut guard = self.inner.lock().await;
        let tables = &mut *guard;

        if let Some(player) = &name {
            if let Some(binding) = tables.players.get(player) {
                if binding.game_id != game_id {
                    return Err(RegistryError::NameTaken {
                        name: player.clone(),
                    });
                }
            }
        }

        let mut resumed = false;
        {
            let session = tables
                .sessions
                .get_mut(&game_id)
                .ok_or(RegistryError::NotFound(game_id))?;
            session.clients.insert(connection_id);
            session.touch();

            if let Some(player) = &name {
                if session.disconnected.remove(player).is_some() {
                    tracing::info!(%game_id, player = %player, "player reconnected");
                    if session.paused_for_disconnect
                        && session.disconnected.is_empty()
                        && session.sim.state() == SimState::Paused
                    {
                        session.sim.resume();
                        session.paused_for_disconnect = false;
                        resumed = true;
                        tracing::info!(%game_id, "all players back, auto-resuming");
                    }
                }
            }
        }

        tables.connections.insert(
            connection_id,
            ClientConnection {
                sender,
                game_id,
                player_name: name,
            },
        );
        tracing::debug!(%connection_id, %game_id, "connection registered");

        if resumed {
            Self::broadcast_locked(tables, game_id);
        }
        Ok(())
    }

    /// Detaches a connection on disconnect and applies the seat rules:
    ///
    /// - a playing match pauses and broadcasts;
    /// - the name is released immediately unless the match still holds
    ///   seats (waiting/playing/paused);
    /// - a session with zero connections left is cancelled and removed;
    /// - a session whose every bound player has been disconnected
    ///   longer than the grace window is force-cancelled (evaluated
    ///   lazily, here on the unregister path).
    pub async fn unregister_connection(&self, connection_id: ConnectionId) {
        let mut late_report: Option<(GameId, MatchReport)> = None;
        {
            let mut guard = self.inner.lock().await;
            let tables = &mut *guard;

            let Some(conn) = tables.connections.remove(&connection_id) else {
                return;
            };
            let game_id = conn.game_id;
            tracing::debug!(%connection_id, %game_id, "connection unregistered");

            if !tables.sessions.contains_key(&game_id) {
                return;
            }

            let mut broadcast = false;
            let (empty, released) = {
                let session = tables
                    .sessions
                    .get_mut(&game_id)
                    .expect("session checked above");
                session.clients.remove(&connection_id);

                let mut released = None;
                if let Some(player) = conn.player_name {
                    session
                        .disconnected
                        .insert(player.clone(), Instant::now());
                    tracing::info!(%game_id, player = %player, "player disconnected");

                    if session.sim.state() == SimState::Playing {
                        session.sim.pause();
                        session.paused_for_disconnect = true;
                        broadcast = true;
                        tracing::info!(%game_id, "paused on disconnect");
                    }
                    if !session.sim.state().holds_seats() {
                        released = Some(player);
                    }
                }
                (session.clients.is_empty(), released)
            };
            if let Some(player) = released {
                if tables
                    .players
                    .get(&player)
                    .is_some_and(|b| b.game_id == game_id)
                {
                    tables.players.remove(&player);
                }
            }

            if empty {
                if let Some(session) = tables.sessions.remove(&game_id) {
                    Self::release_names(
                        &mut tables.players,
                        &session.sim,
                        game_id,
                    );
                    if session.sim.state() == SimState::Finished
                        && !session.result_reported
                    {
                        late_report =
                            Some((game_id, self.build_report(&session, game_id)));
                    }
                    tracing::info!(%game_id, "session removed, no clients remain");
                }
            } else {
                let grace = self.config.disconnect_grace;
                let force_cancel = {
                    let session =
                        tables.sessions.get(&game_id).expect("still present");
                    let any_player_connected =
                        session.clients.iter().any(|cid| {
                            tables
                                .connections
                                .get(cid)
                                .is_some_and(|c| c.player_name.is_some())
                        });
                    session.sim.state().holds_seats()
                        && !any_player_connected
                        && !session.disconnected.is_empty()
                        && session
                            .disconnected
                            .values()
                            .all(|since| since.elapsed() >= grace)
                };
                if force_cancel {
                    let session = tables
                        .sessions
                        .get_mut(&game_id)
                        .expect("still present");
                    session.sim.cancel();
                    session.touch();
                    tracing::warn!(
                        %game_id,
                        "all players out past the grace window, force-cancelling"
                    );
                    let sim =
                        &tables.sessions.get(&game_id).expect("still present").sim;
                    Self::release_names(&mut tables.players, sim, game_id);
                    broadcast = true;
                }

                if broadcast {
                    Self::broadcast_locked(tables, game_id);
                }
            }
        }

        if let Some((game_id, report)) = late_report {
            self.submit_report(game_id, report);
        }
    }

    // -- Broadcast ------------------------------------------------------

    /// Sends the current snapshot to every connection attached to the
    /// session. A no-op if there are none.
    pub async fn broadcast(&self, game_id: GameId) {
        let guard = self.inner.lock().await;
        Self::broadcast_locked(&guard, game_id);
    }

    fn broadcast_locked(tables: &Tables, game_id: GameId) {
        let Some(session) = tables.sessions.get(&game_id) else {
            return;
        };
        if session.clients.is_empty() {
            return;
        }
        let message = ServerMessage::State {
            data: session.sim.snapshot(),
        };
        for connection_id in &session.clients {
            if let Some(conn) = tables.connections.get(connection_id) {
                // Best-effort: a dead receiver only affects itself.
                let _ = conn.sender.send(message.clone());
            }
        }
    }

    // -- Lifecycle ------------------------------------------------------

    /// Starts a waiting match. Requires both slots bound.
    pub async fn start(
        &self,
        game_id: GameId,
    ) -> Result<GameSnapshot, RegistryError> {
        let mut guard = self.inner.lock().await;
        let tables = &mut *guard;
        let snapshot = {
            let session = tables
                .sessions
                .get_mut(&game_id)
                .ok_or(RegistryError::NotFound(game_id))?;
            if !session.sim.has_both_players() {
                return Err(RegistryError::MissingPlayers(game_id));
            }
            if !session.sim.start() {
                return Err(RegistryError::InvalidTransition {
                    game: game_id,
                    action: "start",
                    state: session.sim.state(),
                });
            }
            if session.started_at.is_none() {
                session.started_at = Some(Utc::now());
            }
            session.touch();
            tracing::info!(%game_id, "game started");
            session.sim.snapshot()
        };
        Self::broadcast_locked(tables, game_id);
        Ok(snapshot)
    }

    /// Pauses a playing match (explicitly — this pause does not
    /// auto-resume on reconnection).
    pub async fn pause(
        &self,
        game_id: GameId,
    ) -> Result<GameSnapshot, RegistryError> {
        self.transition(game_id, "pause", |session| {
            let ok = session.sim.pause();
            if ok {
                session.paused_for_disconnect = false;
            }
            ok
        })
        .await
    }

    /// Resumes a paused match.
    pub async fn resume(
        &self,
        game_id: GameId,
    ) -> Result<GameSnapshot, RegistryError> {
        self.transition(game_id, "resume", |session| {
            let ok = session.sim.resume();
            if ok {
                session.paused_for_disconnect = false;
            }
            ok
        })
        .await
    }

    /// Cancels a non-terminal match and releases its seats.
    pub async fn cancel(
        &self,
        game_id: GameId,
    ) -> Result<GameSnapshot, RegistryError> {
        let mut guard = self.inner.lock().await;
        let tables = &mut *guard;
        let snapshot = {
            let session = tables
                .sessions
                .get_mut(&game_id)
                .ok_or(RegistryError::NotFound(game_id))?;
            if !session.sim.cancel() {
                return Err(RegistryError::InvalidTransition {
                    game: game_id,
                    action: "cancel",
                    state: session.sim.state(),
                });
            }
            session.touch();
            tracing::info!(%game_id, "game cancelled");
            session.sim.snapshot()
        };
        let sim = &tables.sessions.get(&game_id).expect("just updated").sim;
        Self::release_names(&mut tables.players, sim, game_id);
        Self::broadcast_locked(tables, game_id);
        Ok(snapshot)
    }

    /// Resets scores, ball, and paddles for a rematch. Re-arms result
    /// reporting and clears the match's timestamps: each completed run
    /// reports at most once.
    pub async fn reset(
        &self,
        game_id: GameId,
    ) -> Result<GameSnapshot, RegistryError> {
        self.transition(game_id, "reset", |session| {
            let ok = session.sim.reset();
            if ok {
                session.started_at = None;
                session.finished_at = None;
                session.result_reported = false;
            }
            ok
        })
        .await
    }

    /// Shared transition wrapper: apply, touch, broadcast, snapshot.
    async fn transition(
        &self,
        game_id: GameId,
        action: &'static str,
        apply: impl FnOnce(&mut GameSession) -> bool,
    ) -> Result<GameSnapshot, RegistryError> {
        let mut guard = self.inner.lock().await;
        let tables = &mut *guard;
        let snapshot = {
            let session = tables
                .sessions
                .get_mut(&game_id)
                .ok_or(RegistryError::NotFound(game_id))?;
            let state = session.sim.state();
            if !apply(session) {
                return Err(RegistryError::InvalidTransition {
                    game: game_id,
                    action,
                    state,
                });
            }
            session.touch();
            tracing::info!(%game_id, action, "lifecycle transition");
            session.sim.snapshot()
        };
        Self::broadcast_locked(tables, game_id);
        Ok(snapshot)
    }

    // -- Gameplay input -------------------------------------------------

    /// Records a movement intent. Rejected for automated slots.
    pub async fn set_paddle_intent(
        &self,
        game_id: GameId,
        slot: Slot,
        direction: PaddleDirection,
    ) -> Result<(), RegistryError> {
        let mut guard = self.inner.lock().await;
        let session = guard
            .sessions
            .get_mut(&game_id)
            .ok_or(RegistryError::NotFound(game_id))?;
        if session.sim.player(slot).automated {
            return Err(RegistryError::AutomatedSlot {
                game: game_id,
                slot,
            });
        }
        session.sim.set_paddle_intent(slot, direction);
        session.touch();
        Ok(())
    }

    /// Sets an absolute paddle position (clamped). Rejected for
    /// automated slots.
    pub async fn set_paddle_position(
        &self,
        game_id: GameId,
        slot: Slot,
        y: f64,
    ) -> Result<(), RegistryError> {
        let mut guard = self.inner.lock().await;
        let session = guard
            .sessions
            .get_mut(&game_id)
            .ok_or(RegistryError::NotFound(game_id))?;
        if session.sim.player(slot).automated {
            return Err(RegistryError::AutomatedSlot {
                game: game_id,
                slot,
            });
        }
        session.sim.set_paddle_position(slot, y);
        session.touch();
        Ok(())
    }

    /// The current snapshot of a session.
    pub async fn snapshot(
        &self,
        game_id: GameId,
    ) -> Result<GameSnapshot, RegistryError> {
        let guard = self.inner.lock().await;
        guard
            .sessions
            .get(&game_id)
            .map(|session| session.sim.snapshot())
            .ok_or(RegistryError::NotFound(game_id))
    }

    /// Kinematics override forwarded to the simulation; test and replay
    /// tooling.
    pub async fn place_ball(
        &self,
        game_id: GameId,
        x: f64,
        y: f64,
        vx: f64,
        vy: f64,
    ) -> Result<(), RegistryError> {
        let mut guard = self.inner.lock().await;
        let session = guard
            .sessions
            .get_mut(&game_id)
            .ok_or(RegistryError::NotFound(game_id))?;
        session.sim.place_ball(x, y, vx, vy);
        Ok(())
    }

    // -- Tick body ------------------------------------------------------

    /// One pass of the authoritative loop: ticks every playing session
    /// to `now_ms`, broadcasts each ticked session's snapshot, and
    /// returns the sessions that just finished (the driver schedules
    /// their result reports after the settle delay).
    ///
    /// A panicking simulation never takes the loop down: that session
    /// is cancelled, its seats released, and iteration continues.
    pub async fn advance_sessions(&self, now_ms: u64) -> Vec<GameId> {
        let mut guard = self.inner.lock().await;
        let tables = &mut *guard;
        let mut finished = Vec::new();

        let ids: Vec<GameId> = tables
            .sessions
            .iter()
            .filter(|(_, s)| s.sim.state() == SimState::Playing)
            .map(|(id, _)| *id)
            .collect();

        for game_id in ids {
            let mut panicked = false;
            {
                let Some(session) = tables.sessions.get_mut(&game_id) else {
                    continue;
                };
                match panic::catch_unwind(AssertUnwindSafe(|| {
                    session.sim.tick(now_ms)
                })) {
                    Ok(()) => {
                        if session.sim.state() == SimState::Finished {
                            session.finished_at = Some(Utc::now());
                            session.touch();
                            let (s1, s2) = session.sim.scores();
                            tracing::info!(
                                %game_id,
                                player1_score = s1,
                                player2_score = s2,
                                "match finished"
                            );
                            finished.push(game_id);
                        }
                    }
                    Err(_) => panicked = true,
                }
            }

            if panicked {
                tracing::error!(%game_id, "tick panicked, cancelling session");
                if let Some(session) = tables.sessions.get_mut(&game_id) {
                    session.sim.cancel();
                }
                let sim = &tables
                    .sessions
                    .get(&game_id)
                    .expect("just updated")
                    .sim;
                Self::release_names(&mut tables.players, sim, game_id);
            }

            Self::broadcast_locked(tables, game_id);
        }

        finished
    }

    // -- Result reporting -----------------------------------------------

    /// Submits a finished match's result to the stats collaborator.
    ///
    /// Idempotent: guarded by the session's reported flag, so calling
    /// this twice produces exactly one outbound submission. Returns
    /// whether a submission was dispatched.
    pub async fn report_result(&self, game_id: GameId) -> bool {
        let report = {
            let mut guard = self.inner.lock().await;
            let Some(session) = guard.sessions.get_mut(&game_id) else {
                tracing::debug!(%game_id, "report skipped, session gone");
                return false;
            };
            if session.sim.state() != SimState::Finished {
                tracing::debug!(%game_id, "report skipped, not finished");
                return false;
            }
            if session.result_reported {
                tracing::debug!(%game_id, "report skipped, already sent");
                return false;
            }
            session.result_reported = true;
            self.build_report(session, game_id)
        };
        self.submit_report(game_id, report);
        true
    }

    fn build_report(
        &self,
        session: &GameSession,
        game_id: GameId,
    ) -> MatchReport {
        let snapshot = session.sim.snapshot();
        let config = session.sim.config();
        let linkage = self.match_index.linkage_for_game(game_id);
        MatchReport {
            start_time: session.started_at.unwrap_or(session.created_at),
            end_time: session.finished_at.unwrap_or_else(Utc::now),
            settings: ReportSettings {
                ball_speed: config.ball_speed,
                paddle_size: config.paddle_size,
                speed_increment: config.acceleration_enabled,
                points_to_win: config.winning_score,
            },
            players: vec![
                PlayerResult {
                    user_id: snapshot
                        .player1
                        .name
                        .unwrap_or_else(|| "unknown".into()),
                    score: snapshot.player1.score,
                },
                PlayerResult {
                    user_id: snapshot
                        .player2
                        .name
                        .unwrap_or_else(|| "unknown".into()),
                    score: snapshot.player2.score,
                },
            ],
            tournament_id: linkage.map(|l| l.tournament_id),
            match_type: linkage.map(|l| l.stage.label().to_string()),
        }
    }

    /// Fire-and-forget submission; failures are logged, never retried.
    fn submit_report(&self, game_id: GameId, report: MatchReport) {
        let stats = Arc::clone(&self.stats);
        tokio::spawn(async move {
            match stats.report(report).await {
                Ok(()) => {
                    tracing::info!(%game_id, "match result reported");
                }
                Err(e) => {
                    tracing::warn!(%game_id, error = %e, "stats submission failed");
                }
            }
        });
    }

    // -- Cleanup --------------------------------------------------------

    /// Removes sessions idle past the inactivity threshold, releasing
    /// their seats and connection entries first. Returns how many were
    /// removed.
    pub async fn cleanup_inactive(&self) -> usize {
        let mut guard = self.inner.lock().await;
        let tables = &mut *guard;
        let threshold = self.config.inactivity_threshold;

        let stale: Vec<GameId> = tables
            .sessions
            .iter()
            .filter(|(_, s)| s.last_activity.elapsed() >= threshold)
            .map(|(id, _)| *id)
            .collect();

        for game_id in &stale {
            if let Some(session) = tables.sessions.remove(game_id) {
                for connection_id in &session.clients {
                    tables.connections.remove(connection_id);
                }
                Self::release_names(
                    &mut tables.players,
                    &session.sim,
                    *game_id,
                );
                tracing::info!(game_id = %game_id, "session removed for inactivity");
            }
        }

        stale.len()
    }

    /// Releases both slots' name bindings, but only where the binding
    /// still points at this game — a winner already re-seated in a
    /// later bracket match keeps their new binding.
    fn release_names(
        players: &mut HashMap<String, PlayerBinding>,
        sim: &Simulation,
        game_id: GameId,
    ) {
        for slot in [Slot::One, Slot::Two] {
            if let Some(name) = &sim.player(slot).name {
                if players.get(name).is_some_and(|b| b.game_id == game_id) {
                    players.remove(name);
                }
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
