//! Registry bookkeeping records: sessions, connections, and player
//! bindings.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use chrono::{DateTime, Utc};
use rallyd_protocol::{ConnectionId, GameId, ServerMessage, Slot};
use rallyd_sim::Simulation;
use tokio::sync::mpsc;

/// Channel sender delivering outbound messages to one connection's
/// writer task. Unbounded and fire-and-forget: pushing a snapshot never
/// blocks the tick loop, and a closed receiver just drops the message.
pub type OutboundSender = mpsc::UnboundedSender<ServerMessage>;

/// One running match plus its connection bookkeeping.
pub(crate) struct GameSession {
    /// The embedded authoritative simulation.
    pub(crate) sim: Simulation,

    /// Connections currently attached (players and spectators alike).
    pub(crate) clients: HashSet<ConnectionId>,

    /// Player names whose connection dropped, with the moment it did.
    /// Cleared on reconnection; consulted by the force-cancel rule.
    pub(crate) disconnected: HashMap<String, Instant>,

    /// Wall-clock timestamps for duration reporting.
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) started_at: Option<DateTime<Utc>>,
    pub(crate) finished_at: Option<DateTime<Utc>>,

    /// Monotonic timestamp of the last client or lifecycle action,
    /// consulted by the inactivity sweep.
    pub(crate) last_activity: Instant,

    /// At-most-once guard for stats submission.
    pub(crate) result_reported: bool,

    /// `true` while a pause was caused by a disconnect rather than an
    /// explicit `pause` — only such pauses auto-resume on reconnect.
    pub(crate) paused_for_disconnect: bool,
}

impl GameSession {
    pub(crate) fn new(sim: Simulation) -> Self {
        Self {
            sim,
            clients: HashSet::new(),
            disconnected: HashMap::new(),
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            last_activity: Instant::now(),
            result_reported: false,
            paused_for_disconnect: false,
        }
    }

    /// Stamps the session as recently active.
    pub(crate) fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

/// A transport connection attached to a session. Owned by the registry
/// for the lifetime of the socket; destroyed on disconnect.
pub(crate) struct ClientConnection {
    pub(crate) sender: OutboundSender,
    pub(crate) game_id: GameId,
    /// Bound player name; `None` for spectators.
    pub(crate) player_name: Option<String>,
}

/// Process-wide record of the session and slot a player name occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PlayerBinding {
    pub(crate) game_id: GameId,
    pub(crate) slot: Slot,
}
