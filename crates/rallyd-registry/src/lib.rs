//! Session registry for rallyd: the component that owns every running
//! match and drives them forward in real time.
//!
//! # Key types
//!
//! - [`SessionRegistry`] — the session/connection/player tables and all
//!   operations on them (create, join, reconnect, pause, broadcast, …)
//! - [`driver`] — the fixed-interval tick loop and the periodic
//!   inactivity sweep, spawned once per process
//! - [`StatsReporter`] / [`AiNotifier`] — outbound collaborator hooks,
//!   with reqwest-backed production implementations
//! - [`MatchIndex`] — the bidirectional matchId↔gameId index shared
//!   with the tournament orchestrator
//!
//! # Concurrency model
//!
//! All mutable state lives behind one async mutex. Message handlers
//! only perform short field writes under the lock; the tick driver is
//! the sole caller of the simulation's `tick`. Broadcasting pushes
//! snapshots into unbounded per-connection channels, so a slow or dead
//! connection can never block the tick loop, and outbound collaborator
//! calls run in spawned tasks that never gate simulation progress.

mod config;
pub mod driver;
mod error;
mod link;
mod notify;
mod registry;
mod report;
mod session;

pub use config::{AiIdentity, RegistryConfig};
pub use error::RegistryError;
pub use link::{MatchIndex, MatchLinkage, MatchStage};
pub use notify::{AiNotifier, HttpAiNotifier};
pub use registry::SessionRegistry;
pub use report::{
    CollaboratorError, HttpStatsReporter, MatchReport, PlayerResult,
    ReportSettings, StatsReporter,
};
pub use session::OutboundSender;
