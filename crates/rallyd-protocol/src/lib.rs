//! Wire protocol for rallyd.
//!
//! This crate defines the "language" that clients and the server speak,
//! plus the vocabulary the other crates share:
//!
//! - **Identity types** ([`GameId`], [`MatchId`], [`TournamentId`],
//!   [`ConnectionId`], [`Slot`]) — who and what a message is about.
//! - **Settings tiers** ([`BallSpeed`], [`PaddleSize`]) and the match
//!   lifecycle state ([`SimState`]).
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]) — the flat,
//!   `type`-tagged JSON envelopes that travel over a connection.
//! - **Snapshots** ([`GameSnapshot`] and friends) — the render-ready
//!   view of a match broadcast on every tick.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding
//!   or decoding.
//!
//! The protocol layer knows nothing about sockets, sessions, or
//! tournaments — it only defines shapes. The gateway serializes these
//! with `serde_json`; the registry and simulation reuse the vocabulary
//! so there is exactly one definition of, say, a paddle direction.

mod error;
mod message;
mod snapshot;
mod types;

pub use error::ProtocolError;
pub use message::{ClientMessage, ServerMessage};
pub use snapshot::{BallView, BoardView, GameSnapshot, PlayerView, SettingsView};
pub use types::{
    BallSpeed, ConnectionId, GameId, MatchId, PaddleDirection, PaddleSize,
    SimState, Slot, TournamentId,
};
