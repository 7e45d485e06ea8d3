//! # rallyd
//!
//! Real-time multiplayer paddle-game session engine: an authoritative
//! 60 Hz simulation loop driving many concurrent two-player matches
//! over WebSockets, with reconnection handling, four-player
//! single-elimination tournaments, and fire-and-forget result
//! reporting to an external stats service.
//!
//! The meta crate ties the layers together:
//!
//! ```text
//! client ⇄ rallyd-gateway ⇄ rallyd-registry / rallyd-bracket
//!                                   │
//!                             rallyd-sim (pure physics)
//!                                   │ (tick loop)
//!                             broadcast ⇄ clients
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use rallyd::{ServerBuilder, ServerConfig};
//!
//! # async fn run() -> Result<(), rallyd::RallydError> {
//! let server = ServerBuilder::with_config(ServerConfig::from_env())
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod server;

pub use config::ServerConfig;
pub use error::RallydError;
pub use server::{Server, ServerBuilder};

// Re-export the pieces embedders and tests most often need.
pub use rallyd_protocol as protocol;
pub use rallyd_registry::{
    AiIdentity, AiNotifier, HttpAiNotifier, HttpStatsReporter,
    RegistryConfig, StatsReporter,
};
pub use rallyd_sim::GameOptions;
