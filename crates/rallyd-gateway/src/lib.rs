//! WebSocket transport gateway for rallyd.
//!
//! The gateway is the seam between the network and the core: it
//! accepts persistent duplex connections, assigns each a unique id at
//! accept time, maps every inbound protocol message to exactly one
//! registry/orchestrator call, and relays registry broadcasts back out
//! through a per-connection writer task.
//!
//! Outbound delivery is fire-and-forget: the registry pushes into an
//! unbounded channel and the writer drains it onto the socket, so a
//! slow or dead connection never blocks the tick loop or another
//! session. On socket close the handler unregisters the connection,
//! which triggers the registry's disconnect bookkeeping.

mod error;
mod gateway;
mod handler;

pub use error::GatewayError;
pub use gateway::WsGateway;
