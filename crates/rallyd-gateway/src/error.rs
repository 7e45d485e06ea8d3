//! Error types for the transport gateway.

/// Errors that can occur while running the gateway.
///
/// Per-connection failures are not represented here — a misbehaving
/// socket only ends its own handler task and is logged at debug level.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Binding the listen address failed.
    #[error("failed to bind gateway address: {0}")]
    Bind(std::io::Error),

    /// Accepting a TCP connection failed.
    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),
}
