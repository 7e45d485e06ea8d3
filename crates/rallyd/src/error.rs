//! Unified error type for the rallyd server.

use rallyd_bracket::BracketError;
use rallyd_gateway::GatewayError;
use rallyd_registry::{CollaboratorError, RegistryError};

/// Top-level error that wraps the crate-specific errors.
///
/// Embedders of the `rallyd` meta crate deal with this single type;
/// the `#[from]` attributes let `?` convert sub-crate errors
/// automatically.
#[derive(Debug, thiserror::Error)]
pub enum RallydError {
    /// A gateway-level error (bind, accept).
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A registry-level error (sessions, players, connections).
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A bracket-level error (tournaments, matches).
    #[error(transparent)]
    Bracket(#[from] BracketError),

    /// Building an outbound collaborator client failed.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}
