//! Registry configuration: timing windows and the automated-opponent
//! roster.

use std::time::Duration;

/// One automated-opponent identity from the deployment configuration.
///
/// A player name matching an entry is flagged as automated at
/// assignment time; the flag lives on the slot from then on and is
/// never re-derived from the name.
#[derive(Debug, Clone)]
pub struct AiIdentity {
    pub name: String,
}

impl AiIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Timing windows and roster for a [`SessionRegistry`](crate::SessionRegistry).
///
/// The defaults are the production values; tests shrink the windows to
/// zero (or stretch them past the test's lifetime) instead of sleeping.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Cadence of the authoritative tick loop.
    pub tick_interval: Duration,

    /// Cadence of the inactivity sweep.
    pub cleanup_interval: Duration,

    /// How long a fully disconnected match is kept paused before it is
    /// force-cancelled and its seats released.
    pub disconnect_grace: Duration,

    /// How long a session may sit without activity before the sweep
    /// removes it.
    pub inactivity_threshold: Duration,

    /// Delay between a match finishing and its result submission, so
    /// the final broadcast settles first.
    pub report_settle_delay: Duration,

    /// Known automated-opponent identities.
    pub ai_roster: Vec<AiIdentity>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(16),
            cleanup_interval: Duration::from_secs(60),
            disconnect_grace: Duration::from_secs(30),
            inactivity_threshold: Duration::from_secs(60 * 60),
            report_settle_delay: Duration::from_millis(250),
            ai_roster: Vec::new(),
        }
    }
}

impl RegistryConfig {
    /// Whether a player name belongs to the automated-opponent roster.
    pub fn is_automated(&self, name: &str) -> bool {
        self.ai_roster.iter().any(|ai| ai.name == name)
    }
}
