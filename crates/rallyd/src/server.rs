//! Server builder and run loop: wires the registry, orchestrator,
//! gateway, and driver together.

use std::sync::Arc;

use rallyd_bracket::TournamentOrchestrator;
use rallyd_gateway::WsGateway;
use rallyd_registry::{
    AiNotifier, HttpAiNotifier, HttpStatsReporter, MatchIndex,
    SessionRegistry, StatsReporter, driver,
};

use crate::{RallydError, ServerConfig};

/// Builder for configuring and starting a rallyd server.
///
/// # Example
///
/// ```rust,no_run
/// use rallyd::{ServerBuilder, ServerConfig};
///
/// # async fn run() -> Result<(), rallyd::RallydError> {
/// let server = ServerBuilder::with_config(ServerConfig::from_env())
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ServerBuilder {
    config: ServerConfig,
}

impl ServerBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Creates a builder from an existing configuration.
    pub fn with_config(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Overrides the listen address.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Builds a server with the production HTTP collaborators.
    pub async fn build(
        self,
    ) -> Result<Server<HttpStatsReporter, HttpAiNotifier>, RallydError> {
        let stats = HttpStatsReporter::new(
            self.config.stats_url.clone(),
            self.config.stats_timeout,
        )?;
        let notifier = HttpAiNotifier::new(
            self.config.ai_url.clone(),
            self.config.ai_timeout,
        )?;
        self.build_with(stats, notifier).await
    }

    /// Builds a server with injected collaborators (tests, embedders).
    pub async fn build_with<S, N>(
        self,
        stats: S,
        notifier: N,
    ) -> Result<Server<S, N>, RallydError>
    where
        S: StatsReporter,
        N: AiNotifier,
    {
        let index = Arc::new(MatchIndex::new());
        let registry = Arc::new(SessionRegistry::new(
            self.config.registry.clone(),
            stats,
            notifier,
            Arc::clone(&index),
        ));
        let orchestrator = Arc::new(TournamentOrchestrator::new(
            Arc::clone(&registry),
            index,
        ));
        let gateway = WsGateway::bind(
            &self.config.bind_addr,
            Arc::clone(&registry),
            Arc::clone(&orchestrator),
        )
        .await?;

        Ok(Server {
            registry,
            orchestrator,
            gateway,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A built rallyd server. [`run`](Self::run) starts the authoritative
/// loop and accepts connections until the process terminates.
pub struct Server<S, N> {
    registry: Arc<SessionRegistry<S, N>>,
    orchestrator: Arc<TournamentOrchestrator<S, N>>,
    gateway: WsGateway<S, N>,
}

impl<S, N> Server<S, N>
where
    S: StatsReporter,
    N: AiNotifier,
{
    /// The bound listen address.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.gateway.local_addr()
    }

    /// Handle to the session registry (REST layers, tests).
    pub fn registry(&self) -> Arc<SessionRegistry<S, N>> {
        Arc::clone(&self.registry)
    }

    /// Handle to the tournament orchestrator (REST layers, tests).
    pub fn orchestrator(&self) -> Arc<TournamentOrchestrator<S, N>> {
        Arc::clone(&self.orchestrator)
    }

    /// Spawns the tick and cleanup loops, then runs the accept loop.
    pub async fn run(self) -> Result<(), RallydError> {
        let driver = driver::spawn(Arc::clone(&self.registry));
        let result = self.gateway.run().await;
        driver.abort();
        result.map_err(RallydError::from)
    }
}

// =========================================================================
// Tests
// =========================================================================
