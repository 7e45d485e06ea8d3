//! The accept loop: TCP listener, WebSocket upgrade, one handler task
//! per connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rallyd_bracket::TournamentOrchestrator;
use rallyd_protocol::ConnectionId;
use rallyd_registry::{AiNotifier, SessionRegistry, StatsReporter};
use tokio::net::TcpListener;

use crate::GatewayError;
use crate::handler::handle_connection;

/// Counter for generating unique connection ids at accept time.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// The WebSocket gateway. Holds the listener plus shared handles to
/// the registry and orchestrator; each accepted connection gets its
/// own handler task.
pub struct WsGateway<S, N> {
    listener: TcpListener,
    registry: Arc<SessionRegistry<S, N>>,
    orchestrator: Arc<TournamentOrchestrator<S, N>>,
}

impl<S, N> WsGateway<S, N>
where
    S: StatsReporter,
    N: AiNotifier,
{
    /// Binds the gateway to `addr`.
    pub async fn bind(
        addr: &str,
        registry: Arc<SessionRegistry<S, N>>,
        orchestrator: Arc<TournamentOrchestrator<S, N>>,
    ) -> Result<Self, GatewayError> {
        let listener =
            TcpListener::bind(addr).await.map_err(GatewayError::Bind)?;
        tracing::info!(addr, "gateway listening");
        Ok(Self {
            listener,
            registry,
            orchestrator,
        })
    }

    /// The local address the gateway is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop until the process terminates.
    ///
    /// A failed WebSocket upgrade only drops that socket; a failed TCP
    /// accept is logged and the loop continues.
    pub async fn run(self) -> Result<(), GatewayError> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let ws = match tokio_tungstenite::accept_async(stream)
                        .await
                    {
                        Ok(ws) => ws,
                        Err(e) => {
                            tracing::debug!(
                                %addr, error = %e,
                                "websocket handshake failed"
                            );
                            continue;
                        }
                    };

                    let connection_id = ConnectionId::new(
                        NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
                    );
                    tracing::debug!(%connection_id, %addr, "connection accepted");

                    let registry = Arc::clone(&self.registry);
                    let orchestrator = Arc::clone(&self.orchestrator);
                    tokio::spawn(async move {
                        handle_connection(
                            ws,
                            connection_id,
                            registry,
                            orchestrator,
                        )
                        .await;
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
