//! Assignment notifications to the external AI collaborator.
//!
//! Automated opponents are not locked or reserved — an AI can play any
//! number of matches at once — so the only outbound call is "you've
//! been seated". A failed notification is logged and swallowed; the
//! match proceeds regardless.

use std::time::Duration;

use rallyd_protocol::{GameId, Slot};
use serde::Serialize;

use crate::report::CollaboratorError;

/// The payload POSTed to `{ai}/join`.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct JoinRequest {
    game_id: GameId,
    player_number: Slot,
    ai_name: String,
}

/// Tells the AI collaborator it has been assigned a slot in a game.
pub trait AiNotifier: Send + Sync + 'static {
    /// Notifies the AI service of one assignment.
    fn notify_assignment(
        &self,
        game_id: GameId,
        slot: Slot,
        ai_name: String,
    ) -> impl std::future::Future<Output = Result<(), CollaboratorError>> + Send;
}

/// reqwest-backed [`AiNotifier`] POSTing to `{base_url}/join`.
#[derive(Debug, Clone)]
pub struct HttpAiNotifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAiNotifier {
    /// Builds a notifier with a per-request timeout.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CollaboratorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CollaboratorError(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

impl AiNotifier for HttpAiNotifier {
    async fn notify_assignment(
        &self,
        game_id: GameId,
        slot: Slot,
        ai_name: String,
    ) -> Result<(), CollaboratorError> {
        let url = format!("{}/join", self.base_url);
        self.client
            .post(&url)
            .json(&JoinRequest {
                game_id,
                player_number: slot,
                ai_name,
            })
            .send()
            .await
            .map_err(|e| CollaboratorError(e.to_string()))?
            .error_for_status()
            .map_err(|e| CollaboratorError(e.to_string()))?;
        Ok(())
    }
}
