//! Result reporting to the external stats collaborator.
//!
//! Reporting is best-effort, not guaranteed-delivery: the registry
//! submits each finished match at most once, logs a failure, and never
//! retries or surfaces it to players.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rallyd_protocol::{BallSpeed, PaddleSize, TournamentId};
use serde::Serialize;

/// Error from an outbound collaborator call (stats or AI). Collapsed to
/// a message because callers only ever log it.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct CollaboratorError(pub String);

/// Settings echo in the result payload, in the stats service's schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSettings {
    pub ball_speed: BallSpeed,
    pub paddle_size: PaddleSize,
    pub speed_increment: bool,
    pub points_to_win: u32,
}

/// One player's line in the result payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerResult {
    pub user_id: String,
    pub score: u32,
}

/// The payload POSTed to `{stats}/games` when a match finishes.
///
/// `start_time`/`end_time` serialize as ISO-8601 (chrono's RFC 3339
/// form); the tournament fields are present only for bracket games.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub settings: ReportSettings,
    /// `[slot 1, slot 2]`.
    pub players: Vec<PlayerResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tournament_id: Option<TournamentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,
}

/// Receives finished-match results.
///
/// The registry calls this from a spawned task, fire-and-forget — an
/// implementation may take as long as it likes without gating the tick
/// loop.
pub trait StatsReporter: Send + Sync + 'static {
    /// Submits one match result.
    fn report(
        &self,
        report: MatchReport,
    ) -> impl std::future::Future<Output = Result<(), CollaboratorError>> + Send;
}

/// reqwest-backed [`StatsReporter`] POSTing to `{base_url}/games`.
#[derive(Debug, Clone)]
pub struct HttpStatsReporter {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStatsReporter {
    /// Builds a reporter with a per-request timeout.
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

impl StatsReporter for HttpStatsReporter {
    async fn report(&self, report: MatchReport) -> Result<(), CollaboratorError> {
        let url = format!("{}/games", self.base_url);
        self.client
            .post(&url)
            .json(&report)
            .send()
            .await
            .map_err(|e| CollaboratorError(e.to_string()))?
            .error_for_status()
            .map_err(|e| CollaboratorError(e.to_string()))?;
        Ok(())
    }
}
