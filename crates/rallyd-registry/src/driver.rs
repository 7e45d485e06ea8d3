//! The authoritative loop: a fixed-interval tick task plus the
//! periodic inactivity sweep.
//!
//! One driver per process. Each tick iterates all playing sessions
//! synchronously (see [`SessionRegistry::advance_sessions`]) and must
//! finish well inside the interval; an overrun is logged and the next
//! tick is simply scheduled from now — no catch-up bursts.

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::notify::AiNotifier;
use crate::registry::SessionRegistry;
use crate::report::StatsReporter;

/// Handles to the two driver tasks. Aborting them stops the loop; the
/// registry itself stays usable.
pub struct DriverHandle {
    tick: JoinHandle<()>,
    cleanup: JoinHandle<()>,
}

impl DriverHandle {
    /// Stops both loops.
    pub fn abort(&self) {
        self.tick.abort();
        self.cleanup.abort();
    }
}

/// Spawns the tick loop and the cleanup sweep for a registry.
pub fn spawn<S, N>(registry: Arc<SessionRegistry<S, N>>) -> DriverHandle
where
    S: StatsReporter,
    N: AiNotifier,
{
    let tick = tokio::spawn(tick_loop(Arc::clone(&registry)));
    let cleanup = tokio::spawn(cleanup_loop(registry));
    DriverHandle { tick, cleanup }
}

async fn tick_loop<S, N>(registry: Arc<SessionRegistry<S, N>>)
where
    S: StatsReporter,
    N: AiNotifier,
{
    let budget = registry.config().tick_interval;
    let settle_delay = registry.config().report_settle_delay;
    let mut interval = tokio::time::interval(budget);
    // Skip missed ticks instead of bursting to catch up; the simulation
    // scales by elapsed time, so a late tick just advances further.
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(interval_ms = budget.as_millis() as u64, "tick loop running");

    loop {
        interval.tick().await;
        let started = Instant::now();

        let finished = registry.advance_sessions(registry.now_ms()).await;
        for game_id in finished {
            // Report after a short settle delay so the final broadcast
            // lands first. The flag on the session keeps this
            // at-most-once even if something else reports earlier.
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                tokio::time::sleep(settle_delay).await;
                registry.report_result(game_id).await;
            });
        }

        let elapsed = started.elapsed();
        if elapsed > budget {
            tracing::warn!(
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                budget_ms = budget.as_secs_f64() * 1000.0,
                "tick exceeded budget"
            );
        }
    }
}

async fn cleanup_loop<S, N>(registry: Arc<SessionRegistry<S, N>>)
where
    S: StatsReporter,
    N: AiNotifier,
{
    let mut interval =
        tokio::time::interval(registry.config().cleanup_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        let removed = registry.cleanup_inactive().await;
        if removed > 0 {
            tracing::debug!(removed, "inactive sessions swept");
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use crate::link::MatchIndex;
    use crate::report::{CollaboratorError, MatchReport};
    use rallyd_protocol::{SimState, Slot};
    use rallyd_sim::GameOptions;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct RecordingStats {
        reports: Arc<StdMutex<Vec<MatchReport>>>,
    }

    impl crate::report::StatsReporter for RecordingStats {
        async fn report(
            &self,
            report: MatchReport,
        ) -> Result<(), CollaboratorError> {
            self.reports.lock().unwrap().push(report);
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct NullNotifier;

    impl crate::notify::AiNotifier for NullNotifier {
        async fn notify_assignment(
            &self,
            _game_id: rallyd_protocol::GameId,
            _slot: Slot,
            _ai_name: String,
        ) -> Result<(), CollaboratorError> {
            Ok(())
        }
    }

    fn fast_config() -> RegistryConfig {
        RegistryConfig {
            tick_interval: Duration::from_millis(5),
            cleanup_interval: Duration::from_millis(20),
            report_settle_delay: Duration::from_millis(1),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_driver_advances_playing_sessions() {
        let stats = RecordingStats::default();
        let registry = Arc::new(SessionRegistry::new(
            fast_config(),
            stats,
            NullNotifier,
            Arc::new(MatchIndex::new()),
        ));
        let driver = spawn(Arc::clone(&registry));

        let game_id = registry
            .create_with_player(&GameOptions::default(), "alice")
            .await
            .unwrap();
        registry.join(game_id, "bob").await.unwrap();
        registry.start(game_id).await.unwrap();
        registry
            .place_ball(game_id, 300.0, 200.0, 2.0, 0.0)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        let snapshot = registry.snapshot(game_id).await.unwrap();
        assert!(
            snapshot.ball.x > 300.0,
            "driver should have moved the ball, x = {}",
            snapshot.ball.x
        );

        driver.abort();
    }

    #[tokio::test]
    async fn test_driver_reports_finished_matches() {
        let stats = RecordingStats::default();
        let registry = Arc::new(SessionRegistry::new(
            fast_config(),
            stats.clone(),
            NullNotifier,
            Arc::new(MatchIndex::new()),
        ));
        let driver = spawn(Arc::clone(&registry));

        let game_id = registry
            .create_with_player(
                &GameOptions {
                    winning_score: Some(1),
                    ..Default::default()
                },
                "alice",
            )
            .await
            .unwrap();
        registry.join(game_id, "bob").await.unwrap();
        registry
            .set_paddle_position(game_id, Slot::Two, 320.0)
            .await
            .unwrap();
        registry.start(game_id).await.unwrap();
        // Send the ball out right past the cleared paddle.
        registry
            .place_ball(game_id, 595.0, 30.0, 8.0, 0.0)
            .await
            .unwrap();

        for _ in 0..100 {
            if !stats.reports.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let snapshot = registry.snapshot(game_id).await.unwrap();
        assert_eq!(snapshot.state, SimState::Finished);
        let reports = stats.reports.lock().unwrap();
        assert_eq!(reports.len(), 1, "exactly one report expected");
        assert_eq!(reports[0].players[0].user_id, "alice");

        driver.abort();
    }

    #[tokio::test]
    async fn test_driver_sweeps_idle_sessions() {
        let registry = Arc::new(SessionRegistry::new(
            RegistryConfig {
                inactivity_threshold: Duration::ZERO,
                cleanup_interval: Duration::from_millis(10),
                ..fast_config()
            },
            RecordingStats::default(),
            NullNotifier,
            Arc::new(MatchIndex::new()),
        ));
        let driver = spawn(Arc::clone(&registry));

        registry.create_session(&GameOptions::default()).await;
        for _ in 0..100 {
            if registry.session_count().await == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(registry.session_count().await, 0);

        driver.abort();
    }
}
