//! Match configuration: creation-time options and their resolution
//! into concrete geometry and speeds.

use rallyd_protocol::{BallSpeed, BoardView, PaddleSize, SettingsView};

/// Board width in pixels.
pub const BOARD_WIDTH: f64 = 600.0;
/// Board height in pixels.
pub const BOARD_HEIGHT: f64 = 400.0;
/// Paddle thickness (the horizontal plane the ball bounces off).
pub const PADDLE_WIDTH: f64 = 10.0;
/// Side length of the ball's bounding square.
pub const BALL_SIZE: f64 = 10.0;

const DEFAULT_WINNING_SCORE: u32 = 5;
const MIN_WINNING_SCORE: u32 = 1;
const MAX_WINNING_SCORE: u32 = 20;

/// Creation-time settings for a match. Every field is optional;
/// absent values fall back to the configured defaults when resolved
/// into a [`SimConfig`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameOptions {
    pub ball_speed: Option<BallSpeed>,
    pub winning_score: Option<u32>,
    pub acceleration_enabled: Option<bool>,
    pub paddle_size: Option<PaddleSize>,
}

/// The fully resolved configuration of one match. Built once at
/// creation and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    pub width: f64,
    pub height: f64,
    pub paddle_width: f64,
    pub paddle_height: f64,
    pub ball_size: f64,
    /// Ball speed at launch and after each respawn, in px per 60 Hz tick.
    pub launch_speed: f64,
    pub winning_score: u32,
    pub acceleration_enabled: bool,
    /// The tier names, kept for the settings echo in snapshots and
    /// result payloads.
    pub ball_speed: BallSpeed,
    pub paddle_size: PaddleSize,
}

impl SimConfig {
    /// Resolves options into a concrete configuration.
    ///
    /// Tier mapping: paddle height 40/80/120 px for short/medium/long,
    /// launch speed 4/6/8 px per tick for slow/medium/fast. The win
    /// score is clamped into `1..=20`.
    pub fn from_options(options: &GameOptions) -> Self {
        let ball_speed = options.ball_speed.unwrap_or_default();
        let paddle_size = options.paddle_size.unwrap_or_default();

        let paddle_height = match paddle_size {
            PaddleSize::Short => 40.0,
            PaddleSize::Medium => 80.0,
            PaddleSize::Long => 120.0,
        };
        let launch_speed = match ball_speed {
            BallSpeed::Slow => 4.0,
            BallSpeed::Medium => 6.0,
            BallSpeed::Fast => 8.0,
        };

        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            paddle_width: PADDLE_WIDTH,
            paddle_height,
            ball_size: BALL_SIZE,
            launch_speed,
            winning_score: options
                .winning_score
                .unwrap_or(DEFAULT_WINNING_SCORE)
                .clamp(MIN_WINNING_SCORE, MAX_WINNING_SCORE),
            acceleration_enabled: options.acceleration_enabled.unwrap_or(false),
            ball_speed,
            paddle_size,
        }
    }

    /// Highest legal paddle top edge.
    pub fn max_paddle_y(&self) -> f64 {
        self.height - self.paddle_height
    }

    pub(crate) fn board_view(&self) -> BoardView {
        BoardView {
            width: self.width,
            height: self.height,
            paddle_width: self.paddle_width,
            paddle_height: self.paddle_height,
            ball_size: self.ball_size,
            winning_score: self.winning_score,
        }
    }

    pub(crate) fn settings_view(&self) -> SettingsView {
        SettingsView {
            ball_speed: self.ball_speed,
            paddle_size: self.paddle_size,
            acceleration_enabled: self.acceleration_enabled,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::from_options(&GameOptions::default())
    }
}
