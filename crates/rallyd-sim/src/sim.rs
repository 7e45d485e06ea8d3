//! The match simulation: state machine, paddles, ball, scoring.

use rallyd_protocol::{
    BallView, GameSnapshot, PaddleDirection, PlayerView, SimState, Slot,
};
use rand::Rng;

use crate::{GameOptions, SimConfig};

/// Duration of one simulation tick at the 60 Hz baseline, in ms.
/// Elapsed wall time is divided by this so behavior is frame-rate
/// independent: a 33 ms gap advances the world twice as far as 16 ms.
const TICK_MS: f64 = 1000.0 / 60.0;

/// Paddle travel in px per baseline tick while an intent is held.
const PADDLE_SPEED: f64 = 5.0;

/// Maximum vertical velocity imparted by a paddle strike. A hit at the
/// paddle's center leaves the ball flat; a hit at either edge sends it
/// off at full spin.
const SPIN_FACTOR: f64 = 10.0;

/// Velocity multiplier applied on paddle contact when acceleration is
/// enabled.
const ACCELERATION: f64 = 1.1;

/// Launch angle bound: the respawned ball leaves within ±45° of
/// horizontal, toward a random side.
const LAUNCH_ANGLE_MAX_DEG: f64 = 45.0;

/// One player slot's mutable state.
#[derive(Debug, Clone, Default)]
pub struct PlayerState {
    /// Display name, `None` until the slot is assigned.
    pub name: Option<String>,
    /// Paddle top edge.
    pub y: f64,
    /// Points scored this match. Only ever increases between resets.
    pub score: u32,
    /// `true` when this slot is driven by an automated opponent.
    pub automated: bool,
    /// Movement intent applied on the next tick.
    pub(crate) movement: PaddleDirection,
}

#[derive(Debug, Clone, Copy)]
struct Ball {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
}

/// An authoritative two-player match.
///
/// The lifecycle transitions (`start`, `pause`, `resume`, `cancel`,
/// `reset`) each return whether the transition was legal:
///
/// ```text
/// waiting --start--> playing
/// playing --pause--> paused
/// paused  --resume-> playing
/// {waiting,playing,paused} --cancel--> cancelled   (terminal)
/// playing --win score reached--> finished          (terminal)
/// ```
///
/// All gameplay mutation happens in [`tick`](Self::tick), which is a
/// no-op outside `playing`.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    state: SimState,
    players: [PlayerState; 2],
    ball: Ball,
    /// Timestamp of the last applied tick. Cleared whenever the match
    /// (re)enters `playing` so the first tick after a start, resume, or
    /// pause only re-establishes the baseline instead of integrating
    /// the whole gap.
    last_tick_ms: Option<u64>,
}

impl Simulation {
    /// Creates a match in `waiting` with paddles centered and the ball
    /// ready to launch.
    pub fn new(options: &GameOptions) -> Self {
        let config = SimConfig::from_options(options);
        let center_y = (config.height - config.paddle_height) / 2.0;
        let mut sim = Self {
            config,
            state: SimState::Waiting,
            players: [
                PlayerState {
                    y: center_y,
                    ..PlayerState::default()
                },
                PlayerState {
                    y: center_y,
                    ..PlayerState::default()
                },
            ],
            ball: Ball {
                x: 0.0,
                y: 0.0,
                vx: 0.0,
                vy: 0.0,
            },
            last_tick_ms: None,
        };
        sim.respawn_ball();
        sim
    }

    /// The resolved configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SimState {
        self.state
    }

    /// A slot's current state.
    pub fn player(&self, slot: Slot) -> &PlayerState {
        &self.players[slot.index()]
    }

    /// Both scores as `(slot 1, slot 2)`.
    pub fn scores(&self) -> (u32, u32) {
        (self.players[0].score, self.players[1].score)
    }

    /// Binds a display name (and the automated-opponent capability) to
    /// a slot. Idempotent per slot — re-assigning overwrites.
    pub fn assign_player(
        &mut self,
        slot: Slot,
        name: impl Into<String>,
        automated: bool,
    ) {
        let player = &mut self.players[slot.index()];
        player.name = Some(name.into());
        player.automated = automated;
    }

    /// `true` once both slots have a name bound.
    pub fn has_both_players(&self) -> bool {
        self.players.iter().all(|p| p.name.is_some())
    }

    // -- Lifecycle transitions ------------------------------------------

    /// `waiting → playing`.
    pub fn start(&mut self) -> bool {
        if self.state == SimState::Waiting {
            self.state = SimState::Playing;
            self.last_tick_ms = None;
            true
        } else {
            false
        }
    }

    /// `playing → paused`.
    pub fn pause(&mut self) -> bool {
        if self.state == SimState::Playing {
            self.state = SimState::Paused;
            true
        } else {
            false
        }
    }

    /// `paused → playing`.
    pub fn resume(&mut self) -> bool {
        if self.state == SimState::Paused {
            self.state = SimState::Playing;
            self.last_tick_ms = None;
            true
        } else {
            false
        }
    }

    /// Any non-terminal state `→ cancelled`. Terminal states are final.
    pub fn cancel(&mut self) -> bool {
        if self.state.is_terminal() {
            false
        } else {
            self.state = SimState::Cancelled;
            true
        }
    }

    /// Re-initializes scores, paddles, ball, and intents for a rematch.
    ///
    /// A `finished` match returns to `waiting`; a `cancelled` match is
    /// dead and refuses. Player bindings survive.
    pub fn reset(&mut self) -> bool {
        if self.state == SimState::Cancelled {
            return false;
        }
        let center_y = (self.config.height - self.config.paddle_height) / 2.0;
        for player in &mut self.players {
            player.score = 0;
            player.y = center_y;
            player.movement = PaddleDirection::Stop;
        }
        self.respawn_ball();
        self.last_tick_ms = None;
        if self.state == SimState::Finished {
            self.state = SimState::Waiting;
        }
        true
    }

    // -- Input ----------------------------------------------------------

    /// Records a continuous movement intent, applied on each tick until
    /// replaced. The caller is responsible for rejecting input to
    /// automated slots.
    pub fn set_paddle_intent(&mut self, slot: Slot, direction: PaddleDirection) {
        self.players[slot.index()].movement = direction;
    }

    /// Moves a paddle directly to `y`, clamped to the board. Non-finite
    /// input is ignored.
    pub fn set_paddle_position(&mut self, slot: Slot, y: f64) {
        if !y.is_finite() {
            return;
        }
        self.players[slot.index()].y = y.clamp(0.0, self.config.max_paddle_y());
    }

    // -- Tick -----------------------------------------------------------

    /// Advances the simulation to `now_ms`. A no-op outside `playing`.
    ///
    /// The elapsed time since the previous tick is normalized to the
    /// 60 Hz baseline; per scaled tick, in order: paddles move by their
    /// intents, the ball integrates, walls reflect vertically, paddle
    /// faces reflect horizontally (retargeting vertical velocity by
    /// strike offset, accelerating if configured), and a ball leaving
    /// the left or right bound scores for the opposite side.
    pub fn tick(&mut self, now_ms: u64) {
        if self.state != SimState::Playing {
            return;
        }
        let Some(last) = self.last_tick_ms else {
            self.last_tick_ms = Some(now_ms);
            return;
        };
        let elapsed = now_ms.saturating_sub(last) as f64;
        self.last_tick_ms = Some(now_ms);
        if elapsed <= 0.0 {
            return;
        }
        let scale = elapsed / TICK_MS;

        self.move_paddles(scale);
        self.move_ball(scale);
    }

    fn move_paddles(&mut self, scale: f64) {
        let step = PADDLE_SPEED * scale;
        let max_y = self.config.max_paddle_y();
        for player in &mut self.players {
            match player.movement {
                PaddleDirection::Up => {
                    player.y = (player.y - step).max(0.0);
                }
                PaddleDirection::Down => {
                    player.y = (player.y + step).min(max_y);
                }
                PaddleDirection::Stop => {}
            }
        }
    }

    fn move_ball(&mut self, scale: f64) {
        let cfg = self.config;

        self.ball.x += self.ball.vx * scale;
        self.ball.y += self.ball.vy * scale;

        // Top/bottom wall contact reflects vertically.
        if self.ball.y <= 0.0 || self.ball.y >= cfg.height - cfg.ball_size {
            self.ball.vy = -self.ball.vy;
        }

        // Left paddle face (slot 1).
        let left = &self.players[0];
        if self.ball.x <= cfg.paddle_width
            && self.ball.y + cfg.ball_size >= left.y
            && self.ball.y <= left.y + cfg.paddle_height
        {
            let offset = (self.ball.y - left.y) / cfg.paddle_height;
            self.ball.x = cfg.paddle_width;
            self.bounce_off_paddle(offset);
        }

        // Right paddle face (slot 2).
        let right_plane = cfg.width - cfg.paddle_width - cfg.ball_size;
        let right = &self.players[1];
        if self.ball.x >= right_plane
            && self.ball.y + cfg.ball_size >= right.y
            && self.ball.y <= right.y + cfg.paddle_height
        {
            let offset = (self.ball.y - right.y) / cfg.paddle_height;
            self.ball.x = right_plane;
            self.bounce_off_paddle(offset);
        }

        // A ball past the left or right bound scores for the opposite
        // side. At most one point per tick: the respawn recenters.
        if self.ball.x < 0.0 {
            self.award_point(Slot::Two);
        } else if self.ball.x > cfg.width {
            self.award_point(Slot::One);
        }
    }

    /// Reflects horizontally and retargets vertical velocity from the
    /// strike offset: 0.5 (paddle center) leaves the ball flat, 0.0/1.0
    /// send it off at maximum spin.
    fn bounce_off_paddle(&mut self, offset: f64) {
        self.ball.vx = -self.ball.vx;
        self.ball.vy = (offset - 0.5) * SPIN_FACTOR;
        if self.config.acceleration_enabled {
            self.ball.vx *= ACCELERATION;
            self.ball.vy *= ACCELERATION;
        }
    }

    fn award_point(&mut self, slot: Slot) {
        let player = &mut self.players[slot.index()];
        player.score += 1;
        if player.score >= self.config.winning_score {
            self.state = SimState::Finished;
        }
        self.respawn_ball();
    }

    /// Centers the ball and launches it within ±45° of horizontal
    /// toward a random side.
    fn respawn_ball(&mut self) {
        let mut rng = rand::rng();
        let angle = rng
            .random_range(-LAUNCH_ANGLE_MAX_DEG..=LAUNCH_ANGLE_MAX_DEG)
            .to_radians();
        let direction = if rng.random::<bool>() { 1.0 } else { -1.0 };
        self.ball = Ball {
            x: self.config.width / 2.0,
            y: self.config.height / 2.0,
            vx: direction * self.config.launch_speed * angle.cos(),
            vy: self.config.launch_speed * angle.sin(),
        };
    }

    /// Overrides the ball's kinematic state. Used by replay tooling and
    /// by registry/bracket tests that need a deterministic rally.
    pub fn place_ball(&mut self, x: f64, y: f64, vx: f64, vy: f64) {
        self.ball = Ball { x, y, vx, vy };
    }

    // -- Snapshot -------------------------------------------------------

    /// An immutable copy of everything clients need to render the
    /// match. Shares no structure with the simulation.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            state: self.state,
            player1: self.player_view(Slot::One),
            player2: self.player_view(Slot::Two),
            ball: BallView {
                x: self.ball.x,
                y: self.ball.y,
            },
            config: self.config.board_view(),
            settings: self.config.settings_view(),
        }
    }

    fn player_view(&self, slot: Slot) -> PlayerView {
        let player = &self.players[slot.index()];
        PlayerView {
            name: player.name.clone(),
            y: player.y,
            score: player.score,
            automated: player.automated,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
