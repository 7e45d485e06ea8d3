//! Pure single-match simulation for rallyd.
//!
//! One [`Simulation`] is one match: two paddles, a ball, a score, and a
//! small lifecycle state machine. The crate owns no I/O and no timers —
//! [`Simulation::tick`] takes the caller's clock, so the registry's
//! fixed-interval loop (production) and a plain loop with hand-picked
//! timestamps (tests) drive it the same way.
//!
//! # Key types
//!
//! - [`Simulation`] — the match: state machine, paddles, ball, scoring
//! - [`GameOptions`] — creation-time settings, all optional
//! - [`SimConfig`] — the resolved configuration (tiers mapped to
//!   concrete geometry and speeds, win score clamped)

mod config;
mod sim;

pub use config::{GameOptions, SimConfig};
pub use sim::{PlayerState, Simulation};
