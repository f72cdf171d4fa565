//! Heart Caplets - caplets converge into a heart silhouette
//!
//! Core modules:
//! - `sim`: Deterministic show core (heart curve, cancellable schedule, timeline, effects)
//! - `settings`: Data-driven tuning, persisted to LocalStorage on web
//! - `error`: Crate error type

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use settings::Settings;

use glam::Vec2;

/// A 2-D coordinate in viewport pixel space
pub type Point = Vec2;

/// Show configuration constants (defaults for [`Settings`])
pub mod consts {
    /// Number of caplets forming the heart
    pub const NUM_CAPLETS: usize = 80;

    /// Heart scale as a fraction of the smaller viewport side
    pub const HEART_SCALE_FACTOR: f32 = 0.12;
    /// Heart nudged upward so the text fits beneath it
    pub const HEART_VERTICAL_OFFSET: f32 = -30.0;

    /// Caplets start at least this far below the bottom edge
    pub const START_BELOW_MIN: f32 = 50.0;
    /// Extra random depth below `START_BELOW_MIN`
    pub const START_BELOW_SPREAD: f32 = 100.0;

    /// Per-caplet launch delay = MIN + U[0, SPREAD)
    pub const LAUNCH_DELAY_MIN_MS: f64 = 200.0;
    pub const LAUNCH_DELAY_SPREAD_MS: f64 = 1000.0;
    /// Time from launch to arrival (caplet glow kicks in on arrival)
    pub const TRAVEL_MS: f64 = 500.0;

    /// Milestone delays from run start
    pub const HEART_GLOW_MS: f64 = 1500.0;
    pub const REVEAL_TEXT_MS: f64 = 3000.0;
    pub const HIDE_PROGRESS_MS: f64 = 4000.0;
    pub const COMPLETION_MS: f64 = 4500.0;

    /// Text reveal
    pub const MAIN_TEXT: &str = "I Love You";
    pub const LETTER_STAGGER_MS: f64 = 100.0;
    pub const SUBTITLE_DELAY_MS: f64 = 800.0;

    /// Final glow sweep step per caplet index
    pub const GLOW_SWEEP_STEP_MS: f64 = 20.0;

    /// Completion burst
    pub const BURST_COUNT: usize = 12;
    pub const BURST_DISTANCE: f32 = 100.0;
    pub const BURST_TRAVEL_MS: f64 = 1000.0;
    pub const BURST_LIFETIME_MS: f64 = 1100.0;

    /// Click sparkle lifetime
    pub const SPARKLE_LIFETIME_MS: f64 = 1500.0;

    /// Ambient floating particles
    pub const AMBIENT_PARTICLES: usize = 30;

    /// Host frame delta clamp (ms)
    pub const MAX_FRAME_MS: f64 = 100.0;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
