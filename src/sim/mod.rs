//! Deterministic show core
//!
//! Everything that decides what the page shows lives here. This module must
//! be pure and deterministic:
//! - Simulated clock only (time enters through `Timeline::advance`)
//! - Injected randomness only
//! - Stable ordering (ties fire in registration order)
//! - No DOM or platform dependencies

pub mod curve;
pub mod effects;
pub mod random;
pub mod schedule;
pub mod state;
pub mod timeline;

pub use curve::{HeartLayout, Viewport, heart_point, heart_points};
pub use effects::{AmbientParticle, Letter, Parallax, Spark, letter_reveal, parallax};
pub use random::{RandomSource, RngState, ScriptedRandom};
pub use schedule::{Schedule, TimerId};
pub use state::{
    Caplet, CapletState, Glow, Milestone, MilestoneAction, RunPhase, ShowEvent, Stage,
};
pub use timeline::Timeline;
