//! Show state and core types
//!
//! Everything the host needs to mirror into the page lives here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::effects::{Letter, Spark};
use crate::Point;

/// Where a caplet is in its one-way trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapletState {
    /// Parked below the viewport
    AtStart,
    /// Launched, moving toward its heart point
    InTransit,
    /// Resting on the heart
    AtTarget,
}

/// Glow applied to a caplet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Glow {
    #[default]
    None,
    /// Single pink drop shadow on arrival
    Soft,
    /// Double pink/purple drop shadow from the completion sweep
    Final,
}

/// One animated caplet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caplet {
    pub id: u32,
    pub start: Point,
    pub target: Point,
    /// Launch delay from run start
    pub delay_ms: f64,
    /// Current rotation (degrees)
    pub rotation_deg: f32,
    pub state: CapletState,
    pub glow: Glow,
}

impl Caplet {
    /// Where the host should draw the caplet right now
    pub fn position(&self) -> Point {
        match self.state {
            CapletState::AtStart => self.start,
            CapletState::InTransit | CapletState::AtTarget => self.target,
        }
    }

    /// Scale applied with the rotation (launched caplets grow slightly)
    pub fn scale(&self) -> f32 {
        match self.state {
            CapletState::AtStart => 1.0,
            CapletState::InTransit | CapletState::AtTarget => 1.1,
        }
    }
}

/// What a milestone does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MilestoneAction {
    /// Light up the glow behind the heart
    HeartGlow,
    /// Show the text, letter by letter, then the subtitle
    RevealText,
    /// Fade the progress indicator out
    HideProgress,
    /// Burst and final glow sweep over every caplet
    Completion,
    /// No built-in effect; only a `MilestoneFired` event
    Signal,
}

/// A named one-shot action at a fixed delay from run start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub name: String,
    pub delay_ms: f64,
    pub action: MilestoneAction,
}

impl Milestone {
    pub fn new(name: impl Into<String>, delay_ms: f64, action: MilestoneAction) -> Self {
        Self {
            name: name.into(),
            delay_ms,
            action,
        }
    }
}

/// Lifecycle of a timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Caplets parked, waiting for `begin`
    Idle,
    /// Timers pending
    Running,
    /// Last milestone fired; caplets stay on the heart until reset
    Complete,
}

/// Presentation-facing flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    pub progress_visible: bool,
    pub progress_active: bool,
    pub heart_glow: bool,
    pub text_visible: bool,
    pub subtitle_visible: bool,
    /// Start control enabled (disabled while a run is active)
    pub start_enabled: bool,
    /// Letter reveal schedule for the main text (empty until revealed)
    pub letters: Vec<Letter>,
    /// Completion burst dots
    pub bursts: Vec<Spark>,
    /// Click sparkles
    pub sparkles: Vec<Spark>,
}

impl Default for Stage {
    fn default() -> Self {
        Self {
            progress_visible: false,
            progress_active: false,
            heart_glow: false,
            text_visible: false,
            subtitle_visible: false,
            start_enabled: true,
            letters: Vec::new(),
            bursts: Vec::new(),
            sparkles: Vec::new(),
        }
    }
}

impl Stage {
    /// Back to the initial look; sparkles are independent of runs and survive
    pub fn clear_run(&mut self) {
        let sparkles = std::mem::take(&mut self.sparkles);
        *self = Self {
            sparkles,
            ..Self::default()
        };
    }
}

/// Things the host should react to, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShowEvent {
    RunStarted,
    CapletLaunched { id: u32, target: Vec2, rotation_deg: f32 },
    CapletArrived { id: u32 },
    CapletGlow { id: u32, glow: Glow },
    MilestoneFired { name: String },
    TextRevealed,
    SubtitleRevealed,
    ProgressHidden,
    BurstSpawned { center: Vec2, count: usize },
    SparkleSpawned { id: u32, at: Vec2 },
    RunComplete,
    /// Reset cancelled this many pending timers
    Reset { cancelled: usize },
    /// Targets regenerated for a new viewport
    Resized,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caplet(state: CapletState) -> Caplet {
        Caplet {
            id: 1,
            start: Vec2::new(10.0, 900.0),
            target: Vec2::new(400.0, 300.0),
            delay_ms: 200.0,
            rotation_deg: 0.0,
            state,
            glow: Glow::None,
        }
    }

    #[test]
    fn test_caplet_position_follows_state() {
        assert_eq!(caplet(CapletState::AtStart).position(), Vec2::new(10.0, 900.0));
        assert_eq!(caplet(CapletState::InTransit).position(), Vec2::new(400.0, 300.0));
        assert_eq!(caplet(CapletState::AtTarget).scale(), 1.1);
    }

    #[test]
    fn test_clear_run_keeps_sparkles() {
        let mut stage = Stage {
            heart_glow: true,
            start_enabled: false,
            sparkles: vec![crate::sim::effects::sparkle(1, Vec2::ZERO, 1500.0)],
            ..Stage::default()
        };
        stage.clear_run();
        assert!(!stage.heart_glow);
        assert!(stage.start_enabled);
        assert_eq!(stage.sparkles.len(), 1);
    }
}
