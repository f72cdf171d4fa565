//! Decorative effects: ambient particles, completion burst, click sparkles,
//! text reveal timing and pointer parallax.
//!
//! None of this affects the caplets; it only describes what the host draws.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::curve::Viewport;
use super::random::RandomSource;
use crate::polar_to_cartesian;

/// A floating background particle, positioned in percent of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientParticle {
    /// Left/top in percent [0, 100)
    pub pos_pct: Vec2,
    /// CSS animation delay (seconds)
    pub delay_s: f32,
    /// CSS animation duration (seconds)
    pub duration_s: f32,
}

/// Scatter `count` ambient particles
pub fn ambient_particles(count: usize, rng: &mut impl RandomSource) -> Vec<AmbientParticle> {
    (0..count)
        .map(|_| AmbientParticle {
            pos_pct: Vec2::new(rng.unit() * 100.0, rng.unit() * 100.0),
            delay_s: rng.unit() * 6.0,
            duration_s: rng.spread(4.0, 4.0),
        })
        .collect()
}

/// A short-lived particle (burst dot or click sparkle)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spark {
    pub id: u32,
    pub origin: Vec2,
    pub target: Vec2,
    /// Time since spawn
    pub age_ms: f64,
    /// Time to travel from origin to target (0 = stationary)
    pub travel_ms: f64,
    /// Removed once age reaches this
    pub lifetime_ms: f64,
}

impl Spark {
    /// Current position (linear ease from origin to target)
    pub fn pos(&self) -> Vec2 {
        self.origin.lerp(self.target, self.progress())
    }

    /// Travel progress in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.travel_ms <= 0.0 {
            return 1.0;
        }
        (self.age_ms / self.travel_ms).clamp(0.0, 1.0) as f32
    }

    /// Opacity fades out over the travel (or lifetime, if stationary)
    pub fn opacity(&self) -> f32 {
        let span = if self.travel_ms > 0.0 { self.travel_ms } else { self.lifetime_ms };
        if span <= 0.0 {
            return 0.0;
        }
        (1.0 - self.age_ms / span).clamp(0.0, 1.0) as f32
    }

    pub fn is_alive(&self) -> bool {
        self.age_ms < self.lifetime_ms
    }
}

/// Ring of burst sparks radiating from `center`
pub fn burst(
    first_id: u32,
    center: Vec2,
    count: usize,
    distance: f32,
    travel_ms: f64,
    lifetime_ms: f64,
) -> Vec<Spark> {
    (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * TAU;
            Spark {
                id: first_id + i as u32,
                origin: center,
                target: center + polar_to_cartesian(distance, angle),
                age_ms: 0.0,
                travel_ms,
                lifetime_ms,
            }
        })
        .collect()
}

/// A stationary sparkle at a click position
pub fn sparkle(id: u32, at: Vec2, lifetime_ms: f64) -> Spark {
    Spark {
        id,
        origin: at,
        target: at,
        age_ms: 0.0,
        travel_ms: 0.0,
        lifetime_ms,
    }
}

/// Age sparks by `dt_ms` and drop the expired ones
pub fn age_sparks(sparks: &mut Vec<Spark>, dt_ms: f64) {
    for s in sparks.iter_mut() {
        s.age_ms += dt_ms;
    }
    sparks.retain(Spark::is_alive);
}

/// One letter of the main text with its reveal delay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Letter {
    pub ch: char,
    pub delay_ms: f64,
}

/// Split `text` into letters revealed `stagger_ms` apart.
/// Spaces become non-breaking so inline-block spans keep their width.
pub fn letter_reveal(text: &str, stagger_ms: f64) -> Vec<Letter> {
    text.chars()
        .enumerate()
        .map(|(i, ch)| Letter {
            ch: if ch == ' ' { '\u{00A0}' } else { ch },
            delay_ms: i as f64 * stagger_ms,
        })
        .collect()
}

/// Decorative transforms derived from the pointer position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parallax {
    /// Aurora rotation (degrees)
    pub aurora_deg: f32,
    /// Per-ring translation (pixels)
    pub rings: Vec<Vec2>,
}

/// Pointer-driven parallax for the aurora and `ring_count` floating rings
pub fn parallax(pointer: Vec2, viewport: Viewport, ring_count: usize) -> Parallax {
    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        return Parallax {
            aurora_deg: 0.0,
            rings: vec![Vec2::ZERO; ring_count],
        };
    }
    let pct = Vec2::new(
        pointer.x / viewport.width * 100.0,
        pointer.y / viewport.height * 100.0,
    );
    Parallax {
        aurora_deg: pct.x * 0.1,
        rings: (0..ring_count)
            .map(|i| pct * ((i + 1) as f32 * 0.02))
            .collect(),
    }
}
