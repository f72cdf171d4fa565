//! Injectable randomness
//!
//! Every random draw in the show goes through [`RandomSource`], so a run can
//! be replayed from a seed or driven by a scripted sequence in tests.

use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Source of uniform samples in `[0, 1)`
pub trait RandomSource {
    fn unit(&mut self) -> f32;

    /// Uniform sample in `[lo, lo + spread)`
    fn spread(&mut self, lo: f32, spread: f32) -> f32 {
        lo + self.unit() * spread
    }
}

impl<R: RngCore> RandomSource for R {
    fn unit(&mut self) -> f32 {
        self.random::<f32>()
    }
}

/// Seed wrapper so a run's RNG can be described and rebuilt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Replays a fixed list of samples, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    samples: Vec<f32>,
    cursor: usize,
}

impl ScriptedRandom {
    /// Samples are clamped into `[0, 1)`; an empty list always yields 0.0
    pub fn new(samples: impl Into<Vec<f32>>) -> Self {
        let samples = samples
            .into()
            .into_iter()
            .map(|s| s.clamp(0.0, 1.0 - f32::EPSILON))
            .collect();
        Self { samples, cursor: 0 }
    }

    /// A source that always returns the same sample
    pub fn constant(sample: f32) -> Self {
        Self::new(vec![sample])
    }

    /// Number of samples drawn so far
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRandom {
    fn unit(&mut self) -> f32 {
        if self.samples.is_empty() {
            self.cursor += 1;
            return 0.0;
        }
        let sample = self.samples[self.cursor % self.samples.len()];
        self.cursor += 1;
        sample
    }
}
