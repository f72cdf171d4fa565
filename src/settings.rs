//! Show settings and preferences
//!
//! Persisted in LocalStorage on web. Every field has a default, so a stored
//! blob from an older build still loads.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::{Milestone, MilestoneAction};
use crate::{Error, Result};

/// Tunable show parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Heart ===
    /// Number of caplets (and heart points)
    pub caplets: usize,
    /// Heart scale as a fraction of min(viewport width, height)
    pub scale_factor: f32,
    /// Vertical nudge of the heart (pixels, negative = up)
    pub vertical_offset: f32,

    // === Caplet motion ===
    /// Minimum depth below the bottom edge for parked caplets
    pub start_below_min: f32,
    /// Random extra depth below `start_below_min`
    pub start_below_spread: f32,
    /// Launch delay = min + U[0, spread)
    pub launch_delay_min_ms: f64,
    pub launch_delay_spread_ms: f64,
    /// Launch-to-arrival time
    pub travel_ms: f64,

    // === Milestones ===
    pub heart_glow_ms: f64,
    pub reveal_text_ms: f64,
    pub hide_progress_ms: f64,
    pub completion_ms: f64,

    // === Text ===
    pub text: String,
    pub letter_stagger_ms: f64,
    pub subtitle_delay_ms: f64,

    // === Effects ===
    pub glow_sweep_step_ms: f64,
    pub burst_count: usize,
    pub burst_distance: f32,
    pub burst_travel_ms: f64,
    pub burst_lifetime_ms: f64,
    pub sparkle_lifetime_ms: f64,
    pub ambient_particles: usize,

    // === Preferences ===
    /// Skip burst and sparkles
    pub reduced_motion: bool,
    /// Audio toggle state
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            caplets: NUM_CAPLETS,
            scale_factor: HEART_SCALE_FACTOR,
            vertical_offset: HEART_VERTICAL_OFFSET,

            start_below_min: START_BELOW_MIN,
            start_below_spread: START_BELOW_SPREAD,
            launch_delay_min_ms: LAUNCH_DELAY_MIN_MS,
            launch_delay_spread_ms: LAUNCH_DELAY_SPREAD_MS,
            travel_ms: TRAVEL_MS,

            heart_glow_ms: HEART_GLOW_MS,
            reveal_text_ms: REVEAL_TEXT_MS,
            hide_progress_ms: HIDE_PROGRESS_MS,
            completion_ms: COMPLETION_MS,

            text: MAIN_TEXT.to_string(),
            letter_stagger_ms: LETTER_STAGGER_MS,
            subtitle_delay_ms: SUBTITLE_DELAY_MS,

            glow_sweep_step_ms: GLOW_SWEEP_STEP_MS,
            burst_count: BURST_COUNT,
            burst_distance: BURST_DISTANCE,
            burst_travel_ms: BURST_TRAVEL_MS,
            burst_lifetime_ms: BURST_LIFETIME_MS,
            sparkle_lifetime_ms: SPARKLE_LIFETIME_MS,
            ambient_particles: AMBIENT_PARTICLES,

            reduced_motion: false,
            muted: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "heart_caplets_settings";

    /// Reject values the timeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.caplets == 0 {
            return Err(Error::settings("caplets must be at least 1"));
        }
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            return Err(Error::settings(format!(
                "scale_factor must be > 0, got {}",
                self.scale_factor
            )));
        }
        if !self.travel_ms.is_finite() || self.travel_ms <= 0.0 {
            return Err(Error::settings(format!(
                "travel_ms must be > 0, got {}",
                self.travel_ms
            )));
        }
        let delays = [
            ("launch_delay_min_ms", self.launch_delay_min_ms),
            ("launch_delay_spread_ms", self.launch_delay_spread_ms),
            ("heart_glow_ms", self.heart_glow_ms),
            ("reveal_text_ms", self.reveal_text_ms),
            ("hide_progress_ms", self.hide_progress_ms),
            ("completion_ms", self.completion_ms),
            ("letter_stagger_ms", self.letter_stagger_ms),
            ("subtitle_delay_ms", self.subtitle_delay_ms),
            ("glow_sweep_step_ms", self.glow_sweep_step_ms),
            ("burst_travel_ms", self.burst_travel_ms),
            ("burst_lifetime_ms", self.burst_lifetime_ms),
            ("sparkle_lifetime_ms", self.sparkle_lifetime_ms),
        ];
        for (name, value) in delays {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::settings(format!("{name} must be >= 0, got {value}")));
            }
        }
        // Parked caplets must sit below the bottom edge
        let lengths = [
            ("start_below_min", self.start_below_min),
            ("start_below_spread", self.start_below_spread),
            ("burst_distance", self.burst_distance),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::settings(format!("{name} must be >= 0, got {value}")));
            }
        }
        if !self.vertical_offset.is_finite() {
            return Err(Error::settings("vertical_offset must be finite"));
        }
        Ok(())
    }

    /// Parse a (possibly partial) JSON override and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| Error::settings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::settings(e.to_string()))
    }

    /// The built-in milestones, in registration order
    pub fn milestones(&self) -> Vec<Milestone> {
        vec![
            Milestone::new("heart-glow", self.heart_glow_ms, MilestoneAction::HeartGlow),
            Milestone::new("reveal-text", self.reveal_text_ms, MilestoneAction::RevealText),
            Milestone::new("hide-progress", self.hide_progress_ms, MilestoneAction::HideProgress),
            Milestone::new("completion", self.completion_ms, MilestoneAction::Completion),
        ]
    }

    /// Flip the audio toggle, returning the new muted state
    pub fn toggle_muted(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Whether decorative motion (burst, sparkles) should play
    pub fn effects_enabled(&self) -> bool {
        !self.reduced_motion
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match self.to_json() {
                Ok(json) => {
                    let _ = storage.set_item(Self::STORAGE_KEY, &json);
                    log::info!("Settings saved");
                }
                Err(e) => log::warn!("Settings not saved: {e}"),
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let s = Settings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.caplets, 80);
        assert_eq!(s.milestones().len(), 4);
        assert_eq!(s.milestones()[3].delay_ms, 4500.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s = Settings::from_json(r#"{"caplets": 12, "muted": true}"#).unwrap();
        assert_eq!(s.caplets, 12);
        assert!(s.muted);
        assert_eq!(s.text, "I Love You");
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(matches!(
            Settings::from_json(r#"{"caplets": 0}"#),
            Err(Error::Settings(_))
        ));
        assert!(Settings::from_json(r#"{"scale_factor": -1.0}"#).is_err());
        assert!(Settings::from_json(r#"{"completion_ms": -5.0}"#).is_err());
        assert!(Settings::from_json("not json").is_err());
        // Start depths keep caplets below the bottom edge
        assert!(
            Settings::from_json(r#"{"start_below_min": -700.0, "start_below_spread": 0.0}"#)
                .is_err()
        );
        assert!(Settings::from_json(r#"{"start_below_spread": -1.0}"#).is_err());
        for field in [
            "letter_stagger_ms",
            "subtitle_delay_ms",
            "glow_sweep_step_ms",
            "burst_travel_ms",
            "burst_lifetime_ms",
            "sparkle_lifetime_ms",
            "burst_distance",
        ] {
            let json = format!(r#"{{"{field}": -1.0}}"#);
            assert!(Settings::from_json(&json).is_err(), "{field} accepted negative");
        }
        let nan_offset = Settings {
            vertical_offset: f32::NAN,
            ..Settings::default()
        };
        assert!(nan_offset.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip_and_toggle() {
        let mut s = Settings::default();
        assert!(s.toggle_muted());
        assert!(!s.toggle_muted());
        let back = Settings::from_json(&s.to_json().unwrap()).unwrap();
        assert_eq!(back, s);
    }
}
