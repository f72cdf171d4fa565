//! The show timeline
//!
//! Owns one set of caplets and milestones and drives them through
//! `Idle -> Running -> Complete`. Time only moves when the host calls
//! [`Timeline::advance`]; every delayed action is a [`Schedule`] entry, so
//! [`Timeline::reset`] can cancel all of them at once.

use log::{debug, info};
use rand_pcg::Pcg32;

use super::curve::{HeartLayout, Viewport};
use super::effects::{self, AmbientParticle};
use super::random::{RandomSource, RngState};
use super::schedule::Schedule;
use super::state::{
    Caplet, CapletState, Glow, Milestone, MilestoneAction, RunPhase, ShowEvent, Stage,
};
use crate::{Error, Point, Result, Settings};

/// A scheduled timeline action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cue {
    /// Caplet `i` leaves its start position
    Launch(usize),
    /// Caplet `i` reaches the heart
    Arrive(usize),
    /// Milestone `k` of the current run's firing order
    Milestone(usize),
    /// Subtitle fades in after the main text
    Subtitle,
    /// Completion glow sweep reaches caplet `i`
    FinalGlow(usize),
}

/// One show: caplets, milestones, timers and what the page should display
#[derive(Debug)]
pub struct Timeline<R = Pcg32> {
    settings: Settings,
    viewport: Viewport,
    rng: R,
    caplets: Vec<Caplet>,
    /// Registered milestones (registration order)
    milestones: Vec<Milestone>,
    /// Milestones of the active run, sorted by delay (stable)
    run_milestones: Vec<Milestone>,
    milestones_fired: usize,
    schedule: Schedule<Cue>,
    phase: RunPhase,
    stage: Stage,
    ambient: Vec<AmbientParticle>,
    events: Vec<ShowEvent>,
    next_spark_id: u32,
}

impl Timeline<Pcg32> {
    /// Timeline with a seeded PCG random source
    pub fn new(settings: Settings, viewport: Viewport, seed: u64) -> Result<Self> {
        Self::with_random(settings, viewport, RngState::new(seed).to_rng())
    }
}

impl<R: RandomSource> Timeline<R> {
    /// Timeline drawing all randomness from `rng`
    pub fn with_random(settings: Settings, viewport: Viewport, rng: R) -> Result<Self> {
        settings.validate()?;
        let milestones = settings.milestones();
        let mut timeline = Self {
            settings,
            viewport,
            rng,
            caplets: Vec::new(),
            milestones,
            run_milestones: Vec::new(),
            milestones_fired: 0,
            schedule: Schedule::new(),
            phase: RunPhase::Idle,
            stage: Stage::default(),
            ambient: Vec::new(),
            events: Vec::new(),
            next_spark_id: 1,
        };
        timeline.populate()?;
        timeline.ambient =
            effects::ambient_particles(timeline.settings.ambient_particles, &mut timeline.rng);
        info!(
            "Timeline ready: {} caplets on a {}x{} viewport",
            timeline.caplets.len(),
            viewport.width,
            viewport.height
        );
        Ok(timeline)
    }

    // === Accessors ===

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// True from `begin` until `reset`, including after completion
    pub fn is_running(&self) -> bool {
        self.phase != RunPhase::Idle
    }

    pub fn caplets(&self) -> &[Caplet] {
        &self.caplets
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn ambient(&self) -> &[AmbientParticle] {
        &self.ambient
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Simulated time since run start (0 while idle)
    pub fn now_ms(&self) -> f64 {
        self.schedule.now_ms()
    }

    /// Timers not yet fired
    pub fn pending_timers(&self) -> usize {
        self.schedule.len()
    }

    /// Take the events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<ShowEvent> {
        std::mem::take(&mut self.events)
    }

    /// Register an extra milestone. Takes effect from the next `begin`.
    pub fn add_milestone(&mut self, milestone: Milestone) -> Result<()> {
        if !milestone.delay_ms.is_finite() || milestone.delay_ms < 0.0 {
            return Err(Error::invalid_argument(format!(
                "milestone {} delay must be finite and >= 0, got {}",
                milestone.name, milestone.delay_ms
            )));
        }
        debug!("Milestone registered: {} @ {}ms", milestone.name, milestone.delay_ms);
        self.milestones.push(milestone);
        Ok(())
    }

    /// Mutable settings access for preferences (mute, reduced motion)
    pub fn preferences_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    // === Lifecycle ===

    /// Start a run. Ignored while a run is active or complete.
    pub fn begin(&mut self) {
        if self.is_running() {
            debug!("begin ignored: run already active");
            return;
        }

        self.phase = RunPhase::Running;
        self.stage.start_enabled = false;
        self.stage.progress_visible = true;
        self.stage.progress_active = true;

        // Caplets first, then milestones: equal delays fire in that order
        for (i, caplet) in self.caplets.iter().enumerate() {
            self.schedule.after(caplet.delay_ms, Cue::Launch(i));
        }

        let mut run = self.milestones.clone();
        run.sort_by(|a, b| a.delay_ms.total_cmp(&b.delay_ms));
        for (k, milestone) in run.iter().enumerate() {
            self.schedule.after(milestone.delay_ms, Cue::Milestone(k));
        }
        self.run_milestones = run;
        self.milestones_fired = 0;

        self.events.push(ShowEvent::RunStarted);
        info!(
            "Run started: {} caplets, {} milestones",
            self.caplets.len(),
            self.run_milestones.len()
        );
    }

    /// Cancel every pending timer and park all caplets at fresh start positions
    pub fn reset(&mut self) {
        let cancelled = self.schedule.cancel_all();
        self.schedule.rewind();

        for i in 0..self.caplets.len() {
            let start = self.random_start();
            let rotation = self.random_rotation();
            let caplet = &mut self.caplets[i];
            caplet.state = CapletState::AtStart;
            caplet.glow = Glow::None;
            caplet.start = start;
            caplet.rotation_deg = rotation;
        }

        self.run_milestones.clear();
        self.milestones_fired = 0;
        self.stage.clear_run();
        self.phase = RunPhase::Idle;
        self.events.push(ShowEvent::Reset { cancelled });
        info!("Reset: {} pending timers cancelled", cancelled);
    }

    /// Regenerate the heart for a new viewport. Ignored while running.
    pub fn on_resize(&mut self, viewport: Viewport) -> Result<()> {
        if self.is_running() {
            debug!("resize ignored: run active");
            return Ok(());
        }

        let targets = self
            .settings_layout(viewport)
            .sample(self.caplets.len())?;
        self.viewport = viewport;

        for (i, target) in targets.into_iter().enumerate() {
            self.caplets[i].target = target;
            if self.caplets[i].state == CapletState::AtStart {
                let start = self.random_start();
                self.caplets[i].start = start;
            }
        }

        self.events.push(ShowEvent::Resized);
        debug!("Resized to {}x{}", viewport.width, viewport.height);
        Ok(())
    }

    /// Move simulated time forward by `dt_ms`, firing every timer that comes due
    pub fn advance(&mut self, dt_ms: f64) {
        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };

        effects::age_sparks(&mut self.stage.bursts, dt_ms);
        effects::age_sparks(&mut self.stage.sparkles, dt_ms);

        // Run clock stays at 0 until `begin`
        if self.phase == RunPhase::Idle {
            return;
        }

        let horizon = self.schedule.now_ms() + dt_ms;
        while let Some(cue) = self.schedule.pop_due(horizon) {
            self.fire(cue);
        }
        self.schedule.settle(horizon);
    }

    /// Spawn a sparkle where the user clicked. Returns its id, or None with
    /// reduced motion on.
    pub fn sparkle_at(&mut self, at: Point) -> Option<u32> {
        if !self.settings.effects_enabled() {
            return None;
        }
        let id = self.next_spark_id();
        self.stage
            .sparkles
            .push(effects::sparkle(id, at, self.settings.sparkle_lifetime_ms));
        self.events.push(ShowEvent::SparkleSpawned { id, at });
        Some(id)
    }

    // === Internals ===

    fn settings_layout(&self, viewport: Viewport) -> HeartLayout {
        viewport.heart_layout_with(self.settings.scale_factor, self.settings.vertical_offset)
    }

    /// Build the caplets for the current viewport
    fn populate(&mut self) -> Result<()> {
        let targets = self
            .settings_layout(self.viewport)
            .sample(self.settings.caplets)?;

        self.caplets = Vec::with_capacity(targets.len());
        for (i, target) in targets.into_iter().enumerate() {
            let start = self.random_start();
            let rotation_deg = self.random_rotation();
            let delay_ms = self.settings.launch_delay_min_ms
                + self.rng.unit() as f64 * self.settings.launch_delay_spread_ms;
            self.caplets.push(Caplet {
                id: i as u32,
                start,
                target,
                delay_ms,
                rotation_deg,
                state: CapletState::AtStart,
                glow: Glow::None,
            });
        }
        Ok(())
    }

    /// Uniform x across the width, y below the bottom edge
    fn random_start(&mut self) -> Point {
        let x = self.rng.unit() * self.viewport.width;
        let y = self.viewport.height
            + self
                .rng
                .spread(self.settings.start_below_min, self.settings.start_below_spread);
        Point::new(x, y)
    }

    fn random_rotation(&mut self) -> f32 {
        self.rng.unit() * 360.0
    }

    fn next_spark_id(&mut self) -> u32 {
        let id = self.next_spark_id;
        self.next_spark_id += 1;
        id
    }

    fn fire(&mut self, cue: Cue) {
        match cue {
            Cue::Launch(i) => {
                if self.caplets[i].state != CapletState::AtStart {
                    return;
                }
                let rotation = self.random_rotation();
                let caplet = &mut self.caplets[i];
                caplet.state = CapletState::InTransit;
                caplet.rotation_deg = rotation;
                self.events.push(ShowEvent::CapletLaunched {
                    id: caplet.id,
                    target: caplet.target,
                    rotation_deg: rotation,
                });
                self.schedule.after(self.settings.travel_ms, Cue::Arrive(i));
            }
            Cue::Arrive(i) => {
                let caplet = &mut self.caplets[i];
                if caplet.state != CapletState::InTransit {
                    return;
                }
                caplet.state = CapletState::AtTarget;
                // Completion sweep may already have reached this caplet
                if caplet.glow == Glow::None {
                    caplet.glow = Glow::Soft;
                }
                let (id, glow) = (caplet.id, caplet.glow);
                self.events.push(ShowEvent::CapletArrived { id });
                self.events.push(ShowEvent::CapletGlow { id, glow });
                self.complete_if_settled();
            }
            Cue::Milestone(k) => {
                let milestone = self.run_milestones[k].clone();
                self.apply_milestone(milestone.action);
                self.milestones_fired += 1;
                debug!("Milestone fired: {} @ {}ms", milestone.name, self.now_ms());
                self.events.push(ShowEvent::MilestoneFired {
                    name: milestone.name,
                });
                if self.milestones_fired == self.run_milestones.len() {
                    self.complete();
                }
            }
            Cue::Subtitle => {
                self.stage.subtitle_visible = true;
                self.events.push(ShowEvent::SubtitleRevealed);
            }
            Cue::FinalGlow(i) => {
                let caplet = &mut self.caplets[i];
                caplet.glow = Glow::Final;
                self.events.push(ShowEvent::CapletGlow {
                    id: caplet.id,
                    glow: Glow::Final,
                });
            }
        }
    }

    fn apply_milestone(&mut self, action: MilestoneAction) {
        match action {
            MilestoneAction::HeartGlow => {
                self.stage.heart_glow = true;
            }
            MilestoneAction::RevealText => {
                self.stage.text_visible = true;
                self.stage.letters =
                    effects::letter_reveal(&self.settings.text, self.settings.letter_stagger_ms);
                self.schedule
                    .after(self.settings.subtitle_delay_ms, Cue::Subtitle);
                self.events.push(ShowEvent::TextRevealed);
            }
            MilestoneAction::HideProgress => {
                self.stage.progress_visible = false;
                self.events.push(ShowEvent::ProgressHidden);
            }
            MilestoneAction::Completion => {
                if self.settings.effects_enabled() {
                    let count = self.settings.burst_count;
                    let first_id = self.next_spark_id;
                    self.next_spark_id += count as u32;
                    let center = self.viewport.center();
                    self.stage.bursts.extend(effects::burst(
                        first_id,
                        center,
                        count,
                        self.settings.burst_distance,
                        self.settings.burst_travel_ms,
                        self.settings.burst_lifetime_ms,
                    ));
                    self.events.push(ShowEvent::BurstSpawned { center, count });
                }
                for i in 0..self.caplets.len() {
                    let delay = i as f64 * self.settings.glow_sweep_step_ms;
                    self.schedule.after(delay, Cue::FinalGlow(i));
                }
            }
            MilestoneAction::Signal => {}
        }
    }

    /// A run without milestones completes once every caplet has arrived
    fn complete_if_settled(&mut self) {
        if self.phase == RunPhase::Running
            && self.run_milestones.is_empty()
            && self
                .caplets
                .iter()
                .all(|c| c.state == CapletState::AtTarget)
        {
            self.complete();
        }
    }

    fn complete(&mut self) {
        if self.phase != RunPhase::Running {
            return;
        }
        self.phase = RunPhase::Complete;
        self.events.push(ShowEvent::RunComplete);
        info!("Run complete at {}ms", self.now_ms());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::random::ScriptedRandom;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    fn small_settings(caplets: usize) -> Settings {
        Settings {
            caplets,
            ..Settings::default()
        }
    }

    fn seeded(caplets: usize) -> Timeline {
        Timeline::new(small_settings(caplets), viewport(), 12345).unwrap()
    }

    fn states(tl: &Timeline<impl RandomSource>) -> Vec<CapletState> {
        tl.caplets().iter().map(|c| c.state).collect()
    }

    #[test]
    fn test_population_matches_heart() {
        let tl = seeded(80);
        assert_eq!(tl.caplets().len(), 80);
        assert_eq!(tl.phase(), RunPhase::Idle);
        assert!(!tl.is_running());
        assert_eq!(tl.ambient().len(), 30);

        let expected = viewport().heart_layout().sample(80).unwrap();
        for (c, p) in tl.caplets().iter().zip(&expected) {
            assert_eq!(c.target, *p);
            assert_eq!(c.state, CapletState::AtStart);
            assert!((0.0..800.0).contains(&c.start.x));
            assert!(c.start.y >= 650.0 && c.start.y < 750.0);
            assert!(c.delay_ms >= 200.0 && c.delay_ms < 1200.0);
        }
    }

    #[test]
    fn test_invalid_settings_and_viewport() {
        assert!(Timeline::new(small_settings(0), viewport(), 1).is_err());
        assert!(Timeline::new(Settings::default(), Viewport::new(0.0, 600.0), 1).is_err());
    }

    #[test]
    fn test_full_run_reaches_complete() {
        let mut tl = seeded(20);
        tl.begin();
        assert!(tl.is_running());
        assert_eq!(tl.phase(), RunPhase::Running);
        assert!(tl.stage().progress_visible);
        assert!(!tl.stage().start_enabled);

        tl.advance(1499.0);
        assert!(!tl.stage().heart_glow);
        tl.advance(1.0);
        assert!(tl.stage().heart_glow);
        assert!(states(&tl).iter().all(|s| *s != CapletState::AtStart));

        tl.advance(1500.0);
        assert!(tl.stage().text_visible);
        assert_eq!(tl.stage().letters.len(), "I Love You".chars().count());
        assert!(!tl.stage().subtitle_visible);
        tl.advance(800.0);
        assert!(tl.stage().subtitle_visible);

        tl.advance(200.0);
        assert!(!tl.stage().progress_visible);
        assert!(tl.stage().progress_active);
        assert_eq!(tl.phase(), RunPhase::Running);

        tl.advance(500.0);
        assert_eq!(tl.phase(), RunPhase::Complete);
        assert!(tl.is_running());
        assert_eq!(tl.stage().bursts.len(), 12);
        assert!(states(&tl).iter().all(|s| *s == CapletState::AtTarget));

        // Glow sweep: caplet 19 at +380ms
        tl.advance(400.0);
        assert!(tl.caplets().iter().all(|c| c.glow == Glow::Final));
        assert_eq!(tl.pending_timers(), 0);

        let events = tl.drain_events();
        assert_eq!(events.first(), Some(&ShowEvent::RunStarted));
        assert!(events.contains(&ShowEvent::RunComplete));
        assert!(tl.drain_events().is_empty());
    }

    #[test]
    fn test_caplet_transitions_follow_delay() {
        let mut settings = small_settings(1);
        settings.launch_delay_min_ms = 300.0;
        settings.launch_delay_spread_ms = 0.0;
        let mut tl = Timeline::with_random(settings, viewport(), ScriptedRandom::constant(0.5))
            .unwrap();
        tl.begin();
        tl.advance(299.0);
        assert_eq!(tl.caplets()[0].state, CapletState::AtStart);
        tl.advance(1.0);
        assert_eq!(tl.caplets()[0].state, CapletState::InTransit);
        assert_eq!(tl.caplets()[0].position(), tl.caplets()[0].target);
        tl.advance(499.0);
        assert_eq!(tl.caplets()[0].state, CapletState::InTransit);
        tl.advance(1.0);
        assert_eq!(tl.caplets()[0].state, CapletState::AtTarget);
        assert_eq!(tl.caplets()[0].glow, Glow::Soft);
    }

    #[test]
    fn test_begin_twice_is_noop() {
        let mut tl = seeded(10);
        tl.begin();
        tl.advance(100.0);
        let pending = tl.pending_timers();
        let before = states(&tl);
        tl.drain_events();

        tl.begin();
        assert_eq!(tl.pending_timers(), pending);
        assert_eq!(states(&tl), before);
        assert!(tl.drain_events().is_empty());
    }

    #[test]
    fn test_begin_after_complete_is_noop() {
        let mut tl = seeded(5);
        tl.begin();
        tl.advance(10_000.0);
        assert_eq!(tl.phase(), RunPhase::Complete);
        tl.begin();
        assert_eq!(tl.phase(), RunPhase::Complete);
        assert_eq!(tl.pending_timers(), 0);
    }

    #[test]
    fn test_reset_cancels_everything() {
        let mut tl = seeded(40);
        tl.begin();
        tl.advance(1600.0);
        assert!(tl.stage().heart_glow);
        assert!(tl.pending_timers() > 0);

        tl.reset();
        assert_eq!(tl.phase(), RunPhase::Idle);
        assert!(!tl.is_running());
        assert_eq!(tl.pending_timers(), 0);
        assert_eq!(tl.now_ms(), 0.0);
        assert!(states(&tl).iter().all(|s| *s == CapletState::AtStart));
        assert!(tl.stage().start_enabled);
        assert!(!tl.stage().heart_glow);
        assert!(
            tl.drain_events()
                .iter()
                .any(|e| matches!(e, ShowEvent::Reset { cancelled } if *cancelled > 0))
        );

        // Late timers must not fire
        let snapshot: Vec<_> = tl.caplets().to_vec();
        tl.advance(20_000.0);
        assert!(tl.drain_events().is_empty());
        assert_eq!(tl.phase(), RunPhase::Idle);
        assert!(!tl.stage().text_visible);
        for (a, b) in tl.caplets().iter().zip(&snapshot) {
            assert_eq!(a.state, b.state);
            assert_eq!(a.start, b.start);
            assert_eq!(a.glow, Glow::None);
        }
    }

    #[test]
    fn test_reset_rerandomizes_start() {
        let mut tl = Timeline::with_random(
            small_settings(3),
            viewport(),
            ScriptedRandom::new(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7]),
        )
        .unwrap();
        let before: Vec<_> = tl.caplets().iter().map(|c| c.start).collect();
        tl.reset();
        let after: Vec<_> = tl.caplets().iter().map(|c| c.start).collect();
        assert_ne!(before, after);
        for p in after {
            assert!(p.y >= 650.0);
        }
    }

    #[test]
    fn test_run_again_after_reset() {
        let mut tl = seeded(8);
        tl.begin();
        tl.advance(3100.0);
        tl.reset();
        tl.begin();
        assert_eq!(tl.phase(), RunPhase::Running);
        tl.advance(10_000.0);
        assert_eq!(tl.phase(), RunPhase::Complete);
        assert!(tl.stage().subtitle_visible);
    }

    #[test]
    fn test_resize_while_idle_updates_targets() {
        let mut tl = seeded(16);
        let old_starts: Vec<_> = tl.caplets().iter().map(|c| c.start).collect();
        let vp = Viewport::new(1200.0, 900.0);
        tl.on_resize(vp).unwrap();

        let expected = vp.heart_layout().sample(16).unwrap();
        for (c, p) in tl.caplets().iter().zip(&expected) {
            assert_eq!(c.target, *p);
            assert!(c.start.y >= 950.0);
        }
        let new_starts: Vec<_> = tl.caplets().iter().map(|c| c.start).collect();
        assert_ne!(old_starts, new_starts);
        assert_eq!(tl.viewport(), vp);
    }

    #[test]
    fn test_resize_while_running_is_ignored() {
        let mut tl = seeded(16);
        tl.begin();
        tl.advance(250.0);
        let before: Vec<_> = tl
            .caplets()
            .iter()
            .map(|c| (c.start, c.target, c.state))
            .collect();
        tl.on_resize(Viewport::new(300.0, 300.0)).unwrap();
        let after: Vec<_> = tl
            .caplets()
            .iter()
            .map(|c| (c.start, c.target, c.state))
            .collect();
        assert_eq!(before, after);
        assert_eq!(tl.viewport(), viewport());
    }

    #[test]
    fn test_resize_to_empty_viewport_fails_cleanly() {
        let mut tl = seeded(4);
        let before: Vec<_> = tl.caplets().iter().map(|c| c.target).collect();
        assert!(tl.on_resize(Viewport::new(0.0, 0.0)).is_err());
        let after: Vec<_> = tl.caplets().iter().map(|c| c.target).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_milestone_ties_keep_registration_order() {
        let mut settings = small_settings(1);
        settings.launch_delay_min_ms = 1000.0;
        settings.launch_delay_spread_ms = 0.0;
        let mut tl =
            Timeline::with_random(settings, viewport(), ScriptedRandom::constant(0.0)).unwrap();
        tl.add_milestone(Milestone::new("tie-a", 1500.0, MilestoneAction::Signal))
            .unwrap();
        tl.add_milestone(Milestone::new("early", 10.0, MilestoneAction::Signal))
            .unwrap();
        tl.add_milestone(Milestone::new("tie-b", 1500.0, MilestoneAction::Signal))
            .unwrap();
        tl.begin();
        tl.advance(1500.0);

        let order: Vec<String> = tl
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                ShowEvent::MilestoneFired { name } => Some(name),
                _ => None,
            })
            .collect();
        assert_eq!(order, vec!["early", "heart-glow", "tie-a", "tie-b"]);
    }

    #[test]
    fn test_milestone_rejects_bad_delay() {
        let mut tl = seeded(2);
        for delay in [f64::NAN, -1.0, f64::INFINITY] {
            assert!(matches!(
                tl.add_milestone(Milestone::new("bad", delay, MilestoneAction::Signal)),
                Err(Error::InvalidArgument(_))
            ));
        }
        assert_eq!(tl.milestones().len(), 4);

        tl.begin();
        tl.advance(0.0);
        assert!(
            !tl.drain_events()
                .iter()
                .any(|e| matches!(e, ShowEvent::MilestoneFired { .. }))
        );
    }

    #[test]
    fn test_clock_stays_at_zero_while_idle() {
        let mut tl = seeded(4);
        tl.advance(5000.0);
        assert_eq!(tl.now_ms(), 0.0);

        tl.begin();
        tl.advance(400.0);
        assert_eq!(tl.now_ms(), 400.0);
        tl.reset();
        tl.advance(3000.0);
        assert_eq!(tl.now_ms(), 0.0);

        // Next run counts from its own start
        tl.begin();
        tl.advance(10_000.0);
        assert_eq!(tl.now_ms(), 10_000.0);
        assert_eq!(tl.phase(), RunPhase::Complete);
    }

    #[test]
    fn test_negative_start_depth_rejected() {
        let mut settings = small_settings(4);
        settings.start_below_min = -700.0;
        settings.start_below_spread = 0.0;
        assert!(Timeline::new(settings, viewport(), 1).is_err());
    }

    #[test]
    fn test_caplet_fires_before_milestone_on_tie() {
        let mut settings = small_settings(1);
        settings.launch_delay_min_ms = 1500.0;
        settings.launch_delay_spread_ms = 0.0;
        let mut tl =
            Timeline::with_random(settings, viewport(), ScriptedRandom::constant(0.0)).unwrap();
        tl.begin();
        tl.drain_events();
        tl.advance(1500.0);
        let events = tl.drain_events();
        let launch = events
            .iter()
            .position(|e| matches!(e, ShowEvent::CapletLaunched { .. }));
        let glow = events
            .iter()
            .position(|e| matches!(e, ShowEvent::MilestoneFired { name } if name == "heart-glow"));
        assert!(launch.unwrap() < glow.unwrap());
    }

    #[test]
    fn test_reduced_motion_skips_burst_and_sparkles() {
        let mut settings = small_settings(4);
        settings.reduced_motion = true;
        let mut tl = Timeline::new(settings, viewport(), 7).unwrap();
        assert_eq!(tl.sparkle_at(Point::new(1.0, 1.0)), None);
        tl.begin();
        tl.advance(5000.0);
        assert!(tl.stage().bursts.is_empty());
        assert_eq!(tl.phase(), RunPhase::Complete);
    }

    #[test]
    fn test_sparkles_age_out_and_survive_reset() {
        let mut tl = seeded(4);
        let id = tl.sparkle_at(Point::new(50.0, 60.0)).unwrap();
        assert_eq!(tl.stage().sparkles[0].id, id);
        tl.advance(700.0);
        tl.reset();
        assert_eq!(tl.stage().sparkles.len(), 1);
        tl.advance(800.0);
        assert!(tl.stage().sparkles.is_empty());
    }

    #[test]
    fn test_deterministic_for_same_seed() {
        let mut a = seeded(30);
        let mut b = seeded(30);
        for _ in 0..2 {
            a.begin();
            b.begin();
            for _ in 0..100 {
                a.advance(16.0);
                b.advance(16.0);
            }
            assert_eq!(a.drain_events(), b.drain_events());
            a.reset();
            b.reset();
        }
        let sa: Vec<_> = a.caplets().iter().map(|c| c.start).collect();
        let sb: Vec<_> = b.caplets().iter().map(|c| c.start).collect();
        assert_eq!(sa, sb);
    }
}
