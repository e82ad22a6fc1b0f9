use bevy::prelude::*;
use rand::Rng;
use std::ops::Range;
use std::time::Duration;

/// Accumulate-then-threshold timing primitive used to drive bounded sub-states
/// within boss attacks. Thin wrapper over `bevy::time::Timer` that can re-roll
/// its duration from a jitter range each time it restarts.
#[derive(Debug, Clone)]
pub struct PhaseTimer {
    timer: Timer,
    jitter: Option<Range<f32>>,
}

impl PhaseTimer {
    pub fn fixed(secs: f32) -> Self {
        Self {
            timer: Timer::from_seconds(secs, TimerMode::Once),
            jitter: None,
        }
    }

    pub fn repeating(secs: f32) -> Self {
        Self {
            timer: Timer::from_seconds(secs, TimerMode::Repeating),
            jitter: None,
        }
    }

    /// One-shot timer with a duration rolled from `range` now and on `reroll`.
    pub fn jittered(range: Range<f32>, rng: &mut impl Rng) -> Self {
        let secs = rng.gen_range(range.clone());
        Self {
            timer: Timer::from_seconds(secs, TimerMode::Once),
            jitter: Some(range),
        }
    }

    pub fn jittered_repeating(range: Range<f32>, rng: &mut impl Rng) -> Self {
        let secs = rng.gen_range(range.clone());
        Self {
            timer: Timer::from_seconds(secs, TimerMode::Repeating),
            jitter: Some(range),
        }
    }

    pub fn tick(&mut self, delta: Duration) -> &mut Self {
        self.timer.tick(delta);
        self
    }

    pub fn finished(&self) -> bool {
        self.timer.finished()
    }

    pub fn just_finished(&self) -> bool {
        self.timer.just_finished()
    }

    /// Number of completions this tick. A repeating timer fed a huge delta
    /// reports every elapsed period, so callers spawning one hazard per period
    /// stay exact under arbitrary frame jumps.
    pub fn times_finished_this_tick(&self) -> u32 {
        self.timer.times_finished_this_tick()
    }

    pub fn fraction(&self) -> f32 {
        self.timer.fraction()
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.timer.elapsed_secs()
    }

    pub fn duration_secs(&self) -> f32 {
        self.timer.duration().as_secs_f32()
    }

    pub fn reset(&mut self) {
        self.timer.reset();
    }

    /// Restart with a fresh duration: re-rolled from the jitter range when one
    /// was configured, unchanged otherwise.
    pub fn reroll(&mut self, rng: &mut impl Rng) {
        if let Some(range) = &self.jitter {
            let secs = rng.gen_range(range.clone());
            self.timer.set_duration(Duration::from_secs_f32(secs));
        }
        self.timer.reset();
    }

    pub fn set_duration_secs(&mut self, secs: f32) {
        self.timer.set_duration(Duration::from_secs_f32(secs));
    }
}

/// Caps a repeating timer's completion count against the remaining quota, so
/// a spawn loop emits exactly `target` entities no matter how coarse the
/// frame delta was.
pub fn bounded_completions(completions: u32, already_done: u32, target: u32) -> u32 {
    completions.min(target.saturating_sub(already_done))
}
