use bevy::prelude::*;
use std::time::Duration;

#[derive(Component, Deref, DerefMut)]
pub struct Velocity(pub Vec2);

#[derive(Component)]
pub struct Health(pub i32);

#[derive(Component)]
pub struct Damage(pub i32);

#[derive(Component)]
pub struct Lifetime {
    pub timer: Timer,
}

/// Entities carrying this are swept at the end of the frame. Hazards and
/// enemies mark themselves instead of despawning mid-iteration.
#[derive(Component, Default)]
pub struct MarkedForDespawn;

/// A looping frame counter with a completed-cycle flag. Every boss state owns
/// one of these for its private animation instead of ad hoc timer fields.
#[derive(Debug, Clone)]
pub struct AnimationCycle {
    frame_timer: Timer,
    frame: usize,
    frame_count: usize,
    cycled: bool,
}

impl AnimationCycle {
    pub fn new(frame_count: usize, seconds_per_frame: f32) -> Self {
        Self {
            frame_timer: Timer::from_seconds(seconds_per_frame, TimerMode::Repeating),
            frame: 0,
            frame_count: frame_count.max(1),
            cycled: false,
        }
    }

    pub fn tick(&mut self, delta: Duration) {
        self.cycled = false;
        self.frame_timer.tick(delta);
        for _ in 0..self.frame_timer.times_finished_this_tick() {
            self.frame += 1;
            if self.frame >= self.frame_count {
                self.frame = 0;
                self.cycled = true;
            }
        }
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    /// True on the tick the counter wrapped past its last frame.
    pub fn completed_cycle(&self) -> bool {
        self.cycled
    }

    pub fn on_frame(&self, frame: usize) -> bool {
        self.frame == frame
    }

    pub fn reset(&mut self) {
        self.frame_timer.reset();
        self.frame = 0;
        self.cycled = false;
    }
}
