use frostrift::components::AnimationCycle;
use frostrift::phase_timer::PhaseTimer;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

#[test]
fn fixed_timer_finishes_at_threshold() {
    let mut timer = PhaseTimer::fixed(1.0);
    timer.tick(Duration::from_secs_f32(0.6));
    assert!(!timer.finished());
    timer.tick(Duration::from_secs_f32(0.4));
    assert!(timer.finished());
}

#[test]
fn fixed_timer_tolerates_huge_delta() {
    let mut timer = PhaseTimer::fixed(0.5);
    timer.tick(Duration::from_secs(120));
    assert!(timer.finished());
}

#[test]
fn repeating_timer_reports_every_completion_in_one_tick() {
    let mut timer = PhaseTimer::repeating(0.25);
    timer.tick(Duration::from_secs_f32(1.0));
    assert_eq!(timer.times_finished_this_tick(), 4);
    timer.tick(Duration::from_secs_f32(0.1));
    assert_eq!(timer.times_finished_this_tick(), 0);
}

#[test]
fn jittered_timer_rolls_duration_inside_range() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let timer = PhaseTimer::jittered(0.3..0.9, &mut rng);
        assert!(timer.duration_secs() >= 0.3 && timer.duration_secs() < 0.9);
    }
}

#[test]
fn reroll_resets_elapsed_and_rerolls_jitter() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut timer = PhaseTimer::jittered(0.3..0.9, &mut rng);
    timer.tick(Duration::from_secs_f32(0.2));
    timer.reroll(&mut rng);
    assert_eq!(timer.elapsed_secs(), 0.0);
    assert!(timer.duration_secs() >= 0.3 && timer.duration_secs() < 0.9);
}

#[test]
fn animation_cycle_flags_completed_cycle_on_wrap() {
    let mut anim = AnimationCycle::new(4, 0.1);
    anim.tick(Duration::from_secs_f32(0.3));
    assert_eq!(anim.frame(), 3);
    assert!(!anim.completed_cycle());
    anim.tick(Duration::from_secs_f32(0.1));
    assert_eq!(anim.frame(), 0);
    assert!(anim.completed_cycle());
    anim.tick(Duration::from_secs_f32(0.05));
    assert!(!anim.completed_cycle(), "flag only holds for the wrapping tick");
}

#[test]
fn animation_cycle_wraps_under_large_delta() {
    let mut anim = AnimationCycle::new(4, 0.1);
    anim.tick(Duration::from_secs_f32(0.95));
    assert!(anim.completed_cycle());
    assert_eq!(anim.frame(), 1);
}
