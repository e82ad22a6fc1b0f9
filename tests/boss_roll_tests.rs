use frostrift::frost_tyrant::{self, TyrantRollContext, TyrantState};
use frostrift::phase_timer::{bounded_completions, PhaseTimer};
use frostrift::void_herald::{self, HeraldRollContext, HeraldState};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

fn tyrant_ctx() -> TyrantRollContext {
    TyrantRollContext {
        previous: TyrantState::Idle,
        runs_since_middle: 0,
        near_middle: true,
        attacks_since_slam: 0,
        shard_ready: true,
        blizzard_ready: true,
        blizzard_active: false,
    }
}

fn herald_ctx() -> HeraldRollContext {
    HeraldRollContext {
        previous: HeraldState::Idle,
        runs_since_middle: 0,
        near_middle: true,
        attacks_since_rain: 0,
        beam_ready: true,
        storm_ready: true,
        storm_active: false,
    }
}

#[test]
fn run_counter_at_limit_forces_another_run() {
    let mut rng = StdRng::seed_from_u64(3);
    let ctx = TyrantRollContext {
        previous: TyrantState::Run,
        runs_since_middle: 10,
        near_middle: false,
        ..tyrant_ctx()
    };
    // The forced rule beats the no-repeat exclusion on every roll.
    for _ in 0..100 {
        assert_eq!(frost_tyrant::roll_next_state(&ctx, &mut rng), TyrantState::Run);
    }
}

#[test]
fn run_forcing_stands_down_once_centered() {
    let mut rng = StdRng::seed_from_u64(5);
    let ctx = TyrantRollContext {
        previous: TyrantState::Run,
        runs_since_middle: 10,
        near_middle: true,
        ..tyrant_ctx()
    };
    let mut saw_non_run = false;
    for _ in 0..100 {
        if frost_tyrant::roll_next_state(&ctx, &mut rng) != TyrantState::Run {
            saw_non_run = true;
        }
    }
    assert!(saw_non_run, "centered boss must not be locked into running");
}

#[test]
fn heavy_attack_counter_forces_the_slam() {
    let mut rng = StdRng::seed_from_u64(9);
    let ctx = TyrantRollContext {
        attacks_since_slam: 10,
        ..tyrant_ctx()
    };
    for _ in 0..100 {
        assert_eq!(
            frost_tyrant::roll_next_state(&ctx, &mut rng),
            TyrantState::KneelSlam
        );
    }
}

#[test]
fn ability_on_cooldown_is_never_selected() {
    let mut rng = StdRng::seed_from_u64(21);
    let ctx = TyrantRollContext {
        shard_ready: false,
        ..tyrant_ctx()
    };
    for _ in 0..300 {
        assert_ne!(
            frost_tyrant::roll_next_state(&ctx, &mut rng),
            TyrantState::ShardVolley
        );
    }
}

#[test]
fn storm_attack_excluded_while_already_stormed() {
    let mut rng = StdRng::seed_from_u64(33);
    let ctx = TyrantRollContext {
        blizzard_active: true,
        ..tyrant_ctx()
    };
    for _ in 0..300 {
        assert_ne!(
            frost_tyrant::roll_next_state(&ctx, &mut rng),
            TyrantState::Blizzard
        );
    }
}

#[test]
fn herald_forced_rules_mirror_the_tyrant() {
    let mut rng = StdRng::seed_from_u64(13);
    let run_ctx = HeraldRollContext {
        previous: HeraldState::Run,
        runs_since_middle: 10,
        near_middle: false,
        ..herald_ctx()
    };
    for _ in 0..100 {
        assert_eq!(
            void_herald::roll_next_state(&run_ctx, &mut rng),
            HeraldState::Run
        );
    }
    let rain_ctx = HeraldRollContext {
        attacks_since_rain: 10,
        ..herald_ctx()
    };
    for _ in 0..100 {
        assert_eq!(
            void_herald::roll_next_state(&rain_ctx, &mut rng),
            HeraldState::AsteroidRain
        );
    }
}

#[test]
fn herald_storm_excluded_while_rift_is_stormed() {
    let mut rng = StdRng::seed_from_u64(17);
    let ctx = HeraldRollContext {
        storm_active: true,
        ..herald_ctx()
    };
    for _ in 0..300 {
        assert_ne!(
            void_herald::roll_next_state(&ctx, &mut rng),
            HeraldState::Riftstorm
        );
    }
}

#[test]
fn airborne_drop_count_is_exact_for_tiny_steps() {
    let mut timer = PhaseTimer::repeating(0.3);
    let mut dropped = 0;
    for _ in 0..10_000 {
        timer.tick(Duration::from_secs_f32(0.004));
        dropped += bounded_completions(
            timer.times_finished_this_tick(),
            dropped,
            frost_tyrant::ICICLES_PER_JUMP,
        );
        if dropped >= frost_tyrant::ICICLES_PER_JUMP {
            break;
        }
    }
    assert_eq!(dropped, frost_tyrant::ICICLES_PER_JUMP);
}

#[test]
fn airborne_drop_count_is_exact_for_one_huge_step() {
    let mut timer = PhaseTimer::repeating(0.3);
    timer.tick(Duration::from_secs(300));
    let dropped = bounded_completions(
        timer.times_finished_this_tick(),
        0,
        void_herald::SPIDERLINGS_PER_JUMP,
    );
    assert_eq!(dropped, void_herald::SPIDERLINGS_PER_JUMP);
}
