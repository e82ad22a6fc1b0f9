//! The Frost Tyrant, boss of the Tundra. Top-level behavior loop:
//! idle -> randomized attack/run/jump -> recharge -> idle, with the defeat
//! and run-away stages driven by the director's engagement phase.

use bevy::prelude::*;
use rand::Rng;

use crate::audio::{PlaySoundEvent, SoundId, StopSoundEvent};
use crate::boss_director::{
    ArenaBounds, Boss, BossDirector, BossHitbox, BossLives, EngagementPhase,
};
use crate::components::AnimationCycle;
use crate::defeat::DefeatSequence;
use crate::game::{AppState, GROUND_Y};
use crate::hazards::{spawn_frost_gust, spawn_ground_spike, spawn_ice_shard, spawn_icicle};
use crate::phase_timer::{bounded_completions, PhaseTimer};
use crate::player::Player;
use crate::screen_effect::{ScreenEffectId, ScreenEffectSettings, ScreenEffectStack};

pub const FROST_TYRANT_SIZE: Vec2 = Vec2::new(110.0, 140.0);
const MAX_LIVES: i32 = 12;

const RUN_SPEED: f32 = 230.0;
const RUN_AWAY_SPEED: f32 = 420.0;
const MIDDLE_EPSILON: f32 = 60.0;
const RUN_FORCE_LIMIT: u32 = 3;
const SLAM_FORCE_AFTER: u32 = 4;
const REPEAT_CHANCE: f64 = 0.15;
const STOP_AT_MIDDLE_CHANCE: f64 = 0.5;

const IDLE_FRAMES: usize = 6;
const FRAME_SECS: f32 = 0.12;

const JUMP_ASCEND_SECS: f32 = 0.4;
const JUMP_HEIGHT: f32 = 230.0;
const JUMP_DESCEND_SPEED: f32 = 520.0;
const JUMP_DRIFT_SPEED: f32 = 300.0;
pub const ICICLES_PER_JUMP: u32 = 3;

const VOLLEY_FRAMES: usize = 5;
const VOLLEY_KEY_FRAME: usize = 3;
const VOLLEY_SHARD_COUNT: u32 = 3;
const SHARD_COOLDOWN_SECS: f32 = 6.0;

const BLIZZARD_ATTACK_SECS: f32 = 3.0;
const BLIZZARD_LINGER_SECS: f32 = 6.0;
const BLIZZARD_COOLDOWN_SECS: f32 = 14.0;

const SLAM_KNEEL_SECS: f32 = 0.45;
const SLAM_RISE_SECS: f32 = 0.45;
const SLAM_ICICLE_COUNT: usize = 4;
const SLAM_SPIKE_COUNT: usize = 3;

const RECHARGE_SECS: f32 = 1.6;
const DESPAWN_MARGIN: f32 = 260.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TyrantState {
    Idle,
    Run,
    Jump,
    ShardVolley,
    Blizzard,
    KneelSlam,
    Recharge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpPhase {
    Ascend,
    Airborne,
    Descend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlamVariant {
    IcicleFall,
    GroundSpikes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlamPhase {
    KneelDown,
    Hold,
    Rise,
}

#[derive(Component)]
pub struct FrostTyrant {
    pub state: TyrantState,
    pub previous_state: TyrantState,
    pub facing_left: bool,
    pub reached_left_edge: bool,
    pub reached_right_edge: bool,
    pub stop_at_middle: bool,
    pub runs_since_middle: u32,
    pub attacks_since_slam: u32,
    pub idle_anim: AnimationCycle,
    pub state_anim: AnimationCycle,
    pub state_timer: PhaseTimer,
    pub run_dir: f32,
    pub jump_phase: JumpPhase,
    pub icicle_timer: PhaseTimer,
    pub icicles_dropped: u32,
    pub landing_x: f32,
    pub volley_fired: bool,
    pub slam_variant: SlamVariant,
    pub slam_phase: SlamPhase,
    pub slam_hazards: Vec<Entity>,
    pub gust_timer: PhaseTimer,
    pub storm_linger: Option<PhaseTimer>,
    pub shard_cooldown: Timer,
    pub blizzard_cooldown: Timer,
}

fn expired_timer(secs: f32) -> Timer {
    let mut timer = Timer::from_seconds(secs, TimerMode::Once);
    timer.tick(timer.duration());
    timer
}

impl FrostTyrant {
    fn new() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            state: TyrantState::Idle,
            previous_state: TyrantState::Idle,
            facing_left: true,
            reached_left_edge: false,
            reached_right_edge: false,
            stop_at_middle: false,
            runs_since_middle: 0,
            attacks_since_slam: 0,
            idle_anim: AnimationCycle::new(IDLE_FRAMES, FRAME_SECS),
            state_anim: AnimationCycle::new(VOLLEY_FRAMES, FRAME_SECS),
            state_timer: PhaseTimer::fixed(1.0),
            run_dir: -1.0,
            jump_phase: JumpPhase::Ascend,
            icicle_timer: PhaseTimer::jittered_repeating(0.25..0.55, &mut rng),
            icicles_dropped: 0,
            landing_x: 0.0,
            volley_fired: false,
            slam_variant: SlamVariant::IcicleFall,
            slam_phase: SlamPhase::KneelDown,
            slam_hazards: Vec::new(),
            gust_timer: PhaseTimer::jittered_repeating(0.4..0.9, &mut rng),
            storm_linger: None,
            shard_cooldown: expired_timer(SHARD_COOLDOWN_SECS),
            blizzard_cooldown: expired_timer(BLIZZARD_COOLDOWN_SECS),
        }
    }
}

pub fn tyrant_stand_y() -> f32 {
    GROUND_Y + FROST_TYRANT_SIZE.y / 2.0
}

pub fn spawn_frost_tyrant(
    commands: &mut Commands,
    asset_server: &AssetServer,
    spawn_x: f32,
) -> Entity {
    commands
        .spawn((
            SpriteBundle {
                texture: asset_server.load("sprites/frost_tyrant_placeholder.png"),
                sprite: Sprite {
                    custom_size: Some(FROST_TYRANT_SIZE),
                    ..default()
                },
                transform: Transform::from_xyz(spawn_x, tyrant_stand_y(), 0.55),
                ..default()
            },
            FrostTyrant::new(),
            Boss,
            BossLives::new(MAX_LIVES),
            BossHitbox(FROST_TYRANT_SIZE / 2.0),
            Name::new("FrostTyrant"),
        ))
        .id()
}

/// Inputs to the idle-exit state roll, separated from the ECS so the forcing
/// and exclusion rules are testable on their own.
pub struct TyrantRollContext {
    pub previous: TyrantState,
    pub runs_since_middle: u32,
    pub near_middle: bool,
    pub attacks_since_slam: u32,
    pub shard_ready: bool,
    pub blizzard_ready: bool,
    pub blizzard_active: bool,
}

pub fn roll_next_state(ctx: &TyrantRollContext, rng: &mut impl Rng) -> TyrantState {
    // Forced rules win over everything, including the no-repeat exclusion.
    if ctx.runs_since_middle >= RUN_FORCE_LIMIT && !ctx.near_middle {
        return TyrantState::Run;
    }
    if ctx.attacks_since_slam >= SLAM_FORCE_AFTER {
        return TyrantState::KneelSlam;
    }
    let mut candidates = vec![TyrantState::Run, TyrantState::Jump, TyrantState::KneelSlam];
    if ctx.shard_ready {
        candidates.push(TyrantState::ShardVolley);
    }
    if ctx.blizzard_ready && !ctx.blizzard_active {
        candidates.push(TyrantState::Blizzard);
    }
    if !rng.gen_bool(REPEAT_CHANCE) {
        candidates.retain(|s| *s != ctx.previous);
    }
    if candidates.is_empty() {
        return TyrantState::Run;
    }
    candidates[rng.gen_range(0..candidates.len())]
}

pub struct FrostTyrantPlugin;

impl Plugin for FrostTyrantPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            frost_tyrant_ai_system.run_if(in_state(AppState::InGame)),
        );
    }
}

fn frost_tyrant_ai_system(
    mut commands: Commands,
    time: Res<Time>,
    asset_server: Res<AssetServer>,
    mut director: ResMut<BossDirector>,
    arena: Option<Res<ArenaBounds>>,
    mut effects: ResMut<ScreenEffectStack>,
    defeat: Res<DefeatSequence>,
    mut boss_query: Query<(Entity, &mut Transform, &mut FrostTyrant, &mut Sprite)>,
    player_query: Query<&Transform, (With<Player>, Without<FrostTyrant>)>,
    mut sound_events: EventWriter<PlaySoundEvent>,
    mut stop_events: EventWriter<StopSoundEvent>,
) {
    let Ok((entity, mut transform, mut boss, mut sprite)) = boss_query.get_single_mut() else {
        return;
    };
    let Ok(player_transform) = player_query.get_single() else {
        return;
    };
    let player_x = player_transform.translation.x;
    let dt = time.delta();

    boss.shard_cooldown.tick(dt);
    boss.blizzard_cooldown.tick(dt);
    if let Some(linger) = boss.storm_linger.as_mut() {
        if linger.tick(dt).finished() {
            effects.release(ScreenEffectId::Blizzard);
            stop_events.send(StopSoundEvent(SoundId::BlizzardWind));
            boss.storm_linger = None;
        }
    }

    match director.phase {
        EngagementPhase::TalkToBoss | EngagementPhase::PreFight | EngagementPhase::PostFight => {
            boss.idle_anim.tick(dt);
            boss.facing_left = player_x < transform.translation.x;
            sprite.flip_x = !boss.facing_left;
            return;
        }
        EngagementPhase::RunAway => {
            let dir = if player_x < transform.translation.x {
                1.0
            } else {
                -1.0
            };
            boss.facing_left = dir < 0.0;
            sprite.flip_x = !boss.facing_left;
            transform.translation.x += dir * RUN_AWAY_SPEED * time.delta_seconds();
            let gone = match arena.as_ref() {
                Some(arena) => {
                    transform.translation.x < arena.left - DESPAWN_MARGIN
                        || transform.translation.x > arena.right + DESPAWN_MARGIN
                }
                None => true,
            };
            if gone {
                if boss.storm_linger.is_some() {
                    effects.release(ScreenEffectId::Blizzard);
                    stop_events.send(StopSoundEvent(SoundId::BlizzardWind));
                }
                commands.entity(entity).despawn_recursive();
                director.clear_active_boss();
                commands.remove_resource::<ArenaBounds>();
            }
            return;
        }
        EngagementPhase::Inactive => return,
        EngagementPhase::InFight => {}
    }

    if defeat.is_triggered() {
        boss.idle_anim.tick(dt);
        return;
    }
    let Some(arena) = arena else {
        return;
    };
    let arena_center = (arena.left + arena.right) / 2.0;
    let half_width = FROST_TYRANT_SIZE.x / 2.0;
    let mut rng = rand::thread_rng();

    match boss.state {
        TyrantState::Idle => {
            boss.idle_anim.tick(dt);
            boss.facing_left = player_x < transform.translation.x;
            sprite.flip_x = !boss.facing_left;
            if boss.idle_anim.completed_cycle() {
                let ctx = TyrantRollContext {
                    previous: boss.previous_state,
                    runs_since_middle: boss.runs_since_middle,
                    near_middle: (transform.translation.x - arena_center).abs() < MIDDLE_EPSILON,
                    attacks_since_slam: boss.attacks_since_slam,
                    shard_ready: boss.shard_cooldown.finished(),
                    blizzard_ready: boss.blizzard_cooldown.finished(),
                    blizzard_active: effects.has_layer(ScreenEffectId::Blizzard),
                };
                let next = roll_next_state(&ctx, &mut rng);
                enter_state(&mut boss, next, &transform, player_x, arena_center, &mut rng);
                if boss.state == TyrantState::Blizzard {
                    effects.request(ScreenEffectId::Blizzard, blizzard_effect_settings());
                    sound_events.send(PlaySoundEvent::looped(SoundId::BlizzardWind));
                } else if boss.state == TyrantState::Jump {
                    sound_events.send(PlaySoundEvent::once(SoundId::JumpWhoosh));
                }
            }
        }
        TyrantState::Run => {
            boss.facing_left = boss.run_dir < 0.0;
            sprite.flip_x = !boss.facing_left;
            transform.translation.x += boss.run_dir * RUN_SPEED * time.delta_seconds();
            if boss.stop_at_middle
                && (transform.translation.x - arena_center).abs() < MIDDLE_EPSILON
            {
                boss.runs_since_middle = 0;
                boss.reached_left_edge = false;
                boss.reached_right_edge = false;
                return_to_idle(&mut boss);
                return;
            }
            if transform.translation.x <= arena.left + half_width {
                transform.translation.x = arena.left + half_width;
                boss.reached_left_edge = true;
                boss.reached_right_edge = false;
                boss.runs_since_middle += 1;
                boss.stop_at_middle = rng.gen_bool(STOP_AT_MIDDLE_CHANCE);
                return_to_idle(&mut boss);
            } else if transform.translation.x >= arena.right - half_width {
                transform.translation.x = arena.right - half_width;
                boss.reached_right_edge = true;
                boss.reached_left_edge = false;
                boss.runs_since_middle += 1;
                boss.stop_at_middle = rng.gen_bool(STOP_AT_MIDDLE_CHANCE);
                return_to_idle(&mut boss);
            }
        }
        TyrantState::Jump => match boss.jump_phase {
            JumpPhase::Ascend => {
                boss.state_timer.tick(dt);
                let rise = JUMP_HEIGHT / JUMP_ASCEND_SECS * time.delta_seconds();
                transform.translation.y =
                    (transform.translation.y + rise).min(tyrant_stand_y() + JUMP_HEIGHT);
                if boss.state_timer.finished() {
                    boss.jump_phase = JumpPhase::Airborne;
                }
            }
            JumpPhase::Airborne => {
                boss.icicle_timer.tick(dt);
                let due = bounded_completions(
                    boss.icicle_timer.times_finished_this_tick(),
                    boss.icicles_dropped,
                    ICICLES_PER_JUMP,
                );
                for _ in 0..due {
                    let x = player_x + rng.gen_range(-140.0..140.0);
                    spawn_icicle(&mut commands, &asset_server, x, entity);
                    sound_events.send(PlaySoundEvent::once(SoundId::IceShardThrow));
                    boss.icicles_dropped += 1;
                }
                if boss.icicles_dropped >= ICICLES_PER_JUMP {
                    boss.landing_x = rng.gen_range(arena.left + half_width..arena.right - half_width);
                    boss.jump_phase = JumpPhase::Descend;
                }
            }
            JumpPhase::Descend => {
                let dx = boss.landing_x - transform.translation.x;
                let step = JUMP_DRIFT_SPEED * time.delta_seconds();
                if dx.abs() > step {
                    transform.translation.x += dx.signum() * step;
                } else {
                    transform.translation.x = boss.landing_x;
                }
                transform.translation.y -= JUMP_DESCEND_SPEED * time.delta_seconds();
                if transform.translation.y <= tyrant_stand_y() {
                    transform.translation.y = tyrant_stand_y();
                    sound_events.send(PlaySoundEvent::once(SoundId::SlamImpact));
                    return_to_idle(&mut boss);
                }
            }
        },
        TyrantState::ShardVolley => {
            boss.state_anim.tick(dt);
            boss.facing_left = player_x < transform.translation.x;
            sprite.flip_x = !boss.facing_left;
            let key_frame_reached =
                boss.state_anim.frame() >= VOLLEY_KEY_FRAME || boss.state_anim.completed_cycle();
            if key_frame_reached && !boss.volley_fired {
                boss.volley_fired = true;
                boss.shard_cooldown.reset();
                sound_events.send(PlaySoundEvent::once(SoundId::IceShardThrow));
                let from = transform.translation.truncate()
                    + Vec2::new(if boss.facing_left { -half_width } else { half_width }, 10.0);
                let target_base = player_transform.translation.truncate();
                for i in 0..VOLLEY_SHARD_COUNT {
                    let spread = (i as f32 - (VOLLEY_SHARD_COUNT as f32 - 1.0) / 2.0) * 46.0;
                    spawn_ice_shard(
                        &mut commands,
                        &asset_server,
                        from,
                        target_base + Vec2::new(0.0, spread.abs()) + Vec2::new(spread * 0.3, 0.0),
                        entity,
                    );
                }
            }
            if boss.state_anim.completed_cycle() && boss.volley_fired {
                enter_recharge(&mut boss);
            }
        }
        TyrantState::Blizzard => {
            boss.state_timer.tick(dt);
            boss.gust_timer.tick(dt);
            for _ in 0..boss.gust_timer.times_finished_this_tick() {
                let from_left = rng.gen_bool(0.5);
                let x = if from_left { arena.left } else { arena.right };
                let y = GROUND_Y + rng.gen_range(20.0..170.0);
                let dir = if from_left { 1.0 } else { -1.0 };
                spawn_frost_gust(&mut commands, &asset_server, Vec2::new(x, y), dir, entity);
            }
            if boss.state_timer.finished() {
                boss.blizzard_cooldown.reset();
                // The storm outlasts the attack; the linger timer releases it.
                boss.storm_linger = Some(PhaseTimer::fixed(BLIZZARD_LINGER_SECS));
                enter_recharge(&mut boss);
            }
        }
        TyrantState::KneelSlam => match boss.slam_phase {
            SlamPhase::KneelDown => {
                boss.state_timer.tick(dt);
                if boss.state_timer.finished() {
                    sound_events.send(PlaySoundEvent::once(SoundId::SlamImpact));
                    let hazards: Vec<Entity> = match boss.slam_variant {
                        SlamVariant::IcicleFall => (0..SLAM_ICICLE_COUNT)
                            .map(|i| {
                                let offset = (i as f32 - 1.5) * 85.0 + rng.gen_range(-20.0..20.0);
                                spawn_icicle(&mut commands, &asset_server, player_x + offset, entity)
                            })
                            .collect(),
                        SlamVariant::GroundSpikes => (0..SLAM_SPIKE_COUNT)
                            .map(|i| {
                                let offset = (i as f32 - 1.0) * 95.0 + rng.gen_range(-15.0..15.0);
                                spawn_ground_spike(
                                    &mut commands,
                                    &asset_server,
                                    player_x + offset,
                                    entity,
                                )
                            })
                            .collect(),
                    };
                    boss.slam_hazards = hazards;
                    boss.slam_phase = SlamPhase::Hold;
                }
            }
            SlamPhase::Hold => {
                boss.slam_hazards
                    .retain(|&hazard| commands.get_entity(hazard).is_some());
                if boss.slam_hazards.is_empty() {
                    boss.slam_phase = SlamPhase::Rise;
                    boss.state_timer = PhaseTimer::fixed(SLAM_RISE_SECS);
                }
            }
            SlamPhase::Rise => {
                boss.state_timer.tick(dt);
                if boss.state_timer.finished() {
                    return_to_idle(&mut boss);
                }
            }
        },
        TyrantState::Recharge => {
            boss.state_timer.tick(dt);
            boss.state_anim.tick(dt);
            if boss.state_timer.finished() && boss.state_anim.completed_cycle() {
                return_to_idle(&mut boss);
            }
        }
    }
}

fn return_to_idle(boss: &mut FrostTyrant) {
    boss.previous_state = boss.state;
    boss.state = TyrantState::Idle;
    boss.idle_anim.reset();
}

fn enter_recharge(boss: &mut FrostTyrant) {
    boss.previous_state = boss.state;
    boss.state = TyrantState::Recharge;
    boss.state_timer = PhaseTimer::fixed(RECHARGE_SECS);
    boss.state_anim = AnimationCycle::new(IDLE_FRAMES, FRAME_SECS);
}

fn enter_state(
    boss: &mut FrostTyrant,
    next: TyrantState,
    transform: &Transform,
    player_x: f32,
    arena_center: f32,
    rng: &mut impl Rng,
) {
    boss.previous_state = boss.state;
    boss.state = next;
    match next {
        TyrantState::Idle => {
            boss.idle_anim.reset();
        }
        TyrantState::Run => {
            boss.run_dir = if boss.reached_right_edge {
                -1.0
            } else if boss.reached_left_edge {
                1.0
            } else if boss.stop_at_middle {
                (arena_center - transform.translation.x).signum()
            } else {
                (player_x - transform.translation.x).signum()
            };
            if boss.run_dir == 0.0 {
                boss.run_dir = -1.0;
            }
        }
        TyrantState::Jump => {
            boss.jump_phase = JumpPhase::Ascend;
            boss.state_timer = PhaseTimer::fixed(JUMP_ASCEND_SECS);
            boss.icicles_dropped = 0;
            boss.icicle_timer = PhaseTimer::jittered_repeating(0.25..0.55, rng);
            boss.attacks_since_slam += 1;
        }
        TyrantState::ShardVolley => {
            boss.state_anim = AnimationCycle::new(VOLLEY_FRAMES, FRAME_SECS);
            boss.volley_fired = false;
            boss.attacks_since_slam += 1;
        }
        TyrantState::Blizzard => {
            boss.state_timer = PhaseTimer::fixed(BLIZZARD_ATTACK_SECS);
            boss.gust_timer = PhaseTimer::jittered_repeating(0.4..0.9, rng);
            boss.attacks_since_slam += 1;
        }
        TyrantState::KneelSlam => {
            boss.slam_phase = SlamPhase::KneelDown;
            boss.state_timer = PhaseTimer::fixed(SLAM_KNEEL_SECS);
            boss.slam_variant = if rng.gen_bool(0.5) {
                SlamVariant::IcicleFall
            } else {
                SlamVariant::GroundSpikes
            };
            boss.slam_hazards.clear();
            boss.attacks_since_slam = 0;
        }
        TyrantState::Recharge => {
            boss.state_timer = PhaseTimer::fixed(RECHARGE_SECS);
        }
    }
}

/// Blizzard entry effect, split out so the system stays readable.
pub fn blizzard_effect_settings() -> ScreenEffectSettings {
    ScreenEffectSettings {
        rgb: Color::rgb(0.75, 0.85, 1.0),
        fade_in_speed: 0.25,
        color_lerp_speed: 0.9,
    }
}
