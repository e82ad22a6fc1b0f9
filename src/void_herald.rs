//! The Void Herald, boss of the Riftlands. Shares the Frost Tyrant's loop
//! skeleton (idle -> roll -> attack -> recharge) with its own attack set:
//! spiderling drops, asteroid rains, a sweeping prism beam behind rift
//! barriers, and the riftstorm overlay.

use bevy::prelude::*;
use rand::Rng;

use crate::audio::{PlaySoundEvent, SoundId, StopSoundEvent};
use crate::boss_director::{
    ArenaBounds, Boss, BossDirector, BossHitbox, BossLives, EngagementPhase,
};
use crate::components::AnimationCycle;
use crate::defeat::DefeatSequence;
use crate::game::{AppState, GROUND_Y};
use crate::hazards::{
    spawn_asteroid, spawn_ground_spike, spawn_prism_beam, spawn_rift_barrier, spawn_spiderling,
};
use crate::phase_timer::{bounded_completions, PhaseTimer};
use crate::player::Player;
use crate::screen_effect::{ScreenEffectId, ScreenEffectSettings, ScreenEffectStack};

pub const VOID_HERALD_SIZE: Vec2 = Vec2::new(96.0, 150.0);
const MAX_LIVES: i32 = 14;

const GLIDE_SPEED: f32 = 260.0;
const RUN_AWAY_SPEED: f32 = 460.0;
const MIDDLE_EPSILON: f32 = 55.0;
const RUN_FORCE_LIMIT: u32 = 3;
const RAIN_FORCE_AFTER: u32 = 4;
const REPEAT_CHANCE: f64 = 0.12;
const STOP_AT_MIDDLE_CHANCE: f64 = 0.45;

const IDLE_FRAMES: usize = 8;
const FRAME_SECS: f32 = 0.1;

const JUMP_ASCEND_SECS: f32 = 0.5;
const JUMP_HEIGHT: f32 = 260.0;
const JUMP_DESCEND_SPEED: f32 = 480.0;
const JUMP_DRIFT_SPEED: f32 = 260.0;
pub const SPIDERLINGS_PER_JUMP: u32 = 2;

const BEAM_FRAMES: usize = 6;
const BEAM_KEY_FRAME: usize = 4;
const BEAM_COOLDOWN_SECS: f32 = 9.0;
const BARRIER_INSET: f32 = 60.0;

const RAIN_CHANNEL_SECS: f32 = 0.6;
const RAIN_RISE_SECS: f32 = 0.5;
const RAIN_SKY_COUNT: usize = 5;
const RAIN_BURST_COUNT: usize = 4;

const STORM_ATTACK_SECS: f32 = 3.5;
const STORM_LINGER_SECS: f32 = 7.0;
const STORM_COOLDOWN_SECS: f32 = 16.0;

const RECHARGE_SECS: f32 = 1.4;
const DESPAWN_MARGIN: f32 = 260.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeraldState {
    Idle,
    Run,
    Jump,
    AsteroidRain,
    PrismBeam,
    Riftstorm,
    Recharge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeraldJumpPhase {
    Ascend,
    Airborne,
    Descend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RainVariant {
    SkyBarrage,
    GroundBursts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RainPhase {
    Channel,
    Hold,
    Rise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeamStage {
    Charge,
    Hold,
}

#[derive(Component)]
pub struct VoidHerald {
    pub state: HeraldState,
    pub previous_state: HeraldState,
    pub facing_left: bool,
    pub reached_left_edge: bool,
    pub reached_right_edge: bool,
    pub stop_at_middle: bool,
    pub runs_since_middle: u32,
    pub attacks_since_rain: u32,
    pub idle_anim: AnimationCycle,
    pub state_anim: AnimationCycle,
    pub state_timer: PhaseTimer,
    pub run_dir: f32,
    pub jump_phase: HeraldJumpPhase,
    pub spiderling_timer: PhaseTimer,
    pub spiderlings_dropped: u32,
    pub landing_x: f32,
    pub rain_variant: RainVariant,
    pub rain_phase: RainPhase,
    pub rain_hazards: Vec<Entity>,
    pub beam_stage: BeamStage,
    pub beam_fired: bool,
    pub beam_entity: Option<Entity>,
    pub storm_drop_timer: PhaseTimer,
    pub storm_linger: Option<PhaseTimer>,
    pub beam_cooldown: Timer,
    pub storm_cooldown: Timer,
}

fn expired_timer(secs: f32) -> Timer {
    let mut timer = Timer::from_seconds(secs, TimerMode::Once);
    timer.tick(timer.duration());
    timer
}

impl VoidHerald {
    fn new() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            state: HeraldState::Idle,
            previous_state: HeraldState::Idle,
            facing_left: true,
            reached_left_edge: false,
            reached_right_edge: false,
            stop_at_middle: false,
            runs_since_middle: 0,
            attacks_since_rain: 0,
            idle_anim: AnimationCycle::new(IDLE_FRAMES, FRAME_SECS),
            state_anim: AnimationCycle::new(BEAM_FRAMES, FRAME_SECS),
            state_timer: PhaseTimer::fixed(1.0),
            run_dir: -1.0,
            jump_phase: HeraldJumpPhase::Ascend,
            spiderling_timer: PhaseTimer::jittered_repeating(0.35..0.8, &mut rng),
            spiderlings_dropped: 0,
            landing_x: 0.0,
            rain_variant: RainVariant::SkyBarrage,
            rain_phase: RainPhase::Channel,
            rain_hazards: Vec::new(),
            beam_stage: BeamStage::Charge,
            beam_fired: false,
            beam_entity: None,
            storm_drop_timer: PhaseTimer::jittered_repeating(0.8..1.4, &mut rng),
            storm_linger: None,
            beam_cooldown: expired_timer(BEAM_COOLDOWN_SECS),
            storm_cooldown: expired_timer(STORM_COOLDOWN_SECS),
        }
    }
}

pub fn herald_stand_y() -> f32 {
    GROUND_Y + VOID_HERALD_SIZE.y / 2.0
}

pub fn spawn_void_herald(
    commands: &mut Commands,
    asset_server: &AssetServer,
    spawn_x: f32,
) -> Entity {
    commands
        .spawn((
            SpriteBundle {
                texture: asset_server.load("sprites/void_herald_placeholder.png"),
                sprite: Sprite {
                    custom_size: Some(VOID_HERALD_SIZE),
                    ..default()
                },
                transform: Transform::from_xyz(spawn_x, herald_stand_y(), 0.55),
                ..default()
            },
            VoidHerald::new(),
            Boss,
            BossLives::new(MAX_LIVES),
            BossHitbox(VOID_HERALD_SIZE / 2.0),
            Name::new("VoidHerald"),
        ))
        .id()
}

pub struct HeraldRollContext {
    pub previous: HeraldState,
    pub runs_since_middle: u32,
    pub near_middle: bool,
    pub attacks_since_rain: u32,
    pub beam_ready: bool,
    pub storm_ready: bool,
    pub storm_active: bool,
}

pub fn roll_next_state(ctx: &HeraldRollContext, rng: &mut impl Rng) -> HeraldState {
    if ctx.runs_since_middle >= RUN_FORCE_LIMIT && !ctx.near_middle {
        return HeraldState::Run;
    }
    if ctx.attacks_since_rain >= RAIN_FORCE_AFTER {
        return HeraldState::AsteroidRain;
    }
    let mut candidates = vec![
        HeraldState::Run,
        HeraldState::Jump,
        HeraldState::AsteroidRain,
    ];
    if ctx.beam_ready {
        candidates.push(HeraldState::PrismBeam);
    }
    if ctx.storm_ready && !ctx.storm_active {
        candidates.push(HeraldState::Riftstorm);
    }
    if !rng.gen_bool(REPEAT_CHANCE) {
        candidates.retain(|s| *s != ctx.previous);
    }
    if candidates.is_empty() {
        return HeraldState::Run;
    }
    candidates[rng.gen_range(0..candidates.len())]
}

pub struct VoidHeraldPlugin;

impl Plugin for VoidHeraldPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            void_herald_ai_system.run_if(in_state(AppState::InGame)),
        );
    }
}

fn void_herald_ai_system(
    mut commands: Commands,
    time: Res<Time>,
    asset_server: Res<AssetServer>,
    mut director: ResMut<BossDirector>,
    arena: Option<Res<ArenaBounds>>,
    mut effects: ResMut<ScreenEffectStack>,
    defeat: Res<DefeatSequence>,
    mut boss_query: Query<(Entity, &mut Transform, &mut VoidHerald, &mut Sprite)>,
    player_query: Query<&Transform, (With<Player>, Without<VoidHerald>)>,
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

    boss.beam_cooldown.tick(dt);
    boss.storm_cooldown.tick(dt);
    if let Some(linger) = boss.storm_linger.as_mut() {
        if linger.tick(dt).finished() {
            effects.release(ScreenEffectId::Riftstorm);
            stop_events.send(StopSoundEvent(SoundId::RiftstormHum));
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
                    effects.release(ScreenEffectId::Riftstorm);
                    stop_events.send(StopSoundEvent(SoundId::RiftstormHum));
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
    let half_width = VOID_HERALD_SIZE.x / 2.0;
    let mut rng = rand::thread_rng();

    match boss.state {
        HeraldState::Idle => {
            boss.idle_anim.tick(dt);
            boss.facing_left = player_x < transform.translation.x;
            sprite.flip_x = !boss.facing_left;
            if boss.idle_anim.completed_cycle() {
                let ctx = HeraldRollContext {
                    previous: boss.previous_state,
                    runs_since_middle: boss.runs_since_middle,
                    near_middle: (transform.translation.x - arena_center).abs() < MIDDLE_EPSILON,
                    attacks_since_rain: boss.attacks_since_rain,
                    beam_ready: boss.beam_cooldown.finished(),
                    storm_ready: boss.storm_cooldown.finished(),
                    storm_active: effects.has_layer(ScreenEffectId::Riftstorm),
                };
                let next = roll_next_state(&ctx, &mut rng);
                enter_state(&mut boss, next, &transform, player_x, arena_center, &mut rng);
                match boss.state {
                    HeraldState::Riftstorm => {
                        effects.request(ScreenEffectId::Riftstorm, riftstorm_effect_settings());
                        sound_events.send(PlaySoundEvent::looped(SoundId::RiftstormHum));
                    }
                    HeraldState::Jump => {
                        sound_events.send(PlaySoundEvent::once(SoundId::JumpWhoosh));
                    }
                    HeraldState::PrismBeam => {
                        sound_events.send(PlaySoundEvent::once(SoundId::BeamCharge));
                    }
                    _ => {}
                }
            }
        }
        HeraldState::Run => {
            boss.facing_left = boss.run_dir < 0.0;
            sprite.flip_x = !boss.facing_left;
            transform.translation.x += boss.run_dir * GLIDE_SPEED * time.delta_seconds();
            // Glide bob, purely cosmetic.
            transform.translation.y =
                herald_stand_y() + (time.elapsed_seconds() * 6.0).sin() * 6.0;
            if boss.stop_at_middle
                && (transform.translation.x - arena_center).abs() < MIDDLE_EPSILON
            {
                boss.runs_since_middle = 0;
                boss.reached_left_edge = false;
                boss.reached_right_edge = false;
                transform.translation.y = herald_stand_y();
                return_to_idle(&mut boss);
                return;
            }
            if transform.translation.x <= arena.left + half_width {
                transform.translation.x = arena.left + half_width;
                boss.reached_left_edge = true;
                boss.reached_right_edge = false;
                boss.runs_since_middle += 1;
                boss.stop_at_middle = rng.gen_bool(STOP_AT_MIDDLE_CHANCE);
                transform.translation.y = herald_stand_y();
                return_to_idle(&mut boss);
            } else if transform.translation.x >= arena.right - half_width {
                transform.translation.x = arena.right - half_width;
                boss.reached_right_edge = true;
                boss.reached_left_edge = false;
                boss.runs_since_middle += 1;
                boss.stop_at_middle = rng.gen_bool(STOP_AT_MIDDLE_CHANCE);
                transform.translation.y = herald_stand_y();
                return_to_idle(&mut boss);
            }
        }
        HeraldState::Jump => match boss.jump_phase {
            HeraldJumpPhase::Ascend => {
                boss.state_timer.tick(dt);
                let rise = JUMP_HEIGHT / JUMP_ASCEND_SECS * time.delta_seconds();
                transform.translation.y =
                    (transform.translation.y + rise).min(herald_stand_y() + JUMP_HEIGHT);
                if boss.state_timer.finished() {
                    boss.jump_phase = HeraldJumpPhase::Airborne;
                }
            }
            HeraldJumpPhase::Airborne => {
                boss.spiderling_timer.tick(dt);
                let due = bounded_completions(
                    boss.spiderling_timer.times_finished_this_tick(),
                    boss.spiderlings_dropped,
                    SPIDERLINGS_PER_JUMP,
                );
                for _ in 0..due {
                    let from = transform.translation.truncate()
                        + Vec2::new(rng.gen_range(-40.0..40.0), -VOID_HERALD_SIZE.y / 2.0);
                    spawn_spiderling(&mut commands, &asset_server, from, entity);
                    sound_events.send(PlaySoundEvent::once(SoundId::SpiderlingChitter));
                    boss.spiderlings_dropped += 1;
                }
                if boss.spiderlings_dropped >= SPIDERLINGS_PER_JUMP {
                    boss.landing_x =
                        rng.gen_range(arena.left + half_width..arena.right - half_width);
                    boss.jump_phase = HeraldJumpPhase::Descend;
                }
            }
            HeraldJumpPhase::Descend => {
                let dx = boss.landing_x - transform.translation.x;
                let step = JUMP_DRIFT_SPEED * time.delta_seconds();
                if dx.abs() > step {
                    transform.translation.x += dx.signum() * step;
                } else {
                    transform.translation.x = boss.landing_x;
                }
                transform.translation.y -= JUMP_DESCEND_SPEED * time.delta_seconds();
                if transform.translation.y <= herald_stand_y() {
                    transform.translation.y = herald_stand_y();
                    return_to_idle(&mut boss);
                }
            }
        },
        HeraldState::AsteroidRain => match boss.rain_phase {
            RainPhase::Channel => {
                boss.state_timer.tick(dt);
                if boss.state_timer.finished() {
                    let hazards: Vec<Entity> = match boss.rain_variant {
                        RainVariant::SkyBarrage => (0..RAIN_SKY_COUNT)
                            .map(|i| {
                                let span = arena.right - arena.left;
                                let x = arena.left
                                    + span * (i as f32 + 0.5) / RAIN_SKY_COUNT as f32
                                    + rng.gen_range(-30.0..30.0);
                                let drift = rng.gen_range(-60.0..60.0);
                                spawn_asteroid(&mut commands, &asset_server, x, drift, entity)
                            })
                            .collect(),
                        RainVariant::GroundBursts => (0..RAIN_BURST_COUNT)
                            .map(|i| {
                                let offset =
                                    (i as f32 - 1.5) * 90.0 + rng.gen_range(-15.0..15.0);
                                spawn_ground_spike(
                                    &mut commands,
                                    &asset_server,
                                    player_x + offset,
                                    entity,
                                )
                            })
                            .collect(),
                    };
                    boss.rain_hazards = hazards;
                    boss.rain_phase = RainPhase::Hold;
                }
            }
            RainPhase::Hold => {
                boss.rain_hazards
                    .retain(|&hazard| commands.get_entity(hazard).is_some());
                if boss.rain_hazards.is_empty() {
                    boss.rain_phase = RainPhase::Rise;
                    boss.state_timer = PhaseTimer::fixed(RAIN_RISE_SECS);
                }
            }
            RainPhase::Rise => {
                boss.state_timer.tick(dt);
                if boss.state_timer.finished() {
                    return_to_idle(&mut boss);
                }
            }
        },
        HeraldState::PrismBeam => match boss.beam_stage {
            BeamStage::Charge => {
                boss.state_anim.tick(dt);
                boss.facing_left = player_x < transform.translation.x;
                sprite.flip_x = !boss.facing_left;
                let key_frame_reached = boss.state_anim.frame() >= BEAM_KEY_FRAME
                    || boss.state_anim.completed_cycle();
                if key_frame_reached && !boss.beam_fired {
                    boss.beam_fired = true;
                    boss.beam_cooldown.reset();
                    sound_events.send(PlaySoundEvent::once(SoundId::BeamSweep));
                    let facing = if boss.facing_left { -1.0 } else { 1.0 };
                    let origin = transform.translation.truncate()
                        + Vec2::new(facing * VOID_HERALD_SIZE.x * 0.7, 20.0);
                    let beam =
                        spawn_prism_beam(&mut commands, &asset_server, origin, facing, entity);
                    spawn_rift_barrier(
                        &mut commands,
                        &asset_server,
                        arena.left + BARRIER_INSET,
                        entity,
                    );
                    spawn_rift_barrier(
                        &mut commands,
                        &asset_server,
                        arena.right - BARRIER_INSET,
                        entity,
                    );
                    boss.beam_entity = Some(beam);
                    boss.beam_stage = BeamStage::Hold;
                }
            }
            BeamStage::Hold => {
                // Barriers outlive the beam; the hold ends when the beam dies.
                let beam_alive = boss
                    .beam_entity
                    .map(|beam| commands.get_entity(beam).is_some())
                    .unwrap_or(false);
                if !beam_alive {
                    boss.beam_entity = None;
                    enter_recharge(&mut boss);
                }
            }
        },
        HeraldState::Riftstorm => {
            boss.state_timer.tick(dt);
            boss.storm_drop_timer.tick(dt);
            for _ in 0..boss.storm_drop_timer.times_finished_this_tick() {
                let x = rng.gen_range(arena.left + 40.0..arena.right - 40.0);
                let drift = rng.gen_range(-40.0..40.0);
                spawn_asteroid(&mut commands, &asset_server, x, drift, entity);
            }
            if boss.state_timer.finished() {
                boss.storm_cooldown.reset();
                boss.storm_linger = Some(PhaseTimer::fixed(STORM_LINGER_SECS));
                enter_recharge(&mut boss);
            }
        }
        HeraldState::Recharge => {
            boss.state_timer.tick(dt);
            boss.state_anim.tick(dt);
            if boss.state_timer.finished() && boss.state_anim.completed_cycle() {
                return_to_idle(&mut boss);
            }
        }
    }
}

fn return_to_idle(boss: &mut VoidHerald) {
    boss.previous_state = boss.state;
    boss.state = HeraldState::Idle;
    boss.idle_anim.reset();
}

fn enter_recharge(boss: &mut VoidHerald) {
    boss.previous_state = boss.state;
    boss.state = HeraldState::Recharge;
    boss.state_timer = PhaseTimer::fixed(RECHARGE_SECS);
    boss.state_anim = AnimationCycle::new(IDLE_FRAMES, FRAME_SECS);
}

fn enter_state(
    boss: &mut VoidHerald,
    next: HeraldState,
    transform: &Transform,
    player_x: f32,
    arena_center: f32,
    rng: &mut impl Rng,
) {
    boss.previous_state = boss.state;
    boss.state = next;
    match next {
        HeraldState::Idle => {
            boss.idle_anim.reset();
        }
        HeraldState::Run => {
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
                boss.run_dir = 1.0;
            }
        }
        HeraldState::Jump => {
            boss.jump_phase = HeraldJumpPhase::Ascend;
            boss.state_timer = PhaseTimer::fixed(JUMP_ASCEND_SECS);
            boss.spiderlings_dropped = 0;
            boss.spiderling_timer = PhaseTimer::jittered_repeating(0.35..0.8, rng);
            boss.attacks_since_rain += 1;
        }
        HeraldState::AsteroidRain => {
            boss.rain_phase = RainPhase::Channel;
            boss.state_timer = PhaseTimer::fixed(RAIN_CHANNEL_SECS);
            boss.rain_variant = if rng.gen_bool(0.5) {
                RainVariant::SkyBarrage
            } else {
                RainVariant::GroundBursts
            };
            boss.rain_hazards.clear();
            boss.attacks_since_rain = 0;
        }
        HeraldState::PrismBeam => {
            boss.beam_stage = BeamStage::Charge;
            boss.state_anim = AnimationCycle::new(BEAM_FRAMES, FRAME_SECS);
            boss.beam_fired = false;
            boss.beam_entity = None;
            boss.attacks_since_rain += 1;
        }
        HeraldState::Riftstorm => {
            boss.state_timer = PhaseTimer::fixed(STORM_ATTACK_SECS);
            boss.storm_drop_timer = PhaseTimer::jittered_repeating(0.8..1.4, rng);
            boss.attacks_since_rain += 1;
        }
        HeraldState::Recharge => {
            boss.state_timer = PhaseTimer::fixed(RECHARGE_SECS);
        }
    }
}

pub fn riftstorm_effect_settings() -> ScreenEffectSettings {
    ScreenEffectSettings {
        rgb: Color::rgb(0.45, 0.2, 0.6),
        fade_in_speed: 0.3,
        color_lerp_speed: 0.9,
    }
}
