//! Boss-spawned transient entities: projectiles, ground hazards, minions,
//! beams, barriers. Each is a plain entity composed from the shared capability
//! components below; all of them self-mark for despawn once expired,
//! off-screen, dead, or orphaned, and a single sweep removes marked entities
//! at the end of the frame.

use bevy::prelude::*;

use crate::audio::{PlaySoundEvent, SoundId};
use crate::boss_director::ArenaBounds;
use crate::camera_systems::MainCamera;
use crate::components::{Health, Lifetime, MarkedForDespawn, Velocity};
use crate::game::{AppState, GROUND_Y, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::phase_timer::PhaseTimer;
use crate::player::{Player, PlayerShot, PLAYER_SIZE};

pub const ICE_SHARD_SIZE: Vec2 = Vec2::new(22.0, 10.0);
pub const ICICLE_SIZE: Vec2 = Vec2::new(16.0, 42.0);
pub const GROUND_SPIKE_SIZE: Vec2 = Vec2::new(26.0, 64.0);
pub const FROST_GUST_SIZE: Vec2 = Vec2::new(48.0, 24.0);
pub const SPIDERLING_SIZE: Vec2 = Vec2::new(26.0, 20.0);
pub const ASTEROID_SIZE: Vec2 = Vec2::new(36.0, 36.0);
pub const PRISM_BEAM_SIZE: Vec2 = Vec2::new(320.0, 18.0);
pub const RIFT_BARRIER_SIZE: Vec2 = Vec2::new(20.0, 180.0);

const ICE_SHARD_SPEED: f32 = 420.0;
const ICICLE_FALL_ACCEL: f32 = 900.0;
const ASTEROID_FALL_ACCEL: f32 = 700.0;
const FROST_GUST_SPEED: f32 = 240.0;
const SPIDERLING_SPEED: f32 = 130.0;
const SPIDERLING_HEALTH: i32 = 10;
const SPIDERLING_LIFETIME_SECS: f32 = 12.0;
const BEAM_EXTEND_SECS: f32 = 0.5;
const BEAM_HOLD_SECS: f32 = 1.6;
const BEAM_RETRACT_SECS: f32 = 0.4;
const BEAM_SWEEP_SPEED: f32 = 140.0;
const BARRIER_RISE_SECS: f32 = 0.5;
const BARRIER_LIFETIME_SECS: f32 = 6.0;
const OFFSCREEN_MARGIN: f32 = SCREEN_WIDTH * 0.75;
const HAZARD_Z: f32 = 0.6;

#[derive(Component)]
pub struct Hazard;

/// Back-reference to the boss that spawned this entity. If the boss is gone,
/// the hazard marks itself on its next update.
#[derive(Component)]
pub struct OwnedBy(pub Entity);

#[derive(Component)]
pub struct ContactDamage {
    pub amount: i32,
    pub knockback: f32,
}

/// Half-extent used by the player-contact overlap test.
#[derive(Component)]
pub struct HazardExtent(pub Vec2);

#[derive(Component)]
pub struct IceShard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundImpact {
    Shatter,
    Linger,
}

#[derive(Component)]
pub struct Falling {
    pub accel: f32,
    pub impact_sound: SoundId,
    pub on_ground: GroundImpact,
}

#[derive(Component)]
pub struct Icicle;

#[derive(Component)]
pub struct Asteroid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpikePhase {
    Telegraph,
    Erupt,
    Hold,
    Sink,
}

#[derive(Component)]
pub struct GroundSpike {
    pub phase: SpikePhase,
    pub phase_timer: PhaseTimer,
}

#[derive(Component)]
pub struct FrostGust;

#[derive(Component)]
pub struct Spiderling {
    pub retarget_timer: PhaseTimer,
    pub dir: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeamPhase {
    Extend,
    Sweep,
    Retract,
}

#[derive(Component)]
pub struct PrismBeam {
    pub phase: BeamPhase,
    pub phase_timer: PhaseTimer,
    pub facing: f32,
}

#[derive(Component)]
pub struct RiftBarrier {
    pub rise_timer: PhaseTimer,
}

pub struct HazardsPlugin;

impl Plugin for HazardsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                linear_hazard_motion_system,
                falling_hazard_system,
                ground_spike_system,
                spiderling_system,
                prism_beam_system,
                rift_barrier_system,
                hazard_lifetime_system,
                orphaned_hazard_system,
                offscreen_hazard_system,
                hazard_contact_system,
                shot_hits_hazard_system,
            )
                .chain()
                .run_if(in_state(AppState::InGame)),
        )
        .add_systems(PostUpdate, sweep_marked_entities)
        .add_systems(OnExit(AppState::InGame), despawn_all_hazards);
    }
}

// --- spawn helpers -------------------------------------------------------

pub fn spawn_ice_shard(
    commands: &mut Commands,
    asset_server: &AssetServer,
    from: Vec2,
    target: Vec2,
    owner: Entity,
) -> Entity {
    let dir = (target - from).normalize_or_zero();
    commands
        .spawn((
            SpriteBundle {
                texture: asset_server.load("sprites/ice_shard_placeholder.png"),
                sprite: Sprite {
                    custom_size: Some(ICE_SHARD_SIZE),
                    ..default()
                },
                transform: Transform::from_translation(from.extend(HAZARD_Z))
                    .with_rotation(Quat::from_rotation_z(dir.y.atan2(dir.x))),
                ..default()
            },
            Hazard,
            IceShard,
            OwnedBy(owner),
            Velocity(dir * ICE_SHARD_SPEED),
            ContactDamage {
                amount: 10,
                knockback: 40.0,
            },
            HazardExtent(ICE_SHARD_SIZE / 2.0),
            Lifetime {
                timer: Timer::from_seconds(4.0, TimerMode::Once),
            },
            Name::new("IceShard"),
        ))
        .id()
}

pub fn spawn_icicle(
    commands: &mut Commands,
    asset_server: &AssetServer,
    x: f32,
    owner: Entity,
) -> Entity {
    let spawn_y = SCREEN_HEIGHT / 2.0 + ICICLE_SIZE.y;
    commands
        .spawn((
            SpriteBundle {
                texture: asset_server.load("sprites/icicle_placeholder.png"),
                sprite: Sprite {
                    custom_size: Some(ICICLE_SIZE),
                    ..default()
                },
                transform: Transform::from_xyz(x, spawn_y, HAZARD_Z),
                ..default()
            },
            Hazard,
            Icicle,
            OwnedBy(owner),
            Velocity(Vec2::ZERO),
            Falling {
                accel: ICICLE_FALL_ACCEL,
                impact_sound: SoundId::IcicleShatter,
                on_ground: GroundImpact::Shatter,
            },
            ContactDamage {
                amount: 12,
                knockback: 30.0,
            },
            HazardExtent(ICICLE_SIZE / 2.0),
            Name::new("Icicle"),
        ))
        .id()
}

pub fn spawn_ground_spike(
    commands: &mut Commands,
    asset_server: &AssetServer,
    x: f32,
    owner: Entity,
) -> Entity {
    // Spawns sunk below the ground line; the spike system raises it.
    commands
        .spawn((
            SpriteBundle {
                texture: asset_server.load("sprites/ground_spike_placeholder.png"),
                sprite: Sprite {
                    custom_size: Some(GROUND_SPIKE_SIZE),
                    ..default()
                },
                transform: Transform::from_xyz(x, GROUND_Y - GROUND_SPIKE_SIZE.y / 2.0, HAZARD_Z),
                ..default()
            },
            Hazard,
            GroundSpike {
                phase: SpikePhase::Telegraph,
                phase_timer: PhaseTimer::fixed(0.5),
            },
            OwnedBy(owner),
            ContactDamage {
                amount: 15,
                knockback: 60.0,
            },
            HazardExtent(GROUND_SPIKE_SIZE / 2.0),
            Name::new("GroundSpike"),
        ))
        .id()
}

pub fn spawn_frost_gust(
    commands: &mut Commands,
    asset_server: &AssetServer,
    from: Vec2,
    dir: f32,
    owner: Entity,
) -> Entity {
    commands
        .spawn((
            SpriteBundle {
                texture: asset_server.load("sprites/frost_gust_placeholder.png"),
                sprite: Sprite {
                    custom_size: Some(FROST_GUST_SIZE),
                    color: Color::rgba(0.8, 0.9, 1.0, 0.8),
                    flip_x: dir < 0.0,
                    ..default()
                },
                transform: Transform::from_translation(from.extend(HAZARD_Z)),
                ..default()
            },
            Hazard,
            FrostGust,
            OwnedBy(owner),
            Velocity(Vec2::new(dir * FROST_GUST_SPEED, 0.0)),
            ContactDamage {
                amount: 5,
                knockback: 80.0,
            },
            HazardExtent(FROST_GUST_SIZE / 2.0),
            Lifetime {
                timer: Timer::from_seconds(5.0, TimerMode::Once),
            },
            Name::new("FrostGust"),
        ))
        .id()
}

pub fn spawn_spiderling(
    commands: &mut Commands,
    asset_server: &AssetServer,
    from: Vec2,
    owner: Entity,
) -> Entity {
    commands
        .spawn((
            SpriteBundle {
                texture: asset_server.load("sprites/spiderling_placeholder.png"),
                sprite: Sprite {
                    custom_size: Some(SPIDERLING_SIZE),
                    ..default()
                },
                transform: Transform::from_translation(from.extend(HAZARD_Z)),
                ..default()
            },
            Hazard,
            Spiderling {
                retarget_timer: PhaseTimer::repeating(1.2),
                dir: 1.0,
            },
            OwnedBy(owner),
            Health(SPIDERLING_HEALTH),
            Velocity(Vec2::ZERO),
            ContactDamage {
                amount: 8,
                knockback: 25.0,
            },
            HazardExtent(SPIDERLING_SIZE / 2.0),
            Lifetime {
                timer: Timer::from_seconds(SPIDERLING_LIFETIME_SECS, TimerMode::Once),
            },
            Name::new("Spiderling"),
        ))
        .id()
}

pub fn spawn_asteroid(
    commands: &mut Commands,
    asset_server: &AssetServer,
    x: f32,
    horizontal_drift: f32,
    owner: Entity,
) -> Entity {
    let spawn_y = SCREEN_HEIGHT / 2.0 + ASTEROID_SIZE.y;
    commands
        .spawn((
            SpriteBundle {
                texture: asset_server.load("sprites/asteroid_placeholder.png"),
                sprite: Sprite {
                    custom_size: Some(ASTEROID_SIZE),
                    ..default()
                },
                transform: Transform::from_xyz(x, spawn_y, HAZARD_Z),
                ..default()
            },
            Hazard,
            Asteroid,
            OwnedBy(owner),
            Velocity(Vec2::new(horizontal_drift, 0.0)),
            Falling {
                accel: ASTEROID_FALL_ACCEL,
                impact_sound: SoundId::AsteroidImpact,
                on_ground: GroundImpact::Linger,
            },
            ContactDamage {
                amount: 14,
                knockback: 50.0,
            },
            HazardExtent(ASTEROID_SIZE / 2.0),
            Name::new("Asteroid"),
        ))
        .id()
}

pub fn spawn_prism_beam(
    commands: &mut Commands,
    asset_server: &AssetServer,
    origin: Vec2,
    facing: f32,
    owner: Entity,
) -> Entity {
    commands
        .spawn((
            SpriteBundle {
                texture: asset_server.load("sprites/prism_beam_placeholder.png"),
                sprite: Sprite {
                    custom_size: Some(PRISM_BEAM_SIZE),
                    color: Color::rgba(0.9, 0.5, 1.0, 0.9),
                    ..default()
                },
                // Anchored at the boss's arm; scale x grows outward.
                transform: Transform::from_translation(origin.extend(HAZARD_Z))
                    .with_scale(Vec3::new(0.0, 1.0, 1.0)),
                ..default()
            },
            Hazard,
            PrismBeam {
                phase: BeamPhase::Extend,
                phase_timer: PhaseTimer::fixed(BEAM_EXTEND_SECS),
                facing,
            },
            OwnedBy(owner),
            ContactDamage {
                amount: 18,
                knockback: 90.0,
            },
            HazardExtent(PRISM_BEAM_SIZE / 2.0),
            Name::new("PrismBeam"),
        ))
        .id()
}

pub fn spawn_rift_barrier(
    commands: &mut Commands,
    asset_server: &AssetServer,
    x: f32,
    owner: Entity,
) -> Entity {
    commands
        .spawn((
            SpriteBundle {
                texture: asset_server.load("sprites/rift_barrier_placeholder.png"),
                sprite: Sprite {
                    custom_size: Some(RIFT_BARRIER_SIZE),
                    color: Color::rgba(0.6, 0.3, 0.9, 0.85),
                    ..default()
                },
                transform: Transform::from_xyz(x, GROUND_Y - RIFT_BARRIER_SIZE.y / 2.0, HAZARD_Z),
                ..default()
            },
            Hazard,
            RiftBarrier {
                rise_timer: PhaseTimer::fixed(BARRIER_RISE_SECS),
            },
            OwnedBy(owner),
            ContactDamage {
                amount: 0,
                knockback: 120.0,
            },
            HazardExtent(RIFT_BARRIER_SIZE / 2.0),
            Lifetime {
                timer: Timer::from_seconds(BARRIER_LIFETIME_SECS, TimerMode::Once),
            },
            Name::new("RiftBarrier"),
        ))
        .id()
}

// --- lifecycle systems ---------------------------------------------------

fn linear_hazard_motion_system(
    time: Res<Time>,
    mut query: Query<
        (&mut Transform, &Velocity),
        (With<Hazard>, Or<(With<IceShard>, With<FrostGust>)>),
    >,
) {
    for (mut transform, velocity) in query.iter_mut() {
        transform.translation.x += velocity.x * time.delta_seconds();
        transform.translation.y += velocity.y * time.delta_seconds();
    }
}

fn falling_hazard_system(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut Velocity, &Falling, &HazardExtent)>,
    mut sound_events: EventWriter<PlaySoundEvent>,
) {
    for (entity, mut transform, mut velocity, falling, extent) in query.iter_mut() {
        velocity.y -= falling.accel * time.delta_seconds();
        transform.translation.x += velocity.x * time.delta_seconds();
        transform.translation.y += velocity.y * time.delta_seconds();
        let rest_y = GROUND_Y + extent.0.y;
        if transform.translation.y <= rest_y {
            transform.translation.y = rest_y;
            sound_events.send(PlaySoundEvent::once(falling.impact_sound));
            match falling.on_ground {
                GroundImpact::Shatter => {
                    commands.entity(entity).insert(MarkedForDespawn);
                }
                GroundImpact::Linger => {
                    commands
                        .entity(entity)
                        .remove::<Falling>()
                        .insert(Lifetime {
                            timer: Timer::from_seconds(1.5, TimerMode::Once),
                        });
                }
            }
        }
    }
}

fn ground_spike_system(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut GroundSpike, &HazardExtent)>,
    mut sound_events: EventWriter<PlaySoundEvent>,
) {
    for (entity, mut transform, mut spike, extent) in query.iter_mut() {
        spike.phase_timer.tick(time.delta());
        let sunk_y = GROUND_Y - extent.0.y;
        let raised_y = GROUND_Y + extent.0.y;
        match spike.phase {
            SpikePhase::Telegraph => {
                if spike.phase_timer.finished() {
                    spike.phase = SpikePhase::Erupt;
                    spike.phase_timer = PhaseTimer::fixed(0.18);
                    sound_events.send(PlaySoundEvent::once(SoundId::GroundSpikeErupt));
                }
            }
            SpikePhase::Erupt => {
                let t = spike.phase_timer.fraction();
                transform.translation.y = sunk_y + (raised_y - sunk_y) * t;
                if spike.phase_timer.finished() {
                    transform.translation.y = raised_y;
                    spike.phase = SpikePhase::Hold;
                    spike.phase_timer = PhaseTimer::fixed(1.1);
                }
            }
            SpikePhase::Hold => {
                if spike.phase_timer.finished() {
                    spike.phase = SpikePhase::Sink;
                    spike.phase_timer = PhaseTimer::fixed(0.35);
                }
            }
            SpikePhase::Sink => {
                let t = spike.phase_timer.fraction();
                transform.translation.y = raised_y + (sunk_y - raised_y) * t;
                if spike.phase_timer.finished() {
                    commands.entity(entity).insert(MarkedForDespawn);
                }
            }
        }
    }
}

fn spiderling_system(
    time: Res<Time>,
    player_query: Query<&Transform, (With<Player>, Without<Spiderling>)>,
    mut query: Query<(&mut Transform, &mut Velocity, &mut Spiderling, &mut Sprite, &HazardExtent)>,
) {
    let player_x = player_query
        .get_single()
        .map(|t| t.translation.x)
        .unwrap_or(0.0);
    for (mut transform, mut velocity, mut spiderling, mut sprite, extent) in query.iter_mut() {
        if spiderling.retarget_timer.tick(time.delta()).just_finished() {
            spiderling.dir = (player_x - transform.translation.x).signum();
        }
        velocity.x = spiderling.dir * SPIDERLING_SPEED;
        sprite.flip_x = spiderling.dir < 0.0;
        transform.translation.x += velocity.x * time.delta_seconds();
        // Spiderlings fall to the ground after being dropped mid-air.
        let rest_y = GROUND_Y + extent.0.y;
        if transform.translation.y > rest_y {
            transform.translation.y =
                (transform.translation.y - 500.0 * time.delta_seconds()).max(rest_y);
        }
    }
}

fn prism_beam_system(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut PrismBeam)>,
) {
    for (entity, mut transform, mut beam) in query.iter_mut() {
        beam.phase_timer.tick(time.delta());
        match beam.phase {
            BeamPhase::Extend => {
                transform.scale.x = beam.phase_timer.fraction();
                if beam.phase_timer.finished() {
                    transform.scale.x = 1.0;
                    beam.phase = BeamPhase::Sweep;
                    beam.phase_timer = PhaseTimer::fixed(BEAM_HOLD_SECS);
                }
            }
            BeamPhase::Sweep => {
                transform.translation.x += beam.facing * BEAM_SWEEP_SPEED * time.delta_seconds();
                if beam.phase_timer.finished() {
                    beam.phase = BeamPhase::Retract;
                    beam.phase_timer = PhaseTimer::fixed(BEAM_RETRACT_SECS);
                }
            }
            BeamPhase::Retract => {
                transform.scale.x = 1.0 - beam.phase_timer.fraction();
                if beam.phase_timer.finished() {
                    commands.entity(entity).insert(MarkedForDespawn);
                }
            }
        }
    }
}

fn rift_barrier_system(
    time: Res<Time>,
    mut query: Query<(&mut Transform, &mut RiftBarrier, &HazardExtent)>,
) {
    for (mut transform, mut barrier, extent) in query.iter_mut() {
        barrier.rise_timer.tick(time.delta());
        let sunk_y = GROUND_Y - extent.0.y;
        let raised_y = GROUND_Y + extent.0.y;
        let t = barrier.rise_timer.fraction();
        transform.translation.y = sunk_y + (raised_y - sunk_y) * t;
    }
}

fn hazard_lifetime_system(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Lifetime), With<Hazard>>,
) {
    for (entity, mut lifetime) in query.iter_mut() {
        lifetime.timer.tick(time.delta());
        if lifetime.timer.just_finished() {
            commands.entity(entity).insert(MarkedForDespawn);
        }
    }
}

/// Hazards whose owning boss is gone mark themselves instead of faulting.
fn orphaned_hazard_system(
    mut commands: Commands,
    query: Query<(Entity, &OwnedBy), With<Hazard>>,
    owners: Query<(), With<crate::boss_director::Boss>>,
) {
    for (entity, owned_by) in query.iter() {
        if owners.get(owned_by.0).is_err() {
            commands.entity(entity).insert(MarkedForDespawn);
        }
    }
}

fn offscreen_hazard_system(
    mut commands: Commands,
    camera_query: Query<&Transform, With<MainCamera>>,
    query: Query<(Entity, &Transform), (With<Hazard>, Without<MainCamera>)>,
) {
    let Ok(camera_transform) = camera_query.get_single() else {
        return;
    };
    let camera_x = camera_transform.translation.x;
    for (entity, transform) in query.iter() {
        let off_x = (transform.translation.x - camera_x).abs() > SCREEN_WIDTH / 2.0 + OFFSCREEN_MARGIN;
        let off_y = transform.translation.y < GROUND_Y - SCREEN_HEIGHT;
        if off_x || off_y {
            commands.entity(entity).insert(MarkedForDespawn);
        }
    }
}

fn hazard_contact_system(
    arena: Option<Res<ArenaBounds>>,
    mut player_query: Query<(&mut Transform, &mut Health, &mut Player)>,
    hazard_query: Query<
        (&Transform, &ContactDamage, &HazardExtent),
        (With<Hazard>, Without<Player>, Without<MarkedForDespawn>),
    >,
    mut sound_events: EventWriter<PlaySoundEvent>,
) {
    let Ok((mut player_transform, mut player_health, mut player)) = player_query.get_single_mut()
    else {
        return;
    };
    let player_half = PLAYER_SIZE / 2.0;
    for (hazard_transform, contact, extent) in hazard_query.iter() {
        let delta = hazard_transform.translation.truncate()
            - player_transform.translation.truncate();
        if delta.x.abs() > extent.0.x + player_half.x || delta.y.abs() > extent.0.y + player_half.y
        {
            continue;
        }
        let push_dir = if delta.x > 0.0 { -1.0 } else { 1.0 };
        if contact.knockback > 0.0 {
            player_transform.translation.x += push_dir * contact.knockback;
            if let Some(arena) = arena.as_ref() {
                player_transform.translation.x = player_transform
                    .translation
                    .x
                    .clamp(arena.left + player_half.x, arena.right - player_half.x);
            }
        }
        if contact.amount > 0 && player.invincibility_timer.finished() {
            player_health.0 -= contact.amount;
            player.invincibility_timer.reset();
            sound_events.send(PlaySoundEvent::once(SoundId::PlayerHit));
        }
    }
}

fn shot_hits_hazard_system(
    mut commands: Commands,
    shot_query: Query<(Entity, &Transform, &crate::components::Damage), With<PlayerShot>>,
    mut hazard_query: Query<
        (Entity, &Transform, &mut Health, &HazardExtent),
        (With<Hazard>, Without<PlayerShot>),
    >,
) {
    for (shot_entity, shot_transform, damage) in shot_query.iter() {
        for (hazard_entity, hazard_transform, mut health, extent) in hazard_query.iter_mut() {
            let delta = shot_transform.translation.truncate()
                - hazard_transform.translation.truncate();
            if delta.x.abs() > extent.0.x || delta.y.abs() > extent.0.y {
                continue;
            }
            health.0 -= damage.0;
            commands.entity(shot_entity).despawn_recursive();
            if health.0 <= 0 {
                commands.entity(hazard_entity).insert(MarkedForDespawn);
            }
            break;
        }
    }
}

/// Single end-of-frame sweep for everything marked during the tick. Entities
/// spawned this frame are first seen by the update systems next tick.
fn sweep_marked_entities(mut commands: Commands, query: Query<Entity, With<MarkedForDespawn>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}

fn despawn_all_hazards(mut commands: Commands, query: Query<Entity, With<Hazard>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}
