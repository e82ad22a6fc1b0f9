use bevy::prelude::*;

use crate::audio::{PlaySoundEvent, SoundId};
use crate::boss_director::ArenaBounds;
use crate::components::{Damage, Health, Lifetime, Velocity};
use crate::game::{AppState, GameState, GROUND_Y, SCREEN_WIDTH};

pub const PLAYER_SIZE: Vec2 = Vec2::new(40.0, 56.0);
pub const PLAYER_MAX_HEALTH: i32 = 100;
const PLAYER_RUN_SPEED: f32 = 260.0;
const PLAYER_JUMP_VELOCITY: f32 = 620.0;
const GRAVITY: f32 = 1500.0;
const INVINCIBILITY_SECS: f32 = 1.0;

const SHOT_SIZE: Vec2 = Vec2::new(14.0, 6.0);
const SHOT_SPEED: f32 = 640.0;
const SHOT_DAMAGE: i32 = 10;
const SHOT_LIFETIME_SECS: f32 = 1.2;
const SHOT_COOLDOWN_SECS: f32 = 0.25;
const SHOT_Z: f32 = 0.7;

#[derive(Component)]
pub struct Player {
    pub speed: f32,
    pub facing_right: bool,
    pub grounded: bool,
    pub invincibility_timer: Timer,
    /// Set by status effects; cleared by the defeat sequencer.
    pub invisible: bool,
    pub max_health: i32,
    last_x: f32,
}

impl Player {
    pub fn new(start_x: f32) -> Self {
        let mut invincibility_timer = Timer::from_seconds(INVINCIBILITY_SECS, TimerMode::Once);
        invincibility_timer.tick(invincibility_timer.duration());
        Self {
            speed: PLAYER_RUN_SPEED,
            facing_right: true,
            grounded: true,
            invincibility_timer,
            invisible: false,
            max_health: PLAYER_MAX_HEALTH,
            last_x: start_x,
        }
    }
}

#[derive(Component)]
pub struct PlayerShot;

#[derive(Component)]
struct ShotCooldown {
    timer: Timer,
}

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::InGame), spawn_player)
            .add_systems(
                Update,
                (
                    player_input_system,
                    player_physics_system,
                    track_distance_traveled,
                    player_shot_motion_system,
                    player_visibility_system,
                    player_death_watch,
                )
                    .chain()
                    .run_if(in_state(AppState::InGame)),
            )
            .add_systems(OnExit(AppState::InGame), cleanup_player_entities);
    }
}

pub fn player_stand_y() -> f32 {
    GROUND_Y + PLAYER_SIZE.y / 2.0
}

fn spawn_player(mut commands: Commands, asset_server: Res<AssetServer>, existing: Query<Entity, With<Player>>) {
    for entity in existing.iter() {
        commands.entity(entity).despawn_recursive();
    }
    commands.spawn((
        SpriteBundle {
            texture: asset_server.load("sprites/drifter_placeholder.png"),
            sprite: Sprite {
                custom_size: Some(PLAYER_SIZE),
                ..default()
            },
            transform: Transform::from_xyz(0.0, player_stand_y(), 0.5),
            ..default()
        },
        Player::new(0.0),
        Health(PLAYER_MAX_HEALTH),
        Velocity(Vec2::ZERO),
        ShotCooldown {
            timer: Timer::from_seconds(SHOT_COOLDOWN_SECS, TimerMode::Once),
        },
        Name::new("Drifter"),
    ));
}

fn player_input_system(
    mut commands: Commands,
    time: Res<Time>,
    keyboard_input: Res<ButtonInput<KeyCode>>,
    game_state: Res<GameState>,
    asset_server: Res<AssetServer>,
    mut player_query: Query<(&Transform, &mut Player, &mut Velocity, &mut ShotCooldown)>,
    mut sound_events: EventWriter<PlaySoundEvent>,
) {
    let Ok((transform, mut player, mut velocity, mut cooldown)) = player_query.get_single_mut()
    else {
        return;
    };
    cooldown.timer.tick(time.delta());
    if game_state.input_locked {
        velocity.x = 0.0;
        return;
    }

    let mut dir = 0.0;
    if keyboard_input.pressed(KeyCode::ArrowLeft) || keyboard_input.pressed(KeyCode::KeyA) {
        dir -= 1.0;
    }
    if keyboard_input.pressed(KeyCode::ArrowRight) || keyboard_input.pressed(KeyCode::KeyD) {
        dir += 1.0;
    }
    velocity.x = dir * player.speed;
    if dir > 0.0 {
        player.facing_right = true;
    } else if dir < 0.0 {
        player.facing_right = false;
    }

    if (keyboard_input.just_pressed(KeyCode::Space)
        || keyboard_input.just_pressed(KeyCode::ArrowUp))
        && player.grounded
    {
        velocity.y = PLAYER_JUMP_VELOCITY;
        player.grounded = false;
    }

    if keyboard_input.pressed(KeyCode::KeyF) && cooldown.timer.finished() {
        cooldown.timer.reset();
        sound_events.send(PlaySoundEvent::once(SoundId::PlayerShot));
        let aim = if player.facing_right { 1.0 } else { -1.0 };
        let origin = transform.translation + Vec3::new(aim * PLAYER_SIZE.x * 0.6, 4.0, 0.0);
        commands.spawn((
            SpriteBundle {
                texture: asset_server.load("sprites/shard_shot_placeholder.png"),
                sprite: Sprite {
                    custom_size: Some(SHOT_SIZE),
                    flip_x: aim < 0.0,
                    ..default()
                },
                transform: Transform::from_translation(origin.truncate().extend(SHOT_Z)),
                ..default()
            },
            PlayerShot,
            Velocity(Vec2::new(aim * SHOT_SPEED, 0.0)),
            Damage(SHOT_DAMAGE),
            Lifetime {
                timer: Timer::from_seconds(SHOT_LIFETIME_SECS, TimerMode::Once),
            },
            Name::new("ShardShot"),
        ));
    }
}

fn player_physics_system(
    time: Res<Time>,
    arena: Option<Res<ArenaBounds>>,
    mut player_query: Query<(&mut Transform, &mut Player, &mut Velocity, &mut Sprite)>,
) {
    let Ok((mut transform, mut player, mut velocity, mut sprite)) = player_query.get_single_mut()
    else {
        return;
    };
    let dt = time.delta_seconds();
    velocity.y -= GRAVITY * dt;
    transform.translation.x += velocity.x * dt;
    transform.translation.y += velocity.y * dt;

    let stand_y = player_stand_y();
    if transform.translation.y <= stand_y {
        transform.translation.y = stand_y;
        velocity.y = 0.0;
        player.grounded = true;
    }

    if let Some(arena) = arena {
        let half = PLAYER_SIZE.x / 2.0;
        transform.translation.x = transform
            .translation
            .x
            .clamp(arena.left + half, arena.right - half);
    }

    sprite.flip_x = !player.facing_right;
    player.invincibility_timer.tick(time.delta());
}

fn track_distance_traveled(
    mut game_state: ResMut<GameState>,
    mut player_query: Query<(&Transform, &mut Player)>,
) {
    let Ok((transform, mut player)) = player_query.get_single_mut() else {
        return;
    };
    let dx = transform.translation.x - player.last_x;
    if dx > 0.0 {
        game_state.distance_traveled += dx;
    }
    player.last_x = transform.translation.x;
}

fn player_shot_motion_system(
    mut commands: Commands,
    time: Res<Time>,
    camera_query: Query<&Transform, With<crate::camera_systems::MainCamera>>,
    mut shot_query: Query<
        (Entity, &mut Transform, &Velocity, &mut Lifetime),
        (With<PlayerShot>, Without<crate::camera_systems::MainCamera>),
    >,
) {
    let camera_x = camera_query
        .get_single()
        .map(|t| t.translation.x)
        .unwrap_or(0.0);
    for (entity, mut transform, velocity, mut lifetime) in shot_query.iter_mut() {
        transform.translation.x += velocity.x * time.delta_seconds();
        lifetime.timer.tick(time.delta());
        let offscreen = (transform.translation.x - camera_x).abs() > SCREEN_WIDTH;
        if lifetime.timer.finished() || offscreen {
            commands.entity(entity).despawn_recursive();
        }
    }
}

fn player_visibility_system(mut player_query: Query<(&Player, &mut Visibility)>) {
    let Ok((player, mut visibility)) = player_query.get_single_mut() else {
        return;
    };
    *visibility = if player.invisible {
        Visibility::Hidden
    } else {
        Visibility::Visible
    };
}

fn player_death_watch(
    player_query: Query<&Health, With<Player>>,
    mut next_app_state: ResMut<NextState<AppState>>,
) {
    let Ok(health) = player_query.get_single() else {
        return;
    };
    if health.0 <= 0 {
        next_app_state.set(AppState::GameOver);
    }
}

fn cleanup_player_entities(
    mut commands: Commands,
    shots: Query<Entity, With<PlayerShot>>,
    players: Query<Entity, With<Player>>,
) {
    for entity in shots.iter().chain(players.iter()) {
        commands.entity(entity).despawn_recursive();
    }
}
