use bevy::prelude::*;
use rand::Rng;

use crate::audio::{PlaySoundEvent, SoundId};
use crate::background::CurrentBackground;
use crate::boss_director::{BossDirector, BossRoster};
use crate::components::{Health, MarkedForDespawn, Velocity};
use crate::game::{AppState, GameState, GROUND_Y, SCREEN_WIDTH};
use crate::player::{Player, PlayerShot, PLAYER_SIZE};

pub const RIMEWALKER_SIZE: Vec2 = Vec2::new(38.0, 42.0);
const COIN_SIZE: Vec2 = Vec2::new(14.0, 14.0);

const SPAWN_INTERVAL_SECS: f32 = 2.4;
const RIMEWALKER_HEALTH: i32 = 30;
const RIMEWALKER_SPEED: f32 = 90.0;
const RIMEWALKER_CONTACT_DAMAGE: i32 = 10;
const RIMEWALKER_COIN_DROP: u32 = 3;
const DESPAWN_BEHIND_DISTANCE: f32 = SCREEN_WIDTH * 1.5;

const COIN_GRAVITATE_RADIUS: f32 = 110.0;
const COIN_GRAVITATE_SPEED: f32 = 320.0;
const COIN_PICKUP_RADIUS: f32 = PLAYER_SIZE.x / 2.0 + COIN_SIZE.x / 2.0;

/// A normal ground enemy. Anything carrying this is "non-boss-class": the
/// boss gate requires the field to be clear of them, and the defeat sequencer
/// sweeps them away.
#[derive(Component)]
pub struct Enemy {
    pub speed: f32,
    pub damage_on_contact: i32,
    pub coin_drop: u32,
}

#[derive(Component)]
pub struct Coin {
    pub value: u32,
}

#[derive(Resource)]
pub struct EnemySpawnTimer {
    pub timer: Timer,
}

impl Default for EnemySpawnTimer {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(SPAWN_INTERVAL_SECS, TimerMode::Repeating),
        }
    }
}

pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EnemySpawnTimer>()
            .add_systems(
                Update,
                (
                    enemy_spawn_system,
                    enemy_movement_system,
                    enemy_contact_system,
                    shot_hits_enemy_system,
                    enemy_despawn_behind_system,
                    coin_gravitation_and_pickup_system,
                )
                    .chain()
                    .run_if(in_state(AppState::InGame)),
            )
            .add_systems(OnExit(AppState::InGame), despawn_all_enemies_and_coins);
    }
}

fn enemy_stand_y() -> f32 {
    GROUND_Y + RIMEWALKER_SIZE.y / 2.0
}

fn enemy_spawn_system(
    mut commands: Commands,
    time: Res<Time>,
    mut spawn_timer: ResMut<EnemySpawnTimer>,
    asset_server: Res<AssetServer>,
    director: Res<BossDirector>,
    roster: Res<BossRoster>,
    game_state: Res<GameState>,
    background: Res<CurrentBackground>,
    player_query: Query<&Transform, With<Player>>,
) {
    spawn_timer.timer.tick(time.delta());
    if !spawn_timer.timer.just_finished() {
        return;
    }
    let map = game_state.map_override.unwrap_or(background.0);
    let config = roster.config_for(map);
    if !director.can_spawn_normal_enemies(
        map,
        config,
        game_state.coins,
        game_state.distance_traveled,
    ) {
        return;
    }
    let Ok(player_transform) = player_query.get_single() else {
        return;
    };
    let mut rng = rand::thread_rng();
    let spawn_x =
        player_transform.translation.x + SCREEN_WIDTH * 0.75 + rng.gen_range(0.0..160.0);
    commands.spawn((
        SpriteBundle {
            texture: asset_server.load("sprites/rimewalker_placeholder.png"),
            sprite: Sprite {
                custom_size: Some(RIMEWALKER_SIZE),
                ..default()
            },
            transform: Transform::from_xyz(spawn_x, enemy_stand_y(), 0.5),
            ..default()
        },
        Enemy {
            speed: RIMEWALKER_SPEED,
            damage_on_contact: RIMEWALKER_CONTACT_DAMAGE,
            coin_drop: RIMEWALKER_COIN_DROP,
        },
        Health(RIMEWALKER_HEALTH),
        Velocity(Vec2::ZERO),
        Name::new("Rimewalker"),
    ));
}

fn enemy_movement_system(
    time: Res<Time>,
    player_query: Query<&Transform, (With<Player>, Without<Enemy>)>,
    mut enemy_query: Query<(&mut Transform, &mut Velocity, &mut Sprite, &Enemy)>,
) {
    let Ok(player_transform) = player_query.get_single() else {
        return;
    };
    let player_x = player_transform.translation.x;
    for (mut transform, mut velocity, mut sprite, enemy) in enemy_query.iter_mut() {
        let dir = (player_x - transform.translation.x).signum();
        velocity.x = dir * enemy.speed;
        sprite.flip_x = dir < 0.0;
        transform.translation.x += velocity.x * time.delta_seconds();
    }
}

fn enemy_contact_system(
    mut player_query: Query<(&Transform, &mut Health, &mut Player)>,
    enemy_query: Query<(&Transform, &Enemy), Without<Player>>,
    mut sound_events: EventWriter<PlaySoundEvent>,
) {
    let Ok((player_transform, mut player_health, mut player)) = player_query.get_single_mut()
    else {
        return;
    };
    for (enemy_transform, enemy) in enemy_query.iter() {
        let distance = enemy_transform
            .translation
            .truncate()
            .distance(player_transform.translation.truncate());
        if distance < (RIMEWALKER_SIZE.x + PLAYER_SIZE.x) / 2.0 {
            if player.invincibility_timer.finished() {
                player_health.0 -= enemy.damage_on_contact;
                player.invincibility_timer.reset();
                sound_events.send(PlaySoundEvent::once(SoundId::PlayerHit));
            }
        }
    }
}

fn shot_hits_enemy_system(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    shot_query: Query<(Entity, &Transform, &crate::components::Damage), With<PlayerShot>>,
    mut enemy_query: Query<(Entity, &Transform, &mut Health, &Enemy), Without<PlayerShot>>,
    mut sound_events: EventWriter<PlaySoundEvent>,
) {
    let mut rng = rand::thread_rng();
    for (shot_entity, shot_transform, damage) in shot_query.iter() {
        for (enemy_entity, enemy_transform, mut health, enemy) in enemy_query.iter_mut() {
            let distance = shot_transform
                .translation
                .truncate()
                .distance(enemy_transform.translation.truncate());
            if distance > RIMEWALKER_SIZE.x / 2.0 {
                continue;
            }
            health.0 -= damage.0;
            commands.entity(shot_entity).despawn_recursive();
            if health.0 <= 0 {
                sound_events.send(PlaySoundEvent::once(SoundId::EnemyDeath));
                for _ in 0..enemy.coin_drop {
                    let offset = Vec2::new(rng.gen_range(-24.0..24.0), rng.gen_range(0.0..18.0));
                    spawn_coin(
                        &mut commands,
                        &asset_server,
                        enemy_transform.translation.truncate() + offset,
                        1,
                    );
                }
                commands.entity(enemy_entity).insert(MarkedForDespawn);
            }
            break;
        }
    }
}

pub fn spawn_coin(
    commands: &mut Commands,
    asset_server: &AssetServer,
    position: Vec2,
    value: u32,
) {
    commands.spawn((
        SpriteBundle {
            texture: asset_server.load("sprites/rift_coin_placeholder.png"),
            sprite: Sprite {
                custom_size: Some(COIN_SIZE),
                ..default()
            },
            transform: Transform::from_translation(position.extend(0.4)),
            ..default()
        },
        Coin { value },
        Name::new("RiftCoin"),
    ));
}

fn coin_gravitation_and_pickup_system(
    mut commands: Commands,
    time: Res<Time>,
    mut game_state: ResMut<GameState>,
    player_query: Query<&Transform, With<Player>>,
    mut coin_query: Query<(Entity, &mut Transform, &Coin), Without<Player>>,
    mut sound_events: EventWriter<PlaySoundEvent>,
) {
    let Ok(player_transform) = player_query.get_single() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();
    for (entity, mut transform, coin) in coin_query.iter_mut() {
        let coin_pos = transform.translation.truncate();
        let distance = coin_pos.distance(player_pos);
        if distance < COIN_PICKUP_RADIUS {
            game_state.coins += coin.value;
            sound_events.send(PlaySoundEvent::once(SoundId::CoinPickup));
            commands.entity(entity).despawn_recursive();
            continue;
        }
        if distance < COIN_GRAVITATE_RADIUS {
            let dir = (player_pos - coin_pos).normalize_or_zero();
            transform.translation.x += dir.x * COIN_GRAVITATE_SPEED * time.delta_seconds();
            transform.translation.y += dir.y * COIN_GRAVITATE_SPEED * time.delta_seconds();
        }
    }
}

fn enemy_despawn_behind_system(
    mut commands: Commands,
    player_query: Query<&Transform, With<Player>>,
    enemy_query: Query<(Entity, &Transform), With<Enemy>>,
) {
    let Ok(player_transform) = player_query.get_single() else {
        return;
    };
    for (entity, transform) in enemy_query.iter() {
        if player_transform.translation.x - transform.translation.x > DESPAWN_BEHIND_DISTANCE {
            commands.entity(entity).insert(MarkedForDespawn);
        }
    }
}

fn despawn_all_enemies_and_coins(
    mut commands: Commands,
    enemies: Query<Entity, With<Enemy>>,
    coins: Query<Entity, With<Coin>>,
) {
    for entity in enemies.iter().chain(coins.iter()) {
        commands.entity(entity).despawn_recursive();
    }
}
