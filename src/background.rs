use bevy::prelude::*;

use crate::camera_systems::MainCamera;
use crate::game::{AppState, MapKind};

pub const BACKGROUND_TILE_SIZE: f32 = 1024.0;
const BACKGROUND_Z: f32 = -10.0;
const TILE_COUNT: usize = 4;

/// Which region's background is on screen. The boss director derives the
/// current map from this when no explicit override is set.
#[derive(Resource, Debug, Clone, Copy)]
pub struct CurrentBackground(pub MapKind);

impl Default for CurrentBackground {
    fn default() -> Self {
        Self(MapKind::Tundra)
    }
}

#[derive(Component)]
struct BackgroundTile;

#[derive(Resource)]
struct BackgroundStrip {
    tiles: [Entity; TILE_COUNT],
    strip_center_x: f32,
}

pub struct BackgroundPlugin;

impl Plugin for BackgroundPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CurrentBackground>()
            .add_systems(OnEnter(AppState::InGame), setup_background)
            .add_systems(
                Update,
                scroll_background.run_if(in_state(AppState::InGame)),
            )
            .add_systems(OnExit(AppState::InGame), cleanup_background);
    }
}

fn tile_sprite_path(kind: MapKind) -> &'static str {
    match kind {
        MapKind::Tundra => "sprites/tundra_ridge_tile_placeholder.png",
        MapKind::Riftlands => "sprites/riftlands_chasm_tile_placeholder.png",
    }
}

fn setup_background(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    background: Res<CurrentBackground>,
) {
    let mut tiles = [Entity::PLACEHOLDER; TILE_COUNT];
    let half_span_offset = (TILE_COUNT as f32 - 1.0) / 2.0;
    for i in 0..TILE_COUNT {
        let x = (i as f32 - half_span_offset) * BACKGROUND_TILE_SIZE;
        tiles[i] = commands
            .spawn((
                SpriteBundle {
                    texture: asset_server.load(tile_sprite_path(background.0)),
                    sprite: Sprite {
                        custom_size: Some(Vec2::splat(BACKGROUND_TILE_SIZE)),
                        ..default()
                    },
                    transform: Transform::from_xyz(x, 0.0, BACKGROUND_Z),
                    ..default()
                },
                BackgroundTile,
                Name::new(format!("BackgroundTile_{}", i)),
            ))
            .id();
    }
    commands.insert_resource(BackgroundStrip {
        tiles,
        strip_center_x: 0.0,
    });
}

/// Horizontal-only wrap of the tile strip as the camera advances.
fn scroll_background(
    camera_query: Query<&Transform, With<MainCamera>>,
    mut strip: ResMut<BackgroundStrip>,
    mut tile_transforms: Query<&mut Transform, (With<BackgroundTile>, Without<MainCamera>)>,
) {
    let Ok(camera_transform) = camera_query.get_single() else {
        return;
    };
    let camera_x = camera_transform.translation.x;
    let dx = camera_x - strip.strip_center_x;
    if dx.abs() < BACKGROUND_TILE_SIZE {
        return;
    }
    let shift_tiles = (dx / BACKGROUND_TILE_SIZE).trunc();
    let shift = shift_tiles * BACKGROUND_TILE_SIZE;
    let span = TILE_COUNT as f32 * BACKGROUND_TILE_SIZE;
    let new_center = strip.strip_center_x + shift;
    for tile_entity in strip.tiles.iter() {
        if let Ok(mut tile_transform) = tile_transforms.get_mut(*tile_entity) {
            tile_transform.translation.x += shift;
            if tile_transform.translation.x < new_center - span / 2.0 {
                tile_transform.translation.x += span;
            } else if tile_transform.translation.x >= new_center + span / 2.0 {
                tile_transform.translation.x -= span;
            }
        }
    }
    strip.strip_center_x = new_center;
}

fn cleanup_background(mut commands: Commands, query: Query<Entity, With<BackgroundTile>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}
