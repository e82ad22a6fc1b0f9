use bevy::prelude::*;

use crate::boss_director::ArenaBounds;
use crate::game::{AppState, SCREEN_WIDTH};
use crate::player::Player;

const CAMERA_LERP_FACTOR: f32 = 0.08;

#[derive(Component)]
pub struct MainCamera;

pub struct CameraSystemsPlugin;

impl Plugin for CameraSystemsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            side_scroll_camera_system.run_if(in_state(AppState::InGame)),
        );
    }
}

/// Follows the player on X only; Y stays fixed for the side view. While an
/// arena is active the camera locks inside it so the boss fight stays framed.
fn side_scroll_camera_system(
    arena: Option<Res<ArenaBounds>>,
    player_query: Query<&Transform, (With<Player>, Without<MainCamera>)>,
    mut camera_query: Query<&mut Transform, (With<MainCamera>, Without<Player>)>,
) {
    let Ok(player_transform) = player_query.get_single() else {
        return;
    };
    let Ok(mut camera_transform) = camera_query.get_single_mut() else {
        return;
    };
    let mut target_x = player_transform.translation.x;
    if let Some(arena) = arena {
        let half = SCREEN_WIDTH / 2.0;
        let min_x = arena.left + half;
        let max_x = arena.right - half;
        // An arena narrower than the screen pins the camera to its center.
        target_x = if min_x >= max_x {
            (arena.left + arena.right) / 2.0
        } else {
            target_x.clamp(min_x, max_x)
        };
    }
    camera_transform.translation.x +=
        (target_x - camera_transform.translation.x) * CAMERA_LERP_FACTOR;
}
