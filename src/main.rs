use bevy::prelude::*;

use frostrift::audio::GameAudioPlugin;
use frostrift::background::BackgroundPlugin;
use frostrift::boss_director::BossPlugin;
use frostrift::camera_systems::{CameraSystemsPlugin, MainCamera};
use frostrift::defeat::DefeatPlugin;
use frostrift::enemy::EnemyPlugin;
use frostrift::frost_tyrant::FrostTyrantPlugin;
use frostrift::game::{GamePlugin, SCREEN_HEIGHT, SCREEN_WIDTH};
use frostrift::hazards::HazardsPlugin;
use frostrift::player::PlayerPlugin;
use frostrift::screen_effect::ScreenEffectPlugin;
use frostrift::void_herald::VoidHeraldPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Frostrift".into(),
                resolution: (SCREEN_WIDTH, SCREEN_HEIGHT).into(),
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        .add_plugins((
            GamePlugin,
            PlayerPlugin,
            EnemyPlugin,
            BossPlugin,
            FrostTyrantPlugin,
            VoidHeraldPlugin,
            HazardsPlugin,
            DefeatPlugin,
            ScreenEffectPlugin,
            GameAudioPlugin,
            CameraSystemsPlugin,
            BackgroundPlugin,
        ))
        .add_systems(Startup, setup_global_camera)
        .run();
}

fn setup_global_camera(mut commands: Commands) {
    let mut camera_bundle = Camera2dBundle::default();
    camera_bundle.transform.translation.z = 999.0;
    commands.spawn((camera_bundle, MainCamera));
}
