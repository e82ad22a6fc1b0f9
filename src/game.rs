use bevy::prelude::*;

use crate::background::CurrentBackground;
use crate::boss_director::BossLives;
use crate::defeat::BossDefeatedEvent;

pub const SCREEN_WIDTH: f32 = 1280.0;
pub const SCREEN_HEIGHT: f32 = 720.0;
/// World-space y of the walkable ground line (entity feet).
pub const GROUND_Y: f32 = -280.0;

#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    #[default]
    MainMenu,
    InGame,
    GameOver,
}

/// The two regions of the scroller; each carries its own boss config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapKind {
    Tundra,
    Riftlands,
}

impl MapKind {
    pub fn name(self) -> &'static str {
        match self {
            MapKind::Tundra => "Tundra",
            MapKind::Riftlands => "Riftlands",
        }
    }
}

#[derive(Resource)]
pub struct GameState {
    pub coins: u32,
    pub distance_traveled: f32,
    /// Explicit map override; when `None` the map is derived from the
    /// current background.
    pub map_override: Option<MapKind>,
    /// Set while the defeat sequencer owns the player (input is ignored).
    pub input_locked: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            coins: 0,
            distance_traveled: 0.0,
            map_override: None,
            input_locked: false,
        }
    }
}

#[derive(Component)]
struct MainMenuUI;
#[derive(Component)]
struct GameOverUI;
#[derive(Component)]
struct InGameUI;
#[derive(Component)]
struct CoinsText;
#[derive(Component)]
struct DistanceText;
#[derive(Component)]
struct BossLivesText;

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<AppState>()
            .init_resource::<GameState>()
            .add_systems(OnEnter(AppState::MainMenu), setup_main_menu_ui)
            .add_systems(Update, main_menu_input_system.run_if(in_state(AppState::MainMenu)))
            .add_systems(OnExit(AppState::MainMenu), despawn_ui_by_marker::<MainMenuUI>)
            .add_systems(OnEnter(AppState::InGame), (reset_for_new_session, setup_ingame_ui))
            .add_systems(
                Update,
                (update_ingame_ui, boss_defeat_bounty).run_if(in_state(AppState::InGame)),
            )
            .add_systems(OnExit(AppState::InGame), despawn_ui_by_marker::<InGameUI>)
            .add_systems(OnEnter(AppState::GameOver), setup_game_over_ui)
            .add_systems(Update, game_over_input_system.run_if(in_state(AppState::GameOver)))
            .add_systems(OnExit(AppState::GameOver), despawn_ui_by_marker::<GameOverUI>);
    }
}

fn despawn_ui_by_marker<T: Component>(mut commands: Commands, query: Query<Entity, With<T>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}

fn reset_for_new_session(mut game_state: ResMut<GameState>) {
    *game_state = GameState::default();
}

fn setup_main_menu_ui(mut commands: Commands, asset_server: Res<AssetServer>) {
    let font = asset_server.load("fonts/FiraSans-Bold.ttf");
    commands
        .spawn((
            NodeBundle {
                style: Style {
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(20.0),
                    ..default()
                },
                ..default()
            },
            MainMenuUI,
        ))
        .with_children(|parent| {
            parent.spawn(
                TextBundle::from_section(
                    "Frostrift",
                    TextStyle {
                        font: font.clone(),
                        font_size: 70.0,
                        color: Color::WHITE,
                    },
                )
                .with_text_justify(JustifyText::Center),
            );
            parent.spawn(
                TextBundle::from_section(
                    "1: Tundra   2: Riftlands   SPACE: Set Out",
                    TextStyle {
                        font,
                        font_size: 36.0,
                        color: Color::rgba(0.8, 0.8, 0.8, 1.0),
                    },
                )
                .with_text_justify(JustifyText::Center),
            );
        });
}

fn main_menu_input_system(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    mut background: ResMut<CurrentBackground>,
    mut next_app_state: ResMut<NextState<AppState>>,
) {
    if keyboard_input.just_pressed(KeyCode::Digit1) {
        background.0 = MapKind::Tundra;
    }
    if keyboard_input.just_pressed(KeyCode::Digit2) {
        background.0 = MapKind::Riftlands;
    }
    if keyboard_input.just_pressed(KeyCode::Space) {
        next_app_state.set(AppState::InGame);
    }
}

fn setup_ingame_ui(mut commands: Commands, asset_server: Res<AssetServer>) {
    let font = asset_server.load("fonts/FiraSans-Bold.ttf");
    commands
        .spawn((
            NodeBundle {
                style: Style {
                    width: Val::Percent(100.0),
                    justify_content: JustifyContent::SpaceAround,
                    align_items: AlignItems::Center,
                    padding: UiRect::all(Val::Px(8.0)),
                    position_type: PositionType::Absolute,
                    ..default()
                },
                background_color: Color::rgba(0.0, 0.0, 0.0, 0.3).into(),
                z_index: ZIndex::Global(10),
                ..default()
            },
            InGameUI,
        ))
        .with_children(|top_bar| {
            top_bar.spawn((
                TextBundle::from_section(
                    "Coins: 0",
                    TextStyle {
                        font: font.clone(),
                        font_size: 20.0,
                        color: Color::YELLOW,
                    },
                ),
                CoinsText,
            ));
            top_bar.spawn((
                TextBundle::from_section(
                    "Distance: 0m",
                    TextStyle {
                        font: font.clone(),
                        font_size: 20.0,
                        color: Color::CYAN,
                    },
                ),
                DistanceText,
            ));
            top_bar.spawn((
                TextBundle::from_section(
                    "",
                    TextStyle {
                        font,
                        font_size: 20.0,
                        color: Color::ORANGE_RED,
                    },
                ),
                BossLivesText,
            ));
        });
}

fn update_ingame_ui(
    game_state: Res<GameState>,
    boss_query: Query<&BossLives>,
    mut ui_texts: ParamSet<(
        Query<&mut Text, With<CoinsText>>,
        Query<&mut Text, With<DistanceText>>,
        Query<&mut Text, With<BossLivesText>>,
    )>,
) {
    if let Ok(mut text) = ui_texts.p0().get_single_mut() {
        text.sections[0].value = format!("Coins: {}", game_state.coins);
    }
    if let Ok(mut text) = ui_texts.p1().get_single_mut() {
        text.sections[0].value =
            format!("Distance: {}m", (game_state.distance_traveled / 10.0) as u32);
    }
    if let Ok(mut text) = ui_texts.p2().get_single_mut() {
        text.sections[0].value = match boss_query.get_single() {
            Ok(lives) => format!("Boss: {}/{}", lives.lives.max(0), lives.max_lives),
            Err(_) => String::new(),
        };
    }
}

/// Felling a boss pays out on top of whatever the gate clamp restored.
fn boss_defeat_bounty(
    mut events: EventReader<BossDefeatedEvent>,
    mut game_state: ResMut<GameState>,
) {
    for event in events.read() {
        info!("boss {:?} defeated, paying bounty", event.0);
        game_state.coins += 20;
    }
}

fn setup_game_over_ui(mut commands: Commands, game_state: Res<GameState>, asset_server: Res<AssetServer>) {
    let font = asset_server.load("fonts/FiraSans-Bold.ttf");
    commands
        .spawn((
            NodeBundle {
                style: Style {
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(20.0),
                    ..default()
                },
                ..default()
            },
            GameOverUI,
        ))
        .with_children(|parent| {
            parent.spawn(
                TextBundle::from_section(
                    "Lost to the Rift",
                    TextStyle {
                        font: font.clone(),
                        font_size: 80.0,
                        color: Color::RED,
                    },
                )
                .with_text_justify(JustifyText::Center),
            );
            parent.spawn(
                TextBundle::from_section(
                    format!("Coins: {}", game_state.coins),
                    TextStyle {
                        font: font.clone(),
                        font_size: 50.0,
                        color: Color::WHITE,
                    },
                )
                .with_text_justify(JustifyText::Center),
            );
            parent.spawn(
                TextBundle::from_section(
                    "Try Again? (R)",
                    TextStyle {
                        font,
                        font_size: 40.0,
                        color: Color::rgba(0.8, 0.8, 0.8, 1.0),
                    },
                )
                .with_text_justify(JustifyText::Center),
            );
        });
}

fn game_over_input_system(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    mut next_app_state: ResMut<NextState<AppState>>,
) {
    if keyboard_input.just_pressed(KeyCode::KeyR) {
        next_app_state.set(AppState::MainMenu);
    }
}
