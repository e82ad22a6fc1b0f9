//! Boss encounter management: per-map configuration, spawn gating, engagement
//! phase bookkeeping, and the systems wiring them into the game loop.

use bevy::prelude::*;

use crate::audio::{PlaySoundEvent, SoundId};
use crate::background::CurrentBackground;
use crate::components::MarkedForDespawn;
use crate::enemy::Enemy;
use crate::game::{AppState, GameState, MapKind, SCREEN_WIDTH};
use crate::gate::SpawnGate;
use crate::player::{Player, PlayerShot};
use crate::screen_effect::ScreenEffectStack;

const ARENA_HALF_WIDTH: f32 = SCREEN_WIDTH / 2.0 - 40.0;
const INTRO_DIALOGUE_SECS: f32 = 2.5;
const PRE_FIGHT_SECS: f32 = 1.0;
const BOSS_SPAWN_AHEAD: f32 = 420.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BossId {
    FrostTyrant,
    VoidHerald,
}

/// Marker carried by every boss entity, whatever its concrete type.
#[derive(Component)]
pub struct Boss;

#[derive(Component)]
pub struct BossLives {
    pub lives: i32,
    pub max_lives: i32,
    pub hurt_cooldown: Timer,
}

impl BossLives {
    pub fn new(max_lives: i32) -> Self {
        let mut hurt_cooldown = Timer::from_seconds(0.4, TimerMode::Once);
        hurt_cooldown.tick(hurt_cooldown.duration());
        Self {
            lives: max_lives,
            max_lives,
            hurt_cooldown,
        }
    }
}

/// Half-extent of the boss's body for shot/contact tests.
#[derive(Component)]
pub struct BossHitbox(pub Vec2);

/// Present only while a boss fight owns the screen; clamps the boss, the
/// player and the camera.
#[derive(Resource, Debug, Clone, Copy)]
pub struct ArenaBounds {
    pub left: f32,
    pub right: f32,
}

pub type BossSpawnFn = fn(&mut Commands, &AssetServer, f32) -> Entity;

pub struct BossConfig {
    pub id: BossId,
    pub gate: SpawnGate,
    pub spawn: BossSpawnFn,
}

#[derive(Resource)]
pub struct BossRoster {
    configs: Vec<(MapKind, BossConfig)>,
}

impl BossRoster {
    pub fn config_for(&self, map: MapKind) -> Option<&BossConfig> {
        self.configs
            .iter()
            .find(|(kind, _)| *kind == map)
            .map(|(_, config)| config)
    }
}

impl Default for BossRoster {
    fn default() -> Self {
        Self {
            configs: vec![
                (
                    MapKind::Tundra,
                    BossConfig {
                        id: BossId::FrostTyrant,
                        gate: SpawnGate::coins_and_distance(15, 6000.0),
                        spawn: crate::frost_tyrant::spawn_frost_tyrant,
                    },
                ),
                (
                    MapKind::Riftlands,
                    BossConfig {
                        id: BossId::VoidHerald,
                        gate: SpawnGate::coins_and_distance(25, 9000.0),
                        spawn: crate::void_herald::spawn_void_herald,
                    },
                ),
            ],
        }
    }
}

/// Which stage of the scripted encounter is current. Single-valued by
/// construction; the scattered per-stage booleans of older builds allowed two
/// stages to be active at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngagementPhase {
    #[default]
    Inactive,
    TalkToBoss,
    PreFight,
    InFight,
    PostFight,
    RunAway,
}

impl EngagementPhase {
    fn can_advance_to(self, next: EngagementPhase) -> bool {
        use EngagementPhase::*;
        matches!(
            (self, next),
            (Inactive, TalkToBoss)
                | (TalkToBoss, PreFight)
                | (PreFight, InFight)
                | (InFight, PostFight)
                | (PostFight, RunAway)
                | (RunAway, Inactive)
        )
    }
}

#[derive(Resource, Debug)]
pub struct BossDirector {
    pub phase: EngagementPhase,
    pub boss_id: Option<BossId>,
    pub map: Option<MapKind>,
    pub spawned_this_session: bool,
    pub active_boss: Option<Entity>,
    pub intro_dialogue_done: bool,
    /// Step two of the defeat sequence re-enables post-fight dialogue.
    pub post_dialogue_enabled: bool,
    /// Step three flags that the dialogue may actually begin.
    pub post_dialogue_pending: bool,
    pub post_dialogue_done: bool,
    pub dialogue_timer: Timer,
}

impl Default for BossDirector {
    fn default() -> Self {
        Self {
            phase: EngagementPhase::Inactive,
            boss_id: None,
            map: None,
            spawned_this_session: false,
            active_boss: None,
            intro_dialogue_done: false,
            post_dialogue_enabled: false,
            post_dialogue_pending: false,
            post_dialogue_done: false,
            dialogue_timer: Timer::from_seconds(INTRO_DIALOGUE_SECS, TimerMode::Once),
        }
    }
}

impl BossDirector {
    /// Attempt a phase transition. Illegal transitions leave the phase
    /// unchanged and return false.
    pub fn advance(&mut self, next: EngagementPhase) -> bool {
        if !self.phase.can_advance_to(next) {
            warn!(
                "rejected engagement transition {:?} -> {:?}",
                self.phase, next
            );
            return false;
        }
        debug!("engagement {:?} -> {:?}", self.phase, next);
        self.phase = next;
        true
    }

    /// True only when a boss is recorded for the map currently on screen and
    /// some stage of its encounter is live. Guards against stale engagement
    /// state surviving a map change.
    pub fn boss_engaged(&self, current_map: MapKind) -> bool {
        self.boss_id.is_some()
            && self.map == Some(current_map)
            && self.phase != EngagementPhase::Inactive
    }

    /// All five spawn preconditions checked at once; on success the
    /// engagement is recorded and the caller performs the actual entity
    /// spawn. Never panics, never partially applies.
    pub fn try_begin_encounter(
        &mut self,
        map: MapKind,
        config: Option<&BossConfig>,
        gate_reached: bool,
        normal_enemies_present: bool,
    ) -> bool {
        let Some(config) = config else {
            return false;
        };
        if self.spawned_this_session
            || self.active_boss.is_some()
            || !gate_reached
            || normal_enemies_present
        {
            return false;
        }
        self.boss_id = Some(config.id);
        self.map = Some(map);
        self.spawned_this_session = true;
        self.advance(EngagementPhase::TalkToBoss);
        self.dialogue_timer = Timer::from_seconds(INTRO_DIALOGUE_SECS, TimerMode::Once);
        true
    }

    /// Normal enemies stay away from maps where a boss fight is imminent or
    /// live, so encounters never start mid-wave.
    pub fn can_spawn_normal_enemies(
        &self,
        map: MapKind,
        config: Option<&BossConfig>,
        coins: u32,
        distance_traveled: f32,
    ) -> bool {
        let Some(config) = config else {
            return true;
        };
        if self.boss_engaged(map) {
            return false;
        }
        if config.gate.reached(coins, distance_traveled) {
            return false;
        }
        true
    }

    pub fn record_active_boss(&mut self, entity: Entity) {
        self.active_boss = Some(entity);
    }

    /// Called by a boss that removed itself (end of run-away).
    pub fn clear_active_boss(&mut self) {
        self.active_boss = None;
        if self.phase == EngagementPhase::RunAway {
            self.advance(EngagementPhase::Inactive);
        }
    }

    pub fn reset_state(&mut self) {
        *self = Self::default();
    }
}

pub struct BossPlugin;

impl Plugin for BossPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BossRoster>()
            .init_resource::<BossDirector>()
            .add_systems(OnEnter(AppState::InGame), reset_boss_session)
            .add_systems(
                Update,
                (
                    spawn_boss_if_needed,
                    encounter_flow_system,
                    player_shot_hits_boss,
                )
                    .chain()
                    .run_if(in_state(AppState::InGame)),
            )
            .add_systems(OnExit(AppState::InGame), teardown_boss_session);
    }
}

fn reset_boss_session(
    mut director: ResMut<BossDirector>,
    mut effects: ResMut<ScreenEffectStack>,
    mut commands: Commands,
) {
    director.reset_state();
    effects.reset();
    commands.remove_resource::<ArenaBounds>();
}

pub fn current_map(game_state: &GameState, background: &CurrentBackground) -> MapKind {
    game_state.map_override.unwrap_or(background.0)
}

fn spawn_boss_if_needed(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    game_state: Res<GameState>,
    background: Res<CurrentBackground>,
    roster: Res<BossRoster>,
    mut director: ResMut<BossDirector>,
    enemy_query: Query<(), (With<Enemy>, Without<MarkedForDespawn>)>,
    player_query: Query<&Transform, With<Player>>,
    mut sound_events: EventWriter<PlaySoundEvent>,
) {
    if director.active_boss.is_some() || director.spawned_this_session {
        return;
    }
    let map = current_map(&game_state, &background);
    let config = roster.config_for(map);
    let gate_reached = config
        .map(|c| c.gate.reached(game_state.coins, game_state.distance_traveled))
        .unwrap_or(false);
    let enemies_present = !enemy_query.is_empty();
    if !director.try_begin_encounter(map, config, gate_reached, enemies_present) {
        return;
    }
    let Some(config) = config else {
        return;
    };
    let player_x = player_query
        .get_single()
        .map(|t| t.translation.x)
        .unwrap_or(0.0);
    let spawn_x = player_x + BOSS_SPAWN_AHEAD;
    let boss_entity = (config.spawn)(&mut commands, &asset_server, spawn_x);
    director.record_active_boss(boss_entity);

    let arena_center = player_x + BOSS_SPAWN_AHEAD / 2.0;
    commands.insert_resource(ArenaBounds {
        left: arena_center - ARENA_HALF_WIDTH,
        right: arena_center + ARENA_HALF_WIDTH,
    });
    sound_events.send(PlaySoundEvent::once(SoundId::BossRoar));
    info!("boss {:?} spawned on {:?}", config.id, map);
}

/// Advances the scripted, non-combat stages of an encounter: intro dialogue,
/// the pre-fight beat, and the post-fight dialogue released by the defeat
/// sequencer.
fn encounter_flow_system(
    time: Res<Time>,
    mut director: ResMut<BossDirector>,
    mut effects: ResMut<ScreenEffectStack>,
    mut sound_events: EventWriter<PlaySoundEvent>,
) {
    match director.phase {
        EngagementPhase::TalkToBoss => {
            director.dialogue_timer.tick(time.delta());
            if director.dialogue_timer.finished() {
                director.intro_dialogue_done = true;
                director.advance(EngagementPhase::PreFight);
                director.dialogue_timer = Timer::from_seconds(PRE_FIGHT_SECS, TimerMode::Once);
            }
        }
        EngagementPhase::PreFight => {
            director.dialogue_timer.tick(time.delta());
            if director.dialogue_timer.finished() {
                director.advance(EngagementPhase::InFight);
                sound_events.send(PlaySoundEvent::looped(SoundId::BattleMusic));
            }
        }
        EngagementPhase::PostFight => {
            if director.post_dialogue_enabled
                && director.post_dialogue_pending
                && !director.post_dialogue_done
            {
                director.dialogue_timer.tick(time.delta());
                if director.dialogue_timer.finished() {
                    director.post_dialogue_done = true;
                    director.advance(EngagementPhase::RunAway);
                    effects.release(crate::screen_effect::ScreenEffectId::BossDefeat);
                }
            }
        }
        _ => {}
    }
}

fn player_shot_hits_boss(
    mut commands: Commands,
    time: Res<Time>,
    director: Res<BossDirector>,
    shot_query: Query<(Entity, &Transform), With<PlayerShot>>,
    mut boss_query: Query<(&Transform, &mut BossLives, &BossHitbox), (With<Boss>, Without<PlayerShot>)>,
    mut sound_events: EventWriter<PlaySoundEvent>,
) {
    let Ok((boss_transform, mut lives, hitbox)) = boss_query.get_single_mut() else {
        return;
    };
    lives.hurt_cooldown.tick(time.delta());
    if director.phase != EngagementPhase::InFight {
        return;
    }
    for (shot_entity, shot_transform) in shot_query.iter() {
        let delta =
            shot_transform.translation.truncate() - boss_transform.translation.truncate();
        if delta.x.abs() > hitbox.0.x || delta.y.abs() > hitbox.0.y {
            continue;
        }
        commands.entity(shot_entity).despawn_recursive();
        if lives.hurt_cooldown.finished() && lives.lives > 0 {
            lives.lives -= 1;
            lives.hurt_cooldown.reset();
            sound_events.send(PlaySoundEvent::once(SoundId::BossHurt));
        }
    }
}

fn teardown_boss_session(
    mut commands: Commands,
    mut director: ResMut<BossDirector>,
    mut effects: ResMut<ScreenEffectStack>,
    boss_query: Query<Entity, With<Boss>>,
) {
    for entity in boss_query.iter() {
        commands.entity(entity).despawn_recursive();
    }
    director.reset_state();
    effects.reset();
    commands.remove_resource::<ArenaBounds>();
}
