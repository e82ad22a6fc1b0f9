use bevy::prelude::*;
use bevy::utils::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundId {
    BattleMusic,
    BossRoar,
    BlizzardWind,
    RiftstormHum,
    IceShardThrow,
    IcicleShatter,
    GroundSpikeErupt,
    SlamImpact,
    JumpWhoosh,
    BeamCharge,
    BeamSweep,
    AsteroidImpact,
    SpiderlingChitter,
    BossHurt,
    BossDefeated,
    PlayerHit,
    PlayerShot,
    CoinPickup,
    EnemyDeath,
}

impl SoundId {
    fn asset_path(self) -> &'static str {
        match self {
            SoundId::BattleMusic => "audio/battle_music_placeholder.ogg",
            SoundId::BossRoar => "audio/boss_roar_placeholder.ogg",
            SoundId::BlizzardWind => "audio/blizzard_wind_placeholder.ogg",
            SoundId::RiftstormHum => "audio/riftstorm_hum_placeholder.ogg",
            SoundId::IceShardThrow => "audio/ice_shard_throw_placeholder.ogg",
            SoundId::IcicleShatter => "audio/icicle_shatter_placeholder.ogg",
            SoundId::GroundSpikeErupt => "audio/ground_spike_erupt_placeholder.ogg",
            SoundId::SlamImpact => "audio/slam_impact_placeholder.ogg",
            SoundId::JumpWhoosh => "audio/jump_whoosh_placeholder.ogg",
            SoundId::BeamCharge => "audio/beam_charge_placeholder.ogg",
            SoundId::BeamSweep => "audio/beam_sweep_placeholder.ogg",
            SoundId::AsteroidImpact => "audio/asteroid_impact_placeholder.ogg",
            SoundId::SpiderlingChitter => "audio/spiderling_chitter_placeholder.ogg",
            SoundId::BossHurt => "audio/boss_hurt_placeholder.ogg",
            SoundId::BossDefeated => "audio/boss_defeated_placeholder.ogg",
            SoundId::PlayerHit => "audio/player_hit_placeholder.ogg",
            SoundId::PlayerShot => "audio/player_shot_placeholder.ogg",
            SoundId::CoinPickup => "audio/coin_pickup_placeholder.ogg",
            SoundId::EnemyDeath => "audio/enemy_death_placeholder.ogg",
        }
    }

    /// Sounds silenced wholesale when a boss goes down.
    pub fn is_boss_category(self) -> bool {
        matches!(
            self,
            SoundId::BossRoar
                | SoundId::BlizzardWind
                | SoundId::RiftstormHum
                | SoundId::IceShardThrow
                | SoundId::IcicleShatter
                | SoundId::GroundSpikeErupt
                | SoundId::SlamImpact
                | SoundId::JumpWhoosh
                | SoundId::BeamCharge
                | SoundId::BeamSweep
                | SoundId::AsteroidImpact
                | SoundId::SpiderlingChitter
                | SoundId::BossHurt
        )
    }
}

#[derive(Event)]
pub struct PlaySoundEvent {
    pub id: SoundId,
    pub looped: bool,
    pub allow_overlap: bool,
}

impl PlaySoundEvent {
    pub fn once(id: SoundId) -> Self {
        Self {
            id,
            looped: false,
            allow_overlap: true,
        }
    }

    pub fn looped(id: SoundId) -> Self {
        Self {
            id,
            looped: true,
            allow_overlap: false,
        }
    }
}

#[derive(Event)]
pub struct StopSoundEvent(pub SoundId);

#[derive(Event)]
pub struct FadeOutAndStopEvent {
    pub id: SoundId,
    pub millis: u64,
}

#[derive(Event)]
pub struct StopBossSoundsEvent;

#[derive(Component)]
struct ActiveSound(SoundId);

#[derive(Component)]
struct FadeOut {
    timer: Timer,
}

/// Live non-overlapping playbacks, keyed by sound id.
#[derive(Resource, Default)]
struct TrackedSounds(HashMap<SoundId, Entity>);

pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PlaySoundEvent>()
            .add_event::<StopSoundEvent>()
            .add_event::<FadeOutAndStopEvent>()
            .add_event::<StopBossSoundsEvent>()
            .init_resource::<TrackedSounds>()
            .add_systems(
                Update,
                (
                    play_sound_system,
                    stop_sound_system,
                    stop_boss_sounds_system,
                    fade_out_system,
                    prune_tracked_sounds,
                ),
            );
    }
}

fn play_sound_system(
    mut commands: Commands,
    mut events: EventReader<PlaySoundEvent>,
    asset_server: Res<AssetServer>,
    mut tracked: ResMut<TrackedSounds>,
) {
    for event in events.read() {
        if !event.allow_overlap {
            if let Some(&existing) = tracked.0.get(&event.id) {
                if commands.get_entity(existing).is_some() {
                    continue;
                }
            }
        }
        let settings = if event.looped {
            PlaybackSettings::LOOP
        } else {
            PlaybackSettings::DESPAWN
        };
        let entity = commands
            .spawn((
                AudioBundle {
                    source: asset_server.load(event.id.asset_path()),
                    settings,
                },
                ActiveSound(event.id),
            ))
            .id();
        if event.looped || !event.allow_overlap {
            tracked.0.insert(event.id, entity);
        }
    }
}

fn stop_sound_system(
    mut commands: Commands,
    mut events: EventReader<StopSoundEvent>,
    mut tracked: ResMut<TrackedSounds>,
    sounds: Query<(Entity, &ActiveSound)>,
) {
    for StopSoundEvent(id) in events.read() {
        for (entity, sound) in sounds.iter() {
            if sound.0 == *id {
                commands.entity(entity).despawn_recursive();
            }
        }
        tracked.0.remove(id);
    }
}

fn stop_boss_sounds_system(
    mut commands: Commands,
    mut events: EventReader<StopBossSoundsEvent>,
    mut tracked: ResMut<TrackedSounds>,
    sounds: Query<(Entity, &ActiveSound)>,
) {
    for _ in events.read() {
        for (entity, sound) in sounds.iter() {
            if sound.0.is_boss_category() {
                commands.entity(entity).despawn_recursive();
            }
        }
        tracked.0.retain(|id, _| !id.is_boss_category());
    }
}

fn fade_out_system(
    mut commands: Commands,
    time: Res<Time>,
    mut start_events: EventReader<FadeOutAndStopEvent>,
    mut tracked: ResMut<TrackedSounds>,
    mut fading: Query<(Entity, &ActiveSound, &mut FadeOut, Option<&AudioSink>)>,
) {
    for event in start_events.read() {
        if let Some(&entity) = tracked.0.get(&event.id) {
            if let Some(mut entity_commands) = commands.get_entity(entity) {
                entity_commands.insert(FadeOut {
                    timer: Timer::from_seconds(event.millis as f32 / 1000.0, TimerMode::Once),
                });
            }
            tracked.0.remove(&event.id);
        }
    }
    for (entity, _sound, mut fade, sink) in fading.iter_mut() {
        fade.timer.tick(time.delta());
        if let Some(sink) = sink {
            sink.set_volume(1.0 - fade.timer.fraction());
        }
        if fade.timer.finished() {
            commands.entity(entity).despawn_recursive();
        }
    }
}

fn prune_tracked_sounds(mut tracked: ResMut<TrackedSounds>, sounds: Query<Entity, With<ActiveSound>>) {
    if tracked.0.is_empty() {
        return;
    }
    if sounds.is_empty() {
        tracked.0.clear();
        return;
    }
    let live: Vec<Entity> = sounds.iter().collect();
    tracked.0.retain(|_, entity| live.contains(entity));
}
