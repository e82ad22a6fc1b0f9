//! Scripted boss teardown. Once a boss runs out of lives the sequence fires
//! its steps at fixed offsets on a monotonic clock the caller advances, so
//! tests drive it by hand and gameplay drives it from `Time<Real>` (the steps
//! keep firing even while virtual time is paused, matching the original
//! staging).

use bevy::prelude::*;

use crate::audio::{FadeOutAndStopEvent, PlaySoundEvent, SoundId, StopBossSoundsEvent};
use crate::boss_director::{Boss, BossDirector, BossId, BossLives, BossRoster, EngagementPhase};
use crate::components::MarkedForDespawn;
use crate::enemy::Enemy;
use crate::game::{AppState, GameState};
use crate::hazards::Hazard;
use crate::player::{player_stand_y, Player};
use crate::screen_effect::{ScreenEffectId, ScreenEffectSettings, ScreenEffectStack};

const REPOSITION_DELAY_SECS: f32 = 1.2;
const DIALOGUE_RELEASE_DELAY_SECS: f32 = 2.8;
const POST_DIALOGUE_SECS: f32 = 3.0;
const PLAYER_STAND_OFFSET: f32 = -130.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefeatStep {
    Teardown,
    Reposition,
    DialogueRelease,
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    at: f32,
    step: DefeatStep,
}

#[derive(Resource, Debug)]
pub struct DefeatSequence {
    triggered: bool,
    clock: f32,
    pending: Vec<Scheduled>,
}

impl Default for DefeatSequence {
    fn default() -> Self {
        Self {
            triggered: false,
            clock: 0.0,
            pending: Vec::new(),
        }
    }
}

impl DefeatSequence {
    /// Arms the sequence. Returns false (and changes nothing) if it already
    /// ran this encounter.
    pub fn trigger(&mut self) -> bool {
        if self.triggered {
            return false;
        }
        self.triggered = true;
        self.clock = 0.0;
        self.pending = vec![
            Scheduled {
                at: 0.0,
                step: DefeatStep::Teardown,
            },
            Scheduled {
                at: REPOSITION_DELAY_SECS,
                step: DefeatStep::Reposition,
            },
            Scheduled {
                at: DIALOGUE_RELEASE_DELAY_SECS,
                step: DefeatStep::DialogueRelease,
            },
        ];
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// Advance the clock and return the steps that came due, in schedule
    /// order. Forgiving of arbitrarily large deltas.
    pub fn advance(&mut self, delta_seconds: f32) -> Vec<DefeatStep> {
        if !self.triggered || self.pending.is_empty() {
            return Vec::new();
        }
        self.clock += delta_seconds;
        let clock = self.clock;
        let mut due: Vec<DefeatStep> = Vec::new();
        self.pending.retain(|scheduled| {
            if scheduled.at <= clock {
                due.push(scheduled.step);
                false
            } else {
                true
            }
        });
        due
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Event)]
pub struct BossDefeatedEvent(pub BossId);

/// Pre-clear hook: fired inside the immediate teardown step, before the field
/// is swept.
#[derive(Event)]
pub struct DefeatTeardownEvent;

/// Post-setup hook: fired once the player has been repositioned.
#[derive(Event)]
pub struct DefeatSetupEvent;

pub struct DefeatPlugin;

impl Plugin for DefeatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DefeatSequence>()
            .add_event::<BossDefeatedEvent>()
            .add_event::<DefeatTeardownEvent>()
            .add_event::<DefeatSetupEvent>()
            .add_systems(OnEnter(AppState::InGame), reset_defeat_sequence)
            .add_systems(
                Update,
                (watch_boss_lives, drive_defeat_sequence)
                    .chain()
                    .run_if(in_state(AppState::InGame)),
            );
    }
}

fn reset_defeat_sequence(mut sequence: ResMut<DefeatSequence>) {
    sequence.reset();
}

/// Lives are checked every tick; the trigger guard makes a double check
/// harmless.
fn watch_boss_lives(
    director: Res<BossDirector>,
    mut sequence: ResMut<DefeatSequence>,
    boss_query: Query<&BossLives, With<Boss>>,
    mut sound_events: EventWriter<PlaySoundEvent>,
) {
    if director.phase != EngagementPhase::InFight {
        return;
    }
    let Ok(lives) = boss_query.get_single() else {
        return;
    };
    if lives.lives <= 0 && sequence.trigger() {
        sound_events.send(PlaySoundEvent::once(SoundId::BossDefeated));
        info!("boss defeated, teardown sequence armed");
    }
}

fn drive_defeat_sequence(
    mut commands: Commands,
    real_time: Res<Time<Real>>,
    mut sequence: ResMut<DefeatSequence>,
    mut director: ResMut<BossDirector>,
    roster: Res<BossRoster>,
    mut game_state: ResMut<GameState>,
    mut effects: ResMut<ScreenEffectStack>,
    mut defeated_events: EventWriter<BossDefeatedEvent>,
    mut fade_events: EventWriter<FadeOutAndStopEvent>,
    mut stop_boss_sounds: EventWriter<StopBossSoundsEvent>,
    mut teardown_events: EventWriter<DefeatTeardownEvent>,
    mut setup_events: EventWriter<DefeatSetupEvent>,
    mut boss_query: Query<(&Transform, &mut BossLives), With<Boss>>,
    mut player_query: Query<(&mut Transform, &mut Player, &mut crate::components::Velocity), Without<Boss>>,
    field_query: Query<Entity, Or<(With<Enemy>, With<Hazard>)>>,
) {
    for step in sequence.advance(real_time.delta_seconds()) {
        match step {
            DefeatStep::Teardown => {
                if let Some(id) = director.boss_id {
                    defeated_events.send(BossDefeatedEvent(id));
                }
                // Coins spent before the fight must not soft-lock a re-entry.
                if let Some(map) = director.map {
                    if let Some(config) = roster.config_for(map) {
                        game_state.coins = game_state.coins.max(config.gate.min_coins);
                    }
                }
                director.advance(EngagementPhase::PostFight);
                if let Ok((_, mut lives)) = boss_query.get_single_mut() {
                    lives.lives = lives.max_lives;
                }
                effects.request(
                    ScreenEffectId::BossDefeat,
                    ScreenEffectSettings {
                        rgb: Color::rgb(1.0, 0.85, 0.5),
                        fade_in_speed: 0.35,
                        color_lerp_speed: 1.2,
                    },
                );
                fade_events.send(FadeOutAndStopEvent {
                    id: SoundId::BattleMusic,
                    millis: 1200,
                });
                stop_boss_sounds.send(StopBossSoundsEvent);
                game_state.input_locked = true;
                teardown_events.send(DefeatTeardownEvent);
                for entity in field_query.iter() {
                    commands.entity(entity).insert(MarkedForDespawn);
                }
            }
            DefeatStep::Reposition => {
                director.post_dialogue_enabled = true;
                if let Ok((mut player_transform, mut player, mut velocity)) =
                    player_query.get_single_mut()
                {
                    if let Ok((boss_transform, _)) = boss_query.get_single() {
                        player_transform.translation.x =
                            boss_transform.translation.x + PLAYER_STAND_OFFSET;
                        player_transform.translation.y = player_stand_y();
                    }
                    player.invisible = false;
                    velocity.0 = Vec2::ZERO;
                }
                setup_events.send(DefeatSetupEvent);
            }
            DefeatStep::DialogueRelease => {
                director.post_dialogue_pending = true;
                director.dialogue_timer =
                    Timer::from_seconds(POST_DIALOGUE_SECS, TimerMode::Once);
                game_state.input_locked = false;
                // Defensive second sweep for anything spawned in between.
                for entity in field_query.iter() {
                    commands.entity(entity).insert(MarkedForDespawn);
                }
            }
        }
    }
}
