use frostrift::boss_director::{BossConfig, BossDirector, BossId, EngagementPhase};
use frostrift::frost_tyrant::spawn_frost_tyrant;
use frostrift::game::MapKind;
use frostrift::gate::SpawnGate;

fn tundra_config() -> BossConfig {
    BossConfig {
        id: BossId::FrostTyrant,
        gate: SpawnGate::coins(5),
        spawn: spawn_frost_tyrant,
    }
}

#[test]
fn begin_encounter_requires_a_config() {
    let mut director = BossDirector::default();
    assert!(!director.try_begin_encounter(MapKind::Tundra, None, true, false));
    assert_eq!(director.phase, EngagementPhase::Inactive);
    assert!(director.boss_id.is_none());
    assert!(!director.spawned_this_session);
}

#[test]
fn begin_encounter_requires_gate() {
    let mut director = BossDirector::default();
    let config = tundra_config();
    assert!(!director.try_begin_encounter(MapKind::Tundra, Some(&config), false, false));
    assert_eq!(director.phase, EngagementPhase::Inactive);
    assert!(!director.spawned_this_session);
}

#[test]
fn begin_encounter_refuses_mid_enemy_wave() {
    let mut director = BossDirector::default();
    let config = tundra_config();
    assert!(!director.try_begin_encounter(MapKind::Tundra, Some(&config), true, true));
    assert_eq!(director.phase, EngagementPhase::Inactive);
}

#[test]
fn begin_encounter_is_once_per_session() {
    let mut director = BossDirector::default();
    let config = tundra_config();
    assert!(director.try_begin_encounter(MapKind::Tundra, Some(&config), true, false));
    assert!(
        !director.try_begin_encounter(MapKind::Tundra, Some(&config), true, false),
        "a second spawn attempt must fail while spawned_this_session holds"
    );
}

#[test]
fn successful_begin_records_engagement() {
    let mut director = BossDirector::default();
    let config = tundra_config();
    assert!(director.try_begin_encounter(MapKind::Tundra, Some(&config), true, false));
    assert_eq!(director.phase, EngagementPhase::TalkToBoss);
    assert_eq!(director.boss_id, Some(BossId::FrostTyrant));
    assert_eq!(director.map, Some(MapKind::Tundra));
    assert!(director.spawned_this_session);
}

#[test]
fn engaged_only_for_the_recorded_map() {
    let mut director = BossDirector::default();
    let config = tundra_config();
    director.try_begin_encounter(MapKind::Tundra, Some(&config), true, false);
    assert!(director.boss_engaged(MapKind::Tundra));
    assert!(
        !director.boss_engaged(MapKind::Riftlands),
        "engagement must not leak across a map change"
    );
}

#[test]
fn normal_enemy_spawning_rules() {
    let mut director = BossDirector::default();
    let config = tundra_config();

    // No boss configured for the map: always fine.
    assert!(director.can_spawn_normal_enemies(MapKind::Tundra, None, 100, 0.0));

    // Config present, gate not yet reached, not engaged: fine.
    assert!(director.can_spawn_normal_enemies(MapKind::Tundra, Some(&config), 4, 0.0));

    // Gate already reached: hold enemies back for the imminent fight.
    assert!(!director.can_spawn_normal_enemies(MapKind::Tundra, Some(&config), 5, 0.0));

    // Engaged on this map: no enemies even if the gate math says otherwise.
    director.try_begin_encounter(MapKind::Tundra, Some(&config), true, false);
    assert!(!director.can_spawn_normal_enemies(MapKind::Tundra, Some(&config), 0, 0.0));
}

#[test]
fn phase_transitions_follow_the_legal_table() {
    let mut director = BossDirector::default();
    assert!(director.advance(EngagementPhase::TalkToBoss));
    assert!(director.advance(EngagementPhase::PreFight));
    assert!(director.advance(EngagementPhase::InFight));
    assert!(director.advance(EngagementPhase::PostFight));
    assert!(director.advance(EngagementPhase::RunAway));
    assert!(director.advance(EngagementPhase::Inactive));
}

#[test]
fn illegal_phase_transition_is_rejected_and_state_kept() {
    let mut director = BossDirector::default();
    assert!(!director.advance(EngagementPhase::InFight));
    assert_eq!(director.phase, EngagementPhase::Inactive);

    director.advance(EngagementPhase::TalkToBoss);
    assert!(!director.advance(EngagementPhase::PostFight));
    assert_eq!(director.phase, EngagementPhase::TalkToBoss);
    assert!(!director.advance(EngagementPhase::TalkToBoss), "self-transition is illegal");
}

#[test]
fn reset_state_restores_initial_values() {
    let mut director = BossDirector::default();
    let config = tundra_config();
    director.try_begin_encounter(MapKind::Tundra, Some(&config), true, false);
    director.post_dialogue_enabled = true;
    director.reset_state();
    assert_eq!(director.phase, EngagementPhase::Inactive);
    assert!(director.boss_id.is_none());
    assert!(director.map.is_none());
    assert!(!director.spawned_this_session);
    assert!(!director.post_dialogue_enabled);
    assert!(director.active_boss.is_none());
}
