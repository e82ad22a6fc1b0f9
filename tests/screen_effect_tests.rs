use bevy::prelude::Color;
use frostrift::screen_effect::{ScreenEffectId, ScreenEffectSettings, ScreenEffectStack};

fn settings(rgb: Color) -> ScreenEffectSettings {
    ScreenEffectSettings {
        rgb,
        fade_in_speed: 0.5,
        color_lerp_speed: 2.0,
    }
}

const BLUE: Color = Color::rgb(0.2, 0.4, 1.0);
const PURPLE: Color = Color::rgb(0.5, 0.1, 0.8);
const GOLD: Color = Color::rgb(1.0, 0.8, 0.3);

#[test]
fn request_then_release_returns_to_inactive() {
    let mut stack = ScreenEffectStack::default();
    assert!(!stack.is_active());
    stack.request(ScreenEffectId::Blizzard, settings(BLUE));
    assert!(stack.is_active());
    assert_eq!(stack.current_id(), Some(ScreenEffectId::Blizzard));
    stack.release(ScreenEffectId::Blizzard);
    assert!(!stack.is_active());
    assert_eq!(stack.current_id(), None);
    assert_eq!(stack.depth(), 0);
    assert_eq!(stack.opacity(), 0.0);
}

#[test]
fn first_layer_fades_in_from_zero() {
    let mut stack = ScreenEffectStack::default();
    stack.request(ScreenEffectId::Blizzard, settings(BLUE));
    assert_eq!(stack.opacity(), 0.0);
    stack.tick(0.5);
    assert!(stack.opacity() > 0.2 && stack.opacity() <= 0.26);
}

#[test]
fn releasing_top_restores_previous_layer_without_fade_reset() {
    let mut stack = ScreenEffectStack::default();
    stack.request(ScreenEffectId::Blizzard, settings(BLUE));
    stack.tick(0.6);
    let settled_opacity = stack.opacity();
    assert!(settled_opacity > 0.0);

    stack.request(ScreenEffectId::BossDefeat, settings(GOLD));
    stack.tick(1.0);
    let opacity_before_release = stack.opacity();
    stack.release(ScreenEffectId::BossDefeat);

    assert_eq!(stack.current_id(), Some(ScreenEffectId::Blizzard));
    assert_eq!(
        stack.opacity(),
        opacity_before_release,
        "handing back to the lower layer must not restart the fade"
    );
    // The color walks back to the previous layer's rgb over the lerp.
    stack.tick(1.0);
    let c = stack.render_color();
    assert!((c.r() - BLUE.r()).abs() < 1e-4);
    assert!((c.b() - BLUE.b()).abs() < 1e-4);
}

#[test]
fn releasing_non_top_layer_changes_nothing_visible() {
    let mut stack = ScreenEffectStack::default();
    stack.request(ScreenEffectId::Blizzard, settings(BLUE));
    stack.request(ScreenEffectId::Riftstorm, settings(PURPLE));
    stack.tick(2.0);
    let color_before = stack.render_color();
    let id_before = stack.current_id();

    stack.release(ScreenEffectId::Blizzard);

    assert_eq!(stack.depth(), 1);
    assert_eq!(stack.current_id(), id_before);
    assert_eq!(stack.render_color(), color_before);
}

#[test]
fn different_id_on_top_cross_fades_instead_of_resetting_opacity() {
    let mut stack = ScreenEffectStack::default();
    stack.request(ScreenEffectId::Blizzard, settings(BLUE));
    stack.tick(0.8);
    let opacity = stack.opacity();
    assert!(opacity > 0.0);

    stack.request(ScreenEffectId::BossDefeat, settings(GOLD));
    assert_eq!(stack.opacity(), opacity, "top change keeps accumulated opacity");
    assert_eq!(stack.current_id(), Some(ScreenEffectId::BossDefeat));

    // Half of the lerp (speed 2.0 -> t = 0.5 after 0.25s).
    stack.tick(0.25);
    let c = stack.render_color();
    let halfway_r = BLUE.r() + (GOLD.r() - BLUE.r()) * 0.5;
    assert!((c.r() - halfway_r).abs() < 0.05);
}

#[test]
fn re_requesting_current_top_updates_settings_in_place() {
    let mut stack = ScreenEffectStack::default();
    stack.request(ScreenEffectId::Blizzard, settings(BLUE));
    stack.tick(0.6);
    let opacity = stack.opacity();

    stack.request(ScreenEffectId::Blizzard, settings(BLUE));
    assert_eq!(stack.opacity(), opacity, "same-id refresh must not reset fade");
    assert_eq!(stack.depth(), 1, "same id upserts instead of stacking");
}

#[test]
fn buried_layer_resurfaces_on_top_when_re_requested() {
    let mut stack = ScreenEffectStack::default();
    stack.request(ScreenEffectId::Blizzard, settings(BLUE));
    stack.request(ScreenEffectId::Riftstorm, settings(PURPLE));
    stack.request(ScreenEffectId::Blizzard, settings(BLUE));
    assert_eq!(stack.depth(), 2);
    assert_eq!(stack.current_id(), Some(ScreenEffectId::Blizzard));
}

#[test]
fn release_of_unknown_id_is_a_no_op() {
    let mut stack = ScreenEffectStack::default();
    stack.request(ScreenEffectId::Blizzard, settings(BLUE));
    stack.release(ScreenEffectId::BossDefeat);
    assert!(stack.is_active());
    assert_eq!(stack.depth(), 1);
}
