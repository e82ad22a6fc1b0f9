//! Layered full-screen color overlay. Multiple sources (blizzard, riftstorm,
//! boss defeat flash) request a layer by id and release it independently; the
//! top layer is what renders, and a top-layer change cross-fades color rather
//! than restarting the fade-in.

use bevy::prelude::*;

use crate::game::AppState;

const OVERLAY_TARGET_OPACITY: f32 = 0.45;
const OVERLAY_Z_INDEX: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenEffectId {
    Blizzard,
    Riftstorm,
    BossDefeat,
}

#[derive(Debug, Clone)]
pub struct ScreenEffectSettings {
    pub rgb: Color,
    pub fade_in_speed: f32,
    pub color_lerp_speed: f32,
}

#[derive(Debug, Clone)]
struct EffectLayer {
    id: ScreenEffectId,
    settings: ScreenEffectSettings,
}

#[derive(Resource, Debug)]
pub struct ScreenEffectStack {
    active: bool,
    rgb: Color,
    opacity: f32,
    fade_in_speed: f32,
    current_id: Option<ScreenEffectId>,
    layers: Vec<EffectLayer>,
    from_rgb: Color,
    target_rgb: Color,
    color_lerp_t: f32,
    color_lerp_speed: f32,
}

impl Default for ScreenEffectStack {
    fn default() -> Self {
        Self {
            active: false,
            rgb: Color::BLACK,
            opacity: 0.0,
            fade_in_speed: 0.0,
            current_id: None,
            layers: Vec::new(),
            from_rgb: Color::BLACK,
            target_rgb: Color::BLACK,
            color_lerp_t: 1.0,
            color_lerp_speed: 1.0,
        }
    }
}

impl ScreenEffectStack {
    /// Push or refresh the layer keyed by `id` and make it the top.
    pub fn request(&mut self, id: ScreenEffectId, settings: ScreenEffectSettings) {
        if let Some(pos) = self.layers.iter().position(|l| l.id == id) {
            let mut layer = self.layers.remove(pos);
            layer.settings = settings;
            self.layers.push(layer);
        } else {
            self.layers.push(EffectLayer { id, settings });
        }
        self.activate_top();
    }

    /// Remove the layer keyed by `id`. Removing a non-top layer changes
    /// nothing visually; removing the top hands rendering to the layer below,
    /// cross-fading instead of restarting its fade-in.
    pub fn release(&mut self, id: ScreenEffectId) {
        let Some(pos) = self.layers.iter().position(|l| l.id == id) else {
            return;
        };
        let was_top = pos == self.layers.len() - 1;
        self.layers.remove(pos);
        if !was_top {
            return;
        }
        if self.layers.is_empty() {
            *self = Self::default();
            return;
        }
        self.activate_top();
    }

    fn activate_top(&mut self) {
        let Some(top) = self.layers.last() else {
            return;
        };
        let settings = top.settings.clone();
        if !self.active {
            // First layer: fresh fade-in from zero.
            self.active = true;
            self.opacity = 0.0;
            self.rgb = settings.rgb;
            self.from_rgb = settings.rgb;
            self.target_rgb = settings.rgb;
            self.color_lerp_t = 1.0;
            self.fade_in_speed = settings.fade_in_speed;
            self.color_lerp_speed = settings.color_lerp_speed;
            self.current_id = Some(top.id);
            return;
        }
        if self.current_id == Some(top.id) {
            // Same layer refreshed: update settings in place, no fade reset.
            self.fade_in_speed = settings.fade_in_speed;
            self.color_lerp_speed = settings.color_lerp_speed;
            if settings.rgb != self.target_rgb {
                self.from_rgb = self.rgb;
                self.target_rgb = settings.rgb;
                self.color_lerp_t = 0.0;
            }
            return;
        }
        // Different layer took the top: cross-fade color, keep opacity.
        self.from_rgb = self.rgb;
        self.target_rgb = settings.rgb;
        self.color_lerp_t = 0.0;
        self.color_lerp_speed = settings.color_lerp_speed;
        self.fade_in_speed = settings.fade_in_speed;
        self.current_id = Some(top.id);
    }

    pub fn tick(&mut self, delta_seconds: f32) {
        if !self.active {
            return;
        }
        self.opacity =
            (self.opacity + self.fade_in_speed * delta_seconds).min(OVERLAY_TARGET_OPACITY);
        if self.color_lerp_t < 1.0 {
            self.color_lerp_t =
                (self.color_lerp_t + self.color_lerp_speed * delta_seconds).min(1.0);
            self.rgb = lerp_rgb(self.from_rgb, self.target_rgb, self.color_lerp_t);
        } else {
            self.rgb = self.target_rgb;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn has_layer(&self, id: ScreenEffectId) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    pub fn current_id(&self) -> Option<ScreenEffectId> {
        self.current_id
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// The rendered overlay color (alpha carries the opacity).
    pub fn render_color(&self) -> Color {
        let mut c = self.rgb;
        c.set_a(if self.active { self.opacity } else { 0.0 });
        c
    }
}

fn lerp_rgb(from: Color, to: Color, t: f32) -> Color {
    Color::rgb(
        from.r() + (to.r() - from.r()) * t,
        from.g() + (to.g() - from.g()) * t,
        from.b() + (to.b() - from.b()) * t,
    )
}

#[derive(Component)]
struct ScreenOverlay;

pub struct ScreenEffectPlugin;

impl Plugin for ScreenEffectPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ScreenEffectStack>()
            .add_systems(Startup, setup_overlay_node)
            .add_systems(
                Update,
                (tick_screen_effects, apply_overlay_color)
                    .chain()
                    .run_if(in_state(AppState::InGame)),
            );
    }
}

fn setup_overlay_node(mut commands: Commands) {
    commands.spawn((
        NodeBundle {
            style: Style {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                ..default()
            },
            background_color: Color::NONE.into(),
            z_index: ZIndex::Global(OVERLAY_Z_INDEX),
            ..default()
        },
        ScreenOverlay,
        Name::new("ScreenEffectOverlay"),
    ));
}

fn tick_screen_effects(time: Res<Time>, mut effects: ResMut<ScreenEffectStack>) {
    effects.tick(time.delta_seconds());
}

fn apply_overlay_color(
    effects: Res<ScreenEffectStack>,
    mut overlay_query: Query<&mut BackgroundColor, With<ScreenOverlay>>,
) {
    let Ok(mut background) = overlay_query.get_single_mut() else {
        return;
    };
    *background = effects.render_color().into();
}
