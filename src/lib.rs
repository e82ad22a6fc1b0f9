pub mod audio;
pub mod background;
pub mod boss_director;
pub mod camera_systems;
pub mod components;
pub mod defeat;
pub mod enemy;
pub mod frost_tyrant;
pub mod game;
pub mod gate;
pub mod hazards;
pub mod phase_timer;
pub mod player;
pub mod screen_effect;
pub mod void_herald;
