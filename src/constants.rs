use crate::types::{GameMode, Vec2};

pub const TICK_RATE: u32 = 60;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

pub const MAZE_SIZE: usize = 30;
pub const HALF_MAZE: f32 = MAZE_SIZE as f32 / 2.0;

pub const ENTRANCE_CELL: (usize, usize) = (1, 1);
pub const EXIT_CELL: (usize, usize) = (MAZE_SIZE - 2, MAZE_SIZE - 2);
pub const PICKUP_POSITION: Vec2 = Vec2 { x: 5.0, z: -5.0 };
pub const PICKUP_RADIUS: f32 = 1.0;

pub const THIN_BODY_EPSILON: f32 = 0.001;
pub const BULLET_RADIUS: f32 = 0.05;

// Aggro detection and attack legality use different tolerances.
pub const AGGRO_FIXED_TOLERANCE: f32 = 1.2;
pub const AGGRO_SPAN_TOLERANCE: f32 = 1.0;
pub const COMBAT_FIXED_TOLERANCE: f32 = 0.8;
pub const COMBAT_SPAN_TOLERANCE: f32 = 0.5;

pub const KNIFE_RANGE: f32 = 2.8;
pub const BULLET_HITBOX: f32 = 0.7;
pub const CONTACT_RADIUS: f32 = 0.9;

pub const PATROL_FLIP_MARGIN: f32 = 0.3;
pub const PRIMARY_CORRIDOR_MIN_LEN: usize = 5;
pub const MIN_CORRIDOR_LEN: usize = 2;
pub const RELAXED_SPAWN_SPACING: f32 = 2.0;

pub const MICRO_NUDGE: f32 = 0.005;

pub const HOP_HEIGHT: f32 = 0.6;
pub const HOP_BASE_Y: f32 = 0.4;
pub const HOP_PHASE_STEP: f32 = 0.05;

pub const AGENT_HEALTH: i32 = 1;

pub fn get_mode_label(mode: GameMode) -> &'static str {
    match mode {
        GameMode::Hunt => "hunt",
        GameMode::Survival => "survival",
    }
}

pub fn get_wave_size(base: usize, wave: u32) -> usize {
    if wave <= 1 {
        return base;
    }
    base + (wave as usize - 1).min(5)
}
