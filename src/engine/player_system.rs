use super::*;

use crate::constants::MICRO_NUDGE;
use crate::grid::BodyProfile;

const NUDGE_DIRECTIONS: [(f32, f32); 8] = [
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (1.0, 1.0),
    (1.0, -1.0),
    (-1.0, 1.0),
    (-1.0, -1.0),
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerBody {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub facing: f32,
    /// Last non-zero movement direction; bullets travel along it.
    pub aim: Vec2,
}

impl PlayerBody {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            facing: 0.0,
            aim: Vec2::unit(Axis::Z, 1.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Kinematics {
    pub acceleration: f32,
    pub friction: f32,
    pub max_speed: f32,
    pub radius: f32,
}

impl Kinematics {
    pub fn from_config(config: &TuningConfig) -> Self {
        Self {
            acceleration: config.player_acceleration,
            friction: config.player_friction,
            max_speed: config.player_max_speed,
            radius: config.player_radius,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Full,
    SlideX,
    SlideZ,
    Nudged,
    Stuck,
}

pub fn integrate(body: &mut PlayerBody, movement: Vec2, kinematics: &Kinematics) -> Vec2 {
    body.acceleration = movement * kinematics.acceleration;
    body.velocity = (body.velocity + body.acceleration) * kinematics.friction;
    let speed = body.velocity.length();
    if speed > kinematics.max_speed {
        body.velocity = body.velocity.normalized() * kinematics.max_speed;
    }
    if !body.velocity.is_finite() {
        body.velocity = Vec2::ZERO;
    }
    if movement.length() > f32::EPSILON {
        body.aim = movement.normalized();
        body.facing = body.aim.facing();
    }
    body.position + body.velocity
}

/// Applies `body.velocity` against the grid: full move, then X-only, then
/// Z-only, then tiny nudges. A blocked axis loses its velocity component.
pub fn resolve_move(grid: &Grid, body: &mut PlayerBody, radius: f32) -> MoveOutcome {
    let profile = BodyProfile::Thick { radius };
    let start = body.position;
    let velocity = body.velocity;

    let full = start + velocity;
    if !grid.is_wall_at(full, profile) {
        body.position = full;
        return MoveOutcome::Full;
    }

    let slide_x = start + Vec2::new(velocity.x, 0.0);
    if !grid.is_wall_at(slide_x, profile) {
        body.position = slide_x;
        body.velocity.z = 0.0;
        return MoveOutcome::SlideX;
    }

    let slide_z = start + Vec2::new(0.0, velocity.z);
    if !grid.is_wall_at(slide_z, profile) {
        body.position = slide_z;
        body.velocity.x = 0.0;
        return MoveOutcome::SlideZ;
    }

    for (dx, dz) in NUDGE_DIRECTIONS {
        let nudged = start + Vec2::new(dx * MICRO_NUDGE, dz * MICRO_NUDGE);
        if !grid.is_wall_at(nudged, profile) {
            body.position = nudged;
            body.velocity = Vec2::ZERO;
            return MoveOutcome::Nudged;
        }
    }

    body.velocity = Vec2::ZERO;
    MoveOutcome::Stuck
}

impl GameEngine {
    pub(super) fn update_player(&mut self, input: &InputIntent) {
        if !self.player.alive {
            return;
        }
        let kinematics = Kinematics::from_config(&self.config);
        integrate(&mut self.player.body, input.movement(), &kinematics);
        let outcome = resolve_move(&self.world.grid, &mut self.player.body, kinematics.radius);
        if outcome == MoveOutcome::Stuck {
            self.stats.stuck_ticks += 1;
        }
    }
}
