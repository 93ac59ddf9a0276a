use super::*;

use crate::constants::{HOP_BASE_Y, HOP_HEIGHT, HOP_PHASE_STEP, PATROL_FLIP_MARGIN};
use crate::grid::BodyProfile;

#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    pub position: Vec2,
    pub y: f32,
    pub direction: Vec2,
    pub patrol_axis: Axis,
    pub patrol_min: f32,
    pub patrol_max: f32,
    pub patrol_direction: f32,
    pub state: AgentState,
    pub lane: Lane,
    pub jump_phase: f32,
    pub health: i32,
    pub global_chase: bool,
}

impl Agent {
    pub fn new(id: AgentId, lane: Lane, patrol_inset: f32, jump_phase: f32) -> Self {
        Self::with_bounds(
            id,
            lane,
            lane.midpoint(),
            lane.patrol_bounds(patrol_inset),
            jump_phase,
        )
    }

    pub fn with_bounds(
        id: AgentId,
        lane: Lane,
        position: Vec2,
        (patrol_min, patrol_max): (f32, f32),
        jump_phase: f32,
    ) -> Self {
        let mut agent = Self {
            id,
            position,
            y: HOP_BASE_Y,
            direction: Vec2::unit(lane.axis, 1.0),
            patrol_axis: lane.axis,
            patrol_min,
            patrol_max,
            patrol_direction: 1.0,
            state: AgentState::Hopping,
            lane,
            jump_phase: jump_phase.rem_euclid(1.0),
            health: AGENT_HEALTH,
            global_chase: false,
        };
        animate_hop(&mut agent, 0.0);
        agent
    }

    pub fn along(&self) -> f32 {
        self.position.along(self.patrol_axis)
    }

    pub fn to_view(&self) -> AgentView {
        AgentView {
            id: self.id,
            x: self.position.x,
            y: self.y,
            z: self.position.z,
            facing: self.direction.facing(),
            state: self.state,
            global_chase: self.global_chase,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PursuitPolicy {
    /// 1-D pursuit along the home lane; aggro drops when the player leaves it.
    LaneBound,
    /// Sticky 2-D pursuit that may switch corridors at intersections.
    Global,
}

impl PursuitPolicy {
    pub fn for_mode(mode: GameMode) -> Self {
        match mode {
            GameMode::Hunt => Self::LaneBound,
            GameMode::Survival => Self::Global,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Aggro,
    Calm,
}

pub fn evaluate_transition(agent: &Agent, player: Vec2, policy: PursuitPolicy) -> Transition {
    let in_lane = agent.lane.is_aggro_position(player);
    match policy {
        PursuitPolicy::Global => {
            if !agent.global_chase && in_lane {
                Transition::Aggro
            } else {
                Transition::Stay
            }
        }
        PursuitPolicy::LaneBound => match (agent.state, in_lane) {
            (AgentState::Hopping, true) => Transition::Aggro,
            (AgentState::Chasing, false) | (AgentState::Queued, false) => Transition::Calm,
            _ => Transition::Stay,
        },
    }
}

pub fn step_agent(agent: &mut Agent, grid: &Grid, player: Vec2, speed: f32) {
    match (agent.state, agent.global_chase) {
        (AgentState::Chasing, true) => pursue_globally(agent, grid, player, speed),
        (AgentState::Chasing, false) => pursue_in_lane(agent, grid, player, speed),
        _ => patrol(agent, grid, speed),
    }
    animate_hop(agent, HOP_PHASE_STEP);
}

fn patrol(agent: &mut Agent, grid: &Grid, speed: f32) {
    let axis = agent.patrol_axis;
    let along = agent.along();
    if along > agent.patrol_max {
        agent.patrol_direction = -1.0;
    } else if along < agent.patrol_min {
        agent.patrol_direction = 1.0;
    }
    let inside = along >= agent.patrol_min && along <= agent.patrol_max;
    let heading = agent.patrol_direction;

    let mut next = along + heading * speed;
    if inside {
        next = next.clamp(agent.patrol_min, agent.patrol_max);
    }
    if heading > 0.0 && next >= agent.patrol_max - PATROL_FLIP_MARGIN {
        agent.patrol_direction = -1.0;
    } else if heading < 0.0 && next <= agent.patrol_min + PATROL_FLIP_MARGIN {
        agent.patrol_direction = 1.0;
    }

    let candidate = agent.position.with_along(axis, next);
    if !grid.is_wall_at(candidate, BodyProfile::Thin) {
        agent.position = candidate;
    }
    agent.direction = Vec2::unit(axis, heading);
}

fn pursue_in_lane(agent: &mut Agent, grid: &Grid, player: Vec2, speed: f32) {
    let axis = agent.patrol_axis;
    let delta = player.along(axis) - agent.along();
    if delta.abs() <= f32::EPSILON {
        return;
    }
    let next = agent.along() + delta.signum() * speed.min(delta.abs());
    let candidate = agent.position.with_along(axis, next);
    if !grid.is_wall_at(candidate, BodyProfile::Thin) {
        agent.position = candidate;
    }
    agent.direction = Vec2::unit(axis, delta.signum());
}

fn pursue_globally(agent: &mut Agent, grid: &Grid, player: Vec2, speed: f32) {
    let dx = player.x - agent.position.x;
    let dz = player.z - agent.position.z;
    let (axis, delta) = if dx.abs() >= dz.abs() {
        (Axis::X, dx)
    } else {
        (Axis::Z, dz)
    };
    if delta.abs() <= f32::EPSILON {
        return;
    }
    agent.patrol_axis = axis;
    let next = agent.position.along(axis) + delta.signum() * speed.min(delta.abs());
    let candidate = agent.position.with_along(axis, next);
    if !grid.is_wall_at(candidate, BodyProfile::Thin) {
        agent.position = candidate;
    }
    agent.direction = Vec2::unit(axis, delta.signum());
}

fn animate_hop(agent: &mut Agent, phase_step: f32) {
    agent.jump_phase = (agent.jump_phase + phase_step).rem_euclid(1.0);
    let t = agent.jump_phase;
    agent.y = HOP_BASE_Y + HOP_HEIGHT * 4.0 * t * (1.0 - t);
}

impl GameEngine {
    pub(super) fn update_agents(&mut self) {
        let player = self.player.body.position;
        let policy = PursuitPolicy::for_mode(self.mode);

        for id in self.agents.ids() {
            let transition = match self.agents.get(id) {
                Some(agent) => evaluate_transition(agent, player, policy),
                None => continue,
            };
            self.apply_transition(id, transition);

            let base_speed = self.config.agent_speed;
            let queued_speed = base_speed * self.config.queued_speed_factor;
            if let Some(agent) = self.agents.get_mut(id) {
                let speed = if agent.state == AgentState::Queued {
                    queued_speed
                } else {
                    base_speed
                };
                step_agent(agent, &self.world.grid, player, speed);
            }
        }
    }

    fn apply_transition(&mut self, id: AgentId, transition: Transition) {
        match transition {
            Transition::Stay => {}
            Transition::Aggro => {
                let throttle = self.config.throttle_chasers && self.mode == GameMode::Hunt;
                let slot = self.chase_queue.request(id, throttle);
                let Some(agent) = self.agents.get_mut(id) else {
                    return;
                };
                match slot {
                    ChaseSlot::Granted => {
                        agent.state = AgentState::Chasing;
                        if self.mode == GameMode::Survival {
                            agent.global_chase = true;
                        }
                        self.events.push(RuntimeEvent::AgentAggro { agent_id: id });
                    }
                    ChaseSlot::Waiting => agent.state = AgentState::Queued,
                }
            }
            Transition::Calm => {
                let was_chasing = match self.agents.get_mut(id) {
                    Some(agent) => {
                        let was_chasing = agent.state == AgentState::Chasing;
                        agent.state = AgentState::Hopping;
                        was_chasing
                    }
                    None => false,
                };
                if was_chasing {
                    self.events.push(RuntimeEvent::AgentCalmed { agent_id: id });
                }
                if let Some(promoted) = self.chase_queue.release(id) {
                    self.promote_chaser(promoted);
                }
            }
        }
    }

    pub(super) fn promote_chaser(&mut self, id: AgentId) {
        let Some(agent) = self.agents.get_mut(id) else {
            return;
        };
        agent.state = AgentState::Chasing;
        if self.mode == GameMode::Survival {
            agent.global_chase = true;
        }
        self.events.push(RuntimeEvent::AgentAggro { agent_id: id });
    }
}
