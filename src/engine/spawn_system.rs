use super::*;

use crate::constants::{
    get_wave_size, MIN_CORRIDOR_LEN, PRIMARY_CORRIDOR_MIN_LEN, RELAXED_SPAWN_SPACING,
};
use crate::corridors::{extract_corridors, Corridor};

#[derive(Clone, Debug, PartialEq)]
pub struct SpawnRules {
    pub count: usize,
    pub spacing: f32,
    pub relaxed_spacing: f32,
    pub primary_min_len: usize,
    pub patrol_inset: f32,
}

impl SpawnRules {
    pub fn from_config(config: &TuningConfig, count: usize) -> Self {
        Self {
            count,
            spacing: config.spawn_spacing,
            relaxed_spacing: RELAXED_SPAWN_SPACING,
            primary_min_len: PRIMARY_CORRIDOR_MIN_LEN,
            patrol_inset: config.patrol_inset,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpawnPlan {
    pub corridor: Corridor,
    pub lane: Lane,
    pub spawn: Vec2,
    pub patrol_min: f32,
    pub patrol_max: f32,
    pub relaxed: bool,
}

/// Greedy two-pass corridor selection: long corridors under full spacing first,
/// then any corridor under relaxed spacing until `rules.count` is reached.
pub fn allocate_spawns(
    grid: &Grid,
    corridors: &[Corridor],
    rules: &SpawnRules,
    rng: &mut Rng,
) -> Vec<SpawnPlan> {
    if corridors.is_empty() || rules.count == 0 {
        return Vec::new();
    }

    let mut order = corridors.to_vec();
    rng.shuffle(&mut order);
    order.sort_by(|a, b| b.length.cmp(&a.length));

    let mut selected: Vec<(Corridor, bool)> = Vec::new();
    for corridor in &order {
        if selected.len() >= rules.count {
            break;
        }
        if corridor.length < rules.primary_min_len {
            continue;
        }
        if is_spaced(corridor, &selected, rules.spacing) {
            selected.push((*corridor, false));
        }
    }

    if selected.len() < rules.count {
        for corridor in &order {
            if selected.len() >= rules.count {
                break;
            }
            if corridor.length < MIN_CORRIDOR_LEN
                || selected.iter().any(|(taken, _)| taken == corridor)
            {
                continue;
            }
            if is_spaced(corridor, &selected, rules.relaxed_spacing) {
                selected.push((*corridor, true));
            }
        }
    }

    selected
        .into_iter()
        .map(|(corridor, relaxed)| {
            let lane = Lane::from_corridor(grid, &corridor);
            let (patrol_min, patrol_max) = lane.patrol_bounds(rules.patrol_inset);
            SpawnPlan {
                corridor,
                lane,
                spawn: lane.midpoint(),
                patrol_min,
                patrol_max,
                relaxed,
            }
        })
        .collect()
}

fn is_spaced(candidate: &Corridor, selected: &[(Corridor, bool)], min_distance: f32) -> bool {
    selected
        .iter()
        .filter(|(taken, _)| taken.orientation == candidate.orientation)
        .all(|(taken, _)| (candidate.fixed as f32 - taken.fixed as f32).abs() >= min_distance)
}

impl GameEngine {
    pub(super) fn spawn_wave(&mut self) {
        self.wave += 1;
        self.next_wave_at = None;
        self.agents.compact();

        let player = self.player.body.position;
        let corridors = extract_corridors(&self.world.grid);
        let safe: Vec<Corridor> = corridors
            .iter()
            .copied()
            .filter(|corridor| {
                let lane = Lane::from_corridor(&self.world.grid, corridor);
                !lane.is_aggro_position(player)
                    && lane.midpoint().distance(player) >= self.config.safe_spawn_radius
            })
            .collect();
        let pool = if safe.is_empty() { corridors } else { safe };

        let rules = SpawnRules::from_config(
            &self.config,
            get_wave_size(self.config.agent_count, self.wave),
        );
        let plans = allocate_spawns(&self.world.grid, &pool, &rules, &mut self.rng);
        if plans.is_empty() {
            eprintln!(
                "[spawn] no corridors available for wave {}; continuing without agents",
                self.wave
            );
        }

        for plan in &plans {
            let phase = self.rng.next_f32();
            let id = self.agents.insert_with(|id| {
                Agent::with_bounds(
                    id,
                    plan.lane,
                    plan.spawn,
                    (plan.patrol_min, plan.patrol_max),
                    phase,
                )
            });
            self.events.push(RuntimeEvent::AgentSpawned {
                agent_id: id,
                x: plan.spawn.x,
                z: plan.spawn.z,
            });
        }
        self.stats.agents_spawned += plans.len();
        self.events.push(RuntimeEvent::WaveSpawned {
            wave: self.wave,
            count: plans.len(),
        });
    }
}
