use crate::constants::KNIFE_RANGE;
use crate::engine::combat_system::{can_strike, combat_lane};
use crate::engine::GameEngine;
use crate::types::{InputIntent, Vec2, Weapon};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Goal {
    Pickup((usize, usize)),
    Exit((usize, usize)),
}

impl Goal {
    fn cell(&self) -> (usize, usize) {
        match self {
            Self::Pickup(cell) | Self::Exit(cell) => *cell,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Autopilot {
    goals: Vec<Goal>,
    path: Vec<(usize, usize)>,
}

impl Autopilot {
    pub fn for_engine(engine: &GameEngine) -> Self {
        let world = &engine.world;
        Self {
            // Stored in reverse; the last entry is the active goal.
            goals: vec![Goal::Exit(world.exit), Goal::Pickup(world.pickup_cell)],
            path: Vec::new(),
        }
    }

    pub fn next_input(&mut self, engine: &GameEngine) -> InputIntent {
        let player = engine.player();
        if !player.alive {
            return InputIntent::default();
        }
        let position = player.body.position;
        let grid = &engine.world.grid;
        let (cx, cz) = grid.world_to_cell(position);
        let here = (cx.max(0) as usize, cz.max(0) as usize);

        let waypoint = self.next_waypoint(engine, here);
        let movement = match waypoint {
            Some((x, z)) => (grid.cell_center(x, z) - position).normalized(),
            None => Vec2::ZERO,
        };

        let threatened = engine
            .agents()
            .any(|agent| can_strike(agent, grid, position, KNIFE_RANGE));
        let gun_target = player.weapon == Weapon::Gun
            && engine
                .agents()
                .any(|agent| combat_lane(agent, grid).is_combat_position(position));
        let switch_weapon = player.weapon == Weapon::Knife && player.has_gun && player.ammo > 0;

        InputIntent {
            move_x: movement.x,
            move_z: movement.z,
            attack: threatened || gun_target,
            switch_weapon,
        }
    }

    fn next_waypoint(&mut self, engine: &GameEngine, here: (usize, usize)) -> Option<(usize, usize)> {
        loop {
            let goal = self.goals.last()?.clone();
            let done = match goal {
                Goal::Pickup(_) => engine.player().has_gun,
                Goal::Exit(cell) => cell == here,
            };
            if done {
                self.goals.pop();
                self.path.clear();
                continue;
            }

            if !self.path.contains(&here) {
                match engine.world.grid.shortest_path(here, goal.cell()) {
                    Some(path) => self.path = path,
                    None => {
                        self.goals.pop();
                        self.path.clear();
                        continue;
                    }
                }
            }

            let index = self.path.iter().position(|cell| *cell == here)?;
            // On the goal cell itself, keep centring on it.
            return Some(*self.path.get(index + 1).unwrap_or(&goal.cell()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Autopilot;
    use crate::config::TuningConfig;
    use crate::engine::{test_world, GameEngine};
    use crate::types::{GameMode, GameOverReason};

    fn run_to_end(engine: &mut GameEngine, pilot: &mut Autopilot, max_ticks: usize) {
        for _ in 0..max_ticks {
            if engine.is_ended() {
                break;
            }
            let input = pilot.next_input(engine);
            engine.step(&input);
        }
    }

    #[test]
    fn walks_a_winding_corridor_to_the_exit() {
        let rows = [
            "##########",
            "#......###",
            "######.###",
            "######.###",
            "#......###",
            "#.########",
            "#.....####",
            "#####.####",
            "#####....#",
            "##########",
        ];
        let mut engine = GameEngine::with_world(
            GameMode::Hunt,
            test_world(&rows),
            TuningConfig::default(),
            3,
        );
        engine.clear_agents();
        let mut pilot = Autopilot::for_engine(&engine);

        run_to_end(&mut engine, &mut pilot, 3_000);
        assert_eq!(engine.end_reason(), Some(GameOverReason::Escaped));
    }

    #[test]
    fn escapes_generated_mazes_when_unopposed() {
        for seed in [3u32, 41, 2_718] {
            let mut engine = GameEngine::new(GameMode::Hunt, seed, TuningConfig::default());
            engine.clear_agents();
            let mut pilot = Autopilot::for_engine(&engine);

            run_to_end(&mut engine, &mut pilot, 30_000);
            assert_eq!(
                engine.end_reason(),
                Some(GameOverReason::Escaped),
                "seed={seed}"
            );
            assert!(engine.player().has_gun, "seed={seed}");
        }
    }
}
