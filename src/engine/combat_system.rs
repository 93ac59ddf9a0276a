use super::*;

use crate::constants::{
    BULLET_HITBOX, BULLET_RADIUS, CONTACT_RADIUS, KNIFE_RANGE, PICKUP_POSITION, PICKUP_RADIUS,
};
use crate::grid::BodyProfile;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bullet {
    pub position: Vec2,
    pub velocity: Vec2,
    pub ticks_left: u32,
}

impl Bullet {
    pub fn to_view(&self) -> BulletView {
        BulletView {
            x: self.position.x,
            z: self.position.z,
        }
    }
}

/// The lane an agent is judged against. A global chaser has left its home
/// corridor, so it uses the run it currently stands in.
pub fn combat_lane(agent: &Agent, grid: &Grid) -> Lane {
    if agent.global_chase {
        return grid
            .lane_through(agent.position, agent.patrol_axis)
            .unwrap_or(agent.lane);
    }
    agent.lane
}

pub fn can_strike(agent: &Agent, grid: &Grid, target: Vec2, radius: f32) -> bool {
    agent.position.distance(target) < radius && combat_lane(agent, grid).is_combat_position(target)
}

impl GameEngine {
    pub(super) fn update_weapons(&mut self, input: &InputIntent) {
        if !self.player.alive {
            return;
        }
        if input.switch_weapon {
            self.switch_weapon();
        }
        if input.attack {
            match self.player.weapon {
                Weapon::Knife => {
                    self.swing_knife();
                }
                Weapon::Gun => self.fire_gun(),
            }
        }
    }

    fn switch_weapon(&mut self) {
        let next = match self.player.weapon {
            Weapon::Knife if self.player.has_gun && self.player.ammo > 0 => Weapon::Gun,
            Weapon::Knife => return,
            Weapon::Gun => Weapon::Knife,
        };
        self.player.weapon = next;
        self.events.push(RuntimeEvent::WeaponSwitched { weapon: next });
    }

    pub(super) fn swing_knife(&mut self) -> bool {
        if self.elapsed_ms < self.player.knife_ready_at {
            return false;
        }
        self.player.knife_ready_at = self.elapsed_ms.saturating_add(self.config.knife_cooldown_ms);

        let player = self.player.body.position;
        let grid = &self.world.grid;
        let target = self
            .agents
            .iter()
            .filter(|agent| can_strike(agent, grid, player, KNIFE_RANGE))
            .min_by(|a, b| {
                a.position
                    .distance(player)
                    .total_cmp(&b.position.distance(player))
            })
            .map(|agent| agent.id);

        self.events.push(RuntimeEvent::KnifeSwing {
            hit: target.is_some(),
        });
        match target {
            Some(id) => {
                self.kill_agent(id, Weapon::Knife);
                true
            }
            None => false,
        }
    }

    fn fire_gun(&mut self) {
        if self.player.ammo == 0 || self.elapsed_ms < self.player.gun_ready_at {
            return;
        }
        self.player.gun_ready_at = self.elapsed_ms.saturating_add(self.config.gun_cooldown_ms);
        self.player.ammo -= 1;
        self.stats.shots_fired += 1;
        self.bullets.push(Bullet {
            position: self.player.body.position,
            velocity: self.player.body.aim.normalized() * self.config.bullet_speed,
            ticks_left: self.config.bullet_lifetime_ticks,
        });
        self.events.push(RuntimeEvent::ShotFired {
            ammo_left: self.player.ammo,
        });
        if self.player.ammo == 0 {
            self.player.weapon = Weapon::Knife;
            self.events.push(RuntimeEvent::WeaponSwitched {
                weapon: Weapon::Knife,
            });
        }
    }

    pub(super) fn update_bullets(&mut self) {
        let mut bullets = std::mem::take(&mut self.bullets);
        bullets.retain_mut(|bullet| {
            if bullet.ticks_left == 0 {
                return false;
            }
            bullet.ticks_left -= 1;
            bullet.position = bullet.position + bullet.velocity;
            if self
                .world
                .grid
                .is_wall_at(bullet.position, BodyProfile::Thick { radius: BULLET_RADIUS })
            {
                return false;
            }
            let grid = &self.world.grid;
            let hit = self
                .agents
                .iter()
                .find(|agent| can_strike(agent, grid, bullet.position, BULLET_HITBOX))
                .map(|agent| agent.id);
            match hit {
                Some(id) => {
                    self.kill_agent(id, Weapon::Gun);
                    false
                }
                None => true,
            }
        });
        self.bullets = bullets;
    }

    pub(super) fn resolve_contacts(&mut self) {
        if !self.player.alive {
            return;
        }
        let player = self.player.body.position;
        let grid = &self.world.grid;
        let catcher = self
            .agents
            .iter()
            .find(|agent| can_strike(agent, grid, player, CONTACT_RADIUS))
            .map(|agent| agent.id);
        if let Some(agent_id) = catcher {
            self.player.alive = false;
            self.player.body.velocity = Vec2::ZERO;
            self.events.push(RuntimeEvent::PlayerDied { agent_id });
            self.finish(GameOverReason::Caught);
        }
    }

    pub(super) fn collect_pickup(&mut self) {
        if self.player.has_gun || !self.player.alive {
            return;
        }
        if self.player.body.position.distance(PICKUP_POSITION) < PICKUP_RADIUS {
            self.player.has_gun = true;
            self.player.ammo = self.config.gun_ammo;
            self.events.push(RuntimeEvent::PickupCollected);
        }
    }

    pub(super) fn check_exit(&mut self) {
        if !self.player.alive || self.ended {
            return;
        }
        let (x, z) = self.world.grid.world_to_cell(self.player.body.position);
        let (ex, ez) = self.world.exit;
        if (x, z) == (ex as i32, ez as i32) {
            self.events.push(RuntimeEvent::ExitReached);
            self.finish(GameOverReason::Escaped);
        }
    }

    pub(super) fn kill_agent(&mut self, id: AgentId, weapon: Weapon) {
        if self.agents.remove(id).is_none() {
            return;
        }
        if let Some(promoted) = self.chase_queue.release(id) {
            self.promote_chaser(promoted);
        }
        let reward = self.config.kill_reward;
        self.stats.kills += 1;
        self.stats.score += reward;
        self.events.push(RuntimeEvent::AgentKilled {
            agent_id: id,
            weapon,
            reward,
        });

        if self.agents.is_empty() {
            self.events.push(RuntimeEvent::AllCleared { wave: self.wave });
            if self.mode == GameMode::Survival {
                self.next_wave_at = Some(self.elapsed_ms.saturating_add(self.config.wave_delay_ms));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::combat_lane;
    use crate::engine::agent_system::Agent;
    use crate::engine::{test_world, GameEngine};
    use crate::config::TuningConfig;
    use crate::types::{AgentId, Axis, GameMode, GameOverReason, RuntimeEvent, Vec2, Weapon};

    // Row 5 (x 1..=10) crossed by column 3 (z 1..=10) on a 12x12 grid.
    fn cross_engine(mode: GameMode) -> GameEngine {
        let mut rows = vec!["############".to_string(); 12];
        for (z, row) in rows.iter_mut().enumerate() {
            let mut bytes = row.clone().into_bytes();
            if (1..=10).contains(&z) {
                bytes[3] = b'.';
            }
            if z == 5 {
                for cell in bytes.iter_mut().take(11).skip(1) {
                    *cell = b'.';
                }
            }
            *row = String::from_utf8(bytes).expect("ascii row");
        }
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        let mut engine =
            GameEngine::with_world(mode, test_world(&rows), TuningConfig::default(), 7);
        engine.agents.clear();
        engine.chase_queue.clear();
        engine.events.clear();
        engine
    }

    fn place_agent(engine: &mut GameEngine, axis: Axis, at: Vec2) -> AgentId {
        let lane = engine
            .world
            .grid
            .lane_through(at, axis)
            .expect("agent placed in an open cell");
        engine.agents.insert_with(|id| {
            let mut agent = Agent::new(id, lane, 1.0, 0.0);
            agent.position = at;
            agent
        })
    }

    #[test]
    fn knife_hits_just_inside_range() {
        let mut engine = cross_engine(GameMode::Hunt);
        engine.player.body.position = Vec2::new(-2.0, -0.5);
        let id = place_agent(&mut engine, Axis::X, Vec2::new(0.79, -0.5));

        assert!(engine.swing_knife());
        assert!(engine.agents.get(id).is_none());
        assert_eq!(engine.stats.kills, 1);
        assert_eq!(engine.stats.score, TuningConfig::default().kill_reward);
    }

    #[test]
    fn knife_misses_just_outside_range() {
        let mut engine = cross_engine(GameMode::Hunt);
        engine.player.body.position = Vec2::new(-2.0, -0.5);
        let id = place_agent(&mut engine, Axis::X, Vec2::new(0.81, -0.5));

        assert!(!engine.swing_knife());
        assert!(engine.agents.get(id).is_some());
        assert!(engine
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::KnifeSwing { hit: false })));
    }

    #[test]
    fn knife_misses_agent_in_perpendicular_corridor() {
        let mut engine = cross_engine(GameMode::Hunt);
        engine.player.body.position = Vec2::new(-1.5, -0.5);
        let id = place_agent(&mut engine, Axis::Z, Vec2::new(-2.5, -0.5));
        let agent = engine.agents.get(id).expect("agent placed");
        assert_eq!(agent.position.distance(engine.player.body.position), 1.0);

        assert!(!engine.swing_knife());
        assert!(engine.agents.get(id).is_some());
    }

    #[test]
    fn knife_respects_cooldown() {
        let mut engine = cross_engine(GameMode::Hunt);
        engine.player.body.position = Vec2::new(-2.0, -0.5);
        place_agent(&mut engine, Axis::X, Vec2::new(-3.0, -0.5));
        place_agent(&mut engine, Axis::X, Vec2::new(-1.0, -0.5));

        assert!(engine.swing_knife());
        assert!(!engine.swing_knife());
        engine.elapsed_ms += engine.config.knife_cooldown_ms;
        assert!(engine.swing_knife());
        assert!(engine.agents.is_empty());
    }

    #[test]
    fn huge_cooldowns_saturate_instead_of_overflowing() {
        let mut engine = cross_engine(GameMode::Survival);
        engine.config.knife_cooldown_ms = u64::MAX;
        engine.config.gun_cooldown_ms = u64::MAX;
        engine.config.wave_delay_ms = u64::MAX;
        engine.elapsed_ms = 1_000;
        engine.player.body.position = Vec2::new(-2.0, -0.5);
        engine.player.has_gun = true;
        engine.player.ammo = 3;
        let id = place_agent(&mut engine, Axis::X, Vec2::new(-1.0, -0.5));

        assert!(engine.swing_knife());
        assert_eq!(engine.player.knife_ready_at, u64::MAX);
        assert!(!engine.swing_knife());
        engine.fire_gun();
        assert_eq!(engine.player.gun_ready_at, u64::MAX);
        assert!(engine.agents.get(id).is_none());
        assert_eq!(engine.next_wave_at, Some(u64::MAX));
    }

    #[test]
    fn global_chaser_is_judged_against_its_current_corridor() {
        let mut engine = cross_engine(GameMode::Survival);
        let id = place_agent(&mut engine, Axis::X, Vec2::new(3.5, -0.5));
        let agent = engine.agents.get_mut(id).expect("agent placed");
        agent.global_chase = true;
        agent.patrol_axis = Axis::Z;
        agent.position = Vec2::new(-2.5, 2.5);

        let agent = engine.agents.get(id).expect("agent placed");
        let lane = combat_lane(agent, &engine.world.grid);
        assert_eq!(lane.axis, Axis::Z);
        assert_eq!(lane.fixed, -2.5);
        assert_eq!((lane.span_min, lane.span_max), (-5.0, 5.0));
    }

    #[test]
    fn contact_in_lane_catches_player() {
        let mut engine = cross_engine(GameMode::Hunt);
        engine.player.body.position = Vec2::new(0.0, -0.5);
        let id = place_agent(&mut engine, Axis::X, Vec2::new(0.85, -0.5));

        engine.resolve_contacts();
        assert!(!engine.player.alive);
        assert!(engine.is_ended());
        assert_eq!(engine.end_reason(), Some(GameOverReason::Caught));
        assert!(engine
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::PlayerDied { agent_id } if *agent_id == id)));
    }

    #[test]
    fn contact_across_corridor_wall_is_harmless() {
        let mut engine = cross_engine(GameMode::Hunt);
        engine.player.body.position = Vec2::new(-1.65, -0.5);
        place_agent(&mut engine, Axis::Z, Vec2::new(-2.5, -0.5));

        engine.resolve_contacts();
        assert!(engine.player.alive);
    }

    #[test]
    fn bullet_travels_and_kills_in_lane() {
        let mut engine = cross_engine(GameMode::Hunt);
        engine.player.body.position = Vec2::new(-4.0, -0.5);
        engine.player.body.aim = Vec2::new(1.0, 0.0);
        engine.player.has_gun = true;
        engine.player.ammo = 2;
        engine.player.weapon = Weapon::Gun;
        let id = place_agent(&mut engine, Axis::X, Vec2::new(2.0, -0.5));

        engine.fire_gun();
        assert_eq!(engine.player.ammo, 1);
        assert_eq!(engine.bullets.len(), 1);
        for _ in 0..40 {
            engine.update_bullets();
        }
        assert!(engine.agents.get(id).is_none());
        assert!(engine.bullets.is_empty());
        assert_eq!(engine.stats.shots_fired, 1);
    }

    #[test]
    fn bullet_dies_on_wall() {
        let mut engine = cross_engine(GameMode::Hunt);
        engine.player.body.position = Vec2::new(-4.0, -0.5);
        engine.player.body.aim = Vec2::new(0.0, 1.0);
        engine.player.has_gun = true;
        engine.player.ammo = 1;
        engine.player.weapon = Weapon::Gun;

        engine.fire_gun();
        assert_eq!(engine.player.weapon, Weapon::Knife);
        engine.update_bullets();
        engine.update_bullets();
        assert!(engine.bullets.is_empty());
    }

    #[test]
    fn clearing_the_last_agent_schedules_next_wave_in_survival() {
        let mut engine = cross_engine(GameMode::Survival);
        let id = place_agent(&mut engine, Axis::X, Vec2::new(3.5, -0.5));
        engine.kill_agent(id, Weapon::Knife);
        assert!(engine
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::AllCleared { .. })));
        assert_eq!(
            engine.next_wave_at,
            Some(engine.elapsed_ms + engine.config.wave_delay_ms)
        );

        let mut hunt = cross_engine(GameMode::Hunt);
        let id = place_agent(&mut hunt, Axis::X, Vec2::new(3.5, -0.5));
        hunt.kill_agent(id, Weapon::Knife);
        assert_eq!(hunt.next_wave_at, None);
    }

    #[test]
    fn killing_designated_chaser_promotes_queue_head() {
        let mut engine = cross_engine(GameMode::Hunt);
        let first = place_agent(&mut engine, Axis::X, Vec2::new(3.5, -0.5));
        let second = place_agent(&mut engine, Axis::Z, Vec2::new(-2.5, 3.5));
        engine.chase_queue.request(first, true);
        engine.chase_queue.request(second, true);
        if let Some(agent) = engine.agents.get_mut(second) {
            agent.state = crate::types::AgentState::Queued;
        }

        engine.kill_agent(first, Weapon::Knife);
        assert_eq!(engine.chase_queue.current(), Some(second));
        let promoted = engine.agents.get(second).expect("second agent alive");
        assert_eq!(promoted.state, crate::types::AgentState::Chasing);
    }

    #[test]
    fn pickup_unlocks_gun_once() {
        let mut engine = cross_engine(GameMode::Hunt);
        engine.player.body.position = crate::constants::PICKUP_POSITION;
        engine.collect_pickup();
        assert!(engine.player.has_gun);
        assert_eq!(engine.player.ammo, engine.config.gun_ammo);

        engine.player.ammo = 0;
        engine.collect_pickup();
        assert_eq!(engine.player.ammo, 0);
    }
}
