use crate::config::TuningConfig;
use crate::constants::{AGENT_HEALTH, TICK_MS};
use crate::grid::Grid;
use crate::lane::Lane;
use crate::rng::Rng;
use crate::types::{
    AgentId, AgentState, AgentView, Axis, BulletView, GameMode, GameOverReason, GameSummary,
    InputIntent, PlayerView, RuntimeEvent, Snapshot, Vec2, Weapon,
};
use crate::world::{generate_world_with, GeneratedWorld};

pub mod agent_system;
pub mod arena;
pub mod chase_queue;
pub mod combat_system;
pub mod player_system;
pub mod spawn_system;

pub use self::agent_system::{Agent, PursuitPolicy};
pub use self::arena::AgentArena;
pub use self::chase_queue::{ChaseQueue, ChaseSlot};
pub use self::combat_system::Bullet;
pub use self::player_system::{MoveOutcome, PlayerBody};

#[derive(Clone, Debug, Default)]
struct EngineStats {
    kills: u32,
    score: u32,
    agents_spawned: usize,
    shots_fired: u32,
    stuck_ticks: u64,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub body: PlayerBody,
    pub weapon: Weapon,
    pub has_gun: bool,
    pub ammo: u32,
    pub alive: bool,
    knife_ready_at: u64,
    gun_ready_at: u64,
}

impl Player {
    fn spawn(position: Vec2) -> Self {
        Self {
            body: PlayerBody::at(position),
            weapon: Weapon::Knife,
            has_gun: false,
            ammo: 0,
            alive: true,
            knife_ready_at: 0,
            gun_ready_at: 0,
        }
    }

    pub fn to_view(&self) -> PlayerView {
        PlayerView {
            x: self.body.position.x,
            z: self.body.position.z,
            facing: self.body.facing,
            weapon: self.weapon,
            has_gun: self.has_gun,
            ammo: self.ammo,
            alive: self.alive,
        }
    }
}

/// Owns the maze, the player and every live agent and bullet. One `step` is
/// one fixed tick: player movement, weapons, agents, bullets, then contact.
#[derive(Clone, Debug)]
pub struct GameEngine {
    pub mode: GameMode,
    pub config: TuningConfig,
    pub world: GeneratedWorld,

    rng: Rng,
    player: Player,
    agents: AgentArena,
    bullets: Vec<Bullet>,
    chase_queue: ChaseQueue,
    events: Vec<RuntimeEvent>,
    stats: EngineStats,

    wave: u32,
    next_wave_at: Option<u64>,
    elapsed_ms: u64,
    accumulator_ms: u64,
    tick_counter: u64,
    ended: bool,
    end_reason: Option<GameOverReason>,
}

impl GameEngine {
    pub fn new(mode: GameMode, seed: u32, config: TuningConfig) -> Self {
        let world = generate_world_with(seed, config.noise_attempts);
        Self::with_world(mode, world, config, seed)
    }

    pub fn with_world(
        mode: GameMode,
        world: GeneratedWorld,
        config: TuningConfig,
        seed: u32,
    ) -> Self {
        // The maze consumed `seed`; gameplay draws from an independent stream.
        let rng = Rng::new(seed ^ 0x9e37_79b9);
        let (ex, ez) = world.entrance;
        let player = Player::spawn(world.grid.cell_center(ex, ez));

        let mut engine = Self {
            mode,
            config,
            world,
            rng,
            player,
            agents: AgentArena::new(),
            bullets: Vec::new(),
            chase_queue: ChaseQueue::new(),
            events: Vec::new(),
            stats: EngineStats::default(),
            wave: 0,
            next_wave_at: None,
            elapsed_ms: 0,
            accumulator_ms: 0,
            tick_counter: 0,
            ended: false,
            end_reason: None,
        };
        engine.spawn_wave();
        engine
    }

    pub fn reset(&mut self, mode: GameMode) {
        let seed = self.rng.next_u32();
        eprintln!(
            "[engine] reset mode={} seed={seed}",
            crate::constants::get_mode_label(mode)
        );
        *self = Self::new(mode, seed, self.config.clone());
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn end_reason(&self) -> Option<GameOverReason> {
        self.end_reason
    }

    pub fn tick(&self) -> u64 {
        self.tick_counter
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn chase_queue(&self) -> &ChaseQueue {
        &self.chase_queue
    }

    pub fn clear_agents(&mut self) {
        self.agents.clear();
        self.chase_queue.clear();
    }

    pub fn stuck_ticks(&self) -> u64 {
        self.stats.stuck_ticks
    }

    /// Feeds a frame delta. Runs at most one tick; any backlog beyond one tick
    /// is dropped. Returns whether a tick ran.
    pub fn advance(&mut self, dt_ms: u64, input: &InputIntent) -> bool {
        self.accumulator_ms = self.accumulator_ms.saturating_add(dt_ms);
        if self.accumulator_ms < TICK_MS {
            return false;
        }
        self.accumulator_ms = (self.accumulator_ms - TICK_MS).min(TICK_MS - 1);
        self.step(input);
        true
    }

    pub fn step(&mut self, input: &InputIntent) {
        if self.ended {
            return;
        }
        self.tick_counter += 1;
        self.elapsed_ms = self.elapsed_ms.saturating_add(TICK_MS);

        if let Some(at) = self.next_wave_at {
            if self.elapsed_ms >= at {
                self.spawn_wave();
            }
        }

        self.update_player(input);
        self.update_weapons(input);
        self.update_agents();
        self.update_bullets();
        self.resolve_contacts();
        self.collect_pickup();
        self.check_exit();
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        Snapshot {
            tick: self.tick_counter,
            now_ms: self.elapsed_ms,
            mode: self.mode,
            wave: self.wave,
            player: self.player.to_view(),
            agents: self.agents.iter().map(Agent::to_view).collect(),
            bullets: self.bullets.iter().map(Bullet::to_view).collect(),
            kills: self.stats.kills,
            score: self.stats.score,
            events: if include_events {
                std::mem::take(&mut self.events)
            } else {
                Vec::new()
            },
        }
    }

    pub fn build_summary(&self) -> GameSummary {
        GameSummary {
            mode: self.mode,
            reason: self.end_reason,
            duration_ms: self.elapsed_ms,
            kills: self.stats.kills,
            score: self.stats.score,
            waves: self.wave,
            agents_spawned: self.stats.agents_spawned,
            shots_fired: self.stats.shots_fired,
        }
    }

    fn finish(&mut self, reason: GameOverReason) {
        if self.ended {
            return;
        }
        self.ended = true;
        self.end_reason = Some(reason);
        self.bullets.clear();
    }
}

/// Minimal world around a hand-drawn grid. The entrance is the first open
/// cell in scan order and the exit the last; there is no reachable pickup.
#[cfg(test)]
pub(crate) fn test_world(rows: &[&str]) -> GeneratedWorld {
    let grid = Grid::from_rows(rows);
    let size = grid.size();
    let open: Vec<(usize, usize)> = (0..size * size)
        .map(|i| (i % size, i / size))
        .filter(|(x, z)| grid.is_open(*x as i32, *z as i32))
        .collect();
    GeneratedWorld {
        seed: 0,
        entrance: open.first().copied().unwrap_or((1, 1)),
        exit: open.last().copied().unwrap_or((1, 1)),
        pickup_cell: (0, 0),
        grid,
    }
}
