use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AgentId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Hunt,
    Survival,
}

impl GameMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "hunt" => Some(Self::Hunt),
            "survival" => Some(Self::Survival),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Z,
}

impl Axis {
    pub fn other(self) -> Self {
        match self {
            Self::X => Self::Z,
            Self::Z => Self::X,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    Hopping,
    Chasing,
    Queued,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Weapon {
    Knife,
    Gun,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    Escaped,
    Caught,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub z: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, z: 0.0 };

    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.z)
    }

    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    pub fn normalized(self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            return Self::ZERO;
        }
        Self::new(self.x / len, self.z / len)
    }

    pub fn along(self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Z => self.z,
        }
    }

    pub fn with_along(self, axis: Axis, value: f32) -> Self {
        match axis {
            Axis::X => Self::new(value, self.z),
            Axis::Z => Self::new(self.x, value),
        }
    }

    pub fn unit(axis: Axis, sign: f32) -> Self {
        match axis {
            Axis::X => Self::new(sign, 0.0),
            Axis::Z => Self::new(0.0, sign),
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.z.is_finite()
    }

    /// Yaw around the vertical axis, 0 facing +z.
    pub fn facing(self) -> f32 {
        self.x.atan2(self.z)
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.z + rhs.z)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.z * rhs)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputIntent {
    pub move_x: f32,
    pub move_z: f32,
    pub attack: bool,
    pub switch_weapon: bool,
}

impl InputIntent {
    pub fn movement(&self) -> Vec2 {
        let raw = Vec2::new(self.move_x, self.move_z);
        if !raw.is_finite() {
            return Vec2::ZERO;
        }
        if raw.length() > 1.0 {
            raw.normalized()
        } else {
            raw
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub x: f32,
    pub z: f32,
    pub facing: f32,
    pub weapon: Weapon,
    #[serde(rename = "hasGun")]
    pub has_gun: bool,
    pub ammo: u32,
    pub alive: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct AgentView {
    pub id: AgentId,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub facing: f32,
    pub state: AgentState,
    #[serde(rename = "globalChase")]
    pub global_chase: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct BulletView {
    pub x: f32,
    pub z: f32,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    WaveSpawned {
        wave: u32,
        count: usize,
    },
    AgentSpawned {
        #[serde(rename = "agentId")]
        agent_id: AgentId,
        x: f32,
        z: f32,
    },
    AgentAggro {
        #[serde(rename = "agentId")]
        agent_id: AgentId,
    },
    AgentCalmed {
        #[serde(rename = "agentId")]
        agent_id: AgentId,
    },
    AgentKilled {
        #[serde(rename = "agentId")]
        agent_id: AgentId,
        weapon: Weapon,
        reward: u32,
    },
    KnifeSwing {
        hit: bool,
    },
    ShotFired {
        #[serde(rename = "ammoLeft")]
        ammo_left: u32,
    },
    WeaponSwitched {
        weapon: Weapon,
    },
    PickupCollected,
    AllCleared {
        wave: u32,
    },
    PlayerDied {
        #[serde(rename = "agentId")]
        agent_id: AgentId,
    },
    ExitReached,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "nowMs")]
    pub now_ms: u64,
    pub mode: GameMode,
    pub wave: u32,
    pub player: PlayerView,
    pub agents: Vec<AgentView>,
    pub bullets: Vec<BulletView>,
    pub kills: u32,
    pub score: u32,
    pub events: Vec<RuntimeEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub mode: GameMode,
    pub reason: Option<GameOverReason>,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    pub kills: u32,
    pub score: u32,
    pub waves: u32,
    #[serde(rename = "agentsSpawned")]
    pub agents_spawned: usize,
    #[serde(rename = "shotsFired")]
    pub shots_fired: u32,
}
