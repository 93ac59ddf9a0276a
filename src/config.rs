use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

const MAX_COOLDOWN_MS: u64 = 60_000;
const MAX_WAVE_DELAY_MS: u64 = 600_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    #[serde(rename = "agentCount")]
    pub agent_count: usize,
    #[serde(rename = "spawnSpacing")]
    pub spawn_spacing: f32,
    #[serde(rename = "patrolInset")]
    pub patrol_inset: f32,
    #[serde(rename = "safeSpawnRadius")]
    pub safe_spawn_radius: f32,
    #[serde(rename = "noiseAttempts")]
    pub noise_attempts: usize,

    #[serde(rename = "agentSpeed")]
    pub agent_speed: f32,
    #[serde(rename = "queuedSpeedFactor")]
    pub queued_speed_factor: f32,
    #[serde(rename = "throttleChasers")]
    pub throttle_chasers: bool,

    #[serde(rename = "playerAcceleration")]
    pub player_acceleration: f32,
    #[serde(rename = "playerFriction")]
    pub player_friction: f32,
    #[serde(rename = "playerMaxSpeed")]
    pub player_max_speed: f32,
    #[serde(rename = "playerRadius")]
    pub player_radius: f32,

    #[serde(rename = "knifeCooldownMs")]
    pub knife_cooldown_ms: u64,
    #[serde(rename = "gunCooldownMs")]
    pub gun_cooldown_ms: u64,
    #[serde(rename = "gunAmmo")]
    pub gun_ammo: u32,
    #[serde(rename = "bulletSpeed")]
    pub bullet_speed: f32,
    #[serde(rename = "bulletLifetimeTicks")]
    pub bullet_lifetime_ticks: u32,

    #[serde(rename = "killReward")]
    pub kill_reward: u32,
    #[serde(rename = "waveDelayMs")]
    pub wave_delay_ms: u64,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            agent_count: 15,
            spawn_spacing: 4.0,
            patrol_inset: 1.0,
            safe_spawn_radius: 6.0,
            noise_attempts: 15,
            agent_speed: 0.05,
            queued_speed_factor: 0.5,
            throttle_chasers: false,
            player_acceleration: 0.012,
            player_friction: 0.88,
            player_max_speed: 0.12,
            player_radius: 0.3,
            knife_cooldown_ms: 350,
            gun_cooldown_ms: 200,
            gun_ammo: 12,
            bullet_speed: 0.35,
            bullet_lifetime_ticks: 90,
            kill_reward: 10,
            wave_delay_ms: 2_500,
        }
    }
}

impl TuningConfig {
    pub fn classic() -> Self {
        Self {
            agent_speed: 0.04,
            player_max_speed: 0.1,
            player_friction: 0.85,
            ..Self::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let parsed: Self = serde_json::from_str(&text)?;
        Ok(parsed.sanitized())
    }

    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let finite_or = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };

        self.spawn_spacing = finite_or(self.spawn_spacing, defaults.spawn_spacing).max(0.0);
        self.patrol_inset = finite_or(self.patrol_inset, defaults.patrol_inset).max(0.0);
        self.safe_spawn_radius =
            finite_or(self.safe_spawn_radius, defaults.safe_spawn_radius).max(0.0);
        self.agent_speed = finite_or(self.agent_speed, defaults.agent_speed).clamp(0.0, 0.45);
        self.queued_speed_factor =
            finite_or(self.queued_speed_factor, defaults.queued_speed_factor).clamp(0.0, 1.0);
        self.player_acceleration =
            finite_or(self.player_acceleration, defaults.player_acceleration).max(0.0);
        self.player_friction =
            finite_or(self.player_friction, defaults.player_friction).clamp(0.0, 1.0);
        self.player_max_speed =
            finite_or(self.player_max_speed, defaults.player_max_speed).clamp(0.0, 0.45);
        self.player_radius = finite_or(self.player_radius, defaults.player_radius).clamp(0.0, 0.45);
        self.bullet_speed = finite_or(self.bullet_speed, defaults.bullet_speed).clamp(0.0, 0.9);
        self.knife_cooldown_ms = self.knife_cooldown_ms.min(MAX_COOLDOWN_MS);
        self.gun_cooldown_ms = self.gun_cooldown_ms.min(MAX_COOLDOWN_MS);
        self.wave_delay_ms = self.wave_delay_ms.min(MAX_WAVE_DELAY_MS);
        self
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(error) => write!(f, "failed to read config: {error}"),
            Self::Parse(error) => write!(f, "invalid config: {error}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(error) => Some(error),
            Self::Parse(error) => Some(error),
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        Self::Parse(error)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{ConfigError, TuningConfig};

    fn temp_path(name: &str) -> std::path::PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("maze-hunt-{name}-{now}.json"))
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let path = temp_path("partial");
        std::fs::write(&path, r#"{ "agentCount": 6, "throttleChasers": true }"#)
            .expect("write temp config");
        let config = TuningConfig::load(&path).expect("config should load");
        let _ = std::fs::remove_file(&path);

        assert_eq!(config.agent_count, 6);
        assert!(config.throttle_chasers);
        assert_eq!(config.spawn_spacing, TuningConfig::default().spawn_spacing);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = TuningConfig::load(&temp_path("missing"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let path = temp_path("malformed");
        std::fs::write(&path, "{ agentCount: ").expect("write temp config");
        let result = TuningConfig::load(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn sanitize_clamps_out_of_range_values() {
        let config = TuningConfig {
            player_friction: 3.0,
            agent_speed: f32::NAN,
            player_radius: -1.0,
            ..TuningConfig::default()
        }
        .sanitized();
        assert_eq!(config.player_friction, 1.0);
        assert_eq!(config.agent_speed, TuningConfig::default().agent_speed);
        assert_eq!(config.player_radius, 0.0);
    }

    #[test]
    fn oversized_timings_from_file_are_clamped() {
        let path = temp_path("timings");
        std::fs::write(
            &path,
            r#"{ "knifeCooldownMs": 18446744073709551615, "waveDelayMs": 18446744073709551615 }"#,
        )
        .expect("write temp config");
        let config = TuningConfig::load(&path).expect("config should load");
        let _ = std::fs::remove_file(&path);

        assert_eq!(config.knife_cooldown_ms, 60_000);
        assert_eq!(config.wave_delay_ms, 600_000);
        assert_eq!(config.gun_cooldown_ms, TuningConfig::default().gun_cooldown_ms);
    }

    #[test]
    fn classic_preset_is_slower() {
        let classic = TuningConfig::classic();
        let modern = TuningConfig::default();
        assert!(classic.agent_speed < modern.agent_speed);
        assert_eq!(classic.agent_count, modern.agent_count);
    }
}
