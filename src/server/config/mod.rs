use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::resources::ControlMode;
use crate::simulation::{SceneLoad, Variable};
use crate::utils::{
    BEHAVIOUR_MACHINE, BOSS_MAX_HEALTH, BOSS_MIN_HEALTH, CIRCLE_SLASH_RADIUS,
    CONSECUTIVE_FRAME_THRESHOLD, CROSS_SLASH_RADIUS, ENEMY_LAYER, EPISODE_ENTRY_GATE,
    EPISODE_SCENE, FRAMES_PER_STEP, MAX_RAY_DISTANCE, MAX_RESET_WAIT_FRAMES, PROJECTILE_LAYER,
    RESET_TIME_SCALE, SETTLE_FRAMES, TERRAIN_LAYER,
};

mod errors;

pub use errors::ConfigError;

/// Top-level bridge configuration, loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Selects the shared region name; 0 keeps the bare base name.
    pub instance_id: u32,
    pub control_mode: ControlMode,
    /// Time scale used while physics runs.
    pub time_scale: f32,
    /// Fixed ticks per step request.
    pub frames_per_step: u32,
    /// Time scale while a reset waits on scene loading; `None` keeps `time_scale`.
    pub reset_time_scale: Option<f32>,
    /// Directory holding the shared region. Defaults to the platform location.
    pub shm_dir: Option<PathBuf>,
    pub sensor: SensorConfig,
    pub boss: BossConfig,
    pub hazards: Vec<HazardRule>,
    pub reset: ResetConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            instance_id: 0,
            control_mode: ControlMode::Agent,
            time_scale: 1.0,
            frames_per_step: FRAMES_PER_STEP,
            reset_time_scale: Some(RESET_TIME_SCALE),
            shm_dir: None,
            sensor: SensorConfig::default(),
            boss: BossConfig::default(),
            hazards: HazardRule::defaults(),
            reset: ResetConfig::default(),
        }
    }
}

impl BridgeConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let config: BridgeConfig = serde_yaml::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        serde_yaml::to_writer(file, self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.time_scale.is_finite() && self.time_scale > 0.0) {
            return Err(ConfigError::invalid("time_scale", self.time_scale));
        }
        if self.frames_per_step == 0 {
            return Err(ConfigError::invalid("frames_per_step", self.frames_per_step));
        }
        if let Some(scale) = self.reset_time_scale {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(ConfigError::invalid("reset_time_scale", scale));
            }
        }
        if !(self.sensor.max_distance.is_finite() && self.sensor.max_distance > 0.0) {
            return Err(ConfigError::invalid(
                "sensor.max_distance",
                self.sensor.max_distance,
            ));
        }
        for layer in [
            self.sensor.terrain_layer,
            self.sensor.enemy_layer,
            self.sensor.projectile_layer,
        ] {
            if layer >= 32 {
                return Err(ConfigError::invalid("sensor layer", layer));
            }
        }
        if self.boss.max_health <= 0 {
            return Err(ConfigError::invalid("boss.max_health", self.boss.max_health));
        }
        if self.reset.max_wait_frames <= self.reset.consecutive_frames {
            return Err(ConfigError::invalid(
                "reset.max_wait_frames",
                self.reset.max_wait_frames,
            ));
        }
        for rule in &self.hazards {
            if !(rule.radius.is_finite() && rule.radius > 0.0) {
                return Err(ConfigError::invalid(&format!("hazard '{}' radius", rule.name), rule.radius));
            }
        }
        Ok(())
    }

    /// Time scale applied while a reset is loading the scene.
    pub fn loading_time_scale(&self) -> f32 {
        self.reset_time_scale.unwrap_or(self.time_scale)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub max_distance: f32,
    pub terrain_layer: u32,
    pub enemy_layer: u32,
    pub projectile_layer: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            max_distance: MAX_RAY_DISTANCE,
            terrain_layer: TERRAIN_LAYER,
            enemy_layer: ENEMY_LAYER,
            projectile_layer: PROJECTILE_LAYER,
        }
    }
}

/// Boss state name prefix that marks entry into a new phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseMarker {
    pub prefix: String,
    pub phase: i32,
}

/// Variable written on the boss after its machines are reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDefault {
    pub machine: String,
    pub name: String,
    pub value: Variable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    /// Name fragments identifying the boss among health-bearing objects.
    pub name_markers: Vec<String>,
    /// Health at or above which an unnamed object still counts as the boss.
    pub min_health: i32,
    /// Reported as the boss's maximum health.
    pub max_health: i32,
    /// Machine whose active state drives the attack state and phase.
    pub machine: String,
    pub phase_markers: Vec<PhaseMarker>,
    /// State forced on `machine` after a soft reset, if any.
    pub initial_state: Option<String>,
    pub variable_defaults: Vec<VariableDefault>,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            name_markers: vec!["Boss".to_string(), "Lace".to_string()],
            min_health: BOSS_MIN_HEALTH,
            max_health: BOSS_MAX_HEALTH,
            machine: BEHAVIOUR_MACHINE.to_string(),
            phase_markers: vec![
                PhaseMarker {
                    prefix: "P2 Shift".to_string(),
                    phase: 1,
                },
                PhaseMarker {
                    prefix: "P3 Roar".to_string(),
                    phase: 2,
                },
            ],
            initial_state: None,
            variable_defaults: Vec::new(),
        }
    }
}

/// How an object's name is compared against a hazard rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatch {
    Exact,
    Contains,
}

/// When a matched object counts as a live hazard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HazardGate {
    /// Live until its damaging collider has been enabled and disabled again.
    ColliderLifecycle,
    /// Live while `machine` is in one of `states`.
    ActiveStates { machine: String, states: Vec<String> },
}

/// Transient damaging object tracked outside the world raycast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardRule {
    pub name: String,
    pub matching: NameMatch,
    pub radius: f32,
    pub gate: HazardGate,
}

impl HazardRule {
    pub fn matches(&self, object_name: &str) -> bool {
        match self.matching {
            NameMatch::Exact => object_name == self.name,
            NameMatch::Contains => object_name.contains(&self.name),
        }
    }

    /// Circle and cross slashes of the reference boss.
    pub fn defaults() -> Vec<HazardRule> {
        vec![
            HazardRule {
                name: "lace_circle_slash".to_string(),
                matching: NameMatch::Contains,
                radius: CIRCLE_SLASH_RADIUS,
                gate: HazardGate::ColliderLifecycle,
            },
            HazardRule {
                name: "Cross Slash".to_string(),
                matching: NameMatch::Exact,
                radius: CROSS_SLASH_RADIUS,
                gate: HazardGate::ActiveStates {
                    machine: BEHAVIOUR_MACHINE.to_string(),
                    states: vec!["Idle".to_string(), "Attacking".to_string()],
                },
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetConfig {
    /// Scene reloaded by a hard reset.
    pub scene: SceneLoad,
    /// A wait condition must hold for more than this many consecutive frames.
    pub consecutive_frames: u32,
    /// Frames a reset wait may take before the reset fails.
    pub max_wait_frames: u32,
    /// Frames the soft reset lets the world settle before releasing damage.
    pub settle_frames: u32,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            scene: SceneLoad {
                scene: EPISODE_SCENE.to_string(),
                entry_gate: EPISODE_ENTRY_GATE.to_string(),
            },
            consecutive_frames: CONSECUTIVE_FRAME_THRESHOLD,
            max_wait_frames: MAX_RESET_WAIT_FRAMES,
            settle_frames: SETTLE_FRAMES,
        }
    }
}
