use glam::Vec2;
use std::collections::BTreeMap;

use crate::simulation::{Body, Damager, EntityId, SimError, Variable};

/// Named behaviour machine with a fixed state set and typed variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Machine {
    pub name: String,
    states: Vec<String>,
    pub active: String,
    initial_variables: BTreeMap<String, Variable>,
    pub variables: BTreeMap<String, Variable>,
    /// Reset attempts fail, for exercising partial resets.
    pub fail_reset: bool,
}

impl Machine {
    /// The first state is the initial one.
    pub fn new(name: &str, states: &[&str], variables: &[(&str, Variable)]) -> Self {
        let variables: BTreeMap<_, _> = variables
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect();
        Self {
            name: name.to_string(),
            states: states.iter().map(|s| s.to_string()).collect(),
            active: states.first().map(|s| s.to_string()).unwrap_or_default(),
            initial_variables: variables.clone(),
            variables,
            fail_reset: false,
        }
    }

    pub fn is(&self, state: &str) -> bool {
        self.active == state
    }

    pub fn set_state(&mut self, state: &str) -> Result<(), SimError> {
        if !self.states.iter().any(|s| s == state) {
            return Err(SimError::UnknownState {
                machine: self.name.clone(),
                state: state.to_string(),
            });
        }
        self.active = state.to_string();
        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), SimError> {
        if self.fail_reset {
            return Err(SimError::Rejected(format!("machine '{}' is locked", self.name)));
        }
        self.active = self.states.first().cloned().unwrap_or_default();
        self.variables = self.initial_variables.clone();
        Ok(())
    }

    pub fn set_variable(&mut self, name: &str, value: Variable) -> Result<(), SimError> {
        match self.variables.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(SimError::UnknownVariable {
                machine: self.name.clone(),
                name: name.to_string(),
            }),
        }
    }

    pub fn bump(&mut self, name: &str) {
        if let Some(Variable::Int(count)) = self.variables.get_mut(name) {
            *count += 1;
        }
    }
}

pub fn find<'a>(machines: &'a [Machine], name: &str) -> Option<&'a Machine> {
    machines.iter().find(|m| m.name == name)
}

pub fn find_mut<'a>(machines: &'a mut [Machine], name: &str) -> Option<&'a mut Machine> {
    machines.iter_mut().find(|m| m.name == name)
}

/// Timed continuation owned by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    EndHitInvulnerability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pending {
    pub kind: PendingKind,
    pub ticks_left: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub id: EntityId,
    pub body: Body,
    pub health: i32,
    pub max_health: i32,
    pub silk: i32,
    pub max_silk: i32,
    pub grounded: bool,
    pub invulnerable: bool,
    pub hit_invulnerable: bool,
    pub attack_ticks: u32,
    pub attack_cooldown: u32,
    pub dash_ticks: u32,
    pub dash_cooldown: u32,
    pub cast_ticks: u32,
    pub recoil_ticks: u32,
    pub respawn_frames: u32,
    pub input_delay_frames: u32,
    pub anim_ticks: u32,
    pub pending: Vec<Pending>,
    pub machines: Vec<Machine>,
}

impl Agent {
    pub fn new(id: EntityId, position: Vec2, max_health: i32, max_silk: i32) -> Self {
        Self {
            id,
            body: Body {
                position,
                velocity: Vec2::ZERO,
                facing_right: true,
            },
            health: max_health,
            max_health,
            silk: 0,
            max_silk,
            grounded: true,
            invulnerable: false,
            hit_invulnerable: false,
            attack_ticks: 0,
            attack_cooldown: 0,
            dash_ticks: 0,
            dash_cooldown: 0,
            cast_ticks: 0,
            recoil_ticks: 0,
            respawn_frames: 0,
            input_delay_frames: 0,
            anim_ticks: 0,
            pending: Vec::new(),
            machines: vec![
                Machine::new("Movement", &["Idle", "Run", "Airborne"], &[]),
                Machine::new("Sprint", &["Inactive", "Active"], &[]),
                Machine::new(
                    "Bind",
                    &["Idle", "Charging"],
                    &[("Charge Time", Variable::Float(0.0))],
                ),
            ],
        }
    }

    pub fn clear_transient(&mut self) {
        self.hit_invulnerable = false;
        self.attack_ticks = 0;
        self.attack_cooldown = 0;
        self.dash_ticks = 0;
        self.dash_cooldown = 0;
        self.cast_ticks = 0;
        self.recoil_ticks = 0;
        self.respawn_frames = 0;
        self.anim_ticks = 0;
        self.body.facing_right = true;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Boss {
    pub id: EntityId,
    pub name: String,
    pub body: Body,
    pub health: i32,
    pub max_health: i32,
    pub state_ticks: u32,
    pub pattern_index: usize,
    pub phase_reached: i32,
    pub machines: Vec<Machine>,
}

impl Boss {
    pub fn new(id: EntityId, position: Vec2, max_health: i32, pattern: &[&str]) -> Self {
        let mut states: Vec<&str> = Vec::new();
        for state in pattern.iter().copied().chain(["P2 Shift", "P3 Roar", "Stun"]) {
            if !states.contains(&state) {
                states.push(state);
            }
        }
        Self {
            id,
            name: "Lace Boss".to_string(),
            body: Body {
                position,
                velocity: Vec2::ZERO,
                facing_right: false,
            },
            health: max_health,
            max_health,
            state_ticks: 0,
            pattern_index: 0,
            phase_reached: 0,
            machines: vec![
                Machine::new(
                    "Control",
                    &states,
                    &[
                        ("Attack Count", Variable::Int(0)),
                        ("Can Counter", Variable::Bool(true)),
                    ],
                ),
                Machine::new(
                    "Stun Control",
                    &["Idle", "Stunned"],
                    &[("Stun Hits", Variable::Int(0))],
                ),
            ],
        }
    }

    pub fn clear_transient(&mut self) {
        self.state_ticks = 0;
        self.pattern_index = 0;
        self.phase_reached = 0;
        self.body.facing_right = false;
    }
}

/// Enumerable world object, optionally damaging and stateful.
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaObject {
    pub id: EntityId,
    pub name: String,
    pub active: bool,
    pub position: Vec2,
    pub damager: Option<Damager>,
    pub machine: Option<Machine>,
    pub age: u32,
    /// Ticks until despawn; `None` lives until removed.
    pub lifetime: Option<u32>,
}
