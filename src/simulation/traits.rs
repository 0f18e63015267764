use glam::Vec2;
use thiserror::Error;

use super::types::{
    AgentStatus, AnimationFrame, Body, EntityId, InputState, LayerMask, SceneLoad, Variable,
    WorldHit, WorldObject,
};

/// Failure reported by the host when a mutation cannot be applied.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("entity {0:?} not found")]
    MissingEntity(EntityId),

    #[error("entity {entity:?} has no behaviour machine '{machine}'")]
    UnknownMachine { entity: EntityId, machine: String },

    #[error("machine '{machine}' has no state '{state}'")]
    UnknownState { machine: String, state: String },

    #[error("machine '{machine}' has no variable '{name}'")]
    UnknownVariable { machine: String, name: String },

    #[error("rejected by host: {0}")]
    Rejected(String),
}

/// Capability interface the host simulation exposes to the bridge.
///
/// The bridge never reaches into engine internals; everything it reads or
/// mutates goes through this trait. All calls happen on the host tick
/// thread, between simulation ticks.
pub trait SimulationQuery {
    // Clock

    /// Simulation clock in seconds. Does not advance while the time scale is 0.
    fn time(&self) -> f32;
    /// Duration of one fixed tick in simulation seconds.
    fn fixed_delta(&self) -> f32;
    /// Number of fixed ticks elapsed since start-up.
    fn fixed_tick_count(&self) -> u64;
    fn time_scale(&self) -> f32;
    fn set_time_scale(&mut self, scale: f32);

    // Agent

    /// Handle of the agent, `None` while it is not spawned.
    fn agent(&self) -> Option<EntityId>;
    fn agent_status(&self) -> Option<AgentStatus>;

    // Entities

    fn body(&self, entity: EntityId) -> Option<Body>;
    fn health(&self, entity: EntityId) -> Option<i32>;
    fn animation(&self, entity: EntityId) -> Option<AnimationFrame>;
    fn set_body(&mut self, entity: EntityId, position: Vec2, velocity: Vec2) -> Result<(), SimError>;
    fn set_health(&mut self, entity: EntityId, health: i32) -> Result<(), SimError>;

    // World

    /// Appends every collider on `mask` crossed within `max_distance` to
    /// `hits`, in no particular order. `hits` is cleared first.
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
        hits: &mut Vec<WorldHit>,
    );
    fn objects(&self) -> Vec<WorldObject>;
    fn set_object_active(&mut self, entity: EntityId, active: bool) -> Result<(), SimError>;

    // Behaviour machines

    fn machines(&self, entity: EntityId) -> Vec<String>;
    fn active_state(&self, entity: EntityId, machine: &str) -> Option<String>;
    fn set_state(&mut self, entity: EntityId, machine: &str, state: &str) -> Result<(), SimError>;
    /// Drives the machine back to its initial node with initial variables.
    fn reset_machine(&mut self, entity: EntityId, machine: &str) -> Result<(), SimError>;
    fn variable(&self, entity: EntityId, machine: &str, name: &str) -> Option<Variable>;
    fn set_variable(
        &mut self,
        entity: EntityId,
        machine: &str,
        name: &str,
        value: Variable,
    ) -> Result<(), SimError>;

    // Episode control

    /// Blocks every incoming damage event while set.
    fn set_damage_blocked(&mut self, blocked: bool);
    fn set_invulnerable(&mut self, entity: EntityId, invulnerable: bool) -> Result<(), SimError>;
    /// Cancels every pending timed action or continuation owned by the entity.
    fn cancel_pending_actions(&mut self, entity: EntityId);
    /// Zeroes per-tick counters, timers and queued input, and returns the
    /// entity to a neutral pose.
    fn clear_transient_state(&mut self, entity: EntityId);
    /// Refills health and resource pools to their maximum.
    fn restore_vitals(&mut self, entity: EntityId) -> Result<(), SimError>;
    fn begin_scene_transition(&mut self, load: &SceneLoad) -> Result<(), SimError>;

    // Input layer

    /// Replaces the native input source. `None` restores native input.
    fn set_input_override(&mut self, inputs: Option<InputState>);
}
